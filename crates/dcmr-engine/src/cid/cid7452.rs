//! CID 7452: Organizational Roles.

use super::context_group;

context_group! {
    /// CID 7452: Organizational Roles.
    pub type Cid7452OrganizationalRoles = ContextGroup<OrganizationalRole> {
        identifier: "7452",
        version: "20181119",
        uid: "1.2.840.10008.6.1.516",
        extensible: true,
        codes: {
            Fellow => ("121088", "DCM", "Fellow"),
            Nurse => ("106292003", "SCT", "Nurse"),
            Physician => ("309343006", "SCT", "Physician"),
            Physicist => ("121102", "DCM", "Physicist"),
            Radiologist => ("66862007", "SCT", "Radiologist"),
            RadiologyTechnologist => ("159016003", "SCT", "Radiology Technologist"),
            Resident => ("405277009", "SCT", "Resident"),
            Technologist => ("3430008", "SCT", "Technologist"),
        }
    }
}
