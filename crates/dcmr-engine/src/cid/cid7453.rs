//! CID 7453: Performing Roles.

use super::context_group;

context_group! {
    /// CID 7453: Performing Roles.
    pub type Cid7453PerformingRoles = ContextGroup<PerformingRole> {
        identifier: "7453",
        version: "20181119",
        uid: "1.2.840.10008.6.1.517",
        extensible: true,
        codes: {
            Performing => ("121094", "DCM", "Performing"),
            Referring => ("121095", "DCM", "Referring"),
            Requesting => ("121096", "DCM", "Requesting"),
            Recording => ("121097", "DCM", "Recording"),
            Verifying => ("121098", "DCM", "Verifying"),
            Assisting => ("121099", "DCM", "Assisting"),
            Circulating => ("121100", "DCM", "Circulating"),
            Standby => ("121101", "DCM", "Standby"),
            IrradiationAuthorizing => ("113850", "DCM", "Irradiation Authorizing"),
            IrradiationAdministering => ("113851", "DCM", "Irradiation Administering"),
        }
    }
}
