//! CID 7445: Device Participating Roles.

use super::context_group;

context_group! {
    /// CID 7445: Device Participating Roles.
    pub type Cid7445DeviceParticipatingRoles = ContextGroup<DeviceParticipatingRole> {
        identifier: "7445",
        version: "20050822",
        uid: "1.2.840.10008.6.1.522",
        extensible: false,
        codes: {
            IrradiatingDevice => ("113859", "DCM", "Irradiating Device"),
            Recording => ("121097", "DCM", "Recording"),
            XRayReadingDevice => ("113942", "DCM", "X-Ray Reading Device"),
        }
    }
}
