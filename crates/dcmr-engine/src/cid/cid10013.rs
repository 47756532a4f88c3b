//! CID 10013: CT Acquisition Type.

use dcmr_types::CodedEntry;

use super::context_group;
use crate::types::{CmrError, CmrResult};
use crate::vocabulary::Vocabulary;

context_group! {
    /// CID 10013: CT Acquisition Type.
    pub type Cid10013CtAcquisitionType = ContextGroup<CtAcquisitionType> {
        identifier: "10013",
        version: "20120619",
        uid: "1.2.840.10008.6.1.1004",
        extensible: true,
        codes: {
            SequencedAcquisition => ("113804", "DCM", "Sequenced Acquisition"),
            SpiralAcquisition => ("116152004", "SCT", "Spiral Acquisition"),
            ConstantAngleAcquisition => ("113805", "DCM", "Constant Angle Acquisition"),
            StationaryAcquisition => ("113806", "DCM", "Stationary Acquisition"),
            FreeAcquisition => ("113807", "DCM", "Free Acquisition"),
            ConeBeamAcquisition => ("702569007", "SCT", "Cone Beam Acquisition"),
        }
    }
}

/// Maps an Acquisition Type (0018,9302) defined term to its coded entry.
pub fn map_acquisition_type(defined_term: &str) -> CmrResult<CodedEntry> {
    let key = match defined_term.trim() {
        "SEQUENCED" => CtAcquisitionType::SequencedAcquisition,
        "SPIRAL" => CtAcquisitionType::SpiralAcquisition,
        "CONSTANT_ANGLE" => CtAcquisitionType::ConstantAngleAcquisition,
        "STATIONARY" => CtAcquisitionType::StationaryAcquisition,
        "FREE" => CtAcquisitionType::FreeAcquisition,
        "CONE_BEAM" => CtAcquisitionType::ConeBeamAcquisition,
        other => return Err(CmrError::UnsupportedValue(other.to_string())),
    };
    CtAcquisitionType::table()
        .get(key)
        .cloned()
        .ok_or_else(|| CmrError::UnsupportedValue(defined_term.to_string()))
}
