//! CID 10033: CT Reconstruction Algorithm.

use dcmr_types::CodedEntry;

use super::context_group;
use crate::types::{CmrError, CmrResult};
use crate::vocabulary::Vocabulary;

context_group! {
    /// CID 10033: CT Reconstruction Algorithm.
    pub type Cid10033CtReconstructionAlgorithm = ContextGroup<CtReconstructionAlgorithm> {
        identifier: "10033",
        version: "20120619",
        uid: "1.2.840.10008.6.1.1024",
        extensible: true,
        codes: {
            FilteredBackProjection => ("113962", "DCM", "Filtered Back Projection"),
            IterativeReconstruction => ("113963", "DCM", "Iterative Reconstruction"),
        }
    }
}

/// Maps a Reconstruction Algorithm (0018,9315) defined term to its coded entry.
pub fn map_reconstruction_algorithm(defined_term: &str) -> CmrResult<CodedEntry> {
    let key = match defined_term.trim() {
        "FILTER_BACK_PROJ" => CtReconstructionAlgorithm::FilteredBackProjection,
        "ITERATIVE" => CtReconstructionAlgorithm::IterativeReconstruction,
        other => return Err(CmrError::UnsupportedValue(other.to_string())),
    };
    CtReconstructionAlgorithm::table()
        .get(key)
        .cloned()
        .ok_or_else(|| CmrError::UnsupportedValue(defined_term.to_string()))
}
