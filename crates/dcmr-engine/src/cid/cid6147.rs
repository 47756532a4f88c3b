//! CID 6147: Response Criteria.

use super::context_group;

context_group! {
    /// CID 6147: Response Criteria.
    pub type Cid6147ResponseCriteria = ContextGroup<ResponseCriterion> {
        identifier: "6147",
        version: "20161110",
        uid: "1.2.840.10008.6.1.1048",
        extensible: true,
        codes: {
            Who => ("112029", "DCM", "WHO"),
            Recist => ("112030", "DCM", "RECIST"),
            Recist11 => ("126080", "DCM", "RECIST 1.1"),
            Percist10 => ("126081", "DCM", "PERCIST 1.0"),
            Irrc => ("126082", "DCM", "irRC"),
        }
    }
}
