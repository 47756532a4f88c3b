//! CID 244: Laterality.

use dcmr_types::CodedEntry;

use super::context_group;
use crate::types::{CmrError, CmrResult};
use crate::vocabulary::Vocabulary;

context_group! {
    /// CID 244: Laterality.
    pub type Cid244Laterality = ContextGroup<Laterality> {
        identifier: "244",
        version: "20170914",
        uid: "1.2.840.10008.6.1.246",
        extensible: false,
        codes: {
            Right => ("G-A100", "SRT", "Right"),
            Left => ("G-A101", "SRT", "Left"),
            RightAndLeft => ("G-A102", "SRT", "Right and left"),
            Unilateral => ("G-A103", "SRT", "Unilateral"),
        }
    }
}

/// Maps an Image Laterality (0020,0062) defined term to its coded entry.
pub fn map_image_laterality(defined_term: &str) -> CmrResult<CodedEntry> {
    let key = match defined_term.trim() {
        "R" => Laterality::Right,
        "L" => Laterality::Left,
        "B" => Laterality::RightAndLeft,
        "U" => Laterality::Unilateral,
        other => return Err(CmrError::UnsupportedValue(other.to_string())),
    };
    Laterality::table()
        .get(key)
        .cloned()
        .ok_or_else(|| CmrError::UnsupportedValue(defined_term.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_image_laterality() {
        assert_eq!(map_image_laterality("R").unwrap().code_value(), "G-A100");
        assert_eq!(map_image_laterality("B").unwrap().code_meaning(), "Right and left");
        assert!(map_image_laterality("X").is_err());
        assert!(map_image_laterality("").is_err());
    }
}
