//! TID 4019 Algorithm Identification.

use dcmr_types::codes::dcm;
use dcmr_types::{AddMode, RelationshipType};

use super::{add_row, Row, RowValue};
use crate::template::{SubTemplate, Template};
use crate::tree::ContentTree;
use crate::types::{CmrError, CmrResult};

const ALGORITHM_NAME: usize = 0;
const ALGORITHM_VERSION: usize = 1;
const LAST_ALGORITHM_PARAMETER: usize = 2;
const NUMBER_OF_SLOTS: usize = 3;

/// Algorithm Identification (TID 4019).
///
/// Usually included by a measurement template, which shares the instance.
#[derive(Debug, Clone)]
pub struct Tid4019AlgorithmIdentification {
    template: SubTemplate,
}

impl Default for Tid4019AlgorithmIdentification {
    fn default() -> Self {
        Self::new()
    }
}

impl Tid4019AlgorithmIdentification {
    /// Creates an empty template.
    pub fn new() -> Self {
        Self {
            template: SubTemplate::new("4019", true, true).with_slots(NUMBER_OF_SLOTS),
        }
    }

    /// Sets algorithm name and version, replacing any previous content.
    ///
    /// # Errors
    /// `InvalidValue` if either value is empty.
    pub fn set_identification(&mut self, name: &str, version: &str, check: bool) -> CmrResult<()> {
        if name.is_empty() || version.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        let mut rows = ContentTree::new();
        let name_id = add_row(
            &mut rows,
            AddMode::AfterCurrent,
            Row::new(RelationshipType::HasConceptMod, &dcm::ALGORITHM_NAME, "TID 4019 - Row 1"),
            RowValue::text(name),
            check,
        )?;
        let version_id = add_row(
            &mut rows,
            AddMode::AfterCurrent,
            Row::new(RelationshipType::HasConceptMod, &dcm::ALGORITHM_VERSION, "TID 4019 - Row 2"),
            RowValue::text(version),
            check,
        )?;
        self.template.clear();
        self.template
            .tree_mut()
            .insert_sub_tree(&mut rows, AddMode::AfterCurrent, RelationshipType::HasConceptMod)?;
        self.template.store(ALGORITHM_NAME, Some(name_id));
        self.template.store(ALGORITHM_VERSION, Some(version_id));
        Ok(())
    }

    /// Adds an algorithm parameter (Row 3) after the previous one.
    ///
    /// # Errors
    /// `InvalidTemplateStructure` before name and version are set.
    pub fn add_parameter(&mut self, parameter: &str, check: bool) -> CmrResult<()> {
        if self.template.slot(ALGORITHM_VERSION).is_none() {
            return Err(CmrError::InvalidTemplateStructure);
        }
        let item = super::build_item(
            Row::new(
                RelationshipType::HasConceptMod,
                &dcm::ALGORITHM_PARAMETERS,
                "TID 4019 - Row 3",
            ),
            RowValue::text(parameter),
            check,
        )?;
        self.template
            .goto_last_slot(LAST_ALGORITHM_PARAMETER)
            .ok_or(CmrError::InvalidTemplateStructure)?;
        let id = self.template.tree_mut().add_item(item, AddMode::AfterCurrent)?;
        self.template.store(LAST_ALGORITHM_PARAMETER, Some(id));
        Ok(())
    }

    /// Returns the algorithm name, if set.
    pub fn algorithm_name(&self) -> Option<&str> {
        let id = self.template.slot(ALGORITHM_NAME)?;
        self.template.tree().item(id)?.string_value()
    }

    /// Returns the algorithm version, if set.
    pub fn algorithm_version(&self) -> Option<&str> {
        let id = self.template.slot(ALGORITHM_VERSION)?;
        self.template.tree().item(id)?.string_value()
    }
}

impl Template for Tid4019AlgorithmIdentification {
    fn sub_template(&self) -> &SubTemplate {
        &self.template
    }

    fn sub_template_mut(&mut self) -> &mut SubTemplate {
        &mut self.template
    }

    fn is_valid(&self) -> bool {
        self.template.is_valid() && self.algorithm_name().is_some() && self.algorithm_version().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identification_and_parameters() {
        let mut algorithm = Tid4019AlgorithmIdentification::new();
        assert!(!algorithm.is_valid());
        assert!(matches!(
            algorithm.add_parameter("threshold=3", true),
            Err(CmrError::InvalidTemplateStructure)
        ));

        algorithm.set_identification("Segmenter", "1.0", true).unwrap();
        algorithm.add_parameter("threshold=3", true).unwrap();
        algorithm.add_parameter("iterations=10", true).unwrap();
        assert!(algorithm.is_valid());
        assert_eq!(algorithm.sub_template().count_nodes(false), 4);

        let values: Vec<&str> = algorithm
            .sub_template()
            .tree()
            .nodes()
            .filter_map(|(_, _, item)| item.string_value())
            .collect();
        assert_eq!(values, vec!["Segmenter", "1.0", "threshold=3", "iterations=10"]);
    }

    #[test]
    fn test_set_identification_replaces() {
        let mut algorithm = Tid4019AlgorithmIdentification::new();
        algorithm.set_identification("Segmenter", "1.0", true).unwrap();
        algorithm.add_parameter("threshold=3", true).unwrap();

        assert!(matches!(
            algorithm.set_identification("", "2.0", true),
            Err(CmrError::InvalidValue)
        ));
        assert_eq!(algorithm.sub_template().count_nodes(false), 3);

        algorithm.set_identification("Segmenter", "2.0", true).unwrap();
        assert_eq!(algorithm.sub_template().count_nodes(false), 2);
        assert_eq!(algorithm.algorithm_version(), Some("2.0"));
    }

    #[test]
    fn test_removed_version_invalidates() {
        let mut algorithm = Tid4019AlgorithmIdentification::new();
        algorithm.set_identification("Segmenter", "1.0", true).unwrap();
        let version = algorithm.sub_template().slot(ALGORITHM_VERSION).unwrap();
        let tree = algorithm.sub_template_mut().tree_mut();
        tree.goto_node(version);
        tree.remove_current_content_item();
        assert_eq!(algorithm.algorithm_version(), None);
        assert!(!algorithm.is_valid());
        assert!(matches!(
            algorithm.add_parameter("threshold=3", true),
            Err(CmrError::InvalidTemplateStructure)
        ));
    }
}
