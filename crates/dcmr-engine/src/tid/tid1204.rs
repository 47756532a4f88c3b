//! TID 1204 Language of Content Item and Descendants.

use dcmr_types::codes::dcm;
use dcmr_types::{AddMode, RelationshipType, ValueType};

use super::{add_row, selected_entry, Row, RowValue};
use crate::cid::{Country, Language};
use crate::context_group::ContextGroup;
use crate::template::{SubTemplate, Template};
use crate::tree::ContentTree;
use crate::types::CmrResult;

const LANGUAGE: usize = 0;
const COUNTRY: usize = 1;
const NUMBER_OF_SLOTS: usize = 2;

/// Language of Content Item and Descendants (TID 1204).
#[derive(Debug, Clone)]
pub struct Tid1204LanguageOfContentItemAndDescendants {
    template: SubTemplate,
}

impl Default for Tid1204LanguageOfContentItemAndDescendants {
    fn default() -> Self {
        Self::new()
    }
}

impl Tid1204LanguageOfContentItemAndDescendants {
    /// Creates an empty template.
    pub fn new() -> Self {
        Self {
            template: SubTemplate::new("1204", true, true).with_slots(NUMBER_OF_SLOTS),
        }
    }

    /// Creates the template with a language (and no country).
    pub fn with_language(language: &ContextGroup<Language>, check: bool) -> CmrResult<Self> {
        let mut template = Self::new();
        template.set_language(language, &ContextGroup::new(), check)?;
        Ok(template)
    }

    /// Returns true if the language row exists.
    pub fn has_language(&self) -> bool {
        self.template.slot_has_value_type(LANGUAGE, ValueType::Code)
    }

    /// Returns true if the country row exists.
    pub fn has_country(&self) -> bool {
        self.template.slot_has_value_type(COUNTRY, ValueType::Code)
    }

    /// Sets the language (Row 1) and, if a country is selected, the country
    /// of the language (Row 2). Replaces any previous content.
    ///
    /// # Errors
    /// `InvalidValue` if no language is selected; membership errors of the
    /// defined groups when `check` is set. The previous content is kept on
    /// error.
    pub fn set_language(
        &mut self,
        language: &ContextGroup<Language>,
        country: &ContextGroup<Country>,
        check: bool,
    ) -> CmrResult<()> {
        let mut rows = ContentTree::new();
        let language_id = add_row(
            &mut rows,
            AddMode::AfterCurrent,
            Row::new(
                RelationshipType::HasConceptMod,
                &dcm::LANGUAGE_OF_CONTENT_ITEM_AND_DESCENDANTS,
                "TID 1204 - Row 1",
            ),
            RowValue::Code(selected_entry(language, true, check)?),
            check,
        )?;
        let country_id = if country.has_selected_value() {
            Some(add_row(
                &mut rows,
                AddMode::BelowCurrent,
                Row::new(RelationshipType::HasConceptMod, &dcm::COUNTRY_OF_LANGUAGE, "TID 1204 - Row 2"),
                RowValue::Code(selected_entry(country, true, check)?),
                check,
            )?)
        } else {
            None
        };

        self.template.clear();
        self.template
            .tree_mut()
            .insert_sub_tree(&mut rows, AddMode::AfterCurrent, RelationshipType::HasConceptMod)?;
        self.template.store(LANGUAGE, Some(language_id));
        self.template.store(COUNTRY, country_id);
        Ok(())
    }
}

impl Template for Tid1204LanguageOfContentItemAndDescendants {
    fn sub_template(&self) -> &SubTemplate {
        &self.template
    }

    fn sub_template_mut(&mut self) -> &mut SubTemplate {
        &mut self.template
    }

    fn is_valid(&self) -> bool {
        self.template.is_valid() && self.has_language()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ContentItem;
    use crate::types::CmrError;
    use dcmr_types::CodedEntry;

    #[test]
    fn test_language_and_country() {
        let mut template = Tid1204LanguageOfContentItemAndDescendants::new();
        assert!(!template.is_valid());

        template
            .set_language(&Language::English.into(), &Country::UnitedKingdom.into(), true)
            .unwrap();
        assert!(template.is_valid());
        assert!(template.has_country());
        assert_eq!(template.sub_template().count_nodes(false), 2);

        let tree = template.sub_template().tree();
        let levels: Vec<usize> = tree.nodes().map(|(level, _, _)| level).collect();
        assert_eq!(levels, vec![1, 2]);
    }

    #[test]
    fn test_set_language_replaces_content() {
        let mut template =
            Tid1204LanguageOfContentItemAndDescendants::with_language(&Language::German.into(), true)
                .unwrap();
        assert!(!template.has_country());

        template
            .set_language(&Language::French.into(), &Country::France.into(), true)
            .unwrap();
        assert_eq!(template.sub_template().count_nodes(false), 2);
        let root = template.sub_template().tree().roots()[0];
        let value = template.sub_template().tree().item(root).unwrap().code_value().cloned();
        assert_eq!(value.as_ref().map(CodedEntry::code_value), Some("fr"));
    }

    #[test]
    fn test_failure_keeps_previous_language() {
        let mut template =
            Tid1204LanguageOfContentItemAndDescendants::with_language(&Language::English.into(), true)
                .unwrap();

        let result = template.set_language(&ContextGroup::new(), &ContextGroup::new(), true);
        assert!(matches!(result, Err(CmrError::InvalidValue)));

        let mut unknown = ContextGroup::<Language>::new();
        unknown
            .select_value(CodedEntry::new("tlh", "RFC5646", "Klingon"), false, false)
            .unwrap();
        let result = template.set_language(&unknown, &ContextGroup::new(), true);
        assert!(matches!(result, Err(CmrError::CodedEntryNotInContextGroup)));

        assert!(template.is_valid());
        assert_eq!(template.sub_template().count_nodes(false), 1);
    }

    #[test]
    fn test_validity_after_language_row_changes() {
        let mut template =
            Tid1204LanguageOfContentItemAndDescendants::with_language(&Language::English.into(), true)
                .unwrap();
        let root = template.sub_template().tree().roots()[0];
        let mut text = ContentItem::new(
            RelationshipType::HasConceptMod,
            ValueType::Text,
            dcm::LANGUAGE_OF_CONTENT_ITEM_AND_DESCENDANTS,
        );
        text.set_string_value("English", true).unwrap();
        if let Some(item) = template.sub_template_mut().tree_mut().item_mut(root) {
            *item = text;
        }
        assert!(!template.has_language());
        assert!(!template.is_valid());

        template
            .set_language(&Language::English.into(), &Country::UnitedKingdom.into(), true)
            .unwrap();
        let tree = template.sub_template_mut().tree_mut();
        tree.goto_root();
        tree.remove_current_content_item();
        assert!(template.is_empty());
        assert!(!template.has_country());
        assert!(!template.is_valid());
    }
}
