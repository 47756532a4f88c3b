//! TID 1419 ROI Measurements, generic over the vocabularies of the
//! measurement concept, its units, the measurement method and the
//! derivation.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use dcmr_types::codes::{dcm, sct};
use dcmr_types::{
    AddMode, CodedEntry, CompositeReference, NodeId, NumericMeasurement, RelationshipType, ValueType,
};
use tracing::{debug, warn};

use super::tid4019::Tid4019AlgorithmIdentification;
use super::{
    build_item, composite_reference_of, finding_site_rows, selected_entry, set_row, Row, RowValue,
};
use crate::cid::{
    ImageModelUnit, IntensityAndSizeMeasurement, Laterality, ResponseCriterion,
    RoiMeasurementModifier,
};
use crate::context_group::ContextGroup;
use crate::dataset::Dataset;
use crate::template::{SharedSubTemplate, SubTemplate, Template};
use crate::tree::ContentItem;
use crate::types::{CmrError, CmrResult};
use crate::vocabulary::Vocabulary;

const MEASUREMENT: usize = 0;
const LAST_MODIFIER: usize = 1;
const MEASUREMENT_METHOD: usize = 2;
const DERIVATION: usize = 3;
const LAST_FINDING_SITE: usize = 4;
const LAST_DERIVATION_PARAMETER: usize = 5;
const EQUIVALENT_MEANING: usize = 6;
const REAL_WORLD_VALUE_MAP: usize = 7;
const ALGORITHM_IDENTIFICATION: usize = 8;
const NUMBER_OF_SLOTS: usize = 9;

/// ROI Measurements (TID 1419).
///
/// `M` supplies measurement concept names, `U` the allowed units, `Me` the
/// measurement methods and `D` the derivations. The algorithm identification
/// (TID 4019) is an included template shared with this instance.
#[derive(Debug, Clone)]
pub struct Tid1419RoiMeasurement<M, U, Me, D> {
    template: SubTemplate,
    algorithm: Rc<RefCell<Tid4019AlgorithmIdentification>>,
    vocabularies: PhantomData<(M, U, Me, D)>,
}

/// ROI measurement with the vocabularies used by volumetric measurements.
pub type RoiMeasurement = Tid1419RoiMeasurement<
    IntensityAndSizeMeasurement,
    ImageModelUnit,
    ResponseCriterion,
    RoiMeasurementModifier,
>;

impl<M, U, Me, D> Default for Tid1419RoiMeasurement<M, U, Me, D>
where
    M: Vocabulary,
    U: Vocabulary,
    Me: Vocabulary,
    D: Vocabulary,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M, U, Me, D> Tid1419RoiMeasurement<M, U, Me, D>
where
    M: Vocabulary,
    U: Vocabulary,
    Me: Vocabulary,
    D: Vocabulary,
{
    /// Creates an empty template.
    pub fn new() -> Self {
        Self {
            template: SubTemplate::new("1419", true, false).with_slots(NUMBER_OF_SLOTS),
            algorithm: Rc::new(RefCell::new(Tid4019AlgorithmIdentification::new())),
            vocabularies: PhantomData,
        }
    }

    /// Returns true if the measurement (Row 5) exists.
    pub fn has_measurement(&self) -> bool {
        self.template.slot_has_value_type(MEASUREMENT, ValueType::Num)
    }

    /// The measurement content item (Row 5).
    pub fn measurement(&self) -> Option<&ContentItem> {
        self.template.tree().item(self.template.slot(MEASUREMENT)?)
    }

    /// Shared handle to the included algorithm identification.
    pub fn algorithm_identification(&self) -> &Rc<RefCell<Tid4019AlgorithmIdentification>> {
        &self.algorithm
    }

    /// Clears the template and creates the measurement (Row 5) with the
    /// included algorithm identification (Row 20) below it.
    ///
    /// # Errors
    /// `InvalidValue` if no concept is selected or the value is incomplete;
    /// `ValueSetConstraintViolated` if `check` is set and the unit is not a
    /// member of `U`; `InvalidTemplateStructure` if the algorithm
    /// identification is borrowed elsewhere. The current content is kept on
    /// error.
    pub fn create_new_measurement(
        &mut self,
        concept: &ContextGroup<M>,
        value: &NumericMeasurement,
        check: bool,
    ) -> CmrResult<()> {
        if !concept.has_selected_value() || !value.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        if check && !ContextGroup::<U>::new().has_coded_entry(&value.unit) {
            warn!(
                unit = value.unit.code_value(),
                group = U::IDENTIFIER,
                "measurement unit not allowed"
            );
            return Err(CmrError::ValueSetConstraintViolated);
        }
        let concept = selected_entry(concept, false, check)?;
        let item = build_item(
            Row::new(RelationshipType::Unknown, &concept, "TID 1419 - Row 5"),
            RowValue::Num(value.clone()),
            check,
        )?;

        let mut algorithm = self
            .algorithm
            .try_borrow_mut()
            .map_err(|_| CmrError::InvalidTemplateStructure)?;
        let mut template = self.template.clone();
        template.clear();
        let id = template.tree_mut().add_item(item, AddMode::AfterCurrent)?;
        template.store(MEASUREMENT, Some(id));
        let shared: SharedSubTemplate = self.algorithm.clone();
        let include =
            template.include_template(shared, AddMode::BelowCurrent, RelationshipType::HasConceptMod)?;
        if let Some(item) = template.tree_mut().item_mut(include) {
            item.set_annotation("TID 1419 - Row 20");
        }
        template.store(ALGORITHM_IDENTIFICATION, Some(include));

        Template::clear(&mut *algorithm);
        self.template = template;
        Ok(())
    }

    /// Adds a concept name modifier (Row 6).
    pub fn add_modifier(&mut self, concept: &CodedEntry, modifier: &CodedEntry, check: bool) -> CmrResult<()> {
        if !concept.is_complete() || !modifier.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        let item = build_item(
            Row::new(RelationshipType::HasConceptMod, concept, "TID 1419 - Row 6"),
            RowValue::Code(modifier.clone()),
            check,
        )?;
        self.add_repeated(LAST_MODIFIER, item)?;
        Ok(())
    }

    /// Sets the measurement method (Row 7).
    pub fn set_measurement_method(&mut self, method: &ContextGroup<Me>, check: bool) -> CmrResult<()> {
        if !method.has_selected_value() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        set_row(
            &mut self.template,
            MEASUREMENT_METHOD,
            MEASUREMENT,
            Row::new(RelationshipType::HasConceptMod, &sct::MEASUREMENT_METHOD, "TID 1419 - Row 7"),
            RowValue::Code(selected_entry(method, true, check)?),
            check,
        )?;
        Ok(())
    }

    /// Sets the derivation (Row 8).
    pub fn set_derivation(&mut self, derivation: &ContextGroup<D>, check: bool) -> CmrResult<()> {
        if !derivation.has_selected_value() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        set_row(
            &mut self.template,
            DERIVATION,
            MEASUREMENT,
            Row::new(RelationshipType::HasConceptMod, &dcm::DERIVATION, "TID 1419 - Row 8"),
            RowValue::Code(selected_entry(derivation, true, check)?),
            check,
        )?;
        Ok(())
    }

    /// Adds a finding site (Row 9) with optional laterality (Row 10) and
    /// topographical modifier (Row 11) below it.
    pub fn add_finding_site(
        &mut self,
        site: &CodedEntry,
        laterality: &ContextGroup<Laterality>,
        site_modifier: &CodedEntry,
        check: bool,
    ) -> CmrResult<()> {
        if !site.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        let mut rows = finding_site_rows(
            site,
            laterality,
            site_modifier,
            ["TID 1419 - Row 9", "TID 1419 - Row 10", "TID 1419 - Row 11"],
            check,
        )?;
        let last = rows.roots().first().copied();
        let mode = self.template.position_for_row(LAST_FINDING_SITE, MEASUREMENT)?;
        self.template
            .tree_mut()
            .insert_sub_tree(&mut rows, mode, RelationshipType::HasConceptMod)?;
        self.template.store(LAST_FINDING_SITE, last);
        Ok(())
    }

    /// Adds a derivation parameter (Row 13).
    pub fn add_derivation_parameter(
        &mut self,
        concept: &CodedEntry,
        value: &NumericMeasurement,
        check: bool,
    ) -> CmrResult<()> {
        if !concept.is_complete() || !value.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        let item = build_item(
            Row::new(RelationshipType::InferredFrom, concept, "TID 1419 - Row 13"),
            RowValue::Num(value.clone()),
            check,
        )?;
        self.add_repeated(LAST_DERIVATION_PARAMETER, item)?;
        Ok(())
    }

    /// Sets the equivalent meaning of the concept name (Row 18).
    pub fn set_equivalent_meaning_of_concept_name(&mut self, meaning: &str, check: bool) -> CmrResult<()> {
        if meaning.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        set_row(
            &mut self.template,
            EQUIVALENT_MEANING,
            MEASUREMENT,
            Row::new(
                RelationshipType::HasConceptMod,
                &dcm::EQUIVALENT_MEANING_OF_CONCEPT_NAME,
                "TID 1419 - Row 18",
            ),
            RowValue::text(meaning),
            check,
        )?;
        Ok(())
    }

    /// Sets the real world value map used for the measurement (Row 19).
    ///
    /// # Errors
    /// `InvalidValue` if the reference is incomplete;
    /// `InvalidRealWorldValueMappingObject` unless it references a real
    /// world value mapping object.
    pub fn set_real_world_value_map(&mut self, value_map: &CompositeReference, check: bool) -> CmrResult<()> {
        if !value_map.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        if !value_map.is_real_world_value_mapping() {
            warn!(row = "TID 1419 - Row 19", "cannot set real world value map, wrong SOP class");
            debug!(
                sop_class_uid = value_map.sop_class_uid.as_str(),
                "not the SOP class of a real world value mapping object"
            );
            return Err(CmrError::InvalidRealWorldValueMappingObject);
        }
        self.require_measurement()?;
        set_row(
            &mut self.template,
            REAL_WORLD_VALUE_MAP,
            MEASUREMENT,
            Row::new(
                RelationshipType::InferredFrom,
                &dcm::REAL_WORLD_VALUE_MAP_USED_FOR_MEASUREMENT,
                "TID 1419 - Row 19",
            ),
            RowValue::Composite(value_map.clone()),
            check,
        )?;
        Ok(())
    }

    /// Sets the real world value map (Row 19) from the SOP class and
    /// instance UIDs of a dataset.
    pub fn set_real_world_value_map_from_dataset(&mut self, dataset: &dyn Dataset, check: bool) -> CmrResult<()> {
        self.set_real_world_value_map(&composite_reference_of(dataset), check)
    }

    /// Sets name and version of the algorithm in the included TID 4019.
    pub fn set_algorithm_identification(&mut self, name: &str, version: &str, check: bool) -> CmrResult<()> {
        if name.is_empty() || version.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        self.algorithm
            .try_borrow_mut()
            .map_err(|_| CmrError::InvalidTemplateStructure)?
            .set_identification(name, version, check)
    }

    fn require_measurement(&self) -> CmrResult<()> {
        if self.has_measurement() {
            Ok(())
        } else {
            Err(CmrError::NoMeasurement)
        }
    }

    fn add_repeated(&mut self, slot: usize, item: ContentItem) -> CmrResult<NodeId> {
        let mode = self.template.position_for_row(slot, MEASUREMENT)?;
        let id = self.template.tree_mut().add_item(item, mode)?;
        self.template.store(slot, Some(id));
        Ok(id)
    }
}

impl<M, U, Me, D> Template for Tid1419RoiMeasurement<M, U, Me, D>
where
    M: Vocabulary,
    U: Vocabulary,
    Me: Vocabulary,
    D: Vocabulary,
{
    fn sub_template(&self) -> &SubTemplate {
        &self.template
    }

    fn sub_template_mut(&mut self) -> &mut SubTemplate {
        &mut self.template
    }

    fn is_valid(&self) -> bool {
        self.template.is_valid() && self.has_measurement()
    }

    fn clear(&mut self) {
        self.template.clear();
        if let Ok(mut algorithm) = self.algorithm.try_borrow_mut() {
            algorithm.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{tags, MemoryDataset};
    use dcmr_types::codes::ucum;
    use dcmr_types::REAL_WORLD_VALUE_MAPPING_STORAGE_UID;

    fn volume() -> NumericMeasurement {
        NumericMeasurement::new("12.5", ucum::CUBIC_MILLIMETER)
    }

    fn measurement() -> RoiMeasurement {
        let mut measurement = RoiMeasurement::new();
        measurement
            .create_new_measurement(&IntensityAndSizeMeasurement::Volume.into(), &volume(), true)
            .unwrap();
        measurement
    }

    fn concepts(measurement: &RoiMeasurement) -> Vec<(usize, String)> {
        measurement
            .sub_template()
            .tree()
            .nodes()
            .map(|(level, _, item)| (level, item.concept_name().code_meaning().to_string()))
            .collect()
    }

    #[test]
    fn test_create_new_measurement() {
        let mut measurement = RoiMeasurement::new();
        assert!(!measurement.is_valid());
        assert!(matches!(
            measurement.set_derivation(&RoiMeasurementModifier::Mean.into(), true),
            Err(CmrError::NoMeasurement)
        ));

        measurement
            .create_new_measurement(&IntensityAndSizeMeasurement::Volume.into(), &volume(), true)
            .unwrap();
        assert!(measurement.is_valid());
        assert_eq!(measurement.sub_template().count_nodes(false), 2);
        assert_eq!(
            measurement.measurement().and_then(ContentItem::numeric_value),
            Some(&volume())
        );
    }

    #[test]
    fn test_unit_must_be_allowed() {
        let mut measurement = measurement();
        let value = NumericMeasurement::new("3", CodedEntry::new("furlong", "UCUM", "furlong"));
        let result =
            measurement.create_new_measurement(&IntensityAndSizeMeasurement::Length.into(), &value, true);
        assert!(matches!(result, Err(CmrError::ValueSetConstraintViolated)));
        assert_eq!(measurement.sub_template().count_nodes(false), 2);

        let result = measurement.create_new_measurement(
            &ContextGroup::new(),
            &volume(),
            true,
        );
        assert!(matches!(result, Err(CmrError::InvalidValue)));
    }

    #[test]
    fn test_rows_are_placed_below_measurement() {
        let mut measurement = measurement();
        measurement
            .set_derivation(&RoiMeasurementModifier::Mean.into(), true)
            .unwrap();
        measurement
            .set_measurement_method(&ResponseCriterion::Recist11.into(), true)
            .unwrap();
        measurement
            .add_modifier(&dcm::FINDING, &CodedEntry::new("T-D0010", "SRT", "Entire body"), true)
            .unwrap();
        measurement
            .add_finding_site(
                &CodedEntry::new("T-28000", "SRT", "Lung"),
                &Laterality::Left.into(),
                &CodedEntry::empty(),
                true,
            )
            .unwrap();

        let meanings = concepts(&measurement);
        assert_eq!(
            meanings,
            vec![
                (1, "Volume".to_string()),
                (2, "Finding".to_string()),
                (2, "Measurement Method".to_string()),
                (2, "Derivation".to_string()),
                (2, "Finding Site".to_string()),
                (3, "Laterality".to_string()),
                (2, String::new()),
            ]
        );
    }

    #[test]
    fn test_replace_derivation() {
        let mut measurement = measurement();
        measurement
            .set_derivation(&RoiMeasurementModifier::Mean.into(), true)
            .unwrap();
        measurement
            .set_derivation(&RoiMeasurementModifier::Maximum.into(), true)
            .unwrap();
        assert_eq!(measurement.sub_template().count_nodes(false), 3);

        let tree = measurement.sub_template().tree();
        let derivation = tree
            .nodes()
            .find(|(_, _, item)| item.concept_name() == &dcm::DERIVATION)
            .and_then(|(_, _, item)| item.code_value().cloned());
        assert_eq!(derivation.as_ref().map(CodedEntry::code_meaning), Some("Maximum"));
    }

    #[test]
    fn test_derivation_parameters_keep_order() {
        let mut measurement = measurement();
        let first = NumericMeasurement::new("1", ucum::MILLIMETER);
        let second = NumericMeasurement::new("2", ucum::MILLIMETER);
        measurement
            .add_derivation_parameter(&dcm::TRACKING_IDENTIFIER, &first, true)
            .unwrap();
        measurement
            .add_derivation_parameter(&dcm::TRACKING_IDENTIFIER, &second, true)
            .unwrap();

        let values: Vec<&str> = measurement
            .sub_template()
            .tree()
            .nodes()
            .filter(|(level, _, _)| *level == 2)
            .filter_map(|(_, _, item)| item.numeric_value())
            .map(|num| num.value.as_str())
            .collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn test_algorithm_identification_is_shared() {
        let mut measurement = measurement();
        assert!(matches!(
            measurement.set_algorithm_identification("", "1", true),
            Err(CmrError::InvalidValue)
        ));
        measurement
            .set_algorithm_identification("Volumetry", "2.1", true)
            .unwrap();
        assert_eq!(measurement.sub_template().count_nodes(false), 2);
        assert_eq!(measurement.sub_template().count_nodes(true), 4);
        assert_eq!(
            measurement.algorithm_identification().borrow().algorithm_name(),
            Some("Volumetry")
        );

        Template::clear(&mut measurement);
        assert!(measurement.is_empty());
        assert!(measurement.algorithm_identification().borrow().is_empty());
    }

    #[test]
    fn test_equivalent_meaning() {
        let mut measurement = measurement();
        measurement
            .set_equivalent_meaning_of_concept_name("Tumor volume", true)
            .unwrap();
        measurement
            .set_equivalent_meaning_of_concept_name("Lesion volume", true)
            .unwrap();
        assert_eq!(measurement.sub_template().count_nodes(false), 3);
        assert!(measurement.is_valid());
    }

    #[test]
    fn test_borrowed_algorithm_keeps_measurement() {
        let mut measurement = measurement();
        measurement
            .set_algorithm_identification("Volumetry", "2.1", true)
            .unwrap();
        let algorithm = Rc::clone(measurement.algorithm_identification());
        let guard = algorithm.borrow();

        let length = NumericMeasurement::new("4", ucum::MILLIMETER);
        let result =
            measurement.create_new_measurement(&IntensityAndSizeMeasurement::Length.into(), &length, true);
        assert!(matches!(result, Err(CmrError::InvalidTemplateStructure)));
        assert_eq!(guard.algorithm_name(), Some("Volumetry"));
        drop(guard);

        assert!(measurement.is_valid());
        assert_eq!(measurement.sub_template().count_nodes(false), 2);
        assert_eq!(
            measurement.measurement().and_then(ContentItem::numeric_value),
            Some(&volume())
        );
    }

    #[test]
    fn test_real_world_value_map() {
        let mut measurement = measurement();
        let ct = CompositeReference::new("1.2.840.10008.5.1.4.1.1.2", "1.2.3.4");
        assert!(matches!(
            measurement.set_real_world_value_map(&ct, true),
            Err(CmrError::InvalidRealWorldValueMappingObject)
        ));

        let dataset = MemoryDataset::new()
            .with_str(tags::SOP_CLASS_UID, REAL_WORLD_VALUE_MAPPING_STORAGE_UID)
            .with_str(tags::SOP_INSTANCE_UID, "1.2.3.4.5");
        measurement
            .set_real_world_value_map_from_dataset(&dataset, true)
            .unwrap();
        let map = CompositeReference::new(REAL_WORLD_VALUE_MAPPING_STORAGE_UID, "1.2.3.4.6");
        measurement.set_real_world_value_map(&map, true).unwrap();
        assert_eq!(measurement.sub_template().count_nodes(false), 3);

        let tree = measurement.sub_template().tree();
        let stored = tree
            .nodes()
            .find_map(|(_, _, item)| item.composite_reference().cloned());
        assert_eq!(stored, Some(map));

        let mut empty = RoiMeasurement::new();
        assert!(matches!(
            empty.set_real_world_value_map_from_dataset(&dataset, true),
            Err(CmrError::NoMeasurement)
        ));
    }

    #[test]
    fn test_validity_after_measurement_row_changes() {
        let mut measurement = measurement();
        let id = measurement.sub_template().slot(MEASUREMENT).unwrap();
        let mut text = ContentItem::new(RelationshipType::Unknown, ValueType::Text, dcm::FINDING);
        text.set_string_value("12.5 mm3", true).unwrap();
        if let Some(item) = measurement.sub_template_mut().tree_mut().item_mut(id) {
            *item = text;
        }
        assert!(!measurement.has_measurement());
        assert!(!measurement.is_valid());

        let mut measurement = self::measurement();
        let tree = measurement.sub_template_mut().tree_mut();
        tree.goto_root();
        tree.remove_current_content_item();
        assert!(measurement.is_empty());
        assert!(!measurement.is_valid());
        assert!(matches!(
            measurement.set_equivalent_meaning_of_concept_name("Volume", true),
            Err(CmrError::NoMeasurement)
        ));
    }
}
