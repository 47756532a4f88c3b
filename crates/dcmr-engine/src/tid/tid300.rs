//! TID 300 Measurement.

use std::marker::PhantomData;

use dcmr_types::codes::{dcm, sct};
use dcmr_types::{
    AddMode, CodedEntry, CompositeReference, ImageReference, NodeId, NumericMeasurement,
    RelationshipType, SpatialCoordinates, ValueType,
};
use tracing::{debug, warn};

use super::{
    add_row, build_item, composite_reference_of, finding_site_rows, selected_entry, set_row, Row,
    RowValue,
};
use crate::cid::{
    ImageModelUnit, IntensityAndSizeMeasurement, Laterality, ResponseCriterion,
    RoiMeasurementModifier,
};
use crate::context_group::ContextGroup;
use crate::dataset::{tags, Dataset};
use crate::template::{SubTemplate, Template};
use crate::tree::{ContentItem, ContentTree};
use crate::types::{CmrError, CmrResult};
use crate::vocabulary::Vocabulary;

const MEASUREMENT: usize = 0;
const LAST_MODIFIER: usize = 1;
const MEASUREMENT_METHOD: usize = 2;
const DERIVATION: usize = 3;
const LAST_FINDING_SITE: usize = 4;
const LAST_DERIVATION_PARAMETER: usize = 5;
const LAST_IMAGE_OR_SCOORD: usize = 6;
const EQUIVALENT_MEANING: usize = 7;
const REAL_WORLD_VALUE_MAP: usize = 8;
const NUMBER_OF_SLOTS: usize = 9;

/// Measurement (TID 300).
///
/// A single numeric measurement with its modifiers and the images or
/// spatial coordinates it was inferred from. Rows are kept in row order;
/// the first instance of a row without an earlier row before it is
/// appended below the measurement.
#[derive(Debug, Clone)]
pub struct Tid300Measurement<M, U, Me, D> {
    template: SubTemplate,
    vocabularies: PhantomData<(M, U, Me, D)>,
}

/// Measurement with the generic intensity and size vocabularies.
pub type Measurement = Tid300Measurement<
    IntensityAndSizeMeasurement,
    ImageModelUnit,
    ResponseCriterion,
    RoiMeasurementModifier,
>;

impl<M, U, Me, D> Default for Tid300Measurement<M, U, Me, D>
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

impl<M, U, Me, D> Tid300Measurement<M, U, Me, D>
where
    M: Vocabulary,
    U: Vocabulary,
    Me: Vocabulary,
    D: Vocabulary,
{
    pub fn new() -> Self {
        Self {
            template: SubTemplate::new("300", true, true).with_slots(NUMBER_OF_SLOTS),
            vocabularies: PhantomData,
        }
    }

    /// Returns true if the measurement (Row 1) exists.
    pub fn has_measurement(&self) -> bool {
        self.template.slot_has_value_type(MEASUREMENT, ValueType::Num)
    }

    pub fn measurement(&self) -> Option<&ContentItem> {
        self.template.tree().item(self.template.slot(MEASUREMENT)?)
    }

    /// Clears the template and creates the measurement (Row 1).
    ///
    /// # Errors
    /// `InvalidValue` if no concept is selected or the value is incomplete;
    /// `ValueSetConstraintViolated` if `check` is set and the unit is not a
    /// member of `U`. The current content is kept on error.
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
            Row::new(RelationshipType::Unknown, &concept, "TID 300 - Row 1"),
            RowValue::Num(value.clone()),
            check,
        )?;

        let mut template = self.template.clone();
        template.clear();
        let id = template.tree_mut().add_item(item, AddMode::AfterCurrent)?;
        template.store(MEASUREMENT, Some(id));
        self.template = template;
        Ok(())
    }

    /// Adds a concept name modifier (Row 2).
    pub fn add_modifier(&mut self, concept: &CodedEntry, modifier: &CodedEntry, check: bool) -> CmrResult<()> {
        if !concept.is_complete() || !modifier.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        let item = build_item(
            Row::new(RelationshipType::HasConceptMod, concept, "TID 300 - Row 2"),
            RowValue::Code(modifier.clone()),
            check,
        )?;
        self.add_repeated(LAST_MODIFIER, item)?;
        Ok(())
    }

    /// Sets the measurement method (Row 3).
    pub fn set_measurement_method(&mut self, method: &ContextGroup<Me>, check: bool) -> CmrResult<()> {
        if !method.has_selected_value() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        set_row(
            &mut self.template,
            MEASUREMENT_METHOD,
            MEASUREMENT,
            Row::new(RelationshipType::HasConceptMod, &sct::MEASUREMENT_METHOD, "TID 300 - Row 3"),
            RowValue::Code(selected_entry(method, true, check)?),
            check,
        )?;
        Ok(())
    }

    /// Sets the derivation (Row 4).
    pub fn set_derivation(&mut self, derivation: &ContextGroup<D>, check: bool) -> CmrResult<()> {
        if !derivation.has_selected_value() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        set_row(
            &mut self.template,
            DERIVATION,
            MEASUREMENT,
            Row::new(RelationshipType::HasConceptMod, &dcm::DERIVATION, "TID 300 - Row 4"),
            RowValue::Code(selected_entry(derivation, true, check)?),
            check,
        )?;
        Ok(())
    }

    /// Adds a finding site (Row 5) with optional laterality (Row 6) and
    /// topographical modifier (Row 7) below it.
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
            ["TID 300 - Row 5", "TID 300 - Row 6", "TID 300 - Row 7"],
            check,
        )?;
        self.insert_repeated(LAST_FINDING_SITE, &mut rows)?;
        Ok(())
    }

    /// Adds a derivation parameter (Row 9).
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
            Row::new(RelationshipType::InferredFrom, concept, "TID 300 - Row 9"),
            RowValue::Num(value.clone()),
            check,
        )?;
        self.add_repeated(LAST_DERIVATION_PARAMETER, item)?;
        Ok(())
    }

    /// Adds an image the measurement was inferred from (TID 320 Row 1).
    pub fn add_image(&mut self, concept: &CodedEntry, image: &ImageReference, check: bool) -> CmrResult<()> {
        if !concept.is_complete() || !image.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        let item = build_item(
            Row::new(RelationshipType::InferredFrom, concept, "TID 320 - Row 1"),
            RowValue::Image(image.clone()),
            check,
        )?;
        self.add_repeated(LAST_IMAGE_OR_SCOORD, item)?;
        Ok(())
    }

    /// Adds the image (TID 320 Row 1) described by the SOP class and
    /// instance UIDs of a dataset.
    pub fn add_image_from_dataset(
        &mut self,
        concept: &CodedEntry,
        dataset: &dyn Dataset,
        check: bool,
    ) -> CmrResult<()> {
        let image = ImageReference::new(
            dataset.string_value(tags::SOP_CLASS_UID, 0).unwrap_or_default(),
            dataset.string_value(tags::SOP_INSTANCE_UID, 0).unwrap_or_default(),
        );
        self.add_image(concept, &image, check)
    }

    /// Adds spatial coordinates (TID 320 Row 3) with the image they were
    /// selected from (TID 320 Row 4) below them.
    pub fn add_spatial_coordinates(
        &mut self,
        concept: &CodedEntry,
        coordinates: &SpatialCoordinates,
        image: &ImageReference,
        check: bool,
    ) -> CmrResult<()> {
        if !concept.is_complete() || !coordinates.is_complete() || !image.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        self.require_measurement()?;
        let mut rows = ContentTree::new();
        add_row(
            &mut rows,
            AddMode::AfterCurrent,
            Row::new(RelationshipType::InferredFrom, concept, "TID 320 - Row 3"),
            RowValue::SCoord(coordinates.clone()),
            check,
        )?;
        let no_concept = CodedEntry::empty();
        add_row(
            &mut rows,
            AddMode::BelowCurrent,
            Row::new(RelationshipType::SelectedFrom, &no_concept, "TID 320 - Row 4"),
            RowValue::Image(image.clone()),
            check,
        )?;
        self.insert_repeated(LAST_IMAGE_OR_SCOORD, &mut rows)?;
        Ok(())
    }

    /// Sets the equivalent meaning of the concept name (Row 16).
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
                "TID 300 - Row 16",
            ),
            RowValue::text(meaning),
            check,
        )?;
        Ok(())
    }

    /// Sets the real world value map used for the measurement (Row 18).
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
            warn!(row = "TID 300 - Row 18", "cannot set real world value map, wrong SOP class");
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
                "TID 300 - Row 18",
            ),
            RowValue::Composite(value_map.clone()),
            check,
        )?;
        Ok(())
    }

    pub fn set_real_world_value_map_from_dataset(&mut self, dataset: &dyn Dataset, check: bool) -> CmrResult<()> {
        self.set_real_world_value_map(&composite_reference_of(dataset), check)
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

    /// Splices detached rows in; the slot keeps their first top-level node.
    fn insert_repeated(&mut self, slot: usize, rows: &mut ContentTree) -> CmrResult<()> {
        let first = rows.roots().first().copied();
        let mode = self.template.position_for_row(slot, MEASUREMENT)?;
        self.template
            .tree_mut()
            .insert_sub_tree(rows, mode, RelationshipType::InferredFrom)?;
        self.template.store(slot, first);
        Ok(())
    }
}

impl<M, U, Me, D> Template for Tid300Measurement<M, U, Me, D>
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MemoryDataset;
    use dcmr_types::codes::ucum;
    use dcmr_types::{GraphicType, REAL_WORLD_VALUE_MAPPING_STORAGE_UID};

    const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";

    fn volume() -> NumericMeasurement {
        NumericMeasurement::new("12.5", ucum::CUBIC_MILLIMETER)
    }

    fn measurement() -> Measurement {
        let mut measurement = Measurement::new();
        measurement
            .create_new_measurement(&IntensityAndSizeMeasurement::Volume.into(), &volume(), true)
            .unwrap();
        measurement
    }

    fn image() -> ImageReference {
        ImageReference::new(CT_IMAGE_STORAGE, "1.2.3.4")
    }

    fn circle() -> SpatialCoordinates {
        SpatialCoordinates::new(GraphicType::Circle, vec![(10.0, 10.0), (12.5, 10.0)])
    }

    fn concepts(measurement: &Measurement) -> Vec<(usize, String)> {
        measurement
            .sub_template()
            .tree()
            .nodes()
            .map(|(level, _, item)| (level, item.concept_name().code_meaning().to_string()))
            .collect()
    }

    #[test]
    fn test_create_new_measurement() {
        let mut measurement = Measurement::new();
        assert!(!measurement.is_valid());
        assert!(matches!(
            measurement.add_image(&dcm::SOURCE_OF_MEASUREMENT, &image(), true),
            Err(CmrError::NoMeasurement)
        ));

        measurement
            .create_new_measurement(&IntensityAndSizeMeasurement::Volume.into(), &volume(), true)
            .unwrap();
        measurement
            .set_equivalent_meaning_of_concept_name("Tumor volume", true)
            .unwrap();
        assert!(measurement.is_valid());
        assert_eq!(measurement.sub_template().count_nodes(false), 2);

        let length = NumericMeasurement::new("4", ucum::MILLIMETER);
        measurement
            .create_new_measurement(&IntensityAndSizeMeasurement::Length.into(), &length, true)
            .unwrap();
        assert_eq!(measurement.sub_template().count_nodes(false), 1);
        assert_eq!(
            measurement.measurement().and_then(ContentItem::numeric_value),
            Some(&length)
        );
    }

    #[test]
    fn test_failed_create_keeps_content() {
        let mut measurement = measurement();
        let value = NumericMeasurement::new("3", CodedEntry::new("furlong", "UCUM", "furlong"));
        let result =
            measurement.create_new_measurement(&IntensityAndSizeMeasurement::Length.into(), &value, true);
        assert!(matches!(result, Err(CmrError::ValueSetConstraintViolated)));
        assert!(measurement.is_valid());
        assert_eq!(
            measurement.measurement().and_then(ContentItem::numeric_value),
            Some(&volume())
        );
    }

    #[test]
    fn test_rows_follow_row_order() {
        let mut measurement = measurement();
        measurement
            .add_modifier(&dcm::FINDING, &CodedEntry::new("T-D0010", "SRT", "Entire body"), true)
            .unwrap();
        measurement
            .set_measurement_method(&ResponseCriterion::Recist11.into(), true)
            .unwrap();
        measurement
            .set_derivation(&RoiMeasurementModifier::Mean.into(), true)
            .unwrap();
        measurement
            .add_finding_site(
                &CodedEntry::new("T-28000", "SRT", "Lung"),
                &Laterality::Left.into(),
                &CodedEntry::empty(),
                true,
            )
            .unwrap();
        measurement
            .add_image(&dcm::SOURCE_OF_MEASUREMENT, &image(), true)
            .unwrap();
        measurement
            .add_spatial_coordinates(&dcm::SOURCE_OF_MEASUREMENT, &circle(), &image(), true)
            .unwrap();
        // earlier slot, inserted before the images
        measurement
            .add_derivation_parameter(
                &CodedEntry::new("112031", "DCM", "Attenuation Coefficient"),
                &NumericMeasurement::new("0.2", ucum::MILLIMETER),
                true,
            )
            .unwrap();
        measurement
            .set_equivalent_meaning_of_concept_name("Tumor volume", true)
            .unwrap();

        assert_eq!(
            concepts(&measurement),
            vec![
                (1, "Volume".to_string()),
                (2, "Finding".to_string()),
                (2, "Measurement Method".to_string()),
                (2, "Derivation".to_string()),
                (2, "Finding Site".to_string()),
                (3, "Laterality".to_string()),
                (2, "Attenuation Coefficient".to_string()),
                (2, "Source of Measurement".to_string()),
                (2, "Source of Measurement".to_string()),
                (3, String::new()),
                (2, "Equivalent Meaning of Concept Name".to_string()),
            ]
        );
        assert!(measurement.is_valid());
    }

    #[test]
    fn test_spatial_coordinates_select_image() {
        let mut measurement = measurement();
        measurement
            .add_spatial_coordinates(&dcm::SOURCE_OF_MEASUREMENT, &circle(), &image(), true)
            .unwrap();

        let tree = measurement.sub_template().tree();
        let scoord = measurement.sub_template().slot(LAST_IMAGE_OR_SCOORD).unwrap();
        assert_eq!(
            tree.item(scoord).and_then(ContentItem::spatial_coordinates),
            Some(&circle())
        );
        let child = tree.children(scoord)[0];
        let selected = tree.item(child).unwrap();
        assert_eq!(selected.relationship_type(), RelationshipType::SelectedFrom);
        assert!(selected.concept_name().is_empty());
        assert_eq!(selected.image_reference(), Some(&image()));

        let open = SpatialCoordinates::new(GraphicType::Circle, vec![(1.0, 1.0)]);
        assert!(matches!(
            measurement.add_spatial_coordinates(&dcm::SOURCE_OF_MEASUREMENT, &open, &image(), true),
            Err(CmrError::InvalidValue)
        ));
        assert_eq!(measurement.sub_template().count_nodes(false), 3);
    }

    #[test]
    fn test_image_from_dataset() {
        let mut measurement = measurement();
        let dataset = MemoryDataset::new()
            .with_str(tags::SOP_CLASS_UID, CT_IMAGE_STORAGE)
            .with_str(tags::SOP_INSTANCE_UID, "1.2.3.4");
        measurement
            .add_image_from_dataset(&dcm::SOURCE_OF_MEASUREMENT, &dataset, true)
            .unwrap();
        let id = measurement.sub_template().slot(LAST_IMAGE_OR_SCOORD).unwrap();
        let item = measurement.sub_template().tree().item(id).unwrap();
        assert_eq!(item.image_reference(), Some(&image()));
        assert_eq!(item.annotation(), Some("TID 320 - Row 1"));

        assert!(matches!(
            measurement.add_image_from_dataset(&dcm::SOURCE_OF_MEASUREMENT, &MemoryDataset::new(), true),
            Err(CmrError::InvalidValue)
        ));
    }

    #[test]
    fn test_real_world_value_map_is_replaced() {
        let mut measurement = measurement();
        let ct = CompositeReference::new(CT_IMAGE_STORAGE, "1.2.3.4");
        assert!(matches!(
            measurement.set_real_world_value_map(&ct, true),
            Err(CmrError::InvalidRealWorldValueMappingObject)
        ));

        let first = CompositeReference::new(REAL_WORLD_VALUE_MAPPING_STORAGE_UID, "1.2.3.4.5");
        let second = CompositeReference::new(REAL_WORLD_VALUE_MAPPING_STORAGE_UID, "1.2.3.4.6");
        measurement.set_real_world_value_map(&first, true).unwrap();
        measurement.set_real_world_value_map(&second, true).unwrap();
        assert_eq!(measurement.sub_template().count_nodes(false), 2);
        let stored = measurement
            .sub_template()
            .tree()
            .nodes()
            .find_map(|(_, _, item)| item.composite_reference().cloned());
        assert_eq!(stored, Some(second));
    }

    #[test]
    fn test_validity_after_measurement_is_removed() {
        let mut measurement = measurement();
        let tree = measurement.sub_template_mut().tree_mut();
        tree.goto_root();
        tree.remove_current_content_item();
        assert!(!measurement.has_measurement());
        assert!(!measurement.is_valid());
        assert!(matches!(
            measurement.add_modifier(&dcm::FINDING, &dcm::FINDING, true),
            Err(CmrError::NoMeasurement)
        ));
    }
}
