//! TID 1501 Measurement and Qualitative Evaluation Group.

use std::cell::RefCell;
use std::rc::Rc;

use dcmr_types::codes::{dcm, ncit, sct, umls};
use dcmr_types::{
    AddMode, CodedEntry, CompositeReference, NodeId, NumericMeasurement, RelationshipType,
    ValueType,
};
use tracing::{debug, warn};

use super::tid300::Tid300Measurement;
use super::{
    add_row, build_item, composite_reference_of, finding_site_rows, selected_entry, set_row, Row,
    RowValue,
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

const MEASUREMENT_GROUP: usize = 0;
const ACTIVITY_SESSION: usize = 1;
const TRACKING_IDENTIFIER: usize = 2;
const TRACKING_UNIQUE_IDENTIFIER: usize = 3;
const FINDING: usize = 4;
const TIME_POINT: usize = 5;
const MEASUREMENT_METHOD: usize = 6;
const LAST_FINDING_SITE: usize = 7;
const REAL_WORLD_VALUE_MAP: usize = 8;
const LAST_MEASUREMENT: usize = 9;
const LAST_QUALITATIVE_EVALUATION: usize = 10;
const NUMBER_OF_SLOTS: usize = 11;

/// Measurement and Qualitative Evaluation Group (TID 1501).
///
/// Like the volumetric group of TID 1411 but without a segmentation
/// reference; each measurement is an included TID 300.
#[derive(Debug, Clone)]
pub struct Tid1501MeasurementGroup<M, U, Me, D> {
    template: SubTemplate,
    measurement: Rc<RefCell<Tid300Measurement<M, U, Me, D>>>,
}

pub type MeasurementGroup = Tid1501MeasurementGroup<
    IntensityAndSizeMeasurement,
    ImageModelUnit,
    ResponseCriterion,
    RoiMeasurementModifier,
>;

impl<M, U, Me, D> Default for Tid1501MeasurementGroup<M, U, Me, D>
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

impl<M, U, Me, D> Tid1501MeasurementGroup<M, U, Me, D>
where
    M: Vocabulary,
    U: Vocabulary,
    Me: Vocabulary,
    D: Vocabulary,
{
    /// Creates an empty template; the measurement group is created on the
    /// first setter call.
    pub fn new() -> Self {
        Self {
            template: SubTemplate::new("1501", true, false).with_slots(NUMBER_OF_SLOTS),
            measurement: Rc::new(RefCell::new(Tid300Measurement::new())),
        }
    }

    /// Shared handle to the most recently added measurement.
    pub fn measurement(&self) -> &Rc<RefCell<Tid300Measurement<M, U, Me, D>>> {
        &self.measurement
    }

    pub fn has_measurement_group(&self) -> bool {
        self.template.slot_has_value_type(MEASUREMENT_GROUP, ValueType::Container)
    }

    pub fn has_tracking_identifier(&self) -> bool {
        self.template.slot_has_value_type(TRACKING_IDENTIFIER, ValueType::Text)
    }

    pub fn has_tracking_unique_identifier(&self) -> bool {
        self.template.slot_has_value_type(TRACKING_UNIQUE_IDENTIFIER, ValueType::UidRef)
    }

    /// Returns true if at least one included measurement is non-empty.
    pub fn has_measurements(&self) -> bool {
        let Some(group) = self.template.slot(MEASUREMENT_GROUP) else {
            return false;
        };
        let tree = self.template.tree();
        tree.children(group)
            .iter()
            .filter_map(|&id| tree.item(id)?.included_template())
            .filter_map(|template| template.try_borrow().ok())
            .any(|template| {
                template.sub_template().compare_identification("300", "DCMR") && !template.is_empty()
            })
    }

    /// Creates the measurement group (Row 1) with the included measurement
    /// (Row 10) below it.
    ///
    /// # Errors
    /// `InvalidTemplateStructure` if the template is not empty.
    pub fn create_measurement_group(&mut self) -> CmrResult<()> {
        if !self.template.is_empty() {
            return Err(CmrError::InvalidTemplateStructure);
        }
        let concept = dcm::MEASUREMENT_GROUP;
        let group = add_row(
            self.template.tree_mut(),
            AddMode::AfterCurrent,
            Row::new(RelationshipType::Unknown, &concept, "TID 1501 - Row 1"),
            RowValue::Container,
            false,
        )?;
        self.template.store(MEASUREMENT_GROUP, Some(group));
        let shared: SharedSubTemplate = self.measurement.clone();
        let include = self
            .template
            .include_template(shared, AddMode::BelowCurrent, RelationshipType::Contains)?;
        self.annotate(include, "TID 1501 - Row 10");
        self.template.store(LAST_MEASUREMENT, Some(include));
        Ok(())
    }

    /// Sets the activity session (Row 1b).
    pub fn set_activity_session(&mut self, session: &str, check: bool) -> CmrResult<()> {
        if session.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        self.set_group_row(
            ACTIVITY_SESSION,
            Row::new(RelationshipType::HasObsContext, &ncit::ACTIVITY_SESSION, "TID 1501 - Row 1b"),
            RowValue::text(session),
            check,
        )
    }

    /// Sets the tracking identifier (Row 2).
    pub fn set_tracking_identifier(&mut self, tracking_id: &str, check: bool) -> CmrResult<()> {
        if tracking_id.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        self.set_group_row(
            TRACKING_IDENTIFIER,
            Row::new(RelationshipType::HasObsContext, &dcm::TRACKING_IDENTIFIER, "TID 1501 - Row 2"),
            RowValue::text(tracking_id),
            check,
        )
    }

    /// Sets the tracking unique identifier (Row 3).
    pub fn set_tracking_unique_identifier(&mut self, tracking_uid: &str, check: bool) -> CmrResult<()> {
        if tracking_uid.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        self.set_group_row(
            TRACKING_UNIQUE_IDENTIFIER,
            Row::new(
                RelationshipType::HasObsContext,
                &dcm::TRACKING_UNIQUE_IDENTIFIER,
                "TID 1501 - Row 3",
            ),
            RowValue::Text(ValueType::UidRef, tracking_uid.to_string()),
            check,
        )
    }

    /// Sets the finding (Row 3b).
    pub fn set_finding(&mut self, finding: &CodedEntry, check: bool) -> CmrResult<()> {
        if !finding.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        self.set_group_row(
            FINDING,
            Row::new(RelationshipType::Contains, &dcm::FINDING, "TID 1501 - Row 3b"),
            RowValue::Code(finding.clone()),
            check,
        )
    }

    /// Sets the time point (TID 1502 Row 3).
    pub fn set_time_point(&mut self, time_point: &str, check: bool) -> CmrResult<()> {
        if time_point.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        self.set_group_row(
            TIME_POINT,
            Row::new(RelationshipType::HasObsContext, &umls::TIME_POINT, "TID 1502 - Row 3"),
            RowValue::text(time_point),
            check,
        )
    }

    /// Sets the measurement method (Row 5).
    pub fn set_measurement_method(&mut self, method: &ContextGroup<Me>, check: bool) -> CmrResult<()> {
        if !method.has_selected_value() {
            return Err(CmrError::InvalidValue);
        }
        self.set_group_row(
            MEASUREMENT_METHOD,
            Row::new(RelationshipType::HasConceptMod, &sct::MEASUREMENT_METHOD, "TID 1501 - Row 5"),
            RowValue::Code(selected_entry(method, true, check)?),
            check,
        )
    }

    /// Adds a finding site (Row 6) with optional laterality (Row 7) and
    /// topographical modifier (Row 8) below it.
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
        let mut rows = finding_site_rows(
            site,
            laterality,
            site_modifier,
            ["TID 1501 - Row 6", "TID 1501 - Row 7", "TID 1501 - Row 8"],
            check,
        )?;
        let site_id = rows.roots().first().copied().ok_or(CmrError::InvalidTemplateStructure)?;

        self.ensure_measurement_group()?;
        let mode = self.template.position_for_row(LAST_FINDING_SITE, MEASUREMENT_GROUP)?;
        self.template
            .tree_mut()
            .insert_sub_tree(&mut rows, mode, RelationshipType::HasConceptMod)?;
        self.template.store(LAST_FINDING_SITE, Some(site_id));
        Ok(())
    }

    /// Sets the real world value map used for the group (Row 9).
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
            warn!(row = "TID 1501 - Row 9", "cannot set real world value map, wrong SOP class");
            debug!(
                sop_class_uid = value_map.sop_class_uid.as_str(),
                "not the SOP class of a real world value mapping object"
            );
            return Err(CmrError::InvalidRealWorldValueMappingObject);
        }
        let concept = dcm::REAL_WORLD_VALUE_MAP_USED_FOR_MEASUREMENT;
        self.set_group_row(
            REAL_WORLD_VALUE_MAP,
            Row::new(RelationshipType::Contains, &concept, "TID 1501 - Row 9"),
            RowValue::Composite(value_map.clone()),
            check,
        )
    }

    pub fn set_real_world_value_map_from_dataset(&mut self, dataset: &dyn Dataset, check: bool) -> CmrResult<()> {
        self.set_real_world_value_map(&composite_reference_of(dataset), check)
    }

    /// Adds a measurement (Row 10).
    ///
    /// With `check_empty`, an empty current measurement is filled instead of
    /// including a new one.
    ///
    /// # Errors
    /// `InvalidValue` if no concept is selected or the value is incomplete;
    /// the errors of [`Tid300Measurement::create_new_measurement`].
    pub fn add_measurement(
        &mut self,
        concept: &ContextGroup<M>,
        value: &NumericMeasurement,
        check_empty: bool,
        check: bool,
    ) -> CmrResult<()> {
        if !concept.has_selected_value() || !value.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        let mut measurement = Tid300Measurement::<M, U, Me, D>::new();
        measurement.create_new_measurement(concept, value, check)?;

        self.ensure_measurement_group()?;
        self.template
            .goto_slot(LAST_MEASUREMENT)
            .ok_or(CmrError::NoMeasurementGroup)?;
        let current_is_empty = self
            .measurement
            .try_borrow()
            .map(|current| current.is_empty())
            .unwrap_or(false);
        if check_empty && current_is_empty {
            let mut current = self
                .measurement
                .try_borrow_mut()
                .map_err(|_| CmrError::InvalidTemplateStructure)?;
            *current = measurement;
            return Ok(());
        }

        let measurement = Rc::new(RefCell::new(measurement));
        let shared: SharedSubTemplate = measurement.clone();
        let include = self
            .template
            .include_template(shared, AddMode::AfterCurrent, RelationshipType::Contains)?;
        self.annotate(include, "TID 1501 - Row 10");
        self.template.store(LAST_MEASUREMENT, Some(include));
        self.measurement = measurement;
        Ok(())
    }

    /// Adds a coded qualitative evaluation (Row 11).
    pub fn add_qualitative_evaluation(
        &mut self,
        concept: &CodedEntry,
        value: &CodedEntry,
        check: bool,
    ) -> CmrResult<()> {
        if !concept.is_complete() || !value.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        let item = build_item(
            Row::new(RelationshipType::Contains, concept, "TID 1501 - Row 11"),
            RowValue::Code(value.clone()),
            check,
        )?;
        self.add_qualitative(item)
    }

    /// Adds a textual qualitative evaluation (Row 12).
    pub fn add_qualitative_evaluation_text(
        &mut self,
        concept: &CodedEntry,
        value: &str,
        check: bool,
    ) -> CmrResult<()> {
        if !concept.is_complete() || value.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        let item = build_item(
            Row::new(RelationshipType::Contains, concept, "TID 1501 - Row 12"),
            RowValue::text(value),
            check,
        )?;
        self.add_qualitative(item)
    }

    fn add_qualitative(&mut self, item: ContentItem) -> CmrResult<()> {
        self.ensure_measurement_group()?;
        let mode = self
            .template
            .position_for_row(LAST_QUALITATIVE_EVALUATION, MEASUREMENT_GROUP)?;
        let id = self.template.tree_mut().add_item(item, mode)?;
        self.template.store(LAST_QUALITATIVE_EVALUATION, Some(id));
        Ok(())
    }

    fn ensure_measurement_group(&mut self) -> CmrResult<()> {
        if self.has_measurement_group() {
            Ok(())
        } else {
            self.create_measurement_group()
        }
    }

    fn set_group_row(&mut self, slot: usize, row: Row<'_>, value: RowValue, check: bool) -> CmrResult<()> {
        if !self.has_measurement_group() {
            build_item(row, value.clone(), check)?;
            self.create_measurement_group()?;
        }
        set_row(&mut self.template, slot, MEASUREMENT_GROUP, row, value, check)?;
        Ok(())
    }

    fn annotate(&mut self, id: NodeId, annotation: &str) {
        if let Some(item) = self.template.tree_mut().item_mut(id) {
            item.set_annotation(annotation);
        }
    }
}

impl<M, U, Me, D> Template for Tid1501MeasurementGroup<M, U, Me, D>
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
        self.template.is_valid()
            && self.has_measurement_group()
            && self.has_tracking_identifier()
            && self.has_tracking_unique_identifier()
            && self.has_measurements()
    }

    fn clear(&mut self) {
        self.template.clear();
        if let Ok(mut measurement) = self.measurement.try_borrow_mut() {
            Template::clear(&mut *measurement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{tags, MemoryDataset};
    use crate::tid::init_test_logging;
    use dcmr_types::codes::ucum;
    use dcmr_types::REAL_WORLD_VALUE_MAPPING_STORAGE_UID;

    fn volume(value: &str) -> NumericMeasurement {
        NumericMeasurement::new(value, ucum::CUBIC_MILLIMETER)
    }

    fn tracked_group() -> MeasurementGroup {
        let mut group = MeasurementGroup::new();
        group.set_tracking_identifier("lesion 1", true).unwrap();
        group
            .set_tracking_unique_identifier("1.2.3.4.5.6.7", true)
            .unwrap();
        group
    }

    #[test]
    fn test_validity_requires_measurement() {
        init_test_logging();
        let mut group = tracked_group();
        assert!(group.has_measurement_group());
        assert!(!group.has_measurements());
        assert!(!group.is_valid());

        group
            .add_measurement(&IntensityAndSizeMeasurement::Volume.into(), &volume("1200"), true, true)
            .unwrap();
        assert!(group.is_valid());
        // group, two rows, one include
        assert_eq!(group.sub_template().count_nodes(false), 4);
        assert_eq!(group.sub_template().count_nodes(true), 5);
    }

    #[test]
    fn test_add_measurement_includes_new_instances() {
        let mut group = tracked_group();
        let concept: ContextGroup<_> = IntensityAndSizeMeasurement::Volume.into();
        group.add_measurement(&concept, &volume("1"), true, true).unwrap();
        let first = Rc::clone(group.measurement());
        group.add_measurement(&concept, &volume("2"), true, true).unwrap();
        assert!(!Rc::ptr_eq(&first, group.measurement()));
        assert_eq!(group.sub_template().count_nodes(false), 5);

        group
            .measurement()
            .borrow_mut()
            .set_equivalent_meaning_of_concept_name("Lesion volume", true)
            .unwrap();
        // two included measurements, the second with one extra row
        assert_eq!(group.sub_template().count_nodes(true), 5 + 1 + 2);
    }

    #[test]
    fn test_failed_setter_leaves_template_empty() {
        let mut group = MeasurementGroup::new();
        let result = group.set_tracking_unique_identifier("not a uid", true);
        assert!(matches!(result, Err(CmrError::InvalidValue)));
        assert!(group.is_empty());

        let ct = CompositeReference::new("1.2.840.10008.5.1.4.1.1.2", "1.2.3.4");
        assert!(matches!(
            group.set_real_world_value_map(&ct, true),
            Err(CmrError::InvalidRealWorldValueMappingObject)
        ));
        assert!(group.is_empty());
    }

    #[test]
    fn test_group_rows_in_row_order() {
        let mut group = tracked_group();
        group
            .add_qualitative_evaluation(
                &dcm::FINDING,
                &CodedEntry::new("M-80003", "SRT", "Neoplasm, Primary"),
                true,
            )
            .unwrap();
        group.set_time_point("baseline", true).unwrap();
        group.set_activity_session("1", true).unwrap();
        group
            .set_measurement_method(&ResponseCriterion::Recist11.into(), true)
            .unwrap();
        group
            .add_finding_site(
                &CodedEntry::new("T-62000", "SRT", "Liver"),
                &Laterality::Right.into(),
                &CodedEntry::empty(),
                true,
            )
            .unwrap();
        let dataset = MemoryDataset::new()
            .with_str(tags::SOP_CLASS_UID, REAL_WORLD_VALUE_MAPPING_STORAGE_UID)
            .with_str(tags::SOP_INSTANCE_UID, "1.2.3.4.5");
        group
            .set_real_world_value_map_from_dataset(&dataset, true)
            .unwrap();

        let tree = group.sub_template().tree();
        let group_id = tree.roots()[0];
        let children: Vec<&str> = tree
            .children(group_id)
            .iter()
            .filter_map(|&id| tree.item(id)?.annotation())
            .collect();
        assert_eq!(
            children,
            vec![
                "TID 1501 - Row 1b",
                "TID 1501 - Row 2",
                "TID 1501 - Row 3",
                "TID 1502 - Row 3",
                "TID 1501 - Row 5",
                "TID 1501 - Row 6",
                "TID 1501 - Row 9",
                "TID 1501 - Row 10",
                "TID 1501 - Row 11",
            ]
        );
    }

    #[test]
    fn test_validity_after_rows_are_removed() {
        let mut group = tracked_group();
        group
            .add_measurement(&IntensityAndSizeMeasurement::Volume.into(), &volume("5"), true, true)
            .unwrap();
        assert!(group.is_valid());

        let tracking_id = group.sub_template().slot(TRACKING_IDENTIFIER).unwrap();
        let tree = group.sub_template_mut().tree_mut();
        tree.goto_node(tracking_id);
        tree.remove_current_content_item();
        assert!(!group.has_tracking_identifier());
        assert!(!group.is_valid());

        group.set_tracking_identifier("lesion 2", true).unwrap();
        assert!(group.is_valid());
    }
}
