//! TID 1411 Volumetric ROI Measurements.

use std::cell::RefCell;
use std::rc::Rc;

use dcmr_types::codes::{dcm, ncit, sct, umls};
use dcmr_types::{
    AddMode, CodedEntry, ImageReference, NodeId, NumericMeasurement, RelationshipType, ValueType,
};
use tracing::{debug, warn};

use super::tid1419::Tid1419RoiMeasurement;
use super::{
    add_row, build_item, finding_site_rows, selected_entry, set_row, Row, RowValue,
};
use crate::cid::{
    ImageModelUnit, IntensityAndSizeMeasurement, Laterality, ResponseCriterion,
    RoiMeasurementModifier,
};
use crate::context_group::ContextGroup;
use crate::dataset::{tags, Dataset};
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
const REFERENCED_SEGMENT: usize = 6;
const SOURCE_SERIES_FOR_SEGMENTATION: usize = 7;
const MEASUREMENT_METHOD: usize = 8;
const LAST_FINDING_SITE: usize = 9;
const LAST_MEASUREMENT: usize = 10;
const LAST_QUALITATIVE_EVALUATION: usize = 11;
const NUMBER_OF_SLOTS: usize = 12;

/// Volumetric ROI Measurements (TID 1411).
///
/// The measurement group container holds the observation context rows and
/// one included ROI measurement (TID 1419) per measurement. The most
/// recently added measurement is also reachable through
/// [`measurement`](Self::measurement).
///
/// Setters create the measurement group when it does not exist yet.
#[derive(Debug, Clone)]
pub struct Tid1411VolumetricRoiMeasurements<M, U, Me, D> {
    template: SubTemplate,
    measurement: Rc<RefCell<Tid1419RoiMeasurement<M, U, Me, D>>>,
}

/// Volumetric ROI measurements with the generic intensity and size
/// vocabularies.
pub type VolumetricRoiMeasurements = Tid1411VolumetricRoiMeasurements<
    IntensityAndSizeMeasurement,
    ImageModelUnit,
    ResponseCriterion,
    RoiMeasurementModifier,
>;

impl<M, U, Me, D> Default for Tid1411VolumetricRoiMeasurements<M, U, Me, D>
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

impl<M, U, Me, D> Tid1411VolumetricRoiMeasurements<M, U, Me, D>
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
            template: SubTemplate::new("1411", true, false).with_slots(NUMBER_OF_SLOTS),
            measurement: Rc::new(RefCell::new(Tid1419RoiMeasurement::new())),
        }
    }

    /// Shared handle to the most recently added measurement.
    pub fn measurement(&self) -> &Rc<RefCell<Tid1419RoiMeasurement<M, U, Me, D>>> {
        &self.measurement
    }

    /// Returns true if the measurement group (Row 1) exists.
    pub fn has_measurement_group(&self) -> bool {
        self.template.slot_has_value_type(MEASUREMENT_GROUP, ValueType::Container)
    }

    /// Returns true if the tracking identifier (Row 2) exists.
    pub fn has_tracking_identifier(&self) -> bool {
        self.template.slot_has_value_type(TRACKING_IDENTIFIER, ValueType::Text)
    }

    /// Returns true if the tracking unique identifier (Row 3) exists.
    pub fn has_tracking_unique_identifier(&self) -> bool {
        self.template.slot_has_value_type(TRACKING_UNIQUE_IDENTIFIER, ValueType::UidRef)
    }

    /// Returns true if the referenced segment (Row 7) exists.
    pub fn has_referenced_segment(&self) -> bool {
        self.template.slot_has_value_type(REFERENCED_SEGMENT, ValueType::Image)
    }

    /// Returns true if the source series for segmentation (Row 12) exists.
    pub fn has_source_series_for_segmentation(&self) -> bool {
        self.template.slot_has_value_type(SOURCE_SERIES_FOR_SEGMENTATION, ValueType::UidRef)
    }

    /// Returns true if at least one included ROI measurement is non-empty.
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
                template.sub_template().compare_identification("1419", "DCMR") && !template.is_empty()
            })
    }

    /// Creates the measurement group (Row 1) with the included measurement
    /// (Row 15) below it.
    ///
    /// # Errors
    /// `InvalidTemplateStructure` if the template is not empty.
    pub fn create_measurement_group(&mut self) -> CmrResult<()> {
        if !self.template.is_empty() {
            return Err(CmrError::InvalidTemplateStructure);
        }
        let group = add_row(
            self.template.tree_mut(),
            AddMode::AfterCurrent,
            Row::new(RelationshipType::Unknown, &dcm::MEASUREMENT_GROUP, "TID 1411 - Row 1"),
            RowValue::Container,
            false,
        )?;
        self.template.store(MEASUREMENT_GROUP, Some(group));
        let shared: SharedSubTemplate = self.measurement.clone();
        let include = self
            .template
            .include_template(shared, AddMode::BelowCurrent, RelationshipType::Contains)?;
        self.annotate(include, "TID 1411 - Row 15");
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
            Row::new(RelationshipType::HasObsContext, &ncit::ACTIVITY_SESSION, "TID 1411 - Row 1b"),
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
            Row::new(RelationshipType::HasObsContext, &dcm::TRACKING_IDENTIFIER, "TID 1411 - Row 2"),
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
                "TID 1411 - Row 3",
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
            Row::new(RelationshipType::Contains, &dcm::FINDING, "TID 1411 - Row 3b"),
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

    /// Sets the referenced segment (Row 7).
    ///
    /// # Errors
    /// `InvalidValue` if the reference is incomplete;
    /// `InvalidSegmentationObject` unless it references a segmentation
    /// object with exactly one segment number.
    pub fn set_referenced_segment(&mut self, segment: &ImageReference, check: bool) -> CmrResult<()> {
        if !segment.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        if !segment.is_segmentation() {
            warn!(
                sop_class_uid = segment.sop_class_uid.as_str(),
                row = "TID 1411 - Row 7",
                "cannot set referenced segment, wrong SOP class"
            );
            return Err(CmrError::InvalidSegmentationObject);
        }
        if segment.segment_numbers.len() != 1 {
            warn!(
                segments = segment.segment_numbers.len(),
                row = "TID 1411 - Row 7",
                "cannot set referenced segment, wrong number of segments"
            );
            return Err(CmrError::InvalidSegmentationObject);
        }
        self.set_group_row(
            REFERENCED_SEGMENT,
            Row::new(RelationshipType::Contains, &dcm::REFERENCED_SEGMENT, "TID 1411 - Row 7"),
            RowValue::Image(segment.clone()),
            check,
        )
    }

    /// Sets the referenced segment (Row 7) from a segmentation dataset.
    ///
    /// With `copy_tracking`, tracking identifier and UID of the segment are
    /// copied from the segment sequence when both are present.
    pub fn set_referenced_segment_from_dataset(
        &mut self,
        dataset: &dyn Dataset,
        segment_number: u16,
        copy_tracking: bool,
        check: bool,
    ) -> CmrResult<()> {
        let mut segment = ImageReference::new(
            dataset.string_value(tags::SOP_CLASS_UID, 0).unwrap_or_default(),
            dataset.string_value(tags::SOP_INSTANCE_UID, 0).unwrap_or_default(),
        );
        segment.segment_numbers.push(segment_number);
        self.set_referenced_segment(&segment, check)?;
        if !copy_tracking {
            return Ok(());
        }

        let item = (0..dataset.sequence_len(tags::SEGMENT_SEQUENCE))
            .filter_map(|index| dataset.sequence_item(tags::SEGMENT_SEQUENCE, index))
            .find(|item| {
                item.string_value(tags::SEGMENT_NUMBER, 0)
                    .and_then(|number| number.parse::<u16>().ok())
                    == Some(segment_number)
            });
        let Some(item) = item else {
            warn!(segment_number, "cannot copy tracking information, segment not found");
            return Ok(());
        };
        match (
            item.string_value(tags::TRACKING_ID, 0),
            item.string_value(tags::TRACKING_UID, 0),
        ) {
            (Some(tracking_id), Some(tracking_uid)) => {
                self.set_tracking_identifier(tracking_id, check)?;
                self.set_tracking_unique_identifier(tracking_uid, check)
            }
            (None, None) => {
                debug!(segment_number, "segment has no tracking information");
                Ok(())
            }
            _ => {
                warn!(
                    segment_number,
                    "either tracking ID or tracking UID is absent in referenced segmentation object"
                );
                Ok(())
            }
        }
    }

    /// Sets the source series for segmentation (Row 12).
    pub fn set_source_series_for_segmentation(&mut self, series_uid: &str, check: bool) -> CmrResult<()> {
        if series_uid.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        self.set_group_row(
            SOURCE_SERIES_FOR_SEGMENTATION,
            Row::new(
                RelationshipType::Contains,
                &dcm::SOURCE_SERIES_FOR_SEGMENTATION,
                "TID 1411 - Row 12",
            ),
            RowValue::Text(ValueType::UidRef, series_uid.to_string()),
            check,
        )
    }

    /// Sets the measurement method (TID 1419 Row 1).
    pub fn set_measurement_method(&mut self, method: &ContextGroup<Me>, check: bool) -> CmrResult<()> {
        if !method.has_selected_value() {
            return Err(CmrError::InvalidValue);
        }
        self.set_group_row(
            MEASUREMENT_METHOD,
            Row::new(RelationshipType::HasConceptMod, &sct::MEASUREMENT_METHOD, "TID 1419 - Row 1"),
            RowValue::Code(selected_entry(method, true, check)?),
            check,
        )
    }

    /// Adds a finding site (TID 1419 Row 2) with optional laterality
    /// (Row 3) and topographical modifier (Row 4) below it.
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
            ["TID 1419 - Row 2", "TID 1419 - Row 3", "TID 1419 - Row 4"],
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

    /// Adds a measurement (Row 15).
    ///
    /// With `check_empty`, an empty current measurement is filled instead of
    /// including a new one.
    ///
    /// # Errors
    /// `InvalidValue` if no concept is selected or the value is incomplete;
    /// the errors of [`Tid1419RoiMeasurement::create_new_measurement`].
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
        let mut measurement = Tid1419RoiMeasurement::<M, U, Me, D>::new();
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
        self.annotate(include, "TID 1411 - Row 15");
        self.template.store(LAST_MEASUREMENT, Some(include));
        self.measurement = measurement;
        Ok(())
    }

    /// Adds a coded qualitative evaluation (Row 16).
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
            Row::new(RelationshipType::Contains, concept, "TID 1411 - Row 16"),
            RowValue::Code(value.clone()),
            check,
        )?;
        self.add_qualitative(item)
    }

    /// Adds a textual qualitative evaluation (Row 17).
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
            Row::new(RelationshipType::Contains, concept, "TID 1411 - Row 17"),
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

    /// Validates the row before the measurement group is created, so a bad
    /// value leaves an empty template empty.
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

impl<M, U, Me, D> Template for Tid1411VolumetricRoiMeasurements<M, U, Me, D>
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
            && self.has_referenced_segment()
            && self.has_source_series_for_segmentation()
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
    use crate::dataset::MemoryDataset;
    use crate::tid::init_test_logging;
    use dcmr_types::codes::ucum;
    use dcmr_types::SEGMENTATION_STORAGE_UID;

    const SEGMENTATION_UID: &str = "1.2.276.0.7230010.3.1.4.1";

    fn segment() -> ImageReference {
        let mut segment = ImageReference::new(SEGMENTATION_STORAGE_UID, SEGMENTATION_UID);
        segment.segment_numbers.push(1);
        segment
    }

    fn volume(value: &str) -> NumericMeasurement {
        NumericMeasurement::new(value, ucum::CUBIC_MILLIMETER)
    }

    fn complete_group() -> VolumetricRoiMeasurements {
        let mut group = VolumetricRoiMeasurements::new();
        group.set_tracking_identifier("aorta reference region", true).unwrap();
        group
            .set_tracking_unique_identifier("1.2.3.4.5.6.7", true)
            .unwrap();
        group.set_referenced_segment(&segment(), true).unwrap();
        group.set_source_series_for_segmentation("1.2.3.4.5.6.8", true).unwrap();
        group
    }

    #[test]
    fn test_validity_requires_measurement() {
        init_test_logging();
        let mut group = complete_group();
        assert!(group.has_measurement_group());
        assert!(!group.is_valid());

        group
            .add_measurement(&IntensityAndSizeMeasurement::Volume.into(), &volume("1200"), true, true)
            .unwrap();
        assert!(group.is_valid());
        // group, four rows, one include
        assert_eq!(group.sub_template().count_nodes(false), 6);
        assert_eq!(group.sub_template().count_nodes(true), 8);
    }

    #[test]
    fn test_add_measurement_includes_new_instances() {
        let mut group = complete_group();
        let concept: ContextGroup<_> = IntensityAndSizeMeasurement::Volume.into();
        group.add_measurement(&concept, &volume("1"), true, true).unwrap();
        let first = Rc::clone(group.measurement());
        group.add_measurement(&concept, &volume("2"), true, true).unwrap();
        assert!(!Rc::ptr_eq(&first, group.measurement()));
        assert_eq!(group.sub_template().count_nodes(false), 7);

        group
            .measurement()
            .borrow_mut()
            .set_derivation(&RoiMeasurementModifier::Mean.into(), true)
            .unwrap();
        assert_eq!(group.sub_template().count_nodes(true), 7 + 2 + 3);
    }

    #[test]
    fn test_failed_setter_leaves_template_empty() {
        let mut group = VolumetricRoiMeasurements::new();
        let result = group.set_tracking_unique_identifier("not a uid", true);
        assert!(matches!(result, Err(CmrError::InvalidValue)));
        assert!(group.is_empty());
        assert!(!group.has_measurement_group());

        let result = group.add_measurement(&ContextGroup::new(), &volume("1"), true, true);
        assert!(matches!(result, Err(CmrError::InvalidValue)));
        assert!(group.is_empty());
    }

    #[test]
    fn test_referenced_segment_must_be_segmentation() {
        init_test_logging();
        let mut group = VolumetricRoiMeasurements::new();
        let ct = ImageReference::new("1.2.840.10008.5.1.4.1.1.2", "1.2.3.4");
        assert!(matches!(
            group.set_referenced_segment(&ct, true),
            Err(CmrError::InvalidSegmentationObject)
        ));

        let mut two_segments = segment();
        two_segments.segment_numbers.push(2);
        assert!(matches!(
            group.set_referenced_segment(&two_segments, true),
            Err(CmrError::InvalidSegmentationObject)
        ));
        assert!(!group.has_referenced_segment());
    }

    #[test]
    fn test_referenced_segment_from_dataset_copies_tracking() {
        init_test_logging();
        let dataset = MemoryDataset::new()
            .with_str(tags::SOP_CLASS_UID, SEGMENTATION_STORAGE_UID)
            .with_str(tags::SOP_INSTANCE_UID, SEGMENTATION_UID)
            .with_item(
                tags::SEGMENT_SEQUENCE,
                MemoryDataset::new()
                    .with_str(tags::SEGMENT_NUMBER, "1")
                    .with_str(tags::TRACKING_ID, "liver"),
            )
            .with_item(
                tags::SEGMENT_SEQUENCE,
                MemoryDataset::new()
                    .with_str(tags::SEGMENT_NUMBER, "2")
                    .with_str(tags::TRACKING_ID, "spleen")
                    .with_str(tags::TRACKING_UID, "1.2.3.99"),
            );

        let mut group = VolumetricRoiMeasurements::new();
        group
            .set_referenced_segment_from_dataset(&dataset, 2, true, true)
            .unwrap();
        assert!(group.has_referenced_segment());
        assert!(group.has_tracking_identifier());
        assert!(group.has_tracking_unique_identifier());

        let mut group = VolumetricRoiMeasurements::new();
        group
            .set_referenced_segment_from_dataset(&dataset, 1, true, true)
            .unwrap();
        assert!(group.has_referenced_segment());
        assert!(!group.has_tracking_identifier());
    }

    #[test]
    fn test_rows_and_replacement() {
        let mut group = complete_group();
        group.set_tracking_identifier("lesion 7", true).unwrap();
        group
            .set_finding(&CodedEntry::new("M-80003", "SRT", "Neoplasm, Primary"), true)
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
        group
            .add_qualitative_evaluation_text(&dcm::FINDING, "hypodense", true)
            .unwrap();
        // group, 4 + 4 rows, finding site with laterality, include, evaluation
        assert_eq!(group.sub_template().count_nodes(false), 13);

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
                "TID 1411 - Row 1b",
                "TID 1411 - Row 2",
                "TID 1411 - Row 3",
                "TID 1411 - Row 3b",
                "TID 1502 - Row 3",
                "TID 1411 - Row 7",
                "TID 1411 - Row 12",
                "TID 1419 - Row 1",
                "TID 1419 - Row 2",
                "TID 1411 - Row 15",
                "TID 1411 - Row 17",
            ]
        );
    }

    #[test]
    fn test_validity_after_rows_are_removed() {
        let mut group = complete_group();
        group
            .add_measurement(&IntensityAndSizeMeasurement::Volume.into(), &volume("1200"), true, true)
            .unwrap();
        assert!(group.is_valid());

        let segment_row = group.sub_template().slot(REFERENCED_SEGMENT).unwrap();
        let tree = group.sub_template_mut().tree_mut();
        tree.goto_node(segment_row);
        tree.remove_current_content_item();
        assert!(!group.has_referenced_segment());
        assert!(!group.is_valid());

        group.set_referenced_segment(&segment(), true).unwrap();
        assert!(group.is_valid());
        let include = group.sub_template().tree().nodes().find_map(|(_, id, item)| {
            item.included_template().map(|_| id)
        });
        let tree = group.sub_template_mut().tree_mut();
        tree.goto_node(include.unwrap());
        tree.remove_current_content_item();
        assert!(!group.has_measurements());
        assert!(!group.is_valid());
    }

    #[test]
    fn test_tracking_identifier_replaced_by_other_value_type() {
        let mut group = complete_group();
        group
            .add_measurement(&IntensityAndSizeMeasurement::Volume.into(), &volume("1200"), true, true)
            .unwrap();
        let id = group.sub_template().slot(TRACKING_IDENTIFIER).unwrap();
        let mut code = ContentItem::new(RelationshipType::HasObsContext, ValueType::Code, dcm::TRACKING_IDENTIFIER);
        code.set_code_value(dcm::FINDING, true).unwrap();
        if let Some(item) = group.sub_template_mut().tree_mut().item_mut(id) {
            *item = code;
        }
        assert!(group.sub_template().is_valid());
        assert!(!group.has_tracking_identifier());
        assert!(!group.is_valid());
    }
}
