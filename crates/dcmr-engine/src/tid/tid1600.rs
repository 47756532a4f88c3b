//! TID 1600 Image Library.
//!
//! The library holds one group container per set of related images; every
//! group holds its entries (TID 1601), each an IMAGE item optionally followed
//! by descriptors (TID 1602 to 1607) copied from the referenced dataset.
//! Descriptors shared by all entries of a group may be hoisted to the group.

use dcmr_types::codes::{dcm, sct, ucum};
use dcmr_types::{
    AddMode, CodedEntry, ImageReference, NodeId, NumericMeasurement, RelationshipType, ValueType,
};
use tracing::{debug, warn};

use super::{add_row, build_item, selected_entry, Row, RowValue};
use crate::cid::{
    map_acquisition_type, map_body_part_examined, map_image_laterality, map_modality,
    map_reconstruction_algorithm, PetRadionuclide, PetRadiopharmaceutical,
};
use crate::context_group::ContextGroup;
use crate::dataset::{tags, Dataset, Tag};
use crate::template::{SubTemplate, Template};
use crate::tree::ContentTree;
use crate::types::{CmrError, CmrResult};

const IMAGE_LIBRARY: usize = 0;
const LAST_IMAGE_LIBRARY_GROUP: usize = 1;
const LAST_IMAGE_LIBRARY_ENTRY: usize = 2;
const NUMBER_OF_SLOTS: usize = 3;

/// Which rows [`Tid1600ImageLibrary::add_image_entry`] creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddImageMode {
    /// Only the image reference.
    WithoutDescriptors,
    /// The image reference and every descriptor found in the dataset.
    #[default]
    WithAllDescriptors,
}

/// Result of [`Tid1600ImageLibrary::add_image_entry_descriptors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorOutcome {
    /// Descriptors were added to the group.
    Added,
    /// The dataset held nothing a descriptor row could be made of.
    NothingToAdd,
}

/// Result of [`Tid1600ImageLibrary::move_common_image_descriptors_to_image_groups`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Number of descriptors that now live at group level.
    Moved(usize),
    /// No group had descriptors common to all of its entries.
    NothingToMove,
}

/// Image Library (TID 1600).
#[derive(Debug, Clone)]
pub struct Tid1600ImageLibrary {
    template: SubTemplate,
}

impl Default for Tid1600ImageLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl Tid1600ImageLibrary {
    /// Creates the template with an empty image library (Row 1).
    pub fn new() -> Self {
        let mut library = Self::empty();
        if let Err(error) = library.create_new_image_library() {
            warn!(%error, "cannot create image library");
        }
        library
    }

    /// Creates the template without any content.
    pub fn empty() -> Self {
        Self {
            template: SubTemplate::new("1600", true, false).with_slots(NUMBER_OF_SLOTS),
        }
    }

    /// Returns true if the image library container (Row 1) exists.
    pub fn has_image_library(&self) -> bool {
        self.template.slot_has_value_type(IMAGE_LIBRARY, ValueType::Container)
    }

    /// Returns true if at least one image library group (Row 2) exists.
    pub fn has_image_library_group(&self) -> bool {
        self.template.slot_has_value_type(LAST_IMAGE_LIBRARY_GROUP, ValueType::Container)
    }

    /// Returns true if the current group has at least one entry.
    pub fn has_image_library_entry(&self) -> bool {
        self.template.slot_has_value_type(LAST_IMAGE_LIBRARY_ENTRY, ValueType::Image)
    }

    /// Discards the content and creates a new, empty image library.
    pub fn create_new_image_library(&mut self) -> CmrResult<()> {
        self.template.clear();
        let root = add_row(
            self.template.tree_mut(),
            AddMode::AfterCurrent,
            Row::new(RelationshipType::Unknown, &dcm::IMAGE_LIBRARY, "TID 1600 - Row 1"),
            RowValue::Container,
            true,
        )?;
        self.template.store(IMAGE_LIBRARY, Some(root));
        Ok(())
    }

    /// Adds a new image library group (Row 2) after the last one.
    ///
    /// Subsequent entries are added to this group.
    pub fn add_image_group(&mut self) -> CmrResult<()> {
        let library = self.template.slot(IMAGE_LIBRARY).ok_or(CmrError::NoImageLibrary)?;
        let item = build_item(
            Row::new(RelationshipType::Contains, &dcm::IMAGE_LIBRARY_GROUP, "TID 1600 - Row 2"),
            RowValue::Container,
            true,
        )?;
        let mode = if self.template.goto_slot(LAST_IMAGE_LIBRARY_GROUP).is_some() {
            AddMode::AfterCurrent
        } else {
            self.template.tree_mut().goto_node(library);
            AddMode::BelowCurrent
        };
        let group = self.template.tree_mut().add_item(item, mode)?;
        self.template.store(LAST_IMAGE_LIBRARY_GROUP, Some(group));
        self.template.store(LAST_IMAGE_LIBRARY_ENTRY, None);
        Ok(())
    }

    /// Adds an image library entry (Row 3, TID 1601) for `dataset` to the
    /// current group.
    ///
    /// With [`AddImageMode::WithAllDescriptors`] the descriptors found in
    /// the dataset are added below the image item; the entry is added even
    /// if there are none.
    ///
    /// # Errors
    /// `NoImageLibraryGroup` without a group, `InvalidValue` if the dataset
    /// lacks SOP class or instance UID. Nothing is added on error.
    pub fn add_image_entry(
        &mut self,
        dataset: &dyn Dataset,
        mode: AddImageMode,
        check: bool,
    ) -> CmrResult<()> {
        let group = self
            .template
            .slot(LAST_IMAGE_LIBRARY_GROUP)
            .ok_or(CmrError::NoImageLibraryGroup)?;
        let image = ImageReference::new(
            dataset.string_value(tags::SOP_CLASS_UID, 0).unwrap_or_default(),
            dataset.string_value(tags::SOP_INSTANCE_UID, 0).unwrap_or_default(),
        );
        if !image.is_complete() {
            return Err(CmrError::InvalidValue);
        }

        let mut entry = ContentTree::new();
        let entry_id = add_row(
            &mut entry,
            AddMode::AfterCurrent,
            Row::new(RelationshipType::Contains, &CodedEntry::empty(), "TID 1601 - Row 1"),
            RowValue::Image(image),
            check,
        )?;
        if mode == AddImageMode::WithAllDescriptors {
            let mut descriptors = ContentTree::new();
            add_entry_descriptors(&mut descriptors, dataset, check)?;
            if descriptors.is_empty() {
                debug!("no image library entry descriptors found in dataset");
            } else {
                entry.insert_sub_tree(&mut descriptors, AddMode::BelowCurrent, RelationshipType::HasAcqContext)?;
            }
        }

        let mode = if self.template.goto_slot(LAST_IMAGE_LIBRARY_ENTRY).is_some() {
            AddMode::AfterCurrent
        } else {
            self.template.tree_mut().goto_node(group);
            AddMode::BelowCurrent
        };
        self.template
            .tree_mut()
            .insert_sub_tree(&mut entry, mode, RelationshipType::Contains)?;
        self.template.store(LAST_IMAGE_LIBRARY_ENTRY, Some(entry_id));
        Ok(())
    }

    /// Adds descriptors common to the images of the current group (Row 3 of
    /// the group, TID 1602) from `dataset`.
    ///
    /// # Errors
    /// `NoImageLibraryGroup` without a group;
    /// `CannotAddMultipleImageLibraryEntryDescriptors` if the group already
    /// has descriptors.
    pub fn add_image_entry_descriptors(
        &mut self,
        dataset: &dyn Dataset,
        check: bool,
    ) -> CmrResult<DescriptorOutcome> {
        let group = self
            .template
            .slot(LAST_IMAGE_LIBRARY_GROUP)
            .ok_or(CmrError::NoImageLibraryGroup)?;
        let mut descriptors = ContentTree::new();
        add_entry_descriptors(&mut descriptors, dataset, check)?;
        if descriptors.is_empty() {
            return Ok(DescriptorOutcome::NothingToAdd);
        }
        if !self.group_descriptors(group).is_empty() {
            return Err(CmrError::CannotAddMultipleImageLibraryEntryDescriptors);
        }
        let tree = self.template.tree_mut();
        tree.goto_node(group);
        tree.insert_sub_tree(
            &mut descriptors,
            AddMode::BelowCurrentBeforeFirstChild,
            RelationshipType::HasAcqContext,
        )?;
        Ok(DescriptorOutcome::Added)
    }

    /// Returns the modality descriptor (TID 1602 Row 1) of the most recently
    /// added entry.
    ///
    /// # Errors
    /// `NoImageLibraryEntry` without an entry,
    /// `MissingImageLibraryEntryDescriptorModality` if it has no modality.
    pub fn get_image_entry_modality(&self) -> CmrResult<CodedEntry> {
        let entry = self
            .template
            .slot(LAST_IMAGE_LIBRARY_ENTRY)
            .ok_or(CmrError::NoImageLibraryEntry)?;
        self.modality_of(entry)
            .cloned()
            .ok_or(CmrError::MissingImageLibraryEntryDescriptorModality)
    }

    fn modality_of(&self, entry: NodeId) -> Option<&CodedEntry> {
        let tree = self.template.tree();
        tree.children(entry)
            .iter()
            .filter_map(|&id| tree.item(id))
            .find(|item| item.concept_name() == &dcm::MODALITY)
            .and_then(|item| item.code_value())
    }

    fn group_descriptors(&self, group: NodeId) -> Vec<NodeId> {
        let tree = self.template.tree();
        tree.children(group)
            .iter()
            .copied()
            .filter(|&id| {
                tree.item(id)
                    .map(|item| item.relationship_type() == RelationshipType::HasAcqContext)
                    .unwrap_or(false)
            })
            .collect()
    }

    // ── PET descriptors of the last entry ────────────────────────────────

    /// Sets the radionuclide (TID 1607 Row 1) of the last PET entry.
    pub fn set_pet_image_radionuclide(
        &mut self,
        radionuclide: &ContextGroup<PetRadionuclide>,
        check: bool,
    ) -> CmrResult<()> {
        let value = selected_entry(radionuclide, false, check)?;
        self.set_pet_descriptor(
            Row::new(RelationshipType::HasAcqContext, &sct::RADIONUCLIDE, "TID 1607 - Row 1"),
            RowValue::Code(value),
            check,
        )
    }

    /// Sets the radiopharmaceutical agent (TID 1607 Row 2) of the last PET entry.
    pub fn set_pet_image_radiopharmaceutical_agent(
        &mut self,
        agent: &ContextGroup<PetRadiopharmaceutical>,
        check: bool,
    ) -> CmrResult<()> {
        let value = selected_entry(agent, false, check)?;
        self.set_pet_descriptor(
            Row::new(
                RelationshipType::HasAcqContext,
                &sct::RADIOPHARMACEUTICAL_AGENT,
                "TID 1607 - Row 2",
            ),
            RowValue::Code(value),
            check,
        )
    }

    /// Sets the radiopharmaceutical start date time (TID 1607 Row 4).
    pub fn set_pet_image_radiopharmaceutical_start_date_time(
        &mut self,
        date_time: &str,
        check: bool,
    ) -> CmrResult<()> {
        if date_time.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        self.set_pet_descriptor(
            Row::new(
                RelationshipType::HasAcqContext,
                &dcm::RADIOPHARMACEUTICAL_START_DATE_TIME,
                "TID 1607 - Row 4",
            ),
            RowValue::Text(ValueType::DateTime, date_time.to_string()),
            check,
        )
    }

    /// Sets the radiopharmaceutical stop date time (TID 1607 Row 5).
    pub fn set_pet_image_radiopharmaceutical_stop_date_time(
        &mut self,
        date_time: &str,
        check: bool,
    ) -> CmrResult<()> {
        if date_time.is_empty() {
            return Err(CmrError::InvalidValue);
        }
        self.set_pet_descriptor(
            Row::new(
                RelationshipType::HasAcqContext,
                &dcm::RADIOPHARMACEUTICAL_STOP_DATE_TIME,
                "TID 1607 - Row 5",
            ),
            RowValue::Text(ValueType::DateTime, date_time.to_string()),
            check,
        )
    }

    /// Sets the radiopharmaceutical volume (TID 1607 Row 6), in cm3.
    pub fn set_pet_image_radiopharmaceutical_volume(
        &mut self,
        volume: &NumericMeasurement,
        check: bool,
    ) -> CmrResult<()> {
        let concept = dcm::RADIOPHARMACEUTICAL_VOLUME;
        let row = Row::new(
            RelationshipType::HasAcqContext,
            &concept,
            "TID 1607 - Row 6",
        );
        check_unit(row, volume, &ucum::CUBIC_CENTIMETER)?;
        self.set_pet_descriptor(row, RowValue::Num(volume.clone()), check)
    }

    /// Sets the radionuclide total dose (TID 1607 Row 7), in Bq.
    pub fn set_pet_image_radionuclide_total_dose(
        &mut self,
        total_dose: &NumericMeasurement,
        check: bool,
    ) -> CmrResult<()> {
        let concept = dcm::RADIONUCLIDE_TOTAL_DOSE;
        let row = Row::new(
            RelationshipType::HasAcqContext,
            &concept,
            "TID 1607 - Row 7",
        );
        check_unit(row, total_dose, &ucum::BECQUEREL)?;
        self.set_pet_descriptor(row, RowValue::Num(total_dose.clone()), check)
    }

    /// Returns the last entry if its modality descriptor says PET.
    fn pet_entry(&self) -> CmrResult<NodeId> {
        let entry = self
            .template
            .slot(LAST_IMAGE_LIBRARY_ENTRY)
            .ok_or(CmrError::NoImageLibraryEntry)?;
        match self.modality_of(entry) {
            Some(modality) if modality == &dcm::POSITRON_EMISSION_TOMOGRAPHY => Ok(entry),
            Some(_) => Err(CmrError::WrongImageLibraryEntryDescriptorModality),
            None => Err(CmrError::MissingImageLibraryEntryDescriptorModality),
        }
    }

    /// Replaces the value of the entry's descriptor with the row's concept
    /// name, or appends the descriptor to the entry.
    fn set_pet_descriptor(&mut self, row: Row<'_>, value: RowValue, check: bool) -> CmrResult<()> {
        let entry = self.pet_entry()?;
        let item = build_item(row, value, check)?;
        let tree = self.template.tree_mut();
        let existing = tree
            .children(entry)
            .iter()
            .copied()
            .find(|&id| tree.item(id).map(|item| item.concept_name() == row.concept).unwrap_or(false));
        match existing {
            Some(id) => {
                let target = tree.item_mut(id).ok_or(CmrError::InvalidTemplateStructure)?;
                if target.value_type() != item.value_type() {
                    warn!(
                        concept = row.concept.code_meaning(),
                        row = row.annotation,
                        "cannot replace value, wrong value type"
                    );
                    return Err(CmrError::InvalidContentItem);
                }
                debug!(concept = row.concept.code_meaning(), row = row.annotation, "replacing value");
                *target = item;
                tree.goto_node(id);
            }
            None => {
                tree.goto_node(entry);
                tree.add_item(item, AddMode::BelowCurrent)?;
            }
        }
        Ok(())
    }

    // ── group level descriptors ──────────────────────────────────────────

    /// Moves descriptors that every entry of a group has (equal value and
    /// children) from the entries to the group.
    ///
    /// Groups with fewer than two entries are left alone, as are descriptors
    /// whose concept name the group already has. One copy of each common
    /// descriptor is moved behind the existing group descriptors; the
    /// copies of the other entries are removed.
    pub fn move_common_image_descriptors_to_image_groups(&mut self) -> CmrResult<MoveOutcome> {
        let library = self.template.slot(IMAGE_LIBRARY).ok_or(CmrError::NoImageLibrary)?;
        let tree = self.template.tree();
        let groups: Vec<NodeId> = tree
            .children(library)
            .iter()
            .copied()
            .filter(|&id| {
                tree.item(id)
                    .map(|item| item.concept_name() == &dcm::IMAGE_LIBRARY_GROUP)
                    .unwrap_or(false)
            })
            .collect();

        let mut moved = 0;
        for group in groups {
            moved += self.move_common_descriptors(group)?;
        }
        Ok(if moved == 0 {
            MoveOutcome::NothingToMove
        } else {
            MoveOutcome::Moved(moved)
        })
    }

    /// Pairs each descriptor of the group's first entry that all other
    /// entries share with the matching descriptors of those entries.
    fn common_descriptors(&self, group: NodeId) -> Vec<(NodeId, Vec<NodeId>)> {
        let tree = self.template.tree();
        let entries: Vec<NodeId> = tree
            .children(group)
            .iter()
            .copied()
            .filter(|&id| tree.item(id).map(|item| item.value_type() == ValueType::Image).unwrap_or(false))
            .collect();
        let Some((&first, others)) = entries.split_first() else {
            return Vec::new();
        };
        if others.is_empty() {
            return Vec::new();
        }
        let existing: Vec<&CodedEntry> = self
            .group_descriptors(group)
            .into_iter()
            .filter_map(|id| tree.item(id).map(|item| item.concept_name()))
            .collect();

        let mut common = Vec::new();
        for &descriptor in tree.children(first) {
            let Some(item) = tree.item(descriptor) else {
                continue;
            };
            if item.relationship_type() != RelationshipType::HasAcqContext
                || existing.contains(&item.concept_name())
            {
                continue;
            }
            let copies: Option<Vec<NodeId>> = others
                .iter()
                .map(|&entry| {
                    tree.children(entry)
                        .iter()
                        .copied()
                        .find(|&other| tree.sub_trees_equal(descriptor, other))
                })
                .collect();
            if let Some(copies) = copies {
                common.push((descriptor, copies));
            }
        }
        common
    }

    fn move_common_descriptors(&mut self, group: NodeId) -> CmrResult<usize> {
        let common = self.common_descriptors(group);
        if common.is_empty() {
            return Ok(0);
        }
        let (mut anchor, mut mode) = match self.group_descriptors(group).last() {
            Some(&last) => (last, AddMode::AfterCurrent),
            None => (group, AddMode::BelowCurrentBeforeFirstChild),
        };
        let tree = self.template.tree_mut();
        for (descriptor, copies) in &common {
            for &copy in copies {
                if tree.goto_node(copy).is_some() {
                    tree.remove_current_content_item();
                }
            }
            tree.goto_node(*descriptor).ok_or(CmrError::InvalidTemplateStructure)?;
            let mut moved = tree
                .extract_current_sub_tree()
                .ok_or(CmrError::InvalidTemplateStructure)?;
            tree.goto_node(anchor).ok_or(CmrError::InvalidTemplateStructure)?;
            tree.insert_sub_tree(&mut moved, mode, RelationshipType::HasAcqContext)?;
            anchor = *descriptor;
            mode = AddMode::AfterCurrent;
        }
        debug!(group = %group, moved = common.len(), "moved common image descriptors to group");
        Ok(common.len())
    }
}

impl Template for Tid1600ImageLibrary {
    fn sub_template(&self) -> &SubTemplate {
        &self.template
    }

    fn sub_template_mut(&mut self) -> &mut SubTemplate {
        &mut self.template
    }

    fn is_valid(&self) -> bool {
        self.template.is_valid() && self.has_image_library()
    }
}

fn check_unit(row: Row<'_>, value: &NumericMeasurement, unit: &CodedEntry) -> CmrResult<()> {
    if &value.unit != unit {
        warn!(
            concept = row.concept.code_meaning(),
            row = row.annotation,
            "wrong measurement unit"
        );
        return Err(CmrError::ValueSetConstraintViolated);
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Descriptors read from a dataset
// ═══════════════════════════════════════════════════════════════════════════

fn descriptor<'a>(concept: &'a CodedEntry, annotation: &'static str) -> Row<'a> {
    Row::new(RelationshipType::HasAcqContext, concept, annotation)
}

fn add_string_descriptor(
    tree: &mut ContentTree,
    dataset: &dyn Dataset,
    tag: Tag,
    pos: usize,
    value_type: ValueType,
    row: Row<'_>,
    check: bool,
) -> CmrResult<()> {
    if let Some(value) = dataset.string_value(tag, pos) {
        add_row(tree, AddMode::AfterCurrent, row, RowValue::Text(value_type, value.to_string()), check)?;
    }
    Ok(())
}

fn add_numeric_descriptor(
    tree: &mut ContentTree,
    dataset: &dyn Dataset,
    tag: Tag,
    pos: usize,
    unit: &CodedEntry,
    row: Row<'_>,
    check: bool,
) -> CmrResult<()> {
    if let Some(value) = dataset.string_value(tag, pos) {
        let value = NumericMeasurement::new(value, unit.clone());
        add_row(tree, AddMode::AfterCurrent, row, RowValue::Num(value), check)?;
    }
    Ok(())
}

fn add_code_descriptor(
    tree: &mut ContentTree,
    dataset: &dyn Dataset,
    tag: Tag,
    row: Row<'_>,
    check: bool,
) -> CmrResult<Option<NodeId>> {
    match dataset.read_coded_entry_sequence(tag) {
        Some(entry) => add_row(tree, AddMode::AfterCurrent, row, RowValue::Code(entry), check).map(Some),
        None => Ok(None),
    }
}

fn add_mapped_descriptor(
    tree: &mut ContentTree,
    mapped: CmrResult<CodedEntry>,
    row: Row<'_>,
    check: bool,
) -> CmrResult<()> {
    match mapped {
        Ok(entry) => {
            add_row(tree, AddMode::AfterCurrent, row, RowValue::Code(entry), check)?;
        }
        Err(CmrError::UnsupportedValue(term)) => {
            warn!(term = %term, concept = row.concept.code_meaning(), "cannot map defined term to a coded entry");
        }
        Err(err) => return Err(err),
    }
    Ok(())
}

fn coded_entry_of(item: &dyn Dataset) -> Option<CodedEntry> {
    let entry = CodedEntry::new(
        item.string_value(tags::CODE_VALUE, 0)?,
        item.string_value(tags::CODING_SCHEME_DESIGNATOR, 0)?,
        item.string_value(tags::CODE_MEANING, 0)?,
    );
    entry.is_complete().then_some(entry)
}

/// TID 1602 rows followed by the modality specific rows.
fn add_entry_descriptors(tree: &mut ContentTree, dataset: &dyn Dataset, check: bool) -> CmrResult<()> {
    let modality = dataset.string_value(tags::MODALITY, 0).unwrap_or_default();
    if !modality.is_empty() {
        add_mapped_descriptor(
            tree,
            map_modality(modality),
            descriptor(&dcm::MODALITY, "TID 1602 - Row 1"),
            check,
        )?;
    }

    let region = dataset.read_coded_entry_sequence(tags::ANATOMIC_REGION_SEQUENCE).or_else(|| {
        let body_part = dataset.string_value(tags::BODY_PART_EXAMINED, 0)?;
        match map_body_part_examined(body_part) {
            Ok(entry) => Some(entry),
            Err(_) => {
                debug!(term = body_part, "cannot map body part examined to a coded entry");
                None
            }
        }
    });
    if let Some(region) = region {
        add_row(
            tree,
            AddMode::AfterCurrent,
            descriptor(&dcm::TARGET_REGION, "TID 1602 - Row 2"),
            RowValue::Code(region),
            check,
        )?;
    }

    if let Some(laterality) = dataset.string_value(tags::IMAGE_LATERALITY, 0) {
        add_mapped_descriptor(
            tree,
            map_image_laterality(laterality),
            descriptor(&dcm::IMAGE_LATERALITY, "TID 1602 - Row 3"),
            check,
        )?;
    }

    let dates_and_times: [(Tag, ValueType, &CodedEntry, &'static str); 6] = [
        (tags::STUDY_DATE, ValueType::Date, &dcm::STUDY_DATE, "TID 1602 - Row 4"),
        (tags::STUDY_TIME, ValueType::Time, &dcm::STUDY_TIME, "TID 1602 - Row 5"),
        (tags::CONTENT_DATE, ValueType::Date, &dcm::CONTENT_DATE, "TID 1602 - Row 6"),
        (tags::CONTENT_TIME, ValueType::Time, &dcm::CONTENT_TIME, "TID 1602 - Row 7"),
        (tags::ACQUISITION_DATE, ValueType::Date, &dcm::ACQUISITION_DATE, "TID 1602 - Row 8"),
        (tags::ACQUISITION_TIME, ValueType::Time, &dcm::ACQUISITION_TIME, "TID 1602 - Row 9"),
    ];
    for (tag, value_type, concept, annotation) in dates_and_times {
        add_string_descriptor(tree, dataset, tag, 0, value_type, descriptor(concept, annotation), check)?;
    }
    add_string_descriptor(
        tree,
        dataset,
        tags::FRAME_OF_REFERENCE_UID,
        0,
        ValueType::UidRef,
        descriptor(&dcm::FRAME_OF_REFERENCE_UID, "TID 1602 - Row 10"),
        check,
    )?;
    add_numeric_descriptor(
        tree,
        dataset,
        tags::ROWS,
        0,
        &ucum::PIXELS,
        descriptor(&dcm::PIXEL_DATA_ROWS, "TID 1602 - Row 11"),
        check,
    )?;
    add_numeric_descriptor(
        tree,
        dataset,
        tags::COLUMNS,
        0,
        &ucum::PIXELS,
        descriptor(&dcm::PIXEL_DATA_COLUMNS, "TID 1602 - Row 12"),
        check,
    )?;

    match modality {
        "CR" | "RG" | "DX" | "MG" | "XA" | "RF" | "PX" | "IO" => {
            add_projection_radiography_descriptors(tree, dataset, check)?;
        }
        "CT" | "MR" | "US" | "PT" | "OCT" | "OPT" | "IVOCT" => {
            add_cross_sectional_descriptors(tree, dataset, check)?;
        }
        _ => {}
    }
    match modality {
        "CT" => add_computed_tomography_descriptors(tree, dataset, check),
        "MR" => add_magnetic_resonance_descriptors(tree, dataset, check),
        "PT" => add_positron_emission_tomography_descriptors(tree, dataset, check),
        _ => Ok(()),
    }
}

/// TID 1603.
fn add_projection_radiography_descriptors(
    tree: &mut ContentTree,
    dataset: &dyn Dataset,
    check: bool,
) -> CmrResult<()> {
    let view = add_code_descriptor(
        tree,
        dataset,
        tags::VIEW_CODE_SEQUENCE,
        descriptor(&dcm::IMAGE_VIEW, "TID 1603 - Row 1"),
        check,
    )?;
    if let (Some(_), Some(item)) = (view, dataset.sequence_item(tags::VIEW_CODE_SEQUENCE, 0)) {
        let modifiers = (0..item.sequence_len(tags::VIEW_MODIFIER_CODE_SEQUENCE))
            .filter_map(|index| item.sequence_item(tags::VIEW_MODIFIER_CODE_SEQUENCE, index))
            .filter_map(coded_entry_of);
        for modifier in modifiers {
            add_row(
                tree,
                AddMode::BelowCurrent,
                descriptor(&dcm::IMAGE_VIEW_MODIFIER, "TID 1603 - Row 2"),
                RowValue::Code(modifier),
                check,
            )?;
            tree.goto_parent();
        }
    }

    add_string_descriptor(
        tree,
        dataset,
        tags::PATIENT_ORIENTATION,
        0,
        ValueType::Text,
        descriptor(&dcm::PATIENT_ORIENTATION_ROW, "TID 1603 - Row 3"),
        check,
    )?;
    add_string_descriptor(
        tree,
        dataset,
        tags::PATIENT_ORIENTATION,
        1,
        ValueType::Text,
        descriptor(&dcm::PATIENT_ORIENTATION_COLUMN, "TID 1603 - Row 4"),
        check,
    )?;
    let numeric: [(Tag, usize, &CodedEntry, &CodedEntry, &'static str); 4] = [
        (tags::IMAGER_PIXEL_SPACING, 1, &dcm::HORIZONTAL_PIXEL_SPACING, &ucum::MILLIMETER, "TID 1603 - Row 5"),
        (tags::IMAGER_PIXEL_SPACING, 0, &dcm::VERTICAL_PIXEL_SPACING, &ucum::MILLIMETER, "TID 1603 - Row 6"),
        (tags::POSITIONER_PRIMARY_ANGLE, 0, &dcm::POSITIONER_PRIMARY_ANGLE, &ucum::DEGREES, "TID 1603 - Row 7"),
        (tags::POSITIONER_SECONDARY_ANGLE, 0, &dcm::POSITIONER_SECONDARY_ANGLE, &ucum::DEGREES, "TID 1603 - Row 8"),
    ];
    for (tag, pos, concept, unit, annotation) in numeric {
        add_numeric_descriptor(tree, dataset, tag, pos, unit, descriptor(concept, annotation), check)?;
    }
    Ok(())
}

/// TID 1604.
fn add_cross_sectional_descriptors(
    tree: &mut ContentTree,
    dataset: &dyn Dataset,
    check: bool,
) -> CmrResult<()> {
    let numeric: [(Tag, usize, &CodedEntry, &CodedEntry, &'static str); 13] = [
        (tags::PIXEL_SPACING, 1, &dcm::HORIZONTAL_PIXEL_SPACING, &ucum::MILLIMETER, "TID 1604 - Row 1"),
        (tags::PIXEL_SPACING, 0, &dcm::VERTICAL_PIXEL_SPACING, &ucum::MILLIMETER, "TID 1604 - Row 2"),
        (tags::SPACING_BETWEEN_SLICES, 0, &dcm::SPACING_BETWEEN_SLICES, &ucum::MILLIMETER, "TID 1604 - Row 3"),
        (tags::SLICE_THICKNESS, 0, &dcm::SLICE_THICKNESS, &ucum::MILLIMETER, "TID 1604 - Row 4"),
        (tags::IMAGE_POSITION_PATIENT, 0, &dcm::IMAGE_POSITION_X, &ucum::MILLIMETER, "TID 1604 - Row 5"),
        (tags::IMAGE_POSITION_PATIENT, 1, &dcm::IMAGE_POSITION_Y, &ucum::MILLIMETER, "TID 1604 - Row 6"),
        (tags::IMAGE_POSITION_PATIENT, 2, &dcm::IMAGE_POSITION_Z, &ucum::MILLIMETER, "TID 1604 - Row 7"),
        (tags::IMAGE_ORIENTATION_PATIENT, 0, &dcm::IMAGE_ORIENTATION_ROW_X, &ucum::MINUS_1_TO_1, "TID 1604 - Row 8"),
        (tags::IMAGE_ORIENTATION_PATIENT, 1, &dcm::IMAGE_ORIENTATION_ROW_Y, &ucum::MINUS_1_TO_1, "TID 1604 - Row 9"),
        (tags::IMAGE_ORIENTATION_PATIENT, 2, &dcm::IMAGE_ORIENTATION_ROW_Z, &ucum::MINUS_1_TO_1, "TID 1604 - Row 10"),
        (tags::IMAGE_ORIENTATION_PATIENT, 3, &dcm::IMAGE_ORIENTATION_COLUMN_X, &ucum::MINUS_1_TO_1, "TID 1604 - Row 11"),
        (tags::IMAGE_ORIENTATION_PATIENT, 4, &dcm::IMAGE_ORIENTATION_COLUMN_Y, &ucum::MINUS_1_TO_1, "TID 1604 - Row 12"),
        (tags::IMAGE_ORIENTATION_PATIENT, 5, &dcm::IMAGE_ORIENTATION_COLUMN_Z, &ucum::MINUS_1_TO_1, "TID 1604 - Row 13"),
    ];
    for (tag, pos, concept, unit, annotation) in numeric {
        add_numeric_descriptor(tree, dataset, tag, pos, unit, descriptor(concept, annotation), check)?;
    }
    Ok(())
}

/// TID 1605.
fn add_computed_tomography_descriptors(
    tree: &mut ContentTree,
    dataset: &dyn Dataset,
    check: bool,
) -> CmrResult<()> {
    let acquisition_type = dataset
        .sequence_item(tags::CT_ACQUISITION_TYPE_SEQUENCE, 0)
        .and_then(|item| item.string_value(tags::ACQUISITION_TYPE, 0));
    if let Some(acquisition_type) = acquisition_type {
        add_mapped_descriptor(
            tree,
            map_acquisition_type(acquisition_type),
            descriptor(&dcm::CT_ACQUISITION_TYPE, "TID 1605 - Row 1"),
            check,
        )?;
    }
    let algorithm = dataset
        .sequence_item(tags::CT_RECONSTRUCTION_SEQUENCE, 0)
        .and_then(|item| item.string_value(tags::RECONSTRUCTION_ALGORITHM, 0));
    if let Some(algorithm) = algorithm {
        add_mapped_descriptor(
            tree,
            map_reconstruction_algorithm(algorithm),
            descriptor(&dcm::RECONSTRUCTION_ALGORITHM, "TID 1605 - Row 2"),
            check,
        )?;
    }
    Ok(())
}

/// TID 1606.
fn add_magnetic_resonance_descriptors(
    tree: &mut ContentTree,
    dataset: &dyn Dataset,
    check: bool,
) -> CmrResult<()> {
    let sequence_name = dataset
        .string_value(tags::PULSE_SEQUENCE_NAME, 0)
        .or_else(|| dataset.string_value(tags::SEQUENCE_NAME, 0));
    if let Some(name) = sequence_name {
        add_row(
            tree,
            AddMode::AfterCurrent,
            descriptor(&dcm::PULSE_SEQUENCE_NAME, "TID 1606 - Row 1"),
            RowValue::text(name),
            check,
        )?;
    }
    Ok(())
}

/// TID 1607, from the first radiopharmaceutical information item.
fn add_positron_emission_tomography_descriptors(
    tree: &mut ContentTree,
    dataset: &dyn Dataset,
    check: bool,
) -> CmrResult<()> {
    let Some(item) = dataset.sequence_item(tags::RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE, 0) else {
        return Ok(());
    };
    add_code_descriptor(
        tree,
        item,
        tags::RADIONUCLIDE_CODE_SEQUENCE,
        descriptor(&sct::RADIONUCLIDE, "TID 1607 - Row 1"),
        check,
    )?;
    add_code_descriptor(
        tree,
        item,
        tags::RADIOPHARMACEUTICAL_CODE_SEQUENCE,
        descriptor(&sct::RADIOPHARMACEUTICAL_AGENT, "TID 1607 - Row 2"),
        check,
    )?;
    add_numeric_descriptor(
        tree,
        item,
        tags::RADIONUCLIDE_HALF_LIFE,
        0,
        &ucum::SECOND,
        descriptor(&sct::HALF_LIFE_OF_RADIOPHARMACEUTICAL, "TID 1607 - Row 3"),
        check,
    )?;
    add_string_descriptor(
        tree,
        item,
        tags::RADIOPHARMACEUTICAL_START_DATE_TIME,
        0,
        ValueType::DateTime,
        descriptor(&dcm::RADIOPHARMACEUTICAL_START_DATE_TIME, "TID 1607 - Row 4"),
        check,
    )?;
    add_string_descriptor(
        tree,
        item,
        tags::RADIOPHARMACEUTICAL_STOP_DATE_TIME,
        0,
        ValueType::DateTime,
        descriptor(&dcm::RADIOPHARMACEUTICAL_STOP_DATE_TIME, "TID 1607 - Row 5"),
        check,
    )?;
    add_numeric_descriptor(
        tree,
        item,
        tags::RADIOPHARMACEUTICAL_VOLUME,
        0,
        &ucum::CUBIC_CENTIMETER,
        descriptor(&dcm::RADIOPHARMACEUTICAL_VOLUME, "TID 1607 - Row 6"),
        check,
    )?;
    add_numeric_descriptor(
        tree,
        item,
        tags::RADIONUCLIDE_TOTAL_DOSE,
        0,
        &ucum::BECQUEREL,
        descriptor(&dcm::RADIONUCLIDE_TOTAL_DOSE, "TID 1607 - Row 7"),
        check,
    )?;
    add_code_descriptor(
        tree,
        item,
        tags::ADMINISTRATION_ROUTE_CODE_SEQUENCE,
        descriptor(&sct::ROUTE_OF_ADMINISTRATION, "TID 1607 - Row 9"),
        check,
    )?;
    Ok(())
}
