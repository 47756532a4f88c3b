//! Template composers.
//!
//! Every composer owns a [`SubTemplate`](crate::SubTemplate) plus bookmark
//! slots for the rows it must re-enter. A mutator builds its rows detached
//! from the live tree, validates them, and splices them in with a single
//! insertion, so a failing call leaves tree and bookmarks untouched.

mod tid1001;
mod tid1204;
mod tid1411;
mod tid1419;
mod tid1501;
mod tid1600;
mod tid300;
mod tid4019;

pub use tid1001::{
    DeviceObserver, ObserverType, PatientSubject, PersonObserver, ProcedureContext, SubjectClass,
    Tid1001ObservationContext,
};
pub use tid1204::Tid1204LanguageOfContentItemAndDescendants;
pub use tid1411::{Tid1411VolumetricRoiMeasurements, VolumetricRoiMeasurements};
pub use tid1419::{RoiMeasurement, Tid1419RoiMeasurement};
pub use tid1501::{MeasurementGroup, Tid1501MeasurementGroup};
pub use tid1600::{AddImageMode, DescriptorOutcome, MoveOutcome, Tid1600ImageLibrary};
pub use tid300::{Measurement, Tid300Measurement};
pub use tid4019::Tid4019AlgorithmIdentification;

use dcmr_types::codes::sct;
use dcmr_types::{
    AddMode, CodedEntry, CompositeReference, ImageReference, NodeId, NumericMeasurement,
    RelationshipType, SpatialCoordinates, ValueType,
};
use tracing::{debug, warn};

use crate::cid::Laterality;
use crate::context_group::ContextGroup;
use crate::dataset::{tags, Dataset};
use crate::template::SubTemplate;
use crate::tree::{ContentItem, ContentTree};
use crate::types::{CmrError, CmrResult};
use crate::vocabulary::Vocabulary;

/// Concept name, relationship and annotation of a template row.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Row<'a> {
    pub relationship: RelationshipType,
    pub concept: &'a CodedEntry,
    pub annotation: &'static str,
}

impl<'a> Row<'a> {
    pub(crate) fn new(
        relationship: RelationshipType,
        concept: &'a CodedEntry,
        annotation: &'static str,
    ) -> Self {
        Self {
            relationship,
            concept,
            annotation,
        }
    }
}

/// Value of a template row; determines the value type of the item.
#[derive(Debug, Clone)]
pub(crate) enum RowValue {
    Text(ValueType, String),
    Code(CodedEntry),
    Num(NumericMeasurement),
    Image(ImageReference),
    SCoord(SpatialCoordinates),
    Composite(CompositeReference),
    Container,
}

impl RowValue {
    pub(crate) fn text(value: impl Into<String>) -> Self {
        Self::Text(ValueType::Text, value.into())
    }

    fn value_type(&self) -> ValueType {
        match self {
            Self::Text(value_type, _) => *value_type,
            Self::Code(_) => ValueType::Code,
            Self::Num(_) => ValueType::Num,
            Self::Image(_) => ValueType::Image,
            Self::SCoord(_) => ValueType::SCoord,
            Self::Composite(_) => ValueType::Composite,
            Self::Container => ValueType::Container,
        }
    }

    fn apply(self, item: &mut ContentItem, check: bool) -> CmrResult<()> {
        match self {
            Self::Text(_, value) => item.set_string_value(value, check),
            Self::Code(entry) => item.set_code_value(entry, check),
            Self::Num(num) => item.set_numeric_value(num, check),
            Self::Image(image) => item.set_image_reference(image, check),
            Self::SCoord(scoord) => item.set_spatial_coordinates(scoord, check),
            Self::Composite(reference) => item.set_composite_reference(reference, check),
            Self::Container => Ok(()),
        }
    }
}

/// Builds a complete content item for a row.
pub(crate) fn build_item(row: Row<'_>, value: RowValue, check: bool) -> CmrResult<ContentItem> {
    let mut item = ContentItem::new(row.relationship, value.value_type(), row.concept.clone());
    value.apply(&mut item, check)?;
    item.set_annotation(row.annotation);
    Ok(item)
}

/// Adds a complete row to `tree`; nothing is added on error.
pub(crate) fn add_row(
    tree: &mut ContentTree,
    mode: AddMode,
    row: Row<'_>,
    value: RowValue,
    check: bool,
) -> CmrResult<NodeId> {
    let item = build_item(row, value, check)?;
    tree.add_item(item, mode)
}

/// Adds the row kept in `slot` or replaces the value of the existing one.
///
/// A new row is placed after the nearest filled slot before `slot`, or
/// below the node of `anchor_slot`. An existing row must have the same
/// value type and concept name.
pub(crate) fn set_row(
    template: &mut SubTemplate,
    slot: usize,
    anchor_slot: usize,
    row: Row<'_>,
    value: RowValue,
    check: bool,
) -> CmrResult<NodeId> {
    let existing = template
        .slot(slot)
        .and_then(|id| Some((id, template.tree().item(id)?.clone())));
    match existing {
        Some((id, mut item)) => {
            if item.value_type() != value.value_type() {
                warn!(
                    concept = row.concept.code_meaning(),
                    row = row.annotation,
                    "cannot replace value, wrong value type"
                );
                return Err(CmrError::InvalidContentItem);
            }
            if item.concept_name() != row.concept {
                warn!(
                    concept = row.concept.code_meaning(),
                    row = row.annotation,
                    "cannot replace value, wrong concept name"
                );
                return Err(CmrError::InvalidConceptName);
            }
            value.apply(&mut item, check)?;
            item.set_annotation(row.annotation);
            debug!(concept = row.concept.code_meaning(), row = row.annotation, "replacing value");
            template.goto_slot(slot);
            let target = template
                .tree_mut()
                .item_mut(id)
                .ok_or(CmrError::InvalidTemplateStructure)?;
            *target = item;
            Ok(id)
        }
        None => {
            let item = build_item(row, value, check)?;
            let mode = template.position_for_row(slot, anchor_slot)?;
            let id = template.tree_mut().add_item(item, mode)?;
            template.store(slot, Some(id));
            Ok(id)
        }
    }
}

/// Returns the selected value of a context group, checked if requested.
pub(crate) fn selected_entry<K: Vocabulary>(
    group: &ContextGroup<K>,
    defined: bool,
    check: bool,
) -> CmrResult<CodedEntry> {
    if check {
        group.check_selected_value(defined)?;
    }
    group.selected_value().cloned().ok_or(CmrError::InvalidValue)
}

/// Builds the detached rows of one finding site with its optional
/// laterality and topographical modifier children.
pub(crate) fn finding_site_rows(
    site: &CodedEntry,
    laterality: &ContextGroup<Laterality>,
    site_modifier: &CodedEntry,
    annotations: [&'static str; 3],
    check: bool,
) -> CmrResult<ContentTree> {
    let [site_row, laterality_row, modifier_row] = annotations;
    let finding_site = sct::FINDING_SITE;
    let mut rows = ContentTree::new();
    let site_id = add_row(
        &mut rows,
        AddMode::AfterCurrent,
        Row::new(RelationshipType::HasConceptMod, &finding_site, site_row),
        RowValue::Code(site.clone()),
        check,
    )?;
    if laterality.has_selected_value() {
        let concept = sct::LATERALITY;
        add_row(
            &mut rows,
            AddMode::BelowCurrent,
            Row::new(RelationshipType::HasConceptMod, &concept, laterality_row),
            RowValue::Code(selected_entry(laterality, false, check)?),
            check,
        )?;
    }
    if site_modifier.is_complete() {
        let concept = sct::TOPOGRAPHICAL_MODIFIER;
        rows.goto_node(site_id);
        add_row(
            &mut rows,
            AddMode::BelowCurrent,
            Row::new(RelationshipType::HasConceptMod, &concept, modifier_row),
            RowValue::Code(site_modifier.clone()),
            check,
        )?;
    }
    Ok(rows)
}

/// Reference to the composite object described by `dataset`.
pub(crate) fn composite_reference_of(dataset: &dyn Dataset) -> CompositeReference {
    CompositeReference::new(
        dataset.string_value(tags::SOP_CLASS_UID, 0).unwrap_or_default(),
        dataset.string_value(tags::SOP_INSTANCE_UID, 0).unwrap_or_default(),
    )
}

/// Installs a `tracing` subscriber writing to the test output.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}
