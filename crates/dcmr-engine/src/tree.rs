//! Content items and the cursor-navigable content tree.
//!
//! A [`ContentTree`] is an ordered forest of [`ContentItem`]s stored in an
//! arena keyed by [`NodeId`]. Every tree has one cursor; adding, navigating
//! and removing always happens relative to it.
//!
//! Node ids come from one process-wide counter. Ids are therefore unique
//! across trees, which lets a composer build a detached subtree, remember ids
//! inside it, and splice it into a live tree without remapping anything.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use dcmr_types::{
    is_valid_uid, AddMode, CodedEntry, CompositeReference, ImageReference, NodeId,
    NumericMeasurement, RelationshipType, SpatialCoordinates, TemplateIdentification, ValueType,
};
use tracing::trace;

use crate::template::SharedSubTemplate;
use crate::types::{CmrError, CmrResult};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

fn next_node_id() -> NodeId {
    loop {
        if let Some(id) = NodeId::new(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)) {
            return id;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Content item values
// ═══════════════════════════════════════════════════════════════════════════

/// Value of a content item.
#[derive(Clone, Default)]
pub enum ContentValue {
    /// No value set yet (containers never have one).
    #[default]
    Empty,
    /// Value of a text-like item (TEXT, DATE, TIME, DATETIME, UIDREF, PNAME).
    Text(String),
    /// Value of a CODE item.
    Code(CodedEntry),
    /// Value of a NUM item.
    Num(NumericMeasurement),
    /// Value of an IMAGE item.
    Image(ImageReference),
    /// Value of a SCOORD item.
    SCoord(SpatialCoordinates),
    /// Value of a COMPOSITE item.
    Composite(CompositeReference),
    /// Referenced template of an included template item.
    Template(SharedSubTemplate),
}

impl PartialEq for ContentValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Code(a), Self::Code(b)) => a == b,
            (Self::Num(a), Self::Num(b)) => a == b,
            (Self::Image(a), Self::Image(b)) => a == b,
            (Self::SCoord(a), Self::SCoord(b)) => a == b,
            (Self::Composite(a), Self::Composite(b)) => a == b,
            (Self::Template(a), Self::Template(b)) => {
                Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ContentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Text(value) => f.debug_tuple("Text").field(value).finish(),
            Self::Code(entry) => f.debug_tuple("Code").field(entry).finish(),
            Self::Num(num) => f.debug_tuple("Num").field(num).finish(),
            Self::Image(image) => f.debug_tuple("Image").field(image).finish(),
            Self::SCoord(scoord) => f.debug_tuple("SCoord").field(scoord).finish(),
            Self::Composite(reference) => f.debug_tuple("Composite").field(reference).finish(),
            Self::Template(template) => match template.try_borrow() {
                Ok(template) => f
                    .debug_tuple("Template")
                    .field(&template.sub_template().identification().template_id)
                    .finish(),
                Err(_) => f.write_str("Template(<borrowed>)"),
            },
        }
    }
}

impl fmt::Display for ContentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(value) => write!(f, "\"{value}\""),
            Self::Code(entry) => write!(f, "{entry}"),
            Self::Num(num) => write!(f, "\"{}\" {}", num.value, num.unit),
            Self::Image(image) => write!(f, "({},{})", image.sop_class_uid, image.sop_instance_uid),
            Self::SCoord(scoord) => {
                write!(f, "({}", scoord.graphic_type.defined_term())?;
                for (column, row) in &scoord.points {
                    write!(f, ",{column}/{row}")?;
                }
                f.write_str(")")
            }
            Self::Composite(reference) => {
                write!(f, "({},{})", reference.sop_class_uid, reference.sop_instance_uid)
            }
            Self::Template(template) => match template.try_borrow() {
                Ok(template) => {
                    let id = template.sub_template().identification();
                    write!(f, "(TID {}, {})", id.template_id, id.mapping_resource)
                }
                Err(_) => f.write_str("(included template)"),
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// String value formats
// ═══════════════════════════════════════════════════════════════════════════

fn all_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

fn two_digits(value: &str, at: usize) -> Option<u32> {
    value.get(at..at + 2)?.parse().ok()
}

fn is_valid_date(value: &str) -> bool {
    if value.len() != 8 || !all_digits(value) {
        return false;
    }
    matches!(two_digits(value, 4), Some(1..=12)) && matches!(two_digits(value, 6), Some(1..=31))
}

fn is_valid_fraction(fraction: &str) -> bool {
    (1..=6).contains(&fraction.len()) && all_digits(fraction)
}

fn is_valid_time(value: &str) -> bool {
    let (main, fraction) = match value.split_once('.') {
        Some((main, fraction)) => (main, Some(fraction)),
        None => (value, None),
    };
    if !matches!(main.len(), 2 | 4 | 6) || !all_digits(main) {
        return false;
    }
    if let Some(fraction) = fraction {
        if main.len() != 6 || !is_valid_fraction(fraction) {
            return false;
        }
    }
    let hours_ok = matches!(two_digits(main, 0), Some(0..=23));
    let minutes_ok = main.len() < 4 || matches!(two_digits(main, 2), Some(0..=59));
    let seconds_ok = main.len() < 6 || matches!(two_digits(main, 4), Some(0..=60));
    hours_ok && minutes_ok && seconds_ok
}

fn is_valid_date_time(value: &str) -> bool {
    let (value, offset) = match value.find(['+', '-']) {
        Some(pos) => (&value[..pos], Some(&value[pos + 1..])),
        None => (value, None),
    };
    if let Some(offset) = offset {
        if offset.len() != 4 || !all_digits(offset) {
            return false;
        }
    }
    let (main, fraction) = match value.split_once('.') {
        Some((main, fraction)) => (main, Some(fraction)),
        None => (value, None),
    };
    if !matches!(main.len(), 4 | 6 | 8 | 10 | 12 | 14) || !all_digits(main) {
        return false;
    }
    if let Some(fraction) = fraction {
        if main.len() != 14 || !is_valid_fraction(fraction) {
            return false;
        }
    }
    let date_ok = match main.len() {
        4 => true,
        6 => matches!(two_digits(main, 4), Some(1..=12)),
        _ => is_valid_date(&main[..8]),
    };
    date_ok && (main.len() <= 8 || is_valid_time(&main[8..]))
}

/// Checks a string value against the format of a text-like value type.
fn is_valid_string_value(value_type: ValueType, value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    match value_type {
        ValueType::Date => is_valid_date(value),
        ValueType::Time => is_valid_time(value),
        ValueType::DateTime => is_valid_date_time(value),
        ValueType::UidRef => is_valid_uid(value),
        ValueType::PName => !value.contains('\\') && value.split('^').count() <= 5,
        _ => true,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Content item
// ═══════════════════════════════════════════════════════════════════════════

/// One row of a structured report: relationship, value type, concept name,
/// value and an optional annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    relationship: RelationshipType,
    value_type: ValueType,
    concept_name: CodedEntry,
    value: ContentValue,
    annotation: Option<String>,
    template_identification: Option<TemplateIdentification>,
}

impl ContentItem {
    /// Creates an item without value and annotation.
    pub fn new(relationship: RelationshipType, value_type: ValueType, concept_name: CodedEntry) -> Self {
        Self {
            relationship,
            value_type,
            concept_name,
            value: ContentValue::Empty,
            annotation: None,
            template_identification: None,
        }
    }

    /// Returns the relationship type with the parent.
    pub fn relationship_type(&self) -> RelationshipType {
        self.relationship
    }

    /// Sets the relationship type with the parent.
    pub fn set_relationship_type(&mut self, relationship: RelationshipType) {
        self.relationship = relationship;
    }

    /// Returns the value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns the concept name (empty if none was set).
    pub fn concept_name(&self) -> &CodedEntry {
        &self.concept_name
    }

    /// Sets the concept name.
    ///
    /// With `check`, the entry must be valid, and may only be empty if the
    /// value type allows that.
    pub fn set_concept_name(&mut self, concept_name: CodedEntry, check: bool) -> CmrResult<()> {
        if check && !concept_name_acceptable(self.value_type, &concept_name) {
            return Err(CmrError::InvalidConceptName);
        }
        self.concept_name = concept_name;
        Ok(())
    }

    /// Returns the annotation text.
    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    /// Sets the annotation text (not part of the encoded document).
    pub fn set_annotation(&mut self, text: impl Into<String>) {
        self.annotation = Some(text.into());
    }

    /// Returns the identity of the template this item is the root of, if stamped.
    pub fn template_identification(&self) -> Option<&TemplateIdentification> {
        self.template_identification.as_ref()
    }

    /// Stamps the item as the root of a template instance.
    pub fn set_template_identification(&mut self, identification: TemplateIdentification) {
        self.template_identification = Some(identification);
    }

    /// Returns the raw value.
    pub fn value(&self) -> &ContentValue {
        &self.value
    }

    /// Returns the value of a text-like item.
    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            ContentValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value of a CODE item.
    pub fn code_value(&self) -> Option<&CodedEntry> {
        match &self.value {
            ContentValue::Code(entry) => Some(entry),
            _ => None,
        }
    }

    /// Returns the value of a NUM item.
    pub fn numeric_value(&self) -> Option<&NumericMeasurement> {
        match &self.value {
            ContentValue::Num(num) => Some(num),
            _ => None,
        }
    }

    /// Returns the value of an IMAGE item.
    pub fn image_reference(&self) -> Option<&ImageReference> {
        match &self.value {
            ContentValue::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Returns the value of a SCOORD item.
    pub fn spatial_coordinates(&self) -> Option<&SpatialCoordinates> {
        match &self.value {
            ContentValue::SCoord(scoord) => Some(scoord),
            _ => None,
        }
    }

    /// Returns the value of a COMPOSITE item.
    pub fn composite_reference(&self) -> Option<&CompositeReference> {
        match &self.value {
            ContentValue::Composite(reference) => Some(reference),
            _ => None,
        }
    }

    /// Returns the referenced template of an included template item.
    pub fn included_template(&self) -> Option<&SharedSubTemplate> {
        match &self.value {
            ContentValue::Template(template) => Some(template),
            _ => None,
        }
    }

    /// Sets the value of a text-like item.
    ///
    /// # Errors
    /// `InvalidContentItem` if the item is not text-like, `InvalidValue` if
    /// `check` is set and the value does not match the format of the value type.
    pub fn set_string_value(&mut self, value: impl Into<String>, check: bool) -> CmrResult<()> {
        if !self.value_type.is_string_type() {
            return Err(CmrError::InvalidContentItem);
        }
        let value = value.into();
        if check && !is_valid_string_value(self.value_type, &value) {
            return Err(CmrError::InvalidValue);
        }
        self.value = ContentValue::Text(value);
        Ok(())
    }

    /// Sets the value of a CODE item.
    pub fn set_code_value(&mut self, entry: CodedEntry, check: bool) -> CmrResult<()> {
        if self.value_type != ValueType::Code {
            return Err(CmrError::InvalidContentItem);
        }
        if check && !(entry.is_complete() && entry.is_valid()) {
            return Err(CmrError::InvalidValue);
        }
        self.value = ContentValue::Code(entry);
        Ok(())
    }

    /// Sets the value of a NUM item.
    pub fn set_numeric_value(&mut self, value: NumericMeasurement, check: bool) -> CmrResult<()> {
        if self.value_type != ValueType::Num {
            return Err(CmrError::InvalidContentItem);
        }
        if check && !value.is_valid() {
            return Err(CmrError::InvalidValue);
        }
        self.value = ContentValue::Num(value);
        Ok(())
    }

    /// Sets the value of an IMAGE item.
    pub fn set_image_reference(&mut self, image: ImageReference, check: bool) -> CmrResult<()> {
        if self.value_type != ValueType::Image {
            return Err(CmrError::InvalidContentItem);
        }
        if check && !image.is_valid() {
            return Err(CmrError::InvalidValue);
        }
        self.value = ContentValue::Image(image);
        Ok(())
    }

    /// Sets the value of a SCOORD item.
    pub fn set_spatial_coordinates(&mut self, scoord: SpatialCoordinates, check: bool) -> CmrResult<()> {
        if self.value_type != ValueType::SCoord {
            return Err(CmrError::InvalidContentItem);
        }
        if check && !scoord.is_valid() {
            return Err(CmrError::InvalidValue);
        }
        self.value = ContentValue::SCoord(scoord);
        Ok(())
    }

    /// Sets the value of a COMPOSITE item.
    pub fn set_composite_reference(&mut self, reference: CompositeReference, check: bool) -> CmrResult<()> {
        if self.value_type != ValueType::Composite {
            return Err(CmrError::InvalidContentItem);
        }
        if check && !reference.is_valid() {
            return Err(CmrError::InvalidValue);
        }
        self.value = ContentValue::Composite(reference);
        Ok(())
    }

    pub(crate) fn set_included_template(&mut self, template: SharedSubTemplate) -> CmrResult<()> {
        if self.value_type != ValueType::IncludedTemplate {
            return Err(CmrError::InvalidContentItem);
        }
        self.value = ContentValue::Template(template);
        Ok(())
    }

    /// Returns true if concept name and value are valid for the value type.
    pub fn is_valid(&self) -> bool {
        if !concept_name_acceptable(self.value_type, &self.concept_name) {
            return false;
        }
        match (&self.value, self.value_type) {
            (ContentValue::Text(value), vt) => is_valid_string_value(vt, value),
            (ContentValue::Code(entry), ValueType::Code) => entry.is_complete() && entry.is_valid(),
            (ContentValue::Num(num), ValueType::Num) => num.is_valid(),
            (ContentValue::Image(image), ValueType::Image) => image.is_valid(),
            (ContentValue::SCoord(scoord), ValueType::SCoord) => scoord.is_valid(),
            (ContentValue::Composite(reference), ValueType::Composite) => reference.is_valid(),
            (ContentValue::Template(_), ValueType::IncludedTemplate) => true,
            (ContentValue::Empty, ValueType::Container)
            | (ContentValue::Empty, ValueType::SCoord3D)
            | (ContentValue::Empty, ValueType::TCoord)
            | (ContentValue::Empty, ValueType::Waveform) => true,
            _ => false,
        }
    }
}

fn concept_name_acceptable(value_type: ValueType, concept_name: &CodedEntry) -> bool {
    if concept_name.is_empty() {
        value_type.concept_name_optional()
    } else {
        concept_name.is_complete() && concept_name.is_valid()
    }
}

impl fmt::Display for ContentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{}>", self.relationship, self.value_type)?;
        if !self.concept_name.is_empty() {
            write!(f, " {}", self.concept_name)?;
        }
        if !matches!(self.value, ContentValue::Empty) {
            write!(f, " = {}", self.value)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Content tree
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct Node {
    item: ContentItem,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An ordered forest of content items with a cursor.
///
/// `Clone` keeps node ids (the copy describes the same nodes); use
/// [`duplicate`](Self::duplicate) for a copy with fresh ids that can be
/// spliced into a tree that still holds the original.
#[derive(Debug, Clone, Default)]
pub struct ContentTree {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    cursor: Option<NodeId>,
}

impl ContentTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Removes all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.cursor = None;
    }

    /// Counts the nodes; with `include_templates`, the nodes of included
    /// templates are added.
    pub fn count_nodes(&self, include_templates: bool) -> usize {
        let mut count = self.nodes.len();
        if include_templates {
            for node in self.nodes.values() {
                if let Some(template) = node.item.included_template() {
                    if let Ok(template) = template.try_borrow() {
                        count += template.sub_template().count_nodes(true);
                    }
                }
            }
        }
        count
    }

    /// Returns the id of the current node.
    pub fn node_id(&self) -> Option<NodeId> {
        self.cursor
    }

    /// Returns true if the tree holds a node with this id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the content item of a node.
    pub fn item(&self, id: NodeId) -> Option<&ContentItem> {
        self.nodes.get(&id).map(|node| &node.item)
    }

    /// Returns the content item of a node for modification.
    pub fn item_mut(&mut self, id: NodeId) -> Option<&mut ContentItem> {
        self.nodes.get_mut(&id).map(|node| &mut node.item)
    }

    /// Returns the current content item.
    pub fn current_item(&self) -> Option<&ContentItem> {
        self.item(self.cursor?)
    }

    /// Returns the current content item for modification.
    pub fn current_item_mut(&mut self) -> Option<&mut ContentItem> {
        let id = self.cursor?;
        self.item_mut(id)
    }

    /// Returns the top-level nodes in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Returns the children of a node in order (empty if unknown).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id)?.parent
    }

    /// Returns the level of the current node (top level is 1, 0 if empty).
    pub fn level(&self) -> usize {
        let mut level = 0;
        let mut current = self.cursor;
        while let Some(id) = current {
            level += 1;
            current = self.parent(id);
        }
        level
    }

    /// Returns true if the current node has children.
    pub fn has_children(&self) -> bool {
        self.cursor
            .map(|id| !self.children(id).is_empty())
            .unwrap_or(false)
    }

    fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.parent(id) {
            Some(parent) => self.children(parent),
            None => &self.roots,
        }
    }

    fn siblings_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            Some(parent) => self.nodes.get_mut(&parent).map(|node| &mut node.children),
            None => Some(&mut self.roots),
        }
    }

    fn position(&self, id: NodeId) -> Option<usize> {
        self.siblings(id).iter().position(|&sibling| sibling == id)
    }

    // ── adding ───────────────────────────────────────────────────────────

    /// A non-empty tree needs a valid current node to place new nodes.
    fn check_placement(&self) -> CmrResult<()> {
        match self.cursor {
            _ if self.is_empty() => Ok(()),
            Some(current) if self.contains(current) => Ok(()),
            _ => Err(CmrError::CannotAddContentItem),
        }
    }

    /// Links a node that is already in the arena relative to `anchor`.
    fn link(&mut self, id: NodeId, anchor: Option<NodeId>, mode: AddMode) {
        let Some(anchor) = anchor else {
            self.roots.push(id);
            return;
        };
        let (parent, index) = match mode {
            AddMode::BeforeCurrent | AddMode::AfterCurrent => {
                let parent = self.parent(anchor);
                let pos = self.position(anchor).unwrap_or(0);
                let index = if mode == AddMode::AfterCurrent { pos + 1 } else { pos };
                (parent, index)
            }
            AddMode::BelowCurrent => (Some(anchor), self.children(anchor).len()),
            AddMode::BelowCurrentBeforeFirstChild => (Some(anchor), 0),
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        }
        if let Some(siblings) = self.siblings_mut(parent) {
            let index = index.min(siblings.len());
            siblings.insert(index, id);
        }
    }

    /// Adds a content item relative to the current node and makes it current.
    ///
    /// The first item of an empty tree becomes its root whatever `mode` says.
    ///
    /// # Errors
    /// `InvalidConceptName` if the concept name is malformed, or empty while
    /// the value type requires one; `CannotAddContentItem` if there is no
    /// valid current node.
    pub fn add_content_item(
        &mut self,
        relationship: RelationshipType,
        value_type: ValueType,
        concept_name: &CodedEntry,
        mode: AddMode,
    ) -> CmrResult<NodeId> {
        let item = ContentItem::new(relationship, value_type, concept_name.clone());
        self.add_item(item, mode)
    }

    /// Adds a prepared content item relative to the current node and makes
    /// it current.
    ///
    /// Fails like [`add_content_item`](Self::add_content_item); the value of
    /// the item is taken as is.
    pub fn add_item(&mut self, item: ContentItem, mode: AddMode) -> CmrResult<NodeId> {
        if !concept_name_acceptable(item.value_type, &item.concept_name) {
            return Err(CmrError::InvalidConceptName);
        }
        self.check_placement()?;
        let anchor = if self.is_empty() { None } else { self.cursor };
        let id = next_node_id();
        self.nodes.insert(
            id,
            Node {
                item,
                parent: None,
                children: Vec::new(),
            },
        );
        self.link(id, anchor, mode);
        self.cursor = Some(id);
        trace!(node = %id, ?mode, "added content item");
        Ok(id)
    }

    /// Adds a content item as the last child of the current node.
    pub fn add_child_content_item(
        &mut self,
        relationship: RelationshipType,
        value_type: ValueType,
        concept_name: &CodedEntry,
    ) -> CmrResult<NodeId> {
        self.add_content_item(relationship, value_type, concept_name, AddMode::BelowCurrent)
    }

    /// Moves all nodes of `other` into this tree at the cursor.
    ///
    /// Top-level nodes of `other` keep their order; those with an unknown
    /// relationship get `default_relationship`. Node ids are kept. The first
    /// inserted node becomes current and its id is returned.
    ///
    /// # Errors
    /// `InvalidTemplateStructure` if `other` is empty or shares node ids with
    /// this tree; `CannotAddContentItem` if there is no valid current node.
    /// On error neither tree is modified.
    pub fn insert_sub_tree(
        &mut self,
        other: &mut ContentTree,
        mode: AddMode,
        default_relationship: RelationshipType,
    ) -> CmrResult<NodeId> {
        let Some(&first) = other.roots.first() else {
            return Err(CmrError::InvalidTemplateStructure);
        };
        if other.nodes.keys().any(|id| self.nodes.contains_key(id)) {
            return Err(CmrError::InvalidTemplateStructure);
        }
        self.check_placement()?;

        let was_empty = self.is_empty();
        let roots = std::mem::take(&mut other.roots);
        self.nodes.extend(other.nodes.drain());
        other.cursor = None;

        let mut anchor = if was_empty { None } else { self.cursor };
        let mut anchor_mode = mode;
        for id in roots {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.parent = None;
                if node.item.relationship == RelationshipType::Unknown {
                    node.item.relationship = default_relationship;
                }
            }
            self.link(id, anchor, anchor_mode);
            anchor = Some(id);
            anchor_mode = AddMode::AfterCurrent;
        }
        self.cursor = Some(first);
        trace!(node = %first, ?mode, "inserted sub tree");
        Ok(first)
    }

    fn collect_sub_tree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for &child in self.children(id) {
            self.collect_sub_tree(child, out);
        }
    }

    /// Unlinks the subtree rooted at the current node and fixes the cursor.
    fn detach_current(&mut self) -> Option<(NodeId, Vec<NodeId>)> {
        let current = self.cursor.filter(|id| self.contains(*id))?;
        let parent = self.parent(current);
        let siblings = self.siblings(current);
        let pos = siblings.iter().position(|&id| id == current)?;
        let next = siblings
            .get(pos + 1)
            .copied()
            .or_else(|| pos.checked_sub(1).and_then(|prev| siblings.get(prev).copied()))
            .or(parent);

        let mut ids = Vec::new();
        self.collect_sub_tree(current, &mut ids);
        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.retain(|&id| id != current);
        }
        self.cursor = next;
        Some((current, ids))
    }

    /// Removes the current node and its descendants.
    ///
    /// Returns the new current node: the next sibling, else the previous
    /// one, else the parent. Ids of the remaining nodes are not changed.
    pub fn remove_current_content_item(&mut self) -> Option<NodeId> {
        let (_, ids) = self.detach_current()?;
        for id in ids {
            self.nodes.remove(&id);
        }
        self.cursor
    }

    /// Removes the subtree rooted at the current node and returns it as a
    /// tree of its own (ids kept, cursor on its root).
    pub fn extract_current_sub_tree(&mut self) -> Option<ContentTree> {
        let (root, ids) = self.detach_current()?;
        let mut extracted = ContentTree::new();
        for id in ids {
            if let Some(mut node) = self.nodes.remove(&id) {
                if id == root {
                    node.parent = None;
                }
                extracted.nodes.insert(id, node);
            }
        }
        extracted.roots.push(root);
        extracted.cursor = Some(root);
        Some(extracted)
    }

    fn copy_sub_tree_into(
        &self,
        id: NodeId,
        parent: Option<NodeId>,
        target: &mut ContentTree,
        mapping: &mut HashMap<NodeId, NodeId>,
    ) -> Option<NodeId> {
        let node = self.nodes.get(&id)?;
        let new_id = next_node_id();
        mapping.insert(id, new_id);
        let children = node
            .children
            .iter()
            .filter_map(|&child| self.copy_sub_tree_into(child, Some(new_id), target, mapping))
            .collect();
        target.nodes.insert(
            new_id,
            Node {
                item: node.item.clone(),
                parent,
                children,
            },
        );
        Some(new_id)
    }

    /// Deep copy with fresh node ids; the cursor points to the copy of the
    /// current node.
    ///
    /// Included templates are shared with the original, not copied.
    pub fn duplicate(&self) -> ContentTree {
        let mut copy = ContentTree::new();
        let mut mapping = HashMap::new();
        for &root in &self.roots {
            if let Some(new_root) = self.copy_sub_tree_into(root, None, &mut copy, &mut mapping) {
                copy.roots.push(new_root);
            }
        }
        copy.cursor = self.cursor.and_then(|id| mapping.get(&id).copied());
        copy
    }

    /// Deep copy of the subtree rooted at `id` with fresh node ids.
    pub fn duplicate_sub_tree(&self, id: NodeId) -> Option<ContentTree> {
        let mut copy = ContentTree::new();
        let mut mapping = HashMap::new();
        let root = self.copy_sub_tree_into(id, None, &mut copy, &mut mapping)?;
        copy.roots.push(root);
        copy.cursor = Some(root);
        Some(copy)
    }

    /// Compares two subtrees by content, ignoring node ids.
    pub fn sub_trees_equal(&self, a: NodeId, b: NodeId) -> bool {
        let (Some(item_a), Some(item_b)) = (self.item(a), self.item(b)) else {
            return false;
        };
        let (children_a, children_b) = (self.children(a), self.children(b));
        item_a == item_b
            && children_a.len() == children_b.len()
            && children_a
                .iter()
                .zip(children_b)
                .all(|(&x, &y)| self.sub_trees_equal(x, y))
    }

    // ── navigation ───────────────────────────────────────────────────────

    fn goto(&mut self, target: Option<NodeId>) -> Option<NodeId> {
        let target = target.filter(|id| self.contains(*id))?;
        self.cursor = Some(target);
        Some(target)
    }

    /// Moves to the first top-level node.
    pub fn goto_root(&mut self) -> Option<NodeId> {
        self.goto(self.roots.first().copied())
    }

    /// Moves to the first sibling of the current node.
    pub fn goto_first(&mut self) -> Option<NodeId> {
        let first = self.cursor.and_then(|id| self.siblings(id).first().copied());
        self.goto(first)
    }

    /// Moves to the last sibling of the current node.
    pub fn goto_last(&mut self) -> Option<NodeId> {
        let last = self.cursor.and_then(|id| self.siblings(id).last().copied());
        self.goto(last)
    }

    /// Moves to the parent of the current node.
    pub fn goto_parent(&mut self) -> Option<NodeId> {
        let parent = self.cursor.and_then(|id| self.parent(id));
        self.goto(parent)
    }

    /// Moves to the first child of the current node.
    pub fn goto_child(&mut self) -> Option<NodeId> {
        let child = self.cursor.and_then(|id| self.children(id).first().copied());
        self.goto(child)
    }

    /// Moves to the previous sibling.
    pub fn goto_previous(&mut self) -> Option<NodeId> {
        let previous = self.cursor.and_then(|id| {
            let pos = self.position(id)?;
            self.siblings(id).get(pos.checked_sub(1)?).copied()
        });
        self.goto(previous)
    }

    /// Moves to the next sibling.
    pub fn goto_next(&mut self) -> Option<NodeId> {
        let next = self.cursor.and_then(|id| {
            let pos = self.position(id)?;
            self.siblings(id).get(pos + 1).copied()
        });
        self.goto(next)
    }

    /// Moves to the node with the given id.
    pub fn goto_node(&mut self, id: NodeId) -> Option<NodeId> {
        self.goto(Some(id))
    }

    /// Node following `id` in depth-first pre-order; without
    /// `search_into_sub` only the next sibling.
    fn following(&self, id: NodeId, search_into_sub: bool) -> Option<NodeId> {
        if !search_into_sub {
            let pos = self.position(id)?;
            return self.siblings(id).get(pos + 1).copied();
        }
        if let Some(&child) = self.children(id).first() {
            return Some(child);
        }
        let mut current = id;
        loop {
            let pos = self.position(current)?;
            if let Some(&next) = self.siblings(current).get(pos + 1) {
                return Some(next);
            }
            current = self.parent(current)?;
        }
    }

    /// Moves one step in depth-first pre-order (or to the next sibling
    /// without `search_into_sub`).
    pub fn iterate(&mut self, search_into_sub: bool) -> Option<NodeId> {
        let next = self.cursor.and_then(|id| self.following(id, search_into_sub));
        self.goto(next)
    }

    /// Returns the ids of all nodes in depth-first pre-order with their level.
    pub fn pre_order(&self) -> Vec<(usize, NodeId)> {
        fn walk(tree: &ContentTree, ids: &[NodeId], level: usize, out: &mut Vec<(usize, NodeId)>) {
            for &id in ids {
                out.push((level, id));
                walk(tree, tree.children(id), level + 1, out);
            }
        }
        let mut out = Vec::with_capacity(self.nodes.len());
        walk(self, &self.roots, 1, &mut out);
        out
    }

    /// Iterates all content items in depth-first pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, NodeId, &ContentItem)> + '_ {
        self.pre_order()
            .into_iter()
            .filter_map(move |(level, id)| Some((level, id, self.item(id)?)))
    }

    fn find_in_pre_order(&self, mut predicate: impl FnMut(&ContentItem) -> bool) -> Option<NodeId> {
        self.pre_order()
            .into_iter()
            .map(|(_, id)| id)
            .find(|&id| self.item(id).map(&mut predicate).unwrap_or(false))
    }

    /// Moves to the first node (pre-order, whole tree) with this concept name.
    pub fn goto_named_node(&mut self, concept_name: &CodedEntry) -> Option<NodeId> {
        let found = self.find_in_pre_order(|item| item.concept_name() == concept_name);
        self.goto(found)
    }

    /// Moves to the first child of the current node with this concept name;
    /// with `search_into_sub`, all descendants are searched.
    pub fn goto_named_child_node(
        &mut self,
        concept_name: &CodedEntry,
        search_into_sub: bool,
    ) -> Option<NodeId> {
        let current = self.cursor?;
        let mut candidates = Vec::new();
        if search_into_sub {
            self.collect_sub_tree(current, &mut candidates);
            candidates.remove(0);
        } else {
            candidates.extend_from_slice(self.children(current));
        }
        let found = candidates
            .into_iter()
            .find(|&id| self.item(id).map(|item| item.concept_name() == concept_name).unwrap_or(false));
        self.goto(found)
    }

    /// Moves to the next node after the current one with this concept name.
    pub fn goto_next_named_node(
        &mut self,
        concept_name: &CodedEntry,
        search_into_sub: bool,
    ) -> Option<NodeId> {
        let mut current = self.cursor?;
        while let Some(next) = self.following(current, search_into_sub) {
            if self.item(next).map(|item| item.concept_name() == concept_name).unwrap_or(false) {
                return self.goto(Some(next));
            }
            current = next;
        }
        None
    }

    /// Moves to the first node (pre-order) with this annotation text.
    pub fn goto_annotated_node(&mut self, annotation: &str) -> Option<NodeId> {
        let found = self.find_in_pre_order(|item| item.annotation() == Some(annotation));
        self.goto(found)
    }

    /// Returns true if the tree is non-empty and every content item is valid.
    pub fn is_valid(&self) -> bool {
        !self.is_empty() && self.nodes.values().all(|node| node.item.is_valid())
    }
}

impl fmt::Display for ContentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (level, id, item) in self.nodes() {
            let marker = if Some(id) == self.cursor { '>' } else { ' ' };
            write!(f, "{marker}{:indent$}{item}", "", indent = (level - 1) * 2)?;
            if let Some(annotation) = item.annotation() {
                write!(f, "  # {annotation}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmr_types::codes::{dcm, ucum};

    fn library() -> (ContentTree, NodeId) {
        let mut tree = ContentTree::new();
        let root = tree
            .add_content_item(
                RelationshipType::Unknown,
                ValueType::Container,
                &dcm::IMAGE_LIBRARY,
                AddMode::AfterCurrent,
            )
            .unwrap();
        (tree, root)
    }

    fn add_text(tree: &mut ContentTree, concept: &CodedEntry, mode: AddMode) -> NodeId {
        tree.add_content_item(RelationshipType::HasObsContext, ValueType::Text, concept, mode)
            .unwrap()
    }

    #[test]
    fn test_add_modes() {
        let (mut tree, root) = library();
        let b = add_text(&mut tree, &dcm::STUDY_DATE, AddMode::BelowCurrent);
        let d = add_text(&mut tree, &dcm::STUDY_TIME, AddMode::AfterCurrent);
        tree.goto_node(d);
        let c = add_text(&mut tree, &dcm::CONTENT_DATE, AddMode::BeforeCurrent);
        tree.goto_node(root);
        let a = add_text(&mut tree, &dcm::MODALITY, AddMode::BelowCurrentBeforeFirstChild);

        assert_eq!(tree.children(root), &[a, b, c, d]);
        assert_eq!(tree.parent(c), Some(root));
        assert_eq!(tree.node_id(), Some(a));
        assert_eq!(tree.level(), 2);
        assert_eq!(tree.count_nodes(false), 5);
    }

    #[test]
    fn test_concept_name_required() {
        let mut tree = ContentTree::new();
        let result = tree.add_content_item(
            RelationshipType::Contains,
            ValueType::Text,
            &CodedEntry::empty(),
            AddMode::AfterCurrent,
        );
        assert!(matches!(result, Err(CmrError::InvalidConceptName)));
        assert!(tree.is_empty());

        // image items may omit the concept name
        tree.add_content_item(
            RelationshipType::Contains,
            ValueType::Image,
            &CodedEntry::empty(),
            AddMode::AfterCurrent,
        )
        .unwrap();
        assert_eq!(tree.count_nodes(false), 1);
    }

    #[test]
    fn test_navigation_leaves_cursor_on_absence() {
        let (mut tree, root) = library();
        let a = add_text(&mut tree, &dcm::STUDY_DATE, AddMode::BelowCurrent);
        let b = add_text(&mut tree, &dcm::STUDY_TIME, AddMode::AfterCurrent);

        assert_eq!(tree.goto_next(), None);
        assert_eq!(tree.node_id(), Some(b));
        assert_eq!(tree.goto_child(), None);
        assert_eq!(tree.node_id(), Some(b));
        assert_eq!(tree.goto_previous(), Some(a));
        assert_eq!(tree.goto_first(), Some(a));
        assert_eq!(tree.goto_last(), Some(b));
        assert_eq!(tree.goto_parent(), Some(root));
        assert_eq!(tree.goto_parent(), None);
        assert_eq!(tree.node_id(), Some(root));
        assert_eq!(tree.goto_child(), Some(a));
        assert_eq!(tree.goto_root(), Some(root));
    }

    #[test]
    fn test_named_and_annotated_nodes() {
        let (mut tree, root) = library();
        let group = tree
            .add_content_item(
                RelationshipType::Contains,
                ValueType::Container,
                &dcm::IMAGE_LIBRARY_GROUP,
                AddMode::BelowCurrent,
            )
            .unwrap();
        let modality = tree
            .add_content_item(
                RelationshipType::HasAcqContext,
                ValueType::Code,
                &dcm::MODALITY,
                AddMode::BelowCurrent,
            )
            .unwrap();
        tree.current_item_mut().unwrap().set_annotation("TID 1602 - Row 1");

        tree.goto_node(root);
        assert_eq!(tree.goto_named_child_node(&dcm::MODALITY, false), None);
        assert_eq!(tree.goto_named_child_node(&dcm::MODALITY, true), Some(modality));
        tree.goto_node(root);
        assert_eq!(tree.goto_named_node(&dcm::IMAGE_LIBRARY_GROUP), Some(group));
        tree.goto_node(root);
        assert_eq!(tree.goto_annotated_node("TID 1602 - Row 1"), Some(modality));
        assert_eq!(tree.goto_annotated_node("TID 1602 - Row 2"), None);
        assert_eq!(tree.node_id(), Some(modality));
    }

    #[test]
    fn test_iterate_pre_order() {
        let (mut tree, root) = library();
        let a = add_text(&mut tree, &dcm::STUDY_DATE, AddMode::BelowCurrent);
        let a1 = add_text(&mut tree, &dcm::CONTENT_DATE, AddMode::BelowCurrent);
        tree.goto_node(a);
        let b = add_text(&mut tree, &dcm::STUDY_TIME, AddMode::AfterCurrent);

        tree.goto_node(root);
        assert_eq!(tree.iterate(true), Some(a));
        assert_eq!(tree.iterate(true), Some(a1));
        assert_eq!(tree.iterate(true), Some(b));
        assert_eq!(tree.iterate(true), None);

        tree.goto_node(a);
        assert_eq!(tree.iterate(false), Some(b));
        tree.goto_node(a);
        assert_eq!(tree.goto_next_named_node(&dcm::STUDY_TIME, true), Some(b));

        let levels: Vec<usize> = tree.nodes().map(|(level, _, _)| level).collect();
        assert_eq!(levels, vec![1, 2, 3, 2]);
    }

    #[test]
    fn test_remove_moves_cursor() {
        let (mut tree, root) = library();
        let a = add_text(&mut tree, &dcm::STUDY_DATE, AddMode::BelowCurrent);
        let b = add_text(&mut tree, &dcm::STUDY_TIME, AddMode::AfterCurrent);
        let c = add_text(&mut tree, &dcm::CONTENT_DATE, AddMode::AfterCurrent);

        tree.goto_node(b);
        assert_eq!(tree.remove_current_content_item(), Some(c));
        assert_eq!(tree.remove_current_content_item(), Some(a));
        assert_eq!(tree.remove_current_content_item(), Some(root));
        assert_eq!(tree.remove_current_content_item(), None);
        assert!(tree.is_empty());
        assert!(!tree.contains(a));
    }

    #[test]
    fn test_remove_keeps_ids_of_survivors() {
        let (mut tree, root) = library();
        let a = add_text(&mut tree, &dcm::STUDY_DATE, AddMode::BelowCurrent);
        let b = add_text(&mut tree, &dcm::STUDY_TIME, AddMode::AfterCurrent);
        tree.goto_node(a);
        tree.remove_current_content_item();
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.item(b).unwrap().concept_name(), &dcm::STUDY_TIME);
    }

    #[test]
    fn test_insert_sub_tree() {
        let (mut tree, root) = library();
        let mut detached = ContentTree::new();
        let first = detached
            .add_content_item(
                RelationshipType::Unknown,
                ValueType::Code,
                &dcm::MODALITY,
                AddMode::AfterCurrent,
            )
            .unwrap();
        let second = detached
            .add_content_item(
                RelationshipType::HasConceptMod,
                ValueType::Date,
                &dcm::STUDY_DATE,
                AddMode::AfterCurrent,
            )
            .unwrap();

        tree.goto_node(root);
        let inserted = tree
            .insert_sub_tree(&mut detached, AddMode::BelowCurrent, RelationshipType::HasAcqContext)
            .unwrap();
        assert_eq!(inserted, first);
        assert!(detached.is_empty());
        assert_eq!(tree.children(root), &[first, second]);
        assert_eq!(
            tree.item(first).unwrap().relationship_type(),
            RelationshipType::HasAcqContext
        );
        assert_eq!(
            tree.item(second).unwrap().relationship_type(),
            RelationshipType::HasConceptMod
        );
        assert_eq!(tree.node_id(), Some(first));
    }

    #[test]
    fn test_insert_sub_tree_failures_leave_trees_unchanged() {
        let (mut tree, _) = library();
        let mut empty = ContentTree::new();
        let result = tree.insert_sub_tree(&mut empty, AddMode::BelowCurrent, RelationshipType::Contains);
        assert!(matches!(result, Err(CmrError::InvalidTemplateStructure)));

        // a clone shares ids with the original
        let mut same_ids = tree.clone();
        let result = tree.insert_sub_tree(&mut same_ids, AddMode::BelowCurrent, RelationshipType::Contains);
        assert!(matches!(result, Err(CmrError::InvalidTemplateStructure)));
        assert_eq!(same_ids.count_nodes(false), 1);
        assert_eq!(tree.count_nodes(false), 1);

        let mut copy = tree.duplicate();
        tree.insert_sub_tree(&mut copy, AddMode::BelowCurrent, RelationshipType::Contains)
            .unwrap();
        assert_eq!(tree.count_nodes(false), 2);
    }

    #[test]
    fn test_extract_and_duplicate() {
        let (mut tree, root) = library();
        let a = add_text(&mut tree, &dcm::STUDY_DATE, AddMode::BelowCurrent);
        add_text(&mut tree, &dcm::CONTENT_DATE, AddMode::BelowCurrent);
        tree.goto_node(a);
        let b = add_text(&mut tree, &dcm::STUDY_TIME, AddMode::AfterCurrent);

        let copy = tree.duplicate_sub_tree(a).unwrap();
        assert_eq!(copy.count_nodes(false), 2);
        assert!(!copy.contains(a));

        tree.goto_node(a);
        let extracted = tree.extract_current_sub_tree().unwrap();
        assert_eq!(extracted.count_nodes(false), 2);
        assert_eq!(extracted.roots(), &[a]);
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.node_id(), Some(b));
    }

    #[test]
    fn test_sub_trees_equal_ignores_ids() {
        let (mut tree, root) = library();
        let a = add_text(&mut tree, &dcm::STUDY_DATE, AddMode::BelowCurrent);
        tree.current_item_mut().unwrap().set_string_value("20240101", true).unwrap();
        let b = add_text(&mut tree, &dcm::STUDY_DATE, AddMode::AfterCurrent);
        tree.current_item_mut().unwrap().set_string_value("20240101", true).unwrap();
        assert!(tree.sub_trees_equal(a, b));

        tree.current_item_mut().unwrap().set_string_value("20240102", true).unwrap();
        assert!(!tree.sub_trees_equal(a, b));
        assert!(!tree.sub_trees_equal(a, root));
    }

    #[test]
    fn test_string_value_formats() {
        let mut item = ContentItem::new(RelationshipType::HasAcqContext, ValueType::Date, dcm::STUDY_DATE);
        assert!(item.set_string_value("20240229", true).is_ok());
        assert!(matches!(item.set_string_value("2024-02-29", true), Err(CmrError::InvalidValue)));
        assert!(matches!(item.set_string_value("20241301", true), Err(CmrError::InvalidValue)));
        assert_eq!(item.string_value(), Some("20240229"));
        assert!(item.set_string_value("garbage", false).is_ok());
        assert!(!item.is_valid());

        let mut item = ContentItem::new(RelationshipType::HasAcqContext, ValueType::Time, dcm::STUDY_TIME);
        assert!(item.set_string_value("101500.123", true).is_ok());
        assert!(item.set_string_value("1015", true).is_ok());
        assert!(item.set_string_value("251500", true).is_err());

        let mut item = ContentItem::new(RelationshipType::HasAcqContext, ValueType::DateTime, dcm::STUDY_TIME);
        assert!(item.set_string_value("20240101101500.5+0100", true).is_ok());
        assert!(item.set_string_value("202401011015", true).is_ok());
        assert!(item.set_string_value("2024010110150", true).is_err());

        let mut item = ContentItem::new(RelationshipType::HasAcqContext, ValueType::UidRef, dcm::FRAME_OF_REFERENCE_UID);
        assert!(item.set_string_value("1.2.3.4", true).is_ok());
        assert!(item.set_string_value("1.02.3", true).is_err());
    }

    #[test]
    fn test_value_type_mismatch() {
        let mut item = ContentItem::new(RelationshipType::HasAcqContext, ValueType::Code, dcm::MODALITY);
        assert!(matches!(item.set_string_value("CT", false), Err(CmrError::InvalidContentItem)));
        assert!(matches!(
            item.set_numeric_value(NumericMeasurement::new("1", ucum::MILLIMETER), false),
            Err(CmrError::InvalidContentItem)
        ));
        assert!(matches!(item.set_code_value(CodedEntry::empty(), true), Err(CmrError::InvalidValue)));
        assert!(!item.is_valid());
        item.set_code_value(CodedEntry::new("CT", "DCM", "Computed Tomography"), true)
            .unwrap();
        assert!(item.is_valid());
    }

    #[test]
    fn test_spatial_coordinates_and_composite_values() {
        use dcmr_types::{CompositeReference, GraphicType, SpatialCoordinates, REAL_WORLD_VALUE_MAPPING_STORAGE_UID};

        let mut scoord = ContentItem::new(RelationshipType::InferredFrom, ValueType::SCoord, dcm::FINDING);
        assert!(!scoord.is_valid());
        let two_points = SpatialCoordinates::new(GraphicType::Point, vec![(1.0, 2.0), (3.0, 4.0)]);
        assert!(matches!(scoord.set_spatial_coordinates(two_points, true), Err(CmrError::InvalidValue)));
        let circle = SpatialCoordinates::new(GraphicType::Circle, vec![(10.0, 10.0), (12.5, 10.0)]);
        scoord.set_spatial_coordinates(circle.clone(), true).unwrap();
        assert!(scoord.is_valid());
        assert_eq!(scoord.spatial_coordinates(), Some(&circle));
        assert_eq!(scoord.value().to_string(), "(CIRCLE,10/10,12.5/10)");

        let mut composite = ContentItem::new(
            RelationshipType::InferredFrom,
            ValueType::Composite,
            dcm::REAL_WORLD_VALUE_MAP_USED_FOR_MEASUREMENT,
        );
        let reference = CompositeReference::new(REAL_WORLD_VALUE_MAPPING_STORAGE_UID, "1.2.3.4");
        assert!(matches!(
            scoord.set_composite_reference(reference.clone(), true),
            Err(CmrError::InvalidContentItem)
        ));
        composite.set_composite_reference(reference.clone(), true).unwrap();
        assert!(composite.is_valid());
        assert_eq!(composite.composite_reference(), Some(&reference));
    }

    #[test]
    fn test_tree_validity_and_display() {
        let (mut tree, _) = library();
        assert!(tree.is_valid());
        tree.add_content_item(
            RelationshipType::HasAcqContext,
            ValueType::Num,
            &dcm::PIXEL_DATA_ROWS,
            AddMode::BelowCurrent,
        )
        .unwrap();
        assert!(!tree.is_valid());
        tree.current_item_mut()
            .unwrap()
            .set_numeric_value(NumericMeasurement::new("512", ucum::PIXELS), true)
            .unwrap();
        assert!(tree.is_valid());

        let rendered = tree.to_string();
        assert!(rendered.contains("Image Library"));
        assert!(rendered.contains(">  <HAS ACQ CONTEXT:NUM>"));
    }
}
