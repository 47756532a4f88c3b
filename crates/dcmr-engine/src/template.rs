//! Sub-templates: a content tree with template identity, policy flags and
//! bookmarks.

use std::cell::RefCell;
use std::rc::Rc;

use dcmr_types::{AddMode, CodedEntry, NodeId, RelationshipType, TemplateIdentification, ValueType};
use tracing::trace;

use crate::bookmarks::NodeBookmarks;
use crate::tree::ContentTree;
use crate::types::{CmrError, CmrResult};

/// Shared handle to a template instance referenced by an included template
/// item. The container and the caller may both hold it.
pub type SharedSubTemplate = Rc<RefCell<dyn Template>>;

/// Behavior common to all template composers.
///
/// A composer owns a [`SubTemplate`] and adds its own validity rule.
pub trait Template {
    /// The underlying sub-template.
    fn sub_template(&self) -> &SubTemplate;

    /// The underlying sub-template for modification.
    fn sub_template_mut(&mut self) -> &mut SubTemplate;

    /// Template-specific validity, recomputed on every call.
    fn is_valid(&self) -> bool {
        self.sub_template().is_valid()
    }

    /// Removes all content (and bookmarks).
    fn clear(&mut self) {
        self.sub_template_mut().clear();
    }

    /// Returns true if the template has no content.
    fn is_empty(&self) -> bool {
        self.sub_template().is_empty()
    }
}

/// Wraps the given template into a shared handle.
pub fn share<T: Template + 'static>(template: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(template))
}

/// A content tree that is an instance of a template.
#[derive(Debug, Clone)]
pub struct SubTemplate {
    tree: ContentTree,
    identification: TemplateIdentification,
    extensible: bool,
    order_significant: bool,
    bookmarks: NodeBookmarks,
}

impl SubTemplate {
    /// Creates an empty instance of a DCMR template.
    pub fn new(template_id: &str, extensible: bool, order_significant: bool) -> Self {
        Self::with_identification(
            TemplateIdentification::dcmr(template_id),
            extensible,
            order_significant,
        )
    }

    /// Creates an empty instance of a template from any mapping resource.
    pub fn with_identification(
        identification: TemplateIdentification,
        extensible: bool,
        order_significant: bool,
    ) -> Self {
        Self {
            tree: ContentTree::new(),
            identification,
            extensible,
            order_significant,
            bookmarks: NodeBookmarks::default(),
        }
    }

    /// Builder that reserves bookmark slots.
    pub fn with_slots(mut self, count: usize) -> Self {
        self.bookmarks.reserve_slots(count);
        self
    }

    /// Template identity.
    pub fn identification(&self) -> &TemplateIdentification {
        &self.identification
    }

    /// Returns true if template id and mapping resource match.
    pub fn compare_identification(&self, template_id: &str, mapping_resource: &str) -> bool {
        self.identification.matches(template_id, mapping_resource)
    }

    /// Whether content beyond the template rows may be added.
    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// Sets the extensibility flag.
    pub fn set_extensible(&mut self, extensible: bool) {
        self.extensible = extensible;
    }

    /// Whether repeated rows keep their insertion order.
    pub fn is_order_significant(&self) -> bool {
        self.order_significant
    }

    /// Sets the order significance flag.
    pub fn set_order_significant(&mut self, order_significant: bool) {
        self.order_significant = order_significant;
    }

    /// The content tree.
    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    /// The content tree for modification.
    pub fn tree_mut(&mut self) -> &mut ContentTree {
        &mut self.tree
    }

    /// The bookmarks.
    pub fn bookmarks(&self) -> &NodeBookmarks {
        &self.bookmarks
    }

    /// Returns true if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Counts nodes, optionally including those of included templates.
    pub fn count_nodes(&self, include_templates: bool) -> usize {
        self.tree.count_nodes(include_templates)
    }

    /// Removes all nodes and empties every bookmark slot.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.bookmarks.clear();
    }

    /// Returns true if the tree is non-empty and every item is valid.
    pub fn is_valid(&self) -> bool {
        self.identification.is_complete() && self.tree.is_valid()
    }

    // ── bookmarks ────────────────────────────────────────────────────────

    /// Stores a node id in a slot.
    pub fn store(&mut self, slot: usize, id: Option<NodeId>) {
        self.bookmarks.store(slot, id);
    }

    /// Returns the node id stored in a slot, or `None` if the node has been
    /// removed from the tree since.
    pub fn slot(&self, slot: usize) -> Option<NodeId> {
        self.bookmarks.get(slot).filter(|&id| self.tree.contains(id))
    }

    /// Returns true if the node of a slot exists and has the given value type.
    pub fn slot_has_value_type(&self, slot: usize, value_type: ValueType) -> bool {
        self.slot(slot)
            .and_then(|id| self.tree.item(id))
            .is_some_and(|item| item.value_type() == value_type)
    }

    /// Moves the cursor to the node of a slot.
    pub fn goto_slot(&mut self, slot: usize) -> Option<NodeId> {
        self.bookmarks.goto_slot(&mut self.tree, slot)
    }

    /// Moves the cursor to the node of a slot or the nearest filled slot before it.
    pub fn goto_last_slot(&mut self, slot: usize) -> Option<NodeId> {
        self.bookmarks.goto_last_slot(&mut self.tree, slot)
    }

    /// Moves the cursor to where a new instance of the row kept in `slot`
    /// belongs and returns the add mode to use there.
    ///
    /// After an existing row (of this or an earlier slot) the mode is
    /// `AfterCurrent`. If the walk back ends at the node of `anchor_slot`,
    /// the row becomes its last child when order is significant, or its
    /// first child otherwise.
    pub fn position_for_row(&mut self, slot: usize, anchor_slot: usize) -> CmrResult<AddMode> {
        let anchor = self.slot(anchor_slot).ok_or(CmrError::InvalidTemplateStructure)?;
        match self.goto_last_slot(slot) {
            Some(id) if id == anchor => Ok(if self.order_significant {
                AddMode::BelowCurrent
            } else {
                AddMode::BelowCurrentBeforeFirstChild
            }),
            Some(_) => Ok(AddMode::AfterCurrent),
            None => Err(CmrError::InvalidTemplateStructure),
        }
    }

    // ── templates ────────────────────────────────────────────────────────

    /// Copies the content of another template into this one at the cursor,
    /// stamping the copied root with the other template's identity.
    ///
    /// # Errors
    /// `NonExtensibleTemplate` if this template is not extensible,
    /// `InvalidTemplateStructure` if `other` is empty.
    pub fn insert_template(
        &mut self,
        other: &SubTemplate,
        mode: AddMode,
        default_relationship: RelationshipType,
    ) -> CmrResult<NodeId> {
        if !self.extensible {
            return Err(CmrError::NonExtensibleTemplate);
        }
        let mut copy = other.tree.duplicate();
        let root = copy.roots().first().copied().ok_or(CmrError::InvalidTemplateStructure)?;
        if let Some(item) = copy.item_mut(root) {
            item.set_template_identification(other.identification.clone());
        }
        self.tree.insert_sub_tree(&mut copy, mode, default_relationship)
    }

    /// Adds an included template item referencing `template`.
    pub fn include_template(
        &mut self,
        template: SharedSubTemplate,
        mode: AddMode,
        relationship: RelationshipType,
    ) -> CmrResult<NodeId> {
        let mut staged = ContentTree::new();
        staged.add_content_item(
            relationship,
            ValueType::IncludedTemplate,
            &CodedEntry::empty(),
            AddMode::AfterCurrent,
        )?;
        if let Some(item) = staged.current_item_mut() {
            item.set_included_template(template)?;
        }
        self.tree.insert_sub_tree(&mut staged, mode, relationship)
    }

    /// Replaces every included template item by a copy of the referenced
    /// template's content; returns the number of items replaced.
    ///
    /// Bookmarks that pointed to an included template item no longer resolve.
    pub fn expand_included_templates(&mut self) -> CmrResult<usize> {
        let mut expanded = 0;
        loop {
            let next = self.tree.nodes().find_map(|(_, id, item)| {
                let template = item.included_template()?.clone();
                Some((id, item.relationship_type(), template))
            });
            let Some((id, relationship, template)) = next else {
                break;
            };
            let mut copy = {
                let template = template.try_borrow().map_err(|_| CmrError::InvalidTemplateStructure)?;
                let sub_template = template.sub_template();
                let mut copy = sub_template.tree.duplicate();
                if let Some(root) = copy.roots().first().copied() {
                    if let Some(item) = copy.item_mut(root) {
                        item.set_template_identification(sub_template.identification.clone());
                    }
                }
                copy
            };
            self.tree.goto_node(id);
            if !copy.is_empty() {
                self.tree.insert_sub_tree(&mut copy, AddMode::AfterCurrent, relationship)?;
                self.tree.goto_node(id);
            }
            self.tree.remove_current_content_item();
            trace!(node = %id, "expanded included template");
            expanded += 1;
        }
        Ok(expanded)
    }
}

impl Template for SubTemplate {
    fn sub_template(&self) -> &SubTemplate {
        self
    }

    fn sub_template_mut(&mut self) -> &mut SubTemplate {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmr_types::codes::dcm;

    const ROOT: usize = 0;
    const LAST_ROW: usize = 1;

    fn template(order_significant: bool) -> SubTemplate {
        let mut template = SubTemplate::new("9999", true, order_significant).with_slots(2);
        let root = template
            .tree_mut()
            .add_content_item(
                RelationshipType::Unknown,
                ValueType::Container,
                &dcm::IMAGE_LIBRARY,
                AddMode::AfterCurrent,
            )
            .unwrap();
        template.store(ROOT, Some(root));
        template
    }

    fn add_row(template: &mut SubTemplate, concept: &CodedEntry) -> NodeId {
        let mode = template.position_for_row(LAST_ROW, ROOT).unwrap();
        let id = template
            .tree_mut()
            .add_content_item(RelationshipType::Contains, ValueType::Container, concept, mode)
            .unwrap();
        template.store(LAST_ROW, Some(id));
        id
    }

    #[test]
    fn test_rows_keep_call_order() {
        for order_significant in [true, false] {
            let mut template = template(order_significant);
            let first = add_row(&mut template, &dcm::IMAGE_LIBRARY_GROUP);
            let second = add_row(&mut template, &dcm::MEASUREMENT_GROUP);
            let root = template.slot(ROOT).unwrap();
            assert_eq!(template.tree().children(root), &[first, second]);
        }
    }

    #[test]
    fn test_first_instance_placement() {
        let mut significant = template(true);
        let mut insignificant = template(false);
        for template in [&mut significant, &mut insignificant] {
            template.goto_slot(ROOT);
            template
                .tree_mut()
                .add_child_content_item(RelationshipType::Contains, ValueType::Container, &dcm::FINDING)
                .unwrap();
        }
        let appended = add_row(&mut significant, &dcm::IMAGE_LIBRARY_GROUP);
        let prepended = add_row(&mut insignificant, &dcm::IMAGE_LIBRARY_GROUP);

        let root = significant.slot(ROOT).unwrap();
        assert_eq!(significant.tree().children(root).last(), Some(&appended));
        let root = insignificant.slot(ROOT).unwrap();
        assert_eq!(insignificant.tree().children(root).first(), Some(&prepended));
    }

    #[test]
    fn test_clear_resets_bookmarks() {
        let mut template = template(true);
        add_row(&mut template, &dcm::IMAGE_LIBRARY_GROUP);
        template.clear();
        assert!(template.is_empty());
        assert_eq!(template.slot(ROOT), None);
        assert_eq!(template.slot(LAST_ROW), None);
        assert_eq!(template.goto_slot(ROOT), None);
        assert!(!template.is_valid());
    }

    #[test]
    fn test_insert_template() {
        let mut target = template(false);
        let source = template(true);

        let inserted = target
            .insert_template(&source, AddMode::BelowCurrent, RelationshipType::Contains)
            .unwrap();
        let item = target.tree().item(inserted).unwrap();
        assert_eq!(item.template_identification(), Some(source.identification()));
        assert_eq!(item.relationship_type(), RelationshipType::Contains);
        assert_eq!(target.count_nodes(false), 2);
        assert!(source.tree().contains(source.slot(ROOT).unwrap()));

        target.set_extensible(false);
        let result = target.insert_template(&source, AddMode::BelowCurrent, RelationshipType::Contains);
        assert!(matches!(result, Err(CmrError::NonExtensibleTemplate)));

        target.set_extensible(true);
        let empty = SubTemplate::new("4019", true, false);
        let result = target.insert_template(&empty, AddMode::BelowCurrent, RelationshipType::Contains);
        assert!(matches!(result, Err(CmrError::InvalidTemplateStructure)));
        assert_eq!(target.count_nodes(false), 2);
    }

    #[test]
    fn test_include_and_expand() {
        let included = share(template(true));
        let mut container = template(false);
        container.goto_slot(ROOT);
        let include = container
            .include_template(included.clone(), AddMode::BelowCurrent, RelationshipType::Contains)
            .unwrap();

        assert_eq!(container.count_nodes(false), 2);
        assert_eq!(container.count_nodes(true), 3);
        assert!(container.is_valid());

        // the container sees later changes of the shared instance
        add_row(&mut included.borrow_mut(), &dcm::IMAGE_LIBRARY_GROUP);
        assert_eq!(container.count_nodes(true), 4);

        assert_eq!(container.expand_included_templates().unwrap(), 1);
        assert!(!container.tree().contains(include));
        assert_eq!(container.count_nodes(true), 3);
        let root = container.slot(ROOT).unwrap();
        let expanded_root = container.tree().children(root)[0];
        let item = container.tree().item(expanded_root).unwrap();
        assert_eq!(item.relationship_type(), RelationshipType::Contains);
        assert!(item.template_identification().is_some());
    }

    #[test]
    fn test_slot_of_removed_node_is_empty() {
        let mut template = template(true);
        let row = add_row(&mut template, &dcm::IMAGE_LIBRARY_GROUP);
        assert_eq!(template.slot(LAST_ROW), Some(row));
        assert!(template.slot_has_value_type(LAST_ROW, ValueType::Container));
        assert!(!template.slot_has_value_type(LAST_ROW, ValueType::Code));

        template.tree_mut().goto_node(row);
        template.tree_mut().remove_current_content_item();
        assert_eq!(template.slot(LAST_ROW), None);
        assert!(!template.slot_has_value_type(LAST_ROW, ValueType::Container));
        assert!(template.slot(ROOT).is_some());
    }
}
