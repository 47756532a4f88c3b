//! Node bookmarks: indexed slots holding ids of structural anchors.

use dcmr_types::NodeId;

use crate::tree::ContentTree;

/// A fixed number of slots, each holding the id of a node or nothing.
///
/// Composers reserve one slot per anchor they need to re-enter ("the image
/// library", "the last group", "the last finding site") and keep the slots in
/// step with the tree they describe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeBookmarks {
    slots: Vec<Option<NodeId>>,
}

impl NodeBookmarks {
    /// Creates bookmarks with `count` empty slots.
    pub fn with_slots(count: usize) -> Self {
        let mut bookmarks = Self::default();
        bookmarks.reserve_slots(count);
        bookmarks
    }

    /// Resizes to `count` slots, all empty.
    pub fn reserve_slots(&mut self, count: usize) {
        self.slots = vec![None; count];
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Stores a node id (or clears the slot with `None`).
    ///
    /// Returns false if the slot does not exist.
    pub fn store(&mut self, slot: usize, id: Option<NodeId>) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = id;
                true
            }
            None => false,
        }
    }

    /// Returns the id stored in a slot.
    pub fn get(&self, slot: usize) -> Option<NodeId> {
        self.slots.get(slot).copied().flatten()
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Moves the cursor of `tree` to the node of a slot.
    ///
    /// Returns `None`, leaving the cursor alone, if the slot is empty or the
    /// node no longer exists.
    pub fn goto_slot(&self, tree: &mut ContentTree, slot: usize) -> Option<NodeId> {
        tree.goto_node(self.get(slot)?)
    }

    /// Moves to the node of `slot` or, if that fails, of the nearest filled
    /// slot before it.
    ///
    /// Slots are laid out in row order, so this finds the node after which a
    /// row belongs when the row itself does not exist yet.
    pub fn goto_last_slot(&self, tree: &mut ContentTree, slot: usize) -> Option<NodeId> {
        let last = slot.min(self.slots.len().checked_sub(1)?);
        (0..=last).rev().find_map(|index| self.goto_slot(tree, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcmr_types::codes::dcm;
    use dcmr_types::{AddMode, RelationshipType, ValueType};

    fn tree_with_two_nodes() -> (ContentTree, NodeId, NodeId) {
        let mut tree = ContentTree::new();
        let root = tree
            .add_content_item(
                RelationshipType::Unknown,
                ValueType::Container,
                &dcm::IMAGE_LIBRARY,
                AddMode::AfterCurrent,
            )
            .unwrap();
        let group = tree
            .add_child_content_item(
                RelationshipType::Contains,
                ValueType::Container,
                &dcm::IMAGE_LIBRARY_GROUP,
            )
            .unwrap();
        (tree, root, group)
    }

    #[test]
    fn test_store_and_goto() {
        let (mut tree, root, group) = tree_with_two_nodes();
        let mut bookmarks = NodeBookmarks::with_slots(3);
        assert!(bookmarks.store(0, Some(root)));
        assert!(bookmarks.store(1, Some(group)));
        assert!(!bookmarks.store(3, Some(group)));

        assert_eq!(bookmarks.goto_slot(&mut tree, 0), Some(root));
        assert_eq!(tree.node_id(), Some(root));
        assert_eq!(bookmarks.goto_slot(&mut tree, 2), None);
        assert_eq!(tree.node_id(), Some(root));
    }

    #[test]
    fn test_slots_invalid_after_clear() {
        let (mut tree, root, group) = tree_with_two_nodes();
        let mut bookmarks = NodeBookmarks::with_slots(2);
        bookmarks.store(0, Some(root));
        bookmarks.store(1, Some(group));

        tree.clear();
        assert_eq!(bookmarks.goto_slot(&mut tree, 0), None);
        assert_eq!(bookmarks.goto_slot(&mut tree, 1), None);

        bookmarks.clear();
        assert_eq!(bookmarks.len(), 2);
        assert_eq!(bookmarks.get(0), None);
    }

    #[test]
    fn test_goto_last_slot_walks_back() {
        let (mut tree, root, group) = tree_with_two_nodes();
        let mut bookmarks = NodeBookmarks::with_slots(4);
        bookmarks.store(0, Some(root));
        bookmarks.store(2, Some(group));

        assert_eq!(bookmarks.goto_last_slot(&mut tree, 3), Some(group));
        assert_eq!(bookmarks.goto_last_slot(&mut tree, 1), Some(root));

        tree.goto_node(group);
        tree.remove_current_content_item();
        assert_eq!(bookmarks.goto_last_slot(&mut tree, 3), Some(root));
        assert_eq!(bookmarks.goto_last_slot(&mut tree, 9), Some(root));

        let empty = NodeBookmarks::default();
        assert_eq!(empty.goto_last_slot(&mut tree, 0), None);
    }
}
