//! Content node identifiers.

use std::fmt;
use std::num::NonZeroU64;

/// Identifier of a node in a content tree.
///
/// Zero is never a valid identifier, so `Option<NodeId>` has the size of a
/// plain `u64` and `None` plays the role of "no such node".
///
/// # Examples
///
/// ```
/// use dcmr_types::NodeId;
///
/// assert!(NodeId::new(0).is_none());
/// assert_eq!(NodeId::new(42).map(NodeId::get), Some(42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(NonZeroU64);

impl NodeId {
    /// Creates a node id; returns `None` for zero.
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(Self)
    }

    /// Returns the numeric value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
