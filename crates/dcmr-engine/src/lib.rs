//! # dcmr-engine
//!
//! Context groups, content trees and template composers for DICOM
//! structured reporting.
//!
//! - [`vocabulary`]: code tables of the context groups, built once per
//!   process or loaded from supplied files.
//! - [`context_group`]: membership checks, extension codes and the selected
//!   value of one context group.
//! - [`tree`] and [`template`]: the cursor-navigable content tree and
//!   sub-templates with bookmarks.
//! - [`cid`] and [`tid`]: concrete context groups and template composers.
//!
//! ## Usage
//!
//! ```rust
//! use dcmr_engine::cid::{Country, Language};
//! use dcmr_engine::tid::Tid1204LanguageOfContentItemAndDescendants;
//! use dcmr_engine::Template;
//!
//! let mut language = Tid1204LanguageOfContentItemAndDescendants::new();
//! assert!(!language.is_valid());
//!
//! language.set_language(&Language::English.into(), &Country::UnitedKingdom.into(), true)?;
//! assert!(language.is_valid());
//! assert_eq!(language.sub_template().count_nodes(false), 2);
//! # Ok::<(), dcmr_engine::CmrError>(())
//! ```
//!
//! ## Features
//!
//! - `parallel` (default): load several vocabulary files at once with rayon.

#![warn(missing_docs)]

pub mod bookmarks;
pub mod cid;
pub mod context_group;
pub mod dataset;
pub mod parser;
pub mod template;
pub mod tid;
pub mod tree;
mod types;
pub mod vocabulary;

// Re-export dcmr-types for convenience
pub use dcmr_types;
pub use dcmr_types::{
    codes, AddMode, CodedEntry, CompositeReference, GraphicType, ImageReference, NodeId,
    NumericMeasurement, RelationshipType, SpatialCoordinates, TemplateIdentification, ValueType,
};

pub use bookmarks::NodeBookmarks;
pub use context_group::{ContextGroup, FindResult};
pub use dataset::{Dataset, MemoryDataset, Tag};
pub use parser::{VocabularyParser, VocabularyRecord};
pub use template::{share, SharedSubTemplate, SubTemplate, Template};
pub use tree::{ContentItem, ContentTree, ContentValue};
pub use types::{CmrError, CmrResult, LoadStats, VocabularyConfig};
pub use vocabulary::{CodeTable, TableCell, Vocabulary, VocabularyStore};
