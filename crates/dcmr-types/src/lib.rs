//! # dcmr-types
//!
//! Value types for DICOM content mapping resources.
//!
//! This crate provides the building blocks shared by vocabularies and
//! template composers: coded entries, relationship and value types of
//! structured report content items, node identifiers, numeric and image
//! values, template identification, and constants for well-known concepts.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   Disable this feature for zero-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use dcmr_types::{codes, CodedEntry, NumericMeasurement, RelationshipType, ValueType};
//!
//! let region = CodedEntry::new("T-D3000", "SRT", "Chest");
//! assert!(region.is_valid());
//!
//! let spacing = NumericMeasurement::new("0.7", codes::ucum::MILLIMETER);
//! assert!(spacing.is_valid());
//!
//! assert_eq!(RelationshipType::HasAcqContext.defined_term(), "HAS ACQ CONTEXT");
//! assert!(ValueType::Date.is_string_type());
//! ```
//!
//! ## Without Serde
//!
//! ```toml
//! [dependencies]
//! dcmr-types = { version = "0.1", default-features = false }
//! ```

#![warn(missing_docs)]

mod coded_entry;
pub mod codes;
mod enums;
mod node_id;
mod values;

// Re-export all public types at crate root
pub use coded_entry::{
    CodedEntry, EnhancedEncoding, MAX_CODE_MEANING_LENGTH, MAX_CODING_SCHEME_LENGTH,
};
pub use enums::{AddMode, RelationshipType, ValueType};
pub use node_id::NodeId;
pub use values::{
    is_valid_decimal, is_valid_uid, CompositeReference, GraphicType, ImageReference,
    NumericMeasurement, SpatialCoordinates, TemplateIdentification, DCMR,
    DICOM_CONTENT_MAPPING_RESOURCE_UID, MAX_UID_LENGTH, REAL_WORLD_VALUE_MAPPING_STORAGE_UID,
    SEGMENTATION_STORAGE_UID, SURFACE_SEGMENTATION_STORAGE_UID,
};
