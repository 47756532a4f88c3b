//! Engine-wide error, configuration and statistics types.

use thiserror::Error;

/// Errors reported by context groups, content trees and template composers.
#[derive(Error, Debug)]
pub enum CmrError {
    /// Malformed coded entry, empty mandatory string or otherwise invalid value.
    #[error("Invalid value")]
    InvalidValue,

    /// Concept name missing or invalid.
    #[error("Invalid concept name")]
    InvalidConceptName,

    /// Content item has an unexpected value type (e.g. when replacing a value).
    #[error("Invalid content item")]
    InvalidContentItem,

    /// Coded entry is not a member of a defined context group.
    #[error("Coded entry not in context group")]
    CodedEntryNotInContextGroup,

    /// Context group does not accept extension codes.
    #[error("Non-extensible context group")]
    NonExtensibleContextGroup,

    /// Template does not accept additional content.
    #[error("Non-extensible template")]
    NonExtensibleTemplate,

    /// Operation attempted on an empty or malformed tree.
    #[error("Invalid template structure")]
    InvalidTemplateStructure,

    /// A defined term could not be mapped to a coded entry.
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// The requested row is not implemented.
    #[error("Not yet implemented: {0}")]
    NotYetImplemented(&'static str),

    /// A content item could not be added at the requested position.
    #[error("Cannot add content item")]
    CannotAddContentItem,

    /// Value violates a value set constraint of the template (e.g. unit).
    #[error("Value set constraint violated")]
    ValueSetConstraintViolated,

    /// Referenced object is not a segmentation with exactly one segment.
    #[error("Invalid segmentation object")]
    InvalidSegmentationObject,

    /// Referenced object is not a real world value mapping.
    #[error("Invalid Real World Value Mapping object")]
    InvalidRealWorldValueMappingObject,

    /// No image library root.
    #[error("No Image Library")]
    NoImageLibrary,

    /// No image library group.
    #[error("No Image Library Group")]
    NoImageLibraryGroup,

    /// No image library entry.
    #[error("No Image Library Entry")]
    NoImageLibraryEntry,

    /// Group level descriptors already present.
    #[error("Cannot add multiple Image Library Entry Descriptors")]
    CannotAddMultipleImageLibraryEntryDescriptors,

    /// Image library entry has no modality descriptor.
    #[error("Missing Image Library Entry Descriptor 'Modality'")]
    MissingImageLibraryEntryDescriptorModality,

    /// Image library entry has another modality than expected.
    #[error("Wrong Image Library Entry Descriptor 'Modality'")]
    WrongImageLibraryEntryDescriptorModality,

    /// No measurement root.
    #[error("No Measurement")]
    NoMeasurement,

    /// No measurement group root.
    #[error("No Measurement Group")]
    NoMeasurementGroup,

    /// I/O error reading a vocabulary file.
    #[error("IO error reading vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid header - column count mismatch.
    #[error("Invalid header: expected {expected} columns, found {found}")]
    InvalidHeader {
        /// Expected column count.
        expected: usize,
        /// Found column count.
        found: usize,
    },

    /// Unexpected column name.
    #[error("Unexpected column '{found}' at position {position}, expected '{expected}'")]
    UnexpectedColumn {
        /// The column position.
        position: usize,
        /// Expected column name.
        expected: String,
        /// Found column name.
        found: String,
    },

    /// Vocabulary file names a key the context group does not define.
    #[error("Unknown key '{key}' for context group {context_group}")]
    UnknownKey {
        /// Context group identifier.
        context_group: &'static str,
        /// The key that was not recognized.
        key: String,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },
}

/// Result type for engine operations.
pub type CmrResult<T> = Result<T, CmrError>;

/// Configuration for loading supplied vocabulary tables.
#[derive(Debug, Clone)]
pub struct VocabularyConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Skip rows whose key is unknown instead of failing.
    pub skip_unknown_keys: bool,
    /// Replace an already installed table.
    pub replace_existing: bool,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            skip_unknown_keys: false,
            replace_existing: true,
        }
    }
}

/// Statistics from loading vocabulary files.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Number of files loaded.
    pub files: usize,
    /// Number of coded entries installed.
    pub entries: usize,
    /// Rows skipped (unknown keys).
    pub skipped: usize,
    /// Time taken in milliseconds.
    pub load_time_ms: u64,
}

impl LoadStats {
    /// Adds the counters of another run.
    pub fn merge(&mut self, other: &LoadStats) {
        self.files += other.files;
        self.entries += other.entries;
        self.skipped += other.skipped;
        self.load_time_ms = self.load_time_ms.max(other.load_time_ms);
    }
}
