//! Coded entries.
//!
//! A coded entry is the (coding scheme designator, code value, code meaning)
//! triple that identifies a concept in a controlled terminology. Two entries
//! are equal when scheme and value match; the meaning is descriptive only.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Maximum length of a code meaning (LO value representation).
pub const MAX_CODE_MEANING_LENGTH: usize = 64;

/// Maximum length of a coding scheme designator (SH value representation).
pub const MAX_CODING_SCHEME_LENGTH: usize = 16;

/// Identification of the context group a coded entry was selected from.
///
/// Downstream encoders write this as the "enhanced encoding" attributes
/// (Context Identifier, Mapping Resource, Context Group Version, Context UID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnhancedEncoding {
    /// Context group identifier, e.g. "4031".
    pub context_identifier: String,
    /// Mapping resource, usually "DCMR".
    pub mapping_resource: String,
    /// Context group version (YYYYMMDD).
    pub context_group_version: String,
    /// Context group UID.
    pub context_uid: String,
}

/// A coded concept: scheme, value and meaning.
///
/// Constants for well-known concepts are built with [`CodedEntry::from_static`]
/// and do not allocate.
///
/// # Examples
///
/// ```
/// use dcmr_types::CodedEntry;
///
/// let person = CodedEntry::new("121006", "DCM", "Person");
/// assert!(person.is_valid());
/// assert_eq!(person, CodedEntry::new("121006", "DCM", "Person (renamed)"));
/// assert!(CodedEntry::empty().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodedEntry {
    code_value: Cow<'static, str>,
    coding_scheme: Cow<'static, str>,
    code_meaning: Cow<'static, str>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    enhanced_encoding: Option<EnhancedEncoding>,
}

impl CodedEntry {
    /// Creates a coded entry from static strings (usable in constants).
    pub const fn from_static(
        code_value: &'static str,
        coding_scheme: &'static str,
        code_meaning: &'static str,
    ) -> Self {
        Self {
            code_value: Cow::Borrowed(code_value),
            coding_scheme: Cow::Borrowed(coding_scheme),
            code_meaning: Cow::Borrowed(code_meaning),
            enhanced_encoding: None,
        }
    }

    /// Creates a coded entry from owned or borrowed strings.
    pub fn new(
        code_value: impl Into<String>,
        coding_scheme: impl Into<String>,
        code_meaning: impl Into<String>,
    ) -> Self {
        Self {
            code_value: Cow::Owned(code_value.into()),
            coding_scheme: Cow::Owned(coding_scheme.into()),
            code_meaning: Cow::Owned(code_meaning.into()),
            enhanced_encoding: None,
        }
    }

    /// The empty sentinel ("no coded value selected").
    pub const fn empty() -> Self {
        Self::from_static("", "", "")
    }

    /// Returns the code value.
    pub fn code_value(&self) -> &str {
        &self.code_value
    }

    /// Returns the coding scheme designator.
    pub fn coding_scheme(&self) -> &str {
        &self.coding_scheme
    }

    /// Returns the code meaning.
    pub fn code_meaning(&self) -> &str {
        &self.code_meaning
    }

    /// Returns the enhanced encoding stamp, if any.
    pub fn enhanced_encoding(&self) -> Option<&EnhancedEncoding> {
        self.enhanced_encoding.as_ref()
    }

    /// Returns a copy carrying the given enhanced encoding stamp.
    pub fn with_enhanced_encoding(mut self, encoding: EnhancedEncoding) -> Self {
        self.enhanced_encoding = Some(encoding);
        self
    }

    /// Returns a copy without enhanced encoding stamp.
    pub fn without_enhanced_encoding(mut self) -> Self {
        self.enhanced_encoding = None;
        self
    }

    /// Returns true if neither code value nor coding scheme is set.
    pub fn is_empty(&self) -> bool {
        self.code_value.is_empty() && self.coding_scheme.is_empty()
    }

    /// Returns true if scheme, value and meaning are all non-empty.
    pub fn is_complete(&self) -> bool {
        !self.code_value.is_empty() && !self.coding_scheme.is_empty() && !self.code_meaning.is_empty()
    }

    /// Returns true if the entry is complete and every component is a
    /// well-formed attribute value.
    pub fn is_valid(&self) -> bool {
        self.is_complete()
            && is_clean(&self.code_value)
            && is_clean(&self.coding_scheme)
            && is_clean(&self.code_meaning)
            && self.coding_scheme.chars().count() <= MAX_CODING_SCHEME_LENGTH
            && self.code_meaning.chars().count() <= MAX_CODE_MEANING_LENGTH
    }
}

/// No backslash (value delimiter) and no control characters.
fn is_clean(value: &str) -> bool {
    !value.chars().any(|c| c == '\\' || c.is_control())
}

impl PartialEq for CodedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.code_value == other.code_value && self.coding_scheme == other.coding_scheme
    }
}

impl Eq for CodedEntry {}

impl Hash for CodedEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code_value.hash(state);
        self.coding_scheme.hash(state);
    }
}

impl fmt::Display for CodedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "empty code")
        } else {
            write!(
                f,
                "({},{},\"{}\")",
                self.code_value, self.coding_scheme, self.code_meaning
            )
        }
    }
}
