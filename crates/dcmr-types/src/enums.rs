//! Content item enumeration types.
//!
//! Relationship types and value types carry their DICOM defined terms
//! (e.g. "HAS ACQ CONTEXT", "UIDREF") so encoders and diagnostics can use them.

use std::fmt;

/// Relationship between a content item and its parent (source) item.
///
/// `Unknown` is used for roots of detached subtrees and template roots; it is
/// replaced by a concrete relationship type when the subtree is inserted.
///
/// # Examples
///
/// ```
/// use dcmr_types::RelationshipType;
///
/// let rel = RelationshipType::from_defined_term("HAS OBS CONTEXT");
/// assert_eq!(rel, Some(RelationshipType::HasObsContext));
/// assert_eq!(RelationshipType::Contains.defined_term(), "CONTAINS");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationshipType {
    /// Not yet determined.
    #[default]
    Unknown,
    /// CONTAINS.
    Contains,
    /// HAS OBS CONTEXT.
    HasObsContext,
    /// HAS ACQ CONTEXT.
    HasAcqContext,
    /// HAS CONCEPT MOD.
    HasConceptMod,
    /// HAS PROPERTIES.
    HasProperties,
    /// INFERRED FROM.
    InferredFrom,
    /// SELECTED FROM.
    SelectedFrom,
}

impl RelationshipType {
    /// Parses a DICOM defined term.
    ///
    /// Returns `None` for unknown terms.
    pub fn from_defined_term(term: &str) -> Option<Self> {
        match term {
            "CONTAINS" => Some(Self::Contains),
            "HAS OBS CONTEXT" => Some(Self::HasObsContext),
            "HAS ACQ CONTEXT" => Some(Self::HasAcqContext),
            "HAS CONCEPT MOD" => Some(Self::HasConceptMod),
            "HAS PROPERTIES" => Some(Self::HasProperties),
            "INFERRED FROM" => Some(Self::InferredFrom),
            "SELECTED FROM" => Some(Self::SelectedFrom),
            _ => None,
        }
    }

    /// Returns the DICOM defined term (empty for `Unknown`).
    pub fn defined_term(self) -> &'static str {
        match self {
            Self::Unknown => "",
            Self::Contains => "CONTAINS",
            Self::HasObsContext => "HAS OBS CONTEXT",
            Self::HasAcqContext => "HAS ACQ CONTEXT",
            Self::HasConceptMod => "HAS CONCEPT MOD",
            Self::HasProperties => "HAS PROPERTIES",
            Self::InferredFrom => "INFERRED FROM",
            Self::SelectedFrom => "SELECTED FROM",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            other => f.write_str(other.defined_term()),
        }
    }
}

/// Value type of a content item.
///
/// `IncludedTemplate` is not a DICOM value type: it marks a node that
/// references another (shared) template instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    /// TEXT.
    Text,
    /// CODE.
    Code,
    /// NUM.
    Num,
    /// DATETIME.
    DateTime,
    /// DATE.
    Date,
    /// TIME.
    Time,
    /// UIDREF.
    UidRef,
    /// PNAME.
    PName,
    /// SCOORD.
    SCoord,
    /// SCOORD3D.
    SCoord3D,
    /// TCOORD.
    TCoord,
    /// COMPOSITE.
    Composite,
    /// IMAGE.
    Image,
    /// WAVEFORM.
    Waveform,
    /// CONTAINER.
    Container,
    /// Reference to an included template.
    IncludedTemplate,
}

impl ValueType {
    /// Parses a DICOM defined term.
    pub fn from_defined_term(term: &str) -> Option<Self> {
        match term {
            "TEXT" => Some(Self::Text),
            "CODE" => Some(Self::Code),
            "NUM" => Some(Self::Num),
            "DATETIME" => Some(Self::DateTime),
            "DATE" => Some(Self::Date),
            "TIME" => Some(Self::Time),
            "UIDREF" => Some(Self::UidRef),
            "PNAME" => Some(Self::PName),
            "SCOORD" => Some(Self::SCoord),
            "SCOORD3D" => Some(Self::SCoord3D),
            "TCOORD" => Some(Self::TCoord),
            "COMPOSITE" => Some(Self::Composite),
            "IMAGE" => Some(Self::Image),
            "WAVEFORM" => Some(Self::Waveform),
            "CONTAINER" => Some(Self::Container),
            _ => None,
        }
    }

    /// Returns the DICOM defined term ("INCLUDE" for included templates).
    pub fn defined_term(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Code => "CODE",
            Self::Num => "NUM",
            Self::DateTime => "DATETIME",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::UidRef => "UIDREF",
            Self::PName => "PNAME",
            Self::SCoord => "SCOORD",
            Self::SCoord3D => "SCOORD3D",
            Self::TCoord => "TCOORD",
            Self::Composite => "COMPOSITE",
            Self::Image => "IMAGE",
            Self::Waveform => "WAVEFORM",
            Self::Container => "CONTAINER",
            Self::IncludedTemplate => "INCLUDE",
        }
    }

    /// Returns true for value types whose value is a single string.
    pub fn is_string_type(self) -> bool {
        matches!(
            self,
            Self::Text | Self::DateTime | Self::Date | Self::Time | Self::UidRef | Self::PName
        )
    }

    /// Returns true for value types that may be used without a concept name.
    pub fn concept_name_optional(self) -> bool {
        matches!(
            self,
            Self::Image | Self::Composite | Self::Waveform | Self::IncludedTemplate
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.defined_term())
    }
}

/// Where a new node is placed relative to the cursor of a content tree.
///
/// On an empty tree every mode creates the first top-level node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddMode {
    /// New sibling directly before the current node.
    BeforeCurrent,
    /// New sibling directly after the current node.
    #[default]
    AfterCurrent,
    /// New last child of the current node.
    BelowCurrent,
    /// New first child of the current node.
    BelowCurrentBeforeFirstChild,
}
