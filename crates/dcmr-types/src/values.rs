//! Structured content item values and template identity.

use crate::CodedEntry;

/// UID of the DICOM Content Mapping Resource.
pub const DICOM_CONTENT_MAPPING_RESOURCE_UID: &str = "1.2.840.10008.8.1.1";

/// Mapping resource designator of the DICOM Content Mapping Resource.
pub const DCMR: &str = "DCMR";

/// SOP Class UID of Segmentation Storage.
pub const SEGMENTATION_STORAGE_UID: &str = "1.2.840.10008.5.1.4.1.1.66.4";

/// SOP Class UID of Surface Segmentation Storage.
pub const SURFACE_SEGMENTATION_STORAGE_UID: &str = "1.2.840.10008.5.1.4.1.1.66.5";

/// SOP Class UID of Real World Value Mapping Storage.
pub const REAL_WORLD_VALUE_MAPPING_STORAGE_UID: &str = "1.2.840.10008.5.1.4.1.1.67";

/// Maximum length of a UID.
pub const MAX_UID_LENGTH: usize = 64;

/// Returns true if `value` is a syntactically valid UID.
///
/// Components are digit strings separated by dots, without leading zeros
/// (except a single "0"), at most 64 characters in total.
pub fn is_valid_uid(value: &str) -> bool {
    if value.is_empty() || value.len() > MAX_UID_LENGTH {
        return false;
    }
    value.split('.').all(|component| {
        !component.is_empty()
            && component.bytes().all(|b| b.is_ascii_digit())
            && (component == "0" || !component.starts_with('0'))
    })
}

/// Returns true if `value` is a valid decimal string (DS).
pub fn is_valid_decimal(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed.len() <= 16 && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
}

/// A numeric measurement: decimal value plus measurement unit.
///
/// # Examples
///
/// ```
/// use dcmr_types::{codes, NumericMeasurement};
///
/// let rows = NumericMeasurement::new("512", codes::ucum::PIXELS);
/// assert!(rows.is_complete());
/// assert!(rows.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericMeasurement {
    /// Numeric value in decimal string format.
    pub value: String,
    /// Measurement unit.
    pub unit: CodedEntry,
    /// Optional numeric value qualifier (e.g. "not a number").
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub qualifier: Option<CodedEntry>,
}

impl NumericMeasurement {
    /// Creates a measurement from value and unit.
    pub fn new(value: impl Into<String>, unit: CodedEntry) -> Self {
        Self {
            value: value.into(),
            unit,
            qualifier: None,
        }
    }

    /// Returns true if value and unit are present.
    pub fn is_complete(&self) -> bool {
        !self.value.is_empty() && self.unit.is_complete()
    }

    /// Returns true if the value is a decimal string and the unit is valid.
    pub fn is_valid(&self) -> bool {
        is_valid_decimal(&self.value)
            && self.unit.is_valid()
            && self.qualifier.as_ref().map_or(true, CodedEntry::is_valid)
    }
}

/// Reference to a DICOM image (or segmentation) instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageReference {
    /// Referenced SOP Class UID.
    pub sop_class_uid: String,
    /// Referenced SOP Instance UID.
    pub sop_instance_uid: String,
    /// Referenced frame numbers (empty = all frames).
    #[cfg_attr(feature = "serde", serde(default))]
    pub frame_numbers: Vec<u32>,
    /// Referenced segment numbers (segmentation objects only).
    #[cfg_attr(feature = "serde", serde(default))]
    pub segment_numbers: Vec<u16>,
}

impl ImageReference {
    /// Creates a reference to a whole instance.
    pub fn new(sop_class_uid: impl Into<String>, sop_instance_uid: impl Into<String>) -> Self {
        Self {
            sop_class_uid: sop_class_uid.into(),
            sop_instance_uid: sop_instance_uid.into(),
            frame_numbers: Vec::new(),
            segment_numbers: Vec::new(),
        }
    }

    /// Returns true if both UIDs are present.
    pub fn is_complete(&self) -> bool {
        !self.sop_class_uid.is_empty() && !self.sop_instance_uid.is_empty()
    }

    /// Returns true if both UIDs are syntactically valid.
    pub fn is_valid(&self) -> bool {
        is_valid_uid(&self.sop_class_uid) && is_valid_uid(&self.sop_instance_uid)
    }

    /// Returns true if the referenced SOP class is a segmentation.
    pub fn is_segmentation(&self) -> bool {
        self.sop_class_uid == SEGMENTATION_STORAGE_UID
            || self.sop_class_uid == SURFACE_SEGMENTATION_STORAGE_UID
    }
}

/// Reference to a composite object that is not an image, e.g. a real world
/// value mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositeReference {
    /// Referenced SOP Class UID.
    pub sop_class_uid: String,
    /// Referenced SOP Instance UID.
    pub sop_instance_uid: String,
}

impl CompositeReference {
    /// Creates a reference from both UIDs.
    pub fn new(sop_class_uid: impl Into<String>, sop_instance_uid: impl Into<String>) -> Self {
        Self {
            sop_class_uid: sop_class_uid.into(),
            sop_instance_uid: sop_instance_uid.into(),
        }
    }

    /// Returns true if both UIDs are present.
    pub fn is_complete(&self) -> bool {
        !self.sop_class_uid.is_empty() && !self.sop_instance_uid.is_empty()
    }

    /// Returns true if both UIDs are syntactically valid.
    pub fn is_valid(&self) -> bool {
        is_valid_uid(&self.sop_class_uid) && is_valid_uid(&self.sop_instance_uid)
    }

    /// Returns true if the referenced SOP class is a real world value mapping.
    pub fn is_real_world_value_mapping(&self) -> bool {
        self.sop_class_uid == REAL_WORLD_VALUE_MAPPING_STORAGE_UID
    }
}

/// Graphic type of spatial coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphicType {
    /// A single point.
    Point,
    /// Unconnected points.
    Multipoint,
    /// Connected line segments.
    Polyline,
    /// Center and one point on the perimeter.
    Circle,
    /// End points of the major and the minor axis.
    Ellipse,
}

impl GraphicType {
    /// Returns the DICOM defined term.
    pub fn defined_term(self) -> &'static str {
        match self {
            Self::Point => "POINT",
            Self::Multipoint => "MULTIPOINT",
            Self::Polyline => "POLYLINE",
            Self::Circle => "CIRCLE",
            Self::Ellipse => "ELLIPSE",
        }
    }

    fn accepts(self, points: usize) -> bool {
        match self {
            Self::Point => points == 1,
            Self::Multipoint | Self::Polyline => points >= 1,
            Self::Circle => points == 2,
            Self::Ellipse => points == 4,
        }
    }
}

/// Spatial coordinates (SCOORD): a graphic type and its column/row points
/// in image pixel space.
///
/// # Examples
///
/// ```
/// use dcmr_types::{GraphicType, SpatialCoordinates};
///
/// let circle = SpatialCoordinates::new(GraphicType::Circle, vec![(10.0, 10.0), (15.0, 10.0)]);
/// assert!(circle.is_valid());
/// assert!(!SpatialCoordinates::new(GraphicType::Point, vec![]).is_complete());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialCoordinates {
    /// Graphic type.
    pub graphic_type: GraphicType,
    /// Column/row pairs.
    pub points: Vec<(f32, f32)>,
}

impl SpatialCoordinates {
    /// Creates coordinates from a graphic type and its points.
    pub fn new(graphic_type: GraphicType, points: Vec<(f32, f32)>) -> Self {
        Self { graphic_type, points }
    }

    /// Returns true if there is at least one point.
    pub fn is_complete(&self) -> bool {
        !self.points.is_empty()
    }

    /// Returns true if all points are finite and their number fits the
    /// graphic type.
    pub fn is_valid(&self) -> bool {
        self.graphic_type.accepts(self.points.len())
            && self.points.iter().all(|(column, row)| column.is_finite() && row.is_finite())
    }
}

/// Identity of a template: template id, mapping resource and its UID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateIdentification {
    /// Template identifier, e.g. "1600".
    pub template_id: String,
    /// Mapping resource, e.g. "DCMR".
    pub mapping_resource: String,
    /// Mapping resource UID.
    pub mapping_resource_uid: String,
}

impl TemplateIdentification {
    /// Creates an identification for a template of the DICOM Content Mapping Resource.
    pub fn dcmr(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            mapping_resource: DCMR.to_string(),
            mapping_resource_uid: DICOM_CONTENT_MAPPING_RESOURCE_UID.to_string(),
        }
    }

    /// Returns true if template id and mapping resource are present.
    pub fn is_complete(&self) -> bool {
        !self.template_id.is_empty() && !self.mapping_resource.is_empty()
    }

    /// Compares template id and mapping resource (the UID is informative).
    pub fn matches(&self, template_id: &str, mapping_resource: &str) -> bool {
        self.template_id == template_id && self.mapping_resource == mapping_resource
    }
}
