//! Narrow access to DICOM datasets.
//!
//! Composers that copy values from an image or segmentation object only read
//! string values, sequence items and code sequences. [`Dataset`] is that
//! contract; [`MemoryDataset`] is an in-memory implementation used by callers
//! that already decoded their objects, and by the tests.

use std::collections::BTreeMap;
use std::fmt;

use dcmr_types::CodedEntry;

use crate::types::{CmrError, CmrResult};

/// Attribute tag (group, element).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub u16, pub u16);

impl Tag {
    /// Group number.
    pub fn group(self) -> u16 {
        self.0
    }

    /// Element number.
    pub fn element(self) -> u16 {
        self.1
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

/// Tags of the attributes read by the composers.
pub mod tags {
    use super::Tag;

    /// SOP Class UID.
    pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
    /// SOP Instance UID.
    pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);
    /// Study Date.
    pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
    /// Acquisition Date.
    pub const ACQUISITION_DATE: Tag = Tag(0x0008, 0x0022);
    /// Content Date.
    pub const CONTENT_DATE: Tag = Tag(0x0008, 0x0023);
    /// Study Time.
    pub const STUDY_TIME: Tag = Tag(0x0008, 0x0030);
    /// Acquisition Time.
    pub const ACQUISITION_TIME: Tag = Tag(0x0008, 0x0032);
    /// Content Time.
    pub const CONTENT_TIME: Tag = Tag(0x0008, 0x0033);
    /// Modality.
    pub const MODALITY: Tag = Tag(0x0008, 0x0060);
    /// Code Value.
    pub const CODE_VALUE: Tag = Tag(0x0008, 0x0100);
    /// Coding Scheme Designator.
    pub const CODING_SCHEME_DESIGNATOR: Tag = Tag(0x0008, 0x0102);
    /// Code Meaning.
    pub const CODE_MEANING: Tag = Tag(0x0008, 0x0104);
    /// Anatomic Region Sequence.
    pub const ANATOMIC_REGION_SEQUENCE: Tag = Tag(0x0008, 0x2218);
    /// Body Part Examined.
    pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);
    /// Sequence Name.
    pub const SEQUENCE_NAME: Tag = Tag(0x0018, 0x0024);
    /// Slice Thickness.
    pub const SLICE_THICKNESS: Tag = Tag(0x0018, 0x0050);
    /// Spacing Between Slices.
    pub const SPACING_BETWEEN_SLICES: Tag = Tag(0x0018, 0x0088);
    /// Radiopharmaceutical Volume.
    pub const RADIOPHARMACEUTICAL_VOLUME: Tag = Tag(0x0018, 0x1071);
    /// Radionuclide Total Dose.
    pub const RADIONUCLIDE_TOTAL_DOSE: Tag = Tag(0x0018, 0x1074);
    /// Radionuclide Half Life.
    pub const RADIONUCLIDE_HALF_LIFE: Tag = Tag(0x0018, 0x1075);
    /// Radiopharmaceutical Start DateTime.
    pub const RADIOPHARMACEUTICAL_START_DATE_TIME: Tag = Tag(0x0018, 0x1078);
    /// Radiopharmaceutical Stop DateTime.
    pub const RADIOPHARMACEUTICAL_STOP_DATE_TIME: Tag = Tag(0x0018, 0x1079);
    /// Imager Pixel Spacing.
    pub const IMAGER_PIXEL_SPACING: Tag = Tag(0x0018, 0x1164);
    /// Positioner Primary Angle.
    pub const POSITIONER_PRIMARY_ANGLE: Tag = Tag(0x0018, 0x1510);
    /// Positioner Secondary Angle.
    pub const POSITIONER_SECONDARY_ANGLE: Tag = Tag(0x0018, 0x1511);
    /// Pulse Sequence Name.
    pub const PULSE_SEQUENCE_NAME: Tag = Tag(0x0018, 0x9005);
    /// CT Acquisition Type Sequence.
    pub const CT_ACQUISITION_TYPE_SEQUENCE: Tag = Tag(0x0018, 0x9301);
    /// Acquisition Type.
    pub const ACQUISITION_TYPE: Tag = Tag(0x0018, 0x9302);
    /// CT Reconstruction Sequence.
    pub const CT_RECONSTRUCTION_SEQUENCE: Tag = Tag(0x0018, 0x9314);
    /// Reconstruction Algorithm.
    pub const RECONSTRUCTION_ALGORITHM: Tag = Tag(0x0018, 0x9315);
    /// Series Instance UID.
    pub const SERIES_INSTANCE_UID: Tag = Tag(0x0020, 0x000E);
    /// Patient Orientation.
    pub const PATIENT_ORIENTATION: Tag = Tag(0x0020, 0x0020);
    /// Image Position (Patient).
    pub const IMAGE_POSITION_PATIENT: Tag = Tag(0x0020, 0x0032);
    /// Image Orientation (Patient).
    pub const IMAGE_ORIENTATION_PATIENT: Tag = Tag(0x0020, 0x0037);
    /// Frame of Reference UID.
    pub const FRAME_OF_REFERENCE_UID: Tag = Tag(0x0020, 0x0052);
    /// Image Laterality.
    pub const IMAGE_LATERALITY: Tag = Tag(0x0020, 0x0062);
    /// Rows.
    pub const ROWS: Tag = Tag(0x0028, 0x0010);
    /// Columns.
    pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
    /// Pixel Spacing.
    pub const PIXEL_SPACING: Tag = Tag(0x0028, 0x0030);
    /// Radiopharmaceutical Information Sequence.
    pub const RADIOPHARMACEUTICAL_INFORMATION_SEQUENCE: Tag = Tag(0x0054, 0x0016);
    /// View Code Sequence.
    pub const VIEW_CODE_SEQUENCE: Tag = Tag(0x0054, 0x0220);
    /// View Modifier Code Sequence.
    pub const VIEW_MODIFIER_CODE_SEQUENCE: Tag = Tag(0x0054, 0x0222);
    /// Radionuclide Code Sequence.
    pub const RADIONUCLIDE_CODE_SEQUENCE: Tag = Tag(0x0054, 0x0300);
    /// Administration Route Code Sequence.
    pub const ADMINISTRATION_ROUTE_CODE_SEQUENCE: Tag = Tag(0x0054, 0x0302);
    /// Radiopharmaceutical Code Sequence.
    pub const RADIOPHARMACEUTICAL_CODE_SEQUENCE: Tag = Tag(0x0054, 0x0304);
    /// Segment Sequence.
    pub const SEGMENT_SEQUENCE: Tag = Tag(0x0062, 0x0002);
    /// Segment Number.
    pub const SEGMENT_NUMBER: Tag = Tag(0x0062, 0x0004);
    /// Tracking ID.
    pub const TRACKING_ID: Tag = Tag(0x0062, 0x0020);
    /// Tracking UID.
    pub const TRACKING_UID: Tag = Tag(0x0062, 0x0021);
}

/// Read access to a dataset (and write access to code sequences).
pub trait Dataset {
    /// Returns the value at `pos` of a (possibly multi-valued) string attribute.
    ///
    /// Absent attributes, positions and empty values yield `None`.
    fn string_value(&self, tag: Tag, pos: usize) -> Option<&str>;

    /// Returns item `index` of a sequence attribute.
    fn sequence_item(&self, tag: Tag, index: usize) -> Option<&dyn Dataset>;

    /// Returns the number of items of a sequence attribute (0 if absent).
    fn sequence_len(&self, tag: Tag) -> usize;

    /// Replaces a code sequence by a single item holding `entry`.
    fn write_coded_entry_sequence(&mut self, tag: Tag, entry: &CodedEntry) -> CmrResult<()>;

    /// Reads the coded entry in the first item of a code sequence.
    ///
    /// Returns `None` unless the item holds a complete entry.
    fn read_coded_entry_sequence(&self, tag: Tag) -> Option<CodedEntry> {
        let item = self.sequence_item(tag, 0)?;
        let entry = CodedEntry::new(
            item.string_value(tags::CODE_VALUE, 0)?,
            item.string_value(tags::CODING_SCHEME_DESIGNATOR, 0)?,
            item.string_value(tags::CODE_MEANING, 0)?,
        );
        entry.is_complete().then_some(entry)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Element {
    Strings(Vec<String>),
    Sequence(Vec<MemoryDataset>),
}

/// An in-memory dataset.
///
/// # Example
///
/// ```ignore
/// use dcmr_engine::dataset::{tags, Dataset, MemoryDataset};
///
/// let mut item = MemoryDataset::new();
/// item.put_str(tags::PIXEL_SPACING, "0.5\\0.7");
/// assert_eq!(item.string_value(tags::PIXEL_SPACING, 1), Some("0.7"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDataset {
    elements: BTreeMap<Tag, Element>,
}

impl MemoryDataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a string attribute; backslashes separate multiple values.
    pub fn put_str(&mut self, tag: Tag, value: &str) -> &mut Self {
        let values = value.split('\\').map(|v| v.trim().to_string()).collect();
        self.elements.insert(tag, Element::Strings(values));
        self
    }

    /// Builder variant of [`put_str`](Self::put_str).
    pub fn with_str(mut self, tag: Tag, value: &str) -> Self {
        self.put_str(tag, value);
        self
    }

    /// Appends an item to a sequence attribute (created if needed).
    pub fn push_item(&mut self, tag: Tag, item: MemoryDataset) -> &mut Self {
        match self.elements.get_mut(&tag) {
            Some(Element::Sequence(items)) => items.push(item),
            _ => {
                self.elements.insert(tag, Element::Sequence(vec![item]));
            }
        }
        self
    }

    /// Builder variant of [`push_item`](Self::push_item).
    pub fn with_item(mut self, tag: Tag, item: MemoryDataset) -> Self {
        self.push_item(tag, item);
        self
    }

    /// Builder that adds a code sequence with a single item.
    pub fn with_code(mut self, tag: Tag, entry: &CodedEntry) -> Self {
        self.elements
            .insert(tag, Element::Sequence(vec![code_item(entry)]));
        self
    }

    /// Removes an attribute.
    pub fn remove(&mut self, tag: Tag) -> bool {
        self.elements.remove(&tag).is_some()
    }

    /// Returns true if the attribute is present.
    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the dataset has no attributes.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn code_item(entry: &CodedEntry) -> MemoryDataset {
    MemoryDataset::new()
        .with_str(tags::CODE_VALUE, entry.code_value())
        .with_str(tags::CODING_SCHEME_DESIGNATOR, entry.coding_scheme())
        .with_str(tags::CODE_MEANING, entry.code_meaning())
}

impl Dataset for MemoryDataset {
    fn string_value(&self, tag: Tag, pos: usize) -> Option<&str> {
        match self.elements.get(&tag)? {
            Element::Strings(values) => values
                .get(pos)
                .map(String::as_str)
                .filter(|v| !v.is_empty()),
            Element::Sequence(_) => None,
        }
    }

    fn sequence_item(&self, tag: Tag, index: usize) -> Option<&dyn Dataset> {
        match self.elements.get(&tag)? {
            Element::Sequence(items) => items.get(index).map(|item| item as &dyn Dataset),
            Element::Strings(_) => None,
        }
    }

    fn sequence_len(&self, tag: Tag) -> usize {
        match self.elements.get(&tag) {
            Some(Element::Sequence(items)) => items.len(),
            _ => 0,
        }
    }

    fn write_coded_entry_sequence(&mut self, tag: Tag, entry: &CodedEntry) -> CmrResult<()> {
        if !entry.is_complete() {
            return Err(CmrError::InvalidValue);
        }
        self.elements
            .insert(tag, Element::Sequence(vec![code_item(entry)]));
        Ok(())
    }
}
