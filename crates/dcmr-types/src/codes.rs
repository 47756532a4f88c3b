//! Well-known coded concepts used by the templates.
//!
//! Constants are grouped by coding scheme. They are plain [`CodedEntry`]
//! values built at compile time, so comparing against them never allocates.
//!
//! # Examples
//!
//! ```
//! use dcmr_types::codes::{dcm, ucum};
//!
//! assert_eq!(dcm::MODALITY.code_value(), "121139");
//! assert_eq!(ucum::MILLIMETER.coding_scheme(), "UCUM");
//! ```

/// DICOM Controlled Terminology (DCM).
pub mod dcm {
    use crate::CodedEntry;

    const fn code(value: &'static str, meaning: &'static str) -> CodedEntry {
        CodedEntry::from_static(value, "DCM", meaning)
    }

    // =========================================================================
    // Observation context (TID 1001 - 1007)
    // =========================================================================

    /// Observer Type.
    pub const OBSERVER_TYPE: CodedEntry = code("121005", "Observer Type");
    /// Person.
    pub const PERSON: CodedEntry = code("121006", "Person");
    /// Device.
    pub const DEVICE: CodedEntry = code("121007", "Device");
    /// Person Observer Name.
    pub const PERSON_OBSERVER_NAME: CodedEntry = code("121008", "Person Observer Name");
    /// Person Observer's Organization Name.
    pub const PERSON_OBSERVER_ORGANIZATION_NAME: CodedEntry =
        code("121009", "Person Observer's Organization Name");
    /// Person Observer's Role in the Organization.
    pub const PERSON_OBSERVER_ROLE_IN_ORGANIZATION: CodedEntry =
        code("121010", "Person Observer's Role in the Organization");
    /// Person Observer's Role in this Procedure.
    pub const PERSON_OBSERVER_ROLE_IN_PROCEDURE: CodedEntry =
        code("121011", "Person Observer's Role in this Procedure");
    /// Device Observer UID.
    pub const DEVICE_OBSERVER_UID: CodedEntry = code("121012", "Device Observer UID");
    /// Device Observer Name.
    pub const DEVICE_OBSERVER_NAME: CodedEntry = code("121013", "Device Observer Name");
    /// Device Observer Manufacturer.
    pub const DEVICE_OBSERVER_MANUFACTURER: CodedEntry =
        code("121014", "Device Observer Manufacturer");
    /// Device Observer Model Name.
    pub const DEVICE_OBSERVER_MODEL_NAME: CodedEntry = code("121015", "Device Observer Model Name");
    /// Device Observer Serial Number.
    pub const DEVICE_OBSERVER_SERIAL_NUMBER: CodedEntry =
        code("121016", "Device Observer Serial Number");
    /// Device Observer Physical Location During Observation.
    pub const DEVICE_OBSERVER_PHYSICAL_LOCATION: CodedEntry =
        code("121017", "Device Observer Physical Location During Observation");
    /// Device Role in Procedure.
    pub const DEVICE_ROLE_IN_PROCEDURE: CodedEntry = code("113876", "Device Role in Procedure");
    /// Station AE Title.
    pub const STATION_AE_TITLE: CodedEntry = code("110119", "Station AE Title");
    /// Procedure Study Instance UID.
    pub const PROCEDURE_STUDY_INSTANCE_UID: CodedEntry =
        code("121018", "Procedure Study Instance UID");
    /// Procedure Study Component UID.
    pub const PROCEDURE_STUDY_COMPONENT_UID: CodedEntry =
        code("121019", "Procedure Study Component UID");
    /// Placer Number.
    pub const PLACER_NUMBER: CodedEntry = code("121020", "Placer Number");
    /// Filler Number.
    pub const FILLER_NUMBER: CodedEntry = code("121021", "Filler Number");
    /// Accession Number.
    pub const ACCESSION_NUMBER: CodedEntry = code("121022", "Accession Number");
    /// Subject Class.
    pub const SUBJECT_CLASS: CodedEntry = code("121024", "Subject Class");
    /// Patient.
    pub const PATIENT: CodedEntry = code("121025", "Patient");
    /// Fetus.
    pub const FETUS: CodedEntry = code("121026", "Fetus");
    /// Specimen.
    pub const SPECIMEN: CodedEntry = code("121027", "Specimen");
    /// Subject UID.
    pub const SUBJECT_UID: CodedEntry = code("121028", "Subject UID");
    /// Subject Name.
    pub const SUBJECT_NAME: CodedEntry = code("121029", "Subject Name");
    /// Subject ID.
    pub const SUBJECT_ID: CodedEntry = code("121030", "Subject ID");
    /// Subject Birth Date.
    pub const SUBJECT_BIRTH_DATE: CodedEntry = code("121031", "Subject Birth Date");

    // =========================================================================
    // Language (TID 1204)
    // =========================================================================

    /// Language of Content Item and Descendants.
    pub const LANGUAGE_OF_CONTENT_ITEM_AND_DESCENDANTS: CodedEntry =
        code("121049", "Language of Content Item and Descendants");
    /// Country of Language.
    pub const COUNTRY_OF_LANGUAGE: CodedEntry = code("121046", "Country of Language");

    // =========================================================================
    // Image library (TID 1600 - 1607)
    // =========================================================================

    /// Image Library.
    pub const IMAGE_LIBRARY: CodedEntry = code("111028", "Image Library");
    /// Image Library Group.
    pub const IMAGE_LIBRARY_GROUP: CodedEntry = code("126200", "Image Library Group");
    /// Modality.
    pub const MODALITY: CodedEntry = code("121139", "Modality");
    /// Target Region.
    pub const TARGET_REGION: CodedEntry = code("123014", "Target Region");
    /// Image Laterality.
    pub const IMAGE_LATERALITY: CodedEntry = code("111027", "Image Laterality");
    /// Study Date.
    pub const STUDY_DATE: CodedEntry = code("111060", "Study Date");
    /// Study Time.
    pub const STUDY_TIME: CodedEntry = code("111061", "Study Time");
    /// Content Date.
    pub const CONTENT_DATE: CodedEntry = code("111018", "Content Date");
    /// Content Time.
    pub const CONTENT_TIME: CodedEntry = code("111019", "Content Time");
    /// Acquisition Date.
    pub const ACQUISITION_DATE: CodedEntry = code("126201", "Acquisition Date");
    /// Acquisition Time.
    pub const ACQUISITION_TIME: CodedEntry = code("126202", "Acquisition Time");
    /// Frame of Reference UID.
    pub const FRAME_OF_REFERENCE_UID: CodedEntry = code("112227", "Frame of Reference UID");
    /// Pixel Data Rows.
    pub const PIXEL_DATA_ROWS: CodedEntry = code("110910", "Pixel Data Rows");
    /// Pixel Data Columns.
    pub const PIXEL_DATA_COLUMNS: CodedEntry = code("110911", "Pixel Data Columns");
    /// Image View.
    pub const IMAGE_VIEW: CodedEntry = code("111031", "Image View");
    /// Image View Modifier.
    pub const IMAGE_VIEW_MODIFIER: CodedEntry = code("111032", "Image View Modifier");
    /// Patient Orientation Row.
    pub const PATIENT_ORIENTATION_ROW: CodedEntry = code("111044", "Patient Orientation Row");
    /// Patient Orientation Column.
    pub const PATIENT_ORIENTATION_COLUMN: CodedEntry =
        code("111043", "Patient Orientation Column");
    /// Horizontal Pixel Spacing.
    pub const HORIZONTAL_PIXEL_SPACING: CodedEntry = code("111026", "Horizontal Pixel Spacing");
    /// Vertical Pixel Spacing.
    pub const VERTICAL_PIXEL_SPACING: CodedEntry = code("111066", "Vertical Pixel Spacing");
    /// Positioner Primary Angle.
    pub const POSITIONER_PRIMARY_ANGLE: CodedEntry = code("112011", "Positioner Primary Angle");
    /// Positioner Secondary Angle.
    pub const POSITIONER_SECONDARY_ANGLE: CodedEntry =
        code("112012", "Positioner Secondary Angle");
    /// Spacing between slices.
    pub const SPACING_BETWEEN_SLICES: CodedEntry = code("112226", "Spacing between slices");
    /// Slice Thickness.
    pub const SLICE_THICKNESS: CodedEntry = code("112225", "Slice Thickness");
    /// Image Position (Patient) X.
    pub const IMAGE_POSITION_X: CodedEntry = code("110901", "Image Position (Patient) X");
    /// Image Position (Patient) Y.
    pub const IMAGE_POSITION_Y: CodedEntry = code("110902", "Image Position (Patient) Y");
    /// Image Position (Patient) Z.
    pub const IMAGE_POSITION_Z: CodedEntry = code("110903", "Image Position (Patient) Z");
    /// Image Orientation (Patient) Row X.
    pub const IMAGE_ORIENTATION_ROW_X: CodedEntry =
        code("110904", "Image Orientation (Patient) Row X");
    /// Image Orientation (Patient) Row Y.
    pub const IMAGE_ORIENTATION_ROW_Y: CodedEntry =
        code("110905", "Image Orientation (Patient) Row Y");
    /// Image Orientation (Patient) Row Z.
    pub const IMAGE_ORIENTATION_ROW_Z: CodedEntry =
        code("110906", "Image Orientation (Patient) Row Z");
    /// Image Orientation (Patient) Column X.
    pub const IMAGE_ORIENTATION_COLUMN_X: CodedEntry =
        code("110907", "Image Orientation (Patient) Column X");
    /// Image Orientation (Patient) Column Y.
    pub const IMAGE_ORIENTATION_COLUMN_Y: CodedEntry =
        code("110908", "Image Orientation (Patient) Column Y");
    /// Image Orientation (Patient) Column Z.
    pub const IMAGE_ORIENTATION_COLUMN_Z: CodedEntry =
        code("110909", "Image Orientation (Patient) Column Z");
    /// CT Acquisition Type.
    pub const CT_ACQUISITION_TYPE: CodedEntry = code("113820", "CT Acquisition Type");
    /// Reconstruction Algorithm.
    pub const RECONSTRUCTION_ALGORITHM: CodedEntry = code("113961", "Reconstruction Algorithm");
    /// Pulse Sequence Name.
    pub const PULSE_SEQUENCE_NAME: CodedEntry = code("111135", "Pulse Sequence Name");
    /// Radiopharmaceutical Start Time.
    pub const RADIOPHARMACEUTICAL_START_DATE_TIME: CodedEntry =
        code("123003", "Radiopharmaceutical Start Time");
    /// Radiopharmaceutical Stop Time.
    pub const RADIOPHARMACEUTICAL_STOP_DATE_TIME: CodedEntry =
        code("123004", "Radiopharmaceutical Stop Time");
    /// Radiopharmaceutical Volume.
    pub const RADIOPHARMACEUTICAL_VOLUME: CodedEntry =
        code("123005", "Radiopharmaceutical Volume");
    /// Radionuclide Total Dose.
    pub const RADIONUCLIDE_TOTAL_DOSE: CodedEntry = code("123006", "Radionuclide Total Dose");
    /// Positron emission tomography (modality code "PT").
    pub const POSITRON_EMISSION_TOMOGRAPHY: CodedEntry =
        code("PT", "Positron emission tomography");

    // =========================================================================
    // Measurements (TID 300, 1411, 1419, 1501, 4019)
    // =========================================================================

    /// Measurement Group.
    pub const MEASUREMENT_GROUP: CodedEntry = code("125007", "Measurement Group");
    /// Tracking Identifier.
    pub const TRACKING_IDENTIFIER: CodedEntry = code("112039", "Tracking Identifier");
    /// Tracking Unique Identifier.
    pub const TRACKING_UNIQUE_IDENTIFIER: CodedEntry =
        code("112040", "Tracking Unique Identifier");
    /// Finding.
    pub const FINDING: CodedEntry = code("121071", "Finding");
    /// Referenced Segment.
    pub const REFERENCED_SEGMENT: CodedEntry = code("121191", "Referenced Segment");
    /// Source series for segmentation.
    pub const SOURCE_SERIES_FOR_SEGMENTATION: CodedEntry =
        code("121232", "Source series for segmentation");
    /// Derivation.
    pub const DERIVATION: CodedEntry = code("121401", "Derivation");
    /// Equivalent Meaning of Concept Name.
    pub const EQUIVALENT_MEANING_OF_CONCEPT_NAME: CodedEntry =
        code("121050", "Equivalent Meaning of Concept Name");
    /// Real World Value Map used for measurement.
    pub const REAL_WORLD_VALUE_MAP_USED_FOR_MEASUREMENT: CodedEntry =
        code("126100", "Real World Value Map used for measurement");
    /// Source of Measurement.
    pub const SOURCE_OF_MEASUREMENT: CodedEntry = code("121112", "Source of Measurement");
    /// Algorithm Name.
    pub const ALGORITHM_NAME: CodedEntry = code("111001", "Algorithm Name");
    /// Algorithm Parameters.
    pub const ALGORITHM_PARAMETERS: CodedEntry = code("111002", "Algorithm Parameters");
    /// Algorithm Version.
    pub const ALGORITHM_VERSION: CodedEntry = code("111003", "Algorithm Version");
}

/// SNOMED CT (SCT).
pub mod sct {
    use crate::CodedEntry;

    const fn code(value: &'static str, meaning: &'static str) -> CodedEntry {
        CodedEntry::from_static(value, "SCT", meaning)
    }

    /// Radionuclide.
    pub const RADIONUCLIDE: CodedEntry = code("89457008", "Radionuclide");
    /// Radiopharmaceutical agent.
    pub const RADIOPHARMACEUTICAL_AGENT: CodedEntry =
        code("349358000", "Radiopharmaceutical agent");
    /// Half-life of radiopharmaceutical.
    pub const HALF_LIFE_OF_RADIOPHARMACEUTICAL: CodedEntry =
        code("304283002", "Half-life of radiopharmaceutical");
    /// Route of administration.
    pub const ROUTE_OF_ADMINISTRATION: CodedEntry = code("410675002", "Route of administration");
    /// Measurement Method.
    pub const MEASUREMENT_METHOD: CodedEntry = code("370129005", "Measurement Method");
    /// Finding Site.
    pub const FINDING_SITE: CodedEntry = code("363698007", "Finding Site");
    /// Laterality.
    pub const LATERALITY: CodedEntry = code("272741003", "Laterality");
    /// Topographical modifier.
    pub const TOPOGRAPHICAL_MODIFIER: CodedEntry = code("106233006", "Topographical modifier");
}

/// Unified Code for Units of Measure (UCUM).
pub mod ucum {
    use crate::CodedEntry;

    const fn code(value: &'static str, meaning: &'static str) -> CodedEntry {
        CodedEntry::from_static(value, "UCUM", meaning)
    }

    /// Pixels.
    pub const PIXELS: CodedEntry = code("{pixels}", "pixels");
    /// Millimeter.
    pub const MILLIMETER: CodedEntry = code("mm", "mm");
    /// Square millimeter.
    pub const SQUARE_MILLIMETER: CodedEntry = code("mm2", "mm2");
    /// Cubic millimeter.
    pub const CUBIC_MILLIMETER: CodedEntry = code("mm3", "mm3");
    /// Degrees of plane angle.
    pub const DEGREES: CodedEntry = code("deg", "degrees of plane angle");
    /// Unitless value in the range -1 to 1.
    pub const MINUS_1_TO_1: CodedEntry = code("{-1:1}", "{-1:1}");
    /// Second.
    pub const SECOND: CodedEntry = code("s", "s");
    /// Cubic centimeter.
    pub const CUBIC_CENTIMETER: CodedEntry = code("cm3", "cm3");
    /// Milliliter.
    pub const MILLILITER: CodedEntry = code("ml", "ml");
    /// Becquerel.
    pub const BECQUEREL: CodedEntry = code("Bq", "Bq");
    /// Hounsfield unit.
    pub const HOUNSFIELD_UNIT: CodedEntry = code("[hnsf'U]", "Hounsfield unit");
    /// No units.
    pub const NO_UNITS: CodedEntry = code("1", "no units");
}

/// NCI Thesaurus (NCIt).
pub mod ncit {
    use crate::CodedEntry;

    /// Activity Session.
    pub const ACTIVITY_SESSION: CodedEntry =
        CodedEntry::from_static("C67447", "NCIt", "Activity Session");
}

/// Unified Medical Language System (UMLS).
pub mod umls {
    use crate::CodedEntry;

    /// Time Point.
    pub const TIME_POINT: CodedEntry = CodedEntry::from_static("C2348792", "UMLS", "Time Point");
}
