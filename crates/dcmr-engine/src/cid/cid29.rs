//! CID 29: Acquisition Modality.

use dcmr_types::CodedEntry;

use super::context_group;
use crate::types::{CmrError, CmrResult};
use crate::vocabulary::Vocabulary;

context_group! {
    /// CID 29: Acquisition Modality.
    pub type Cid29AcquisitionModality = ContextGroup<AcquisitionModality> {
        identifier: "29",
        version: "20200311",
        uid: "1.2.840.10008.6.1.19",
        extensible: true,
        codes: {
            ComputedRadiography => ("CR", "DCM", "Computed Radiography"),
            ComputedTomography => ("CT", "DCM", "Computed Tomography"),
            DigitalRadiography => ("DX", "DCM", "Digital Radiography"),
            IntraOralRadiography => ("IO", "DCM", "Intra-oral Radiography"),
            MagneticResonance => ("MR", "DCM", "Magnetic Resonance"),
            Mammography => ("MG", "DCM", "Mammography"),
            NuclearMedicine => ("NM", "DCM", "Nuclear Medicine"),
            OphthalmicTomography => ("OPT", "DCM", "Ophthalmic Tomography"),
            PanoramicXRay => ("PX", "DCM", "Panoramic X-Ray"),
            PositronEmissionTomography => ("PT", "DCM", "Positron emission tomography"),
            RadioFluoroscopy => ("RF", "DCM", "Radio Fluoroscopy"),
            Ultrasound => ("US", "DCM", "Ultrasound"),
            XRayAngiography => ("XA", "DCM", "X-Ray Angiography"),
        }
    }
}

/// Maps a Modality (0008,0060) defined term to its coded entry.
///
/// The code value of every member equals the defined term.
pub fn map_modality(defined_term: &str) -> CmrResult<CodedEntry> {
    let term = defined_term.trim();
    AcquisitionModality::table()
        .iter()
        .find(|(_, entry)| entry.code_value() == term)
        .map(|(_, entry)| entry.clone())
        .ok_or_else(|| CmrError::UnsupportedValue(term.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_modality() {
        let ct = map_modality("CT").unwrap();
        assert_eq!(ct.code_meaning(), "Computed Tomography");
        assert_eq!(map_modality("PT").unwrap(), dcmr_types::codes::dcm::POSITRON_EMISSION_TOMOGRAPHY);
        assert!(matches!(map_modality("XX"), Err(CmrError::UnsupportedValue(v)) if v == "XX"));
    }
}
