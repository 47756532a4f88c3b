//! CID 7181: Abstract Multi-dimensional Image Model Component Units.

use super::context_group;

context_group! {
    /// CID 7181: Abstract Multi-dimensional Image Model Component Units.
    pub type Cid7181AbstractMultiDimensionalImageModelComponentUnits = ContextGroup<ImageModelUnit> {
        identifier: "7181",
        version: "20170914",
        uid: "1.2.840.10008.6.1.1095",
        extensible: true,
        codes: {
            Becquerel => ("Bq", "UCUM", "Bq"),
            BecquerelsPerMilliliter => ("Bq/ml", "UCUM", "Becquerels/milliliter"),
            CubicCentimeter => ("cm3", "UCUM", "cm3"),
            CubicMillimeter => ("mm3", "UCUM", "mm3"),
            HounsfieldUnit => ("[hnsf'U]", "UCUM", "Hounsfield unit"),
            Milliliter => ("ml", "UCUM", "ml"),
            Millimeter => ("mm", "UCUM", "mm"),
            NoUnits => ("1", "UCUM", "no units"),
            Pixels => ("{pixels}", "UCUM", "pixels"),
            Second => ("s", "UCUM", "s"),
            SquareMillimeter => ("mm2", "UCUM", "mm2"),
            StandardizedUptakeValueBodyWeight => ("{SUVbw}g/ml", "UCUM", "Standardized Uptake Value body weight"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;
    use dcmr_types::codes::ucum;

    #[test]
    fn test_units_match_well_known_codes() {
        assert_eq!(ImageModelUnit::CubicMillimeter.standard_entry(), ucum::CUBIC_MILLIMETER);
        assert_eq!(ImageModelUnit::Becquerel.standard_entry(), ucum::BECQUEREL);
        assert_eq!(ImageModelUnit::NoUnits.standard_entry(), ucum::NO_UNITS);
    }
}
