//! CID 4021: PET Radiopharmaceutical.

use super::context_group;

context_group! {
    /// CID 4021: PET Radiopharmaceutical.
    pub type Cid4021PetRadiopharmaceutical = ContextGroup<PetRadiopharmaceutical> {
        identifier: "4021",
        version: "20190124",
        uid: "1.2.840.10008.6.1.305",
        extensible: true,
        codes: {
            AcetateC11 => ("C-B1043", "SRT", "Acetate C^11^"),
            AmmoniaN13 => ("C-B103C", "SRT", "Ammonia N^13^"),
            FluoroLDopaF18 => ("C-B1034", "SRT", "Fluoro-L-dopa F^18^"),
            FluorocholineF18 => ("C-E0273", "SRT", "Fluorocholine F^18^"),
            FluorodeoxyglucoseF18 => ("C-B1031", "SRT", "Fluorodeoxyglucose F^18^"),
            WaterO15 => ("C-B1039", "SRT", "Water O^15^"),
        }
    }
}
