//! CID 4020: PET Radionuclide.

use super::context_group;

context_group! {
    /// CID 4020: PET Radionuclide.
    pub type Cid4020PetRadionuclide = ContextGroup<PetRadionuclide> {
        identifier: "4020",
        version: "20070625",
        uid: "1.2.840.10008.6.1.304",
        extensible: true,
        codes: {
            Carbon11 => ("C-105A1", "SRT", "^11^Carbon"),
            Fluorine18 => ("C-111A1", "SRT", "^18^Fluorine"),
            Gallium68 => ("C-131A3", "SRT", "^68^Gallium"),
            Nitrogen13 => ("C-107A1", "SRT", "^13^Nitrogen"),
            Oxygen15 => ("C-B1038", "SRT", "^15^Oxygen"),
            Rubidium82 => ("C-159A2", "SRT", "^82^Rubidium"),
        }
    }
}
