//! Concrete context groups.
//!
//! Each group is an enumeration of its members plus the built-in table
//! mapping every member to a coded entry. The tables cover the members the
//! template composers use; complete tables are supplied at runtime through
//! [`VocabularyStore`](crate::VocabularyStore).

mod cid10013;
mod cid10033;
mod cid218;
mod cid244;
mod cid29;
mod cid4020;
mod cid4021;
mod cid4031;
mod cid5000;
mod cid5001;
mod cid6147;
mod cid7181;
mod cid7445;
mod cid7452;
mod cid7453;
mod cid7464;
mod cid7469;

pub use cid10013::{map_acquisition_type, Cid10013CtAcquisitionType, CtAcquisitionType};
pub use cid10033::{
    map_reconstruction_algorithm, Cid10033CtReconstructionAlgorithm, CtReconstructionAlgorithm,
};
pub use cid218::{Cid218QuantitativeImageFeature, QuantitativeImageFeature};
pub use cid244::{map_image_laterality, Cid244Laterality, Laterality};
pub use cid29::{map_modality, AcquisitionModality, Cid29AcquisitionModality};
pub use cid4020::{Cid4020PetRadionuclide, PetRadionuclide};
pub use cid4021::{Cid4021PetRadiopharmaceutical, PetRadiopharmaceutical};
pub use cid4031::{map_body_part_examined, Cid4031CommonAnatomicRegions, CommonAnatomicRegion};
pub use cid5000::{Cid5000Languages, Language};
pub use cid5001::{Cid5001Countries, Country};
pub use cid6147::{Cid6147ResponseCriteria, ResponseCriterion};
pub use cid7181::{Cid7181AbstractMultiDimensionalImageModelComponentUnits, ImageModelUnit};
pub use cid7445::{Cid7445DeviceParticipatingRoles, DeviceParticipatingRole};
pub use cid7452::{Cid7452OrganizationalRoles, OrganizationalRole};
pub use cid7453::{Cid7453PerformingRoles, PerformingRole};
pub use cid7464::{Cid7464GeneralRegionOfInterestMeasurementModifiers, RoiMeasurementModifier};
pub use cid7469::{Cid7469GenericIntensityAndSizeMeasurements, IntensityAndSizeMeasurement};

/// Declares a context group: the key enumeration, its [`Vocabulary`]
/// implementation and a `ContextGroup` alias.
///
/// Every member is written as `Key => (code value, coding scheme, code meaning)`.
///
/// [`Vocabulary`]: crate::Vocabulary
macro_rules! context_group {
    (
        $(#[$meta:meta])*
        pub type $alias:ident = ContextGroup<$key:ident> {
            identifier: $id:literal,
            version: $version:literal,
            uid: $uid:literal,
            extensible: $extensible:literal,
            codes: {
                $(
                    $(#[$member_meta:meta])*
                    $member:ident => ($value:literal, $scheme:literal, $meaning:literal)
                ),+ $(,)?
            }
        }
    ) => {
        #[doc = concat!("Members of CID ", $id, ".")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $key {
            $(
                $(#[$member_meta])*
                #[doc = concat!("(", $value, ", ", $scheme, ", \"", $meaning, "\")")]
                $member,
            )+
        }

        impl $crate::vocabulary::Vocabulary for $key {
            const IDENTIFIER: &'static str = $id;
            const VERSION: &'static str = $version;
            const UID: &'static str = $uid;
            const EXTENSIBLE: bool = $extensible;
            const KEYS: &'static [Self] = &[$(Self::$member),+];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$member => stringify!($member),)+
                }
            }

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($member) => Some(Self::$member),)+
                    _ => None,
                }
            }

            fn standard_entry(self) -> $crate::CodedEntry {
                match self {
                    $(Self::$member => $crate::CodedEntry::from_static($value, $scheme, $meaning),)+
                }
            }

            fn shared_table() -> &'static $crate::vocabulary::TableCell<Self> {
                static TABLE: $crate::vocabulary::TableCell<$key> =
                    $crate::vocabulary::TableCell::new();
                &TABLE
            }
        }

        $(#[$meta])*
        pub type $alias = $crate::context_group::ContextGroup<$key>;
    };
}

pub(crate) use context_group;

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::vocabulary::Vocabulary;

    fn assert_consistent<K: Vocabulary>() {
        let mut names = HashSet::new();
        let mut entries = HashSet::new();
        for &key in K::KEYS {
            assert!(names.insert(key.name()), "duplicate name {:?}", key);
            assert_eq!(K::from_name(key.name()), Some(key));
            let entry = key.standard_entry();
            assert!(entry.is_valid(), "CID {} {:?}: {}", K::IDENTIFIER, key, entry);
            assert!(entries.insert(entry), "CID {} duplicate code {:?}", K::IDENTIFIER, key);
        }
        assert!(K::UID.starts_with("1.2.840.10008.6.1."));
        assert_eq!(K::VERSION.len(), 8);
    }

    #[test]
    fn test_tables_are_consistent() {
        assert_consistent::<AcquisitionModality>();
        assert_consistent::<Laterality>();
        assert_consistent::<PetRadionuclide>();
        assert_consistent::<PetRadiopharmaceutical>();
        assert_consistent::<CommonAnatomicRegion>();
        assert_consistent::<Language>();
        assert_consistent::<Country>();
        assert_consistent::<ResponseCriterion>();
        assert_consistent::<ImageModelUnit>();
        assert_consistent::<DeviceParticipatingRole>();
        assert_consistent::<OrganizationalRole>();
        assert_consistent::<PerformingRole>();
        assert_consistent::<RoiMeasurementModifier>();
        assert_consistent::<IntensityAndSizeMeasurement>();
        assert_consistent::<CtAcquisitionType>();
        assert_consistent::<CtReconstructionAlgorithm>();
        assert_consistent::<QuantitativeImageFeature>();
    }

    #[test]
    fn test_from_name_unknown() {
        assert_eq!(CommonAnatomicRegion::from_name("Tail"), None);
        assert_eq!(CommonAnatomicRegion::from_name("abdomen"), None);
    }
}
