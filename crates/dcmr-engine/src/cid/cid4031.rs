//! CID 4031: Common Anatomic Regions.

use dcmr_types::CodedEntry;

use super::context_group;
use crate::types::{CmrError, CmrResult};
use crate::vocabulary::Vocabulary;

context_group! {
    /// CID 4031: Common Anatomic Regions.
    pub type Cid4031CommonAnatomicRegions = ContextGroup<CommonAnatomicRegion> {
        identifier: "4031",
        version: "20130617",
        uid: "1.2.840.10008.6.1.308",
        extensible: true,
        codes: {
            Abdomen => ("T-D4000", "SRT", "Abdomen"),
            AbdomenAndPelvis => ("R-FAB57", "SRT", "Abdomen and Pelvis"),
            AnkleJoint => ("T-15750", "SRT", "Ankle joint"),
            Bladder => ("T-74000", "SRT", "Bladder"),
            Breast => ("T-04000", "SRT", "Breast"),
            CervicalSpine => ("T-11501", "SRT", "Cervical spine"),
            CervicoThoracicSpine => ("T-D00F7", "SRT", "Cervico-thoracic spine"),
            Chest => ("T-D3000", "SRT", "Chest"),
            ChestAndAbdomen => ("R-FAB55", "SRT", "Chest and Abdomen"),
            ChestAbdomenAndPelvis => ("R-FAB56", "SRT", "Chest, Abdomen and Pelvis"),
            Colon => ("T-59300", "SRT", "Colon"),
            ElbowJoint => ("T-15430", "SRT", "Elbow joint"),
            EntireBody => ("T-D0010", "SRT", "Entire body"),
            Esophagus => ("T-56000", "SRT", "Esophagus"),
            Extremity => ("T-D0300", "SRT", "Extremity"),
            Foot => ("T-D9700", "SRT", "Foot"),
            Hand => ("T-D8700", "SRT", "Hand"),
            Head => ("T-D1100", "SRT", "Head"),
            HeadAndNeck => ("T-D1000", "SRT", "Head and Neck"),
            Heart => ("T-32000", "SRT", "Heart"),
            HipJoint => ("T-15710", "SRT", "Hip joint"),
            Knee => ("T-D9200", "SRT", "Knee"),
            LumbarSpine => ("T-11503", "SRT", "Lumbar spine"),
            LumboSacralSpine => ("T-D00F9", "SRT", "Lumbo-sacral spine"),
            Neck => ("T-D1600", "SRT", "Neck"),
            Pelvis => ("T-D6000", "SRT", "Pelvis"),
            Phantom => ("113681", "DCM", "Phantom"),
            Prostate => ("T-9200B", "SRT", "Prostate"),
            Rectum => ("T-59600", "SRT", "Rectum"),
            Shoulder => ("T-D2220", "SRT", "Shoulder"),
            Skull => ("T-11100", "SRT", "Skull"),
            Spine => ("T-D0146", "SRT", "Spine"),
            Stomach => ("T-57000", "SRT", "Stomach"),
            Thigh => ("T-D9100", "SRT", "Thigh"),
            ThoracicSpine => ("T-11502", "SRT", "Thoracic spine"),
            ThoracoLumbarSpine => ("T-D00F8", "SRT", "Thoraco-lumbar spine"),
            WristJoint => ("T-15460", "SRT", "Wrist joint"),
        }
    }
}

/// Maps a Body Part Examined (0018,0015) defined term to its coded entry.
///
/// Terms without a counterpart in this group are unsupported.
pub fn map_body_part_examined(defined_term: &str) -> CmrResult<CodedEntry> {
    use CommonAnatomicRegion::*;

    let key = match defined_term.trim() {
        "ABDOMEN" => Abdomen,
        "ABDOMENPELVIS" => AbdomenAndPelvis,
        "ANKLE" => AnkleJoint,
        "BLADDER" => Bladder,
        "BREAST" => Breast,
        "CSPINE" => CervicalSpine,
        "CTSPINE" => CervicoThoracicSpine,
        "CHEST" => Chest,
        "CHESTABDOMEN" => ChestAndAbdomen,
        "CHESTABDPELVIS" => ChestAbdomenAndPelvis,
        "COLON" => Colon,
        "ELBOW" => ElbowJoint,
        "WHOLEBODY" => EntireBody,
        "ESOPHAGUS" => Esophagus,
        "EXTREMITY" => Extremity,
        "FOOT" => Foot,
        "HAND" => Hand,
        "HEAD" => Head,
        "HEADNECK" => HeadAndNeck,
        "HEART" => Heart,
        "HIP" => HipJoint,
        "KNEE" => Knee,
        "LSPINE" => LumbarSpine,
        "LSSPINE" => LumboSacralSpine,
        "NECK" => Neck,
        "PELVIS" => Pelvis,
        "PROSTATE" => Prostate,
        "RECTUM" => Rectum,
        "SHOULDER" => Shoulder,
        "SKULL" => Skull,
        "SPINE" => Spine,
        "STOMACH" => Stomach,
        "THIGH" => Thigh,
        "TSPINE" => ThoracicSpine,
        "TLSPINE" => ThoracoLumbarSpine,
        "WRIST" => WristJoint,
        other => return Err(CmrError::UnsupportedValue(other.to_string())),
    };
    CommonAnatomicRegion::table()
        .get(key)
        .cloned()
        .ok_or_else(|| CmrError::UnsupportedValue(defined_term.to_string()))
}
