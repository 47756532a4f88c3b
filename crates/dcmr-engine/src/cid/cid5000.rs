//! CID 5000: Languages.

use super::context_group;

context_group! {
    /// CID 5000: Languages (RFC 5646 tags).
    pub type Cid5000Languages = ContextGroup<Language> {
        identifier: "5000",
        version: "20190918",
        uid: "1.2.840.10008.6.1.328",
        extensible: true,
        codes: {
            Chinese => ("zh", "RFC5646", "Chinese"),
            Dutch => ("nl", "RFC5646", "Dutch"),
            English => ("en", "RFC5646", "English"),
            EnglishUnitedKingdom => ("en-GB", "RFC5646", "English, United Kingdom"),
            EnglishUnitedStates => ("en-US", "RFC5646", "English, United States"),
            French => ("fr", "RFC5646", "French"),
            German => ("de", "RFC5646", "German"),
            GermanGermany => ("de-DE", "RFC5646", "German, Germany"),
            Italian => ("it", "RFC5646", "Italian"),
            Japanese => ("ja", "RFC5646", "Japanese"),
            Korean => ("ko", "RFC5646", "Korean"),
            Portuguese => ("pt", "RFC5646", "Portuguese"),
            Spanish => ("es", "RFC5646", "Spanish"),
        }
    }
}
