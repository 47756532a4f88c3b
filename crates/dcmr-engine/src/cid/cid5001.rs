//! CID 5001: Countries.

use super::context_group;

context_group! {
    /// CID 5001: Countries (ISO 3166-1 alpha-2).
    pub type Cid5001Countries = ContextGroup<Country> {
        identifier: "5001",
        version: "20130617",
        uid: "1.2.840.10008.6.1.329",
        extensible: true,
        codes: {
            Austria => ("AT", "ISO3166_1", "Austria"),
            Canada => ("CA", "ISO3166_1", "Canada"),
            China => ("CN", "ISO3166_1", "China"),
            France => ("FR", "ISO3166_1", "France"),
            Germany => ("DE", "ISO3166_1", "Germany"),
            Italy => ("IT", "ISO3166_1", "Italy"),
            Japan => ("JP", "ISO3166_1", "Japan"),
            Netherlands => ("NL", "ISO3166_1", "Netherlands"),
            Spain => ("ES", "ISO3166_1", "Spain"),
            Switzerland => ("CH", "ISO3166_1", "Switzerland"),
            UnitedKingdom => ("GB", "ISO3166_1", "United Kingdom"),
            UnitedStates => ("US", "ISO3166_1", "United States"),
        }
    }
}
