//! Context groups: a vocabulary table plus extension codes and a selected value.

use std::fmt;
use std::sync::Arc;

use dcmr_types::{CodedEntry, DCMR};

use crate::types::{CmrError, CmrResult};
use crate::vocabulary::{CodeTable, Vocabulary};

/// Where a coded entry was found in a context group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindResult {
    /// Member of the standard table.
    InStandard,
    /// Member of the extension codes of this instance.
    IsExtension,
    /// Not a member.
    NotFound,
}

impl FindResult {
    /// Returns true unless `NotFound`.
    pub fn is_found(self) -> bool {
        self != Self::NotFound
    }
}

/// A context group instance over vocabulary `K`.
///
/// The standard table is shared (by default the process-wide table of `K`),
/// extension codes and the selected value belong to this instance.
///
/// # Baseline and defined groups
///
/// With `defined = false` a group is advisory and [`select_value`]
/// accepts any structurally valid coded entry. With `defined = true` the entry
/// must be a member of the standard table or of the extension codes.
///
/// [`select_value`]: ContextGroup::select_value
///
/// # Example
///
/// ```ignore
/// use dcmr_engine::cid::{Cid4031CommonAnatomicRegions, CommonAnatomicRegion};
/// use dcmr_engine::CodedEntry;
///
/// let mut group = Cid4031CommonAnatomicRegions::from(CommonAnatomicRegion::Chest);
/// assert_eq!(group.selected_value().map(|e| e.code_value()), Some("T-D3000"));
///
/// let unknown = CodedEntry::new("99X", "99LOCAL", "Local region");
/// assert!(group.select_value(unknown.clone(), true, false).is_ok());
/// assert!(group.select_value(unknown, true, true).is_err());
/// ```
#[derive(Clone)]
pub struct ContextGroup<K: Vocabulary> {
    table: Arc<CodeTable<K>>,
    extended: Vec<CodedEntry>,
    selected: Option<CodedEntry>,
    enhanced_encoding_mode: bool,
}

impl<K: Vocabulary> ContextGroup<K> {
    /// Creates an empty group over the process-wide table.
    pub fn new() -> Self {
        Self::with_table(K::table())
    }

    /// Creates an empty group over an injected table.
    pub fn with_table(table: Arc<CodeTable<K>>) -> Self {
        Self {
            table,
            extended: Vec::new(),
            selected: None,
            enhanced_encoding_mode: false,
        }
    }

    /// Creates a group with `key` selected.
    ///
    /// If the table lacks the key no value is selected.
    pub fn with_key(key: K, enhanced: bool) -> Self {
        let mut group = Self::new();
        group.enhanced_encoding_mode = enhanced;
        group.selected = group.lookup(key, enhanced);
        group
    }

    /// Context group identifier.
    pub fn identifier(&self) -> &'static str {
        K::IDENTIFIER
    }

    /// Mapping resource ("DCMR").
    pub fn mapping_resource(&self) -> &'static str {
        DCMR
    }

    /// Context group version.
    pub fn version(&self) -> &'static str {
        K::VERSION
    }

    /// Context group UID.
    pub fn uid(&self) -> &'static str {
        K::UID
    }

    /// Whether extension codes are accepted.
    pub fn is_extensible(&self) -> bool {
        K::EXTENSIBLE
    }

    /// The standard table used by this instance.
    pub fn table(&self) -> &CodeTable<K> {
        &self.table
    }

    /// Enables or disables the enhanced encoding stamp on selected values.
    pub fn set_enhanced_encoding_mode(&mut self, mode: bool) {
        self.enhanced_encoding_mode = mode;
    }

    /// Returns the enhanced encoding mode.
    pub fn enhanced_encoding_mode(&self) -> bool {
        self.enhanced_encoding_mode
    }

    /// Clears extension codes and the selected value.
    pub fn clear(&mut self) {
        self.extended.clear();
        self.selected = None;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Membership
    // ═══════════════════════════════════════════════════════════════════════════

    /// Returns true if `entry` is a member (standard or extension).
    pub fn has_coded_entry(&self, entry: &CodedEntry) -> bool {
        self.find_coded_entry(entry).is_found()
    }

    /// Classifies `entry`; the standard table is searched first.
    pub fn find_coded_entry(&self, entry: &CodedEntry) -> FindResult {
        if self.table.contains(entry) {
            FindResult::InStandard
        } else if self.extended.contains(entry) {
            FindResult::IsExtension
        } else {
            FindResult::NotFound
        }
    }

    /// Adds an extension code.
    ///
    /// Entries already in the group are not added twice.
    pub fn add_coded_entry(&mut self, entry: CodedEntry) -> CmrResult<()> {
        if !K::EXTENSIBLE {
            return Err(CmrError::NonExtensibleContextGroup);
        }
        if !entry.is_valid() {
            return Err(CmrError::InvalidValue);
        }
        if !self.has_coded_entry(&entry) {
            self.extended.push(entry);
        }
        Ok(())
    }

    /// Returns true if extension codes were added.
    pub fn has_extended_coded_entries(&self) -> bool {
        !self.extended.is_empty()
    }

    /// Extension codes in insertion order.
    pub fn extended_codes(&self) -> &[CodedEntry] {
        &self.extended
    }

    /// Removes all extension codes (the selected value is kept).
    pub fn clear_extended_coded_entries(&mut self) {
        self.extended.clear();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Selection
    // ═══════════════════════════════════════════════════════════════════════════

    /// Returns the selected value.
    pub fn selected_value(&self) -> Option<&CodedEntry> {
        self.selected.as_ref()
    }

    /// Returns true if a value is selected.
    pub fn has_selected_value(&self) -> bool {
        self.selected.is_some()
    }

    /// Returns the key of the selected value, if it is a standard entry.
    pub fn selected_key(&self) -> Option<K> {
        self.selected.as_ref().and_then(|entry| self.table.find(entry))
    }

    /// Selects the table entry of `key`.
    pub fn select(&mut self, key: K) -> CmrResult<()> {
        let entry = self
            .lookup(key, self.enhanced_encoding_mode)
            .ok_or(CmrError::CodedEntryNotInContextGroup)?;
        self.selected = Some(entry);
        Ok(())
    }

    /// Selects a coded entry.
    ///
    /// With `check`, the entry is validated first (and, with `defined`, its
    /// membership). Nothing changes on failure.
    pub fn select_value(&mut self, entry: CodedEntry, check: bool, defined: bool) -> CmrResult<()> {
        if check {
            self.check_coded_entry(&entry, defined)?;
        }
        self.selected = Some(self.stamp(entry));
        Ok(())
    }

    /// Validates `entry` against this group.
    pub fn check_coded_entry(&self, entry: &CodedEntry, defined: bool) -> CmrResult<()> {
        if !entry.is_valid() {
            Err(CmrError::InvalidValue)
        } else if defined && !self.has_coded_entry(entry) {
            Err(CmrError::CodedEntryNotInContextGroup)
        } else {
            Ok(())
        }
    }

    /// Validates the selected value.
    pub fn check_selected_value(&self, defined: bool) -> CmrResult<()> {
        match &self.selected {
            Some(entry) => self.check_coded_entry(entry, defined),
            None => Err(CmrError::InvalidValue),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Lookup
    // ═══════════════════════════════════════════════════════════════════════════

    /// Returns the table entry of `key`, optionally stamped.
    pub fn lookup(&self, key: K, enhanced: bool) -> Option<CodedEntry> {
        let entry = self.table.get(key)?.clone();
        Some(if enhanced {
            entry.with_enhanced_encoding(K::enhanced_encoding())
        } else {
            entry
        })
    }

    /// Returns the canonical member equal to `entry`.
    ///
    /// Standard entries come back with the table's code meaning; with
    /// `enhanced` they carry the context group stamp.
    pub fn lookup_coded_entry(&self, entry: &CodedEntry, enhanced: bool) -> CmrResult<CodedEntry> {
        let found = match self.table.canonical(entry) {
            Some(canonical) => canonical.clone(),
            None => self
                .extended
                .iter()
                .find(|e| *e == entry)
                .cloned()
                .ok_or(CmrError::CodedEntryNotInContextGroup)?,
        };
        Ok(if enhanced {
            found.with_enhanced_encoding(K::enhanced_encoding())
        } else {
            found
        })
    }

    /// Writes all members, one per line.
    pub fn print_codes<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(
            out,
            "CID {} (version {}, {}extensible)",
            K::IDENTIFIER,
            K::VERSION,
            if K::EXTENSIBLE { "" } else { "non-" }
        )?;
        for (key, entry) in self.table.iter() {
            writeln!(out, "  {:?}: {}", key, entry)?;
        }
        for entry in &self.extended {
            writeln!(out, "  (extension): {}", entry)?;
        }
        Ok(())
    }

    fn stamp(&self, entry: CodedEntry) -> CodedEntry {
        if self.enhanced_encoding_mode && self.table.contains(&entry) {
            entry.with_enhanced_encoding(K::enhanced_encoding())
        } else {
            entry
        }
    }
}

impl<K: Vocabulary> Default for ContextGroup<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Vocabulary> From<K> for ContextGroup<K> {
    fn from(key: K) -> Self {
        Self::with_key(key, false)
    }
}

impl<K: Vocabulary> fmt::Debug for ContextGroup<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextGroup")
            .field("identifier", &K::IDENTIFIER)
            .field("entries", &self.table.len())
            .field("extended", &self.extended)
            .field("selected", &self.selected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cid::{
        Cid4031CommonAnatomicRegions, Cid7445DeviceParticipatingRoles, CommonAnatomicRegion,
        DeviceParticipatingRole,
    };

    fn local_code() -> CodedEntry {
        CodedEntry::new("99X1", "99LOCAL", "Local concept")
    }

    #[test]
    fn test_standard_entries_are_in_standard() {
        let group = Cid4031CommonAnatomicRegions::new();
        for &key in CommonAnatomicRegion::KEYS {
            let entry = key.standard_entry();
            assert_eq!(group.find_coded_entry(&entry), FindResult::InStandard, "{:?}", key);
        }
        assert_eq!(group.find_coded_entry(&local_code()), FindResult::NotFound);
    }

    #[test]
    fn test_extension_codes() {
        let mut group = Cid4031CommonAnatomicRegions::new();
        assert!(group.is_extensible());
        group.add_coded_entry(local_code()).unwrap();
        group.add_coded_entry(local_code()).unwrap();
        assert_eq!(group.extended_codes().len(), 1);
        assert_eq!(group.find_coded_entry(&local_code()), FindResult::IsExtension);

        // standard entries are not duplicated as extensions
        group
            .add_coded_entry(CommonAnatomicRegion::Chest.standard_entry())
            .unwrap();
        assert_eq!(group.extended_codes().len(), 1);

        group.clear_extended_coded_entries();
        assert!(!group.has_extended_coded_entries());
    }

    #[test]
    fn test_non_extensible_group() {
        let mut group = Cid7445DeviceParticipatingRoles::new();
        assert!(!group.is_extensible());
        let result = group.add_coded_entry(local_code());
        assert!(matches!(result, Err(CmrError::NonExtensibleContextGroup)));
        assert!(!group.has_extended_coded_entries());
    }

    #[test]
    fn test_baseline_and_defined_selection() {
        let mut group = Cid4031CommonAnatomicRegions::new();

        group.select_value(local_code(), true, false).unwrap();
        assert_eq!(group.selected_value(), Some(&local_code()));

        let before = group.selected_value().cloned();
        let other = CodedEntry::new("99X2", "99LOCAL", "Other");
        let result = group.select_value(other.clone(), true, true);
        assert!(matches!(result, Err(CmrError::CodedEntryNotInContextGroup)));
        assert_eq!(group.selected_value().cloned(), before);

        group.add_coded_entry(other.clone()).unwrap();
        group.select_value(other, true, true).unwrap();

        let result = group.select_value(CodedEntry::new("1", "", "x"), true, false);
        assert!(matches!(result, Err(CmrError::InvalidValue)));

        // unchecked selection accepts anything
        group
            .select_value(CodedEntry::new("1", "", "x"), false, true)
            .unwrap();
        assert!(group.check_selected_value(false).is_err());
    }

    #[test]
    fn test_select_key_and_lookup() {
        let mut group = Cid4031CommonAnatomicRegions::new();
        assert!(group.check_selected_value(false).is_err());
        group.select(CommonAnatomicRegion::Knee).unwrap();
        assert_eq!(group.selected_key(), Some(CommonAnatomicRegion::Knee));
        assert!(group.selected_value().and_then(|e| e.enhanced_encoding()).is_none());

        group.set_enhanced_encoding_mode(true);
        group.select(CommonAnatomicRegion::Head).unwrap();
        let stamp = group.selected_value().and_then(|e| e.enhanced_encoding()).cloned();
        assert_eq!(stamp.map(|s| s.context_identifier), Some("4031".to_string()));

        let renamed = CodedEntry::new("T-D3000", "SRT", "Thorax");
        let canonical = group.lookup_coded_entry(&renamed, false).unwrap();
        assert_eq!(canonical.code_meaning(), "Chest");
        assert!(group.lookup_coded_entry(&local_code(), false).is_err());
    }

    #[test]
    fn test_with_key_selects_entry() {
        let group = ContextGroup::with_key(CommonAnatomicRegion::Knee, true);
        assert_eq!(group.selected_key(), Some(CommonAnatomicRegion::Knee));
        assert!(group.enhanced_encoding_mode());
        let stamp = group.selected_value().and_then(|e| e.enhanced_encoding()).cloned();
        assert_eq!(stamp.map(|s| s.context_identifier), Some("4031".to_string()));

        let group: Cid4031CommonAnatomicRegions = CommonAnatomicRegion::Chest.into();
        assert_eq!(
            group.selected_value().map(CodedEntry::code_meaning),
            Some("Chest")
        );
    }

    #[test]
    fn test_injected_table() {
        let table = Arc::new(CodeTable::from_entries([(
            DeviceParticipatingRole::Recording,
            CodedEntry::new("113859", "DCM", "Irradiating Device"),
        )]));
        let mut group = Cid7445DeviceParticipatingRoles::with_table(table);
        assert_eq!(group.table().len(), 1);
        assert!(group.select(DeviceParticipatingRole::Recording).is_ok());
        assert!(matches!(
            group.select(DeviceParticipatingRole::XRayReadingDevice),
            Err(CmrError::CodedEntryNotInContextGroup)
        ));
    }

    #[test]
    fn test_print_codes() {
        let mut group = Cid4031CommonAnatomicRegions::new();
        group.add_coded_entry(local_code()).unwrap();
        let mut out = String::new();
        group.print_codes(&mut out).unwrap();
        assert!(out.starts_with("CID 4031"));
        assert!(out.contains("Abdomen: (T-D4000,SRT,\"Abdomen\")"));
        assert!(out.contains("(extension): (99X1,99LOCAL,\"Local concept\")"));
    }
}
