//! Vocabulary supply: code tables and their process-wide lifecycle.
//!
//! Every concrete context group is an enumeration implementing [`Vocabulary`].
//! Its standard code table is built once per process on first use and shared
//! through an [`Arc`]. A table can be discarded with [`TableCell::cleanup`]
//! (rebuilt lazily on next access) or replaced by a supplied one loaded from
//! a file through [`VocabularyStore`].
//!
//! ```ignore
//! use dcmr_engine::cid::CommonAnatomicRegion;
//! use dcmr_engine::{Vocabulary, VocabularyStore};
//!
//! let mut store = VocabularyStore::new();
//! store.load_file::<CommonAnatomicRegion, _>("cid4031.tsv")?;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;
use std::io::Read;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use dcmr_types::{CodedEntry, EnhancedEncoding, DCMR};
use tracing::{debug, info};

use crate::parser::{VocabularyParser, VocabularyRecord};
use crate::types::{CmrError, CmrResult, LoadStats, VocabularyConfig};

/// An enumerated vocabulary: the key type of a concrete context group.
pub trait Vocabulary: Copy + Ord + Hash + Debug + Send + Sync + 'static {
    /// Context group identifier, e.g. "4031".
    const IDENTIFIER: &'static str;
    /// Context group version (YYYYMMDD).
    const VERSION: &'static str;
    /// Context group UID.
    const UID: &'static str;
    /// Whether extension codes may be added.
    const EXTENSIBLE: bool;
    /// All keys in table order.
    const KEYS: &'static [Self];

    /// Name of the key, used in supplied tables.
    fn name(self) -> &'static str;

    /// Looks up a key by name.
    fn from_name(name: &str) -> Option<Self>;

    /// The coded entry built into the crate for this key.
    fn standard_entry(self) -> CodedEntry;

    /// The process-wide table cell of this vocabulary.
    fn shared_table() -> &'static TableCell<Self>;

    /// Returns the process-wide table, building it on first use.
    fn table() -> Arc<CodeTable<Self>> {
        Self::shared_table().get()
    }

    /// Enhanced encoding stamp identifying this context group.
    fn enhanced_encoding() -> EnhancedEncoding {
        EnhancedEncoding {
            context_identifier: Self::IDENTIFIER.to_string(),
            mapping_resource: DCMR.to_string(),
            context_group_version: Self::VERSION.to_string(),
            context_uid: Self::UID.to_string(),
        }
    }
}

/// Immutable ordered table of coded entries for one vocabulary.
#[derive(Debug, Clone)]
pub struct CodeTable<K> {
    entries: BTreeMap<K, CodedEntry>,
    index: HashMap<CodedEntry, K>,
}

impl<K: Vocabulary> CodeTable<K> {
    /// Builds the table from the entries built into the crate.
    pub fn standard() -> Self {
        Self::from_entries(K::KEYS.iter().map(|&key| (key, key.standard_entry())))
    }

    /// Builds a table from key/entry pairs.
    ///
    /// A later pair for the same key replaces the earlier one. If two keys
    /// carry the same coded entry, lookups by entry return the first key in
    /// table order.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, CodedEntry)>,
    {
        let entries: BTreeMap<K, CodedEntry> = entries.into_iter().collect();
        let mut index = HashMap::with_capacity(entries.len());
        for (key, entry) in &entries {
            index.entry(entry.clone()).or_insert(*key);
        }
        Self { entries, index }
    }

    /// Builds a table from parsed vocabulary rows.
    ///
    /// Returns the table and the number of skipped rows.
    pub fn from_records<I>(records: I, config: &VocabularyConfig) -> CmrResult<(Self, usize)>
    where
        I: IntoIterator<Item = VocabularyRecord>,
    {
        let mut pairs = Vec::new();
        let mut skipped = 0;
        for record in records {
            match K::from_name(&record.key) {
                Some(key) => pairs.push((key, record.entry)),
                None if config.skip_unknown_keys => {
                    debug!(
                        context_group = K::IDENTIFIER,
                        key = %record.key,
                        "Skipping unknown key"
                    );
                    skipped += 1;
                }
                None => {
                    return Err(CmrError::UnknownKey {
                        context_group: K::IDENTIFIER,
                        key: record.key,
                    })
                }
            }
        }
        Ok((Self::from_entries(pairs), skipped))
    }

    /// Returns the coded entry for a key.
    pub fn get(&self, key: K) -> Option<&CodedEntry> {
        self.entries.get(&key)
    }

    /// Returns the key of a coded entry (scheme and value compared).
    pub fn find(&self, entry: &CodedEntry) -> Option<K> {
        self.index.get(entry).copied()
    }

    /// Returns the canonical table entry equal to `entry`.
    pub fn canonical(&self, entry: &CodedEntry) -> Option<&CodedEntry> {
        self.find(entry).and_then(|key| self.entries.get(&key))
    }

    /// Returns true if the table holds `entry`.
    pub fn contains(&self, entry: &CodedEntry) -> bool {
        self.index.contains_key(entry)
    }

    /// Iterates over key/entry pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &CodedEntry)> {
        self.entries.iter().map(|(key, entry)| (*key, entry))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide storage of one vocabulary's table.
///
/// The table is built lazily on first access. [`initialize`](Self::initialize)
/// builds it eagerly, [`cleanup`](Self::cleanup) discards it and
/// [`install`](Self::install) replaces it with a supplied table.
#[derive(Debug)]
pub struct TableCell<K> {
    table: RwLock<Option<Arc<CodeTable<K>>>>,
}

impl<K> TableCell<K> {
    /// Creates an empty cell.
    pub const fn new() -> Self {
        Self {
            table: RwLock::new(None),
        }
    }
}

impl<K> Default for TableCell<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Vocabulary> TableCell<K> {
    /// Returns the table, building the standard one if needed.
    pub fn get(&self) -> Arc<CodeTable<K>> {
        if let Some(table) = self
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(table);
        }
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(guard.get_or_insert_with(|| Arc::new(CodeTable::standard())))
    }

    /// Builds the table now (if not yet built).
    pub fn initialize(&self) {
        let _ = self.get();
    }

    /// Discards the table; the standard one is rebuilt on next access.
    ///
    /// Context groups holding the old table keep it until they are dropped.
    pub fn cleanup(&self) {
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Replaces the table with a supplied one.
    pub fn install(&self, table: CodeTable<K>) {
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(table));
    }

    /// Returns true if a table is present.
    pub fn is_initialized(&self) -> bool {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Loads one vocabulary file into the matching table cell.
trait TableLoader: Send + Sync {
    fn identifier(&self) -> &'static str;

    fn load(&self, path: &Path, config: &VocabularyConfig) -> CmrResult<LoadStats>;
}

struct Loader<K>(PhantomData<K>);

impl<K: Vocabulary> TableLoader for Loader<K> {
    fn identifier(&self) -> &'static str {
        K::IDENTIFIER
    }

    fn load(&self, path: &Path, config: &VocabularyConfig) -> CmrResult<LoadStats> {
        let parser = VocabularyParser::from_path(path, config)?;
        install_records::<K, _>(parser, config)
    }
}

fn install_records<K, I>(records: I, config: &VocabularyConfig) -> CmrResult<LoadStats>
where
    K: Vocabulary,
    I: IntoIterator<Item = CmrResult<VocabularyRecord>>,
{
    let start = Instant::now();
    let records = records.into_iter().collect::<CmrResult<Vec<_>>>()?;
    let (table, skipped) = CodeTable::<K>::from_records(records, config)?;
    let mut stats = LoadStats {
        files: 1,
        entries: 0,
        skipped,
        load_time_ms: 0,
    };

    let cell = K::shared_table();
    if !config.replace_existing && cell.is_initialized() {
        debug!(
            context_group = K::IDENTIFIER,
            "Keeping existing table (replace_existing is off)"
        );
        stats.skipped += table.len();
    } else {
        stats.entries = table.len();
        cell.install(table);
    }

    stats.load_time_ms = start.elapsed().as_millis() as u64;
    Ok(stats)
}

/// Loads supplied vocabulary tables and installs them process-wide.
///
/// # Example
///
/// ```ignore
/// use dcmr_engine::cid::{AcquisitionModality, CommonAnatomicRegion};
/// use dcmr_engine::VocabularyStore;
///
/// let mut store = VocabularyStore::new();
/// store
///     .register::<CommonAnatomicRegion, _>("tables/cid4031.tsv")
///     .register::<AcquisitionModality, _>("tables/cid29.tsv");
/// let stats = store.load_files()?;
/// println!("{} entries from {} files", stats.entries, stats.files);
/// ```
pub struct VocabularyStore {
    config: VocabularyConfig,
    pending: Vec<(PathBuf, Box<dyn TableLoader>)>,
    loaded: Vec<&'static str>,
    stats: LoadStats,
}

impl Default for VocabularyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VocabularyStore {
    /// Creates a store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(VocabularyConfig::default())
    }

    /// Creates a store with the given configuration.
    pub fn with_config(config: VocabularyConfig) -> Self {
        Self {
            config,
            pending: Vec::new(),
            loaded: Vec::new(),
            stats: LoadStats::default(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &VocabularyConfig {
        &self.config
    }

    /// Loads a single table file for vocabulary `K` and installs it.
    ///
    /// Returns the number of installed entries.
    pub fn load_file<K: Vocabulary, P: AsRef<Path>>(&mut self, path: P) -> CmrResult<usize> {
        let stats = Loader::<K>(PhantomData).load(path.as_ref(), &self.config)?;
        Ok(self.record(K::IDENTIFIER, stats))
    }

    /// Loads a table for vocabulary `K` from a reader and installs it.
    pub fn load_reader<K: Vocabulary, R: Read>(&mut self, reader: R) -> CmrResult<usize> {
        let parser = VocabularyParser::from_reader(reader, &self.config)?;
        let stats = install_records::<K, _>(parser, &self.config)?;
        Ok(self.record(K::IDENTIFIER, stats))
    }

    /// Queues a table file for vocabulary `K`.
    pub fn register<K: Vocabulary, P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.pending
            .push((path.as_ref().to_path_buf(), Box::new(Loader::<K>(PhantomData))));
        self
    }

    /// Returns the number of queued files.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Loads all queued files one after the other.
    pub fn load_files(&mut self) -> CmrResult<LoadStats> {
        let start = Instant::now();
        let pending = std::mem::take(&mut self.pending);
        let mut run = LoadStats::default();
        for (path, loader) in &pending {
            let stats = loader.load(path, &self.config)?;
            run.merge(&stats);
            self.record(loader.identifier(), stats);
        }
        run.load_time_ms = start.elapsed().as_millis() as u64;
        info!(
            files = run.files,
            entries = run.entries,
            skipped = run.skipped,
            "Loaded vocabulary tables in {}ms",
            run.load_time_ms
        );
        Ok(run)
    }

    /// Loads all queued files in parallel.
    ///
    /// Each file installs into its own table cell, so files for different
    /// vocabularies never contend. If any file fails, the first error (in
    /// queue order) is returned; tables of the files that succeeded stay
    /// installed.
    #[cfg(feature = "parallel")]
    pub fn load_files_parallel(&mut self) -> CmrResult<LoadStats> {
        let start = Instant::now();
        let pending = std::mem::take(&mut self.pending);
        let config = &self.config;

        let results: Vec<CmrResult<LoadStats>> = pending
            .par_iter()
            .map(|(path, loader)| loader.load(path, config))
            .collect();

        let mut run = LoadStats::default();
        let mut first_error = None;
        for ((_, loader), result) in pending.iter().zip(results) {
            match result {
                Ok(stats) => {
                    run.merge(&stats);
                    self.record(loader.identifier(), stats);
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        run.load_time_ms = start.elapsed().as_millis() as u64;
        info!(
            files = run.files,
            entries = run.entries,
            skipped = run.skipped,
            "Loaded vocabulary tables in parallel in {}ms",
            run.load_time_ms
        );
        Ok(run)
    }

    /// Identifiers of the context groups loaded so far (in load order).
    pub fn loaded_groups(&self) -> &[&'static str] {
        &self.loaded
    }

    /// Accumulated statistics.
    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    fn record(&mut self, identifier: &'static str, stats: LoadStats) -> usize {
        self.loaded.push(identifier);
        self.stats.merge(&stats);
        stats.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Dedicated vocabularies so that installing tables does not affect other tests.
    crate::cid::context_group! {
        /// Test vocabulary.
        pub type TestGroup = ContextGroup<TestKey> {
            identifier: "99001",
            version: "20240101",
            uid: "1.2.3.99001",
            extensible: true,
            codes: {
                First => ("T1", "99TEST", "First"),
                Second => ("T2", "99TEST", "Second"),
                Third => ("T3", "99TEST", "Third"),
            }
        }
    }

    crate::cid::context_group! {
        /// Test vocabulary for the parallel loader.
        pub type OtherGroup = ContextGroup<OtherKey> {
            identifier: "99002",
            version: "20240101",
            uid: "1.2.3.99002",
            extensible: false,
            codes: {
                Only => ("O1", "99TEST", "Only"),
            }
        }
    }

    const HEADER: &str = "key\tcodingSchemeDesignator\tcodeValue\tcodeMeaning\n";

    #[test]
    fn test_standard_table() {
        let table = CodeTable::<TestKey>::standard();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(TestKey::Second).map(|e| e.code_value()), Some("T2"));
        assert_eq!(
            table.find(&CodedEntry::new("T3", "99TEST", "renamed")),
            Some(TestKey::Third)
        );
        assert!(!table.contains(&CodedEntry::new("T3", "OTHER", "Third")));
        let keys: Vec<_> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![TestKey::First, TestKey::Second, TestKey::Third]);
    }

    #[test]
    fn test_duplicate_entry_first_key_wins() {
        let table = CodeTable::from_entries([
            (TestKey::Second, CodedEntry::new("X", "99TEST", "dup")),
            (TestKey::First, CodedEntry::new("X", "99TEST", "dup")),
        ]);
        assert_eq!(table.find(&CodedEntry::new("X", "99TEST", "")), Some(TestKey::First));
    }

    #[test]
    fn test_table_lifecycle() {
        let cell = TableCell::<TestKey>::new();
        assert!(!cell.is_initialized());
        cell.initialize();
        assert!(cell.is_initialized());
        let held = cell.get();
        cell.cleanup();
        assert!(!cell.is_initialized());
        // groups holding the old table are unaffected
        assert_eq!(held.len(), 3);
        assert_eq!(cell.get().len(), 3);

        cell.install(CodeTable::from_entries([(
            TestKey::First,
            CodedEntry::new("N1", "99TEST", "New"),
        )]));
        assert_eq!(cell.get().len(), 1);
    }

    #[test]
    fn test_from_records_unknown_key() {
        let records = vec![VocabularyRecord {
            key: "Fourth".to_string(),
            entry: CodedEntry::new("T4", "99TEST", "Fourth"),
        }];
        let strict = CodeTable::<TestKey>::from_records(records.clone(), &VocabularyConfig::default());
        assert!(matches!(strict, Err(CmrError::UnknownKey { context_group: "99001", .. })));

        let config = VocabularyConfig {
            skip_unknown_keys: true,
            ..Default::default()
        };
        let (table, skipped) = CodeTable::<TestKey>::from_records(records, &config).unwrap();
        assert!(table.is_empty());
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_store_load_reader_installs_table() {
        let data = format!("{HEADER}First\t99TEST\tS1\tSupplied first\nThird\t99TEST\tS3\tSupplied third\n");
        let mut store = VocabularyStore::new();
        let installed = store.load_reader::<TestKey, _>(data.as_bytes()).unwrap();
        assert_eq!(installed, 2);
        assert_eq!(store.loaded_groups(), &["99001"]);
        assert_eq!(store.stats().entries, 2);

        let table = TestKey::table();
        assert_eq!(table.get(TestKey::First).map(|e| e.code_value()), Some("S1"));
        assert!(table.get(TestKey::Second).is_none());

        TestKey::shared_table().cleanup();
        assert_eq!(TestKey::table().len(), 3);
    }

    #[test]
    fn test_store_missing_file() {
        let mut store = VocabularyStore::new();
        store.register::<OtherKey, _>("/nonexistent/cid99002.tsv");
        assert_eq!(store.pending(), 1);
        assert!(matches!(store.load_files(), Err(CmrError::FileNotFound { .. })));
        assert_eq!(store.pending(), 0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_store_parallel_missing_file() {
        let mut store = VocabularyStore::new();
        store
            .register::<OtherKey, _>("/nonexistent/a.tsv")
            .register::<OtherKey, _>("/nonexistent/b.tsv");
        let result = store.load_files_parallel();
        assert!(matches!(result, Err(CmrError::FileNotFound { path }) if path.ends_with("a.tsv")));
    }

    #[test]
    fn test_enhanced_encoding() {
        let stamp = TestKey::enhanced_encoding();
        assert_eq!(stamp.context_identifier, "99001");
        assert_eq!(stamp.mapping_resource, "DCMR");
        assert_eq!(stamp.context_group_version, "20240101");
        assert_eq!(stamp.context_uid, "1.2.3.99001");
    }
}
