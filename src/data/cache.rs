use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::clean::{clean, CleanOptions};
use super::error::DataSourceError;
use super::loader::read_raw;
use super::model::Table;

// ---------------------------------------------------------------------------
// Cache seam
// ---------------------------------------------------------------------------

/// Storage for cleaned tables, keyed by source identity.
pub trait TableCache {
    fn get(&self, key: &Path) -> Option<Arc<Table>>;
    fn insert(&mut self, key: PathBuf, table: Arc<Table>);
    fn remove(&mut self, key: &Path) -> Option<Arc<Table>>;
    fn clear(&mut self);
}

/// Process-local cache; lives as long as its [`Loader`].
#[derive(Debug, Default)]
pub struct MemoryCache {
    tables: HashMap<PathBuf, Arc<Table>>,
}

impl MemoryCache {
    pub fn len(&self) -> usize {
        self.tables.len()
    }
}

impl TableCache for MemoryCache {
    fn get(&self, key: &Path) -> Option<Arc<Table>> {
        self.tables.get(key).cloned()
    }

    fn insert(&mut self, key: PathBuf, table: Arc<Table>) {
        self.tables.insert(key, table);
    }

    fn remove(&mut self, key: &Path) -> Option<Arc<Table>> {
        self.tables.remove(key)
    }

    fn clear(&mut self) {
        self.tables.clear();
    }
}

// ---------------------------------------------------------------------------
// Loader – memoized read + clean
// ---------------------------------------------------------------------------

/// Reads and cleans a source at most once per cache entry.
pub struct Loader<C: TableCache = MemoryCache> {
    cache: C,
    options: CleanOptions,
}

impl Loader<MemoryCache> {
    pub fn new(options: CleanOptions) -> Self {
        Self::with_cache(MemoryCache::default(), options)
    }
}

impl<C: TableCache> Loader<C> {
    pub fn with_cache(cache: C, options: CleanOptions) -> Self {
        Self { cache, options }
    }

    /// Return the cleaned table for `source`, reading it on first use.
    /// Failures are not cached.
    pub fn load(&mut self, source: &Path) -> Result<Arc<Table>, DataSourceError> {
        let key = source_key(source);
        if let Some(table) = self.cache.get(&key) {
            log::debug!("Cache hit for {}", key.display());
            return Ok(table);
        }

        let raw = read_raw(source)?;
        let table = Arc::new(clean(raw, &self.options)?);
        log::info!(
            "Loaded {} records with columns {:?} from {}",
            table.len(),
            table.columns,
            source.display()
        );
        self.cache.insert(key, Arc::clone(&table));
        Ok(table)
    }

    /// Drop the cached table for `source` so the next load re-reads it.
    pub fn invalidate(&mut self, source: &Path) -> bool {
        self.cache.remove(&source_key(source)).is_some()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

/// Canonical path when the file exists, the given path otherwise.
fn source_key(source: &Path) -> PathBuf {
    source
        .canonicalize()
        .unwrap_or_else(|_| source.to_path_buf())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
