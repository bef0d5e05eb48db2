//! Core TripleStore struct and constructors

use std::path::Path;
use std::sync::Arc;

use tantivy::{
    directory::MmapDirectory, schema::Schema, Index, IndexReader, IndexWriter, ReloadPolicy,
};

use crate::engine::config::EngineConfig;
use crate::engine::schema::{build_triple_schema, IndexFields};
use crate::engine::search::IndexSnapshot;
use crate::engine::stats::{IndexStats, IndexStatsSnapshot};
use crate::error::StoreError;
use crate::injector::FieldInjectorRegistry;

/// RDF quad store backed by a Tantivy index
pub struct TripleStore {
    pub(crate) index: Index,
    pub(crate) reader: IndexReader,
    pub(crate) writer: Option<IndexWriter>,
    pub(crate) fields: IndexFields,
    pub(crate) registry: Arc<FieldInjectorRegistry>,
    pub(crate) config: EngineConfig,
    pub(crate) stats: Arc<IndexStats>,
}

impl TripleStore {
    /// Open (or create) a store in `index_dir`
    pub fn open(index_dir: &Path, config: EngineConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(index_dir)?;
        let dir = MmapDirectory::open(index_dir)?;
        let index = Index::open_or_create(dir, build_triple_schema())?;
        log::info!("Opened triple index at {}", index_dir.display());
        Self::from_index(index, config)
    }

    /// Store held entirely in memory
    pub fn in_memory(config: EngineConfig) -> Result<Self, StoreError> {
        Self::from_index(Index::create_in_ram(build_triple_schema()), config)
    }

    fn from_index(index: Index, config: EngineConfig) -> Result<Self, StoreError> {
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        let writer = Self::try_create_writer(&index, &config)?;
        let fields = IndexFields::resolve(&index.schema())?;

        Ok(Self {
            index,
            reader,
            writer,
            fields,
            registry: Arc::new(FieldInjectorRegistry::new()),
            config,
            stats: Arc::new(IndexStats::default()),
        })
    }

    fn try_create_writer(
        index: &Index,
        config: &EngineConfig,
    ) -> Result<Option<IndexWriter>, StoreError> {
        let threads = config.writer.threads.max(1);
        match index.writer_with_num_threads(threads, config.writer.memory_budget) {
            Ok(w) => Ok(Some(w)),
            Err(tantivy::TantivyError::LockFailure(e, _)) => {
                log::warn!("Could not acquire index lock, running in READ-ONLY mode: {}", e);
                Ok(None)
            }
            Err(e) => Err(StoreError::from(e)),
        }
    }

    /// Snapshot of the last committed state
    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot::new(self.reader.searcher(), self.fields, Arc::clone(&self.stats))
    }

    pub fn num_records(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    pub fn is_read_only(&self) -> bool {
        self.writer.is_none()
    }

    pub fn schema(&self) -> Schema {
        self.index.schema()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<FieldInjectorRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> IndexStatsSnapshot {
        self.stats.get()
    }

    pub fn reset_stats(&self) {
        self.stats.reset()
    }
}
