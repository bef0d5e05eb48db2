//! Searcher snapshot implementing the index query and record read primitives

use std::collections::BTreeSet;
use std::sync::Arc;

use tantivy::collector::Count;
use tantivy::schema::{Field, TantivyDocument, Value};
use tantivy::Searcher;

use crate::codec::StoredTriple;
use crate::engine::constants::*;
use crate::engine::schema::IndexFields;
use crate::engine::stats::IndexStats;
use crate::error::IndexQueryError;
use crate::injector::Predicate;
use crate::model::RecordId;
use crate::paging::{Page, PageRequest, RecordSource};
use crate::tantivy_integration::collector::CursorPageCollector;
use crate::tantivy_integration::filters::compile_filters;

/// A fixed point-in-time view of the index.
///
/// Record ids handed out by a snapshot stay valid for that snapshot, so one
/// query evaluation must use one snapshot throughout.
#[derive(Clone)]
pub struct IndexSnapshot {
    searcher: Searcher,
    fields: IndexFields,
    stats: Arc<IndexStats>,
}

impl IndexSnapshot {
    pub fn new(searcher: Searcher, fields: IndexFields, stats: Arc<IndexStats>) -> Self {
        Self {
            searcher,
            fields,
            stats,
        }
    }

    pub fn num_records(&self) -> u64 {
        self.searcher.num_docs()
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Every value indexed in the graph field, including values whose records
    /// are deleted but not yet merged away.
    pub fn graph_terms(&self) -> Result<BTreeSet<String>, IndexQueryError> {
        let mut terms = BTreeSet::new();
        for segment_reader in self.searcher.segment_readers() {
            let inverted_index = segment_reader.inverted_index(self.fields.graph)?;
            let mut stream = inverted_index
                .terms()
                .stream()
                .map_err(tantivy::TantivyError::from)?;
            while stream.advance() {
                match std::str::from_utf8(stream.key()) {
                    Ok(term) => {
                        terms.insert(term.to_string());
                    }
                    Err(e) => log::warn!("Skipping non UTF-8 graph term: {}", e),
                }
            }
        }
        Ok(terms)
    }

    fn stored_text(
        &self,
        doc: &TantivyDocument,
        field: Field,
        record: RecordId,
        name: &'static str,
    ) -> Result<String, IndexQueryError> {
        doc.get_first(field)
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .ok_or(IndexQueryError::MissingStoredField {
                record,
                field: name,
            })
    }
}

impl RecordSource for IndexSnapshot {
    fn resolve(&self, request: &PageRequest<'_>) -> Result<Page, IndexQueryError> {
        self.stats.record_search();
        let query = compile_filters(&self.fields, request.filters);
        let collector =
            CursorPageCollector::new(request.page_length, request.cursor, request.sort);
        let fruit = self.searcher.search(query.as_ref(), &collector)?;
        log::trace!(
            "Resolved {} filters: {} matches, {} in page",
            request.filters.len(),
            fruit.total_matches,
            fruit.records.len()
        );
        Ok(Page::new(fruit.records, request.cursor, fruit.total_matches))
    }

    fn count(&self, filters: &[Predicate]) -> Result<u64, IndexQueryError> {
        self.stats.record_count();
        let query = compile_filters(&self.fields, filters);
        Ok(self.searcher.search(query.as_ref(), &Count)? as u64)
    }

    fn read_fields(&self, record: RecordId) -> Result<StoredTriple, IndexQueryError> {
        self.stats.record_read();
        let doc: TantivyDocument = self.searcher.doc(record.into())?;
        Ok(StoredTriple {
            subject: self.stored_text(&doc, self.fields.subject, record, FIELD_SUBJECT)?,
            predicate: self.stored_text(&doc, self.fields.predicate, record, FIELD_PREDICATE)?,
            object: self.stored_text(&doc, self.fields.object, record, FIELD_OBJECT)?,
        })
    }
}
