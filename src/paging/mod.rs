//! Cursor-based deep paging over index queries.
//!
//! [`DeepPagingIterator`] streams every record matching a set of filters one
//! page at a time. Each page is requested past the cursor mark of the previous
//! one, so fetching page *k* costs the same as fetching page 1. The iterator is a
//! small state machine driven from [`Iterator::next`]:
//!
//! ```text
//! ExecuteQuery ──non-empty page──▶ IterateOverPage ──exhausted──▶ CheckForConsumptionCompleteness
//!      ▲                                                                   │
//!      └──────────────── full page and cursor advanced ◀──────────────────┘
//! ```
//!
//! Any other outcome ends the iteration.

use std::fmt;

use oxrdf::Triple;

use crate::codec::{decode_triple, StoredTriple};
use crate::engine::config::SortOrder;
use crate::error::{IndexQueryError, QueryError};
use crate::injector::Predicate;
use crate::model::RecordId;

/// Resume point of a paged search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMark {
    #[default]
    Start,
    After(RecordId),
}

impl CursorMark {
    /// Whether `record` comes after this mark in `order`.
    pub fn precedes(&self, record: RecordId, order: SortOrder) -> bool {
        match (self, order) {
            (CursorMark::Start, _) => true,
            (CursorMark::After(mark), SortOrder::Ascending) => record > *mark,
            (CursorMark::After(mark), SortOrder::Descending) => record < *mark,
        }
    }
}

impl fmt::Display for CursorMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorMark::Start => f.write_str("*"),
            CursorMark::After(record) => write!(f, "{record}"),
        }
    }
}

/// One paged search.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub filters: &'a [Predicate],
    pub sort: SortOrder,
    pub page_length: usize,
    pub cursor: CursorMark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<RecordId>,
    /// Mark after the last record of this page, or the sent mark for an empty page
    pub next_cursor: CursorMark,
    pub total_matches: u64,
}

impl Page {
    pub fn new(records: Vec<RecordId>, sent: CursorMark, total_matches: u64) -> Self {
        let next_cursor = records.last().map_or(sent, |last| CursorMark::After(*last));
        Self {
            records,
            next_cursor,
            total_matches,
        }
    }
}

/// Index query and record storage primitives the paging and join code run on.
pub trait RecordSource {
    fn resolve(&self, request: &PageRequest<'_>) -> Result<Page, IndexQueryError>;

    fn count(&self, filters: &[Predicate]) -> Result<u64, IndexQueryError>;

    /// Stored subject, predicate and object of a record.
    fn read_fields(&self, record: RecordId) -> Result<StoredTriple, IndexQueryError>;
}

impl<S: RecordSource + ?Sized> RecordSource for &S {
    fn resolve(&self, request: &PageRequest<'_>) -> Result<Page, IndexQueryError> {
        (**self).resolve(request)
    }

    fn count(&self, filters: &[Predicate]) -> Result<u64, IndexQueryError> {
        (**self).count(filters)
    }

    fn read_fields(&self, record: RecordId) -> Result<StoredTriple, IndexQueryError> {
        (**self).read_fields(record)
    }
}

/// A record yielded by the cursor; `triple` is `None` when materialization is off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedRecord {
    pub id: RecordId,
    pub triple: Option<Triple>,
}

enum State {
    ExecuteQuery,
    IterateOverPage {
        records: std::vec::IntoIter<RecordId>,
        fetched: usize,
        sent: CursorMark,
        next: CursorMark,
    },
    CheckForConsumptionCompleteness {
        fetched: usize,
        sent: CursorMark,
        next: CursorMark,
    },
    Done,
}

/// Forward-only stream of the records matching `filters`.
pub struct DeepPagingIterator<S> {
    source: S,
    filters: Vec<Predicate>,
    sort: SortOrder,
    page_length: usize,
    materialize: bool,
    cursor: CursorMark,
    total_matches: Option<u64>,
    pages_fetched: usize,
    state: State,
}

impl<S: RecordSource> DeepPagingIterator<S> {
    pub fn new(source: S, filters: Vec<Predicate>, page_length: usize) -> Self {
        Self {
            source,
            filters,
            sort: SortOrder::default(),
            page_length,
            materialize: true,
            cursor: CursorMark::Start,
            total_matches: None,
            pages_fetched: 0,
            state: State::ExecuteQuery,
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// With materialization off, records are yielded as ids only and stored
    /// fields are never read.
    pub fn with_materialization(mut self, materialize: bool) -> Self {
        self.materialize = materialize;
        self
    }

    /// Matches reported by the first search, once it has run.
    pub fn total_matches(&self) -> Option<u64> {
        self.total_matches
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    /// Decoded triples only. Requires materialization.
    pub fn triples(self) -> impl Iterator<Item = Result<Triple, QueryError>> {
        self.with_materialization(true)
            .filter_map(|record| record.map(|record| record.triple).transpose())
    }

    /// Record ids only. Turns materialization off.
    pub fn record_ids(self) -> impl Iterator<Item = Result<RecordId, QueryError>> {
        self.with_materialization(false)
            .map(|record| record.map(|record| record.id))
    }

    fn execute_query(&mut self) -> Result<State, QueryError> {
        let sent = self.cursor;
        let page = self.source.resolve(&PageRequest {
            filters: &self.filters,
            sort: self.sort,
            page_length: self.page_length,
            cursor: sent,
        })?;
        self.pages_fetched += 1;
        self.total_matches.get_or_insert(page.total_matches);
        log::trace!(
            "Fetched page {} after cursor {}: {} of {} records",
            self.pages_fetched,
            sent,
            page.records.len(),
            page.total_matches
        );

        if page.records.is_empty() {
            return Ok(State::Done);
        }
        Ok(State::IterateOverPage {
            fetched: page.records.len(),
            records: page.records.into_iter(),
            sent,
            next: page.next_cursor,
        })
    }

    fn materialize(&self, id: RecordId) -> Result<PagedRecord, QueryError> {
        if !self.materialize {
            return Ok(PagedRecord { id, triple: None });
        }
        let stored = self.source.read_fields(id)?;
        let triple = decode_triple(&stored)?;
        Ok(PagedRecord {
            id,
            triple: Some(triple),
        })
    }
}

impl<S: RecordSource> Iterator for DeepPagingIterator<S> {
    type Item = Result<PagedRecord, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::ExecuteQuery => match self.execute_query() {
                    Ok(next_state) => self.state = next_state,
                    Err(error) => return Some(Err(error)),
                },
                State::IterateOverPage {
                    mut records,
                    fetched,
                    sent,
                    next,
                } => match records.next() {
                    Some(id) => {
                        let record = self.materialize(id);
                        if record.is_ok() {
                            self.state = State::IterateOverPage {
                                records,
                                fetched,
                                sent,
                                next,
                            };
                        }
                        return Some(record);
                    }
                    None => {
                        self.state = State::CheckForConsumptionCompleteness {
                            fetched,
                            sent,
                            next,
                        }
                    }
                },
                State::CheckForConsumptionCompleteness {
                    fetched,
                    sent,
                    next,
                } => {
                    if fetched == self.page_length && next != sent {
                        self.cursor = next;
                        self.state = State::ExecuteQuery;
                    }
                }
                State::Done => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests;
