use std::cell::Cell;
use std::collections::HashSet;

use super::*;
use crate::error::MalformedTermError;

/// In-memory source: record `i` lives at segment 0, doc `i`.
struct VecSource {
    stored: Vec<StoredTriple>,
    searches: Cell<usize>,
    reads: Cell<usize>,
}

impl VecSource {
    fn with_records(count: usize) -> Self {
        let stored = (0..count)
            .map(|i| StoredTriple {
                subject: format!("<http://x/s{i}>"),
                predicate: "<http://x/p>".to_string(),
                object: format!("\"{i}\""),
            })
            .collect();
        Self {
            stored,
            searches: Cell::new(0),
            reads: Cell::new(0),
        }
    }
}

impl RecordSource for VecSource {
    fn resolve(&self, request: &PageRequest<'_>) -> Result<Page, IndexQueryError> {
        self.searches.set(self.searches.get() + 1);
        let mut all: Vec<RecordId> = (0..self.stored.len() as u32)
            .map(|doc| RecordId::new(0, doc))
            .collect();
        if request.sort == SortOrder::Descending {
            all.reverse();
        }
        let records: Vec<RecordId> = all
            .into_iter()
            .filter(|record| request.cursor.precedes(*record, request.sort))
            .take(request.page_length)
            .collect();
        Ok(Page::new(records, request.cursor, self.stored.len() as u64))
    }

    fn count(&self, _filters: &[Predicate]) -> Result<u64, IndexQueryError> {
        Ok(self.stored.len() as u64)
    }

    fn read_fields(&self, record: RecordId) -> Result<StoredTriple, IndexQueryError> {
        self.reads.set(self.reads.get() + 1);
        self.stored
            .get(record.doc as usize)
            .cloned()
            .ok_or(IndexQueryError::MissingStoredField {
                record,
                field: "s",
            })
    }
}

fn drain(source: &VecSource, page_length: usize, sort: SortOrder) -> (Vec<RecordId>, usize) {
    let mut iterator = DeepPagingIterator::new(source, Vec::new(), page_length).with_sort(sort);
    let ids: Vec<RecordId> = iterator
        .by_ref()
        .map(|record| record.unwrap().id)
        .collect();
    (ids, iterator.pages_fetched())
}

#[test]
fn test_cursor_completeness_and_no_duplication() {
    for (total, page_length) in [(10, 3), (7, 100), (11, 2), (25, 4), (1, 2)] {
        let source = VecSource::with_records(total);
        let (ids, pages) = drain(&source, page_length, SortOrder::Ascending);

        assert_eq!(ids.len(), total, "M={total} L={page_length}");
        let distinct: HashSet<_> = ids.iter().collect();
        assert_eq!(distinct.len(), total);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        // a partial last page ends iteration without another search
        assert_eq!(pages, total.div_ceil(page_length));
        assert_eq!(source.searches.get(), pages);
    }
}

#[test]
fn test_exact_multiple_needs_one_confirming_fetch() {
    let source = VecSource::with_records(9);
    let (ids, pages) = drain(&source, 3, SortOrder::Ascending);
    assert_eq!(ids.len(), 9);
    // three full pages, then an empty page proves the end
    assert_eq!(pages, 4);
}

#[test]
fn test_descending_order() {
    let source = VecSource::with_records(5);
    let (ids, _) = drain(&source, 2, SortOrder::Descending);
    let docs: Vec<u32> = ids.iter().map(|id| id.doc).collect();
    assert_eq!(docs, vec![4, 3, 2, 1, 0]);
}

#[test]
fn test_empty_result_is_one_search() {
    let source = VecSource::with_records(0);
    let mut iterator = DeepPagingIterator::new(&source, Vec::new(), 10);
    assert!(iterator.next().is_none());
    assert!(iterator.next().is_none());
    assert_eq!(source.searches.get(), 1);
    assert_eq!(iterator.total_matches(), Some(0));
}

#[test]
fn test_zero_length_page_still_searches_once() {
    let source = VecSource::with_records(42);
    let mut iterator = DeepPagingIterator::new(&source, Vec::new(), 0);
    assert_eq!(iterator.total_matches(), None);
    assert!(iterator.next().is_none());
    assert_eq!(source.searches.get(), 1);
    // the search side effect is visible even though nothing was consumed
    assert_eq!(iterator.total_matches(), Some(42));
}

#[test]
fn test_materialization_flag() {
    let source = VecSource::with_records(3);
    let records: Vec<PagedRecord> = DeepPagingIterator::new(&source, Vec::new(), 2)
        .with_materialization(false)
        .map(Result::unwrap)
        .collect();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|record| record.triple.is_none()));
    assert_eq!(source.reads.get(), 0);

    let triples: Vec<Triple> = DeepPagingIterator::new(&source, Vec::new(), 2)
        .triples()
        .map(Result::unwrap)
        .collect();
    assert_eq!(triples.len(), 3);
    assert_eq!(triples[2].subject.to_string(), "<http://x/s2>");
    assert_eq!(source.reads.get(), 3);
}

#[test]
fn test_malformed_record_aborts_iteration() {
    let mut source = VecSource::with_records(5);
    source.stored[1].object = "\"broken\\".to_string();

    let mut iterator = DeepPagingIterator::new(&source, Vec::new(), 10);
    assert!(iterator.next().unwrap().is_ok());
    assert!(matches!(
        iterator.next(),
        Some(Err(QueryError::MalformedTerm(MalformedTermError::UnterminatedLiteral(_))))
    ));
    assert!(iterator.next().is_none());
}

#[test]
fn test_cursor_mark_ordering() {
    let mark = CursorMark::After(RecordId::new(1, 5));
    assert!(mark.precedes(RecordId::new(1, 6), SortOrder::Ascending));
    assert!(mark.precedes(RecordId::new(2, 0), SortOrder::Ascending));
    assert!(!mark.precedes(RecordId::new(1, 5), SortOrder::Ascending));
    assert!(mark.precedes(RecordId::new(0, 9), SortOrder::Descending));
    assert!(CursorMark::Start.precedes(RecordId::new(0, 0), SortOrder::Descending));
    assert_eq!(mark.to_string(), "1:5");
    assert_eq!(CursorMark::Start.to_string(), "*");
}
