use std::collections::VecDeque;

use tantivy::{
    collector::{Collector, SegmentCollector},
    DocId, Result as TantivyResult, Score, SegmentOrdinal, SegmentReader,
};

use crate::engine::config::SortOrder;
use crate::model::RecordId;
use crate::paging::CursorMark;

/// Records of one page plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFruit {
    pub records: Vec<RecordId>,
    pub total_matches: u64,
}

/// Collects the first `limit` records past a cursor mark, in index order.
///
/// Every match is counted, so the total is known after any page, including a
/// zero-length one.
pub struct CursorPageCollector {
    limit: usize,
    after: CursorMark,
    order: SortOrder,
}

impl CursorPageCollector {
    pub fn new(limit: usize, after: CursorMark, order: SortOrder) -> Self {
        Self {
            limit,
            after,
            order,
        }
    }
}

impl Collector for CursorPageCollector {
    type Fruit = PageFruit;
    type Child = CursorPageSegmentCollector;

    fn for_segment(
        &self,
        segment_local_id: SegmentOrdinal,
        _segment: &SegmentReader,
    ) -> TantivyResult<Self::Child> {
        Ok(CursorPageSegmentCollector {
            segment_ord: segment_local_id,
            limit: self.limit,
            after: self.after,
            order: self.order,
            records: VecDeque::new(),
            total_matches: 0,
        })
    }

    fn requires_scoring(&self) -> bool {
        false
    }

    fn merge_fruits(&self, segment_fruits: Vec<PageFruit>) -> TantivyResult<PageFruit> {
        let mut records = Vec::new();
        let mut total_matches = 0;

        for fruit in segment_fruits {
            total_matches += fruit.total_matches;
            records.extend(fruit.records);
        }

        match self.order {
            SortOrder::Ascending => records.sort_unstable(),
            SortOrder::Descending => records.sort_unstable_by(|a, b| b.cmp(a)),
        }
        records.truncate(self.limit);

        Ok(PageFruit {
            records,
            total_matches,
        })
    }
}

/// Segment-level collector for cursor pages
pub struct CursorPageSegmentCollector {
    segment_ord: SegmentOrdinal,
    limit: usize,
    after: CursorMark,
    order: SortOrder,
    records: VecDeque<RecordId>,
    total_matches: u64,
}

impl SegmentCollector for CursorPageSegmentCollector {
    type Fruit = PageFruit;

    fn collect(&mut self, doc: DocId, _score: Score) {
        self.total_matches += 1;
        let record = RecordId::new(self.segment_ord, doc);
        if !self.after.precedes(record, self.order) {
            return;
        }
        // Docs arrive in ascending order: ascending pages keep the first `limit`,
        // descending pages keep a sliding window of the last `limit`.
        match self.order {
            SortOrder::Ascending => {
                if self.records.len() < self.limit {
                    self.records.push_back(record);
                }
            }
            SortOrder::Descending => {
                self.records.push_back(record);
                if self.records.len() > self.limit {
                    self.records.pop_front();
                }
            }
        }
    }

    fn harvest(self) -> PageFruit {
        let mut records: Vec<RecordId> = self.records.into();
        if self.order == SortOrder::Descending {
            records.reverse();
        }
        PageFruit {
            records,
            total_matches: self.total_matches,
        }
    }
}
