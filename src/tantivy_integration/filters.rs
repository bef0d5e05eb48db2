//! Predicates to Tantivy queries

use tantivy::query::{AllQuery, BooleanQuery, Occur, Query, RangeQuery, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::Term;

use crate::engine::schema::IndexFields;
use crate::injector::Predicate;

/// Query matching the records a predicate selects.
///
/// Ranges walk the term dictionary of the typed field, which is indexed but not
/// a fast field.
pub fn predicate_query(fields: &IndexFields, predicate: &Predicate) -> Box<dyn Query> {
    let term = match predicate {
        Predicate::Text { field, value } => Term::from_field_text(fields.get(*field), value),
        Predicate::Boolean(value) => Term::from_field_bool(fields.object_boolean, *value),
        Predicate::Numeric(value) => Term::from_field_f64(fields.object_numeric, *value),
        Predicate::Date(millis) => Term::from_field_i64(fields.object_date, *millis),
        Predicate::NumericRange { lower, upper } => {
            return Box::new(RangeQuery::new_f64_bounds(
                predicate.field().name().to_string(),
                *lower,
                *upper,
            ))
        }
        Predicate::DateRange { lower, upper } => {
            return Box::new(RangeQuery::new_i64_bounds(
                predicate.field().name().to_string(),
                *lower,
                *upper,
            ))
        }
    };
    Box::new(TermQuery::new(term, IndexRecordOption::Basic))
}

/// Conjunction of all filters; no filters matches every record.
pub fn compile_filters(fields: &IndexFields, filters: &[Predicate]) -> Box<dyn Query> {
    if filters.is_empty() {
        return Box::new(AllQuery);
    }
    let clauses: Vec<(Occur, Box<dyn Query>)> = filters
        .iter()
        .map(|predicate| (Occur::Must, predicate_query(fields, predicate)))
        .collect();
    Box::new(BooleanQuery::new(clauses))
}
