//! Write-side graph operations for TripleStore

use oxrdf::{GraphName, Quad, Triple};
use tantivy::schema::TantivyDocument;
use tantivy::{IndexWriter, Term};

use crate::codec::{IndexedRecord, TypedObject};
use crate::engine::core::TripleStore;
use crate::engine::schema::IndexFields;
use crate::error::StoreError;
use crate::model::TriplePattern;
use crate::tantivy_integration::filters::compile_filters;

/// Tantivy document for an indexed record
pub fn record_document(fields: &IndexFields, record: &IndexedRecord) -> TantivyDocument {
    let mut doc = TantivyDocument::default();
    doc.add_text(fields.id, &record.id);
    doc.add_text(fields.graph, &record.graph);
    doc.add_text(fields.subject, &record.subject);
    doc.add_text(fields.predicate, &record.predicate);
    doc.add_text(fields.object, &record.object);

    if let Some(language) = &record.object_language {
        doc.add_text(fields.object_language, language);
    }
    match record.typed_object {
        TypedObject::Boolean(value) => doc.add_bool(fields.object_boolean, value),
        TypedObject::Numeric(value) => doc.add_f64(fields.object_numeric, value),
        TypedObject::Date(millis) => doc.add_i64(fields.object_date, millis),
        TypedObject::None => {}
    }
    if let Some(text) = &record.object_text {
        doc.add_text(fields.object_text, text);
    }
    doc
}

impl TripleStore {
    fn writer(&mut self) -> Result<&mut IndexWriter, StoreError> {
        self.writer.as_mut().ok_or(StoreError::ReadOnly)
    }

    /// Add a triple to `graph`. Re-adding an existing triple replaces it.
    ///
    /// Visible to readers after [`TripleStore::commit`].
    pub fn add(&mut self, graph: &GraphName, triple: &Triple) -> Result<(), StoreError> {
        let record = IndexedRecord::from_triple(graph, triple, &self.registry);
        let doc = record_document(&self.fields, &record);
        let id_term = Term::from_field_text(self.fields.id, &record.id);

        let writer = self.writer()?;
        writer.delete_term(id_term);
        writer.add_document(doc)?;

        self.stats.record_write();
        log::trace!("Added {} {} {} to {}", record.subject, record.predicate, record.object, record.graph);
        Ok(())
    }

    pub fn add_quad(&mut self, quad: &Quad) -> Result<(), StoreError> {
        let triple = Triple::new(
            quad.subject.clone(),
            quad.predicate.clone(),
            quad.object.clone(),
        );
        self.add(&quad.graph_name, &triple)
    }

    /// Add many triples to `graph`, returning how many were written
    pub fn add_all<'a>(
        &mut self,
        graph: &GraphName,
        triples: impl IntoIterator<Item = &'a Triple>,
    ) -> Result<usize, StoreError> {
        let mut added = 0;
        for triple in triples {
            self.add(graph, triple)?;
            added += 1;
        }
        Ok(added)
    }

    /// Delete every triple of `graph` matching `pattern`; variables are wildcards.
    pub fn delete(&mut self, graph: &GraphName, pattern: &TriplePattern) -> Result<(), StoreError> {
        let filters = self.registry.pattern_predicates(graph, pattern, |_| None)?;
        let query = compile_filters(&self.fields, &filters);
        self.writer()?.delete_query(query)?;
        self.stats.record_delete();
        log::debug!("Deleted '{}' from graph {}", pattern, graph);
        Ok(())
    }

    /// Delete every triple of `graph`
    pub fn clear(&mut self, graph: &GraphName) -> Result<(), StoreError> {
        let filters = vec![self.registry.graph_predicate(graph)];
        let query = compile_filters(&self.fields, &filters);
        self.writer()?.delete_query(query)?;
        self.stats.record_delete();
        log::info!("Cleared graph {}", graph);
        Ok(())
    }

    /// Delete every triple of every graph
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.writer()?.delete_all_documents()?;
        self.stats.record_delete();
        log::info!("Cleared all graphs");
        Ok(())
    }

    /// Commit pending writes and make them visible to new snapshots
    pub fn commit(&mut self) -> Result<(), StoreError> {
        self.writer()?.commit()?;
        self.reader.reload()?;
        log::debug!("Committed; {} records visible", self.num_records());
        Ok(())
    }
}
