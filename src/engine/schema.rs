//! Fixed index schema for triple records

use tantivy::schema::{Field, Schema, SchemaBuilder, INDEXED, STORED, STRING};

use crate::engine::constants::*;

/// Build the schema every triple index uses.
///
/// Term fields are untokenized so that equality is an exact term match on the
/// N-Triples form. Typed object fields are indexed for point lookups.
pub fn build_triple_schema() -> Schema {
    let mut builder = Schema::builder();

    add_string_field(&mut builder, FIELD_ID, false);
    add_string_field(&mut builder, FIELD_GRAPH, false);
    add_string_field(&mut builder, FIELD_SUBJECT, true);
    add_string_field(&mut builder, FIELD_PREDICATE, true);
    add_string_field(&mut builder, FIELD_OBJECT, true);
    add_string_field(&mut builder, FIELD_OBJECT_LANGUAGE, false);
    add_string_field(&mut builder, FIELD_OBJECT_TEXT, false);

    builder.add_bool_field(FIELD_OBJECT_BOOLEAN, INDEXED);
    log::debug!("Added boolean field '{}'", FIELD_OBJECT_BOOLEAN);
    builder.add_f64_field(FIELD_OBJECT_NUMERIC, INDEXED);
    log::debug!("Added f64 field '{}'", FIELD_OBJECT_NUMERIC);
    builder.add_i64_field(FIELD_OBJECT_DATE, INDEXED);
    log::debug!("Added epoch-millis field '{}'", FIELD_OBJECT_DATE);

    builder.build()
}

fn add_string_field(builder: &mut SchemaBuilder, name: &str, stored: bool) {
    if stored {
        builder.add_text_field(name, STRING | STORED);
    } else {
        builder.add_text_field(name, STRING);
    }
    log::debug!("Added string field '{}' (stored: {})", name, stored);
}

/// Resolved field handles for the triple schema.
#[derive(Debug, Clone, Copy)]
pub struct IndexFields {
    pub id: Field,
    pub graph: Field,
    pub subject: Field,
    pub predicate: Field,
    pub object: Field,
    pub object_language: Field,
    pub object_boolean: Field,
    pub object_numeric: Field,
    pub object_date: Field,
    pub object_text: Field,
}

impl IndexFields {
    pub fn resolve(schema: &Schema) -> tantivy::Result<Self> {
        Ok(Self {
            id: schema.get_field(FIELD_ID)?,
            graph: schema.get_field(FIELD_GRAPH)?,
            subject: schema.get_field(FIELD_SUBJECT)?,
            predicate: schema.get_field(FIELD_PREDICATE)?,
            object: schema.get_field(FIELD_OBJECT)?,
            object_language: schema.get_field(FIELD_OBJECT_LANGUAGE)?,
            object_boolean: schema.get_field(FIELD_OBJECT_BOOLEAN)?,
            object_numeric: schema.get_field(FIELD_OBJECT_NUMERIC)?,
            object_date: schema.get_field(FIELD_OBJECT_DATE)?,
            object_text: schema.get_field(FIELD_OBJECT_TEXT)?,
        })
    }

    pub fn get(&self, field: IndexField) -> Field {
        match field {
            IndexField::Id => self.id,
            IndexField::Graph => self.graph,
            IndexField::Subject => self.subject,
            IndexField::Predicate => self.predicate,
            IndexField::Object => self.object,
            IndexField::ObjectLanguage => self.object_language,
            IndexField::ObjectBoolean => self.object_boolean,
            IndexField::ObjectNumeric => self.object_numeric,
            IndexField::ObjectDate => self.object_date,
            IndexField::ObjectText => self.object_text,
        }
    }
}
