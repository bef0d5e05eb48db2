//! Field name constants for consistency across the codebase

pub const FIELD_ID: &str = "id";
pub const FIELD_GRAPH: &str = "c";
pub const FIELD_SUBJECT: &str = "s";
pub const FIELD_PREDICATE: &str = "p";
pub const FIELD_OBJECT: &str = "o";
pub const FIELD_OBJECT_LANGUAGE: &str = "o_lang";
pub const FIELD_OBJECT_BOOLEAN: &str = "o_b";
pub const FIELD_OBJECT_NUMERIC: &str = "o_n";
pub const FIELD_OBJECT_DATE: &str = "o_d";
pub const FIELD_OBJECT_TEXT: &str = "o_s";

/// Language field value for literals without a tag
pub const NULL_LANGUAGE: &str = "__nolang__";

/// Graph field value for the default graph
pub const UNNAMED_GRAPH: &str = "__unnamed__";

/// Page length used when none is configured
pub const DEFAULT_FETCH_SIZE: usize = 1000;

pub const DEFAULT_WRITER_MEMORY: usize = 50_000_000;

/// Physical index fields, addressed by name in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexField {
    Id,
    Graph,
    Subject,
    Predicate,
    Object,
    ObjectLanguage,
    ObjectBoolean,
    ObjectNumeric,
    ObjectDate,
    ObjectText,
}

impl IndexField {
    pub const ALL: [IndexField; 10] = [
        IndexField::Id,
        IndexField::Graph,
        IndexField::Subject,
        IndexField::Predicate,
        IndexField::Object,
        IndexField::ObjectLanguage,
        IndexField::ObjectBoolean,
        IndexField::ObjectNumeric,
        IndexField::ObjectDate,
        IndexField::ObjectText,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IndexField::Id => FIELD_ID,
            IndexField::Graph => FIELD_GRAPH,
            IndexField::Subject => FIELD_SUBJECT,
            IndexField::Predicate => FIELD_PREDICATE,
            IndexField::Object => FIELD_OBJECT,
            IndexField::ObjectLanguage => FIELD_OBJECT_LANGUAGE,
            IndexField::ObjectBoolean => FIELD_OBJECT_BOOLEAN,
            IndexField::ObjectNumeric => FIELD_OBJECT_NUMERIC,
            IndexField::ObjectDate => FIELD_OBJECT_DATE,
            IndexField::ObjectText => FIELD_OBJECT_TEXT,
        }
    }
}
