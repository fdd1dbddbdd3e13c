//! Business glossary: terms with definitions, synonyms and example SQL.

mod query;
mod store;
mod term;

pub use query::{
    ALL_CATEGORIES, ALL_DATASETS, GlossaryFilter, TermGroup, TermGroups, categories, filter_terms,
};
pub use store::{GlossarySnapshot, GlossaryStore};
pub use term::{
    DEFAULT_CATEGORIES, DEFAULT_DATASETS, GlossaryTerm, Priority, SqlPattern, SqlPatternDraft,
    TermDraft, TermPatch, normalize_synonyms,
};
