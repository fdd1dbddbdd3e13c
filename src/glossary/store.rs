use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::query::{self, GlossaryFilter, TermGroups};
use super::term::{GlossaryTerm, SqlPatternDraft, TermDraft, TermPatch, normalize_synonyms};
use crate::ids::{Clock, IdGenerator, SystemClock, UuidIds};
use crate::sample;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GlossarySnapshot {
    pub terms: Vec<GlossaryTerm>,
}

impl GlossarySnapshot {
    pub fn term(&self, id: &str) -> Option<&GlossaryTerm> {
        self.terms.iter().find(|t| t.id == id)
    }
}

pub struct GlossaryStore {
    current: Arc<GlossarySnapshot>,
    filter: GlossaryFilter,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl Default for GlossaryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GlossaryStore {
    pub fn new() -> Self {
        Self::with_sources(UuidIds, SystemClock)
    }

    /// A store seeded with the built-in sample terms.
    pub fn with_sample_terms() -> Self {
        let mut store = Self::new();
        store.load_sample_terms();
        store
    }

    pub fn with_sources(ids: impl IdGenerator + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            current: Arc::new(GlossarySnapshot::default()),
            filter: GlossaryFilter::default(),
            ids: Box::new(ids),
            clock: Box::new(clock),
        }
    }

    pub fn snapshot(&self) -> Arc<GlossarySnapshot> {
        Arc::clone(&self.current)
    }

    fn transition<R>(&mut self, f: impl FnOnce(&mut GlossarySnapshot) -> Option<R>) -> Option<R> {
        let mut next = (*self.current).clone();
        let out = f(&mut next)?;
        self.current = Arc::new(next);
        Some(out)
    }

    /// Current time, clamped so a term's `updated_at` never moves backwards.
    fn touch(&mut self, previous: DateTime<Utc>) -> DateTime<Utc> {
        self.clock.now().max(previous)
    }

    /// Appends the sample terms to whatever is already stored.
    pub fn load_sample_terms(&mut self) {
        for draft in sample::sample_terms() {
            self.add_term(draft);
        }
    }

    pub fn add_term(&mut self, draft: TermDraft) -> String {
        let id = self.ids.next_id();
        let now = self.clock.now();
        let sql_patterns = draft
            .sql_patterns
            .into_iter()
            .map(|p| p.into_pattern(self.ids.next_id()))
            .collect();
        let term = GlossaryTerm {
            id: id.clone(),
            term: draft.term.trim().to_string(),
            definition: draft.definition.trim().to_string(),
            category: draft.category,
            synonyms: normalize_synonyms(&draft.synonyms),
            sql_patterns,
            priority: draft.priority,
            dataset: draft.dataset,
            created_at: now,
            updated_at: now,
        };
        tracing::debug!(term_id = %id, term = %term.term, "added glossary term");
        self.transition(|s| {
            s.terms.push(term);
            Some(())
        });
        id
    }

    pub fn update_term(&mut self, id: &str, patch: TermPatch) {
        let Some(previous) = self.current.term(id).map(|t| t.updated_at) else {
            tracing::debug!(term_id = id, "update term: not found; ignoring");
            return;
        };
        let updated_at = self.touch(previous);
        let sql_patterns = patch.sql_patterns.map(|patterns| {
            patterns
                .into_iter()
                .map(|p| p.into_pattern(self.ids.next_id()))
                .collect::<Vec<_>>()
        });
        self.transition(|s| {
            let t = s.terms.iter_mut().find(|t| t.id == id)?;
            if let Some(v) = patch.term {
                t.term = v.trim().to_string();
            }
            if let Some(v) = patch.definition {
                t.definition = v.trim().to_string();
            }
            if let Some(v) = patch.category {
                t.category = v;
            }
            if let Some(v) = patch.synonyms {
                t.synonyms = normalize_synonyms(&v);
            }
            if let Some(v) = sql_patterns {
                t.sql_patterns = v;
            }
            if let Some(v) = patch.priority {
                t.priority = v;
            }
            if let Some(v) = patch.dataset {
                t.dataset = v;
            }
            t.updated_at = updated_at;
            Some(())
        });
        tracing::debug!(term_id = id, "updated glossary term");
    }

    pub fn delete_term(&mut self, id: &str) {
        let deleted = self.transition(|s| {
            let idx = s.terms.iter().position(|t| t.id == id)?;
            s.terms.remove(idx);
            Some(())
        });
        match deleted {
            Some(()) => tracing::debug!(term_id = id, "deleted glossary term"),
            None => tracing::debug!(term_id = id, "delete term: not found; ignoring"),
        }
    }

    pub fn add_sql_pattern(&mut self, term_id: &str, draft: SqlPatternDraft) -> Option<String> {
        let Some(previous) = self.current.term(term_id).map(|t| t.updated_at) else {
            tracing::debug!(term_id, "add sql pattern: term not found; ignoring");
            return None;
        };
        let pattern_id = self.ids.next_id();
        let updated_at = self.touch(previous);
        let pattern = draft.into_pattern(pattern_id.clone());
        self.transition(|s| {
            let t = s.terms.iter_mut().find(|t| t.id == term_id)?;
            t.sql_patterns.push(pattern);
            t.updated_at = updated_at;
            Some(())
        })?;
        tracing::debug!(term_id, pattern_id = %pattern_id, "added sql pattern");
        Some(pattern_id)
    }

    pub fn remove_sql_pattern(&mut self, term_id: &str, pattern_id: &str) {
        let Some(term) = self.current.term(term_id) else {
            tracing::debug!(term_id, "remove sql pattern: term not found; ignoring");
            return;
        };
        if !term.sql_patterns.iter().any(|p| p.id == pattern_id) {
            tracing::debug!(term_id, pattern_id, "remove sql pattern: pattern not found; ignoring");
            return;
        }
        let previous = term.updated_at;
        let updated_at = self.touch(previous);
        self.transition(|s| {
            let t = s.terms.iter_mut().find(|t| t.id == term_id)?;
            t.sql_patterns.retain(|p| p.id != pattern_id);
            t.updated_at = updated_at;
            Some(())
        });
        tracing::debug!(term_id, pattern_id, "removed sql pattern");
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.filter.search_query = query.to_string();
    }

    pub fn set_selected_category(&mut self, category: &str) {
        self.filter.selected_category = category.to_string();
    }

    pub fn set_selected_dataset(&mut self, dataset: &str) {
        self.filter.selected_dataset = dataset.to_string();
    }

    pub fn categories(&self) -> Vec<String> {
        query::categories(&self.current.terms)
    }

    pub fn filtered_terms(&self) -> Vec<&GlossaryTerm> {
        query::filter_terms(&self.current.terms, &self.filter)
    }

    pub fn grouped_terms(&self) -> TermGroups {
        TermGroups::from_terms(self.filtered_terms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::term::Priority;
    use crate::ids::{SequentialIds, SteppingClock};
    use chrono::TimeDelta;

    fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn store(step: TimeDelta) -> GlossaryStore {
        GlossaryStore::with_sources(SequentialIds::new("g"), SteppingClock::new(epoch(), step))
    }

    fn draft(term: &str, category: &str) -> TermDraft {
        TermDraft::new(term, &format!("{} definition", term)).category(category)
    }

    #[test]
    fn test_add_term_assigns_id_and_timestamps() {
        let mut s = store(TimeDelta::seconds(1));
        let id = s.add_term(
            draft("Revenue", "Revenue")
                .sql_pattern(SqlPatternDraft::new("Gross", "SELECT SUM(amount) FROM orders")),
        );
        let snap = s.snapshot();
        let t = snap.term(&id).unwrap();
        assert_eq!(id, "g1");
        assert_eq!(t.sql_patterns[0].id, "g2");
        assert_eq!(t.created_at, epoch());
        assert_eq!(t.created_at, t.updated_at);
    }

    #[test]
    fn test_update_term_refreshes_updated_at_only() {
        let mut s = store(TimeDelta::seconds(1));
        let id = s.add_term(draft("Revenue", "Revenue"));
        s.update_term(
            &id,
            TermPatch {
                definition: Some("x".into()),
                ..Default::default()
            },
        );
        let snap = s.snapshot();
        let t = snap.term(&id).unwrap();
        assert_eq!(t.definition, "x");
        assert_eq!(t.term, "Revenue");
        assert_eq!(t.created_at, epoch());
        assert!(t.updated_at > t.created_at);
    }

    #[test]
    fn test_updated_at_never_decreases() {
        let mut s = store(TimeDelta::seconds(-10));
        let id = s.add_term(draft("Revenue", "Revenue"));
        let before = s.snapshot().term(&id).unwrap().updated_at;
        s.update_term(
            &id,
            TermPatch {
                definition: Some("x".into()),
                ..Default::default()
            },
        );
        let after = s.snapshot().term(&id).unwrap().updated_at;
        assert!(after >= before);
    }

    #[test]
    fn test_update_term_replaces_patterns_and_clears_dataset() {
        let mut s = store(TimeDelta::seconds(1));
        let id = s.add_term(
            draft("Revenue", "Revenue").sql_pattern(SqlPatternDraft::new("old", "SELECT 1")),
        );
        s.update_term(
            &id,
            TermPatch {
                sql_patterns: Some(vec![SqlPatternDraft::new("new", "SELECT 2")]),
                synonyms: Some(vec!["Sales".into(), "Sales".into()]),
                priority: Some(Priority::P0),
                dataset: Some(None),
                ..Default::default()
            },
        );
        let snap = s.snapshot();
        let t = snap.term(&id).unwrap();
        assert_eq!(t.sql_patterns.len(), 1);
        assert_eq!(t.sql_patterns[0].name, "new");
        assert_eq!(t.synonyms, vec!["Sales"]);
        assert_eq!(t.priority, Priority::P0);
        assert_eq!(t.dataset, None);
    }

    #[test]
    fn test_delete_term() {
        let mut s = store(TimeDelta::seconds(1));
        let a = s.add_term(draft("a", "X"));
        let b = s.add_term(draft("b", "X"));
        s.delete_term(&a);
        let snap = s.snapshot();
        assert!(snap.term(&a).is_none());
        assert!(snap.term(&b).is_some());
    }

    #[test]
    fn test_sql_pattern_add_remove_touch_term() {
        let mut s = store(TimeDelta::seconds(1));
        let id = s.add_term(draft("a", "X"));
        let p = s
            .add_sql_pattern(&id, SqlPatternDraft::new("p", "SELECT 1").with_description("d"))
            .unwrap();
        let after_add = s.snapshot().term(&id).unwrap().clone();
        assert_eq!(after_add.sql_patterns.len(), 1);
        assert_eq!(after_add.sql_patterns[0].description.as_deref(), Some("d"));
        assert!(after_add.updated_at > after_add.created_at);

        s.remove_sql_pattern(&id, &p);
        let after_remove = s.snapshot().term(&id).unwrap().clone();
        assert!(after_remove.sql_patterns.is_empty());
        assert!(after_remove.updated_at > after_add.updated_at);
    }

    #[test]
    fn test_missing_targets_are_noops() {
        let mut s = store(TimeDelta::seconds(1));
        s.add_term(draft("a", "X"));
        let before = s.snapshot();
        s.update_term("nope", TermPatch::default());
        s.delete_term("nope");
        assert_eq!(s.add_sql_pattern("nope", SqlPatternDraft::new("p", "SELECT 1")), None);
        s.remove_sql_pattern("g1", "nope");
        assert!(Arc::ptr_eq(&before, &s.snapshot()));
    }

    #[test]
    fn test_filter_state_drives_derived_views() {
        let mut s = store(TimeDelta::seconds(1));
        s.add_term(draft("Revenue", "Revenue"));
        s.add_term(draft("Churn Rate", "Customer"));

        s.set_search_query("chur");
        let names: Vec<_> = s.filtered_terms().iter().map(|t| t.term.clone()).collect();
        assert_eq!(names, vec!["Churn Rate"]);

        s.set_search_query("");
        s.set_selected_category("Revenue");
        let names: Vec<_> = s.filtered_terms().iter().map(|t| t.term.clone()).collect();
        assert_eq!(names, vec!["Revenue"]);

        assert_eq!(s.categories(), vec!["All", "Customer", "Revenue"]);
    }

    #[test]
    fn test_grouped_terms() {
        let mut s = store(TimeDelta::seconds(1));
        s.add_term(draft("a", "Finance"));
        s.add_term(draft("b", "Customer"));
        s.add_term(draft("c", "Finance"));
        let groups = s.grouped_terms();
        assert_eq!(groups.groups[0].category, "Finance");
        assert_eq!(groups.get("Finance").unwrap().terms.len(), 2);
        assert_eq!(groups.sorted()[0].category, "Customer");
    }

    #[test]
    fn test_sample_terms() {
        let s = GlossaryStore::with_sample_terms();
        assert_eq!(s.snapshot().terms.len(), 5);
        assert_eq!(
            s.categories(),
            vec!["All", "Customer", "Finance", "Marketing", "Revenue"]
        );
    }
}
