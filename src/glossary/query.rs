use serde::Serialize;

use super::term::GlossaryTerm;

pub const ALL_CATEGORIES: &str = "All";
pub const ALL_DATASETS: &str = "All Datasets";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryFilter {
    pub search_query: String,
    pub selected_category: String,
    pub selected_dataset: String,
}

impl Default for GlossaryFilter {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            selected_category: ALL_CATEGORIES.to_string(),
            selected_dataset: ALL_DATASETS.to_string(),
        }
    }
}

impl GlossaryFilter {
    pub fn matches(&self, term: &GlossaryTerm) -> bool {
        self.matches_search(term) && self.matches_category(term) && self.matches_dataset(term)
    }

    fn matches_search(&self, term: &GlossaryTerm) -> bool {
        if self.search_query.is_empty() {
            return true;
        }
        let q = self.search_query.to_lowercase();
        term.term.to_lowercase().contains(&q)
            || term.definition.to_lowercase().contains(&q)
            || term.synonyms.iter().any(|s| s.to_lowercase().contains(&q))
    }

    fn matches_category(&self, term: &GlossaryTerm) -> bool {
        self.selected_category == ALL_CATEGORIES || term.category == self.selected_category
    }

    fn matches_dataset(&self, term: &GlossaryTerm) -> bool {
        self.selected_dataset == ALL_DATASETS
            || term.dataset.as_deref() == Some(self.selected_dataset.as_str())
    }
}

/// `"All"` followed by the distinct categories in sorted order.
pub fn categories(terms: &[GlossaryTerm]) -> Vec<String> {
    let mut cats: Vec<&str> = terms.iter().map(|t| t.category.as_str()).collect();
    cats.sort_unstable();
    cats.dedup();
    std::iter::once(ALL_CATEGORIES)
        .chain(cats)
        .map(str::to_string)
        .collect()
}

pub fn filter_terms<'a>(terms: &'a [GlossaryTerm], filter: &GlossaryFilter) -> Vec<&'a GlossaryTerm> {
    terms.iter().filter(|t| filter.matches(t)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermGroup {
    pub category: String,
    pub terms: Vec<GlossaryTerm>,
}

/// Terms partitioned by category. Groups appear in first-seen order and keep
/// the insertion order of their terms.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct TermGroups {
    pub groups: Vec<TermGroup>,
}

impl TermGroups {
    pub fn from_terms<'a>(terms: impl IntoIterator<Item = &'a GlossaryTerm>) -> Self {
        let mut groups: Vec<TermGroup> = Vec::new();
        for term in terms {
            match groups.iter_mut().find(|g| g.category == term.category) {
                Some(group) => group.terms.push(term.clone()),
                None => groups.push(TermGroup {
                    category: term.category.clone(),
                    terms: vec![term.clone()],
                }),
            }
        }
        Self { groups }
    }

    pub fn get(&self, category: &str) -> Option<&TermGroup> {
        self.groups.iter().find(|g| g.category == category)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups ordered alphabetically for display, case-insensitively.
    pub fn sorted(&self) -> Vec<&TermGroup> {
        let mut out: Vec<&TermGroup> = self.groups.iter().collect();
        out.sort_by(|a, b| {
            a.category
                .to_lowercase()
                .cmp(&b.category.to_lowercase())
                .then_with(|| a.category.cmp(&b.category))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::term::Priority;
    use chrono::{DateTime, Utc};

    fn term(name: &str, category: &str, dataset: Option<&str>, synonyms: &[&str]) -> GlossaryTerm {
        GlossaryTerm {
            id: name.to_string(),
            term: name.to_string(),
            definition: format!("{} definition", name),
            category: category.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            sql_patterns: vec![],
            priority: Priority::P1,
            dataset: dataset.map(str::to_string),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn fixture() -> Vec<GlossaryTerm> {
        vec![
            term("Revenue", "Revenue", Some("Sales DB"), &["Income"]),
            term("Churn Rate", "Customer", Some("Product Analytics"), &["Attrition Rate"]),
        ]
    }

    fn names(terms: &[&GlossaryTerm]) -> Vec<String> {
        terms.iter().map(|t| t.term.clone()).collect()
    }

    #[test]
    fn test_search_by_term() {
        let terms = fixture();
        let filter = GlossaryFilter {
            search_query: "chur".into(),
            ..Default::default()
        };
        assert_eq!(names(&filter_terms(&terms, &filter)), vec!["Churn Rate"]);
    }

    #[test]
    fn test_category_only() {
        let terms = fixture();
        let filter = GlossaryFilter {
            selected_category: "Revenue".into(),
            ..Default::default()
        };
        assert_eq!(names(&filter_terms(&terms, &filter)), vec!["Revenue"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_synonyms_and_definition() {
        let terms = fixture();
        let by_synonym = GlossaryFilter {
            search_query: "ATTRITION".into(),
            ..Default::default()
        };
        assert_eq!(names(&filter_terms(&terms, &by_synonym)), vec!["Churn Rate"]);

        let by_definition = GlossaryFilter {
            search_query: "revenue DEF".into(),
            ..Default::default()
        };
        assert_eq!(names(&filter_terms(&terms, &by_definition)), vec!["Revenue"]);
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let terms = fixture();
        assert_eq!(filter_terms(&terms, &GlossaryFilter::default()).len(), 2);
    }

    #[test]
    fn test_dataset_filter() {
        let mut terms = fixture();
        terms.push(term("Orphan", "General", None, &[]));
        let filter = GlossaryFilter {
            selected_dataset: "Sales DB".into(),
            ..Default::default()
        };
        assert_eq!(names(&filter_terms(&terms, &filter)), vec!["Revenue"]);
    }

    #[test]
    fn test_filters_combine() {
        let terms = fixture();
        let filter = GlossaryFilter {
            search_query: "rate".into(),
            selected_category: "Revenue".into(),
            ..Default::default()
        };
        assert!(filter_terms(&terms, &filter).is_empty());
    }

    #[test]
    fn test_categories_sorted_with_sentinel() {
        let mut terms = fixture();
        terms.push(term("X", "Customer", None, &[]));
        assert_eq!(categories(&terms), vec!["All", "Customer", "Revenue"]);
        assert_eq!(categories(&[]), vec!["All"]);
    }

    #[test]
    fn test_grouping_keeps_first_seen_order() {
        let terms = vec![
            term("b", "Zeta", None, &[]),
            term("a", "Alpha", None, &[]),
            term("c", "Zeta", None, &[]),
        ];
        let groups = TermGroups::from_terms(&terms);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.groups[0].category, "Zeta");
        let zeta: Vec<&str> = groups.get("Zeta").unwrap().terms.iter().map(|t| t.term.as_str()).collect();
        assert_eq!(zeta, vec!["b", "c"]);

        let sorted: Vec<&str> = groups.sorted().iter().map(|g| g.category.as_str()).collect();
        assert_eq!(sorted, vec!["Alpha", "Zeta"]);
    }
}
