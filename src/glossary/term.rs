use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{UnknownVariant, present};

pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Revenue",
    "Customer",
    "Product",
    "Operations",
    "Finance",
    "Marketing",
    "HR",
    "General",
];

/// The first entry doubles as the "no dataset filter" sentinel.
pub const DEFAULT_DATASETS: [&str; 6] = [
    "All Datasets",
    "Sales DB",
    "Marketing DB",
    "Finance DB",
    "HR DB",
    "Product Analytics",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::P0, Self::P1, Self::P2, Self::P3];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::P0 => "Critical",
            Self::P1 => "High",
            Self::P2 => "Medium",
            Self::P3 => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == upper)
            .ok_or_else(|| UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlPattern {
    pub id: String,
    pub name: String,
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A SQL pattern before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqlPatternDraft {
    pub name: String,
    pub sql: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SqlPatternDraft {
    pub fn new(name: &str, sql: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            sql: sql.trim().to_string(),
            description: None,
        }
    }

    /// Blank descriptions are dropped.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = non_blank(description);
        self
    }

    /// Fields are trimmed here as well, since drafts also arrive as JSON.
    pub(crate) fn into_pattern(self, id: String) -> SqlPattern {
        SqlPattern {
            id,
            name: self.name.trim().to_string(),
            sql: self.sql.trim().to_string(),
            description: self.description.as_deref().and_then(non_blank),
        }
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlossaryTerm {
    pub id: String,
    pub term: String,
    pub definition: String,
    pub category: String,
    pub synonyms: Vec<String>,
    pub sql_patterns: Vec<SqlPattern>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything a new term needs except id and timestamps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermDraft {
    pub term: String,
    pub definition: String,
    pub category: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub sql_patterns: Vec<SqlPatternDraft>,
    pub priority: Priority,
    #[serde(default)]
    pub dataset: Option<String>,
}

impl TermDraft {
    /// Category `General`, priority `P2`, dataset `All Datasets`.
    pub fn new(term: &str, definition: &str) -> Self {
        Self {
            term: term.trim().to_string(),
            definition: definition.trim().to_string(),
            category: "General".to_string(),
            synonyms: Vec::new(),
            sql_patterns: Vec::new(),
            priority: Priority::P2,
            dataset: Some(DEFAULT_DATASETS[0].to_string()),
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn dataset(mut self, dataset: Option<&str>) -> Self {
        self.dataset = dataset.map(str::to_string);
        self
    }

    pub fn synonym(mut self, synonym: &str) -> Self {
        self.synonyms.push(synonym.to_string());
        self.synonyms = normalize_synonyms(&self.synonyms);
        self
    }

    pub fn sql_pattern(mut self, pattern: SqlPatternDraft) -> Self {
        self.sql_patterns.push(pattern);
        self
    }
}

/// Field-level update for a term. `dataset: Some(None)` clears the dataset.
/// A `sql_patterns` replacement gets fresh pattern ids.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermPatch {
    pub term: Option<String>,
    pub definition: Option<String>,
    pub category: Option<String>,
    pub synonyms: Option<Vec<String>>,
    pub sql_patterns: Option<Vec<SqlPatternDraft>>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "present")]
    pub dataset: Option<Option<String>>,
}

/// Trims, drops blanks and removes duplicates keeping the first occurrence.
pub fn normalize_synonyms(synonyms: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(synonyms.len());
    for s in synonyms {
        let s = s.trim();
        if !s.is_empty() && !out.iter().any(|o| o == s) {
            out.push(s.to_string());
        }
    }
    out
}
