//! Keyword relevance filter: keeps records whose context mentions the chosen field of work.
//!
//! Matching is case-insensitive substring containment, not whole-word: `java` also
//! matches `javascript`, `ai` matches `maintain`. An empty keyword set accepts everything.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extraction::models::EmailRecord;

/// Topic category name → ordered keyword list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable {
    categories: IndexMap<String, Vec<String>>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        let mut categories = IndexMap::new();
        categories.insert(
            "Data/AI".to_string(),
            to_owned(&[
                "data",
                "ai",
                "machine learning",
                "ml",
                "deep learning",
                "python",
                "pandas",
                "data science",
                "nlp",
                "llm",
                "apprentissage automatique",
                "intelligence artificielle",
            ]),
        );
        categories.insert(
            "Cybersecurity".to_string(),
            to_owned(&[
                "security",
                "cyber",
                "cybersecurity",
                "pentest",
                "siem",
                "soc",
                "owasp",
                "sécurité",
                "infosec",
                "threat",
                "vulnerability",
                "forensics",
            ]),
        );
        categories.insert(
            "Dev".to_string(),
            to_owned(&[
                "developer",
                "dev",
                "frontend",
                "backend",
                "fullstack",
                "java",
                "javascript",
                "typescript",
                "react",
                "node",
                "spring",
                "api",
                "microservices",
                "golang",
                "rust",
            ]),
        );
        Self { categories }
    }
}

impl CategoryTable {
    pub fn new(categories: IndexMap<String, Vec<String>>) -> Self {
        Self { categories }
    }

    /// Loads a `{ "Category": ["kw", ...] }` JSON document.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read category file '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Category file '{}' is not valid JSON", path.display()))
    }

    /// Unions `other` into `self`. New categories are appended, existing ones gain the
    /// keywords they lacked (compared case-insensitively).
    pub fn merge(&mut self, other: CategoryTable) {
        for (name, keywords) in other.categories {
            let existing = self.categories.entry(name).or_default();
            for keyword in keywords {
                let lower = keyword.to_lowercase();
                if !existing.iter().any(|k| k.to_lowercase() == lower) {
                    existing.push(keyword);
                }
            }
        }
    }

    /// Keywords configured for `name`; empty for unknown categories.
    pub fn keywords(&self, name: &str) -> &[String] {
        self.categories
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }
}

fn to_owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}

/// Applies a category's keywords, plus caller extras, to a collection of records.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    table: Arc<CategoryTable>,
}

impl KeywordFilter {
    pub fn new(table: Arc<CategoryTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Lowercased union of the category's keywords and `extra`.
    ///
    /// Configured keywords keep their whitespace, so `" ai "` only matches the standalone
    /// word. Extras are typed by a user: they are trimmed and blanks are ignored.
    pub fn active_keywords(&self, category: &str, extra: &[String]) -> BTreeSet<String> {
        if !category.is_empty() && !self.table.contains(category) {
            let known: Vec<&str> = self.table.names().collect();
            warn!("Unknown category '{category}' (known: {known:?}), only extra keywords apply");
        }
        let configured = self
            .table
            .keywords(category)
            .iter()
            .map(|k| k.to_lowercase());
        let extras = extra.iter().map(|k| k.trim().to_lowercase());
        configured
            .chain(extras)
            .filter(|k| !k.is_empty())
            .collect()
    }

    /// Keeps records whose context contains at least one active keyword.
    /// With no active keywords the input is returned as-is.
    pub fn apply(
        &self,
        records: Vec<EmailRecord>,
        category: &str,
        extra: &[String],
    ) -> Vec<EmailRecord> {
        let keywords = self.active_keywords(category, extra);
        if keywords.is_empty() {
            return records;
        }

        let before = records.len();
        let kept: Vec<EmailRecord> = records
            .into_iter()
            .filter(|r| {
                let context = r.context.to_lowercase();
                keywords.iter().any(|k| context.contains(k.as_str()))
            })
            .collect();
        debug!(
            "Keyword filter '{category}' kept {}/{before} records ({} keywords)",
            kept.len(),
            keywords.len()
        );
        kept
    }
}

/// Splits a comma-separated keyword list, dropping blanks.
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
