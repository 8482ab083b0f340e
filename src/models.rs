//! Data models for the dashboard.
//!
//! Records are loaded once and never mutated; views and search results borrow
//! from the dataset and are rebuilt on every interaction.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

// ============================================================================
// Core Record Types
// ============================================================================

/// One cleaned research document. `title`, `abstract_text` and
/// `published_year` are always present once a record reaches a [`Dataset`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub published_year: i32,
    pub journal: Option<String>,
    pub source: String,
}

/// Full in-memory collection of records in load order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The whole dataset as an unfiltered view.
    pub fn view(&self) -> View<'_> {
        View::new(self.records.iter().collect())
    }

    /// Distinct publication years, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.published_year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct journal names, sorted. Records without a journal are skipped.
    pub fn available_journals(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.journal.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Selected years and journals. A record matches only if both its year and
/// its journal are members; an empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub years: HashSet<i32>,
    pub journals: HashSet<String>,
}

impl FilterSpec {
    pub fn new(
        years: impl IntoIterator<Item = i32>,
        journals: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            years: years.into_iter().collect(),
            journals: journals.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.years.contains(&record.published_year)
            && record
                .journal
                .as_ref()
                .is_some_and(|j| self.journals.contains(j))
    }
}

/// Ordered subset of a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View<'a> {
    pub records: Vec<&'a Record>,
}

impl<'a> View<'a> {
    pub fn new(records: Vec<&'a Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }
}

// ============================================================================
// Search
// ============================================================================

/// A view restricted by a keyword, with the lowercased keyword that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<'a> {
    pub keyword: String,
    pub records: Vec<&'a Record>,
    pub count: usize,
}

impl<'a> SearchResult<'a> {
    /// The first `limit` matches, for display.
    pub fn head(&self, limit: usize) -> &[&'a Record] {
        &self.records[..self.records.len().min(limit)]
    }

    /// First of the listed matches with exactly this title. Matches past
    /// `limit` are never offered for selection, so they are not found.
    pub fn find_listed(&self, title: &str, limit: usize) -> Option<&'a Record> {
        self.head(limit).iter().copied().find(|r| r.title == title)
    }
}

/// Outcome of the search stage. `NotSearched` is distinct from a search that
/// matched everything.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<'a> {
    NotSearched,
    Searched(SearchResult<'a>),
}

impl<'a> SearchOutcome<'a> {
    pub fn result(&self) -> Option<&SearchResult<'a>> {
        match self {
            SearchOutcome::NotSearched => None,
            SearchOutcome::Searched(result) => Some(result),
        }
    }
}

// ============================================================================
// Aggregates
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JournalCount {
    pub journal: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}
