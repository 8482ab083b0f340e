//! Grouped counts over a view: papers per year, top journals, and the term
//! frequencies behind the abstract word cloud.

use crate::models::{JournalCount, TermCount, View, YearCount};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const DEFAULT_TOP_JOURNALS: usize = 10;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}']*").expect("valid regex"));

/// English stop words excluded from the term cloud.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each",
    "else", "ever", "few", "for", "from", "further", "get", "had", "has", "have", "having", "he",
    "her", "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "k", "like", "may", "me", "more", "most", "my",
    "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other", "otherwise",
    "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she", "should",
    "since", "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "therefore", "these", "they", "this", "those", "through", "thus", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

static STOP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Papers per year, ascending by year. Counts sum to `view.len()`.
pub fn count_by_year(view: &View) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for record in view.iter() {
        *counts.entry(record.published_year).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Most frequent journals, descending by count, at most `n` entries.
/// Ties keep the order in which journals first appear in the view.
/// Records without a journal are not counted.
pub fn top_journals(view: &View, n: usize) -> Vec<JournalCount> {
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<JournalCount> = Vec::new();

    for journal in view.iter().filter_map(|r| r.journal.as_deref()) {
        match order.get(journal) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                order.insert(journal, counts.len());
                counts.push(JournalCount {
                    journal: journal.to_string(),
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(n);
    counts
}

/// Earliest and latest year in the view, or `None` if it is empty.
pub fn year_range(view: &View) -> Option<(i32, i32)> {
    view.iter().map(|r| r.published_year).fold(None, |acc, y| match acc {
        None => Some((y, y)),
        Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
    })
}

/// Term frequencies over the concatenated abstracts of a view.
///
/// Tokens are lowercased, a trailing possessive `'s` is dropped, and stop
/// words, single characters and pure numbers are skipped. Sorted by
/// descending count, ties in first-seen order, truncated to `limit`.
pub fn term_frequencies(view: &View, limit: usize) -> Vec<TermCount> {
    let mut order: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<TermCount> = Vec::new();

    for record in view.iter() {
        let lower = record.abstract_text.to_lowercase();
        for token in TOKEN_RE.find_iter(&lower) {
            let word = token.as_str();
            let word = word.strip_suffix("'s").unwrap_or(word).trim_end_matches('\'');

            if word.chars().count() < 2
                || word.chars().all(|c| c.is_numeric())
                || STOP_SET.contains(word)
            {
                continue;
            }

            match order.get(word) {
                Some(&idx) => counts[idx].count += 1,
                None => {
                    order.insert(word.to_string(), counts.len());
                    counts.push(TermCount {
                        term: word.to_string(),
                        count: 1,
                    });
                }
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}
