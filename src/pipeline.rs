//! One interaction, end to end.
//!
//! Every request carries its complete [`Interaction`]; the pipeline runs
//! Filter -> Aggregate -> Search -> Selection over the cached dataset and
//! returns a [`DashboardSnapshot`]. Summarization is the last stage and the
//! only one with a side effect, so it runs separately through
//! [`summarize_selection`].

use crate::aggregate::{count_by_year, term_frequencies, top_journals, year_range};
use crate::error::Result;
use crate::filter::{apply_filter, default_filter};
use crate::models::{
    Dataset, FilterSpec, JournalCount, Record, SearchOutcome, TermCount, View, YearCount,
};
use crate::search::search;
use crate::summarize::SummarizerCache;
use tracing::debug;

// ============================================================================
// Interaction State
// ============================================================================

/// Filter controls as submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterSelection {
    /// Controls never touched: all years and the leading journals.
    #[default]
    Defaults,
    /// Explicit selection; empty sets stay empty.
    Explicit(FilterSpec),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interaction {
    pub filter: FilterSelection,
    pub keyword: Option<String>,
    pub selected_title: Option<String>,
    pub summarize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub top_journals: usize,
    pub result_limit: usize,
    pub cloud_terms: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_journals: crate::aggregate::DEFAULT_TOP_JOURNALS,
            result_limit: 20,
            cloud_terms: 100,
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Everything the page shows for one interaction.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot<'a> {
    pub available_years: Vec<i32>,
    pub available_journals: Vec<String>,
    pub filter: FilterSpec,
    pub view: View<'a>,
    pub year_counts: Vec<YearCount>,
    pub top_journals: Vec<JournalCount>,
    pub year_range: Option<(i32, i32)>,
    pub terms: Vec<TermCount>,
    pub search: SearchOutcome<'a>,
    pub selection: Option<&'a Record>,
}

impl DashboardSnapshot<'_> {
    pub fn total(&self) -> usize {
        self.view.len()
    }
}

/// Run every pure stage for one interaction.
pub fn run<'a>(
    dataset: &'a Dataset,
    interaction: &Interaction,
    options: &PipelineOptions,
) -> DashboardSnapshot<'a> {
    let filter = match &interaction.filter {
        FilterSelection::Defaults => default_filter(dataset, options.top_journals),
        FilterSelection::Explicit(spec) => spec.clone(),
    };

    let view = apply_filter(dataset, &filter);
    let year_counts = count_by_year(&view);
    let top = top_journals(&view, options.top_journals);
    let range = year_range(&view);
    let terms = term_frequencies(&view, options.cloud_terms);

    let outcome = search(&view, interaction.keyword.as_deref());
    let selection = select(&outcome, interaction.selected_title.as_deref(), options.result_limit);

    debug!(
        filtered = view.len(),
        searched = outcome.result().map(|r| r.count),
        selected = selection.map(|r| r.title.as_str()),
        "Pipeline run"
    );

    DashboardSnapshot {
        available_years: dataset.available_years(),
        available_journals: dataset.available_journals(),
        filter,
        view,
        year_counts,
        top_journals: top,
        year_range: range,
        terms,
        search: outcome,
        selection,
    }
}

/// Resolve the paper selector against the listed results. A title that is
/// unknown, missing or past `limit` falls back to the first listed result.
pub fn select<'a>(
    outcome: &SearchOutcome<'a>,
    title: Option<&str>,
    limit: usize,
) -> Option<&'a Record> {
    let result = outcome.result()?;
    title
        .and_then(|t| result.find_listed(t, limit))
        .or_else(|| result.head(limit).first().copied())
}

/// Final stage: summarize the selected abstract if the user asked for it.
/// Returns `None` when no summary was requested or nothing is selected.
pub async fn summarize_selection(
    snapshot: &DashboardSnapshot<'_>,
    interaction: &Interaction,
    summarizer: &SummarizerCache,
    bounds: (usize, usize),
) -> Option<Result<String>> {
    if !interaction.summarize {
        return None;
    }
    let record = snapshot.selection?;
    Some(
        summarizer
            .summarize(&record.abstract_text, bounds.0, bounds.1)
            .await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::summarize::{ModelConfig, Summarizer};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn record(title: &str, abstract_text: &str, year: i32, journal: &str) -> Record {
        Record {
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            published_year: year,
            journal: Some(journal.to_string()),
            source: "test".to_string(),
        }
    }

    fn scenario() -> Dataset {
        Dataset::new(vec![
            record("A", "Study on vaccine efficacy", 2020, "J1"),
            record("B", "Transmission dynamics", 2021, "J2"),
            record("C", "VACCINE trial results", 2020, "J1"),
        ])
    }

    struct FirstWord;

    #[async_trait]
    impl Summarizer for FirstWord {
        async fn summarize(&self, text: &str, _min: usize, _max: usize) -> Result<String> {
            Ok(text.split_whitespace().next().unwrap_or_default().to_string())
        }
    }

    fn first_word_cache() -> SummarizerCache {
        SummarizerCache::with_initializer(ModelConfig::default(), |_| {
            Ok(Arc::new(FirstWord) as Arc<dyn Summarizer>)
        })
    }

    #[test]
    fn test_defaults_select_everything_in_small_dataset() {
        let ds = scenario();
        let snap = run(&ds, &Interaction::default(), &PipelineOptions::default());
        assert_eq!(snap.total(), 3);
        assert_eq!(snap.year_range, Some((2020, 2021)));
        assert_eq!(
            snap.year_counts,
            vec![
                YearCount { year: 2020, count: 2 },
                YearCount { year: 2021, count: 1 },
            ]
        );
        assert_eq!(snap.search, SearchOutcome::NotSearched);
        assert!(snap.selection.is_none());
    }

    #[test]
    fn test_explicit_filter_then_search() {
        let ds = scenario();
        let interaction = Interaction {
            filter: FilterSelection::Explicit(FilterSpec::new([2020], ["J1"])),
            keyword: Some("Vaccine".into()),
            ..Default::default()
        };
        let snap = run(&ds, &interaction, &PipelineOptions::default());
        assert_eq!(snap.total(), 2);
        let result = snap.search.result().unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(result.keyword, "vaccine");
        assert_eq!(snap.selection.map(|r| r.title.as_str()), Some("A"));
    }

    #[test]
    fn test_explicit_empty_filter_is_empty() {
        let ds = scenario();
        let interaction = Interaction {
            filter: FilterSelection::Explicit(FilterSpec::default()),
            keyword: Some("vaccine".into()),
            ..Default::default()
        };
        let snap = run(&ds, &interaction, &PipelineOptions::default());
        assert_eq!(snap.total(), 0);
        assert_eq!(snap.year_range, None);
        assert!(snap.top_journals.is_empty());
        assert_eq!(snap.search.result().unwrap().count, 0);
        assert!(snap.selection.is_none());
    }

    #[test]
    fn test_selection_by_title_and_fallback() {
        let ds = scenario();
        let mut interaction = Interaction {
            keyword: Some("vaccine".into()),
            selected_title: Some("C".into()),
            ..Default::default()
        };
        let snap = run(&ds, &interaction, &PipelineOptions::default());
        assert_eq!(snap.selection.map(|r| r.title.as_str()), Some("C"));

        interaction.selected_title = Some("Not in results".into());
        let snap = run(&ds, &interaction, &PipelineOptions::default());
        assert_eq!(snap.selection.map(|r| r.title.as_str()), Some("A"));
    }

    #[test]
    fn test_selection_past_result_limit_falls_back() {
        let ds = Dataset::new(
            (0..25)
                .map(|i| record(&format!("P{}", i), "vaccine study", 2020, "J1"))
                .collect(),
        );
        let options = PipelineOptions::default();
        let mut interaction = Interaction {
            keyword: Some("vaccine".into()),
            selected_title: Some("P22".into()),
            ..Default::default()
        };
        let snap = run(&ds, &interaction, &options);
        assert_eq!(snap.search.result().unwrap().count, 25);
        assert_eq!(snap.selection.map(|r| r.title.as_str()), Some("P0"));

        interaction.selected_title = Some("P19".into());
        let snap = run(&ds, &interaction, &options);
        assert_eq!(snap.selection.map(|r| r.title.as_str()), Some("P19"));
    }

    #[tokio::test]
    async fn test_summarize_stage_runs_only_on_trigger() {
        let ds = scenario();
        let cache = first_word_cache();
        let mut interaction = Interaction {
            keyword: Some("trial".into()),
            ..Default::default()
        };

        let snap = run(&ds, &interaction, &PipelineOptions::default());
        assert!(summarize_selection(&snap, &interaction, &cache, (30, 130)).await.is_none());
        assert!(!cache.is_initialized());

        interaction.summarize = true;
        let snap = run(&ds, &interaction, &PipelineOptions::default());
        let summary = summarize_selection(&snap, &interaction, &cache, (30, 130))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(summary, "VACCINE");
    }

    #[tokio::test]
    async fn test_summarize_stage_surfaces_invalid_bounds() {
        let ds = scenario();
        let cache = first_word_cache();
        let interaction = Interaction {
            keyword: Some("trial".into()),
            summarize: true,
            ..Default::default()
        };
        let snap = run(&ds, &interaction, &PipelineOptions::default());
        let outcome = summarize_selection(&snap, &interaction, &cache, (50, 10)).await;
        assert!(matches!(outcome, Some(Err(DashboardError::InvalidRequest(_)))));
    }
}
