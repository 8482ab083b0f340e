//! Tests for metadata loading and cleaning.

use super::*;
use std::io::Cursor;

fn load_str(csv: &str) -> Result<(Dataset, LoadStats)> {
    load_from_reader(Cursor::new(csv.as_bytes().to_vec()), Path::new("inline.csv"))
}

/// Write a fixture to a unique temp file; the caller removes it.
fn write_temp_csv(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "cord19-dashboard-{}-{}.csv",
        name,
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

const SAMPLE: &str = "\
cord_uid,source_x,title,doi,abstract,publish_time,authors,journal
a1,PMC,Vaccine study,10.1/x,Study on vaccine efficacy,2020-03-15,Smith,J1
a2,Elsevier,,10.1/y,Abstract without title,2020-04-01,Jones,J2
a3,Medline,No abstract,10.1/z,,2021-01-01,Lee,J1
a4,WHO,Bad date,10.1/w,Some abstract,not a date,Kim,J3
a5,PMC,Transmission,10.1/v,Transmission dynamics,2021,Park,
";

// ============================================================================
// Row Cleaning
// ============================================================================

#[test]
fn test_drops_rows_missing_title_or_abstract() {
    let (dataset, stats) = load_str(SAMPLE).unwrap();
    assert_eq!(stats.rows_read, 5);
    assert_eq!(stats.dropped_incomplete, 2);
    assert_eq!(stats.dropped_undated, 1);
    assert_eq!(stats.kept, 2);

    let titles: Vec<&str> = dataset.records().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Vaccine study", "Transmission"]);
}

#[test]
fn test_projects_fields() {
    let (dataset, _) = load_str(SAMPLE).unwrap();
    let first = &dataset.records()[0];
    assert_eq!(first.abstract_text, "Study on vaccine efficacy");
    assert_eq!(first.published_year, 2020);
    assert_eq!(first.journal.as_deref(), Some("J1"));
    assert_eq!(first.source, "PMC");
}

#[test]
fn test_blank_journal_is_absent() {
    let (dataset, _) = load_str(SAMPLE).unwrap();
    assert_eq!(dataset.records()[1].journal, None);
    assert_eq!(dataset.records()[1].published_year, 2021);
}

#[test]
fn test_whitespace_only_title_counts_as_missing() {
    let csv = "title,abstract,publish_time,journal,source_x\n   ,text,2020,J,S\nT,text,2020,J,S\n";
    let (dataset, stats) = load_str(csv).unwrap();
    assert_eq!(stats.dropped_incomplete, 1);
    assert_eq!(dataset.len(), 1);
}

#[test]
fn test_quoted_fields_with_commas_and_newlines() {
    let csv = "title,abstract,publish_time,journal,source_x\n\"A, B\",\"line one\nline two\",2020-05-01,\"J, Inc\",S\n";
    let (dataset, _) = load_str(csv).unwrap();
    let r = &dataset.records()[0];
    assert_eq!(r.title, "A, B");
    assert_eq!(r.abstract_text, "line one\nline two");
    assert_eq!(r.journal.as_deref(), Some("J, Inc"));
}

#[test]
fn test_ragged_rows_are_tolerated() {
    let csv = "title,abstract,publish_time,journal,source_x\nT,text,2020\nU,more,2021,J,S,extra\n";
    let (dataset, _) = load_str(csv).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.records()[0].journal, None);
    assert_eq!(dataset.records()[0].source, "");
}

#[test]
fn test_optional_columns_may_be_missing() {
    let csv = "title,abstract,publish_time\nT,text,2020-01-01\n";
    let (dataset, _) = load_str(csv).unwrap();
    assert_eq!(dataset.records()[0].journal, None);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_required_column_is_source_unavailable() {
    let csv = "title,publish_time\nT,2020\n";
    assert!(matches!(
        load_str(csv),
        Err(DashboardError::SourceUnavailable { .. })
    ));
}

#[test]
fn test_zero_surviving_rows_is_empty_result() {
    let csv = "title,abstract,publish_time,journal,source_x\n,x,2020,J,S\nT,x,never,J,S\n";
    assert!(matches!(load_str(csv), Err(DashboardError::EmptyResult)));
}

#[test]
fn test_missing_file_is_source_unavailable() {
    let err = load(Path::new("/nonexistent/metadata.csv")).unwrap_err();
    assert!(matches!(err, DashboardError::SourceUnavailable { .. }));
}

// ============================================================================
// Year Parsing
// ============================================================================

#[test]
fn test_parse_year_formats() {
    assert_eq!(parse_year("2020-03-15"), Some(2020));
    assert_eq!(parse_year("2019"), Some(2019));
    assert_eq!(parse_year("2020-07"), Some(2020));
    assert_eq!(parse_year("2021-02-03 10:11:12"), Some(2021));
    assert_eq!(parse_year("2020-12-31T23:59:59Z"), Some(2020));
    assert_eq!(parse_year("2004 Mar 15"), Some(2004));
    assert_eq!(parse_year("2004 Mar"), Some(2004));
    assert_eq!(parse_year(" 2018-01-01 "), Some(2018));
}

#[test]
fn test_parse_year_rejects_garbage() {
    assert_eq!(parse_year(""), None);
    assert_eq!(parse_year("unknown"), None);
    assert_eq!(parse_year("20"), None);
    assert_eq!(parse_year("2020-13-45"), None);
}

// ============================================================================
// Session Cache
// ============================================================================

#[test]
fn test_cache_reads_source_once() {
    let path = write_temp_csv("cache", "title,abstract,publish_time,journal,source_x\nT,text,2020,J,S\n");
    let cache = DatasetCache::new(&path);
    assert!(!cache.is_loaded());

    let first = cache.get_or_load().unwrap();
    std::fs::remove_file(&path).unwrap();

    // The file is gone; a second call must not touch the disk.
    let second = cache.get_or_load().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 1);
}

#[test]
fn test_cache_turns_empty_result_into_empty_dataset() {
    let path = write_temp_csv("empty", "title,abstract,publish_time,journal,source_x\n");
    let cache = DatasetCache::new(&path);
    let dataset = cache.get_or_load().unwrap();
    std::fs::remove_file(&path).unwrap();
    assert!(dataset.is_empty());
    assert!(cache.is_loaded());
}

#[test]
fn test_cache_does_not_memoize_unavailable_source() {
    let cache = DatasetCache::new("/nonexistent/metadata.csv");
    assert!(cache.get_or_load().is_err());
    assert!(!cache.is_loaded());
}
