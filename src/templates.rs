//! HTML templates and styling.
//!
//! The page is a single form: filter checkboxes, the keyword box and the
//! paper selector all submit together, so every request carries the whole
//! interaction. Charts are inline SVG and the word cloud is a weighted list
//! of terms.

use crate::export::export_filename;
use crate::models::{FilterSpec, JournalCount, SearchResult, TermCount, YearCount};
use crate::pipeline::{DashboardSnapshot, PipelineOptions};

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base01: #586e75;
    --base00: #657b83;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --yellow: #b58900;
    --orange: #cb4b16;
    --red: #dc322f;
    --blue: #268bd2;
    --cyan: #2aa198;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --link: var(--blue);
    --accent: var(--base2);
    --bar: #00b4d8;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--cyan); text-decoration: underline; }

h1, h2 { font-weight: 600; margin-top: 1.2em; margin-bottom: 0.5em; }
h1 { font-size: 1.6rem; }
h2 { font-size: 1.2rem; border-top: 1px solid var(--border); padding-top: 1rem; }

.layout { display: flex; gap: 1.5rem; max-width: 1200px; margin: 0 auto; padding: 1rem; }

.sidebar {
    width: 260px;
    flex-shrink: 0;
    border-right: 1px solid var(--border);
    padding-right: 1rem;
}
.sidebar fieldset { border: none; margin-bottom: 1rem; }
.sidebar legend { font-weight: 600; margin-bottom: 0.25rem; }
.sidebar .options { max-height: 260px; overflow-y: auto; font-size: 0.85rem; }
.sidebar label { display: block; }

.main { flex: 1; min-width: 0; }
.subtitle { color: var(--base01); }

.stat { margin: 0.25rem 0; }
.no-data { color: var(--muted); font-style: italic; }

.chart { width: 100%; max-width: 820px; height: auto; background: white; border: 1px solid var(--border); }
.chart text { font-size: 11px; fill: var(--base01); }
.chart .bar { fill: var(--bar); }

.cloud { background: white; border: 1px solid var(--border); padding: 1rem; line-height: 2.2; }
.cloud span { margin: 0 0.4rem; white-space: nowrap; }

.search-box { display: flex; gap: 0.5rem; margin: 0.5rem 0; }
.search-box input[type=text] {
    flex: 1;
    padding: 0.4rem 0.75rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: white;
    color: var(--fg);
}

button, .button {
    padding: 0.4rem 0.9rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--accent);
    color: var(--fg);
    cursor: pointer;
    font-family: inherit;
    font-size: 0.9rem;
}

table.results { border-collapse: collapse; width: 100%; font-size: 0.9rem; margin: 0.5rem 0; }
table.results th, table.results td { border-bottom: 1px solid var(--border); padding: 0.3rem 0.5rem; text-align: left; }

select { max-width: 100%; padding: 0.3rem; }

.abstract, .summary { background: white; border: 1px solid var(--border); padding: 0.75rem; margin: 0.5rem 0; }
.success { color: var(--green); }
.error { color: var(--red); }
.footer { color: var(--muted); font-size: 0.8rem; margin-top: 2rem; }
"#;

// ============================================================================
// Helpers
// ============================================================================

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Query string that reproduces the current filter and keyword.
pub fn state_query(filter: &FilterSpec, keyword: &str) -> String {
    let mut years: Vec<i32> = filter.years.iter().copied().collect();
    years.sort_unstable();
    let mut journals: Vec<&String> = filter.journals.iter().collect();
    journals.sort();

    let mut parts = vec!["filtered=1".to_string()];
    parts.extend(years.iter().map(|y| format!("year={}", y)));
    parts.extend(journals.iter().map(|j| format!("journal={}", urlencoding::encode(j))));
    parts.push(format!("q={}", urlencoding::encode(keyword)));
    parts.join("&")
}

pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    {content}
</body>
</html>"#,
        title = html_escape(title),
    )
}

// ============================================================================
// Charts
// ============================================================================

const CHART_WIDTH: usize = 800;

/// Vertical bars, one per year.
pub fn year_chart_svg(counts: &[YearCount]) -> String {
    if counts.is_empty() {
        return r#"<p class="no-data">No papers in the current selection.</p>"#.to_string();
    }

    let (height, top, bottom, left) = (300usize, 20usize, 30usize, 40usize);
    let plot_h = height - top - bottom;
    let plot_w = CHART_WIDTH - left - 10;
    let max = counts.iter().map(|c| c.count).max().unwrap_or(1).max(1);
    let slot = (plot_w / counts.len()).max(1);
    let bar_w = (slot * 4 / 5).max(1);

    let mut bars = String::new();
    for (i, c) in counts.iter().enumerate() {
        let h = c.count * plot_h / max;
        let x = left + i * slot + (slot - bar_w) / 2;
        let y = top + plot_h - h;
        let cx = x + bar_w / 2;
        bars.push_str(&format!(
            r#"<rect class="bar" x="{x}" y="{y}" width="{bar_w}" height="{h}"><title>{year}: {count}</title></rect>
<text x="{cx}" y="{label_y}" text-anchor="middle">{year}</text>
<text x="{cx}" y="{count_y}" text-anchor="middle">{count}</text>
"#,
            year = c.year,
            count = c.count,
            label_y = top + plot_h + 16,
            count_y = y.saturating_sub(4).max(10),
        ));
    }

    format!(
        r#"<svg class="chart" viewBox="0 0 {w} {height}" role="img" aria-label="Papers per year">
<line x1="{left}" y1="{base}" x2="{right}" y2="{base}" stroke="currentColor" />
{bars}</svg>"#,
        w = CHART_WIDTH,
        base = top + plot_h,
        right = CHART_WIDTH - 10,
    )
}

/// Horizontal bars, one per journal, largest first.
pub fn journal_chart_svg(counts: &[JournalCount]) -> String {
    if counts.is_empty() {
        return r#"<p class="no-data">No journals in the current selection.</p>"#.to_string();
    }

    let (row_h, label_w, pad) = (26usize, 280usize, 10usize);
    let height = counts.len() * row_h + pad * 2;
    let plot_w = CHART_WIDTH - label_w - 60;
    let max = counts.iter().map(|c| c.count).max().unwrap_or(1).max(1);

    let mut rows = String::new();
    for (i, c) in counts.iter().enumerate() {
        let y = pad + i * row_h;
        let w = (c.count * plot_w / max).max(1);
        let label: String = if c.journal.chars().count() > 40 {
            format!("{}…", c.journal.chars().take(39).collect::<String>())
        } else {
            c.journal.clone()
        };
        rows.push_str(&format!(
            r#"<text x="{lx}" y="{ty}" text-anchor="end">{label}</text>
<rect class="bar" x="{label_w}" y="{y}" width="{w}" height="{bh}"><title>{full}: {count}</title></rect>
<text x="{cx}" y="{ty}">{count}</text>
"#,
            lx = label_w - 6,
            ty = y + row_h / 2 + 4,
            label = html_escape(&label),
            full = html_escape(&c.journal),
            bh = row_h - 6,
            cx = label_w + w + 4,
            count = c.count,
        ));
    }

    format!(
        r#"<svg class="chart" viewBox="0 0 {w} {height}" role="img" aria-label="Top journals">
{rows}</svg>"#,
        w = CHART_WIDTH,
    )
}

/// Terms sized linearly between 0.8rem and 2.8rem by frequency.
pub fn term_cloud_html(terms: &[TermCount]) -> String {
    if terms.is_empty() {
        return r#"<p class="no-data">No abstract text to show.</p>"#.to_string();
    }

    let max = terms.iter().map(|t| t.count).max().unwrap_or(1);
    let min = terms.iter().map(|t| t.count).min().unwrap_or(1);
    let spread = (max - min).max(1) as f64;

    // Alphabetical placement so the biggest words don't all cluster up front.
    let mut placed: Vec<&TermCount> = terms.iter().collect();
    placed.sort_by(|a, b| a.term.cmp(&b.term));

    let mut html = String::from(r#"<div class="cloud">"#);
    for t in placed {
        let size = 0.8 + 2.0 * (t.count - min) as f64 / spread;
        html.push_str(&format!(
            r#"<span style="font-size: {:.2}rem" title="{}">{}</span>"#,
            size,
            t.count,
            html_escape(&t.term)
        ));
    }
    html.push_str("</div>");
    html
}

// ============================================================================
// Dashboard Page
// ============================================================================

fn render_filters(snapshot: &DashboardSnapshot) -> String {
    let mut html = String::from(
        r#"<input type="hidden" name="filtered" value="1">
<fieldset><legend>Publication years</legend><div class="options">"#,
    );
    for year in &snapshot.available_years {
        let checked = if snapshot.filter.years.contains(year) { " checked" } else { "" };
        html.push_str(&format!(
            r#"<label><input type="checkbox" name="year" value="{year}"{checked}> {year}</label>"#
        ));
    }
    html.push_str(r#"</div></fieldset><fieldset><legend>Journals</legend><div class="options">"#);
    for journal in &snapshot.available_journals {
        let checked = if snapshot.filter.journals.contains(journal) { " checked" } else { "" };
        html.push_str(&format!(
            r#"<label><input type="checkbox" name="journal" value="{v}"{checked}> {v}</label>"#,
            v = html_escape(journal),
        ));
    }
    html.push_str(r#"</div></fieldset><button type="submit">Apply filters</button>"#);
    html
}

fn render_overview(snapshot: &DashboardSnapshot) -> String {
    let range = match snapshot.year_range {
        Some((lo, hi)) => format!("{} – {}", lo, hi),
        None => r#"<span class="no-data">no data</span>"#.to_string(),
    };
    format!(
        r#"<h2>Dataset Overview</h2>
<p class="stat"><strong>Total Papers:</strong> {}</p>
<p class="stat"><strong>Filtered Range:</strong> {}</p>"#,
        snapshot.total(),
        range
    )
}

fn render_results_table(result: &SearchResult, limit: usize) -> String {
    let mut html = String::from(
        r#"<table class="results"><thead><tr><th>Title</th><th>Journal</th><th>Year</th></tr></thead><tbody>"#,
    );
    for record in result.head(limit) {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            html_escape(&record.title),
            html_escape(record.journal.as_deref().unwrap_or("")),
            record.published_year
        ));
    }
    html.push_str("</tbody></table>");
    html
}

fn render_summary_section(
    snapshot: &DashboardSnapshot,
    result: &SearchResult,
    summary: Option<&Result<String, String>>,
    limit: usize,
) -> String {
    let Some(selected) = snapshot.selection else {
        return String::new();
    };

    let mut options = String::new();
    for record in result.head(limit) {
        let sel = if std::ptr::eq(*record, selected) { " selected" } else { "" };
        options.push_str(&format!(
            r#"<option value="{t}"{sel}>{t}</option>"#,
            t = html_escape(&record.title)
        ));
    }

    let summary_html = match summary {
        None => String::new(),
        Some(Ok(text)) => format!(
            r#"<p class="success">Summary generated successfully!</p>
<div class="summary"><strong>Summary:</strong><p>{}</p></div>"#,
            html_escape(text)
        ),
        Some(Err(message)) => format!(r#"<p class="error">{}</p>"#, html_escape(message)),
    };

    format!(
        r#"<h2>Summarize an Abstract</h2>
<label for="paper">Select a paper to summarize</label><br>
<select id="paper" name="paper">{options}</select>
<button type="submit">Show abstract</button>
<div class="abstract"><strong>Original Abstract:</strong><p>{abstract_text}</p></div>
<button type="submit" name="summarize" value="1">Generate Summary</button>
{summary_html}"#,
        abstract_text = html_escape(&selected.abstract_text),
    )
}

fn render_search(
    snapshot: &DashboardSnapshot,
    keyword: &str,
    summary: Option<&Result<String, String>>,
    limit: usize,
) -> String {
    let mut html = format!(
        r#"<h2>Search Papers by Keyword</h2>
<div class="search-box">
    <input type="text" name="q" value="{}" placeholder="Enter keyword (e.g. vaccine, transmission, mutation)">
    <button type="submit">Search</button>
</div>"#,
        html_escape(keyword)
    );

    let Some(result) = snapshot.search.result() else {
        return html;
    };

    html.push_str(&format!(
        "<p>Found <strong>{}</strong> matching papers.</p>",
        result.count
    ));
    html.push_str(&render_results_table(result, limit));
    html.push_str(&format!(
        r#"<p><a class="button" href="/export.csv?{}" download="{}">Download Results as CSV</a></p>"#,
        html_escape(&state_query(&snapshot.filter, keyword)),
        html_escape(&export_filename(&result.keyword)),
    ));
    html.push_str(&render_summary_section(snapshot, result, summary, limit));
    html
}

/// Full dashboard page for one interaction. `summary` is the outcome of the
/// summarize stage, already converted to a user-facing message on error.
pub fn render_dashboard(
    snapshot: &DashboardSnapshot,
    keyword: &str,
    summary: Option<&Result<String, String>>,
    options: &PipelineOptions,
) -> String {
    let content = format!(
        r#"<form method="get" action="/" class="layout">
<aside class="sidebar">
<h2>Filters</h2>
{filters}
</aside>
<main class="main">
<h1>CORD-19 Research Insights Dashboard</h1>
<p class="subtitle">Explore patterns and trends in COVID-19 research publications from the <strong>CORD-19 dataset</strong>.</p>
{overview}
<h2>Publications Over Time</h2>
{year_chart}
<h2>Top Journals Publishing COVID-19 Research</h2>
{journal_chart}
<h2>Common Research Terms in Abstracts</h2>
{cloud}
{search}
<p class="footer">CORD-19 research metadata dashboard</p>
</main>
</form>"#,
        filters = render_filters(snapshot),
        overview = render_overview(snapshot),
        year_chart = year_chart_svg(&snapshot.year_counts),
        journal_chart = journal_chart_svg(&snapshot.top_journals),
        cloud = term_cloud_html(&snapshot.terms),
        search = render_search(snapshot, keyword, summary, options.result_limit),
    );

    base_html("CORD-19 Research Dashboard", &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, Record};
    use crate::pipeline::{run, Interaction};

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Record {
                title: "A <b>bold</b> study".into(),
                abstract_text: "Study on vaccine efficacy".into(),
                published_year: 2020,
                journal: Some("J1".into()),
                source: "PMC".into(),
            },
            Record {
                title: "B".into(),
                abstract_text: "Transmission dynamics".into(),
                published_year: 2021,
                journal: Some("J&2".into()),
                source: "PMC".into(),
            },
        ])
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_state_query_is_sorted_and_encoded() {
        let spec = FilterSpec::new([2021, 2020], ["J&2", "J1"]);
        assert_eq!(
            state_query(&spec, "sars cov"),
            "filtered=1&year=2020&year=2021&journal=J%262&journal=J1&q=sars%20cov"
        );
    }

    #[test]
    fn test_page_without_search_has_no_results_section() {
        let ds = dataset();
        let snap = run(&ds, &Interaction::default(), &PipelineOptions::default());
        let html = render_dashboard(&snap, "", None, &PipelineOptions::default());
        assert!(html.contains("<strong>Total Papers:</strong> 2"));
        assert!(html.contains("2020 – 2021"));
        assert!(!html.contains("matching papers"));
        assert!(!html.contains("&lt;b&gt;bold"));
        assert!(html.contains(r#"value="J&amp;2" checked"#));
    }

    #[test]
    fn test_page_with_search_and_summary() {
        let ds = dataset();
        let interaction = Interaction {
            keyword: Some("vaccine".into()),
            ..Default::default()
        };
        let snap = run(&ds, &interaction, &PipelineOptions::default());
        let summary = Ok("Vaccines work.".to_string());
        let html = render_dashboard(&snap, "vaccine", Some(&summary), &PipelineOptions::default());
        assert!(html.contains("Found <strong>1</strong> matching papers."));
        assert!(html.contains("A &lt;b&gt;bold&lt;/b&gt; study"));
        assert!(html.contains("cord19_search_results_vaccine.csv"));
        assert!(html.contains("Vaccines work."));
    }

    #[test]
    fn test_summary_error_is_inline() {
        let ds = dataset();
        let interaction = Interaction {
            keyword: Some("vaccine".into()),
            ..Default::default()
        };
        let snap = run(&ds, &interaction, &PipelineOptions::default());
        let summary = Err("Summarization unavailable: offline".to_string());
        let html = render_dashboard(&snap, "vaccine", Some(&summary), &PipelineOptions::default());
        assert!(html.contains(r#"<p class="error">Summarization unavailable: offline</p>"#));
    }

    #[test]
    fn test_empty_view_renders_no_data() {
        let ds = Dataset::default();
        let snap = run(&ds, &Interaction::default(), &PipelineOptions::default());
        let html = render_dashboard(&snap, "", None, &PipelineOptions::default());
        assert!(html.contains("no data"));
        assert!(html.contains("No papers in the current selection."));
    }

    #[test]
    fn test_year_chart_has_one_bar_per_year() {
        let svg = year_chart_svg(&[
            YearCount { year: 2019, count: 1 },
            YearCount { year: 2020, count: 4 },
        ]);
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains(">2019<") && svg.contains(">2020<"));
    }

    #[test]
    fn test_term_cloud_scales_font() {
        let html = term_cloud_html(&[
            TermCount { term: "vaccine".into(), count: 10 },
            TermCount { term: "virus".into(), count: 1 },
        ]);
        assert!(html.contains(r#"font-size: 2.80rem" title="10">vaccine"#));
        assert!(html.contains(r#"font-size: 0.80rem" title="1">virus"#));
    }
}
