//! Console and JSON rendering of plans and results.

use serde::Serialize;

use crate::pipeline::{ExecutionResult, Hit, SearchPlan};
use crate::space::SpaceIndex;

/// Format an integer with `,` thousands separators.
pub fn group_digits(n: impl Into<u128>) -> String {
    let digits = n.into().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Hits sorted by descending score, capped at `max_hits` (0 = all).
///
/// Equal scores keep index order so output is stable across runs.
pub fn top_hits(hits: &[Hit], max_hits: usize) -> Vec<&Hit> {
    let mut sorted: Vec<&Hit> = hits.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    if max_hits > 0 {
        sorted.truncate(max_hits);
    }
    sorted
}

/// `"<score> meta=<mapping>"`, score to 3 decimals.
pub fn format_hit(hit: &Hit) -> String {
    format!("{:.3} meta={}", hit.score, hit.metadata)
}

/// `"[done] attempts=A hits=H time=T.TTs"`.
pub fn format_summary(result: &ExecutionResult) -> String {
    format!(
        "[done] attempts={} hits={} time={:.2}s",
        group_digits(result.attempts),
        result.hits.len(),
        result.elapsed.as_secs_f64()
    )
}

/// Pipeline, key count, axis sizes and tuple estimate, one line each.
pub fn format_plan(plan: &SearchPlan) -> String {
    let mut lines = vec![
        format!("[pipeline] {}", plan.pipeline),
        format!("[keys] {}", group_digits(plan.key_count as u64)),
    ];
    if !plan.axes.is_empty() {
        let axes: Vec<String> = plan
            .axes
            .iter()
            .map(|a| format!("{}={}", a.name(), group_digits(a.cardinality as u64)))
            .collect();
        lines.push(format!("[axes] {}", axes.join(" ")));
    }
    lines.push(format!("[estimate] param_tuples={}", group_digits(plan.total)));
    lines.join("\n")
}

/// Hit lines followed by the summary line.
pub fn render_text(result: &ExecutionResult, max_hits: usize) -> String {
    let mut out = String::new();
    for hit in top_hits(&result.hits, max_hits) {
        out.push_str(&format_hit(hit));
        out.push('\n');
    }
    out.push_str(&format_summary(result));
    out
}

/// Machine-readable run summary.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub plan: &'a SearchPlan,
    pub attempts: SpaceIndex,
    pub hit_count: usize,
    pub hits: Vec<&'a Hit>,
    pub elapsed_secs: f64,
    pub stopped_early: bool,
}

impl<'a> JsonReport<'a> {
    pub fn new(plan: &'a SearchPlan, result: &'a ExecutionResult, max_hits: usize) -> Self {
        Self {
            plan,
            attempts: result.attempts,
            hit_count: result.hits.len(),
            hits: top_hits(&result.hits, max_hits),
            elapsed_secs: result.elapsed.as_secs_f64(),
            stopped_early: result.stopped_early,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
