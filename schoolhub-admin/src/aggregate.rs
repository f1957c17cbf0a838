//! Summary arithmetic for reports. Pure functions, no state.
//!
//! Empty input yields `0.0` everywhere, so no NaN ever reaches a report.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Arithmetic mean; `0.0` for no scores.
pub fn average(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Percentage of scores at or above `threshold`; `0.0` for no scores.
pub fn pass_rate(scores: &[f64], threshold: f64) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let passed = scores.iter().filter(|s| **s >= threshold).count();
    100.0 * passed as f64 / scores.len() as f64
}

/// Saturates instead of overflowing.
pub fn net_change(added: i64, lost: i64) -> i64 {
    added.saturating_sub(lost)
}

/// One-decimal rounding for display: `floor(10x + 0.5) / 10`.
pub fn round_1dp(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

fn as_i64(v: Option<&Value>) -> Option<i64> {
    match v? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSummaryRow {
    pub year: i64,
    pub count: usize,
    pub average: f64,
    pub pass_rate: f64,
    /// `average` rounded with [`round_1dp`].
    pub average_display: f64,
    pub pass_rate_display: f64,
}

/// Exam results grouped by year, ascending. Records without a numeric
/// year or score are skipped.
pub fn exam_summary(records: &[Value], pass_mark: f64) -> Vec<ExamSummaryRow> {
    let mut by_year: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for r in records {
        if let (Some(year), Some(score)) = (as_i64(r.get("year")), as_f64(r.get("score"))) {
            by_year.entry(year).or_default().push(score);
        }
    }

    by_year
        .into_iter()
        .map(|(year, scores)| {
            let average = average(&scores);
            let pass_rate = pass_rate(&scores, pass_mark);
            ExamSummaryRow {
                year,
                count: scores.len(),
                average,
                pass_rate,
                average_display: round_1dp(average),
                pass_rate_display: round_1dp(pass_rate),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub category: String,
    pub added: i64,
    pub lost: i64,
    pub net: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub categories: Vec<CategoryTotals>,
    pub total_added: i64,
    pub total_lost: i64,
    pub net: i64,
}

/// Added/lost/net per category (name order) plus overall totals. Sums
/// saturate at `i64::MAX`.
pub fn inventory_summary(items: &[Value]) -> InventorySummary {
    let mut by_category: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for item in items {
        let category = item
            .get("category")
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("Uncategorised");
        let added = as_i64(item.get("quantityAdded")).unwrap_or(0);
        let lost = as_i64(item.get("quantityLost")).unwrap_or(0);

        let entry = by_category.entry(category.to_string()).or_default();
        entry.0 = entry.0.saturating_add(added);
        entry.1 = entry.1.saturating_add(lost);
    }

    let mut summary = InventorySummary::default();
    for (category, (added, lost)) in by_category {
        summary.total_added = summary.total_added.saturating_add(added);
        summary.total_lost = summary.total_lost.saturating_add(lost);
        summary.categories.push(CategoryTotals {
            category,
            added,
            lost,
            net: net_change(added, lost),
        });
    }
    summary.net = net_change(summary.total_added, summary.total_lost);
    summary
}
