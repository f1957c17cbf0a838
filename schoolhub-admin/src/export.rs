//! CSV export and print views for record lists.

use std::fmt;

use chrono::NaiveDate;
use serde_json::Value;

use crate::kinds::RecordKind;

/// One exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            // f64 Display already drops the fraction of integral values.
            Cell::Number(n) if n.is_finite() => write!(f, "{n}"),
            Cell::Number(_) => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

fn csv_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn push_record<I, S>(out: &mut String, cells: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let line = cells
        .into_iter()
        .map(|c| csv_quote(c.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push('\n');
}

/// Every cell is quoted and embedded quotes are doubled; each row ends
/// with `\n`.
pub fn to_csv(headers: &[&str], rows: &[Vec<Cell>]) -> String {
    let mut out = String::new();
    push_record(&mut out, headers);
    for row in rows {
        push_record(&mut out, row.iter().map(|c| c.to_string()));
    }
    out
}

/// `{record_type}_{YYYY-MM-DD}.csv`
pub fn export_filename(record_type: &str, date: NaiveDate) -> String {
    format!("{record_type}_{}.csv", date.format("%Y-%m-%d"))
}

fn cell_for(value: Option<&Value>) -> Cell {
    match value {
        None | Some(Value::Null) => Cell::Text(String::new()),
        Some(Value::String(s)) => Cell::Text(s.clone()),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Cell::Number)
            .unwrap_or_else(|| Cell::Text(n.to_string())),
        Some(Value::Bool(b)) => Cell::from(if *b { "Yes" } else { "No" }),
        Some(other) => Cell::Text(other.to_string()),
    }
}

/// Project records onto the kind's export columns.
pub fn records_to_rows(kind: &RecordKind, records: &[Value]) -> Vec<Vec<Cell>> {
    records
        .iter()
        .map(|r| kind.columns.iter().map(|c| cell_for(r.get(c.field))).collect())
        .collect()
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// HTML page for the browser's print dialog. Only the table is marked
/// print-visible; controls carry `no-print`.
pub fn print_view(title: &str, headers: &[&str], rows: &[Vec<Cell>]) -> String {
    let title = html_escape(title);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n"));
    html.push_str("<style>@media print { .no-print { display: none !important; } }</style>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str("<div class=\"no-print\">");
    html.push_str("<button type=\"button\" onclick=\"window.print()\">Print</button>");
    html.push_str("</div>\n");
    html.push_str(&format!("<h1>{title}</h1>\n"));
    html.push_str("<table data-print=\"visible\">\n<thead><tr>");
    for h in headers {
        html.push_str(&format!("<th>{}</th>", html_escape(h)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", html_escape(&cell.to_string())));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}
