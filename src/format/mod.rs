//! Output formatting for comparison reports (table, JSON, markdown, CSV).

use crate::compare::{Report, ReportRow};
use crate::config::OutputFormat;
use crate::fx::{CurrencyPair, ExchangeRate};
use serde_json::json;

/// Formats reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a full comparison report.
    pub fn format_report(&self, report: &Report) -> String {
        if report.is_empty() {
            return match self.format {
                OutputFormat::Json => self.json_report(report),
                OutputFormat::Csv => self.csv_header(report),
                _ => "No hotels compared.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_report(report),
            OutputFormat::Table => self.table_report(report),
            OutputFormat::Markdown => self.markdown_report(report),
            OutputFormat::Csv => self.csv_report(report),
        }
    }

    /// Formats a single exchange rate.
    pub fn format_rate(&self, pair: &CurrencyPair, rate: &ExchangeRate) -> String {
        let source = if rate.is_fallback { "fallback" } else { "live" };

        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "source_currency": pair.source,
                    "target_currency": pair.target,
                    "rate": rate.rate,
                    "fallback": rate.is_fallback,
                });
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Csv => {
                format!(
                    "source_currency,target_currency,rate,fallback\n{},{},{},{}",
                    pair.source, pair.target, rate.rate, rate.is_fallback
                )
            }
            OutputFormat::Markdown => {
                format!("**1 {} = {} {}** *({})*", pair.source, rate.rate, pair.target, source)
            }
            OutputFormat::Table => {
                format!("1 {} = {} {} ({})", pair.source, rate.rate, pair.target, source)
            }
        }
    }

    // JSON formatting

    fn json_report(&self, report: &Report) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    // Table formatting

    fn table_report(&self, report: &Report) -> String {
        let name_width = 40;
        let price_width = 14;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<name_width$}  {:>price_width$}  {:>price_width$}  {}",
            "Hotel",
            format!("Price ({})", report.source_currency),
            format!("Price ({})", report.target_currency),
            "Status"
        ));
        lines.push(format!(
            "{:-<name_width$}  {:-<price_width$}  {:-<price_width$}  {:-<16}",
            "", "", "", ""
        ));

        for row in &report.rows {
            lines.push(format!(
                "{:<name_width$}  {:>price_width$}  {:>price_width$}  {}",
                truncate(&row.entity_name, name_width),
                row.price_source,
                row.price_target,
                row.status_label
            ));
        }

        lines.push(String::new());
        match &report.best {
            Some(best) => lines.push(format!(
                "Best price: {} at {} ({})",
                best.entity_name, best.price_source, best.price_target
            )),
            None => lines.push("No prices available.".to_string()),
        }
        lines.push(format!("{} of {} hotels priced", report.available_count(), report.rows.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_report(&self, report: &Report) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "| Hotel | Price ({}) | Price ({}) | Status |",
            report.source_currency, report.target_currency
        ));
        lines.push("|-------|-------|-------|--------|".to_string());

        for row in &report.rows {
            let name = if is_best(report, row) {
                format!("**{}**", row.entity_name)
            } else {
                row.entity_name.clone()
            };
            lines.push(format!(
                "| {} | {} | {} | {} |",
                name, row.price_source, row.price_target, row.status_label
            ));
        }

        lines.push(String::new());
        match &report.best {
            Some(best) => lines.push(format!(
                "*Best price: {} at {} ({})*",
                best.entity_name, best.price_source, best.price_target
            )),
            None => lines.push("*No prices available*".to_string()),
        }

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self, report: &Report) -> String {
        format!(
            "hotel,price_{},price_{},status,best",
            report.source_currency.to_lowercase(),
            report.target_currency.to_lowercase()
        )
    }

    fn csv_report(&self, report: &Report) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header(report));

        for row in &report.rows {
            lines.push(format!(
                "{},{},{},{},{}",
                Self::csv_escape(&row.entity_name),
                Self::csv_escape(&row.price_source),
                Self::csv_escape(&row.price_target),
                row.status_label,
                is_best(report, row)
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn is_best(report: &Report, row: &ReportRow) -> bool {
    report.best.as_ref() == Some(row)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
