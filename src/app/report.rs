use std::cmp::Ordering;
use std::io::Write;

use clap::ValueEnum;
use unicode_width::UnicodeWidthStr;

use crate::batch::{BatchEvents, BatchSession, Progress};
use crate::model::{FetchOutcome, TickerReport};

/// Column a finished report can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortColumn {
    Ticker,
    Price,
    Dividends,
    Shares,
    Income,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub descending: bool,
}

/// Writes batch progress as status lines, one per applied outcome.
pub struct ConsoleReporter<W: Write> {
    out: W,
    market_suffix: String,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, market_suffix: impl Into<String>) -> Self {
        Self {
            out,
            market_suffix: market_suffix.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl<W: Write> BatchEvents for ConsoleReporter<W> {
    fn on_batch_started(&mut self, total: usize) {
        self.line(&format!("Processing 0/{total} tickers..."));
    }

    fn on_outcome(&mut self, _index: usize, outcome: &FetchOutcome, progress: Progress) {
        let code = outcome.symbol().display_code(&self.market_suffix).to_string();
        let detail = match outcome {
            FetchOutcome::Success(report) => format!(
                "{code}: price {:.2}, {} shares",
                report.price, report.shares_affordable
            ),
            FetchOutcome::Failure { reason, .. } => format!("{code}: error ({reason})"),
        };
        self.line(&format!(
            "Processing {}/{} tickers... {}",
            progress.processed, progress.total, detail
        ));
    }

    fn on_batch_completed(&mut self, session: &BatchSession) {
        let failures = session
            .outcomes()
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .count();
        if failures == 0 {
            self.line("Done!");
        } else {
            self.line(&format!("Done! ({failures} failed)"));
        }
    }

    fn on_no_tickers(&mut self) {
        self.line("No tickers registered. Progress 0/0.");
    }
}

/// Order outcomes for display; failures always sort after successes.
pub fn sort_outcomes(outcomes: &mut [(usize, FetchOutcome)], order: SortSpec) {
    outcomes.sort_by(|(_, a), (_, b)| match (a.report(), b.report()) {
        (Some(a), Some(b)) => {
            let ordering = compare_reports(a, b, order.column);
            if order.descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.symbol().cmp(b.symbol()),
    });
}

fn compare_reports(a: &TickerReport, b: &TickerReport, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Ticker => a.symbol.cmp(&b.symbol),
        SortColumn::Price => a.price.total_cmp(&b.price),
        SortColumn::Dividends => a
            .trailing_dividend_total
            .total_cmp(&b.trailing_dividend_total),
        SortColumn::Shares => a.shares_affordable.cmp(&b.shares_affordable),
        SortColumn::Income => a.projected_income.total_cmp(&b.projected_income),
    }
}

/// Render outcomes as a bordered text table.
pub fn render_table(outcomes: &[(usize, FetchOutcome)], market_suffix: &str) -> String {
    let headers = ["Ticker", "Price", "Div. 12m", "Shares", "Income", "Tier"];

    let rows: Vec<Vec<String>> = outcomes
        .iter()
        .map(|(_, outcome)| {
            let code = outcome.symbol().display_code(market_suffix).to_string();
            match outcome {
                FetchOutcome::Success(report) => vec![
                    code,
                    format!("{:.2}", report.price),
                    format!("{:.4}", report.trailing_dividend_total),
                    report.shares_affordable.to_string(),
                    format!("{:.2}", report.projected_income),
                    report.category.label().to_string(),
                ],
                FetchOutcome::Failure { reason, .. } => vec![
                    code,
                    "Error".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    reason.to_string(),
                ],
            }
        })
        .collect();

    let all_rows: Vec<Vec<String>> = std::iter::once(headers.iter().map(|h| h.to_string()).collect())
        .chain(rows)
        .collect();

    let mut col_widths = vec![0; headers.len()];
    for row in &all_rows {
        for (i, cell) in row.iter().enumerate() {
            col_widths[i] = col_widths[i].max(cell.width());
        }
    }

    let border = format!(
        "+{}+",
        col_widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let mut table = String::new();
    table.push_str(&border);
    table.push('\n');
    for (row_idx, row) in all_rows.iter().enumerate() {
        let formatted = row
            .iter()
            .zip(&col_widths)
            .map(|(cell, width)| format!(" {}{} ", cell, " ".repeat(width - cell.width())))
            .collect::<Vec<_>>()
            .join("|");
        table.push_str(&format!("|{formatted}|\n"));
        if row_idx == 0 {
            table.push_str(&border);
            table.push('\n');
        }
    }
    table.push_str(&border);
    table.push('\n');
    table
}
