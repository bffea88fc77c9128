use std::fmt;

use chrono::{Datelike, Months, NaiveDate};

use crate::error::StoreError;

/// Canonical (uppercase, market-suffixed) ticker identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickerSymbol(String);

impl TickerSymbol {
    /// Normalise user input: trim, uppercase, append `suffix` when it is missing.
    pub fn parse(raw: &str, suffix: &str) -> Result<Self, StoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(StoreError::InvalidSymbol(raw.to_string()));
        }

        let upper = trimmed.to_uppercase();
        let suffix = suffix.to_uppercase();
        if upper == suffix {
            return Err(StoreError::InvalidSymbol(raw.to_string()));
        }

        if suffix.is_empty() || upper.ends_with(&suffix) {
            Ok(Self(upper))
        } else {
            Ok(Self(format!("{upper}{suffix}")))
        }
    }

    /// Wrap an identifier that is already stored in canonical form.
    pub fn from_canonical(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Symbol without its market suffix, for human-facing tables.
    pub fn display_code(&self, suffix: &str) -> &str {
        let suffix = suffix.to_uppercase();
        if !suffix.is_empty() && self.0.len() > suffix.len() && self.0.ends_with(&suffix) {
            &self.0[..self.0.len() - suffix.len()]
        } else {
            &self.0
        }
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-negative amount of money captured once per batch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Budget(f64);

impl Budget {
    pub fn new(amount: f64) -> Option<Self> {
        if amount.is_finite() && amount >= 0.0 {
            Some(Self(amount))
        } else {
            None
        }
    }

    pub fn zero() -> Self {
        Self(0.0)
    }

    pub fn amount(self) -> f64 {
        self.0
    }
}

/// Inclusive `[start, end]` date range bounding the trailing dividend sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LookbackWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// `months` back from `today`, snapped to the first day of that month.
    pub fn trailing(today: NaiveDate, months: u32) -> Self {
        let back = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        let start = back.with_day(1).unwrap_or(back);
        Self::new(start, today)
    }

    /// Window starting on an explicit date and ending `today`.
    pub fn since(start: NaiveDate, today: NaiveDate) -> Self {
        Self::new(start, today)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    High,
    Medium,
    Low,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::High => "high",
            Category::Medium => "medium",
            Category::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    NoPrice,
    ProviderError,
    Timeout,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureReason::NoPrice => "no price available",
            FailureReason::ProviderError => "provider error",
            FailureReason::Timeout => "timed out",
        };
        f.write_str(text)
    }
}

/// Derived affordability figures for one successfully fetched ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerReport {
    pub symbol: TickerSymbol,
    pub price: f64,
    pub trailing_dividend_total: f64,
    pub shares_affordable: u64,
    pub projected_income: f64,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(TickerReport),
    Failure {
        symbol: TickerSymbol,
        reason: FailureReason,
    },
}

impl FetchOutcome {
    pub fn failure(symbol: TickerSymbol, reason: FailureReason) -> Self {
        FetchOutcome::Failure { symbol, reason }
    }

    pub fn symbol(&self) -> &TickerSymbol {
        match self {
            FetchOutcome::Success(report) => &report.symbol,
            FetchOutcome::Failure { symbol, .. } => symbol,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn report(&self) -> Option<&TickerReport> {
        match self {
            FetchOutcome::Success(report) => Some(report),
            FetchOutcome::Failure { .. } => None,
        }
    }
}
