use crate::model::{Budget, Category, DividendEvent};

/// Number of most recent in-window payments that make up the trailing total.
pub const TRAILING_DIVIDEND_CAP: usize = 12;

/// Yield ratio (trailing dividends / price) above which a ticker is `High`.
pub const HIGH_YIELD_RATIO: f64 = 0.15;
/// Yield ratio above which a ticker is `Medium`.
pub const MEDIUM_YIELD_RATIO: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub trailing_dividend_total: f64,
    pub shares_affordable: u64,
    pub projected_income: f64,
    pub category: Category,
}

/// Derive affordability figures from a price, the in-window dividend series and a budget.
pub fn compute(price: f64, dividends_in_window: &[DividendEvent], budget: Budget) -> Metrics {
    let trailing_dividend_total = trailing_total(dividends_in_window);
    let shares_affordable = shares_affordable(price, budget);
    let projected_income = round_cents(shares_affordable as f64 * trailing_dividend_total);
    let category = categorize(price, trailing_dividend_total);

    Metrics {
        trailing_dividend_total,
        shares_affordable,
        projected_income,
        category,
    }
}

/// Sum of the latest `TRAILING_DIVIDEND_CAP` payments, by date.
///
/// Negative or non-finite amounts are not payments and never take a slot.
pub fn trailing_total(dividends: &[DividendEvent]) -> f64 {
    let mut ordered: Vec<&DividendEvent> = dividends
        .iter()
        .filter(|event| event.amount.is_finite() && event.amount >= 0.0)
        .collect();
    ordered.sort_by_key(|event| event.date);

    ordered
        .iter()
        .rev()
        .take(TRAILING_DIVIDEND_CAP)
        .map(|event| event.amount)
        .sum()
}

pub fn shares_affordable(price: f64, budget: Budget) -> u64 {
    let budget = budget.amount();
    if !(price.is_finite() && price > 0.0 && budget > 0.0) {
        return 0;
    }
    (budget / price).floor() as u64
}

pub fn categorize(price: f64, trailing_dividend_total: f64) -> Category {
    if !(price.is_finite() && price > 0.0) {
        return Category::Low;
    }

    let ratio = trailing_dividend_total / price;
    if ratio > HIGH_YIELD_RATIO {
        Category::High
    } else if ratio > MEDIUM_YIELD_RATIO {
        Category::Medium
    } else {
        Category::Low
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
