use crate::error::{AppError, Result};

use super::Config;

/// Collect every configuration problem and report them together.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    if config.concurrency == 0 {
        issues.push("concurrency must be at least 1".to_string());
    }
    if config.fetch_timeout_secs == 0 {
        issues.push("fetch_timeout_secs must be greater than zero".to_string());
    }
    validate_suffix(&config.market_suffix, &mut issues);
    if !config.default_budget.is_finite() || config.default_budget < 0.0 {
        issues.push(format!(
            "default_budget must be a non-negative amount, found {}",
            config.default_budget
        ));
    }
    if config.lookback_months == 0 {
        issues.push("lookback_months must be at least 1".to_string());
    }
    if config.store_path.as_os_str().is_empty() {
        issues.push("store_path must not be empty".to_string());
    }
    validate_provider(config, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "invalid configuration: {}",
            issues.join("; ")
        )))
    }
}

fn validate_suffix(suffix: &str, issues: &mut Vec<String>) {
    if suffix.trim().is_empty() {
        issues.push("market_suffix must not be empty".to_string());
    } else if !suffix.starts_with('.') || suffix.len() < 2 {
        issues.push(format!(
            "market_suffix must look like `.XX`, found `{suffix}`"
        ));
    }
}

fn validate_provider(config: &Config, issues: &mut Vec<String>) {
    let provider = &config.provider;
    if provider.chart_endpoint.trim().is_empty() {
        issues.push("provider.chart_endpoint must not be empty".to_string());
    }
    if provider.range.trim().is_empty() {
        issues.push("provider.range must not be empty".to_string());
    }
    if provider.request_timeout_secs == 0 {
        issues.push("provider.request_timeout_secs must be greater than zero".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_is_valid() {
        validate_config(&Config::builtin()).expect("builtin config should be valid");
    }

    #[test]
    fn reports_every_issue_at_once() {
        let mut config = Config::builtin();
        config.concurrency = 0;
        config.market_suffix = "SA".to_string();
        config.default_budget = -10.0;

        let err = validate_config(&config).expect_err("validation should fail");
        let message = err.to_string();
        assert!(message.contains("concurrency"), "unexpected: {message}");
        assert!(message.contains("market_suffix"), "unexpected: {message}");
        assert!(message.contains("default_budget"), "unexpected: {message}");
    }

    #[test]
    fn rejects_empty_endpoint() {
        let mut config = Config::builtin();
        config.provider.chart_endpoint = "  ".to_string();

        let err = validate_config(&config).expect_err("validation should fail");
        assert!(
            err.to_string().contains("chart_endpoint"),
            "unexpected error message: {err}"
        );
    }
}
