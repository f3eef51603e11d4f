//! Report configuration. Read from the environment (a `.env` file is
//! honored in development via dotenvy); addresses are required, the money
//! knobs fall back to their documented defaults.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Knobs and addresses the pipeline needs. SMTP transport settings live
/// with the mailer, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// Daily allowance in dollars. Default 100.
    pub per_diem_rate: Decimal,
    /// Ceiling for report + receipts combined, in MB. Default 18.
    pub max_attachment_mb: Decimal,
    pub sender_email: String,
    pub finance_email: String,
    pub approver_email: String,
}

impl ReportConfig {
    /// Env contract:
    /// - `PER_DIEM_RATE` (default `100`)
    /// - `MAX_ATTACHMENT_MB` (default `18`)
    /// - `SENDER_EMAIL`, `FINANCE_EMAIL`, `APPROVER_EMAIL` (required)
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let decimal_or = |key: &'static str, default: Decimal| match get(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<Decimal>().map_err(|_| ConfigError::InvalidValue {
                name: key,
                value: raw,
            }),
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::MissingVar(key));

        Ok(ReportConfig {
            per_diem_rate: decimal_or("PER_DIEM_RATE", Decimal::from(100))?,
            max_attachment_mb: decimal_or("MAX_ATTACHMENT_MB", Decimal::from(18))?,
            sender_email: required("SENDER_EMAIL")?,
            finance_email: required("FINANCE_EMAIL")?,
            approver_email: required("APPROVER_EMAIL")?,
        })
    }

    /// The attachment ceiling in bytes, truncated the way the size check
    /// compares: `MAX_ATTACHMENT_MB * 1024 * 1024`.
    pub fn max_attachment_bytes(&self) -> u64 {
        (self.max_attachment_mb * Decimal::from(1024u32 * 1024))
            .trunc()
            .to_u64()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn defaults_apply_when_knobs_unset() {
        let config = ReportConfig::from_lookup(lookup(&[
            ("SENDER_EMAIL", "reports@example.com"),
            ("FINANCE_EMAIL", "finance@example.com"),
            ("APPROVER_EMAIL", "approver@example.com"),
        ]))
        .unwrap();
        assert_eq!(config.per_diem_rate, dec!(100));
        assert_eq!(config.max_attachment_mb, dec!(18));
        assert_eq!(config.max_attachment_bytes(), 18 * 1024 * 1024);
    }

    #[test]
    fn missing_address_is_named() {
        let err = ReportConfig::from_lookup(lookup(&[
            ("SENDER_EMAIL", "reports@example.com"),
            ("APPROVER_EMAIL", "approver@example.com"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("FINANCE_EMAIL"));
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let err = ReportConfig::from_lookup(lookup(&[
            ("PER_DIEM_RATE", "a lot"),
            ("SENDER_EMAIL", "s@example.com"),
            ("FINANCE_EMAIL", "f@example.com"),
            ("APPROVER_EMAIL", "a@example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PER_DIEM_RATE", .. }));
    }

    #[test]
    fn fractional_limit_truncates_to_bytes() {
        let config = ReportConfig::from_lookup(lookup(&[
            ("MAX_ATTACHMENT_MB", "0.5"),
            ("SENDER_EMAIL", "s@example.com"),
            ("FINANCE_EMAIL", "f@example.com"),
            ("APPROVER_EMAIL", "a@example.com"),
        ]))
        .unwrap();
        assert_eq!(config.max_attachment_bytes(), 512 * 1024);
    }
}
