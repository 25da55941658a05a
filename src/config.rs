use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{MAX_FINANCIAL_YEAR, MIN_FINANCIAL_YEAR};

#[derive(Debug, Clone)]
pub struct Config {
    pub ledger_path: String,
    /// End year of the financial year to report; `None` means the current one.
    pub financial_year: Option<i32>,
    pub report_summary: bool,
    pub compile_mode: CompileMode,
    pub discount_lookback_days: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    Sequential,
    Parallel,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let ledger_path = env_map
            .get("LEDGER_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("LEDGER_PATH".to_string()))?;

        let financial_year = match env_map.get("FINANCIAL_YEAR") {
            Some(raw) => {
                let year = raw.trim().parse::<i32>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "FINANCIAL_YEAR".to_string(),
                        "must be a valid year".to_string(),
                    )
                })?;
                if !(MIN_FINANCIAL_YEAR..=MAX_FINANCIAL_YEAR).contains(&year) {
                    return Err(ConfigError::InvalidValue(
                        "FINANCIAL_YEAR".to_string(),
                        format!(
                            "must be within {}..={}, got {}",
                            MIN_FINANCIAL_YEAR, MAX_FINANCIAL_YEAR, year
                        ),
                    ));
                }
                Some(year)
            }
            None => None,
        };

        let report_summary = match env_map
            .get("REPORT_SUMMARY")
            .map(|s| s.as_str())
            .unwrap_or("true")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "REPORT_SUMMARY".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let compile_mode = match env_map
            .get("COMPILE_MODE")
            .map(|s| s.as_str())
            .unwrap_or("sequential")
        {
            "sequential" => CompileMode::Sequential,
            "parallel" => CompileMode::Parallel,
            other => {
                return Err(ConfigError::InvalidValue(
                    "COMPILE_MODE".to_string(),
                    format!("must be sequential or parallel, got {}", other),
                ))
            }
        };

        let discount_lookback_days = env_map
            .get("DISCOUNT_LOOKBACK_DAYS")
            .map(|s| s.as_str())
            .unwrap_or("365")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "DISCOUNT_LOOKBACK_DAYS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;

        Ok(Config {
            ledger_path,
            financial_year,
            report_summary,
            compile_mode,
            discount_lookback_days,
        })
    }
}
