//! Project and analysis configuration.
//!
//! Defaults cover the 1976-1990 study window. A profile
//! ([`Environment`]) adjusts them, and `DELICENSE_*` variables override
//! individual values:
//!
//! | Variable                      | Field               |
//! |-------------------------------|---------------------|
//! | `DELICENSE_ENV`               | profile             |
//! | `DELICENSE_START_YEAR`        | `start_year`        |
//! | `DELICENSE_END_YEAR`          | `end_year`          |
//! | `DELICENSE_MISSING_THRESHOLD` | `missing_threshold` |
//! | `DELICENSE_DATA_DIR`          | `data_dir`          |
//! | `DELICENSE_OUTPUT_DIR`        | `output_dir`        |
//! | `DELICENSE_FIRM_ID_COL`       | `firm_id_col`       |
//! | `DELICENSE_YEAR_COL`          | `year_col`          |
//! | `DELICENSE_OUTPUT_COL`        | `output_col`        |
//! | `DELICENSE_EXPORT_FORMATS`    | `export_formats`    |
//! | `DELICENSE_LOG_LEVEL`         | `log_level`         |
//!
//! The column names and export formats are the defaults of the command
//! flags that leave them out. The binary loads a `.env` file (via `dotenvy`)
//! before reading them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};
use crate::export::ExportFormat;
use crate::transform::loader::{folder_name, DEFAULT_FOLDER_PATTERN};

/// Configuration profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    /// Narrow 1980-1985 window
    Testing,
    /// Quieter logging
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Parameters for data processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub environment: Environment,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub start_year: i64,
    pub end_year: i64,
    /// Maximum proportion of missing values before a column is flagged
    pub missing_threshold: f64,
    /// Panel firm column and default growth group
    pub firm_id_col: String,
    /// Year range column and panel period column
    pub year_col: String,
    /// Default growth value column
    pub output_col: String,
    /// Extra formats written next to processed output
    pub export_formats: Vec<ExportFormat>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            start_year: 1976,
            end_year: 1990,
            missing_threshold: 0.5,
            firm_id_col: "firm_id".to_string(),
            year_col: "year".to_string(),
            output_col: "output".to_string(),
            export_formats: vec![ExportFormat::Csv],
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults adjusted for a profile.
    pub fn for_environment(environment: Environment) -> Self {
        let mut config = Self {
            environment,
            ..Self::default()
        };
        match environment {
            Environment::Development => {}
            Environment::Testing => {
                config.start_year = 1980;
                config.end_year = 1985;
            }
            Environment::Production => {
                config.log_level = "warn".to_string();
            }
        }
        config
    }

    /// Load from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read `DELICENSE_*` variables.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("DELICENSE_ENV") {
            Some(env) => env.parse()?,
            None => Environment::default(),
        };
        let mut config = Self::for_environment(environment);

        if let Some(v) = lookup("DELICENSE_START_YEAR") {
            config.start_year = parse_var("DELICENSE_START_YEAR", &v)?;
        }
        if let Some(v) = lookup("DELICENSE_END_YEAR") {
            config.end_year = parse_var("DELICENSE_END_YEAR", &v)?;
        }
        if let Some(v) = lookup("DELICENSE_MISSING_THRESHOLD") {
            let threshold: f64 = parse_var("DELICENSE_MISSING_THRESHOLD", &v)?;
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::InvalidValue {
                    key: "DELICENSE_MISSING_THRESHOLD".to_string(),
                    value: v,
                });
            }
            config.missing_threshold = threshold;
        }
        if let Some(v) = lookup("DELICENSE_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("DELICENSE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("DELICENSE_FIRM_ID_COL") {
            config.firm_id_col = v;
        }
        if let Some(v) = lookup("DELICENSE_YEAR_COL") {
            config.year_col = v;
        }
        if let Some(v) = lookup("DELICENSE_OUTPUT_COL") {
            config.output_col = v;
        }
        if let Some(v) = lookup("DELICENSE_EXPORT_FORMATS") {
            config.export_formats = v
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .map(|name| {
                    name.parse().map_err(|_| ConfigError::InvalidValue {
                        key: "DELICENSE_EXPORT_FORMATS".to_string(),
                        value: name.to_string(),
                    })
                })
                .collect::<ConfigResult<_>>()?;
        }
        if let Some(v) = lookup("DELICENSE_LOG_LEVEL") {
            config.log_level = v;
        }

        if config.start_year > config.end_year {
            return Err(ConfigError::InvalidValue {
                key: "DELICENSE_START_YEAR".to_string(),
                value: format!("{} (after end year {})", config.start_year, config.end_year),
            });
        }

        Ok(config)
    }

    /// Year folder names (`1976_1977`, ...) for `start..=end`.
    ///
    /// `None` falls back to the configured window.
    pub fn year_folders(&self, start: Option<i64>, end: Option<i64>) -> Vec<String> {
        let start = start.unwrap_or(self.start_year);
        let end = end.unwrap_or(self.end_year);
        (start..=end)
            .map(|year| folder_name(DEFAULT_FOLDER_PATTERN, year))
            .collect()
    }

    /// Create the data and output directories if they don't exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.output_dir)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Side of the policy change a year falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentPeriod {
    Pre,
    Post,
}

/// Parameters of the delicensing analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Key policy change year
    pub delicensing_year: i64,
    pub manufacturing_sectors: Vec<String>,
    pub significance_level: f64,
    pub confidence_level: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            delicensing_year: 1985,
            manufacturing_sectors: ["textiles", "chemicals", "machinery", "electronics", "automobiles"]
                .into_iter()
                .map(String::from)
                .collect(),
            significance_level: 0.05,
            confidence_level: 0.95,
        }
    }
}

impl AnalysisConfig {
    /// `Pre` before the delicensing year, `Post` from it onwards.
    pub fn treatment_period(&self, year: i64) -> TreatmentPeriod {
        if year < self.delicensing_year {
            TreatmentPeriod::Pre
        } else {
            TreatmentPeriod::Post
        }
    }
}
