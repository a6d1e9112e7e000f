use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::dates::{DailyOrder, DayFormat};

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
/// Day/month/year with zero-padded day and month and a four-digit year.
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";
/// Stored in place of a start date for courses that are not yet scheduled.
pub const DEFAULT_UNDETERMINED: &str = "TBD";

/// Top-level config (coursecal.toml + COURSECAL_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub dates: DatesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// How course dates are written in the store, in query strings and in
/// responses, and how the per-day aggregation is ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatesConfig {
    /// chrono `strftime` pattern, e.g. `%d/%m/%Y`.
    #[serde(default = "default_date_format")]
    pub format: String,
    /// Literal that marks a start date as not yet scheduled.
    #[serde(default = "default_undetermined")]
    pub undetermined: String,
    #[serde(default)]
    pub daily_order: DailyOrder,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            format: default_date_format(),
            undetermined: default_undetermined(),
            daily_order: DailyOrder::default(),
        }
    }
}

impl DatesConfig {
    /// Validated parsing rules; an unusable pattern is a config error.
    pub fn day_format(&self) -> crate::error::Result<DayFormat> {
        DayFormat::new(&self.format, &self.undetermined)
            .map_err(|e| crate::error::CalendarError::Config(e.to_string()))
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}
fn default_undetermined() -> String {
    DEFAULT_UNDETERMINED.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.coursecal/coursecal.db", home)
}

impl CalendarConfig {
    /// Load config from a TOML file with COURSECAL_* env var overrides.
    ///
    /// Nested keys use a double underscore so field names may keep theirs:
    /// `COURSECAL_DATES__DAILY_ORDER=calendar`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: CalendarConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("COURSECAL_").split("__"))
            .extract()
            .map_err(|e| crate::error::CalendarError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.coursecal/coursecal.toml", home)
}
