use dashboard_core::loader::{DEFAULT_EDUCATION, DEFAULT_SALES_DATA, DEFAULT_TOPOLOGY};
use dashboard_core::{Sources, Variant};
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown dashboard variant {0:?} (expected \"sales\" or \"education\")")]
    UnknownVariant(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub sources: Sources,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
}

impl AppConfig {
    pub const fn variant(&self) -> Variant {
        self.sources.variant()
    }
}

/// Loads `.env`, then reads the dashboard settings from the environment.
pub fn init_app_config() -> Result<AppConfig, ConfigError> {
    dotenv().ok();
    config_from(|key| env::var(key).ok())
}

fn config_from(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig, ConfigError> {
    let variant = match lookup("DASHBOARD_VARIANT") {
        Some(name) => Variant::parse(&name).ok_or(ConfigError::UnknownVariant(name))?,
        None => Variant::Sales,
    };
    let location = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

    let sources = match variant {
        Variant::Sales => Sources::Sales {
            data: location("DASHBOARD_DATA", DEFAULT_SALES_DATA),
        },
        Variant::Education => Sources::Education {
            topology: location("DASHBOARD_TOPOLOGY", DEFAULT_TOPOLOGY),
            education: location("DASHBOARD_EDUCATION", DEFAULT_EDUCATION),
        },
    };

    Ok(AppConfig {
        sources,
        log_file: lookup("DASHBOARD_LOG").map(PathBuf::from),
        debug: lookup("DEBUG").is_some_and(|value| matches!(value.as_str(), "1" | "true")),
    })
}
