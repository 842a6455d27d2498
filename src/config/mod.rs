#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::utils::error::{Result, SchedulerError};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Checks the settings every configuration source has in common.
pub fn validate_settings<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_url("api.base_url", config.api_base_url())?;
    validate_positive_number("api.timeout_seconds", config.timeout_seconds(), 1)?;
    validate_range("timetable.session_minutes", config.session_minutes(), 15, 240)?;
    validate_range("timetable.first_hour", config.first_hour(), 0, 23)?;
    validate_range("timetable.last_hour", config.last_hour(), 0, 23)?;

    if config.first_hour() > config.last_hour() {
        return Err(SchedulerError::InvalidConfigValueError {
            field: "timetable.first_hour".to_string(),
            value: config.first_hour().to_string(),
            reason: format!(
                "First hour must not be after last hour ({})",
                config.last_hour()
            ),
        });
    }
    Ok(())
}
