mod config;

pub use config::{
    ClockPolicy, Config, ScheduleConfig, ScheduleForm, TEST_TICK_INTERVAL_MS, TICK_INTERVAL_MS,
};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/matchclock[-dev]/` based on MATCHCLOCK_ENV.
///
/// Set MATCHCLOCK_ENV=dev to use the development data directory, or
/// MATCHCLOCK_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("MATCHCLOCK_CONFIG_DIR") {
        Some(custom) => PathBuf::from(custom),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("MATCHCLOCK_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("matchclock-dev")
            } else {
                base_dir.join("matchclock")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
