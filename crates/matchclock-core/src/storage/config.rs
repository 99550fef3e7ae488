//! TOML-based application configuration.
//!
//! Stores the match-day schedule and the clock's operator policy.
//! Configuration is stored at `~/.config/matchclock/config.toml`.
//!
//! A saved configuration never reaches a running clock directly; it is
//! applied through [`crate::SegmentClock::reconfigure`], which resets the
//! clock and rebuilds the timeline.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, Result, ValidationError};

/// Tick interval in normal operation.
pub const TICK_INTERVAL_MS: u64 = 1000;
/// Tick interval in test mode.
pub const TEST_TICK_INTERVAL_MS: u64 = 200;

/// Match-day schedule. All durations are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Time of day the first game starts (`HH:MM:SS`). Informational only.
    #[serde(default = "default_day_start")]
    pub day_start: String,
    #[serde(default = "default_num_games")]
    pub num_games: u32,
    /// One entry per quarter.
    #[serde(default = "default_play_times")]
    pub play_times: Vec<u32>,
    /// Entry `i` is the break after quarter `i`.
    #[serde(default = "default_break_times")]
    pub break_times: Vec<u32>,
    #[serde(default = "default_down_time")]
    pub down_time: u32,
    #[serde(default = "default_warn_bell_time")]
    pub warn_bell_time: f64,
    #[serde(default)]
    pub test_mode: bool,
    /// Append a downtime segment after the final game as well.
    #[serde(default)]
    pub trailing_downtime: bool,
}

/// Operator policy for manual time corrections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockPolicy {
    /// Reject adjustments while a quarter is being played.
    #[serde(default = "default_true")]
    pub lock_gametime_adjustments: bool,
    /// Keep adjusted time within `[0, duration]`.
    #[serde(default = "default_true")]
    pub clamp_adjustments: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/matchclock/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub clock: ClockPolicy,
}

// Default functions
fn default_day_start() -> String {
    "09:00:00".into()
}
fn default_num_games() -> u32 {
    5
}
fn default_play_times() -> Vec<u32> {
    vec![1, 1, 10, 10]
}
fn default_break_times() -> Vec<u32> {
    vec![1, 2, 2]
}
fn default_down_time() -> u32 {
    2
}
fn default_warn_bell_time() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day_start: default_day_start(),
            num_games: default_num_games(),
            play_times: default_play_times(),
            break_times: default_break_times(),
            down_time: default_down_time(),
            warn_bell_time: default_warn_bell_time(),
            test_mode: false,
            trailing_downtime: false,
        }
    }
}

impl Default for ClockPolicy {
    fn default() -> Self {
        Self {
            lock_gametime_adjustments: true,
            clamp_adjustments: true,
        }
    }
}

impl ScheduleConfig {
    /// Check the preconditions the timeline builder and the clock rely on.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let day_start = self.day_start.trim();
        if day_start.is_empty() {
            return Err(ValidationError::MissingDayStart);
        }
        if parse_day_start(day_start).is_none() {
            return Err(ValidationError::InvalidValue {
                field: "day_start".into(),
                message: format!("'{day_start}' is not a time of day"),
            });
        }
        if self.num_games < 1 {
            return Err(ValidationError::NoGames);
        }
        if self.play_times.is_empty() {
            return Err(ValidationError::NoQuarters);
        }
        if !self.warn_bell_time.is_finite() || self.warn_bell_time < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "warn_bell_time".into(),
                message: format!("{} is not a lead time in minutes", self.warn_bell_time),
            });
        }
        Ok(())
    }

    /// Parsed day start, if well formed.
    pub fn day_start_time(&self) -> Option<NaiveTime> {
        parse_day_start(self.day_start.trim())
    }

    pub fn tick_interval(&self) -> Duration {
        if self.test_mode {
            Duration::from_millis(TEST_TICK_INTERVAL_MS)
        } else {
            Duration::from_millis(TICK_INTERVAL_MS)
        }
    }

    pub fn quarters_per_game(&self) -> usize {
        self.play_times.len()
    }
}

fn parse_day_start(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Raw values from the settings form.
///
/// Every quarter gets the same length. Missing or zero counts fall back to
/// one, unparsable or non-positive break entries are dropped, and a
/// missing warning bell falls back to half a minute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleForm {
    pub num_games: Option<u32>,
    pub quarters_per_game: Option<u32>,
    /// `HH:MM`
    pub day_start: String,
    pub quarter_length: Option<u32>,
    /// Comma separated minutes, e.g. `"1, 2, 2"`.
    pub break_times: String,
    pub downtime: Option<u32>,
    pub warning_bell: Option<f64>,
}

impl ScheduleForm {
    /// Fill the form from an existing schedule.
    pub fn from_schedule(schedule: &ScheduleConfig) -> Self {
        Self {
            num_games: Some(schedule.num_games),
            quarters_per_game: Some(schedule.play_times.len() as u32),
            day_start: schedule.day_start.chars().take(5).collect(),
            quarter_length: schedule.play_times.first().copied(),
            break_times: schedule
                .break_times
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(","),
            downtime: Some(schedule.down_time),
            warning_bell: Some(schedule.warn_bell_time),
        }
    }

    /// Convert to a schedule, keeping `base`'s flags.
    pub fn into_schedule(self, base: &ScheduleConfig) -> ScheduleConfig {
        let or_one = |v: Option<u32>| v.filter(|n| *n > 0).unwrap_or(1);
        let quarters = or_one(self.quarters_per_game) as usize;
        let quarter_length = or_one(self.quarter_length);
        let break_times = self
            .break_times
            .split(',')
            .filter_map(|b| b.trim().parse::<i64>().ok())
            .filter(|b| *b > 0)
            .filter_map(|b| u32::try_from(b).ok())
            .collect();
        let warn_bell_time = self
            .warning_bell
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(0.5);

        ScheduleConfig {
            day_start: format!("{}:00", self.day_start.trim()),
            num_games: or_one(self.num_games),
            play_times: vec![quarter_length; quarters],
            break_times,
            down_time: or_one(self.downtime),
            warn_bell_time,
            test_mode: base.test_mode,
            trailing_downtime: base.trailing_downtime,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// existing type.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!("falling back to default config: {err}");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[schedule]\nnum_games = 2\n").unwrap();
        assert_eq!(parsed.schedule.num_games, 2);
        assert_eq!(parsed.schedule.play_times, vec![1, 1, 10, 10]);
        assert!(parsed.clock.lock_gametime_adjustments);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("schedule.num_games").as_deref(), Some("5"));
        assert_eq!(cfg.get("schedule.day_start").as_deref(), Some("09:00:00"));
        assert_eq!(cfg.get("schedule.play_times").as_deref(), Some("[1,1,10,10]"));
        assert!(cfg.get("schedule.missing_key").is_none());
    }

    #[test]
    fn apply_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.apply("schedule.num_games", "3").unwrap();
        cfg.apply("schedule.warn_bell_time", "1.5").unwrap();
        cfg.apply("schedule.break_times", "[3]").unwrap();
        cfg.apply("clock.clamp_adjustments", "false").unwrap();
        cfg.apply("schedule.day_start", "10:30:00").unwrap();
        assert_eq!(cfg.schedule.num_games, 3);
        assert_eq!(cfg.schedule.warn_bell_time, 1.5);
        assert_eq!(cfg.schedule.break_times, vec![3]);
        assert!(!cfg.clock.clamp_adjustments);
        assert_eq!(cfg.schedule.day_start, "10:30:00");
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("schedule.nonexistent", "1"),
            Err(crate::CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(cfg.apply("", "1").is_err());
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("schedule.test_mode", "not_a_bool").is_err());
        assert!(cfg.apply("schedule.num_games", "many").is_err());
        // Fractional value in an integer field fails on deserialize.
        assert!(cfg.apply("schedule.num_games", "1.5").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn validate_catches_missing_parameters() {
        let mut schedule = ScheduleConfig::default();
        assert_eq!(schedule.validate(), Ok(()));

        schedule.day_start = "  ".into();
        assert_eq!(schedule.validate(), Err(ValidationError::MissingDayStart));

        schedule.day_start = "09:00".into();
        schedule.num_games = 0;
        assert_eq!(schedule.validate(), Err(ValidationError::NoGames));

        schedule.num_games = 1;
        schedule.play_times.clear();
        assert_eq!(schedule.validate(), Err(ValidationError::NoQuarters));
    }

    #[test]
    fn validate_rejects_malformed_day_start() {
        let schedule = ScheduleConfig {
            day_start: "nine o'clock".into(),
            ..ScheduleConfig::default()
        };
        assert!(matches!(
            schedule.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn tick_interval_follows_test_mode() {
        let mut schedule = ScheduleConfig::default();
        assert_eq!(schedule.tick_interval(), Duration::from_secs(1));
        schedule.test_mode = true;
        assert_eq!(schedule.tick_interval(), Duration::from_millis(200));
    }

    #[test]
    fn form_applies_fallbacks() {
        let form = ScheduleForm {
            num_games: Some(0),
            quarters_per_game: Some(2),
            day_start: "08:15".into(),
            quarter_length: Some(12),
            break_times: "3, x, -1, 0, 4".into(),
            downtime: None,
            warning_bell: None,
        };
        let schedule = form.into_schedule(&ScheduleConfig::default());
        assert_eq!(schedule.num_games, 1);
        assert_eq!(schedule.play_times, vec![12, 12]);
        assert_eq!(schedule.break_times, vec![3, 4]);
        assert_eq!(schedule.down_time, 1);
        assert_eq!(schedule.warn_bell_time, 0.5);
        assert_eq!(schedule.day_start, "08:15:00");
        assert_eq!(schedule.validate(), Ok(()));
    }

    #[test]
    fn form_roundtrips_uniform_schedule() {
        let schedule = ScheduleConfig {
            play_times: vec![10, 10, 10, 10],
            ..ScheduleConfig::default()
        };
        let form = ScheduleForm::from_schedule(&schedule);
        assert_eq!(form.day_start, "09:00");
        assert_eq!(form.break_times, "1,2,2");
        assert_eq!(form.into_schedule(&schedule), schedule);
    }

    #[test]
    fn save_and_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        // Missing file writes defaults.
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, Config::default());
        assert!(path.exists());

        let mut cfg = loaded;
        cfg.schedule.num_games = 7;
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().schedule.num_games, 7);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "schedule = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(crate::CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }
}
