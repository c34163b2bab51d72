//! Per-employee shift configuration.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Shift window for one employee.
///
/// Wire shape matches `/employee-shift/{id}/`:
/// `{shift_start: "HH:mm", shift_end: "HH:mm", break_duration: number, is_night_shift: bool}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftConfig {
    #[serde(with = "hhmm")]
    pub shift_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub shift_end: NaiveTime,
    /// Informational only.
    #[serde(rename = "break_duration", default = "default_break_hours")]
    pub break_duration_hours: f64,
    #[serde(default)]
    pub is_night_shift: bool,
}

fn default_break_hours() -> f64 {
    1.0
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            shift_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
            shift_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            break_duration_hours: default_break_hours(),
            is_night_shift: false,
        }
    }
}

impl ShiftConfig {
    /// Build a config from `HH:mm` strings.
    pub fn from_strs(start: &str, end: &str, is_night_shift: bool) -> Result<Self> {
        Ok(Self {
            shift_start: parse_hhmm(start)?,
            shift_end: parse_hhmm(end)?,
            break_duration_hours: default_break_hours(),
            is_night_shift,
        })
    }

    /// Validate the config before saving it back to the API.
    ///
    /// A day shift whose start is after its end is accepted; it classifies
    /// every punch as outside shift hours.
    pub fn validate(&self) -> Result<()> {
        if !self.break_duration_hours.is_finite() || self.break_duration_hours < 0.0 {
            return Err(AppError::validation("Break duration must be a non-negative number"));
        }
        Ok(())
    }

    /// Short human-readable window, e.g. `18:00 - 06:00 (night)`.
    pub fn describe(&self) -> String {
        format!(
            "{} - {}{}",
            self.shift_start.format("%H:%M"),
            self.shift_end.format("%H:%M"),
            if self.is_night_shift { " (night)" } else { "" }
        )
    }
}

/// Parse `HH:mm` (or `HH:mm:ss`, seconds dropped) into a minute-precision time.
pub fn parse_hhmm(input: &str) -> Result<NaiveTime> {
    let input = input.trim();
    let time = NaiveTime::parse_from_str(input, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M:%S"))
        .map_err(|e| AppError::parse(format!("Invalid time '{input}': {e}")))?;

    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .ok_or_else(|| AppError::parse(format!("Invalid time '{input}'")))
}

/// Serde adapter for `HH:mm` strings.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hhmm_drops_seconds() {
        let t = parse_hhmm("07:30:45").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_hhmm_invalid() {
        assert!(parse_hhmm("25:00").is_err());
        assert!(parse_hhmm("").is_err());
    }

    #[test]
    fn test_wire_shape() {
        let json = r#"{"shift_start":"18:00:00","shift_end":"06:00","break_duration":1.5,"is_night_shift":true}"#;
        let config: ShiftConfig = serde_json::from_str(json).unwrap();
        assert!(config.is_night_shift);
        assert_eq!(config.break_duration_hours, 1.5);

        let out = serde_json::to_value(&config).unwrap();
        assert_eq!(out["shift_start"], "18:00");
        assert_eq!(out["shift_end"], "06:00");
        assert_eq!(out["break_duration"], 1.5);
    }

    #[test]
    fn test_validate_break_duration() {
        let mut config = ShiftConfig::default();
        assert!(config.validate().is_ok());

        config.break_duration_hours = -1.0;
        assert!(config.validate().is_err());

        config.break_duration_hours = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_day_window_is_valid() {
        let config = ShiftConfig::from_strs("18:00", "06:00", false).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.describe(), "18:00 - 06:00");
    }
}
