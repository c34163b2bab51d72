//! Business timezone conversion and soft-fail display formatting.
//!
//! Every instant coming from the API goes through [`BusinessClock`] once,
//! before classification. Nothing downstream deals with offsets.

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime};
use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::attendance::{AttendancePunch, AttendanceRecordDto};

/// Shown instead of a value that is missing or could not be parsed.
pub const PLACEHOLDER: &str = "-";

/// Naive layouts taken as already being business-local time.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a UTC offset such as `+08:00`, `+0800`, `-05:30` or `Z`.
pub fn parse_utc_offset(input: &str) -> Result<FixedOffset> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("z") || input.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| AppError::parse("Invalid UTC offset"));
    }

    input
        .parse::<FixedOffset>()
        .map_err(|e| AppError::parse(format!("Invalid UTC offset '{input}': {e}")))
}

/// Format a clock time as `hh:mm AM`, or the placeholder.
pub fn format_clock(time: Option<NaiveTime>) -> String {
    match time {
        Some(t) => t.format("%I:%M %p").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Punches that survived localization, plus how many rows were dropped.
#[derive(Debug, Clone, Default)]
pub struct LocalizedPunches {
    pub punches: Vec<AttendancePunch>,
    pub rejected: usize,
}

/// Converts API instants into business wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct BusinessClock {
    offset: FixedOffset,
}

impl BusinessClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Parse an ISO-8601 instant into local wall-clock time.
    ///
    /// Strings carrying an offset (or `Z`) are converted; naive strings are
    /// taken as already local.
    pub fn parse_instant(&self, raw: &str) -> Result<NaiveDateTime> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&self.offset).naive_local());
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .ok_or_else(|| AppError::parse(format!("Invalid timestamp '{raw}'")))
    }

    /// Convert one API record.
    ///
    /// A bad check-in rejects the record. A bad check-out is treated as absent.
    pub fn localize(&self, dto: &AttendanceRecordDto) -> Result<AttendancePunch> {
        let check_in = self.parse_instant(&dto.check_in)?;

        let check_out = match dto.check_out.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match self.parse_instant(raw) {
                Ok(dt) => Some(dt),
                Err(e) => {
                    warn!("Record {:?}: ignoring check-out: {}", dto.id, e);
                    None
                }
            },
        };

        Ok(AttendancePunch {
            employee_id: dto.employee_id,
            check_in,
            check_out,
            department: dto.department.clone(),
        })
    }

    /// Convert a page of API records, skipping rows with an unusable check-in.
    pub fn localize_all(&self, dtos: &[AttendanceRecordDto]) -> LocalizedPunches {
        let mut out = LocalizedPunches {
            punches: Vec::with_capacity(dtos.len()),
            rejected: 0,
        };

        for dto in dtos {
            match self.localize(dto) {
                Ok(punch) => out.punches.push(punch),
                Err(e) => {
                    warn!("Skipping record {:?}: {}", dto.id, e);
                    out.rejected += 1;
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn manila() -> BusinessClock {
        BusinessClock::new(parse_utc_offset("+08:00").unwrap())
    }

    fn dto(check_in: &str, check_out: Option<&str>) -> AttendanceRecordDto {
        AttendanceRecordDto {
            id: Some(1),
            employee_id: 3,
            check_in: check_in.to_string(),
            check_out: check_out.map(str::to_string),
            department: "Production".to_string(),
        }
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+08:00").unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(parse_utc_offset("-05:30").unwrap().local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert_eq!(parse_utc_offset("+0800").unwrap().local_minus_utc(), 8 * 3600);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("utc").unwrap().local_minus_utc(), 0);
        assert!(parse_utc_offset("+08").is_err());
        assert!(parse_utc_offset("08:00").is_err());
        assert!(parse_utc_offset("Asia/Manila").is_err());
    }

    #[test]
    fn test_utc_instant_converted_to_local() {
        let local = manila().parse_instant("2025-03-01T22:30:00Z").unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap().and_hms_opt(6, 30, 0).unwrap();
        assert_eq!(local, expected);
    }

    #[test]
    fn test_naive_instant_taken_as_local() {
        let local = manila().parse_instant("2025-03-01 06:30:00").unwrap();
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(6, 30, 0).unwrap();
        assert_eq!(local, expected);
    }

    #[test]
    fn test_format_clock() {
        let local = manila().parse_instant("2025-03-01T10:05:00Z").unwrap();
        assert_eq!(format_clock(Some(local.time())), "06:05 PM");
        assert_eq!(format_clock(None), "-");
    }

    #[test]
    fn test_localize_bad_checkout_is_absent() {
        let punch = manila().localize(&dto("2025-03-01T00:00:00Z", Some("nope"))).unwrap();
        assert!(punch.check_out.is_none());
    }

    #[test]
    fn test_localize_all_counts_rejected() {
        let rows = vec![
            dto("2025-03-01T00:00:00Z", None),
            dto("not a time", None),
            dto("2025-03-02T00:00:00Z", Some("2025-03-02T10:00:00Z")),
        ];
        let result = manila().localize_all(&rows);
        assert_eq!(result.punches.len(), 2);
        assert_eq!(result.rejected, 1);
    }
}
