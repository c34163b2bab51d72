//! Attendance DTOs and view models.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::time::{PLACEHOLDER, format_clock};

/// Sentinel department marking a synthetic no-punch day.
pub const NO_SHOW_DEPARTMENT: &str = "NO SHOW";

/// Attendance record as returned by the attendance-records endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecordDto {
    #[serde(default)]
    pub id: Option<i64>,
    pub employee_id: i64,
    /// ISO-8601 instant.
    pub check_in: String,
    #[serde(default)]
    pub check_out: Option<String>,
    #[serde(default)]
    pub department: String,
}

/// One punch with timestamps already converted to business wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendancePunch {
    pub employee_id: i64,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
    pub department: String,
}

impl AttendancePunch {
    /// Whether this is a synthetic no-show day rather than a real punch.
    pub fn is_no_show(&self) -> bool {
        self.department == NO_SHOW_DEPARTMENT
    }
}

/// Shift bucket a check-in falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftType {
    MorningShift,
    NightShift,
    OutsideShiftHours,
}

impl ShiftType {
    pub fn label(self) -> &'static str {
        match self {
            ShiftType::MorningShift => "Morning Shift",
            ShiftType::NightShift => "Night Shift",
            ShiftType::OutsideShiftHours => "Outside Shift Hours",
        }
    }
}

/// A punch plus the fields derived from the current shift config.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub punch: AttendancePunch,
    pub shift_type: ShiftType,
    pub is_late: bool,
    pub is_missing_checkout: bool,
}

/// Aggregate over one employee's punches in the selected date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodStatistics {
    pub total_days: usize,
    pub present_days: usize,
    pub no_show_days: usize,
    pub late_arrivals: usize,
    pub missing_checkouts: usize,
    pub morning_shift_days: usize,
    pub night_shift_days: usize,
    /// `present_days / total_days`; `None` when there are no days at all.
    pub attendance_rate: Option<f64>,
    pub average_check_in: Option<NaiveTime>,
    pub average_check_out: Option<NaiveTime>,
}

impl PeriodStatistics {
    /// Rate as a percentage with one decimal, or the placeholder.
    pub fn attendance_rate_display(&self) -> String {
        match self.attendance_rate {
            Some(rate) => format!("{:.1}%", rate * 100.0),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn average_check_in_display(&self) -> String {
        format_clock(self.average_check_in)
    }

    pub fn average_check_out_display(&self) -> String {
        format_clock(self.average_check_out)
    }

    /// Label/value rows for tables and the export summary sheet.
    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Days", self.total_days.to_string()),
            ("Present Days", self.present_days.to_string()),
            ("No Show Days", self.no_show_days.to_string()),
            ("Attendance Rate", self.attendance_rate_display()),
            ("Late Arrivals", self.late_arrivals.to_string()),
            ("Missing Checkouts", self.missing_checkouts.to_string()),
            ("Morning Shift Days", self.morning_shift_days.to_string()),
            ("Night Shift Days", self.night_shift_days.to_string()),
            ("Average Check In", self.average_check_in_display()),
            ("Average Check Out", self.average_check_out_display()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn punch(department: &str) -> AttendancePunch {
        AttendancePunch {
            employee_id: 1,
            check_in: NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
            check_out: None,
            department: department.to_string(),
        }
    }

    #[test]
    fn test_no_show_sentinel_is_exact() {
        assert!(punch("NO SHOW").is_no_show());
        assert!(!punch("no show").is_no_show());
        assert!(!punch("Production").is_no_show());
    }

    #[test]
    fn test_rate_display() {
        let mut stats = PeriodStatistics::default();
        assert_eq!(stats.attendance_rate_display(), "-");

        stats.attendance_rate = Some(0.6);
        assert_eq!(stats.attendance_rate_display(), "60.0%");
    }

    #[test]
    fn test_dto_optional_fields() {
        let json = r#"{"employee_id":7,"check_in":"2025-03-01T06:00:00Z"}"#;
        let dto: AttendanceRecordDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.employee_id, 7);
        assert!(dto.check_out.is_none());
        assert!(dto.department.is_empty());
    }

    #[test]
    fn test_summary_rows_cover_all_fields() {
        let rows = PeriodStatistics::default().summary_rows();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[8], ("Average Check In", "-".to_string()));
    }
}
