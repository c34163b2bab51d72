//! Employee attendance report orchestration.

use crate::attendance::{self, DateRange};
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::attendance::{AttendanceRecordDto, ClassifiedRecord, PeriodStatistics};
use crate::models::shift::ShiftConfig;
use crate::time::BusinessClock;
use tracing::{debug, info};

/// Everything the attendance view shows for one employee and range.
#[derive(Debug, Clone)]
pub struct EmployeeReport {
    pub employee_id: i64,
    pub range: DateRange,
    pub shift: ShiftConfig,
    pub records: Vec<ClassifiedRecord>,
    pub stats: PeriodStatistics,
    /// Rows dropped for an unreadable check-in.
    pub rejected: usize,
    /// Rows the API returned outside the requested range.
    pub out_of_range: usize,
}

impl EmployeeReport {
    /// Get summary message.
    pub fn summary(&self) -> String {
        let base = format!(
            "Employee {}, {} to {} ({} days): {} records, {} present, {} no-show, rate {}",
            self.employee_id,
            self.range.start,
            self.range.end,
            self.range.days(),
            self.stats.total_days,
            self.stats.present_days,
            self.stats.no_show_days,
            self.stats.attendance_rate_display()
        );
        if self.rejected > 0 {
            format!("{base} ({} unreadable records skipped)", self.rejected)
        } else {
            base
        }
    }
}

/// Localize, range-filter, classify and aggregate raw API rows.
pub fn build_report(
    employee_id: i64,
    range: DateRange,
    shift: ShiftConfig,
    rows: &[AttendanceRecordDto],
    clock: &BusinessClock,
) -> EmployeeReport {
    let localized = clock.localize_all(rows);

    let total = localized.punches.len();
    let punches: Vec<_> = localized
        .punches
        .into_iter()
        .filter(|p| range.contains(p.check_in.date()))
        .collect();
    let out_of_range = total - punches.len();
    if out_of_range > 0 {
        debug!("Dropped {out_of_range} records outside {} - {}", range.start, range.end);
    }

    let records = attendance::classify_all(&punches, &shift);
    let stats = attendance::aggregate(&punches, &shift);

    EmployeeReport {
        employee_id,
        range,
        shift,
        records,
        stats,
        rejected: localized.rejected,
        out_of_range,
    }
}

/// Fetches the data behind an employee report.
pub struct ReportService<'a> {
    client: &'a ApiClient,
    clock: BusinessClock,
}

impl<'a> ReportService<'a> {
    pub fn new(client: &'a ApiClient, clock: BusinessClock) -> Self {
        Self { client, clock }
    }

    /// Fetch shift config and punches, then build the report.
    pub async fn employee_report(&self, employee_id: i64, range: DateRange) -> Result<EmployeeReport> {
        let shift = self.client.get_shift(employee_id).await?;
        let rows = self.client.fetch_attendance(employee_id, range).await?;

        let report = build_report(employee_id, range, shift, &rows, &self.clock);
        info!("{}", report.summary());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::ShiftType;
    use crate::time::parse_utc_offset;

    fn row(id: i64, check_in: &str, check_out: Option<&str>, department: &str) -> AttendanceRecordDto {
        AttendanceRecordDto {
            id: Some(id),
            employee_id: 12,
            check_in: check_in.to_string(),
            check_out: check_out.map(str::to_string),
            department: department.to_string(),
        }
    }

    fn clock() -> BusinessClock {
        BusinessClock::new(parse_utc_offset("+08:00").unwrap())
    }

    #[test]
    fn test_build_report_localizes_before_classifying() {
        // 22:30Z is 06:30 local on the next day.
        let rows = vec![row(1, "2025-03-01T22:30:00Z", Some("2025-03-02T10:00:00Z"), "Production")];
        let range = DateRange::parse("2025-03-01", "2025-03-31").unwrap();

        let report = build_report(12, range, ShiftConfig::default(), &rows, &clock());

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].shift_type, ShiftType::MorningShift);
        assert!(!report.records[0].is_late);
        assert_eq!(report.stats.present_days, 1);
        assert_eq!(report.stats.average_check_out_display(), "06:00 PM");
    }

    #[test]
    fn test_build_report_skips_bad_and_out_of_range_rows() {
        let rows = vec![
            row(1, "2025-03-02T00:00:00+08:00", None, "Production"),
            row(2, "bad", None, "Production"),
            row(3, "2025-04-01T08:00:00+08:00", None, "Production"),
            row(4, "2025-03-03T00:00:00+08:00", None, "NO SHOW"),
        ];
        let range = DateRange::parse("2025-03-01", "2025-03-31").unwrap();

        let report = build_report(12, range, ShiftConfig::default(), &rows, &clock());

        assert_eq!(report.rejected, 1);
        assert_eq!(report.out_of_range, 1);
        assert_eq!(report.stats.total_days, 2);
        assert_eq!(report.stats.no_show_days, 1);
        assert!(report.summary().contains("1 unreadable records skipped"));
    }

    #[test]
    fn test_build_report_empty() {
        let range = DateRange::parse("2025-03-01", "2025-03-31").unwrap();
        let report = build_report(12, range, ShiftConfig::default(), &[], &clock());
        assert_eq!(report.stats.attendance_rate, None);
        let summary = report.summary();
        assert!(summary.contains("2025-03-01 to 2025-03-31 (31 days): 0 records"));
        assert!(summary.ends_with("rate -"));
    }
}
