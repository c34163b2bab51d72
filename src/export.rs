//! Excel export functionality.

use crate::error::Result;
use crate::models::attendance::{ClassifiedRecord, PeriodStatistics};
use crate::time::PLACEHOLDER;
use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

fn write_headers(worksheet: &mut Worksheet, headers: &[&str]) -> std::result::Result<(), XlsxError> {
    let format = header_format();
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &format)?;
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Export an employee's classified punches and period summary.
///
/// Sheet "Attendance" has one row per punch; sheet "Summary" one row per statistic.
pub fn export_attendance_report(
    records: &[ClassifiedRecord],
    stats: &PeriodStatistics,
    path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Attendance")?;

    let headers = [
        "Date",
        "Check In",
        "Check Out",
        "Department",
        "Shift",
        "Late",
        "Missing Checkout",
    ];
    write_headers(worksheet, &headers)?;

    worksheet.set_column_width(0, 12)?; // Date
    worksheet.set_column_width(1, 10)?; // Check In
    worksheet.set_column_width(2, 10)?; // Check Out
    worksheet.set_column_width(3, 20)?; // Department
    worksheet.set_column_width(4, 20)?; // Shift
    worksheet.set_column_width(5, 8)?; // Late
    worksheet.set_column_width(6, 16)?; // Missing Checkout

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        let punch = &record.punch;

        worksheet.write_string(row, 0, punch.check_in.format("%Y-%m-%d").to_string())?;
        if punch.is_no_show() {
            worksheet.write_string(row, 1, PLACEHOLDER)?;
            worksheet.write_string(row, 2, PLACEHOLDER)?;
            worksheet.write_string(row, 3, &punch.department)?;
            continue;
        }

        worksheet.write_string(row, 1, punch.check_in.format("%H:%M:%S").to_string())?;
        let check_out = punch
            .check_out
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string());
        worksheet.write_string(row, 2, check_out)?;
        worksheet.write_string(row, 3, &punch.department)?;
        worksheet.write_string(row, 4, record.shift_type.label())?;
        worksheet.write_string(row, 5, yes_no(record.is_late))?;
        worksheet.write_string(row, 6, yes_no(record.is_missing_checkout))?;
    }

    if !records.is_empty() {
        let last_row = records.len() as u32;
        worksheet.autofilter(0, 0, last_row, 6)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;
    write_headers(summary, &["Statistic", "Value"])?;
    summary.set_column_width(0, 22)?;
    summary.set_column_width(1, 14)?;

    for (idx, (label, value)) in stats.summary_rows().into_iter().enumerate() {
        let row = (idx + 1) as u32;
        summary.write_string(row, 0, label)?;
        summary.write_string(row, 1, value)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.xlsx", ts = now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::{aggregate, classify_all};
    use crate::models::attendance::AttendancePunch;
    use crate::models::shift::ShiftConfig;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_generate_export_filename() {
        let name = generate_export_filename("attendance_42");
        assert!(name.starts_with("attendance_42_"));
        assert!(name.ends_with(".xlsx"));
    }

    #[test]
    fn test_export_writes_file() {
        let day = NaiveDate::from_ymd_opt(2025, 4, 2).unwrap();
        let punches = vec![
            AttendancePunch {
                employee_id: 2,
                check_in: day.and_hms_opt(6, 15, 0).unwrap(),
                check_out: Some(day.and_hms_opt(18, 0, 0).unwrap()),
                department: "Production".to_string(),
            },
            AttendancePunch {
                employee_id: 2,
                check_in: day.succ_opt().unwrap().and_hms_opt(0, 0, 0).unwrap(),
                check_out: None,
                department: "NO SHOW".to_string(),
            },
        ];
        let config = ShiftConfig::default();
        let records = classify_all(&punches, &config);
        let stats = aggregate(&punches, &config);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("attendance.xlsx");
        export_attendance_report(&records, &stats, &path).unwrap();

        assert!(path.exists());
    }
}
