//! Per-punch classification: shift bucket, lateness and missing checkout.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::models::attendance::{AttendancePunch, ClassifiedRecord, ShiftType};
use crate::models::shift::ShiftConfig;

/// Allowance after shift start before a check-in counts as late.
pub const GRACE_PERIOD_MINUTES: i64 = 60;

/// Time-of-day of an instant at minute precision (`HH:mm`).
fn minute_of_day(instant: NaiveDateTime) -> NaiveTime {
    NaiveTime::from_hms_opt(instant.hour(), instant.minute(), 0).unwrap_or(NaiveTime::MIN)
}

/// Map a local check-in to its shift bucket.
///
/// Both window bounds are inclusive. Night windows wrap midnight, with
/// `shift_end` read as the next calendar day.
pub fn classify_shift(check_in: NaiveDateTime, config: &ShiftConfig) -> ShiftType {
    let t = minute_of_day(check_in);

    if config.is_night_shift {
        // t <= 23:59 and t >= 00:00 always hold at minute precision.
        if t >= config.shift_start || t <= config.shift_end {
            ShiftType::NightShift
        } else {
            ShiftType::OutsideShiftHours
        }
    } else if config.shift_start <= t && t <= config.shift_end {
        ShiftType::MorningShift
    } else {
        ShiftType::OutsideShiftHours
    }
}

/// Whether a check-in is past shift start plus the grace period.
///
/// The grace window is anchored to the check-in's own calendar date, also for
/// night shifts.
pub fn is_late(check_in: NaiveDateTime, config: &ShiftConfig) -> bool {
    let grace_end = check_in.date().and_time(config.shift_start) + TimeDelta::minutes(GRACE_PERIOD_MINUTES);
    check_in > grace_end
}

pub fn is_missing_checkout(punch: &AttendancePunch) -> bool {
    punch.check_out.is_none()
}

/// Derive every per-row field for one punch.
pub fn classify_punch(punch: &AttendancePunch, config: &ShiftConfig) -> ClassifiedRecord {
    ClassifiedRecord {
        shift_type: classify_shift(punch.check_in, config),
        is_late: is_late(punch.check_in, config),
        is_missing_checkout: is_missing_checkout(punch),
        punch: punch.clone(),
    }
}

/// Classify every punch, keeping input order.
pub fn classify_all(punches: &[AttendancePunch], config: &ShiftConfig) -> Vec<ClassifiedRecord> {
    punches.iter().map(|p| classify_punch(p, config)).collect()
}
