//! Period aggregation over one employee's punches.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

use super::classify::{classify_shift, is_late, is_missing_checkout};
use crate::models::attendance::{AttendancePunch, PeriodStatistics, ShiftType};
use crate::models::shift::ShiftConfig;

/// Running mean of clock times, each taken as seconds since midnight
/// on a common reference day.
#[derive(Default)]
struct ClockMean {
    sum: u64,
    count: u64,
}

impl ClockMean {
    fn push(&mut self, instant: NaiveDateTime) {
        self.sum += u64::from(instant.time().num_seconds_from_midnight());
        self.count += 1;
    }

    /// Mean clock time, `None` when nothing was pushed.
    fn clock_time(&self) -> Option<NaiveTime> {
        if self.count == 0 {
            return None;
        }
        let mean = u32::try_from(self.sum / self.count).ok()?;
        NaiveTime::from_num_seconds_from_midnight_opt(mean, 0)
    }
}

/// Build period statistics from already date-filtered punches.
///
/// Pure and order-independent. No-show rows only count towards
/// `total_days` and `no_show_days`.
pub fn aggregate(punches: &[AttendancePunch], config: &ShiftConfig) -> PeriodStatistics {
    let mut stats = PeriodStatistics::default();
    let mut check_ins = ClockMean::default();
    let mut check_outs = ClockMean::default();

    for punch in punches {
        if punch.is_no_show() {
            stats.no_show_days += 1;
            continue;
        }

        stats.present_days += 1;

        match classify_shift(punch.check_in, config) {
            ShiftType::MorningShift => stats.morning_shift_days += 1,
            ShiftType::NightShift => stats.night_shift_days += 1,
            ShiftType::OutsideShiftHours => {}
        }

        if is_late(punch.check_in, config) {
            stats.late_arrivals += 1;
        }

        check_ins.push(punch.check_in);
        if let Some(out) = punch.check_out {
            check_outs.push(out);
        }
        if is_missing_checkout(punch) {
            stats.missing_checkouts += 1;
        }
    }

    stats.total_days = stats.present_days + stats.no_show_days;
    stats.attendance_rate = if stats.total_days == 0 {
        None
    } else {
        Some(stats.present_days as f64 / stats.total_days as f64)
    };
    stats.average_check_in = check_ins.clock_time();
    stats.average_check_out = check_outs.clock_time();

    stats
}
