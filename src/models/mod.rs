//! Data models for shift configuration, punches and derived statistics.

pub mod attendance;
pub mod shift;

pub use attendance::{
    AttendancePunch, AttendanceRecordDto, ClassifiedRecord, NO_SHOW_DEPARTMENT, PeriodStatistics, ShiftType,
};
pub use shift::{ShiftConfig, parse_hhmm};
