//! Shift classification and period statistics.
//!
//! Everything here is pure: callers pass punches already converted to
//! business-local time (see [`crate::time::BusinessClock`]) and already
//! filtered to the date range being viewed.
//!
//! # Example
//!
//! ```ignore
//! use iceplant_attendance::attendance;
//!
//! let stats = attendance::aggregate(&punches, &shift);
//! println!("Attendance rate: {}", stats.attendance_rate_display());
//! ```

mod classify;
mod range;
mod stats;

pub use classify::{GRACE_PERIOD_MINUTES, classify_all, classify_punch, classify_shift, is_late, is_missing_checkout};
pub use range::{DateRange, parse_flexible_date};
pub use stats::aggregate;
