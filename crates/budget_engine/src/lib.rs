//! In-memory expense/budget store and the reports derived from it.
//!
//! Nothing in here performs I/O. Callers own a [`Store`], scope its data with
//! a [`Period`], then feed the result to [`summarize`] and
//! [`build_monthly_report`].

pub mod period;
pub mod report;
pub mod store;
pub mod summary;

pub use period::Period;
pub use report::{build_monthly_report, month_label};
pub use store::{PeriodData, Store};
pub use summary::{color_lookup, saturating_total, summarize};
