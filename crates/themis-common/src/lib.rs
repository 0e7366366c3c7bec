//! Common error types and time utilities shared by Themis crates.

pub mod error;
pub mod time;

pub use error::{RuleError, RuleResult};
pub use time::{Clock, ManualClock, SystemClock};
