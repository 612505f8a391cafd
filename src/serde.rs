//! Serde extensions

mod time_of_day;
pub use self::time_of_day::*;
