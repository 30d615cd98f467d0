// Shared utilities: time sources and the background worker pool

pub mod threading;
pub mod time;

pub use threading::{JobReport, ThreadError, Threader};
pub use time::{Clock, ManualClock, Millis, SystemClock};
