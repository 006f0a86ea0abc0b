//! Types and traits for recording training statistics.
//!
//! ```rust
//! use pgt_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("average_q", RecordValue::Scalar(0.5));
//! record.insert("env_steps", RecordValue::Scalar(100.0));
//! assert_eq!(record.get_scalar("average_q").unwrap(), 0.5);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use recorder::Recorder;
