use super::{Record, RecordValue, Recorder};
use log::info;

/// Emits every record as a single `info` line through the [`log`] facade.
///
/// Scalars are printed in key order, e.g.
/// `opt_steps=100 average_q=-1.2345`, where `opt_steps` comes first
/// if the record has it.
#[derive(Default)]
pub struct LogRecorder {}

impl LogRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self {}
    }
}

fn format_value(v: &RecordValue) -> String {
    match v {
        RecordValue::Scalar(v) => format!("{:.4}", v),
    }
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        let head = record
            .get("opt_steps")
            .map(|v| format!("opt_steps={} ", format_value(v)))
            .unwrap_or_default();
        let body = record
            .iter()
            .filter(|(k, _)| k.as_str() != "opt_steps")
            .map(|(k, v)| format!("{}={}", k, format_value(v)))
            .collect::<Vec<_>>()
            .join(" ");
        info!("{}{}", head, body);
    }
}
