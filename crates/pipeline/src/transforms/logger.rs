use tracing::info;

use crate::transform::{Transform, TransformOutput};

/// Logs every record it sees, at `info` level and to stdout, and
/// forwards it unchanged.
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Logger {
    fn name(&self) -> &str {
        "logger"
    }

    fn apply(&mut self, input: &str) -> TransformOutput {
        println!("[logger] {input}");
        info!(record = input, "logged");
        TransformOutput::PassThrough
    }
}
