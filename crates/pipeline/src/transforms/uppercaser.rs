use crate::transform::{Transform, TransformOutput};

/// Forwards the record with ASCII letters upper-cased.
pub struct Uppercaser;

impl Uppercaser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Uppercaser {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Uppercaser {
    fn name(&self) -> &str {
        "uppercaser"
    }

    fn apply(&mut self, input: &str) -> TransformOutput {
        if input.bytes().all(|b| !b.is_ascii_lowercase()) {
            return TransformOutput::PassThrough;
        }
        TransformOutput::Forward(input.to_ascii_uppercase())
    }
}
