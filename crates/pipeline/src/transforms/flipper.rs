use crate::transform::{Transform, TransformOutput};

/// Forwards the character-reverse of the record.
pub struct Flipper;

impl Flipper {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Flipper {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Flipper {
    fn name(&self) -> &str {
        "flipper"
    }

    fn apply(&mut self, input: &str) -> TransformOutput {
        if input.chars().count() < 2 {
            return TransformOutput::PassThrough;
        }
        TransformOutput::Forward(input.chars().rev().collect())
    }
}
