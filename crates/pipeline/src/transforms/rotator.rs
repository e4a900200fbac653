use crate::transform::{Transform, TransformOutput};

/// Forwards the record right-rotated by one position: the last
/// character becomes the first. Strings of length 0 or 1 are passed
/// through unchanged, since rotating them is a no-op.
pub struct Rotator;

impl Rotator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Rotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Rotator {
    fn name(&self) -> &str {
        "rotator"
    }

    fn apply(&mut self, input: &str) -> TransformOutput {
        let mut chars: Vec<char> = input.chars().collect();
        if chars.len() < 2 {
            return TransformOutput::PassThrough;
        }
        if let Some(last) = chars.pop() {
            chars.insert(0, last);
        }
        TransformOutput::Forward(chars.into_iter().collect())
    }
}
