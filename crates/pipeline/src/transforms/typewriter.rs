use std::io::Write;
use std::time::Duration;

use crate::transform::{Transform, TransformOutput};

const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Writes `[typewriter] ` followed by each character of the record with
/// an inter-character delay, then a newline. Forwards the record
/// unchanged.
pub struct Typewriter {
    delay: Duration,
}

impl Typewriter {
    pub fn new() -> Self {
        Self { delay: DEFAULT_DELAY }
    }

    /// Builds a typewriter with a custom inter-character delay, used by
    /// tests so the suite does not pay the full ~100ms/char cost.
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Typewriter {
    fn name(&self) -> &str {
        "typewriter"
    }

    fn apply(&mut self, input: &str) -> TransformOutput {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "[typewriter] ");
        let _ = stdout.flush();
        for ch in input.chars() {
            let _ = write!(stdout, "{ch}");
            let _ = stdout.flush();
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }
        println!();
        TransformOutput::PassThrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typewriter_passes_through_unchanged() {
        let mut typewriter = Typewriter::with_delay(Duration::ZERO);
        assert_eq!(typewriter.apply("hi"), TransformOutput::PassThrough);
    }
}
