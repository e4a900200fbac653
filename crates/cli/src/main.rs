//! Command-line entry point for the text-transformation pipeline.
//!
//! Invocation: `stagepipe <queue_size> <stage_name_1> ... <stage_name_N>`.
//! Reads one record per line from stdin, feeds it into the pipeline, and
//! stops at the line `<END>` (synthesizing one if stdin closes first).
//! Exit codes: 0 clean shutdown, 1 usage/load failure, 2 stage init or
//! runtime failure.

use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipeline::{exit_code, register_builtins, Pipeline, PipelineError, StageRegistry, SENTINEL};

/// Maximum accepted line length, in bytes. Longer lines are truncated
/// with a warning rather than rejected outright.
const MAX_LINE_BYTES: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "stagepipe", about = "Chain stages into a text-transformation pipeline")]
struct Cli {
    /// Capacity of every stage's input queue.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    queue_size: u64,

    /// Stage names, applied in order (at least one required).
    #[arg(required = true, num_args = 1..)]
    stages: Vec<String>,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stagepipe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Reads one record at a time from `reader`, truncating any line over
/// [`MAX_LINE_BYTES`] and logging a warning when it does. Returns `None`
/// once the source is exhausted.
fn read_record(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    let bytes_read = reader.read_line(&mut line)?;
    if bytes_read == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    if line.len() > MAX_LINE_BYTES {
        tracing::warn!(len = line.len(), "line exceeds max length, truncating");
        let mut boundary = MAX_LINE_BYTES;
        while !line.is_char_boundary(boundary) {
            boundary -= 1;
        }
        let mut truncated = line;
        truncated.truncate(boundary);
        return Ok(Some(truncated));
    }
    Ok(Some(line))
}

fn build_registry() -> StageRegistry {
    let mut registry = StageRegistry::new();
    register_builtins(&mut registry);
    registry
}

fn run() -> Result<(), PipelineError> {
    let cli = Cli::try_parse().map_err(|e| PipelineError::Usage(e.to_string()))?;
    let registry = build_registry();
    let pipeline = Pipeline::build(&registry, cli.queue_size as usize, &cli.stages)?;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut saw_sentinel = false;
    let mut feed_error = None;
    while let Some(record) = read_record(&mut reader).map_err(|e| PipelineError::Fatal(e.to_string()))? {
        let is_sentinel = record == SENTINEL;
        if let Err(err) = pipeline.feed(record) {
            tracing::warn!(error = %err, "error feeding record, stopping input");
            feed_error = Some(err);
            break;
        }
        if is_sentinel {
            saw_sentinel = true;
            break;
        }
    }
    if !saw_sentinel && feed_error.is_none() {
        feed_error = pipeline.finish_feed().err();
    }

    // Quiesce and tear down the stages that were fed, whether or not the
    // feed itself errored, so no worker thread is abandoned.
    pipeline.quiesce_and_teardown()?;
    if let Some(err) = feed_error {
        return Err(err);
    }
    println!("Pipeline shutdown complete");
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(exit_code(&err) as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_one_line_at_a_time_without_trailing_newline() {
        let mut cursor = Cursor::new(b"hello\nworld\n".to_vec());
        assert_eq!(read_record(&mut cursor).unwrap().as_deref(), Some("hello"));
        assert_eq!(read_record(&mut cursor).unwrap().as_deref(), Some("world"));
        assert_eq!(read_record(&mut cursor).unwrap(), None);
    }

    #[test]
    fn last_line_without_trailing_newline_is_still_read() {
        let mut cursor = Cursor::new(b"no newline".to_vec());
        assert_eq!(read_record(&mut cursor).unwrap().as_deref(), Some("no newline"));
        assert_eq!(read_record(&mut cursor).unwrap(), None);
    }

    #[test]
    fn end_sentinel_line_is_read_like_any_other_line() {
        let mut cursor = Cursor::new(b"<END>\n".to_vec());
        assert_eq!(read_record(&mut cursor).unwrap().as_deref(), Some(SENTINEL));
    }

    #[test]
    fn overlong_lines_are_truncated_not_rejected() {
        let long_line = "x".repeat(MAX_LINE_BYTES + 50);
        let mut input = long_line.clone().into_bytes();
        input.push(b'\n');
        let mut cursor = Cursor::new(input);
        let record = read_record(&mut cursor).unwrap().unwrap();
        assert_eq!(record.len(), MAX_LINE_BYTES);
        assert_eq!(record, &long_line[..MAX_LINE_BYTES]);
    }

    #[test]
    fn overlong_multibyte_line_truncates_to_a_char_boundary() {
        // 342 '€' characters (3 bytes each) is 1026 bytes; byte 1024 falls
        // mid-codepoint (1023 = 341 * 3), so a naive truncate(1024) would
        // panic. The truncation point must back off to the boundary at 1023.
        let long_line = "€".repeat(342);
        let mut input = long_line.clone().into_bytes();
        input.push(b'\n');
        let mut cursor = Cursor::new(input);
        let record = read_record(&mut cursor).unwrap().unwrap();
        assert!(record.len() <= MAX_LINE_BYTES);
        assert!(long_line.is_char_boundary(record.len()));
        assert_eq!(record, &long_line[..record.len()]);
    }

    #[test]
    fn empty_input_yields_none_immediately() {
        let mut cursor = Cursor::new(Vec::new());
        assert_eq!(read_record(&mut cursor).unwrap(), None);
    }
}
