//! The transformation contract every stage's per-record logic implements.
//!
//! A transform takes a borrowed record and returns either a new owned
//! record, a "pass this one through unchanged" marker, or "drop it". The
//! three-way output is a typed replacement for a pointer-identity trick
//! (same pointer in vs. out means pass-through, null means drop): an enum
//! the type system can check instead of a comparison the caller has to
//! remember to make.

/// What a [`Transform::apply`] call did with a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutput {
    /// Forward a newly produced string downstream.
    Forward(String),
    /// Forward the input unchanged, without an extra allocation.
    PassThrough,
    /// Drop the record; nothing is forwarded.
    Drop,
}

/// A pure per-record transformation bound to one pipeline stage.
///
/// Implementors are free to hold internal state (e.g. a running counter)
/// but must not block on anything other than their own computation: the
/// blocking points of the pipeline are the queue and the latch, not the
/// transform.
pub trait Transform: Send {
    /// A short, stable name for diagnostics and stage registration.
    fn name(&self) -> &str;

    /// Applies the transformation to a single record.
    fn apply(&mut self, input: &str) -> TransformOutput;
}
