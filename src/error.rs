//! Error types for the hardnested brute-force engine.
//!
//! Per the error handling design: cryptographic mismatch (a candidate that
//! fails verification) is the expected common case and is never modeled as
//! an error, only as a `None`/`false` return. The only conditions that
//! surface here are resource exhaustion and missing ambient data.

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HardnestedError {
    /// A 16-byte aligned allocation failed.
    ///
    /// Unlike the other variants, this is not meant to be caught and
    /// handled: the original implementation treats allocation failure during
    /// brute force as fatal (`exit(4)`), since there is no partial state
    /// that is safe to leave behind. Callers that construct an
    /// `AlignedU32Array` get this via `std::alloc::handle_alloc_error`
    /// instead, which aborts the process directly; this variant exists for
    /// API surfaces that can still report failure by value.
    #[snafu(display("out of memory: failed to allocate {size} aligned bytes"))]
    OutOfMemory { size: usize },

    /// The benchmark data blob is missing or malformed.
    #[snafu(display("benchmark data unavailable: {reason}"))]
    BenchmarkDataUnavailable { reason: String },
}
