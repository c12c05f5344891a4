//! Error type for the triangulation pipeline.

use crate::halfedge::EdgeId;

/// Failure modes surfaced by [`crate::Triangulator`].
///
/// `RotateRejected` is deliberately absent: spec.md §7 treats a refused
/// rotation as silent, at most a `trace!` log line, never a `Result::Err`.
/// `SplitFailed` is non-fatal too — callers count it in
/// [`crate::TriangulationStats`] and `warn!` rather than aborting — but it is
/// still a variant here so pipeline stages that *do* want to bail out early
/// (e.g. a caller-facing retry policy) have something concrete to match on.
#[derive(Debug, thiserror::Error)]
pub enum TriangulationError {
    /// The input boundary failed a structural precondition: fewer than 3
    /// vertices, a ring that isn't closed, or a normal of near-zero length.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A half-edge invariant (triangle closure, twin symmetry, directed-edge
    /// uniqueness) was violated in a way that rotate/split can't recover
    /// from. Indicates a bug rather than a malformed-but-valid input.
    #[error("half-edge topology invariant violated: {0}")]
    BadTopology(String),

    /// An edge split was attempted and rejected (not a triangle pair, or the
    /// candidate point failed the thin-V-pair rejection). Non-fatal; kept as
    /// a variant for callers that want to distinguish "some splits were
    /// skipped" from "nothing went wrong at all".
    #[error("edge split failed for {0:?}")]
    SplitFailed(EdgeId),
}
