//! Evaluation trace types for debugging rule behavior.
//!
//! A backtracking search revisits the same rules many times, so instead of a
//! tree the trace is the flat sequence of rule evaluations in the order they
//! were entered. Use [`Rule::match_with_trace`](crate::Rule::match_with_trace)
//! to get one.
//!
//! # Example
//!
//! ```
//! use cpsmatch::rules::*;
//!
//! let trace = eof(val("ab").or(val("a"))).match_with_trace("a");
//! assert!(trace.matched);
//! for step in &trace.path {
//!     println!("{:indent$}{} @ {}", "", step.rule, step.offset, indent = step.depth * 2);
//! }
//! ```

use std::fmt;

/// One rule evaluation in a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchStep {
    /// Variant name of the rule entered (see [`Rule::kind`](crate::Rule::kind)).
    pub rule: &'static str,
    /// Byte offset into the original input where the rule started.
    pub offset: usize,
    /// Nesting depth of the evaluation (1 = the top-level rule).
    pub depth: usize,
}

/// Trace of a full match.
///
/// # INV: `matched` == `matches()` result
///
/// The `matched` field always equals what [`Rule::matches`](crate::Rule::matches)
/// returns for the same input.
#[derive(Clone, PartialEq, Eq)]
pub struct MatchTrace {
    /// The final result.
    pub matched: bool,
    /// Total rule evaluations, including every backtracked attempt.
    pub steps: usize,
    /// Deepest evaluation nesting reached.
    pub max_depth: usize,
    /// Every rule evaluation in entry order.
    pub path: Vec<MatchStep>,
}

impl MatchTrace {
    /// Furthest byte offset any rule was attempted at.
    ///
    /// On a failed match this is usually where the input stopped making sense.
    #[must_use]
    pub fn furthest_offset(&self) -> usize {
        self.path.iter().map(|s| s.offset).max().unwrap_or(0)
    }

    /// Number of evaluations of rules of the given kind.
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.path.iter().filter(|s| s.rule == kind).count()
    }
}

impl fmt::Debug for MatchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchTrace")
            .field("matched", &self.matched)
            .field("steps", &self.steps)
            .field("max_depth", &self.max_depth)
            .field("path_len", &self.path.len())
            .finish()
    }
}
