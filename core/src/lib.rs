//! cpsmatch - Continuation-passing backtracking string matcher
//!
//! A matching engine built from small composable rules. Every rule is asked
//! "given this remaining input, and a continuation that decides whether a
//! suffix is acceptable, is there a way for you to match?" Alternation and
//! repetition backtrack simply by trying the next option when the
//! continuation says no, so no explicit backtracking stack is needed.
//!
//! # Architecture
//!
//! - [`Rule`]: Tagged rule tree with `Arc`-shared children (immutable, `Send + Sync`)
//! - [`Continuation`]: `&dyn Fn(&str) -> bool`, decides whether a suffix is acceptable
//! - [`rules`]: Factory: `any`, `one_of`, `val`, `optional`, `many`, `one_or_more`,
//!   `eof`, `sequence`, `alternative`
//! - [`CustomRule`]: Extension seam for rules the factory does not provide
//! - [`Scope`]: Runs nested rules of a custom rule under the caller's evaluation
//! - [`MatchTrace`]: Evaluation path for debugging
//!
//! # Key Semantics
//!
//! 1. **Prefix by default**: [`Rule::matches`] uses an accept-all continuation, so it
//!    answers "does some prefix match?". Wrap in [`rules::eof`] for whole-string matching.
//!
//! 2. **Ordered alternation over the whole chain**: `a.or(b)` only tries `b` once `a`
//!    cannot complete the *entire* remaining match, not merely when `a` fails locally.
//!
//! 3. **Boolean outcome**: matching never errors. Only construction (config, dynamic
//!    composites) and bounded matching report [`RuleError`].
//!
//! # Example
//!
//! ```
//! use cpsmatch::rules::*;
//!
//! let digits = one_or_more(one_of("0123456789"));
//! let decimal = eof(sequence(
//!     digits.clone(),
//!     [optional(sequence(val("."), [digits]))],
//! ));
//!
//! assert!(decimal.matches("123"));
//! assert!(decimal.matches("12.5"));
//! assert!(!decimal.matches("12."));
//! assert!(!decimal.matches("1a"));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod charset;
mod eval;
mod rule;
pub mod rules;
mod trace;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use charset::CharSet;
pub use eval::Scope;
pub use rule::{Continuation, CustomRule, FnRule, Rule};
pub use trace::{MatchStep, MatchTrace};

#[cfg(feature = "config")]
pub use config::RuleConfig;

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use cpsmatch::prelude::*;
///
/// let greeting = seq![val("hello"), many(val(' ')), one_of("wW")];
/// assert!(greeting.matches("hello   world"));
/// ```
pub mod prelude {
    pub use crate::rules::{
        alternative, any, empty, end, eof, many, one_of, one_or_more, optional, sequence,
        try_alternative, try_sequence, val,
    };
    pub use crate::{
        alt, seq, CharSet, Continuation, CustomRule, FnRule, MatchStep, MatchTrace, Rule,
        RuleError, Scope,
    };

    #[cfg(feature = "config")]
    pub use crate::RuleConfig;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed nesting depth for a rule config.
///
/// Bounds the recursion of config deserialization and compilation. The
/// evaluator's own nesting is bounded by [`MAX_RULE_NODES`] for configs and by
/// [`MAX_RECURSION_DEPTH`] for bounded matches.
/// Checked by [`RuleConfig::compile`](crate::RuleConfig::compile).
/// Rules built in code are not limited; use [`Rule::depth`] to inspect them.
pub const MAX_DEPTH: usize = 32;

/// Maximum number of children in a single `sequence` or `alternative` config.
///
/// Width-based protection: a flat config with millions of children bypasses
/// [`MAX_DEPTH`] but still builds a left fold that deep.
pub const MAX_RULES_PER_COMPOSITE: usize = 256;

/// Maximum length (in chars) of a literal or a character set in a rule config.
///
/// A literal of `n` chars builds `2n - 1` rule nodes, so this must stay well
/// under [`MAX_RULE_NODES`].
pub const MAX_LITERAL_LENGTH: usize = 512;

/// Maximum number of rule nodes a config may compile to.
///
/// Along one match path each node is entered at most once per repetition,
/// and every entry nests a stack frame. Without repetition the evaluator
/// therefore never nests deeper than this, which fits a 2 MiB thread stack
/// (the default for spawned threads) in debug builds.
pub const MAX_RULE_NODES: usize = 2048;

/// Maximum evaluation nesting for [`Rule::match_bounded`].
///
/// Repetition nests one level per consumed repetition, so nesting grows with
/// the input. Same figure as [`MAX_RULE_NODES`], for the same stack.
pub const MAX_RECURSION_DEPTH: usize = 2048;

/// Default step budget for [`Rule::match_bounded`] callers that have no better figure.
///
/// One step is one rule evaluation. Linear rules on realistic inputs stay far
/// below this; nested repetition on adversarial input blows past it quickly.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from rule construction and bounded matching.
///
/// Plain matching never fails: a rule that does not match returns `false`.
/// These errors come from building rules out of untrusted shapes (configs,
/// runtime-sized rule lists) and from giving up on a runaway search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// A `sequence` or `alternative` was given no rules.
    #[error("{kind} requires at least one rule")]
    EmptyComposite {
        /// Which combinator was being built (`"sequence"` or `"alternative"`).
        kind: &'static str,
    },

    /// Config nesting exceeds [`MAX_DEPTH`].
    #[error(
        "rule nesting depth is {depth}, but maximum allowed is {max}; \
         flatten the rule or split it into smaller pieces"
    )]
    DepthExceeded {
        /// Actual depth of the config tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// Too many children in a single composite config.
    #[error("composite rule has {count} children, but maximum allowed is {max}")]
    TooManyRules {
        /// Actual count of children.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A literal or character set exceeds [`MAX_LITERAL_LENGTH`].
    #[error("literal length is {len}, but maximum allowed is {max}")]
    LiteralTooLong {
        /// Actual length in chars.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A config compiles to more rule nodes than [`MAX_RULE_NODES`].
    #[error("rule compiles to {nodes} nodes, but maximum allowed is {max}")]
    TooManyNodes {
        /// Node count of the compiled rule (saturating).
        nodes: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A bounded match nested deeper than [`MAX_RECURSION_DEPTH`].
    #[error("match gave up at nesting depth {limit}; the input is too long for this rule")]
    RecursionLimitExceeded {
        /// The nesting limit that was hit.
        limit: usize,
    },

    /// A bounded match ran out of steps before reaching a verdict.
    #[error("match gave up after {limit} steps; the rule backtracks too much for this input")]
    StepLimitExceeded {
        /// The step budget that was exhausted.
        limit: usize,
    },

    /// Configuration deserialization failed.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// The underlying error message.
        message: String,
    },
}
