//! Rule: composable continuation-passing matchers
//!
//! A [`Rule`] is asked to match with a remaining input and a [`Continuation`].
//! It succeeds only if it can consume some prefix such that the continuation
//! accepts what is left. Sequencing wraps the continuation; alternation and
//! repetition backtrack by trying their next option when it refuses.

use crate::eval::{Evaluator, Scope};
use crate::{CharSet, MatchTrace, RuleError, MAX_RECURSION_DEPTH};
use std::fmt;
use std::sync::Arc;

/// Decides whether the unconsumed remainder is acceptable from here on.
///
/// The outcome is `true` or `false`, never a position: combinators rely on
/// short-circuit boolean semantics to stop at the first successful path.
pub type Continuation<'c> = &'c dyn Fn(&str) -> bool;

/// User-defined matching logic that plugs into a rule tree.
///
/// Contract: return `true` only if `cont` returned `true` for the remainder
/// this rule chose to hand it. Never consume input the continuation does not
/// see, and never panic on empty input: fail with `false` instead.
///
/// # Example
///
/// ```
/// use cpsmatch::{Continuation, CustomRule, Rule};
/// use cpsmatch::rules::{eof, sequence};
///
/// /// Matches one ASCII digit.
/// #[derive(Debug)]
/// struct AsciiDigit;
///
/// impl CustomRule for AsciiDigit {
///     fn match_with(&self, input: &str, cont: Continuation<'_>) -> bool {
///         let mut chars = input.chars();
///         chars.next().is_some_and(|c| c.is_ascii_digit()) && cont(chars.as_str())
///     }
/// }
///
/// let two_digits = eof(sequence(Rule::custom(AsciiDigit), [Rule::custom(AsciiDigit)]));
/// assert!(two_digits.matches("42"));
/// assert!(!two_digits.matches("4x"));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `CustomRule`",
    label = "this type cannot be used as a matching rule",
    note = "implement `match_with(&self, &str, Continuation<'_>) -> bool`, or wrap a closure with `Rule::from_fn`"
)]
pub trait CustomRule: Send + Sync + fmt::Debug {
    /// Match a prefix of `input` and hand the rest to `cont`.
    fn match_with(&self, input: &str, cont: Continuation<'_>) -> bool;

    /// Match as part of a running evaluation. This is what the engine calls.
    ///
    /// The default forwards to [`match_with`](Self::match_with). Rules that
    /// wrap other [`Rule`]s should override it and run them through
    /// [`Scope::run`] so they stay under the caller's step budget, nesting
    /// limit and trace.
    fn match_within(&self, scope: &Scope<'_>, input: &str, cont: Continuation<'_>) -> bool {
        let _ = scope;
        self.match_with(input, cont)
    }
}

/// A named closure acting as a [`CustomRule`]. Built by [`Rule::from_fn`].
pub struct FnRule<F> {
    name: &'static str,
    f: F,
}

impl<F> FnRule<F>
where
    F: Fn(&str, Continuation<'_>) -> bool + Send + Sync,
{
    /// Wrap `f` under a display name.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    /// The display name given at construction.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> CustomRule for FnRule<F>
where
    F: Fn(&str, Continuation<'_>) -> bool + Send + Sync,
{
    fn match_with(&self, input: &str, cont: Continuation<'_>) -> bool {
        (self.f)(input, cont)
    }
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnRule").field(&self.name).finish()
    }
}

/// A matching rule.
///
/// Atoms consume exactly one `char`. Composites share their operands through
/// `Arc`, so the same sub-rule can appear in many trees and cloning is cheap.
/// Rules never change after construction.
///
/// Build rules with the [`rules`](crate::rules) factory; the variants are
/// public so trees can be inspected.
///
/// # Variants
///
/// - `Any` / `OneOf` / `Val`: one char, unconditionally / from a set / exactly
/// - `Empty`: consumes nothing, hands the whole input to the continuation
/// - `End`: succeeds iff the input is exhausted, ignoring the continuation
/// - `Append`: first, then second on what first left over
/// - `Or`: first's whole chain, then second's
/// - `Optional` / `Many`: inner (once / repeatedly), else the unmodified input
/// - `Custom`: user logic through [`CustomRule`]
#[derive(Clone, Debug)]
pub enum Rule {
    /// Any single char.
    Any,

    /// A single char from the set.
    OneOf(CharSet),

    /// Exactly this char.
    Val(char),

    /// The empty match: the continuation sees the input untouched.
    Empty,

    /// End of input. Terminal: the continuation is not consulted.
    End,

    /// Sequential composition.
    Append(Arc<Rule>, Arc<Rule>),

    /// Ordered alternation.
    Or(Arc<Rule>, Arc<Rule>),

    /// Zero or one, preferring one.
    Optional(Arc<Rule>),

    /// Zero or more, greedy first.
    /// Re-enters itself lazily at match time, once per repetition.
    Many(Arc<Rule>),

    /// User-defined rule.
    Custom(Arc<dyn CustomRule>),
}

impl Rule {
    /// Wrap a [`CustomRule`] implementation.
    pub fn custom(rule: impl CustomRule + 'static) -> Self {
        Rule::Custom(Arc::new(rule))
    }

    /// Build a custom rule from a closure.
    ///
    /// ```
    /// use cpsmatch::Rule;
    /// use cpsmatch::rules::eof;
    ///
    /// let upper = Rule::from_fn("upper", |input, cont| {
    ///     let mut chars = input.chars();
    ///     chars.next().is_some_and(char::is_uppercase) && cont(chars.as_str())
    /// });
    /// assert!(eof(upper.clone()).matches("Q"));
    /// assert!(!upper.matches("q"));
    /// ```
    pub fn from_fn<F>(name: &'static str, f: F) -> Self
    where
        F: Fn(&str, Continuation<'_>) -> bool + Send + Sync + 'static,
    {
        Self::custom(FnRule::new(name, f))
    }

    /// Does some prefix of `input` match this rule?
    ///
    /// Equivalent to `match_with(input, &|_| true)`. This does NOT require the
    /// whole input to be consumed; wrap with [`eof`](crate::rules::eof) for that.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        self.match_with(input, &|_| true)
    }

    /// Is there a way to consume a prefix of `input` such that `cont` accepts
    /// the remaining suffix?
    ///
    /// Alternatives are explored in order and the search stops at the first
    /// success.
    ///
    /// ```
    /// use cpsmatch::rules::*;
    ///
    /// let ab = val("ab");
    /// assert!(ab.match_with("abc", &|rest| rest == "c"));
    /// assert!(!ab.match_with("abc", &|rest| rest.is_empty()));
    /// ```
    pub fn match_with(&self, input: &str, cont: Continuation<'_>) -> bool {
        Evaluator::unbounded(input).run(self, input, cont)
    }

    /// Prefix match that gives up after `limit` rule evaluations or once
    /// evaluation nests deeper than [`MAX_RECURSION_DEPTH`].
    ///
    /// Badly composed rules (nested repetition, overlapping alternatives)
    /// backtrack exponentially on inputs that almost match, and every
    /// consumed repetition nests one level deeper. Use this on untrusted
    /// input; [`DEFAULT_STEP_LIMIT`](crate::DEFAULT_STEP_LIMIT) is a
    /// reasonable starting budget. Custom rules count against both limits
    /// only for the nested rules they run through [`Scope::run`].
    ///
    /// A match found before a limit was hit is still reported as `Ok(true)`.
    ///
    /// # Errors
    ///
    /// - [`RuleError::StepLimitExceeded`] if the budget ran out before the
    ///   search found a match
    /// - [`RuleError::RecursionLimitExceeded`] if the search had to nest
    ///   deeper than [`MAX_RECURSION_DEPTH`] before finding a match
    ///
    /// ```
    /// use cpsmatch::prelude::*;
    ///
    /// let rule = eof(one_or_more(one_or_more(val('a'))));
    /// let input = format!("{}!", "a".repeat(30));
    /// assert!(rule.match_bounded(&input, 10_000).is_err());
    ///
    /// let long = "x".repeat(100_000);
    /// assert_eq!(
    ///     eof(many(any())).match_bounded(&long, cpsmatch::DEFAULT_STEP_LIMIT),
    ///     Err(RuleError::RecursionLimitExceeded { limit: cpsmatch::MAX_RECURSION_DEPTH })
    /// );
    /// ```
    pub fn match_bounded(&self, input: &str, limit: usize) -> Result<bool, RuleError> {
        let evaluator = Evaluator::bounded(input, limit, MAX_RECURSION_DEPTH);
        let matched = evaluator.run(self, input, &|_| true);
        if !matched && evaluator.too_deep() {
            tracing::warn!(
                limit = MAX_RECURSION_DEPTH,
                input_len = input.len(),
                "rule exceeded its nesting limit"
            );
            return Err(RuleError::RecursionLimitExceeded {
                limit: MAX_RECURSION_DEPTH,
            });
        }
        if !matched && evaluator.exhausted() {
            tracing::warn!(limit, input_len = input.len(), "rule exceeded its step budget");
            return Err(RuleError::StepLimitExceeded { limit });
        }
        tracing::debug!(steps = evaluator.steps(), matched, "bounded match finished");
        Ok(matched)
    }

    /// Prefix match with a full record of the evaluation path.
    ///
    /// `matched` always equals what [`matches`](Self::matches) returns. The
    /// trace grows with every rule evaluation, so keep inputs small.
    #[must_use]
    pub fn match_with_trace(&self, input: &str) -> MatchTrace {
        let evaluator = Evaluator::tracing(input);
        let matched = evaluator.run(self, input, &|_| true);
        evaluator.into_trace(matched)
    }

    /// Sequential composition: `self`, then `other` on whatever `self` left.
    ///
    /// `other` runs under the original continuation, so a later failure makes
    /// `self` backtrack into its next way of matching.
    #[must_use]
    pub fn append(self, other: Rule) -> Rule {
        Rule::Append(Arc::new(self), Arc::new(other))
    }

    /// Ordered alternation: `self` with the continuation, and only if that
    /// whole path fails, `other` with the same continuation.
    #[must_use]
    pub fn or(self, other: Rule) -> Rule {
        Rule::Or(Arc::new(self), Arc::new(other))
    }

    /// Short name of this node's variant, as used in traces.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Any => "any",
            Rule::OneOf(_) => "one_of",
            Rule::Val(_) => "val",
            Rule::Empty => "empty",
            Rule::End => "end",
            Rule::Append(..) => "append",
            Rule::Or(..) => "or",
            Rule::Optional(_) => "optional",
            Rule::Many(_) => "many",
            Rule::Custom(_) => "custom",
        }
    }

    /// Returns `true` for the single-char atoms (`Any`, `OneOf`, `Val`).
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(self, Rule::Any | Rule::OneOf(_) | Rule::Val(_))
    }

    /// Returns `true` if this is an `Append` node.
    #[must_use]
    pub fn is_append(&self) -> bool {
        matches!(self, Rule::Append(..))
    }

    /// Returns `true` if this is an `Or` node.
    #[must_use]
    pub fn is_or(&self) -> bool {
        matches!(self, Rule::Or(..))
    }

    /// Returns `true` if this is a `Many` node.
    #[must_use]
    pub fn is_many(&self) -> bool {
        matches!(self, Rule::Many(_))
    }

    /// Depth of the rule tree. Leaves are depth 1.
    ///
    /// Literals are left folds, so `val("abcd")` is already depth 4.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Rule::Any
            | Rule::OneOf(_)
            | Rule::Val(_)
            | Rule::Empty
            | Rule::End
            | Rule::Custom(_) => 1,
            Rule::Append(a, b) | Rule::Or(a, b) => 1 + a.depth().max(b.depth()),
            Rule::Optional(r) | Rule::Many(r) => 1 + r.depth(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Display
// ═══════════════════════════════════════════════════════════════════════════════

/// Collects the operands of a chain of same-kind binary nodes, left to right.
fn flatten<'r>(rule: &'r Rule, out: &mut Vec<&'r Rule>, is_link: fn(&Rule) -> bool) {
    match rule {
        Rule::Append(a, b) | Rule::Or(a, b) if is_link(rule) => {
            flatten(a, out, is_link);
            flatten(b, out, is_link);
        }
        _ => out.push(rule),
    }
}

fn write_sequence(f: &mut fmt::Formatter<'_>, parts: &[&Rule]) -> fmt::Result {
    f.write_str("seq(")?;
    let mut literal = String::new();
    let mut first = true;
    let mut sep = |f: &mut fmt::Formatter<'_>| -> fmt::Result {
        if !std::mem::take(&mut first) {
            f.write_str(", ")?;
        }
        Ok(())
    };
    for part in parts {
        if let Rule::Val(c) = part {
            literal.push(*c);
            continue;
        }
        if !literal.is_empty() {
            sep(f)?;
            write!(f, "{:?}", std::mem::take(&mut literal))?;
        }
        sep(f)?;
        write!(f, "{part}")?;
    }
    if !literal.is_empty() {
        sep(f)?;
        write!(f, "{literal:?}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Any => f.write_str("any"),
            Rule::OneOf(set) => write!(f, "one_of({set})"),
            Rule::Val(c) => write!(f, "{c:?}"),
            Rule::Empty => f.write_str("empty"),
            Rule::End => f.write_str("end"),
            Rule::Append(..) => {
                let mut parts = Vec::new();
                flatten(self, &mut parts, Rule::is_append);
                // A run of chars is a literal: render it as one.
                if parts.iter().all(|p| matches!(p, Rule::Val(_))) {
                    let literal: String = parts
                        .iter()
                        .filter_map(|p| match p {
                            Rule::Val(c) => Some(*c),
                            _ => None,
                        })
                        .collect();
                    return write!(f, "{literal:?}");
                }
                write_sequence(f, &parts)
            }
            Rule::Or(..) => {
                let mut parts = Vec::new();
                flatten(self, &mut parts, Rule::is_or);
                f.write_str("alt(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str(")")
            }
            Rule::Optional(r) => write!(f, "optional({r})"),
            Rule::Many(r) => write!(f, "many({r})"),
            Rule::Custom(c) => write!(f, "custom({c:?})"),
        }
    }
}
