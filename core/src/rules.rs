//! Rule factory: primitive atoms and derived combinators.
//!
//! Everything here builds a [`Rule`]; nothing matches at construction time.
//! Derived combinators are defined in terms of the primitives the same way
//! one would write them by hand (`one_or_more(r)` is `r.append(many(r))`,
//! `eof(r)` is `r.append(end())`).

use crate::{CharSet, Rule, RuleError};
use std::sync::Arc;

/// Matches exactly one char, whatever it is. Fails on empty input.
#[must_use]
pub fn any() -> Rule {
    Rule::Any
}

/// Matches one char that is a member of `set`.
///
/// ```
/// use cpsmatch::rules::one_of;
///
/// let sign = one_of("+-");
/// assert!(sign.matches("-1"));
/// assert!(!sign.matches("1"));
/// ```
pub fn one_of(set: impl Into<CharSet>) -> Rule {
    Rule::OneOf(set.into())
}

/// Matches a single char or a literal string.
///
/// A literal is the left fold of its chars with [`Rule::append`], so a
/// literal of `n` chars is `n` levels deep.
///
/// The empty literal is [`empty`]: it consumes nothing and hands the whole
/// input to the continuation, so `val("")` matches any prefix but
/// `eof(val(""))` matches only `""`. It is not an end-of-input test; an
/// implementation that answers "is the input empty?" for `val("")` rejects
/// `val("").matches("x")`, which this one accepts. Use [`end`] for that.
///
/// ```
/// use cpsmatch::rules::{eof, val};
///
/// assert!(val('x').matches("xyz"));
/// assert!(val("xy").matches("xyz"));
/// assert!(!eof(val("xy")).matches("xyz"));
/// assert!(val("").matches("anything"));
/// assert!(!eof(val("")).matches("anything"));
/// ```
pub fn val(value: impl Literal) -> Rule {
    value.into_rule()
}

/// Values accepted by [`val`]: a single `char` or a string literal.
pub trait Literal {
    /// Build the matching rule.
    fn into_rule(self) -> Rule;
}

impl Literal for char {
    fn into_rule(self) -> Rule {
        Rule::Val(self)
    }
}

impl Literal for &str {
    fn into_rule(self) -> Rule {
        self.chars()
            .map(Rule::Val)
            .reduce(Rule::append)
            .unwrap_or(Rule::Empty)
    }
}

impl Literal for String {
    fn into_rule(self) -> Rule {
        self.as_str().into_rule()
    }
}

impl Literal for &String {
    fn into_rule(self) -> Rule {
        self.as_str().into_rule()
    }
}

/// Consumes nothing; the continuation sees the input untouched.
#[must_use]
pub fn empty() -> Rule {
    Rule::Empty
}

/// Succeeds only on exhausted input. Does not consult the continuation:
/// reaching the end is itself the accept condition.
#[must_use]
pub fn end() -> Rule {
    Rule::End
}

/// `rule` if it can complete the match, otherwise nothing.
#[must_use]
pub fn optional(rule: Rule) -> Rule {
    Rule::Optional(Arc::new(rule))
}

/// Zero or more repetitions, trying the longest first and backing off one
/// repetition at a time when the rest of the match fails.
///
/// ```
/// use cpsmatch::rules::{eof, many, sequence, val};
///
/// // Greedy `many` gives back the final 'a' so the literal can match it.
/// let rule = eof(sequence(many(val('a')), [val("ab")]));
/// assert!(rule.matches("aaab"));
/// ```
#[must_use]
pub fn many(rule: Rule) -> Rule {
    Rule::Many(Arc::new(rule))
}

/// One or more repetitions: `rule.append(many(rule))`.
#[must_use]
pub fn one_or_more(rule: Rule) -> Rule {
    rule.clone().append(many(rule))
}

/// `rule`, and then the input must be exhausted.
#[must_use]
pub fn eof(rule: Rule) -> Rule {
    rule.append(end())
}

/// Left fold of [`Rule::append`] over `first` and `rest`.
///
/// At least one rule is guaranteed by the signature. See [`seq!`](crate::seq)
/// for the variadic form and [`try_sequence`] for runtime-sized lists.
pub fn sequence(first: Rule, rest: impl IntoIterator<Item = Rule>) -> Rule {
    rest.into_iter().fold(first, Rule::append)
}

/// Left fold of [`Rule::or`] over `first` and `rest`, in priority order.
pub fn alternative(first: Rule, rest: impl IntoIterator<Item = Rule>) -> Rule {
    rest.into_iter().fold(first, Rule::or)
}

/// [`sequence`] over a list whose length is only known at runtime.
///
/// # Errors
///
/// Returns [`RuleError::EmptyComposite`] if `rules` is empty: an empty
/// sequence has no sensible meaning (always-match and never-match are both
/// plausible), so it is rejected instead of guessed.
pub fn try_sequence(rules: impl IntoIterator<Item = Rule>) -> Result<Rule, RuleError> {
    let mut rules = rules.into_iter();
    let first = rules
        .next()
        .ok_or(RuleError::EmptyComposite { kind: "sequence" })?;
    Ok(sequence(first, rules))
}

/// [`alternative`] over a list whose length is only known at runtime.
///
/// # Errors
///
/// Returns [`RuleError::EmptyComposite`] if `rules` is empty.
pub fn try_alternative(rules: impl IntoIterator<Item = Rule>) -> Result<Rule, RuleError> {
    let mut rules = rules.into_iter();
    let first = rules
        .next()
        .ok_or(RuleError::EmptyComposite { kind: "alternative" })?;
    Ok(alternative(first, rules))
}

/// Variadic [`sequence`]: `seq![a, b, c]` is `a.append(b).append(c)`.
///
/// Requires at least one rule; `seq![]` does not compile.
#[macro_export]
macro_rules! seq {
    ($first:expr $(, $rest:expr)* $(,)?) => {{
        let rule: $crate::Rule = $first;
        $( let rule = rule.append($rest); )*
        rule
    }};
}

/// Variadic [`alternative`]: `alt![a, b, c]` is `a.or(b).or(c)`.
///
/// Requires at least one rule; `alt![]` does not compile.
#[macro_export]
macro_rules! alt {
    ($first:expr $(, $rest:expr)* $(,)?) => {{
        let rule: $crate::Rule = $first;
        $( let rule = rule.or($rest); )*
        rule
    }};
}
