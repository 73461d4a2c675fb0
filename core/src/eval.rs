//! The recursive continuation-passing evaluator behind every `Rule` match.
//!
//! One `Evaluator` lives for one top-level match call. Rules stay immutable;
//! all bookkeeping (step budget, nesting limit, optional trace log) is kept
//! here in `Cell`s so continuations can stay plain `Fn` closures.

use crate::{Continuation, MatchStep, MatchTrace, Rule};
use std::cell::{Cell, RefCell};
use std::fmt;

pub(crate) struct Evaluator {
    /// Byte length of the top-level input, to turn remainders into offsets.
    input_len: usize,
    steps: Cell<usize>,
    depth: Cell<usize>,
    max_depth: Cell<usize>,
    limit: Option<usize>,
    depth_limit: Option<usize>,
    exhausted: Cell<bool>,
    too_deep: Cell<bool>,
    path: Option<RefCell<Vec<MatchStep>>>,
}

impl Evaluator {
    fn new(input: &str, limit: Option<usize>, depth_limit: Option<usize>, record: bool) -> Self {
        Self {
            input_len: input.len(),
            steps: Cell::new(0),
            depth: Cell::new(0),
            max_depth: Cell::new(0),
            limit,
            depth_limit,
            exhausted: Cell::new(false),
            too_deep: Cell::new(false),
            path: record.then(|| RefCell::new(Vec::new())),
        }
    }

    pub(crate) fn unbounded(input: &str) -> Self {
        Self::new(input, None, None, false)
    }

    pub(crate) fn bounded(input: &str, limit: usize, depth_limit: usize) -> Self {
        Self::new(input, Some(limit), Some(depth_limit), false)
    }

    pub(crate) fn tracing(input: &str) -> Self {
        Self::new(input, None, None, true)
    }

    pub(crate) fn steps(&self) -> usize {
        self.steps.get()
    }

    /// The step budget ran out.
    pub(crate) fn exhausted(&self) -> bool {
        self.exhausted.get()
    }

    /// The nesting limit was hit.
    pub(crate) fn too_deep(&self) -> bool {
        self.too_deep.get()
    }

    pub(crate) fn into_trace(self, matched: bool) -> MatchTrace {
        MatchTrace {
            matched,
            steps: self.steps.get(),
            max_depth: self.max_depth.get(),
            path: self.path.map(RefCell::into_inner).unwrap_or_default(),
        }
    }

    pub(crate) fn run(&self, rule: &Rule, input: &str, cont: Continuation<'_>) -> bool {
        self.eval(rule, input, cont)
    }

    /// Counts a step and records it. Returns `false` once the budget is spent.
    /// Once either limit is hit the whole search unwinds with `false`.
    fn enter(&self, rule: &Rule, input: &str) -> bool {
        if self.exhausted.get() || self.too_deep.get() {
            return false;
        }
        let steps = self.steps.get() + 1;
        self.steps.set(steps);
        if self.limit.is_some_and(|limit| steps > limit) {
            self.exhausted.set(true);
            return false;
        }

        let depth = self.depth.get() + 1;
        if self.depth_limit.is_some_and(|limit| depth > limit) {
            self.too_deep.set(true);
            return false;
        }
        self.depth.set(depth);
        self.max_depth.set(self.max_depth.get().max(depth));

        if let Some(path) = &self.path {
            path.borrow_mut().push(MatchStep {
                rule: rule.kind(),
                offset: self.input_len.saturating_sub(input.len()),
                depth,
            });
        }
        true
    }

    fn leave(&self) {
        self.depth.set(self.depth.get() - 1);
    }

    // Safety Consideration: this recurses once per rule evaluation, and
    // continuations nest one frame per consumed repetition. Unbounded matches
    // of deep rules on long inputs need a bigger stack; `match_bounded` stops
    // at its nesting limit instead.
    fn eval(&self, rule: &Rule, input: &str, cont: Continuation<'_>) -> bool {
        if !self.enter(rule, input) {
            return false;
        }
        let matched = match rule {
            Rule::Any => atom(input, |_| true, cont),
            Rule::OneOf(set) => atom(input, |c| set.contains(c), cont),
            Rule::Val(expected) => atom(input, |c| c == *expected, cont),
            Rule::Empty => cont(input),
            Rule::End => input.is_empty(),
            Rule::Append(first, second) => {
                self.eval(first, input, &|rest: &str| self.eval(second, rest, cont))
            }
            Rule::Or(first, second) => {
                self.eval(first, input, cont) || self.eval(second, input, cont)
            }
            Rule::Optional(inner) => self.eval(inner, input, cont) || cont(input),
            // Re-enter this same node for the next repetition. An iteration that
            // consumed nothing would loop forever, so only progress re-enters.
            Rule::Many(inner) => {
                self.eval(inner, input, &|rest: &str| {
                    rest.len() < input.len() && self.eval(rule, rest, cont)
                }) || cont(input)
            }
            Rule::Custom(custom) => {
                custom.match_within(&Scope { evaluator: self }, input, cont)
            }
        };
        self.leave();
        matched
    }
}

/// Handle through which a [`CustomRule`](crate::CustomRule) runs nested rules
/// as part of the evaluation that invoked it.
///
/// Rules run through a scope share the caller's step budget, nesting limit
/// and trace. Calling [`Rule::match_with`] from inside a custom rule starts a
/// separate, unbounded evaluation instead.
///
/// ```
/// use cpsmatch::prelude::*;
///
/// /// Runs the inner rule, but never on empty input.
/// #[derive(Debug)]
/// struct NonEmpty(Rule);
///
/// impl CustomRule for NonEmpty {
///     fn match_with(&self, input: &str, cont: Continuation<'_>) -> bool {
///         !input.is_empty() && self.0.match_with(input, cont)
///     }
///
///     fn match_within(&self, scope: &Scope<'_>, input: &str, cont: Continuation<'_>) -> bool {
///         !input.is_empty() && scope.run(&self.0, input, cont)
///     }
/// }
///
/// let rule = eof(Rule::custom(NonEmpty(many(val('a')))));
/// assert!(rule.matches("aa"));
/// assert!(!rule.matches(""));
/// assert_eq!(rule.match_with_trace("aa").count("val"), 3);
/// ```
#[derive(Clone, Copy)]
pub struct Scope<'e> {
    evaluator: &'e Evaluator,
}

impl Scope<'_> {
    /// Match `rule` against `input` within the current evaluation.
    pub fn run(&self, rule: &Rule, input: &str, cont: Continuation<'_>) -> bool {
        self.evaluator.eval(rule, input, cont)
    }

    /// Rule evaluations so far in the enclosing match.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.evaluator.steps()
    }
}

impl fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("steps", &self.evaluator.steps.get())
            .field("depth", &self.evaluator.depth.get())
            .finish()
    }
}

/// One char satisfying `accept`, then the continuation on the rest.
fn atom(input: &str, accept: impl Fn(char) -> bool, cont: Continuation<'_>) -> bool {
    let mut chars = input.chars();
    match chars.next() {
        Some(c) if accept(c) => cont(chars.as_str()),
        _ => false,
    }
}
