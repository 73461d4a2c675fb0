//! cpsmatch-test: reference extension and conformance tooling
//!
//! Provides small [`CustomRule`] implementations that wrap another rule and
//! observe how the engine drives it. This is the reference extension that
//! demonstrates how to plug user logic into a rule tree.
//!
//! # Example
//!
//! ```
//! use cpsmatch_test::prelude::*;
//!
//! // Recorder reports every remainder the wrapped rule offered onward.
//! let recorder = Recorder::new(many(val('a')));
//! let rule = Rule::custom(recorder.clone());
//! assert!(!rule.match_with("aab", &|rest| rest.is_empty()));
//! assert_eq!(recorder.remainders(), ["b", "ab", "aab"]);
//! ```

use cpsmatch::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};


/// Counts how often the engine invokes the wrapped rule.
///
/// Clones share the counter, so keep one handle and put a clone in the tree.
#[derive(Debug, Clone)]
pub struct CountingRule {
    inner: Rule,
    calls: Arc<AtomicUsize>,
}

impl CountingRule {
    /// Wrap `inner` with a fresh counter.
    #[must_use]
    pub fn new(inner: Rule) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Invocations so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Zero the counter.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::Relaxed);
    }
}

impl CustomRule for CountingRule {
    fn match_with(&self, input: &str, cont: Continuation<'_>) -> bool {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.match_with(input, cont)
    }

    fn match_within(&self, scope: &Scope<'_>, input: &str, cont: Continuation<'_>) -> bool {
        self.calls.fetch_add(1, Ordering::Relaxed);
        scope.run(&self.inner, input, cont)
    }
}

/// Records each remainder the wrapped rule hands to its continuation, in
/// the order offered. Shows the backtracking order of the inner rule.
#[derive(Debug, Clone)]
pub struct Recorder {
    inner: Rule,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    /// Wrap `inner` with an empty log.
    #[must_use]
    pub fn new(inner: Rule) -> Self {
        Self {
            inner,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Remainders offered so far.
    #[must_use]
    pub fn remainders(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget everything recorded.
    pub fn clear(&self) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Recorder {
    fn record(&self, rest: &str) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(rest.to_string());
    }
}

impl CustomRule for Recorder {
    fn match_with(&self, input: &str, cont: Continuation<'_>) -> bool {
        self.inner.match_with(input, &|rest: &str| {
            self.record(rest);
            cont(rest)
        })
    }

    fn match_within(&self, scope: &Scope<'_>, input: &str, cont: Continuation<'_>) -> bool {
        scope.run(&self.inner, input, &|rest: &str| {
            self.record(rest);
            cont(rest)
        })
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{CountingRule, Recorder};
    pub use cpsmatch::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_rule_counts_calls() {
        let counter = CountingRule::new(val('a'));
        let rule = eof(many(Rule::custom(counter.clone())));
        assert!(rule.matches("aaa"));
        // Three hits plus the attempt that found the end of input.
        assert_eq!(counter.calls(), 4);

        counter.reset();
        assert_eq!(counter.calls(), 0);
    }

    #[test]
    fn counting_rule_is_transparent() {
        let plain = eof(seq![one_or_more(one_of("01")), val('b')]);
        let wrapped = eof(seq![
            one_or_more(Rule::custom(CountingRule::new(one_of("01")))),
            val('b'),
        ]);
        for input in ["", "0b", "0110b", "01", "b", "2b"] {
            assert_eq!(plain.matches(input), wrapped.matches(input), "{input:?}");
        }
    }

    #[test]
    fn wrappers_stay_under_callers_step_budget() {
        let blowup = eof(one_or_more(one_or_more(val('a'))));
        let input = format!("{}!", "a".repeat(18));

        let counted = Rule::custom(CountingRule::new(blowup.clone()));
        assert_eq!(
            counted.match_bounded(&input, 100),
            Err(RuleError::StepLimitExceeded { limit: 100 })
        );

        let recorded = Rule::custom(Recorder::new(blowup));
        assert_eq!(
            recorded.match_bounded(&input, 100),
            Err(RuleError::StepLimitExceeded { limit: 100 })
        );
    }

    #[test]
    fn wrapped_steps_show_in_trace() {
        let rule = Rule::custom(CountingRule::new(val("ab")));
        let trace = rule.match_with_trace("ab");
        assert!(trace.matched);
        assert_eq!(trace.count("custom"), 1);
        assert_eq!(trace.count("val"), 2);
    }

    #[test]
    fn recorder_shows_greedy_order() {
        let recorder = Recorder::new(many(val('a')));
        let rule = Rule::custom(recorder.clone());
        assert!(!rule.match_with("aab", &|rest| rest.is_empty()));
        assert_eq!(recorder.remainders(), ["b", "ab", "aab"]);

        recorder.clear();
        assert!(recorder.remainders().is_empty());
    }

    #[test]
    fn recorder_stops_at_first_accepted() {
        let recorder = Recorder::new(optional(val('x')));
        let rule = Rule::custom(recorder.clone());
        assert!(rule.matches("xy"));
        assert_eq!(recorder.remainders(), ["y"]);
    }
}
