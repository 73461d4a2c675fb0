//! Custom rules plugged into built-in combinators.

use cpsmatch_test::prelude::*;

/// Consumes one or two chars, preferring two.
fn one_or_two() -> Rule {
    Rule::from_fn("one_or_two", |input, cont| {
        let mut chars = input.chars();
        if chars.next().is_none() {
            return false;
        }
        let after_one = chars.as_str();
        (chars.next().is_some() && cont(chars.as_str())) || cont(after_one)
    })
}

#[test]
fn custom_rule_offers_multiple_remainders() {
    // Greedy first choice leaves "c"; the literal needs "bc", so the rule
    // must be asked for its second option.
    let rule = eof(seq![one_or_two(), val("bc")]);
    assert!(rule.matches("abc"));
    assert!(rule.matches("aabc"));
    assert!(!rule.matches("aaabc"));
    assert!(!rule.matches("bc"));
}

#[test]
fn custom_rule_under_many() {
    let rule = eof(many(one_or_two()));
    for len in 0..8 {
        assert!(rule.matches(&"x".repeat(len)), "len {len}");
    }
}

#[test]
fn custom_rule_that_consumes_nothing_terminates_under_many() {
    let noop = Rule::from_fn("noop", |input, cont| cont(input));
    let rule = eof(seq![many(noop), val("z")]);
    assert!(rule.matches("z"));
    assert!(!rule.matches("zz"));
}

#[test]
fn custom_rule_participates_in_alternation() {
    let never = Rule::from_fn("never", |_, _| false);
    let rule = eof(alt![never, val("ok")]);
    assert!(rule.matches("ok"));
    assert!(!rule.matches("no"));
}

#[test]
fn custom_rule_in_trace_and_display() {
    let rule = seq![val('a'), one_or_two()];
    let trace = rule.match_with_trace("abc");
    assert!(trace.matched);
    assert_eq!(trace.count("custom"), 1);
    assert!(rule.to_string().contains("one_or_two"));
}

#[test]
fn counting_rule_exposes_backtracking_cost() {
    // (a+)+ on a near miss: every split of the run is tried.
    let counter = CountingRule::new(val('a'));
    let rule = eof(one_or_more(one_or_more(Rule::custom(counter.clone()))));

    assert!(rule.matches("aaaa"));
    let hit = counter.calls();
    counter.reset();

    assert!(!rule.matches("aaaa!"));
    let miss = counter.calls();
    assert!(miss > hit * 2, "hit = {hit}, miss = {miss}");
}

#[test]
fn recorder_shows_ordered_alternation() {
    let recorder = Recorder::new(alt![val('a'), val("ab")]);
    let rule = eof(Rule::custom(recorder.clone()));
    assert!(rule.matches("ab"));
    assert_eq!(recorder.remainders(), ["b", ""]);
}

#[test]
fn rules_are_shared_across_threads() {
    let counter = CountingRule::new(one_of("0123456789"));
    let rule = eof(one_or_more(Rule::custom(counter.clone())));

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert!(rule.matches("2024"));
                assert!(!rule.matches("20x4"));
            });
        }
    });
    // Each thread: 5 calls on the hit, 3 on the miss.
    assert_eq!(counter.calls(), 4 * 8);
}

#[test]
fn bounded_match_counts_steps_inside_wrappers() {
    let blowup = eof(one_or_more(one_or_more(val('a'))));
    let input = format!("{}!", "a".repeat(18));
    assert_eq!(
        blowup.match_bounded(&input, 100),
        Err(RuleError::StepLimitExceeded { limit: 100 })
    );

    let counter = CountingRule::new(blowup);
    let rule = Rule::custom(counter.clone());
    assert_eq!(
        rule.match_bounded(&input, 100),
        Err(RuleError::StepLimitExceeded { limit: 100 })
    );
    assert_eq!(counter.calls(), 1);
}

#[test]
fn bounded_match_on_long_input_through_wrapper() {
    let rule = Rule::custom(Recorder::new(eof(many(any()))));
    let input = "x".repeat(100_000);
    assert_eq!(
        rule.match_bounded(&input, cpsmatch::DEFAULT_STEP_LIMIT),
        Err(RuleError::RecursionLimitExceeded {
            limit: cpsmatch::MAX_RECURSION_DEPTH
        })
    );
}
