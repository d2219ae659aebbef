use boxjoint_core::{Severity, Warning, Warnings};
use proptest::prelude::*;

fn rule_a() -> Warnings {
    Warnings::one(Warning::warn("RULE_A", "a", "fix a"))
}

fn rule_b() -> Warnings {
    Warnings::none()
}

fn rule_c() -> Warnings {
    Warnings::from(vec![
        Warning::error("RULE_C1", "c1", "fix c1"),
        Warning::info("RULE_C2", "c2", "fix c2"),
    ])
}

#[test]
fn collecting_rule_results_concatenates_in_order() {
    let all: Warnings = [rule_a(), rule_b(), rule_c()].into_iter().collect();
    let codes: Vec<_> = all.iter().map(|w| w.code.clone()).collect();
    assert_eq!(codes, vec!["RULE_A", "RULE_C1", "RULE_C2"]);
    assert!(all.has_errors());
}

#[test]
fn advisory_only_does_not_block() {
    let all = rule_a().concat(Warnings::one(Warning::info("X", "x", "none")));
    assert!(!all.has_errors());
    assert!(all.iter().all(|w| w.severity != Severity::Error));
}

proptest! {
    #[test]
    fn concat_length_is_additive(a in 0usize..8, b in 0usize..8) {
        let left: Warnings = (0..a).map(|i| Warning::info(format!("L{i}"), "", "")).collect();
        let right: Warnings = (0..b).map(|i| Warning::warn(format!("R{i}"), "", "")).collect();
        let joined = left.clone().concat(right.clone());
        prop_assert_eq!(joined.len(), a + b);
        prop_assert_eq!(&joined.as_slice()[..a], left.as_slice());
        prop_assert_eq!(&joined.as_slice()[a..], right.as_slice());
    }
}
