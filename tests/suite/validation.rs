//! Recorded constraints are re-applied to submitted values.

use formseal_core::FormSeal;
use formseal_types::{BlankOption, Constraint, ConstraintKind, FormDescriptor};
use serde_json::{Value, json};

use crate::common::{seal, submit};

fn check(seal: &FormSeal, constraint: Constraint, submitted: Option<Value>) -> bool {
    let descriptor = FormDescriptor::new(["field"], ["form"])
        .unwrap()
        .with_constraint("field", constraint)
        .unwrap();
    let payload = seal.seal(&descriptor).unwrap();
    let fields = match submitted {
        Some(value) => json!({"field": value}),
        None => json!({}),
    };
    let parsed = seal.parse(&submit(&payload, &json!({"form": fields}))).unwrap();
    parsed.validations["field"].valid
}

#[test]
fn subset_of_allowed_values() {
    let seal = seal();
    let allowed = || Constraint::subset(["1", "2"], BlankOption::Forbidden);
    assert!(check(&seal, allowed(), Some(json!(["1"]))));
    assert!(check(&seal, allowed(), Some(json!(["1", "2"]))));
    assert!(!check(&seal, allowed(), Some(json!(["1", "3"]))));
}

// Absence is treated as the empty set. Kept as-is on purpose; this test
// pins the behavior so a change to it is deliberate.
#[test]
fn subset_absent_submission_is_valid() {
    let seal = seal();
    assert!(check(
        &seal,
        Constraint::subset(["1", "2"], BlankOption::Forbidden),
        None
    ));
}

#[test]
fn include_member_of_allowed_values() {
    let seal = seal();
    let allowed = || Constraint::include(["t", "f"], BlankOption::Forbidden);
    assert!(check(&seal, allowed(), Some(json!("t"))));
    assert!(!check(&seal, allowed(), Some(json!("x"))));
}

#[test]
fn include_empty_selection_needs_blank_option() {
    let seal = seal();
    assert!(!check(
        &seal,
        Constraint::include(["1"], BlankOption::Forbidden),
        Some(json!(""))
    ));
    assert!(check(
        &seal,
        Constraint::include(["1"], BlankOption::Permitted),
        Some(json!(""))
    ));
}

#[test]
fn validation_kinds_are_reported() {
    let seal = seal();
    let descriptor = FormDescriptor::new(["a", "b", "c", "d"], ["form"])
        .unwrap()
        .with_constraint("a", Constraint::subset(["1"], BlankOption::Forbidden))
        .unwrap()
        .with_constraint("b", Constraint::include(["1"], BlankOption::Forbidden))
        .unwrap()
        .with_constraint("c", Constraint::valid(true))
        .unwrap();
    let payload = seal.seal(&descriptor).unwrap();
    let parsed = seal
        .parse(&submit(&payload, &json!({"form": {"a": ["1"], "b": "1"}})))
        .unwrap();

    assert_eq!(parsed.validations.len(), 3);
    assert_eq!(parsed.validations["a"].kind, ConstraintKind::Subset);
    assert_eq!(parsed.validations["b"].kind, ConstraintKind::Include);
    assert_eq!(parsed.validations["c"].kind, ConstraintKind::Valid);
    assert!(!parsed.validations.contains_key("d"));
}
