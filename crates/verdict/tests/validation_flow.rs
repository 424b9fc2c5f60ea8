//! Core evaluation semantics: component ordering, cascade, conditions,
//! dependent rules and declaration-time overrides.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use verdict::prelude::*;

#[derive(Debug)]
struct Person {
    surname: Option<String>,
    forename: String,
    age: i32,
}

fn valid_person() -> Person {
    Person {
        surname: Some("Smith".to_owned()),
        forename: "Jane".to_owned(),
        age: 30,
    }
}

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
}

#[test]
fn all_components_passing_yields_valid_result() {
    let validator = Validator::<Person>::builder()
        .rule(rule_for("Surname", |p: &Person| &p.surname).not_null())
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .not_empty()
                .min_length(2),
        )
        .rule(rule_for("Age", |p: &Person| &p.age).greater_than_or_equal(18))
        .build();

    let result = validator.validate(&valid_person()).unwrap();
    assert!(result.is_valid());
    assert!(result.errors().is_empty());
}

#[test]
fn failures_carry_path_code_and_attempted_value() {
    let validator = Validator::<Person>::builder()
        .rule(rule_for("Surname", |p: &Person| &p.surname).not_null())
        .build();

    let person = Person {
        surname: None,
        ..valid_person()
    };
    let result = validator.validate(&person).unwrap();
    assert!(!result.is_valid());
    assert_eq!(result.errors().len(), 1);

    let failure = &result.errors()[0];
    assert_eq!(failure.property_name(), "Surname");
    assert_eq!(failure.error_code(), "not_null");
    assert_eq!(failure.error_message(), "'Surname' must not be empty.");
    assert_eq!(failure.attempted_value(), Some("None"));
    assert_eq!(failure.placeholder("PropertyName"), Some("Surname"));
}

#[test]
fn cascade_stop_skips_remaining_components() {
    let (first, second) = counter();
    let (f, s) = (Arc::clone(&first), Arc::clone(&second));
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .cascade(CascadeMode::Stop)
                .must(move |_, _| {
                    f.fetch_add(1, Ordering::SeqCst);
                    false
                })
                .must(move |_, _| {
                    s.fetch_add(1, Ordering::SeqCst);
                    false
                }),
        )
        .build();

    let result = validator.validate(&valid_person()).unwrap();
    assert_eq!(result.errors().len(), 1);
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);
}

#[test]
fn cascade_continue_runs_every_component() {
    let (first, second) = counter();
    let (f, s) = (Arc::clone(&first), Arc::clone(&second));
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .must(move |_, _| {
                    f.fetch_add(1, Ordering::SeqCst);
                    false
                })
                .must(move |_, _| {
                    s.fetch_add(1, Ordering::SeqCst);
                    false
                }),
        )
        .build();

    let result = validator.validate(&valid_person()).unwrap();
    assert_eq!(result.errors().len(), 2);
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn call_level_cascade_applies_to_rules_without_their_own() {
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .must(|_, _| false)
                .must(|_, _| false),
        )
        .build();

    let default_run = validator.validate(&valid_person()).unwrap();
    assert_eq!(default_run.errors().len(), 2);

    let stop_run = validator
        .validate_with(
            &valid_person(),
            &ValidationOptions::new().cascade(CascadeMode::Stop),
        )
        .unwrap();
    assert_eq!(stop_run.errors().len(), 1);
}

#[test]
fn builder_level_cascade_is_the_default_for_all_rules() {
    let validator = Validator::<Person>::builder()
        .cascade(CascadeMode::Stop)
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .must(|_, _| false)
                .must(|_, _| false),
        )
        .build();

    let result = validator.validate(&valid_person()).unwrap();
    assert_eq!(result.errors().len(), 1);
}

#[test]
fn dependent_rules_skipped_when_parent_fails() {
    let (dependent_runs, _) = counter();
    let d = Arc::clone(&dependent_runs);
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .must(|_, _| false)
                .dependent(|rules| {
                    rules.rule(rule_for("Age", |p: &Person| &p.age).must(move |_, _| {
                        d.fetch_add(1, Ordering::SeqCst);
                        false
                    }))
                }),
        )
        .build();

    let result = validator.validate(&valid_person()).unwrap();
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].property_name(), "Forename");
    assert_eq!(dependent_runs.load(Ordering::SeqCst), 0);
}

#[test]
fn dependent_rule_failures_appended_when_parent_passes() {
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .not_empty()
                .dependent(|rules| {
                    rules.rule(rule_for("Age", |p: &Person| &p.age).greater_than(120))
                }),
        )
        .build();

    let result = validator.validate(&valid_person()).unwrap();
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].property_name(), "Age");
    assert_eq!(result.errors()[0].error_code(), "greater_than");
}

#[test]
fn rule_condition_false_skips_components_and_dependents() {
    let (components, dependents) = counter();
    let (c, d) = (Arc::clone(&components), Arc::clone(&dependents));
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .must(move |_, _| {
                    c.fetch_add(1, Ordering::SeqCst);
                    false
                })
                .when(|p| p.age >= 100)
                .dependent(|rules| {
                    rules.rule(rule_for("Age", |p: &Person| &p.age).must(move |_, _| {
                        d.fetch_add(1, Ordering::SeqCst);
                        false
                    }))
                }),
        )
        .build();

    let result = validator.validate(&valid_person()).unwrap();
    assert!(result.is_valid());
    assert_eq!(components.load(Ordering::SeqCst), 0);
    assert_eq!(dependents.load(Ordering::SeqCst), 0);
}

#[test]
fn unless_inverts_the_condition() {
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .must(|_, _| false)
                .unless(|p| p.age >= 18),
        )
        .build();

    // Adult: rule skipped.
    assert!(validator.validate(&valid_person()).unwrap().is_valid());

    // Minor: rule runs and fails.
    let minor = Person {
        age: 12,
        ..valid_person()
    };
    assert!(!validator.validate(&minor).unwrap().is_valid());
}

#[test]
fn component_condition_gates_a_single_component() {
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .must(|_, _| false)
                .when_component(|p| p.age >= 100)
                .must(|_, _| false),
        )
        .build();

    // Only the unconditional component fails.
    let result = validator.validate(&valid_person()).unwrap();
    assert_eq!(result.errors().len(), 1);
}

#[test]
fn declaration_time_overrides_shape_the_failure() {
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .not_empty()
                .with_message("'{PropertyName}' is required.")
                .with_error_code("required")
                .with_severity(Severity::Warning)
                .with_state(json!({"field": "forename"})),
        )
        .build();

    let person = Person {
        forename: String::new(),
        ..valid_person()
    };
    let result = validator.validate(&person).unwrap();
    let failure = &result.errors()[0];
    assert_eq!(failure.error_message(), "'Forename' is required.");
    assert_eq!(failure.error_code(), "required");
    assert_eq!(failure.severity(), Severity::Warning);
    assert_eq!(failure.custom_state().unwrap()["field"], "forename");
}

#[test]
fn lazy_message_sees_instance_and_value() {
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Age", |p: &Person| &p.age)
                .greater_than_or_equal(18)
                .with_message_fn(|p, age| format!("{} is only {age}", p.forename)),
        )
        .build();

    let person = Person {
        age: 12,
        ..valid_person()
    };
    let result = validator.validate(&person).unwrap();
    assert_eq!(result.errors()[0].error_message(), "Jane is only 12");
}

#[test]
fn display_name_override_changes_message_not_path() {
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for("Forename", |p: &Person| &p.forename)
                .override_property_name("First name")
                .not_empty(),
        )
        .build();

    let person = Person {
        forename: String::new(),
        ..valid_person()
    };
    let result = validator.validate(&person).unwrap();
    let failure = &result.errors()[0];
    assert_eq!(failure.property_name(), "Forename");
    assert_eq!(failure.error_message(), "'First name' must not be empty.");
}

#[test]
fn model_level_rule_has_empty_path() {
    let validator = Validator::<Person>::builder()
        .rule(
            rule_for_model::<Person>()
                .must(|_, p| p.age >= 0)
                .with_message("age cannot be negative"),
        )
        .build();

    let person = Person {
        age: -1,
        ..valid_person()
    };
    let result = validator.validate(&person).unwrap();
    assert_eq!(result.errors()[0].property_name(), "");
    assert_eq!(result.errors()[0].error_message(), "age cannot be negative");

    let descriptor = validator.descriptor();
    assert!(descriptor.has_validator(None, "predicate"));
}

#[test]
fn comparison_against_another_member() {
    #[derive(Debug)]
    struct Range {
        low: i64,
        high: i64,
    }

    let validator = Validator::<Range>::builder()
        .rule(
            rule_for("High", |r: &Range| &r.high)
                .greater_than_member("Low", |r: &Range| &r.low),
        )
        .build();

    assert!(validator.validate(&Range { low: 1, high: 5 }).unwrap().is_valid());

    let result = validator.validate(&Range { low: 5, high: 5 }).unwrap();
    let failure = &result.errors()[0];
    assert_eq!(failure.error_code(), "greater_than");
    assert_eq!(failure.placeholder("ComparisonValue"), Some("Low (5)"));
}

#[rstest]
#[case(17, false)]
#[case(18, true)]
#[case(65, true)]
#[case(66, false)]
fn inclusive_between_bounds(#[case] age: i32, #[case] valid: bool) {
    let validator = Validator::<Person>::builder()
        .rule(rule_for("Age", |p: &Person| &p.age).inclusive_between(18, 65))
        .build();

    let person = Person {
        age,
        ..valid_person()
    };
    assert_eq!(validator.validate(&person).unwrap().is_valid(), valid);
}

#[rstest]
#[case("", false)]
#[case("ab", false)]
#[case("abc", true)]
#[case("abcdefgh", true)]
#[case("abcdefghi", false)]
fn length_bounds(#[case] forename: &str, #[case] valid: bool) {
    let validator = Validator::<Person>::builder()
        .rule(rule_for("Forename", |p: &Person| &p.forename).length(3, 8))
        .build();

    let person = Person {
        forename: forename.to_owned(),
        ..valid_person()
    };
    assert_eq!(validator.validate(&person).unwrap().is_valid(), valid);
}
