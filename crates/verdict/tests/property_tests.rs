//! Property-based checks over path construction and result consistency.

use proptest::prelude::*;
use verdict::prelude::*;

#[derive(Debug)]
struct Holder {
    items: Vec<String>,
}

fn holder_validator() -> Validator<Holder> {
    Validator::<Holder>::builder()
        .rule(rule_for_each("Items", |h: &Holder| h.items.as_slice()).not_empty())
        .build()
}

proptest! {
    // Failing paths are exactly the indices of empty elements, in order,
    // addressed against the original sequence.
    #[test]
    fn failing_paths_match_empty_element_indices(items in proptest::collection::vec(".{0,8}", 0..20)) {
        let validator = holder_validator();
        let holder = Holder { items: items.clone() };
        let result = validator.validate(&holder).unwrap();

        let expected: Vec<String> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_empty())
            .map(|(index, _)| format!("Items[{index}]"))
            .collect();
        let actual: Vec<String> = result
            .errors()
            .iter()
            .map(|failure| failure.property_name().to_owned())
            .collect();

        prop_assert_eq!(&actual, &expected);
        prop_assert_eq!(result.is_valid(), expected.is_empty());
    }

    // A validator whose components all pass yields a valid result for any
    // instance.
    #[test]
    fn passing_components_always_yield_valid_results(items in proptest::collection::vec(".{0,8}", 0..20)) {
        let validator = Validator::<Holder>::builder()
            .rule(rule_for_each("Items", |h: &Holder| h.items.as_slice()).must(|_, _| true))
            .rule(rule_for("Items", |h: &Holder| &h.items).must(|_, _| true))
            .build();
        let holder = Holder { items };
        let result = validator.validate(&holder).unwrap();
        prop_assert!(result.is_valid());
        prop_assert!(result.errors().is_empty());
    }

    // Severity and state never alter control flow: the failure count is the
    // number of failing components under Continue cascade.
    #[test]
    fn failure_count_equals_failing_components(fail_first in any::<bool>(), fail_second in any::<bool>()) {
        let validator = Validator::<Holder>::builder()
            .rule(
                rule_for("Items", |h: &Holder| &h.items)
                    .must(move |_, _| !fail_first)
                    .with_severity(Severity::Warning)
                    .must(move |_, _| !fail_second),
            )
            .build();
        let holder = Holder { items: vec!["x".to_owned()] };
        let result = validator.validate(&holder).unwrap();
        let expected = usize::from(fail_first) + usize::from(fail_second);
        prop_assert_eq!(result.errors().len(), expected);
        prop_assert_eq!(result.is_valid(), expected == 0);
    }
}
