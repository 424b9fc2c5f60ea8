//! Path construction across collections and child validators: index-aware
//! segments, null/filtered element handling, delegation and the
//! `CollectionIndex` placeholder.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use verdict::prelude::*;

#[derive(Debug)]
struct Order {
    product_name: String,
    amount: f64,
    items: Vec<String>,
}

impl Order {
    fn new(product_name: &str, amount: f64) -> Self {
        Self {
            product_name: product_name.to_owned(),
            amount,
            items: vec!["item".to_owned()],
        }
    }
}

#[derive(Debug)]
struct Address {
    line1: String,
}

#[derive(Debug)]
struct Customer {
    surname: Option<String>,
    orders: Vec<Order>,
    address: Option<Address>,
}

fn customer(orders: Vec<Order>) -> Customer {
    Customer {
        surname: Some("Smith".to_owned()),
        orders,
        address: None,
    }
}

fn order_validator() -> Arc<Validator<Order>> {
    Arc::new(
        Validator::<Order>::builder()
            .rule(rule_for("ProductName", |o: &Order| &o.product_name).not_empty())
            .build(),
    )
}

#[test]
fn child_collection_failures_are_index_qualified_and_ordered() {
    let validator = Validator::<Customer>::builder()
        .rule(rule_for("Surname", |c: &Customer| &c.surname).not_null())
        .rule(
            rule_for_each("Orders", |c: &Customer| c.orders.as_slice())
                .set_validator(order_validator()),
        )
        .build();

    let customer = Customer {
        surname: None,
        orders: vec![Order::new("", 1.0), Order::new("ok", 1.0), Order::new("", 1.0)],
        address: None,
    };
    let result = validator.validate(&customer).unwrap();

    let paths: Vec<&str> = result.errors().iter().map(ValidationFailure::property_name).collect();
    assert_eq!(
        paths,
        vec!["Surname", "Orders[0].ProductName", "Orders[2].ProductName"]
    );
}

#[test]
fn direct_element_validators_use_indexed_paths() {
    let validator = Validator::<Customer>::builder()
        .rule(
            rule_for_each("Orders", |c: &Customer| c.orders.as_slice())
                .must(|_, order| order.amount > 0.0),
        )
        .build();

    let customer = customer(vec![
        Order::new("a", 1.0),
        Order::new("b", 0.0),
        Order::new("c", -2.0),
    ]);
    let result = validator.validate(&customer).unwrap();

    let paths: Vec<&str> = result.errors().iter().map(ValidationFailure::property_name).collect();
    assert_eq!(paths, vec!["Orders[1]", "Orders[2]"]);
}

#[test]
fn missing_elements_are_skipped_but_keep_their_index() {
    #[derive(Debug)]
    struct Tagged {
        tags: Vec<Option<String>>,
    }

    let evaluated = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&evaluated);
    let validator = Validator::<Tagged>::builder()
        .rule(
            rule_for_each_nullable("Tags", |t: &Tagged| t.tags.as_slice())
                .must(move |_, _| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    true
                })
                .not_empty(),
        )
        .build();

    let tagged = Tagged {
        tags: vec![
            None,
            Some(String::new()),
            None,
            Some("ok".to_owned()),
            Some(String::new()),
        ],
    };
    let result = validator.validate(&tagged).unwrap();

    // Five slots, two missing: exactly three elements evaluated.
    assert_eq!(evaluated.load(Ordering::SeqCst), 3);
    let paths: Vec<&str> = result.errors().iter().map(ValidationFailure::property_name).collect();
    assert_eq!(paths, vec!["Tags[1]", "Tags[4]"]);
}

#[test]
fn missing_sequence_yields_no_failures() {
    #[derive(Debug)]
    struct Draft {
        lines: Option<Vec<String>>,
    }

    let validator = Validator::<Draft>::builder()
        .rule(
            rule_for_each_opt("Lines", |d: &Draft| d.lines.as_deref()).not_empty(),
        )
        .build();

    assert!(validator.validate(&Draft { lines: None }).unwrap().is_valid());

    let populated = Draft {
        lines: Some(vec!["ok".to_owned(), String::new()]),
    };
    let result = validator.validate(&populated).unwrap();
    assert_eq!(result.errors()[0].property_name(), "Lines[1]");
}

#[test]
fn filtered_elements_keep_original_indices() {
    let validator = Validator::<Customer>::builder()
        .rule(
            rule_for_each("Orders", |c: &Customer| c.orders.as_slice())
                .where_element(|order| order.amount > 0.0)
                .must(|_, order| !order.product_name.is_empty()),
        )
        .build();

    // Element 0 is filtered out (amount 0); element 1 fails; element 2 passes.
    let customer = customer(vec![
        Order::new("", 0.0),
        Order::new("", 5.0),
        Order::new("ok", 5.0),
    ]);
    let result = validator.validate(&customer).unwrap();

    let paths: Vec<&str> = result.errors().iter().map(ValidationFailure::property_name).collect();
    assert_eq!(paths, vec!["Orders[1]"]);
}

#[test]
fn cascade_stop_is_scoped_to_one_element() {
    let validator = Validator::<Customer>::builder()
        .rule(
            rule_for_each("Orders", |c: &Customer| c.orders.as_slice())
                .cascade(CascadeMode::Stop)
                .must(|_, order| !order.product_name.is_empty())
                .must(|_, order| order.amount > 0.0),
        )
        .build();

    // Element 0 fails the first component; its second component is skipped,
    // but element 1 is still fully validated.
    let customer = customer(vec![Order::new("", 0.0), Order::new("ok", 0.0)]);
    let result = validator.validate(&customer).unwrap();

    let codes: Vec<(&str, &str)> = result
        .errors()
        .iter()
        .map(|f| (f.property_name(), f.error_code()))
        .collect();
    assert_eq!(codes, vec![("Orders[0]", "predicate"), ("Orders[1]", "predicate")]);
}

#[test]
fn collection_index_placeholder_is_available_to_messages() {
    let validator = Validator::<Customer>::builder()
        .rule(
            rule_for_each("Orders", |c: &Customer| c.orders.as_slice())
                .must(|_, order| order.amount > 0.0)
                .with_message("order #{CollectionIndex} has no amount"),
        )
        .build();

    let customer = customer(vec![Order::new("a", 1.0), Order::new("b", 0.0)]);
    let result = validator.validate(&customer).unwrap();

    let failure = &result.errors()[0];
    assert_eq!(failure.error_message(), "order #1 has no amount");
    assert_eq!(failure.placeholder("CollectionIndex"), Some("1"));
}

#[test]
fn nested_child_prefixes_the_property_name() {
    let address_validator = Arc::new(
        Validator::<Address>::builder()
            .rule(rule_for("Line1", |a: &Address| &a.line1).not_empty())
            .build(),
    );
    let validator = Validator::<Customer>::builder()
        .rule(
            rule_for("Address", |c: &Customer| &c.address)
                .set_validator_opt(address_validator),
        )
        .build();

    // Missing address: the adaptor contributes nothing.
    assert!(validator.validate(&customer(vec![])).unwrap().is_valid());

    let mut with_address = customer(vec![]);
    with_address.address = Some(Address { line1: String::new() });
    let result = validator.validate(&with_address).unwrap();
    assert_eq!(result.errors()[0].property_name(), "Address.Line1");
}

#[test]
fn collections_nested_inside_child_validators_compose_paths() {
    let order_validator = Arc::new(
        Validator::<Order>::builder()
            .rule(rule_for_each("Items", |o: &Order| o.items.as_slice()).not_empty())
            .build(),
    );
    let validator = Validator::<Customer>::builder()
        .rule(
            rule_for_each("Orders", |c: &Customer| c.orders.as_slice())
                .set_validator(order_validator),
        )
        .build();

    let mut bad_order = Order::new("ok", 1.0);
    bad_order.items = vec!["fine".to_owned(), String::new()];
    let customer = customer(vec![Order::new("ok", 1.0), bad_order]);
    let result = validator.validate(&customer).unwrap();

    assert_eq!(result.errors().len(), 1);
    let failure = &result.errors()[0];
    assert_eq!(failure.property_name(), "Orders[1].Items[1]");
    // The innermost iteration owns the placeholder during the child run.
    assert_eq!(failure.placeholder("CollectionIndex"), Some("1"));
}

#[test]
fn outer_collection_index_is_restored_after_child_run() {
    let order_validator = Arc::new(
        Validator::<Order>::builder()
            .rule(rule_for_each("Items", |o: &Order| o.items.as_slice()).not_empty())
            .build(),
    );
    let validator = Validator::<Customer>::builder()
        .rule(
            rule_for_each("Orders", |c: &Customer| c.orders.as_slice())
                .set_validator(order_validator)
                .must(|_, _| false)
                .with_message("outer #{CollectionIndex}"),
        )
        .build();

    let mut noisy = Order::new("ok", 1.0);
    noisy.items = vec![String::new()];
    let customer = customer(vec![Order::new("ok", 1.0), noisy]);
    let result = validator.validate(&customer).unwrap();

    // The component that runs after delegation still sees the outer index.
    let outer: Vec<&str> = result
        .errors()
        .iter()
        .filter(|f| f.error_code() == "predicate")
        .map(ValidationFailure::error_message)
        .collect();
    assert_eq!(outer, vec!["outer #0", "outer #1"]);
}

#[test]
fn child_validator_chosen_from_discriminator() {
    #[derive(Debug)]
    struct Payment {
        kind: String,
        details: Details,
    }

    #[derive(Debug)]
    struct Details {
        account: String,
    }

    let bank = Arc::new(
        Validator::<Details>::builder()
            .rule(
                rule_for("Account", |d: &Details| &d.account)
                    .not_empty()
                    .with_error_code("bank_account"),
            )
            .build(),
    );
    let card = Arc::new(
        Validator::<Details>::builder()
            .rule(
                rule_for("Account", |d: &Details| &d.account)
                    .exact_length(16)
                    .with_error_code("card_number"),
            )
            .build(),
    );

    let validator = Validator::<Payment>::builder()
        .rule(
            rule_for("Details", |p: &Payment| &p.details).set_validator_with(move |payment| {
                match payment.kind.as_str() {
                    "bank" => Some(Arc::clone(&bank)),
                    "card" => Some(Arc::clone(&card)),
                    _ => None,
                }
            }),
        )
        .build();

    let bank_payment = Payment {
        kind: "bank".to_owned(),
        details: Details { account: String::new() },
    };
    let result = validator.validate(&bank_payment).unwrap();
    assert_eq!(result.errors()[0].error_code(), "bank_account");
    assert_eq!(result.errors()[0].property_name(), "Details.Account");

    let card_payment = Payment {
        kind: "card".to_owned(),
        details: Details { account: "123".to_owned() },
    };
    let result = validator.validate(&card_payment).unwrap();
    assert_eq!(result.errors()[0].error_code(), "card_number");

    // Unknown discriminator: no validator resolved, no failures.
    let other = Payment {
        kind: "cash".to_owned(),
        details: Details { account: String::new() },
    };
    assert!(validator.validate(&other).unwrap().is_valid());
}
