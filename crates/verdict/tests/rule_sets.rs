//! Rule-set selection, explicit property inclusion and descriptor
//! introspection.

use pretty_assertions::assert_eq;
use verdict::prelude::*;

#[derive(Debug)]
struct Account {
    name: String,
    email: String,
    balance: i64,
}

fn invalid_account() -> Account {
    Account {
        name: String::new(),
        email: "not-an-email".to_owned(),
        balance: -5,
    }
}

fn account_validator() -> Validator<Account> {
    Validator::<Account>::builder()
        .rule(rule_for("Name", |a: &Account| &a.name).not_empty())
        .rule_set("contact", |set| {
            set.rule(rule_for("Email", |a: &Account| &a.email).email_address())
        })
        .rule_set("finance", |set| {
            set.rule(rule_for("Balance", |a: &Account| &a.balance).greater_than_or_equal(0))
        })
        .build()
}

fn failing_properties(result: &ValidationResult) -> Vec<&str> {
    result.errors().iter().map(ValidationFailure::property_name).collect()
}

#[test]
fn default_run_executes_only_unnamed_rules() {
    let validator = account_validator();
    let result = validator.validate(&invalid_account()).unwrap();
    assert_eq!(failing_properties(&result), vec!["Name"]);
}

#[test]
fn requested_rule_set_executes_only_its_rules() {
    let validator = account_validator();
    let options = ValidationOptions::new().include_rule_sets(["contact"]);
    let result = validator.validate_with(&invalid_account(), &options).unwrap();
    assert_eq!(failing_properties(&result), vec!["Email"]);
}

#[test]
fn default_keyword_combines_with_named_sets() {
    let validator = account_validator();
    let options = ValidationOptions::new().include_rule_sets(["default", "finance"]);
    let result = validator.validate_with(&invalid_account(), &options).unwrap();
    assert_eq!(failing_properties(&result), vec!["Name", "Balance"]);
}

#[test]
fn wildcard_executes_every_rule() {
    let validator = account_validator();
    let options = ValidationOptions::new().include_all_rule_sets();
    let result = validator.validate_with(&invalid_account(), &options).unwrap();
    assert_eq!(failing_properties(&result), vec!["Name", "Email", "Balance"]);
}

#[test]
fn unknown_rule_set_aborts_the_pass() {
    let validator = account_validator();
    let options = ValidationOptions::new().include_rule_sets(["contact", "audit"]);
    let err = validator.validate_with(&invalid_account(), &options).unwrap_err();
    assert_eq!(
        err,
        EngineError::UnknownRuleSets {
            names: vec!["audit".to_owned()],
        }
    );
}

#[test]
fn declared_rule_sets_are_exposed() {
    let validator = account_validator();
    let declared: Vec<&str> = validator.declared_rule_sets().iter().map(String::as_str).collect();
    assert_eq!(declared, vec!["contact", "finance"]);
}

#[test]
fn property_inclusion_restricts_by_root_segment() {
    #[derive(Debug)]
    struct Parent {
        surname: Option<String>,
        orders: Vec<String>,
    }

    let validator = Validator::<Parent>::builder()
        .rule(rule_for("Surname", |p: &Parent| &p.surname).not_null())
        .rule(rule_for_each("Orders", |p: &Parent| p.orders.as_slice()).not_empty())
        .build();

    let parent = Parent {
        surname: None,
        orders: vec![String::new(), "ok".to_owned()],
    };

    let unrestricted = validator.validate(&parent).unwrap();
    assert_eq!(failing_properties(&unrestricted), vec!["Surname", "Orders[0]"]);

    let options = ValidationOptions::new().include_properties(["Orders"]);
    let restricted = validator.validate_with(&parent, &options).unwrap();
    assert_eq!(failing_properties(&restricted), vec!["Orders[0]"]);
}

#[test]
fn descriptor_reports_rules_without_running_them() {
    let validator = account_validator();
    let descriptor = validator.descriptor();

    assert_eq!(descriptor.rules().len(), 3);
    assert_eq!(descriptor.validators_for(Some("Name")), vec!["not_empty"]);
    assert!(descriptor.has_validator(Some("Email"), "email_address"));

    let email_rule = descriptor.rules_for(Some("Email")).next().unwrap();
    assert_eq!(email_rule.rule_sets, vec!["contact"]);
    assert!(!email_rule.is_collection);
}

#[test]
fn descriptor_includes_dependent_rules() {
    #[derive(Debug)]
    struct Doc {
        title: String,
        body: String,
    }

    let validator = Validator::<Doc>::builder()
        .rule(
            rule_for("Title", |d: &Doc| &d.title)
                .not_empty()
                .dependent(|rules| rules.rule(rule_for("Body", |d: &Doc| &d.body).not_empty())),
        )
        .build();

    let descriptor = validator.descriptor();
    let title_rule = descriptor.rules_for(Some("Title")).next().unwrap();
    assert_eq!(title_rule.dependent.len(), 1);
    assert_eq!(title_rule.dependent[0].property_name.as_deref(), Some("Body"));
}
