//! Rules - binding properties to ordered validator sequences
//!
//! [`PropertyRule`](property::PropertyRule) evaluates one property,
//! [`CollectionRule`](collection::CollectionRule) one collection property
//! element by element, and
//! [`ChildValidatorAdaptor`](child::ChildValidatorAdaptor) bridges a
//! property value into a complete child validator. The builders in
//! [`builder`] are the declaration surface.

pub mod builder;
pub mod child;
pub mod collection;
pub mod component;
pub mod property;

pub use builder::{
    CollectionRuleBuilder, DependentRules, IntoRule, RuleBuilder, rule_for, rule_for_each,
    rule_for_each_nullable, rule_for_each_opt, rule_for_model,
};
pub use child::{ChildValidatorAdaptor, ValidatorProvider};
pub use collection::{CollectionRule, ElementIter};
pub use component::{Accessor, AsyncCondition, ComponentOptions, Condition, MessageSource, RuleComponent};
pub use property::PropertyRule;
