//! Rule builders
//!
//! The declaration surface: [`rule_for`] binds a property accessor and
//! returns a [`RuleBuilder`] whose chained methods append validators and
//! configuration; [`rule_for_each`] (and its `_opt`/`_nullable` variants)
//! does the same for collection properties. Builders are plain values -
//! they are handed to
//! [`ValidatorBuilder::rule`](crate::engine::ValidatorBuilder::rule), which
//! consumes them via [`IntoRule`].
//!
//! Configuration methods that shape failures (`with_message`,
//! `with_error_code`, `with_severity`, `with_state`) and component-level
//! conditions (`when_component`, `unless_component`) apply to the most
//! recently added validator; rule-level conditions (`when`, `unless` and
//! their async forms) gate the whole rule including its dependent rules.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use regex::Regex;

use crate::core::failure::Severity;
use crate::core::traits::{CascadeMode, PropertyValidator, ValidationRule};
use crate::engine::Validator;
use crate::rules::child::ChildValidatorAdaptor;
use crate::rules::collection::{CollectionAccessor, CollectionRule, ElementIter};
use crate::rules::component::{Condition, MessageSource, RuleComponent};
use crate::rules::property::PropertyRule;
use crate::validators::{
    Between, Compare, ComparisonOp, EmailAddress, Empty, Emptiness, Equal, ExactLength, Length,
    Matches, MaxLength, MinLength, Must, MustAsync, NotEmpty, NotEqual, NotNull, Null,
};

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Starts a rule for one property of `T`.
///
/// The accessor and name pair is the only member binding the engine needs:
/// no reflection, the rule closes over the typed getter.
///
/// # Examples
///
/// ```rust,ignore
/// let rule = rule_for("Surname", |p: &Person| &p.surname).not_null();
/// ```
pub fn rule_for<T, P>(
    name: impl Into<Cow<'static, str>>,
    accessor: impl for<'a> Fn(&'a T) -> &'a P + Send + Sync + 'static,
) -> RuleBuilder<T, P> {
    RuleBuilder {
        rule: PropertyRule::new(name, Arc::new(accessor)),
    }
}

/// Starts a model-level rule: the "property" is the instance itself and the
/// declared property name is empty (`None` in descriptors).
pub fn rule_for_model<T>() -> RuleBuilder<T, T> {
    RuleBuilder {
        rule: PropertyRule::new("", Arc::new(|instance: &T| instance)),
    }
}

/// Starts a rule applied to every element of a slice property.
pub fn rule_for_each<T, E>(
    name: impl Into<Cow<'static, str>>,
    accessor: impl for<'a> Fn(&'a T) -> &'a [E] + Send + Sync + 'static,
) -> CollectionRuleBuilder<T, E>
where
    E: Sync,
{
    let accessor: CollectionAccessor<T, E> = Arc::new(move |instance: &T| {
        Some(Box::new(accessor(instance).iter().map(Some)) as ElementIter<'_, E>)
    });
    CollectionRuleBuilder {
        rule: CollectionRule::new(name, accessor),
    }
}

/// Starts a collection rule over a nullable sequence: a `None` sequence
/// yields no failures at all.
pub fn rule_for_each_opt<T, E>(
    name: impl Into<Cow<'static, str>>,
    accessor: impl for<'a> Fn(&'a T) -> Option<&'a [E]> + Send + Sync + 'static,
) -> CollectionRuleBuilder<T, E>
where
    E: Sync,
{
    let accessor: CollectionAccessor<T, E> = Arc::new(move |instance: &T| {
        accessor(instance)
            .map(|elements| Box::new(elements.iter().map(Some)) as ElementIter<'_, E>)
    });
    CollectionRuleBuilder {
        rule: CollectionRule::new(name, accessor),
    }
}

/// Starts a collection rule over a sequence with missing elements: `None`
/// slots keep their index but are skipped without producing failures.
pub fn rule_for_each_nullable<T, E>(
    name: impl Into<Cow<'static, str>>,
    accessor: impl for<'a> Fn(&'a T) -> &'a [Option<E>] + Send + Sync + 'static,
) -> CollectionRuleBuilder<T, E>
where
    E: Sync,
{
    let accessor: CollectionAccessor<T, E> = Arc::new(move |instance: &T| {
        Some(Box::new(accessor(instance).iter().map(Option::as_ref)) as ElementIter<'_, E>)
    });
    CollectionRuleBuilder {
        rule: CollectionRule::new(name, accessor),
    }
}

// ============================================================================
// INTO RULE
// ============================================================================

/// Finalizes a rule builder into an executable rule. Implemented by
/// [`RuleBuilder`] and [`CollectionRuleBuilder`]; consumed by
/// [`ValidatorBuilder::rule`](crate::engine::ValidatorBuilder::rule) and
/// rule-set scopes.
pub trait IntoRule<T> {
    /// Boxes the finished rule.
    fn into_rule(self) -> Box<dyn ValidationRule<T>>;

    /// Tags the rule as a member of `name` before finalizing.
    #[must_use]
    fn in_rule_set(self, name: Cow<'static, str>) -> Self;
}

/// Accumulates rules that execute only when their parent rule produced no
/// failures. Built through the `dependent` method on rule builders.
pub struct DependentRules<T> {
    rules: Vec<Box<dyn ValidationRule<T>>>,
}

impl<T> DependentRules<T> {
    /// Appends a dependent rule.
    #[must_use]
    pub fn rule(mut self, rule: impl IntoRule<T>) -> Self {
        self.rules.push(rule.into_rule());
        self
    }
}

impl<T> fmt::Debug for DependentRules<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependentRules")
            .field("rules", &self.rules.len())
            .finish()
    }
}

// ============================================================================
// SHARED BUILDER SURFACE
// ============================================================================

// Both builders carry the same configuration surface over their inner rule
// (the inner field names line up by construction); the element type of a
// collection rule plays the role of `P`.
macro_rules! rule_builder_common {
    () => {
        /// Appends a validator as the next component of this rule.
        /// Components evaluate in the order they were added.
        #[must_use]
        pub fn validator(mut self, validator: impl PropertyValidator<T, P> + 'static) -> Self {
            self.rule
                .components
                .push(RuleComponent::new(Arc::new(validator)));
            self
        }

        /// Validates with an arbitrary predicate over the parent instance
        /// and the property value.
        #[must_use]
        pub fn must<F>(self, predicate: F) -> Self
        where
            F: Fn(&T, &P) -> bool + Send + Sync + 'static,
            P: fmt::Debug,
        {
            self.validator(Must::new(predicate))
        }

        /// Validates with an asynchronous predicate. The resulting rule can
        /// only run through `validate_async`.
        #[must_use]
        pub fn must_async<F>(self, predicate: F) -> Self
        where
            F: for<'a> Fn(&'a T, &'a P) -> BoxFuture<'a, bool> + Send + Sync + 'static,
            P: fmt::Debug,
        {
            self.validator(MustAsync::new(predicate))
        }

        /// The value must not be empty (see
        /// [`Emptiness`](crate::validators::Emptiness)).
        #[must_use]
        pub fn not_empty(self) -> Self
        where
            P: Emptiness + fmt::Debug,
        {
            self.validator(NotEmpty::new())
        }

        /// The value must be empty.
        #[must_use]
        pub fn empty(self) -> Self
        where
            P: Emptiness + fmt::Debug,
        {
            self.validator(Empty::new())
        }

        /// String length must fall within `min..=max` characters.
        #[must_use]
        pub fn length(self, min: usize, max: usize) -> Self
        where
            P: AsRef<str> + fmt::Debug,
        {
            self.validator(Length::new(min, max))
        }

        /// String length must be at least `min` characters.
        #[must_use]
        pub fn min_length(self, min: usize) -> Self
        where
            P: AsRef<str> + fmt::Debug,
        {
            self.validator(MinLength::new(min))
        }

        /// String length must be at most `max` characters.
        #[must_use]
        pub fn max_length(self, max: usize) -> Self
        where
            P: AsRef<str> + fmt::Debug,
        {
            self.validator(MaxLength::new(max))
        }

        /// String length must be exactly `length` characters.
        #[must_use]
        pub fn exact_length(self, length: usize) -> Self
        where
            P: AsRef<str> + fmt::Debug,
        {
            self.validator(ExactLength::new(length))
        }

        /// The value must match the regular expression.
        #[must_use]
        pub fn matches(self, regex: Regex) -> Self
        where
            P: AsRef<str> + fmt::Debug,
        {
            self.validator(Matches::new(regex))
        }

        /// The value must look like an email address.
        #[must_use]
        pub fn email_address(self) -> Self
        where
            P: AsRef<str> + fmt::Debug,
        {
            self.validator(EmailAddress::new())
        }

        /// The value must equal `value`.
        #[must_use]
        pub fn equal(self, value: P) -> Self
        where
            P: PartialEq + Send + Sync + fmt::Debug,
        {
            self.validator(Equal::new(value))
        }

        /// The value must equal another member of the parent instance.
        #[must_use]
        pub fn equal_member(
            self,
            name: impl Into<Cow<'static, str>>,
            accessor: impl for<'a> Fn(&'a T) -> &'a P + Send + Sync + 'static,
        ) -> Self
        where
            P: PartialEq + Send + Sync + fmt::Debug,
        {
            self.validator(Equal::member(name, Arc::new(accessor)))
        }

        /// The value must not equal `value`.
        #[must_use]
        pub fn not_equal(self, value: P) -> Self
        where
            P: PartialEq + Send + Sync + fmt::Debug,
        {
            self.validator(NotEqual::new(value))
        }

        /// The value must not equal another member of the parent instance.
        #[must_use]
        pub fn not_equal_member(
            self,
            name: impl Into<Cow<'static, str>>,
            accessor: impl for<'a> Fn(&'a T) -> &'a P + Send + Sync + 'static,
        ) -> Self
        where
            P: PartialEq + Send + Sync + fmt::Debug,
        {
            self.validator(NotEqual::member(name, Arc::new(accessor)))
        }

        /// The value must be strictly less than `value`.
        #[must_use]
        pub fn less_than(self, value: P) -> Self
        where
            P: PartialOrd + Send + Sync + fmt::Debug,
        {
            self.validator(Compare::new(ComparisonOp::LessThan, value))
        }

        /// The value must be less than or equal to `value`.
        #[must_use]
        pub fn less_than_or_equal(self, value: P) -> Self
        where
            P: PartialOrd + Send + Sync + fmt::Debug,
        {
            self.validator(Compare::new(ComparisonOp::LessThanOrEqual, value))
        }

        /// The value must be strictly greater than `value`.
        #[must_use]
        pub fn greater_than(self, value: P) -> Self
        where
            P: PartialOrd + Send + Sync + fmt::Debug,
        {
            self.validator(Compare::new(ComparisonOp::GreaterThan, value))
        }

        /// The value must be greater than or equal to `value`.
        #[must_use]
        pub fn greater_than_or_equal(self, value: P) -> Self
        where
            P: PartialOrd + Send + Sync + fmt::Debug,
        {
            self.validator(Compare::new(ComparisonOp::GreaterThanOrEqual, value))
        }

        /// The value must be strictly greater than another member of the
        /// parent instance.
        #[must_use]
        pub fn greater_than_member(
            self,
            name: impl Into<Cow<'static, str>>,
            accessor: impl for<'a> Fn(&'a T) -> &'a P + Send + Sync + 'static,
        ) -> Self
        where
            P: PartialOrd + Send + Sync + fmt::Debug,
        {
            self.validator(Compare::member(
                ComparisonOp::GreaterThan,
                name,
                Arc::new(accessor),
            ))
        }

        /// The value must be strictly less than another member of the
        /// parent instance.
        #[must_use]
        pub fn less_than_member(
            self,
            name: impl Into<Cow<'static, str>>,
            accessor: impl for<'a> Fn(&'a T) -> &'a P + Send + Sync + 'static,
        ) -> Self
        where
            P: PartialOrd + Send + Sync + fmt::Debug,
        {
            self.validator(Compare::member(
                ComparisonOp::LessThan,
                name,
                Arc::new(accessor),
            ))
        }

        /// The value must lie in `from..=to`.
        #[must_use]
        pub fn inclusive_between(self, from: P, to: P) -> Self
        where
            P: PartialOrd + Send + Sync + fmt::Debug,
        {
            self.validator(Between::inclusive(from, to))
        }

        /// The value must lie strictly between `from` and `to`.
        #[must_use]
        pub fn exclusive_between(self, from: P, to: P) -> Self
        where
            P: PartialOrd + Send + Sync + fmt::Debug,
        {
            self.validator(Between::exclusive(from, to))
        }

        /// Overrides the error message of the most recent validator. The
        /// template is rendered against the failure's placeholders, so
        /// `{PropertyName}` and friends keep working.
        #[must_use]
        pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
            match self.rule.components.last_mut() {
                Some(component) => component.set_message(MessageSource::Literal(message.into())),
                None => debug_assert!(false, "with_message must follow a validator"),
            }
            self
        }

        /// Computes the error message of the most recent validator from the
        /// parent instance and property value at failure time.
        #[must_use]
        pub fn with_message_fn(
            mut self,
            message: impl Fn(&T, &P) -> String + Send + Sync + 'static,
        ) -> Self {
            match self.rule.components.last_mut() {
                Some(component) => component.set_message(MessageSource::Lazy(Arc::new(message))),
                None => debug_assert!(false, "with_message_fn must follow a validator"),
            }
            self
        }

        /// Overrides the error code of the most recent validator.
        #[must_use]
        pub fn with_error_code(mut self, code: impl Into<Cow<'static, str>>) -> Self {
            match self.rule.components.last_mut() {
                Some(component) => component.set_error_code(code.into()),
                None => debug_assert!(false, "with_error_code must follow a validator"),
            }
            self
        }

        /// Overrides the severity of the most recent validator's failures.
        #[must_use]
        pub fn with_severity(mut self, severity: Severity) -> Self {
            match self.rule.components.last_mut() {
                Some(component) => component.set_severity(severity),
                None => debug_assert!(false, "with_severity must follow a validator"),
            }
            self
        }

        /// Attaches custom state to the most recent validator's failures.
        #[must_use]
        pub fn with_state(mut self, state: serde_json::Value) -> Self {
            match self.rule.components.last_mut() {
                Some(component) => component.set_custom_state(state),
                None => debug_assert!(false, "with_state must follow a validator"),
            }
            self
        }

        /// Gates the most recent validator on a predicate over the parent
        /// instance.
        #[must_use]
        pub fn when_component(
            mut self,
            condition: impl Fn(&T) -> bool + Send + Sync + 'static,
        ) -> Self {
            match self.rule.components.last_mut() {
                Some(component) => component.set_condition(Arc::new(condition)),
                None => debug_assert!(false, "when_component must follow a validator"),
            }
            self
        }

        /// Gates the most recent validator on the negation of a predicate.
        #[must_use]
        pub fn unless_component(
            self,
            condition: impl Fn(&T) -> bool + Send + Sync + 'static,
        ) -> Self {
            self.when_component(move |instance| !condition(instance))
        }

        /// Gates the most recent validator on an asynchronous predicate.
        /// The resulting rule can only run through `validate_async`.
        #[must_use]
        pub fn when_component_async(
            mut self,
            condition: impl for<'a> Fn(&'a T) -> BoxFuture<'a, bool> + Send + Sync + 'static,
        ) -> Self {
            match self.rule.components.last_mut() {
                Some(component) => component.set_async_condition(Arc::new(condition)),
                None => debug_assert!(false, "when_component_async must follow a validator"),
            }
            self
        }

        /// Gates the entire rule (components and dependent rules) on a
        /// predicate over the parent instance. Multiple calls combine with
        /// logical AND.
        #[must_use]
        pub fn when(mut self, condition: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
            let condition: Condition<T> = Arc::new(condition);
            self.rule.condition = Some(match self.rule.condition.take() {
                Some(existing) => {
                    Arc::new(move |instance: &T| existing(instance) && condition(instance))
                }
                None => condition,
            });
            self
        }

        /// Gates the entire rule on the negation of a predicate.
        #[must_use]
        pub fn unless(self, condition: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
            self.when(move |instance| !condition(instance))
        }

        /// Gates the entire rule on an asynchronous predicate. The rule can
        /// then only run through `validate_async`.
        #[must_use]
        pub fn when_async(
            mut self,
            condition: impl for<'a> Fn(&'a T) -> BoxFuture<'a, bool> + Send + Sync + 'static,
        ) -> Self {
            self.rule.async_condition = Some(Arc::new(condition));
            self
        }

        /// Gates the entire rule on the negation of an asynchronous
        /// predicate.
        #[must_use]
        pub fn unless_async(
            self,
            condition: impl for<'a> Fn(&'a T) -> BoxFuture<'a, bool> + Send + Sync + 'static,
        ) -> Self {
            let condition = Arc::new(condition);
            self.when_async(move |instance| {
                let pending = condition(instance);
                Box::pin(async move { !pending.await })
            })
        }

        /// Sets this rule's cascade mode, overriding the validator default.
        #[must_use]
        pub fn cascade(mut self, mode: CascadeMode) -> Self {
            self.rule.cascade = Some(mode);
            self
        }

        /// Overrides the display name used in messages, independent of the
        /// member name used in paths.
        #[must_use]
        pub fn override_property_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
            self.rule.display_name = Some(name.into());
            self
        }

        /// Declares rules that execute only if this rule produced no
        /// failures. Dependent failures are appended after the parent's.
        #[must_use]
        pub fn dependent(
            mut self,
            build: impl FnOnce(DependentRules<T>) -> DependentRules<T>,
        ) -> Self {
            let built = build(DependentRules { rules: Vec::new() });
            self.rule.dependent.extend(built.rules);
            self
        }
    };
}

// ============================================================================
// PROPERTY RULE BUILDER
// ============================================================================

/// Chained configuration for a rule over one property of `T`.
///
/// Created by [`rule_for`]; finished by handing it to
/// [`ValidatorBuilder::rule`](crate::engine::ValidatorBuilder::rule).
pub struct RuleBuilder<T, P> {
    rule: PropertyRule<T, P>,
}

impl<T, P> RuleBuilder<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    rule_builder_common!();

    /// Delegates validation of this property's value to a complete child
    /// validator.
    #[must_use]
    pub fn set_validator(self, validator: Arc<Validator<P>>) -> Self {
        self.validator(ChildValidatorAdaptor::new(validator))
    }

    /// Resolves the child validator from the parent instance at validation
    /// time; `None` skips delegation.
    #[must_use]
    pub fn set_validator_with(
        self,
        provider: impl Fn(&T) -> Option<Arc<Validator<P>>> + Send + Sync + 'static,
    ) -> Self {
        self.validator(ChildValidatorAdaptor::from_parent(provider))
    }

    /// Resolves the child validator from the parent instance and the
    /// property value, enabling polymorphic selection on a discriminator.
    #[must_use]
    pub fn set_validator_with_value(
        self,
        provider: impl Fn(&T, &P) -> Option<Arc<Validator<P>>> + Send + Sync + 'static,
    ) -> Self {
        self.validator(ChildValidatorAdaptor::from_parent_and_value(provider))
    }
}

impl<T, Q> RuleBuilder<T, Option<Q>>
where
    T: Send + Sync + 'static,
    Q: Send + Sync + 'static,
{
    /// The `Option` property must be `Some`.
    #[must_use]
    pub fn not_null(self) -> Self
    where
        Q: fmt::Debug,
    {
        self.validator(NotNull::new())
    }

    /// The `Option` property must be `None`.
    #[must_use]
    pub fn null(self) -> Self
    where
        Q: fmt::Debug,
    {
        self.validator(Null::new())
    }

    /// Delegates validation of the inner value to a child validator; a
    /// `None` property contributes zero failures.
    #[must_use]
    pub fn set_validator_opt(self, validator: Arc<Validator<Q>>) -> Self {
        self.validator(ChildValidatorAdaptor::<T, Q>::new(validator))
    }
}

impl<T, P> IntoRule<T> for RuleBuilder<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn into_rule(self) -> Box<dyn ValidationRule<T>> {
        Box::new(self.rule)
    }

    fn in_rule_set(mut self, name: Cow<'static, str>) -> Self {
        self.rule.rule_sets.push(name);
        self
    }
}

impl<T, P> fmt::Debug for RuleBuilder<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleBuilder").field("rule", &self.rule).finish()
    }
}

// ============================================================================
// COLLECTION RULE BUILDER
// ============================================================================

/// Chained configuration for a rule over every element of a collection
/// property. `P` is the element type.
///
/// Created by [`rule_for_each`] and its variants.
pub struct CollectionRuleBuilder<T, P> {
    rule: CollectionRule<T, P>,
}

impl<T, P> CollectionRuleBuilder<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    rule_builder_common!();

    /// Validates only elements the filter accepts. Skipped elements keep
    /// their index: paths always reflect the position in the original
    /// sequence.
    #[must_use]
    pub fn where_element(mut self, filter: impl Fn(&P) -> bool + Send + Sync + 'static) -> Self {
        self.rule.filter = Some(Arc::new(filter));
        self
    }

    /// Delegates validation of each element to a complete child validator.
    #[must_use]
    pub fn set_validator(self, validator: Arc<Validator<P>>) -> Self {
        self.validator(ChildValidatorAdaptor::new(validator))
    }

    /// Resolves the child validator from the parent instance at validation
    /// time; `None` skips delegation.
    #[must_use]
    pub fn set_validator_with(
        self,
        provider: impl Fn(&T) -> Option<Arc<Validator<P>>> + Send + Sync + 'static,
    ) -> Self {
        self.validator(ChildValidatorAdaptor::from_parent(provider))
    }

    /// Resolves the child validator from the parent instance and the
    /// element value.
    #[must_use]
    pub fn set_validator_with_value(
        self,
        provider: impl Fn(&T, &P) -> Option<Arc<Validator<P>>> + Send + Sync + 'static,
    ) -> Self {
        self.validator(ChildValidatorAdaptor::from_parent_and_value(provider))
    }
}

impl<T, P> IntoRule<T> for CollectionRuleBuilder<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn into_rule(self) -> Box<dyn ValidationRule<T>> {
        Box::new(self.rule)
    }

    fn in_rule_set(mut self, name: Cow<'static, str>) -> Self {
        self.rule.rule_sets.push(name);
        self
    }
}

impl<T, P> fmt::Debug for CollectionRuleBuilder<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionRuleBuilder")
            .field("rule", &self.rule)
            .finish()
    }
}
