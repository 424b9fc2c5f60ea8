//! The aggregate validator
//!
//! A [`Validator`] owns an ordered list of rules and exposes the
//! synchronous and asynchronous entry points. It is immutable after
//! [`ValidatorBuilder::build`]; every piece of per-pass state lives in the
//! [`ValidationContext`], so one validator can serve many concurrent passes
//! over distinct instances without synchronization.
//!
//! Rule-set selection, explicit property inclusion and the call-level
//! cascade default are configured per pass through [`ValidationOptions`].

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::core::context::ValidationContext;
use crate::core::error::EngineError;
use crate::core::failure::{ValidationFailure, ValidationResult};
use crate::core::selector::{
    CompositeSelector, DEFAULT_RULE_SET, DefaultRuleSelector, MemberNameSelector, RuleId,
    RuleSelector, RuleSetSelector, WILDCARD_RULE_SET,
};
use crate::core::traits::{CascadeMode, ValidationRule};
use crate::descriptor::ValidatorDescriptor;
use crate::rules::builder::IntoRule;

// ============================================================================
// VALIDATION OPTIONS
// ============================================================================

/// Per-call configuration: which rule sets and properties run, and the
/// cascade default applied to rules without their own.
///
/// # Examples
///
/// ```rust,ignore
/// let options = ValidationOptions::new()
///     .include_rule_sets(["identity"])
///     .include_properties(["Orders"]);
/// let result = validator.validate_with(&customer, &options)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationOptions {
    pub(crate) rule_sets: Vec<String>,
    pub(crate) properties: Vec<String>,
    pub(crate) cascade: Option<CascadeMode>,
}

impl ValidationOptions {
    /// Default options: the unnamed rule set, all properties, the
    /// validator's cascade default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs only rules belonging to the given rule sets. The name
    /// `default` selects rules outside any set; `*` selects everything.
    /// Requesting a set the validator never declared faults the pass.
    #[must_use]
    pub fn include_rule_sets(mut self, sets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.rule_sets.extend(sets.into_iter().map(Into::into));
        self
    }

    /// Runs every declared rule set (shorthand for including `*`).
    #[must_use]
    pub fn include_all_rule_sets(mut self) -> Self {
        self.rule_sets.push(WILDCARD_RULE_SET.to_owned());
        self
    }

    /// Runs only rules for the given property names (and anything nested
    /// beneath them), regardless of rule-set membership filters.
    #[must_use]
    pub fn include_properties(
        mut self,
        properties: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.properties.extend(properties.into_iter().map(Into::into));
        self
    }

    /// Overrides the cascade default applied to rules that do not declare
    /// their own.
    #[must_use]
    pub fn cascade(mut self, mode: CascadeMode) -> Self {
        self.cascade = Some(mode);
        self
    }

    fn build_selector(&self) -> Arc<dyn RuleSelector> {
        let mut selectors: Vec<Arc<dyn RuleSelector>> = Vec::new();
        if !self.rule_sets.is_empty() {
            selectors.push(Arc::new(RuleSetSelector::new(self.rule_sets.iter().cloned())));
        }
        if !self.properties.is_empty() {
            selectors.push(Arc::new(MemberNameSelector::new(self.properties.iter().cloned())));
        }
        match selectors.len() {
            0 => Arc::new(DefaultRuleSelector),
            1 => selectors.remove(0),
            _ => Arc::new(CompositeSelector::new(selectors)),
        }
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// An immutable set of rules for `T`, executable against any number of
/// instances, concurrently, from the synchronous or asynchronous entry
/// point.
pub struct Validator<T> {
    rules: Vec<Box<dyn ValidationRule<T>>>,
    default_cascade: CascadeMode,
    declared_rule_sets: Vec<String>,
}

impl<T> Validator<T> {
    /// Starts declaring a validator.
    #[must_use]
    pub fn builder() -> ValidatorBuilder<T> {
        ValidatorBuilder::new()
    }

    /// Introspection over the declared rules, without executing them.
    #[must_use]
    pub fn descriptor(&self) -> ValidatorDescriptor {
        ValidatorDescriptor::new(self.rules.iter().map(|rule| rule.describe()).collect())
    }

    /// Names of the rule sets declared on this validator.
    #[must_use]
    pub fn declared_rule_sets(&self) -> &[String] {
        &self.declared_rule_sets
    }

    fn check_requested_rule_sets(&self, options: &ValidationOptions) -> Result<(), EngineError> {
        let unknown: Vec<String> = options
            .rule_sets
            .iter()
            .filter(|name| {
                name.as_str() != DEFAULT_RULE_SET
                    && name.as_str() != WILDCARD_RULE_SET
                    && !self.declared_rule_sets.contains(name)
            })
            .cloned()
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(EngineError::UnknownRuleSets { names: unknown })
        }
    }
}

impl<T> Validator<T>
where
    T: Send + Sync,
{
    /// Validates `instance` synchronously with default options.
    ///
    /// # Errors
    ///
    /// Faults if the rule graph requires asynchronous execution; data
    /// failures are returned inside the `Ok` result, never as `Err`.
    pub fn validate(&self, instance: &T) -> Result<ValidationResult, EngineError> {
        self.validate_with(instance, &ValidationOptions::default())
    }

    /// Validates `instance` synchronously.
    ///
    /// # Errors
    ///
    /// Faults on unknown requested rule sets or when a reachable validator
    /// requires asynchronous execution.
    pub fn validate_with(
        &self,
        instance: &T,
        options: &ValidationOptions,
    ) -> Result<ValidationResult, EngineError> {
        self.check_requested_rule_sets(options)?;
        let cascade = options.cascade.unwrap_or(self.default_cascade);
        let ctx = ValidationContext::root(instance, options.build_selector(), false, cascade);
        let mut failures = Vec::new();
        self.run_rules(&ctx, &mut failures)?;
        debug!(failures = failures.len(), "validation pass finished");
        Ok(ValidationResult::new(failures))
    }

    /// Validates `instance`, awaiting validators that require it, with
    /// default options.
    ///
    /// # Errors
    ///
    /// Faults on cancellation; data failures are returned inside the `Ok`
    /// result.
    pub async fn validate_async(
        &self,
        instance: &T,
        cancellation: &CancellationToken,
    ) -> Result<ValidationResult, EngineError> {
        self.validate_with_async(instance, &ValidationOptions::default(), cancellation)
            .await
    }

    /// Validates `instance`, awaiting validators that require it.
    ///
    /// # Errors
    ///
    /// Faults on unknown requested rule sets or cancellation.
    pub async fn validate_with_async(
        &self,
        instance: &T,
        options: &ValidationOptions,
        cancellation: &CancellationToken,
    ) -> Result<ValidationResult, EngineError> {
        self.check_requested_rule_sets(options)?;
        let cascade = options.cascade.unwrap_or(self.default_cascade);
        let ctx = ValidationContext::root(instance, options.build_selector(), true, cascade);
        let mut failures = Vec::new();
        self.run_rules_async(&ctx, cancellation, &mut failures).await?;
        debug!(failures = failures.len(), "validation pass finished");
        Ok(ValidationResult::new(failures))
    }

    /// Runs this validator's rules under an externally constructed context;
    /// the delegation path used by the child validator adaptor.
    pub(crate) fn validate_in_context(
        &self,
        mut ctx: ValidationContext<'_, T>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        ctx.set_cascade_default(self.default_cascade);
        let mut failures = Vec::new();
        self.run_rules(&ctx, &mut failures)?;
        Ok(failures)
    }

    pub(crate) async fn validate_in_context_async(
        &self,
        mut ctx: ValidationContext<'_, T>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        ctx.set_cascade_default(self.default_cascade);
        let mut failures = Vec::new();
        self.run_rules_async(&ctx, cancellation, &mut failures).await?;
        Ok(failures)
    }

    fn run_rules(
        &self,
        ctx: &ValidationContext<'_, T>,
        out: &mut Vec<ValidationFailure>,
    ) -> Result<(), EngineError> {
        let selection = ctx.selection();
        for rule in &self.rules {
            let path = ctx.chain().build_name(rule.property_name().unwrap_or(""));
            let id = RuleId {
                property_name: rule.property_name(),
                rule_sets: rule.rule_sets(),
            };
            if !ctx.selector().can_execute(id, &path, selection) {
                trace!(property = %path, "rule skipped by selector");
                continue;
            }
            rule.validate(ctx, out)?;
        }
        Ok(())
    }

    async fn run_rules_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancellation: &CancellationToken,
        out: &mut Vec<ValidationFailure>,
    ) -> Result<(), EngineError> {
        let selection = ctx.selection();
        for rule in &self.rules {
            if cancellation.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let path = ctx.chain().build_name(rule.property_name().unwrap_or(""));
            let id = RuleId {
                property_name: rule.property_name(),
                rule_sets: rule.rule_sets(),
            };
            if !ctx.selector().can_execute(id, &path, selection) {
                trace!(property = %path, "rule skipped by selector");
                continue;
            }
            rule.validate_async(ctx, cancellation, out).await?;
        }
        Ok(())
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules.len())
            .field("default_cascade", &self.default_cascade)
            .field("declared_rule_sets", &self.declared_rule_sets)
            .finish()
    }
}

// ============================================================================
// VALIDATOR BUILDER
// ============================================================================

/// Accumulates rules into an immutable [`Validator`].
///
/// # Examples
///
/// ```rust,ignore
/// let validator = Validator::<Person>::builder()
///     .rule(rule_for("Surname", |p: &Person| &p.surname).not_null())
///     .rule(
///         rule_for_each("Orders", |p: &Person| p.orders.as_slice())
///             .set_validator(order_validator.clone()),
///     )
///     .build();
/// ```
pub struct ValidatorBuilder<T> {
    rules: Vec<Box<dyn ValidationRule<T>>>,
    default_cascade: CascadeMode,
}

impl<T> ValidatorBuilder<T> {
    fn new() -> Self {
        Self {
            rules: Vec::new(),
            default_cascade: CascadeMode::Continue,
        }
    }

    /// Sets the cascade default for rules that do not declare their own.
    #[must_use]
    pub fn cascade(mut self, mode: CascadeMode) -> Self {
        self.default_cascade = mode;
        self
    }

    /// Appends a rule. Declaration order is execution order.
    #[must_use]
    pub fn rule(mut self, rule: impl IntoRule<T>) -> Self {
        self.rules.push(rule.into_rule());
        self
    }

    /// Declares rules inside a named rule set. These rules only execute
    /// when the set is requested through
    /// [`ValidationOptions::include_rule_sets`].
    #[must_use]
    pub fn rule_set(
        mut self,
        name: impl Into<Cow<'static, str>>,
        scope: impl FnOnce(RuleSetScope<T>) -> RuleSetScope<T>,
    ) -> Self {
        let built = scope(RuleSetScope {
            name: name.into(),
            rules: Vec::new(),
        });
        self.rules.extend(built.rules);
        self
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(self) -> Validator<T> {
        let mut declared_rule_sets: Vec<String> = Vec::new();
        for rule in &self.rules {
            for set in rule.rule_sets() {
                if !declared_rule_sets.iter().any(|s| s == set.as_ref()) {
                    declared_rule_sets.push(set.to_string());
                }
            }
        }
        Validator {
            rules: self.rules,
            default_cascade: self.default_cascade,
            declared_rule_sets,
        }
    }
}

impl<T> Default for ValidatorBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ValidatorBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorBuilder")
            .field("rules", &self.rules.len())
            .field("default_cascade", &self.default_cascade)
            .finish()
    }
}

/// Scope handed to the closure of [`ValidatorBuilder::rule_set`]; rules
/// added here are tagged with the set's name.
pub struct RuleSetScope<T> {
    name: Cow<'static, str>,
    rules: Vec<Box<dyn ValidationRule<T>>>,
}

impl<T> RuleSetScope<T> {
    /// Appends a rule to this rule set.
    #[must_use]
    pub fn rule(mut self, rule: impl IntoRule<T>) -> Self {
        self.rules.push(rule.in_rule_set(self.name.clone()).into_rule());
        self
    }
}

impl<T> fmt::Debug for RuleSetScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSetScope")
            .field("name", &self.name)
            .field("rules", &self.rules.len())
            .finish()
    }
}
