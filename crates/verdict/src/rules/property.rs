//! Property rules
//!
//! A [`PropertyRule`] binds one member accessor to an ordered sequence of
//! components, rule-level conditions, a cascade policy and dependent rules.
//! Evaluation: gate on the condition, read the value, run components in
//! order (honoring cascade), then run dependent rules only if this rule
//! produced no failures.

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::core::context::{PropertyContext, ValidationContext};
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::core::traits::{CascadeMode, PropertyValidator, ValidationRule};
use crate::descriptor::RuleDescriptor;
use crate::rules::component::{Accessor, AsyncCondition, Condition, RuleComponent};

// ============================================================================
// PROPERTY RULE
// ============================================================================

/// One property of `T` bound to an ordered sequence of validators.
///
/// Constructed through [`rule_for`](crate::rules::builder::rule_for); the
/// fields are wired up by the rule builder.
pub struct PropertyRule<T, P> {
    pub(crate) accessor: Accessor<T, P>,
    pub(crate) property_name: Cow<'static, str>,
    pub(crate) display_name: Option<Cow<'static, str>>,
    pub(crate) components: Vec<RuleComponent<T, P>>,
    pub(crate) condition: Option<Condition<T>>,
    pub(crate) async_condition: Option<AsyncCondition<T>>,
    pub(crate) cascade: Option<CascadeMode>,
    pub(crate) rule_sets: Vec<Cow<'static, str>>,
    pub(crate) dependent: Vec<Box<dyn ValidationRule<T>>>,
}

impl<T, P> PropertyRule<T, P> {
    pub(crate) fn new(property_name: impl Into<Cow<'static, str>>, accessor: Accessor<T, P>) -> Self {
        Self {
            accessor,
            property_name: property_name.into(),
            display_name: None,
            components: Vec::new(),
            condition: None,
            async_condition: None,
            cascade: None,
            rule_sets: Vec::new(),
            dependent: Vec::new(),
        }
    }

    fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.property_name)
    }
}

#[async_trait]
impl<T, P> ValidationRule<T> for PropertyRule<T, P>
where
    T: Send + Sync,
    P: Send + Sync,
{
    fn property_name(&self) -> Option<&str> {
        if self.property_name.is_empty() {
            None
        } else {
            Some(&self.property_name)
        }
    }

    fn rule_sets(&self) -> &[Cow<'static, str>] {
        &self.rule_sets
    }

    fn describe(&self) -> RuleDescriptor {
        RuleDescriptor {
            property_name: self.property_name().map(ToOwned::to_owned),
            display_name: self.display_name.as_deref().map(ToOwned::to_owned),
            validators: self
                .components
                .iter()
                .map(|c| c.validator().name().to_owned())
                .collect(),
            rule_sets: self.rule_sets.iter().map(|s| s.to_string()).collect(),
            is_collection: false,
            dependent: self.dependent.iter().map(|r| r.describe()).collect(),
        }
    }

    fn validate(
        &self,
        ctx: &ValidationContext<'_, T>,
        out: &mut Vec<ValidationFailure>,
    ) -> Result<(), EngineError> {
        let path = ctx.chain().build_name(&self.property_name);

        if let Some(condition) = &self.condition {
            if !condition(ctx.instance()) {
                trace!(property = %path, "rule condition not met, skipping");
                return Ok(());
            }
        }
        if self.async_condition.is_some() {
            return Err(EngineError::AsyncConditionInvokedSynchronously { property: path });
        }

        let value = (self.accessor)(ctx.instance());
        let cascade = self.cascade.unwrap_or(ctx.cascade_default());
        let before = out.len();

        for component in &self.components {
            if let Some(condition) = component.condition() {
                if !condition(ctx.instance()) {
                    continue;
                }
            }
            if component.async_condition().is_some() {
                return Err(EngineError::AsyncConditionInvokedSynchronously {
                    property: path.clone(),
                });
            }
            if component.validator().should_validate_async(ctx) {
                return Err(EngineError::AsyncValidatorInvokedSynchronously {
                    validator: component.validator().name().to_owned(),
                    property: path.clone(),
                });
            }

            let pctx = PropertyContext::new(
                ctx,
                value,
                &path,
                self.display_name(),
                &self.property_name,
                Some(component.options()),
            );
            let failures = component.validator().validate(&pctx)?;
            if !failures.is_empty() {
                out.extend(failures);
                if cascade == CascadeMode::Stop {
                    debug!(property = %path, "cascade stop after failing component");
                    break;
                }
            }
        }

        if out.len() == before {
            for rule in &self.dependent {
                rule.validate(ctx, out)?;
            }
        }
        Ok(())
    }

    async fn validate_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancellation: &CancellationToken,
        out: &mut Vec<ValidationFailure>,
    ) -> Result<(), EngineError> {
        if cancellation.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        let path = ctx.chain().build_name(&self.property_name);

        if let Some(condition) = &self.condition {
            if !condition(ctx.instance()) {
                trace!(property = %path, "rule condition not met, skipping");
                return Ok(());
            }
        }
        if let Some(condition) = &self.async_condition {
            if !condition(ctx.instance()).await {
                trace!(property = %path, "rule async condition not met, skipping");
                return Ok(());
            }
        }

        let value = (self.accessor)(ctx.instance());
        let cascade = self.cascade.unwrap_or(ctx.cascade_default());
        let before = out.len();

        for component in &self.components {
            if cancellation.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            if let Some(condition) = component.condition() {
                if !condition(ctx.instance()) {
                    continue;
                }
            }
            if let Some(condition) = component.async_condition() {
                if !condition(ctx.instance()).await {
                    continue;
                }
            }

            let pctx = PropertyContext::new(
                ctx,
                value,
                &path,
                self.display_name(),
                &self.property_name,
                Some(component.options()),
            );
            let failures = if component.requires_async(ctx) {
                component.validator().validate_async(&pctx, cancellation).await?
            } else {
                component.validator().validate(&pctx)?
            };
            if !failures.is_empty() {
                out.extend(failures);
                if cascade == CascadeMode::Stop {
                    debug!(property = %path, "cascade stop after failing component");
                    break;
                }
            }
        }

        if out.len() == before {
            for rule in &self.dependent {
                rule.validate_async(ctx, cancellation, out).await?;
            }
        }
        Ok(())
    }
}

impl<T, P> fmt::Debug for PropertyRule<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRule")
            .field("property_name", &self.property_name)
            .field("components", &self.components.len())
            .field("cascade", &self.cascade)
            .field("rule_sets", &self.rule_sets)
            .field("dependent", &self.dependent.len())
            .finish_non_exhaustive()
    }
}
