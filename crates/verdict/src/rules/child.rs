//! Child validator delegation
//!
//! [`ChildValidatorAdaptor`] is a property validator that hands the
//! property's value to a complete separate [`Validator`]. The target can be
//! a fixed instance or resolved at validation time from the parent instance
//! (and optionally the value), which enables polymorphic selection based on
//! a discriminator field.
//!
//! Path construction: the child context's chain is the parent chain plus
//! this property's name - except while iterating a collection, where the
//! collection rule already appended `Name[i]` and appending again would
//! double-prefix. The enclosing collection index is re-published around the
//! recursive call so messages rendered deep inside the child validator can
//! still reference `{CollectionIndex}`.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::core::context::{PropertyContext, ScopedValue, SharedData, ValidationContext};
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::core::message::COLLECTION_INDEX_KEY;
use crate::core::selector::{RuleSelector, RuleSetSelector};
use crate::core::traits::PropertyValidator;
use crate::engine::Validator;

// ============================================================================
// VALIDATOR RESOLUTION
// ============================================================================

/// How the adaptor finds the validator to delegate to.
pub enum ValidatorProvider<T, P> {
    /// A fixed validator instance.
    Fixed(Arc<Validator<P>>),
    /// Chosen from the parent instance at validation time.
    FromParent(Arc<dyn Fn(&T) -> Option<Arc<Validator<P>>> + Send + Sync>),
    /// Chosen from the parent instance and the property value.
    FromValue(Arc<dyn Fn(&T, &P) -> Option<Arc<Validator<P>>> + Send + Sync>),
}

impl<T, P> fmt::Debug for ValidatorProvider<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Fixed(_) => "Fixed",
            Self::FromParent(_) => "FromParent",
            Self::FromValue(_) => "FromValue",
        };
        f.write_str(kind)
    }
}

// ============================================================================
// CHILD VALIDATOR ADAPTOR
// ============================================================================

/// Delegates validation of a property value to another whole validator.
///
/// Contributes zero failures when the resolved validator is absent or the
/// property value is missing (`Option` properties); otherwise returns the
/// child validator's failures verbatim - their paths are already fully
/// qualified because the child prefixes its own rule names onto the chain
/// constructed here.
#[derive(Debug)]
pub struct ChildValidatorAdaptor<T, P> {
    provider: ValidatorProvider<T, P>,
    rule_sets: Vec<Cow<'static, str>>,
}

impl<T, P> ChildValidatorAdaptor<T, P> {
    /// Delegates to a fixed validator instance.
    #[must_use]
    pub fn new(validator: Arc<Validator<P>>) -> Self {
        Self {
            provider: ValidatorProvider::Fixed(validator),
            rule_sets: Vec::new(),
        }
    }

    /// Resolves the validator from the parent instance at validation time.
    #[must_use]
    pub fn from_parent(
        provider: impl Fn(&T) -> Option<Arc<Validator<P>>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            provider: ValidatorProvider::FromParent(Arc::new(provider)),
            rule_sets: Vec::new(),
        }
    }

    /// Resolves the validator from the parent instance and property value.
    #[must_use]
    pub fn from_parent_and_value(
        provider: impl Fn(&T, &P) -> Option<Arc<Validator<P>>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            provider: ValidatorProvider::FromValue(Arc::new(provider)),
            rule_sets: Vec::new(),
        }
    }

    /// Restricts the child run to the given rule sets.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_rule_sets(
        mut self,
        sets: impl IntoIterator<Item = impl Into<Cow<'static, str>>>,
    ) -> Self {
        self.rule_sets = sets.into_iter().map(Into::into).collect();
        self
    }

    fn resolve(&self, parent: &T, value: &P) -> Option<Arc<Validator<P>>> {
        match &self.provider {
            ValidatorProvider::Fixed(validator) => Some(Arc::clone(validator)),
            ValidatorProvider::FromParent(provider) => provider(parent),
            ValidatorProvider::FromValue(provider) => provider(parent, value),
        }
    }

    /// Builds the context the child validator runs under. The chain gains
    /// this property's name unless a collection rule already appended the
    /// indexed segment; the selector is the parent's unless this adaptor
    /// restricts the child to specific rule sets.
    fn build_child_context<'c>(
        &self,
        parent: &ValidationContext<'_, T>,
        rule_property_name: &str,
        value: &'c P,
    ) -> ValidationContext<'c, P> {
        let mut chain = parent.chain().clone();
        if !parent.is_child_collection_context() {
            chain.add(rule_property_name);
        }
        let selector: Arc<dyn RuleSelector> = if self.rule_sets.is_empty() {
            Arc::clone(parent.selector())
        } else {
            Arc::new(RuleSetSelector::new(self.rule_sets.iter().map(ToString::to_string)))
        };
        parent.for_child_validator(value, chain, selector)
    }

    /// Re-publishes the enclosing collection index for the duration of the
    /// child run; the guard restores the prior value when dropped.
    fn preserve_collection_index<'d>(&self, shared: &'d SharedData) -> Option<ScopedValue<'d>> {
        shared
            .get(COLLECTION_INDEX_KEY)
            .map(|index| shared.scoped(COLLECTION_INDEX_KEY, index))
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for ChildValidatorAdaptor<T, P>
where
    T: Send + Sync,
    P: Send + Sync,
{
    fn name(&self) -> &'static str {
        "child_validator"
    }

    fn should_validate_async(&self, ctx: &ValidationContext<'_, T>) -> bool {
        ctx.is_async()
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        let Some(validator) = self.resolve(ctx.instance(), ctx.value()) else {
            trace!(property = %ctx.property_path(), "no child validator resolved");
            return Ok(Vec::new());
        };
        let child_ctx = self.build_child_context(ctx.parent(), ctx.rule_property_name(), ctx.value());
        let _index_scope = self.preserve_collection_index(ctx.shared());
        validator.validate_in_context(child_ctx)
    }

    async fn validate_async(
        &self,
        ctx: &PropertyContext<'_, T, P>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        let Some(validator) = self.resolve(ctx.instance(), ctx.value()) else {
            trace!(property = %ctx.property_path(), "no child validator resolved");
            return Ok(Vec::new());
        };
        let child_ctx = self.build_child_context(ctx.parent(), ctx.rule_property_name(), ctx.value());
        let _index_scope = self.preserve_collection_index(ctx.shared());
        validator.validate_in_context_async(child_ctx, cancellation).await
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, Option<P>> for ChildValidatorAdaptor<T, P>
where
    T: Send + Sync,
    P: Send + Sync,
{
    fn name(&self) -> &'static str {
        "child_validator"
    }

    fn should_validate_async(&self, ctx: &ValidationContext<'_, T>) -> bool {
        ctx.is_async()
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, Option<P>>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        let Some(value) = ctx.value().as_ref() else {
            return Ok(Vec::new());
        };
        let Some(validator) = self.resolve(ctx.instance(), value) else {
            trace!(property = %ctx.property_path(), "no child validator resolved");
            return Ok(Vec::new());
        };
        let child_ctx = self.build_child_context(ctx.parent(), ctx.rule_property_name(), value);
        let _index_scope = self.preserve_collection_index(ctx.shared());
        validator.validate_in_context(child_ctx)
    }

    async fn validate_async(
        &self,
        ctx: &PropertyContext<'_, T, Option<P>>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        let Some(value) = ctx.value().as_ref() else {
            return Ok(Vec::new());
        };
        let Some(validator) = self.resolve(ctx.instance(), value) else {
            trace!(property = %ctx.property_path(), "no child validator resolved");
            return Ok(Vec::new());
        };
        let child_ctx = self.build_child_context(ctx.parent(), ctx.rule_property_name(), value);
        let _index_scope = self.preserve_collection_index(ctx.shared());
        validator.validate_in_context_async(child_ctx, cancellation).await
    }
}
