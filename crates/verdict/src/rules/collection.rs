//! Collection rules
//!
//! A [`CollectionRule`] applies its components to every element of a
//! collection property. Missing sequences and missing elements contribute
//! nothing; filtered-out elements are skipped without consuming their index;
//! the element path records the position in the original sequence
//! (`Orders[2]`), never the post-filter position. Cascade applies within an
//! element only - a failure on element 0 never suppresses element 1.

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::core::context::{PropertyContext, ValidationContext};
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::core::message::COLLECTION_INDEX_KEY;
use crate::core::traits::{CascadeMode, PropertyValidator, ValidationRule};
use crate::descriptor::RuleDescriptor;
use crate::rules::component::{AsyncCondition, Condition, RuleComponent};

// ============================================================================
// ELEMENT ACCESS
// ============================================================================

/// Iterator over a collection property's slots. A `None` item is a missing
/// element: it keeps its index but is never validated.
pub type ElementIter<'a, E> = Box<dyn Iterator<Item = Option<&'a E>> + Send + 'a>;

/// Accessor for a collection property. Returning `None` means the sequence
/// itself is missing, which yields no failures at all.
pub type CollectionAccessor<T, E> =
    std::sync::Arc<dyn for<'a> Fn(&'a T) -> Option<ElementIter<'a, E>> + Send + Sync>;

/// Per-element inclusion filter configured via `where_element`.
pub type ElementFilter<E> = std::sync::Arc<dyn Fn(&E) -> bool + Send + Sync>;

// ============================================================================
// COLLECTION RULE
// ============================================================================

/// One collection property of `T`, validated element by element.
///
/// Constructed through
/// [`rule_for_each`](crate::rules::builder::rule_for_each) and its
/// variants; the fields are wired up by the rule builder.
pub struct CollectionRule<T, E> {
    pub(crate) accessor: CollectionAccessor<T, E>,
    pub(crate) property_name: Cow<'static, str>,
    pub(crate) display_name: Option<Cow<'static, str>>,
    pub(crate) components: Vec<RuleComponent<T, E>>,
    pub(crate) condition: Option<Condition<T>>,
    pub(crate) async_condition: Option<AsyncCondition<T>>,
    pub(crate) cascade: Option<CascadeMode>,
    pub(crate) rule_sets: Vec<Cow<'static, str>>,
    pub(crate) dependent: Vec<Box<dyn ValidationRule<T>>>,
    pub(crate) filter: Option<ElementFilter<E>>,
}

impl<T, E> CollectionRule<T, E> {
    pub(crate) fn new(
        property_name: impl Into<Cow<'static, str>>,
        accessor: CollectionAccessor<T, E>,
    ) -> Self {
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
            filter: None,
        }
    }

    fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.property_name)
    }

    fn included(&self, element: &E) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(element))
    }
}

#[async_trait]
impl<T, E> ValidationRule<T> for CollectionRule<T, E>
where
    T: Send + Sync,
    E: Send + Sync,
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
            is_collection: true,
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

        let Some(elements) = (self.accessor)(ctx.instance()) else {
            trace!(property = %path, "collection is missing, nothing to validate");
            return Ok(());
        };

        let cascade = self.cascade.unwrap_or(ctx.cascade_default());
        let before = out.len();

        for (index, slot) in elements.enumerate() {
            let Some(element) = slot else { continue };
            if !self.included(element) {
                continue;
            }

            let mut element_ctx = ctx.clone_for_collection_element();
            element_ctx.chain_mut().add(&self.property_name);
            element_ctx.chain_mut().add_indexer(index);
            let element_path = element_ctx.chain().to_string();
            let _index_scope = ctx.shared().scoped(COLLECTION_INDEX_KEY, json!(index));

            for component in &self.components {
                if let Some(condition) = component.condition() {
                    if !condition(ctx.instance()) {
                        continue;
                    }
                }
                if component.async_condition().is_some() {
                    return Err(EngineError::AsyncConditionInvokedSynchronously {
                        property: element_path.clone(),
                    });
                }
                if component.validator().should_validate_async(&element_ctx) {
                    return Err(EngineError::AsyncValidatorInvokedSynchronously {
                        validator: component.validator().name().to_owned(),
                        property: element_path.clone(),
                    });
                }

                let pctx = PropertyContext::new(
                    &element_ctx,
                    element,
                    &element_path,
                    self.display_name(),
                    &self.property_name,
                    Some(component.options()),
                );
                let failures = component.validator().validate(&pctx)?;
                if !failures.is_empty() {
                    out.extend(failures);
                    if cascade == CascadeMode::Stop {
                        debug!(property = %element_path, "cascade stop within element");
                        break;
                    }
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

        let Some(elements) = (self.accessor)(ctx.instance()) else {
            trace!(property = %path, "collection is missing, nothing to validate");
            return Ok(());
        };

        let cascade = self.cascade.unwrap_or(ctx.cascade_default());
        let before = out.len();

        for (index, slot) in elements.enumerate() {
            if cancellation.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let Some(element) = slot else { continue };
            if !self.included(element) {
                continue;
            }

            let mut element_ctx = ctx.clone_for_collection_element();
            element_ctx.chain_mut().add(&self.property_name);
            element_ctx.chain_mut().add_indexer(index);
            let element_path = element_ctx.chain().to_string();
            let _index_scope = ctx.shared().scoped(COLLECTION_INDEX_KEY, json!(index));

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
                    &element_ctx,
                    element,
                    &element_path,
                    self.display_name(),
                    &self.property_name,
                    Some(component.options()),
                );
                let failures = if component.requires_async(&element_ctx) {
                    component.validator().validate_async(&pctx, cancellation).await?
                } else {
                    component.validator().validate(&pctx)?
                };
                if !failures.is_empty() {
                    out.extend(failures);
                    if cascade == CascadeMode::Stop {
                        debug!(property = %element_path, "cascade stop within element");
                        break;
                    }
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

impl<T, E> fmt::Debug for CollectionRule<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionRule")
            .field("property_name", &self.property_name)
            .field("components", &self.components.len())
            .field("cascade", &self.cascade)
            .field("has_filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}
