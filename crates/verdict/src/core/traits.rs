//! The two execution traits of the engine
//!
//! [`PropertyValidator`] is the leaf contract: one testable predicate over a
//! property value plus context. [`ValidationRule`] is the node contract: a
//! property (or the whole model) bound to an ordered sequence of validators,
//! evaluated against a [`ValidationContext`].
//!
//! Both traits expose a synchronous and an asynchronous path. The engine
//! picks per node which one to run based on
//! [`PropertyValidator::should_validate_async`]; a synchronous pass that
//! reaches a node demanding async execution aborts with
//! [`EngineError::AsyncValidatorInvokedSynchronously`] rather than silently
//! blocking.

use std::borrow::Cow;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::core::context::{PropertyContext, ValidationContext};
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::descriptor::RuleDescriptor;

// ============================================================================
// CASCADE MODE
// ============================================================================

/// Policy for whether a rule's remaining components run after an earlier one
/// failed.
///
/// In a collection rule the policy applies within each element; a failure on
/// element 0 never suppresses validation of element 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CascadeMode {
    /// Run all components regardless of prior failures (default).
    #[default]
    Continue,
    /// Stop at the first failing component within the rule.
    Stop,
}

// ============================================================================
// PROPERTY VALIDATOR
// ============================================================================

/// A single testable predicate over one property value plus context; the
/// leaf unit of validation logic.
///
/// Implementations return failures as data - a failing value is never an
/// `Err`. The `Err` channel carries engine faults only (async-only validator
/// reached synchronously, cancellation).
///
/// # Examples
///
/// ```rust,ignore
/// struct NonZero;
///
/// #[async_trait]
/// impl<T: Sync> PropertyValidator<T, u32> for NonZero {
///     fn name(&self) -> &'static str {
///         "non_zero"
///     }
///
///     fn validate(&self, ctx: &PropertyContext<'_, T, u32>) -> Result<Vec<ValidationFailure>, EngineError> {
///         if *ctx.value() == 0 {
///             Ok(vec![ctx.failure("non_zero", "'{PropertyName}' must not be zero.")])
///         } else {
///             Ok(Vec::new())
///         }
///     }
///
///     async fn validate_async(
///         &self,
///         ctx: &PropertyContext<'_, T, u32>,
///         _cancellation: &CancellationToken,
///     ) -> Result<Vec<ValidationFailure>, EngineError> {
///         self.validate(ctx)
///     }
/// }
/// ```
#[async_trait]
pub trait PropertyValidator<T, P>: Send + Sync {
    /// Stable name of this validator, used in descriptors and fault
    /// messages.
    fn name(&self) -> &'static str;

    /// True if this validator must run through the asynchronous path.
    ///
    /// The synchronous entry point faults when it reaches a validator
    /// reporting `true`; the asynchronous entry point awaits it.
    fn should_validate_async(&self, ctx: &ValidationContext<'_, T>) -> bool {
        let _ = ctx;
        false
    }

    /// Validates the property value synchronously.
    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError>;

    /// Validates the property value, awaiting as needed. Purely synchronous
    /// validators delegate to [`PropertyValidator::validate`].
    async fn validate_async(
        &self,
        ctx: &PropertyContext<'_, T, P>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>, EngineError>;
}

// ============================================================================
// VALIDATION RULE
// ============================================================================

/// One node of the rule tree: a property (or the model) bound to an ordered
/// sequence of validators, conditions, a cascade policy and dependent rules.
///
/// Rules append their failures to the caller's accumulator so a validator
/// can aggregate across rules without re-allocating per rule.
#[async_trait]
pub trait ValidationRule<T>: Send + Sync {
    /// Declared property name; `None` for model-level rules.
    fn property_name(&self) -> Option<&str>;

    /// Rule sets this rule was declared in; empty means the default set.
    fn rule_sets(&self) -> &[Cow<'static, str>];

    /// Introspection entry for this rule.
    fn describe(&self) -> RuleDescriptor;

    /// Evaluates the rule synchronously, appending failures to `out`.
    fn validate(
        &self,
        ctx: &ValidationContext<'_, T>,
        out: &mut Vec<ValidationFailure>,
    ) -> Result<(), EngineError>;

    /// Evaluates the rule, awaiting components that require it.
    async fn validate_async(
        &self,
        ctx: &ValidationContext<'_, T>,
        cancellation: &CancellationToken,
        out: &mut Vec<ValidationFailure>,
    ) -> Result<(), EngineError>;
}
