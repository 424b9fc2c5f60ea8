//! Predicate validators
//!
//! [`Must`] wraps an arbitrary synchronous predicate over the parent
//! instance and property value. [`MustAsync`] is its asynchronous
//! counterpart - an async-only validator: reaching one through the
//! synchronous entry point aborts the pass.

use std::fmt;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::core::context::{PropertyContext, ValidationContext};
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::core::traits::PropertyValidator;

const MUST_TEMPLATE: &str = "The specified condition was not met for '{PropertyName}'.";

// ============================================================================
// MUST
// ============================================================================

/// Validates with a caller-supplied predicate.
///
/// The predicate receives the parent instance and the property value, so a
/// check can relate the two (`|person, code| person.country.accepts(code)`).
#[derive(Clone)]
pub struct Must<F> {
    predicate: F,
}

impl<F> Must<F> {
    /// Wraps a predicate.
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> fmt::Debug for Must<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Must").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, P, F> PropertyValidator<T, P> for Must<F>
where
    T: Send + Sync,
    P: Send + Sync + fmt::Debug,
    F: Fn(&T, &P) -> bool + Send + Sync,
{
    fn name(&self) -> &'static str {
        "predicate"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if (self.predicate)(ctx.instance(), ctx.value()) {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure("predicate", MUST_TEMPLATE)])
        }
    }

    async fn validate_async(
        &self,
        ctx: &PropertyContext<'_, T, P>,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        self.validate(ctx)
    }
}

// ============================================================================
// MUST ASYNC
// ============================================================================

/// Validates with a caller-supplied asynchronous predicate, e.g. an external
/// existence check.
///
/// Async-only: `should_validate_async` is always true, and the synchronous
/// path reports the fault instead of blocking.
#[derive(Clone)]
pub struct MustAsync<F> {
    predicate: F,
}

impl<F> MustAsync<F> {
    /// Wraps an asynchronous predicate.
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> fmt::Debug for MustAsync<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MustAsync").finish_non_exhaustive()
    }
}

#[async_trait]
impl<T, P, F> PropertyValidator<T, P> for MustAsync<F>
where
    T: Send + Sync,
    P: Send + Sync + fmt::Debug,
    F: for<'a> Fn(&'a T, &'a P) -> BoxFuture<'a, bool> + Send + Sync,
{
    fn name(&self) -> &'static str {
        "async_predicate"
    }

    fn should_validate_async(&self, _ctx: &ValidationContext<'_, T>) -> bool {
        true
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        Err(EngineError::AsyncValidatorInvokedSynchronously {
            validator: "async_predicate".to_owned(),
            property: ctx.property_path().to_owned(),
        })
    }

    async fn validate_async(
        &self,
        ctx: &PropertyContext<'_, T, P>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if cancellation.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        if (self.predicate)(ctx.instance(), ctx.value()).await {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure("async_predicate", MUST_TEMPLATE)])
        }
    }
}
