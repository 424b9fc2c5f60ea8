//! Nullability validators for `Option` properties

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::context::PropertyContext;
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::core::traits::PropertyValidator;

// ============================================================================
// NOT NULL
// ============================================================================

/// Fails when an `Option` property is `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotNull;

impl NotNull {
    /// Creates the validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, Option<P>> for NotNull
where
    T: Send + Sync,
    P: Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "not_null"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, Option<P>>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if ctx.value().is_some() {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure(
                "not_null",
                "'{PropertyName}' must not be empty.",
            )])
        }
    }

    async fn validate_async(
        &self,
        ctx: &PropertyContext<'_, T, Option<P>>,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        self.validate(ctx)
    }
}

// ============================================================================
// NULL
// ============================================================================

/// Fails when an `Option` property has a value. Useful for fields that must
/// stay unset in a given state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Null;

impl Null {
    /// Creates the validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, Option<P>> for Null
where
    T: Send + Sync,
    P: Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "null"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, Option<P>>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if ctx.value().is_none() {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure("null", "'{PropertyName}' must be empty.")])
        }
    }

    async fn validate_async(
        &self,
        ctx: &PropertyContext<'_, T, Option<P>>,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        self.validate(ctx)
    }
}
