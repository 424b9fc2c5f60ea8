//! Emptiness validators
//!
//! [`NotEmpty`] and [`Empty`] work over any property type implementing
//! [`Emptiness`]: strings, collections, and `Option`s of either (where
//! `None` counts as empty).

use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::context::PropertyContext;
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::core::traits::PropertyValidator;

// ============================================================================
// EMPTINESS
// ============================================================================

/// Types with a meaningful notion of "empty".
pub trait Emptiness {
    /// True if the value is empty.
    fn is_empty_value(&self) -> bool;
}

impl Emptiness for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<E> Emptiness for Vec<E> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<V: Emptiness> Emptiness for Option<V> {
    fn is_empty_value(&self) -> bool {
        self.as_ref().is_none_or(Emptiness::is_empty_value)
    }
}

// ============================================================================
// NOT EMPTY
// ============================================================================

/// Fails when the property value is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmpty;

impl NotEmpty {
    /// Creates the validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for NotEmpty
where
    T: Send + Sync,
    P: Emptiness + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "not_empty"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if ctx.value().is_empty_value() {
            Ok(vec![ctx.failure(
                "not_empty",
                "'{PropertyName}' must not be empty.",
            )])
        } else {
            Ok(Vec::new())
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
// EMPTY
// ============================================================================

/// Fails when the property value is not empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl Empty {
    /// Creates the validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for Empty
where
    T: Send + Sync,
    P: Emptiness + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "empty"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if ctx.value().is_empty_value() {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure("empty", "'{PropertyName}' must be empty.")])
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
