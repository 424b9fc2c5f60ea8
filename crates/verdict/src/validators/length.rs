//! String length validators
//!
//! Length is measured in Unicode scalar values (`chars`), not bytes, so the
//! reported `{TotalLength}` matches what a user perceives for non-ASCII
//! input. Placeholders: `{MinLength}`, `{MaxLength}`, `{TotalLength}`.

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::context::PropertyContext;
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::core::message::placeholder;
use crate::core::traits::PropertyValidator;

fn measure(input: &str) -> usize {
    input.chars().count()
}

fn length_placeholders(
    min: Option<usize>,
    max: Option<usize>,
    total: usize,
) -> Vec<(Cow<'static, str>, String)> {
    let mut entries = Vec::with_capacity(3);
    if let Some(min) = min {
        entries.push((Cow::Borrowed(placeholder::MIN_LENGTH), min.to_string()));
    }
    if let Some(max) = max {
        entries.push((Cow::Borrowed(placeholder::MAX_LENGTH), max.to_string()));
    }
    entries.push((Cow::Borrowed(placeholder::TOTAL_LENGTH), total.to_string()));
    entries
}

// ============================================================================
// LENGTH
// ============================================================================

/// Validates that a string's length falls within `min..=max` characters.
#[derive(Debug, Clone, Copy)]
pub struct Length {
    min: usize,
    max: usize,
}

impl Length {
    /// Creates a validator for the inclusive range `min..=max`.
    #[must_use]
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for Length
where
    T: Send + Sync,
    P: AsRef<str> + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "length"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        let total = measure(ctx.value().as_ref());
        if total < self.min || total > self.max {
            Ok(vec![ctx.failure_with(
                "length",
                "'{PropertyName}' must be between {MinLength} and {MaxLength} characters. \
                 You entered {TotalLength} characters.",
                length_placeholders(Some(self.min), Some(self.max), total),
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
// MIN LENGTH
// ============================================================================

/// Validates that a string has at least `min` characters.
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    min: usize,
}

impl MinLength {
    /// Creates the validator.
    #[must_use]
    pub fn new(min: usize) -> Self {
        Self { min }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for MinLength
where
    T: Send + Sync,
    P: AsRef<str> + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "min_length"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        let total = measure(ctx.value().as_ref());
        if total < self.min {
            Ok(vec![ctx.failure_with(
                "min_length",
                "'{PropertyName}' must be at least {MinLength} characters. \
                 You entered {TotalLength} characters.",
                length_placeholders(Some(self.min), None, total),
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
// MAX LENGTH
// ============================================================================

/// Validates that a string has at most `max` characters.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength {
    max: usize,
}

impl MaxLength {
    /// Creates the validator.
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for MaxLength
where
    T: Send + Sync,
    P: AsRef<str> + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "max_length"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        let total = measure(ctx.value().as_ref());
        if total > self.max {
            Ok(vec![ctx.failure_with(
                "max_length",
                "'{PropertyName}' must be {MaxLength} characters or fewer. \
                 You entered {TotalLength} characters.",
                length_placeholders(None, Some(self.max), total),
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
// EXACT LENGTH
// ============================================================================

/// Validates that a string has exactly `length` characters.
#[derive(Debug, Clone, Copy)]
pub struct ExactLength {
    length: usize,
}

impl ExactLength {
    /// Creates the validator.
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for ExactLength
where
    T: Send + Sync,
    P: AsRef<str> + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "exact_length"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        let total = measure(ctx.value().as_ref());
        if total == self.length {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure_with(
                "exact_length",
                "'{PropertyName}' must be exactly {MaxLength} characters. \
                 You entered {TotalLength} characters.",
                length_placeholders(None, Some(self.length), total),
            )])
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
