//! Pattern validators

use std::fmt;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio_util::sync::CancellationToken;

use crate::core::context::PropertyContext;
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::core::traits::PropertyValidator;

// ============================================================================
// MATCHES
// ============================================================================

/// Validates that a string matches a regular expression.
#[derive(Debug, Clone)]
pub struct Matches {
    regex: Regex,
}

impl Matches {
    /// Creates the validator from a compiled expression.
    #[must_use]
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }

    /// Compiles `pattern` and creates the validator.
    ///
    /// # Errors
    ///
    /// Returns the compile error for an invalid pattern.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for Matches
where
    T: Send + Sync,
    P: AsRef<str> + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "regular_expression"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if self.regex.is_match(ctx.value().as_ref()) {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure(
                "regular_expression",
                "'{PropertyName}' is not in the correct format.",
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

// ============================================================================
// EMAIL ADDRESS
// ============================================================================

// Deliberately permissive: one `@`, no whitespace, something on both sides.
// Anything stricter rejects real deliverable addresses.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("static email pattern is valid"));

/// Validates that a string looks like an email address.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailAddress;

impl EmailAddress {
    /// Creates the validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for EmailAddress
where
    T: Send + Sync,
    P: AsRef<str> + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "email_address"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if EMAIL.is_match(ctx.value().as_ref()) {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure(
                "email_address",
                "'{PropertyName}' is not a valid email address.",
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
