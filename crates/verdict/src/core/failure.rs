//! Validation failures and results
//!
//! A [`ValidationFailure`] is plain data describing one constraint the
//! validated object did not satisfy. Failures are created by leaf validators
//! (with the property path already fully qualified), collected by rules, and
//! returned to the caller wrapped in a [`ValidationResult`]. They are never
//! raised as errors; engine faults live in
//! [`EngineError`](crate::core::error::EngineError).
//!
//! All string fields use `Cow<'static, str>` where the common case is a
//! static string (error codes, placeholder keys), avoiding allocation on the
//! happy path of failure construction.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// SEVERITY
// ============================================================================

/// Severity attached to a validation failure.
///
/// Severity never changes engine behavior (a `Warning` failure still makes
/// the result invalid); it is carried for the caller to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Severity {
    /// The value must be fixed (default).
    #[default]
    Error,
    /// The value should be addressed but may be accepted.
    Warning,
    /// Informational finding.
    Info,
}

// ============================================================================
// VALIDATION FAILURE
// ============================================================================

/// Named placeholder values captured at failure-construction time, used by
/// the message formatter and available to callers for re-rendering.
///
/// Typically 2-4 entries (`PropertyName`, `PropertyValue`, plus
/// validator-specific keys such as `ComparisonValue` or `CollectionIndex`).
pub type Placeholders = SmallVec<[(Cow<'static, str>, String); 4]>;

/// One validation failure: a property, the constraint it violated, and the
/// material needed to render or re-render the message.
///
/// Immutable once constructed. The `property_name` is the fully qualified
/// dot/bracket path from the root instance, e.g. `Orders[2].ProductName`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailure {
    property_name: String,
    error_message: String,
    error_code: Cow<'static, str>,
    severity: Severity,
    attempted_value: Option<String>,
    custom_state: Option<serde_json::Value>,
    placeholders: Placeholders,
}

impl ValidationFailure {
    /// Creates a failure with the given path, message and code.
    ///
    /// Most failures are built through
    /// [`PropertyContext::failure`](crate::core::context::PropertyContext::failure),
    /// which fills in the attempted value and standard placeholders; this
    /// constructor is the escape hatch for custom validators.
    pub fn new(
        property_name: impl Into<String>,
        error_message: impl Into<String>,
        error_code: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            error_message: error_message.into(),
            error_code: error_code.into(),
            severity: Severity::Error,
            attempted_value: None,
            custom_state: None,
            placeholders: SmallVec::new(),
        }
    }

    /// Sets the severity.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Records the rendered attempted value.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_attempted_value(mut self, value: impl Into<String>) -> Self {
        self.attempted_value = Some(value.into());
        self
    }

    /// Attaches caller-defined state to the failure.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_custom_state(mut self, state: serde_json::Value) -> Self {
        self.custom_state = Some(state);
        self
    }

    /// Adds a named placeholder value.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_placeholder(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<String>,
    ) -> Self {
        self.placeholders.push((key.into(), value.into()));
        self
    }

    /// Fully qualified property path from the root instance.
    #[must_use]
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Rendered error message.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Stable error code for programmatic handling.
    #[must_use]
    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    /// Severity of this failure.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Rendering of the value that failed validation, if recorded.
    #[must_use]
    pub fn attempted_value(&self) -> Option<&str> {
        self.attempted_value.as_deref()
    }

    /// Caller-defined state attached at declaration time, if any.
    #[must_use]
    pub fn custom_state(&self) -> Option<&serde_json::Value> {
        self.custom_state.as_ref()
    }

    /// Placeholder values captured when the failure was constructed.
    #[must_use]
    pub fn placeholders(&self) -> &[(Cow<'static, str>, String)] {
        &self.placeholders
    }

    /// Looks up a placeholder value by key.
    #[must_use]
    pub fn placeholder(&self, key: &str) -> Option<&str> {
        self.placeholders
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.property_name.is_empty() {
            write!(f, "{}: {}", self.error_code, self.error_message)
        } else {
            write!(
                f,
                "[{}] {}: {}",
                self.property_name, self.error_code, self.error_message
            )
        }
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

/// Outcome of one validation pass: the ordered failures, if any.
///
/// Failures appear in rule-declaration / execution order. The result is
/// created once per top-level `validate` call and owned by the caller; the
/// engine retains nothing after returning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    errors: Vec<ValidationFailure>,
}

impl ValidationResult {
    /// Wraps collected failures into a result.
    #[must_use]
    pub fn new(errors: Vec<ValidationFailure>) -> Self {
        Self { errors }
    }

    /// True iff no failures were produced.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The failures, in execution order.
    #[must_use]
    pub fn errors(&self) -> &[ValidationFailure] {
        &self.errors
    }

    /// Consumes the result, returning the failures.
    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationFailure> {
        self.errors
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "validation passed");
        }
        writeln!(f, "validation failed with {} error(s):", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl IntoIterator for ValidationResult {
    type Item = ValidationFailure;
    type IntoIter = std::vec::IntoIter<ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_path_and_code() {
        let failure = ValidationFailure::new("Orders[2].ProductName", "must not be empty", "not_empty");
        assert_eq!(failure.property_name(), "Orders[2].ProductName");
        assert_eq!(failure.error_code(), "not_empty");
        assert_eq!(failure.severity(), Severity::Error);
    }

    #[test]
    fn placeholder_lookup() {
        let failure = ValidationFailure::new("Age", "too small", "greater_than")
            .with_placeholder("ComparisonValue", "18")
            .with_placeholder("CollectionIndex", "2");
        assert_eq!(failure.placeholder("ComparisonValue"), Some("18"));
        assert_eq!(failure.placeholder("Missing"), None);
    }

    #[test]
    fn result_is_valid_iff_no_errors() {
        assert!(ValidationResult::default().is_valid());
        let result = ValidationResult::new(vec![ValidationFailure::new("X", "bad", "code")]);
        assert!(!result.is_valid());
        assert_eq!(result.errors().len(), 1);
    }

    #[test]
    fn display_includes_path() {
        let failure = ValidationFailure::new("Surname", "must not be null", "not_null");
        assert_eq!(failure.to_string(), "[Surname] not_null: must not be null");
    }
}
