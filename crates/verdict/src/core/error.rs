//! Engine faults
//!
//! Faults are distinct from validation failures: a failure means the *data*
//! is invalid and is returned inside a
//! [`ValidationResult`](crate::core::failure::ValidationResult); a fault
//! means the *rule graph or the call itself* is unusable and aborts the
//! whole pass. Faults never carry partial results.

use thiserror::Error;

/// Fault that aborts a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The synchronous entry point reached a validator that requires
    /// asynchronous execution. The pass is aborted rather than silently
    /// blocking on (or skipping) the async work.
    #[error(
        "validator `{validator}` for property `{property}` requires asynchronous execution; \
         call `validate_async` instead"
    )]
    AsyncValidatorInvokedSynchronously {
        /// Name of the validator that demanded async execution.
        validator: String,
        /// Fully qualified property path at the point of the fault.
        property: String,
    },

    /// The synchronous entry point reached a rule or component gated by an
    /// asynchronous condition.
    #[error(
        "rule for property `{property}` is gated by an asynchronous condition; \
         call `validate_async` instead"
    )]
    AsyncConditionInvokedSynchronously {
        /// Fully qualified property path at the point of the fault.
        property: String,
    },

    /// The caller requested rule sets that are not declared on the
    /// validator. Running the pass anyway would silently validate nothing.
    #[error("unknown rule set(s) requested: {}", .names.join(", "))]
    UnknownRuleSets {
        /// The requested names with no matching declaration.
        names: Vec<String>,
    },

    /// The cancellation token fired during an asynchronous pass. Failures
    /// collected before the cancellation point are discarded; the caller
    /// gets this distinct outcome instead of an incomplete result.
    #[error("validation pass was cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rule_sets_lists_names() {
        let err = EngineError::UnknownRuleSets {
            names: vec!["audit".into(), "import".into()],
        };
        assert_eq!(err.to_string(), "unknown rule set(s) requested: audit, import");
    }

    #[test]
    fn async_fault_names_validator_and_property() {
        let err = EngineError::AsyncValidatorInvokedSynchronously {
            validator: "must_async".into(),
            property: "Orders[0].ProductName".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("must_async"));
        assert!(rendered.contains("Orders[0].ProductName"));
    }
}
