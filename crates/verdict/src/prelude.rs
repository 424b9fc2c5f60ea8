//! Common imports for declaring and running validators.
//!
//! ```rust,ignore
//! use verdict::prelude::*;
//!
//! let validator = Validator::<Person>::builder()
//!     .rule(rule_for("Surname", |p: &Person| &p.surname).not_null())
//!     .build();
//! assert!(validator.validate(&person)?.is_valid());
//! ```

pub use crate::core::chain::PropertyChain;
pub use crate::core::context::{PropertyContext, SharedData, ValidationContext};
pub use crate::core::error::EngineError;
pub use crate::core::failure::{Severity, ValidationFailure, ValidationResult};
pub use crate::core::selector::{
    CompositeSelector, DefaultRuleSelector, MemberNameSelector, RuleSelector, RuleSetSelector,
};
pub use crate::core::traits::{CascadeMode, PropertyValidator, ValidationRule};
pub use crate::descriptor::{RuleDescriptor, ValidatorDescriptor};
pub use crate::engine::{RuleSetScope, ValidationOptions, Validator, ValidatorBuilder};
pub use crate::rules::builder::{
    CollectionRuleBuilder, DependentRules, IntoRule, RuleBuilder, rule_for, rule_for_each,
    rule_for_each_nullable, rule_for_each_opt, rule_for_model,
};
pub use crate::rules::child::ChildValidatorAdaptor;
pub use crate::validators::{
    Between, Compare, ComparisonOp, EmailAddress, Empty, Emptiness, Equal, ExactLength, Length,
    Matches, MaxLength, MinLength, Must, MustAsync, NotEmpty, NotEqual, NotNull, Null,
};

// Cancellation is part of the async entry-point signatures; re-exported so
// callers don't need a direct tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
