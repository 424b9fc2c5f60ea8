//! Core validation types
//!
//! The building blocks every other module composes: property chains and
//! contexts, failures and results, engine faults, message formatting, rule
//! selectors, and the two execution traits
//! ([`PropertyValidator`](traits::PropertyValidator),
//! [`ValidationRule`](traits::ValidationRule)).

pub mod chain;
pub mod context;
pub mod error;
pub mod failure;
pub mod message;
pub mod selector;
pub mod traits;

pub use chain::PropertyChain;
pub use context::{PropertyContext, ScopedValue, SharedData, ValidationContext};
pub use error::EngineError;
pub use failure::{Placeholders, Severity, ValidationFailure, ValidationResult};
pub use message::{format_message, placeholder};
pub use selector::{
    CompositeSelector, DefaultRuleSelector, MemberNameSelector, RuleId, RuleSelector,
    RuleSetSelector, SelectionContext,
};
pub use traits::{CascadeMode, PropertyValidator, ValidationRule};
