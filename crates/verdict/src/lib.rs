//! # verdict
//!
//! A declarative, composable validation engine for typed object graphs:
//! rules over properties (including nested objects and collections) are
//! declared once, then executed - synchronously or asynchronously - against
//! any number of instances, producing a flat list of failures with fully
//! qualified paths such as `Orders[2].ProductName`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use verdict::prelude::*;
//!
//! let validator = Validator::<Person>::builder()
//!     .rule(rule_for("Surname", |p: &Person| &p.surname).not_null())
//!     .rule(rule_for("Age", |p: &Person| &p.age).greater_than_or_equal(18))
//!     .build();
//!
//! let result = validator.validate(&person)?;
//! for failure in result.errors() {
//!     println!("{}: {}", failure.property_name(), failure.error_message());
//! }
//! ```
//!
//! ## Nested objects and collections
//!
//! Child validators delegate a property's value to a complete separate rule
//! set; collection rules apply per element with index-aware paths:
//!
//! ```rust,ignore
//! let order_validator = Arc::new(
//!     Validator::<Order>::builder()
//!         .rule(rule_for("ProductName", |o: &Order| &o.product_name).not_empty())
//!         .build(),
//! );
//!
//! let customer_validator = Validator::<Customer>::builder()
//!     .rule(
//!         rule_for_each("Orders", |c: &Customer| c.orders.as_slice())
//!             .set_validator(order_validator),
//!     )
//!     .build();
//! ```
//!
//! ## Failures are data, faults are errors
//!
//! Invalid data never raises an error: it is collected into the returned
//! [`ValidationResult`](core::failure::ValidationResult). The `Err` channel
//! ([`EngineError`](core::error::EngineError)) is reserved for a rule graph
//! that cannot run as requested - an async-only validator reached through
//! the synchronous entry point, an unknown rule set, or cancellation.

// Deep generic composition (rules over (T, P) pairs, boxed conditions and
// accessors) produces types clippy considers complex; they are inherent to
// the typed-rule architecture.
#![allow(clippy::type_complexity)]

pub mod core;
pub mod descriptor;
pub mod engine;
pub mod prelude;
pub mod rules;
pub mod validators;

pub use crate::core::error::EngineError;
pub use crate::core::failure::{Severity, ValidationFailure, ValidationResult};
pub use crate::core::traits::{CascadeMode, PropertyValidator, ValidationRule};
pub use crate::descriptor::ValidatorDescriptor;
pub use crate::engine::{ValidationOptions, Validator, ValidatorBuilder};
pub use crate::rules::builder::{
    rule_for, rule_for_each, rule_for_each_nullable, rule_for_each_opt, rule_for_model,
};
