//! Built-in leaf validators
//!
//! Each validator implements
//! [`PropertyValidator`](crate::core::traits::PropertyValidator): a pure
//! predicate over the property value (plus context) and a failure with a
//! stable name, error code, default message template and placeholders. The
//! rule builders expose these through typed helper methods
//! (`.not_empty()`, `.greater_than(..)`, ...); the structs are public for
//! direct use with `.validator(..)`.

pub mod comparison;
pub mod emptiness;
pub mod length;
pub mod nullability;
pub mod pattern;
pub mod predicate;

pub use comparison::{Between, Compare, ComparisonOp, ComparisonTarget, Equal, NotEqual};
pub use emptiness::{Empty, Emptiness, NotEmpty};
pub use length::{ExactLength, Length, MaxLength, MinLength};
pub use nullability::{NotNull, Null};
pub use pattern::{EmailAddress, Matches};
pub use predicate::{Must, MustAsync};
