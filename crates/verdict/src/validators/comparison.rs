//! Comparison validators
//!
//! [`Equal`]/[`NotEqual`] need only `PartialEq`; the ordering checks go
//! through [`Compare`] with a [`ComparisonOp`]. Every comparison can target
//! either a constant or another member of the parent instance, resolved at
//! validation time - the `{ComparisonValue}` placeholder renders whichever
//! was used.

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::context::PropertyContext;
use crate::core::error::EngineError;
use crate::core::failure::ValidationFailure;
use crate::core::message::placeholder;
use crate::core::traits::PropertyValidator;
use crate::rules::component::Accessor;

// ============================================================================
// COMPARISON TARGET
// ============================================================================

/// The other side of a comparison: a constant bound at declaration time, or
/// another member of the parent instance read at validation time.
pub enum ComparisonTarget<T, P> {
    /// Compare against a fixed value.
    Constant(P),
    /// Compare against another property of the parent instance.
    Member {
        /// Display name of the other property.
        name: Cow<'static, str>,
        /// Accessor reading the other property.
        accessor: Accessor<T, P>,
    },
}

impl<T, P> ComparisonTarget<T, P> {
    fn resolve<'a>(&'a self, instance: &'a T) -> &'a P {
        match self {
            Self::Constant(value) => value,
            Self::Member { accessor, .. } => accessor(instance),
        }
    }

    fn render(&self, instance: &T) -> String
    where
        P: fmt::Debug,
    {
        match self {
            Self::Constant(value) => format!("{value:?}"),
            Self::Member { name, accessor } => {
                format!("{name} ({:?})", accessor(instance))
            }
        }
    }
}

impl<T, P: fmt::Debug> fmt::Debug for ComparisonTarget<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Member { name, .. } => f.debug_tuple("Member").field(name).finish(),
        }
    }
}

fn comparison_placeholder(rendered: String) -> Vec<(Cow<'static, str>, String)> {
    vec![(Cow::Borrowed(placeholder::COMPARISON_VALUE), rendered)]
}

// ============================================================================
// EQUAL / NOT EQUAL
// ============================================================================

/// Validates that the property value equals the target.
#[derive(Debug)]
pub struct Equal<T, P> {
    target: ComparisonTarget<T, P>,
}

impl<T, P> Equal<T, P> {
    /// Compares against a constant.
    #[must_use]
    pub fn new(value: P) -> Self {
        Self {
            target: ComparisonTarget::Constant(value),
        }
    }

    /// Compares against another member of the parent instance.
    #[must_use]
    pub fn member(name: impl Into<Cow<'static, str>>, accessor: Accessor<T, P>) -> Self {
        Self {
            target: ComparisonTarget::Member {
                name: name.into(),
                accessor,
            },
        }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for Equal<T, P>
where
    T: Send + Sync,
    P: PartialEq + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "equal"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if ctx.value() == self.target.resolve(ctx.instance()) {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure_with(
                "equal",
                "'{PropertyName}' must be equal to {ComparisonValue}.",
                comparison_placeholder(self.target.render(ctx.instance())),
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

/// Validates that the property value differs from the target.
#[derive(Debug)]
pub struct NotEqual<T, P> {
    target: ComparisonTarget<T, P>,
}

impl<T, P> NotEqual<T, P> {
    /// Compares against a constant.
    #[must_use]
    pub fn new(value: P) -> Self {
        Self {
            target: ComparisonTarget::Constant(value),
        }
    }

    /// Compares against another member of the parent instance.
    #[must_use]
    pub fn member(name: impl Into<Cow<'static, str>>, accessor: Accessor<T, P>) -> Self {
        Self {
            target: ComparisonTarget::Member {
                name: name.into(),
                accessor,
            },
        }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for NotEqual<T, P>
where
    T: Send + Sync,
    P: PartialEq + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        "not_equal"
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if ctx.value() != self.target.resolve(ctx.instance()) {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure_with(
                "not_equal",
                "'{PropertyName}' must not be equal to {ComparisonValue}.",
                comparison_placeholder(self.target.render(ctx.instance())),
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
// ORDERING COMPARISONS
// ============================================================================

/// Which ordering relation [`Compare`] enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// value < target
    LessThan,
    /// value <= target
    LessThanOrEqual,
    /// value > target
    GreaterThan,
    /// value >= target
    GreaterThanOrEqual,
}

impl ComparisonOp {
    fn name(self) -> &'static str {
        match self {
            Self::LessThan => "less_than",
            Self::LessThanOrEqual => "less_than_or_equal",
            Self::GreaterThan => "greater_than",
            Self::GreaterThanOrEqual => "greater_than_or_equal",
        }
    }

    fn template(self) -> &'static str {
        match self {
            Self::LessThan => "'{PropertyName}' must be less than {ComparisonValue}.",
            Self::LessThanOrEqual => {
                "'{PropertyName}' must be less than or equal to {ComparisonValue}."
            }
            Self::GreaterThan => "'{PropertyName}' must be greater than {ComparisonValue}.",
            Self::GreaterThanOrEqual => {
                "'{PropertyName}' must be greater than or equal to {ComparisonValue}."
            }
        }
    }

    fn holds<P: PartialOrd>(self, value: &P, target: &P) -> bool {
        match self {
            Self::LessThan => value < target,
            Self::LessThanOrEqual => value <= target,
            Self::GreaterThan => value > target,
            Self::GreaterThanOrEqual => value >= target,
        }
    }
}

/// Validates an ordering relation between the property value and a target.
#[derive(Debug)]
pub struct Compare<T, P> {
    op: ComparisonOp,
    target: ComparisonTarget<T, P>,
}

impl<T, P> Compare<T, P> {
    /// Compares against a constant.
    #[must_use]
    pub fn new(op: ComparisonOp, value: P) -> Self {
        Self {
            op,
            target: ComparisonTarget::Constant(value),
        }
    }

    /// Compares against another member of the parent instance.
    #[must_use]
    pub fn member(
        op: ComparisonOp,
        name: impl Into<Cow<'static, str>>,
        accessor: Accessor<T, P>,
    ) -> Self {
        Self {
            op,
            target: ComparisonTarget::Member {
                name: name.into(),
                accessor,
            },
        }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for Compare<T, P>
where
    T: Send + Sync,
    P: PartialOrd + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        self.op.name()
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        if self.op.holds(ctx.value(), self.target.resolve(ctx.instance())) {
            Ok(Vec::new())
        } else {
            Ok(vec![ctx.failure_with(
                self.op.name(),
                self.op.template(),
                comparison_placeholder(self.target.render(ctx.instance())),
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
// BETWEEN
// ============================================================================

/// Validates that the property value lies within a range.
#[derive(Debug, Clone, Copy)]
pub struct Between<P> {
    from: P,
    to: P,
    exclusive: bool,
}

impl<P> Between<P> {
    /// Inclusive range: `from <= value <= to`.
    #[must_use]
    pub fn inclusive(from: P, to: P) -> Self {
        Self {
            from,
            to,
            exclusive: false,
        }
    }

    /// Exclusive range: `from < value < to`.
    #[must_use]
    pub fn exclusive(from: P, to: P) -> Self {
        Self {
            from,
            to,
            exclusive: true,
        }
    }
}

#[async_trait]
impl<T, P> PropertyValidator<T, P> for Between<P>
where
    T: Send + Sync,
    P: PartialOrd + Send + Sync + fmt::Debug,
{
    fn name(&self) -> &'static str {
        if self.exclusive {
            "exclusive_between"
        } else {
            "inclusive_between"
        }
    }

    fn validate(
        &self,
        ctx: &PropertyContext<'_, T, P>,
    ) -> Result<Vec<ValidationFailure>, EngineError> {
        let value = ctx.value();
        let inside = if self.exclusive {
            *value > self.from && *value < self.to
        } else {
            *value >= self.from && *value <= self.to
        };
        if inside {
            Ok(Vec::new())
        } else {
            let template = if self.exclusive {
                "'{PropertyName}' must be between {From} and {To} (exclusive)."
            } else {
                "'{PropertyName}' must be between {From} and {To}."
            };
            Ok(vec![ctx.failure_with(
                <Between<P> as PropertyValidator<T, P>>::name(self),
                template,
                vec![
                    (Cow::Borrowed(placeholder::FROM), format!("{:?}", self.from)),
                    (Cow::Borrowed(placeholder::TO), format!("{:?}", self.to)),
                ],
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
