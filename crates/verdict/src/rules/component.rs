//! Rule components
//!
//! A component is one (validator, condition) pair within a rule, together
//! with the declaration-time overrides (`with_message`, `with_error_code`,
//! `with_severity`, `with_state`) that shape the failures its validator
//! constructs. Components evaluate in declaration order; the owning rule's
//! cascade mode decides whether later components still run after a failure.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::core::context::ValidationContext;
use crate::core::failure::Severity;
use crate::core::traits::PropertyValidator;

// ============================================================================
// CONDITION AND ACCESSOR TYPES
// ============================================================================

/// Synchronous predicate over the parent instance gating a rule or
/// component.
pub type Condition<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Asynchronous predicate over the parent instance. Only evaluated on the
/// asynchronous path; the synchronous entry point faults when it reaches
/// one.
pub type AsyncCondition<T> = Arc<dyn for<'a> Fn(&'a T) -> BoxFuture<'a, bool> + Send + Sync>;

/// Member accessor bound to a rule at construction time: reads one property
/// of `T`. The paired name string lives on the rule itself.
pub type Accessor<T, P> = Arc<dyn for<'a> Fn(&'a T) -> &'a P + Send + Sync>;

// ============================================================================
// COMPONENT OPTIONS
// ============================================================================

/// Where an overridden error message comes from.
pub enum MessageSource<T, P> {
    /// A fixed template, rendered against the failure's placeholders.
    Literal(Cow<'static, str>),
    /// Computed from the parent instance and property value at failure time.
    Lazy(Arc<dyn Fn(&T, &P) -> String + Send + Sync>),
}

impl<T, P> fmt::Debug for MessageSource<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(template) => f.debug_tuple("Literal").field(template).finish(),
            Self::Lazy(_) => f.debug_tuple("Lazy").field(&"<fn>").finish(),
        }
    }
}

/// Declaration-time overrides applied when a component's validator
/// constructs a failure.
///
/// Failures a child validator returns through delegation are never touched
/// by these; they were finalized by the rules that produced them.
pub struct ComponentOptions<T, P> {
    pub(crate) message: Option<MessageSource<T, P>>,
    pub(crate) error_code: Option<Cow<'static, str>>,
    pub(crate) severity: Option<Severity>,
    pub(crate) custom_state: Option<serde_json::Value>,
}

impl<T, P> Default for ComponentOptions<T, P> {
    fn default() -> Self {
        Self {
            message: None,
            error_code: None,
            severity: None,
            custom_state: None,
        }
    }
}

impl<T, P> fmt::Debug for ComponentOptions<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentOptions")
            .field("message", &self.message)
            .field("error_code", &self.error_code)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RULE COMPONENT
// ============================================================================

/// One validator inside a rule, with its conditions and overrides.
pub struct RuleComponent<T, P> {
    validator: Arc<dyn PropertyValidator<T, P>>,
    condition: Option<Condition<T>>,
    async_condition: Option<AsyncCondition<T>>,
    options: ComponentOptions<T, P>,
}

impl<T, P> RuleComponent<T, P> {
    pub(crate) fn new(validator: Arc<dyn PropertyValidator<T, P>>) -> Self {
        Self {
            validator,
            condition: None,
            async_condition: None,
            options: ComponentOptions::default(),
        }
    }

    /// The wrapped validator.
    #[must_use]
    pub fn validator(&self) -> &Arc<dyn PropertyValidator<T, P>> {
        &self.validator
    }

    /// The component-level synchronous condition, if any.
    #[must_use]
    pub fn condition(&self) -> Option<&Condition<T>> {
        self.condition.as_ref()
    }

    /// The component-level asynchronous condition, if any.
    #[must_use]
    pub fn async_condition(&self) -> Option<&AsyncCondition<T>> {
        self.async_condition.as_ref()
    }

    pub(crate) fn options(&self) -> &ComponentOptions<T, P> {
        &self.options
    }

    /// True if evaluating this component requires the asynchronous path,
    /// either because the validator says so or because an async condition is
    /// attached.
    #[must_use]
    pub fn requires_async(&self, ctx: &ValidationContext<'_, T>) -> bool {
        self.async_condition.is_some() || self.validator.should_validate_async(ctx)
    }

    // -- builder plumbing ---------------------------------------------------

    pub(crate) fn set_condition(&mut self, condition: Condition<T>)
    where
        T: 'static,
    {
        self.condition = Some(match self.condition.take() {
            Some(existing) => Arc::new(move |instance: &T| existing(instance) && condition(instance)),
            None => condition,
        });
    }

    pub(crate) fn set_async_condition(&mut self, condition: AsyncCondition<T>) {
        self.async_condition = Some(condition);
    }

    pub(crate) fn set_message(&mut self, message: MessageSource<T, P>) {
        self.options.message = Some(message);
    }

    pub(crate) fn set_error_code(&mut self, code: Cow<'static, str>) {
        self.options.error_code = Some(code);
    }

    pub(crate) fn set_severity(&mut self, severity: Severity) {
        self.options.severity = Some(severity);
    }

    pub(crate) fn set_custom_state(&mut self, state: serde_json::Value) {
        self.options.custom_state = Some(state);
    }
}

impl<T, P> fmt::Debug for RuleComponent<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleComponent")
            .field("validator", &self.validator.name())
            .field("has_condition", &self.condition.is_some())
            .field("has_async_condition", &self.async_condition.is_some())
            .finish_non_exhaustive()
    }
}
