//! Validation contexts
//!
//! [`ValidationContext`] is the per-pass state threaded through the rule
//! tree: the instance under validation, the property chain, the rule
//! selector and the shared context-data map. Descending into a child
//! validator or a collection element clones the context - the chain is
//! branch-local, while the instance reference, selector and shared data are
//! carried through by reference.
//!
//! [`PropertyContext`] is the narrower view handed to leaf validators: one
//! property's value plus everything needed to construct correctly-addressed
//! failures.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::core::chain::PropertyChain;
use crate::core::failure::{Placeholders, ValidationFailure};
use crate::core::message::{COLLECTION_INDEX_KEY, format_message, placeholder};
use crate::core::selector::{RuleSelector, SelectionContext};
use crate::core::traits::CascadeMode;
use crate::rules::component::{ComponentOptions, MessageSource};

// ============================================================================
// SHARED CONTEXT DATA
// ============================================================================

/// Mutable key-value store shared by reference across one validation pass,
/// including child and collection contexts.
///
/// Used for out-of-band signaling that must be visible to deeply nested
/// validators without being threaded through every call; the collection
/// index is the only key the engine itself maintains. Writes that must
/// behave like dynamically-scoped variables go through [`SharedData::scoped`],
/// which restores the previous value when the guard drops.
#[derive(Clone, Default)]
pub struct SharedData {
    inner: Arc<Mutex<HashMap<String, serde_json::Value>>>,
}

impl SharedData {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous one if present.
    pub fn insert(&self, key: impl Into<String>, value: serde_json::Value) -> Option<serde_json::Value> {
        self.inner.lock().insert(key.into(), value)
    }

    /// Returns a clone of the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.lock().get(key).cloned()
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.lock().remove(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Sets `key` to `value` for the lifetime of the returned guard; the
    /// previous value (or absence) is restored when the guard drops.
    ///
    /// Sibling subtrees evaluated after the guard drops observe the value as
    /// it was before, which is what keeps nested collection iterations from
    /// contaminating each other's `CollectionIndex`.
    #[must_use = "the previous value is restored when the guard is dropped"]
    pub fn scoped(&self, key: impl Into<String>, value: serde_json::Value) -> ScopedValue<'_> {
        let key = key.into();
        let previous = self.inner.lock().insert(key.clone(), value);
        ScopedValue {
            data: self,
            key,
            previous: Some(previous),
        }
    }
}

impl fmt::Debug for SharedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedData")
            .field("entries", &self.inner.lock().len())
            .finish()
    }
}

/// Guard returned by [`SharedData::scoped`]; restores the previous value of
/// the key on drop.
#[derive(Debug)]
pub struct ScopedValue<'d> {
    data: &'d SharedData,
    key: String,
    // Some(prior) until dropped; the outer Option guards double-restore.
    previous: Option<Option<serde_json::Value>>,
}

impl Drop for ScopedValue<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            let mut map = self.data.inner.lock();
            match previous {
                Some(value) => {
                    map.insert(std::mem::take(&mut self.key), value);
                }
                None => {
                    map.remove(&self.key);
                }
            }
        }
    }
}

// ============================================================================
// VALIDATION CONTEXT
// ============================================================================

/// Per-pass state carried through the rule tree.
///
/// The engine never retains a context after the pass returns; every field is
/// either borrowed from the caller (`instance`) or owned per call, which is
/// what makes one `Validator` safely shareable across concurrent passes.
pub struct ValidationContext<'a, T> {
    instance: &'a T,
    chain: PropertyChain,
    selector: Arc<dyn RuleSelector>,
    shared: SharedData,
    is_child_context: bool,
    is_child_collection_context: bool,
    is_async: bool,
    cascade_default: CascadeMode,
}

impl<'a, T> ValidationContext<'a, T> {
    pub(crate) fn root(
        instance: &'a T,
        selector: Arc<dyn RuleSelector>,
        is_async: bool,
        cascade_default: CascadeMode,
    ) -> Self {
        Self {
            instance,
            chain: PropertyChain::new(),
            selector,
            shared: SharedData::new(),
            is_child_context: false,
            is_child_collection_context: false,
            is_async,
            cascade_default,
        }
    }

    /// The object this context is validating. For child contexts this is the
    /// nested value, not the root of the overall pass.
    #[must_use]
    pub fn instance(&self) -> &'a T {
        self.instance
    }

    /// Current property chain.
    #[must_use]
    pub fn chain(&self) -> &PropertyChain {
        &self.chain
    }

    pub(crate) fn chain_mut(&mut self) -> &mut PropertyChain {
        &mut self.chain
    }

    /// The selector deciding which rules execute in this pass.
    #[must_use]
    pub fn selector(&self) -> &Arc<dyn RuleSelector> {
        &self.selector
    }

    /// Shared cross-rule state for this pass.
    #[must_use]
    pub fn shared(&self) -> &SharedData {
        &self.shared
    }

    /// True when validating a nested value through a child validator.
    #[must_use]
    pub fn is_child_context(&self) -> bool {
        self.is_child_context
    }

    /// True when validating one element of a collection property.
    #[must_use]
    pub fn is_child_collection_context(&self) -> bool {
        self.is_child_collection_context
    }

    /// True when this pass runs through the asynchronous entry point.
    #[must_use]
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Cascade mode applied to rules that do not declare their own.
    #[must_use]
    pub fn cascade_default(&self) -> CascadeMode {
        self.cascade_default
    }

    pub(crate) fn set_cascade_default(&mut self, cascade: CascadeMode) {
        self.cascade_default = cascade;
    }

    /// Flags exposed to rule selectors.
    #[must_use]
    pub fn selection(&self) -> SelectionContext {
        SelectionContext {
            is_child_context: self.is_child_context,
            is_child_collection_context: self.is_child_collection_context,
        }
    }

    /// Clones this context for one collection element. The chain is copied
    /// (the caller appends the element segment); shared data and selector
    /// are carried through.
    pub(crate) fn clone_for_collection_element(&self) -> Self {
        Self {
            instance: self.instance,
            chain: self.chain.clone(),
            selector: Arc::clone(&self.selector),
            shared: self.shared.clone(),
            is_child_context: self.is_child_context,
            is_child_collection_context: true,
            is_async: self.is_async,
            cascade_default: self.cascade_default,
        }
    }

    /// Builds the context a child validator runs under: the given instance
    /// and chain, shared data and async mode carried through, selector as
    /// decided by the adaptor (the parent's, or a rule-set restriction).
    ///
    /// The cascade default is a placeholder here; the child validator stamps
    /// its own before iterating rules.
    pub(crate) fn for_child_validator<'c, C>(
        &self,
        instance: &'c C,
        chain: PropertyChain,
        selector: Arc<dyn RuleSelector>,
    ) -> ValidationContext<'c, C> {
        ValidationContext {
            instance,
            chain,
            selector,
            shared: self.shared.clone(),
            is_child_context: true,
            is_child_collection_context: false,
            is_async: self.is_async,
            cascade_default: CascadeMode::default(),
        }
    }
}

impl<T> fmt::Debug for ValidationContext<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("chain", &self.chain)
            .field("is_child_context", &self.is_child_context)
            .field("is_child_collection_context", &self.is_child_collection_context)
            .field("is_async", &self.is_async)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PROPERTY CONTEXT
// ============================================================================

/// One property's value plus the addressing state a leaf validator needs to
/// construct failures.
///
/// `property_path` is already fully qualified (`Orders[2]`,
/// `Address.Line1`, ...); failures built through [`PropertyContext::failure`]
/// come back correctly addressed with the attempted value and standard
/// placeholders recorded.
pub struct PropertyContext<'a, T, P> {
    parent: &'a ValidationContext<'a, T>,
    value: &'a P,
    property_path: &'a str,
    display_name: &'a str,
    rule_property_name: &'a str,
    options: Option<&'a ComponentOptions<T, P>>,
}

impl<'a, T, P> PropertyContext<'a, T, P> {
    pub(crate) fn new(
        parent: &'a ValidationContext<'a, T>,
        value: &'a P,
        property_path: &'a str,
        display_name: &'a str,
        rule_property_name: &'a str,
        options: Option<&'a ComponentOptions<T, P>>,
    ) -> Self {
        Self {
            parent,
            value,
            property_path,
            display_name,
            rule_property_name,
            options,
        }
    }

    /// The enclosing validation context.
    #[must_use]
    pub fn parent(&self) -> &'a ValidationContext<'a, T> {
        self.parent
    }

    /// The instance the owning rule read this property from.
    #[must_use]
    pub fn instance(&self) -> &'a T {
        self.parent.instance()
    }

    /// The property value under validation.
    #[must_use]
    pub fn value(&self) -> &'a P {
        self.value
    }

    /// Fully qualified path of this property from the root instance.
    #[must_use]
    pub fn property_path(&self) -> &'a str {
        self.property_path
    }

    /// Display name used for the `{PropertyName}` placeholder.
    #[must_use]
    pub fn display_name(&self) -> &'a str {
        self.display_name
    }

    /// The owning rule's declared property name (no chain, no indexer).
    #[must_use]
    pub fn rule_property_name(&self) -> &'a str {
        self.rule_property_name
    }

    /// Shared cross-rule state for this pass.
    #[must_use]
    pub fn shared(&self) -> &SharedData {
        self.parent.shared()
    }

    /// Builds a failure for this property from the validator's default
    /// message template.
    ///
    /// Records the attempted value and the standard placeholders
    /// (`PropertyName`, `PropertyValue`, and `CollectionIndex` when inside a
    /// collection iteration), then applies any component-level overrides
    /// (message, error code, severity, custom state) configured at
    /// declaration time.
    #[must_use]
    pub fn failure(&self, error_code: &'static str, template: &str) -> ValidationFailure
    where
        P: fmt::Debug,
    {
        self.failure_with(error_code, template, std::iter::empty())
    }

    /// Like [`PropertyContext::failure`], with validator-specific
    /// placeholders added before the message is rendered.
    #[must_use]
    pub fn failure_with(
        &self,
        error_code: &'static str,
        template: &str,
        extra: impl IntoIterator<Item = (Cow<'static, str>, String)>,
    ) -> ValidationFailure
    where
        P: fmt::Debug,
    {
        let attempted = format!("{:?}", self.value);

        let mut placeholders: Placeholders = SmallVec::new();
        placeholders.push((
            Cow::Borrowed(placeholder::PROPERTY_NAME),
            self.display_name.to_owned(),
        ));
        placeholders.push((Cow::Borrowed(placeholder::PROPERTY_VALUE), attempted.clone()));
        if let Some(index) = self.shared().get(COLLECTION_INDEX_KEY) {
            placeholders.push((
                Cow::Borrowed(placeholder::COLLECTION_INDEX),
                render_placeholder(&index),
            ));
        }
        placeholders.extend(extra);

        let message = match self.options.and_then(|o| o.message.as_ref()) {
            Some(MessageSource::Literal(custom)) => format_message(custom, &placeholders),
            Some(MessageSource::Lazy(compute)) => compute(self.instance(), self.value),
            None => format_message(template, &placeholders),
        };
        let code = self
            .options
            .and_then(|o| o.error_code.clone())
            .unwrap_or(Cow::Borrowed(error_code));
        let severity = self.options.and_then(|o| o.severity).unwrap_or_default();

        let mut failure = ValidationFailure::new(self.property_path, message, code)
            .with_severity(severity)
            .with_attempted_value(attempted);
        if let Some(state) = self.options.and_then(|o| o.custom_state.clone()) {
            failure = failure.with_custom_state(state);
        }
        for (key, value) in placeholders {
            failure = failure.with_placeholder(key, value);
        }
        failure
    }
}

impl<T, P> fmt::Debug for PropertyContext<'_, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyContext")
            .field("property_path", &self.property_path)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

/// Renders a shared-data value for use as a message placeholder. Strings
/// render without surrounding quotes; everything else uses its JSON form.
fn render_placeholder(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
