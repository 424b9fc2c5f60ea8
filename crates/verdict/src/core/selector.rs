//! Rule selectors - deciding which declared rules execute for a pass
//!
//! A selector is an opaque predicate over rule identity (property name and
//! rule-set memberships). The engine consults it once per rule before
//! evaluation; a rejected rule contributes nothing to the pass.
//!
//! Selectors are shared into child-validator contexts, so each
//! implementation must decide how it behaves once validation has descended
//! below the property it was filtering on - see the `is_child_context`
//! handling in [`MemberNameSelector`] and [`RuleSetSelector`].

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// The rule-set name implicitly holding every rule declared outside an
/// explicit `rule_set` scope.
pub const DEFAULT_RULE_SET: &str = "default";

/// Wildcard accepted by [`RuleSetSelector`] to run every declared rule set.
pub const WILDCARD_RULE_SET: &str = "*";

// ============================================================================
// SELECTION INPUTS
// ============================================================================

/// Identity of a rule as seen by a selector.
#[derive(Debug, Clone, Copy)]
pub struct RuleId<'r> {
    /// Declared property name; `None` for model-level rules.
    pub property_name: Option<&'r str>,
    /// Rule sets the rule was declared in; empty means the default set.
    pub rule_sets: &'r [Cow<'static, str>],
}

/// Context flags a selector may consult.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionContext {
    /// True when selecting rules of a child validator.
    pub is_child_context: bool,
    /// True when selecting rules while iterating a collection property.
    pub is_child_collection_context: bool,
}

// ============================================================================
// SELECTOR TRAIT
// ============================================================================

/// Predicate over rule identity deciding participation in a pass.
pub trait RuleSelector: Send + Sync + fmt::Debug {
    /// Returns true if the rule should execute.
    ///
    /// `property_path` is the fully qualified path the rule would validate,
    /// i.e. the current chain plus the rule's own property name.
    fn can_execute(&self, rule: RuleId<'_>, property_path: &str, ctx: SelectionContext) -> bool;
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

/// Default selection: rules declared outside any rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRuleSelector;

impl RuleSelector for DefaultRuleSelector {
    fn can_execute(&self, rule: RuleId<'_>, _property_path: &str, _ctx: SelectionContext) -> bool {
        rule.rule_sets.is_empty()
    }
}

/// Executes rules belonging to the requested rule sets.
///
/// The name `default` selects rules outside any set; `*` selects
/// everything. In child contexts, rules outside any set always run - a
/// parent pass restricted to rule set `X` still validates the child
/// validator's default rules once delegation has decided to descend.
#[derive(Debug, Clone)]
pub struct RuleSetSelector {
    sets: Vec<String>,
}

impl RuleSetSelector {
    /// Creates a selector for the given rule-set names.
    #[must_use]
    pub fn new(sets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            sets: sets.into_iter().map(Into::into).collect(),
        }
    }

    /// The requested rule-set names.
    #[must_use]
    pub fn rule_sets(&self) -> &[String] {
        &self.sets
    }
}

impl RuleSelector for RuleSetSelector {
    fn can_execute(&self, rule: RuleId<'_>, _property_path: &str, ctx: SelectionContext) -> bool {
        if self.sets.iter().any(|s| s == WILDCARD_RULE_SET) {
            return true;
        }
        if rule.rule_sets.is_empty() {
            return ctx.is_child_context
                || self.sets.is_empty()
                || self.sets.iter().any(|s| s == DEFAULT_RULE_SET);
        }
        rule.rule_sets
            .iter()
            .any(|declared| self.sets.iter().any(|requested| requested == declared))
    }
}

/// Executes rules for an explicit set of property names.
///
/// Matches the rule's own path and anything nested underneath it
/// (`Orders` matches `Orders`, `Orders[2]` and `Orders[2].ProductName`).
/// Child contexts always pass: the parent boundary already filtered.
#[derive(Debug, Clone)]
pub struct MemberNameSelector {
    names: Vec<String>,
}

impl MemberNameSelector {
    /// Creates a selector for the given property names.
    #[must_use]
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl RuleSelector for MemberNameSelector {
    fn can_execute(&self, _rule: RuleId<'_>, property_path: &str, ctx: SelectionContext) -> bool {
        if ctx.is_child_context {
            return true;
        }
        self.names.iter().any(|name| {
            property_path == name
                || property_path
                    .strip_prefix(name.as_str())
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
        })
    }
}

/// Conjunction of selectors: a rule executes only if every inner selector
/// accepts it.
#[derive(Debug, Clone)]
pub struct CompositeSelector {
    inner: Vec<Arc<dyn RuleSelector>>,
}

impl CompositeSelector {
    /// Combines the given selectors.
    #[must_use]
    pub fn new(inner: Vec<Arc<dyn RuleSelector>>) -> Self {
        Self { inner }
    }
}

impl RuleSelector for CompositeSelector {
    fn can_execute(&self, rule: RuleId<'_>, property_path: &str, ctx: SelectionContext) -> bool {
        self.inner
            .iter()
            .all(|selector| selector.can_execute(rule, property_path, ctx))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rule<'r>(sets: &'r [Cow<'static, str>]) -> RuleId<'r> {
        RuleId {
            property_name: Some("Surname"),
            rule_sets: sets,
        }
    }

    #[test]
    fn default_selector_skips_rule_set_members() {
        let selector = DefaultRuleSelector;
        let ctx = SelectionContext::default();
        assert!(selector.can_execute(rule(&[]), "Surname", ctx));
        let sets = [Cow::Borrowed("audit")];
        assert!(!selector.can_execute(rule(&sets), "Surname", ctx));
    }

    #[test]
    fn rule_set_selector_matches_declared_set() {
        let selector = RuleSetSelector::new(["audit"]);
        let ctx = SelectionContext::default();
        let sets = [Cow::Borrowed("audit")];
        assert!(selector.can_execute(rule(&sets), "Surname", ctx));
        assert!(!selector.can_execute(rule(&[]), "Surname", ctx));
    }

    #[test]
    fn rule_set_selector_default_keyword() {
        let selector = RuleSetSelector::new(["default", "audit"]);
        let ctx = SelectionContext::default();
        let sets = [Cow::Borrowed("audit")];
        assert!(selector.can_execute(rule(&[]), "Surname", ctx));
        assert!(selector.can_execute(rule(&sets), "Surname", ctx));
    }

    #[test]
    fn rule_set_selector_wildcard_matches_everything() {
        let selector = RuleSetSelector::new(["*"]);
        let ctx = SelectionContext::default();
        let sets = [Cow::Borrowed("audit")];
        assert!(selector.can_execute(rule(&sets), "Surname", ctx));
        assert!(selector.can_execute(rule(&[]), "Surname", ctx));
    }

    #[test]
    fn rule_set_selector_lets_child_default_rules_run() {
        let selector = RuleSetSelector::new(["audit"]);
        let ctx = SelectionContext {
            is_child_context: true,
            ..SelectionContext::default()
        };
        assert!(selector.can_execute(rule(&[]), "Child.Name", ctx));
    }

    #[test]
    fn member_name_selector_matches_nested_paths() {
        let selector = MemberNameSelector::new(["Orders"]);
        let ctx = SelectionContext::default();
        assert!(selector.can_execute(rule(&[]), "Orders", ctx));
        assert!(selector.can_execute(rule(&[]), "Orders[2].ProductName", ctx));
        assert!(!selector.can_execute(rule(&[]), "Surname", ctx));
        assert!(!selector.can_execute(rule(&[]), "OrdersArchive", ctx));
    }

    #[test]
    fn composite_requires_all() {
        let composite = CompositeSelector::new(vec![
            Arc::new(MemberNameSelector::new(["Surname"])),
            Arc::new(DefaultRuleSelector),
        ]);
        let ctx = SelectionContext::default();
        let sets = [Cow::Borrowed("audit")];
        assert!(composite.can_execute(rule(&[]), "Surname", ctx));
        assert!(!composite.can_execute(rule(&sets), "Surname", ctx));
    }
}
