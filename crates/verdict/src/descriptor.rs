//! Validator introspection
//!
//! A [`ValidatorDescriptor`] exposes, per declared property name (`None`
//! for model-level rules), the ordered validators and dependent-rule
//! structure attached - enough for test tooling to assert "property X has
//! validator Y" without running validation.

use serde::{Deserialize, Serialize};

// ============================================================================
// RULE DESCRIPTOR
// ============================================================================

/// Introspection entry for one declared rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDescriptor {
    /// Declared property name; `None` for model-level rules.
    pub property_name: Option<String>,
    /// Display-name override, if configured.
    pub display_name: Option<String>,
    /// Validator names in declaration (= execution) order.
    pub validators: Vec<String>,
    /// Rule sets this rule belongs to; empty means the default set.
    pub rule_sets: Vec<String>,
    /// True for collection ("for each") rules.
    pub is_collection: bool,
    /// Rules that execute only when this rule produced no failures.
    pub dependent: Vec<RuleDescriptor>,
}

// ============================================================================
// VALIDATOR DESCRIPTOR
// ============================================================================

/// Introspection over a validator's declared rules, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorDescriptor {
    rules: Vec<RuleDescriptor>,
}

impl ValidatorDescriptor {
    pub(crate) fn new(rules: Vec<RuleDescriptor>) -> Self {
        Self { rules }
    }

    /// All declared rules.
    #[must_use]
    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    /// Rules declared for the given property name (`None` selects
    /// model-level rules).
    pub fn rules_for<'d, 'p>(
        &'d self,
        property_name: Option<&'p str>,
    ) -> impl Iterator<Item = &'d RuleDescriptor> + use<'d, 'p> {
        self.rules
            .iter()
            .filter(move |rule| rule.property_name.as_deref() == property_name)
    }

    /// Ordered validator names attached to the given property across all of
    /// its rules.
    #[must_use]
    pub fn validators_for(&self, property_name: Option<&str>) -> Vec<&str> {
        self.rules_for(property_name)
            .flat_map(|rule| rule.validators.iter().map(String::as_str))
            .collect()
    }

    /// True if the given property has a validator with the given name.
    #[must_use]
    pub fn has_validator(&self, property_name: Option<&str>, validator: &str) -> bool {
        self.validators_for(property_name).contains(&validator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ValidatorDescriptor {
        ValidatorDescriptor::new(vec![
            RuleDescriptor {
                property_name: Some("Surname".into()),
                display_name: None,
                validators: vec!["not_null".into(), "min_length".into()],
                rule_sets: vec![],
                is_collection: false,
                dependent: vec![],
            },
            RuleDescriptor {
                property_name: Some("Orders".into()),
                display_name: None,
                validators: vec!["child_validator".into()],
                rule_sets: vec!["audit".into()],
                is_collection: true,
                dependent: vec![],
            },
        ])
    }

    #[test]
    fn validators_for_preserves_order() {
        let descriptor = descriptor();
        assert_eq!(
            descriptor.validators_for(Some("Surname")),
            vec!["not_null", "min_length"]
        );
    }

    #[test]
    fn has_validator() {
        let descriptor = descriptor();
        assert!(descriptor.has_validator(Some("Orders"), "child_validator"));
        assert!(!descriptor.has_validator(Some("Surname"), "child_validator"));
        assert!(!descriptor.has_validator(None, "not_null"));
    }
}
