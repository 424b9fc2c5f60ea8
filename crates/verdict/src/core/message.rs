//! Message templates
//!
//! Renders `{Placeholder}`-style templates against the placeholder values a
//! failure captured at construction time. The engine's contract with the
//! formatter is small: it supplies `PropertyName`, `PropertyValue` and any
//! validator-specific keys before asking for a rendering; localization and
//! resource lookup are not this crate's concern.

use std::borrow::Cow;

/// Well-known placeholder keys supplied by the engine.
pub mod placeholder {
    /// Display name of the property under validation.
    pub const PROPERTY_NAME: &str = "PropertyName";
    /// Rendering of the value under validation.
    pub const PROPERTY_VALUE: &str = "PropertyValue";
    /// Index of the enclosing collection element, when inside a
    /// `rule_for_each` iteration.
    pub const COLLECTION_INDEX: &str = "CollectionIndex";
    /// The other side of a comparison validator.
    pub const COMPARISON_VALUE: &str = "ComparisonValue";
    /// Lower bound of a between validator.
    pub const FROM: &str = "From";
    /// Upper bound of a between validator.
    pub const TO: &str = "To";
    /// Configured minimum length.
    pub const MIN_LENGTH: &str = "MinLength";
    /// Configured maximum length.
    pub const MAX_LENGTH: &str = "MaxLength";
    /// Measured length of the value.
    pub const TOTAL_LENGTH: &str = "TotalLength";
}

/// Key used in the shared context data to carry the current collection index
/// across child-validator boundaries.
pub(crate) const COLLECTION_INDEX_KEY: &str = "__collection_index";

/// Substitutes `{Key}` occurrences in `template` with matching placeholder
/// values. Unknown placeholders are left verbatim, so a template can carry
/// braces that are not meant for the formatter.
#[must_use]
pub fn format_message(template: &str, placeholders: &[(Cow<'static, str>, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match placeholders.iter().find(|(k, _)| k.as_ref() == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
