//! Property chains - the root-to-current path of a validated location
//!
//! A [`PropertyChain`] identifies where in the object graph the engine is
//! currently validating, e.g. `Customer.Orders[2].ProductName` relative to
//! the root instance. Chains are cloned before descending into child or
//! collection contexts, so a branch can never observe segments appended by
//! a sibling branch.

use std::fmt;

use smallvec::SmallVec;

// ============================================================================
// PROPERTY CHAIN
// ============================================================================

/// Ordered sequence of path segments identifying the currently-validated
/// location relative to the root instance.
///
/// Indexers do not form their own segment: `add_indexer` appends `[i]` to the
/// most recent segment, so a collection element is addressed as `Orders[2]`,
/// one segment, and a child rule underneath it produces
/// `Orders[2].ProductName`.
///
/// # Examples
///
/// ```rust,ignore
/// let mut chain = PropertyChain::new();
/// chain.add("Orders");
/// chain.add_indexer(2);
/// assert_eq!(chain.build_name("ProductName"), "Orders[2].ProductName");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyChain {
    segments: SmallVec<[String; 4]>,
}

impl PropertyChain {
    /// Creates an empty chain (the root of the object graph).
    #[must_use]
    pub fn new() -> Self {
        Self {
            segments: SmallVec::new(),
        }
    }

    /// Appends a named segment.
    ///
    /// Empty names are ignored so model-level rules (which have no property
    /// name of their own) never produce a dangling `.` in built paths.
    pub fn add(&mut self, name: &str) {
        if !name.is_empty() {
            self.segments.push(name.to_owned());
        }
    }

    /// Appends an indexer (`[i]`) to the most recent segment.
    ///
    /// On an empty chain the indexer becomes its own segment; this only
    /// happens for collection rules declared without a property name.
    pub fn add_indexer(&mut self, index: usize) {
        match self.segments.last_mut() {
            Some(last) => {
                last.push('[');
                last.push_str(&index.to_string());
                last.push(']');
            }
            None => self.segments.push(format!("[{index}]")),
        }
    }

    /// Builds the fully qualified name for a property at this location.
    ///
    /// An empty `property_name` yields the chain itself, which is how
    /// collection-element paths (`Orders[2]`) are rendered.
    #[must_use]
    pub fn build_name(&self, property_name: &str) -> String {
        if self.segments.is_empty() {
            return property_name.to_owned();
        }
        let joined = self.segments.join(".");
        if property_name.is_empty() {
            joined
        } else {
            format!("{joined}.{property_name}")
        }
    }

    /// Number of segments in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the chain has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for PropertyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chain_builds_bare_property_name() {
        let chain = PropertyChain::new();
        assert_eq!(chain.build_name("Surname"), "Surname");
    }

    #[test]
    fn nested_chain_joins_with_dots() {
        let mut chain = PropertyChain::new();
        chain.add("Address");
        assert_eq!(chain.build_name("Line1"), "Address.Line1");
    }

    #[test]
    fn indexer_attaches_to_last_segment() {
        let mut chain = PropertyChain::new();
        chain.add("Orders");
        chain.add_indexer(2);
        assert_eq!(chain.to_string(), "Orders[2]");
        assert_eq!(chain.build_name("ProductName"), "Orders[2].ProductName");
    }

    #[test]
    fn empty_property_name_is_ignored() {
        let mut chain = PropertyChain::new();
        chain.add("");
        assert!(chain.is_empty());
        assert_eq!(chain.build_name(""), "");
    }

    #[test]
    fn indexer_on_empty_chain_stands_alone() {
        let mut chain = PropertyChain::new();
        chain.add_indexer(0);
        assert_eq!(chain.to_string(), "[0]");
    }

    #[test]
    fn clone_is_independent() {
        let mut parent = PropertyChain::new();
        parent.add("Orders");
        let mut child = parent.clone();
        child.add_indexer(1);
        assert_eq!(parent.to_string(), "Orders");
        assert_eq!(child.to_string(), "Orders[1]");
    }
}
