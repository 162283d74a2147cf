//! Node identifiers and the opaque context handed to entered nodes.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names a node kind within its parent's scope.
///
/// Lookups in the routing tree are global, so an identifier may appear at most
/// once in the active hierarchy at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingIdentifier(String);

impl RoutingIdentifier {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoutingIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RoutingIdentifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoutingIdentifier {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for RoutingIdentifier {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Key/value parameters passed from the caller to the entered node.
///
/// The tree and the router never interpret the values. Equality is map
/// equality, independent of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingContext(BTreeMap<String, Value>);

impl RoutingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Convenience accessor for string values.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for RoutingContext {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RoutingContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_identifier_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(RoutingIdentifier::from("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(RoutingIdentifier::new("a").to_string(), "a");
    }

    #[test]
    fn test_context_equality_ignores_insertion_order() {
        let lhs = RoutingContext::new().with("user", "ada").with("tab", 2);
        let rhs = RoutingContext::new().with("tab", 2).with("user", "ada");
        assert_eq!(lhs, rhs);

        let other = RoutingContext::new().with("tab", 3).with("user", "ada");
        assert_ne!(lhs, other);
    }

    #[test]
    fn test_context_accessors() {
        let ctx: RoutingContext = [("user", "ada")].into_iter().collect();
        assert_eq!(ctx.get_str("user"), Some("ada"));
        assert_eq!(ctx.get_str("missing"), None);
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_context_deserializes_from_toml_table() {
        let ctx: RoutingContext = toml::from_str("user = \"ada\"\ntab = 2").unwrap();
        assert_eq!(ctx, RoutingContext::new().with("user", "ada").with("tab", 2));
    }
}
