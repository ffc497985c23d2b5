use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use vitrina_core::ValueObject;

/// The shopper's current choice of option values, keyed by axis name.
///
/// A selection is partial by nature: axes the shopper has not touched are
/// simply absent. Setting an axis that already holds a value overwrites it.
/// Keys are ordered so two equal selections always serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose `value` on `axis`, replacing any previous choice on that axis.
    pub fn set(&mut self, axis: impl Into<String>, value: impl Into<String>) {
        self.0.insert(axis.into(), value.into());
    }

    /// Builder-style variant of [`set`](Self::set) for literals in tests and
    /// fixtures.
    pub fn with(mut self, axis: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(axis, value);
        self
    }

    pub fn get(&self, axis: &str) -> Option<&str> {
        self.0.get(axis).map(String::as_str)
    }

    pub fn remove(&mut self, axis: &str) -> Option<String> {
        self.0.remove(axis)
    }

    pub fn contains_axis(&self, axis: &str) -> bool {
        self.0.contains_key(axis)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ValueObject for Selection {}

impl FromIterator<(String, String)> for Selection {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
