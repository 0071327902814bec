use crate::constants::markers;
use std::collections::BTreeMap;

/// Active documents keyed by name.
///
/// Iteration is in ascending name order; prompt assembly relies on that
/// order being stable between turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    docs: BTreeMap<String, String>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the previous excerpt for `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.docs.insert(name.into(), text.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.docs.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.docs.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.docs.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.docs.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.docs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn clear(&mut self) {
        self.docs.clear();
    }

    /// First `max_chars` characters followed by an ellipsis.
    pub fn preview(&self, name: &str, max_chars: usize) -> Option<String> {
        self.get(name).map(|text| {
            let head: String = text.chars().take(max_chars).collect();
            format!("{head}{}", markers::PREVIEW_ELLIPSIS)
        })
    }
}
