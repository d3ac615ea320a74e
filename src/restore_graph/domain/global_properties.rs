use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Global properties passed to every project evaluation.
///
/// Lookups ignore case; iteration keeps the first spelling of each name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct GlobalProperties {
    entries: BTreeMap<String, (String, String)>,
}

impl GlobalProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.get_mut(&name.to_ascii_lowercase()) {
            Some(entry) => entry.1 = value,
            None => {
                self.entries
                    .insert(name.to_ascii_lowercase(), (name, value));
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries
            .remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns a copy with `other` layered on top
    pub fn merged_with(&self, other: &GlobalProperties) -> GlobalProperties {
        let mut merged = self.clone();
        for (name, value) in other.iter() {
            merged.insert(name, value);
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<BTreeMap<String, String>> for GlobalProperties {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut properties = GlobalProperties::new();
        for (name, value) in map {
            properties.insert(name, value);
        }
        properties
    }
}

impl From<GlobalProperties> for BTreeMap<String, String> {
    fn from(properties: GlobalProperties) -> Self {
        properties
            .entries
            .into_values()
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GlobalProperties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut properties = GlobalProperties::new();
        for (name, value) in iter {
            properties.insert(name, value);
        }
        properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let props = GlobalProperties::new().with("Configuration", "Release");
        assert_eq!(props.get("configuration"), Some("Release"));
        assert!(props.contains("CONFIGURATION"));
    }

    #[test]
    fn test_insert_keeps_first_spelling() {
        let mut props = GlobalProperties::new().with("TargetFramework", "net6.0");
        props.insert("targetframework", "net472");
        let entries: Vec<_> = props.iter().collect();
        assert_eq!(entries, vec![("TargetFramework", "net472")]);
    }

    #[test]
    fn test_merged_with_overrides() {
        let base = GlobalProperties::new()
            .with("Configuration", "Debug")
            .with("Platform", "AnyCPU");
        let merged = base.merged_with(&GlobalProperties::new().with("configuration", "Release"));
        assert_eq!(merged.get("Configuration"), Some("Release"));
        assert_eq!(merged.get("Platform"), Some("AnyCPU"));
    }

    #[test]
    fn test_serde_as_plain_map() {
        let props = GlobalProperties::new().with("RestoreSources", "/feed");
        let json = serde_json::to_string(&props).unwrap();
        assert_eq!(json, r#"{"RestoreSources":"/feed"}"#);
        let back: GlobalProperties = serde_json::from_str(&json).unwrap();
        assert_eq!(back, props);
    }
}
