use std::collections::BTreeMap;

/// One MSBuild item occurrence: an identity plus named metadata.
///
/// Metadata names are case-insensitive, as in MSBuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    identity: String,
    metadata: BTreeMap<String, (String, String)>,
}

impl ItemView {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata setter
    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_metadata(name, value);
        self
    }

    pub fn set_metadata(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.metadata
            .insert(name.to_ascii_lowercase(), (name, value.into()));
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn get_metadata(&self, name: &str) -> Option<&str> {
        self.metadata
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// Metadata as (original name, value) pairs
    pub fn metadata(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Identities compare case-insensitively for deduplication
    pub fn same_identity(&self, other: &ItemView) -> bool {
        self.identity.eq_ignore_ascii_case(&other.identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_lookup_is_case_insensitive() {
        let item = ItemView::new("Newtonsoft.Json").with_metadata("Version", "13.0.1");
        assert_eq!(item.get_metadata("version"), Some("13.0.1"));
        assert_eq!(item.get_metadata("VERSION"), Some("13.0.1"));
        assert_eq!(item.get_metadata("PrivateAssets"), None);
    }

    #[test]
    fn test_later_metadata_overwrites() {
        let item = ItemView::new("Foo")
            .with_metadata("Version", "1.0.0")
            .with_metadata("version", "2.0.0");
        assert_eq!(item.get_metadata("Version"), Some("2.0.0"));
        assert_eq!(item.metadata().count(), 1);
    }

    #[test]
    fn test_same_identity() {
        assert!(ItemView::new("Foo").same_identity(&ItemView::new("foo")));
        assert!(!ItemView::new("Foo").same_identity(&ItemView::new("Bar")));
    }
}
