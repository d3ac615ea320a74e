use crate::restore_graph::domain::ProjectView;
use crate::shared::msbuild_string;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Target framework aliases mapped to the view that describes them, in declaration order.
///
/// The empty alias stands for a project that declares no framework at all.
#[derive(Debug, Clone, Default)]
pub struct FrameworkViews {
    entries: Vec<(String, Arc<dyn ProjectView>)>,
}

impl FrameworkViews {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, alias: &str) -> Option<&Arc<dyn ProjectView>> {
        self.entries
            .iter()
            .find(|(key, _)| key == alias)
            .map(|(_, view)| view)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn ProjectView>)> {
        self.entries.iter().map(|(alias, view)| (alias.as_str(), view))
    }

    pub fn views(&self) -> impl Iterator<Item = &Arc<dyn ProjectView>> {
        self.entries.iter().map(|(_, view)| view)
    }

    /// Later entries for an alias replace the view but keep the first position
    fn insert(&mut self, alias: String, view: Arc<dyn ProjectView>) {
        match self.entries.iter_mut().find(|(key, _)| *key == alias) {
            Some(entry) => entry.1 = view,
            None => self.entries.push((alias, view)),
        }
    }
}

/// TargetFrameworkResolver service for mapping declared frameworks to views
///
/// Framework aliases stay opaque strings here; parsing them into frameworks
/// happens during assembly.
pub struct TargetFrameworkResolver;

impl TargetFrameworkResolver {
    /// Declared framework aliases: `TargetFrameworks`, else `TargetFramework`
    pub fn target_framework_strings(view: &dyn ProjectView) -> Vec<String> {
        let declared = view
            .get_property("TargetFrameworks")
            .filter(|value| !value.is_empty())
            .or_else(|| view.get_property("TargetFramework"));
        msbuild_string::split(declared)
    }

    /// Maps each declared framework to its inner view
    ///
    /// # Arguments
    /// * `outer` - The outer project view
    /// * `inner_nodes` - Inner views captured while loading, keyed by framework alias
    ///
    /// # Returns
    /// One entry per declared framework. Frameworks without a captured inner
    /// view use the outer view. A project that declares nothing gets one
    /// entry with an empty alias pointing at the outer view.
    pub fn resolve(
        outer: &Arc<dyn ProjectView>,
        inner_nodes: &BTreeMap<String, Arc<dyn ProjectView>>,
    ) -> FrameworkViews {
        let mut resolved = FrameworkViews::default();
        let declared = Self::target_framework_strings(outer.as_ref());

        if declared.is_empty() {
            resolved.insert(String::new(), Arc::clone(outer));
            return resolved;
        }

        for alias in declared {
            let view = inner_nodes
                .get(&alias)
                .cloned()
                .unwrap_or_else(|| Arc::clone(outer));
            resolved.insert(alias, view);
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore_graph::domain::ProjectSnapshot;

    fn view(snapshot: ProjectSnapshot) -> Arc<dyn ProjectView> {
        Arc::new(snapshot)
    }

    #[test]
    fn test_missing_inner_node_falls_back_to_outer() {
        let outer = view(
            ProjectSnapshot::new("/repo/Lib/Lib.csproj").with_property("TargetFrameworks", "net472;netstandard2.0"),
        );
        let inner = view(
            ProjectSnapshot::new("/repo/Lib/Lib.csproj")
                .with_property("TargetFramework", "net472")
                .with_global_property("TargetFramework", "net472"),
        );
        let inner_nodes = BTreeMap::from([("net472".to_string(), Arc::clone(&inner))]);

        let resolved = TargetFrameworkResolver::resolve(&outer, &inner_nodes);

        assert_eq!(resolved.len(), 2);
        assert!(Arc::ptr_eq(resolved.get("net472").unwrap(), &inner));
        assert!(Arc::ptr_eq(resolved.get("netstandard2.0").unwrap(), &outer));
        let aliases: Vec<&str> = resolved.iter().map(|(alias, _)| alias).collect();
        assert_eq!(aliases, vec!["net472", "netstandard2.0"]);
    }

    #[test]
    fn test_singular_property_fallback() {
        let outer = view(
            ProjectSnapshot::new("/repo/App/App.csproj")
                .with_property("TargetFrameworks", "")
                .with_property("TargetFramework", "net6.0"),
        );
        let resolved = TargetFrameworkResolver::resolve(&outer, &BTreeMap::new());
        assert_eq!(resolved.len(), 1);
        assert!(resolved.get("net6.0").is_some());
    }

    #[test]
    fn test_no_framework_maps_empty_alias_to_outer() {
        let outer = view(ProjectSnapshot::new("/repo/Legacy/Legacy.csproj"));
        let resolved = TargetFrameworkResolver::resolve(&outer, &BTreeMap::new());
        assert_eq!(resolved.len(), 1);
        assert!(Arc::ptr_eq(resolved.get("").unwrap(), &outer));
    }

    #[test]
    fn test_duplicate_aliases_collapse() {
        let outer = view(ProjectSnapshot::new("/repo/Lib/Lib.csproj").with_property("TargetFrameworks", "net6.0;net6.0"));
        let resolved = TargetFrameworkResolver::resolve(&outer, &BTreeMap::new());
        assert_eq!(resolved.len(), 1);
    }
}
