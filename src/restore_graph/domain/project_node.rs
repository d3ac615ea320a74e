use super::project_view::ProjectView;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// A project's outer view plus its per-target-framework inner views.
///
/// Inner views are keyed by the `TargetFramework` global property they were
/// evaluated with. A project that does not multi-target has no inner views.
#[derive(Debug, Clone)]
pub struct ProjectNode {
    outer: Arc<dyn ProjectView>,
    inner: BTreeMap<String, Arc<dyn ProjectView>>,
}

impl ProjectNode {
    pub fn new(outer: Arc<dyn ProjectView>) -> Self {
        Self {
            outer,
            inner: BTreeMap::new(),
        }
    }

    /// Builder-style inner view registration
    pub fn with_inner(mut self, target_framework: impl Into<String>, view: Arc<dyn ProjectView>) -> Self {
        self.add_inner(target_framework, view);
        self
    }

    /// Registers an inner view; the first view for a framework wins
    pub fn add_inner(&mut self, target_framework: impl Into<String>, view: Arc<dyn ProjectView>) {
        self.inner.entry(target_framework.into()).or_insert(view);
    }

    pub fn replace_outer(&mut self, outer: Arc<dyn ProjectView>) {
        self.outer = outer;
    }

    pub fn outer(&self) -> &Arc<dyn ProjectView> {
        &self.outer
    }

    pub fn inner_nodes(&self) -> &BTreeMap<String, Arc<dyn ProjectView>> {
        &self.inner
    }

    pub fn full_path(&self) -> &Path {
        self.outer.full_path()
    }
}
