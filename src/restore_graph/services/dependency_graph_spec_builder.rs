use crate::restore_graph::domain::{DependencyGraphSpec, PackageSpec, ProjectStyle};
use crate::shared::paths::PathComparison;
use crate::shared::Result;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::warn;

struct BuilderState {
    graph: DependencyGraphSpec,
    /// comparison key -> first casing observed
    casings: HashMap<String, String>,
}

/// DependencyGraphSpecBuilder service for aggregating PackageSpecs into one graph
///
/// Specs are added one at a time under a single lock. `build` then rewrites
/// every project reference to the first casing observed for its path, drops
/// references to projects that produced no spec, marks restore roots and
/// seals the graph.
pub struct DependencyGraphSpecBuilder {
    comparison: PathComparison,
    state: Mutex<BuilderState>,
}

impl Default for DependencyGraphSpecBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraphSpecBuilder {
    /// A builder comparing paths the way the host file system does
    pub fn new() -> Self {
        Self::with_comparison(PathComparison::for_current_os())
    }

    pub fn with_comparison(comparison: PathComparison) -> Self {
        Self {
            comparison,
            state: Mutex::new(BuilderState {
                graph: DependencyGraphSpec::with_comparison(comparison),
                casings: HashMap::new(),
            }),
        }
    }

    /// Builds a graph from already assembled specs
    ///
    /// # Arguments
    /// * `specs` - Package specs, in a deterministic order
    /// * `entry_points` - Full paths of the graph entry projects
    /// * `supports_restore` - Whether a spec can be restored
    /// * `comparison` - How paths and unique names are compared
    pub async fn build_from<F>(
        specs: Vec<PackageSpec>,
        entry_points: &[String],
        supports_restore: F,
        comparison: PathComparison,
    ) -> Result<DependencyGraphSpec>
    where
        F: Fn(&PackageSpec) -> bool,
    {
        let builder = Self::with_comparison(comparison);
        for spec in specs {
            builder.add_project(spec).await?;
        }
        builder.build(entry_points, supports_restore).await
    }

    /// Adds one spec and records the casing of its unique name and path
    pub async fn add_project(&self, spec: PackageSpec) -> Result<()> {
        let mut state = self.state.lock().await;
        for name in [
            spec.restore_metadata.project_unique_name.clone(),
            spec.restore_metadata.project_path.clone(),
        ] {
            if !name.is_empty() {
                state.casings.entry(self.comparison.key(&name)).or_insert(name);
            }
        }
        state.graph.add_project(spec)
    }

    /// Finishes the graph
    ///
    /// # Arguments
    /// * `entry_points` - Full paths of the graph entry projects
    /// * `supports_restore` - Whether a spec can be restored
    ///
    /// # Returns
    /// The sealed graph
    pub async fn build<F>(self, entry_points: &[String], supports_restore: F) -> Result<DependencyGraphSpec>
    where
        F: Fn(&PackageSpec) -> bool,
    {
        let BuilderState { mut graph, casings } = self.state.into_inner();

        Self::normalize_path_casings(&mut graph, &casings, self.comparison);
        graph.remove_missing_projects();
        Self::warn_on_mixed_central_package_management(&graph);

        for entry_point in entry_points {
            let is_root = graph
                .get_project_spec(entry_point)
                .is_some_and(|spec| supports_restore(spec));
            if is_root {
                graph.add_restore(entry_point)?;
            }
        }

        graph.mark_read_only();
        Ok(graph)
    }

    fn normalize_path_casings(
        graph: &mut DependencyGraphSpec,
        casings: &HashMap<String, String>,
        comparison: PathComparison,
    ) {
        for project in graph.projects_mut() {
            for framework in project.restore_metadata.target_frameworks.iter_mut() {
                for reference in framework.project_references.iter_mut() {
                    if let Some(path) = casings.get(&comparison.key(&reference.project_path)) {
                        reference.project_path = path.clone();
                    }
                    if let Some(name) = casings.get(&comparison.key(&reference.project_unique_name)) {
                        reference.project_unique_name = name.clone();
                    }
                }
            }
        }
    }

    /// PackageReference projects in one graph are expected to agree on central package management
    fn warn_on_mixed_central_package_management(graph: &DependencyGraphSpec) {
        let (enabled, disabled): (Vec<&PackageSpec>, Vec<&PackageSpec>) = graph
            .projects()
            .into_iter()
            .filter(|spec| spec.restore_metadata.project_style == ProjectStyle::PackageReference)
            .partition(|spec| spec.restore_metadata.central_package_versions_enabled());

        if !enabled.is_empty() && !disabled.is_empty() {
            let names: Vec<&str> = disabled.iter().map(|spec| spec.name.as_str()).collect();
            warn!(
                enabled = enabled.len(),
                disabled = disabled.len(),
                projects = %names.join(", "),
                "Central package management is enabled for some projects but not for others"
            );
        }
    }
}
