//! The graph-level restore input: every project's PackageSpec plus the set
//! of restore roots.

use super::package_spec::PackageSpec;
use crate::shared::error::RestoreGraphError;
use crate::shared::paths::PathComparison;
use crate::shared::security;
use crate::shared::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Version written to the `format` field of a saved graph.
pub const DGSPEC_FORMAT_VERSION: u32 = 1;

/// File name of a saved graph for the given project name.
pub fn dgspec_file_name(project_name: &str) -> String {
    format!("{}.nuget.dgspec.json", project_name)
}

#[derive(Debug, Clone)]
pub struct DependencyGraphSpec {
    comparison: PathComparison,
    /// Keyed by `comparison.key(unique name)`, so iteration follows the OS comparer
    projects: BTreeMap<String, PackageSpec>,
    restore: BTreeMap<String, String>,
    read_only: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RestoreEntry {}

#[derive(Debug, Serialize, Deserialize)]
struct DependencyGraphSpecDocument {
    format: u32,
    restore: BTreeMap<String, RestoreEntry>,
    projects: BTreeMap<String, PackageSpec>,
}

impl Default for DependencyGraphSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraphSpec {
    /// An empty graph comparing unique names the way the host file system does
    pub fn new() -> Self {
        Self::with_comparison(PathComparison::for_current_os())
    }

    pub fn with_comparison(comparison: PathComparison) -> Self {
        Self {
            comparison,
            projects: BTreeMap::new(),
            restore: BTreeMap::new(),
            read_only: false,
        }
    }

    pub fn comparison(&self) -> PathComparison {
        self.comparison
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Seals the graph; later `add_*` calls fail
    pub fn mark_read_only(&mut self) {
        self.read_only = true;
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.read_only {
            return Err(RestoreGraphError::ReadOnlyGraph {
                operation: operation.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Adds a project keyed by its unique name; the first spec for a name wins.
    ///
    /// A spec without a unique name is given a generated one, which is
    /// written into the spec so it is saved under the same name.
    ///
    /// # Errors
    /// Returns [`RestoreGraphError::ReadOnlyGraph`] once the graph is sealed.
    pub fn add_project(&mut self, mut spec: PackageSpec) -> Result<()> {
        self.ensure_writable("add a project")?;
        if spec.unique_name().is_empty() {
            spec.restore_metadata.project_unique_name = uuid::Uuid::new_v4().to_string();
        }
        self.projects
            .entry(self.comparison.key(spec.unique_name()))
            .or_insert(spec);
        Ok(())
    }

    /// Marks a project as a restore root.
    ///
    /// # Errors
    /// Returns [`RestoreGraphError::ReadOnlyGraph`] once the graph is sealed.
    pub fn add_restore(&mut self, unique_name: &str) -> Result<()> {
        self.ensure_writable("add a restore root")?;
        self.restore
            .entry(self.comparison.key(unique_name))
            .or_insert_with(|| unique_name.to_string());
        Ok(())
    }

    /// Projects in OS comparer order
    pub fn projects(&self) -> Vec<&PackageSpec> {
        self.projects.values().collect()
    }

    pub(crate) fn projects_mut(&mut self) -> impl Iterator<Item = &mut PackageSpec> {
        self.projects.values_mut()
    }

    /// Restore roots in OS comparer order
    pub fn restore(&self) -> Vec<&str> {
        self.restore.values().map(String::as_str).collect()
    }

    pub fn get_project_spec(&self, unique_name: &str) -> Option<&PackageSpec> {
        self.projects.get(&self.comparison.key(unique_name))
    }

    /// The root and every project it transitively references that exists in the graph.
    ///
    /// The result is not sorted.
    pub fn get_closure(&self, root_unique_name: &str) -> Vec<&PackageSpec> {
        let mut closure = Vec::new();
        let mut added: HashSet<String> = HashSet::new();
        let mut to_walk: Vec<&PackageSpec> = Vec::new();

        if let Some(root) = self.get_project_spec(root_unique_name) {
            to_walk.push(root);
        }

        while let Some(spec) = to_walk.pop() {
            closure.push(spec);
            for reference in spec.restore_metadata.project_references() {
                let Some(child) = self.get_project_spec(&reference.project_unique_name) else {
                    continue;
                };
                if added.insert(self.comparison.key(&reference.project_unique_name)) {
                    to_walk.push(child);
                }
            }
        }

        closure
    }

    /// Unique names of every project whose closure contains the given project
    pub fn get_parents(&self, unique_name: &str) -> Vec<String> {
        let key = self.comparison.key(unique_name);
        self.projects
            .iter()
            .filter(|(project_key, _)| **project_key != key)
            .filter(|(_, project)| {
                self.get_closure(project.unique_name())
                    .iter()
                    .any(|member| self.comparison.key(member.unique_name()) == key)
            })
            .map(|(_, project)| project)
            .map(|project| project.unique_name().to_string())
            .collect()
    }

    /// A new, writable graph holding one root and its closure.
    pub fn with_project_closure(&self, unique_name: &str) -> Result<DependencyGraphSpec> {
        let mut graph = DependencyGraphSpec::with_comparison(self.comparison);
        graph.add_restore(unique_name)?;
        for spec in self.get_closure(unique_name) {
            graph.add_project(spec.clone())?;
        }
        Ok(graph)
    }

    /// Orders specs so that every project comes after the projects it references.
    pub fn sort_packages_by_dependency_order<'a>(&self, specs: &[&'a PackageSpec]) -> Vec<&'a PackageSpec> {
        let by_key: BTreeMap<String, &'a PackageSpec> = specs
            .iter()
            .map(|spec| (self.comparison.key(spec.unique_name()), *spec))
            .collect();

        let mut visited: HashSet<String> = HashSet::new();
        let mut sorted = Vec::with_capacity(by_key.len());

        for key in by_key.keys() {
            // (key, children expanded)
            let mut stack: Vec<(String, bool)> = vec![(key.clone(), false)];
            while let Some((current, expanded)) = stack.pop() {
                if expanded {
                    if let Some(spec) = by_key.get(&current) {
                        sorted.push(*spec);
                    }
                    continue;
                }
                if !visited.insert(current.clone()) {
                    continue;
                }
                stack.push((current.clone(), true));
                if let Some(spec) = by_key.get(&current) {
                    let mut children: Vec<String> = spec
                        .restore_metadata
                        .project_references()
                        .map(|reference| self.comparison.key(&reference.project_unique_name))
                        .filter(|child| by_key.contains_key(child) && !visited.contains(child))
                        .collect();
                    children.sort();
                    children.dedup();
                    for child in children.into_iter().rev() {
                        stack.push((child, false));
                    }
                }
            }
        }

        sorted
    }

    /// Drops project references whose target has no spec in the graph.
    pub fn remove_missing_projects(&mut self) {
        let comparison = self.comparison;
        let existing: HashSet<String> = self
            .projects
            .values()
            .map(|project| comparison.key(&project.restore_metadata.project_path))
            .collect();

        for project in self.projects.values_mut() {
            for framework in project.restore_metadata.target_frameworks.iter_mut() {
                framework
                    .project_references
                    .retain(|reference| existing.contains(&comparison.key(&reference.project_path)));
            }
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        let document = DependencyGraphSpecDocument {
            format: DGSPEC_FORMAT_VERSION,
            restore: self
                .restore
                .values()
                .map(|name| (name.clone(), RestoreEntry::default()))
                .collect(),
            projects: self
                .projects
                .values()
                .map(|spec| (spec.unique_name().to_string(), spec.clone()))
                .collect(),
        };
        serde_json::to_string_pretty(&document).context("Failed to serialize dependency graph spec")
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: DependencyGraphSpecDocument =
            serde_json::from_str(content).context("Failed to parse dependency graph spec")?;
        if document.format != DGSPEC_FORMAT_VERSION {
            anyhow::bail!(
                "Unsupported dependency graph spec format {} (expected {})",
                document.format,
                DGSPEC_FORMAT_VERSION
            );
        }

        let mut graph = DependencyGraphSpec::new();
        for spec in document.projects.into_values() {
            graph.add_project(spec)?;
        }
        for name in document.restore.keys() {
            graph.add_restore(name)?;
        }
        Ok(graph)
    }

    /// Writes the graph as JSON through a temporary file, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_string()?;
        security::write_atomically(path, &json)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RestoreGraphError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        Self::from_json_str(&content).with_context(|| format!("Invalid dependency graph spec: {}", path.display()))
    }
}

/// Two graphs are equal when they hold the same projects and restore roots.
impl PartialEq for DependencyGraphSpec {
    fn eq(&self, other: &Self) -> bool {
        self.projects == other.projects && self.restore == other.restore
    }
}
