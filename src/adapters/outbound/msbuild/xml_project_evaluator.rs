use super::project_file::{self, StaticProject};
use crate::ports::outbound::{EvaluatedProject, ProjectEvaluator, ProjectReferenceRequest};
use crate::restore_graph::domain::{GlobalProperties, ProjectView};
use crate::shared::error::EvaluationFailure;
use crate::shared::msbuild_string;
use crate::shared::paths;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TARGET_FRAMEWORK: &str = "TargetFramework";

/// Project file extensions the NuGet targets are imported into
const RESTORE_CAPABLE_EXTENSIONS: [&str; 3] = ["csproj", "vbproj", "fsproj"];

/// XmlProjectEvaluator adapter for evaluating project files without a build engine
///
/// Properties, items, imports, `Choose` blocks and conditions are evaluated
/// statically. Targets are not run: `build` hands back the evaluated view, so
/// only values declared in the project files themselves reach the resolvers.
pub struct XmlProjectEvaluator {
    startup_directory: PathBuf,
}

impl Default for XmlProjectEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlProjectEvaluator {
    pub fn new() -> Self {
        let startup_directory = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { startup_directory }
    }

    pub fn with_startup_directory(startup_directory: impl Into<PathBuf>) -> Self {
        Self {
            startup_directory: startup_directory.into(),
        }
    }

    fn supports_restore(project_path: &Path, project: &StaticProject) -> bool {
        project.is_sdk_style
            || RESTORE_CAPABLE_EXTENSIONS
                .iter()
                .any(|extension| paths::has_extension(project_path, extension))
    }

    /// Outward edges of one evaluated instance
    ///
    /// An outer multi-targeting instance points at its per-framework inner
    /// instances. Every other instance points at its project references,
    /// which are evaluated without the referencing project's TargetFramework.
    fn references(project: &StaticProject) -> Vec<ProjectReferenceRequest> {
        let snapshot = &project.snapshot;
        let global_properties = snapshot.global_properties();

        if global_properties.get(TARGET_FRAMEWORK).is_none() {
            if let Some(frameworks) = snapshot.split_property("TargetFrameworks") {
                let mut seen: Vec<String> = Vec::new();
                return frameworks
                    .into_iter()
                    .filter(|framework| {
                        let key = framework.to_lowercase();
                        if seen.contains(&key) {
                            false
                        } else {
                            seen.push(key);
                            true
                        }
                    })
                    .map(|framework| {
                        ProjectReferenceRequest::new(
                            snapshot.full_path(),
                            global_properties.clone().with(TARGET_FRAMEWORK, framework),
                        )
                    })
                    .collect();
            }
        }

        let mut inherited = global_properties.clone();
        inherited.remove(TARGET_FRAMEWORK);

        snapshot
            .get_items("ProjectReference")
            .iter()
            .map(|item| {
                let full_path = item
                    .get_metadata("FullPath")
                    .map(str::to_string)
                    .unwrap_or_else(|| paths::resolve_path(snapshot.directory(), item.identity()));

                let mut reference_properties = inherited.clone();
                // SetTargetFramework="TargetFramework=net472" pins the referenced instance
                for assignment in msbuild_string::split(item.get_metadata("SetTargetFramework")) {
                    if let Some((name, value)) = assignment.split_once('=') {
                        reference_properties.insert(name.trim(), value.trim());
                    }
                }
                ProjectReferenceRequest::new(full_path, reference_properties)
            })
            .collect()
    }
}

#[async_trait]
impl ProjectEvaluator for XmlProjectEvaluator {
    async fn evaluate(
        &self,
        project_path: &Path,
        global_properties: &GlobalProperties,
    ) -> Result<EvaluatedProject, EvaluationFailure> {
        let path = project_path.to_path_buf();
        let properties = global_properties.clone();
        let startup_directory = self.startup_directory.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            project_file::evaluate_project(&path, &properties, &startup_directory)
        })
        .await
        .map_err(anyhow::Error::from)
        .and_then(|evaluated| evaluated);

        let project = outcome.map_err(|e| EvaluationFailure::new(project_path, vec![format!("{:#}", e)]))?;

        let references = Self::references(&project);
        let supports_restore = Self::supports_restore(project_path, &project);
        Ok(EvaluatedProject {
            view: Arc::new(project.snapshot),
            supports_restore,
            references,
        })
    }

    /// Runs no targets; the evaluated view is returned as is and never
    /// carries target outputs
    async fn build(
        &self,
        project: &EvaluatedProject,
        _targets: &[&str],
    ) -> Result<Arc<dyn ProjectView>, EvaluationFailure> {
        Ok(Arc::clone(&project.view))
    }
}
