use crate::restore_graph::domain::{GlobalProperties, ProjectView};
use crate::shared::error::EvaluationFailure;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// A project reference discovered during evaluation, with the global
/// properties the referenced project must be evaluated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReferenceRequest {
    pub project_path: PathBuf,
    pub global_properties: GlobalProperties,
}

impl ProjectReferenceRequest {
    pub fn new(project_path: impl Into<PathBuf>, global_properties: GlobalProperties) -> Self {
        Self {
            project_path: project_path.into(),
            global_properties,
        }
    }
}

/// One evaluated project instance.
#[derive(Debug, Clone)]
pub struct EvaluatedProject {
    pub view: Arc<dyn ProjectView>,
    /// Whether the project defines the internal restore metadata target
    pub supports_restore: bool,
    /// Outward references, including the per-framework inner instances of a
    /// multi-targeting project
    pub references: Vec<ProjectReferenceRequest>,
}

/// ProjectEvaluator port for evaluating project files
///
/// This port abstracts the build engine. Evaluation is driven by a single
/// caller at a time; `build` may be called concurrently for different
/// projects between `begin_build` and `end_build`.
#[async_trait]
pub trait ProjectEvaluator: Send + Sync {
    /// Evaluates one project file
    ///
    /// # Arguments
    /// * `project_path` - Full path of the project file
    /// * `global_properties` - Global properties for this instance
    ///
    /// # Errors
    /// Returns an EvaluationFailure carrying the evaluator's diagnostics
    async fn evaluate(
        &self,
        project_path: &std::path::Path,
        global_properties: &GlobalProperties,
    ) -> Result<EvaluatedProject, EvaluationFailure>;

    /// Opens a build session
    fn begin_build(&self) {}

    /// Closes the build session opened by `begin_build`
    fn end_build(&self) {}

    /// Runs the given targets against an evaluated project
    ///
    /// Targets the project does not define are skipped. An evaluator without
    /// a target engine runs nothing and returns the evaluated view, so the
    /// result then carries no target outputs.
    ///
    /// # Returns
    /// A view reflecting items and properties produced by the targets, or the
    /// evaluated view when targets cannot be run
    ///
    /// # Errors
    /// Returns an EvaluationFailure when any target fails
    async fn build(
        &self,
        project: &EvaluatedProject,
        targets: &[&str],
    ) -> Result<Arc<dyn ProjectView>, EvaluationFailure>;
}
