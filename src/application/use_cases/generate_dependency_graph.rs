use super::project_graph_loader::ProjectGraphLoader;
use super::settings_loading_context::SettingsLoadingContext;
use crate::application::dto::EntryPoint;
use crate::ports::outbound::{ConfigurationSource, ProjectEvaluator, SolutionReader};
use crate::restore_graph::domain::{DependencyGraphSpec, PackageSpec, ProjectNode};
use crate::restore_graph::services::{Assembled, DependencyGraphSpecBuilder, PackageSpecAssembler};
use crate::shared::error::{AssemblyFailure, RestoreGraphError};
use crate::shared::paths::PathComparison;
use crate::shared::Result;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

type AssemblyOutcome = (usize, PathBuf, Result<Assembled>);

/// GenerateDependencyGraphUseCase - Builds a DependencyGraphSpec from entry points
///
/// Loads the project graph, assembles one PackageSpec per project in a
/// bounded fan-out and aggregates the specs into a sealed graph. The run is
/// all-or-nothing: any evaluation or assembly failure fails the whole run.
///
/// # Type Parameters
/// * `E` - ProjectEvaluator implementation
/// * `S` - SolutionReader implementation
/// * `C` - ConfigurationSource implementation
pub struct GenerateDependencyGraphUseCase<E, S, C> {
    loader: ProjectGraphLoader<E, S>,
    configuration_source: C,
    max_parallelism: usize,
    comparison: PathComparison,
}

impl<E, S, C> GenerateDependencyGraphUseCase<E, S, C>
where
    E: ProjectEvaluator,
    S: SolutionReader,
    C: ConfigurationSource,
{
    /// Creates a new use case with injected dependencies
    pub fn new(evaluator: E, solution_reader: S, configuration_source: C, max_parallelism: usize) -> Self {
        Self {
            loader: ProjectGraphLoader::new(evaluator, solution_reader, max_parallelism),
            configuration_source,
            max_parallelism: max_parallelism.max(1),
            comparison: PathComparison::for_current_os(),
        }
    }

    /// Overrides how project paths are compared when aggregating
    pub fn with_path_comparison(mut self, comparison: PathComparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Generates the graph
    ///
    /// # Arguments
    /// * `entry_points` - Projects and solutions to start from
    /// * `supports_restore` - Whether a spec can be a restore root
    /// * `cancellation` - Checked before each phase
    ///
    /// # Returns
    /// The sealed DependencyGraphSpec; empty when no project was loaded
    ///
    /// # Errors
    /// Returns `LoadError`, the first `Configuration` error, or an
    /// `Assembly` error listing every project that failed
    pub async fn execute<F>(
        &self,
        entry_points: &[EntryPoint],
        supports_restore: F,
        cancellation: &CancellationToken,
    ) -> Result<DependencyGraphSpec>
    where
        F: Fn(&PackageSpec) -> bool,
    {
        info!("Determining projects to restore...");

        let roots = self.loader.expand_entry_points(entry_points)?;
        let entry_paths: Vec<String> = roots
            .iter()
            .map(|(path, _)| path.to_string_lossy().into_owned())
            .collect();

        let nodes = self.loader.load_roots(roots, cancellation).await?;
        if nodes.is_empty() {
            return Ok(DependencyGraphSpec::with_comparison(self.comparison));
        }

        if cancellation.is_cancelled() {
            return Err(RestoreGraphError::Cancelled.into());
        }

        let started = Instant::now();
        let outcomes = self.assemble_all(nodes).await;

        let builder = DependencyGraphSpecBuilder::with_comparison(self.comparison);
        let mut failures: Vec<AssemblyFailure> = Vec::new();
        let mut first_configuration_error: Option<anyhow::Error> = None;

        for (_, project_path, outcome) in outcomes {
            match outcome {
                Ok(Assembled::Spec(spec)) => builder.add_project(*spec).await?,
                Ok(Assembled::Skipped(reason)) => {
                    debug!(project = %project_path.display(), %reason, "Skipping project");
                }
                Err(e) => {
                    failures.push(AssemblyFailure {
                        project_path: project_path.clone(),
                        message: format!("{:#}", e),
                    });
                    let is_configuration = matches!(
                        e.downcast_ref::<RestoreGraphError>(),
                        Some(RestoreGraphError::Configuration { .. })
                    );
                    if is_configuration && first_configuration_error.is_none() {
                        first_configuration_error = Some(e);
                    }
                }
            }
        }

        if !failures.is_empty() {
            failures.sort_by(|a, b| a.project_path.cmp(&b.project_path));
            failures.dedup_by(|a, b| a.project_path == b.project_path);
            for failure in &failures {
                error!(
                    project = %failure.project_path.display(),
                    message = %failure.message,
                    "Failed to create a package spec"
                );
            }
            return Err(match first_configuration_error {
                Some(e) => e,
                None => RestoreGraphError::Assembly { failures }.into(),
            });
        }

        let graph = builder.build(&entry_paths, supports_restore).await?;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            projects = graph.projects().len(),
            "Created dependency graph spec"
        );

        Ok(graph)
    }

    /// Assembles every node with bounded parallelism
    ///
    /// Outcomes come back in node order so aggregation is deterministic.
    async fn assemble_all(&self, nodes: Vec<ProjectNode>) -> Vec<AssemblyOutcome> {
        let context = SettingsLoadingContext::new(&self.configuration_source);

        let mut outcomes: Vec<AssemblyOutcome> = stream::iter(nodes.into_iter().enumerate())
            .map(|(index, node)| {
                let project_path = node.full_path().to_path_buf();
                let settings = context.settings_for(node.outer().as_ref());
                async move {
                    let outcome = match settings {
                        Ok(settings) => tokio::task::spawn_blocking(move || PackageSpecAssembler::assemble(&node, &settings))
                            .await
                            .map_err(anyhow::Error::from)
                            .and_then(|assembled| assembled),
                        Err(e) => Err(e),
                    };
                    (index, project_path, outcome)
                }
            })
            .buffer_unordered(self.max_parallelism)
            .collect()
            .await;

        outcomes.sort_by_key(|(index, _, _)| *index);
        outcomes
    }
}
