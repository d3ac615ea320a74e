use super::generate_dependency_graph::GenerateDependencyGraphUseCase;
use crate::application::dto::{GraphRequest, RunMode};
use crate::ports::outbound::{
    ConfigurationSource, GraphFileWriter, ProjectEvaluator, RestoreInvoker, SolutionReader,
};
use crate::shared::error::RestoreGraphError;
use crate::shared::Result;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// RestoreUseCase - Runs one request in either restore or generate-graph mode
///
/// # Type Parameters
/// * `E` - ProjectEvaluator implementation
/// * `S` - SolutionReader implementation
/// * `C` - ConfigurationSource implementation
/// * `R` - RestoreInvoker implementation
/// * `W` - GraphFileWriter implementation
pub struct RestoreUseCase<E, S, C, R, W> {
    generator: GenerateDependencyGraphUseCase<E, S, C>,
    restore_invoker: R,
    graph_writer: W,
}

impl<E, S, C, R, W> RestoreUseCase<E, S, C, R, W>
where
    E: ProjectEvaluator,
    S: SolutionReader,
    C: ConfigurationSource,
    R: RestoreInvoker,
    W: GraphFileWriter,
{
    pub fn new(generator: GenerateDependencyGraphUseCase<E, S, C>, restore_invoker: R, graph_writer: W) -> Self {
        Self {
            generator,
            restore_invoker,
            graph_writer,
        }
    }

    /// Executes the request
    ///
    /// # Returns
    /// `true` when the graph was written (generate-graph) or the restore
    /// succeeded (restore)
    ///
    /// # Errors
    /// Returns an error if the graph cannot be generated or written
    pub async fn execute(&self, request: &GraphRequest, cancellation: &CancellationToken) -> Result<bool> {
        match request.mode {
            RunMode::GenerateGraph => self.generate_graph_file(request, cancellation).await,
            RunMode::Restore => self.restore(request, cancellation).await,
        }
    }

    async fn generate_graph_file(&self, request: &GraphRequest, cancellation: &CancellationToken) -> Result<bool> {
        let output_path = request
            .options
            .restore_graph_output_path
            .clone()
            .ok_or(RestoreGraphError::MissingRestoreGraphOutputPath)?;

        let graph = self
            .generator
            .execute(
                &[request.entry_point()],
                |spec| self.restore_invoker.supports_restore(spec),
                cancellation,
            )
            .await?;

        self.graph_writer.write_graph(&graph, &output_path)?;
        info!(
            path = %output_path.display(),
            projects = graph.projects().len(),
            "Wrote restore graph"
        );
        Ok(true)
    }

    async fn restore(&self, request: &GraphRequest, cancellation: &CancellationToken) -> Result<bool> {
        let entry_point = request.entry_point();
        let graph = self
            .generator
            .execute(
                std::slice::from_ref(&entry_point),
                |spec| self.restore_invoker.supports_restore(spec),
                cancellation,
            )
            .await?;

        if entry_point.is_solution() && graph.restore().is_empty() {
            info!("The solution did not have any projects to restore");
            return Ok(true);
        }

        if cancellation.is_cancelled() {
            return Err(RestoreGraphError::Cancelled.into());
        }

        match self.restore_invoker.restore(&graph, &request.options).await {
            Ok(success) => Ok(success),
            Err(e) => {
                error!(error = %format!("{:#}", e), "Restore failed");
                Ok(false)
            }
        }
    }
}
