use crate::application::dto::RestoreOptions;
use crate::restore_graph::domain::{DependencyGraphSpec, PackageSpec};
use crate::shared::Result;
use async_trait::async_trait;

/// RestoreInvoker port for the package restore that consumes the graph
#[async_trait]
pub trait RestoreInvoker: Send + Sync {
    /// Whether a project of this shape can be restored
    fn supports_restore(&self, spec: &PackageSpec) -> bool;

    /// Restores every root of the graph
    ///
    /// # Returns
    /// `true` when the restore succeeded
    ///
    /// # Errors
    /// Returns an error when the restore could not be started at all
    async fn restore(&self, graph: &DependencyGraphSpec, options: &RestoreOptions) -> Result<bool>;
}
