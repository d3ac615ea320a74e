use crate::restore_graph::domain::DependencyGraphSpec;
use crate::shared::Result;
use std::path::Path;

/// GraphFileWriter port for persisting a finished graph
pub trait GraphFileWriter: Send + Sync {
    /// Writes the graph document to `path`
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    fn write_graph(&self, graph: &DependencyGraphSpec, path: &Path) -> Result<()>;
}
