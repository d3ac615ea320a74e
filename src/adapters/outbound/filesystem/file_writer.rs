use crate::ports::outbound::GraphFileWriter;
use crate::restore_graph::domain::DependencyGraphSpec;
use crate::shared::security;
use crate::shared::Result;
use std::path::Path;
use tracing::debug;

/// FileSystemWriter adapter for writing dependency graph files
///
/// Missing parent directories are created. The document is written to a
/// temporary file next to the target and renamed into place, so readers never
/// see a partially written graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSystemWriter;

impl FileSystemWriter {
    pub fn new() -> Self {
        Self
    }
}

impl GraphFileWriter for FileSystemWriter {
    fn write_graph(&self, graph: &DependencyGraphSpec, path: &Path) -> Result<()> {
        let json = graph.to_json_string()?;
        security::write_atomically(path, &json)?;
        debug!(path = %path.display(), bytes = json.len(), "Wrote dependency graph spec");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_write_graph_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("obj").join("graph.dg.json");

        FileSystemWriter::new()
            .write_graph(&DependencyGraphSpec::new(), &output_path)
            .unwrap();

        let written = DependencyGraphSpec::load(&output_path).unwrap();
        assert!(written.projects().is_empty());
        let leftovers = fs::read_dir(output_path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_graph_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("graph.dg.json");
        fs::write(&output_path, "stale").unwrap();

        FileSystemWriter::new()
            .write_graph(&DependencyGraphSpec::new(), &output_path)
            .unwrap();

        assert!(DependencyGraphSpec::load(&output_path).is_ok());
    }

    #[test]
    fn test_write_graph_to_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileSystemWriter::new().write_graph(&DependencyGraphSpec::new(), temp_dir.path());
        assert!(format!("{}", result.unwrap_err()).contains("Failed to write to file"));
    }
}
