use crate::shared::Result;
use std::path::{Path, PathBuf};

/// One project entry of a solution file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionProject {
    pub name: String,
    /// Absolute path, resolved against the solution directory
    pub path: PathBuf,
    /// False for solution folders and non-MSBuild project kinds
    pub is_msbuild_project: bool,
}

/// SolutionReader port for listing the projects of a solution
pub trait SolutionReader: Send + Sync {
    /// Reads every project entry of a `.sln` or `.slnx` file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a solution
    fn read_projects(&self, solution_path: &Path) -> Result<Vec<SolutionProject>>;
}
