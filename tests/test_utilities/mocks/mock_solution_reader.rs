use msbuild_restore_graph::prelude::*;
use std::path::{Path, PathBuf};

/// Mock SolutionReader for testing
pub struct MockSolutionReader {
    pub projects: Vec<SolutionProject>,
    pub should_fail: bool,
}

impl MockSolutionReader {
    pub fn new() -> Self {
        Self {
            projects: Vec::new(),
            should_fail: false,
        }
    }

    pub fn with_project(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.projects.push(SolutionProject {
            name,
            path,
            is_msbuild_project: true,
        });
        self
    }

    /// Adds an entry MSBuild does not know how to build, such as a solution folder
    pub fn with_unknown_project(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.projects.push(SolutionProject {
            name: name.to_string(),
            path: path.into(),
            is_msbuild_project: false,
        });
        self
    }

    pub fn with_failure() -> Self {
        Self {
            projects: Vec::new(),
            should_fail: true,
        }
    }
}

impl SolutionReader for MockSolutionReader {
    fn read_projects(&self, _solution_path: &Path) -> Result<Vec<SolutionProject>> {
        if self.should_fail {
            anyhow::bail!("Mock solution read failure");
        }
        Ok(self.projects.clone())
    }
}
