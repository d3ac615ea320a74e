use crate::restore_graph::domain::GlobalProperties;
use crate::shared::paths;
use std::path::{Path, PathBuf};

/// Where graph loading starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPoint {
    /// A single project file
    Project {
        path: PathBuf,
        global_properties: GlobalProperties,
    },
    /// A `.sln` or `.slnx` file, expanded to the MSBuild projects it contains
    Solution {
        path: PathBuf,
        global_properties: GlobalProperties,
    },
}

impl EntryPoint {
    /// Classifies `path` by its extension
    pub fn from_path(path: impl Into<PathBuf>, global_properties: GlobalProperties) -> Self {
        let path = path.into();
        if Self::is_solution_path(&path) {
            EntryPoint::Solution {
                path,
                global_properties,
            }
        } else {
            EntryPoint::Project {
                path,
                global_properties,
            }
        }
    }

    pub fn is_solution_path(path: &Path) -> bool {
        paths::has_extension(path, "sln") || paths::has_extension(path, "slnx")
    }

    pub fn path(&self) -> &Path {
        match self {
            EntryPoint::Project { path, .. } | EntryPoint::Solution { path, .. } => path,
        }
    }

    pub fn global_properties(&self) -> &GlobalProperties {
        match self {
            EntryPoint::Project {
                global_properties, ..
            }
            | EntryPoint::Solution {
                global_properties, ..
            } => global_properties,
        }
    }

    pub fn is_solution(&self) -> bool {
        matches!(self, EntryPoint::Solution { .. })
    }
}
