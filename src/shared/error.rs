use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// A calling build only distinguishes success from failure, so every failure
/// category (argument errors, evaluation failures, restore failures) maps to
/// the same non-zero code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// The graph was generated (and restored, in restore mode)
    Success = 0,
    /// Anything went wrong
    Failure = 1,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a boolean run outcome to an exit code
    pub fn from_success(success: bool) -> Self {
        if success {
            ExitCode::Success
        } else {
            ExitCode::Failure
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::Failure => write!(f, "Failure (1)"),
        }
    }
}

/// A project the evaluator could not evaluate, or whose metadata-collection
/// targets failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationFailure {
    pub project_path: PathBuf,
    pub diagnostics: Vec<String>,
}

impl EvaluationFailure {
    pub fn new(project_path: impl Into<PathBuf>, diagnostics: Vec<String>) -> Self {
        Self {
            project_path: project_path.into(),
            diagnostics,
        }
    }
}

impl fmt::Display for EvaluationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.project_path.display())?;
        if !self.diagnostics.is_empty() {
            write!(f, ": {}", self.diagnostics.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for EvaluationFailure {}

/// A project whose PackageSpec could not be assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyFailure {
    pub project_path: PathBuf,
    pub message: String,
}

impl fmt::Display for AssemblyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.project_path.display(), self.message)
    }
}

/// Terminal error of the project graph loader.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to resolve entry points from {path}\nDetails: {details}\n\n💡 Hint: Please verify that the project or solution file is valid")]
    EntryPoints { path: PathBuf, details: String },

    #[error("{} project(s) failed to evaluate:\n{}", failures.len(), format_list(failures))]
    Evaluation { failures: Vec<EvaluationFailure> },
}

/// Application-specific errors for restore graph generation.
#[derive(Debug, Error)]
pub enum RestoreGraphError {
    #[error("Invalid restore configuration in {project_path}: {message}\n\n💡 Hint: {hint}")]
    Configuration {
        project_path: PathBuf,
        message: String,
        hint: String,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("{} project(s) could not be converted into a package spec:\n{}", failures.len(), format_list(failures))]
    Assembly { failures: Vec<AssemblyFailure> },

    #[error("Restore graph generation was cancelled")]
    Cancelled,

    #[error("The 'RestoreGraphOutputPath' option is required when generating a restore graph file\n\n💡 Hint: Pass -o RestoreGraphOutputPath=<path> or set it in the options read from stdin")]
    MissingRestoreGraphOutputPath,

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid entry point: {path}\nReason: {reason}\n\n💡 Hint: Please specify a project file or a .sln/.slnx solution file")]
    InvalidEntryPoint { path: PathBuf, reason: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },

    #[error("The dependency graph spec is read-only; cannot {operation}")]
    ReadOnlyGraph { operation: String },
}

impl RestoreGraphError {
    /// Builds a configuration error for malformed project data
    pub fn configuration(
        project_path: impl Into<PathBuf>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        RestoreGraphError::Configuration {
            project_path: project_path.into(),
            message: message.into(),
            hint: hint.into(),
        }
    }
}

fn format_list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| format!("  - {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}
