//! msbuild-restore-graph - Static-graph restore spec generator for MSBuild projects
//!
//! This library evaluates a graph of MSBuild projects (a single project or a
//! whole solution), extracts package, project and framework references per
//! target framework, and assembles the normalized `DependencyGraphSpec` that
//! drives NuGet restore. It follows hexagonal architecture and Domain-Driven
//! Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`restore_graph`): Data model, extraction services and policies
//! - **Application Layer** (`application`): Use cases and request DTOs
//! - **Ports** (`ports`): Interface definitions for the build engine and other collaborators
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use msbuild_restore_graph::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<()> {
//! // Create adapters
//! let evaluator = XmlProjectEvaluator::new();
//! let solution_reader = SolutionFileReader::new()?;
//! let configuration_source = NuGetConfigSource::new();
//! let invoker = DgSpecHandoffInvoker::new(FileSystemWriter::new(), false);
//!
//! // Create use case
//! let use_case = GenerateDependencyGraphUseCase::new(
//!     evaluator,
//!     solution_reader,
//!     configuration_source,
//!     default_max_parallelism(),
//! );
//!
//! // Execute
//! let entry = EntryPoint::from_path("/src/All.sln", GlobalProperties::new());
//! let graph = use_case
//!     .execute(&[entry], |spec| invoker.supports_restore(spec), &CancellationToken::new())
//!     .await?;
//! graph.save(std::path::Path::new("/src/obj/all.dg.json"))?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod ports;
pub mod restore_graph;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::configuration::NuGetConfigSource;
    pub use crate::adapters::outbound::filesystem::FileSystemWriter;
    pub use crate::adapters::outbound::msbuild::{SolutionFileReader, XmlProjectEvaluator};
    pub use crate::adapters::outbound::restore::DgSpecHandoffInvoker;
    pub use crate::application::dto::{default_max_parallelism, EntryPoint, GraphRequest, RestoreOptions, RunMode};
    pub use crate::application::use_cases::{
        GenerateDependencyGraphUseCase, ProjectGraphLoader, RestoreUseCase, SettingsLoadingContext,
    };
    pub use crate::ports::outbound::{
        ConfigurationSource, EvaluatedProject, GraphFileWriter, ProjectEvaluator, ProjectReferenceRequest,
        RestoreInvoker, SolutionProject, SolutionReader,
    };
    pub use crate::restore_graph::domain::{
        DependencyGraphSpec, GlobalProperties, ItemView, LibraryDependency, NuGetFramework, NuGetVersion,
        PackageSourceSetting, PackageSpec, ProjectNode, ProjectSnapshot, ProjectStyle, ProjectView,
        RestoreMetadataLayout, Settings, SettingsRequest, VersionRange,
    };
    pub use crate::restore_graph::services::{
        DependencyGraphSpecBuilder, ItemDeduplicator, PackageSpecAssembler, ReferenceExtractor, SettingsResolver,
        TargetFrameworkResolver,
    };
    pub use crate::shared::error::{EvaluationFailure, ExitCode, LoadError, RestoreGraphError};
    pub use crate::shared::paths::PathComparison;
    pub use crate::shared::Result;
}
