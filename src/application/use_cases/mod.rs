/// Use cases module containing application business logic orchestration
mod generate_dependency_graph;
mod project_graph_loader;
mod restore;
mod settings_loading_context;

pub use generate_dependency_graph::GenerateDependencyGraphUseCase;
pub use project_graph_loader::{ProjectGraphLoader, METADATA_TARGETS};
pub use restore::RestoreUseCase;
pub use settings_loading_context::SettingsLoadingContext;
