/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the domain layer isolated.
mod entry_point;
mod graph_request;
mod restore_options;
mod run_mode;

pub use entry_point::EntryPoint;
pub use graph_request::{default_max_parallelism, GraphRequest};
pub use restore_options::{RestoreOptions, RESTORE_GRAPH_OUTPUT_PATH};
pub use run_mode::RunMode;
