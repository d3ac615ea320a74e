/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (build engine, file system, restore).
pub mod configuration_source;
pub mod graph_file_writer;
pub mod project_evaluator;
pub mod restore_invoker;
pub mod solution_reader;

pub use configuration_source::ConfigurationSource;
pub use graph_file_writer::GraphFileWriter;
pub use project_evaluator::{EvaluatedProject, ProjectEvaluator, ProjectReferenceRequest};
pub use restore_invoker::RestoreInvoker;
pub use solution_reader::{SolutionProject, SolutionReader};
