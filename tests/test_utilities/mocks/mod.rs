/// Mock implementations for testing
mod mock_configuration_source;
mod mock_project_evaluator;
mod mock_restore_invoker;
mod mock_solution_reader;

pub use mock_configuration_source::MockConfigurationSource;
pub use mock_project_evaluator::MockProjectEvaluator;
pub use mock_restore_invoker::MockRestoreInvoker;
pub use mock_solution_reader::MockSolutionReader;
