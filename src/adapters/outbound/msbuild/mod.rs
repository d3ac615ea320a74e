mod condition;
mod project_file;
mod solution_file;
mod xml_project_evaluator;

pub use project_file::{evaluate_project, StaticProject};
pub use solution_file::SolutionFileReader;
pub use xml_project_evaluator::XmlProjectEvaluator;
