/// Restore adapters consuming a finished dependency graph
mod dgspec_handoff_invoker;

pub use dgspec_handoff_invoker::DgSpecHandoffInvoker;
