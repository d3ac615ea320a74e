/// Ports module defining interfaces for hexagonal architecture
///
/// Outbound ports (driven ports) describe the infrastructure the
/// restore graph pipeline depends on.
pub mod outbound;
