/// Application layer - Use cases and DTOs
///
/// This layer orchestrates the restore graph services and coordinates
/// with infrastructure through ports.
pub mod dto;
pub mod use_cases;
