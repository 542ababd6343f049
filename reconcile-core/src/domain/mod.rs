pub mod batch;
pub mod decision;
pub mod error;
pub mod incongruence;
pub mod rules;
pub mod session;

// Re-exports to keep imports short elsewhere
pub use error::DomainError;
