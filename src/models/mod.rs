pub mod availability;
pub mod phone_model;

// Re-exports for convenience
pub use availability::*;
pub use phone_model::*;
