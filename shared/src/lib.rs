//! Shared types and models for the inventory platform
//!
//! Domain models, request payloads and pure validation/forecasting helpers
//! used by the backend and its tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
