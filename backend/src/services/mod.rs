//! Business logic services for the inventory platform

pub mod alerts;
pub mod product;

pub use alerts::AlertService;
pub use product::ProductService;
