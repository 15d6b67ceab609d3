//! HTTP handlers for the inventory platform

mod alerts;
mod health;
mod product;

pub use alerts::*;
pub use health::*;
pub use product::*;
