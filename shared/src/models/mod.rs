//! Domain models for the inventory platform

mod alert;
mod inventory;
mod product;
mod sale;
mod supplier;
mod warehouse;

pub use alert::*;
pub use inventory::*;
pub use product::*;
pub use sale::*;
pub use supplier::*;
pub use warehouse::*;
