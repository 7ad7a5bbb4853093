//! Core types shared by the celleq crates: the error enum, model
//! abstractions over flat `f32` feature vectors and batch statistics.

pub mod error;
pub mod model;
pub mod nn;
pub mod utils;

// Re-export the main types for direct access through `celleq_core::...`
pub use error::CellEqError;
pub use model::Sequential;
pub use nn::{Frozen, Module, Parameter};
// Re-export traits required by public functions
pub use num_traits;
