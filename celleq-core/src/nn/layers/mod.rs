// src/nn/layers/mod.rs
// Layers operating on flat feature vectors

pub mod linear;
pub mod relu;

// Re-export key layer structs
pub use linear::Linear;
pub use relu::ReLU;
