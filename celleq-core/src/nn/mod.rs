// src/nn/mod.rs
// Model components: layers, parameters and the read-only evaluation view.

pub mod frozen;
pub mod init;
pub mod layers;
pub mod module; // Trait Module
pub mod parameter; // struct Parameter

// Re-export common items
pub use frozen::Frozen;
pub use module::Module;
pub use parameter::Parameter;
