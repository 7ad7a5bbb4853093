pub mod stats;

pub use stats::{mean_std, MeanStd};
