//! Class balancing: stratified subsampling and category-balanced draw weights.

pub mod draw_plan;
pub mod subsample;
pub mod weights;

pub use draw_plan::{training_sampler, WeightedDrawPlan};
pub use subsample::{stratified_subsample, Subsampled};
pub use weights::{category_of, category_weights, CategoryId, CategoryMap, CategoryWeights};
