//! Labeled crop populations, class balancing, samplers and restartable
//! data loading.

pub mod balance;
pub mod dataloader;
pub mod datasets;
pub mod samplers;
pub mod transforms;

// Re-export main components
pub use balance::{
    category_weights, stratified_subsample, training_sampler, CategoryId, CategoryMap,
    WeightedDrawPlan,
};
pub use dataloader::{BatchSource, DataLoader};
pub use datasets::{Crop, CropDataset, Dataset, LabeledItem, Population, VecDataset};
pub use samplers::{RandomSampler, Sampler, SequentialSampler, WeightedRandomSampler};
pub use transforms::CropTransform;
