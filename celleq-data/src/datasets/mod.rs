pub mod crop;
pub mod population;
pub mod traits;
pub mod vec_dataset;

pub use crop::{Crop, CropDataset};
pub use population::{class_counts, retain_labeled, LabeledItem, Population};
pub use traits::Dataset;
pub use vec_dataset::VecDataset;
