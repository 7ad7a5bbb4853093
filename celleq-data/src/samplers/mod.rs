pub mod random_sampler;
pub mod sequential_sampler;
pub mod traits;
pub mod weighted_random_sampler;

pub use random_sampler::RandomSampler;
pub use sequential_sampler::SequentialSampler;
pub use traits::Sampler;
pub use weighted_random_sampler::WeightedRandomSampler;
