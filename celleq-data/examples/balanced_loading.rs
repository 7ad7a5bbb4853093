//! Builds a skewed crop population, caps it per class and draws balanced
//! batches from it with a weighted sampler.

use celleq_data::balance::{stratified_subsample, WeightedDrawPlan};
use celleq_data::dataloader::DataLoader;
use celleq_data::datasets::{class_counts, Crop, CropDataset};
use celleq_data::transforms::CropTransform;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    // 300 crops of class 0, 60 of class 1, 15 of class 2
    let mut crops = Vec::new();
    for (label, count) in [(0i64, 300usize), (1, 60), (2, 15)] {
        for i in 0..count {
            crops.push(Crop::new(label, vec![vec![i as f32; 12]]));
        }
    }

    let mut rng = StdRng::seed_from_u64(0);
    let capped = stratified_subsample(crops, 100, &mut rng);
    println!("before: {:?}", capped.counts_before);
    println!("after:  {:?}", class_counts(&capped.items));

    let plan = WeightedDrawPlan::balanced(&capped.items, None).expect("identity map never fails");
    let sampler = plan.into_sampler(Some(1)).expect("weights are positive");
    let dataset = CropDataset::new(capped.items, CropTransform::train(10, 2), Some(2));
    let loader = DataLoader::new(dataset, 25, sampler);

    let mut drawn = Vec::new();
    for batch in loader.iter() {
        let batch = batch.expect("all indices are in range");
        drawn.extend(batch.into_iter().map(|crop| crop.label));
    }
    println!("{} batches, drawn labels: {:?}", loader.len(), class_counts(&drawn));
}
