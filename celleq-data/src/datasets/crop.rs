use super::population::LabeledItem;
use super::traits::Dataset;
use crate::transforms::CropTransform;
use celleq_core::CellEqError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// A labeled crop: one row of pixel intensities per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub label: i64,
    pub pixels: Vec<Vec<f32>>,
}

impl Crop {
    pub fn new(label: i64, pixels: Vec<Vec<f32>>) -> Self {
        Crop { label, pixels }
    }

    pub fn channels(&self) -> usize {
        self.pixels.len()
    }

    /// Width of the widest channel row.
    pub fn width(&self) -> usize {
        self.pixels.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Channel-major flattening, the layout models consume.
    pub fn flatten(&self) -> Vec<f32> {
        self.pixels.iter().flatten().copied().collect()
    }
}

impl LabeledItem for Crop {
    fn label(&self) -> i64 {
        self.label
    }
}

/// Dataset over a crop population that applies a transform on access.
///
/// The transform's randomness comes from an internal seeded generator so a
/// fixed seed reproduces the same sequence of augmented crops.
#[derive(Debug)]
pub struct CropDataset {
    crops: Vec<Crop>,
    transform: CropTransform,
    rng: Mutex<StdRng>,
}

impl CropDataset {
    pub fn new(crops: Vec<Crop>, transform: CropTransform, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        CropDataset {
            crops,
            transform,
            rng: Mutex::new(rng),
        }
    }

    pub fn crops(&self) -> &[Crop] {
        &self.crops
    }

    pub fn transform(&self) -> &CropTransform {
        &self.transform
    }
}

impl Dataset for CropDataset {
    type Item = Crop;

    fn get(&self, index: usize) -> Result<Self::Item, CellEqError> {
        let crop = self.crops.get(index).ok_or(CellEqError::IndexOutOfBounds {
            index,
            len: self.crops.len(),
        })?;
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| {
            log::warn!("Mutex for CropDataset rng was poisoned. Recovering.");
            poisoned.into_inner()
        });
        Ok(self.transform.apply(crop, &mut *rng))
    }

    fn len(&self) -> usize {
        self.crops.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_crop() -> Crop {
        Crop::new(2, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
    }

    #[test]
    fn test_crop_accessors() {
        let crop = sample_crop();
        assert_eq!(crop.label(), 2);
        assert_eq!(crop.channels(), 2);
        assert_eq!(crop.width(), 3);
        assert_eq!(crop.flatten(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_crop_deserialize() {
        let crop: Crop = serde_json::from_str(r#"{"label": 4, "pixels": [[0.5, 1.5]]}"#).unwrap();
        assert_eq!(crop, Crop::new(4, vec![vec![0.5, 1.5]]));
    }

    #[test]
    fn test_crop_dataset_eval_transform() {
        let dataset = CropDataset::new(vec![sample_crop()], CropTransform::eval(5), Some(1));
        assert_eq!(dataset.len(), 1);
        let crop = dataset.get(0).unwrap();
        assert_eq!(crop.pixels[0], vec![0.0, 1.0, 2.0, 3.0, 0.0]);
        assert_eq!(crop.label, 2);
    }

    #[test]
    fn test_crop_dataset_out_of_bounds() {
        let dataset = CropDataset::new(vec![sample_crop()], CropTransform::eval(3), None);
        assert_eq!(
            dataset.get(1),
            Err(CellEqError::IndexOutOfBounds { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_crop_dataset_seeded_augmentation_is_reproducible() {
        let crops: Vec<Crop> = (0..8)
            .map(|i| Crop::new(0, vec![(0..10).map(|x| (x * (i + 1)) as f32).collect()]))
            .collect();
        let a = CropDataset::new(crops.clone(), CropTransform::train(10, 3), Some(42));
        let b = CropDataset::new(crops, CropTransform::train(10, 3), Some(42));
        for i in 0..8 {
            assert_eq!(a.get(i).unwrap(), b.get(i).unwrap());
        }
    }
}
