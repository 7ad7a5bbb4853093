//! Crop transforms applied on dataset access.

use crate::datasets::Crop;
use rand::Rng;

/// Pixel shift used by the training augmentation.
pub const TRAIN_SHIFT: usize = 5;

/// Transform applied to every crop when it is fetched from a `CropDataset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropTransform {
    /// Pads or center-crops every channel row to `size`.
    Eval { size: usize },
    /// Same as `Eval`, then cyclically shifts every row by one random offset
    /// in `[-shift, shift]`.
    Train { size: usize, shift: usize },
}

impl CropTransform {
    pub fn eval(size: usize) -> Self {
        CropTransform::Eval { size }
    }

    pub fn train(size: usize, shift: usize) -> Self {
        CropTransform::Train { size, shift }
    }

    /// Training transform when `augment` is set, evaluation transform otherwise.
    pub fn for_training(size: usize, augment: bool) -> Self {
        if augment {
            CropTransform::train(size, TRAIN_SHIFT)
        } else {
            CropTransform::eval(size)
        }
    }

    pub fn size(&self) -> usize {
        match *self {
            CropTransform::Eval { size } | CropTransform::Train { size, .. } => size,
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, crop: &Crop, rng: &mut R) -> Crop {
        let mut pixels: Vec<Vec<f32>> = crop
            .pixels
            .iter()
            .map(|row| fit_row(row, self.size()))
            .collect();
        if let CropTransform::Train { shift, .. } = *self {
            let shift = shift as i64;
            let offset = rng.gen_range(-shift..=shift);
            for row in pixels.iter_mut() {
                shift_row(row, offset);
            }
        }
        Crop::new(crop.label, pixels)
    }
}

/// Center-crops `row` to `size`, or zero-pads it symmetrically (extra
/// column on the right) when shorter.
pub fn fit_row(row: &[f32], size: usize) -> Vec<f32> {
    if row.len() >= size {
        let start = (row.len() - size) / 2;
        row[start..start + size].to_vec()
    } else {
        let left = (size - row.len()) / 2;
        let mut out = vec![0.0; size];
        out[left..left + row.len()].copy_from_slice(row);
        out
    }
}

/// Cyclic shift: positive offsets move values to the right.
pub fn shift_row(row: &mut [f32], offset: i64) {
    if row.is_empty() {
        return;
    }
    let len = row.len() as i64;
    let k = offset.rem_euclid(len) as usize;
    row.rotate_right(k);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fit_row_center_crop() {
        assert_eq!(fit_row(&[1.0, 2.0, 3.0, 4.0, 5.0], 3), vec![2.0, 3.0, 4.0]);
        assert_eq!(fit_row(&[1.0, 2.0, 3.0, 4.0], 2), vec![2.0, 3.0]);
    }

    #[test]
    fn test_fit_row_pad() {
        assert_eq!(fit_row(&[1.0, 2.0], 5), vec![0.0, 1.0, 2.0, 0.0, 0.0]);
        assert_eq!(fit_row(&[], 2), vec![0.0, 0.0]);
    }

    #[test]
    fn test_shift_row_cyclic() {
        let mut row = vec![1.0, 2.0, 3.0, 4.0];
        shift_row(&mut row, 1);
        assert_eq!(row, vec![4.0, 1.0, 2.0, 3.0]);
        shift_row(&mut row, -2);
        assert_eq!(row, vec![2.0, 3.0, 4.0, 1.0]);
        shift_row(&mut row, 4);
        assert_eq!(row, vec![2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn test_train_transform_keeps_values_as_rotation() {
        let crop = Crop::new(1, vec![vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]]);
        let mut rng = StdRng::seed_from_u64(9);
        let out = CropTransform::train(6, 2).apply(&crop, &mut rng);
        let mut sorted = out.pixels[0].clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(sorted, crop.pixels[0]);
        assert_eq!(out.label, 1);
    }

    #[test]
    fn test_for_training_switch() {
        assert_eq!(CropTransform::for_training(100, true), CropTransform::train(100, TRAIN_SHIFT));
        assert_eq!(CropTransform::for_training(100, false), CropTransform::eval(100));
    }
}
