//! Loading crop populations from manifest files.

use crate::config::ExperimentConfig;
use celleq_core::CellEqError;
use celleq_data::transforms::fit_row;
use celleq_data::{Crop, Population};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Provides the train and validation crop populations of an experiment.
pub trait CropSource {
    fn load(&self) -> Result<(Population<Crop>, Population<Crop>), CellEqError>;
}

/// Crop source backed by JSON manifests.
///
/// Each split name `s` maps to `<root_dir>/<s>.json`, an array of
/// `{"label": i64, "pixels": [[f32]]}` with one pixel row per channel listed
/// in the channels file.
#[derive(Debug, Clone)]
pub struct ManifestCropSource {
    pub root_dir: PathBuf,
    pub channels_path: PathBuf,
    pub crop_size: usize,
    pub train_set: Vec<String>,
    pub val_set: Vec<String>,
    /// Pad rows shorter than `crop_size`; when unset such crops are skipped.
    pub to_pad: bool,
    pub blacklist: Vec<String>,
}

impl ManifestCropSource {
    pub fn from_config(config: &ExperimentConfig) -> Self {
        ManifestCropSource {
            root_dir: config.root_dir.clone(),
            channels_path: config.channels_path.clone(),
            crop_size: config.crop_size,
            train_set: config.train_set.clone(),
            val_set: config.val_set.clone(),
            to_pad: config.to_pad,
            blacklist: config.blacklist.clone(),
        }
    }

    fn load_split(&self, names: &[String], channels: &[String]) -> Result<Population<Crop>, CellEqError> {
        let keep: Vec<bool> = channels.iter().map(|c| !self.blacklist.contains(c)).collect();
        let mut population = Vec::new();
        let mut skipped = 0usize;
        for name in names {
            let path = self.root_dir.join(format!("{}.json", name));
            for crop in read_manifest(&path)? {
                if crop.channels() != channels.len() {
                    return Err(CellEqError::ShapeMismatch {
                        expected: vec![channels.len()],
                        actual: vec![crop.channels()],
                        operation: format!("crop channels in {}", path.display()),
                    });
                }
                match self.fit(crop, &keep) {
                    Some(crop) => population.push(crop),
                    None => skipped += 1,
                }
            }
        }
        if skipped > 0 {
            debug!("skipped {} crops narrower than {} (to_pad unset)", skipped, self.crop_size);
        }
        Ok(population)
    }

    fn fit(&self, crop: Crop, keep: &[bool]) -> Option<Crop> {
        if !self.to_pad && crop.pixels.iter().any(|row| row.len() < self.crop_size) {
            return None;
        }
        let pixels = crop
            .pixels
            .iter()
            .zip(keep)
            .filter(|(_, kept)| **kept)
            .map(|(row, _)| fit_row(row, self.crop_size))
            .collect();
        Some(Crop::new(crop.label, pixels))
    }
}

impl CropSource for ManifestCropSource {
    fn load(&self) -> Result<(Population<Crop>, Population<Crop>), CellEqError> {
        let channels = read_channel_names(&self.channels_path)?;
        let train = self.load_split(&self.train_set, &channels)?;
        let val = self.load_split(&self.val_set, &channels)?;
        info!("loaded {} train crops and {} val crops", train.len(), val.len());
        Ok((train, val))
    }
}

/// Reads one channel name per line.
pub fn read_channel_names(path: &Path) -> Result<Vec<String>, CellEqError> {
    let text = fs::read_to_string(path).map_err(|e| CellEqError::io(path, e))?;
    Ok(text.lines().map(|line| line.trim().to_string()).collect())
}

fn read_manifest(path: &Path) -> Result<Vec<Crop>, CellEqError> {
    let text = fs::read_to_string(path).map_err(|e| CellEqError::io(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| CellEqError::Serialization(format!("{}: {}", path.display(), e)))
}
