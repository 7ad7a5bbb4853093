//! Experiment configuration read from `<base_path>/config.json`.

use celleq_core::CellEqError;
use celleq_data::{CategoryId, CategoryMap};
use log::info;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";

/// Keys that must be present in the document, even when their value is null.
pub const REQUIRED_KEYS: [&str; 12] = [
    "root_dir",
    "channels_path",
    "crop_size",
    "train_set",
    "val_set",
    "to_pad",
    "blacklist",
    "batch_size",
    "num_workers",
    "sample_batch",
    "num_classes",
    "hierarchy_match",
];

pub const DEFAULT_CROP_INPUT_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExperimentConfig {
    pub root_dir: PathBuf,
    pub channels_path: PathBuf,
    pub crop_size: usize,
    #[serde(deserialize_with = "one_or_many")]
    pub train_set: Vec<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub val_set: Vec<String>,
    pub to_pad: bool,
    /// Channel names excluded from every crop.
    pub blacklist: Vec<String>,
    pub batch_size: usize,
    /// Accepted for compatibility; batches are produced on the calling thread.
    pub num_workers: usize,
    /// Balanced weighted sampling for the training loader when set,
    /// uniform shuffling otherwise.
    pub sample_batch: bool,
    pub num_classes: usize,
    #[serde(deserialize_with = "category_map")]
    pub hierarchy_match: Option<CategoryMap>,
    /// Per-class cap; subsampling is skipped when absent.
    #[serde(default)]
    pub size_data: Option<i64>,
    #[serde(default = "default_crop_input_size")]
    pub crop_input_size: usize,
    #[serde(default = "default_aug")]
    pub aug: bool,
}

fn default_crop_input_size() -> usize {
    DEFAULT_CROP_INPUT_SIZE
}

fn default_aug() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

/// JSON object keys are strings; labels are parsed to integers once here.
fn category_map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<CategoryMap>, D::Error> {
    let raw: Option<HashMap<String, CategoryId>> = Option::deserialize(deserializer)?;
    raw.map(|entries| {
        entries
            .into_iter()
            .map(|(key, category)| {
                key.trim()
                    .parse::<i64>()
                    .map(|label| (label, category))
                    .map_err(|_| D::Error::custom(format!("hierarchy_match key '{}' is not an integer label", key)))
            })
            .collect()
    })
    .transpose()
}

impl ExperimentConfig {
    /// Reads and validates `<base_path>/config.json`.
    pub fn load(base_path: &Path) -> Result<Self, CellEqError> {
        let path = base_path.join(CONFIG_FILE);
        let text = fs::read_to_string(&path).map_err(|e| CellEqError::io(&path, e))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| CellEqError::InvalidConfig {
            key: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_value(value)?;
        info!("loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Validates a parsed document.
    ///
    /// # Errors
    /// `MissingConfigKey` naming the first absent required key, or
    /// `InvalidConfig` when a value has the wrong type or is out of range.
    pub fn from_value(value: Value) -> Result<Self, CellEqError> {
        let object = value.as_object().ok_or_else(|| CellEqError::InvalidConfig {
            key: CONFIG_FILE.to_string(),
            message: "expected a JSON object".to_string(),
        })?;
        if let Some(missing) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
            return Err(CellEqError::MissingConfigKey(missing.to_string()));
        }
        let config: ExperimentConfig = serde_json::from_value(value).map_err(|e| CellEqError::InvalidConfig {
            key: CONFIG_FILE.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), CellEqError> {
        let positive = [
            ("batch_size", self.batch_size),
            ("crop_size", self.crop_size),
            ("crop_input_size", self.crop_input_size),
            ("num_classes", self.num_classes),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(CellEqError::InvalidConfig {
                    key: key.to_string(),
                    message: "must be positive".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Model input channels: lines of the channels file minus the blacklist.
    pub fn num_channels(&self) -> Result<usize, CellEqError> {
        let text = fs::read_to_string(&self.channels_path).map_err(|e| CellEqError::io(&self.channels_path, e))?;
        let lines = text.lines().count();
        lines
            .checked_sub(self.blacklist.len())
            .ok_or_else(|| CellEqError::InvalidConfig {
                key: "blacklist".to_string(),
                message: format!(
                    "{} blacklisted channels but only {} in {}",
                    self.blacklist.len(),
                    lines,
                    self.channels_path.display()
                ),
            })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
