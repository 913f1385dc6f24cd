// Released under MIT License.
// Copyright (c) 2026 The afm-analysis developers

//! Contains the configuration groups selecting the image corrections and the data analysis to perform.

use derive_builder::Builder;
use getset::Getters;
use serde::{Deserialize, Deserializer};

/// Selection of the corrections applied to the height data.
///
/// Values are stored exactly as provided and are validated when the correction pipeline is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageCorrection {
    /// Subtract the best-fit plane (`yes` / `no`).
    /// If not specified, the default value is `no`.
    #[builder(setter(into), default = "default_no()")]
    #[serde(default = "default_no", deserialize_with = "deserialize_setting")]
    #[getset(get = "pub")]
    common_plane_subtraction: String,
    /// Remove the drift of the scan lines (`linear` / `mean` / `no`).
    /// If not specified, the default value is `no`.
    #[builder(setter(into), default = "default_no()")]
    #[serde(default = "default_no", deserialize_with = "deserialize_setting")]
    #[getset(get = "pub")]
    line_drift_correction: String,
    /// Shift the heights (`minimum` / `mean` / `no`).
    /// If not specified, the default value is `no`.
    #[builder(setter(into), default = "default_no()")]
    #[serde(default = "default_no", deserialize_with = "deserialize_setting")]
    #[getset(get = "pub")]
    data_shift: String,
}

impl Default for ImageCorrection {
    fn default() -> Self {
        Self {
            common_plane_subtraction: default_no(),
            line_drift_correction: default_no(),
            data_shift: default_no(),
        }
    }
}

impl ImageCorrection {
    pub fn new() -> ImageCorrectionBuilder {
        ImageCorrectionBuilder::default()
    }
}

/// Selection of the analyses performed on the corrected height data.
///
/// Values are stored exactly as provided and are validated when the analysis pipeline is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Getters, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataAnalysis {
    /// Calculate the distribution of heights (`yes` / `no`).
    /// If not specified, the default value is `no`.
    #[builder(setter(into), default = "default_no()")]
    #[serde(default = "default_no", deserialize_with = "deserialize_setting")]
    #[getset(get = "pub")]
    height_values_distribution: String,
    /// Calculate the roughness of the surface (`1d` / `2d` / `no`).
    /// If not specified, the default value is `no`.
    #[builder(setter(into), default = "default_no()")]
    #[serde(default = "default_no", deserialize_with = "deserialize_setting")]
    #[getset(get = "pub")]
    roughness: String,
}

impl Default for DataAnalysis {
    fn default() -> Self {
        Self {
            height_values_distribution: default_no(),
            roughness: default_no(),
        }
    }
}

impl DataAnalysis {
    pub fn new() -> DataAnalysisBuilder {
        DataAnalysisBuilder::default()
    }
}

fn default_no() -> String {
    "no".to_owned()
}

/// Values written in the yaml file without quotes may be read as booleans or numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSetting {
    Text(String),
    Flag(bool),
    Number(f64),
}

fn deserialize_setting<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawSetting::deserialize(deserializer)? {
        RawSetting::Text(s) => s,
        RawSetting::Flag(b) => b.to_string(),
        RawSetting::Number(n) => n.to_string(),
    })
}
