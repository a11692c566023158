use serde::Deserialize;
use std::path::Path;

use crate::error::{read_json, ArtifactError, ArtifactKind};
use crate::types::{FEATURE_COUNT, FEATURE_ORDER};

/// Numeric transform fit at training time, applied to the raw row.
pub trait Scaler: Send + Sync {
    fn transform(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT];
}

/// Scaler parameters as exported next to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalerArtifact {
    /// `(x - mean) / scale`
    Standard {
        mean: [f64; FEATURE_COUNT],
        scale: [f64; FEATURE_COUNT],
    },
    /// `x * scale + min`
    MinMax {
        min: [f64; FEATURE_COUNT],
        scale: [f64; FEATURE_COUNT],
    },
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ScalerJson {
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
    MinMax {
        min: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
}

impl ScalerArtifact {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw: ScalerJson = read_json(ArtifactKind::Scaler, path)?;
        let scaler = Self::from_json(raw).map_err(|r| ArtifactError::invalid(ArtifactKind::Scaler, path, r))?;
        tracing::info!("loaded {} scaler from {}", scaler.method(), path.display());
        Ok(scaler)
    }

    fn from_json(raw: ScalerJson) -> Result<Self, String> {
        match raw {
            ScalerJson::Standard { mean, scale, feature_names } => {
                check_feature_names(feature_names.as_deref())?;
                let mean = fixed("mean", mean)?;
                let mut scale = fixed("scale", scale)?;
                // constant training columns were fit with scale 0; they pass through unscaled
                for s in scale.iter_mut() {
                    if *s == 0.0 {
                        *s = 1.0;
                    }
                }
                Ok(ScalerArtifact::Standard { mean, scale })
            }
            ScalerJson::MinMax { min, scale, feature_names } => {
                check_feature_names(feature_names.as_deref())?;
                Ok(ScalerArtifact::MinMax {
                    min: fixed("min", min)?,
                    scale: fixed("scale", scale)?,
                })
            }
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            ScalerArtifact::Standard { .. } => "standard",
            ScalerArtifact::MinMax { .. } => "min-max",
        }
    }
}

impl Scaler for ScalerArtifact {
    fn transform(&self, row: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, x) in row.iter().enumerate() {
            out[i] = match self {
                ScalerArtifact::Standard { mean, scale } => (x - mean[i]) / scale[i],
                ScalerArtifact::MinMax { min, scale } => x * scale[i] + min[i],
            };
        }
        out
    }
}

fn fixed(name: &str, v: Vec<f64>) -> Result<[f64; FEATURE_COUNT], String> {
    if let Some(bad) = v.iter().find(|x| !x.is_finite()) {
        return Err(format!("{} contains non-finite value {}", name, bad));
    }
    let len = v.len();
    v.try_into()
        .map_err(|_| format!("{} has {} values, expected {}", name, len, FEATURE_COUNT))
}

fn check_feature_names(names: Option<&[String]>) -> Result<(), String> {
    let Some(names) = names else {
        return Ok(());
    };
    let expected: Vec<&str> = FEATURE_ORDER.iter().map(|f| f.name()).collect();
    if names.iter().map(String::as_str).ne(expected.iter().copied()) {
        return Err(format!(
            "feature_names {:?} do not match model column order {:?}",
            names, expected
        ));
    }
    Ok(())
}
