use serde::Deserialize;
use std::path::Path;
use tch::{kind::Kind, CModule, Device, Tensor};

use crate::error::{read_json, ArtifactError, ArtifactKind, InferenceError};
use crate::types::{FeatureVector, PredictionResult, FEATURE_COUNT};

/// Opaque pre-trained regression function.
pub trait Regressor: Send + Sync {
    /// All outputs for a single input row; the prediction is the first one.
    fn forward(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError>;
}

/// Runs the model once and returns its first output.
pub fn predict(vector: &FeatureVector, model: &dyn Regressor) -> Result<PredictionResult, InferenceError> {
    let out = model.forward(vector)?;
    let raw = *out.first().ok_or(InferenceError::EmptyOutput)?;
    // not a range check: NaN/inf cannot be serialized into the JSON response
    if !raw.is_finite() {
        return Err(InferenceError::NonFinite(raw));
    }
    Ok(PredictionResult { raw })
}

/// Picks the backend from the file extension: `.json` is a linear model,
/// anything else is TorchScript.
pub fn load_model(path: &Path) -> Result<Box<dyn Regressor>, ArtifactError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(Box::new(LinearRegressor::load(path)?))
    } else {
        Ok(Box::new(TorchRegressor::load(path)?))
    }
}

// ---------- TorchScript ----------

pub struct TorchRegressor {
    model: CModule,
    device: Device,
}

impl TorchRegressor {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let device = Device::Cpu;
        let model = CModule::load_on_device(path, device).map_err(|source| ArtifactError::Torch {
            path: path.to_path_buf(),
            source,
        })?;

        // Probe output with a dummy forward; a regressor must yield at least one value
        let dummy = Tensor::zeros([1, FEATURE_COUNT as i64], (Kind::Float, device));
        let t = model.forward_ts(&[dummy]).map_err(|source| ArtifactError::Torch {
            path: path.to_path_buf(),
            source,
        })?;
        if t.numel() == 0 {
            return Err(ArtifactError::invalid(
                ArtifactKind::Model,
                path,
                format!("model output is empty (size {:?})", t.size()),
            ));
        }
        tracing::info!("loaded TorchScript model from {}; output size {:?}", path.display(), t.size());

        Ok(Self { model, device })
    }
}

impl Regressor for TorchRegressor {
    fn forward(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        let row: Vec<f32> = x.as_slice().iter().map(|v| *v as f32).collect();
        let input = Tensor::from_slice(&row)
            .reshape([1, FEATURE_COUNT as i64])
            .to_device(self.device);

        let t = self.model.forward_ts(&[input])?;
        let flat = t.flatten(0, -1).to_kind(Kind::Double);
        Ok(Vec::<f64>::try_from(&flat)?)
    }
}

// ---------- Linear ----------

/// `intercept + coefficients · x`, exported as JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearRegressor {
    pub coefficients: [f64; FEATURE_COUNT],
    pub intercept: f64,
}

impl LinearRegressor {
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let m: LinearRegressor = read_json(ArtifactKind::Model, path)?;
        if !m.intercept.is_finite() || m.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::invalid(ArtifactKind::Model, path, "non-finite weights"));
        }
        tracing::info!("loaded linear model from {}", path.display());
        Ok(m)
    }
}

impl Regressor for LinearRegressor {
    fn forward(&self, x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
        let y = self
            .coefficients
            .iter()
            .zip(x.as_slice())
            .fold(self.intercept, |acc, (c, v)| acc + c * v);
        Ok(vec![y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<f64>);

    impl Regressor for Fixed {
        fn forward(&self, _x: &FeatureVector) -> Result<Vec<f64>, InferenceError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn predict_takes_first_output_unmodified() {
        let p = predict(&FeatureVector([0.0; FEATURE_COUNT]), &Fixed(vec![81.23456, 5.0])).unwrap();
        assert_eq!(p.raw, 81.23456);
        assert_eq!(p.rounded(), 81.23);
    }

    #[test]
    fn predict_rejects_empty_and_nan() {
        let x = FeatureVector([0.0; FEATURE_COUNT]);
        assert!(matches!(predict(&x, &Fixed(vec![])), Err(InferenceError::EmptyOutput)));
        assert!(matches!(predict(&x, &Fixed(vec![f64::NAN])), Err(InferenceError::NonFinite(_))));
    }

    #[test]
    fn linear_is_dot_plus_intercept() {
        let m = LinearRegressor {
            coefficients: [1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -3.0, 0.5],
            intercept: 10.0,
        };
        let x = FeatureVector([1.0, 1.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 1.0, 2.0]);
        assert_eq!(m.forward(&x).unwrap(), vec![11.0]);
    }
}
