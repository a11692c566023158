use std::path::Path;

use crate::config::Config;
use crate::encoding::{encode, CategoryEncodings};
use crate::error::{ArtifactError, InferenceError};
use crate::model::{load_model, predict, Regressor};
use crate::scaler::{Scaler, ScalerArtifact};
use crate::types::{FeatureVector, InputRecord, PredictionResult};

/// Everything fit at training time. Built once, then only read.
pub struct Artifacts {
    pub encodings: CategoryEncodings,
    pub scaler: Box<dyn Scaler>,
    pub model: Box<dyn Regressor>,
}

impl Artifacts {
    pub fn new(encodings: CategoryEncodings, scaler: Box<dyn Scaler>, model: Box<dyn Regressor>) -> Self {
        Self {
            encodings,
            scaler,
            model,
        }
    }

    /// Loads model, scaler and encodings; the first broken file aborts.
    pub fn load(model_path: &Path, scaler_path: &Path, encoders_path: &Path) -> Result<Self, ArtifactError> {
        let model = load_model(model_path)?;
        let scaler = ScalerArtifact::load(scaler_path)?;
        let encodings = CategoryEncodings::load(encoders_path)?;
        Ok(Self::new(encodings, Box::new(scaler), model))
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ArtifactError> {
        Self::load(&cfg.model_path, &cfg.scaler_path, &cfg.encoders_path)
    }

    pub fn encode(&self, record: &InputRecord) -> FeatureVector {
        encode(record, &self.encodings, self.scaler.as_ref())
    }

    /// Encode then predict, for a record already clamped by the caller.
    pub fn predict(&self, record: &InputRecord) -> Result<(FeatureVector, PredictionResult), InferenceError> {
        let x = self.encode(record);
        let p = predict(&x, self.model.as_ref())?;
        Ok((x, p))
    }
}
