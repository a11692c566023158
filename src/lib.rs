//! Battery health prediction service.
//!
//! Turns a laptop usage record into the feature vector a pre-trained
//! regressor was fit on (label codes, fixed column order, training-time
//! scaling) and returns the predicted battery health percentage.

pub mod artifacts;
pub mod config;
pub mod encoding;
pub mod error;
pub mod model;
pub mod scaler;
pub mod server;
pub mod types;

pub use artifacts::Artifacts;
pub use encoding::{encode, lookup_with_fallback, CategoryEncoding, CategoryEncodings};
pub use error::{ArtifactError, ArtifactKind, InferenceError};
pub use model::{predict, LinearRegressor, Regressor, TorchRegressor};
pub use scaler::{Scaler, ScalerArtifact};
pub use types::{FeatureVector, Field, InputRecord, PredictionResult, FEATURE_ORDER};
