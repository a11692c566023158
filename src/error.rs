use serde::de::DeserializeOwned;
use std::{fmt, fs, path::Path, path::PathBuf};
use thiserror::Error;

/// Which startup file an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Scaler,
    Encodings,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::Encodings => "label encodings",
        })
    }
}

/// A model, scaler or encoding artifact could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {kind} artifact at {}", .path.display())]
    Read {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {kind} artifact at {}", .path.display())]
    Parse {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {kind} artifact at {}: {reason}", .path.display())]
    Invalid {
        kind: ArtifactKind,
        path: PathBuf,
        reason: String,
    },

    #[error("failed to load TorchScript model at {}", .path.display())]
    Torch {
        path: PathBuf,
        #[source]
        source: tch::TchError,
    },
}

impl ArtifactError {
    pub fn invalid(kind: ArtifactKind, path: &Path, reason: impl Into<String>) -> Self {
        ArtifactError::Invalid {
            kind,
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactError::Read { kind, .. }
            | ArtifactError::Parse { kind, .. }
            | ArtifactError::Invalid { kind, .. } => *kind,
            ArtifactError::Torch { .. } => ArtifactKind::Model,
        }
    }
}

/// The model call itself went wrong. Only a broken artifact gets here.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model returned no output")]
    EmptyOutput,

    #[error("model returned non-finite value {0}")]
    NonFinite(f64),

    #[error("torch forward failed: {0}")]
    Torch(#[from] tch::TchError),
}

/// Reads and deserializes one JSON artifact.
pub(crate) fn read_json<T: DeserializeOwned>(kind: ArtifactKind, path: &Path) -> Result<T, ArtifactError> {
    let txt = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| ArtifactError::Parse {
        kind,
        path: path.to_path_buf(),
        source,
    })
}
