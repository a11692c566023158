use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "best_battery_health_model.pt";
pub const DEFAULT_SCALER_PATH: &str = "scaler.json";
pub const DEFAULT_ENCODERS_PATH: &str = "label_encoders.json";
pub const DEFAULT_PORT: u16 = 8080;

/// Startup settings, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub encoders_path: PathBuf,
    pub port: u16,
    /// Log raw and scaled rows for every request.
    pub log_pred: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            scaler_path: PathBuf::from(DEFAULT_SCALER_PATH),
            encoders_path: PathBuf::from(DEFAULT_ENCODERS_PATH),
            port: DEFAULT_PORT,
            log_pred: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with the variable source swapped out.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str, default: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            model_path: path("MODEL_PATH", DEFAULT_MODEL_PATH),
            scaler_path: path("SCALER_PATH", DEFAULT_SCALER_PATH),
            encoders_path: path("ENCODERS_PATH", DEFAULT_ENCODERS_PATH),
            port: get("PORT").and_then(|s| s.trim().parse().ok()).unwrap_or(DEFAULT_PORT),
            log_pred: get("LOG_PRED").as_deref() == Some("1"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn empty_env_gives_defaults() {
        assert_eq!(from(&[]), Config::default());
    }

    #[test]
    fn reads_paths_port_and_log_flag() {
        let c = from(&[
            ("MODEL_PATH", "/srv/m.pt"),
            ("SCALER_PATH", "/srv/s.json"),
            ("ENCODERS_PATH", "/srv/e.json"),
            ("PORT", "9000"),
            ("LOG_PRED", "1"),
        ]);
        assert_eq!(c.model_path, PathBuf::from("/srv/m.pt"));
        assert_eq!(c.scaler_path, PathBuf::from("/srv/s.json"));
        assert_eq!(c.encoders_path, PathBuf::from("/srv/e.json"));
        assert_eq!(c.port, 9000);
        assert!(c.log_pred);
    }

    #[test]
    fn bad_port_falls_back() {
        assert_eq!(from(&[("PORT", "eighty")]).port, DEFAULT_PORT);
        assert!(!from(&[("LOG_PRED", "yes")]).log_pred);
    }
}
