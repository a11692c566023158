use std::{collections::BTreeMap, collections::HashMap, path::Path};

use crate::error::{read_json, ArtifactError, ArtifactKind};
use crate::scaler::Scaler;
use crate::types::{overheating_code, FeatureVector, Field, InputRecord, FEATURE_COUNT, FEATURE_ORDER};

/// Label-to-code table of one categorical column.
///
/// Codes are positions in the ordered class list, so the first known label
/// doubles as the fallback for labels never seen in training.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEncoding {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl CategoryEncoding {
    pub fn new(classes: Vec<String>) -> Result<Self, String> {
        if classes.is_empty() {
            return Err("no known categories".to_string());
        }
        let mut codes = HashMap::with_capacity(classes.len());
        for (i, label) in classes.iter().enumerate() {
            if codes.insert(label.clone(), i as u32).is_some() {
                return Err(format!("duplicate category {:?}", label));
            }
        }
        Ok(Self { classes, codes })
    }

    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    pub fn fallback_code(&self) -> u32 {
        0
    }

    pub fn fallback_label(&self) -> &str {
        &self.classes[0]
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Code of `value`, or the fallback code when `value` is unknown. Never fails.
pub fn lookup_with_fallback(encoding: &CategoryEncoding, value: &str) -> u32 {
    encoding.code(value).unwrap_or_else(|| encoding.fallback_code())
}

/// Encodings for every categorical column, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEncodings {
    brand: CategoryEncoding,
    os: CategoryEncoding,
    usage_type: CategoryEncoding,
}

impl CategoryEncodings {
    pub fn new(brand: CategoryEncoding, os: CategoryEncoding, usage_type: CategoryEncoding) -> Self {
        Self { brand, os, usage_type }
    }

    /// Reads `{"brand": [...], "os": [...], "usage_type": [...]}`.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw: BTreeMap<String, Vec<String>> = read_json(ArtifactKind::Encodings, path)?;
        let encodings =
            Self::from_classes(raw).map_err(|r| ArtifactError::invalid(ArtifactKind::Encodings, path, r))?;
        tracing::info!(
            "loaded label encodings from {}: brand[{}] os[{}] usage_type[{}]",
            path.display(),
            encodings.brand.classes.len(),
            encodings.os.classes.len(),
            encodings.usage_type.classes.len()
        );
        Ok(encodings)
    }

    pub fn from_classes(mut raw: BTreeMap<String, Vec<String>>) -> Result<Self, String> {
        let mut take = |field: Field| -> Result<CategoryEncoding, String> {
            let classes = raw
                .remove(field.name())
                .ok_or_else(|| format!("missing encoder for {}", field.name()))?;
            CategoryEncoding::new(classes).map_err(|e| format!("{}: {}", field.name(), e))
        };
        let brand = take(Field::Brand)?;
        let os = take(Field::Os)?;
        let usage_type = take(Field::UsageType)?;

        for key in raw.keys() {
            match Field::from_name(key) {
                Some(f) if !f.is_categorical() => {
                    tracing::warn!("ignoring encoder for non-categorical column {}", key)
                }
                _ => tracing::warn!("ignoring encoder for unknown column {}", key),
            }
        }
        Ok(Self::new(brand, os, usage_type))
    }

    pub fn get(&self, field: Field) -> Option<&CategoryEncoding> {
        match field {
            Field::Brand => Some(&self.brand),
            Field::Os => Some(&self.os),
            Field::UsageType => Some(&self.usage_type),
            _ => None,
        }
    }
}

fn categorical_code(enc: &CategoryEncoding, field: Field, value: &str) -> f64 {
    if enc.code(value).is_none() {
        tracing::debug!(
            "unknown {} {:?}; substituting {:?}",
            field.name(),
            value,
            enc.fallback_label()
        );
    }
    lookup_with_fallback(enc, value) as f64
}

/// Unscaled model row, built by walking `FEATURE_ORDER`.
pub fn raw_row(record: &InputRecord, encodings: &CategoryEncodings) -> [f64; FEATURE_COUNT] {
    let mut row = [0.0; FEATURE_COUNT];
    for field in FEATURE_ORDER {
        row[field.index()] = match field {
            Field::Brand => categorical_code(&encodings.brand, field, &record.brand),
            Field::Os => categorical_code(&encodings.os, field, &record.operating_system),
            Field::UsageType => categorical_code(&encodings.usage_type, field, &record.usage_type),
            Field::OverheatingIssues => overheating_code(record.overheating_issues),
            Field::ModelYear => record.model_year as f64,
            Field::DailyUsageHours => record.daily_usage_hours as f64,
            Field::ChargingCycles => record.charging_cycles as f64,
            Field::AvgChargeLimitPercent => record.avg_charge_limit_percent as f64,
            Field::BatteryAgeMonths => record.battery_age_months as f64,
            Field::PerformanceRating => record.performance_rating as f64,
        };
    }
    row
}

/// Encodes and scales one record into the model's input vector.
pub fn encode(record: &InputRecord, encodings: &CategoryEncodings, scaler: &dyn Scaler) -> FeatureVector {
    FeatureVector(scaler.transform(&raw_row(record, encodings)))
}
