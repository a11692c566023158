use serde::{Deserialize, Deserializer, Serialize};

// ---------- Feature layout ----------

pub const FEATURE_COUNT: usize = 10;

/// Columns of the model input, named as they were at training time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Brand,
    ModelYear,
    Os,
    UsageType,
    DailyUsageHours,
    ChargingCycles,
    AvgChargeLimitPercent,
    BatteryAgeMonths,
    OverheatingIssues,
    PerformanceRating,
}

/// Authoritative column order shared by the encoder, the scaler and the model.
pub const FEATURE_ORDER: [Field; FEATURE_COUNT] = [
    Field::Brand,
    Field::ModelYear,
    Field::Os,
    Field::UsageType,
    Field::DailyUsageHours,
    Field::ChargingCycles,
    Field::AvgChargeLimitPercent,
    Field::BatteryAgeMonths,
    Field::OverheatingIssues,
    Field::PerformanceRating,
];

/// Fields that go through a category encoding.
pub const CATEGORICAL_FIELDS: [Field; 3] = [Field::Brand, Field::Os, Field::UsageType];

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Brand => "brand",
            Field::ModelYear => "model_year",
            Field::Os => "os",
            Field::UsageType => "usage_type",
            Field::DailyUsageHours => "daily_usage_hours",
            Field::ChargingCycles => "charging_cycles",
            Field::AvgChargeLimitPercent => "avg_charge_limit_percent",
            Field::BatteryAgeMonths => "battery_age_months",
            Field::OverheatingIssues => "overheating_issues",
            Field::PerformanceRating => "performance_rating",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        FEATURE_ORDER.iter().copied().find(|f| f.name() == name)
    }

    pub fn index(self) -> usize {
        // variants are declared in FEATURE_ORDER order
        self as usize
    }

    pub fn is_categorical(self) -> bool {
        CATEGORICAL_FIELDS.contains(&self)
    }
}

// ---------- Input form ----------

/// Inclusive range and default of an integer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl Bounds {
    const fn new(min: i64, max: i64, default: i64) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, v: i64) -> i64 {
        v.clamp(self.min, self.max)
    }
}

pub const MODEL_YEAR: Bounds = Bounds::new(2015, 2025, 2022);
pub const DAILY_USAGE_HOURS: Bounds = Bounds::new(1, 15, 5);
pub const CHARGING_CYCLES: Bounds = Bounds::new(50, 2000, 300);
pub const AVG_CHARGE_LIMIT_PERCENT: Bounds = Bounds::new(50, 100, 80);
pub const BATTERY_AGE_MONTHS: Bounds = Bounds::new(1, 60, 24);
pub const PERFORMANCE_RATING: Bounds = Bounds::new(1, 5, 4);

pub const NUMERIC_BOUNDS: [(Field, Bounds); 6] = [
    (Field::ModelYear, MODEL_YEAR),
    (Field::DailyUsageHours, DAILY_USAGE_HOURS),
    (Field::ChargingCycles, CHARGING_CYCLES),
    (Field::AvgChargeLimitPercent, AVG_CHARGE_LIMIT_PERCENT),
    (Field::BatteryAgeMonths, BATTERY_AGE_MONTHS),
    (Field::PerformanceRating, PERFORMANCE_RATING),
];

// display options; the encoder's known set comes from the encodings artifact
pub const BRAND_OPTIONS: [&str; 5] = ["Dell", "HP", "Lenovo", "Asus", "Apple"];
pub const OS_OPTIONS: [&str; 3] = ["Windows", "Linux", "macOS"];
pub const USAGE_TYPE_OPTIONS: [&str; 4] = ["Office", "Gaming", "Student", "Business"];
pub const OVERHEATING_OPTIONS: [&str; 2] = ["No", "Yes"];

/// One laptop as entered by the user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputRecord {
    pub brand: String,
    #[serde(rename = "os", alias = "operating_system")]
    pub operating_system: String,
    pub usage_type: String,
    pub model_year: i64,
    pub daily_usage_hours: i64,
    pub charging_cycles: i64,
    pub avg_charge_limit_percent: i64,
    pub battery_age_months: i64,
    #[serde(deserialize_with = "yes_no")]
    pub overheating_issues: bool,
    pub performance_rating: i64,
}

impl Default for InputRecord {
    fn default() -> Self {
        Self {
            brand: BRAND_OPTIONS[0].to_string(),
            operating_system: OS_OPTIONS[0].to_string(),
            usage_type: USAGE_TYPE_OPTIONS[0].to_string(),
            model_year: MODEL_YEAR.default,
            daily_usage_hours: DAILY_USAGE_HOURS.default,
            charging_cycles: CHARGING_CYCLES.default,
            avg_charge_limit_percent: AVG_CHARGE_LIMIT_PERCENT.default,
            battery_age_months: BATTERY_AGE_MONTHS.default,
            overheating_issues: false,
            performance_rating: PERFORMANCE_RATING.default,
        }
    }
}

impl InputRecord {
    /// Pulls every numeric field into its declared range.
    pub fn clamped(mut self) -> Self {
        self.model_year = MODEL_YEAR.clamp(self.model_year);
        self.daily_usage_hours = DAILY_USAGE_HOURS.clamp(self.daily_usage_hours);
        self.charging_cycles = CHARGING_CYCLES.clamp(self.charging_cycles);
        self.avg_charge_limit_percent = AVG_CHARGE_LIMIT_PERCENT.clamp(self.avg_charge_limit_percent);
        self.battery_age_months = BATTERY_AGE_MONTHS.clamp(self.battery_age_months);
        self.performance_rating = PERFORMANCE_RATING.clamp(self.performance_rating);
        self
    }
}

/// "Yes" is 1, "No" is 0.
pub fn overheating_code(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Only the exact label "Yes" counts as yes.
pub fn parse_yes_no(label: &str) -> bool {
    label == "Yes"
}

fn yes_no<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Label(String),
    }

    Ok(match Raw::deserialize(de)? {
        Raw::Flag(b) => b,
        Raw::Label(s) => parse_yes_no(&s),
    })
}

// ---------- Model input / output ----------

/// Scaled model input, laid out in `FEATURE_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn get(&self, field: Field) -> f64 {
        self.0[field.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Raw model output. Only `rounded`/`display` round; `raw` is canonical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub raw: f64,
}

impl PredictionResult {
    pub fn rounded(&self) -> f64 {
        // halves go to even, like the two-decimal round of the training stack
        (self.raw * 100.0).round_ties_even() / 100.0
    }

    pub fn display(&self) -> String {
        format!("{:.2} %", self.rounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_order_covers_every_field_once() {
        for (i, f) in FEATURE_ORDER.iter().enumerate() {
            assert_eq!(f.index(), i);
            assert_eq!(Field::from_name(f.name()), Some(*f));
        }
        assert_eq!(FEATURE_ORDER[0], Field::Brand);
        assert_eq!(FEATURE_ORDER[2], Field::Os);
        assert_eq!(FEATURE_ORDER[9], Field::PerformanceRating);
    }

    #[test]
    fn missing_fields_take_form_defaults() {
        let r: InputRecord = serde_json::from_str(r#"{"brand":"HP"}"#).unwrap();
        assert_eq!(r.brand, "HP");
        assert_eq!(r.operating_system, "Windows");
        assert_eq!(r.model_year, 2022);
        assert_eq!(r.charging_cycles, 300);
        assert!(!r.overheating_issues);
        assert_eq!(r.performance_rating, 4);
    }

    #[test]
    fn overheating_accepts_labels_and_bools() {
        let yes: InputRecord = serde_json::from_str(r#"{"overheating_issues":"Yes"}"#).unwrap();
        let no: InputRecord = serde_json::from_str(r#"{"overheating_issues":"No"}"#).unwrap();
        let flag: InputRecord = serde_json::from_str(r#"{"overheating_issues":true}"#).unwrap();
        let other: InputRecord = serde_json::from_str(r#"{"overheating_issues":"maybe"}"#).unwrap();
        assert!(yes.overheating_issues);
        assert!(!no.overheating_issues);
        assert!(flag.overheating_issues);
        assert!(!other.overheating_issues);

        for label in ["yes", "YES", " Yes ", "Yes "] {
            let body = serde_json::json!({ "overheating_issues": label });
            let r: InputRecord = serde_json::from_value(body).unwrap();
            assert!(!r.overheating_issues, "{:?} should decode as no", label);
        }
        assert_eq!(overheating_code(true), 1.0);
        assert_eq!(overheating_code(false), 0.0);
    }

    #[test]
    fn os_accepts_long_key() {
        let r: InputRecord = serde_json::from_str(r#"{"operating_system":"Linux"}"#).unwrap();
        assert_eq!(r.operating_system, "Linux");
    }

    #[test]
    fn clamped_pulls_values_into_range() {
        let r = InputRecord {
            model_year: 1999,
            daily_usage_hours: 40,
            charging_cycles: 10,
            avg_charge_limit_percent: 120,
            battery_age_months: 0,
            performance_rating: 9,
            ..InputRecord::default()
        }
        .clamped();
        assert_eq!(r.model_year, 2015);
        assert_eq!(r.daily_usage_hours, 15);
        assert_eq!(r.charging_cycles, 50);
        assert_eq!(r.avg_charge_limit_percent, 100);
        assert_eq!(r.battery_age_months, 1);
        assert_eq!(r.performance_rating, 5);

        let d = InputRecord::default();
        assert_eq!(d.clone().clamped(), d);
    }

    #[test]
    fn display_rounds_to_two_decimals() {
        let p = PredictionResult { raw: 87.456789 };
        assert_eq!(p.rounded(), 87.46);
        assert_eq!(p.display(), "87.46 %");
        assert_eq!(p.raw, 87.456789);
    }

    #[test]
    fn display_rounds_halves_to_even() {
        assert_eq!(PredictionResult { raw: 87.125 }.display(), "87.12 %");
        assert_eq!(PredictionResult { raw: 87.375 }.display(), "87.38 %");
        assert_eq!(PredictionResult { raw: 87.125 }.raw, 87.125);
    }
}
