//! Run configuration
//!
//! A [`TrackerConfig`] fully determines a run together with the trajectory
//! source: sensor parameters, filter tuning, gate size, association method
//! and the simulation seed.

use ::core::fmt;
use ::core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::models::MAX_CLUTTER_RATE;
use crate::types::spaces::Point2;

/// Data-association strategy selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationMethod {
    /// Closest gated measurement
    #[serde(rename = "NN")]
    NearestNeighbor,
    /// Likelihood-weighted fusion of all gated measurements
    #[serde(rename = "PDA")]
    Probabilistic,
}

impl AssociationMethod {
    /// Short wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationMethod::NearestNeighbor => "NN",
            AssociationMethod::Probabilistic => "PDA",
        }
    }
}

impl fmt::Display for AssociationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssociationMethod {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "NN" => Ok(AssociationMethod::NearestNeighbor),
            "PDA" => Ok(AssociationMethod::Probabilistic),
            _ => Err(TrackerError::config(format!(
                "unknown association method {s:?}, expected NN or PDA"
            ))),
        }
    }
}

fn default_seed() -> u64 {
    42
}

fn default_map_size() -> f64 {
    2500.0
}

fn default_dt() -> f64 {
    1.0
}

/// Parameters of one tracking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Number of targets to track, taken from the front of the trajectory set
    pub num_objects: usize,
    /// NN or PDA
    pub association_method: AssociationMethod,
    /// Radar noise standard deviation at `range_ref`
    pub sigma_base: f64,
    /// Reference range of the noise model
    pub range_ref: f64,
    /// Expected clutter points per frame
    pub lambda_clutter: f64,
    /// Euclidean gate radius
    pub gate_threshold: f64,
    /// Constant-velocity process noise coefficient
    pub process_noise: f64,
    /// Per-axis measurement variance assumed by the filter
    pub measurement_noise: f64,
    /// Maximum detection range
    pub max_range: f64,
    /// Seed for the frame simulation
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Clutter is drawn uniformly in `[-map_size, map_size]²`
    #[serde(default = "default_map_size")]
    pub map_size: f64,
    /// Time between frames
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Radar position
    #[serde(default)]
    pub radar_origin: Point2,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            num_objects: 3,
            association_method: AssociationMethod::NearestNeighbor,
            sigma_base: 45.0,
            range_ref: 5000.0,
            lambda_clutter: 25.0,
            gate_threshold: 40.0,
            process_noise: 1.0,
            measurement_noise: 30.0,
            max_range: 10_000.0,
            seed: default_seed(),
            map_size: default_map_size(),
            dt: default_dt(),
            radar_origin: [0.0, 0.0],
        }
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrackerError::config(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

impl TrackerConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// Missing required fields, unknown association methods and malformed
    /// JSON are all reported as [`TrackerError::Configuration`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TrackerError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field independently of any trajectory set.
    pub fn validate(&self) -> Result<()> {
        if self.num_objects == 0 {
            return Err(TrackerError::config("num_objects must be at least 1"));
        }
        require_positive("sigma_base", self.sigma_base)?;
        require_positive("range_ref", self.range_ref)?;
        require_positive("lambda_clutter", self.lambda_clutter)?;
        if self.lambda_clutter > MAX_CLUTTER_RATE {
            return Err(TrackerError::config(format!(
                "lambda_clutter must be at most {MAX_CLUTTER_RATE}, got {}",
                self.lambda_clutter
            )));
        }
        require_positive("gate_threshold", self.gate_threshold)?;
        require_positive("process_noise", self.process_noise)?;
        require_positive("measurement_noise", self.measurement_noise)?;
        require_positive("max_range", self.max_range)?;
        require_positive("map_size", self.map_size)?;
        require_positive("dt", self.dt)?;
        if !self.radar_origin.iter().all(|v| v.is_finite()) {
            return Err(TrackerError::config("radar_origin must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "num_objects": 2,
        "association_method": "PDA",
        "sigma_base": 45.0,
        "range_ref": 5000.0,
        "lambda_clutter": 10.0,
        "gate_threshold": 40.0,
        "process_noise": 1.0,
        "measurement_noise": 30.0,
        "max_range": 10000.0
    }"#;

    #[test]
    fn test_from_json_fills_defaults() {
        let config = TrackerConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.num_objects, 2);
        assert_eq!(config.association_method, AssociationMethod::Probabilistic);
        assert_eq!(config.seed, 42);
        assert_eq!(config.map_size, 2500.0);
        assert_eq!(config.dt, 1.0);
        assert_eq!(config.radar_origin, [0.0, 0.0]);
    }

    #[test]
    fn test_missing_field_is_configuration_error() {
        let json = r#"{ "num_objects": 2, "association_method": "NN" }"#;
        assert!(matches!(
            TrackerConfig::from_json(json),
            Err(TrackerError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_method_rejected() {
        let json = MINIMAL.replace("\"PDA\"", "\"JPDA\"");
        assert!(TrackerConfig::from_json(&json).is_err());
        assert!("jpda".parse::<AssociationMethod>().is_err());
        assert_eq!(
            "pda".parse::<AssociationMethod>().unwrap(),
            AssociationMethod::Probabilistic
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = TrackerConfig::default();
        assert!(config.validate().is_ok());

        config.num_objects = 0;
        assert!(config.validate().is_err());

        let config = TrackerConfig {
            gate_threshold: -1.0,
            ..TrackerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gate_threshold"));

        let config = TrackerConfig {
            measurement_noise: f64::NAN,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unbounded_clutter_rate() {
        let config = TrackerConfig {
            lambda_clutter: MAX_CLUTTER_RATE,
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = TrackerConfig {
            lambda_clutter: 1.0e13,
            ..TrackerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TrackerError::Configuration(_)));
        assert!(err.to_string().contains("lambda_clutter"));
    }

    #[test]
    fn test_method_round_trips_through_json() {
        let config = TrackerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"association_method\":\"NN\""));
        assert_eq!(TrackerConfig::from_json(&json).unwrap(), config);
    }
}
