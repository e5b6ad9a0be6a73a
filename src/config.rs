use crate::error::{ResampleError, Result};
use crate::gap::GapTolerance;
use serde::{Deserialize, Serialize};

/// Resampling settings shared by the free-running and anchored modes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Target rate in samples per second
    pub sampling_rate: f64,

    /// Widest raw bracket (ms) that is interpolated across, 0 for no limit
    pub gap_tolerance: GapTolerance,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 20.0,
            gap_tolerance: GapTolerance::default(),
        }
    }
}

impl ResampleConfig {
    pub fn new(sampling_rate: f64, gap_tolerance_ms: u64) -> Self {
        Self {
            sampling_rate,
            gap_tolerance: GapTolerance::from_millis(gap_tolerance_ms),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sampling_rate.is_finite() || self.sampling_rate <= 0.0 {
            return Err(ResampleError::InvalidSamplingRate(self.sampling_rate));
        }
        Ok(())
    }

    /// Grid step in milliseconds
    pub fn step_ms(&self) -> f64 {
        1000.0 / self.sampling_rate
    }
}

/// Which sensors take part in a multi-sensor alignment and how they are resampled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    #[serde(flatten)]
    pub resample: ResampleConfig,

    /// Sensor whose cleaned grid every other sensor is resampled onto
    pub anchor_sensor: String,

    pub dependent_sensors: Vec<String>,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            resample: ResampleConfig::default(),
            anchor_sensor: "Accelerometer".to_string(),
            dependent_sensors: vec!["Gyroscope".to_string()],
        }
    }
}

impl AlignmentConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: AlignmentConfig = serde_json::from_str(json)?;
        config.resample.validate()?;
        Ok(config)
    }
}
