use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::parallel::ExecutionStrategy;

/// Floating point type used to sum the samples of a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulationPrecision {
    /// Accumulate in `f32`, faster but loses accuracy on long rays.
    F32,
    /// Accumulate in `f64`.
    #[default]
    F64,
}

/// Which voxels contribute to each output channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    /// One channel integrating the whole volume.
    #[default]
    Single,
    /// One channel per label, integrating only the voxels with that label.
    PerLabel(Vec<u16>),
}

impl ChannelMode {
    /// Number of output channels.
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelMode::Single => 1,
            ChannelMode::PerLabel(labels) => labels.len(),
        }
    }
}

/// Rendering options shared by every ray.
///
/// `start` and `stop` are fractions of the source-to-detector segment: `0`
/// is the source, `1` the detector plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Number of samples along each ray.
    pub n_samples: usize,
    /// Start of the marching interval.
    pub start: f64,
    /// End of the marching interval.
    pub stop: f64,
    /// Accumulator type.
    pub precision: AccumulationPrecision,
    /// Output channels.
    pub channels: ChannelMode,
    /// Distribution of rows over threads.
    pub strategy: ExecutionStrategy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            n_samples: 500,
            start: 0.0,
            stop: 1.0,
            precision: AccumulationPrecision::default(),
            channels: ChannelMode::default(),
            strategy: ExecutionStrategy::default(),
        }
    }
}

impl RenderConfig {
    /// Set the number of samples per ray.
    pub fn with_n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Set the marching interval.
    pub fn with_range(mut self, start: f64, stop: f64) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }

    /// Set the accumulator type.
    pub fn with_precision(mut self, precision: AccumulationPrecision) -> Self {
        self.precision = precision;
        self
    }

    /// Set the output channels.
    pub fn with_channels(mut self, channels: ChannelMode) -> Self {
        self.channels = channels;
        self
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check the sample count, the marching interval and the channels.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.n_samples < 2 {
            return Err(RenderError::InvalidSampleCount(self.n_samples));
        }
        let (start, stop) = (self.start, self.stop);
        if !(start.is_finite() && stop.is_finite() && start >= 0.0 && start < stop) {
            return Err(RenderError::InvalidMarchRange { start, stop });
        }
        if self.channels.num_channels() == 0 {
            return Err(RenderError::NoChannels);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() -> Result<(), RenderError> {
        let config = RenderConfig::default();
        config.validate()?;
        assert_eq!(config.n_samples, 500);
        assert_eq!((config.start, config.stop), (0.0, 1.0));
        assert_eq!(config.precision, AccumulationPrecision::F64);
        assert_eq!(config.channels.num_channels(), 1);
        assert_eq!(config.strategy, ExecutionStrategy::ParallelRows);
        Ok(())
    }

    #[test]
    fn invalid_config() {
        let config = RenderConfig::default();
        assert_eq!(
            config.clone().with_n_samples(1).validate(),
            Err(RenderError::InvalidSampleCount(1))
        );
        for (start, stop) in [(0.5, 0.5), (0.8, 0.2), (-0.1, 1.0), (0.0, f64::NAN)] {
            assert!(matches!(
                config.clone().with_range(start, stop).validate(),
                Err(RenderError::InvalidMarchRange { .. })
            ));
        }
        assert_eq!(
            config
                .with_channels(ChannelMode::PerLabel(vec![]))
                .validate(),
            Err(RenderError::NoChannels)
        );
    }

    #[test]
    fn serde_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let config = RenderConfig::default()
            .with_n_samples(64)
            .with_range(0.25, 0.75)
            .with_precision(AccumulationPrecision::F32)
            .with_channels(ChannelMode::PerLabel(vec![1, 3]))
            .with_strategy(ExecutionStrategy::Fixed(2));
        let json = serde_json::to_string(&config)?;
        let back: RenderConfig = serde_json::from_str(&json)?;
        assert_eq!(back, config);

        // missing fields fall back to the defaults
        let partial: RenderConfig = serde_json::from_str(r#"{"n_samples": 32}"#)?;
        assert_eq!(partial, RenderConfig::default().with_n_samples(32));
        Ok(())
    }
}
