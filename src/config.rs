//! Runtime configuration for the query service and the simulated remote store.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Where the filter predicate is evaluated relative to projection/expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterStage {
    /// Filter the shaped views; fields removed by `$select` are unknown to the
    /// filter and expanded relations are visible to it
    #[default]
    AfterShaping,
    /// Filter the full source records, then shape the survivors
    BeforeShaping,
}

impl FromStr for FilterStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "after-shaping" => Ok(FilterStage::AfterShaping),
            "before-shaping" => Ok(FilterStage::BeforeShaping),
            other => Err(format!(
                "unknown filter stage '{}', expected after-shaping or before-shaping",
                other
            )),
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::AfterShaping => f.write_str("after-shaping"),
            FilterStage::BeforeShaping => f.write_str("before-shaping"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryConfig {
    pub filter_stage: FilterStage,
}

impl QueryConfig {
    pub fn new(filter_stage: FilterStage) -> Self {
        Self { filter_stage }
    }
}

/// Cost model for calls to a simulated remote collection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RemoteProfile {
    latency: Duration,
    /// Probability in `[0, 1]` that a call fails
    failure_rate: f64,
}

impl RemoteProfile {
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        Self {
            latency,
            failure_rate: if failure_rate.is_nan() {
                0.0
            } else {
                failure_rate.clamp(0.0, 1.0)
            },
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    pub fn is_transparent(&self) -> bool {
        self.latency.is_zero() && self.failure_rate == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_stage_parse() {
        assert_eq!("after-shaping".parse::<FilterStage>(), Ok(FilterStage::AfterShaping));
        assert_eq!("before-shaping".parse::<FilterStage>(), Ok(FilterStage::BeforeShaping));
        assert!("early".parse::<FilterStage>().is_err());
        assert_eq!(FilterStage::default(), FilterStage::AfterShaping);
        assert_eq!(FilterStage::BeforeShaping.to_string(), "before-shaping");
    }

    #[test]
    fn test_remote_profile_clamps() {
        assert_eq!(RemoteProfile::new(Duration::ZERO, 1.5).failure_rate(), 1.0);
        assert_eq!(RemoteProfile::new(Duration::ZERO, -1.0).failure_rate(), 0.0);
        assert_eq!(RemoteProfile::new(Duration::ZERO, f64::NAN).failure_rate(), 0.0);
        assert_eq!(
            RemoteProfile::new(Duration::ZERO, f64::INFINITY).failure_rate(),
            1.0
        );
        assert_eq!(RemoteProfile::default().failure_rate(), 0.0);
        assert!(RemoteProfile::default().is_transparent());
        assert!(!RemoteProfile::new(Duration::from_millis(5), 0.0).is_transparent());
    }
}
