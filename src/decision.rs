use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What the HVAC unit should do this cycle.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HvacAction {
    HeatOn,
    CoolOn,
    Idle,
    Off,
}

impl HvacAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HeatOn => "HEAT_ON",
            Self::CoolOn => "COOL_ON",
            Self::Idle => "IDLE",
            Self::Off => "OFF",
        }
    }

    /// One line of plain text for operators.
    pub fn describe(self) -> &'static str {
        match self {
            Self::HeatOn => "Room is occupied and heading below the comfort band: heating.",
            Self::CoolOn => "Room is occupied and heading above the comfort band: cooling.",
            Self::Idle => "Room is occupied and will stay within the comfort band: holding.",
            Self::Off => "Room is likely empty: switched off.",
        }
    }
}

impl fmt::Display for HvacAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive temperature range, in °C, that needs neither heating nor cooling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ComfortBand {
    pub low: f64,
    pub high: f64,
}

impl ComfortBand {
    pub fn around(target: f64, tolerance: f64) -> Self {
        Self {
            low: target - tolerance,
            high: target + tolerance,
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        self.low <= t && t <= self.high
    }
}

/// Decision parameters. In TOML this is the `[decision]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecisionConfig {
    /// Likelihood at or above which the room counts as occupied
    pub occupancy_threshold: f64,
    /// Centre of the comfort band in °C
    pub comfort_target: f64,
    /// Half-width of the comfort band in °C
    pub comfort_tolerance: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            occupancy_threshold: 0.5,
            comfort_target: 21.,
            comfort_tolerance: 0.5,
        }
    }
}

impl DecisionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0. ..=1.).contains(&self.occupancy_threshold) {
            return Err(ConfigError::InvalidThreshold(self.occupancy_threshold));
        }

        if !self.comfort_target.is_finite() {
            return Err(ConfigError::InvalidTarget(self.comfort_target));
        }

        if !(self.comfort_tolerance.is_finite() && self.comfort_tolerance >= 0.) {
            return Err(ConfigError::InvalidTolerance(self.comfort_tolerance));
        }

        Ok(())
    }
}

/// Crisp mapping from occupancy and forecast temperature to an action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecisionLayer {
    threshold: f64,
    band: ComfortBand,
}

impl DecisionLayer {
    pub fn new(config: &DecisionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            threshold: config.occupancy_threshold,
            band: ComfortBand::around(config.comfort_target, config.comfort_tolerance),
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn band(&self) -> ComfortBand {
        self.band
    }

    /// Defined for every input. An occupancy that is not a number never reaches
    /// the threshold, and a `t_future` that is not a number lands in the band.
    pub fn decide(&self, occupancy: f64, t_future: f64) -> HvacAction {
        if !(occupancy >= self.threshold) {
            HvacAction::Off
        } else if t_future < self.band.low {
            HvacAction::HeatOn
        } else if t_future > self.band.high {
            HvacAction::CoolOn
        } else {
            HvacAction::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> DecisionLayer {
        DecisionLayer::new(&DecisionConfig::default()).unwrap()
    }

    #[test]
    fn test_decision_table() {
        let layer = layer();

        assert_eq!(layer.decide(0.9, 18.), HvacAction::HeatOn);
        assert_eq!(layer.decide(0.9, 25.), HvacAction::CoolOn);
        assert_eq!(layer.decide(0.9, 21.), HvacAction::Idle);
        assert_eq!(layer.decide(0.1, 18.), HvacAction::Off);
        assert_eq!(layer.decide(0.1, 25.), HvacAction::Off);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let layer = layer();

        assert_eq!(layer.decide(0.5, 18.), HvacAction::HeatOn);
        assert_eq!(layer.decide(0.499_999, 18.), HvacAction::Off);
        assert_eq!(layer.decide(1., 20.5), HvacAction::Idle);
        assert_eq!(layer.decide(1., 21.5), HvacAction::Idle);
        assert_eq!(layer.decide(1., 20.499), HvacAction::HeatOn);
        assert_eq!(layer.decide(1., 21.501), HvacAction::CoolOn);
    }

    #[test]
    fn test_total() {
        let layer = layer();

        assert_eq!(layer.decide(f64::NAN, 18.), HvacAction::Off);
        assert_eq!(layer.decide(1., f64::NAN), HvacAction::Idle);
        assert_eq!(layer.decide(1., f64::NEG_INFINITY), HvacAction::HeatOn);
        assert_eq!(layer.decide(f64::INFINITY, f64::INFINITY), HvacAction::CoolOn);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let threshold = DecisionConfig {
            occupancy_threshold: 1.5,
            ..Default::default()
        };
        let target = DecisionConfig {
            comfort_target: f64::NAN,
            ..Default::default()
        };
        let tolerance = DecisionConfig {
            comfort_tolerance: -1.,
            ..Default::default()
        };

        assert!(matches!(DecisionLayer::new(&threshold), Err(ConfigError::InvalidThreshold(t)) if t == 1.5));
        assert!(matches!(DecisionLayer::new(&target), Err(ConfigError::InvalidTarget(_))));
        assert!(matches!(DecisionLayer::new(&tolerance), Err(ConfigError::InvalidTolerance(_))));
    }

    #[test]
    fn test_action_names() {
        assert_eq!(HvacAction::HeatOn.to_string(), "HEAT_ON");
        assert_eq!(HvacAction::Off.as_str(), "OFF");
        assert!(HvacAction::CoolOn.describe().contains("cooling"));
        assert_eq!(ComfortBand::around(21., 0.5), ComfortBand { low: 20.5, high: 21.5 });
        assert!(ComfortBand::around(21., 0.).contains(21.));
    }
}
