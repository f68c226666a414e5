//! Pipeline configuration.
//!
//! Membership breakpoints, forecast rules and decision parameters are
//! calibration data and are always read from a TOML file; the crate ships no
//! built-in values for them.
//!
//! # Configuration file locations
//!
//! `HVAC_FUZZY_CONFIG` names the file to load. Without it the first existing
//! file wins:
//! 1. `./hvac-fuzzy.toml`
//! 2. `/etc/hvac-fuzzy/config.toml`
//!
//! # Environment variables
//!
//! - `HVAC_OCCUPANCY_THRESHOLD` overrides `decision.occupancy_threshold`
//! - `HVAC_COMFORT_TARGET` overrides `decision.comfort_target`
//! - `HVAC_COMFORT_TOLERANCE` overrides `decision.comfort_tolerance`
//!
//! # Example configuration
//!
//! ```toml
//! [variables.co2]
//! range = [300.0, 1000.0]
//! step = 5.0
//! terms.low = { trapezoidal = [300.0, 300.0, 350.0, 425.0] }
//! terms.medium = { triangular = [350.0, 425.0, 600.0] }
//! terms.high = { trapezoidal = [425.0, 600.0, 1000.0, 1000.0] }
//!
//! [variables.lighting]
//! range = [0.0, 100.0]
//! partition = ["dark", "dim", "bright"]
//!
//! # occupancy, indoor_temp, outdoor_temp and delta_t follow the same form
//!
//! [[forecast_rules]]
//! when = [{ variable = "outdoor_temp", is = "cold" }, { variable = "indoor_temp", is = "warm", not = true }]
//! then = "negative"
//! weight = 0.8
//!
//! [decision]
//! occupancy_threshold = 0.5
//! comfort_target = 21.0
//! comfort_tolerance = 0.5
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::decision::DecisionConfig;
use crate::dsl::{Antecedent, Clause};
use crate::error::ConfigError;
use crate::membership::MembershipShape;
use crate::ops::Connective;
use crate::rules::Rule;
use crate::terms::{Label, Terms};
use crate::variable::{Variable, VariableKey, Variables};

/// Names the configuration file to load.
pub const CONFIG_ENV: &str = "HVAC_FUZZY_CONFIG";
pub const THRESHOLD_ENV: &str = "HVAC_OCCUPANCY_THRESHOLD";
pub const TARGET_ENV: &str = "HVAC_COMFORT_TARGET";
pub const TOLERANCE_ENV: &str = "HVAC_COMFORT_TOLERANCE";

// ============================================================================
// Configuration Schema
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub variables: VariablesConfig,
    pub forecast_rules: Vec<RuleConfig>,
    #[serde(default)]
    pub decision: DecisionConfig,
}

/// One entry per pipeline variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariablesConfig {
    /// CO₂ concentration in ppm: `low`, `medium`, `high`
    pub co2: VariableConfig,
    /// Light level: `dark`, `dim`, `bright`
    pub lighting: VariableConfig,
    /// Occupancy likelihood over [0, 1]: `empty`, `doubtful`, `probable`, `occupied`
    pub occupancy: VariableConfig,
    /// Indoor temperature in °C: `cold`, `comfortable`, `warm`
    pub indoor_temp: VariableConfig,
    /// Outdoor temperature in °C: `cold`, `mild`, `warm`
    pub outdoor_temp: VariableConfig,
    /// Predicted temperature change in °C, symmetric around 0: `negative`, `zero`, `positive`
    pub delta_t: VariableConfig,
}

/// A variable's domain and terms.
///
/// Terms are given either explicitly as shapes or as a `partition`: label
/// names, left to right, spread evenly over the range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableConfig {
    pub range: [f64; 2],
    /// Sampling step of the domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub terms: IndexMap<String, MembershipShape>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partition: Vec<String>,
}

impl VariableConfig {
    /// Registers the variable under `name`; every label of `L` needs a shape.
    pub(crate) fn register<L: Label>(&self, vars: &mut Variables, name: &str) -> Result<Variable<L>, ConfigError> {
        let [min, max] = self.range;
        let terms = match (self.terms.is_empty(), self.partition.is_empty()) {
            (true, true) => return Err(ConfigError::NoTerms(name.to_owned())),
            (false, false) => return Err(ConfigError::ConflictingTerms(name.to_owned())),
            (false, true) => Terms::from_named(name, self.terms.iter().map(|(label, shape)| (label, *shape)))?,
            (true, false) => {
                let shapes = MembershipShape::partition(min, max, self.partition.len());

                Terms::from_named(name, self.partition.iter().zip(shapes))?
            },
        };

        vars.add(name, min..=max, terms, self.step)
    }
}

/// A forecast rule as written in configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub when: Vec<ClauseConfig>,
    /// How the `when` clauses combine
    #[serde(default)]
    pub operator: Connective,
    /// Label of the output variable
    pub then: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClauseConfig {
    pub variable: String,
    pub is: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not: bool,
}

impl RuleConfig {
    /// Resolves variable names against `vars`. Labels are checked when the
    /// rule joins a rule base.
    pub(crate) fn to_rule(&self, vars: &Variables, output: VariableKey) -> Result<Rule, ConfigError> {
        let clauses = self
            .when
            .iter()
            .map(|clause| {
                let key = vars
                    .lookup(&clause.variable)
                    .ok_or_else(|| ConfigError::UnknownVariable(clause.variable.clone()))?;

                Ok(Clause::new(key, clause.is.as_str(), clause.not))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let antecedent = Antecedent::new(self.operator, clauses);

        Ok(Rule::new(antecedent, Clause::new(output, self.then.as_str(), false)).with_weight(self.weight))
    }
}

// ============================================================================
// Loading
// ============================================================================

impl PipelineConfig {
    /// Loads from the first configuration file found, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let paths = Self::config_paths();
        let path = paths
            .iter()
            .find(|path| path.exists())
            .ok_or_else(|| ConfigError::NotFound(paths.clone()))?;
        let mut config = Self::load_from_file(path)?;

        config.apply_env_overrides()?;

        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;

        info!(path = %path.display(), "loading configuration");

        Self::load_from_str(&content)
    }

    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Candidate configuration files, in search order.
    pub fn config_paths() -> Vec<PathBuf> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => vec![PathBuf::from(path)],
            None => vec![PathBuf::from("hvac-fuzzy.toml"), PathBuf::from("/etc/hvac-fuzzy/config.toml")],
        }
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Applies overrides read through `lookup`, which maps a variable name to its value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let decision = &mut self.decision;

        for (name, field) in [
            (THRESHOLD_ENV, &mut decision.occupancy_threshold),
            (TARGET_ENV, &mut decision.comfort_target),
            (TOLERANCE_ENV, &mut decision.comfort_tolerance),
        ] {
            if let Some(value) = lookup(name) {
                *field = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv { name, value })?;
            }
        }

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
