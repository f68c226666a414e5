use std::path::PathBuf;

use thiserror::Error;

/// A configuration that cannot be turned into a working pipeline.
///
/// Raised while loading; a pipeline is never built from a configuration that
/// produced one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no configuration file found, searched {0:?}")]
    NotFound(Vec<PathBuf>),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("environment variable {name}={value:?} is not a number")]
    InvalidEnv { name: &'static str, value: String },

    #[error("variable `{0}` is declared twice")]
    DuplicateVariable(String),
    #[error("variable `{variable}` has an empty or non-finite domain [{min}, {max}]")]
    InvalidDomain { variable: String, min: f64, max: f64 },
    #[error("variable `{variable}` has a sampling step of {step}, expected a positive step within 100000 samples")]
    InvalidStep { variable: String, step: f64 },
    #[error("variable `{0}` declares no terms")]
    NoTerms(String),
    #[error("variable `{0}` declares both explicit terms and a partition")]
    ConflictingTerms(String),
    #[error("term `{label}` of `{variable}` has breakpoints {points:?}, expected finite non-decreasing values")]
    InvalidShape {
        variable: String,
        label: String,
        points: Vec<f64>,
    },
    #[error("variable `{variable}` declares term `{label}` twice")]
    DuplicateTerm { variable: String, label: String },
    #[error("variable `{variable}` is missing term `{label}`")]
    MissingTerm { variable: String, label: String },
    #[error("variable `{variable}` has no term `{label}`")]
    UnknownTerm { variable: String, label: String },
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("variable `{variable}` has domain {found:?}, expected {expected:?}")]
    FixedDomain {
        variable: String,
        expected: [f64; 2],
        found: [f64; 2],
    },
    #[error("variable `{variable}` has domain [{min}, {max}], expected one symmetric around 0")]
    AsymmetricDomain { variable: String, min: f64, max: f64 },

    #[error("rule base `{0}` has no rules")]
    NoRules(String),
    #[error("rule {rule} of `{rule_base}` has an empty antecedent")]
    EmptyAntecedent { rule_base: String, rule: usize },
    #[error("rule {rule} of `{rule_base}` has weight {weight}, expected a value in (0, 1]")]
    InvalidWeight { rule_base: String, rule: usize, weight: f64 },
    #[error("rule {rule} of `{rule_base}` concludes on `{variable}` instead of the output variable `{output}`")]
    ConsequentMismatch {
        rule_base: String,
        rule: usize,
        variable: String,
        output: String,
    },
    #[error("rule {rule} of `{rule_base}` negates its consequent")]
    NegatedConsequent { rule_base: String, rule: usize },
    #[error("rule {rule} of `{rule_base}` uses the output variable `{variable}` as an input")]
    OutputInAntecedent {
        rule_base: String,
        rule: usize,
        variable: String,
    },
    #[error("rule base `{rule_base}` reads `{variable}`, which this stage does not supply")]
    UnsuppliedInput { rule_base: String, variable: String },

    #[error("occupancy threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),
    #[error("comfort target {0} is not a finite temperature")]
    InvalidTarget(f64),
    #[error("comfort tolerance {0} must be finite and non-negative")]
    InvalidTolerance(f64),
}

/// A per-request input that cannot be evaluated.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("reading is missing `{0}`")]
    MissingField(&'static str),
    #[error("reading field `{field}` is not a finite number: {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("no crisp value supplied for input variable `{0}`")]
    MissingInput(String),
    #[error("crisp value for `{variable}` is not a finite number: {value}")]
    NonFiniteInput { variable: String, value: f64 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
