use std::collections::HashMap;

use crate::variable::{Variable, VariableKey};

/// Crisp values for one inference, keyed by variable.
#[derive(Clone, Debug, Default)]
pub struct Inputs(pub(crate) HashMap<VariableKey, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    pub fn add<L>(&mut self, var: Variable<L>, val: f64) {
        self.0.insert(var.0, val);
    }

    pub fn with<L>(mut self, var: Variable<L>, val: f64) -> Self {
        self.add(var, val);
        self
    }

    pub fn get(&self, key: VariableKey) -> Option<f64> {
        self.0.get(&key).copied()
    }
}
