use serde::{Deserialize, Serialize};

/// Switches that shape how a property is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertySpec {
    /// Fairness variables `fr_<t>_<p>` are part of the encoding.
    pub fairness_on: bool,
    /// Use the abstract/concrete refinement strategy.
    pub multi_model: bool,
    /// Re-solve a found counterexample under its own path constraint.
    pub double_test: bool,
}

impl PropertySpec {
    pub fn with_fairness(mut self, on: bool) -> Self {
        self.fairness_on = on;
        self
    }

    pub fn with_multi_model(mut self, on: bool) -> Self {
        self.multi_model = on;
        self
    }

    pub fn with_double_test(mut self, on: bool) -> Self {
        self.double_test = on;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_off() {
        let spec: PropertySpec =
            serde_json::from_str(r#"{"fairness_on": true}"#).expect("valid spec document");
        assert_eq!(
            spec,
            PropertySpec {
                fairness_on: true,
                multi_model: false,
                double_test: false,
            }
        );
    }
}
