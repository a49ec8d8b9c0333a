use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::debug;
use z3::SatResult as Z3SatResult;

use crate::formula::Formula;
use crate::solver::{Literal, Model, SatOracle, SatResult};

#[derive(Debug, Error)]
pub enum Z3Error {
    #[error("Z3 error: {0}")]
    Internal(String),
}

/// SAT oracle backed by a Z3 solver instance.
///
/// Variables are declared on first use. After a `Sat` answer the model
/// holds one literal for every variable asserted since the last reset.
pub struct Z3Oracle {
    solver: z3::Solver,
    vars: BTreeMap<String, z3::ast::Bool>,
    model: Option<Model>,
    _params: Option<z3::Params>,
}

impl Z3Oracle {
    pub fn new() -> Self {
        Self {
            solver: z3::Solver::new(),
            vars: BTreeMap::new(),
            model: None,
            _params: None,
        }
    }

    /// Per-query timeout; a query that runs out answers `Unknown`.
    pub fn with_timeout_secs(timeout_secs: u64) -> Self {
        if timeout_secs == 0 {
            return Self::new();
        }
        let solver = z3::Solver::new();
        let mut params = z3::Params::new();
        let timeout_ms = timeout_secs.saturating_mul(1000).min(u32::MAX as u64) as u32;
        params.set_u32("timeout", timeout_ms);
        solver.set_params(&params);
        Self {
            solver,
            vars: BTreeMap::new(),
            model: None,
            _params: Some(params),
        }
    }

    fn var(&mut self, name: &str) -> z3::ast::Bool {
        self.vars
            .entry(name.to_string())
            .or_insert_with(|| z3::ast::Bool::new_const(name))
            .clone()
    }

    fn translate(&mut self, formula: &Formula) -> z3::ast::Bool {
        match formula {
            Formula::Const(b) => z3::ast::Bool::from_bool(*b),
            Formula::Lit(lit) => {
                let v = self.var(lit.name());
                if lit.polarity() {
                    v
                } else {
                    v.not()
                }
            }
            Formula::And(parts) => {
                let bools: Vec<z3::ast::Bool> = parts.iter().map(|p| self.translate(p)).collect();
                let refs: Vec<&z3::ast::Bool> = bools.iter().collect();
                z3::ast::Bool::and(&refs)
            }
            Formula::Or(parts) => {
                let bools: Vec<z3::ast::Bool> = parts.iter().map(|p| self.translate(p)).collect();
                let refs: Vec<&z3::ast::Bool> = bools.iter().collect();
                z3::ast::Bool::or(&refs)
            }
            Formula::Not(inner) => self.translate(inner).not(),
            Formula::Implies(lhs, rhs) => {
                let l = self.translate(lhs);
                let r = self.translate(rhs);
                l.implies(&r)
            }
        }
    }

    fn extract_model(&self) -> Result<Model, Z3Error> {
        let z3_model = self
            .solver
            .get_model()
            .ok_or_else(|| Z3Error::Internal("SAT but no model available".into()))?;
        let mut literals = BTreeSet::new();
        for (name, var) in &self.vars {
            let value = z3_model
                .eval::<z3::ast::Bool>(var, true)
                .and_then(|v| v.as_bool())
                .ok_or_else(|| Z3Error::Internal(format!("no value for {name}")))?;
            literals.insert(Literal::new(name.clone(), value));
        }
        Ok(Model::new(literals))
    }
}

impl Default for Z3Oracle {
    fn default() -> Self {
        Self::new()
    }
}

impl SatOracle for Z3Oracle {
    type Error = Z3Error;

    fn assert(&mut self, formula: &Formula) -> Result<(), Z3Error> {
        let term = self.translate(formula);
        self.solver.assert(&term);
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, Z3Error> {
        self.model = None;
        match self.solver.check() {
            Z3SatResult::Sat => {
                let model = self.extract_model()?;
                debug!(literals = model.len(), "Z3: SAT");
                self.model = Some(model);
                Ok(SatResult::Sat)
            }
            Z3SatResult::Unsat => Ok(SatResult::Unsat),
            Z3SatResult::Unknown => Ok(SatResult::Unknown(
                self.solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "Z3 returned unknown".into()),
            )),
        }
    }

    fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn reset(&mut self) -> Result<(), Z3Error> {
        self.solver.reset();
        // Z3 may drop per-solver parameters on reset; reapply timeout if configured.
        if let Some(params) = &self._params {
            self.solver.set_params(params);
        }
        self.vars.clear();
        self.model = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn z3_basic_sat_with_model() -> TestResult {
        let mut oracle = Z3Oracle::new();
        oracle.assert(&Formula::var("a").and(Formula::lit("b", false)))?;
        assert_eq!(oracle.check_sat()?, SatResult::Sat);

        let model = oracle
            .model()
            .ok_or_else(|| std::io::Error::other("expected model after SAT"))?;
        assert!(model.is_true("a"));
        assert!(model.is_false("b"));
        Ok(())
    }

    #[test]
    fn z3_basic_unsat() -> TestResult {
        let mut oracle = Z3Oracle::new();
        oracle.assert(&Formula::var("a").and(Formula::lit("a", false)))?;
        assert_eq!(oracle.check_sat()?, SatResult::Unsat);
        assert!(oracle.model().is_none());
        Ok(())
    }

    #[test]
    fn z3_reset_drops_assertions() -> TestResult {
        let mut oracle = Z3Oracle::with_timeout_secs(2);
        oracle.assert(&Formula::falsum())?;
        assert_eq!(oracle.check_sat()?, SatResult::Unsat);

        oracle.reset()?;
        assert_eq!(
            oracle.check_conjunction(&[Formula::var("x"), Formula::var("unknown")])?,
            SatResult::Sat
        );
        assert!(
            oracle._params.is_some(),
            "timeout parameters should still be available after reset()"
        );
        Ok(())
    }

    #[test]
    fn z3_implication_forces_value() -> TestResult {
        let mut oracle = Z3Oracle::new();
        let result = oracle.check_conjunction(&[
            Formula::var("p").implies(Formula::lit("n_0_0_0", false)),
            Formula::var("p"),
        ])?;
        assert_eq!(result, SatResult::Sat);
        let model = oracle
            .model()
            .ok_or_else(|| std::io::Error::other("expected model after SAT"))?;
        assert!(model.is_false("n_0_0_0"));
        Ok(())
    }
}
