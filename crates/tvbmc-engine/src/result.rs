use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tvbmc_sat::formula::Formula;

use crate::decoder::Path;

/// Classification of one bounded evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Both queries were satisfiable: a definite violation.
    Satisfiable,
    /// Only the `unknown` query was satisfiable: a possible violation.
    Unknown,
    /// No query was satisfiable up to the bound.
    NoErrorFound,
    /// The oracle or the run budget gave up; says nothing about the property.
    Inconclusive { reason: String },
}

impl Verdict {
    /// Stable machine-readable name of the variant.
    pub fn verdict_class(&self) -> &'static str {
        match self {
            Verdict::Satisfiable => "satisfiable",
            Verdict::Unknown => "unknown",
            Verdict::NoErrorFound => "no_error_found",
            Verdict::Inconclusive { .. } => "inconclusive",
        }
    }

    /// True for results the refinement loop can stop on.
    pub fn is_definite(&self) -> bool {
        matches!(self, Verdict::Satisfiable | Verdict::NoErrorFound)
    }
}

/// Result of one call to [`crate::evaluator::Evaluator::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationOutcome {
    pub verdict: Verdict,
    /// Timestep of the violation, the failure point for `Inconclusive`, or
    /// the bound for `NoErrorFound`.
    pub timestep: usize,
    /// Decoded counterexample for `Satisfiable` and `Unknown`.
    pub path: Option<Path>,
    pub elapsed: Duration,
    pub queries: usize,
    /// Transition formulas appended to the accumulated set.
    pub extensions: usize,
}

impl fmt::Display for EvaluationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed.as_secs();
        let ms = self.elapsed.as_millis();
        match &self.verdict {
            Verdict::Satisfiable => write!(
                f,
                "SATISFIABLE at timestep: {} (elapsed {secs}s, {ms}ms)",
                self.timestep
            ),
            Verdict::Unknown => write!(
                f,
                "UNKNOWN after timestep: {} (elapsed {secs}s, {ms}ms)",
                self.timestep
            ),
            Verdict::NoErrorFound => write!(
                f,
                "No error found for bound of {} (elapsed {secs}s, {ms}ms)",
                self.timestep
            ),
            Verdict::Inconclusive { reason } => write!(
                f,
                "INCONCLUSIVE at timestep: {}: {reason} (elapsed {secs}s, {ms}ms)",
                self.timestep
            ),
        }
    }
}

/// Why the refinement loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CegarTermination {
    /// The abstract model answered definitely.
    AbstractDefinite,
    /// The concrete model confirmed an abstract counterexample.
    ConcreteConfirmed,
    /// One of the models was inconclusive.
    Inconclusive,
    /// `max_refinements` rounds ran without a definite answer.
    RefinementBudgetExhausted,
}

/// One abstract round and, if it produced a possible violation, the
/// concrete check of that path.
#[derive(Debug, Clone)]
pub struct CegarRound {
    pub round: usize,
    pub start_from: usize,
    /// Conjunction of the negated paths excluded so far.
    pub path_constraint: Formula,
    pub excluded_paths: usize,
    pub abstract_outcome: EvaluationOutcome,
    pub concrete_outcome: Option<EvaluationOutcome>,
}

#[derive(Debug, Clone)]
pub struct CegarReport {
    pub rounds: Vec<CegarRound>,
    pub termination: CegarTermination,
}

/// Final result of a [`crate::runner::Runner`] run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub outcome: EvaluationOutcome,
    pub cegar: Option<CegarReport>,
    /// Re-solve of the result path under its own constraint.
    pub double_test: Option<EvaluationOutcome>,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(verdict: Verdict, timestep: usize) -> EvaluationOutcome {
        EvaluationOutcome {
            verdict,
            timestep,
            path: None,
            elapsed: Duration::from_millis(1500),
            queries: 0,
            extensions: 0,
        }
    }

    #[test]
    fn display_names_the_three_classifications() {
        assert!(outcome(Verdict::Satisfiable, 3)
            .to_string()
            .starts_with("SATISFIABLE at timestep: 3"));
        assert!(outcome(Verdict::Unknown, 2)
            .to_string()
            .starts_with("UNKNOWN after timestep: 2"));
        assert!(outcome(Verdict::NoErrorFound, 10)
            .to_string()
            .starts_with("No error found for bound of 10"));
        assert!(outcome(Verdict::Satisfiable, 0)
            .to_string()
            .contains("1s, 1500ms"));
    }

    #[test]
    fn only_satisfiable_and_no_error_are_definite() {
        assert!(Verdict::Satisfiable.is_definite());
        assert!(Verdict::NoErrorFound.is_definite());
        assert!(!Verdict::Unknown.is_definite());
        assert!(!Verdict::Inconclusive {
            reason: "timeout".into()
        }
        .is_definite());
    }

    #[test]
    fn verdict_serializes_with_tag() {
        let json = serde_json::to_value(Verdict::Inconclusive {
            reason: "Z3 returned unknown".into(),
        })
        .expect("serializes");
        assert_eq!(json["verdict"], "inconclusive");
        assert_eq!(json["reason"], "Z3 returned unknown");
        assert_eq!(Verdict::NoErrorFound.verdict_class(), "no_error_found");
    }
}
