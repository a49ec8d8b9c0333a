//! Progress and result reporting.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use tvbmc_sat::solver::SatResult;

use crate::decoder::Path;
use crate::result::{EvaluationOutcome, Verdict};

/// Which status literal a query was conjoined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPhase {
    /// `unknown`: is a violation possible?
    Possible,
    /// `~unknown`: is the violation definite?
    Definite,
}

impl QueryPhase {
    pub fn status_polarity(self) -> bool {
        match self {
            QueryPhase::Possible => true,
            QueryPhase::Definite => false,
        }
    }
}

impl fmt::Display for QueryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryPhase::Possible => write!(f, "a"),
            QueryPhase::Definite => write!(f, "b"),
        }
    }
}

/// One oracle query and how long it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRecord {
    pub model: String,
    pub timestep: usize,
    pub phase: QueryPhase,
    pub elapsed: Duration,
    pub result: SatResult,
}

/// Sink for evaluation progress. All methods default to no-ops.
pub trait Reporter {
    fn on_query(&self, _record: &QueryRecord) {}

    /// Called with the path decoded from the `unknown` query's model.
    fn on_path(&self, _model: &str, _timestep: usize, _path: &Path) {}

    fn on_outcome(&self, _model: &str, _outcome: &EvaluationOutcome) {}
}

/// Reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn on_query(&self, record: &QueryRecord) {
        debug!(
            model = %record.model,
            timestep = record.timestep,
            phase = %record.phase,
            elapsed_ms = record.elapsed.as_millis() as u64,
            result = %record.result,
            "k({})={} -> {}",
            record.phase,
            record.timestep,
            if record.result.is_sat() { "T" } else { "F" }
        );
    }

    fn on_path(&self, model: &str, timestep: usize, path: &Path) {
        info!(model, timestep, "counterexample path:\n{}", format_path(path));
    }

    fn on_outcome(&self, model: &str, outcome: &EvaluationOutcome) {
        match &outcome.verdict {
            Verdict::Inconclusive { .. } => {
                warn!(model, verdict = outcome.verdict.verdict_class(), "{outcome}")
            }
            _ => info!(model, verdict = outcome.verdict.verdict_class(), "{outcome}"),
        }
    }
}

/// Render a path one timestep per block: locations, predicates, fairness,
/// resource flags.
pub fn format_path(path: &Path) -> String {
    let mut out = String::new();
    for state in &path.states {
        let locations: Vec<String> = state
            .locations
            .iter()
            .map(|l| format!("P{} @ {}", l.process, l.location))
            .collect();
        let predicates: Vec<String> = state
            .predicates
            .iter()
            .map(|p| format!("{} = {}", p.name, p.value))
            .collect();
        let fairness: Vec<String> = state.fairness.iter().map(|f| f.to_string()).collect();
        out.push_str(&format!("{}:\n", state.timestep));
        out.push_str(&format!("  [{}]\n", locations.join(", ")));
        out.push_str(&format!("  [{}]\n", predicates.join(", ")));
        out.push_str(&format!("  [{}]\n", fairness.join(", ")));
        out.push_str(&format!(
            "  (re = {}, rd = {})\n",
            state.resources.re, state.resources.rd
        ));
    }
    out
}
