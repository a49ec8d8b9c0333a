//! Evaluation strategies over one or more evaluators.
//!
//! The first evaluator is the concrete model, the last one the abstract
//! model. With `multi_model` the abstract model is checked first and every
//! possible violation it reports is replayed on the concrete model; paths
//! the concrete model cannot confirm are excluded from later abstract runs.

use std::time::Instant;

use tracing::{debug, info, warn};
use tvbmc_sat::formula::Formula;
use tvbmc_sat::solver::SatOracle;

use crate::config::EngineConfig;
use crate::decoder::Path;
use crate::error::EngineError;
use crate::evaluator::Evaluator;
use crate::property::PropertySpec;
use crate::result::{
    CegarReport, CegarRound, CegarTermination, EvaluationOutcome, RunResult, Verdict,
};
use crate::task::TaskBuilder;

pub struct Runner<B, O> {
    evaluators: Vec<Evaluator<B, O>>,
    spec: PropertySpec,
    config: EngineConfig,
}

impl<B: TaskBuilder, O: SatOracle> Runner<B, O> {
    pub fn new(
        evaluators: Vec<Evaluator<B, O>>,
        spec: PropertySpec,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if evaluators.is_empty() {
            return Err(EngineError::Configuration(
                "at least one model is required".into(),
            ));
        }
        if spec.multi_model && evaluators.len() < 2 {
            return Err(EngineError::Configuration(format!(
                "multi-model evaluation needs an abstract and a concrete model, got {}",
                evaluators.len()
            )));
        }
        Ok(Self {
            evaluators,
            spec,
            config,
        })
    }

    pub fn spec(&self) -> &PropertySpec {
        &self.spec
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn evaluators(&self) -> &[Evaluator<B, O>] {
        &self.evaluators
    }

    /// Run the strategy selected by the property spec, then the double test
    /// if requested.
    pub fn evaluate(&mut self) -> Result<RunResult, EngineError> {
        let started = Instant::now();
        let (outcome, cegar) = if self.spec.multi_model {
            let (outcome, report) = self.evaluate_multi_model()?;
            (outcome, Some(report))
        } else {
            (self.evaluate_uni_model()?, None)
        };

        let double_test = if self.spec.double_test {
            self.double_test(&outcome)?
        } else {
            None
        };

        Ok(RunResult {
            outcome,
            cegar,
            double_test,
            elapsed: started.elapsed(),
        })
    }

    /// Check the concrete model alone.
    pub fn evaluate_uni_model(&mut self) -> Result<EvaluationOutcome, EngineError> {
        let (bound, start_from) = (self.config.bound, self.config.start_from);
        self.concrete_mut().evaluate(bound, start_from, None)
    }

    /// Abstract/concrete refinement loop.
    pub fn evaluate_multi_model(
        &mut self,
    ) -> Result<(EvaluationOutcome, CegarReport), EngineError> {
        let bound = self.config.bound;
        let mut start_from = self.config.start_from;
        let mut excluded: Vec<Formula> = Vec::new();
        let mut rounds: Vec<CegarRound> = Vec::new();

        for round in 0..self.config.max_refinements {
            let path_constraint = Formula::conjunct(excluded.iter().cloned());
            info!(
                round,
                start_from,
                excluded_paths = excluded.len(),
                "CEGAR: checking abstract model"
            );
            let constraint = (!excluded.is_empty()).then_some(&path_constraint);
            let abstract_outcome = self.abstract_mut().evaluate(bound, start_from, constraint)?;

            let mut record = CegarRound {
                round,
                start_from,
                path_constraint: path_constraint.clone(),
                excluded_paths: excluded.len(),
                abstract_outcome: abstract_outcome.clone(),
                concrete_outcome: None,
            };

            if abstract_outcome.verdict.is_definite() {
                rounds.push(record);
                return Ok(finish(
                    abstract_outcome,
                    rounds,
                    CegarTermination::AbstractDefinite,
                ));
            }
            if let Verdict::Inconclusive { .. } = abstract_outcome.verdict {
                rounds.push(record);
                return Ok(finish(
                    abstract_outcome,
                    rounds,
                    CegarTermination::Inconclusive,
                ));
            }

            let path_formula = self.path_formula(&abstract_outcome)?;
            debug!(round, timestep = abstract_outcome.timestep, "CEGAR: replaying abstract path");
            let concrete_outcome = self.concrete_mut().evaluate(
                bound,
                abstract_outcome.timestep,
                Some(&path_formula),
            )?;
            record.concrete_outcome = Some(concrete_outcome.clone());
            rounds.push(record);

            match &concrete_outcome.verdict {
                Verdict::Satisfiable => {
                    info!(round, timestep = concrete_outcome.timestep, "CEGAR: counterexample confirmed");
                    return Ok(finish(
                        concrete_outcome,
                        rounds,
                        CegarTermination::ConcreteConfirmed,
                    ));
                }
                Verdict::Inconclusive { .. } => {
                    return Ok(finish(
                        concrete_outcome,
                        rounds,
                        CegarTermination::Inconclusive,
                    ));
                }
                Verdict::Unknown | Verdict::NoErrorFound => {
                    info!(
                        round,
                        verdict = concrete_outcome.verdict.verdict_class(),
                        "CEGAR: abstract path refuted, excluding it"
                    );
                    // Other abstract paths ending at this timestep are still open.
                    excluded.push(path_formula.negate());
                    start_from = abstract_outcome.timestep;
                }
            }
        }

        warn!(
            max_refinements = self.config.max_refinements,
            "CEGAR: refinement budget exhausted"
        );
        let outcome = EvaluationOutcome {
            verdict: Verdict::Inconclusive {
                reason: format!(
                    "refinement budget of {} round(s) exhausted",
                    self.config.max_refinements
                ),
            },
            timestep: start_from,
            path: None,
            elapsed: rounds.iter().map(round_elapsed).sum(),
            queries: rounds.iter().map(round_queries).sum(),
            extensions: rounds.iter().map(round_extensions).sum(),
        };
        Ok(finish(
            outcome,
            rounds,
            CegarTermination::RefinementBudgetExhausted,
        ))
    }

    /// Re-solve the concrete model under the result path, from the result
    /// timestep up to the configured bound. `None` when there is no path to
    /// replay.
    pub fn double_test(
        &mut self,
        outcome: &EvaluationOutcome,
    ) -> Result<Option<EvaluationOutcome>, EngineError> {
        if !matches!(outcome.verdict, Verdict::Satisfiable | Verdict::Unknown) {
            return Ok(None);
        }
        let path_formula = self.path_formula(outcome)?;
        let timestep = outcome.timestep;
        info!(timestep, "double test: re-solving result path");
        let bound = self.config.bound;
        let retest = self
            .concrete_mut()
            .evaluate(bound, timestep, Some(&path_formula))?;
        if retest.verdict != outcome.verdict {
            warn!(
                original = outcome.verdict.verdict_class(),
                retest = retest.verdict.verdict_class(),
                timestep,
                "double test disagrees with the primary result"
            );
        }
        Ok(Some(retest))
    }

    fn path_formula(&self, outcome: &EvaluationOutcome) -> Result<Formula, EngineError> {
        let empty = Path::default();
        let path = outcome.path.as_ref().unwrap_or(&empty);
        path.formula(self.concrete().cfgs())
            .map_err(|source| EngineError::Decode {
                bound: outcome.timestep,
                source,
            })
    }

    fn concrete(&self) -> &Evaluator<B, O> {
        &self.evaluators[0]
    }

    fn concrete_mut(&mut self) -> &mut Evaluator<B, O> {
        &mut self.evaluators[0]
    }

    fn abstract_mut(&mut self) -> &mut Evaluator<B, O> {
        let last = self.evaluators.len() - 1;
        &mut self.evaluators[last]
    }
}

fn finish(
    outcome: EvaluationOutcome,
    rounds: Vec<CegarRound>,
    termination: CegarTermination,
) -> (EvaluationOutcome, CegarReport) {
    (outcome, CegarReport { rounds, termination })
}

fn round_elapsed(round: &CegarRound) -> std::time::Duration {
    round.abstract_outcome.elapsed
        + round
            .concrete_outcome
            .as_ref()
            .map(|o| o.elapsed)
            .unwrap_or_default()
}

fn round_queries(round: &CegarRound) -> usize {
    round.abstract_outcome.queries + round.concrete_outcome.as_ref().map_or(0, |o| o.queries)
}

fn round_extensions(round: &CegarRound) -> usize {
    round.abstract_outcome.extensions
        + round.concrete_outcome.as_ref().map_or(0, |o| o.extensions)
}
