//! Bounded model-checking loop with the possible/definite query protocol.
//!
//! For every timestep `t` the oracle is asked whether
//! `initial ∧ transitions(0..t) ∧ violation(t) ∧ unknown` is satisfiable.
//! A satisfiable query is followed by the same query with `~unknown`; only
//! if that one is satisfiable too is the violation definite.

use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use tracing::{info, warn};
use tvbmc_sat::backends::smtlib_printer::to_smtlib_script;
use tvbmc_sat::formula::Formula;
use tvbmc_sat::literal::LiteralKey;
use tvbmc_sat::solver::{Model, SatOracle, SatResult};

use crate::cfgs::Cfgs;
use crate::config::EngineConfig;
use crate::decoder::{Path, TraceDecoder};
use crate::error::EngineError;
use crate::property::PropertySpec;
use crate::report::{QueryPhase, QueryRecord, Reporter, TracingReporter};
use crate::result::{EvaluationOutcome, Verdict};
use crate::task::TaskBuilder;
use crate::timelog::TimeLog;

/// Drives one model through the bounded loop. Owns its oracle.
pub struct Evaluator<B, O> {
    label: String,
    cfgs: Cfgs,
    spec: PropertySpec,
    builder: B,
    oracle: O,
    reporter: Rc<dyn Reporter>,
    budget: Option<Duration>,
    dump_dir: Option<PathBuf>,
}

struct Run {
    time_log: TimeLog,
    queries: usize,
    extensions: usize,
}

impl<B: TaskBuilder, O: SatOracle> Evaluator<B, O> {
    pub fn new(cfgs: Cfgs, spec: PropertySpec, builder: B, oracle: O) -> Self {
        Self {
            label: "concrete".into(),
            cfgs,
            spec,
            builder,
            oracle,
            reporter: Rc::new(TracingReporter),
            budget: None,
            dump_dir: None,
        }
    }

    /// Name used in logs, reports and dump file names.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_reporter(mut self, reporter: Rc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Take the time budget and dump directory from `config`. A
    /// `timeout_secs` of 0 means no budget.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.budget =
            (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        self.dump_dir = config.dump_queries.clone();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cfgs(&self) -> &Cfgs {
        &self.cfgs
    }

    pub fn spec(&self) -> &PropertySpec {
        &self.spec
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Check timesteps `start_from..=bound`, optionally under an extra
    /// `constraint` conjoined with the initial state.
    ///
    /// Transition formulas for timesteps before `start_from` are added up
    /// front, so a later start only skips property queries, not behaviour.
    pub fn evaluate(
        &mut self,
        bound: usize,
        start_from: usize,
        constraint: Option<&Formula>,
    ) -> Result<EvaluationOutcome, EngineError> {
        if start_from > bound {
            return Err(EngineError::Configuration(format!(
                "start_from ({start_from}) exceeds bound ({bound})"
            )));
        }
        let mut run = Run {
            time_log: TimeLog::new(),
            queries: 0,
            extensions: 0,
        };

        let mut formulas = vec![self.builder.initial_state()];
        if let Some(constraint) = constraint {
            formulas.push(constraint.clone());
        }
        for k in 0..start_from {
            formulas.push(self.builder.transition(k));
            run.extensions += 1;
        }

        for t in start_from..=bound {
            if let Some(budget) = self.budget.filter(|b| run.time_log.exceeds(*b)) {
                warn!(model = %self.label, timestep = t, "BMC: time budget exhausted");
                let reason = format!(
                    "{} used up its {}s budget before timestep {t}",
                    self.label,
                    budget.as_secs()
                );
                return Ok(self.finish(&run, Verdict::Inconclusive { reason }, t, None));
            }
            info!(model = %self.label, timestep = t, "BMC: checking timestep");

            let property = self.builder.property_violation(t);
            match self.check_phase(&mut run, &formulas, &property, QueryPhase::Possible, t)? {
                SatResult::Unsat => {}
                SatResult::Unknown(reason) => {
                    return Ok(self.finish(&run, Verdict::Inconclusive { reason }, t, None));
                }
                SatResult::Sat => {
                    let path = self.current_path(t)?;
                    self.reporter.on_path(&self.label, t, &path);

                    let (verdict, path) =
                        match self.check_phase(&mut run, &formulas, &property, QueryPhase::Definite, t)? {
                            SatResult::Sat => (Verdict::Satisfiable, self.current_path(t)?),
                            SatResult::Unsat => (Verdict::Unknown, path),
                            SatResult::Unknown(reason) => (Verdict::Inconclusive { reason }, path),
                        };
                    return Ok(self.finish(&run, verdict, t, Some(path)));
                }
            }

            formulas.push(self.builder.transition(t));
            run.extensions += 1;
        }

        Ok(self.finish(&run, Verdict::NoErrorFound, bound, None))
    }

    fn check_phase(
        &mut self,
        run: &mut Run,
        formulas: &[Formula],
        property: &Formula,
        phase: QueryPhase,
        timestep: usize,
    ) -> Result<SatResult, EngineError> {
        let query = [
            Formula::conjunct(formulas.iter().cloned()),
            property.clone(),
            LiteralKey::Status.formula(phase.status_polarity()),
        ];

        run.time_log.start_lap();
        let result = self
            .oracle
            .check_conjunction(&query)
            .map_err(|e| EngineError::oracle(timestep, e))?;
        let elapsed = run.time_log.end_lap();
        run.queries += 1;

        self.reporter.on_query(&QueryRecord {
            model: self.label.clone(),
            timestep,
            phase,
            elapsed,
            result: result.clone(),
        });
        if self.dump_dir.is_some() {
            self.dump_query(&query, phase, timestep, &result)?;
        }
        Ok(result)
    }

    fn current_path(&self, timestep: usize) -> Result<Path, EngineError> {
        let Some(model) = self.oracle.model() else {
            warn!(model = %self.label, timestep, "BMC: oracle returned SAT without a model");
            return Err(EngineError::MissingModel { timestep });
        };
        TraceDecoder::new(&self.cfgs, &self.spec)
            .decode_path(model, timestep)
            .map_err(|source| EngineError::Decode {
                bound: timestep,
                source,
            })
    }

    fn dump_query(
        &self,
        query: &[Formula],
        phase: QueryPhase,
        timestep: usize,
        result: &SatResult,
    ) -> Result<(), EngineError> {
        let Some(dir) = &self.dump_dir else {
            return Ok(());
        };
        fs::create_dir_all(dir)?;
        let stem = format!("{}_t{timestep}_{phase}", self.label);
        let script = to_smtlib_script(&Formula::conjunct(query.iter().cloned()));
        fs::write(dir.join(format!("{stem}.smt2")), script)?;
        if result.is_sat() {
            let model: Option<&Model> = self.oracle.model();
            fs::write(
                dir.join(format!("{stem}.model.json")),
                serde_json::to_string_pretty(&model).map_err(std::io::Error::other)?,
            )?;
        }
        Ok(())
    }

    fn finish(
        &self,
        run: &Run,
        verdict: Verdict,
        timestep: usize,
        path: Option<Path>,
    ) -> EvaluationOutcome {
        let outcome = EvaluationOutcome {
            verdict,
            timestep,
            path,
            elapsed: run.time_log.total_time(),
            queries: run.queries,
            extensions: run.extensions,
        };
        self.reporter.on_outcome(&self.label, &outcome);
        outcome
    }
}

impl<B, O> std::fmt::Debug for Evaluator<B, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("label", &self.label)
            .field("processes", &self.cfgs.num_processes())
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}
