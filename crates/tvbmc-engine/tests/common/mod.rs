#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io;

use tvbmc_engine::cfgs::Cfgs;
use tvbmc_engine::decoder::Path;
use tvbmc_engine::evaluator::Evaluator;
use tvbmc_engine::property::PropertySpec;
use tvbmc_engine::report::{QueryRecord, Reporter};
use tvbmc_engine::result::EvaluationOutcome;
use tvbmc_engine::task::TaskBuilder;
use tvbmc_sat::formula::Formula;
use tvbmc_sat::literal::LiteralKey;
use tvbmc_sat::solver::{Literal, Model, SatOracle, SatResult};

const MAX_VARIABLES: usize = 16;

/// Exhaustive oracle for small formulas.
///
/// Assignments are tried in increasing binary order over the sorted
/// variable names, so the first model found is deterministic. The model
/// assigns every variable that was asserted.
#[derive(Debug, Default)]
pub struct TruthTableOracle {
    asserted: Vec<Formula>,
    model: Option<Model>,
    undecided: bool,
    pub queries: Vec<Formula>,
    pub resets: usize,
}

impl TruthTableOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oracle that answers `Unknown` to every check.
    pub fn undecided() -> Self {
        Self {
            undecided: true,
            ..Self::default()
        }
    }
}

impl SatOracle for TruthTableOracle {
    type Error = io::Error;

    fn assert(&mut self, formula: &Formula) -> Result<(), io::Error> {
        self.asserted.push(formula.clone());
        self.queries.push(formula.clone());
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, io::Error> {
        self.model = None;
        if self.undecided {
            return Ok(SatResult::Unknown("canceled".into()));
        }
        let formula = Formula::conjunct(self.asserted.iter().cloned());
        let names: Vec<String> = formula.variables().into_iter().collect();
        if names.len() > MAX_VARIABLES {
            return Err(io::Error::other(format!(
                "{} variables is too many for a truth table",
                names.len()
            )));
        }
        for mask in 0u32..(1u32 << names.len()) {
            let value = |name: &str| {
                names
                    .iter()
                    .position(|n| n == name)
                    .map(|i| mask & (1 << i) != 0)
            };
            if formula.evaluate(&value) {
                let model = names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| Literal::new(name.clone(), mask & (1 << i) != 0))
                    .collect();
                self.model = Some(model);
                return Ok(SatResult::Sat);
            }
        }
        Ok(SatResult::Unsat)
    }

    fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn reset(&mut self) -> Result<(), io::Error> {
        self.asserted.clear();
        self.model = None;
        self.resets += 1;
        Ok(())
    }
}

type StepFormula = Box<dyn Fn(usize) -> Formula>;

/// Task whose formulas come from closures. Counts transition requests.
pub struct TableTask {
    initial: Formula,
    transition: StepFormula,
    violation: StepFormula,
    pub transitions_built: Cell<usize>,
}

impl TableTask {
    pub fn new(
        initial: Formula,
        transition: impl Fn(usize) -> Formula + 'static,
        violation: impl Fn(usize) -> Formula + 'static,
    ) -> Self {
        Self {
            initial,
            transition: Box::new(transition),
            violation: Box::new(violation),
            transitions_built: Cell::new(0),
        }
    }
}

impl TaskBuilder for TableTask {
    fn initial_state(&self) -> Formula {
        self.initial.clone()
    }

    fn transition(&self, timestep: usize) -> Formula {
        self.transitions_built.set(self.transitions_built.get() + 1);
        (self.transition)(timestep)
    }

    fn property_violation(&self, timestep: usize) -> Formula {
        (self.violation)(timestep)
    }
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub queries: RefCell<Vec<QueryRecord>>,
    pub paths: RefCell<Vec<(String, usize, Path)>>,
    pub outcomes: RefCell<Vec<(String, EvaluationOutcome)>>,
}

impl Reporter for RecordingReporter {
    fn on_query(&self, record: &QueryRecord) {
        self.queries.borrow_mut().push(record.clone());
    }

    fn on_path(&self, model: &str, timestep: usize, path: &Path) {
        self.paths
            .borrow_mut()
            .push((model.to_string(), timestep, path.clone()));
    }

    fn on_outcome(&self, model: &str, outcome: &EvaluationOutcome) {
        self.outcomes
            .borrow_mut()
            .push((model.to_string(), outcome.clone()));
    }
}

/// Location bit 0 of process 0 at `timestep`. With two locations this is
/// the whole location: true is location 1, false is location 0.
pub fn at_one(timestep: usize) -> Formula {
    LiteralKey::location(timestep, 0, 0).formula(true)
}

pub fn at_zero(timestep: usize) -> Formula {
    LiteralKey::location(timestep, 0, 0).formula(false)
}

pub fn status_unknown() -> Formula {
    LiteralKey::Status.formula(true)
}

/// One process with two locations and a `lock` predicate.
pub fn two_location_cfgs() -> Cfgs {
    Cfgs::default()
        .with_process("P0", 2)
        .with_predicate("lock", 0)
}

/// Starts at location 0 and moves to location 1 on the first step.
/// Violated whenever the process is at location 1.
pub fn stepping_task() -> TableTask {
    TableTask::new(at_zero(0), |t| at_one(t + 1), at_one)
}

/// Never violated.
pub fn safe_task() -> TableTask {
    TableTask::new(at_zero(0), |t| at_zero(t + 1), |_| Formula::falsum())
}

pub fn evaluator(task: TableTask, spec: PropertySpec) -> Evaluator<TableTask, TruthTableOracle> {
    Evaluator::new(two_location_cfgs(), spec, task, TruthTableOracle::new())
}

pub fn locations(path: &Path) -> Vec<usize> {
    path.states.iter().map(|s| s.locations[0].location).collect()
}
