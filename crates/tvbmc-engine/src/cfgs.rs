use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use tvbmc_sat::formula::Formula;
use tvbmc_sat::literal::{digits_required, encode_location};

/// One process of the control-flow-graph system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub name: String,
    pub locations: usize,
}

impl Process {
    pub fn new(name: impl Into<String>, locations: usize) -> Self {
        Self {
            name: name.into(),
            locations,
        }
    }

    pub fn number_of_locations(&self) -> usize {
        self.locations
    }

    /// Binary digits needed to encode a location of this process.
    pub fn digits(&self) -> usize {
        digits_required(self.locations)
    }
}

/// Control-flow-graph system: ordered processes plus the predicates they
/// share, in declaration order (name -> id used in literal names).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cfgs {
    pub processes: Vec<Process>,
    #[serde(default)]
    pub predicates: IndexMap<String, usize>,
}

impl Cfgs {
    pub fn new(processes: Vec<Process>, predicates: IndexMap<String, usize>) -> Self {
        Self {
            processes,
            predicates,
        }
    }

    pub fn with_process(mut self, name: impl Into<String>, locations: usize) -> Self {
        self.processes.push(Process::new(name, locations));
        self
    }

    pub fn with_predicate(mut self, name: impl Into<String>, id: usize) -> Self {
        self.predicates.insert(name.into(), id);
        self
    }

    pub fn num_processes(&self) -> usize {
        self.processes.len()
    }

    pub fn process(&self, pid: usize) -> Option<&Process> {
        self.processes.get(pid)
    }

    /// Formula placing process `pid` at `location` at `timestep`, or `None`
    /// for an unknown process.
    pub fn encode_location(&self, pid: usize, location: usize, timestep: usize) -> Option<Formula> {
        let process = self.process(pid)?;
        Some(encode_location(timestep, pid, location, process.digits()))
    }
}
