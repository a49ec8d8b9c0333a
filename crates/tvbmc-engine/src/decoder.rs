//! Counterexample extraction from SAT models.

use std::fmt;

use serde::Serialize;

use tvbmc_sat::formula::Formula;
use tvbmc_sat::literal::{LiteralKey, PredicateKind, ResourceFlagKind};
use tvbmc_sat::solver::Model;

use crate::cfgs::Cfgs;
use crate::error::DecodeError;
use crate::property::PropertySpec;

/// Location of one process at one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessLocation {
    pub process: usize,
    pub location: usize,
}

/// Three-valued predicate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateValue {
    True,
    False,
    Unknown,
}

impl fmt::Display for PredicateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateValue::True => write!(f, "true"),
            PredicateValue::False => write!(f, "false"),
            PredicateValue::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateStatus {
    pub name: String,
    pub value: PredicateValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FairnessStatus {
    /// Fairness is switched off; stands for the whole timestep.
    NotApplicable,
    Fair { process: usize },
    Unfair { process: usize },
}

impl fmt::Display for FairnessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FairnessStatus::NotApplicable => write!(f, "n.a."),
            FairnessStatus::Fair { process } => write!(f, "P{process} = fair"),
            FairnessStatus::Unfair { process } => write!(f, "P{process} = unfair"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceFlags {
    pub re: bool,
    pub rd: bool,
}

/// Program state at one timestep of a counterexample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    pub timestep: usize,
    pub locations: Vec<ProcessLocation>,
    pub predicates: Vec<PredicateStatus>,
    pub fairness: Vec<FairnessStatus>,
    pub resources: ResourceFlags,
}

/// Counterexample path, one state per timestep `0..=t`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Path {
    pub states: Vec<State>,
}

impl Path {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, timestep: usize) -> Option<&State> {
        self.states.get(timestep)
    }

    /// Conjunction of the location literals of every state, encoded with the
    /// digit widths of `cfgs`. Predicates and flags are left unconstrained.
    pub fn formula(&self, cfgs: &Cfgs) -> Result<Formula, DecodeError> {
        let mut parts = Vec::new();
        for state in &self.states {
            for loc in &state.locations {
                let encoded = cfgs
                    .encode_location(loc.process, loc.location, state.timestep)
                    .ok_or(DecodeError::UnknownProcess {
                        process: loc.process,
                        processes: cfgs.num_processes(),
                    })?;
                parts.push(encoded);
            }
        }
        Ok(Formula::conjunct(parts))
    }
}

/// Parse a most-significant-first binary digit string.
///
/// The empty string is location 0 (a process with a single location).
pub fn parse_binary_location(digits: &str) -> Result<usize, DecodeError> {
    let mut tally: usize = 0;
    for c in digits.chars() {
        let bit = match c {
            '0' => 0,
            '1' => 1,
            found => {
                return Err(DecodeError::InvalidLocationDigits {
                    digits: digits.to_string(),
                    found,
                })
            }
        };
        tally = tally
            .checked_mul(2)
            .and_then(|t| t.checked_add(bit))
            .ok_or_else(|| DecodeError::LocationOverflow {
                digits: digits.to_string(),
            })?;
    }
    Ok(tally)
}

/// Reads program state out of a model for a fixed CFGS.
pub struct TraceDecoder<'a> {
    cfgs: &'a Cfgs,
    spec: &'a PropertySpec,
}

impl<'a> TraceDecoder<'a> {
    pub fn new(cfgs: &'a Cfgs, spec: &'a PropertySpec) -> Self {
        Self { cfgs, spec }
    }

    /// Decode every timestep `0..=bound`. `bound` must be the timestep the
    /// model was produced at.
    pub fn decode_path(&self, model: &Model, bound: usize) -> Result<Path, DecodeError> {
        let states = (0..=bound)
            .map(|k| self.decode_state(model, k))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Path { states })
    }

    pub fn decode_state(&self, model: &Model, timestep: usize) -> Result<State, DecodeError> {
        Ok(State {
            timestep,
            locations: self.locations(model, timestep)?,
            predicates: self.predicates(model, timestep),
            fairness: self.fairness(model, timestep),
            resources: self.resources(model, timestep),
        })
    }

    /// Digit string of one process. A digit is `0` only if the model holds
    /// the location literal with false polarity; absent digits read as `1`.
    pub fn location_digits(&self, model: &Model, timestep: usize, process: usize) -> String {
        let digits = self.cfgs.process(process).map_or(0, |p| p.digits());
        (0..digits)
            .map(|d| {
                if model.is_false(&LiteralKey::location(timestep, process, d).name()) {
                    '0'
                } else {
                    '1'
                }
            })
            .collect()
    }

    fn locations(&self, model: &Model, timestep: usize) -> Result<Vec<ProcessLocation>, DecodeError> {
        (0..self.cfgs.num_processes())
            .map(|process| {
                let digits = self.location_digits(model, timestep, process);
                let location =
                    parse_binary_location(&digits).map_err(|e| DecodeError::Location {
                        timestep,
                        process,
                        source: Box::new(e),
                    })?;
                Ok(ProcessLocation { process, location })
            })
            .collect()
    }

    fn predicates(&self, model: &Model, timestep: usize) -> Vec<PredicateStatus> {
        self.cfgs
            .predicates
            .iter()
            .map(|(name, &id)| {
                let unknown = LiteralKey::predicate(id, timestep, PredicateKind::Unknown);
                let truth = LiteralKey::predicate(id, timestep, PredicateKind::True);
                let value = if model.is_true(&unknown.name()) {
                    PredicateValue::Unknown
                } else if model.is_true(&truth.name()) {
                    PredicateValue::True
                } else {
                    PredicateValue::False
                };
                PredicateStatus {
                    name: name.clone(),
                    value,
                }
            })
            .collect()
    }

    fn fairness(&self, model: &Model, timestep: usize) -> Vec<FairnessStatus> {
        if !self.spec.fairness_on {
            return vec![FairnessStatus::NotApplicable];
        }
        (0..self.cfgs.num_processes())
            .map(|process| {
                if model.is_true(&LiteralKey::fairness(timestep, process).name()) {
                    FairnessStatus::Fair { process }
                } else {
                    FairnessStatus::Unfair { process }
                }
            })
            .collect()
    }

    fn resources(&self, model: &Model, timestep: usize) -> ResourceFlags {
        ResourceFlags {
            re: model.is_true(&LiteralKey::resource(ResourceFlagKind::Re, timestep).name()),
            rd: model.is_true(&LiteralKey::resource(ResourceFlagKind::Rd, timestep).name()),
        }
    }
}
