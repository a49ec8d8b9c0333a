use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::formula::Formula;

/// Result of a satisfiability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SatResult {
    Sat,
    Unsat,
    /// The backend gave up (timeout, resource limit, incompleteness).
    Unknown(String),
}

impl SatResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SatResult::Sat)
    }
}

impl fmt::Display for SatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SatResult::Sat => write!(f, "TRUE"),
            SatResult::Unsat => write!(f, "FALSE"),
            SatResult::Unknown(reason) => write!(f, "UNDEF ({reason})"),
        }
    }
}

/// A signed occurrence of a named boolean variable.
///
/// Ordering is by name first, so a model iterates alphabetically with the
/// negative occurrence of a name before the positive one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Literal {
    name: String,
    polarity: bool,
}

impl Literal {
    pub fn new(name: impl Into<String>, polarity: bool) -> Self {
        Self {
            name: name.into(),
            polarity,
        }
    }

    pub fn positive(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    pub fn negative(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polarity(&self) -> bool {
        self.polarity
    }

    pub fn negated(self) -> Self {
        Self {
            name: self.name,
            polarity: !self.polarity,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.polarity {
            write!(f, "{}", self.name)
        } else {
            write!(f, "~{}", self.name)
        }
    }
}

/// A satisfying assignment as an ordered set of signed literals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Model {
    literals: BTreeSet<Literal>,
}

impl Model {
    pub fn new(literals: BTreeSet<Literal>) -> Self {
        Self { literals }
    }

    pub fn literals(&self) -> &BTreeSet<Literal> {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// True if the literal `name` occurs in the model with `polarity`.
    pub fn contains(&self, name: &str, polarity: bool) -> bool {
        // BTreeSet<Literal> cannot be searched by (&str, bool) without an
        // owned key; the allocation is small and decoding is not hot.
        self.literals.contains(&Literal::new(name, polarity))
    }

    pub fn is_true(&self, name: &str) -> bool {
        self.contains(name, true)
    }

    pub fn is_false(&self, name: &str) -> bool {
        self.contains(name, false)
    }

    /// Truth value of `name`, or `None` if the model does not mention it.
    pub fn value(&self, name: &str) -> Option<bool> {
        if self.is_true(name) {
            Some(true)
        } else if self.is_false(name) {
            Some(false)
        } else {
            None
        }
    }
}

impl FromIterator<Literal> for Model {
    fn from_iter<I: IntoIterator<Item = Literal>>(iter: I) -> Self {
        Self {
            literals: iter.into_iter().collect(),
        }
    }
}

/// Black-box SAT oracle.
///
/// The oracle keeps its assertion stack between calls; callers that want
/// independent queries must `reset` first (see [`SatOracle::check_conjunction`]).
pub trait SatOracle {
    type Error: std::error::Error;

    /// Add a formula to the current assertion stack.
    fn assert(&mut self, formula: &Formula) -> Result<(), Self::Error>;

    /// Check satisfiability of everything asserted since the last reset.
    fn check_sat(&mut self) -> Result<SatResult, Self::Error>;

    /// Model of the last `check_sat`, available only after `Sat`.
    fn model(&self) -> Option<&Model>;

    /// Drop all assertions and any cached model.
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Reset, assert the conjunction of `formulas` as one formula, and check.
    fn check_conjunction(&mut self, formulas: &[Formula]) -> Result<SatResult, Self::Error> {
        trace!(parts = formulas.len(), "oracle: checking conjunction");
        self.reset()?;
        self.assert(&Formula::conjunct(formulas.iter().cloned()))?;
        self.check_sat()
    }
}
