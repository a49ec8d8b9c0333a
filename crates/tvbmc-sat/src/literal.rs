//! Naming contract between formula producers and trace decoding.
//!
//! Every boolean variable that carries program state has a structured
//! [`LiteralKey`]. The flat names handed to the oracle are produced and
//! parsed only here:
//!
//! | key                                   | name            |
//! |---------------------------------------|-----------------|
//! | `Location { timestep, process, digit }` | `n_<t>_<p>_<d>` |
//! | `Predicate { id, timestep, Unknown }` | `<id>_<t>_u`    |
//! | `Predicate { id, timestep, True }`    | `<id>_<t>_t`    |
//! | `Fairness { timestep, process }`      | `fr_<t>_<p>`    |
//! | `ResourceFlag { Re, timestep }`       | `re_<t>`        |
//! | `ResourceFlag { Rd, timestep }`       | `rd_<t>`        |
//! | `Status`                              | `unknown`       |

use std::fmt;

use crate::formula::Formula;
use crate::solver::Literal;

/// Name of the tri-state status literal used to split possible from
/// definite violations.
pub const STATUS_LITERAL: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    /// `<id>_<t>_u`: the predicate value is unknown.
    Unknown,
    /// `<id>_<t>_t`: the predicate is true.
    True,
}

impl PredicateKind {
    fn suffix(self) -> &'static str {
        match self {
            PredicateKind::Unknown => "u",
            PredicateKind::True => "t",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFlagKind {
    Re,
    Rd,
}

impl ResourceFlagKind {
    fn prefix(self) -> &'static str {
        match self {
            ResourceFlagKind::Re => "re",
            ResourceFlagKind::Rd => "rd",
        }
    }
}

/// Structured identity of a state-carrying boolean variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKey {
    Location {
        timestep: usize,
        process: usize,
        digit: usize,
    },
    Predicate {
        id: usize,
        timestep: usize,
        kind: PredicateKind,
    },
    Fairness {
        timestep: usize,
        process: usize,
    },
    ResourceFlag {
        kind: ResourceFlagKind,
        timestep: usize,
    },
    Status,
}

impl LiteralKey {
    pub fn location(timestep: usize, process: usize, digit: usize) -> Self {
        LiteralKey::Location {
            timestep,
            process,
            digit,
        }
    }

    pub fn predicate(id: usize, timestep: usize, kind: PredicateKind) -> Self {
        LiteralKey::Predicate { id, timestep, kind }
    }

    pub fn fairness(timestep: usize, process: usize) -> Self {
        LiteralKey::Fairness { timestep, process }
    }

    pub fn resource(kind: ResourceFlagKind, timestep: usize) -> Self {
        LiteralKey::ResourceFlag { kind, timestep }
    }

    /// Flat variable name as seen by the oracle.
    pub fn name(&self) -> String {
        match self {
            LiteralKey::Location {
                timestep,
                process,
                digit,
            } => format!("n_{timestep}_{process}_{digit}"),
            LiteralKey::Predicate { id, timestep, kind } => {
                format!("{id}_{timestep}_{}", kind.suffix())
            }
            LiteralKey::Fairness { timestep, process } => format!("fr_{timestep}_{process}"),
            LiteralKey::ResourceFlag { kind, timestep } => {
                format!("{}_{timestep}", kind.prefix())
            }
            LiteralKey::Status => STATUS_LITERAL.to_string(),
        }
    }

    /// Inverse of [`LiteralKey::name`]. Returns `None` for names outside the
    /// contract (auxiliary encoder variables, for example).
    pub fn parse(name: &str) -> Option<Self> {
        if name == STATUS_LITERAL {
            return Some(LiteralKey::Status);
        }
        let parts: Vec<&str> = name.split('_').collect();
        match parts.as_slice() {
            ["n", t, p, d] => Some(LiteralKey::location(
                parse_index(t)?,
                parse_index(p)?,
                parse_index(d)?,
            )),
            ["fr", t, p] => Some(LiteralKey::fairness(parse_index(t)?, parse_index(p)?)),
            ["re", t] => Some(LiteralKey::resource(ResourceFlagKind::Re, parse_index(t)?)),
            ["rd", t] => Some(LiteralKey::resource(ResourceFlagKind::Rd, parse_index(t)?)),
            [id, t, suffix] => {
                let kind = match *suffix {
                    "u" => PredicateKind::Unknown,
                    "t" => PredicateKind::True,
                    _ => return None,
                };
                Some(LiteralKey::predicate(
                    parse_index(id)?,
                    parse_index(t)?,
                    kind,
                ))
            }
            _ => None,
        }
    }

    pub fn literal(&self, polarity: bool) -> Literal {
        Literal::new(self.name(), polarity)
    }

    pub fn formula(&self, polarity: bool) -> Formula {
        Formula::Lit(self.literal(polarity))
    }
}

impl fmt::Display for LiteralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

fn parse_index(text: &str) -> Option<usize> {
    // Reject signs and leading zeros so that parse(name(k)) is the only way in.
    if text.is_empty() || (text.len() > 1 && text.starts_with('0')) {
        return None;
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Number of binary digits used to encode a location index.
///
/// The smallest `D` with `2^D >= number_of_locations`; a process with at
/// most one location needs no digits.
pub fn digits_required(number_of_locations: usize) -> usize {
    if number_of_locations <= 1 {
        return 0;
    }
    (usize::BITS - (number_of_locations - 1).leading_zeros()) as usize
}

/// Conjunction of digit literals placing `process` at `location` at
/// `timestep`, most significant digit first. A `0` bit is the negative
/// literal, a `1` bit the positive one.
pub fn encode_location(timestep: usize, process: usize, location: usize, digits: usize) -> Formula {
    Formula::conjunct((0..digits).map(|d| {
        let bit = (location >> (digits - 1 - d)) & 1 == 1;
        LiteralKey::location(timestep, process, d).formula(bit)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_flat_scheme() {
        assert_eq!(LiteralKey::location(3, 1, 0).name(), "n_3_1_0");
        assert_eq!(
            LiteralKey::predicate(7, 2, PredicateKind::Unknown).name(),
            "7_2_u"
        );
        assert_eq!(LiteralKey::predicate(7, 2, PredicateKind::True).name(), "7_2_t");
        assert_eq!(LiteralKey::fairness(4, 2).name(), "fr_4_2");
        assert_eq!(LiteralKey::resource(ResourceFlagKind::Re, 5).name(), "re_5");
        assert_eq!(LiteralKey::resource(ResourceFlagKind::Rd, 0).name(), "rd_0");
        assert_eq!(LiteralKey::Status.name(), "unknown");
    }

    #[test]
    fn parse_inverts_name() {
        let keys = [
            LiteralKey::location(10, 2, 3),
            LiteralKey::predicate(12, 0, PredicateKind::Unknown),
            LiteralKey::predicate(0, 9, PredicateKind::True),
            LiteralKey::fairness(1, 1),
            LiteralKey::resource(ResourceFlagKind::Re, 8),
            LiteralKey::resource(ResourceFlagKind::Rd, 8),
            LiteralKey::Status,
        ];
        for key in keys {
            assert_eq!(LiteralKey::parse(&key.name()), Some(key), "{key}");
        }
    }

    #[test]
    fn parse_rejects_foreign_names() {
        for name in ["", "n_1_2", "n_a_0_0", "fr_1", "x_1_t", "3_1_f", "re_01", "aux"] {
            assert_eq!(LiteralKey::parse(name), None, "{name}");
        }
    }

    #[test]
    fn digits_required_is_ceil_log2() {
        assert_eq!(digits_required(0), 0);
        assert_eq!(digits_required(1), 0);
        assert_eq!(digits_required(2), 1);
        assert_eq!(digits_required(3), 2);
        assert_eq!(digits_required(4), 2);
        assert_eq!(digits_required(5), 3);
        assert_eq!(digits_required(8), 3);
        assert_eq!(digits_required(9), 4);
    }

    #[test]
    fn encode_location_is_msb_first() {
        // 5 = 0b101 over three digits.
        let f = encode_location(2, 1, 5, 3);
        assert_eq!(
            f,
            Formula::And(vec![
                Formula::lit("n_2_1_0", true),
                Formula::lit("n_2_1_1", false),
                Formula::lit("n_2_1_2", true),
            ])
        );
    }

    #[test]
    fn encode_location_without_digits_is_trivial() {
        assert_eq!(encode_location(0, 0, 0, 0), Formula::verum());
    }
}
