use std::collections::BTreeSet;
use std::fmt;

use crate::backends::smtlib_printer::to_smtlib;
use crate::solver::Literal;

/// Solver-agnostic propositional formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula {
    /// `$true` / `$false`.
    Const(bool),
    /// A signed occurrence of a named variable.
    Lit(Literal),

    And(Vec<Formula>),
    Or(Vec<Formula>),
    Not(Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
}

#[allow(clippy::should_implement_trait)]
impl Formula {
    pub fn verum() -> Self {
        Formula::Const(true)
    }

    pub fn falsum() -> Self {
        Formula::Const(false)
    }

    pub fn lit(name: impl Into<String>, polarity: bool) -> Self {
        Formula::Lit(Literal::new(name, polarity))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Formula::lit(name, true)
    }

    /// Parse a single signed literal: `name`, `~name`, `$true` or `$false`.
    ///
    /// Returns `None` for anything that is not a bare literal, including
    /// empty names and names containing whitespace or operators.
    pub fn parse_literal(text: &str) -> Option<Self> {
        let text = text.trim();
        match text {
            "$true" => return Some(Formula::verum()),
            "$false" => return Some(Formula::falsum()),
            _ => {}
        }
        let (name, polarity) = match text.strip_prefix('~') {
            Some(rest) => (rest.trim_start(), false),
            None => (text, true),
        };
        if !is_identifier(name) {
            return None;
        }
        Some(Formula::lit(name, polarity))
    }

    /// Conjunction of all `formulas`; the empty conjunction is `$true`.
    pub fn conjunct<I>(formulas: I) -> Self
    where
        I: IntoIterator<Item = Formula>,
    {
        let mut parts: Vec<Formula> = formulas.into_iter().collect();
        match parts.len() {
            0 => Formula::verum(),
            1 => parts.remove(0),
            _ => Formula::And(parts),
        }
    }

    /// Disjunction of all `formulas`; the empty disjunction is `$false`.
    pub fn disjunct<I>(formulas: I) -> Self
    where
        I: IntoIterator<Item = Formula>,
    {
        let mut parts: Vec<Formula> = formulas.into_iter().collect();
        match parts.len() {
            0 => Formula::falsum(),
            1 => parts.remove(0),
            _ => Formula::Or(parts),
        }
    }

    pub fn and(self, other: Formula) -> Self {
        Formula::conjunct([self, other])
    }

    pub fn or(self, other: Formula) -> Self {
        Formula::disjunct([self, other])
    }

    /// Negation. Literals flip polarity and constants flip value instead of
    /// growing a `Not` node.
    pub fn negate(self) -> Self {
        match self {
            Formula::Const(b) => Formula::Const(!b),
            Formula::Lit(lit) => Formula::Lit(lit.negated()),
            Formula::Not(inner) => *inner,
            other => Formula::Not(Box::new(other)),
        }
    }

    pub fn implies(self, other: Formula) -> Self {
        Formula::Implies(Box::new(self), Box::new(other))
    }

    /// Names of all variables occurring in the formula, sorted.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Formula::Const(_) => {}
            Formula::Lit(lit) => {
                out.insert(lit.name().to_string());
            }
            Formula::And(parts) | Formula::Or(parts) => {
                for part in parts {
                    part.collect_variables(out);
                }
            }
            Formula::Not(inner) => inner.collect_variables(out),
            Formula::Implies(lhs, rhs) => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
        }
    }

    /// Evaluate under a total assignment. Variables missing from
    /// `assignment` evaluate to `false`.
    pub fn evaluate<F>(&self, assignment: &F) -> bool
    where
        F: Fn(&str) -> Option<bool>,
    {
        match self {
            Formula::Const(b) => *b,
            Formula::Lit(lit) => assignment(lit.name()).unwrap_or(false) == lit.polarity(),
            Formula::And(parts) => parts.iter().all(|p| p.evaluate(assignment)),
            Formula::Or(parts) => parts.iter().any(|p| p.evaluate(assignment)),
            Formula::Not(inner) => !inner.evaluate(assignment),
            Formula::Implies(lhs, rhs) => !lhs.evaluate(assignment) || rhs.evaluate(assignment),
        }
    }
}

impl From<Literal> for Formula {
    fn from(lit: Literal) -> Self {
        Formula::Lit(lit)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_smtlib(self))
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal_handles_polarity_and_constants() {
        assert_eq!(
            Formula::parse_literal("unknown"),
            Some(Formula::lit("unknown", true))
        );
        assert_eq!(
            Formula::parse_literal("~unknown"),
            Some(Formula::lit("unknown", false))
        );
        assert_eq!(Formula::parse_literal("$true"), Some(Formula::verum()));
        assert_eq!(Formula::parse_literal("$false"), Some(Formula::falsum()));
    }

    #[test]
    fn parse_literal_rejects_compound_text() {
        assert_eq!(Formula::parse_literal(""), None);
        assert_eq!(Formula::parse_literal("~"), None);
        assert_eq!(Formula::parse_literal("a & b"), None);
        assert_eq!(Formula::parse_literal("(a)"), None);
    }

    #[test]
    fn conjunct_collapses_trivial_cases() {
        assert_eq!(Formula::conjunct(Vec::new()), Formula::verum());
        assert_eq!(
            Formula::conjunct(vec![Formula::var("a")]),
            Formula::var("a")
        );
        assert_eq!(
            Formula::conjunct(vec![Formula::var("a"), Formula::var("b")]),
            Formula::And(vec![Formula::var("a"), Formula::var("b")])
        );
    }

    #[test]
    fn negate_flips_literals_and_removes_double_negation() {
        assert_eq!(Formula::var("x").negate(), Formula::lit("x", false));
        assert_eq!(Formula::verum().negate(), Formula::falsum());

        let conj = Formula::var("a").and(Formula::var("b"));
        let negated = conj.clone().negate();
        assert_eq!(negated, Formula::Not(Box::new(conj.clone())));
        assert_eq!(negated.negate(), conj);
    }

    #[test]
    fn variables_are_collected_once_in_order() {
        let f = Formula::conjunct(vec![
            Formula::var("b"),
            Formula::lit("a", false).or(Formula::var("b")),
            Formula::var("c").implies(Formula::var("a")),
        ]);
        let vars: Vec<String> = f.variables().into_iter().collect();
        assert_eq!(vars, vec!["a", "b", "c"]);
    }

    #[test]
    fn evaluate_respects_polarity_and_defaults_to_false() {
        let f = Formula::var("a").and(Formula::lit("b", false));
        assert!(f.evaluate(&|name| (name == "a").then_some(true)));
        assert!(!f.evaluate(&|_| Some(true)));
        assert!(!f.evaluate(&|_| None));
        assert!(Formula::var("a").implies(Formula::var("b")).evaluate(&|_| None));
    }
}
