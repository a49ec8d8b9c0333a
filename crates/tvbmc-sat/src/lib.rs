#![doc = include_str!("../README.md")]

//! Propositional formulas and SAT oracle integration.
//!
//! This crate provides the formula combinators, the literal naming contract
//! shared by formula producers and trace decoding, the oracle trait the
//! bounded model checker drives, and an optional Z3 backend.

pub mod backends;
pub mod formula;
pub mod literal;
pub mod solver;
