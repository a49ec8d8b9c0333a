#![doc = include_str!("../README.md")]

//! tvbmc evaluation engine.
//!
//! This crate runs the two-phase bounded model-checking loop against a
//! [`tvbmc_sat::solver::SatOracle`], decodes satisfying models into
//! counterexample paths, and orchestrates single-model or
//! abstract/concrete refinement runs.

pub mod cfgs;
pub mod config;
pub mod decoder;
pub mod error;
pub mod evaluator;
pub mod property;
pub mod report;
pub mod result;
pub mod runner;
pub mod task;
pub mod timelog;
