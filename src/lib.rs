//! # boltgrant
//!
//! Command line front end: argument parsing, logging setup and the runner
//! that feeds manifest grants to the reconciler.

pub mod cli;
pub mod logging;
pub mod runner;
