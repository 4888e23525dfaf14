//! Testing infrastructure for evalmetrics integration tests.
//!
//! This crate provides utilities for writing robust integration tests:
//! - `TestWorld`: Isolated working directory with CLI command setup
//! - `assertions`: Custom assertions for report and response JSON
//! - `fixtures`: Eval log text generation

pub mod assertions;
pub mod fixtures;
pub mod world;

pub use fixtures::{EvalLogBuilder, sample_eval_log};
pub use world::{CliResult, TestWorld};
