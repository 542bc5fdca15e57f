//! Romhub frontend
//!
//! Command implementations for the `romhub` binary. Command modules pair a
//! clap `Args` struct with the function that runs it; the pipeline itself
//! lives in `romhub-core`.

pub mod browse;
pub mod install;
pub mod launch;
pub mod output;
pub mod settings;
