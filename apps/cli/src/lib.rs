//! Shared plumbing for the `execute-notebooks` and `generate-notebooks-page`
//! binaries: argument parsing, tracing setup, and the command bodies.

pub mod cli;
pub mod commands;
