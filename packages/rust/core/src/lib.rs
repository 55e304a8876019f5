//! Runner orchestration, title extraction, and page generation for the
//! notebook CI tools.
//!
//! This crate ties discovery to the two workflows: re-executing notebooks
//! in place (`runner`) and writing the generated notebooks page (`page`).

pub mod page;
pub mod runner;
pub mod title;
