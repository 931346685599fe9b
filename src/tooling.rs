//! CLI Tooling
//!
//! Operational front-end for the update server: render documents, warm the
//! cache, inspect configuration.

pub mod cli;
