//! CLI subcommand implementations.

pub mod common;
pub mod config;
pub mod decompose;
pub mod hpss;
pub mod nn_filter;
pub mod profiles;
