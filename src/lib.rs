//! sift recipe and configuration loader
//!
//! This module exports the config provider, the recipe loader and validator,
//! and the CLI building blocks used by the `sift-recipes` binary.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod recipe;
