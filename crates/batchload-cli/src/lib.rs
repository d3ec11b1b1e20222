//! Command-line driver for the batch loader.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
