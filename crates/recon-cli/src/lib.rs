//! Library side of the `recon` command: configuration, logging and the
//! file-level workflow shared by every subcommand.

pub mod config;
pub mod logging;
pub mod workflow;
