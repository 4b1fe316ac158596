//! CLI commands

pub mod analyze;
pub mod init;
