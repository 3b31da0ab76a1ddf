//! CLI command implementations.

pub mod classify;
pub mod common;
pub mod config;
pub mod detect;
pub mod init;
pub mod run;
