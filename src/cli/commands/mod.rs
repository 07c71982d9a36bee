//! CLI command implementations

pub mod completions;
pub mod config;
pub mod create;
pub mod info;
pub mod init;
pub mod list;
pub mod search;
pub mod sync;
