//! lincli: command-line client for Linear
//!
//! Keeps a local cache of teams, workflow states, users and projects so that
//! issue creation can resolve names and defaults without refetching them.

pub mod cli;
pub mod core;
