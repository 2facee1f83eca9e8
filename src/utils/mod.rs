//! Shared utilities.
//!
//! - `exec` - External command execution

pub mod exec;
