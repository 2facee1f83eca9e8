//! Command-line interface module.

mod args;
mod convert;
mod picker;
mod scan;

pub use args::{Cli, Commands};
pub use convert::run_convert;
pub use scan::run_scan;
