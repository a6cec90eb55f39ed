//! Command handlers for the compilecmp CLI
//!
//! Each submodule handles one subcommand.

pub mod completions;
pub mod funcs;
pub mod sizes;

pub use completions::cmd_completions;
pub use funcs::{cmd_funcs, FuncsOptions};
pub use sizes::cmd_sizes;
