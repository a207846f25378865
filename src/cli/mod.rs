//! CLI command handlers
//!
//! - Argument parsing structures
//! - Command implementations
//! - Log level selection

pub mod args;
pub mod commands;
pub mod help;
pub mod router;

// Re-export the main CLI structures for convenience
pub use args::{Cli, Commands, ResultsCommands};
pub use help::get_log_level;
pub use router::execute_command;
