//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `import-orders` - Load orders from a CSV file

pub mod args;

pub use args::{Cli, Commands};
