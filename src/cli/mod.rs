//! CLI command implementations

pub mod error;
pub mod fetch;
pub mod lookup;
pub mod sets;

pub use error::CliError;
pub use fetch::{Cli, Commands, FetchArgs};
pub use lookup::LookupArgs;
pub use sets::SetsCommand;
