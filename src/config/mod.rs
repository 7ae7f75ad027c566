#[cfg(feature = "cli")]
pub mod cli;
pub mod courts;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliArgs, OutputFormat};
pub use courts::CourtDirectory;
pub use toml_config::{LogFormat, LookupConfig};
