/// Command-line interface and subcommand dispatch
pub mod cli;
/// Constants and tunable pipeline parameters
pub mod configuration;
/// Error taxonomy shared by every module
pub mod error;
/// Image loading, export and size formatting
pub mod image;
/// Progress display for extraction passes
pub mod progress;
