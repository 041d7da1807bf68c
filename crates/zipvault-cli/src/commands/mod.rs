//! Subcommand implementations.

pub mod completion;
pub mod compress;
pub mod decompress;
