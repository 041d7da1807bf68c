//! Directory-to-ZIP packaging and extraction with optional AES-256
//! encryption.
//!
//! `zipvault-core` walks a directory tree into a ZIP container and extracts
//! it again. When a password is given, every entry is encrypted with WinZip
//! AES-256. Failures are reported as a typed [`ArchiveError`] so callers can
//! tell a missing source from a full disk or a wrong password.
//!
//! # Examples
//!
//! ```no_run
//! use zipvault_core::compress;
//! use zipvault_core::decompress;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! compress("proj", "out.zip", Some("secret"))?;
//! let report = decompress("out.zip", "restored", Some("secret"))?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod password;
pub mod reader;
pub mod report;
pub mod service;
pub mod walker;
pub mod writer;

// Re-export main API types
pub use api::compress;
pub use api::decompress;
pub use config::CompressionConfig;
pub use config::ExtractionConfig;
pub use error::ArchiveError;
pub use error::ErrorKind;
pub use error::Result;
pub use password::ArchivePassword;
pub use report::CreationReport;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use service::ArchiveService;
