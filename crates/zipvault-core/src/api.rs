//! High-level public API for packing and unpacking directories.

use std::path::Path;

use crate::ArchivePassword;
use crate::ArchiveService;
use crate::CreationReport;
use crate::ExtractionReport;
use crate::Result;

/// Archives the directory `source_folder` into `destination_zip`.
///
/// With a password every entry is encrypted with AES-256. Uses the default
/// [`CompressionConfig`](crate::CompressionConfig); build an
/// [`ArchiveService`] for anything else.
///
/// # Errors
///
/// See [`ArchiveService::compress`].
///
/// # Examples
///
/// ```no_run
/// use zipvault_core::compress;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = compress("proj", "out.zip", Some("secret"))?;
/// println!("Archived {} files", report.files_added);
/// # Ok(())
/// # }
/// ```
pub fn compress<P: AsRef<Path>, Q: AsRef<Path>>(
    source_folder: P,
    destination_zip: Q,
    password: Option<&str>,
) -> Result<CreationReport> {
    ArchiveService::new().compress(
        source_folder,
        destination_zip,
        password.map(ArchivePassword::new),
    )
}

/// Extracts `archive_path` into `destination_path`.
///
/// # Errors
///
/// See [`ArchiveService::decompress`].
///
/// # Examples
///
/// ```no_run
/// use zipvault_core::decompress;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = decompress("out.zip", "restored", Some("secret"))?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn decompress<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    destination_path: Q,
    password: Option<&str>,
) -> Result<ExtractionReport> {
    ArchiveService::new().decompress(
        archive_path,
        destination_path,
        password.map(ArchivePassword::new),
    )
}
