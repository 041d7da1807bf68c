//! Error conversion utilities for CLI.
//!
//! Converts zipvault-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use std::path::Path;
use zipvault_core::ArchiveError;

/// Converts `ArchiveError` to user-friendly anyhow error with context.
///
/// `target` is the archive being written or read. The original error stays
/// in the chain so its kind can be recovered with [`archive_error`].
pub fn convert_archive_error(err: ArchiveError, target: &Path) -> anyhow::Error {
    let message = match &err {
        ArchiveError::SourceNotFound { path } => format!(
            "Source directory not found: {}\n\
             HINT: The source must be an existing directory, not a file.",
            path.display()
        ),
        ArchiveError::ContainerOpenFailed { path, .. } => format!(
            "Cannot open archive '{}'\n\
             HINT: Check that the path exists, its parent directory is writable, \
             and the file is a ZIP archive.",
            path.display()
        ),
        ArchiveError::EntryWriteFailed { entry, .. } => format!(
            "Cannot add '{}' to '{}'\n\
             HINT: Check read permissions on the source tree. No archive was written.",
            entry,
            target.display()
        ),
        ArchiveError::FinalizeFailed { path, .. } => format!(
            "Cannot finalize archive '{}'\n\
             HINT: The disk may be full or the destination directory read-only.",
            path.display()
        ),
        ArchiveError::DecryptionFailed { entry } => format!(
            "Cannot decrypt '{}' in '{}': missing or wrong password\n\
             HINT: Pass the password with --password-env VAR or --password.",
            entry,
            target.display()
        ),
        ArchiveError::ExtractionFailed { entry, .. } => format!(
            "Cannot extract '{}' from '{}'\n\
             HINT: The output directory was left unchanged. Drop --no-overwrite \
             to replace existing files, and remove symlinks from the output path.",
            entry,
            target.display()
        ),
        ArchiveError::InvalidCompressionLevel { .. } => "Invalid compression settings".to_string(),
    };

    anyhow::Error::new(err).context(message)
}

/// Adds archive context to a core result.
pub fn add_archive_context<T>(
    result: zipvault_core::Result<T>,
    target: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, target))
}

/// Finds the engine error behind a converted error, if there is one.
pub fn archive_error(error: &anyhow::Error) -> Option<&ArchiveError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ArchiveError>())
}
