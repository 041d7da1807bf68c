//! Error types for archive packaging and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Fieldless discriminant of [`ArchiveError`].
///
/// Useful for callers that only need to branch on the failure class, and for
/// machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The directory to compress is missing or not a directory.
    SourceNotFound,
    /// The container could not be created or opened.
    ContainerOpenFailed,
    /// A source file could not be read or added.
    EntryWriteFailed,
    /// The container could not be made durable.
    FinalizeFailed,
    /// Wrong or missing password for an encrypted entry.
    DecryptionFailed,
    /// An entry could not be written to the destination.
    ExtractionFailed,
    /// The operation was configured with invalid settings.
    InvalidConfig,
}

impl ErrorKind {
    /// Returns a stable snake_case name for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceNotFound => "source_not_found",
            Self::ContainerOpenFailed => "container_open_failed",
            Self::EntryWriteFailed => "entry_write_failed",
            Self::FinalizeFailed => "finalize_failed",
            Self::DecryptionFailed => "decryption_failed",
            Self::ExtractionFailed => "extraction_failed",
            Self::InvalidConfig => "invalid_config",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while compressing or decompressing an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Source directory does not exist or is not a directory.
    #[error("source directory not found: {path}")]
    SourceNotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// Destination archive cannot be created, or source archive cannot be
    /// opened or parsed.
    #[error("cannot open archive {path}: {reason}")]
    ContainerOpenFailed {
        /// The archive path.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },

    /// A file could not be read from disk or added to the container.
    #[error("cannot add entry '{entry}': {reason}")]
    EntryWriteFailed {
        /// Relative archive name (or source path if no name was computed yet).
        entry: String,
        /// Underlying cause.
        reason: String,
    },

    /// Central directory write or the final rename failed.
    #[error("cannot finalize archive {path}: {reason}")]
    FinalizeFailed {
        /// The destination archive path.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },

    /// Entry is encrypted and the password is missing or wrong.
    #[error("cannot decrypt entry '{entry}': missing or wrong password")]
    DecryptionFailed {
        /// The encrypted entry name.
        entry: String,
    },

    /// An entry could not be extracted to the destination.
    #[error("cannot extract entry '{entry}': {reason}")]
    ExtractionFailed {
        /// The entry name.
        entry: String,
        /// Underlying cause.
        reason: String,
    },

    /// Compression level outside `0..=9`.
    #[error("invalid compression level {level}, expected 0-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },
}

impl ArchiveError {
    /// Returns the fieldless kind of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use zipvault_core::ArchiveError;
    /// use zipvault_core::ErrorKind;
    ///
    /// let err = ArchiveError::DecryptionFailed {
    ///     entry: "a.txt".to_string(),
    /// };
    /// assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceNotFound { .. } => ErrorKind::SourceNotFound,
            Self::ContainerOpenFailed { .. } => ErrorKind::ContainerOpenFailed,
            Self::EntryWriteFailed { .. } => ErrorKind::EntryWriteFailed,
            Self::FinalizeFailed { .. } => ErrorKind::FinalizeFailed,
            Self::DecryptionFailed { .. } => ErrorKind::DecryptionFailed,
            Self::ExtractionFailed { .. } => ErrorKind::ExtractionFailed,
            Self::InvalidCompressionLevel { .. } => ErrorKind::InvalidConfig,
        }
    }

    /// Returns `true` if retrying with a different password could succeed.
    #[must_use]
    pub const fn is_password_error(&self) -> bool {
        matches!(self, Self::DecryptionFailed { .. })
    }

    /// Returns the entry name this error refers to, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use zipvault_core::ArchiveError;
    ///
    /// let err = ArchiveError::ExtractionFailed {
    ///     entry: "sub/b.txt".to_string(),
    ///     reason: "disk full".to_string(),
    /// };
    /// assert_eq!(err.entry(), Some("sub/b.txt"));
    ///
    /// let err = ArchiveError::SourceNotFound {
    ///     path: PathBuf::from("/missing"),
    /// };
    /// assert_eq!(err.entry(), None);
    /// ```
    #[must_use]
    pub fn entry(&self) -> Option<&str> {
        match self {
            Self::EntryWriteFailed { entry, .. }
            | Self::DecryptionFailed { entry }
            | Self::ExtractionFailed { entry, .. } => Some(entry),
            _ => None,
        }
    }

    pub(crate) fn open_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ContainerOpenFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn entry_write(entry: impl Into<String>, reason: impl ToString) -> Self {
        Self::EntryWriteFailed {
            entry: entry.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn extraction(entry: impl Into<String>, reason: impl ToString) -> Self {
        Self::ExtractionFailed {
            entry: entry.into(),
            reason: reason.to_string(),
        }
    }
}
