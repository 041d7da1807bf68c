//! Configuration for compress and decompress operations.

use crate::ArchiveError;
use crate::Result;

/// Default deflate level.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Configuration for building an archive from a directory.
///
/// # Examples
///
/// ```
/// use zipvault_core::CompressionConfig;
///
/// let config = CompressionConfig::default()
///     .with_compression_level(9)
///     .with_follow_symlinks(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionConfig {
    /// Compression level: `0` stores entries uncompressed, `1`-`9` selects
    /// deflate. `None` uses the default level.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Follow symlinks and archive the files they point to.
    ///
    /// Default: `false` (symlinks are skipped and reported).
    pub follow_symlinks: bool,

    /// Include files and directories whose name starts with `.`.
    ///
    /// Default: `true`.
    pub include_hidden: bool,

    /// Store unix permission bits on each entry.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(DEFAULT_COMPRESSION_LEVEL),
            follow_symlinks: false,
            include_hidden: true,
            preserve_permissions: true,
        }
    }
}

impl CompressionConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level (`0` = stored).
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Sets whether to follow symlinks.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Sets whether to include hidden files.
    #[must_use]
    pub fn with_include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Sets whether to store permission bits.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Returns the effective level, falling back to the default.
    #[must_use]
    pub fn effective_level(&self) -> u8 {
        self.compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCompressionLevel` if the level is above 9.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && level > 9
        {
            return Err(ArchiveError::InvalidCompressionLevel { level });
        }
        Ok(())
    }
}

/// Configuration for extracting an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Replace files that already exist in the destination.
    ///
    /// When `false`, an existing target fails the extraction before anything
    /// is moved into the destination.
    ///
    /// Default: `true`.
    pub overwrite: bool,

    /// Apply unix permission bits recorded in the archive.
    ///
    /// Default: `false`.
    pub preserve_permissions: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            overwrite: true,
            preserve_permissions: false,
        }
    }
}

impl ExtractionConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether existing files may be replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets whether to apply archived permission bits.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_config_default() {
        let config = CompressionConfig::default();
        assert_eq!(config.compression_level, Some(6));
        assert!(!config.follow_symlinks);
        assert!(config.include_hidden);
        assert!(config.preserve_permissions);
    }

    #[test]
    fn test_compression_config_builder() {
        let config = CompressionConfig::new()
            .with_compression_level(0)
            .with_follow_symlinks(true)
            .with_include_hidden(false)
            .with_preserve_permissions(false);

        assert_eq!(config.compression_level, Some(0));
        assert!(config.follow_symlinks);
        assert!(!config.include_hidden);
        assert!(!config.preserve_permissions);
    }

    #[test]
    fn test_effective_level_falls_back_to_default() {
        let config = CompressionConfig {
            compression_level: None,
            ..Default::default()
        };
        assert_eq!(config.effective_level(), DEFAULT_COMPRESSION_LEVEL);
    }

    #[test]
    fn test_validate_accepts_stored_and_deflate_levels() {
        for level in 0..=9 {
            let config = CompressionConfig::default().with_compression_level(level);
            assert!(config.validate().is_ok(), "level {level} should be valid");
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range_level() {
        let config = CompressionConfig::default().with_compression_level(10);
        assert!(matches!(
            config.validate(),
            Err(ArchiveError::InvalidCompressionLevel { level: 10 })
        ));
    }

    #[test]
    fn test_extraction_config_default() {
        let config = ExtractionConfig::default();
        assert!(config.overwrite);
        assert!(!config.preserve_permissions);

        let config = ExtractionConfig::new()
            .with_overwrite(false)
            .with_preserve_permissions(true);
        assert!(!config.overwrite);
        assert!(config.preserve_permissions);
    }
}
