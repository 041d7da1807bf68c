//! Compress/decompress orchestration.

use crate::ArchivePassword;
use crate::Result;
use crate::config::CompressionConfig;
use crate::config::ExtractionConfig;
use crate::reader::ArchiveReader;
use crate::report::CreationReport;
use crate::report::ExtractionReport;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use crate::walker::DirectoryWalker;
use crate::walker::SourceRoot;
use crate::walker::WalkEntry;
use crate::writer::ArchiveWriter;
use log::debug;
use log::warn;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Packs directories into ZIP archives and unpacks them again.
///
/// Each call owns its container from open to close; the service holds only
/// configuration, so one instance can serve any number of calls.
///
/// # Examples
///
/// ```no_run
/// use zipvault_core::ArchivePassword;
/// use zipvault_core::ArchiveService;
///
/// let service = ArchiveService::new();
/// service.compress("proj", "out.zip", Some(ArchivePassword::new("secret")))?;
/// service.decompress("out.zip", "restored", Some(ArchivePassword::new("secret")))?;
/// # Ok::<(), zipvault_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveService {
    compression: CompressionConfig,
    extraction: ExtractionConfig,
}

impl ArchiveService {
    /// Creates a service with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service with explicit configuration.
    #[must_use]
    pub fn with_config(compression: CompressionConfig, extraction: ExtractionConfig) -> Self {
        Self {
            compression,
            extraction,
        }
    }

    /// Returns the compression configuration.
    #[must_use]
    pub fn compression_config(&self) -> &CompressionConfig {
        &self.compression
    }

    /// Returns the extraction configuration.
    #[must_use]
    pub fn extraction_config(&self) -> &ExtractionConfig {
        &self.extraction
    }

    /// Archives every file under `source` into `destination`.
    ///
    /// # Errors
    ///
    /// - `SourceNotFound` if `source` is not a directory (checked before the
    ///   destination is touched)
    /// - `ContainerOpenFailed` if `destination` cannot be created
    /// - `EntryWriteFailed` if any file cannot be read or added
    /// - `FinalizeFailed` if the archive cannot be made durable
    pub fn compress(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<ArchivePassword>,
    ) -> Result<CreationReport> {
        self.compress_with_progress(source, destination, password, &mut NoopProgress)
    }

    /// Same as [`compress`](Self::compress), reporting progress.
    pub fn compress_with_progress(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<ArchivePassword>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<CreationReport> {
        let start = Instant::now();
        self.compression.validate()?;

        let root = SourceRoot::resolve(source)?;
        let mut writer = ArchiveWriter::with_config(destination, self.compression.clone())?;
        if let Some(password) = password {
            writer.set_password(password);
        }

        // An archive from an earlier run may sit inside the source tree.
        let previous = fs::canonicalize(writer.destination()).ok();

        let walker = DirectoryWalker::new(&root, &self.compression);
        for entry in walker.walk() {
            match entry? {
                WalkEntry::File(file)
                    if file.path == writer.staging_path()
                        || previous.as_deref() == Some(file.path.as_path()) =>
                {
                    debug!("skipping destination archive {}", file.path.display());
                }
                WalkEntry::File(file) => {
                    writer.add_entry_with_progress(&file.path, &file.archive_name, progress)?;
                }
                WalkEntry::SkippedSymlink(path) => {
                    warn!("skipping symlink {}", path.display());
                    writer.record_skipped(format!("Skipped symlink: {}", path.display()));
                }
            }
        }

        let mut report = writer.finalize()?;
        report.duration = start.elapsed();
        progress.on_complete();

        Ok(report)
    }

    /// Extracts every entry of `archive` under `destination`.
    ///
    /// # Errors
    ///
    /// - `ContainerOpenFailed` if `archive` is missing or not a ZIP file
    /// - `DecryptionFailed` on a missing or wrong password
    /// - `ExtractionFailed` if any entry cannot be written
    ///
    /// The archive handle is closed before this returns, on success and on
    /// failure.
    pub fn decompress(
        &self,
        archive: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<ArchivePassword>,
    ) -> Result<ExtractionReport> {
        self.decompress_with_progress(archive, destination, password, &mut NoopProgress)
    }

    /// Same as [`decompress`](Self::decompress), reporting progress.
    pub fn decompress_with_progress(
        &self,
        archive: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<ArchivePassword>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let start = Instant::now();

        let mut reader = ArchiveReader::with_config(archive, self.extraction.clone())?;
        if let Some(password) = password {
            reader.set_password(password);
        }

        let result = reader.extract_all_with_progress(destination, progress);
        reader.close();

        let mut report = result?;
        report.duration = start.elapsed();
        Ok(report)
    }

    /// Boolean form of [`compress`](Self::compress). Failures are logged.
    pub fn compress_ok(
        &self,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<ArchivePassword>,
    ) -> bool {
        match self.compress(source, destination, password) {
            Ok(_) => true,
            Err(e) => {
                warn!("compress failed ({}): {e}", e.kind());
                false
            }
        }
    }

    /// Boolean form of [`decompress`](Self::decompress). Failures are logged.
    pub fn decompress_ok(
        &self,
        archive: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        password: Option<ArchivePassword>,
    ) -> bool {
        match self.decompress(archive, destination, password) {
            Ok(_) => true,
            Err(e) => {
                warn!("decompress failed ({}): {e}", e.kind());
                false
            }
        }
    }
}
