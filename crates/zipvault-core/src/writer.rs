//! ZIP container writer.
//!
//! The archive is written to a hidden temporary file next to the destination
//! and renamed over the destination only by [`ArchiveWriter::finalize`]. A
//! writer dropped before finalizing removes its temporary file, so a failed
//! compress never leaves a partial archive behind.

use crate::ArchiveError;
use crate::ArchivePassword;
use crate::Result;
use crate::config::CompressionConfig;
use crate::report::CreationReport;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use log::debug;
use log::info;
use std::fs::File;
use std::fs::Metadata;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use zip::AesMode;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Writes files into a new ZIP container.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use zipvault_core::ArchivePassword;
/// use zipvault_core::writer::ArchiveWriter;
///
/// let mut writer = ArchiveWriter::create("out.zip")?;
/// writer.set_password(ArchivePassword::new("secret"));
/// writer.add_entry(Path::new("/data/proj/a.txt"), "a.txt")?;
/// let report = writer.finalize()?;
/// assert!(report.encrypted);
/// # Ok::<(), zipvault_core::ArchiveError>(())
/// ```
pub struct ArchiveWriter {
    destination: PathBuf,
    staging_path: PathBuf,
    zip: ZipWriter<BufWriter<NamedTempFile>>,
    config: CompressionConfig,
    password: Option<ArchivePassword>,
    report: CreationReport,
    failed_entry: Option<String>,
    buffer: Vec<u8>,
}

impl ArchiveWriter {
    /// Creates a writer for `destination` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ContainerOpenFailed` if the destination cannot be created.
    pub fn create(destination: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(destination, CompressionConfig::default())
    }

    /// Creates a writer for `destination`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCompressionLevel` for a bad configuration, and
    /// `ContainerOpenFailed` if the destination is a directory or its parent
    /// directory is missing or not writable.
    pub fn with_config(destination: impl AsRef<Path>, config: CompressionConfig) -> Result<Self> {
        config.validate()?;

        let destination = destination.as_ref().to_path_buf();
        if destination.is_dir() {
            return Err(ArchiveError::open_failed(
                destination,
                "destination is a directory",
            ));
        }

        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let temp = tempfile::Builder::new()
            .prefix(".zipvault-")
            .suffix(".part")
            .tempfile_in(parent)
            .map_err(|e| ArchiveError::open_failed(&destination, e))?;
        let staging_path =
            std::fs::canonicalize(temp.path()).unwrap_or_else(|_| temp.path().to_path_buf());

        debug!(
            "opened archive {} (staging at {})",
            destination.display(),
            staging_path.display()
        );

        Ok(Self {
            destination,
            staging_path,
            zip: ZipWriter::new(BufWriter::new(temp)),
            config,
            password: None,
            report: CreationReport::new(),
            failed_entry: None,
            buffer: vec![0u8; COPY_BUFFER_SIZE],
        })
    }

    /// Sets the password used for every entry added after this call.
    ///
    /// Entries added while a password is set are flagged for AES-256.
    pub fn set_password(&mut self, password: ArchivePassword) {
        self.password = Some(password);
    }

    /// Returns the destination path.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Returns the canonical path of the temporary file being written.
    ///
    /// Callers walking a tree that contains the destination use this to
    /// avoid archiving the archive into itself.
    #[must_use]
    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Adds the file at `path` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `EntryWriteFailed` if the file cannot be read or the codec
    /// rejects the entry.
    pub fn add_entry(&mut self, path: &Path, name: &str) -> Result<()> {
        self.add_entry_with_progress(path, name, &mut NoopProgress)
    }

    /// Adds the file at `path` under `name`, reporting progress.
    ///
    /// # Errors
    ///
    /// Same as [`add_entry`](Self::add_entry). After an error the writer
    /// refuses to finalize.
    pub fn add_entry_with_progress(
        &mut self,
        path: &Path,
        name: &str,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        if let Some(failed) = &self.failed_entry {
            return Err(ArchiveError::entry_write(
                name,
                format!("archive is unusable after failure on '{failed}'"),
            ));
        }

        progress.on_entry_start(name, self.report.files_added + 1, None);

        match self.copy_entry(path, name, progress) {
            Ok(bytes) => {
                self.report.files_added += 1;
                self.report.bytes_written += bytes;
                if self.password.is_some() {
                    self.report.encrypted = true;
                }
                debug!("added {name} ({bytes} bytes)");
                progress.on_entry_complete(name);
                Ok(())
            }
            Err(e) => {
                // Drop the half-written local header so the container stays
                // consistent until the writer is discarded.
                let _ = self.zip.abort_file();
                self.failed_entry = Some(name.to_string());
                Err(e)
            }
        }
    }

    /// Records an entry that was deliberately left out.
    pub fn record_skipped(&mut self, warning: impl Into<String>) {
        self.report.files_skipped += 1;
        self.report.add_warning(warning);
    }

    /// Writes the central directory and moves the archive into place.
    ///
    /// # Errors
    ///
    /// Returns `FinalizeFailed` if an earlier entry failed, or if the archive
    /// cannot be flushed or renamed onto the destination.
    pub fn finalize(self) -> Result<CreationReport> {
        let Self {
            destination,
            zip,
            mut report,
            failed_entry,
            ..
        } = self;

        let finalize_err = |reason: String| ArchiveError::FinalizeFailed {
            path: destination.clone(),
            reason,
        };

        if let Some(failed) = failed_entry {
            return Err(finalize_err(format!("entry '{failed}' was not written")));
        }

        let buffered = zip.finish().map_err(|e| finalize_err(e.to_string()))?;
        let temp = buffered
            .into_inner()
            .map_err(|e| finalize_err(e.error().to_string()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| finalize_err(e.to_string()))?;

        let file = temp
            .persist(&destination)
            .map_err(|e| finalize_err(e.error.to_string()))?;
        report.bytes_compressed = file.metadata().map(|m| m.len()).unwrap_or(0);

        info!(
            "finalized {} ({} files, {} bytes{})",
            destination.display(),
            report.files_added,
            report.bytes_compressed,
            if report.encrypted { ", AES-256" } else { "" }
        );

        Ok(report)
    }

    fn copy_entry(
        &mut self,
        path: &Path,
        name: &str,
        progress: &mut dyn ProgressCallback,
    ) -> Result<u64> {
        let mut file = File::open(path).map_err(|e| ArchiveError::entry_write(name, e))?;
        let metadata = file.metadata().map_err(|e| ArchiveError::entry_write(name, e))?;
        let options = self.entry_options(&metadata);

        let started = match &self.password {
            Some(password) => self.zip.start_file(
                name,
                options.with_aes_encryption(AesMode::Aes256, password.expose()),
            ),
            None => self.zip.start_file(name, options),
        };
        started.map_err(|e| ArchiveError::entry_write(name, e))?;

        let mut bytes_written = 0u64;
        loop {
            let bytes_read = file
                .read(&mut self.buffer)
                .map_err(|e| ArchiveError::entry_write(name, e))?;
            if bytes_read == 0 {
                break;
            }
            self.zip
                .write_all(&self.buffer[..bytes_read])
                .map_err(|e| ArchiveError::entry_write(name, e))?;
            bytes_written += bytes_read as u64;
            progress.on_bytes_written(bytes_read as u64);
        }

        Ok(bytes_written)
    }

    fn entry_options(&self, metadata: &Metadata) -> SimpleFileOptions {
        let level = self.config.effective_level();
        let options = if level == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(level)))
        };
        let options = options.large_file(metadata.len() >= u64::from(u32::MAX));

        if self.config.preserve_permissions {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                return options.unix_permissions(metadata.permissions().mode());
            }
        }
        options
    }
}

impl std::fmt::Debug for ArchiveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("destination", &self.destination)
            .field("staging_path", &self.staging_path)
            .field("encrypted", &self.password.is_some())
            .field("files_added", &self.report.files_added)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn open_zip(path: &Path) -> zip::ZipArchive<File> {
        zip::ZipArchive::new(File::open(path).unwrap()).unwrap()
    }

    #[test]
    fn test_writer_plain_entries() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "hello").unwrap();
        let output = temp.path().join("out.zip");

        let mut writer = ArchiveWriter::create(&output).unwrap();
        writer.add_entry(&source, "a.txt").unwrap();
        writer.add_entry(&source, "sub/copy.txt").unwrap();
        let report = writer.finalize().unwrap();

        assert_eq!(report.files_added, 2);
        assert_eq!(report.bytes_written, 10);
        assert!(!report.encrypted);
        assert!(report.bytes_compressed > 0);

        let mut archive = open_zip(&output);
        assert_eq!(archive.len(), 2);
        let mut entry = archive.by_name("sub/copy.txt").unwrap();
        assert!(!entry.encrypted());
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello");
    }

    #[test]
    fn test_writer_encrypts_every_entry_with_password() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "hello").unwrap();
        let output = temp.path().join("out.zip");

        let mut writer = ArchiveWriter::create(&output).unwrap();
        writer.set_password(ArchivePassword::new("secret"));
        writer.add_entry(&source, "a.txt").unwrap();
        writer.add_entry(&source, "b.txt").unwrap();
        let report = writer.finalize().unwrap();
        assert!(report.encrypted);

        let mut archive = open_zip(&output);
        for i in 0..archive.len() {
            assert!(archive.by_index_raw(i).unwrap().encrypted());
        }

        let mut entry = archive.by_index_decrypt(0, b"secret").unwrap();
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "hello");
    }

    #[test]
    fn test_writer_empty_archive_is_valid() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("empty.zip");

        let report = ArchiveWriter::create(&output).unwrap().finalize().unwrap();
        assert_eq!(report.files_added, 0);

        let archive = open_zip(&output);
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_writer_missing_parent_fails_to_open() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("missing/dir/out.zip");

        let result = ArchiveWriter::create(&output);
        assert!(matches!(
            result,
            Err(ArchiveError::ContainerOpenFailed { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_writer_destination_is_directory() {
        let temp = TempDir::new().unwrap();
        let result = ArchiveWriter::create(temp.path());
        assert!(matches!(
            result,
            Err(ArchiveError::ContainerOpenFailed { .. })
        ));
    }

    #[test]
    fn test_writer_missing_source_file_fails_entry() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.zip");

        let mut writer = ArchiveWriter::create(&output).unwrap();
        let result = writer.add_entry(&temp.path().join("gone.txt"), "gone.txt");
        assert!(matches!(
            result,
            Err(ArchiveError::EntryWriteFailed { ref entry, .. }) if entry == "gone.txt"
        ));

        let finalized = writer.finalize();
        assert!(matches!(
            finalized,
            Err(ArchiveError::FinalizeFailed { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_dropped_writer_leaves_no_files() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "hello").unwrap();
        let output = temp.path().join("out.zip");

        {
            let mut writer = ArchiveWriter::create(&output).unwrap();
            writer.add_entry(&source, "a.txt").unwrap();
        }

        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("a.txt")]);
    }

    #[test]
    fn test_writer_stored_level() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.txt");
        fs::write(&source, "hello hello hello").unwrap();
        let output = temp.path().join("out.zip");

        let config = CompressionConfig::default().with_compression_level(0);
        let mut writer = ArchiveWriter::with_config(&output, config).unwrap();
        writer.add_entry(&source, "a.txt").unwrap();
        writer.finalize().unwrap();

        let mut archive = open_zip(&output);
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_writer_rejects_invalid_level() {
        let temp = TempDir::new().unwrap();
        let config = CompressionConfig::default().with_compression_level(11);
        let result = ArchiveWriter::with_config(temp.path().join("out.zip"), config);
        assert!(matches!(
            result,
            Err(ArchiveError::InvalidCompressionLevel { level: 11 })
        ));
    }

    #[test]
    fn test_record_skipped() {
        let temp = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::create(temp.path().join("out.zip")).unwrap();
        writer.record_skipped("Skipped symlink: link");
        let report = writer.finalize().unwrap();
        assert_eq!(report.files_skipped, 1);
        assert!(report.has_warnings());
    }

    #[test]
    fn test_debug_hides_password() {
        let temp = TempDir::new().unwrap();
        let mut writer = ArchiveWriter::create(temp.path().join("out.zip")).unwrap();
        writer.set_password(ArchivePassword::new("hunter2"));
        let debug = format!("{writer:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("encrypted: true"));
    }
}
