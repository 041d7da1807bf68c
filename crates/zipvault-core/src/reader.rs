//! ZIP container reader.
//!
//! Extraction is all-or-nothing. Entries are decoded into a hidden staging
//! directory created inside the destination and moved into place only after
//! every entry decoded and decrypted cleanly. Any failure discards the staging
//! directory, so a wrong password or a corrupt entry never leaves truncated
//! files in the destination. Before the first move every target path is
//! checked; files that get replaced are parked until all entries are in place
//! and restored if a later move fails.

use crate::ArchiveError;
use crate::ArchivePassword;
use crate::Result;
use crate::config::ExtractionConfig;
use crate::report::ExtractionReport;
use crate::report::NoopProgress;
use crate::report::ProgressCallback;
use log::debug;
use log::info;
use log::warn;
use std::fs;
use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::ZipArchive;
use zip::result::ZipError;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reads and extracts an existing ZIP container.
///
/// The handle is released by [`close`](Self::close) or when the reader is
/// dropped, whichever comes first.
///
/// # Examples
///
/// ```no_run
/// use zipvault_core::ArchivePassword;
/// use zipvault_core::reader::ArchiveReader;
///
/// let mut reader = ArchiveReader::open("out.zip")?;
/// reader.set_password(ArchivePassword::new("secret"));
/// let result = reader.extract_all("restored");
/// reader.close();
/// let report = result?;
/// println!("extracted {} files", report.files_extracted);
/// # Ok::<(), zipvault_core::ArchiveError>(())
/// ```
pub struct ArchiveReader {
    path: PathBuf,
    archive: Option<ZipArchive<BufReader<File>>>,
    config: ExtractionConfig,
    password: Option<ArchivePassword>,
}

impl ArchiveReader {
    /// Opens the archive at `path` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ContainerOpenFailed` if the file is missing or is not a
    /// valid ZIP container.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(path, ExtractionConfig::default())
    }

    /// Opens the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ContainerOpenFailed` if the file is missing or is not a
    /// valid ZIP container.
    pub fn with_config(path: impl AsRef<Path>, config: ExtractionConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| ArchiveError::open_failed(&path, e))?;
        let archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| ArchiveError::open_failed(&path, e))?;

        debug!("opened {} ({} entries)", path.display(), archive.len());

        Ok(Self {
            path,
            archive: Some(archive),
            config,
            password: None,
        })
    }

    /// Sets the password used to decrypt encrypted entries.
    pub fn set_password(&mut self, password: ArchivePassword) {
        self.password = Some(password);
    }

    /// Returns the archive path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of entries, or 0 once closed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.as_ref().map_or(0, ZipArchive::len)
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the entry names in central-directory order.
    #[must_use]
    pub fn entry_names(&self) -> Vec<String> {
        self.archive
            .as_ref()
            .map(|archive| archive.file_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if any entry is encrypted.
    ///
    /// # Errors
    ///
    /// Returns `ContainerOpenFailed` if the reader is closed, and
    /// `ExtractionFailed` if an entry header cannot be read.
    pub fn has_encrypted_entries(&mut self) -> Result<bool> {
        let archive = self.archive_mut()?;
        for index in 0..archive.len() {
            let entry = archive
                .by_index_raw(index)
                .map_err(|e| ArchiveError::extraction(format!("#{index}"), e))?;
            if entry.encrypted() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Extracts every entry under `destination`.
    ///
    /// # Errors
    ///
    /// Returns `DecryptionFailed` for an encrypted entry with a missing or
    /// wrong password, and `ExtractionFailed` if an entry name is unsafe or
    /// any file cannot be written. On error the destination is left as it
    /// was before the call.
    pub fn extract_all(&mut self, destination: impl AsRef<Path>) -> Result<ExtractionReport> {
        self.extract_all_with_progress(destination, &mut NoopProgress)
    }

    /// Extracts every entry under `destination`, reporting progress.
    ///
    /// # Errors
    ///
    /// Same as [`extract_all`](Self::extract_all).
    pub fn extract_all_with_progress(
        &mut self,
        destination: impl AsRef<Path>,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let destination = destination.as_ref();
        let dest_name = || destination.display().to_string();

        fs::create_dir_all(destination).map_err(|e| ArchiveError::extraction(dest_name(), e))?;
        let staging = tempfile::Builder::new()
            .prefix(".zipvault-staging-")
            .tempdir_in(destination)
            .map_err(|e| ArchiveError::extraction(dest_name(), e))?;

        let mut report = ExtractionReport::new();
        self.stage_entries(staging.path(), &mut report, progress)?;

        let staged = collect_staged(staging.path())?;
        check_targets(&staged, destination, self.config.overwrite)?;
        promote(&staged, staging.path(), destination, &mut report)?;

        if let Err(e) = staging.close() {
            warn!("could not remove staging directory: {e}");
            report.add_warning(format!("staging directory left behind: {e}"));
        }

        info!(
            "extracted {} into {} ({} files, {} bytes)",
            self.path.display(),
            destination.display(),
            report.files_extracted,
            report.bytes_written
        );
        progress.on_complete();

        Ok(report)
    }

    /// Releases the archive handle. Calling it more than once is harmless.
    pub fn close(&mut self) {
        if self.archive.take().is_some() {
            debug!("closed {}", self.path.display());
        }
        self.password = None;
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.archive.is_none()
    }

    fn archive_mut(&mut self) -> Result<&mut ZipArchive<BufReader<File>>> {
        let path = &self.path;
        self.archive
            .as_mut()
            .ok_or_else(|| ArchiveError::open_failed(path, "archive is closed"))
    }

    fn stage_entries(
        &mut self,
        staging: &Path,
        report: &mut ExtractionReport,
        progress: &mut dyn ProgressCallback,
    ) -> Result<()> {
        let preserve_permissions = self.config.preserve_permissions;
        let password = self.password.clone();
        let archive = self.archive_mut()?;
        let total = archive.len();
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

        for index in 0..total {
            let (name, encrypted) = {
                let raw = archive
                    .by_index_raw(index)
                    .map_err(|e| ArchiveError::extraction(format!("#{index}"), e))?;
                (raw.name().to_string(), raw.encrypted())
            };

            if encrypted && password.is_none() {
                return Err(ArchiveError::DecryptionFailed { entry: name });
            }

            progress.on_entry_start(&name, index + 1, Some(total));

            let opened = match &password {
                Some(password) => archive.by_index_decrypt(index, password.as_bytes()),
                None => archive.by_index(index),
            };
            let mut entry = opened.map_err(|e| match e {
                ZipError::InvalidPassword => ArchiveError::DecryptionFailed {
                    entry: name.clone(),
                },
                other => ArchiveError::extraction(&name, other),
            })?;

            let relative = entry
                .enclosed_name()
                .ok_or_else(|| ArchiveError::extraction(&name, "entry name escapes destination"))?;
            let target = staging.join(&relative);

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(|e| ArchiveError::extraction(&name, e))?;
                progress.on_entry_complete(&name);
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ArchiveError::extraction(&name, e))?;
            }
            let mut out = File::create(&target).map_err(|e| ArchiveError::extraction(&name, e))?;

            let mut bytes = 0u64;
            loop {
                let read = entry.read(&mut buffer).map_err(|e| {
                    // Corrupt AES data surfaces as an authentication failure
                    // on read rather than at open time.
                    if encrypted {
                        ArchiveError::DecryptionFailed {
                            entry: name.clone(),
                        }
                    } else {
                        ArchiveError::extraction(&name, e)
                    }
                })?;
                if read == 0 {
                    break;
                }
                out.write_all(&buffer[..read])
                    .map_err(|e| ArchiveError::extraction(&name, e))?;
                bytes += read as u64;
                progress.on_bytes_written(read as u64);
            }
            out.flush().map_err(|e| ArchiveError::extraction(&name, e))?;

            #[cfg(unix)]
            if preserve_permissions && let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o777))
                    .map_err(|e| ArchiveError::extraction(&name, e))?;
            }
            #[cfg(not(unix))]
            let _ = preserve_permissions;

            report.files_extracted += 1;
            report.bytes_written += bytes;
            debug!("staged {name} ({bytes} bytes)");
            progress.on_entry_complete(&name);
        }

        Ok(())
    }
}

impl Drop for ArchiveReader {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("path", &self.path)
            .field("entries", &self.len())
            .field("closed", &self.is_closed())
            .field("has_password", &self.password.is_some())
            .finish_non_exhaustive()
    }
}

/// A staged item, relative to the staging root.
struct Staged {
    relative: PathBuf,
    is_dir: bool,
}

fn collect_staged(staging: &Path) -> Result<Vec<Staged>> {
    WalkDir::new(staging)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| -> Result<Staged> {
            let entry =
                entry.map_err(|e| ArchiveError::extraction(staging.display().to_string(), e))?;
            let relative = entry
                .path()
                .strip_prefix(staging)
                .map_err(|e| ArchiveError::extraction(entry.path().display().to_string(), e))?
                .to_path_buf();
            Ok(Staged {
                relative,
                is_dir: entry.file_type().is_dir(),
            })
        })
        .collect()
}

/// Checks every staged item against the destination before anything moves.
///
/// Existing symlinks are never followed: a symlinked component anywhere on a
/// target path fails the extraction, as does a file where a directory is
/// needed (and the reverse). With `overwrite` off an existing file also fails.
fn check_targets(staged: &[Staged], destination: &Path, overwrite: bool) -> Result<()> {
    for item in staged {
        let name = || item.relative.display().to_string();
        let mut current = destination.to_path_buf();
        let mut components = item.relative.components().peekable();

        while let Some(component) = components.next() {
            current.push(component);
            let metadata = match fs::symlink_metadata(&current) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound => break,
                Err(e) => return Err(ArchiveError::extraction(name(), e)),
            };

            if metadata.file_type().is_symlink() {
                return Err(ArchiveError::extraction(
                    name(),
                    format!("{} is a symlink", current.display()),
                ));
            }

            if components.peek().is_some() {
                if !metadata.is_dir() {
                    return Err(ArchiveError::extraction(
                        name(),
                        format!("{} is not a directory", current.display()),
                    ));
                }
                continue;
            }

            match (item.is_dir, metadata.is_dir()) {
                (true, false) => {
                    return Err(ArchiveError::extraction(
                        name(),
                        "a file exists where a directory is needed",
                    ));
                }
                (false, true) => {
                    return Err(ArchiveError::extraction(
                        name(),
                        "a directory exists at the target path",
                    ));
                }
                (false, false) if !overwrite => {
                    return Err(ArchiveError::extraction(
                        name(),
                        "file already exists in destination",
                    ));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// A change made to the destination, kept so it can be undone.
enum Applied {
    CreatedDir(PathBuf),
    Placed(PathBuf),
    Replaced { target: PathBuf, backup: PathBuf },
}

/// Moves staged entries into `destination`.
///
/// `staged` is in walk order, so every directory precedes its contents.
/// Files being replaced are parked in a backup directory until every entry
/// is in place; on error all changes are reverted.
fn promote(
    staged: &[Staged],
    staging: &Path,
    destination: &Path,
    report: &mut ExtractionReport,
) -> Result<()> {
    let mut applied = Vec::new();
    let mut backup: Option<TempDir> = None;

    let result = apply(staged, staging, destination, &mut backup, &mut applied);
    match result {
        Ok(()) => {
            report.directories_created += applied
                .iter()
                .filter(|change| matches!(change, Applied::CreatedDir(_)))
                .count();
            Ok(())
        }
        Err(e) => {
            rollback(applied);
            Err(e)
        }
    }
}

fn apply(
    staged: &[Staged],
    staging: &Path,
    destination: &Path,
    backup: &mut Option<TempDir>,
    applied: &mut Vec<Applied>,
) -> Result<()> {
    for (index, item) in staged.iter().enumerate() {
        let name = || item.relative.display().to_string();
        let target = destination.join(&item.relative);

        if item.is_dir {
            if !target.is_dir() {
                fs::create_dir(&target).map_err(|e| ArchiveError::extraction(name(), e))?;
                applied.push(Applied::CreatedDir(target));
            }
            continue;
        }

        if fs::symlink_metadata(&target).is_ok() {
            let backup_dir = match backup.take() {
                Some(dir) => dir,
                None => tempfile::Builder::new()
                    .prefix(".zipvault-replaced-")
                    .tempdir_in(destination)
                    .map_err(|e| ArchiveError::extraction(name(), e))?,
            };
            let parked = backup_dir.path().join(index.to_string());
            *backup = Some(backup_dir);
            fs::rename(&target, &parked).map_err(|e| ArchiveError::extraction(name(), e))?;
            applied.push(Applied::Replaced {
                target: target.clone(),
                backup: parked,
            });
            fs::rename(staging.join(&item.relative), &target)
                .map_err(|e| ArchiveError::extraction(name(), e))?;
        } else {
            fs::rename(staging.join(&item.relative), &target)
                .map_err(|e| ArchiveError::extraction(name(), e))?;
            applied.push(Applied::Placed(target));
        }
    }
    Ok(())
}

/// Undoes `applied` in reverse order. Failures are logged and skipped.
fn rollback(applied: Vec<Applied>) {
    for change in applied.into_iter().rev() {
        let undone = match &change {
            Applied::CreatedDir(dir) => fs::remove_dir(dir),
            Applied::Placed(target) => fs::remove_file(target),
            Applied::Replaced { target, backup } => match fs::remove_file(target) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => fs::rename(backup, target),
            },
        };
        if let Err(e) = undone {
            let path = match &change {
                Applied::CreatedDir(path)
                | Applied::Placed(path)
                | Applied::Replaced { target: path, .. } => path,
            };
            warn!("could not roll back {}: {e}", path.display());
        }
    }
}
