//! Integration tests for zipvault-core.
//!
//! These tests verify end-to-end workflows with real filesystem operations.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use walkdir::WalkDir;
use zipvault_core::ArchiveError;
use zipvault_core::ArchivePassword;
use zipvault_core::ArchiveService;
use zipvault_core::CompressionConfig;
use zipvault_core::ErrorKind;
use zipvault_core::ExtractionConfig;
use zipvault_core::compress;
use zipvault_core::decompress;
use zipvault_core::reader::ArchiveReader;

fn make_project(base: &Path) -> PathBuf {
    let proj = base.join("proj");
    fs::create_dir_all(proj.join("sub")).unwrap();
    fs::write(proj.join("a.txt"), "hello").unwrap();
    fs::write(proj.join("sub/b.txt"), "world").unwrap();
    proj
}

/// Relative paths of every file under `root`, sorted.
fn tree(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<_> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(Result::unwrap)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_str()
                .unwrap()
                .replace('\\', "/");
            (rel, fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}

#[test]
fn test_scenario_secret_round_trip() {
    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());
    let out = temp.path().join("out.zip");
    let restored = temp.path().join("restored");

    compress(&proj, &out, Some("secret")).unwrap();
    decompress(&out, &restored, Some("secret")).unwrap();

    assert_eq!(fs::read_to_string(restored.join("a.txt")).unwrap(), "hello");
    assert_eq!(
        fs::read_to_string(restored.join("sub/b.txt")).unwrap(),
        "world"
    );

    let err = decompress(&out, temp.path().join("wrong"), Some("wrong")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecryptionFailed);
}

#[test]
fn test_plain_round_trip_preserves_tree() {
    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());
    fs::create_dir_all(proj.join("deep/er/still")).unwrap();
    fs::write(proj.join("deep/er/still/data.bin"), [0u8, 1, 2, 255]).unwrap();
    fs::write(proj.join("empty.txt"), "").unwrap();

    let out = temp.path().join("out.zip");
    let restored = temp.path().join("restored");

    compress(&proj, &out, None).unwrap();
    decompress(&out, &restored, None).unwrap();

    assert_eq!(tree(&proj), tree(&restored));
}

#[test]
fn test_encrypted_archive_without_password_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());
    let out = temp.path().join("out.zip");
    let restored = temp.path().join("restored");

    compress(&proj, &out, Some("secret")).unwrap();
    let err = decompress(&out, &restored, None).unwrap_err();

    assert!(err.is_password_error());
    assert!(tree(&restored).is_empty());
}

#[test]
fn test_wrong_password_leaves_no_partial_output() {
    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());
    for i in 0..20 {
        fs::write(proj.join(format!("file_{i:02}.txt")), format!("content {i}")).unwrap();
    }
    let out = temp.path().join("out.zip");
    let restored = temp.path().join("restored");

    compress(&proj, &out, Some("secret")).unwrap();
    let result = decompress(&out, &restored, Some("nope"));

    assert!(matches!(result, Err(ArchiveError::DecryptionFailed { .. })));
    assert_eq!(fs::read_dir(&restored).unwrap().count(), 0);
}

#[test]
fn test_empty_directory_round_trip() {
    let temp = TempDir::new().unwrap();
    let proj = temp.path().join("empty");
    fs::create_dir(&proj).unwrap();
    let out = temp.path().join("out.zip");
    let restored = temp.path().join("restored");

    let created = compress(&proj, &out, None).unwrap();
    assert_eq!(created.files_added, 0);
    assert!(out.exists());

    let extracted = decompress(&out, &restored, None).unwrap();
    assert_eq!(extracted.files_extracted, 0);
    assert!(restored.is_dir());
    assert_eq!(fs::read_dir(&restored).unwrap().count(), 0);
}

#[test]
fn test_entry_names_are_relative() {
    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());
    let out = temp.path().join("out.zip");

    compress(&proj, &out, Some("secret")).unwrap();

    let reader = ArchiveReader::open(&out).unwrap();
    let canonical = fs::canonicalize(&proj).unwrap();
    let prefix = canonical.to_str().unwrap();
    for name in reader.entry_names() {
        assert!(!name.starts_with('/'), "{name} starts with a separator");
        assert!(!name.contains(prefix), "{name} leaks the source root");
    }
}

#[test]
fn test_nonexistent_source_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("out.zip");

    let err = compress(temp.path().join("missing"), &out, None).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    assert!(!out.exists());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn test_destination_parent_missing() {
    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());

    let err = compress(&proj, temp.path().join("no/such/dir/out.zip"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContainerOpenFailed);
}

#[test]
fn test_decompress_corrupt_archive() {
    let temp = TempDir::new().unwrap();
    let bogus = temp.path().join("bogus.zip");
    fs::write(&bogus, b"PK\x03\x04 definitely not a real archive").unwrap();

    let err = decompress(&bogus, temp.path().join("out"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ContainerOpenFailed);
}

#[test]
fn test_compress_overwrites_existing_archive() {
    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());
    let out = temp.path().join("out.zip");
    fs::write(&out, "old garbage").unwrap();

    compress(&proj, &out, None).unwrap();

    let reader = ArchiveReader::open(&out).unwrap();
    assert_eq!(reader.len(), 2);
}

#[test]
fn test_service_with_custom_config() {
    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());
    fs::write(proj.join(".env"), "TOKEN=1").unwrap();
    let out = temp.path().join("out.zip");
    let restored = temp.path().join("restored");

    let service = ArchiveService::with_config(
        CompressionConfig::default()
            .with_include_hidden(false)
            .with_compression_level(9),
        ExtractionConfig::default().with_overwrite(false),
    );

    let created = service.compress(&proj, &out, None).unwrap();
    assert_eq!(created.files_added, 2);

    service.decompress(&out, &restored, None).unwrap();
    assert!(!restored.join(".env").exists());

    // Second extraction into the same place conflicts.
    let err = service.decompress(&out, &restored, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_fails_compress() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());
    let locked = proj.join("locked.txt");
    fs::write(&locked, "secret").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; nothing to check in that case.
    if fs::read(&locked).is_ok() {
        return;
    }

    let out = temp.path().join("out.zip");
    let err = compress(&proj, &out, None).unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::EntryWriteFailed { ref entry, .. } if entry == "locked.txt"
    ));
    assert!(!out.exists());
}

#[cfg(unix)]
#[test]
fn test_permissions_round_trip() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let proj = make_project(temp.path());
    let script = proj.join("run.sh");
    fs::write(&script, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let out = temp.path().join("out.zip");
    let restored = temp.path().join("restored");
    let service = ArchiveService::with_config(
        CompressionConfig::default(),
        ExtractionConfig::default().with_preserve_permissions(true),
    );

    service.compress(&proj, &out, None).unwrap();
    service.decompress(&out, &restored, None).unwrap();

    let mode = fs::metadata(restored.join("run.sh"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);
}

#[test]
fn test_password_debug_never_prints_secret() {
    let password = ArchivePassword::new("correct horse battery staple");
    assert!(!format!("{password:?}").contains("horse"));
}
