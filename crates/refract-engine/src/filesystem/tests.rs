//! Unit tests for the file system implementations.

use std::path::Path;

use rstest::rstest;
use tempfile::TempDir;

use super::*;

#[test]
fn local_reads_and_writes_relative_to_root() {
    let dir = TempDir::new().expect("temp dir");
    let fs = LocalFileSystem::new(dir.path());
    assert_eq!(fs.root(), dir.path());

    fs.create_file(Path::new("notes.txt"), b"hello\n")
        .expect("create");

    assert!(fs.exists(Path::new("notes.txt")));
    assert!(dir.path().join("notes.txt").is_file());
    assert_eq!(
        fs.read_to_string(Path::new("notes.txt")).expect("read"),
        "hello\n"
    );
}

#[test]
fn local_accepts_absolute_paths() {
    let dir = TempDir::new().expect("temp dir");
    let absolute = dir.path().join("abs.txt");
    std::fs::write(&absolute, "absolute").expect("write");

    let fs = LocalFileSystem::new("/does/not/matter");
    assert_eq!(fs.read_to_string(&absolute).expect("read"), "absolute");
}

#[test]
fn local_reports_missing_file() {
    let dir = TempDir::new().expect("temp dir");
    let fs = LocalFileSystem::new(dir.path());

    let error = fs
        .read_to_string(Path::new("missing.txt"))
        .expect_err("missing file");
    assert!(matches!(error, FileSystemError::NotFound { .. }));
}

#[test]
fn local_write_into_missing_directory_fails() {
    let dir = TempDir::new().expect("temp dir");
    let fs = LocalFileSystem::new(dir.path());

    let error = fs
        .create_file(Path::new("no/such/dir/file.diff"), b"x")
        .expect_err("write should fail");
    assert!(matches!(error, FileSystemError::Write { .. }));
}

#[rstest]
#[case::relative("foo.go")]
#[case::absolute("/workspace/foo.go")]
fn memory_resolves_paths_against_root(#[case] lookup: &str) {
    let fs = MemoryFileSystem::new("/workspace").with_file("foo.go", "package foo\n");
    assert!(fs.exists(Path::new(lookup)));
    assert_eq!(
        fs.read_to_string(Path::new(lookup)).expect("read"),
        "package foo\n"
    );
}

#[test]
fn memory_create_file_replaces_contents() {
    let fs = MemoryFileSystem::new("/workspace").with_file("a.txt", "old");
    fs.create_file(Path::new("a.txt"), b"new").expect("create");
    assert_eq!(fs.contents("a.txt").as_deref(), Some("new"));
}

#[test]
fn fs_operations_use_kind_tag() {
    let operation: FsOperation =
        serde_json::from_str(r#"{"kind":"rename","path":"a.go","new_name":"b.go"}"#)
            .expect("deserialise");
    assert_eq!(
        operation,
        FsOperation::Rename {
            path: "a.go".into(),
            new_name: "b.go".into(),
        }
    );
}
