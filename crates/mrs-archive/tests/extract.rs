//! Extraction behavior: destinations, idempotence, batch semantics.

mod common;

use common::{build_archive, file, write_archive_file};
use mrs_archive::{Error, MrsArchive, Variant};

fn sample_archive(dir: &tempfile::TempDir) -> MrsArchive {
    let image = build_archive(
        Variant::Mrs2,
        &[
            file("sound/bgm/title.ogg", b"ogg ogg ogg ogg ogg ogg"),
            file("sound/effect/fire.wav", b"wav wav wav wav"),
            file("readme.txt", b"top level file"),
        ],
    );
    let path = write_archive_file(dir, "sample.mrs", &image);
    MrsArchive::open(path).unwrap()
}

#[test]
fn extract_file_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let archive = sample_archive(&dir);
    let dest = dir.path().join("out/title.ogg");

    assert!(archive.extract_file("sound/bgm/title.ogg", &dest).unwrap());
    let first_written = std::fs::read(&dest).unwrap();

    // Second run touches nothing and reports a skip.
    assert!(!archive.extract_file("sound/bgm/title.ogg", &dest).unwrap());
    assert_eq!(std::fs::read(&dest).unwrap(), first_written);
    assert_eq!(first_written, b"ogg ogg ogg ogg ogg ogg");
}

#[test]
fn extract_file_into_directory_uses_base_name() {
    let dir = tempfile::tempdir().unwrap();
    let archive = sample_archive(&dir);

    let out = dir.path().join("flat");
    std::fs::create_dir_all(&out).unwrap();
    assert!(archive.extract_file("sound/effect/fire.wav", &out).unwrap());
    assert_eq!(
        std::fs::read(out.join("fire.wav")).unwrap(),
        b"wav wav wav wav"
    );
}

#[test]
fn extract_file_missing_entry() {
    let dir = tempfile::tempdir().unwrap();
    let archive = sample_archive(&dir);

    assert!(matches!(
        archive.extract_file("sound/bgm", dir.path()),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        archive.extract_file("nope.txt", dir.path()),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn extract_dir_keeps_full_paths() {
    let dir = tempfile::tempdir().unwrap();
    let archive = sample_archive(&dir);

    let out = dir.path().join("out");
    let summary = archive.extract_dir("sound", &out).unwrap();
    assert_eq!(summary.written, 2);
    assert_eq!(summary.failed.len(), 0);

    assert!(out.join("sound/bgm/title.ogg").is_file());
    assert!(out.join("sound/effect/fire.wav").is_file());
    assert!(!out.join("readme.txt").exists());
}

#[test]
fn extract_all_then_again_skips_everything() {
    let dir = tempfile::tempdir().unwrap();
    let archive = sample_archive(&dir);

    let out = dir.path().join("all");
    let first = archive.extract_dir("", &out).unwrap();
    assert_eq!(first.written, 3);
    assert_eq!(first.skipped, 0);

    let second = archive.extract_dir("", &out).unwrap();
    assert_eq!(second.written, 0);
    assert_eq!(second.skipped, 3);
}

#[test]
fn extract_dir_missing_subtree() {
    let dir = tempfile::tempdir().unwrap();
    let archive = sample_archive(&dir);

    assert!(matches!(
        archive.extract_dir("music", dir.path().join("out")),
        Err(Error::NotFound(_))
    ));
    // A file path is not a directory.
    assert!(matches!(
        archive.extract_dir("readme.txt", dir.path().join("out")),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn extract_files_flattens_and_reports_missing() {
    let dir = tempfile::tempdir().unwrap();
    let archive = sample_archive(&dir);

    let out = dir.path().join("picked");
    let summary = archive.extract_files(&["sound/bgm/title.ogg", "ghost.txt"], &out);
    assert_eq!(summary.written, 1);
    assert_eq!(summary.failed.len(), 1);
    assert!(matches!(summary.failed[0].1, Error::NotFound(_)));

    assert!(out.join("title.ogg").is_file());
}

#[test]
fn hostile_entry_names_cannot_escape() {
    let dir = tempfile::tempdir().unwrap();
    let image = build_archive(
        Variant::Mrs1,
        &[
            file("../escape.txt", b"should stay inside"),
            file("safe.txt", b"fine"),
        ],
    );
    let archive = MrsArchive::open(write_archive_file(&dir, "evil.mrs", &image)).unwrap();

    let out = dir.path().join("jail");
    let summary = archive.extract_dir("", &out).unwrap();
    assert_eq!(summary.written, 1);
    assert_eq!(summary.failed.len(), 1);
    assert!(matches!(summary.failed[0].1, Error::PathTraversal(_)));

    assert!(out.join("safe.txt").is_file());
    assert!(!dir.path().join("escape.txt").exists());
}

#[test]
fn progress_callback_fires_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    let archive = sample_archive(&dir);

    let mut calls = 0;
    archive
        .extract_dir_with("", dir.path().join("cb"), |_| calls += 1)
        .unwrap();
    assert_eq!(calls, 3);
}
