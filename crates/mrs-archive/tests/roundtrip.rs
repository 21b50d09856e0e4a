//! Writer round trips: create from an opened archive, re-open, compare.

mod common;

use common::{build_archive, file, write_archive_file};
use mrs_archive::{Error, MrsArchive, Variant};

fn file_paths(archive: &MrsArchive) -> Vec<String> {
    let mut paths = Vec::new();
    archive.tree().traverse("", |path, node| {
        if node.is_file() {
            paths.push(path.to_string());
        }
    });
    paths.sort();
    paths
}

#[test]
fn mrs1_get_returns_exact_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let image = build_archive(Variant::Mrs1, &[file("a/b.txt", b"hello\n")]);
    let path = write_archive_file(&dir, "hello.mrs", &image);

    let archive = MrsArchive::open(&path).unwrap();
    let entry = *archive.tree().lookup("a/b.txt").unwrap().entry().unwrap();
    assert_ne!(entry.compressed_size, entry.uncompressed_size);
    assert_eq!(
        archive.get("a/b.txt").unwrap(),
        [0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x0a]
    );
}

#[test]
fn create_round_trips_every_variant() {
    // Bytes with no repeats and flat frequencies, so deflate cannot
    // shrink them and the writer takes the stored fallback.
    let incompressible: Vec<u8> = (0u32..200).map(|i| (i * 167 + 13) as u8).collect();

    let dir = tempfile::tempdir().unwrap();
    let image = build_archive(
        Variant::Mrs1,
        &[
            file("a/b.txt", b"hello\n"),
            file("a/c/deep.xml", b"<deep>nested nested nested</deep>"),
            file("raw.bin", &incompressible),
        ],
    );
    let source_path = write_archive_file(&dir, "source.mrs", &image);
    let source = MrsArchive::open(&source_path).unwrap();

    for variant in [Variant::Mrs1, Variant::Mrs2, Variant::Mrs3, Variant::Mg2] {
        let dest_path = dir.path().join(format!("copy-{variant}.mrs"));
        source.create(&dest_path, variant).unwrap();

        let copy = MrsArchive::open(&dest_path).unwrap();
        assert_eq!(copy.variant(), variant, "detection after write");
        assert_eq!(file_paths(&copy), file_paths(&source));
        for path in file_paths(&source) {
            assert_eq!(copy.get(&path).unwrap(), source.get(&path).unwrap(), "{path}");
        }
    }
}

#[test]
fn stored_fallback_keeps_sizes_equal() {
    let incompressible: Vec<u8> = (0u32..200).map(|i| (i * 167 + 13) as u8).collect();

    let dir = tempfile::tempdir().unwrap();
    let image = build_archive(Variant::Mrs1, &[file("raw.bin", &incompressible)]);
    let source = MrsArchive::open(write_archive_file(&dir, "src.mrs", &image)).unwrap();

    let dest_path = dir.path().join("copy.mrs");
    source.create(&dest_path, Variant::Mrs2).unwrap();

    let copy = MrsArchive::open(&dest_path).unwrap();
    let entry = *copy.tree().lookup("raw.bin").unwrap().entry().unwrap();
    assert!(entry.is_stored());
    assert_eq!(copy.get("raw.bin").unwrap(), incompressible);
}

#[test]
fn create_empty_round_trips() {
    let dir = tempfile::tempdir().unwrap();

    for variant in [Variant::Mrs1, Variant::Mrs2, Variant::Mrs3] {
        let path = dir.path().join(format!("empty-{variant}.mrs"));
        MrsArchive::create_empty(&path, variant).unwrap();

        let archive = MrsArchive::open(&path).unwrap();
        assert_eq!(archive.variant(), variant);
        assert_eq!(archive.entry_count(), 0);
    }

    // An empty MG2 archive offers the probing ladder nothing to latch
    // onto; it re-opens when the variant is supplied.
    let path = dir.path().join("empty-mg2.mrs");
    MrsArchive::create_empty(&path, Variant::Mg2).unwrap();
    assert!(MrsArchive::open(&path).is_err());
    let archive = MrsArchive::open_as(&path, Variant::Mg2).unwrap();
    assert_eq!(archive.entry_count(), 0);
}

#[test]
fn recovery_variant_is_not_writable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.mrs");
    assert!(matches!(
        MrsArchive::create_empty(&path, Variant::ForcedRecovery),
        Err(Error::UnwritableVariant(_))
    ));
}

#[test]
fn created_archives_preserve_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let image = build_archive(Variant::Mrs1, &[file("a.txt", b"timestamped")]);
    let source = MrsArchive::open(write_archive_file(&dir, "src.mrs", &image)).unwrap();

    let dest_path = dir.path().join("copy.mrs");
    source.create(&dest_path, Variant::Mrs1).unwrap();

    let copy = MrsArchive::open(&dest_path).unwrap();
    let entry = copy.tree().lookup("a.txt").unwrap().entry().copied().unwrap();
    assert_eq!(entry.last_modified.raw(), common::TEST_MTIME);
}
