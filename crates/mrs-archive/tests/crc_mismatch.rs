//! Corrupted payloads surface as CRC mismatches without poisoning the
//! rest of the archive.

mod common;

use common::{build_archive, file, stored, write_archive_file};
use mrs_archive::{Error, MrsArchive, Variant};

#[test]
fn flipped_payload_byte_is_caught() {
    let dir = tempfile::tempdir().unwrap();

    // A stored first entry keeps the payload bytes raw on disk, so the
    // flip cannot break the DEFLATE framing, only the checksum.
    let name = "config/zitem.xml";
    let image = build_archive(
        Variant::Mrs1,
        &[
            stored(name, b"<item id=\"1\" name=\"rusty blade\"/>"),
            file("config/zquest.xml", b"<quest id=\"2\"/>"),
        ],
    );

    // Payload starts right after the 30-byte local record and the name.
    let payload_offset = 30 + name.len();
    let mut corrupted = image;
    corrupted[payload_offset + 4] ^= 0xff;
    let path = write_archive_file(&dir, "corrupt.mrs", &corrupted);

    let archive = MrsArchive::open(&path).unwrap();
    assert!(matches!(
        archive.get(name),
        Err(Error::CrcMismatch { .. })
    ));

    // The archive stays usable for the other entries.
    assert_eq!(
        archive.get("config/zquest.xml").unwrap(),
        b"<quest id=\"2\"/>"
    );
}

#[test]
fn crc_failure_leaves_nothing_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    let name = "a.bin";
    let image = build_archive(Variant::Mrs1, &[stored(name, b"sixteen being bytes")]);
    let payload_offset = 30 + name.len();
    let mut corrupted = image;
    corrupted[payload_offset] ^= 0x01;
    let path = write_archive_file(&dir, "corrupt.mrs", &corrupted);

    let archive = MrsArchive::open(&path).unwrap();
    let dest = dir.path().join("out/a.bin");
    assert!(archive.extract_file(name, &dest).is_err());
    assert!(!dest.exists());
}
