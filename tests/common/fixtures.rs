//! Bundle fixtures: small tarballs shaped like a real toolchain bundle

use flate2::Compression;
use flate2::write::GzEncoder;

/// One regular file inside a fixture bundle
#[derive(Clone, Debug)]
pub struct BundleEntry {
    pub path: &'static str,
    pub mode: u32,
    pub content: Vec<u8>,
}

/// Files of a minimal bundle: launcher script, version marker, and a
/// multi-megabyte "library" so the archive spans many pipe chunks
pub fn sample_bundle() -> Vec<BundleEntry> {
    vec![
        BundleEntry {
            path: "codeql/codeql",
            mode: 0o755,
            content: b"#!/bin/sh\nexec \"$(dirname \"$0\")/tools/codeql\" \"$@\"\n".to_vec(),
        },
        BundleEntry {
            path: "codeql/VERSION",
            mode: 0o644,
            content: b"2.20.0\n".to_vec(),
        },
        BundleEntry {
            path: "codeql/tools/linux64/libcodeql.so",
            mode: 0o644,
            content: pseudo_random_bytes(3 * 1024 * 1024 + 17),
        },
        BundleEntry {
            path: "codeql/qlpacks/codeql/javascript-all/qlpack.yml",
            mode: 0o644,
            content: b"name: codeql/javascript-all\nversion: 2.2.0\n".to_vec(),
        },
    ]
}

/// Deterministic, poorly compressible filler
pub fn pseudo_random_bytes(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Uncompressed tar of `entries`
pub fn tar_bytes(entries: &[BundleEntry]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(entry.content.len() as u64);
        header.set_mode(entry.mode);
        header.set_mtime(1_700_000_000);
        header.set_cksum();
        builder
            .append_data(&mut header, entry.path, entry.content.as_slice())
            .unwrap();
    }
    builder.into_inner().unwrap()
}

/// `.tar.zst` of `entries`
pub fn zstd_bundle(entries: &[BundleEntry]) -> Vec<u8> {
    zstd::encode_all(tar_bytes(entries).as_slice(), 3).unwrap()
}

/// `.tar.gz` of `entries`
pub fn gzip_bundle(entries: &[BundleEntry]) -> Vec<u8> {
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(&tar_bytes(entries)).unwrap();
    encoder.finish().unwrap()
}
