use std::io::Write;

use assert_fs::prelude::*;
use fail_trace::{format_event, open_trace, ParseError, TimeAccumulator};
use flate2::write::GzEncoder;
use flate2::Compression;

/// Frames for: IP 0x1000, a 4-byte write to 0x2000 from 0x1004 with
/// extension data, then an instruction 7 time units later.
fn legacy_trace() -> Vec<u8> {
    let frames: [&[u8]; 3] = [
        &[0x08, 0x80, 0x20],
        &[
            0x08, 0x84, 0x20, 0x10, 0x80, 0x40, 0x18, 0x04, 0x20, 0x02, 0x2a, 0x0b, 0x08, 0x55,
            0x12, 0x07, 0x08, 0x00, 0x10, 0x10, 0x18, 0x99, 0x01,
        ],
        &[0x08, 0x88, 0x20, 0x30, 0x07],
    ];
    let mut data = Vec::new();
    for frame in frames {
        data.extend_from_slice(&(frame.len() as u32).to_be_bytes());
        data.extend_from_slice(frame);
    }
    data
}

fn dump(path: &std::path::Path, with_time: bool) -> Result<Vec<String>, ParseError> {
    let mut clock = TimeAccumulator::new();
    let mut lines = Vec::new();
    for event in open_trace(path)? {
        let event = event?;
        let t = clock.advance(&event);
        lines.push(format_event(&event, with_time.then_some(t)));
    }
    Ok(lines)
}

#[test]
fn test_legacy_lines() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("trace.tc");
    file.write_binary(&legacy_trace()).unwrap();

    assert_eq!(
        dump(file.path(), false).unwrap(),
        vec![
            "IP 1000",
            "MEM W 2000 width 4 IP 1004 DATA 55 REG: 0 *10=99",
            "IP 1008",
        ]
    );
    assert_eq!(
        dump(file.path(), true).unwrap(),
        vec![
            "IP 1000 t=0",
            "MEM W 2000 width 4 IP 1004 DATA 55 REG: 0 *10=99 t=0",
            "IP 1008 t=7",
        ]
    );
}

#[test]
fn test_compressed_equals_raw() {
    let temp = assert_fs::TempDir::new().unwrap();
    let raw = temp.child("trace.tc");
    raw.write_binary(&legacy_trace()).unwrap();

    let mut enc = GzEncoder::new(Vec::new(), Compression::best());
    enc.write_all(&legacy_trace()).unwrap();
    let gz = temp.child("trace.tc.gz");
    gz.write_binary(&enc.finish().unwrap()).unwrap();

    assert_eq!(dump(gz.path(), true).unwrap(), dump(raw.path(), true).unwrap());
}

#[test]
fn test_clean_end_and_truncation() {
    let temp = assert_fs::TempDir::new().unwrap();

    let empty = temp.child("empty.tc");
    empty.write_binary(&[]).unwrap();
    assert!(dump(empty.path(), true).unwrap().is_empty());

    for tail in 1..4 {
        let mut data = legacy_trace();
        data.extend_from_slice(&[0u8; 3][..tail]);
        let file = temp.child(format!("tail{tail}.tc"));
        file.write_binary(&data).unwrap();
        assert!(matches!(
            dump(file.path(), true),
            Err(ParseError::TruncatedStream { frame: 3, expected: 4, .. })
        ));
    }
}

#[test]
fn test_cut_gzip_file_never_ends_cleanly() {
    let temp = assert_fs::TempDir::new().unwrap();
    let mut enc = GzEncoder::new(Vec::new(), Compression::best());
    enc.write_all(&legacy_trace()).unwrap();
    let gz = enc.finish().unwrap();

    // A single byte is not a gzip magic and reads as a raw, truncated prefix.
    for cut in 1..gz.len() {
        let file = temp.child(format!("cut{cut}.tc.gz"));
        file.write_binary(&gz[..cut]).unwrap();
        let err = dump(file.path(), false).unwrap_err();
        assert!(
            matches!(
                err,
                ParseError::TruncatedStream { .. } | ParseError::ReadFailed { .. }
            ),
            "cut at {cut}: {err}"
        );
    }
}
