use std::io::{self, Read};

use crate::decompress::fill;
use crate::types::ParseError;

/// Size of the big-endian frame length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Splits a byte stream into length-prefixed frames.
///
/// The reader owns its source for its whole lifetime. A truncated frame or
/// an I/O error poisons the reader: the format has no resync marker, so
/// nothing after the failure can be trusted.
pub struct FrameReader<R> {
    inner: R,
    /// Index of the next frame to be read.
    frame_index: u64,
    /// Stream offset of the next frame's length prefix.
    offset: u64,
    poisoned: bool,
}

/// Position of a frame within the logical (decompressed) stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePos {
    pub index: u64,
    pub offset: u64,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            frame_index: 0,
            offset: 0,
            poisoned: false,
        }
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frame_index
    }

    /// Read the next frame payload.
    ///
    /// Returns `Ok(None)` when the stream ends exactly at a frame boundary.
    pub fn next_frame(&mut self) -> Result<Option<(FramePos, Vec<u8>)>, ParseError> {
        if self.poisoned {
            return Err(ParseError::Poisoned);
        }
        match self.read_frame() {
            Ok(frame) => Ok(frame),
            Err(e) => {
                self.poisoned = true;
                Err(e)
            }
        }
    }

    fn read_frame(&mut self) -> Result<Option<(FramePos, Vec<u8>)>, ParseError> {
        let pos = FramePos {
            index: self.frame_index,
            offset: self.offset,
        };

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let (n, res) = fill(&mut self.inner, &mut prefix);
        if let Err(e) = res {
            return Err(read_failed(pos, LENGTH_PREFIX_SIZE as u64, n as u64, e));
        }
        if n == 0 {
            return Ok(None);
        }
        if n < LENGTH_PREFIX_SIZE {
            return Err(truncated(pos, LENGTH_PREFIX_SIZE as u64, n as u64));
        }

        let len = u32::from_be_bytes(prefix);
        let mut payload = Vec::with_capacity((len as usize).min(64 * 1024));
        if let Err(e) = read_body(&mut self.inner, len, &mut payload) {
            return Err(read_failed(pos, len as u64, payload.len() as u64, e));
        }
        if payload.len() < len as usize {
            return Err(truncated(pos, len as u64, payload.len() as u64));
        }

        self.frame_index += 1;
        self.offset += (LENGTH_PREFIX_SIZE + payload.len()) as u64;
        Ok(Some((pos, payload)))
    }
}

/// Read up to `len` payload bytes into `body`. The buffer grows with the
/// data actually present, so a corrupt length does not trigger a huge
/// allocation. On error `body` holds the bytes read so far.
fn read_body(reader: &mut impl Read, len: u32, body: &mut Vec<u8>) -> io::Result<()> {
    reader.by_ref().take(len as u64).read_to_end(body)?;
    Ok(())
}

/// A decompressor that runs out of input mid-frame reports `UnexpectedEof`;
/// the logical stream ends inside the frame, so that is a truncation.
fn read_failed(pos: FramePos, expected: u64, found: u64, err: io::Error) -> ParseError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        log::debug!("source ended early in frame {}: {err}", pos.index);
        return truncated(pos, expected, found);
    }
    ParseError::ReadFailed {
        frame: pos.index,
        offset: pos.offset,
        source: err,
    }
}

fn truncated(pos: FramePos, expected: u64, found: u64) -> ParseError {
    ParseError::TruncatedStream {
        frame: pos.index,
        offset: pos.offset,
        expected,
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn build_frame(payload: &[u8]) -> Vec<u8> {
        let mut data = (payload.len() as u32).to_be_bytes().to_vec();
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_read_frames() {
        let mut data = build_frame(b"abc");
        data.extend_from_slice(&build_frame(b""));
        data.extend_from_slice(&build_frame(b"hello"));

        let mut r = FrameReader::new(&data[..]);
        let (pos, payload) = r.next_frame().unwrap().unwrap();
        assert_eq!(pos, FramePos { index: 0, offset: 0 });
        assert_eq!(payload, b"abc");

        let (pos, payload) = r.next_frame().unwrap().unwrap();
        assert_eq!(pos, FramePos { index: 1, offset: 7 });
        assert!(payload.is_empty());

        let (pos, payload) = r.next_frame().unwrap().unwrap();
        assert_eq!(pos, FramePos { index: 2, offset: 11 });
        assert_eq!(payload, b"hello");

        assert!(r.next_frame().unwrap().is_none());
        assert_eq!(r.frames_read(), 3);
    }

    #[test]
    fn test_empty_stream() {
        let mut r = FrameReader::new(&[][..]);
        assert!(r.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_big_endian_prefix() {
        let mut data = vec![0x00, 0x00, 0x01, 0x00];
        data.extend_from_slice(&[0xaa; 256]);
        let mut r = FrameReader::new(&data[..]);
        let (_, payload) = r.next_frame().unwrap().unwrap();
        assert_eq!(payload.len(), 256);
    }

    #[test]
    fn test_truncated_prefix() {
        for tail in 1..LENGTH_PREFIX_SIZE {
            let mut data = build_frame(b"abc");
            data.extend_from_slice(&vec![0u8; tail]);

            let mut r = FrameReader::new(&data[..]);
            assert!(r.next_frame().unwrap().is_some());
            let err = r.next_frame().unwrap_err();
            assert_matches!(
                err,
                ParseError::TruncatedStream {
                    frame: 1,
                    offset: 7,
                    expected: 4,
                    found,
                } if found == tail as u64
            );
        }
    }

    #[test]
    fn test_truncated_payload() {
        let mut data = build_frame(b"abcdef");
        data.truncate(data.len() - 2);

        let mut r = FrameReader::new(&data[..]);
        assert_matches!(
            r.next_frame(),
            Err(ParseError::TruncatedStream {
                frame: 0,
                offset: 0,
                expected: 6,
                found: 4,
            })
        );
    }

    #[test]
    fn test_huge_length_is_truncation() {
        let data = [0xff, 0xff, 0xff, 0xff, 0x01];
        let mut r = FrameReader::new(&data[..]);
        assert_matches!(
            r.next_frame(),
            Err(ParseError::TruncatedStream {
                expected: 0xffff_ffff,
                found: 1,
                ..
            })
        );
    }

    /// Hands out `data`, then fails with `kind`.
    struct Failing<'a> {
        data: &'a [u8],
        kind: io::ErrorKind,
    }

    impl Read for Failing<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(self.kind, "source failed"));
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn test_source_eof_mid_payload_is_truncation() {
        let mut data = build_frame(b"abc");
        data.extend_from_slice(&build_frame(b"abcdef")[..6]);
        let mut r = FrameReader::new(Failing {
            data: &data,
            kind: io::ErrorKind::UnexpectedEof,
        });
        assert!(r.next_frame().unwrap().is_some());
        assert_matches!(
            r.next_frame(),
            Err(ParseError::TruncatedStream {
                frame: 1,
                offset: 7,
                expected: 6,
                found: 2,
            })
        );
        assert_matches!(r.next_frame(), Err(ParseError::Poisoned));
    }

    #[test]
    fn test_source_eof_mid_prefix_is_truncation() {
        let mut data = build_frame(b"abc");
        data.extend_from_slice(&[0x00, 0x00]);
        let mut r = FrameReader::new(Failing {
            data: &data,
            kind: io::ErrorKind::UnexpectedEof,
        });
        assert!(r.next_frame().unwrap().is_some());
        assert_matches!(
            r.next_frame(),
            Err(ParseError::TruncatedStream {
                frame: 1,
                offset: 7,
                expected: 4,
                found: 2,
            })
        );
    }

    #[test]
    fn test_source_error_carries_position() {
        let mut data = build_frame(b"abc");
        data.extend_from_slice(&build_frame(b"hello"));
        let mut r = FrameReader::new(Failing {
            data: &data,
            kind: io::ErrorKind::InvalidData,
        });
        assert!(r.next_frame().unwrap().is_some());
        assert!(r.next_frame().unwrap().is_some());
        let err = r.next_frame().unwrap_err();
        assert_eq!(
            err.to_string(),
            "read error in frame 2 at offset 16: source failed"
        );
        assert_matches!(
            err,
            ParseError::ReadFailed {
                frame: 2,
                offset: 16,
                ref source,
            } if source.kind() == io::ErrorKind::InvalidData
        );
    }

    #[test]
    fn test_poisoned_after_error() {
        let data = [0x00, 0x00];
        let mut r = FrameReader::new(&data[..]);
        assert!(r.next_frame().is_err());
        assert_matches!(r.next_frame(), Err(ParseError::Poisoned));
    }
}
