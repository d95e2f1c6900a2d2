//! Transparent gzip detection for trace sources.

use std::io::{self, Cursor, Read};

use flate2::read::MultiGzDecoder;

/// Leading bytes of a gzip container.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

type Peeked<R> = io::Chain<Cursor<Vec<u8>>, R>;

/// A trace byte source, decompressed on the fly when it is gzip data.
pub enum TraceSource<R: Read> {
    Raw(Peeked<R>),
    Gzip(MultiGzDecoder<Peeked<R>>),
}

impl<R: Read> TraceSource<R> {
    pub fn is_compressed(&self) -> bool {
        matches!(self, TraceSource::Gzip(_))
    }
}

impl<R: Read> Read for TraceSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            TraceSource::Raw(r) => r.read(buf),
            TraceSource::Gzip(r) => r.read(buf),
        }
    }
}

/// Look at the first two bytes of `reader` and wrap it in a gzip decoder
/// if they are the gzip magic.
///
/// The peeked bytes are buffered and replayed, so the reader does not need
/// to be seekable.
pub fn sniff<R: Read>(mut reader: R) -> io::Result<TraceSource<R>> {
    let mut head = [0u8; 2];
    let (n, res) = fill(&mut reader, &mut head);
    res?;
    let compressed = head[..n] == GZIP_MAGIC;
    let peeked = Cursor::new(head[..n].to_vec()).chain(reader);

    if compressed {
        log::debug!("detected gzip trace container");
        Ok(TraceSource::Gzip(MultiGzDecoder::new(peeked)))
    } else {
        Ok(TraceSource::Raw(peeked))
    }
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes read along with the error that stopped the
/// read, if any. Bytes read before an error are kept in `buf`.
pub(crate) fn fill(reader: &mut impl Read, buf: &mut [u8]) -> (usize, io::Result<()>) {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return (filled, Err(e)),
        }
    }
    (filled, Ok(()))
}
