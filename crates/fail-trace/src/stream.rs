use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::decompress::{self, TraceSource};
use crate::parser;
use crate::reader::FrameReader;
use crate::types::{ParseError, TraceEvent};

/// Open a trace file, transparently decompressing gzip traces.
pub fn open_trace(path: impl AsRef<Path>) -> Result<TraceStream<BufReader<File>>, ParseError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ParseError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ParseError::Io(e),
    })?;
    log::debug!("opened trace {}", path.display());
    TraceStream::from_reader(BufReader::new(file))
}

/// A sequence of trace events read from a byte source.
///
/// Frame truncation and I/O errors end the stream. A malformed event only
/// affects its own frame: [`TraceStream::next_event`] may be called again
/// to continue with the next one.
pub struct TraceStream<R: Read> {
    frames: FrameReader<TraceSource<R>>,
    compressed: bool,
    done: bool,
}

impl<R: Read> TraceStream<R> {
    pub fn from_reader(reader: R) -> Result<Self, ParseError> {
        let source = decompress::sniff(reader)?;
        let compressed = source.is_compressed();
        Ok(Self {
            frames: FrameReader::new(source),
            compressed,
            done: false,
        })
    }

    /// Whether the underlying source is gzip compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Number of frames consumed so far, including malformed ones.
    pub fn frames_read(&self) -> u64 {
        self.frames.frames_read()
    }

    /// Read and decode the next event. Returns `Ok(None)` at end of stream.
    pub fn next_event(&mut self) -> Result<Option<TraceEvent>, ParseError> {
        let Some((pos, payload)) = self.frames.next_frame()? else {
            log::debug!("end of trace after {} frames", self.frames.frames_read());
            return Ok(None);
        };
        parser::decode(&payload)
            .map(Some)
            .map_err(|source| ParseError::MalformedEvent {
                frame: pos.index,
                offset: pos.offset,
                source,
            })
    }
}

/// Yields events until the end of the stream or the first error.
impl<R: Read> Iterator for TraceStream<R> {
    type Item = Result<TraceEvent, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_event() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Running absolute time of a trace, held by the consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeAccumulator {
    acctime: u64,
    start_time: Option<u64>,
}

impl TimeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the event's delta and return the new total.
    pub fn advance(&mut self, event: &TraceEvent) -> u64 {
        let delta = event.delta();
        if delta != 0 && self.acctime == 0 {
            self.start_time = Some(delta);
        }
        self.acctime = self.acctime.saturating_add(delta);
        self.acctime
    }

    pub fn acctime(&self) -> u64 {
        self.acctime
    }

    /// The first delta that moved the clock away from zero.
    pub fn start_time(&self) -> Option<u64> {
        self.start_time
    }
}
