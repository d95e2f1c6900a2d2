use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::parser;
use crate::types::{ParseError, TraceEvent};

enum Sink<W: Write> {
    Raw(W),
    Gzip(GzEncoder<W>),
}

/// Writes trace events as length-prefixed frames.
pub struct TraceWriter<W: Write> {
    sink: Sink<W>,
    frames: u64,
}

impl<W: Write> TraceWriter<W> {
    /// Write an uncompressed trace.
    pub fn new(inner: W) -> Self {
        Self {
            sink: Sink::Raw(inner),
            frames: 0,
        }
    }

    /// Write a gzip compressed trace.
    pub fn gzip(inner: W) -> Self {
        Self {
            sink: Sink::Gzip(GzEncoder::new(inner, Compression::default())),
            frames: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn write_event(&mut self, event: &TraceEvent) -> Result<(), ParseError> {
        let payload = parser::encode(event);
        let len = u32::try_from(payload.len())
            .map_err(|_| ParseError::FrameTooLarge { len: payload.len() })?;

        let out: &mut dyn Write = match &mut self.sink {
            Sink::Raw(w) => w,
            Sink::Gzip(w) => w,
        };
        out.write_all(&len.to_be_bytes())?;
        out.write_all(&payload)?;
        self.frames += 1;
        Ok(())
    }

    /// Flush all frames, write the gzip trailer if any, and return the sink.
    pub fn finish(self) -> io::Result<W> {
        match self.sink {
            Sink::Raw(mut w) => {
                w.flush()?;
                Ok(w)
            }
            Sink::Gzip(w) => {
                let mut w = w.finish()?;
                w.flush()?;
                Ok(w)
            }
        }
    }
}
