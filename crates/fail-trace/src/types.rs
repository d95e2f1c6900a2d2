use std::path::PathBuf;

// === Error types ===

/// Errors that can occur while reading or writing a trace stream.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("trace file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended inside a length prefix or a payload.
    #[error(
        "truncated stream in frame {frame} at offset {offset}: expected {expected} bytes, found {found}"
    )]
    TruncatedStream {
        frame: u64,
        offset: u64,
        expected: u64,
        found: u64,
    },

    /// The source failed while a frame was being read.
    #[error("read error in frame {frame} at offset {offset}: {source}")]
    ReadFailed {
        frame: u64,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    /// The frame was read completely but its payload does not decode.
    #[error("malformed event in frame {frame} at offset {offset}: {source}")]
    MalformedEvent {
        frame: u64,
        offset: u64,
        #[source]
        source: DecodeError,
    },

    #[error("frame of {len} bytes does not fit a 32-bit length prefix")]
    FrameTooLarge { len: usize },

    /// A previous call failed fatally; the rest of the stream is unusable.
    #[error("stream already failed")]
    Poisoned,
}

impl ParseError {
    /// Whether the stream can still be read after this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParseError::MalformedEvent { .. })
    }
}

/// Errors produced when a payload does not conform to the event schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid wire data: {0}")]
    Wire(#[from] prost::DecodeError),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` present without a memory address")]
    OrphanAccessField(&'static str),

    #[error("unknown access type {0}")]
    UnknownAccessType(i32),

    #[error("payload has {len} bytes but only {consumed} belong to the event")]
    TrailingBytes { consumed: usize, len: usize },
}

// === Event types ===

/// Direction of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessDirection {
    Read,
    Write,
}

impl AccessDirection {
    /// Single-letter tag used by the text format.
    pub fn as_char(self) -> char {
        match self {
            Self::Read => 'R',
            Self::Write => 'W',
        }
    }
}

/// A memory access observed together with the instruction that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAccess {
    pub direction: AccessDirection,
    pub address: u64,
    /// Access width in bytes.
    pub width: u32,
}

/// The kind of a trace event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Instruction,
    Memory(MemoryAccess),
}

/// A register snapshot taken by the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub id: u32,
    pub value: u64,
    /// Memory contents at `value`, read by the producer.
    pub value_deref: u64,
}

/// Extra context the producer attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extension {
    pub data: u64,
    pub registers: Vec<Register>,
    pub stack: Vec<u8>,
}

/// A decoded trace event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub ip: u64,
    /// Time elapsed since the previous event. `None` means no time passed.
    pub time_delta: Option<u64>,
    pub kind: EventKind,
    pub extension: Option<Extension>,
}

impl TraceEvent {
    pub fn instruction(ip: u64) -> Self {
        TraceEvent {
            ip,
            time_delta: None,
            kind: EventKind::Instruction,
            extension: None,
        }
    }

    pub fn memory(ip: u64, direction: AccessDirection, address: u64, width: u32) -> Self {
        TraceEvent {
            ip,
            time_delta: None,
            kind: EventKind::Memory(MemoryAccess {
                direction,
                address,
                width,
            }),
            extension: None,
        }
    }

    pub fn with_time_delta(mut self, delta: u64) -> Self {
        self.time_delta = if delta == 0 { None } else { Some(delta) };
        self
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extension = Some(extension);
        self
    }

    pub fn access(&self) -> Option<&MemoryAccess> {
        match &self.kind {
            EventKind::Instruction => None,
            EventKind::Memory(access) => Some(access),
        }
    }

    pub fn is_instruction(&self) -> bool {
        matches!(self.kind, EventKind::Instruction)
    }

    /// The time delta, with an absent delta counting as zero.
    pub fn delta(&self) -> u64 {
        self.time_delta.unwrap_or(0)
    }
}
