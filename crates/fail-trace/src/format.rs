//! Canonical single-line text rendering of trace events.
//!
//! Downstream scripts grep this output, so the layout is fixed:
//!
//! ```text
//! IP 1000 t=12
//! MEM W 2000 width 4 IP 1004 DATA 55 REG: 0 *10=99 STACK: deadbeef t=12
//! ```
//!
//! Numbers are lower-case hex without padding or prefix, except widths,
//! register ids and the time, which are decimal. Optional segments are
//! always introduced by a single space.

use std::fmt;

use crate::types::{EventKind, Extension, TraceEvent};

/// Render `event`. The ` t=` suffix is added when `acctime` is known.
pub fn format_event(event: &TraceEvent, acctime: Option<u64>) -> String {
    EventLine::new(event, acctime).to_string()
}

/// [`fmt::Display`] adapter producing the same line as [`format_event`].
pub struct EventLine<'a> {
    event: &'a TraceEvent,
    acctime: Option<u64>,
    extended: bool,
}

impl<'a> EventLine<'a> {
    pub fn new(event: &'a TraceEvent, acctime: Option<u64>) -> Self {
        Self {
            event,
            acctime,
            extended: true,
        }
    }

    /// Whether to render the extension segments. On by default.
    pub fn extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }
}

impl fmt::Display for EventLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ev = self.event;
        match &ev.kind {
            EventKind::Instruction => write!(f, "IP {:x}", ev.ip)?,
            EventKind::Memory(access) => write!(
                f,
                "MEM {} {:x} width {} IP {:x}",
                access.direction.as_char(),
                access.address,
                access.width,
                ev.ip
            )?,
        }
        if let Some(ext) = ev.extension.as_ref().filter(|_| self.extended) {
            write_extension(f, ext)?;
        }
        if let Some(t) = self.acctime {
            write!(f, " t={t}")?;
        }
        Ok(())
    }
}

fn write_extension(f: &mut fmt::Formatter<'_>, ext: &Extension) -> fmt::Result {
    write!(f, " DATA {:x}", ext.data)?;
    for reg in &ext.registers {
        write!(f, " REG: {} *{:x}={:x}", reg.id, reg.value, reg.value_deref)?;
    }
    if !ext.stack.is_empty() {
        f.write_str(" STACK: ")?;
        for b in &ext.stack {
            write!(f, "{b:02x}")?;
        }
    }
    Ok(())
}
