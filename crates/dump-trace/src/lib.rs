//! Prints FAIL* traces in the canonical text form, or summarizes them.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fail_trace::{open_trace, EventLine, ParseError, TimeAccumulator, TraceStats, TraceStream};

#[derive(Parser, Debug)]
#[command(
    name = "dump-trace",
    about = "Dump a FAIL* trace file (raw or gzip compressed)",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Args {
    /// Show trace statistics instead of the events
    #[arg(short, long)]
    pub stats: bool,

    /// Dump extended trace information if available
    #[arg(long)]
    pub extended_trace: bool,

    /// Leave out the accumulated time suffix
    #[arg(long)]
    pub no_time: bool,

    /// Report malformed events and keep going instead of stopping
    #[arg(long)]
    pub skip_malformed: bool,

    /// Trace file to read
    pub trace: PathBuf,
}

const WRITE_FAILED: &str = "failed writing output";

pub fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let stream = open_trace(&args.trace)
        .with_context(|| format!("couldn't open {}", args.trace.display()))?;
    if stream.is_compressed() {
        log::debug!("reading {} in gzip mode", args.trace.display());
    }
    dump(stream, args, out)
}

/// Dump every event of `stream`. Lines written before an error stay
/// written. A closed output, as in `dump-trace t.tc | head`, ends the dump
/// without an error.
pub fn dump<R: Read>(stream: TraceStream<R>, args: &Args, out: &mut impl Write) -> Result<()> {
    match dump_events(stream, args, out) {
        Err(e) if is_broken_pipe(&e) => {
            log::debug!("output closed, stopping");
            Ok(())
        }
        res => res,
    }
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
}

fn dump_events<R: Read>(
    mut stream: TraceStream<R>,
    args: &Args,
    out: &mut impl Write,
) -> Result<()> {
    let mut clock = TimeAccumulator::new();
    let mut stats = TraceStats::new();
    let mut skipped = 0u64;

    loop {
        let event = match stream.next_event() {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(err @ ParseError::MalformedEvent { .. }) if args.skip_malformed => {
                log::warn!("skipping event: {err}");
                skipped += 1;
                continue;
            }
            Err(err) => {
                out.flush().context(WRITE_FAILED)?;
                return Err(anyhow::Error::new(err)
                    .context(format!("failed reading {}", args.trace.display())));
            }
        };

        let acctime = clock.advance(&event);
        if args.stats {
            stats.record(&event);
        } else {
            let t = if args.no_time { None } else { Some(acctime) };
            let line = EventLine::new(&event, t).extended(args.extended_trace);
            writeln!(out, "{line}").context(WRITE_FAILED)?;
        }
    }

    if args.stats {
        stats.finish(&clock);
        writeln!(out, "{stats}").context(WRITE_FAILED)?;
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} malformed events");
    }
    out.flush().context(WRITE_FAILED)?;
    Ok(())
}
