use std::io::{self, BufWriter};

use anyhow::Result;
use clap::Parser;
use fail_dump_trace::{run, Args};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run(&args, &mut out)
}
