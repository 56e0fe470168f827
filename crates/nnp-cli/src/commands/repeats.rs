use super::load_system;
use crate::cli::RepeatsArgs;
use crate::config::EigenOverrides;
use crate::error::Result;
use nnp::core::pbc::num_repeats;
use std::io::Write;
use tracing::info;

pub fn run(args: RepeatsArgs) -> Result<()> {
    execute(&args, &mut std::io::stdout().lock())
}

fn execute(args: &RepeatsArgs, out: &mut impl Write) -> Result<()> {
    let system = load_system(&args.input, EigenOverrides::default())?;
    let repeats = num_repeats(&system.frame.cell, system.frame.pbc, args.cutoff)?;
    info!(cutoff = args.cutoff, ?repeats, "Computed cell repeats.");
    writeln!(out, "{} {} {}", repeats[0], repeats[1], repeats[2])?;
    Ok(())
}
