use super::{emit_coordinates, load_system};
use crate::cli::WrapArgs;
use crate::config::EigenOverrides;
use crate::error::Result;
use nnp::core::pbc::map_to_central;
use std::io::Write;
use tracing::{info, warn};

pub fn run(args: WrapArgs) -> Result<()> {
    execute(&args, &mut std::io::stdout().lock())
}

fn execute(args: &WrapArgs, out: &mut impl Write) -> Result<()> {
    let system = load_system(&args.input, EigenOverrides::default())?;
    let frame = &system.frame;
    if !frame.pbc_enabled() {
        warn!("No periodic direction is enabled; coordinates are returned unchanged.");
    }

    let wrapped = map_to_central(&frame.cell, &frame.coordinates, frame.pbc)?;
    info!("Wrapped {} atom(s) into the central cell.", wrapped.len());
    emit_coordinates(&wrapped, args.output.as_deref(), out)
}
