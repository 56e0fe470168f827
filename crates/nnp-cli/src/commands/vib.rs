use super::load_system;
use crate::cli::VibArgs;
use crate::config::{EigenOverrides, SystemConfig};
use crate::error::{CliError, Result};
use nnp::core::vib::{FreqsModes, vibrational_analysis};
use nnp::workflows::vibrations;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: VibArgs) -> Result<()> {
    execute(&args, &mut std::io::stdout().lock())
}

fn execute(args: &VibArgs, out: &mut impl Write) -> Result<()> {
    let system = load_system(&args.input, EigenOverrides::from(args))?;
    let freqs_modes = analyze(&system)?;

    let imaginary = freqs_modes.imaginary_modes();
    if !imaginary.is_empty() {
        warn!("Modes {:?} have imaginary frequencies.", imaginary);
    }

    writeln!(out, "{:>6} {:>20} {:>20}", "mode", "eigenvalue", "angular-frequency")?;
    for (k, (lambda, omega)) in freqs_modes
        .eigenvalues
        .iter()
        .zip(&freqs_modes.angular_frequencies)
        .enumerate()
    {
        writeln!(out, "{:>6} {:>20.10} {:>20.10}", k, lambda, omega)?;
    }

    if let Some(path) = &args.output {
        write_modes(&freqs_modes, path)?;
    }
    Ok(())
}

fn analyze(system: &SystemConfig) -> Result<FreqsModes> {
    let masses = system.masses.as_deref().ok_or_else(|| {
        CliError::Config("`masses` is required for vibrational analysis.".to_string())
    })?;

    match (&system.hessian, &system.potential) {
        (Some(hessian), _) => {
            info!("Using the Hessian given in the system file.");
            Ok(vibrational_analysis(masses, hessian, &system.eigen)?)
        }
        (None, Some(potential)) => {
            if system.frame.pbc_enabled() {
                warn!("Periodic flags are ignored; the structure is treated as isolated.");
            }
            info!("Computing the Hessian from the configured potential.");
            let result =
                vibrations::run(potential, &system.frame.coordinates, masses, &system.eigen)?;
            Ok(result.freqs_modes)
        }
        (None, None) => Err(CliError::Config(
            "Either `hessian` or a `[potential]` section is required for vibrational analysis."
                .to_string(),
        )),
    }
}

#[derive(Serialize)]
struct ModeRecord {
    mode: usize,
    atom: usize,
    eigenvalue: f64,
    angular_frequency: f64,
    dx: f64,
    dy: f64,
    dz: f64,
}

fn write_modes(freqs_modes: &FreqsModes, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for (mode, displacements) in freqs_modes.modes.iter().enumerate() {
        for (atom, u) in displacements.iter().enumerate() {
            writer.serialize(ModeRecord {
                mode,
                atom,
                eigenvalue: freqs_modes.eigenvalues[mode],
                angular_frequency: freqs_modes.angular_frequencies[mode],
                dx: u.x,
                dy: u.y,
                dz: u.z,
            })?;
        }
    }
    writer.flush()?;
    info!("Wrote {} mode(s) to {:?}", freqs_modes.len(), path);
    Ok(())
}
