use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "nnp CLI - Periodic wrapping, rotations and vibrational analysis for atomic structures described in TOML system files.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Map atoms outside the unit cell back into it along periodic directions.
    Wrap(WrapArgs),
    /// Count the cell repeats needed to cover a neighbor cutoff.
    Repeats(RepeatsArgs),
    /// Build a rotation matrix from an axis-angle vector and optionally rotate a structure.
    Rotate(RotateArgs),
    /// Compute harmonic frequencies and normal modes.
    Vib(VibArgs),
}

/// Arguments for the `wrap` subcommand.
#[derive(Args, Debug)]
pub struct WrapArgs {
    /// Path to the system file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Write the wrapped coordinates as CSV instead of printing them.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `repeats` subcommand.
#[derive(Args, Debug)]
pub struct RepeatsArgs {
    /// Path to the system file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Neighbor cutoff distance, in the length unit of the cell.
    #[arg(short, long, required = true, value_name = "FLOAT")]
    pub cutoff: f64,
}

/// Arguments for the `rotate` subcommand.
#[derive(Args, Debug)]
pub struct RotateArgs {
    /// Rotation axis scaled by the angle in radians (counter-clockwise).
    #[arg(
        long,
        required = true,
        num_args = 3,
        value_names = ["X", "Y", "Z"],
        allow_negative_numbers = true
    )]
    pub axis: Vec<f64>,

    /// Optional system file whose coordinates are rotated about the origin.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Write the rotated coordinates as CSV instead of printing them.
    #[arg(short, long, value_name = "PATH", requires = "input")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `vib` subcommand.
#[derive(Args, Debug)]
pub struct VibArgs {
    /// Path to the system file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Write normal modes as CSV, one row per mode and atom.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override `eigen.max-iterations` from the system file (0 iterates until convergence).
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Override `eigen.tolerance` from the system file.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,
}
