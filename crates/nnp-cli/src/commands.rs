pub mod repeats;
pub mod rotate;
pub mod vib;
pub mod wrap;

use crate::config::{EigenOverrides, PartialSystemConfig, SystemConfig};
use crate::error::Result;
use nalgebra::Point3;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub(crate) fn load_system(path: &Path, overrides: EigenOverrides) -> Result<SystemConfig> {
    info!("Loading system from {:?}", path);
    let system = PartialSystemConfig::from_file(path)?.merge(overrides)?;
    info!("Loaded {} atom(s).", system.frame.len());
    Ok(system)
}

#[derive(Serialize)]
struct CoordinateRecord {
    atom: usize,
    x: f64,
    y: f64,
    z: f64,
}

/// Writes coordinates as CSV to `path`, or as an aligned table to `out` when no path is given.
pub(crate) fn emit_coordinates(
    coordinates: &[Point3<f64>],
    path: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    match path {
        Some(path) => {
            let mut writer = csv::Writer::from_path(path)?;
            for (atom, r) in coordinates.iter().enumerate() {
                writer.serialize(CoordinateRecord {
                    atom,
                    x: r.x,
                    y: r.y,
                    z: r.z,
                })?;
            }
            writer.flush()?;
            info!("Wrote {} coordinate(s) to {:?}", coordinates.len(), path);
        }
        None => {
            for r in coordinates {
                writeln!(out, "{:>16.8} {:>16.8} {:>16.8}", r.x, r.y, r.z)?;
            }
        }
    }
    Ok(())
}
