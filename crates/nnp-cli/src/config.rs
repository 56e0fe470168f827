mod defaults;
mod models;

pub use models::{ConfiguredPotential, SystemConfig};

use crate::cli::VibArgs;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use nalgebra::{DMatrix, Matrix3, Point3, Vector3};
use nnp::core::models::frame::Frame;
use nnp::core::potential::{HarmonicWell, LennardJones};
use nnp::core::so3::rotate_along;
use nnp::core::vib::{EigenSettings, EigenSettingsBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", tag = "type")]
enum PartialPotential {
    Harmonic {
        #[serde(rename = "force-constants")]
        force_constants: [f64; 3],
        /// Axis-angle vector rotating the well's principal axes.
        orientation: Option<[f64; 3]>,
    },
    LennardJones {
        #[serde(rename = "r-min")]
        r_min: f64,
        #[serde(rename = "well-depth")]
        well_depth: f64,
    },
}

impl From<PartialPotential> for ConfiguredPotential {
    fn from(p: PartialPotential) -> Self {
        match p {
            PartialPotential::Harmonic {
                force_constants,
                orientation,
            } => {
                let well = HarmonicWell::new(Vector3::from(force_constants));
                ConfiguredPotential::Harmonic(match orientation {
                    Some(axis) => well.with_orientation(rotate_along(&Vector3::from(axis))),
                    None => well,
                })
            }
            PartialPotential::LennardJones { r_min, well_depth } => {
                ConfiguredPotential::LennardJones(LennardJones { r_min, well_depth })
            }
        }
    }
}

/// Eigensolver settings given on the command line; they win over the system file.
#[derive(Debug, Default, Clone, Copy)]
pub struct EigenOverrides {
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
}

impl From<&VibArgs> for EigenOverrides {
    fn from(args: &VibArgs) -> Self {
        Self {
            tolerance: args.tolerance,
            max_iterations: args.max_iterations,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialSystemConfig {
    coordinates: Option<Vec<[f64; 3]>>,
    masses: Option<Vec<f64>>,
    cell: Option<[[f64; 3]; 3]>,
    pbc: Option<[bool; 3]>,
    hessian: Option<Vec<Vec<f64>>>,
    eigen: Option<EigenSettings>,
    potential: Option<PartialPotential>,
}

impl PartialSystemConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading system from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn merge(self, overrides: EigenOverrides) -> Result<SystemConfig> {
        let defaults = DefaultsConfig::default();

        let coordinates: Vec<Point3<f64>> = self
            .coordinates
            .ok_or_else(|| CliError::Config("`coordinates` is required.".to_string()))?
            .into_iter()
            .map(Point3::from)
            .collect();

        if let Some(masses) = &self.masses {
            if masses.len() != coordinates.len() {
                return Err(CliError::Config(format!(
                    "`masses` has {} entries but there are {} atoms.",
                    masses.len(),
                    coordinates.len()
                )));
            }
        }

        let pbc = self.pbc.unwrap_or(defaults.pbc);
        if pbc.iter().any(|&p| p) && self.cell.is_none() {
            return Err(CliError::Config(
                "`cell` is required when any `pbc` flag is set.".to_string(),
            ));
        }
        let cell = self.cell.unwrap_or(defaults.cell);
        let cell = Matrix3::from_fn(|i, j| cell[i][j]);

        let hessian = self.hessian.map(square_matrix).transpose()?;

        let file_eigen = self.eigen.unwrap_or(defaults.eigen);
        let eigen = EigenSettingsBuilder::new()
            .tolerance(overrides.tolerance.unwrap_or(file_eigen.tolerance))
            .max_iterations(overrides.max_iterations.unwrap_or(file_eigen.max_iterations))
            .build()?;

        Ok(SystemConfig {
            frame: Frame::new(coordinates, cell, pbc),
            masses: self.masses,
            hessian,
            eigen,
            potential: self.potential.map(Into::into),
        })
    }
}

fn square_matrix(rows: Vec<Vec<f64>>) -> Result<DMatrix<f64>> {
    let n = rows.len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(CliError::Config(format!(
            "`hessian` must be square: row {} has {} entries, expected {}.",
            i,
            row.len(),
            n
        )));
    }
    Ok(DMatrix::from_fn(n, n, |i, j| rows[i][j]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(content: &str) -> PartialSystemConfig {
        PartialSystemConfig::from_toml(content).unwrap()
    }

    #[test]
    fn minimal_file_is_merged_with_defaults() {
        let system = parse("coordinates = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]")
            .merge(EigenOverrides::default())
            .unwrap();

        assert_eq!(system.frame.len(), 2);
        assert_eq!(system.frame.pbc, [false; 3]);
        assert_eq!(system.frame.cell, Matrix3::zeros());
        assert!(system.masses.is_none());
        assert!(system.hessian.is_none());
        assert!(system.potential.is_none());
        assert_eq!(system.eigen.tolerance, f64::EPSILON);
        assert_eq!(system.eigen.max_iterations, 0);
    }

    #[test]
    fn full_file_is_loaded_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("system.toml");
        fs::write(
            &path,
            r#"
            coordinates = [[11.0, 2.0, 3.0]]
            masses = [12.0]
            cell = [[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]]
            pbc = [true, true, false]
            hessian = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]

            [eigen]
            tolerance = 1e-12
            max-iterations = 200

            [potential]
            type = "lennard-jones"
            r-min = 1.5
            well-depth = 0.2
            "#,
        )
        .unwrap();

        let system = PartialSystemConfig::from_file(&path)
            .unwrap()
            .merge(EigenOverrides::default())
            .unwrap();

        assert_eq!(system.frame.coordinates[0], Point3::new(11.0, 2.0, 3.0));
        assert_eq!(system.frame.pbc, [true, true, false]);
        assert_eq!(system.frame.cell[(1, 1)], 10.0);
        assert_eq!(system.masses, Some(vec![12.0]));
        assert_eq!(system.hessian, Some(DMatrix::identity(3, 3)));
        assert_eq!(system.eigen.tolerance, 1e-12);
        assert_eq!(system.eigen.max_iterations, 200);
        assert_eq!(
            system.potential,
            Some(ConfiguredPotential::LennardJones(LennardJones {
                r_min: 1.5,
                well_depth: 0.2
            }))
        );
    }

    #[test]
    fn cli_overrides_win_over_file_values() {
        let system = parse(
            r#"
            coordinates = [[0.0, 0.0, 0.0]]
            [eigen]
            tolerance = 1e-12
            max-iterations = 200
            "#,
        )
        .merge(EigenOverrides {
            tolerance: Some(1e-9),
            max_iterations: None,
        })
        .unwrap();

        assert_eq!(system.eigen.tolerance, 1e-9);
        assert_eq!(system.eigen.max_iterations, 200);
    }

    #[test]
    fn partial_eigen_section_keeps_remaining_defaults() {
        let system = parse("coordinates = [[0.0, 0.0, 0.0]]\n[eigen]\nmax-iterations = 50")
            .merge(EigenOverrides::default())
            .unwrap();

        assert_eq!(system.eigen.tolerance, f64::EPSILON);
        assert_eq!(system.eigen.max_iterations, 50);
    }

    #[test]
    fn harmonic_potential_orientation_is_an_axis_angle_vector() {
        let system = parse(
            r#"
            coordinates = [[0.0, 0.0, 0.0]]
            [potential]
            type = "harmonic"
            force-constants = [0.5, 1.0, 2.0]
            orientation = [0.0, 0.0, 0.7853981633974483]
            "#,
        )
        .merge(EigenOverrides::default())
        .unwrap();

        match system.potential {
            Some(ConfiguredPotential::Harmonic(well)) => {
                assert_eq!(well.force_constants, Vector3::new(0.5, 1.0, 2.0));
                assert!((well.orientation.angle() - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
            }
            other => panic!("Expected harmonic potential, got {other:?}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = PartialSystemConfig::from_toml("coordinates = []\nposition = []");
        assert!(result.is_err());

        let result =
            PartialSystemConfig::from_toml("coordinates = []\n[eigen]\nmax-iter = 3");
        assert!(result.is_err());
    }

    #[test]
    fn missing_coordinates_returns_config_error() {
        let result = parse("masses = [1.0]").merge(EigenOverrides::default());
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("coordinates")));
    }

    #[test]
    fn periodic_system_without_cell_returns_config_error() {
        let result = parse("coordinates = [[0.0, 0.0, 0.0]]\npbc = [true, false, false]")
            .merge(EigenOverrides::default());
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("cell")));
    }

    #[test]
    fn mass_count_must_match_atom_count() {
        let result = parse("coordinates = [[0.0, 0.0, 0.0]]\nmasses = [1.0, 2.0]")
            .merge(EigenOverrides::default());
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("masses")));
    }

    #[test]
    fn ragged_hessian_returns_config_error() {
        let result = parse("coordinates = [[0.0, 0.0, 0.0]]\nhessian = [[1.0, 0.0], [0.0]]")
            .merge(EigenOverrides::default());
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("hessian")));
    }

    #[test]
    fn invalid_tolerance_is_reported_as_settings_error() {
        let result = parse("coordinates = [[0.0, 0.0, 0.0]]\n[eigen]\ntolerance = -1.0")
            .merge(EigenOverrides::default());
        assert!(matches!(result, Err(CliError::Settings(_))));
    }

    #[test]
    fn unreadable_file_returns_io_error() {
        let dir = tempdir().unwrap();
        let result = PartialSystemConfig::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn malformed_file_returns_parsing_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "coordinates = [[0.0, 0.0").unwrap();
        let result = PartialSystemConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
