use super::{emit_coordinates, load_system};
use crate::cli::RotateArgs;
use crate::config::EigenOverrides;
use crate::error::{CliError, Result};
use nalgebra::Vector3;
use nnp::core::so3::{rotate_along, rotate_points};
use std::io::Write;
use tracing::info;

pub fn run(args: RotateArgs) -> Result<()> {
    execute(&args, &mut std::io::stdout().lock())
}

fn execute(args: &RotateArgs, out: &mut impl Write) -> Result<()> {
    let axis = match args.axis.as_slice() {
        &[x, y, z] => Vector3::new(x, y, z),
        other => {
            return Err(CliError::Argument(format!(
                "--axis takes exactly 3 components, got {}",
                other.len()
            )));
        }
    };

    let rotation = rotate_along(&axis);
    info!(angle = axis.norm(), "Built rotation matrix.");

    writeln!(out, "# rotation matrix")?;
    for row in rotation.matrix().row_iter() {
        writeln!(out, "{:>16.8} {:>16.8} {:>16.8}", row[0], row[1], row[2])?;
    }

    if let Some(input) = &args.input {
        let system = load_system(input, EigenOverrides::default())?;
        let rotated = rotate_points(&rotation, &system.frame.coordinates);
        if args.output.is_none() {
            writeln!(out, "# rotated coordinates")?;
        }
        emit_coordinates(&rotated, args.output.as_deref(), out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;
    use std::fs;
    use tempfile::tempdir;

    fn numbers(line: &str) -> Vec<f64> {
        line.split_whitespace().map(|v| v.parse().unwrap()).collect()
    }

    #[test]
    fn prints_quarter_turn_matrix() {
        let args = RotateArgs {
            axis: vec![0.0, 0.0, FRAC_PI_2],
            input: None,
            output: None,
        };
        let mut out = Vec::new();
        execute(&args, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        let expected = [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        for (line, want) in lines[1..].iter().zip(expected) {
            for (got, want) in numbers(line).iter().zip(want) {
                assert!((got - want).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn rotates_coordinates_from_system_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("system.toml");
        fs::write(&input, "coordinates = [[1.0, 0.0, 0.0], [0.0, 0.0, 2.0]]").unwrap();

        let args = RotateArgs {
            axis: vec![0.0, 0.0, FRAC_PI_2],
            input: Some(input),
            output: None,
        };
        let mut out = Vec::new();
        execute(&args, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[4], "# rotated coordinates");
        let first = numbers(lines[5]);
        assert!((first[0]).abs() < 1e-8 && (first[1] - 1.0).abs() < 1e-8);
        let second = numbers(lines[6]);
        assert!((second[2] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn wrong_number_of_axis_components_is_rejected() {
        let args = RotateArgs {
            axis: vec![1.0, 2.0],
            input: None,
            output: None,
        };
        assert!(matches!(
            execute(&args, &mut Vec::new()),
            Err(CliError::Argument(_))
        ));
    }
}
