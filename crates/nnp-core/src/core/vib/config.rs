use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Convergence controls for the symmetric eigensolver.
///
/// Deserializes from kebab-case keys; missing keys take their default values.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EigenSettings {
    /// Off-diagonal magnitude below which an entry is treated as converged.
    pub tolerance: f64,
    /// Upper bound on solver iterations; `0` iterates until convergence.
    pub max_iterations: usize,
}

impl Default for EigenSettings {
    fn default() -> Self {
        Self {
            tolerance: f64::EPSILON,
            max_iterations: 0,
        }
    }
}

#[derive(Default)]
pub struct EigenSettingsBuilder {
    tolerance: Option<f64>,
    max_iterations: Option<usize>,
}

impl EigenSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    pub fn build(self) -> Result<EigenSettings, ConfigError> {
        let defaults = EigenSettings::default();
        let tolerance = self.tolerance.unwrap_or(defaults.tolerance);
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "tolerance",
                reason: format!("must be a positive finite number, got {tolerance}"),
            });
        }
        Ok(EigenSettings {
            tolerance,
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_without_overrides_returns_defaults() {
        let settings = EigenSettingsBuilder::new().build().unwrap();
        assert_eq!(settings, EigenSettings::default());
    }

    #[test]
    fn builder_applies_overrides() {
        let settings = EigenSettingsBuilder::new()
            .tolerance(1e-12)
            .max_iterations(500)
            .build()
            .unwrap();
        assert_eq!(settings.tolerance, 1e-12);
        assert_eq!(settings.max_iterations, 500);
    }

    #[test]
    fn builder_rejects_non_positive_tolerance() {
        for bad in [0.0, -1e-3, f64::INFINITY, f64::NAN] {
            let result = EigenSettingsBuilder::new().tolerance(bad).build();
            assert!(matches!(
                result,
                Err(ConfigError::InvalidParameter {
                    name: "tolerance",
                    ..
                })
            ));
        }
    }
}
