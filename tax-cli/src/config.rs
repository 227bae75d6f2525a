//! TOML configuration for the estimator binary.
//!
//! Every key is optional. Relative table paths in a config file are resolved
//! against the directory containing that file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tax_core::TaxError;
use tax_core::calculations::SolverConfig;
use thiserror::Error;

pub const DEFAULT_FEDERAL_TABLE: &str = "data/fed_2025.csv";
pub const DEFAULT_REGIONAL_TABLE: &str = "data/prov_2025.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Solver(#[from] TaxError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub federal_table: PathBuf,
    pub regional_table: PathBuf,
    pub log_level: String,
    pub solver: SolverConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            federal_table: PathBuf::from(DEFAULT_FEDERAL_TABLE),
            regional_table: PathBuf::from(DEFAULT_REGIONAL_TABLE),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            solver: SolverConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses a config from TOML text. Paths are left as written.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.solver.validate()?;
        Ok(config)
    }

    /// Reads and parses the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;

        if let Some(base) = path.parent() {
            config.federal_table = resolve_relative(base, &config.federal_table);
            config.regional_table = resolve_relative(base, &config.regional_table);
        }
        Ok(config)
    }

    /// The config at `path`, or the defaults when no file was given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

fn resolve_relative(
    base: &Path,
    path: &Path,
) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn full_file_overrides_every_key() {
        let config = AppConfig::from_toml_str(
            r#"
            federal_table = "tables/fed.csv"
            regional_table = "tables/prov.csv"
            log_level = "debug"

            [solver]
            max_income = "2000000"
            tolerance = "0.001"
            max_iterations = 64
            "#,
        )
        .unwrap();

        assert_eq!(config.federal_table, PathBuf::from("tables/fed.csv"));
        assert_eq!(config.regional_table, PathBuf::from("tables/prov.csv"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(
            config.solver,
            SolverConfig {
                max_income: dec!(2000000),
                tolerance: dec!(0.001),
                max_iterations: 64,
            }
        );
    }

    #[test]
    fn partial_solver_section_keeps_other_defaults() {
        let config = AppConfig::from_toml_str("[solver]\nmax_iterations = 50\n").unwrap();

        assert_eq!(config.solver.max_iterations, 50);
        assert_eq!(config.solver.tolerance, dec!(0.01));
        assert_eq!(config.federal_table, PathBuf::from(DEFAULT_FEDERAL_TABLE));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = AppConfig::from_toml_str("federal = \"x.csv\"\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_solver_bounds_are_rejected() {
        let err = AppConfig::from_toml_str("[solver]\ntolerance = \"0\"\n").unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Solver(TaxError::InvalidSolverConfig(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();

        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        assert_eq!(
            resolve_relative(Path::new("/etc/tax"), Path::new("fed.csv")),
            PathBuf::from("/etc/tax/fed.csv")
        );
        assert_eq!(
            resolve_relative(Path::new("/etc/tax"), Path::new("/srv/fed.csv")),
            PathBuf::from("/srv/fed.csv")
        );
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(
            AppConfig::load_or_default(None).unwrap(),
            AppConfig::default()
        );
    }
}
