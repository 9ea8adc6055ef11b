//! Configuration file support
//!
//! Looked up in order: an explicit path, `$CTC_CONFIG`, then
//! `<config home>/ctc/config.toml`. A missing file means defaults.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::CtcError;
use crate::importers::ConverterDefaults;
use crate::tax::TaxRates;

pub const CONFIG_ENV_VAR: &str = "CTC_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tax: TaxRates,
    pub converter: ConverterDefaults,
}

impl Config {
    /// Parse and validate TOML config text.
    pub fn from_toml(text: &str) -> Result<Self, CtcError> {
        let config: Config =
            toml::from_str(text).map_err(|e| CtcError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from `explicit`, `$CTC_CONFIG` or the default location.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CtcError> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::load_file(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load_file(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self, CtcError> {
        info!("Loading config from {:?}", path);
        let text = std::fs::read_to_string(path).map_err(|e| {
            CtcError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<(), CtcError> {
        let in_unit_range = |rate: Decimal| rate >= Decimal::ZERO && rate <= Decimal::ONE;

        if !in_unit_range(self.tax.income_tax_rate) {
            return Err(CtcError::ConfigError(format!(
                "[tax] income_tax_rate must be between 0 and 1, got {}",
                self.tax.income_tax_rate
            )));
        }
        if !in_unit_range(self.tax.tds_rate) {
            return Err(CtcError::ConfigError(format!(
                "[tax] tds_rate must be between 0 and 1, got {}",
                self.tax.tds_rate
            )));
        }

        let asset = &self.converter.default_asset;
        if asset.is_empty() || !asset.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CtcError::ConfigError(format!(
                "[converter] default_asset must be alphabetic, got '{}'",
                asset
            )));
        }

        Ok(())
    }
}

/// `<config home>/ctc/config.toml`, when a config home can be determined
pub fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join("ctc").join("config.toml"))
}
