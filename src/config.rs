//! Startup configuration: which strategy to run and how to size the scratch
//! buffer, loadable from TOML.
//!
//! ```toml
//! strategy = "table-driven"
//! initial_capacity = 4096
//! direction = "to-interchange"
//! ```

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::{Strategy, Transcoder};
use crate::scratch::ScratchBuffer;
use crate::tables::Direction;
use crate::{Error, Result};

/// Strategy as written in configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyChoice {
    /// Whatever [`Strategy::native`] picks for this build
    #[default]
    Auto,
    /// Always walk the tables
    TableDriven,
    /// Always pass bytes through
    Identity,
}

impl StrategyChoice {
    /// Resolve to a concrete strategy
    pub fn resolve(self) -> Strategy {
        match self {
            StrategyChoice::Auto => Strategy::native(),
            StrategyChoice::TableDriven => Strategy::TableDriven,
            StrategyChoice::Identity => Strategy::Identity,
        }
    }
}

/// Transcoder settings. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Strategy to resolve at startup
    pub strategy: StrategyChoice,
    /// Bytes to reserve up front; 0 allocates on first use
    pub initial_capacity: usize,
    /// Direction used when a caller does not name one
    pub direction: Direction,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Make this strategy the process default for the shared entry points
    /// ([`crate::to_local_encoding`], [`crate::to_interchange_encoding`]).
    pub fn install(&self) {
        crate::set_default_strategy(self.strategy.resolve());
    }

    /// Build a transcoder from these settings
    pub fn build_transcoder(&self) -> Transcoder {
        Transcoder::with_scratch(
            self.strategy.resolve(),
            ScratchBuffer::with_capacity(self.initial_capacity),
        )
    }
}
