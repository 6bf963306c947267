pub mod engine;
pub mod gradeable;

pub use engine::{EngineConfig, ScoreWeights};
pub use gradeable::GradeableConfig;

use serde::{Serialize, Deserialize};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::fs;
use crate::error::{Error, Result};
use log::{info, trace};

pub const GRADEABLE_CONFIG_FILE: &str = "config.json";
pub const ENGINE_CONFIG_FILE: &str = "lichen_config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LichenConfig {
    pub gradeable: GradeableConfig,
    pub engine: EngineConfig,
}

impl LichenConfig {
    pub fn validate(&self) -> Result<()> {
        self.gradeable.validate()?;
        self.engine.validate()?;
        Ok(())
    }

    /// Loads `config.json` from the gradeable root and, if present, the
    /// engine settings. When `engine_path` is `None` the engine file is
    /// looked up next to `config.json`.
    pub fn load<P: AsRef<Path>>(gradeable_root: P, engine_path: Option<&Path>) -> Result<Self> {
        let root = gradeable_root.as_ref();
        let gradeable: GradeableConfig = read_json(&root.join(GRADEABLE_CONFIG_FILE))?;

        let engine_file = match engine_path {
            Some(path) => path.to_path_buf(),
            None => root.join(ENGINE_CONFIG_FILE),
        };
        let engine = if engine_file.is_file() {
            read_json(&engine_file)?
        } else if engine_path.is_some() {
            return Err(Error::Config(
                format!("Engine config file does not exist: {:?}", engine_file)
            ));
        } else {
            info!("No {} found, using default engine settings", ENGINE_CONFIG_FILE);
            EngineConfig::default()
        };

        let config = Self { gradeable, engine };
        config.validate()?;
        Ok(config)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    trace!("Loading configuration from: {:?}", path);
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Unable to read {:?}: {}", path, e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Malformed {:?}: {}", path, e))
    })
}
