//! Resolve where job directories live

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::SubmitError;

/// Environment variable that overrides the default base directory
pub static BASE_DIR_VAR: &str = "GET_FEATURES_BASE_DIR";

/// Default base directory, relative to the user's home
static DEFAULT_BASE_DIR: &str = "sock-classifier";

/// Resolved once at startup and passed to every step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of `jobs/`, `env/` and `src/`
    pub base_dir: PathBuf,
}

impl Config {
    pub fn new(base_dir: PathBuf) -> Result<Config, SubmitError> {
        if !base_dir.is_absolute() {
            return Err(SubmitError::RelativeBaseDir(base_dir));
        }
        Ok(Config { base_dir })
    }

    /// Read the override from the environment, falling back to `~/sock-classifier`
    pub fn from_env() -> Result<Config, SubmitError> {
        Config::resolve(std::env::var_os(BASE_DIR_VAR), home::home_dir())
    }

    fn resolve(overridden: Option<OsString>, home: Option<PathBuf>) -> Result<Config, SubmitError> {
        let base_dir = match overridden.filter(|value| !value.is_empty()) {
            Some(value) => {
                info!("Using {} from {}", Path::new(&value).display(), BASE_DIR_VAR);
                PathBuf::from(value)
            }
            None => home
                .ok_or(SubmitError::NoHomeDir(BASE_DIR_VAR))?
                .join(DEFAULT_BASE_DIR),
        };
        Config::new(base_dir)
    }

    pub fn jobs_dir(&self) -> PathBuf {
        self.base_dir.join("jobs")
    }

    /// Script run by `source` before the downstream executable
    pub fn activate_script(&self) -> PathBuf {
        self.base_dir.join("env/bin/activate")
    }

    /// The downstream feature extraction executable
    pub fn executable(&self) -> PathBuf {
        self.base_dir.join("src/utils/get_features.py")
    }
}
