//! Grid settings file.
//!
//! The same JSON the server embeds in a contents view: remote paging
//! parameters, column definitions and grid options.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sdigrid::prelude::*;
use sdigrid_remote::RemoteModelConfig;
use serde::Deserialize;

use crate::error::{CliError, Result};
use crate::paths;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub remote: RemoteModelConfig,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, alias = "slickgridOptions")]
    pub grid_options: GridOptions,
    /// Server-sent events endpoint, relative to the contents URL.
    #[serde(default)]
    pub events_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Settings {
    /// Loads `path`, or the default settings file when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match path {
            Some(path) => path.to_path_buf(),
            None => paths::settings_file().ok_or(CliError::NoSettings)?,
        };
        let text = fs::read_to_string(&path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = Self::parse(&text).map_err(|source| CliError::Settings { path, source })?;
        Ok(settings)
    }

    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
