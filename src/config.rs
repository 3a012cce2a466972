use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::WATCHER_NAME;

const DEFAULT_SERVER_URL: &str = "http://localhost:5600";
const TESTING_SERVER_URL: &str = "http://localhost:5666";
const ENV_PREFIX: &str = "AW_IMPORTER";

/// Settings from the `[aw-importer-ios-fitness]` table of the config file
#[derive(Debug, Deserialize, Validate, Clone)]
pub struct Config {
    /// Folder the workout exports are dropped into
    #[validate(length(min = 1, message = "data_path must point at the export folder"))]
    pub data_path: String,

    /// ActivityWatch server base URL; derived from `testing` when unset
    pub server_url: Option<String>,

    /// Hostname used in the bucket id; the OS hostname when unset
    pub hostname: Option<String>,

    /// Talk to the ActivityWatch testing server
    pub testing: bool,

    /// Log level (e.g., info, debug, trace)
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration (config file: {path}): {source}")]
    Invalid {
        path: String,
        #[source]
        source: validator::ValidationErrors,
    },
}

/// Values given on the command line; these win over file and environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub data_path: Option<String>,
    pub testing: Option<bool>,
}

impl Config {
    /// `<config dir>/activitywatch/aw-importer-ios-fitness/aw-importer-ios-fitness.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("activitywatch")
            .join(WATCHER_NAME)
            .join(format!("{}.toml", WATCHER_NAME))
    }

    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        let key = |name: &str| format!("{}.{}", WATCHER_NAME, name);

        let file = config::Config::builder()
            // Core defaults
            .set_default(key("data_path"), "")?
            .set_default(key("testing"), false)?
            .set_default(key("log_level"), "info")?
            // Config file (if present)
            .add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .build()?;

        // Lift our table to the top level so environment keys match field names
        let mut builder = config::Config::builder();
        for (name, value) in file.get_table(WATCHER_NAME)? {
            builder = builder.set_default(name, value)?;
        }

        let settings = builder
            // Environment overrides: AW_IMPORTER_DATA_PATH, AW_IMPORTER_SERVER_URL, etc.
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            // Command line
            .set_override_option("data_path", overrides.data_path.clone())?
            .set_override_option("testing", overrides.testing)?
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path.display().to_string(),
            source,
        })?;
        Ok(cfg)
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_path)
    }

    /// Returns the ActivityWatch server URL:
    /// - `server_url` if configured
    /// - otherwise the default local server, on the testing port when `testing` is set
    pub fn effective_server_url(&self) -> String {
        match &self.server_url {
            Some(url) => url.clone(),
            None if self.testing => TESTING_SERVER_URL.to_string(),
            None => DEFAULT_SERVER_URL.to_string(),
        }
    }

    pub fn effective_hostname(&self) -> String {
        self.hostname
            .clone()
            .or_else(os_hostname)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn os_hostname() -> Option<String> {
    gethostname::gethostname()
        .into_string()
        .ok()
        .filter(|name| !name.is_empty())
}
