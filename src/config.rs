use crate::error::{AppError, Result};
use crate::models::BalancePreference;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_PREFIX: &str = "gocardless-sheets";
const CONFIG_FILE_NAME: &str = "config.toml";
const TOKEN_CACHE_FILE_NAME: &str = "gcbad_token_cache.json";

pub const DEFAULT_API_BASE_URL: &str = "https://bankaccountdata.gocardless.com/api/v2";
const DEFAULT_GOCARDLESS_SECRETS_DIR: &str = "/secrets/gcbad";
const DEFAULT_GOOGLE_SECRETS_DIR: &str = "/secrets/gsheets";
const DEFAULT_DATA_DIR: &str = "/data";

pub const ENV_GOCARDLESS_SECRETS_DIR: &str = "GCBAD_SECRETS_DIR";
pub const ENV_GOOGLE_SECRETS_DIR: &str = "GSHEETS_SECRETS_DIR";
pub const ENV_DATA_DIR: &str = "DATA_DIR";
pub const ENV_API_BASE_URL: &str = "GCBAD_API_BASE_URL";
pub const ENV_BALANCE_TYPE_PREFERENCE: &str = "BALANCE_TYPE_PREFERENCE";
pub const ENV_ACCOUNT_ID: &str = "GC_ACCOUNT_ID";
pub const ENV_SPREADSHEET_ID: &str = "GSHEET_ID";
pub const ENV_SHEET_RANGE: &str = "GSHEET_RANGE";

/// Process-wide settings, resolved once at startup and passed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub gocardless: GoCardlessConfig,
    pub google: GoogleConfig,
    pub data_dir: PathBuf,
    pub balance_preference: BalancePreference,
    pub run: RunConfig,
}

#[derive(Debug, Clone)]
pub struct GoCardlessConfig {
    pub secrets_dir: PathBuf,
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub secrets_dir: PathBuf,
}

/// Inputs for the `run` command. Each is optional until the command validates it.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub account_id: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunTarget {
    pub account_id: String,
    pub spreadsheet_id: String,
    pub range: String,
}

impl RunConfig {
    pub fn target(&self) -> Result<RunTarget> {
        let require = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| AppError::Config(format!("Missing env {}", name)))
        };

        Ok(RunTarget {
            account_id: require(&self.account_id, ENV_ACCOUNT_ID)?,
            spreadsheet_id: require(&self.spreadsheet_id, ENV_SPREADSHEET_ID)?,
            range: require(&self.range, ENV_SHEET_RANGE)?,
        })
    }
}

/// Optional on-disk layer. Every key may be omitted.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub balance_type_preference: Option<Vec<String>>,
    pub gocardless: FileGoCardlessConfig,
    pub google: FileGoogleConfig,
    pub run: FileRunConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileGoCardlessConfig {
    pub secrets_dir: Option<PathBuf>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileGoogleConfig {
    pub secrets_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileRunConfig {
    pub account_id: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub range: Option<String>,
}

impl Config {
    /// Load the optional config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let file = match Self::config_file() {
            Some(path) => Self::read_file(&path)?,
            None => FileConfig::default(),
        };

        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    fn read_file(path: &Path) -> Result<FileConfig> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config {:?}: {}", path, e)))
    }

    /// Merge defaults, the file layer and the environment (highest precedence).
    pub fn resolve<F>(file: FileConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let path_or = |key: &str, file_value: Option<PathBuf>, default: &str| {
            env(key)
                .map(PathBuf::from)
                .or(file_value)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        let balance_preference = match env(ENV_BALANCE_TYPE_PREFERENCE) {
            Some(value) => BalancePreference::parse(&value),
            None => file
                .balance_type_preference
                .map(BalancePreference::new)
                .unwrap_or_default(),
        };

        Self {
            gocardless: GoCardlessConfig {
                secrets_dir: path_or(
                    ENV_GOCARDLESS_SECRETS_DIR,
                    file.gocardless.secrets_dir,
                    DEFAULT_GOCARDLESS_SECRETS_DIR,
                ),
                api_base_url: env(ENV_API_BASE_URL)
                    .or(file.gocardless.api_base_url)
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            },
            google: GoogleConfig {
                secrets_dir: path_or(
                    ENV_GOOGLE_SECRETS_DIR,
                    file.google.secrets_dir,
                    DEFAULT_GOOGLE_SECRETS_DIR,
                ),
            },
            data_dir: path_or(ENV_DATA_DIR, file.data_dir, DEFAULT_DATA_DIR),
            balance_preference,
            run: RunConfig {
                account_id: env(ENV_ACCOUNT_ID).or(file.run.account_id),
                spreadsheet_id: env(ENV_SPREADSHEET_ID).or(file.run.spreadsheet_id),
                range: env(ENV_SHEET_RANGE).or(file.run.range),
            },
        }
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path, if one exists
    pub fn config_file() -> Option<PathBuf> {
        Self::xdg_dirs().find_config_file(CONFIG_FILE_NAME)
    }

    /// Get the refresh-token cache file path
    pub fn token_cache_file(&self) -> PathBuf {
        self.data_dir.join(TOKEN_CACHE_FILE_NAME)
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;

    pub(crate) fn config_from_env(vars: &[(&str, &str)]) -> Config {
        config_from(FileConfig::default(), vars)
    }

    pub(crate) fn config_from(file: FileConfig, vars: &[(&str, &str)]) -> Config {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::resolve(file, move |key| {
            vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
    }
}
