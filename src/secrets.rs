use crate::error::{AppError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Accepted spellings for the GoCardless secret id, checked in order.
const SECRET_ID_ALIASES: &[&str] = &["secret_id", "secretId", "SECRET_ID", "id"];

/// Accepted spellings for the GoCardless secret key, checked in order.
const SECRET_KEY_ALIASES: &[&str] = &["secret_key", "secretKey", "SECRET_KEY", "key"];

/// Locate the only `.json` file in `dir`.
///
/// Fails if the directory is missing or holds zero or several `.json` files.
pub fn find_single_json(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(AppError::SecretsLookup(format!(
            "Secrets dir does not exist: {:?}",
            dir
        )));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if path.is_file() && is_json {
            files.push(path);
        }
    }
    files.sort();

    match files.as_slice() {
        [single] => Ok(single.clone()),
        _ => {
            let names: Vec<String> = files
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            Err(AppError::SecretsLookup(format!(
                "Expected exactly 1 .json in {:?}, found {}: {:?}",
                dir,
                files.len(),
                names
            )))
        }
    }
}

/// Read a JSON file as a generic key/value mapping.
pub fn load_json_map(path: &Path) -> Result<Map<String, Value>> {
    let contents = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::SecretsValidation(format!(
            "Expected a JSON object in {:?}",
            path
        ))),
    }
}

/// Static GoCardless user secrets.
#[derive(Clone, PartialEq)]
pub struct GoCardlessSecrets {
    pub secret_id: String,
    pub secret_key: String,
}

impl std::fmt::Debug for GoCardlessSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoCardlessSecrets")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl GoCardlessSecrets {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = find_single_json(dir)?;
        let map = load_json_map(&path)?;
        Self::from_map(&map).ok_or_else(|| {
            AppError::SecretsValidation(format!(
                "Could not find secret_id/secret_key in {:?}",
                path
            ))
        })
    }

    fn from_map(map: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            secret_id: first_non_empty(map, SECRET_ID_ALIASES)?,
            secret_key: first_non_empty(map, SECRET_KEY_ALIASES)?,
        })
    }
}

fn first_non_empty(map: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| map.get(*alias).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
