use crate::error::{AppError, Result};
use crate::gocardless::types::{
    NewTokenRequest, NewTokenResponse, RefreshTokenRequest, RefreshTokenResponse,
};
use crate::secrets::GoCardlessSecrets;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// A cached refresh token is reused only while it has more than this many
/// seconds left.
const REFRESH_EXPIRY_MARGIN_SECS: i64 = 60;

/// On-disk contents of the token cache. Missing keys read as absent.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub(crate) struct CachedRefreshToken {
    #[serde(default)]
    pub refresh: Option<String>,
    /// Expiry as seconds since Unix epoch; zero means it does not expire
    #[serde(default)]
    pub refresh_expires_at: Option<i64>,
}

impl CachedRefreshToken {
    /// The cached token, if present and not within the expiry margin at `now`
    pub fn usable_token(&self, now: i64) -> Option<&str> {
        let refresh = self.refresh.as_deref().filter(|r| !r.is_empty())?;
        let expires_at = self.refresh_expires_at.unwrap_or(0);

        match expires_at == 0 || now < expires_at.saturating_sub(REFRESH_EXPIRY_MARGIN_SECS) {
            true => Some(refresh),
            false => None,
        }
    }
}

/// Owns the refresh-token cache and mints access tokens from it.
///
/// Assumes one invocation at a time: the cache file is not locked, so two
/// concurrent runs may both mint a token and the last write wins.
pub(super) struct TokenManager {
    http_client: reqwest::Client,
    api_base_url: String,
    secrets_dir: PathBuf,
    cache_path: PathBuf,
}

impl TokenManager {
    pub(super) fn new(
        http_client: reqwest::Client,
        api_base_url: &str,
        secrets_dir: &Path,
        cache_path: PathBuf,
    ) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.to_string(),
            secrets_dir: secrets_dir.to_path_buf(),
            cache_path,
        }
    }

    /// Return the cached refresh token if still valid, otherwise mint and cache a new one
    pub(super) async fn get_refresh_token(&self) -> Result<String> {
        if let Some(cached) = load_cache(&self.cache_path)? {
            let now = chrono::Utc::now().timestamp();
            if let Some(refresh) = cached.usable_token(now) {
                debug!("Using cached GoCardless refresh token");
                return Ok(refresh.to_string());
            }
            debug!("Cached GoCardless refresh token missing or expiring");
        } else {
            debug!("No cached GoCardless refresh token found");
        }

        let secrets = GoCardlessSecrets::load(&self.secrets_dir)?;
        let cached = self.request_new_token(&secrets).await?;
        save_cache(&self.cache_path, &cached)?;

        cached
            .refresh
            .ok_or_else(|| AppError::Auth("No refresh token received".to_string()))
    }

    /// Exchange the refresh token for a short-lived access token. Never cached.
    pub(super) async fn get_access_token(&self) -> Result<String> {
        let refresh = self.get_refresh_token().await?;
        self.refresh_access_token(&refresh).await
    }

    #[instrument(name = "Requesting new GoCardless token", skip_all)]
    async fn request_new_token(&self, secrets: &GoCardlessSecrets) -> Result<CachedRefreshToken> {
        let url = format!("{}/token/new/", self.api_base_url);
        let request = NewTokenRequest {
            secret_id: &secrets.secret_id,
            secret_key: &secrets.secret_key,
        };

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Failed to create token: {} - {}",
                status, body
            )));
        }

        let token: NewTokenResponse = response.json().await?;

        let refresh_expires_at = match token.refresh_expires.unwrap_or(0) {
            0 => 0,
            expires_in => chrono::Utc::now().timestamp().saturating_add(expires_in),
        };

        debug!(refresh_expires_at, "Minted new GoCardless refresh token");

        Ok(CachedRefreshToken {
            refresh: Some(token.refresh),
            refresh_expires_at: Some(refresh_expires_at),
        })
    }

    async fn refresh_access_token(&self, refresh: &str) -> Result<String> {
        let url = format!("{}/token/refresh/", self.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&RefreshTokenRequest { refresh })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Failed to refresh access token: {} - {}",
                status, body
            )));
        }

        let token: RefreshTokenResponse = response.json().await?;
        Ok(token.access)
    }
}

pub(crate) fn load_cache(path: &Path) -> Result<Option<CachedRefreshToken>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| AppError::Data(format!("Failed to read token cache: {}", e)))?;

    let value: serde_json::Value = serde_json::from_str(&contents)
        .map_err(|e| AppError::Data(format!("Failed to parse token cache {:?}: {}", path, e)))?;

    // A sequence would also deserialize into the struct
    if !value.is_object() {
        return Err(AppError::Data(format!(
            "Token cache {:?} is not a JSON object",
            path
        )));
    }

    let cached: CachedRefreshToken = serde_json::from_value(value)
        .map_err(|e| AppError::Data(format!("Failed to parse token cache {:?}: {}", path, e)))?;

    Ok(Some(cached))
}

fn save_cache(path: &Path, cached: &CachedRefreshToken) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Data(format!("Failed to create token cache directory: {}", e))
        })?;
    }

    let contents = serde_json::to_string_pretty(cached)?;

    // Owner-only permissions from creation, the file holds a credential
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map_err(|e| AppError::Data(format!("Failed to create token cache: {}", e)))?;

    file.write_all(contents.as_bytes())
        .map_err(|e| AppError::Data(format!("Failed to write token cache: {}", e)))?;

    debug!(path = ?path, "Saved GoCardless token cache");

    Ok(())
}

/// Delete the token cache, forcing a fresh token on the next call
#[instrument(name = "Clearing GoCardless token cache", skip_all)]
pub fn clear_tokens(path: &Path) -> Result<()> {
    if !path.exists() {
        debug!("No GoCardless token cache to clear");
        return Ok(());
    }

    fs::remove_file(path)
        .map_err(|e| AppError::Data(format!("Failed to delete token cache: {}", e)))?;
    info!(path = ?path, "Cleared GoCardless token cache");

    Ok(())
}
