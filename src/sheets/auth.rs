use crate::config::GoogleConfig;
use crate::error::{AppError, Result};
use crate::secrets::find_single_json;
use crate::sheets::client::AUTH_SCOPE;
use hyper_util::client::legacy::connect::HttpConnector;
use tracing::{debug, instrument};
use yup_oauth2::{
    ServiceAccountAuthenticator, authenticator::Authenticator, hyper_rustls::HttpsConnector,
};

pub(super) type AuthType = Authenticator<HttpsConnector<HttpConnector>>;

/// Create a service-account authenticator and verify it by fetching a token
#[instrument(name = "Authenticating Google service account", skip_all)]
pub(super) async fn create_and_verify_authenticator(config: &GoogleConfig) -> Result<AuthType> {
    let key_path = find_single_json(&config.secrets_dir)?;
    debug!(path = ?key_path, "Using service account key");

    let key = yup_oauth2::read_service_account_key(&key_path)
        .await
        .map_err(|e| AppError::Auth(format!("Failed to read service account key: {}", e)))?;

    let auth = ServiceAccountAuthenticator::builder(key)
        .build()
        .await
        .map_err(|e| AppError::Auth(format!("Failed to build authenticator: {}", e)))?;

    let _token = auth
        .token(&[AUTH_SCOPE])
        .await
        .map_err(|e| AppError::Auth(format!("Failed to get token: {}", e)))?;

    Ok(auth)
}
