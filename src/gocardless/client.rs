use super::BankDataOperations;
use crate::config::GoCardlessConfig;
use crate::error::{AppError, Result};
use crate::gocardless::auth::TokenManager;
use crate::gocardless::types::{BalancesResponse, Institution, RequisitionRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;
use tracing::instrument;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GoCardlessClient {
    client: Client,
    tokens: TokenManager,
    api_base_url: String,
}

impl GoCardlessClient {
    pub fn new(config: &GoCardlessConfig, token_cache: PathBuf) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::GoCardless(format!("Failed to build reqwest client: {}", e)))?;

        let tokens = TokenManager::new(
            client.clone(),
            &config.api_base_url,
            &config.secrets_dir,
            token_cache,
        );

        Ok(Self {
            client,
            tokens,
            api_base_url: config.api_base_url.clone(),
        })
    }

    /// Authenticated GET returning the parsed JSON body
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let access_token = self.tokens.get_access_token().await?;
        let url = format!("{}{}", self.api_base_url, path);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        Self::parse_response(response, "GET", path).await
    }

    /// Authenticated POST of a JSON payload returning the parsed JSON body
    pub async fn post<P, T>(&self, path: &str, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let access_token = self.tokens.get_access_token().await?;
        let url = format!("{}{}", self.api_base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        Self::parse_response(response, "POST", path).await
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
        method: &str,
        path: &str,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GoCardless(format!(
                "{} {} failed: {} - {}",
                method, path, status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl BankDataOperations for GoCardlessClient {
    #[instrument(name = "Fetching institutions", skip(self))]
    async fn institutions(&self, country: &str) -> Result<Vec<Institution>> {
        self.get(&format!("/institutions/?country={}", country.to_lowercase()))
            .await
    }

    #[instrument(name = "Creating requisition", skip_all)]
    async fn create_requisition(&self, request: &RequisitionRequest) -> Result<serde_json::Value> {
        self.post("/requisitions/", request).await
    }

    #[instrument(name = "Fetching requisition", skip(self))]
    async fn requisition(&self, requisition_id: &str) -> Result<serde_json::Value> {
        self.get(&format!("/requisitions/{}/", requisition_id)).await
    }

    #[instrument(name = "Fetching balances", skip(self))]
    async fn balances(&self, account_id: &str) -> Result<BalancesResponse> {
        self.get(&format!("/accounts/{}/balances/", account_id))
            .await
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use mockito::ServerGuard;
    use serde_json::json;

    /// Point a client at `server`, with secrets and a token cache inside `dir`.
    pub(crate) fn client_for(server: &ServerGuard, dir: &std::path::Path) -> GoCardlessClient {
        let config = GoCardlessConfig {
            secrets_dir: dir.join("secrets"),
            api_base_url: server.url(),
        };
        crate::secrets::test_helpers::write_gocardless_secrets(&config.secrets_dir, "sid", "skey");
        GoCardlessClient::new(&config, dir.join("data").join("gcbad_token_cache.json")).unwrap()
    }

    pub(crate) async fn mock_token_endpoints(
        server: &mut ServerGuard,
        refresh_expires: i64,
    ) -> (mockito::Mock, mockito::Mock) {
        let new_token = server
            .mock("POST", "/token/new/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "refresh": "r1", "refresh_expires": refresh_expires }).to_string())
            .create_async()
            .await;
        let refresh = server
            .mock("POST", "/token/refresh/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "access": "a1" }).to_string())
            .create_async()
            .await;
        (new_token, refresh)
    }
}
