mod auth;
mod client;
pub mod types;
pub use auth::clear_tokens as clear_gocardless_tokens;
pub use client::GoCardlessClient;

use crate::error::Result;
use crate::gocardless::types::{BalancesResponse, Institution, RequisitionRequest};

use async_trait::async_trait;

#[async_trait]
pub trait BankDataOperations {
    async fn institutions(&self, country: &str) -> Result<Vec<Institution>>;

    async fn create_requisition(&self, request: &RequisitionRequest) -> Result<serde_json::Value>;

    async fn requisition(&self, requisition_id: &str) -> Result<serde_json::Value>;

    async fn balances(&self, account_id: &str) -> Result<BalancesResponse>;
}

#[cfg(test)]
pub(crate) use client::test_helpers;
