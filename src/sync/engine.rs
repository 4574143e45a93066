use crate::config::RunTarget;
use crate::error::Result;
use crate::gocardless::BankDataOperations;
use crate::models::{Balance, BalancePreference};
use crate::sheets::SheetOperations;
use tracing::{info, instrument};

/// Fetches one account balance and writes it to a sheet range.
pub struct SyncEngine<BC, SC> {
    preference: BalancePreference,
    bank_client: BC,
    sheets_client: SC,
}

impl<BC, SC> SyncEngine<BC, SC>
where
    BC: BankDataOperations + Sync,
    SC: SheetOperations + Sync,
{
    pub fn new(preference: BalancePreference, bank_client: BC, sheets_client: SC) -> Self {
        Self {
            preference,
            bank_client,
            sheets_client,
        }
    }

    /// Nothing is written unless the balance was fetched and selected.
    #[instrument(name = "Sync", skip_all, fields(account_id = %target.account_id))]
    pub async fn sync(&self, target: &RunTarget) -> Result<Balance> {
        let response = self.bank_client.balances(&target.account_id).await?;
        let balance = Balance::select(&response, &self.preference)?;

        let row = balance.to_sheet_row(chrono::Utc::now().timestamp());
        self.sheets_client
            .write_range(&target.spreadsheet_id, &target.range, vec![row])
            .await?;

        info!(balance_type = %balance.balance_type, range = %target.range, "Balance synced");

        Ok(balance)
    }
}

#[cfg(test)]
mod mocks {
    use super::*;
    use crate::error::AppError;
    use crate::gocardless::types::{BalancesResponse, Institution, RequisitionRequest};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    pub(crate) struct MockBankClient {
        pub balances: BalancesResponse,
    }

    #[async_trait]
    impl BankDataOperations for MockBankClient {
        async fn institutions(&self, _country: &str) -> Result<Vec<Institution>> {
            Ok(Vec::new())
        }

        async fn create_requisition(
            &self,
            _request: &RequisitionRequest,
        ) -> Result<serde_json::Value> {
            Err(AppError::GoCardless("not mocked".to_string()))
        }

        async fn requisition(&self, _requisition_id: &str) -> Result<serde_json::Value> {
            Err(AppError::GoCardless("not mocked".to_string()))
        }

        async fn balances(&self, _account_id: &str) -> Result<BalancesResponse> {
            Ok(self.balances.clone())
        }
    }

    /// Records every write as (spreadsheet id, range, rows).
    #[derive(Clone, Default)]
    pub(crate) struct MockSheetsClient {
        pub writes: Arc<Mutex<Vec<(String, String, Vec<Vec<String>>)>>>,
    }

    #[async_trait]
    impl SheetOperations for MockSheetsClient {
        async fn write_range(
            &self,
            spreadsheet_id: &str,
            range: &str,
            rows: Vec<Vec<String>>,
        ) -> Result<()> {
            self.writes.lock().unwrap().push((
                spreadsheet_id.to_string(),
                range.to_string(),
                rows,
            ));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::{MockBankClient, MockSheetsClient};
    use super::*;
    use crate::error::AppError;
    use crate::gocardless::test_helpers::{client_for, mock_token_endpoints};
    use crate::gocardless::types::BalancesResponse;
    use crate::models::balance::test_helpers::mock_balance;
    use mockito::Server;
    use rust_decimal::prelude::dec;
    use serde_json::json;
    use tempfile::TempDir;

    fn target() -> RunTarget {
        RunTarget {
            account_id: "acc-1".to_string(),
            spreadsheet_id: "sheet-1".to_string(),
            range: "Balance!A2:E2".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sync_writes_selected_balance() {
        let bank_client = MockBankClient {
            balances: BalancesResponse {
                balances: vec![
                    mock_balance("interimAvailable", dec!(10.50)),
                    mock_balance("closingBooked", dec!(9.99)),
                ],
            },
        };
        let sheets_client = MockSheetsClient::default();
        let engine = SyncEngine::new(
            BalancePreference::default(),
            bank_client,
            sheets_client.clone(),
        );

        let balance = engine.sync(&target()).await.unwrap();

        assert_eq!(balance.balance_type, "closingBooked");
        let writes = sheets_client.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let (spreadsheet_id, range, rows) = &writes[0];
        assert_eq!(spreadsheet_id, "sheet-1");
        assert_eq!(range, "Balance!A2:E2");
        assert_eq!(rows[0][..4], ["9.99", "EUR", "closingBooked", "2025-01-31"]);
    }

    #[tokio::test]
    async fn test_sync_without_balances_writes_nothing() {
        let sheets_client = MockSheetsClient::default();
        let engine = SyncEngine::new(
            BalancePreference::default(),
            MockBankClient {
                balances: BalancesResponse::default(),
            },
            sheets_client.clone(),
        );

        let err = engine.sync(&target()).await.unwrap_err();

        assert!(matches!(err, AppError::Data(_)));
        assert!(sheets_client.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_end_to_end_against_mock_api() {
        let mut server = Server::new_async().await;
        let tmp = TempDir::new().unwrap();
        let (new_token, refresh) = mock_token_endpoints(&mut server, 3600).await;
        let balances = server
            .mock("GET", "/accounts/acc-1/balances/")
            .match_header("authorization", "Bearer a1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({ "balances": [{
                    "balanceAmount": { "amount": "42.00", "currency": "EUR" },
                    "balanceType": "closingBooked",
                    "referenceDate": "2025-01-31",
                }]})
                .to_string(),
            )
            .create_async()
            .await;

        let sheets_client = MockSheetsClient::default();
        let engine = SyncEngine::new(
            BalancePreference::default(),
            client_for(&server, tmp.path()),
            sheets_client.clone(),
        );

        let before = chrono::Utc::now().timestamp();
        engine.sync(&target()).await.unwrap();

        new_token.assert_async().await;
        refresh.assert_async().await;
        balances.assert_async().await;

        let writes = sheets_client.writes.lock().unwrap();
        let (_, _, rows) = &writes[0];
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][..4], ["42.00", "EUR", "closingBooked", "2025-01-31"]);
        let written_at: i64 = rows[0][4].parse().unwrap();
        assert!(written_at >= before);

        let cache_path = tmp.path().join("data").join("gcbad_token_cache.json");
        let cache: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(cache_path).unwrap()).unwrap();
        assert_eq!(cache["refresh"], "r1");
        assert!(cache["refresh_expires_at"].as_i64().unwrap() > before);
    }
}
