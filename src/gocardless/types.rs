use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// https://developer.gocardless.com/bank-account-data/endpoints
#[derive(Serialize)]
pub(super) struct NewTokenRequest<'a> {
    pub(super) secret_id: &'a str,
    pub(super) secret_key: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct NewTokenResponse {
    pub(super) refresh: String,
    /// Refresh token lifetime in seconds; absent or zero means no expiry
    #[serde(default)]
    pub(super) refresh_expires: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshTokenRequest<'a> {
    pub(super) refresh: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct RefreshTokenResponse {
    pub(super) access: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Institution {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequisitionRequest {
    pub redirect: String,
    pub institution_id: String,
    pub reference: String,
    pub user_language: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct BalancesResponse {
    #[serde(default)]
    pub balances: Vec<GoCardlessBalance>,
}

// https://developer.gocardless.com/bank-account-data/balance
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoCardlessBalance {
    /// Only required on the record that gets selected
    #[serde(default)]
    pub balance_amount: Option<BalanceAmount>,
    #[serde(default)]
    pub balance_type: Option<String>,
    #[serde(default)]
    pub reference_date: Option<String>,
    #[serde(default)]
    pub last_change_date_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BalanceAmount {
    pub amount: Decimal,
    pub currency: String,
}
