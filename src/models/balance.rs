use crate::error::{AppError, Result};
use crate::gocardless::types::{BalancesResponse, GoCardlessBalance};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

/// Most authoritative balance view first.
pub const DEFAULT_BALANCE_TYPE_PREFERENCE: &[&str] = &[
    "closingBooked",
    "closingAvailable",
    "interimBooked",
    "interimAvailable",
    "expected",
];

/// Ordered list of balance types to pick from, first match wins.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancePreference(Vec<String>);

impl BalancePreference {
    pub fn new(types: Vec<String>) -> Self {
        Self(
            types
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }

    /// Parse a comma-separated override such as `interimBooked, expected`
    pub fn parse(value: &str) -> Self {
        Self::new(value.split(',').map(str::to_string).collect())
    }

    pub fn types(&self) -> &[String] {
        &self.0
    }
}

impl Default for BalancePreference {
    fn default() -> Self {
        Self::new(
            DEFAULT_BALANCE_TYPE_PREFERENCE
                .iter()
                .map(|t| t.to_string())
                .collect(),
        )
    }
}

/// The single balance chosen from an account's reported balances.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub amount: Decimal,
    pub currency: String,
    pub balance_type: String,
    /// Reference date, else last change time, else empty
    pub reference: String,
}

impl Balance {
    /// Pick one balance according to `preference`.
    ///
    /// Preference order decides, not payload order. When no preferred type is
    /// present the first reported balance is used.
    pub fn select(response: &BalancesResponse, preference: &BalancePreference) -> Result<Self> {
        let first = response
            .balances
            .first()
            .ok_or_else(|| AppError::Data("No balances returned".to_string()))?;

        let by_type: HashMap<&str, &GoCardlessBalance> = response
            .balances
            .iter()
            .filter_map(|b| match b.balance_type.as_deref() {
                Some(t) if !t.is_empty() => Some((t, b)),
                _ => None,
            })
            .collect();

        let chosen = preference
            .types()
            .iter()
            .find_map(|t| by_type.get(t.as_str()).copied())
            .unwrap_or(first);

        chosen.try_into()
    }

    /// Sheet row: amount, currency, balance type, reference, unix timestamp
    pub fn to_sheet_row(&self, written_at: i64) -> Vec<String> {
        vec![
            self.amount.to_string(),
            self.currency.clone(),
            self.balance_type.clone(),
            self.reference.clone(),
            written_at.to_string(),
        ]
    }
}

impl TryFrom<&GoCardlessBalance> for Balance {
    type Error = AppError;

    fn try_from(gc: &GoCardlessBalance) -> Result<Self> {
        let amount = gc.balance_amount.as_ref().ok_or_else(|| {
            AppError::Data(format!(
                "Balance '{}' has no balanceAmount",
                gc.balance_type.as_deref().unwrap_or_default()
            ))
        })?;

        Ok(Balance {
            amount: amount.amount,
            currency: amount.currency.clone(),
            balance_type: gc.balance_type.clone().unwrap_or_default(),
            reference: gc
                .reference_date
                .clone()
                .filter(|r| !r.is_empty())
                .or_else(|| gc.last_change_date_time.clone())
                .unwrap_or_default(),
        })
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}\tbalanceType={}\tref={}",
            self.amount, self.currency, self.balance_type, self.reference
        )
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use crate::gocardless::types::{BalanceAmount, GoCardlessBalance};
    use rust_decimal::Decimal;

    pub(crate) fn mock_balance(balance_type: &str, amount: Decimal) -> GoCardlessBalance {
        GoCardlessBalance {
            balance_amount: Some(BalanceAmount {
                amount,
                currency: "EUR".to_string(),
            }),
            balance_type: Some(balance_type.to_string()),
            reference_date: Some("2025-01-31".to_string()),
            last_change_date_time: None,
        }
    }
}
