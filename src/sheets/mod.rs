mod auth;
mod client;

pub use client::SheetsClient;

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SheetOperations {
    /// Overwrite `range` of the spreadsheet with `rows`, as user-entered values
    async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<()>;
}
