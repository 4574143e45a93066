use crate::config::Config;
use crate::error::Result;
use crate::gocardless::GoCardlessClient;
use crate::sheets::SheetsClient;
use crate::sync::SyncEngine;

pub async fn execute(config: &Config) -> Result<()> {
    let target = config.run.target()?;
    let gocardless_client = GoCardlessClient::new(&config.gocardless, config.token_cache_file())?;
    let sheets_client = SheetsClient::new(&config.google).await?;

    let engine = SyncEngine::new(
        config.balance_preference.clone(),
        gocardless_client,
        sheets_client,
    );
    let balance = engine.sync(&target).await?;

    println!(
        "Wrote {} {} ({}) to sheet range {}",
        balance.amount, balance.currency, balance.balance_type, target.range
    );

    Ok(())
}
