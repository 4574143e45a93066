use crate::config::Config;
use crate::error::Result;
use crate::gocardless::{BankDataOperations, GoCardlessClient};
use crate::models::Balance;

pub async fn execute(config: &Config, account_id: &str) -> Result<()> {
    let client = GoCardlessClient::new(&config.gocardless, config.token_cache_file())?;

    let response = client.balances(account_id).await?;
    let balance = Balance::select(&response, &config.balance_preference)?;
    println!("{}", balance);

    Ok(())
}
