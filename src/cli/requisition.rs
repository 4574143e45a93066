use crate::config::Config;
use crate::error::Result;
use crate::gocardless::types::RequisitionRequest;
use crate::gocardless::{BankDataOperations, GoCardlessClient};

pub async fn create(
    config: &Config,
    institution_id: &str,
    redirect: &str,
    reference: &str,
    user_language: &str,
) -> Result<()> {
    let client = GoCardlessClient::new(&config.gocardless, config.token_cache_file())?;
    let request = RequisitionRequest {
        redirect: redirect.to_string(),
        institution_id: institution_id.to_string(),
        reference: reference.to_string(),
        user_language: user_language.to_string(),
    };

    let requisition = client.create_requisition(&request).await?;
    println!("{}", serde_json::to_string_pretty(&requisition)?);

    Ok(())
}

pub async fn show(config: &Config, requisition_id: &str) -> Result<()> {
    let client = GoCardlessClient::new(&config.gocardless, config.token_cache_file())?;

    let requisition = client.requisition(requisition_id).await?;
    println!("{}", serde_json::to_string_pretty(&requisition)?);

    Ok(())
}
