use crate::config::Config;
use crate::error::Result;
use crate::gocardless::types::Institution;
use crate::gocardless::{BankDataOperations, GoCardlessClient};

pub async fn execute(config: &Config, country: &str, search: Option<&str>) -> Result<()> {
    let client = GoCardlessClient::new(&config.gocardless, config.token_cache_file())?;
    let institutions = client.institutions(country).await?;

    for institution in filter_institutions(&institutions, search) {
        println!("{}\t{}", institution.id, institution.name);
    }

    Ok(())
}

fn filter_institutions<'a>(
    institutions: &'a [Institution],
    search: Option<&str>,
) -> Vec<&'a Institution> {
    let query = search.unwrap_or_default().trim().to_lowercase();

    institutions
        .iter()
        .filter(|i| {
            query.is_empty()
                || i.name.to_lowercase().contains(&query)
                || i.id.to_lowercase().contains(&query)
        })
        .collect()
}
