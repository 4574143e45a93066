mod balance;
mod institutions;
mod paths;
mod requisition;
mod sync;

use crate::config::Config;
use crate::error::Result;
use crate::gocardless::clear_gocardless_tokens;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gocardless-sheets")]
#[command(about = "Write a GoCardless bank account balance to Google Sheets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        let config = Config::load()?;

        match &self.command {
            Commands::Institutions { country, search } => {
                institutions::execute(&config, country, search.as_deref()).await
            }
            Commands::CreateRequisition {
                institution_id,
                redirect,
                reference,
                user_language,
            } => {
                requisition::create(&config, institution_id, redirect, reference, user_language)
                    .await
            }
            Commands::Requisition { requisition_id } => {
                requisition::show(&config, requisition_id).await
            }
            Commands::Balance { account_id } => balance::execute(&config, account_id).await,
            Commands::Run => sync::execute(&config).await,
            Commands::Paths => paths::execute(&config),
            Commands::ClearToken => clear_gocardless_tokens(&config.token_cache_file()),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List institutions available in a country
    Institutions {
        /// ISO 3166 country code
        #[arg(long, default_value = "PT")]
        country: String,
        /// Case-insensitive filter on institution name or id
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a requisition linking a bank to this app
    CreateRequisition {
        #[arg(long)]
        institution_id: String,
        /// URL the user is sent back to after consenting
        #[arg(long)]
        redirect: String,
        #[arg(long, default_value = "gocardless-sheets")]
        reference: String,
        #[arg(long, default_value = "EN")]
        user_language: String,
    },
    /// Show a requisition and its linked accounts
    Requisition {
        #[arg(long)]
        requisition_id: String,
    },
    /// Show the preferred balance of an account
    Balance {
        #[arg(long)]
        account_id: String,
    },
    /// Fetch the balance and write it to the configured sheet range
    Run,
    /// Show configuration, secrets and cache paths
    Paths,
    /// Delete the cached GoCardless refresh token
    ClearToken,
}
