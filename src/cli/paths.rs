use crate::config::Config;
use crate::error::Result;

pub fn execute(config: &Config) -> Result<()> {
    let config_file = Config::config_file()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());

    println!("config file\t{}", config_file);
    println!("gocardless secrets\t{}", config.gocardless.secrets_dir.display());
    println!("google secrets\t{}", config.google.secrets_dir.display());
    println!("data dir\t{}", config.data_dir.display());
    println!("token cache\t{}", config.token_cache_file().display());

    Ok(())
}
