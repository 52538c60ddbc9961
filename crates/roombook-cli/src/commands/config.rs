use clap::Subcommand;
use roombook_core::{BackendConfig, Config};

use super::CmdResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (secrets masked)
    Show,
    /// Print the config file path
    Path,
    /// Reset the config file to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CmdResult {
    match action {
        ConfigAction::Show => {
            let mut config = Config::load()?;
            mask(&mut config);
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn mask(config: &mut Config) {
    if !config.google.client_secret.is_empty() {
        config.google.client_secret = "********".to_string();
    }
    if let BackendConfig::Rest { api_key, .. } = &mut config.backend {
        if !api_key.is_empty() {
            *api_key = "********".to_string();
        }
    }
}
