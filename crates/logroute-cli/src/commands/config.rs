//! Config command

use crate::app::{ConfigAction, ConfigArgs, OutputFormat};
use crate::output::json;
use anyhow::{bail, Result};
use logroute_core::{Config, ProviderKind};

fn mask(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{}", visible)
}

/// Copy of the config with credentials masked
fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    for kind in ProviderKind::ALL {
        let settings = shown.providers.get_mut(kind);
        settings.api_key = settings.credential().map(mask);
    }
    if shown.search.password.is_some() {
        shown.search.password = Some("****".to_string());
    }
    shown
}

pub async fn run(args: ConfigArgs, config: Config, format: OutputFormat) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let shown = redacted(&config);
            match format {
                OutputFormat::Json => println!("{}", json::to_pretty(&shown)),
                OutputFormat::Cli => print!("{}", serde_yaml::to_string(&shown)?),
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
        }
        ConfigAction::Init { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                bail!(
                    "Config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            // Defaults only; credentials stay in the environment
            let written = Config::default().save()?;
            println!("Wrote default config to {}", written.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_last_four() {
        assert_eq!(mask("sk-abcdef123456"), "****3456");
        assert_eq!(mask("ab"), "****ab");
    }

    #[test]
    fn test_redacted_hides_credentials() {
        let mut config = Config::default();
        config.providers.openai.api_key = Some("sk-secret-9999".to_string());
        config.search.password = Some("hunter2".to_string());

        let shown = redacted(&config);
        assert_eq!(shown.providers.openai.api_key.as_deref(), Some("****9999"));
        assert!(shown.providers.claude.api_key.is_none());
        assert_eq!(shown.search.password.as_deref(), Some("****"));
    }
}
