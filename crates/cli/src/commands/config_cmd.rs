//! `gleaner config`: configuration management commands.

use std::path::Path;

use gleaner_config::{ConfigError, GleanerConfig};

pub async fn validate(
    path: &Path,
    loaded: Result<GleanerConfig, ConfigError>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration at {}...", path.display());

    match loaded {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if !path.exists() {
                warnings.push("No config file found, running on defaults".to_string());
            }

            for fetcher in &config.static_fetchers {
                if fetcher.data.is_none() && fetcher.fallback.is_none() {
                    warnings.push(format!(
                        "Static fetcher '{}' has neither data nor fallback; every fetch will fail",
                        fetcher.key
                    ));
                }
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            let enabled = config.static_fetchers.iter().filter(|f| f.enabled).count();
            println!();
            println!("   Log level:        {}", config.logging.level);
            println!(
                "   Fetch timeout:    {}",
                match config.fetch.timeout_secs {
                    0 => "none".to_string(),
                    secs => format!("{secs}s"),
                }
            );
            println!("   Concurrent:       {}", config.fetch.concurrent);
            println!("   Base data keys:   {}", config.base_data.len());
            println!(
                "   Static fetchers:  {enabled} enabled / {} declared",
                config.static_fetchers.len()
            );
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show(config: &GleanerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", path.display());
    Ok(())
}
