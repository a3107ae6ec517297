//! `gleaner fetchers`: list registered fetchers.

use gleaner_config::GleanerConfig;

pub async fn run(config: &GleanerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = gleaner_fetchers::default_registry(config, None)?;
    let descriptors = registry.descriptors();

    println!("🧺 Registered Fetchers ({})", descriptors.len());
    println!("==========================");
    println!();
    println!("  {:<24} {:<9} {:<10} DESCRIPTION", "KEY", "FALLBACK", "FETCHER");
    for d in &descriptors {
        println!(
            "  {:<24} {:<9} {:<10} {}",
            d.key,
            if d.supports_fallback { "yes" } else { "no" },
            d.name,
            d.description
        );
        if !d.allowed_params.is_empty() {
            println!("  {:<24} params: {}", "", d.allowed_params.join(", "));
        }
    }

    Ok(())
}
