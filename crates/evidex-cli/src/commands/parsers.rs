//! List registered parsers

use crate::app::OutputFormat;
use anyhow::Result;
use evidex_core::{Config, ParserRegistry};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let registry = ParserRegistry::from_config(&config.parsers);

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = registry
                .parsers()
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "name": p.name(),
                        "extensions": registry.extensions_of(p.name()),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            if registry.is_empty() {
                println!("No parsers enabled");
            }
            for parser in registry.parsers() {
                println!(
                    "{:<8} {}",
                    parser.name(),
                    registry.extensions_of(parser.name()).join(", ")
                );
            }
        }
    }
    Ok(())
}
