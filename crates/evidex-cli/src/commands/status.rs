//! Status command

use crate::app::{OutputFormat, StatusArgs};
use anyhow::Result;
use evidex_core::Config;

pub async fn run(args: StatusArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let store = super::open_case(config, &args.case)?;
    let stats = store.stats()?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Cli => {
            println!("Case:            {}", args.case);
            println!("Sources:         {}", stats.source_count);
            println!("Records:         {}", stats.record_count);
            for (parser, count) in &stats.by_parser {
                println!("  {:<14} {}", parser, count);
            }
            println!();
            println!("Bookmarks:       {}", stats.bookmark_count);
            println!("Tags:            {}", stats.tag_count);
        }
    }
    Ok(())
}
