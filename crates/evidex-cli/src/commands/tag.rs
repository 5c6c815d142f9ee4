//! Tag commands

use crate::app::{OutputFormat, TagAction, TagArgs};
use anyhow::Result;
use evidex_core::Config;

pub async fn run(args: TagArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let store = super::open_case(config, &args.case)?;

    match args.action {
        TagAction::Set { record, tag } => {
            let id = super::resolve_record(&store, &record)?;
            store.set_tag(&id, &tag)?;
            println!("Tagged #{} as '{}'", id, tag);
        }
        TagAction::Remove { record } => {
            let id = super::resolve_record(&store, &record)?;
            if store.remove_tag(&id)? {
                println!("Removed tag from #{}", id);
            } else {
                println!("#{} has no tag", id);
            }
        }
        TagAction::List => {
            let tags = store.list_tags()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tags)?),
                OutputFormat::Cli if tags.is_empty() => println!("No tags"),
                OutputFormat::Cli => {
                    for tag in tags {
                        println!("{:<16} #{}", tag.tag, tag.id);
                    }
                }
            }
        }
    }
    Ok(())
}
