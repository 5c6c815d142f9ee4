//! Bookmark commands

use crate::app::{BookmarkAction, BookmarkArgs, OutputFormat};
use anyhow::Result;
use evidex_core::Config;

pub async fn run(args: BookmarkArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let store = super::open_case(config, &args.case)?;

    match args.action {
        BookmarkAction::Add { record } => {
            let id = super::resolve_record(&store, &record)?;
            if store.add_bookmark(&id)? {
                println!("Bookmarked #{}", id);
            } else {
                println!("#{} is already bookmarked", id);
            }
        }
        BookmarkAction::Remove { record } => {
            let id = super::resolve_record(&store, &record)?;
            if store.remove_bookmark(&id)? {
                println!("Removed bookmark #{}", id);
            } else {
                println!("#{} was not bookmarked", id);
            }
        }
        BookmarkAction::List => {
            let ids = store.list_bookmarks()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ids)?),
                OutputFormat::Cli if ids.is_empty() => println!("No bookmarks"),
                OutputFormat::Cli => {
                    for id in ids {
                        match store.get_record(&id)? {
                            Some(record) => println!(
                                "#{} [{}] {}",
                                id,
                                record.parser,
                                record.subject.as_deref().unwrap_or(&record.source_file)
                            ),
                            None => println!("#{}", id),
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
