//! Search command

use crate::app::{OutputFormat, SearchArgs};
use anyhow::Result;
use evidex_core::{Config, RecordHit};

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let store = super::open_case(config, &args.case)?;
    let query = args.query.join(" ");
    let hits = store.search_records(&query, args.limit)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hits)?),
        OutputFormat::Cli => print!("{}", format_hits(&hits)),
    }
    Ok(())
}

fn format_hits(hits: &[RecordHit]) -> String {
    let mut output = String::new();

    for hit in hits {
        let short_id = &hit.id[..hit.id.len().min(12)];
        output.push_str(&format!(
            "{:>6.2} #{} [{}] {}\n",
            hit.score, short_id, hit.parser, hit.source_file
        ));
        if let Some(subject) = &hit.subject {
            output.push_str(&format!("       {}\n", subject));
        }
        if let Some(sender) = &hit.sender {
            output.push_str(&format!("       from {}\n", sender));
        }
        if !hit.snippet.is_empty() {
            output.push_str(&format!("       {}\n", hit.snippet.replace('\n', " ")));
        }
    }

    output
}
