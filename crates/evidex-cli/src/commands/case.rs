//! Case management commands

use crate::app::{CaseAction, CaseArgs, OutputFormat};
use anyhow::Result;
use evidex_core::{list_cases, remove_case, CaseInfo, CaseStore, Config};

pub async fn run(args: CaseArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let cases_dir = &config.cases_dir;

    match args.action {
        CaseAction::Create {
            name,
            description,
            investigator,
        } => {
            let info = CaseInfo::new(&name)
                .with_description(description)
                .with_investigator(investigator);
            CaseStore::create(cases_dir, &info)?;
            println!("Created case '{}'", name);
        }
        CaseAction::List => {
            let cases = list_cases(cases_dir)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cases)?),
                OutputFormat::Cli if cases.is_empty() => println!("No cases"),
                OutputFormat::Cli => {
                    for name in cases {
                        println!("{}", name);
                    }
                }
            }
        }
        CaseAction::Info { name } => {
            let store = super::open_case(config, &name)?;
            let info = store.case_info()?.unwrap_or_else(|| CaseInfo::new(&name));
            let sources = store.list_sources()?;

            match format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "case": info,
                        "sources": sources,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Cli => {
                    println!("Case:          {}", info.name);
                    println!("Created:       {}", info.created_at);
                    if let Some(description) = &info.description {
                        println!("Description:   {}", description);
                    }
                    if let Some(investigator) = &info.investigator {
                        println!("Investigator:  {}", investigator);
                    }
                    println!("Sources:       {}", sources.len());
                    for source in sources {
                        println!("  {}", source);
                    }
                }
            }
        }
        CaseAction::Remove { name } => {
            remove_case(cases_dir, &name)?;
            println!("Removed case '{}'", name);
        }
    }
    Ok(())
}
