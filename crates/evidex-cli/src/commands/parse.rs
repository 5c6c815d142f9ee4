//! Parse command

use crate::app::{OutputFormat, ParseArgs};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use evidex_core::{
    progress_channel, Config, EvidexError, FileSet, Index, Orchestrator, ParserRegistry,
    RunSummary,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

pub async fn run(args: ParseArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let store = super::open_case(config, &args.case)?;

    let sources = args
        .sources
        .iter()
        .map(|s| {
            s.canonicalize().map_err(|_| {
                EvidexError::InvalidInput(format!("evidence source not found: {}", s.display()))
            })
        })
        .collect::<std::result::Result<Vec<PathBuf>, _>>()?;

    let mut scan = config.scan.clone();
    if args.hidden {
        scan.exclude_hidden = false;
    }
    let files = FileSet::collect(&sources, &scan)?;
    store.add_sources(&sources)?;

    let registry = Arc::new(ParserRegistry::from_config(&config.parsers));
    if registry.is_empty() {
        tracing::warn!("Every parser is disabled; nothing will be extracted");
    }

    let (progress_tx, mut progress_rx) = progress_channel();
    let orchestrator = Arc::new(Orchestrator::new(&args.case, registry).with_progress(progress_tx));
    let cancel = orchestrator.cancel_token();

    // Ctrl-C stops the run; whatever was extracted so far is still committed
    let finished_token = CancellationToken::new();
    let interrupt = tokio::spawn(watch_interrupt(cancel, finished_token.clone()));

    let (done_tx, done_rx) = oneshot::channel();
    let index = Arc::new(Index::new(&args.case));
    let handle = orchestrator.spawn(files, index, move |finished| {
        let committed = finished.index.commit(&store);
        let _ = done_tx.send((finished.summary, committed));
    });

    let mut reporter = ProgressReporter::new(format == OutputFormat::Cli);
    while let Some(event) = progress_rx.recv().await {
        reporter.handle(&event);
    }

    handle.await.context("parse run task failed")?;
    finished_token.cancel();
    interrupt.await.ok();

    let (summary, committed) = done_rx.await.context("parse run ended without finishing")?;
    let inserted = committed?;
    print_summary(&args.case, &summary, inserted, format)?;

    if summary.cancelled {
        return Err(EvidexError::Cancelled.into());
    }
    Ok(())
}

async fn watch_interrupt(cancel: CancellationToken, finished: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => {
                    eprintln!();
                    tracing::warn!("Interrupted; stopping once the current file is released");
                    cancel.cancel();
                }
                Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {}", e),
            }
        }
        _ = finished.cancelled() => {}
    }
}

fn print_summary(
    case: &str,
    summary: &RunSummary,
    inserted: usize,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "case": case,
                "summary": summary,
                "inserted": inserted,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            println!(
                "Parsed {}/{} file(s) into '{}': {} record(s), {} new",
                summary.files_processed, summary.files_total, case, summary.records, inserted
            );
            if summary.files_without_parser > 0 {
                println!("  {} file(s) had no matching parser", summary.files_without_parser);
            }
            if summary.failed > 0 {
                println!("  {} parser invocation(s) failed", summary.failed);
            }
            if summary.cancelled {
                println!("  Run was cancelled; partial results were saved");
            }
        }
    }
    Ok(())
}
