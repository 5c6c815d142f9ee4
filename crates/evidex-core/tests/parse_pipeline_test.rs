//! End-to-end: evidence on disk through the built-in parsers into a case store

use evidex_core::config::{ParsersConfig, ScanConfig};
use evidex_core::db::{CaseInfo, CaseStore};
use evidex_core::orchestrator::{FileSet, Orchestrator};
use evidex_core::parser::ParserRegistry;
use evidex_core::{Index, RecordKind};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const INVOICE: &str = "From: alice@example.com\n\
To: bob@example.com\n\
Subject: Invoice 4471\n\
Date: Tue, 1 Oct 2024 10:00:00 +0000\n\
\n\
Please wire the payment to the new account.\n";

const MAILBOX: &str = "From alice@example.com Tue Oct  1 10:00:00 2024\n\
From: alice@example.com\n\
Subject: Lunch\n\
\n\
Noon works.\n\
\n\
From carol@example.com Tue Oct  1 12:00:00 2024\n\
From: carol@example.com\n\
Subject: Re: Lunch\n\
\n\
See you there.\n";

fn evidence_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    let base = temp.path();
    fs::create_dir_all(base.join("mail")).unwrap();
    fs::write(base.join("mail/invoice.eml"), INVOICE).unwrap();
    fs::write(base.join("mail/inbox.mbox"), MAILBOX).unwrap();
    fs::write(base.join("notes.txt"), "account number changed on monday\n").unwrap();
    fs::write(base.join("image.png"), [0x89u8, 0x50, 0x4e, 0x47]).unwrap();
    temp
}

#[tokio::test]
async fn test_parse_directory_and_commit() {
    let evidence = evidence_dir();
    let cases = TempDir::new().unwrap();

    let store = CaseStore::create(cases.path(), &CaseInfo::new("acme")).unwrap();
    let files =
        FileSet::collect(&[evidence.path().to_path_buf()], &ScanConfig::default()).unwrap();
    assert_eq!(files.len(), 4);

    let orchestrator = Orchestrator::new("acme", Arc::new(ParserRegistry::with_defaults()));
    let mut result = None;
    orchestrator
        .run(&files, Arc::new(Index::new("acme")), |finished| {
            result = Some(finished)
        })
        .await;
    let finished = result.unwrap();

    assert_eq!(finished.summary.files_processed, 3);
    assert_eq!(finished.summary.files_without_parser, 1);
    assert_eq!(finished.summary.failed, 0);

    let counts = finished.index.records_by_parser();
    assert_eq!(counts.get("eml"), Some(&1));
    assert_eq!(counts.get("mbox"), Some(&2));
    assert_eq!(counts.get("text"), Some(&1));

    let inserted = finished.index.commit(&store).unwrap();
    assert_eq!(inserted, 4);
    assert_eq!(store.record_count().unwrap(), 4);

    let hits = store.search_records("invoice", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].parser, "eml");
    assert_eq!(hits[0].subject.as_deref(), Some("Invoice 4471"));

    let record = store.get_record(&hits[0].id).unwrap().unwrap();
    assert_eq!(record.kind, RecordKind::Email);
    assert_eq!(record.recipients, vec!["bob@example.com"]);
}

#[tokio::test]
async fn test_reparse_does_not_duplicate_records() {
    let evidence = evidence_dir();
    let store = CaseStore::open_in_memory().unwrap();
    store.initialize().unwrap();

    let registry = Arc::new(ParserRegistry::with_defaults());
    let files =
        FileSet::collect(&[evidence.path().to_path_buf()], &ScanConfig::default()).unwrap();

    for expected_inserts in [4, 0] {
        let orchestrator = Orchestrator::new("acme", registry.clone());
        let index = Arc::new(Index::new("acme"));
        orchestrator.run(&files, index.clone(), |_| {}).await;
        assert_eq!(index.commit(&store).unwrap(), expected_inserts);
    }
    assert_eq!(store.record_count().unwrap(), 4);
}

#[tokio::test]
async fn test_malformed_email_is_a_failure_not_a_hang() {
    let evidence = TempDir::new().unwrap();
    let path = evidence.path().join("broken.eml");
    fs::write(&path, "").unwrap();

    let orchestrator = Orchestrator::new("acme", Arc::new(ParserRegistry::with_defaults()));
    let files = FileSet::from_paths([&path]).unwrap();
    let mut summary = None;
    orchestrator
        .run(&files, Arc::new(Index::new("acme")), |f| summary = Some(f.summary))
        .await;

    let summary = summary.unwrap();
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.files_processed, 1);
}

#[tokio::test]
async fn test_configured_registry() {
    let evidence = TempDir::new().unwrap();
    fs::write(evidence.path().join("server.out"), "started\n").unwrap();
    fs::write(evidence.path().join("inbox.mbox"), MAILBOX).unwrap();

    let config = ParsersConfig {
        disabled: vec!["mbox".to_string()],
        extra_extensions: HashMap::from([("text".to_string(), vec![".OUT".to_string()])]),
    };
    let registry = Arc::new(ParserRegistry::from_config(&config));
    assert!(registry.get("mbox").is_none());

    let files =
        FileSet::collect(&[evidence.path().to_path_buf()], &ScanConfig::default()).unwrap();
    let orchestrator = Orchestrator::new("acme", registry);
    let mut result = None;
    orchestrator
        .run(&files, Arc::new(Index::new("acme")), |f| result = Some(f))
        .await;
    let finished = result.unwrap();

    assert_eq!(finished.summary.files_without_parser, 1);
    assert_eq!(finished.index.records_by_parser().get("text"), Some(&1));
}
