//! End-to-end batch scenarios driven through `Pipeline::analyze`.

mod common;

use std::time::Duration;

use common::{
    docx_bytes, echo_provider, pdf_bytes, scripted_provider, xlsx_bytes, TestHarness, ZipBuilder,
    SUMMARY_TEXT,
};
use vdrlite::ai::fallback_summary;
use vdrlite::error::{ArchiveError, LlmError};
use vdrlite::pipeline::PipelineError;
use vdrlite::{AggregateData, Category, MockProvider};

#[tokio::test]
async fn test_mixed_formats_are_all_analyzed() {
    let archive = ZipBuilder::new()
        .file(
            "finance/pnl.xlsx",
            xlsx_bytes("P&amp;L", &[&["Metric", "FY23"], &["Revenue", "1200000"], &["EBITDA", "300000"]]),
        )
        .file(
            "legal/msa.docx",
            docx_bytes(&[
                "Master Services Agreement",
                "Either party may terminate this contract with 30 days notice.",
            ]),
        )
        .file("ops/audit.pdf", pdf_bytes(&["Safety audit of the production facility"]))
        .text("notes.txt", "Customer retention and pricing review for the sales team.")
        .text("customers.csv", "customer,arr\nAcme,120000\nGlobex,80000\n")
        .build();

    let harness = TestHarness::new(echo_provider());
    let result = harness.run(archive).await.unwrap();

    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    let summary: Vec<(&str, Category)> = result
        .docs
        .iter()
        .map(|d| (d.doc.as_str(), d.category))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("pnl.xlsx", Category::Financial),
            ("msa.docx", Category::Legal),
            ("audit.pdf", Category::Operations),
            ("notes.txt", Category::Commercial),
            ("customers.csv", Category::Commercial),
        ]
    );
    assert_eq!(result.docs[0].facts, vec!["Reviewed pnl.xlsx"]);
    assert_eq!(result.summary_text, SUMMARY_TEXT);
}

#[tokio::test]
async fn test_empty_archive() {
    let harness = TestHarness::new(echo_provider());
    let result = harness.run(ZipBuilder::new().build()).await.unwrap();

    assert!(result.docs.is_empty());
    assert!(result.errors.is_empty());
    assert_eq!(result.aggregate, AggregateData::default());
    assert_eq!(result.summary_text, fallback_summary(&AggregateData::default(), 0));
    assert_eq!(harness.provider.call_count(), 0);
}

#[tokio::test]
async fn test_unsupported_and_hidden_entries_are_skipped() {
    let archive = ZipBuilder::new()
        .directory("contracts/")
        .text("contracts/lease.txt", "Lease agreement")
        .text("logo.png", "not really a png")
        .text("__MACOSX/contracts/._lease.txt", "resource fork")
        .text("run.exe", "binary")
        .build();

    let result = TestHarness::new(echo_provider()).run(archive).await.unwrap();

    assert_eq!(result.docs.len(), 1);
    assert_eq!(result.docs[0].doc, "lease.txt");
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_corrupt_pdf_next_to_valid_text() {
    let archive = ZipBuilder::new()
        .file("broken.pdf", b"%PDF-1.4 truncated garbage".to_vec())
        .text("memo.txt", "Board memo on the revenue forecast.")
        .build();

    let result = TestHarness::new(echo_provider()).run(archive).await.unwrap();

    assert_eq!(result.docs.len(), 1);
    assert_eq!(result.docs[0].doc, "memo.txt");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].doc, "broken.pdf");
}

#[tokio::test]
async fn test_empty_text_document_is_an_error() {
    let archive = ZipBuilder::new()
        .text("blank.txt", "   \n\t ")
        .text("memo.txt", "Revenue memo")
        .build();

    let result = TestHarness::new(echo_provider()).run(archive).await.unwrap();

    assert_eq!(result.docs.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].doc, "blank.txt");
    assert!(result.errors[0].message.contains("No extractable text"));
}

#[tokio::test]
async fn test_oversized_archive_is_rejected() {
    let mut harness = TestHarness::new(echo_provider());
    // Headers alone push a one-entry archive past this limit.
    harness.config.limits.max_archive_bytes = 100;

    let archive = ZipBuilder::new().text("big.txt", "revenue").build();
    assert!(archive.len() > 100);

    let err = harness.run(archive).await.unwrap_err();
    assert!(matches!(err, PipelineError::Archive(ArchiveError::TooLarge { .. })));
    assert_eq!(harness.provider.call_count(), 0);
}

#[tokio::test]
async fn test_oversized_entry_fails_batch() {
    let mut harness = TestHarness::new(echo_provider());
    harness.config.limits.max_file_bytes = 64;

    let archive = ZipBuilder::new()
        .text("small.txt", "fine")
        .text("large.txt", &"x".repeat(65))
        .build();

    let err = harness.run(archive).await.unwrap_err();
    match err {
        PipelineError::Archive(ArchiveError::EntryTooLarge { name, .. }) => {
            assert_eq!(name, "large.txt")
        }
        other => panic!("Expected EntryTooLarge, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_a_zip_is_rejected() {
    let err = TestHarness::new(echo_provider())
        .run(b"PK but not really".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Archive(_)));
}

#[tokio::test]
async fn test_repeatedly_malformed_output_degrades() {
    let provider = scripted_provider(|name| {
        if name == "weird.txt" {
            Ok("```json\n{ \"facts\": [\"unterminated\"\n```".to_string())
        } else {
            Ok(r#"{"facts":["ok"],"red_flags":["flag"]}"#.to_string())
        }
    });
    let archive = ZipBuilder::new()
        .text("weird.txt", "Cash and debt position")
        .text("fine.txt", "Cash and debt position")
        .build();

    let result = TestHarness::new(provider).run(archive).await.unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(result.docs.len(), 2);
    let weird = &result.docs[0];
    assert_eq!(weird.doc, "weird.txt");
    assert_eq!(weird.category, Category::Financial);
    assert!(weird.facts.is_empty());
    assert!(weird.red_flags.is_empty());
    assert_eq!(result.aggregate.financial.facts, 1);
    assert_eq!(result.aggregate.financial.red_flags, 1);
}

#[tokio::test]
async fn test_findings_capped_and_aggregate_consistent() {
    let provider = scripted_provider(|_| {
        Ok(r#"{"facts":["a","b","c","d","e","f","g"],"red_flags":["1","2","3","4","5","6"]}"#
            .to_string())
    });
    let archive = ZipBuilder::new()
        .text("one.txt", "contract terms")
        .text("two.txt", "revenue")
        .text("three.txt", "nothing relevant")
        .build();

    let result = TestHarness::new(provider).run(archive).await.unwrap();

    for doc in &result.docs {
        assert!(doc.facts.len() <= 5);
        assert!(doc.red_flags.len() <= 5);
    }
    let facts: usize = result.docs.iter().map(|d| d.facts.len()).sum();
    let flags: usize = result.docs.iter().map(|d| d.red_flags.len()).sum();
    assert_eq!(result.aggregate.total_facts(), facts);
    assert_eq!(result.aggregate.total_red_flags(), flags);
    assert_eq!(result.aggregate.legal.facts, 5);
    assert_eq!(result.aggregate.other.red_flags, 5);
}

#[tokio::test]
async fn test_every_supported_entry_is_accounted_for() {
    let provider = scripted_provider(|name| match name {
        "down.txt" => Err(LlmError::Unreachable("connection refused".into())),
        "junk.txt" => Ok("no json here".into()),
        _ => Ok(r#"{"facts":["x"],"red_flags":[]}"#.into()),
    });
    let archive = ZipBuilder::new()
        .text("a.txt", "alpha")
        .text("down.txt", "beta")
        .file("bad.docx", b"not a docx".to_vec())
        .text("junk.txt", "gamma")
        .text("skip.md", "ignored")
        .build();

    let result = TestHarness::new(provider).run(archive).await.unwrap();

    assert_eq!(result.docs.len() + result.errors.len(), 4);
    let failed: Vec<&str> = result.errors.iter().map(|e| e.doc.as_str()).collect();
    assert_eq!(failed, vec!["down.txt", "bad.docx"]);
}

#[tokio::test]
async fn test_unreachable_provider_everywhere() {
    let provider = MockProvider::failing(LlmError::Unreachable("no route to host".into()));
    let archive = ZipBuilder::new()
        .text("a.txt", "revenue")
        .text("b.txt", "contract")
        .build();

    let harness = TestHarness::new(provider);
    let result = harness.run(archive).await.unwrap();

    assert!(result.docs.is_empty());
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors.iter().all(|e| e.message.contains("unreachable")));
    assert_eq!(result.summary_text, fallback_summary(&result.aggregate, 0));
    assert_eq!(harness.summary_calls(), 0);
}

#[tokio::test]
async fn test_summary_falls_back_when_model_fails() {
    let provider = MockProvider::new(|request, _| match request.format {
        vdrlite::ai::ResponseFormat::Json => Ok(r#"{"facts":["f"],"red_flags":["r"]}"#.into()),
        vdrlite::ai::ResponseFormat::Text => Err(LlmError::RateLimited),
    });
    let archive = ZipBuilder::new().text("a.txt", "revenue").build();

    let harness = TestHarness::new(provider);
    let result = harness.run(archive).await.unwrap();

    assert_eq!(result.summary_text, fallback_summary(&result.aggregate, 1));
    assert_eq!(harness.summary_calls(), 2);
}

#[tokio::test]
async fn test_order_preserved_with_reverse_latency() {
    let names: Vec<String> = (0..8).map(|i| format!("doc{}.txt", i)).collect();
    let archive = names
        .iter()
        .fold(ZipBuilder::new(), |zip, name| zip.text(name, "plain notes"))
        .build();

    // Earlier documents are slower, so completion order is reversed.
    let provider = echo_provider().with_latency(|request| {
        let index = common::harness::prompt_filename(request)
            .and_then(|n| {
                n.trim_start_matches("doc")
                    .trim_end_matches(".txt")
                    .parse::<u64>()
                    .ok()
            })
            .unwrap_or(8);
        Duration::from_millis((8 - index) * 15)
    });

    let mut harness = TestHarness::new(provider);
    harness.config.max_concurrent_documents = 8;
    let result = harness.run(archive).await.unwrap();

    let order: Vec<&str> = result.docs.iter().map(|d| d.doc.as_str()).collect();
    assert_eq!(order, names.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_result_serializes_with_contract_field_names() {
    let archive = ZipBuilder::new().text("a.txt", "revenue").build();
    let result = TestHarness::new(echo_provider()).run(archive).await.unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert!(value.get("docs").is_some());
    assert!(value.get("aggregate").is_some());
    assert!(value.get("summaryText").is_some());
    assert!(value.get("errors").is_some());
    assert_eq!(value["docs"][0]["category"], "financial");
    assert_eq!(value["aggregate"]["financial"]["facts"], 1);
}
