use std::path::PathBuf;

use glossary_export::{
    resolve, ExportError, ExportRequest, FileFormat, GlossaryCatalog, JsonCatalog, LanguageRole,
    PartOfSpeech,
};
use glossary_export_render::{DocumentOptions, FontSet};
use glossary_export_render_web::{export_document, ExportFailure};

fn fixture_catalog() -> JsonCatalog {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures/catalog.json");
    let bytes = std::fs::read(&path).unwrap();
    JsonCatalog::from_slice(&bytes).unwrap()
}

#[test]
fn catalog_tuples_are_ordered_by_source_word() {
    let catalog = fixture_catalog();
    let tuples = catalog.tuples(1, 2).unwrap();
    let words: Vec<&str> = tuples.iter().map(|t| t.source_word.as_str()).collect();
    assert_eq!(
        words,
        vec!["cat", "cat", "cat", "quickly", "run", "run", "run"]
    );
    // Stored order survives within one source word.
    assert_eq!(tuples[4].target_word, "бежать");
    assert_eq!(tuples[6].target_word, "управлять");
}

#[test]
fn resolve_groups_entries_in_first_occurrence_order() {
    let resolved = resolve(
        &fixture_catalog(),
        &ExportRequest::new(1, 2, FileFormat::Markdown),
    )
    .unwrap();
    assert_eq!(resolved.language_from, "English");
    assert_eq!(resolved.language_to, "Russian");
    assert_eq!(resolved.attachment_name, "dictionary.md");

    let keys: Vec<(&str, PartOfSpeech)> = resolved
        .glossary
        .iter()
        .map(|entry| (entry.key.source_word.as_str(), entry.key.part_of_speech))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("cat", PartOfSpeech::Noun),
            ("quickly", PartOfSpeech::Adverb),
            ("run", PartOfSpeech::Verb),
            ("run", PartOfSpeech::Noun),
        ]
    );
}

#[test]
fn tsv_export_end_to_end() {
    let request = ExportRequest::new(1, 2, FileFormat::Tsv).with_file_name("en-ru");
    let attachment = export_document(
        &fixture_catalog(),
        &request,
        &FontSet::new(),
        &DocumentOptions::default(),
    )
    .unwrap();
    assert_eq!(attachment.file_name, "en-ru.tsv");
    let text = String::from_utf8(attachment.bytes).unwrap();
    assert_eq!(
        text,
        "English\tPart of speech\tRussian\n\
         cat\tnoun\t1. кот, кошка 2. feline \n\
         quickly\tadverb\tбыстро\n\
         run\tverb\t1. бежать 2. управлять \n\
         run\tnoun\tпробег\n"
    );
}

#[test]
fn html_export_end_to_end() {
    let request = ExportRequest::new(1, 2, FileFormat::Html);
    let attachment = export_document(
        &fixture_catalog(),
        &request,
        &FontSet::approximate_sans(),
        &DocumentOptions::default(),
    )
    .unwrap();
    assert_eq!(attachment.file_name, "dictionary.html");
    assert_eq!(attachment.content_type, "text/html; charset=utf-8");
    let html = String::from_utf8(attachment.bytes).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert_eq!(html.matches("<div class=\"page\"").count(), 2);
    assert!(html.contains(">(adverb) </span>"));
    assert!(html.contains(">управлять </span>"));
}

#[test]
fn empty_pair_exports_title_only_documents() {
    let catalog = fixture_catalog();
    let options = DocumentOptions::default();

    let tsv = export_document(
        &catalog,
        &ExportRequest::new(1, 3, FileFormat::Tsv),
        &FontSet::new(),
        &options,
    )
    .unwrap();
    assert_eq!(tsv.bytes, b"English\tPart of speech\tGerman\n".to_vec());

    let html = export_document(
        &catalog,
        &ExportRequest::new(1, 3, FileFormat::Html),
        &FontSet::approximate_sans(),
        &options,
    )
    .unwrap();
    let html = String::from_utf8(html.bytes).unwrap();
    let body_page = html
        .split("<div class=\"page\"")
        .nth(2)
        .unwrap_or_default();
    assert!(!body_page.contains("<span"));
}

#[test]
fn unknown_source_language_is_reported_to_the_client() {
    let err = export_document(
        &fixture_catalog(),
        &ExportRequest::new(42, 2, FileFormat::Tsv),
        &FontSet::new(),
        &DocumentOptions::default(),
    )
    .unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(
        err,
        ExportFailure::Request(ExportError::UnknownLanguage {
            role: LanguageRole::From,
            id: 42
        })
    );
    assert_eq!(err.to_string(), "unknown source language id 42");
}

#[test]
fn package_metadata_is_inherited_from_the_workspace() {
    assert!(!env!("CARGO_PKG_AUTHORS").is_empty());
    assert!(env!("CARGO_PKG_REPOSITORY").starts_with("https://"));
}
