use std::sync::Arc;

use glossary_export::{fold, PartOfSpeech, TranslationTuple};
use glossary_export_render::{
    AdvanceTable, DocumentOptions, FontMetrics, FontResource, FontSet, PageGeometry, RenderEngine,
    TextStyle,
};
use glossary_export_render_web::HtmlBackend;

fn mono_fonts() -> FontSet {
    let metrics: Arc<dyn FontMetrics> = Arc::new(AdvanceTable::monospace(500.0));
    let mut fonts = FontSet::new();
    for style in TextStyle::ALL {
        fonts.insert(style, FontResource::new("mono", metrics.clone()));
    }
    fonts
}

/// Two 100pt columns with three lines each.
fn small_body() -> PageGeometry {
    PageGeometry {
        margin_left: 10.0,
        margin_top: 10.0,
        margin_bottom: 10.0,
        column_count: 2,
        column_spacing: 0.0,
        leading: 10.0,
        font_size: 10.0,
        page_width: 220.0,
        page_height: 50.0,
    }
}

fn spans_of_page(html: &str, page: usize) -> Vec<&str> {
    html.split("<div class=\"page\"")
        .nth(page + 1)
        .map(|page| page.lines().filter(|l| l.starts_with("<span")).collect())
        .unwrap_or_default()
}

#[test]
fn overflow_fills_second_column_then_opens_a_page() {
    let glossary = fold(
        (0..7)
            .map(|i| TranslationTuple::new(format!("w{}", i), PartOfSpeech::Noun, "g", i))
            .collect::<Vec<_>>(),
    );
    let options = DocumentOptions {
        body_geometry: small_body(),
        ..DocumentOptions::default()
    };
    let bytes = RenderEngine::new(options)
        .render_flowing("en", "ru", &glossary, &mono_fonts(), HtmlBackend::new())
        .unwrap();
    let html = String::from_utf8(bytes).unwrap();

    // Title page, then two body pages.
    assert_eq!(html.matches("<div class=\"page\"").count(), 3);

    let first_body = spans_of_page(&html, 1);
    assert!(first_body[0].contains("left: 10.00pt; bottom: 40.00pt;\">w0 </span>"));
    assert!(first_body
        .iter()
        .any(|s| s.contains("left: 110.00pt; bottom: 40.00pt;\">w3 </span>")));
    assert!(first_body
        .iter()
        .any(|s| s.contains("left: 110.00pt; bottom: 20.00pt;\">w5 </span>")));

    let second_body = spans_of_page(&html, 2);
    assert!(second_body[0].contains("left: 10.00pt; bottom: 40.00pt;\">w6 </span>"));
    assert_eq!(second_body.len(), 3);
}
