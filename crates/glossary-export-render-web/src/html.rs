use core::fmt::Write as _;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use glossary_export_render::{
    BackendError, DocumentInfo, FlowingBackend, FontMetrics, FontResource, LayoutCommand,
    PageGeometry, TextStyle,
};

#[derive(Clone, Debug, PartialEq)]
struct PlacedText {
    left: f32,
    bottom: f32,
    style: TextStyle,
    text: String,
}

#[derive(Clone, Debug, PartialEq)]
struct HtmlPage {
    width: f32,
    height: f32,
    font_size: f32,
    texts: Vec<PlacedText>,
}

impl HtmlPage {
    fn new(geometry: &PageGeometry) -> Self {
        Self {
            width: geometry.page_width,
            height: geometry.page_height,
            font_size: geometry.font_size,
            texts: Vec::new(),
        }
    }
}

/// Paginated HTML print layout.
///
/// Every page is a fixed-size box and every token an absolutely positioned
/// span measured from the bottom-left corner, mirroring the layout engine's
/// coordinate system. Font bytes, when present, are embedded as
/// `@font-face` data URIs.
#[derive(Debug, Default)]
pub struct HtmlBackend {
    info: DocumentInfo,
    fonts: [Option<FontResource>; 3],
    geometry: Option<PageGeometry>,
    pages: Vec<HtmlPage>,
    column: u8,
    baseline: f32,
    line_units: f32,
}

impl HtmlBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn font(&self, style: TextStyle) -> Option<&FontResource> {
        self.fonts[style.slot()].as_ref()
    }

    fn start_page(&mut self, geometry: &PageGeometry) {
        self.pages.push(HtmlPage::new(geometry));
        self.column = 1;
        self.baseline = geometry.top();
        self.line_units = 0.0;
    }

    fn show_text(&mut self, token: &str, style: TextStyle) -> Result<(), BackendError> {
        let geometry = self
            .geometry
            .ok_or_else(|| BackendError::new("text shown before any section began"))?;
        let font = self
            .font(style)
            .ok_or_else(|| BackendError::new(format!("{} font was never loaded", style)))?;
        let mut measured = String::with_capacity(token.len() + 1);
        measured.push_str(token);
        measured.push(' ');
        let advance = font
            .metrics()
            .string_width(&measured)
            .map_err(|err| BackendError::new(err.to_string()))?;

        let left =
            geometry.column_origin_x(self.column) + geometry.units_to_points(self.line_units);
        let placed = PlacedText {
            left,
            bottom: self.baseline,
            style,
            text: measured,
        };
        self.pages
            .last_mut()
            .ok_or_else(|| BackendError::new("text shown before any page began"))?
            .texts
            .push(placed);
        self.line_units += advance;
        Ok(())
    }

    fn write_document(&self) -> Result<String, BackendError> {
        let mut out = String::with_capacity(4096 + self.pages.len() * 2048);
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        writeln!(out, "<title>{}</title>", escape_html(&self.info.title))?;
        writeln!(
            out,
            "<meta name=\"subject\" content=\"{}\">",
            escape_html(&self.info.subject)
        )?;
        writeln!(
            out,
            "<meta name=\"keywords\" content=\"{}\">",
            escape_html(&self.info.keywords)
        )?;
        if let Some(author) = &self.info.author {
            writeln!(out, "<meta name=\"author\" content=\"{}\">", escape_html(author))?;
        }
        out.push_str("<style>\n");
        for style in TextStyle::ALL {
            let Some(font) = self.font(style) else {
                continue;
            };
            if font.has_data() {
                writeln!(
                    out,
                    "@font-face {{ font-family: \"{}\"; src: url(\"data:{};base64,{}\"); }}",
                    face_name(style),
                    font_mime_type(&font.data),
                    BASE64.encode(&font.data)
                )?;
            }
            writeln!(
                out,
                ".{} {{ font-family: \"{}\", \"{}\", sans-serif;{} }}",
                style,
                face_name(style),
                escape_css_string(&font.family),
                css_style_hint(style)
            )?;
        }
        out.push_str(
            ".page { position: relative; overflow: hidden; margin: 0 auto 12pt; \
             background: #fff; page-break-after: always; }\n\
             .page span { position: absolute; white-space: pre; line-height: 1; }\n",
        );
        out.push_str("</style>\n</head>\n<body>\n");
        for page in &self.pages {
            writeln!(
                out,
                "<div class=\"page\" style=\"width: {:.2}pt; height: {:.2}pt; font-size: {:.2}pt;\">",
                page.width, page.height, page.font_size
            )?;
            for text in &page.texts {
                writeln!(
                    out,
                    "<span class=\"{}\" style=\"left: {:.2}pt; bottom: {:.2}pt;\">{}</span>",
                    text.style,
                    text.left,
                    text.bottom,
                    escape_html(&text.text)
                )?;
            }
            out.push_str("</div>\n");
        }
        out.push_str("</body>\n</html>\n");
        Ok(out)
    }
}

impl FlowingBackend for HtmlBackend {
    type Output = Vec<u8>;

    fn set_info(&mut self, info: &DocumentInfo) -> Result<(), BackendError> {
        self.info = info.clone();
        Ok(())
    }

    fn load_font(&mut self, style: TextStyle, font: &FontResource) -> Result<(), BackendError> {
        if !font.has_data() {
            log::debug!(
                "{} font '{}' has no bytes; html will fall back to system fonts",
                style,
                font.family
            );
        }
        self.fonts[style.slot()] = Some(font.clone());
        Ok(())
    }

    fn begin_section(&mut self, geometry: &PageGeometry) -> Result<(), BackendError> {
        self.geometry = Some(*geometry);
        self.start_page(geometry);
        Ok(())
    }

    fn apply(&mut self, command: &LayoutCommand) -> Result<(), BackendError> {
        let geometry = self
            .geometry
            .ok_or_else(|| BackendError::new("command received before any section"))?;
        match command {
            LayoutCommand::ShowText { token, style } => self.show_text(token, *style)?,
            LayoutCommand::AdvanceLine => {
                self.baseline -= geometry.leading;
                self.line_units = 0.0;
            }
            LayoutCommand::AdvanceColumn => {
                self.column = self.column.saturating_add(1);
                self.baseline = geometry.top();
                self.line_units = 0.0;
            }
            LayoutCommand::AdvancePage => self.start_page(&geometry),
            LayoutCommand::Closed => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, BackendError> {
        let html = self.write_document()?;
        log::debug!(
            "html backend wrote {} pages ({} bytes)",
            self.pages.len(),
            html.len()
        );
        Ok(html.into_bytes())
    }
}

fn face_name(style: TextStyle) -> String {
    format!("glossary-{}", style)
}

fn css_style_hint(style: TextStyle) -> &'static str {
    match style {
        TextStyle::Bold => " font-weight: bold;",
        TextStyle::Italic => " font-style: italic;",
        TextStyle::Regular => "",
    }
}

/// Sniff the font container from its magic bytes.
fn font_mime_type(data: &[u8]) -> &'static str {
    match data.get(..4) {
        Some(b"wOF2") => "font/woff2",
        Some(b"wOFF") => "font/woff",
        Some(b"OTTO") => "font/otf",
        Some([0, 1, 0, 0]) | Some(b"true") => "font/ttf",
        _ => "application/octet-stream",
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn escape_css_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossary_export::{fold, PartOfSpeech, TranslationTuple};
    use glossary_export_render::{
        AdvanceTable, DocumentOptions, FontSet, RenderEngine, RenderEngineError,
    };
    use std::sync::Arc;

    fn mono_fonts(data: Option<Vec<u8>>) -> FontSet {
        let metrics: Arc<dyn FontMetrics> = Arc::new(AdvanceTable::monospace(500.0));
        let mut fonts = FontSet::new();
        for style in TextStyle::ALL {
            let mut font = FontResource::new("Mono", metrics.clone());
            if let Some(bytes) = &data {
                font = font.with_data(bytes.clone());
            }
            fonts.insert(style, font);
        }
        fonts
    }

    fn render(fonts: &FontSet) -> String {
        let glossary = fold(vec![
            TranslationTuple::new("cat", PartOfSpeech::Noun, "кот", 1),
            TranslationTuple::new("dog & co", PartOfSpeech::Noun, "<пёс>", 2),
        ]);
        let bytes = RenderEngine::default()
            .render_flowing("English", "Russian", &glossary, fonts, HtmlBackend::new())
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn html_has_title_page_and_body_page() {
        let html = render(&mono_fonts(None));
        assert_eq!(html.matches("<div class=\"page\"").count(), 2);
        assert!(html.contains("<title>Dictionary</title>"));
        assert!(html.contains("<meta name=\"keywords\" content=\"dictionary\">"));
        assert!(html.contains(">Translation </span>"));
        assert!(html.contains("class=\"bold\" style=\"left: 60.00pt; bottom: 732.00pt;\">cat </span>"));
        assert!(html.contains(">(noun) </span>"));
        assert!(!html.contains("@font-face"));
    }

    #[test]
    fn html_escapes_token_text() {
        let html = render(&mono_fonts(None));
        assert!(html.contains(">&amp; </span>"));
        assert!(html.contains(">&lt;пёс&gt; </span>"));
        assert!(!html.contains("<пёс>"));
    }

    #[test]
    fn html_positions_follow_line_advance() {
        let html = render(&mono_fonts(None));
        // "cat (noun) " is 11 glyphs of 6pt, so the gloss starts at 60 + 66.
        assert!(html.contains("style=\"left: 126.00pt; bottom: 732.00pt;\">кот </span>"));
        assert!(html.contains("style=\"left: 60.00pt; bottom: 714.00pt;\">dog </span>"));
    }

    #[test]
    fn html_embeds_font_bytes_as_data_uri() {
        let html = render(&mono_fonts(Some(b"wOF2fake".to_vec())));
        assert!(html.contains("@font-face { font-family: \"glossary-bold\"; src: url(\"data:font/woff2;base64,d09GMmZha2U=\"); }"));
        assert_eq!(html.matches("@font-face").count(), 3);
    }

    #[test]
    fn page_advance_opens_new_page_box() {
        let mut backend = HtmlBackend::new();
        let fonts = mono_fonts(None);
        for style in TextStyle::ALL {
            backend.load_font(style, fonts.get(style).unwrap()).unwrap();
        }
        let geometry = DocumentOptions::default().body_geometry;
        backend.begin_section(&geometry).unwrap();
        backend
            .apply(&LayoutCommand::ShowText {
                token: "a".to_string(),
                style: TextStyle::Regular,
            })
            .unwrap();
        backend.apply(&LayoutCommand::AdvanceColumn).unwrap();
        backend
            .apply(&LayoutCommand::ShowText {
                token: "b".to_string(),
                style: TextStyle::Regular,
            })
            .unwrap();
        backend.apply(&LayoutCommand::AdvancePage).unwrap();
        assert_eq!(backend.pages.len(), 2);
        assert_eq!(backend.pages[0].texts[1].left, 316.0);
        assert_eq!(backend.column, 1);
    }

    #[test]
    fn text_in_unloaded_style_is_rejected() {
        let mut backend = HtmlBackend::new();
        backend.begin_section(&PageGeometry::default()).unwrap();
        let err = backend
            .apply(&LayoutCommand::ShowText {
                token: "x".to_string(),
                style: TextStyle::Italic,
            })
            .unwrap_err();
        assert_eq!(err.message(), "italic font was never loaded");
    }

    #[test]
    fn missing_font_aborts_before_backend_output() {
        let fonts = FontSet::new();
        let err = RenderEngine::default()
            .render_flowing("a", "b", &glossary_export::Glossary::new(), &fonts, HtmlBackend::new())
            .unwrap_err();
        assert_eq!(
            err,
            RenderEngineError::FontNotLoaded {
                style: TextStyle::Bold
            }
        );
    }

    #[test]
    fn sniffs_font_containers() {
        assert_eq!(font_mime_type(b"wOFF...."), "font/woff");
        assert_eq!(font_mime_type(&[0, 1, 0, 0, 9]), "font/ttf");
        assert_eq!(font_mime_type(b"OTTO"), "font/otf");
        assert_eq!(font_mime_type(b"x"), "application/octet-stream");
    }
}
