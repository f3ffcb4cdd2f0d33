use core::fmt;

use glossary_export::{
    resolve, ExportError, ExportRequest, FileFormat, GlossaryCatalog, ResolvedExport,
};
use glossary_export_render::{DocumentOptions, FontSet, RenderEngine, RenderEngineError};

use crate::html::HtmlBackend;
use crate::tabular::{MarkdownBackend, TsvBackend};

/// A rendered export ready to hand to a client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Export failure: either the request did not resolve or rendering aborted.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportFailure {
    Request(ExportError),
    Render(RenderEngineError),
}

impl ExportFailure {
    /// Whether the failure is attributable to the request.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Request(err) => err.is_client_error(),
            Self::Render(_) => false,
        }
    }
}

impl fmt::Display for ExportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(err) => write!(f, "{}", err),
            Self::Render(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ExportFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(err) => Some(err),
            Self::Render(err) => Some(err),
        }
    }
}

impl From<ExportError> for ExportFailure {
    fn from(value: ExportError) -> Self {
        Self::Request(value)
    }
}

impl From<RenderEngineError> for ExportFailure {
    fn from(value: RenderEngineError) -> Self {
        Self::Render(value)
    }
}

/// Resolve `request` against `catalog` and render it in the requested format.
///
/// `fonts` is only consulted by flowing formats.
pub fn export_document<C>(
    catalog: &C,
    request: &ExportRequest,
    fonts: &FontSet,
    options: &DocumentOptions,
) -> Result<Attachment, ExportFailure>
where
    C: GlossaryCatalog + ?Sized,
{
    let resolved = resolve(catalog, request)?;
    let bytes = render_resolved(&resolved, fonts, options)?;
    log::debug!(
        "exported {} ({} entries, {} bytes)",
        resolved.attachment_name,
        resolved.glossary.len(),
        bytes.len()
    );
    Ok(Attachment {
        file_name: resolved.attachment_name,
        content_type: resolved.format.content_type(),
        bytes,
    })
}

/// Render an already resolved export to bytes.
pub fn render_resolved(
    resolved: &ResolvedExport,
    fonts: &FontSet,
    options: &DocumentOptions,
) -> Result<Vec<u8>, RenderEngineError> {
    let engine = RenderEngine::new(options.clone());
    let from = resolved.language_from.as_str();
    let to = resolved.language_to.as_str();
    match resolved.format {
        FileFormat::Tsv => engine.render_tabular(from, to, &resolved.glossary, TsvBackend::new()),
        FileFormat::Markdown => {
            engine.render_tabular(from, to, &resolved.glossary, MarkdownBackend::new())
        }
        FileFormat::Html => {
            engine.render_flowing(from, to, &resolved.glossary, fonts, HtmlBackend::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossary_export::{JsonCatalog, LanguageRole};

    fn catalog() -> JsonCatalog {
        JsonCatalog::from_json_str(
            r#"{
                "languages": [{"id": 1, "name": "English"}, {"id": 2, "name": "Russian"}],
                "pairs": [{"from": 1, "to": 2, "tuples": [
                    {"source_word": "cat", "part_of_speech": "noun", "target_word": "кот", "concept_group_id": 1},
                    {"source_word": "cat", "part_of_speech": "noun", "target_word": "кошка", "concept_group_id": 1}
                ]}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn tsv_export_names_attachment_and_content_type() {
        let request = ExportRequest::new(1, 2, FileFormat::Tsv).with_file_name("animals");
        let attachment = export_document(
            &catalog(),
            &request,
            &FontSet::new(),
            &DocumentOptions::default(),
        )
        .unwrap();
        assert_eq!(attachment.file_name, "animals.tsv");
        assert_eq!(
            attachment.content_type,
            "text/tab-separated-values; charset=utf-8"
        );
        assert_eq!(
            String::from_utf8(attachment.bytes).unwrap(),
            "English\tPart of speech\tRussian\ncat\tnoun\tкот, кошка\n"
        );
    }

    #[test]
    fn unknown_language_is_a_client_error() {
        let request = ExportRequest::new(1, 99, FileFormat::Markdown);
        let err = export_document(
            &catalog(),
            &request,
            &FontSet::new(),
            &DocumentOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ExportFailure::Request(ExportError::UnknownLanguage {
                role: LanguageRole::To,
                id: 99
            })
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn html_export_without_fonts_is_a_server_error() {
        let request = ExportRequest::new(1, 2, FileFormat::Html);
        let err = export_document(
            &catalog(),
            &request,
            &FontSet::new(),
            &DocumentOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ExportFailure::Render(RenderEngineError::FontNotLoaded { .. })
        ));
        assert!(!err.is_client_error());
    }

    #[test]
    fn html_export_uses_default_name() {
        let request = ExportRequest::new(1, 2, FileFormat::Html);
        let attachment = export_document(
            &catalog(),
            &request,
            &FontSet::approximate_sans(),
            &DocumentOptions::default(),
        )
        .unwrap();
        assert_eq!(attachment.file_name, "dictionary.html");
        let html = String::from_utf8(attachment.bytes).unwrap();
        assert!(html.contains(">кот, </span>"));
    }
}
