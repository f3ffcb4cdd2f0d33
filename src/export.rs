//! Document-level export requests.
//!
//! An export names a source and a target language, an output format and an
//! optional file name. Resolution turns the language identifiers into display
//! names, pulls the tuple stream for the pair from a [`GlossaryCatalog`] and
//! folds it into a [`Glossary`]. Rendering the glossary into bytes is done by
//! the render crates.

use core::fmt;
use core::str::FromStr;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::aggregate::{fold, Glossary};
use crate::error::ExportError;
use crate::tuple::TranslationTuple;

/// File name used when a request does not carry one.
pub const DEFAULT_FILE_NAME: &str = "dictionary";

/// Catalog identifier of a language.
pub type LanguageId = i64;

/// How a format consumes the compiled glossary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Iterates gloss entries row by row.
    Tabular,
    /// Flows styled text through the layout engine.
    Flowing,
}

/// Output formats known to the export surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileFormat {
    /// Tab-separated rows preceded by a column-title row.
    #[serde(rename = "tsv")]
    Tsv,
    /// Title paragraph followed by a pipe table.
    #[serde(rename = "md")]
    Markdown,
    /// Paginated multi-column print layout.
    #[serde(rename = "html")]
    Html,
}

impl FileFormat {
    /// All formats, in the order they are advertised to clients.
    pub const ALL: [FileFormat; 3] = [Self::Tsv, Self::Markdown, Self::Html];

    /// Wire tag, also used as the file extension.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Tsv => "tsv",
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }

    pub fn extension(self) -> &'static str {
        self.tag()
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Tsv => "text/tab-separated-values; charset=utf-8",
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
        }
    }

    pub fn kind(self) -> BackendKind {
        match self {
            Self::Tsv | Self::Markdown => BackendKind::Tabular,
            Self::Html => BackendKind::Flowing,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        match tag.as_str() {
            "tsv" => Ok(Self::Tsv),
            "md" | "markdown" => Ok(Self::Markdown),
            "html" | "htm" => Ok(Self::Html),
            _ => Err(format!("unsupported format '{}'", s)),
        }
    }
}

/// Which side of the language pair an identifier names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LanguageRole {
    From,
    To,
}

impl fmt::Display for LanguageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::From => f.write_str("source"),
            Self::To => f.write_str("target"),
        }
    }
}

/// Client-facing export request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub from_id: LanguageId,
    pub to_id: LanguageId,
    pub format: FileFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl ExportRequest {
    pub fn new(from_id: LanguageId, to_id: LanguageId, format: FileFormat) -> Self {
        Self {
            from_id,
            to_id,
            format,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Attachment name `"<file name>.<format>"`.
    ///
    /// Missing or blank names fall back to [`DEFAULT_FILE_NAME`]; path
    /// separators are replaced so the name stays a single path component.
    pub fn attachment_name(&self) -> String {
        let stem = self
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME);
        let stem: String = stem
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{}.{}", stem, self.format.extension())
    }
}

/// Source of language names and translation tuples.
///
/// This stands in for the persistence layer and the word/concept join.
pub trait GlossaryCatalog {
    fn language_name(&self, id: LanguageId) -> Option<&str>;

    /// Tuples translating from `from` into `to`, ordered by source word.
    fn tuples(
        &self,
        from: LanguageId,
        to: LanguageId,
    ) -> Result<Vec<TranslationTuple>, ExportError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLanguage {
    pub id: LanguageId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPair {
    pub from: LanguageId,
    pub to: LanguageId,
    #[serde(default)]
    pub tuples: Vec<TranslationTuple>,
}

/// In-memory catalog, typically loaded from a JSON document:
///
/// ```json
/// {
///   "languages": [{ "id": 1, "name": "English" }, { "id": 2, "name": "Russian" }],
///   "pairs": [{ "from": 1, "to": 2, "tuples": [
///     { "source_word": "cat", "part_of_speech": "noun", "target_word": "кот", "concept_group_id": 1 }
///   ] }]
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonCatalog {
    #[serde(default)]
    pub languages: Vec<CatalogLanguage>,
    #[serde(default)]
    pub pairs: Vec<CatalogPair>,
}

impl JsonCatalog {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ExportError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ExportError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

impl GlossaryCatalog for JsonCatalog {
    fn language_name(&self, id: LanguageId) -> Option<&str> {
        self.languages
            .iter()
            .find(|lang| lang.id == id)
            .map(|lang| lang.name.as_str())
    }

    fn tuples(
        &self,
        from: LanguageId,
        to: LanguageId,
    ) -> Result<Vec<TranslationTuple>, ExportError> {
        let mut tuples: Vec<TranslationTuple> = self
            .pairs
            .iter()
            .filter(|pair| pair.from == from && pair.to == to)
            .flat_map(|pair| pair.tuples.iter().cloned())
            .collect();
        if tuples.is_empty() {
            log::warn!("catalog has no tuples for language pair {} -> {}", from, to);
        }
        // Stable: tuples of one source word keep their stored order.
        tuples.sort_by(|a, b| a.source_word.cmp(&b.source_word));
        Ok(tuples)
    }
}

/// A request whose languages resolved, with the compiled glossary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedExport {
    pub language_from: String,
    pub language_to: String,
    pub format: FileFormat,
    pub attachment_name: String,
    pub glossary: Glossary,
}

/// Resolve `request` against `catalog` and aggregate its tuples.
pub fn resolve<C>(catalog: &C, request: &ExportRequest) -> Result<ResolvedExport, ExportError>
where
    C: GlossaryCatalog + ?Sized,
{
    let language_from = catalog
        .language_name(request.from_id)
        .ok_or(ExportError::UnknownLanguage {
            role: LanguageRole::From,
            id: request.from_id,
        })?
        .to_string();
    let language_to = catalog
        .language_name(request.to_id)
        .ok_or(ExportError::UnknownLanguage {
            role: LanguageRole::To,
            id: request.to_id,
        })?
        .to_string();

    let tuples = catalog.tuples(request.from_id, request.to_id)?;
    log::debug!(
        "resolved export {} -> {} as {} ({} tuples)",
        language_from,
        language_to,
        request.format,
        tuples.len()
    );
    Ok(ResolvedExport {
        language_from,
        language_to,
        format: request.format,
        attachment_name: request.attachment_name(),
        glossary: fold(tuples),
    })
}
