use core::fmt;

use glossary_export::{format_gloss, GlossEntry, Glossary};
use serde::{Deserialize, Deserializer, Serialize};

use crate::render_fonts::{FontResource, FontSet};
use crate::render_ir::{LayoutCommand, PageGeometry, StyledRun, TextStyle};
use crate::render_layout::{FlowLayoutEngine, LayoutError};

/// Header of the part-of-speech column in tabular output.
pub const PART_OF_SPEECH_COLUMN: &str = "Part of speech";

const TITLE_FONT_SIZE: f32 = 18.0;
const TITLE_MARGIN: f32 = 60.0;

/// Default title caption. `{from}` and `{to}` are replaced by language names.
pub const DEFAULT_CAPTION_TEMPLATE: &str =
    "Translation dictionary (source language - {from}, target language - {to})";

/// Names of the language pair and the caption derived from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentTitle {
    pub language_from: String,
    pub language_to: String,
    caption: String,
}

impl DocumentTitle {
    pub fn new(
        language_from: impl Into<String>,
        language_to: impl Into<String>,
        caption_template: &str,
    ) -> Self {
        let language_from = language_from.into();
        let language_to = language_to.into();
        let caption = fill_caption(caption_template, &language_from, &language_to);
        Self {
            language_from,
            language_to,
            caption,
        }
    }

    /// Title paragraph text.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Fixed title row: source language, part of speech, target language.
    pub fn column_titles(&self) -> [&str; 3] {
        [
            self.language_from.as_str(),
            PART_OF_SPEECH_COLUMN,
            self.language_to.as_str(),
        ]
    }
}

/// Substitute `{from}` and `{to}` in one left-to-right pass, so placeholder
/// text inside a language name is kept literally.
fn fill_caption(template: &str, language_from: &str, language_to: &str) -> String {
    let mut out = String::with_capacity(template.len() + language_from.len() + language_to.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix("{from}") {
            out.push_str(language_from);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{to}") {
            out.push_str(language_to);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// One tabular row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow<'g> {
    pub source_word: &'g str,
    pub part_of_speech: &'static str,
    pub gloss: String,
}

impl<'g> TableRow<'g> {
    pub fn from_entry(entry: &'g GlossEntry) -> Self {
        Self {
            source_word: &entry.key.source_word,
            part_of_speech: entry.key.part_of_speech.label(),
            gloss: format_gloss(&entry.values),
        }
    }

    pub fn cells(&self) -> [&str; 3] {
        [self.source_word, self.part_of_speech, &self.gloss]
    }
}

/// Document metadata handed to flowing backends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentInfo {
    pub title: String,
    pub subject: String,
    pub keywords: String,
    pub author: Option<String>,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            title: "Dictionary".to_string(),
            subject: "dictionary".to_string(),
            keywords: "dictionary".to_string(),
            author: None,
        }
    }
}

/// Per-document rendering options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    /// Geometry of the title page. Fields left out of an options file fall
    /// back to [`PageGeometry::title`]; the title is always set in one column.
    #[serde(deserialize_with = "deserialize_title_geometry")]
    pub title_geometry: PageGeometry,
    /// Geometry of the dictionary body, starting on the page after the title.
    pub body_geometry: PageGeometry,
    pub caption_template: String,
    pub info: DocumentInfo,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            title_geometry: PageGeometry::title(TITLE_FONT_SIZE, TITLE_MARGIN),
            body_geometry: PageGeometry::body(2, 12.0, 18.0),
            caption_template: DEFAULT_CAPTION_TEMPLATE.to_string(),
            info: DocumentInfo::default(),
        }
    }
}

/// Partial title geometry as written in an options file.
#[derive(Deserialize)]
struct TitleGeometryFields {
    margin_left: Option<f32>,
    margin_top: Option<f32>,
    margin_bottom: Option<f32>,
    column_count: Option<u8>,
    column_spacing: Option<f32>,
    leading: Option<f32>,
    font_size: Option<f32>,
    page_width: Option<f32>,
    page_height: Option<f32>,
}

fn deserialize_title_geometry<'de, D>(deserializer: D) -> Result<PageGeometry, D::Error>
where
    D: Deserializer<'de>,
{
    let fields = TitleGeometryFields::deserialize(deserializer)?;
    let mut geometry =
        PageGeometry::title(fields.font_size.unwrap_or(TITLE_FONT_SIZE), TITLE_MARGIN);
    let overrides = [
        (&mut geometry.margin_left, fields.margin_left),
        (&mut geometry.margin_top, fields.margin_top),
        (&mut geometry.margin_bottom, fields.margin_bottom),
        (&mut geometry.column_spacing, fields.column_spacing),
        (&mut geometry.leading, fields.leading),
        (&mut geometry.page_width, fields.page_width),
        (&mut geometry.page_height, fields.page_height),
    ];
    for (slot, value) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if let Some(columns) = fields.column_count {
        geometry.column_count = columns;
    }
    Ok(geometry)
}

/// Failure reported by a concrete backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BackendError {}

impl From<fmt::Error> for BackendError {
    fn from(_: fmt::Error) -> Self {
        Self::new("formatting failed")
    }
}

impl From<std::io::Error> for BackendError {
    fn from(value: std::io::Error) -> Self {
        Self::new(value.to_string())
    }
}

/// Backend that iterates gloss entries directly, one row per entry.
pub trait TabularBackend {
    type Output;

    /// Called once before any row.
    fn begin(&mut self, title: &DocumentTitle) -> Result<(), BackendError>;

    fn push_row(&mut self, row: &TableRow<'_>) -> Result<(), BackendError>;

    fn finish(self) -> Result<Self::Output, BackendError>;
}

/// Backend that consumes the layout command stream.
///
/// Every style is loaded with [`load_font`](Self::load_font) before the first
/// section begins. Each section starts on a new page.
pub trait FlowingBackend {
    type Output;

    fn set_info(&mut self, _info: &DocumentInfo) -> Result<(), BackendError> {
        Ok(())
    }

    fn load_font(&mut self, style: TextStyle, font: &FontResource) -> Result<(), BackendError>;

    fn begin_section(&mut self, geometry: &PageGeometry) -> Result<(), BackendError>;

    fn apply(&mut self, command: &LayoutCommand) -> Result<(), BackendError>;

    fn finish(self) -> Result<Self::Output, BackendError>;
}

/// Render failure. Any error aborts the build and discards partial output.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEngineError {
    Layout(LayoutError),
    /// No font was supplied for `style`.
    FontNotLoaded { style: TextStyle },
    /// A command referenced a style the backend never loaded.
    SequenceMisuse { detail: String },
    Backend(BackendError),
}

impl RenderEngineError {
    /// Font metrics were missing or could not measure a token.
    pub fn is_measurement(&self) -> bool {
        matches!(
            self,
            Self::FontNotLoaded { .. } | Self::Layout(LayoutError::Measurement { .. })
        )
    }
}

impl fmt::Display for RenderEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout(err) => write!(f, "layout failed: {}", err),
            Self::FontNotLoaded { style } => write!(f, "no font supplied for {} text", style),
            Self::SequenceMisuse { detail } => write!(f, "render sequence misuse: {}", detail),
            Self::Backend(err) => write!(f, "backend failed: {}", err),
        }
    }
}

impl std::error::Error for RenderEngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Layout(err) => Some(err),
            Self::Backend(err) => Some(err),
            Self::FontNotLoaded { .. } | Self::SequenceMisuse { .. } => None,
        }
    }
}

impl From<LayoutError> for RenderEngineError {
    fn from(value: LayoutError) -> Self {
        Self::Layout(value)
    }
}

impl From<BackendError> for RenderEngineError {
    fn from(value: BackendError) -> Self {
        Self::Backend(value)
    }
}

/// Laid-out commands of one section with its geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowSection {
    pub geometry: PageGeometry,
    pub commands: Vec<LayoutCommand>,
}

/// Title and body sections of a flowing document.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowDocument {
    pub title: FlowSection,
    pub body: FlowSection,
}

/// Styled runs of one gloss entry: bold source word, italic part of speech,
/// regular gloss ending the line.
pub fn entry_runs(entry: &GlossEntry) -> [StyledRun; 3] {
    [
        StyledRun::bold(entry.key.source_word.clone()),
        StyledRun::italic(format!("({}) ", entry.key.part_of_speech.label())),
        StyledRun::regular(format_gloss(&entry.values)).with_break_after(),
    ]
}

/// Drives the aggregator output through a backend.
#[derive(Clone, Debug, Default)]
pub struct RenderEngine {
    options: DocumentOptions,
}

impl RenderEngine {
    pub fn new(options: DocumentOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn title(&self, language_from: &str, language_to: &str) -> DocumentTitle {
        DocumentTitle::new(language_from, language_to, &self.options.caption_template)
    }

    /// Rows in glossary order.
    pub fn rows(glossary: &Glossary) -> impl Iterator<Item = TableRow<'_>> {
        glossary.iter().map(TableRow::from_entry)
    }

    pub fn render_tabular<B>(
        &self,
        language_from: &str,
        language_to: &str,
        glossary: &Glossary,
        mut backend: B,
    ) -> Result<B::Output, RenderEngineError>
    where
        B: TabularBackend,
    {
        backend.begin(&self.title(language_from, language_to))?;
        let mut rows = 0usize;
        for row in Self::rows(glossary) {
            backend.push_row(&row)?;
            rows += 1;
        }
        log::debug!("tabular render finished with {} rows", rows);
        Ok(backend.finish()?)
    }

    /// Lay out the title and body without a backend.
    pub fn layout(
        &self,
        language_from: &str,
        language_to: &str,
        glossary: &Glossary,
        fonts: &FontSet,
    ) -> Result<FlowDocument, RenderEngineError> {
        let mut recorder = CommandRecorder::default();
        self.drive_flowing(language_from, language_to, glossary, fonts, &mut recorder)?;
        let mut sections = recorder.sections.into_iter();
        match (sections.next(), sections.next()) {
            (Some(title), Some(body)) => Ok(FlowDocument { title, body }),
            _ => Err(RenderEngineError::SequenceMisuse {
                detail: "flowing layout did not produce title and body sections".to_string(),
            }),
        }
    }

    pub fn render_flowing<B>(
        &self,
        language_from: &str,
        language_to: &str,
        glossary: &Glossary,
        fonts: &FontSet,
        mut backend: B,
    ) -> Result<B::Output, RenderEngineError>
    where
        B: FlowingBackend,
    {
        self.drive_flowing(language_from, language_to, glossary, fonts, &mut backend)?;
        Ok(backend.finish()?)
    }

    fn title_geometry(&self) -> PageGeometry {
        let geometry = self.options.title_geometry;
        if geometry.column_count != 1 {
            log::warn!(
                "title is set in one column; ignoring column_count={}",
                geometry.column_count
            );
        }
        PageGeometry {
            column_count: 1,
            ..geometry
        }
    }

    fn drive_flowing<B>(
        &self,
        language_from: &str,
        language_to: &str,
        glossary: &Glossary,
        fonts: &FontSet,
        backend: &mut B,
    ) -> Result<(), RenderEngineError>
    where
        B: FlowingBackend,
    {
        if let Some(style) = fonts.missing_styles().into_iter().next() {
            return Err(RenderEngineError::FontNotLoaded { style });
        }
        backend.set_info(&self.options.info)?;
        let mut sink = CheckedSink::new(backend);
        for style in TextStyle::ALL {
            if let Some(font) = fonts.get(style) {
                sink.load_font(style, font)?;
            }
        }

        let title = self.title(language_from, language_to);
        let title_geometry = self.title_geometry();
        let mut engine = FlowLayoutEngine::new(title_geometry, fonts)?;
        sink.begin_section(&title_geometry)?;
        engine.feed(&StyledRun::bold(title.caption()))?;
        engine.close()?;
        sink.apply_all(engine.drain_commands())?;

        let mut engine = FlowLayoutEngine::new(self.options.body_geometry, fonts)?;
        sink.begin_section(&self.options.body_geometry)?;
        for entry in glossary {
            engine.feed_all(&entry_runs(entry))?;
            sink.apply_all(engine.drain_commands())?;
        }
        engine.close()?;
        sink.apply_all(engine.drain_commands())?;

        log::debug!(
            "flowing render finished: entries={} body_pages={} lines={}",
            glossary.len(),
            engine.page_count(),
            engine.line_count()
        );
        Ok(())
    }
}

/// Forwards commands to a backend, refusing text in styles it never loaded.
struct CheckedSink<'b, B> {
    backend: &'b mut B,
    loaded: [bool; 3],
}

impl<'b, B: FlowingBackend> CheckedSink<'b, B> {
    fn new(backend: &'b mut B) -> Self {
        Self {
            backend,
            loaded: [false; 3],
        }
    }

    fn load_font(&mut self, style: TextStyle, font: &FontResource) -> Result<(), RenderEngineError> {
        self.backend.load_font(style, font)?;
        self.loaded[style.slot()] = true;
        Ok(())
    }

    fn begin_section(&mut self, geometry: &PageGeometry) -> Result<(), RenderEngineError> {
        Ok(self.backend.begin_section(geometry)?)
    }

    fn apply_all(&mut self, commands: Vec<LayoutCommand>) -> Result<(), RenderEngineError> {
        for command in &commands {
            if let LayoutCommand::ShowText { style, .. } = command {
                if !self.loaded[style.slot()] {
                    return Err(RenderEngineError::SequenceMisuse {
                        detail: format!("text in {} style before its font was loaded", style),
                    });
                }
            }
            self.backend.apply(command)?;
        }
        Ok(())
    }
}

/// In-memory flowing backend that keeps every section's commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandRecorder {
    pub loaded_styles: Vec<TextStyle>,
    pub info: Option<DocumentInfo>,
    pub sections: Vec<FlowSection>,
}

impl FlowingBackend for CommandRecorder {
    type Output = Vec<FlowSection>;

    fn set_info(&mut self, info: &DocumentInfo) -> Result<(), BackendError> {
        self.info = Some(info.clone());
        Ok(())
    }

    fn load_font(&mut self, style: TextStyle, _font: &FontResource) -> Result<(), BackendError> {
        self.loaded_styles.push(style);
        Ok(())
    }

    fn begin_section(&mut self, geometry: &PageGeometry) -> Result<(), BackendError> {
        self.sections.push(FlowSection {
            geometry: *geometry,
            commands: Vec::new(),
        });
        Ok(())
    }

    fn apply(&mut self, command: &LayoutCommand) -> Result<(), BackendError> {
        let section = self
            .sections
            .last_mut()
            .ok_or_else(|| BackendError::new("command received before any section"))?;
        section.commands.push(command.clone());
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, BackendError> {
        Ok(self.sections)
    }
}

/// Tabular output collected in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectedTable {
    pub caption: String,
    pub column_titles: Vec<String>,
    pub rows: Vec<[String; 3]>,
}

/// In-memory tabular backend.
#[derive(Clone, Debug, Default)]
pub struct RowCollector {
    table: CollectedTable,
}

impl TabularBackend for RowCollector {
    type Output = CollectedTable;

    fn begin(&mut self, title: &DocumentTitle) -> Result<(), BackendError> {
        self.table.caption = title.caption().to_string();
        self.table.column_titles = title.column_titles().iter().map(|s| s.to_string()).collect();
        Ok(())
    }

    fn push_row(&mut self, row: &TableRow<'_>) -> Result<(), BackendError> {
        self.table.rows.push(row.cells().map(str::to_string));
        Ok(())
    }

    fn finish(self) -> Result<Self::Output, BackendError> {
        Ok(self.table)
    }
}
