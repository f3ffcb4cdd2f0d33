use core::fmt;

use crate::render_fonts::FontSet;
use crate::render_ir::{
    GeometryError, LayoutCommand, LayoutCursor, PageGeometry, StyledRun, TextStyle,
};

/// Width measurement for one font face.
pub trait FontMetrics: Send + Sync {
    /// Advance width of `text` in thousandths of an em.
    fn string_width(&self, text: &str) -> Result<f32, MeasureError>;
}

/// Font metrics could not produce a width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeasureError {
    /// The face has no advance for `ch`.
    MissingGlyph { ch: char },
    /// Metrics are missing or unreadable.
    Unavailable { reason: String },
}

impl fmt::Display for MeasureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingGlyph { ch } => write!(f, "no glyph for {:?} (U+{:04X})", ch, *ch as u32),
            Self::Unavailable { reason } => write!(f, "font metrics unavailable: {}", reason),
        }
    }
}

impl std::error::Error for MeasureError {}

/// Layout failure. Every variant aborts the document build.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutError {
    /// Geometry rejected at engine construction.
    Geometry(GeometryError),
    /// A token of `style` could not be measured.
    Measurement { style: TextStyle, source: MeasureError },
    /// The engine was driven out of order, e.g. `feed` after `close`.
    SequenceMisuse { operation: &'static str },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(err) => write!(f, "malformed page geometry: {}", err),
            Self::Measurement { style, source } => {
                write!(f, "cannot measure {} text: {}", style, source)
            }
            Self::SequenceMisuse { operation } => {
                write!(f, "layout engine misuse: {} after close", operation)
            }
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(err) => Some(err),
            Self::Measurement { source, .. } => Some(source),
            Self::SequenceMisuse { .. } => None,
        }
    }
}

impl From<GeometryError> for LayoutError {
    fn from(value: GeometryError) -> Self {
        Self::Geometry(value)
    }
}

/// Observable engine state.
///
/// A full column or page is never observable: the overflow that fills it
/// advances the cursor before `feed` returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutState {
    /// Nothing fed yet.
    Idle,
    /// At least one run placed.
    InLine,
    /// `close` was called.
    Closed,
}

/// Flowing text layout for one document section.
///
/// The engine turns [`StyledRun`]s into [`LayoutCommand`]s. Tokens are placed
/// left to right until the next one would reach the column's width budget;
/// the line then advances by `leading`. A line whose baseline reaches the
/// bottom margin moves to the next column, and past the last column to a new
/// page. Columns are filled strictly in order: once the last column of a page
/// overflows, layout continues on a new page even if earlier columns have
/// room left.
pub struct FlowLayoutEngine<'a> {
    geometry: PageGeometry,
    fonts: &'a FontSet,
    border: f32,
    cursor: LayoutCursor,
    state: LayoutState,
    line_tokens: usize,
    commands: Vec<LayoutCommand>,
    line_advances: usize,
    column_advances: usize,
    page_advances: usize,
}

impl core::fmt::Debug for FlowLayoutEngine<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlowLayoutEngine")
            .field("geometry", &self.geometry)
            .field("border", &self.border)
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .field("pending_commands", &self.commands.len())
            .finish()
    }
}

impl<'a> FlowLayoutEngine<'a> {
    /// Validate `geometry` and place the cursor at the top of column 1.
    pub fn new(geometry: PageGeometry, fonts: &'a FontSet) -> Result<Self, LayoutError> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            fonts,
            border: geometry.border(),
            cursor: LayoutCursor::at_top(&geometry),
            state: LayoutState::Idle,
            line_tokens: 0,
            commands: Vec::with_capacity(64),
            line_advances: 0,
            column_advances: 0,
            page_advances: 0,
        })
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Line width budget in thousandths of an em.
    pub fn border(&self) -> f32 {
        self.border
    }

    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// Pages touched so far, counting the first.
    pub fn page_count(&self) -> usize {
        self.page_advances + 1
    }

    /// Lines ended so far by wrapping or forced breaks.
    pub fn line_count(&self) -> usize {
        self.line_advances
    }

    /// Lay out one run.
    pub fn feed(&mut self, run: &StyledRun) -> Result<(), LayoutError> {
        if self.state == LayoutState::Closed {
            return Err(LayoutError::SequenceMisuse { operation: "feed" });
        }
        let fonts: &'a FontSet = self.fonts;
        let metrics = fonts
            .metrics(run.style)
            .ok_or_else(|| LayoutError::Measurement {
                style: run.style,
                source: MeasureError::Unavailable {
                    reason: format!("no {} font loaded", run.style),
                },
            })?;
        self.state = LayoutState::InLine;

        let mut measured = String::new();
        for token in run.text.split_whitespace() {
            measured.clear();
            measured.push_str(token);
            measured.push(' ');
            let advance =
                metrics
                    .string_width(&measured)
                    .map_err(|source| LayoutError::Measurement {
                        style: run.style,
                        source,
                    })?;
            self.place(token, advance, run.style);
        }

        if run.force_break_after {
            self.advance_line();
            self.cursor.accumulated_line_width = 0.0;
        }
        Ok(())
    }

    /// Lay out runs in order, stopping at the first failure.
    pub fn feed_all<'r, I>(&mut self, runs: I) -> Result<(), LayoutError>
    where
        I: IntoIterator<Item = &'r StyledRun>,
    {
        for run in runs {
            self.feed(run)?;
        }
        Ok(())
    }

    /// Finish the section. Emits [`LayoutCommand::Closed`] exactly once.
    pub fn close(&mut self) -> Result<(), LayoutError> {
        if self.state == LayoutState::Closed {
            return Err(LayoutError::SequenceMisuse { operation: "close" });
        }
        self.commands.push(LayoutCommand::Closed);
        self.state = LayoutState::Closed;
        log::debug!(
            "flow layout closed: lines={} column_advances={} pages={}",
            self.line_advances,
            self.column_advances,
            self.page_count()
        );
        Ok(())
    }

    /// Commands emitted so far and not yet drained.
    pub fn commands(&self) -> &[LayoutCommand] {
        &self.commands
    }

    /// Take the commands emitted so far.
    pub fn drain_commands(&mut self) -> Vec<LayoutCommand> {
        core::mem::take(&mut self.commands)
    }

    pub fn into_commands(self) -> Vec<LayoutCommand> {
        self.commands
    }

    fn place(&mut self, token: &str, advance: f32, style: TextStyle) {
        if self.line_tokens > 0 && self.cursor.accumulated_line_width + advance >= self.border {
            self.advance_line();
            self.cursor.accumulated_line_width = advance;
        } else {
            self.cursor.accumulated_line_width += advance;
        }
        if advance >= self.border {
            log::warn!(
                "token {:?} is wider than the column ({} >= {}); placing it on its own line",
                token,
                advance,
                self.border
            );
        }

        if self.cursor.vertical_position <= self.geometry.margin_bottom {
            self.advance_column_or_page();
        }

        self.commands.push(LayoutCommand::ShowText {
            token: token.to_string(),
            style,
        });
        self.line_tokens += 1;
    }

    fn advance_line(&mut self) {
        self.commands.push(LayoutCommand::AdvanceLine);
        self.cursor.vertical_position -= self.geometry.leading;
        self.line_tokens = 0;
        self.line_advances += 1;
    }

    fn advance_column_or_page(&mut self) {
        if self.cursor.column < self.geometry.column_count {
            self.commands.push(LayoutCommand::AdvanceColumn);
            self.cursor.column += 1;
            self.column_advances += 1;
            log::trace!("advance to column {}", self.cursor.column);
        } else {
            self.commands.push(LayoutCommand::AdvancePage);
            self.cursor.column = 1;
            self.page_advances += 1;
            log::trace!("advance to page {}", self.page_count());
        }
        self.cursor.vertical_position = self.geometry.top();
    }
}

/// Lay out `runs` into a closed command stream.
pub fn layout_runs<'r, I>(
    geometry: PageGeometry,
    fonts: &FontSet,
    runs: I,
) -> Result<Vec<LayoutCommand>, LayoutError>
where
    I: IntoIterator<Item = &'r StyledRun>,
{
    let mut engine = FlowLayoutEngine::new(geometry, fonts)?;
    engine.feed_all(runs)?;
    engine.close()?;
    Ok(engine.into_commands())
}
