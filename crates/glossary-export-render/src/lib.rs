//! Flow layout engine and renderer binding for `glossary-export`.

#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented
    )
)]

mod render_engine;
mod render_fonts;
mod render_ir;
mod render_layout;

pub use render_engine::{
    entry_runs, BackendError, CollectedTable, CommandRecorder, DocumentInfo, DocumentOptions,
    DocumentTitle, FlowDocument, FlowSection, FlowingBackend, RenderEngine, RenderEngineError,
    RowCollector, TableRow, TabularBackend, DEFAULT_CAPTION_TEMPLATE, PART_OF_SPEECH_COLUMN,
};
pub use render_fonts::{AdvanceTable, AdvanceTableFile, FontResource, FontSet};
pub use render_ir::{
    GeometryError, LayoutCommand, LayoutCursor, PageGeometry, StyledRun, TextStyle,
};
pub use render_layout::{
    layout_runs, FlowLayoutEngine, FontMetrics, LayoutError, LayoutState, MeasureError,
};
