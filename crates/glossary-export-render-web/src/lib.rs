//! Reference backends and export dispatch for `glossary-export`.
//!
//! [`TsvBackend`] and [`MarkdownBackend`] consume gloss rows directly;
//! [`HtmlBackend`] consumes the layout command stream and produces a
//! paginated, multi-column print layout. [`export_document`] resolves a
//! request and routes it to the backend for its format.

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

mod dispatch;
mod font_dir;
mod html;
mod tabular;

pub use dispatch::{export_document, render_resolved, Attachment, ExportFailure};
pub use font_dir::load_font_dir;
pub use html::HtmlBackend;
pub use tabular::{MarkdownBackend, TsvBackend};
