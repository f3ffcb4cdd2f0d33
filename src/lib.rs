//! Bilingual glossary compilation.
//!
//! `glossary-export` turns an ordered stream of [`TranslationTuple`]s into a
//! [`Glossary`] of grouped definitions and renders each definition's gloss
//! text. The layout engine and format backends live in
//! `glossary-export-render` and `glossary-export-render-web`.
//!
//! ```rust
//! use glossary_export::{fold, format_gloss, PartOfSpeech, TranslationTuple};
//!
//! let glossary = fold(vec![
//!     TranslationTuple::new("cat", PartOfSpeech::Noun, "кот", 1),
//!     TranslationTuple::new("cat", PartOfSpeech::Noun, "feline", 2),
//! ]);
//! assert_eq!(format_gloss(&glossary.entries()[0].values), "1. кот 2. feline ");
//! ```

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

pub mod aggregate;
pub mod error;
pub mod export;
pub mod gloss;
pub mod tuple;

pub use aggregate::{
    fold, Aggregator, ConceptGroup, DefinitionKey, DefinitionValues, GlossEntry, Glossary,
};
pub use error::ExportError;
pub use export::{
    resolve, BackendKind, CatalogLanguage, CatalogPair, ExportRequest, FileFormat,
    GlossaryCatalog, JsonCatalog, LanguageId, LanguageRole, ResolvedExport, DEFAULT_FILE_NAME,
};
pub use gloss::format_gloss;
pub use tuple::{ConceptGroupId, PartOfSpeech, TranslationTuple, UnknownPartOfSpeech};
