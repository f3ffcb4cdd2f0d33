//! Display text for grouped definitions.

use core::fmt;

use crate::aggregate::{ConceptGroup, DefinitionValues};

const WORD_SEPARATOR: &str = ", ";

/// Render the gloss text of one entry.
///
/// A single concept group is rendered as its comma-joined words. Several
/// groups are numbered senses, each followed by a space:
/// `"1. кот 2. feline "`.
pub fn format_gloss(values: &DefinitionValues) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_gloss(&mut out, values);
    out
}

fn write_gloss<W: fmt::Write>(out: &mut W, values: &DefinitionValues) -> fmt::Result {
    match values.groups() {
        [] => Ok(()),
        [only] => write_words(out, only),
        groups => {
            for (idx, group) in groups.iter().enumerate() {
                write!(out, "{}. ", idx + 1)?;
                write_words(out, group)?;
                out.write_char(' ')?;
            }
            Ok(())
        }
    }
}

fn write_words<W: fmt::Write>(out: &mut W, group: &ConceptGroup) -> fmt::Result {
    for (idx, word) in group.words.iter().enumerate() {
        if idx > 0 {
            out.write_str(WORD_SEPARATOR)?;
        }
        out.write_str(word)?;
    }
    Ok(())
}

impl fmt::Display for DefinitionValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_gloss(f, self)
    }
}
