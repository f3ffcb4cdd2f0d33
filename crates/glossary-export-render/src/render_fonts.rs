use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::render_ir::TextStyle;
use crate::render_layout::{FontMetrics, MeasureError};

/// Advance widths (thousandths of an em) for the printable ASCII range of a
/// neutral sans-serif face. Used by [`AdvanceTable::sans`].
const SANS_ASCII_ADVANCES: &[(char, f32)] = &[
    (' ', 278.0),
    ('!', 278.0),
    ('"', 355.0),
    ('#', 556.0),
    ('$', 556.0),
    ('%', 889.0),
    ('&', 667.0),
    ('\'', 191.0),
    ('(', 333.0),
    (')', 333.0),
    ('*', 389.0),
    ('+', 584.0),
    (',', 278.0),
    ('-', 333.0),
    ('.', 278.0),
    ('/', 278.0),
    (':', 278.0),
    (';', 278.0),
    ('<', 584.0),
    ('=', 584.0),
    ('>', 584.0),
    ('?', 556.0),
    ('@', 1015.0),
    ('A', 667.0),
    ('B', 667.0),
    ('C', 722.0),
    ('D', 722.0),
    ('E', 667.0),
    ('F', 611.0),
    ('G', 778.0),
    ('H', 722.0),
    ('I', 278.0),
    ('J', 500.0),
    ('K', 667.0),
    ('L', 556.0),
    ('M', 833.0),
    ('N', 722.0),
    ('O', 778.0),
    ('P', 667.0),
    ('Q', 778.0),
    ('R', 722.0),
    ('S', 667.0),
    ('T', 611.0),
    ('U', 722.0),
    ('V', 667.0),
    ('W', 944.0),
    ('X', 667.0),
    ('Y', 667.0),
    ('Z', 611.0),
    ('[', 278.0),
    (']', 278.0),
    ('_', 556.0),
    ('a', 556.0),
    ('b', 556.0),
    ('c', 500.0),
    ('d', 556.0),
    ('e', 556.0),
    ('f', 278.0),
    ('g', 556.0),
    ('h', 556.0),
    ('i', 222.0),
    ('j', 222.0),
    ('k', 500.0),
    ('l', 222.0),
    ('m', 833.0),
    ('n', 556.0),
    ('o', 556.0),
    ('p', 556.0),
    ('q', 556.0),
    ('r', 333.0),
    ('s', 500.0),
    ('t', 278.0),
    ('u', 556.0),
    ('v', 500.0),
    ('w', 722.0),
    ('x', 500.0),
    ('y', 500.0),
    ('z', 500.0),
];

/// Per-character advance table.
///
/// Characters absent from the table measure as `default_advance`. A table
/// without a default is strict: measuring an unknown character fails with
/// [`MeasureError::MissingGlyph`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdvanceTable {
    advances: HashMap<char, f32>,
    default_advance: Option<f32>,
}

/// On-disk form of an [`AdvanceTable`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvanceTableFile {
    pub default_advance: Option<f32>,
    /// Single-character keys mapped to advances.
    pub advances: BTreeMap<String, f32>,
}

impl AdvanceTable {
    pub fn new(default_advance: Option<f32>) -> Self {
        Self {
            advances: HashMap::new(),
            default_advance,
        }
    }

    /// Every character advances by `advance`.
    pub fn monospace(advance: f32) -> Self {
        Self::new(Some(advance))
    }

    /// Approximate proportional sans-serif metrics. Characters outside ASCII
    /// use the average lowercase advance.
    pub fn sans() -> Self {
        let mut table = Self::new(Some(556.0));
        for &(ch, advance) in SANS_ASCII_ADVANCES {
            table.advances.insert(ch, advance);
        }
        for digit in '0'..='9' {
            table.advances.insert(digit, 556.0);
        }
        table
    }

    pub fn with_advance(mut self, ch: char, advance: f32) -> Self {
        self.advances.insert(ch, advance);
        self
    }

    /// Multiply every advance, e.g. to approximate a bold cut.
    pub fn scaled(mut self, factor: f32) -> Self {
        for advance in self.advances.values_mut() {
            *advance *= factor;
        }
        self.default_advance = self.default_advance.map(|a| a * factor);
        self
    }

    pub fn is_strict(&self) -> bool {
        self.default_advance.is_none()
    }

    pub fn from_file(file: AdvanceTableFile) -> Result<Self, MeasureError> {
        let mut table = Self::new(file.default_advance);
        for (key, advance) in file.advances {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err(MeasureError::Unavailable {
                    reason: format!("advance key '{}' is not a single character", key),
                });
            };
            if !advance.is_finite() || advance < 0.0 {
                return Err(MeasureError::Unavailable {
                    reason: format!("advance for '{}' is invalid ({})", key, advance),
                });
            }
            table.advances.insert(ch, advance);
        }
        Ok(table)
    }

    /// Read advances from a TrueType or OpenType face.
    ///
    /// Every character the face's Unicode `cmap` maps to a glyph gets that
    /// glyph's `hmtx` advance, scaled to thousandths of an em. The table is
    /// strict, so characters without a glyph fail with
    /// [`MeasureError::MissingGlyph`].
    pub fn from_face(data: &[u8], index: u32) -> Result<Self, MeasureError> {
        let face = ttf_parser::Face::parse(data, index).map_err(|err| {
            MeasureError::Unavailable {
                reason: format!("font face does not parse: {}", err),
            }
        })?;
        let units_per_em = f32::from(face.units_per_em());
        let cmap = face.tables().cmap.ok_or_else(|| MeasureError::Unavailable {
            reason: "font face has no cmap table".to_string(),
        })?;

        let mut table = Self::new(None);
        for subtable in cmap.subtables {
            if !subtable.is_unicode() {
                continue;
            }
            subtable.codepoints(|codepoint| {
                let Some(ch) = char::from_u32(codepoint) else {
                    return;
                };
                let advance = face
                    .glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph));
                if let Some(advance) = advance {
                    table
                        .advances
                        .insert(ch, f32::from(advance) * 1_000.0 / units_per_em);
                }
            });
        }
        if table.advances.is_empty() {
            return Err(MeasureError::Unavailable {
                reason: "font face maps no Unicode characters".to_string(),
            });
        }
        log::debug!(
            "read {} advances from font face (units_per_em={})",
            table.advances.len(),
            units_per_em
        );
        Ok(table)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, MeasureError> {
        let file: AdvanceTableFile =
            serde_json::from_slice(bytes).map_err(|err| MeasureError::Unavailable {
                reason: format!("metrics table is not valid JSON: {}", err),
            })?;
        Self::from_file(file)
    }

    pub fn to_file(&self) -> AdvanceTableFile {
        AdvanceTableFile {
            default_advance: self.default_advance,
            advances: self
                .advances
                .iter()
                .map(|(ch, advance)| (ch.to_string(), *advance))
                .collect(),
        }
    }
}

impl FontMetrics for AdvanceTable {
    fn string_width(&self, text: &str) -> Result<f32, MeasureError> {
        let mut width = 0.0;
        for ch in text.chars() {
            width += match self.advances.get(&ch) {
                Some(advance) => *advance,
                None => self
                    .default_advance
                    .ok_or(MeasureError::MissingGlyph { ch })?,
            };
        }
        Ok(width)
    }
}

/// A loaded font: family name, raw bytes for backends that embed the face,
/// and the metrics the layout engine measures with.
#[derive(Clone)]
pub struct FontResource {
    pub family: String,
    pub data: Arc<[u8]>,
    metrics: Arc<dyn FontMetrics>,
}

impl core::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontResource")
            .field("family", &self.family)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FontResource {
    pub fn new(family: impl Into<String>, metrics: Arc<dyn FontMetrics>) -> Self {
        Self {
            family: family.into(),
            data: Arc::from(Vec::new()),
            metrics,
        }
    }

    /// Attach the font file bytes.
    pub fn with_data(mut self, data: impl Into<Arc<[u8]>>) -> Self {
        self.data = data.into();
        self
    }

    pub fn metrics(&self) -> &dyn FontMetrics {
        self.metrics.as_ref()
    }

    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }
}

/// One font per [`TextStyle`].
#[derive(Clone, Debug, Default)]
pub struct FontSet {
    slots: [Option<FontResource>; 3],
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sans-serif approximation for all three styles, without font bytes.
    pub fn approximate_sans() -> Self {
        let regular: Arc<dyn FontMetrics> = Arc::new(AdvanceTable::sans());
        let bold: Arc<dyn FontMetrics> = Arc::new(AdvanceTable::sans().scaled(1.06));
        Self::new()
            .with(TextStyle::Bold, FontResource::new("sans-serif", bold))
            .with(
                TextStyle::Italic,
                FontResource::new("sans-serif", regular.clone()),
            )
            .with(TextStyle::Regular, FontResource::new("sans-serif", regular))
    }

    pub fn with(mut self, style: TextStyle, font: FontResource) -> Self {
        self.insert(style, font);
        self
    }

    pub fn insert(&mut self, style: TextStyle, font: FontResource) {
        self.slots[style.slot()] = Some(font);
    }

    pub fn get(&self, style: TextStyle) -> Option<&FontResource> {
        self.slots[style.slot()].as_ref()
    }

    pub fn metrics(&self, style: TextStyle) -> Option<&dyn FontMetrics> {
        self.get(style).map(FontResource::metrics)
    }

    pub fn missing_styles(&self) -> Vec<TextStyle> {
        TextStyle::ALL
            .into_iter()
            .filter(|style| self.get(*style).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}
