use core::fmt;

use serde::{Deserialize, Serialize};

/// Style class of a text run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Bold,
    Italic,
    Regular,
}

impl TextStyle {
    /// Every style, in font preload order.
    pub const ALL: [TextStyle; 3] = [Self::Bold, Self::Italic, Self::Regular];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Regular => "regular",
        }
    }

    /// Index of the style in per-style `[_; 3]` tables, matching [`Self::ALL`].
    pub fn slot(self) -> usize {
        match self {
            Self::Bold => 0,
            Self::Italic => 1,
            Self::Regular => 2,
        }
    }
}

impl fmt::Display for TextStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic formatted fragment fed to the layout engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub style: TextStyle,
    /// End the current line once the run is placed.
    pub force_break_after: bool,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
            force_break_after: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::Bold)
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::Italic)
    }

    pub fn regular(text: impl Into<String>) -> Self {
        Self::new(text, TextStyle::Regular)
    }

    pub fn with_break_after(mut self) -> Self {
        self.force_break_after = true;
        self
    }
}

/// Page geometry for one document section, in points.
///
/// Vertical positions grow upwards from the bottom edge of the page, so the
/// first baseline sits at `page_height - margin_top` and a column is full
/// once the cursor reaches `margin_bottom`. The right margin mirrors
/// `margin_left`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub margin_left: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub column_count: u8,
    pub column_spacing: f32,
    pub leading: f32,
    pub font_size: f32,
    pub page_width: f32,
    pub page_height: f32,
}

impl PageGeometry {
    /// US Letter width in points.
    pub const LETTER_WIDTH: f32 = 612.0;
    /// US Letter height in points.
    pub const LETTER_HEIGHT: f32 = 792.0;

    /// Single-column geometry for a heading set in `font_size`.
    pub fn title(font_size: f32, margin: f32) -> Self {
        Self {
            margin_left: margin,
            margin_top: margin,
            margin_bottom: margin,
            column_count: 1,
            column_spacing: 0.0,
            leading: 1.5 * font_size,
            font_size,
            ..Self::default()
        }
    }

    /// Multi-column body geometry on a Letter page.
    pub fn body(column_count: u8, font_size: f32, leading: f32) -> Self {
        Self {
            column_count,
            font_size,
            leading,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        let fields = [
            ("margin_left", self.margin_left),
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("column_spacing", self.column_spacing),
            ("leading", self.leading),
            ("font_size", self.font_size),
            ("page_width", self.page_width),
            ("page_height", self.page_height),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(GeometryError::NonFinite { field });
            }
        }
        if self.column_count < 1 {
            return Err(GeometryError::ColumnCount {
                value: self.column_count,
            });
        }
        for (field, value) in [
            ("margin_left", self.margin_left),
            ("margin_top", self.margin_top),
            ("margin_bottom", self.margin_bottom),
            ("column_spacing", self.column_spacing),
        ] {
            if value < 0.0 {
                return Err(GeometryError::Negative { field, value });
            }
        }
        for (field, value) in [
            ("leading", self.leading),
            ("font_size", self.font_size),
            ("page_width", self.page_width),
            ("page_height", self.page_height),
        ] {
            if value <= 0.0 {
                return Err(GeometryError::NonPositive { field, value });
            }
        }
        if self.column_width() <= 0.0 {
            return Err(GeometryError::EmptyContentArea {
                axis: "horizontal",
                extent: self.column_width(),
            });
        }
        if self.top() <= self.margin_bottom {
            return Err(GeometryError::EmptyContentArea {
                axis: "vertical",
                extent: self.top() - self.margin_bottom,
            });
        }
        Ok(())
    }

    /// Width of one column in points.
    pub fn column_width(&self) -> f32 {
        let columns = f32::from(self.column_count.max(1));
        let gaps = f32::from(self.column_count.saturating_sub(1));
        (self.page_width - 2.0 * self.margin_left - self.column_spacing * gaps) / columns
    }

    /// Line width budget in thousandths of an em at `font_size`.
    pub fn border(&self) -> f32 {
        self.column_width() * 1_000.0 / self.font_size
    }

    /// Baseline of the first line of every column.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin_top
    }

    /// Left edge of the 1-based `column`.
    pub fn column_origin_x(&self, column: u8) -> f32 {
        let index = f32::from(column.max(1) - 1);
        self.margin_left + index * (self.column_width() + self.column_spacing)
    }

    /// Convert a width in thousandths of an em to points.
    pub fn units_to_points(&self, units: f32) -> f32 {
        units * self.font_size / 1_000.0
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            margin_left: 60.0,
            margin_top: 60.0,
            margin_bottom: 60.0,
            column_count: 2,
            column_spacing: 20.0,
            leading: 18.0,
            font_size: 12.0,
            page_width: Self::LETTER_WIDTH,
            page_height: Self::LETTER_HEIGHT,
        }
    }
}

/// Rejected page geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometryError {
    ColumnCount { value: u8 },
    Negative { field: &'static str, value: f32 },
    NonPositive { field: &'static str, value: f32 },
    NonFinite { field: &'static str },
    EmptyContentArea { axis: &'static str, extent: f32 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnCount { value } => {
                write!(f, "column_count must be at least 1 (got {})", value)
            }
            Self::Negative { field, value } => {
                write!(f, "{} must not be negative (got {})", field, value)
            }
            Self::NonPositive { field, value } => {
                write!(f, "{} must be positive (got {})", field, value)
            }
            Self::NonFinite { field } => write!(f, "{} must be finite", field),
            Self::EmptyContentArea { axis, extent } => write!(
                f,
                "margins leave no {} room for text (extent={})",
                axis, extent
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Mutable position of the layout engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutCursor {
    /// 1-based column index.
    pub column: u8,
    /// Baseline of the current line.
    pub vertical_position: f32,
    /// Width consumed on the current line, in thousandths of an em.
    pub accumulated_line_width: f32,
}

impl LayoutCursor {
    pub(crate) fn at_top(geometry: &PageGeometry) -> Self {
        Self {
            column: 1,
            vertical_position: geometry.top(),
            accumulated_line_width: 0.0,
        }
    }
}

/// Abstract draw/advance command emitted by the layout engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutCommand {
    /// Show `token` followed by a space at the current position.
    ShowText { token: String, style: TextStyle },
    /// Move to the start of the next line in the same column.
    AdvanceLine,
    /// Move to the top of the next column on the same page.
    AdvanceColumn,
    /// Start a new page at the top of column 1.
    AdvancePage,
    /// End of the section; no commands follow.
    Closed,
}

impl LayoutCommand {
    pub fn is_advance(&self) -> bool {
        matches!(
            self,
            Self::AdvanceLine | Self::AdvanceColumn | Self::AdvancePage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_slots_follow_preload_order() {
        let slots: Vec<usize> = TextStyle::ALL.iter().map(|s| s.slot()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn default_geometry_is_valid_two_column_letter() {
        let geometry = PageGeometry::default();
        assert_eq!(geometry.validate(), Ok(()));
        assert_eq!(geometry.column_width(), 236.0);
        assert!((geometry.border() - 236.0 * 1000.0 / 12.0).abs() < 1e-3);
        assert_eq!(geometry.top(), 732.0);
        assert_eq!(geometry.column_origin_x(1), 60.0);
        assert_eq!(geometry.column_origin_x(2), 316.0);
    }

    #[test]
    fn title_geometry_uses_single_column_and_one_and_a_half_leading() {
        let geometry = PageGeometry::title(18.0, 60.0);
        assert_eq!(geometry.column_count, 1);
        assert_eq!(geometry.leading, 27.0);
        assert_eq!(geometry.column_width(), 492.0);
        assert_eq!(geometry.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_malformed_geometry() {
        let zero_columns = PageGeometry {
            column_count: 0,
            ..PageGeometry::default()
        };
        assert_eq!(
            zero_columns.validate(),
            Err(GeometryError::ColumnCount { value: 0 })
        );

        let negative_margin = PageGeometry {
            margin_top: -1.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            negative_margin.validate(),
            Err(GeometryError::Negative {
                field: "margin_top",
                ..
            })
        ));

        let zero_font = PageGeometry {
            font_size: 0.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            zero_font.validate(),
            Err(GeometryError::NonPositive {
                field: "font_size",
                ..
            })
        ));

        let negative_leading = PageGeometry {
            leading: -18.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            negative_leading.validate(),
            Err(GeometryError::NonPositive {
                field: "leading",
                ..
            })
        ));

        let nan_spacing = PageGeometry {
            column_spacing: f32::NAN,
            ..PageGeometry::default()
        };
        assert_eq!(
            nan_spacing.validate(),
            Err(GeometryError::NonFinite {
                field: "column_spacing"
            })
        );
    }

    #[test]
    fn validate_rejects_margins_that_swallow_the_page() {
        let too_wide = PageGeometry {
            margin_left: 400.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            too_wide.validate(),
            Err(GeometryError::EmptyContentArea {
                axis: "horizontal",
                ..
            })
        ));

        let too_tall = PageGeometry {
            margin_top: 400.0,
            margin_bottom: 400.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            too_tall.validate(),
            Err(GeometryError::EmptyContentArea {
                axis: "vertical",
                ..
            })
        ));
    }

    #[test]
    fn geometry_deserializes_with_defaults() {
        let geometry: PageGeometry =
            serde_json::from_str(r#"{"column_count": 3, "font_size": 10}"#).unwrap();
        assert_eq!(geometry.column_count, 3);
        assert_eq!(geometry.font_size, 10.0);
        assert_eq!(geometry.page_width, PageGeometry::LETTER_WIDTH);
    }

    #[test]
    fn styled_run_builders_set_style_and_break() {
        let run = StyledRun::regular("x y").with_break_after();
        assert_eq!(run.style, TextStyle::Regular);
        assert!(run.force_break_after);
        assert!(!StyledRun::bold("w").force_break_after);
    }
}
