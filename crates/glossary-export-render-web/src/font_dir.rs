use std::path::Path;
use std::sync::Arc;

use glossary_export_render::{
    AdvanceTable, BackendError, FontMetrics, FontResource, FontSet, TextStyle,
};

/// Font file extensions probed for each style, in order.
const FONT_EXTENSIONS: [&str; 4] = ["woff2", "woff", "ttf", "otf"];

/// Load one font per style from `dir`.
///
/// Each style looks for `<style>.woff2`, `.woff`, `.ttf` or `.otf`; the
/// first file found is embedded by the HTML backend. When that file is a
/// TrueType or OpenType face, layout measures with its own advances.
/// Otherwise (no file, or a compressed web font) `<style>.json` must hold an
/// advance table in
/// [`AdvanceTableFile`](glossary_export_render::AdvanceTableFile) form. The
/// family name is taken from the directory name.
pub fn load_font_dir(dir: &Path) -> Result<FontSet, BackendError> {
    let family = dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("glossary")
        .to_string();
    let mut fonts = FontSet::new();
    for style in TextStyle::ALL {
        let data = read_font_file(dir, style)?;
        let face_metrics = data.as_deref().and_then(|bytes| {
            AdvanceTable::from_face(bytes, 0)
                .map_err(|err| {
                    log::debug!("{} font in {} not measurable: {}", style, dir.display(), err)
                })
                .ok()
        });
        let table = match face_metrics {
            Some(table) => table,
            None => read_metrics_table(dir, style)?,
        };
        let metrics: Arc<dyn FontMetrics> = Arc::new(table);
        let mut font = FontResource::new(family.clone(), metrics);
        match data {
            Some(bytes) => font = font.with_data(bytes),
            None => log::warn!(
                "no font file for {} style in {}; output will not embed it",
                style,
                dir.display()
            ),
        }
        fonts.insert(style, font);
    }
    Ok(fonts)
}

fn read_font_file(dir: &Path, style: TextStyle) -> Result<Option<Vec<u8>>, BackendError> {
    for ext in FONT_EXTENSIONS {
        let path = dir.join(format!("{}.{}", style, ext));
        if path.is_file() {
            return Ok(Some(std::fs::read(&path)?));
        }
    }
    Ok(None)
}

fn read_metrics_table(dir: &Path, style: TextStyle) -> Result<AdvanceTable, BackendError> {
    let metrics_path = dir.join(format!("{}.json", style));
    let bytes = std::fs::read(&metrics_path).map_err(|err| {
        BackendError::new(format!(
            "unable to read metrics '{}': {}",
            metrics_path.display(),
            err
        ))
    })?;
    AdvanceTable::from_json_slice(&bytes)
        .map_err(|err| BackendError::new(format!("{}: {}", metrics_path.display(), err)))
}
