use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glossary_export::{ExportRequest, FileFormat, JsonCatalog, LanguageId};
use glossary_export_render::{DocumentOptions, FontSet};
use glossary_export_render_web::{export_document, load_font_dir};

const DEFAULT_OUT_DIR: &str = ".";
const DEFAULT_FORMAT: FileFormat = FileFormat::Html;

#[derive(Clone, Debug)]
struct Args {
    catalog_path: String,
    from_id: LanguageId,
    to_id: LanguageId,
    format: FileFormat,
    file_name: Option<String>,
    out_dir: String,
    columns: Option<u8>,
    font_size: Option<f32>,
    metrics_dir: Option<String>,
    options_path: Option<String>,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let options = document_options(&cli)?;

    let file = std::fs::File::open(&cli.catalog_path)
        .map_err(|e| format!("unable to open catalog '{}': {}", cli.catalog_path, e))?;
    let catalog = JsonCatalog::from_reader(std::io::BufReader::new(file))
        .map_err(|e| format!("{}: {}", cli.catalog_path, e))?;

    let fonts = match &cli.metrics_dir {
        Some(dir) => load_font_dir(Path::new(dir)).map_err(|e| e.to_string())?,
        None => FontSet::approximate_sans(),
    };

    let mut request = ExportRequest::new(cli.from_id, cli.to_id, cli.format);
    if let Some(name) = &cli.file_name {
        request = request.with_file_name(name.clone());
    }
    let attachment =
        export_document(&catalog, &request, &fonts, &options).map_err(|e| e.to_string())?;

    std::fs::create_dir_all(&cli.out_dir).map_err(|e| e.to_string())?;
    let out_path = PathBuf::from(&cli.out_dir).join(&attachment.file_name);
    std::fs::write(&out_path, &attachment.bytes).map_err(|e| e.to_string())?;

    println!(
        "wrote {} ({}, {} bytes)",
        out_path.display(),
        attachment.content_type,
        attachment.bytes.len()
    );
    Ok(())
}

fn document_options(cli: &Args) -> Result<DocumentOptions, String> {
    let mut options = match &cli.options_path {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path, e))?;
            serde_json::from_slice::<DocumentOptions>(&bytes)
                .map_err(|e| format!("invalid options '{}': {}", path, e))?
        }
        None => DocumentOptions::default(),
    };
    if let Some(columns) = cli.columns {
        options.body_geometry.column_count = columns;
    }
    if let Some(font_size) = cli.font_size {
        options.body_geometry.font_size = font_size;
        options.body_geometry.leading = font_size * 1.5;
    }
    Ok(normalized(options))
}

fn normalized(mut options: DocumentOptions) -> DocumentOptions {
    let body = &mut options.body_geometry;
    body.column_count = body.column_count.clamp(1, 6);
    body.font_size = body.font_size.clamp(4.0, 72.0);
    body.leading = body.leading.max(body.font_size);
    let title = &mut options.title_geometry;
    title.font_size = title.font_size.clamp(4.0, 96.0);
    title.leading = title.leading.max(title.font_size);
    options
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }
    let catalog_path = match args.get(1) {
        Some(path) if !path.starts_with("--") => path.clone(),
        _ => return Err("missing catalog path".to_string()),
    };

    let mut cfg = Args {
        catalog_path,
        from_id: 0,
        to_id: 0,
        format: DEFAULT_FORMAT,
        file_name: None,
        out_dir: DEFAULT_OUT_DIR.to_string(),
        columns: None,
        font_size: None,
        metrics_dir: None,
        options_path: None,
    };
    let mut from_id = None;
    let mut to_id = None;

    let mut i = 2usize;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .ok_or_else(|| format!("{} requires a value", flag))
        };
        match flag {
            "--from" => {
                let v = value()?;
                from_id = Some(
                    v.parse::<LanguageId>()
                        .map_err(|_| format!("invalid --from value '{}'", v))?,
                );
            }
            "--to" => {
                let v = value()?;
                to_id = Some(
                    v.parse::<LanguageId>()
                        .map_err(|_| format!("invalid --to value '{}'", v))?,
                );
            }
            "--format" => {
                cfg.format = value()?.parse::<FileFormat>()?;
            }
            "--file-name" => {
                cfg.file_name = Some(value()?.clone());
            }
            "--out-dir" => {
                cfg.out_dir = value()?.clone();
            }
            "--columns" => {
                let v = value()?;
                cfg.columns = Some(
                    v.parse::<u8>()
                        .map_err(|_| format!("invalid --columns value '{}'", v))?,
                );
            }
            "--font-size" => {
                let v = value()?;
                cfg.font_size = Some(
                    v.parse::<f32>()
                        .map_err(|_| format!("invalid --font-size value '{}'", v))?,
                );
            }
            "--metrics-dir" => {
                cfg.metrics_dir = Some(value()?.clone());
            }
            "--options" => {
                cfg.options_path = Some(value()?.clone());
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
        i += 2;
    }

    cfg.from_id = from_id.ok_or_else(|| "--from is required".to_string())?;
    cfg.to_id = to_id.ok_or_else(|| "--to is required".to_string())?;
    if cfg.columns == Some(0) {
        return Err("--columns must be > 0".to_string());
    }
    if cfg.font_size.is_some_and(|size| size.is_nan() || size <= 0.0) {
        return Err("--font-size must be > 0".to_string());
    }
    if cfg.out_dir.is_empty() {
        return Err("--out-dir must not be empty".to_string());
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"glossary-export - compile a bilingual glossary from a JSON catalog

USAGE:
  cargo run -p glossary-export-render-web --bin glossary-export -- <catalog.json> --from <id> --to <id> [options]

OPTIONS:
  --from <id>             source language id (required)
  --to <id>               target language id (required)
  --format <fmt>          tsv|md|html (default: html)
  --file-name <name>      attachment name without extension (default: dictionary)
  --out-dir <dir>         output directory (default: .)
  --columns <n>           body column count, 1-6 (default: 2)
  --font-size <pt>        body font size; leading follows at 1.5x (default: 12)
  --metrics-dir <dir>     directory with bold/italic/regular font files
                          (.woff2/.woff/.ttf/.otf); .ttf/.otf faces are measured
                          directly, otherwise <style>.json advance tables are read
                          (default: built-in sans-serif approximation)
  --options <file>        JSON document options; flags above override it
"#
}
