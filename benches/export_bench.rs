use std::hint::black_box;
use std::time::Instant;

use glossary_export::{
    fold, format_gloss, FileFormat, Glossary, PartOfSpeech, TranslationTuple,
};
use glossary_export_render::{DocumentOptions, FontSet, RenderEngine, RowCollector};
use glossary_export_render_web::{HtmlBackend, MarkdownBackend, TsvBackend};

/// (label, distinct source words, tuples per word)
const SIZES: &[(&str, usize, usize)] = &[
    ("small", 200, 2),
    ("medium", 2_000, 3),
    ("large", 10_000, 4),
];

#[derive(Clone, Debug)]
struct CaseResult {
    size: String,
    case: String,
    iterations: usize,
    min_ns: u128,
    median_ns: u128,
    mean_ns: u128,
    max_ns: u128,
    output_units: usize,
}

/// Deterministic tuples: every word gets `per_word` senses spread over
/// two concept groups and all four parts of speech.
fn synthetic_tuples(words: usize, per_word: usize) -> Vec<TranslationTuple> {
    let mut out = Vec::with_capacity(words * per_word);
    for w in 0..words {
        let pos = PartOfSpeech::ALL[w % PartOfSpeech::ALL.len()];
        for s in 0..per_word {
            out.push(TranslationTuple::new(
                format!("word{:05}", w),
                pos,
                format!("перевод{}-{}", w, s),
                ((w * 2 + s % 2) as i64) + 1,
            ));
        }
    }
    out
}

fn run_case<F>(
    size: &str,
    case: &str,
    warmup_iters: usize,
    measure_iters: usize,
    mut op: F,
) -> CaseResult
where
    F: FnMut() -> usize,
{
    for _ in 0..warmup_iters {
        black_box(op());
    }
    let mut samples = Vec::with_capacity(measure_iters);
    let mut output_units = 0;
    for _ in 0..measure_iters {
        let start = Instant::now();
        output_units = black_box(op());
        samples.push(start.elapsed().as_nanos());
    }
    samples.sort_unstable();
    let sum: u128 = samples.iter().copied().sum();
    CaseResult {
        size: size.to_string(),
        case: case.to_string(),
        iterations: measure_iters,
        min_ns: samples[0],
        median_ns: samples[samples.len() / 2],
        mean_ns: sum / samples.len() as u128,
        max_ns: samples[samples.len() - 1],
        output_units,
    }
}

fn render_bytes(glossary: &Glossary, fonts: &FontSet, format: FileFormat) -> usize {
    let engine = RenderEngine::new(DocumentOptions::default());
    let bytes = match format {
        FileFormat::Tsv => engine.render_tabular("English", "Russian", glossary, TsvBackend::new()),
        FileFormat::Markdown => {
            engine.render_tabular("English", "Russian", glossary, MarkdownBackend::new())
        }
        FileFormat::Html => {
            engine.render_flowing("English", "Russian", glossary, fonts, HtmlBackend::new())
        }
    };
    bytes.unwrap_or_else(|e| panic!("render failed: {}", e)).len()
}

fn main() {
    let quick = std::env::args().any(|arg| arg == "--quick");
    let warmup_iters = if quick { 1 } else { 2 };
    let measure_iters = if quick { 3 } else { 10 };

    println!("# glossary-export benchmark");
    println!(
        "# mode={} warmup_iters={} measure_iters={}",
        if quick { "quick" } else { "full" },
        warmup_iters,
        measure_iters
    );
    println!("size,case,iterations,min_ns,median_ns,mean_ns,max_ns,output_units");

    let fonts = FontSet::approximate_sans();
    let mut results = Vec::new();
    for &(label, words, per_word) in SIZES {
        let tuples = synthetic_tuples(words, per_word);
        let glossary = fold(tuples.clone());

        results.push(run_case(label, "aggregate", warmup_iters, measure_iters, || {
            fold(tuples.clone()).len()
        }));
        results.push(run_case(label, "format_glosses", warmup_iters, measure_iters, || {
            glossary.iter().map(|e| format_gloss(&e.values).len()).sum()
        }));
        results.push(run_case(label, "collect_rows", warmup_iters, measure_iters, || {
            RenderEngine::default()
                .render_tabular("English", "Russian", &glossary, RowCollector::default())
                .unwrap_or_else(|e| panic!("render failed: {}", e))
                .rows
                .len()
        }));
        results.push(run_case(label, "layout_commands", warmup_iters, measure_iters, || {
            let document = RenderEngine::default()
                .layout("English", "Russian", &glossary, &fonts)
                .unwrap_or_else(|e| panic!("layout failed: {}", e));
            document.body.commands.len()
        }));
        for format in FileFormat::ALL {
            let case = format!("export_{}", format.tag());
            results.push(run_case(label, &case, warmup_iters, measure_iters, || {
                render_bytes(&glossary, &fonts, format)
            }));
        }
    }

    for result in &results {
        println!(
            "{},{},{},{},{},{},{},{}",
            result.size,
            result.case,
            result.iterations,
            result.min_ns,
            result.median_ns,
            result.mean_ns,
            result.max_ns,
            result.output_units
        );
    }
}
