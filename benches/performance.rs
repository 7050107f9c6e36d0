use std::time::{Duration, Instant};

use wrangle_tui::{
    document::{Document, char_to_byte_idx},
    field::{FieldController, FieldKind, Visibility},
    registry::TokenRegistry,
    render::render_view,
    theme::Theme,
};

/// Timing benchmarks for the prompt editor hot paths
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - Serializing documents with many tokens
/// - Rendering the editable view
/// - Typing and token insertion through the field controller
const SMALL_DOC_LINES: usize = 10;
const MEDIUM_DOC_LINES: usize = 100;
const LARGE_DOC_LINES: usize = 1000;

const ITERATIONS: usize = 100;

const SAMPLE_WORDS: [&str; 12] = [
    "Lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
];

/// Builds a document of `lines` lines with a token every few words.
fn create_test_document(lines: usize, words_per_line: usize) -> Document {
    let mut registry = TokenRegistry::new();
    let mut document = Document::new();
    for line in 0..lines {
        for word in 0..words_per_line {
            let idx = line * words_per_line + word;
            if idx % 7 == 3 {
                let (id, _) = document.insert_token(&mut registry, None);
                if idx % 2 == 0 {
                    document.set_token_options(
                        id,
                        Some("Colors".into()),
                        vec!["Red".into(), "Gr{ee}n".into()],
                    );
                }
            }
            let caret = document.len();
            document.insert_text(caret, SAMPLE_WORDS[idx % SAMPLE_WORDS.len()]);
            let caret = document.len();
            document.insert_text(caret, " ");
        }
        let caret = document.len();
        document.insert_text(caret, "\n");
    }
    document
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);

        if self.avg_duration.as_millis() > 16 {
            println!("\nWARNING: average above one frame (16ms)");
        }
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    for _ in 0..10 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = durations.iter().min().copied().unwrap_or_default();
    let max_duration = durations.iter().max().copied().unwrap_or_default();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

fn sized_documents() -> Vec<(&'static str, Document)> {
    vec![
        ("Small (10 lines)", create_test_document(SMALL_DOC_LINES, 12)),
        ("Medium (100 lines)", create_test_document(MEDIUM_DOC_LINES, 12)),
        ("Large (1000 lines)", create_test_document(LARGE_DOC_LINES, 12)),
    ]
}

#[test]
fn bench_serialization() {
    println!("\n\n=== SERIALIZATION ===");
    for (name, document) in sized_documents() {
        let result = benchmark(&format!("serialize - {name}"), ITERATIONS, || {
            let _ = document.serialize();
        });
        result.print();
    }
}

#[test]
fn bench_render_view() {
    println!("\n\n=== RENDERING ===");
    let theme = Theme::default();
    for (name, document) in sized_documents() {
        let view = document.editable_view();
        let caret = document.len() / 2;
        let result = benchmark(&format!("render_view - {name}"), ITERATIONS, || {
            let _ = render_view(&view, 80, Some(caret), None, &theme);
        });
        result.print();
    }
}

#[test]
fn bench_typing_in_the_middle() {
    println!("\n\n=== TYPING ===");
    for (name, document) in sized_documents() {
        let text = document.plain_text();
        let mut field = FieldController::new(FieldKind::Input, &text, Visibility::Open);
        field.set_caret(field.document().len() / 2);
        let result = benchmark(&format!("insert_char - {name}"), ITERATIONS, || {
            field.insert_char('x');
        });
        result.print();
    }
}

#[test]
fn bench_token_insertion_with_history() {
    println!("\n\n=== TOKEN INSERTION ===");
    for (name, document) in sized_documents() {
        let text = document.plain_text();
        let mut field = FieldController::new(FieldKind::Input, &text, Visibility::Open);
        let result = benchmark(&format!("insert_token + undo - {name}"), ITERATIONS, || {
            field.set_caret(field.document().len() / 3);
            field.insert_token();
            field.undo();
        });
        result.print();
    }
}

#[test]
fn bench_char_to_byte_conversion() {
    println!("\n\n=== CHAR-TO-BYTE ===");
    let samples = [
        ("ASCII (5000 chars)", "a".repeat(5000)),
        ("Unicode (500 chars)", "\u{1f525}".repeat(500)),
    ];
    for (name, text) in samples {
        let mid_point = text.chars().count() / 2;
        let result = benchmark(&format!("char_to_byte_idx - {name}"), ITERATIONS * 10, || {
            let _ = char_to_byte_idx(&text, mid_point);
        });
        result.print();
    }
}
