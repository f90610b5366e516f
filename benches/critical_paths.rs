//! Criterion benchmarks for the hot paths:
//! - Parser: relaxed-JSON literal splitting and decoding
//! - Color: hex fast path and CSS functional parsing
//! - Renderer: region painting at several sprite sizes
//! - Formatter: canonical re-serialization

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pxl::color::parse_color;
use pxl::fmt::format_pxl;
use pxl::parser::parse;
use pxl::renderer::render_to_rgba;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Generate one sprite covering a size x size grid with 16 colors, one
/// point-list region per token.
fn make_corpus(size: usize) -> String {
    let colors: Vec<String> = (0..16)
        .map(|i| format!("\"t{}\": \"#{:02x}{:02x}{:02x}\"", i, i * 16, i * 8, 255 - i * 16))
        .collect();
    let palette = format!(
        "{{\"type\": \"palette\", \"name\": \"bench\", \"colors\": {{{}}}}}",
        colors.join(", ")
    );

    let mut points: Vec<Vec<String>> = vec![Vec::new(); 16];
    for y in 0..size {
        for x in 0..size {
            points[(x + y) % 16].push(format!("[{}, {}]", x, y));
        }
    }
    let regions: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, pts)| format!("\"t{}\": {{\"points\": [{}]}}", i, pts.join(", ")))
        .collect();
    let sprite = format!(
        "{{\"type\": \"sprite\", \"name\": \"bench_sprite\", \"size\": [{size}, {size}], \
         \"palette\": \"bench\", \"regions\": {{{}}}}}",
        regions.join(", "),
        size = size
    );

    format!("{}\n{}", palette, sprite)
}

/// Generate a corpus of `count` small sprites.
fn make_multi_corpus(count: usize) -> String {
    let mut out = String::from(
        "{\"type\": \"palette\", \"name\": \"p\", \"colors\": {\"x\": \"#ff0000\"}}\n",
    );
    for i in 0..count {
        out.push_str(&format!(
            "{{\"type\": \"sprite\", \"name\": \"s{}\", \"size\": [4, 4], \"palette\": \"p\", \
             \"regions\": {{\"x\": {{\"rect\": [0, 0, 4, 4]}}}}}}\n",
            i
        ));
    }
    out
}

// =============================================================================
// Parser Benchmarks
// =============================================================================

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    for size in [8, 16, 32, 64].iter() {
        let corpus = make_corpus(*size);
        group.throughput(Throughput::Bytes(corpus.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse", format!("{}x{}", size, size)),
            &corpus,
            |b, corpus| b.iter(|| parse(black_box(corpus))),
        );
    }

    for count in [10, 50, 200].iter() {
        let corpus = make_multi_corpus(*count);
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(
            BenchmarkId::new("parse_many_sprites", count),
            &corpus,
            |b, corpus| b.iter(|| parse(black_box(corpus))),
        );
    }

    group.finish();
}

// =============================================================================
// Color Parsing Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    group.bench_function("parse_hex_3", |b| b.iter(|| parse_color(black_box("#f00"))));
    group.bench_function("parse_hex_6", |b| b.iter(|| parse_color(black_box("#ff0000"))));
    group.bench_function("parse_hex_8", |b| b.iter(|| parse_color(black_box("#ff0000ff"))));

    group.bench_function("parse_rgb", |b| {
        b.iter(|| parse_color(black_box("rgb(255, 0, 0)")))
    });
    group.bench_function("parse_hsl", |b| {
        b.iter(|| parse_color(black_box("hsl(0, 100%, 50%)")))
    });
    group.bench_function("parse_named", |b| b.iter(|| parse_color(black_box("red"))));

    let colors = [
        "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff", "#ffffff", "#000000",
        "#f0f0f0", "#0f0f0f", "#123456", "#abcdef", "#fedcba", "#654321", "#aabbcc", "#ccbbaa",
    ];
    group.bench_function("parse_palette_16_hex", |b| {
        b.iter(|| {
            for color in &colors {
                let _ = parse_color(black_box(*color));
            }
        })
    });

    group.finish();
}

// =============================================================================
// Renderer Benchmarks
// =============================================================================

fn bench_renderer(c: &mut Criterion) {
    let mut group = c.benchmark_group("renderer");

    for size in [8, 16, 32, 64, 128].iter() {
        let corpus = make_corpus(*size);
        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(
            BenchmarkId::new("render_to_rgba", format!("{}x{}", size, size)),
            &corpus,
            |b, corpus| b.iter(|| render_to_rgba(black_box(corpus))),
        );
    }

    group.finish();
}

// =============================================================================
// Formatter Benchmarks
// =============================================================================

fn bench_formatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatter");

    for size in [8, 32].iter() {
        let corpus = make_corpus(*size);
        group.throughput(Throughput::Bytes(corpus.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("format", format!("{}x{}", size, size)),
            &corpus,
            |b, corpus| b.iter(|| format_pxl(black_box(corpus))),
        );
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_parser, bench_color, bench_renderer, bench_formatter);
criterion_main!(benches);
