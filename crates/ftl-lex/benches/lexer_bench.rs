//! Lexer benchmarks.
//!
//! Run with: `cargo bench --package ftl-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ftl_lex::tokenize;

fn bench_lexer_simple(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let source = "greeting = Hello, world!\nfarewell = Goodbye!\n";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("simple_messages", |b| {
        b.iter(|| tokenize(black_box(source)).len())
    });

    group.finish();
}

fn bench_lexer_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_complex");

    // Multi-line patterns, selects, terms and string literals in one file.
    let source = r#"
-brand = Acme
welcome = Welcome to {-brand}!
status = It's a { $kind ->
    [fox] fox
    {"\n "}yip
    *[turtle] turtle
    {"\n "}plod
}!
about = First line
    second line
    third line
    .title = About {-brand}
"#;
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("mixed_entries", |b| {
        b.iter(|| tokenize(black_box(source)).len())
    });

    group.finish();
}

criterion_group!(benches, bench_lexer_simple, bench_lexer_complex);
criterion_main!(benches);
