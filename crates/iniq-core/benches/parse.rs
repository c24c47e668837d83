use criterion::{black_box, criterion_group, criterion_main, Criterion};

use iniq_core::{evaluate, parse_str, Expression, LineReader};

fn generated_document(sections: usize, keys: usize) -> String {
    let mut text = String::new();
    for s in 0..sections {
        text.push_str(&format!("; section {}\n[section-{}]\n", s, s));
        for k in 0..keys {
            text.push_str(&format!("  key-{} = value {} of {}\n", k, k, s));
        }
        text.push('\n');
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let text = generated_document(200, 50);
    c.bench_function("parse 10k assignments", |b| {
        b.iter(|| parse_str(black_box(&text)).unwrap())
    });

    let long = format!("[big]\nkey = {}\n", "x".repeat(1 << 20));
    c.bench_function("read one 1MiB line", |b| {
        b.iter(|| {
            let reader = LineReader::new(black_box(long.as_bytes()));
            reader.count()
        })
    });
}

fn bench_lookup(c: &mut Criterion) {
    let mut text = generated_document(200, 50);
    text.push_str("[calc]\na = 123456\nb = 789\n");
    let doc = parse_str(&text).unwrap();
    let expr: Expression = "calc.a / calc.b".parse().unwrap();

    c.bench_function("evaluate division", |b| {
        b.iter(|| evaluate(black_box(&doc), black_box(&expr)).unwrap())
    });
}

criterion_group!(benches, bench_parse, bench_lookup);
criterion_main!(benches);
