use criterion::{black_box, criterion_group, criterion_main, Criterion};
use injsig::{detect_sqli, detect_xss};

fn bench_sqli(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqli");

    let cases = [
        ("tautology", "1 OR 1=1"),
        ("quoted_breakout", "1' OR '1'='1"),
        ("union_probe", "1 UNION SELECT password FROM users"),
        ("stacked_query", "'; DROP TABLE users --"),
        ("comment_truncation", "admin'--"),
        ("time_based", "1' AND SLEEP(5)--"),
        ("benign_phrase", "sexy and 17"),
        ("benign_sentence", "it's a nice day today"),
    ];

    for (name, input) in cases {
        group.bench_function(name, |b| {
            b.iter(|| black_box(detect_sqli(black_box(input.as_bytes()))))
        });
    }

    group.finish();
}

fn bench_sqli_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqli_input_sizes");

    for size in [16usize, 64, 256, 1024, 4096] {
        let mut input = String::from("1' OR '1'='1");
        while input.len() < size {
            input.push_str(" AND col='val'");
        }
        input.truncate(size);

        group.bench_function(format!("bytes_{size}"), |b| {
            b.iter(|| black_box(detect_sqli(black_box(input.as_bytes()))))
        });
    }

    group.finish();
}

fn bench_xss(c: &mut Criterion) {
    let mut group = c.benchmark_group("xss");

    let cases = [
        ("script_tag", "<script>alert(1)</script>"),
        ("event_handler", "<img src=x onerror=alert(1)>"),
        ("url_protocol", "<a href='javascript:alert(1)'>"),
        ("entity_encoded", "<a href='jav&#x61;script:alert(1)'>"),
        ("value_breakout", "x' onerror='alert(1)"),
        ("benign_markup", "<p class='big'>hello world</p>"),
    ];

    for (name, input) in cases {
        group.bench_function(name, |b| {
            b.iter(|| black_box(detect_xss(black_box(input.as_bytes()))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sqli, bench_sqli_sizes, bench_xss);
criterion_main!(benches);
