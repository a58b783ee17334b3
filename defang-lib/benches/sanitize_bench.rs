extern crate criterion;

use criterion::{criterion_group, criterion_main, Criterion};

use defang_lib::{Sanitizer, SanitizerConfig};

fn sanitizer() -> Sanitizer {
    Sanitizer::new(SanitizerConfig::default()).unwrap()
}

fn bench_large_document(c: &mut Criterion) {
    let mut big_html = String::with_capacity(2_000_000);
    big_html.push_str("<html><body><div id=\"wrap\">");
    for i in 0..20_000 {
        big_html.push_str(&format!(
            "<p class=\"row r{i}\" style=\"color: red; cursor: pointer\">Test <a href=\"https://example.com/{i}\">link</a></p>"
        ));
    }
    big_html.push_str("</div></body></html>");

    let sanitizer = sanitizer();
    c.bench_function("large_document", |b| {
        b.iter(|| sanitizer.sanitize(&big_html).to_html())
    });
}

fn bench_style_heavy(c: &mut Criterion) {
    let mut css = String::new();
    for i in 0..2_000 {
        css.push_str(&format!(
            ".c{i} > #n{i}, body .x{i}:hover {{ color: red; position: fixed; margin: {i}px }}\n"
        ));
        if i % 50 == 0 {
            css.push_str(&format!(
                "@media print {{ .c{i} {{ display: none }} }}\n@keyframes k{i} {{ from {{ opacity: 0 }} to {{ opacity: 1 }} }}\n"
            ));
        }
    }
    let html = format!("<html><head><style>{css}</style></head><body><p class=\"c1\">x</p></body></html>");

    let sanitizer = sanitizer();
    c.bench_function("style_heavy", |b| {
        b.iter(|| sanitizer.sanitize(&html).to_html())
    });
}

criterion_group!(benches, bench_large_document, bench_style_heavy);
criterion_main!(benches);
