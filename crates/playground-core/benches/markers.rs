use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use playground_core::{
    ColumnUnits, ConfigState, Diagnostic, LineColumn, MarkerOptions, SourceText, Span,
    ToggleSchema, to_markers, to_markers_in,
};
use std::rc::Rc;

fn large_source(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 48);
    for i in 0..line_count {
        out.push_str(&format!(
            "n{i:05} = source_iter(0..10) -> map(|x| (x, \"👋\")) -> null();\n"
        ));
    }
    out.pop();
    out
}

fn diagnostics(count: usize, line_count: usize) -> Vec<Diagnostic> {
    (0..count)
        .map(|i| {
            let line = i % line_count + 1;
            let start = LineColumn::new(line, 8);
            if i % 10 == 0 {
                Diagnostic::warning(Span::to_end_of_document(start), "unused")
            } else {
                Diagnostic::error(Span::new(start, LineColumn::new(line, 40)), "mismatched types")
            }
        })
        .collect()
}

fn bench_to_markers(c: &mut Criterion) {
    let diags = diagnostics(1_000, 5_000);
    c.bench_function("to_markers/1k_diagnostics", |b| {
        b.iter(|| black_box(to_markers(black_box(&diags), 5_000)))
    });
}

fn bench_to_markers_utf16(c: &mut Criterion) {
    let source = SourceText::new(&large_source(5_000));
    let diags = diagnostics(1_000, 5_000);
    let options = MarkerOptions {
        column_units: ColumnUnits::Utf16,
    };
    c.bench_function("to_markers_in/utf16_1k_diagnostics", |b| {
        b.iter(|| black_box(to_markers_in(black_box(&diags), &source, options)))
    });
}

fn bench_toggle_flips(c: &mut Criterion) {
    let schema = Rc::new(ToggleSchema::write_config());
    c.bench_function("config_state/100_toggles", |b| {
        b.iter_batched(
            || ConfigState::new(Rc::clone(&schema)),
            |mut state| {
                for _ in 0..100 {
                    let values = state.toggle("no_references").unwrap();
                    black_box(values);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_to_markers,
    bench_to_markers_utf16,
    bench_toggle_flips
);
criterion_main!(benches);
