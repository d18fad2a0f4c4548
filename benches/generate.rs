//! Benchmark: parse + emit over a synthetic draft with many message blocks, prose between them.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use draftgen::{generate, AliasTable, Assembler, Config, CppBackend};

fn synthetic_draft(messages: usize) -> String {
    let mut text = String::new();
    for i in 0..messages {
        text.push_str(&format!(
            "\n{i}.1.  MESSAGE_{i}\n\nSome prose describing message {i}.\n\n\
MESSAGE_{i} Message {{\n  Type (i) = {i:#x},\n  Length (16),\n  Subscribe ID (i),\n  \
Track Namespace (tuple),\n  Track Name Length (i),\n  Track Name (..),\n  \
[Start Group (i),\n   Start Object (i)]\n  Number of Parameters (i),\n  \
Parameters (Parameter) ...,\n}}\n"
        ));
    }
    text
}

fn bench_generate(c: &mut Criterion) {
    let draft = synthetic_draft(200);
    let config = Config::default();
    let backend = CppBackend::new(config.cpp.clone());

    c.bench_function("parse_messages", |b| {
        b.iter(|| {
            let mut assembler = Assembler::new(config.resolver());
            let outcome = assembler.parse_messages(black_box(&draft)).expect("parse");
            black_box(AliasTable::aggregate(&outcome.messages, &config.discards));
        })
    });

    c.bench_function("generate", |b| {
        b.iter(|| {
            let g = generate(black_box(&draft), &config, &backend, "ctrl_messages").expect("generate");
            black_box(g.artifacts);
        })
    });
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
