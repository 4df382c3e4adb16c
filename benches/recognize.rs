//! Benchmark: recognize framed messages end-to-end, whole-buffer versus
//! byte-at-a-time incremental feeding, plus the graph-construction cost.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use protosniff::{
    encode_uvarint, Decision, FieldSpec, FieldType, Graph, Op, Recognizer,
};

fn message_grammar() -> Graph {
    let mut graph = Graph::new();
    let magic = graph.leaf(Op::Literal(b"SN".to_vec()));
    let len = graph
        .add(Op::Field(FieldSpec::length("len", FieldType::U8)), &[magic])
        .expect("children exist");
    let name = graph
        .add(Op::Field(FieldSpec::new("name", FieldType::CString)), &[len])
        .expect("children exist");
    let value = graph
        .add(Op::Field(FieldSpec::new("value", FieldType::VarUint)), &[name])
        .expect("children exist");
    let gate = graph.add(Op::CheckLength, &[value]).expect("children exist");
    let root = graph
        .add(Op::Sequence, &[magic, len, name, value, gate])
        .expect("children exist");
    graph.set_root(root).expect("root exists");
    graph
}

fn encode_message(name: &str, value: u64) -> Vec<u8> {
    let mut varint = Vec::new();
    encode_uvarint(value, &mut varint);
    let total = 2 + 1 + name.len() + 1 + varint.len();
    let mut wire = b"SN".to_vec();
    wire.push(total as u8);
    wire.extend_from_slice(name.as_bytes());
    wire.push(0);
    wire.extend_from_slice(&varint);
    wire
}

fn bench_recognize(c: &mut Criterion) {
    let graph = message_grammar();
    let wire = encode_message("telemetry_channel_7", u64::from(u32::MAX));

    c.bench_function("recognize_whole_buffer", |b| {
        b.iter(|| {
            let mut attempt = Recognizer::new(&graph).expect("graph has root");
            let decision = attempt.push(black_box(&wire));
            assert_eq!(decision, Decision::Emit);
            black_box(attempt.state().fields().len())
        })
    });

    c.bench_function("recognize_byte_at_a_time", |b| {
        b.iter(|| {
            let mut attempt = Recognizer::new(&graph).expect("graph has root");
            let mut decision = Decision::Continue;
            for &byte in wire.iter() {
                decision = attempt.push(black_box(&[byte]));
                if decision.is_terminal() {
                    break;
                }
            }
            assert_eq!(decision, Decision::Emit);
            black_box(attempt.state().offset())
        })
    });

    c.bench_function("compile_grammar", |b| {
        b.iter(|| black_box(message_grammar().len()))
    });
}

criterion_group!(benches, bench_recognize);
criterion_main!(benches);
