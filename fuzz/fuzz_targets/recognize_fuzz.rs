//! Recognizer fuzz target: drive a grammar exercising every operator with
//! arbitrary bytes, fed one byte at a time. Recognition must not panic;
//! every input ends in Continue, Drop, or Emit.
//! Build with: cargo fuzz run recognize_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

use protosniff::{FieldSpec, FieldType, Graph, Op, Recognizer};

fn grammar() -> Graph {
    let mut graph = Graph::new();
    let ceiling = graph.leaf(Op::SetMaxLength(64));
    let a = graph.leaf(Op::Literal(b"FZ".to_vec()));
    let b = graph.leaf(Op::Literal(b"fz".to_vec()));
    let magic = graph.add(Op::Choice, &[a, b]).unwrap();
    let len = graph
        .add(Op::Field(FieldSpec::length("len", FieldType::U8)), &[magic])
        .unwrap();
    let name = graph
        .add(Op::Field(FieldSpec::new("name", FieldType::CString)), &[len])
        .unwrap();
    let count = graph
        .add(Op::Field(FieldSpec::new("count", FieldType::VarUint)), &[name])
        .unwrap();
    let delta = graph
        .add(Op::Field(FieldSpec::new("delta", FieldType::VarInt)), &[count])
        .unwrap();
    let tag = graph
        .add(Op::Field(FieldSpec::fixed_string("tag", 4)), &[delta])
        .unwrap();
    let pad = graph.add(Op::Wildcard(1), &[tag]).unwrap();
    let clamp = graph.add(Op::CheckMaxLength, &[pad]).unwrap();
    let gate = graph.add(Op::CheckLength, &[pad]).unwrap();
    let root = graph
        .add(
            Op::Sequence,
            &[ceiling, magic, len, name, count, delta, tag, pad, clamp, gate],
        )
        .unwrap();
    graph.set_root(root).unwrap();
    graph
}

fn run(data: &[u8]) {
    let graph = grammar();
    let mut attempt = match Recognizer::new(&graph) {
        Ok(a) => a,
        Err(_) => return,
    };
    for &byte in data {
        if attempt.push(&[byte]).is_terminal() {
            break;
        }
    }
    // Decoded fields stay readable whatever the verdict was.
    for field in attempt.state().fields() {
        let _ = (field.value.as_u64(), field.value.as_str());
    }
}

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    run(data);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run recognize_fuzz");
}
