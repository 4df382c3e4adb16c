//! # protosniff — incremental binary-protocol recognition
//!
//! A small algebra of composable matching/decoding operators (literal match,
//! wildcard skip, typed field decode, length guards, sequence/choice
//! combinators) compiled into a DAG and evaluated against a growing byte
//! buffer, deciding byte-by-byte whether a candidate protocol grammar
//! matches (`Emit`), fails (`Drop`), or needs more input (`Continue`).
//!
//! ## Model
//!
//! - **Outcome**: every operation returns a `(Decision, settled)` pair. An
//!   unsettled `Continue` is the backpressure signal: the node is blocked
//!   purely on buffer length, and the driving loop re-evaluates once more
//!   octets arrive. The engine itself performs no I/O and never blocks.
//! - **State**: one per recognition attempt — append-only buffer, consumed
//!   offset, declared/max frame length, decoded fields in wire order.
//! - **Graph**: operators live in an immutable arena [`Graph`], shareable
//!   read-only across concurrent attempts; each attempt owns a
//!   [`Recognizer`] (state plus per-node outcome memo).
//!
//! ## Operators
//!
//! Literal, wildcard, typed field decode (fixed-width integers with explicit
//! endianness, IEEE floats, Pascal/C/fixed strings, base-128 varints with
//! zig-zag signed mapping), max-length setter, declared-length and max-length
//! guards, and the sequence (fail-fast conjunction) and choice (first-success
//! disjunction) combinators.
//!
//! ## Example
//!
//! ```
//! use protosniff::{Decision, FieldSpec, FieldType, Graph, Op, Recognizer};
//!
//! // magic "AB", u8 frame length, 2 payload bytes, length gate. Child
//! // edges chain each consumer onto its predecessor on the wire.
//! let mut graph = Graph::new();
//! let magic = graph.leaf(Op::Literal(b"AB".to_vec()));
//! let len = graph.add(Op::Field(FieldSpec::length("len", FieldType::U8)), &[magic]).unwrap();
//! let payload = graph.add(Op::Wildcard(2), &[len]).unwrap();
//! let gate = graph.add(Op::CheckLength, &[payload]).unwrap();
//! let root = graph.add(Op::Sequence, &[magic, len, payload, gate]).unwrap();
//! graph.set_root(root).unwrap();
//!
//! let mut attempt = Recognizer::new(&graph).unwrap();
//! assert_eq!(attempt.push(b"AB"), Decision::Continue);
//! assert_eq!(attempt.push(&[5, 0xDE, 0xAD]), Decision::Emit);
//! assert_eq!(attempt.state().offset(), 5);
//! ```

pub mod decision;
pub mod field;
pub mod graph;
pub mod ops;
pub mod state;
pub mod varint;

pub use decision::{Decision, Outcome};
pub use field::{DecodedField, FieldKind, FieldSpec, FieldType, FieldValue};
pub use graph::{Graph, GraphError, NodeId, Recognizer};
pub use ops::Op;
pub use state::State;
pub use varint::{
    decode_ivarint, decode_uvarint, encode_ivarint, encode_uvarint, MAX_VARINT_LEN,
};
