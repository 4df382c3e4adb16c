//! The closed operator set and its single dispatch point.
//!
//! Each operator is a variant of [`Op`] carrying its immutable construction
//! parameters; [`Op::evaluate`] is the one entry point the graph evaluator
//! calls per node per pass. Leaves and guards read and mutate the shared
//! per-attempt [`State`]; the two combinators see only the decisions their
//! direct children produced this pass and never touch `State` buffers.
//!
//! All failure modes travel on the decision channel (see [`Outcome`]):
//! underrun is `Continue`/unsettled, malformed data and protocol violations
//! are `Drop`/settled. No operation blocks, suspends, or performs I/O.

use crate::decision::{Decision, Outcome};
use crate::field::{decode_scalar, DecodedField, FieldKind, FieldSpec, FieldType, FieldValue};
use crate::state::State;
use crate::varint::{decode_ivarint, decode_uvarint, MAX_VARINT_LEN};

/// One operator node of a compiled grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// Match an exact byte sequence at the current offset.
    Literal(Vec<u8>),
    /// Skip exactly N arbitrary bytes.
    Wildcard(usize),
    /// Decode one typed field and record it on the state.
    Field(FieldSpec),
    /// Set the ceiling on permitted frame length.
    SetMaxLength(usize),
    /// Compare consumed length against the declared frame length; the
    /// canonical terminal acceptance gate (`Emit` on exact match).
    CheckLength,
    /// Drop once consumed length exceeds the max-length ceiling.
    CheckMaxLength,
    /// Conjunction over children: fail-fast on any `Drop`.
    Sequence,
    /// Ordered disjunction over children: first `Emit` wins.
    Choice,
}

impl Op {
    /// Evaluate this operator for the current pass.
    ///
    /// `children` holds the outcomes the node's direct children most recently
    /// produced, in child order; leaves and guards ignore it (guards may
    /// still carry child edges purely to express evaluation-order
    /// dependencies). The resulting decision is also recorded as the state's
    /// current top-level decision.
    pub fn evaluate(&self, state: &mut State, children: &[Outcome]) -> Outcome {
        let outcome = match self {
            Op::Literal(pattern) => match_literal(state, pattern),
            Op::Wildcard(count) => match_wildcard(state, *count),
            Op::Field(spec) => decode_field(state, spec),
            Op::SetMaxLength(max) => {
                state.set_max_length(*max);
                Outcome::settled(Decision::Continue)
            }
            Op::CheckLength => check_length(state),
            Op::CheckMaxLength => check_max_length(state),
            Op::Sequence => sequence(children),
            Op::Choice => choice(children),
        };
        state.set_decision(outcome.decision);
        outcome
    }

    /// Whether this operator consumes buffer bytes (advances the state
    /// cursor). The evaluator must hold such a node back until its ordering
    /// dependencies have settled, or it would decode bytes that belong to an
    /// upstream field still waiting for input.
    pub fn advances_cursor(&self) -> bool {
        matches!(self, Op::Literal(_) | Op::Wildcard(_) | Op::Field(_))
    }
}

fn match_literal(state: &mut State, pattern: &[u8]) -> Outcome {
    let avail = state.remaining();
    if avail.len() < pattern.len() {
        return Outcome::need_more();
    }
    if &avail[..pattern.len()] != pattern {
        return Outcome::settled(Decision::Drop);
    }
    state.advance(pattern.len());
    // Matched; the parent decides what that means overall.
    Outcome::settled(Decision::Continue)
}

fn match_wildcard(state: &mut State, count: usize) -> Outcome {
    if state.remaining().len() < count {
        return Outcome::need_more();
    }
    state.advance(count);
    Outcome::settled(Decision::Continue)
}

fn decode_field(state: &mut State, spec: &FieldSpec) -> Outcome {
    let offset = state.offset();
    match spec.ty {
        FieldType::PascalString => {
            let avail = state.remaining();
            let Some(&len) = avail.first() else {
                return Outcome::need_more();
            };
            let total = 1 + len as usize;
            if avail.len() < total {
                return Outcome::need_more();
            }
            let value = latin1(&avail[1..total]);
            record(state, spec, offset, FieldValue::Str(value));
            state.advance(total);
            Outcome::settled(Decision::Continue)
        }
        FieldType::CString => {
            let avail = state.remaining();
            let Some(terminator) = avail.iter().position(|&b| b == 0) else {
                return Outcome::need_more();
            };
            let value = latin1(&avail[..terminator]);
            record(state, spec, offset, FieldValue::Str(value));
            state.advance(terminator + 1);
            Outcome::settled(Decision::Continue)
        }
        FieldType::FixedString => {
            if spec.size == 0 {
                // Construction error, not recoverable at run time.
                return Outcome::settled(Decision::Drop);
            }
            let avail = state.remaining();
            if avail.len() < spec.size {
                return Outcome::need_more();
            }
            let trimmed = strip_zero_padding(&avail[..spec.size]);
            let value = latin1(trimmed);
            record(state, spec, offset, FieldValue::Str(value));
            state.advance(spec.size);
            Outcome::settled(Decision::Continue)
        }
        FieldType::VarUint => match decode_uvarint(state.remaining()) {
            Some((value, consumed)) => {
                record(state, spec, offset, FieldValue::U64(value));
                state.advance(consumed);
                Outcome::settled(Decision::Continue)
            }
            None => varint_stalled(state),
        },
        FieldType::VarInt => match decode_ivarint(state.remaining()) {
            Some((value, consumed)) => {
                record(state, spec, offset, FieldValue::I64(value));
                state.advance(consumed);
                Outcome::settled(Decision::Continue)
            }
            None => varint_stalled(state),
        },
        ty => {
            let Some(size) = ty.fixed_size() else {
                // Every variable-length type is handled above.
                return Outcome::settled(Decision::Drop);
            };
            let avail = state.remaining();
            if avail.len() < size {
                return Outcome::need_more();
            }
            let value = decode_scalar(&avail[..size], ty);
            if spec.kind == FieldKind::Length {
                // Only the unsigned 8/16/32-bit widths declare the frame
                // length; other types decode normally and leave it unset.
                match value {
                    FieldValue::U8(v) => state.declare_length(v as usize),
                    FieldValue::U16(v) => state.declare_length(v as usize),
                    FieldValue::U32(v) => state.declare_length(v as usize),
                    _ => {}
                }
            }
            record(state, spec, offset, value);
            state.advance(size);
            Outcome::settled(Decision::Continue)
        }
    }
}

/// No terminating varint byte within the available window: underrun while
/// fewer than ten bytes are on hand, overlong (malformed) once ten are.
fn varint_stalled(state: &State) -> Outcome {
    if state.remaining().len() >= MAX_VARINT_LEN {
        Outcome::settled(Decision::Drop)
    } else {
        Outcome::need_more()
    }
}

fn check_length(state: &State) -> Outcome {
    // A zero declared length counts as not declared, like the unset case.
    let declared = match state.declared_length() {
        Some(declared) if declared > 0 => declared,
        _ => return Outcome::settled(Decision::Continue),
    };
    let current = state.current_length();
    if current < declared {
        return Outcome::need_more();
    }
    if current > declared {
        return Outcome::settled(Decision::Drop);
    }
    Outcome::settled(Decision::Emit)
}

fn check_max_length(state: &State) -> Outcome {
    match state.max_length() {
        Some(max) if max > 0 && state.current_length() > max => {
            Outcome::settled(Decision::Drop)
        }
        _ => Outcome::settled(Decision::Continue),
    }
}

/// Conjunction: one failing child aborts the whole sequence regardless of its
/// siblings' state. Emission requires at least one emitting child and no
/// child still pending (a matched leaf reports a settled `Continue`, which
/// does not hold the sequence open; an unsettled `Continue` is a child still
/// waiting on bytes and does).
fn sequence(children: &[Outcome]) -> Outcome {
    let mut pending = false;
    let mut emitted = false;
    for child in children {
        match child.decision {
            Decision::Drop => return Outcome::settled(Decision::Drop),
            Decision::Continue => pending = pending || !child.settled,
            Decision::Emit => emitted = true,
        }
    }
    if emitted && !pending {
        return Outcome::settled(Decision::Emit);
    }
    Outcome { decision: Decision::Continue, settled: !pending }
}

/// Ordered disjunction: first success wins and sibling drops are irrelevant
/// noise; as long as one alternative has not dropped, the choice stays open.
/// The aggregation itself never needs a re-run, so it is always settled.
fn choice(children: &[Outcome]) -> Outcome {
    if children.iter().any(|c| c.decision == Decision::Emit) {
        return Outcome::settled(Decision::Emit);
    }
    if children.iter().any(|c| c.decision == Decision::Continue) {
        return Outcome::settled(Decision::Continue);
    }
    Outcome::settled(Decision::Drop)
}

fn record(state: &mut State, spec: &FieldSpec, offset: usize, value: FieldValue) {
    state.push_field(DecodedField { name: spec.name.clone(), offset, ty: spec.ty, value });
}

/// Wire strings are raw octets; map them 1:1 into chars so no byte sequence
/// can fail decoding.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn strip_zero_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}
