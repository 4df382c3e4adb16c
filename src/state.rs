//! Per-attempt recognition state.
//!
//! One `State` exists per in-flight recognition attempt: it owns the growing
//! byte buffer, the consumed-bytes cursor, frame-length bookkeeping, and the
//! fields decoded so far. Leaf and guard operations are the only mutators;
//! combinators never touch it. The compiled operator graph is immutable and
//! shared read-only across attempts, each with its own `State`.

use crate::decision::Decision;
use crate::field::DecodedField;

/// State of one recognition attempt.
///
/// Created when a candidate grammar begins testing a stream, discarded on
/// `Drop`, handed to the consumer on `Emit`. The buffer is append-only: bytes
/// already consumed (below [`State::offset`]) are never mutated.
#[derive(Debug, Clone, Default)]
pub struct State {
    buffer: Vec<u8>,
    offset: usize,
    declared_length: Option<usize>,
    max_length: Option<usize>,
    fields: Vec<DecodedField>,
    decision: Decision,
}

impl State {
    pub fn new() -> Self {
        State::default()
    }

    /// Start an attempt with bytes already on hand.
    pub fn with_bytes(bytes: &[u8]) -> Self {
        let mut state = State::default();
        state.feed(bytes);
        state
    }

    /// Append newly received octets. This is the only way the buffer grows.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// The full received buffer, consumed prefix included.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Count of buffer bytes already consumed by matched nodes.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The unconsumed tail of the buffer.
    pub fn remaining(&self) -> &[u8] {
        &self.buffer[self.offset..]
    }

    /// Advance the cursor past `n` consumed bytes. The cursor is monotone and
    /// never exceeds the buffer length.
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(self.offset + n <= self.buffer.len());
        self.offset += n;
    }

    /// Bytes consumed so far; the length guards compare this against the
    /// declared and maximum frame lengths.
    pub fn current_length(&self) -> usize {
        self.offset
    }

    pub fn declared_length(&self) -> Option<usize> {
        self.declared_length
    }

    /// Record the frame length declared by a length field. First write wins;
    /// the declared length is set at most once per attempt.
    pub(crate) fn declare_length(&mut self, len: usize) {
        self.declared_length.get_or_insert(len);
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub(crate) fn set_max_length(&mut self, len: usize) {
        self.max_length = Some(len);
    }

    /// Decoded fields in wire order.
    pub fn fields(&self) -> &[DecodedField] {
        &self.fields
    }

    pub(crate) fn push_field(&mut self, field: DecodedField) {
        self.fields.push(field);
    }

    /// The attempt's current top-level decision, as of the last operation
    /// evaluated against this state.
    pub fn decision(&self) -> Decision {
        self.decision
    }

    pub(crate) fn set_decision(&mut self, decision: Decision) {
        self.decision = decision;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_length_first_write_wins() {
        let mut state = State::new();
        assert_eq!(state.declared_length(), None);
        state.declare_length(10);
        state.declare_length(99);
        assert_eq!(state.declared_length(), Some(10));
    }

    #[test]
    fn feed_grows_buffer_without_moving_cursor() {
        let mut state = State::with_bytes(b"ab");
        state.advance(2);
        state.feed(b"cd");
        assert_eq!(state.offset(), 2);
        assert_eq!(state.buffer(), b"abcd");
        assert_eq!(state.remaining(), b"cd");
    }
}
