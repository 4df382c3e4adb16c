//! Tri-state decisions and the (decision, settled) outcome pair.
//!
//! Every operation in the engine communicates through this vocabulary. A node
//! reports whether the recognition hypothesis is still viable (`Continue`),
//! permanently invalidated (`Drop`), or fully confirmed (`Emit`), plus a
//! `settled` flag telling the evaluator whether re-running the node on a
//! larger buffer could change anything.

/// Tri-state verdict of a node for the current evaluation pass.
///
/// `Drop` and `Emit` are terminal for the subtree that produced them within
/// one pass; `Continue` means the hypothesis is still open (the node may be
/// waiting on bytes, or on sibling progress).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
    /// Hypothesis still viable; may need more bytes or more sibling progress.
    #[default]
    Continue,
    /// Hypothesis permanently invalidated for this attempt.
    Drop,
    /// Hypothesis fully and finally confirmed.
    Emit,
}

impl Decision {
    /// True for `Drop` and `Emit`: the attempt is over one way or the other.
    pub fn is_terminal(self) -> bool {
        matches!(self, Decision::Drop | Decision::Emit)
    }
}

/// The `(Decision, settled)` pair returned by every operation.
///
/// `settled == true` means the node's local verdict cannot change by supplying
/// more bytes or by re-running it in this attempt: it already consumed its
/// designated bytes, or it already failed or succeeded. `settled == false`
/// means the node is blocked purely on buffer length and should be re-invoked
/// once more bytes arrive.
///
/// Settled is an optimization signal only. A correct evaluator may ignore it
/// and re-run every node on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub decision: Decision,
    pub settled: bool,
}

impl Outcome {
    /// Verdict that is final for this attempt (or final for the current bytes).
    pub fn settled(decision: Decision) -> Self {
        Outcome { decision, settled: true }
    }

    /// Node is blocked on buffer length; re-run once more bytes arrive.
    pub fn unsettled(decision: Decision) -> Self {
        Outcome { decision, settled: false }
    }

    /// Shorthand for the underrun case: more input needed, verdict open.
    pub fn need_more() -> Self {
        Outcome::unsettled(Decision::Continue)
    }
}
