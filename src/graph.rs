//! Arena expression graph and the per-attempt recognizer.
//!
//! A compiled grammar is a DAG of [`Op`] nodes stored in an arena and
//! addressed by integer ids. Children must exist before their parent is
//! added, which rules out cycles by construction and makes insertion order a
//! valid bottom-up evaluation order — no separate topological sort.
//!
//! The graph is immutable once built and carries no per-attempt data, so one
//! compiled grammar can be shared read-only across arbitrarily many
//! concurrent recognition attempts. Everything mutable lives in the
//! [`Recognizer`]: the attempt's [`State`] plus a memo array of per-node
//! [`Outcome`]s. On each buffer-growth event the recognizer re-runs one
//! bottom-up pass, skipping subtrees whose verdicts can no longer change;
//! skipping is an optimization only and full re-evaluation stays correct.
//!
//! Ordering between siblings is encoded by the compiler through data and
//! offset dependencies, not by the combinators. Child edges carry those
//! dependencies: a byte-consuming leaf lists the consumers that precede it
//! on the wire and is held back until they settle (otherwise it would decode
//! bytes still owed to an upstream field), and a guard such as
//! [`Op::CheckLength`] lists the consumers it watches so that it keeps being
//! re-run until they settle. Combinators aggregate over their children's
//! outcomes as usual.
//!
//! A choice resolves as soon as one alternative settles without dropping:
//! the remaining alternatives leave the race and the choice's dependents are
//! released. Without this, a complete frame behind a short magic would wait
//! forever on a longer alternative still starved of bytes, and the loser
//! could later be compared against next-frame bytes at the advanced offset.

use crate::decision::{Decision, Outcome};
use crate::ops::Op;
use crate::state::State;

/// Index of a node in the arena.
pub type NodeId = usize;

/// Grammar construction errors. Run-time recognition never errors; it speaks
/// [`Decision`]s.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),
    #[error("graph has no root node")]
    MissingRoot,
}

#[derive(Debug, Clone)]
struct Node {
    op: Op,
    children: Vec<NodeId>,
}

/// A compiled grammar: operator nodes plus their construction parameters.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    /// Add a leaf or guard node (no children).
    pub fn leaf(&mut self, op: Op) -> NodeId {
        self.nodes.push(Node { op, children: Vec::new() });
        self.nodes.len() - 1
    }

    /// Add a node whose children were added earlier. Ids in `children` must
    /// already exist, so every edge points backwards in the arena.
    pub fn add(&mut self, op: Op, children: &[NodeId]) -> Result<NodeId, GraphError> {
        for &child in children {
            if child >= self.nodes.len() {
                return Err(GraphError::UnknownNode(child));
            }
        }
        self.nodes.push(Node { op, children: children.to_vec() });
        Ok(self.nodes.len() - 1)
    }

    /// Mark the node whose decision is the grammar's overall verdict.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), GraphError> {
        if id >= self.nodes.len() {
            return Err(GraphError::UnknownNode(id));
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The operator stored at `id`, for introspection.
    pub fn op(&self, id: NodeId) -> Option<&Op> {
        self.nodes.get(id).map(|n| &n.op)
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(id).map(|n| n.children.as_slice())
    }
}

/// One in-flight recognition attempt against a compiled grammar.
///
/// Owns the attempt's [`State`] and the per-node outcome memo. Feed bytes as
/// they arrive, then ask for a decision; repeat until the root settles on
/// [`Decision::Drop`] or [`Decision::Emit`]. There is nothing to cancel:
/// dropping the recognizer abandons the attempt.
#[derive(Debug)]
pub struct Recognizer<'g> {
    graph: &'g Graph,
    root: NodeId,
    state: State,
    outcomes: Vec<Outcome>,
    /// Node settled and every transitive child settled: the subtree's verdict
    /// cannot change, so the node need not be re-run this attempt.
    stable: Vec<bool>,
    scratch: Vec<Outcome>,
}

impl<'g> Recognizer<'g> {
    pub fn new(graph: &'g Graph) -> Result<Self, GraphError> {
        let root = graph.root.ok_or(GraphError::MissingRoot)?;
        Ok(Recognizer {
            graph,
            root,
            state: State::new(),
            outcomes: vec![Outcome::need_more(); graph.nodes.len()],
            stable: vec![false; graph.nodes.len()],
            scratch: Vec::new(),
        })
    }

    /// Append newly received octets to the attempt's buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.state.feed(bytes);
    }

    /// Run one bottom-up pass over the graph and return the root decision.
    ///
    /// Nodes whose whole subtree is settled keep their memoized outcome;
    /// everything else is re-evaluated against the grown buffer. Once the
    /// root reaches a terminal decision, later calls return it without
    /// walking the graph.
    pub fn decide(&mut self) -> Decision {
        if self.stable[self.root] {
            return self.outcomes[self.root].decision;
        }
        let graph = self.graph;
        for id in 0..graph.nodes.len() {
            if self.stable[id] {
                continue;
            }
            let node = &graph.nodes[id];
            if node.op.advances_cursor() && !node.children.iter().all(|&c| self.stable[c]) {
                // Bytes before this consumer's region are still in flight;
                // its memoized pending outcome stands.
                continue;
            }
            self.scratch.clear();
            self.scratch.extend(node.children.iter().map(|&c| self.outcomes[c]));
            let outcome = node.op.evaluate(&mut self.state, &self.scratch);
            self.outcomes[id] = outcome;
            if matches!(node.op, Op::Choice) {
                self.resolve_choice(node);
            }
            self.stable[id] = outcome.settled && node.children.iter().all(|&c| self.stable[c]);
            if id == self.root && outcome.decision.is_terminal() {
                // Terminal root verdicts never revert within an attempt.
                self.stable[id] = true;
                break;
            }
        }
        self.outcomes[self.root].decision
    }

    /// First success wins: once any alternative has settled without dropping,
    /// the choice is decided and the starved siblings leave the race, so they
    /// are never matched against bytes at the advanced offset and the
    /// choice's dependents stop waiting on them.
    fn resolve_choice(&mut self, node: &Node) {
        let won = node
            .children
            .iter()
            .any(|&c| self.stable[c] && self.outcomes[c].decision != Decision::Drop);
        if won {
            for &c in &node.children {
                self.stable[c] = true;
            }
        }
    }

    /// Feed then decide, the common per-chunk step of a driving loop.
    pub fn push(&mut self, bytes: &[u8]) -> Decision {
        self.feed(bytes);
        self.decide()
    }

    /// The outcome the root produced on the last pass.
    pub fn root_outcome(&self) -> Outcome {
        self.outcomes[self.root]
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Hand the attempt's state to the consumer, e.g. after `Emit` to read
    /// the decoded fields and the consumed frame length.
    pub fn into_state(self) -> State {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_unknown_child() {
        let mut graph = Graph::new();
        let lit = graph.leaf(Op::Literal(b"A".to_vec()));
        let err = graph.add(Op::Sequence, &[lit, 7]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownNode(7)));
    }

    #[test]
    fn set_root_rejects_unknown_node() {
        let mut graph = Graph::new();
        assert!(matches!(graph.set_root(0), Err(GraphError::UnknownNode(0))));
    }

    #[test]
    fn recognizer_requires_root() {
        let mut graph = Graph::new();
        graph.leaf(Op::Literal(b"A".to_vec()));
        assert!(matches!(Recognizer::new(&graph), Err(GraphError::MissingRoot)));
    }

    #[test]
    fn settled_leaf_is_not_rerun() {
        // A matched literal must not re-match at the advanced offset when
        // more bytes arrive.
        let mut graph = Graph::new();
        let lit = graph.leaf(Op::Literal(b"AB".to_vec()));
        graph.set_root(lit).unwrap();

        let mut attempt = Recognizer::new(&graph).unwrap();
        assert_eq!(attempt.push(b"AB"), Decision::Continue);
        assert!(attempt.root_outcome().settled);
        assert_eq!(attempt.state().offset(), 2);

        assert_eq!(attempt.push(b"CD"), Decision::Continue);
        assert_eq!(attempt.state().offset(), 2);
    }

    #[test]
    fn guard_with_ordering_edges_is_rerun_until_deps_settle() {
        // The length gate settles as a no-op while the declared length is
        // unknown; its ordering edge onto the length field keeps it running
        // until the field has decoded.
        let mut graph = Graph::new();
        let len = graph.leaf(Op::Field(crate::field::FieldSpec::length(
            "len",
            crate::field::FieldType::U8,
        )));
        let gate = graph.add(Op::CheckLength, &[len]).unwrap();
        let root = graph.add(Op::Sequence, &[len, gate]).unwrap();
        graph.set_root(root).unwrap();

        let mut attempt = Recognizer::new(&graph).unwrap();
        assert_eq!(attempt.decide(), Decision::Continue);
        // Declared length 1: the length byte itself is the whole frame.
        assert_eq!(attempt.push(&[1]), Decision::Emit);
        assert_eq!(attempt.state().declared_length(), Some(1));
    }

    #[test]
    fn node_added_after_set_root_is_evaluated() {
        // Arena membership decides what runs, not id order relative to the
        // root: a builder that sets the root early gets no dead nodes.
        let mut graph = Graph::new();
        let first = graph.leaf(Op::Literal(b"A".to_vec()));
        graph.set_root(first).unwrap();
        let _second = graph.leaf(Op::Literal(b"B".to_vec()));

        let mut attempt = Recognizer::new(&graph).unwrap();
        assert_eq!(attempt.push(b"AB"), Decision::Continue);
        assert_eq!(attempt.state().offset(), 2);
    }

    #[test]
    fn terminal_root_is_memoized() {
        let mut graph = Graph::new();
        let lit = graph.leaf(Op::Literal(b"A".to_vec()));
        let root = graph.add(Op::Sequence, &[lit]).unwrap();
        graph.set_root(root).unwrap();

        let mut attempt = Recognizer::new(&graph).unwrap();
        assert_eq!(attempt.push(b"Z"), Decision::Drop);
        // Later bytes cannot revive a dropped attempt.
        assert_eq!(attempt.push(b"A"), Decision::Drop);
    }
}
