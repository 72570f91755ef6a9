//! Control-flow analysis over the lowered statement list: decides whether
//! the end of a non-void function is reachable without passing a return.

use std::collections::HashMap;

use ace_error::{Diagnosed, DiagnosticBag};
use ace_span::SrcLocation;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::diagnostics;
use crate::symbol::SymbolId;

/// One abstract node of a function body; edges are fall-through, branch,
/// label-jump, return and exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlowNode {
    Normal,
    Label(SymbolId),
    /// Unconditional jump to a label.
    Jump(SymbolId),
    /// Conditional jump: falls through or jumps.
    Branch(SymbolId),
    Ret,
    Exit,
}

/// The directed graph of a lowered function body, with a virtual entry
/// and a virtual function-end node.
pub struct ControlFlowGraph {
    graph: DiGraph<(), ()>,
    entry: NodeIndex,
    end: NodeIndex,
}

impl ControlFlowGraph {
    pub fn new(nodes: &[ControlFlowNode]) -> Self {
        let mut graph = DiGraph::new();
        let indices: Vec<NodeIndex> = nodes.iter().map(|_| graph.add_node(())).collect();
        let entry = graph.add_node(());
        let end = graph.add_node(());

        let labels: HashMap<SymbolId, NodeIndex> = nodes
            .iter()
            .enumerate()
            .filter_map(|(position, node)| match node {
                ControlFlowNode::Label(label) => Some((*label, indices[position])),
                _ => None,
            })
            .collect();

        let next_of = |position: usize| -> NodeIndex {
            indices.get(position + 1).copied().unwrap_or(end)
        };

        match indices.first() {
            Some(first) => graph.add_edge(entry, *first, ()),
            None => graph.add_edge(entry, end, ()),
        };

        for (position, node) in nodes.iter().enumerate() {
            let index = indices[position];
            match node {
                ControlFlowNode::Normal | ControlFlowNode::Label(_) => {
                    graph.add_edge(index, next_of(position), ());
                }
                ControlFlowNode::Jump(label) => {
                    if let Some(target) = labels.get(label) {
                        graph.add_edge(index, *target, ());
                    }
                }
                ControlFlowNode::Branch(label) => {
                    graph.add_edge(index, next_of(position), ());
                    if let Some(target) = labels.get(label) {
                        graph.add_edge(index, *target, ());
                    }
                }
                // Returns and exits leave the function; no edge to the
                // end node.
                ControlFlowNode::Ret | ControlFlowNode::Exit => {}
            }
        }

        Self { graph, entry, end }
    }

    /// Whether execution can fall off the end of the function.
    pub fn is_end_reachable(&self) -> bool {
        has_path_connecting(&self.graph, self.entry, self.end, None)
    }
}

/// Raise `NotAllControlPathsReturn` when a non-void function's end is
/// reachable. `location` is the function's name.
pub fn diagnose_invalid_control_flow(
    location: SrcLocation,
    graph: &ControlFlowGraph,
) -> Diagnosed<()> {
    let mut bag = DiagnosticBag::new();
    if graph.is_end_reachable() {
        bag.add(diagnostics::not_all_control_paths_return_error(location));
    }
    Diagnosed::new((), bag)
}
