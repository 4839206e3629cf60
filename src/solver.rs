use crate::game::{Board, Move, SymbolMap};
use log::debug;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// A shortest winning sequence; empty if the start is already won.
    Solved(Vec<Move>),
    /// Some branch reached the depth bound before any win was found.
    Cutoff,
    /// Every reachable state was expanded without hitting the depth bound.
    Impossible,
}

impl SolveResult {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveResult::Solved(_))
    }

    pub fn into_moves(self) -> Option<Vec<Move>> {
        match self {
            SolveResult::Solved(moves) => Some(moves),
            _ => None,
        }
    }
}

/// A visited state, linked to the state it was reached from.
struct Node {
    parent: usize,
    mv: Move,
}

/// Breadth-first search for a shortest winning move sequence.
pub struct Solver {
    max_depth: usize,
    nodes_explored: usize,
}

impl Solver {
    pub fn new(max_depth: usize) -> Self {
        Solver {
            max_depth,
            nodes_explored: 0,
        }
    }

    /// Number of states expanded by the last call to [`Solver::solve`].
    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    /// Search for the shortest solution of at most `max_depth` moves.
    ///
    /// With `max_depth == 0` this only reports whether `start` is already won.
    pub fn solve(&mut self, start: &Board) -> SolveResult {
        self.nodes_explored = 0;

        if start.is_solved() {
            return SolveResult::Solved(Vec::new());
        }

        // the start state has no node; usize::MAX stands for it
        let mut nodes: Vec<Node> = Vec::new();
        let mut visited: FxHashSet<SymbolMap> = FxHashSet::default();
        let mut queue: VecDeque<(Board, usize, usize)> = VecDeque::new();
        let mut cutoff = false;

        visited.insert(start.key());
        queue.push_back((start.clone(), usize::MAX, 0));

        while let Some((board, node, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                cutoff = true;
                continue;
            }
            self.nodes_explored += 1;

            for mv in board.moves() {
                let next = board.play(mv);

                if next.is_solved() {
                    let mut path = Self::path_to(&nodes, node);
                    path.push(mv);
                    debug!(
                        "solved in {} moves after expanding {} states",
                        path.len(),
                        self.nodes_explored
                    );
                    return SolveResult::Solved(path);
                }

                if visited.insert(next.key()) {
                    nodes.push(Node { parent: node, mv });
                    queue.push_back((next, nodes.len() - 1, depth + 1));
                }
            }
        }

        debug!(
            "no solution within {} moves after expanding {} states (cutoff: {})",
            self.max_depth, self.nodes_explored, cutoff
        );

        if cutoff {
            SolveResult::Cutoff
        } else {
            SolveResult::Impossible
        }
    }

    /// Moves leading from the root to `node`, in play order.
    fn path_to(nodes: &[Node], mut node: usize) -> Vec<Move> {
        let mut path = Vec::new();
        while node != usize::MAX {
            path.push(nodes[node].mv);
            node = nodes[node].parent;
        }
        path.reverse();
        path
    }
}
