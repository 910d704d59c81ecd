//! Breadth-first traversal over a [`TraversalGraph`].

use std::collections::VecDeque;

use traverse_core::{ReachableSet, TileCoord};

use crate::graph::{NodeIndex, TraversalGraph};

/// Node a search starts from when the player stands at `tile`.
///
/// Falls back to the nearest node by Manhattan distance when the tile itself
/// is not a node.
#[must_use]
pub fn resolve_start(graph: &TraversalGraph, tile: TileCoord) -> Option<NodeIndex> {
    graph.node_at(tile).or_else(|| graph.nearest(tile, None))
}

/// Every node reachable from `start`, including `start` itself.
#[must_use]
pub fn reachable_from(graph: &TraversalGraph, start: Option<NodeIndex>) -> ReachableSet {
    let (columns, rows) = graph.dimensions();
    let mut reached = ReachableSet::new(columns, rows);
    let Some(start) = start else {
        return reached;
    };

    let mut visited = vec![false; graph.len()];
    let mut queue = VecDeque::new();
    visited[start.get()] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if let Some(node) = graph.node(current) {
            let _ = reached.insert(node.coord);
        }
        for &next in graph.neighbours(current) {
            if !visited[next.get()] {
                visited[next.get()] = true;
                queue.push_back(next);
            }
        }
    }

    reached
}

/// Shortest hop path from `start` to `target`, both inclusive.
///
/// Returns `None` when the target is not reachable.
#[must_use]
pub fn route(
    graph: &TraversalGraph,
    start: NodeIndex,
    target: NodeIndex,
) -> Option<Vec<TileCoord>> {
    let mut predecessors: Vec<Option<NodeIndex>> = vec![None; graph.len()];
    let mut visited = vec![false; graph.len()];
    let mut queue = VecDeque::new();
    visited[start.get()] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == target {
            break;
        }
        for &next in graph.neighbours(current) {
            if !visited[next.get()] {
                visited[next.get()] = true;
                predecessors[next.get()] = Some(current);
                queue.push_back(next);
            }
        }
    }

    if !visited[target.get()] {
        return None;
    }

    let mut path = Vec::new();
    let mut cursor = Some(target);
    while let Some(index) = cursor {
        if let Some(node) = graph.node(index) {
            path.push(node.coord);
        }
        cursor = predecessors[index.get()];
    }
    path.reverse();
    Some(path)
}
