//! Traversal graph derived from the tile grid for one ability state.

use traverse_core::{
    AbilityState, PointsOfInterest, ReachableSet, TileCoord, TileGrid, WorldPoint,
};

use crate::arc::ArcSimulator;

/// Role a node plays in the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Empty tile standing on solid ground.
    Floor,
    /// Save point.
    Save,
    /// Shop.
    Shop,
    /// Ability pickup.
    Ability,
    /// Health or vitality upgrade.
    Vitality,
    /// Grapple anchor.
    Anchor,
    /// Ability-gated passage.
    Gate,
    /// Entrance to the boss arena.
    Boss,
}

/// Graph vertex representing one traversable or interesting tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    /// Tile the node occupies.
    pub coord: TileCoord,
    /// First role registered for the tile.
    pub kind: NodeKind,
}

/// Position of a node within the graph's node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Raw arena position.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

/// Nodes and directed edges valid for a single validation pass.
#[derive(Clone, Debug)]
pub struct TraversalGraph {
    columns: u32,
    rows: u32,
    nodes: Vec<Node>,
    lookup: Vec<Option<NodeIndex>>,
    edges: Vec<Vec<NodeIndex>>,
}

impl TraversalGraph {
    /// Scans the grid and points of interest and connects every feasible move.
    #[must_use]
    pub fn build<G>(
        grid: &G,
        points: &PointsOfInterest,
        abilities: AbilityState,
        arc: &ArcSimulator<'_>,
    ) -> Self
    where
        G: TileGrid + ?Sized,
    {
        let mut graph = Self::collect_nodes(grid, points, abilities);
        graph.connect(grid, points, abilities, arc);
        graph
    }

    fn collect_nodes<G>(grid: &G, points: &PointsOfInterest, abilities: AbilityState) -> Self
    where
        G: TileGrid + ?Sized,
    {
        let columns = grid.columns();
        let rows = grid.rows();
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut graph = Self {
            columns,
            rows,
            nodes: Vec::new(),
            lookup: vec![None; cell_count],
            edges: Vec::new(),
        };

        for ty in 0..rows {
            for tx in 0..columns {
                let coord = TileCoord::new(tx as i32, ty as i32);
                if grid.is_solid(coord, abilities) {
                    continue;
                }
                if !grid.is_solid(coord.offset(0, 1), abilities) {
                    continue;
                }
                graph.add_node(coord, NodeKind::Floor);
            }
        }

        let tile_size = grid.tile_size();
        graph.add_points(&points.saves, NodeKind::Save, tile_size);
        graph.add_points(&points.shops, NodeKind::Shop, tile_size);
        for pickup in &points.ability_pickups {
            graph.add_node(pickup.point.tile(tile_size), NodeKind::Ability);
        }
        graph.add_points(&points.vitality, NodeKind::Vitality, tile_size);
        graph.add_points(&points.anchors, NodeKind::Anchor, tile_size);
        for gate in &points.gates {
            graph.add_node(gate.point.tile(tile_size), NodeKind::Gate);
        }
        if let Some(boss) = points.boss_gate {
            graph.add_node(boss.tile(tile_size), NodeKind::Boss);
        }

        graph.edges = vec![Vec::new(); graph.nodes.len()];
        graph
    }

    fn add_points(&mut self, points: &[WorldPoint], kind: NodeKind, tile_size: f64) {
        for point in points {
            self.add_node(point.tile(tile_size), kind);
        }
    }

    fn add_node(&mut self, coord: TileCoord, kind: NodeKind) {
        let Some(cell) = self.cell(coord) else {
            return;
        };
        if self.lookup[cell].is_some() {
            return;
        }
        self.lookup[cell] = Some(NodeIndex(self.nodes.len()));
        self.nodes.push(Node { coord, kind });
    }

    fn connect<G>(
        &mut self,
        grid: &G,
        points: &PointsOfInterest,
        abilities: AbilityState,
        arc: &ArcSimulator<'_>,
    ) where
        G: TileGrid + ?Sized,
    {
        let profile = *arc.profile();
        let anchors: Vec<(NodeIndex, TileCoord)> = if profile.grapple_range > 0.0 {
            points
                .anchors
                .iter()
                .filter_map(|point| {
                    let coord = point.tile(grid.tile_size());
                    self.node_at(coord).map(|index| (index, coord))
                })
                .collect()
        } else {
            Vec::new()
        };

        for source in 0..self.nodes.len() {
            let origin = self.nodes[source].coord;
            let mut list = Vec::new();

            for dx in [1, -1] {
                let next = origin.offset(dx, 0);
                if grid.gate_ability(next).is_some() && grid.is_solid(next, abilities) {
                    continue;
                }
                if let Some(index) = self.node_at(next) {
                    push_unique(&mut list, index);
                }
            }

            for dx in -profile.max_jump_distance..=profile.max_jump_distance {
                for dy in -profile.max_jump_height..=profile.max_drop_distance {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let next = origin.offset(dx, dy);
                    let Some(index) = self.node_at(next) else {
                        continue;
                    };
                    if !clear_trajectory(grid, origin, next, abilities) {
                        continue;
                    }
                    if !arc.accepts(dx, dy) {
                        continue;
                    }
                    push_unique(&mut list, index);
                }
            }

            for dx in -profile.dash_distance..=profile.dash_distance {
                if dx == 0 {
                    continue;
                }
                let next = origin.offset(dx, 0);
                let Some(index) = self.node_at(next) else {
                    continue;
                };
                if clear_trajectory(grid, origin, next, abilities) {
                    push_unique(&mut list, index);
                }
            }

            for &(anchor, anchor_coord) in &anchors {
                let in_range = origin.euclidean_distance(anchor_coord) <= profile.grapple_range;
                if anchor.0 != source && in_range {
                    push_unique(&mut list, anchor);
                }
            }

            self.edges[source] = list;
        }
    }

    /// Grid dimensions the graph was built over.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in arena order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node stored at the provided arena position.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    /// Node occupying the tile, if any.
    #[must_use]
    pub fn node_at(&self, coord: TileCoord) -> Option<NodeIndex> {
        self.cell(coord).and_then(|cell| self.lookup[cell])
    }

    /// Outgoing edges of the node, in insertion order.
    #[must_use]
    pub fn neighbours(&self, index: NodeIndex) -> &[NodeIndex] {
        self.edges.get(index.0).map_or(&[], Vec::as_slice)
    }

    /// Reports whether a directed edge connects the two tiles.
    #[must_use]
    pub fn has_edge(&self, from: TileCoord, to: TileCoord) -> bool {
        match (self.node_at(from), self.node_at(to)) {
            (Some(from), Some(to)) => self.neighbours(from).contains(&to),
            _ => false,
        }
    }

    /// Node with the smallest Manhattan distance to the tile.
    ///
    /// When `within` is provided only nodes in that set are considered. Ties
    /// resolve to the node registered first.
    #[must_use]
    pub fn nearest(&self, coord: TileCoord, within: Option<&ReachableSet>) -> Option<NodeIndex> {
        let mut best: Option<(NodeIndex, u32)> = None;
        for (position, node) in self.nodes.iter().enumerate() {
            if within.is_some_and(|set| !set.contains(node.coord)) {
                continue;
            }
            let distance = node.coord.manhattan_distance(coord);
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((NodeIndex(position), distance));
            }
        }
        best.map(|(index, _)| index)
    }

    fn cell(&self, coord: TileCoord) -> Option<usize> {
        let column = u32::try_from(coord.tx()).ok()?;
        let row = u32::try_from(coord.ty()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        Some(usize::try_from(row).ok()? * width + usize::try_from(column).ok()?)
    }
}

fn push_unique(list: &mut Vec<NodeIndex>, index: NodeIndex) {
    if !list.contains(&index) {
        list.push(index);
    }
}

/// Samples the straight line between two tile centres at unit steps.
///
/// The destination tile is sampled, the source tile is not.
#[must_use]
pub fn clear_trajectory<G>(
    grid: &G,
    from: TileCoord,
    to: TileCoord,
    abilities: AbilityState,
) -> bool
where
    G: TileGrid + ?Sized,
{
    let dx = to.tx() - from.tx();
    let dy = to.ty() - from.ty();
    let steps = dx.abs().max(dy.abs());
    for step in 1..=steps {
        let t = f64::from(step) / f64::from(steps);
        let x = round_half_up(f64::from(from.tx()) + f64::from(dx) * t);
        let y = round_half_up(f64::from(from.ty()) + f64::from(dy) * t);
        if grid.is_solid(TileCoord::new(x, y), abilities) {
            return false;
        }
    }
    true
}

fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::{clear_trajectory, NodeKind, TraversalGraph};
    use crate::{arc::ArcSimulator, profile::MovementProfile};
    use traverse_core::{
        AbilityState, AbilityTable, MovementConstants, PlayerStats, TileCoord, TileGrid,
    };
    use traverse_level::Level;

    fn build(level: &Level, abilities: AbilityState) -> TraversalGraph {
        let constants = MovementConstants::default();
        let profile = MovementProfile::compute(
            &constants,
            &PlayerStats::default(),
            level.abilities(),
            abilities,
            level.tile_size(),
        );
        let arc = ArcSimulator::new(&profile, &constants, level.tile_size());
        TraversalGraph::build(level, level.points_of_interest(), abilities, &arc)
    }

    #[test]
    fn floor_nodes_need_ground_below() {
        let level = Level::from_rows(&["....", ".#..", "####"], 32.0, AbilityTable::classic())
            .expect("level builds");
        let graph = build(&level, AbilityState::none());

        assert!(graph.node_at(TileCoord::new(1, 0)).is_some());
        assert!(graph.node_at(TileCoord::new(0, 0)).is_none());
        assert!(graph.node_at(TileCoord::new(1, 1)).is_none());
        assert!(graph.node_at(TileCoord::new(0, 1)).is_some());
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn points_of_interest_keep_the_first_kind() {
        let level = Level::from_rows(&["S..a.", "##..."], 32.0, AbilityTable::grapple())
            .expect("level builds");
        let graph = build(&level, AbilityState::none());

        let save = graph.node_at(TileCoord::new(0, 0)).expect("save node");
        assert_eq!(graph.node(save).map(|node| node.kind), Some(NodeKind::Floor));
        let anchor = graph.node_at(TileCoord::new(3, 0)).expect("anchor node");
        assert_eq!(graph.node(anchor).map(|node| node.kind), Some(NodeKind::Anchor));
    }

    #[test]
    fn locked_gates_are_not_entered_by_walking() {
        let level = Level::from_rows(&["..1.", "####"], 32.0, AbilityTable::grapple())
            .expect("level builds");
        let grapple = level.abilities().find("grapple").expect("grapple exists");

        let locked = build(&level, AbilityState::none());
        assert!(!locked.has_edge(TileCoord::new(1, 0), TileCoord::new(2, 0)));
        assert!(!locked.has_edge(TileCoord::new(1, 0), TileCoord::new(3, 0)));

        let open = build(&level, AbilityState::none().with(grapple));
        assert!(open.has_edge(TileCoord::new(1, 0), TileCoord::new(2, 0)));
        assert!(open.has_edge(TileCoord::new(1, 0), TileCoord::new(3, 0)));
    }

    #[test]
    fn grapple_edges_lead_to_anchors() {
        let level = Level::from_rows(
            &[
                "..........",
                "..........",
                "...a......",
                "..........",
                "..........",
                "..........",
                "..........",
                "##########",
            ],
            32.0,
            AbilityTable::grapple(),
        )
        .expect("level builds");
        let grapple = level.abilities().find("grapple").expect("grapple exists");
        let anchor = TileCoord::new(3, 2);
        let below = TileCoord::new(3, 6);

        assert!(!build(&level, AbilityState::none()).has_edge(below, anchor));

        let graph = build(&level, AbilityState::none().with(grapple));
        assert!(graph.has_edge(below, anchor));
        assert!(graph.has_edge(TileCoord::new(0, 6), anchor));
        assert!(!graph.has_edge(TileCoord::new(7, 6), anchor));
    }

    #[test]
    fn dash_only_climbs_become_edges() {
        let level = Level::from_rows(
            &[".....", "....#", ".....", ".....", "#####"],
            32.0,
            AbilityTable::classic(),
        )
        .expect("level builds");
        let graph = build(&level, AbilityState::none());

        assert!(graph.has_edge(TileCoord::new(0, 3), TileCoord::new(4, 0)));
    }

    #[test]
    fn trajectory_stops_at_walls() {
        let level = Level::from_rows(&["..#..", "#####"], 32.0, AbilityTable::classic())
            .expect("level builds");
        let none = AbilityState::none();

        assert!(clear_trajectory(&level, TileCoord::new(0, 0), TileCoord::new(1, 0), none));
        assert!(!clear_trajectory(&level, TileCoord::new(0, 0), TileCoord::new(4, 0), none));
        assert!(!clear_trajectory(&level, TileCoord::new(0, 0), TileCoord::new(2, 0), none));
    }

    #[test]
    fn nearest_uses_manhattan_distance() {
        let level = Level::from_rows(&["...", "###"], 32.0, AbilityTable::classic())
            .expect("level builds");
        let graph = build(&level, AbilityState::none());
        let nearest = graph
            .nearest(TileCoord::new(1, 5), None)
            .and_then(|index| graph.node(index))
            .map(|node| node.coord);
        assert_eq!(nearest, Some(TileCoord::new(1, 0)));
    }

    #[test]
    fn nearest_prefers_earlier_nodes_on_ties() {
        let level = Level::from_rows(&[".#.", "###"], 32.0, AbilityTable::classic())
            .expect("level builds");
        let graph = build(&level, AbilityState::none());
        let nearest = graph
            .nearest(TileCoord::new(1, 0), None)
            .and_then(|index| graph.node(index))
            .map(|node| node.coord);
        assert_eq!(nearest, Some(TileCoord::new(0, 0)));
    }
}
