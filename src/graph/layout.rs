use super::ordering::{find_parents, sorted_indices};
use super::{Edge, Node, Position};
use ahash::AHashMap;

pub const LEVEL_SPACING_X: f64 = 700.0;
pub const NODE_SPACING_Y: f64 = 400.0;

/// Depth of each node: 0 for nodes without parents, otherwise one more than the
/// deepest parent.
pub fn node_levels(nodes: &[Node], edges: &[Edge]) -> AHashMap<String, usize> {
    let mut levels: AHashMap<String, usize> = AHashMap::new();
    for i in sorted_indices(nodes, edges) {
        let node = &nodes[i];
        let level = find_parents(node, edges)
            .iter()
            .filter_map(|p| levels.get(p))
            .max()
            .map_or(0, |deepest| deepest + 1);
        levels.insert(node.id.clone(), level);
    }
    levels
}

/// Places nodes in columns by level, stacking nodes of the same level vertically in
/// dependency order.
pub fn arrange_levels(nodes: &mut [Node], edges: &[Edge]) {
    let order = sorted_indices(nodes, edges);
    let levels = node_levels(nodes, edges);

    let mut next_row: AHashMap<usize, usize> = AHashMap::new();
    let mut positions: AHashMap<usize, Position> = AHashMap::new();
    for i in order {
        let level = levels.get(&nodes[i].id).copied().unwrap_or(0);
        let row = next_row.entry(level).or_insert(0);
        positions.insert(
            i,
            Position::new(LEVEL_SPACING_X * level as f64, NODE_SPACING_Y * *row as f64),
        );
        *row += 1;
    }

    for (i, node) in nodes.iter_mut().enumerate() {
        if let Some(position) = positions.get(&i) {
            node.position = *position;
        }
    }
}
