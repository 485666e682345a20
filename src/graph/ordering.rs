use super::{Edge, Node};
use ahash::{AHashMap, AHashSet};

/// Orders nodes so that every edge source comes before its target.
///
/// Depth-first: each node's upstream producers (in edge-list order) are placed before
/// the node itself, and every node of `nodes` is tried as a root in turn, so
/// disconnected components all appear exactly once. Edges whose source is not in
/// `nodes` are ignored.
///
/// A cycle does not hang the walk: already visited nodes are skipped, and the nodes on
/// the cycle come out in a partial order. Use [`find_cycle`] to detect that case.
///
/// The walk recurses once per upstream hop, so stack depth grows with the longest
/// dependency chain. Editor flows of a few hundred nodes are well within that.
pub fn topological_sort(nodes: &[Node], edges: &[Edge]) -> Vec<Node> {
    sorted_indices(nodes, edges)
        .into_iter()
        .map(|i| nodes[i].clone())
        .collect()
}

/// Same walk as [`topological_sort`], returning positions into `nodes`.
pub fn sorted_indices(nodes: &[Node], edges: &[Edge]) -> Vec<usize> {
    let index_by_id: AHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let parents = incoming_sources(edges);

    let mut visited = vec![false; nodes.len()];
    let mut sorted = Vec::with_capacity(nodes.len());

    fn visit(
        i: usize,
        nodes: &[Node],
        index_by_id: &AHashMap<&str, usize>,
        parents: &AHashMap<&str, Vec<&str>>,
        visited: &mut [bool],
        sorted: &mut Vec<usize>,
    ) {
        if visited[i] {
            return;
        }
        visited[i] = true;

        if let Some(sources) = parents.get(nodes[i].id.as_str()) {
            for source in sources {
                match index_by_id.get(source) {
                    Some(&p) => visit(p, nodes, index_by_id, parents, visited, sorted),
                    None => tracing::debug!(
                        source_node = %source,
                        target_node = %nodes[i].id,
                        "edge source not found while sorting"
                    ),
                }
            }
        }
        sorted.push(i);
    }

    for i in 0..nodes.len() {
        visit(i, nodes, &index_by_id, &parents, &mut visited, &mut sorted);
    }
    sorted
}

/// Ids of the nodes feeding `node`, in edge-list order.
pub fn find_parents(node: &Node, edges: &[Edge]) -> Vec<String> {
    edges
        .iter()
        .filter(|e| e.target == node.id)
        .map(|e| e.source.clone())
        .collect()
}

/// Returns the ids along one cycle of the graph, if it has any.
///
/// The returned path starts and ends with the same node id.
pub fn find_cycle(nodes: &[Node], edges: &[Edge]) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut children: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for edge in edges {
        children
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }
    let known: AHashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let mut marks: AHashMap<&str, Mark> = known.iter().map(|id| (*id, Mark::Unvisited)).collect();

    fn walk<'a>(
        id: &'a str,
        children: &AHashMap<&'a str, Vec<&'a str>>,
        marks: &mut AHashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        marks.insert(id, Mark::InProgress);
        path.push(id);

        for &child in children.get(id).map(Vec::as_slice).unwrap_or_default() {
            match marks.get(child).copied() {
                Some(Mark::InProgress) => {
                    let start = path.iter().position(|p| *p == child).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|p| p.to_string()).collect();
                    cycle.push(child.to_string());
                    return Some(cycle);
                }
                Some(Mark::Unvisited) => {
                    if let Some(cycle) = walk(child, children, marks, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        marks.insert(id, Mark::Done);
        None
    }

    for node in nodes {
        if marks.get(node.id.as_str()) == Some(&Mark::Unvisited) {
            let mut path = Vec::new();
            if let Some(cycle) = walk(node.id.as_str(), &children, &mut marks, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

fn incoming_sources(edges: &[Edge]) -> AHashMap<&str, Vec<&str>> {
    let mut parents: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for edge in edges {
        parents
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }
    parents
}
