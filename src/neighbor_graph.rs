use crate::similarity_table::{SimilarityTable, UNKNOWN_DISTANCE};
use log::warn;
use rayon::prelude::*;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;

/// Entries taken from each end of a ranked row when linking words.
pub const FAN: usize = 2;

/// Undirected graph joining every word to the `fan` most and `fan` least
/// similar words of its row. Hop distances are shortest paths in this graph.
#[derive(Debug, Clone)]
pub struct NeighborGraph {
    adj: Vec<Vec<usize>>,
}

impl NeighborGraph {
    /// `ranked[i]` lists word indices by descending similarity to word `i`.
    pub fn from_ranked(ranked: &[Vec<usize>], fan: usize) -> NeighborGraph {
        let mut adj = vec![Vec::new(); ranked.len()];
        for (i, row) in ranked.iter().enumerate() {
            let head = row.iter().take(fan);
            let tail = row.iter().skip(row.len().saturating_sub(fan));
            for &j in head.chain(tail) {
                if j != i {
                    adj[i].push(j);
                    adj[j].push(i);
                }
            }
        }
        for list in adj.iter_mut() {
            list.sort_unstable();
            list.dedup();
        }
        NeighborGraph { adj }
    }

    /// Rebuild the graph from a loaded table. Node `i` is `table.get_word(i)`.
    pub fn from_table(table: &SimilarityTable, fan: usize) -> NeighborGraph {
        let mut dangling = 0usize;
        let ranked: Vec<Vec<usize>> = table
            .words()
            .iter()
            .map(|word| {
                let row = table.row(word).unwrap_or_default();
                let head = row.iter().take(fan);
                let tail = row.iter().skip(row.len().saturating_sub(fan));
                head.chain(tail)
                    .filter_map(|e| {
                        let idx = table.get_index(&e.word);
                        if idx.is_none() {
                            dangling += 1;
                        }
                        idx
                    })
                    .collect()
            })
            .collect();
        if dangling > 0 {
            warn!("{dangling} neighbor(s) have no row of their own and were left out of the graph");
        }
        // rows are already trimmed to their ends
        NeighborGraph::from_ranked(&ranked, fan)
    }

    pub fn len(&self) -> usize {
        self.adj.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.adj[node]
    }

    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Breadth-first search from `source`: hop counts (unreachable nodes
    /// hold [`UNKNOWN_DISTANCE`]) and the BFS parent of each node.
    fn bfs(&self, source: usize) -> (Vec<i32>, Vec<Option<usize>>) {
        let mut dist = vec![UNKNOWN_DISTANCE; self.adj.len()];
        let mut parent = vec![None; self.adj.len()];
        let mut queue = VecDeque::new();
        dist[source] = 0;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for &v in &self.adj[u] {
                if dist[v] == UNKNOWN_DISTANCE {
                    dist[v] = dist[u] + 1;
                    parent[v] = Some(u);
                    queue.push_back(v);
                }
            }
        }
        (dist, parent)
    }

    pub fn distances_from(&self, source: usize) -> Vec<i32> {
        self.bfs(source).0
    }

    /// All-pairs hop distances, one BFS per source run in parallel.
    pub fn hop_distances(&self) -> Vec<Vec<i32>> {
        (0..self.len())
            .into_par_iter()
            .map(|s| self.distances_from(s))
            .collect()
    }

    /// Connected components, each sorted, in order of their smallest node.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.len()];
        let mut components = Vec::new();
        for start in 0..self.len() {
            if seen[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(u) = stack.pop() {
                component.push(u);
                for &v in &self.adj[u] {
                    if !seen[v] {
                        seen[v] = true;
                        stack.push(v);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// The `limit` longest shortest paths over all ordered pairs, longest
    /// first. Ties are ordered by source then target.
    pub fn longest_paths(&self, limit: usize) -> Vec<GraphPath> {
        let mut paths: Vec<GraphPath> = (0..self.len())
            .into_par_iter()
            .flat_map_iter(|source| {
                let (dist, parent) = self.bfs(source);
                let mut targets: Vec<usize> = (0..self.len())
                    .filter(|&t| t != source && dist[t] > 0)
                    .collect();
                targets.sort_by(|a, b| dist[*b].cmp(&dist[*a]).then(a.cmp(b)));
                targets.truncate(limit);
                targets
                    .into_iter()
                    .map(|target| GraphPath {
                        source,
                        target,
                        hops: dist[target] as usize,
                        nodes: walk_back(&parent, source, target),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        paths.sort_by(|a, b| {
            b.hops
                .cmp(&a.hops)
                .then(a.source.cmp(&b.source))
                .then(a.target.cmp(&b.target))
        });
        paths.truncate(limit);
        paths
    }
}

fn walk_back(parent: &[Option<usize>], source: usize, target: usize) -> Vec<usize> {
    let mut nodes = vec![target];
    let mut cur = target;
    while cur != source {
        match parent[cur] {
            Some(p) => {
                nodes.push(p);
                cur = p;
            }
            None => break,
        }
    }
    nodes.reverse();
    nodes
}

/// A shortest path between two nodes, endpoints included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPath {
    pub source: usize,
    pub target: usize,
    pub hops: usize,
    pub nodes: Vec<usize>,
}

/// Distribution of recorded hop distances over ordered pairs of distinct words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HopStats {
    pub pairs: usize,
    pub unreachable: usize,
    pub min: i32,
    pub max: i32,
    pub mean: f64,
    pub histogram: BTreeMap<i32, usize>,
}

impl HopStats {
    pub fn from_distances(distances: &[Vec<i32>]) -> HopStats {
        let mut stats = HopStats::default();
        let mut sum = 0i64;
        for (i, row) in distances.iter().enumerate() {
            for (j, &d) in row.iter().enumerate() {
                if i == j {
                    continue;
                }
                if d < 0 {
                    stats.unreachable += 1;
                    continue;
                }
                if stats.pairs == 0 {
                    stats.min = d;
                    stats.max = d;
                } else {
                    stats.min = stats.min.min(d);
                    stats.max = stats.max.max(d);
                }
                stats.pairs += 1;
                sum += d as i64;
                *stats.histogram.entry(d).or_insert(0) += 1;
            }
        }
        if stats.pairs > 0 {
            stats.mean = sum as f64 / stats.pairs as f64;
        }
        stats
    }
}

/// Summary printed after building or inspecting a dataset.
#[derive(Debug, Clone)]
pub struct GraphReport {
    pub nodes: usize,
    pub edges: usize,
    pub components: usize,
    pub largest_component: usize,
    pub hops: HopStats,
}

impl GraphReport {
    pub fn new(graph: &NeighborGraph, distances: &[Vec<i32>]) -> GraphReport {
        let components = graph.components();
        GraphReport {
            nodes: graph.len(),
            edges: graph.edge_count(),
            components: components.len(),
            largest_component: components.iter().map(Vec::len).max().unwrap_or(0),
            hops: HopStats::from_distances(distances),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.components <= 1
    }
}

impl fmt::Display for GraphReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph: {} nodes, {} edges", self.nodes, self.edges)?;
        writeln!(f, "Fully connected: {}", self.is_connected())?;
        if !self.is_connected() {
            writeln!(f, "Connected components: {}", self.components)?;
            writeln!(f, "Largest component size: {}", self.largest_component)?;
        }
        writeln!(f, "Unreachable word pairs: {}", self.hops.unreachable)?;
        writeln!(f, "Reachable word pairs: {}", self.hops.pairs)?;
        if self.hops.pairs == 0 {
            return Ok(());
        }
        writeln!(
            f,
            "Hop distance min/max/mean: {}/{}/{:.2}",
            self.hops.min, self.hops.max, self.hops.mean
        )?;
        for (d, count) in &self.hops.histogram {
            let pct = 100.0 * *count as f64 / self.hops.pairs as f64;
            writeln!(f, "  distance {d}: {count} pairs ({pct:.2}%)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0-1-2-3 chain plus isolated pair 4-5
    fn chain() -> NeighborGraph {
        let ranked = vec![vec![1], vec![2], vec![3], vec![], vec![5], vec![]];
        NeighborGraph::from_ranked(&ranked, FAN)
    }

    #[test]
    fn links_both_ends_of_each_row() {
        let ranked = vec![vec![1, 2, 3, 4, 5], vec![], vec![], vec![], vec![], vec![]];
        let g = NeighborGraph::from_ranked(&ranked, FAN);
        // head 1, 2 and tail 4, 5; the middle of the row is skipped
        assert_eq!(g.neighbors(0), &[1, 2, 4, 5]);
        assert!(g.neighbors(3).is_empty());
        // undirected
        assert_eq!(g.neighbors(5), &[0]);
        assert_eq!(g.edge_count(), 4);
    }

    #[test]
    fn bfs_distances_and_unreachable() {
        let g = chain();
        assert_eq!(g.distances_from(0), vec![0, 1, 2, 3, -1, -1]);
        let all = g.hop_distances();
        assert_eq!(all[3][0], 3);
        assert_eq!(all[5][4], 1);
        assert_eq!(all[4][0], UNKNOWN_DISTANCE);
    }

    #[test]
    fn components_and_report() {
        let g = chain();
        assert_eq!(g.components(), vec![vec![0, 1, 2, 3], vec![4, 5]]);
        assert_eq!(g.edge_count(), 4);

        let report = GraphReport::new(&g, &g.hop_distances());
        assert!(!report.is_connected());
        assert_eq!(report.largest_component, 4);
        // 12 ordered pairs inside the chain, 2 inside the pair
        assert_eq!(report.hops.pairs, 14);
        assert_eq!(report.hops.unreachable, 30 - 14);
        assert_eq!(report.hops.min, 1);
        assert_eq!(report.hops.max, 3);
        assert_eq!(report.hops.histogram[&1], 8);
        assert_eq!(report.hops.histogram[&3], 2);
        assert!(report.to_string().contains("Connected components: 2"));
    }

    #[test]
    fn longest_paths_first_with_explicit_nodes() {
        let g = chain();
        let paths = g.longest_paths(3);
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0].hops, 3);
        assert_eq!((paths[0].source, paths[0].target), (0, 3));
        assert_eq!(paths[0].nodes, vec![0, 1, 2, 3]);
        assert_eq!((paths[1].source, paths[1].target), (3, 0));
        assert_eq!(paths[1].nodes, vec![3, 2, 1, 0]);
        assert_eq!(paths[2].hops, 2);
    }

    #[test]
    fn rebuilds_from_table() {
        let json = r#"{
            "a": [{"word": "b", "similarity": 0.9, "hop_distance": 1},
                  {"word": "c", "similarity": 0.1, "hop_distance": 1}],
            "b": [{"word": "a", "similarity": 0.9, "hop_distance": 1},
                  {"word": "ghost", "similarity": 0.2, "hop_distance": 1}],
            "c": [{"word": "a", "similarity": 0.1, "hop_distance": 1},
                  {"word": "b", "similarity": 0.0, "hop_distance": 2}]
        }"#;
        let table = SimilarityTable::from_json(json).unwrap();
        let g = NeighborGraph::from_table(&table, FAN);
        assert_eq!(g.len(), 3);
        let a = table.get_index("a").unwrap();
        let b = table.get_index("b").unwrap();
        let c = table.get_index("c").unwrap();
        assert_eq!(g.neighbors(a).len(), 2);
        assert!(g.neighbors(c).contains(&b));
    }
}
