//! # Skeleton Graph
//!
//! Undirected graph over the vertex arena, represented by sorted adjacency lists indexed by
//! [`VertexId`].

use super::vertex::VertexId;

#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    adjacency: Vec<Vec<VertexId>>,
}

impl Skeleton {
    /// Adds a node for the next vertex id
    pub fn add_node(&mut self) -> VertexId {
        self.adjacency.push(vec![]);
        VertexId(self.adjacency.len() - 1)
    }

    pub fn n_nodes(&self) -> usize {
        self.adjacency.len()
    }

    pub fn add_edge(&mut self, u: VertexId, v: VertexId) {
        assert_ne!(u, v, "self-loops are not allowed");
        Self::insert_sorted(&mut self.adjacency[u.0], v);
        Self::insert_sorted(&mut self.adjacency[v.0], u);
    }

    fn insert_sorted(list: &mut Vec<VertexId>, v: VertexId) {
        if let Err(pos) = list.binary_search(&v) {
            list.insert(pos, v);
        }
    }

    /// Removes all edges of a node, keeping its id reserved
    pub fn isolate(&mut self, v: VertexId) {
        let neighbors = std::mem::take(&mut self.adjacency[v.0]);
        for n in neighbors {
            if let Ok(pos) = self.adjacency[n.0].binary_search(&v) {
                self.adjacency[n.0].remove(pos);
            }
        }
    }

    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        &self.adjacency[v.0]
    }

    pub fn degree(&self, v: VertexId) -> usize {
        self.adjacency[v.0].len()
    }

    pub fn contains_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.adjacency[u.0].binary_search(&v).is_ok()
    }

    /// All edges `(u, v)` with `u < v`
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, list)| {
            list.iter()
                .filter(move |v| v.0 > u)
                .map(move |v| (VertexId(u), *v))
        })
    }

    pub fn n_edges(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Checks that every edge is stored in both adjacency lists
    pub fn is_symmetric(&self) -> bool {
        self.adjacency.iter().enumerate().all(|(u, list)| {
            list.iter()
                .all(|v| self.adjacency[v.0].binary_search(&VertexId(u)).is_ok())
        })
    }
}
