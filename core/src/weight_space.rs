//! # Weight-Space Polyhedron
//!
//! The polyhedron of lifted weights `(w, wov)` with `wov <= y · w` for all known outcomes `y`,
//! maintained incrementally while new outcomes are found. Every vertex is a weight that may
//! still lead to a new supported outcome, until the oracle either confirms its bound (the
//! vertex becomes marked) or finds an outcome that cuts it off (the vertex becomes obsolete and
//! new vertices are created on the cut edges).
//!
//! Vertices and facets live in arenas owned by the polyhedron. The skeleton graph is stored as
//! adjacency lists over vertex ids.

use std::{collections::VecDeque, fmt};

use crate::{
    ddm::{HalfSpace, VRep},
    types::{Outcome, Weight},
};

pub mod facet;
pub mod skeleton;
pub mod vertex;

pub use facet::{FacetId, WeightSpaceFacet};
use skeleton::Skeleton;
pub use vertex::{VertexId, VertexState, WeightSpaceVertex};

/// Slack tolerance of the boundary pair sanity check
const SLACK_TOLERANCE: f64 = 1e-6;

/// Fatal numerical errors while cutting the polyhedron with a new outcome
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum NumericalInconsistency {
    #[error(
        "Unexpected convex combination of obsolete and non-obsolete weight space vertices \
         (slacks {non_obs_slack} and {obs_slack})"
    )]
    Combination { obs_slack: f64, non_obs_slack: f64 },
    #[error("Combination parameter {0} outside of [0, 1]")]
    CombinationValue(f64),
    #[error("Combination parameter with vanishing denominator")]
    VanishingDenominator,
}

#[derive(Debug, Clone)]
pub struct WeightSpacePolyhedron {
    /// Number of objectives
    dim: usize,
    numerics: f64,
    ray_offset: f64,
    facets: Vec<WeightSpaceFacet>,
    vertices: Vec<WeightSpaceVertex>,
    skeleton: Skeleton,
    /// Queue of unmarked vertices in the order they are handed out
    unmarked: VecDeque<VertexId>,
    investigated: Option<VertexId>,
}

impl WeightSpacePolyhedron {
    /// Builds the initial polyhedron from the representations computed by
    /// [`crate::ddm::DoubleDescription`]
    pub fn new(
        dim: usize,
        v_rep: Vec<VRep>,
        h_rep: Vec<HalfSpace>,
        numerics: f64,
        ray_offset: f64,
    ) -> Self {
        assert!(dim >= 2, "weight space needs at least two objectives");
        assert!(!v_rep.is_empty());
        assert!(!h_rep.is_empty());
        let mut poly = WeightSpacePolyhedron {
            dim,
            numerics,
            ray_offset,
            facets: Vec::with_capacity(h_rep.len()),
            vertices: Vec::with_capacity(v_rep.len()),
            skeleton: Skeleton::default(),
            unmarked: VecDeque::new(),
            investigated: None,
        };
        for half in h_rep {
            let (outcome, rhs) = half.into_parts();
            poly.facets.push(WeightSpaceFacet::new(outcome, rhs));
        }
        for vrep in v_rep {
            if vrep.has_zero_weight(numerics) {
                continue;
            }
            let (weight, wov, zeros) = vrep.into_parts();
            let facets = zeros.iter().map(FacetId).collect();
            let mut vertex = WeightSpaceVertex::new(facets, weight, wov);
            let id = poly.skeleton.add_node();
            if vertex.has_unit_weight() {
                vertex.set_state(VertexState::Marked);
            } else {
                poly.unmarked.push_back(id);
            }
            poly.vertices.push(vertex);
        }
        for u in 0..poly.vertices.len() {
            for v in u + 1..poly.vertices.len() {
                let (u, v) = (VertexId(u), VertexId(v));
                if poly.are_adjacent(u, v) {
                    poly.skeleton.add_edge(u, v);
                }
            }
        }
        poly
    }

    /// The number of objectives
    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn vertex(&self, id: VertexId) -> &WeightSpaceVertex {
        &self.vertices[id.0]
    }

    pub fn facet(&self, id: FacetId) -> &WeightSpaceFacet {
        &self.facets[id.0]
    }

    pub fn n_facets(&self) -> usize {
        self.facets.len()
    }

    /// All vertices ever created, including obsolete ones
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &WeightSpaceVertex)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(idx, v)| (VertexId(idx), v))
    }

    fn vertices_in(&self, state: VertexState) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices()
            .filter(move |(_, v)| v.state() == state)
            .map(|(id, _)| id)
    }

    /// Unmarked vertices in the order their weights will be handed out
    pub fn unmarked(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.unmarked.iter().copied()
    }

    pub fn marked(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices_in(VertexState::Marked)
    }

    pub fn obsolete(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices_in(VertexState::Obsolete)
    }

    /// Vertices that are still part of the polyhedron
    pub fn live(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices()
            .filter(|(_, v)| v.state().is_live())
            .map(|(id, _)| id)
    }

    pub fn skeleton_edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.skeleton.edges()
    }

    pub fn skeleton_neighbors(&self, id: VertexId) -> &[VertexId] {
        self.skeleton.neighbors(id)
    }

    pub fn n_untested(&self) -> usize {
        self.unmarked.len()
    }

    /// The vertex whose weight was handed out last, if its result is still pending
    pub fn investigated(&self) -> Option<VertexId> {
        self.investigated
    }

    /// Checks whether two vertices share at least `dimension - 1` facets
    pub fn are_adjacent(&self, u: VertexId, v: VertexId) -> bool {
        facet::n_common(
            self.vertices[u.0].incident_facets(),
            self.vertices[v.0].incident_facets(),
        ) + 1
            >= self.dim
    }

    /// Checks whether an outcome cuts off a vertex
    pub fn is_vertex_obsolete(&self, eps: f64, id: VertexId, outcome: &[f64], is_ray: bool) -> bool {
        assert!(eps >= 0.);
        let vertex = &self.vertices[id.0];
        let bound = if is_ray { 0. } else { vertex.wov() };
        vertex.weighted_outcome(outcome) + eps < bound
    }

    pub fn has_untested_weight(&self) -> bool {
        !self.unmarked.is_empty()
    }

    /// Hands out the weight of the next unmarked vertex, which is then under investigation
    pub fn get_untested_weight(&mut self) -> Weight {
        assert!(
            self.investigated.is_none(),
            "a vertex is already under investigation"
        );
        let id = self
            .unmarked
            .pop_front()
            .unwrap_or_else(|| panic!("no untested weight available"));
        self.vertices[id.0].set_state(VertexState::UnderInvestigation);
        self.investigated = Some(id);
        self.vertices[id.0].weight().clone()
    }

    fn investigated_checked(&self, weight: &[f64]) -> VertexId {
        let Some(id) = self.investigated else {
            panic!("no vertex under investigation")
        };
        assert!(
            self.vertices[id.0].has_same_weight(weight),
            "weight does not belong to the investigated vertex"
        );
        id
    }

    /// The weighted objective value bound of the vertex under investigation
    pub fn untested_vertex_wov(&self, weight: &[f64]) -> f64 {
        let id = self.investigated_checked(weight);
        self.vertices[id.0].wov()
    }

    /// Cuts the polyhedron with the facet of a newly found outcome (or ray) that was found for
    /// the weight under investigation
    pub fn incorporate_new_outcome(
        &mut self,
        eps: f64,
        weight: &[f64],
        outcome: &Outcome,
        is_ray: bool,
    ) -> Result<(), NumericalInconsistency> {
        let id = self.investigated_checked(weight);
        assert_eq!(outcome.len(), self.dim, "outcome of different dimension");
        self.update(eps, id, outcome, is_ray)?;
        self.investigated = None;
        #[cfg(all(debug_assertions, feature = "check-skeleton"))]
        debug_assert!(self.has_valid_skeleton(self.dim));
        Ok(())
    }

    /// Marks the vertex under investigation, since the oracle returned an already known outcome
    pub fn incorporate_known_outcome(&mut self, weight: &[f64]) {
        let id = self.investigated_checked(weight);
        self.vertices[id.0].set_state(VertexState::Marked);
        self.investigated = None;
    }

    /// Collects the vertices cut off by the outcome, starting from the vertex under
    /// investigation, and the edges crossing the cut
    fn obsolete_frontier(
        &self,
        eps: f64,
        start: VertexId,
        outcome: &[f64],
        is_ray: bool,
    ) -> (Vec<VertexId>, Vec<(VertexId, VertexId)>) {
        let mut is_obsolete = vec![false; self.vertices.len()];
        is_obsolete[start.0] = true;
        let mut obsolete = vec![start];
        let mut boundary = vec![];
        let mut unscanned = VecDeque::from([start]);
        while let Some(obs) = unscanned.pop_front() {
            for &adj in self.skeleton.neighbors(obs) {
                if is_obsolete[adj.0] {
                    continue;
                }
                if self.is_vertex_obsolete(eps, adj, outcome, is_ray) {
                    assert_ne!(
                        self.vertices[adj.0].state(),
                        VertexState::Marked,
                        "marked vertex made obsolete by new outcome"
                    );
                    is_obsolete[adj.0] = true;
                    obsolete.push(adj);
                    unscanned.push_back(adj);
                } else {
                    boundary.push((obs, adj));
                }
            }
        }
        (obsolete, boundary)
    }

    fn update(
        &mut self,
        eps: f64,
        start: VertexId,
        outcome: &Outcome,
        is_ray: bool,
    ) -> Result<(), NumericalInconsistency> {
        let (obsolete, boundary) = self.obsolete_frontier(eps, start, outcome, is_ray);

        // all fallible work happens before the polyhedron is modified
        let new_facet = FacetId(self.facets.len());
        let mut new_vertices = Vec::with_capacity(boundary.len());
        for &(obs, non_obs) in &boundary {
            let obs_vertex = &self.vertices[obs.0];
            let non_obs_vertex = &self.vertices[non_obs.0];
            let obs_slack = non_obs_vertex.slack(outcome, is_ray);
            let non_obs_slack = obs_vertex.slack(outcome, is_ray);
            if !(obs_slack > -SLACK_TOLERANCE && non_obs_slack < SLACK_TOLERANCE) {
                return Err(NumericalInconsistency::Combination {
                    obs_slack,
                    non_obs_slack,
                });
            }
            new_vertices.push(WeightSpaceVertex::combine(
                obs_vertex,
                non_obs_vertex,
                new_facet,
                outcome,
                is_ray,
                self.numerics,
                self.ray_offset,
            )?);
        }

        self.facets
            .push(WeightSpaceFacet::from_outcome(outcome.clone(), is_ray));
        for &id in &obsolete {
            self.vertices[id.0].set_state(VertexState::Obsolete);
        }
        let mut new_ids = Vec::with_capacity(new_vertices.len());
        for (vertex, &(_, non_obs)) in new_vertices.into_iter().zip(&boundary) {
            let id = self.skeleton.add_node();
            self.vertices.push(vertex);
            self.unmarked.push_back(id);
            self.skeleton.add_edge(id, non_obs);
            new_ids.push(id);
        }
        self.connect_new_vertices(&new_ids, &boundary);
        self.unmarked
            .retain(|id| self.vertices[id.0].state() != VertexState::Obsolete);
        for &id in &obsolete {
            self.skeleton.isolate(id);
        }
        Ok(())
    }

    /// Adds the edges between new vertices and between new vertices and the surviving
    /// neighborhood of the cut
    fn connect_new_vertices(&mut self, new_ids: &[VertexId], boundary: &[(VertexId, VertexId)]) {
        let mut candidates: Vec<VertexId> = boundary
            .iter()
            .flat_map(|&(_, non_obs)| {
                std::iter::once(non_obs).chain(self.skeleton.neighbors(non_obs).iter().copied())
            })
            .filter(|id| self.vertices[id.0].state().is_live())
            .collect();
        candidates.sort_unstable();
        candidates.dedup();
        for (idx, &new) in new_ids.iter().enumerate() {
            for &other in new_ids[idx + 1..].iter().chain(&candidates) {
                if other != new && self.are_adjacent(new, other) {
                    self.skeleton.add_edge(new, other);
                }
            }
        }
    }

    /// Checks the skeleton for consistency: edges are symmetric, join adjacent live vertices,
    /// and every live vertex has at least `dim - 1` neighbors if there is more than one
    pub fn has_valid_skeleton(&self, dim: usize) -> bool {
        if dim != self.dim || !self.skeleton.is_symmetric() {
            return false;
        }
        let edges_ok = self.skeleton.edges().all(|(u, v)| {
            self.vertices[u.0].state().is_live()
                && self.vertices[v.0].state().is_live()
                && self.are_adjacent(u, v)
        });
        if !edges_ok {
            return false;
        }
        let n_live = self.live().count();
        n_live <= 1
            || self
                .live()
                .all(|id| self.skeleton.degree(id) + 1 >= self.dim)
    }
}

impl fmt::Display for WeightSpacePolyhedron {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FACETS:")?;
        for (idx, facet) in self.facets.iter().enumerate() {
            writeln!(f, "  {}: {facet}", FacetId(idx))?;
        }
        for (title, state) in [
            ("UNMARKED VERTICES:", VertexState::Unmarked),
            ("MARKED VERTICES:", VertexState::Marked),
            ("OBSOLETE VERTICES:", VertexState::Obsolete),
        ] {
            writeln!(f, "{title}")?;
            for id in self.vertices_in(state) {
                writeln!(f, "  {id}: {}", self.vertices[id.0])?;
            }
        }
        if let Some(id) = self.investigated {
            writeln!(f, "UNDER INVESTIGATION:\n  {id}: {}", self.vertices[id.0])?;
        }
        write!(f, "SKELETON: {} edges", self.skeleton.n_edges())
    }
}
