//! # Weight-Space Vertices

use std::fmt;

use itertools::Itertools;

use super::{
    facet::{self, FacetId},
    NumericalInconsistency,
};
use crate::types::{weighted_value, Weight};

/// Handle of a vertex in the arena of a [`super::WeightSpacePolyhedron`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub(super) usize);

impl VertexId {
    pub fn idx(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Lifecycle of a vertex
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VertexState {
    /// The weight of the vertex still needs to be handed to the oracle
    #[default]
    Unmarked,
    /// The vertex is confirmed by the known outcomes
    Marked,
    /// The vertex was cut off by a newly found outcome
    Obsolete,
    /// The weight of the vertex was handed out and the result is pending
    UnderInvestigation,
}

impl VertexState {
    /// Checks whether the vertex is still part of the polyhedron
    pub fn is_live(self) -> bool {
        !matches!(self, VertexState::Obsolete)
    }
}

impl fmt::Display for VertexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexState::Unmarked => write!(f, "unmarked"),
            VertexState::Marked => write!(f, "marked"),
            VertexState::Obsolete => write!(f, "obsolete"),
            VertexState::UnderInvestigation => write!(f, "under investigation"),
        }
    }
}

/// A vertex of the weight-space polyhedron: a weight together with the weighted objective
/// value (wov) that bounds all outcomes known so far
#[derive(Clone, Debug, PartialEq)]
pub struct WeightSpaceVertex {
    /// Sorted handles of the incident facets
    incident_facets: Vec<FacetId>,
    weight: Weight,
    wov: f64,
    state: VertexState,
}

impl WeightSpaceVertex {
    pub fn new(mut incident_facets: Vec<FacetId>, weight: Weight, wov: f64) -> Self {
        incident_facets.sort_unstable();
        WeightSpaceVertex {
            incident_facets,
            weight,
            wov,
            state: VertexState::default(),
        }
    }

    /// Creates the vertex on the edge between an obsolete and a non-obsolete vertex where the
    /// facet of a new outcome cuts the edge
    pub(super) fn combine(
        obs: &WeightSpaceVertex,
        non_obs: &WeightSpaceVertex,
        new_facet: FacetId,
        outcome: &[f64],
        is_ray: bool,
        numerics: f64,
        ray_offset: f64,
    ) -> Result<Self, NumericalInconsistency> {
        debug_assert_eq!(obs.weight.len(), non_obs.weight.len());
        let mut incident_facets = facet::intersect(&obs.incident_facets, &non_obs.incident_facets);
        #[cfg(feature = "check-skeleton")]
        debug_assert_eq!(incident_facets.len() + 1, obs.incident_facets.len());
        if let Err(pos) = incident_facets.binary_search(&new_facet) {
            incident_facets.insert(pos, new_facet);
        }

        let mut h = combination_value(obs, non_obs, outcome, is_ray, numerics)?;
        if is_ray {
            // shift towards the non-obsolete vertex
            h += ray_offset;
        }
        let weight = non_obs
            .weight
            .iter()
            .zip(&obs.weight)
            .map(|(n, o)| h * n + (1. - h) * o)
            .collect();
        let wov = h * non_obs.wov + (1. - h) * obs.wov;
        Ok(WeightSpaceVertex {
            incident_facets,
            weight,
            wov,
            state: VertexState::Unmarked,
        })
    }

    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    /// The current weighted objective value bound of the vertex
    pub fn wov(&self) -> f64 {
        self.wov
    }

    pub fn state(&self) -> VertexState {
        self.state
    }

    pub(super) fn set_state(&mut self, state: VertexState) {
        self.state = state;
    }

    pub fn incident_facets(&self) -> &[FacetId] {
        &self.incident_facets
    }

    pub fn weighted_outcome(&self, outcome: &[f64]) -> f64 {
        assert_eq!(outcome.len(), self.weight.len(), "outcome of different dimension");
        weighted_value(&self.weight, outcome)
    }

    /// Slack of the vertex with respect to the facet of an outcome
    pub fn slack(&self, outcome: &[f64], is_ray: bool) -> f64 {
        let wov = if is_ray { 0. } else { self.wov };
        self.weighted_outcome(outcome) - wov
    }

    pub fn has_same_weight(&self, weight: &[f64]) -> bool {
        self.weight == weight
    }

    /// Checks whether the weight is exactly a unit vector
    pub fn has_unit_weight(&self) -> bool {
        self.weight.iter().filter(|w| **w == 1.).count() == 1
            && self.weight.iter().all(|w| *w == 0. || *w == 1.)
    }
}

/// The parameter `h` such that `h * non_obs + (1 - h) * obs` lies on the facet of the outcome
fn combination_value(
    obs: &WeightSpaceVertex,
    non_obs: &WeightSpaceVertex,
    outcome: &[f64],
    is_ray: bool,
    numerics: f64,
) -> Result<f64, NumericalInconsistency> {
    let numerator = -obs.slack(outcome, is_ray);
    let denominator = numerator + non_obs.slack(outcome, is_ray);
    if denominator.abs() <= numerics {
        return Err(NumericalInconsistency::VanishingDenominator);
    }
    let h = numerator / denominator;
    if !(-numerics..=1. + numerics).contains(&h) {
        return Err(NumericalInconsistency::CombinationValue(h));
    }
    Ok(h.clamp(0., 1.))
}

impl fmt::Display for WeightSpaceVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "weight = [{}] wov = {} ({}) facets = {{{}}}",
            self.weight.iter().format(", "),
            self.wov,
            self.state,
            self.incident_facets.iter().format(", ")
        )
    }
}
