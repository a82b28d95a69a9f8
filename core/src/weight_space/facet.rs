//! # Weight-Space Facets
//!
//! Facets are immutable once created and shared by all incident vertices through [`FacetId`]
//! handles into the facet arena of the polyhedron.

use std::fmt;

use itertools::Itertools;

use crate::types::{weighted_value, Outcome};

/// Handle of a facet in the arena of a [`super::WeightSpacePolyhedron`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FacetId(pub(super) usize);

impl FacetId {
    pub fn idx(self) -> usize {
        self.0
    }
}

impl fmt::Display for FacetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// The inequality `outcome · w >= wov_coeff * wov` in the lifted weight space
#[derive(Clone, Debug, PartialEq)]
pub struct WeightSpaceFacet {
    outcome: Outcome,
    wov_coeff: f64,
}

impl WeightSpaceFacet {
    pub fn new(outcome: Outcome, wov_coeff: f64) -> Self {
        WeightSpaceFacet { outcome, wov_coeff }
    }

    /// The facet induced by a newly found outcome or ray
    pub fn from_outcome(outcome: Outcome, is_ray: bool) -> Self {
        WeightSpaceFacet {
            outcome,
            wov_coeff: if is_ray { 0. } else { 1. },
        }
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn wov_coeff(&self) -> f64 {
        self.wov_coeff
    }

    /// The left-hand side of the inequality for a weight
    pub fn weighted_weight(&self, weight: &[f64]) -> f64 {
        weighted_value(weight, &self.outcome)
    }
}

impl fmt::Display for WeightSpaceFacet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] * w >= {} * wov",
            self.outcome.iter().format(", "),
            self.wov_coeff
        )
    }
}

/// Sorted intersection of two sorted facet handle lists
pub(super) fn intersect(first: &[FacetId], second: &[FacetId]) -> Vec<FacetId> {
    first
        .iter()
        .merge_join_by(second, |a, b| a.cmp(b))
        .filter_map(|either| match either {
            itertools::EitherOrBoth::Both(a, _) => Some(*a),
            _ => None,
        })
        .collect()
}

/// Number of common facets of two sorted facet handle lists
pub(super) fn n_common(first: &[FacetId], second: &[FacetId]) -> usize {
    first
        .iter()
        .merge_join_by(second, |a, b| a.cmp(b))
        .filter(|either| either.is_both())
        .count()
}
