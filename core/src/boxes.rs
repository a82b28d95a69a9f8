//! # Axis-Aligned Boxes in Outcome Space
//!
//! Boxes are used by the two-projection phase to cover the part of outcome space that may still
//! contain non-dominated outcomes not found by the bi-objective sweeps.

use std::fmt;

use itertools::Itertools;

use crate::types::Outcome;

/// An interval `[lo, hi]` of one dimension
pub type Interval = (f64, f64);

/// A box given by one interval per objective
#[derive(Debug, Clone, PartialEq)]
pub struct RectangularBox {
    intervals: Vec<Interval>,
}

impl RectangularBox {
    pub fn new(intervals: Vec<Interval>) -> Self {
        RectangularBox { intervals }
    }

    /// Builds a box from a prefix of intervals, one interval in the middle, and a suffix
    fn from_parts(prefix: &[Interval], middle: Interval, suffix: &[Interval]) -> Self {
        let mut intervals = Vec::with_capacity(prefix.len() + 1 + suffix.len());
        intervals.extend_from_slice(prefix);
        intervals.push(middle);
        intervals.extend_from_slice(suffix);
        RectangularBox { intervals }
    }

    /// The number of dimensions
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn interval(&self, idx: usize) -> Interval {
        self.intervals[idx]
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Checks whether every interval of `other` is contained in the one of this box
    pub fn is_superset_of(&self, other: &RectangularBox) -> bool {
        assert_eq!(self.len(), other.len(), "boxes of different dimension");
        self.intervals
            .iter()
            .zip(&other.intervals)
            .all(|(s, o)| s.0 <= o.0 && s.1 >= o.1)
    }

    /// Checks whether every interval of this box is contained in the one of `other`
    pub fn is_subset_of(&self, other: &RectangularBox) -> bool {
        assert_eq!(self.len(), other.len(), "boxes of different dimension");
        self.intervals
            .iter()
            .zip(&other.intervals)
            .all(|(s, o)| s.0 >= o.0 && s.1 <= o.1)
    }

    /// Checks whether the boxes have an empty intersection in some dimension
    pub fn is_disjoint_from(&self, other: &RectangularBox) -> bool {
        assert_eq!(self.len(), other.len(), "boxes of different dimension");
        self.intervals
            .iter()
            .zip(&other.intervals)
            .any(|(s, o)| s.0.max(o.0) > s.1.min(o.1))
    }

    /// Checks whether every interval is wider than `epsilon`
    pub fn is_feasible(&self, epsilon: f64) -> bool {
        self.intervals.iter().all(|(lo, hi)| lo + epsilon <= *hi)
    }

    /// The intersection of the intervals of dimension `idx`
    pub fn interval_intersection(&self, idx: usize, other: &RectangularBox) -> Interval {
        assert_eq!(self.len(), other.len(), "boxes of different dimension");
        let lo = self.intervals[idx].0.max(other.intervals[idx].0);
        let hi = self.intervals[idx].1.min(other.intervals[idx].1);
        debug_assert!(lo <= hi, "intervals in dimension {idx} do not intersect");
        (lo, hi)
    }

    /// Splits off the parts of this box that are not covered by `other`
    ///
    /// Dimensions are processed in order. For dimension `i` the parts left and right of `other`
    /// are emitted, combined with the intersections of the dimensions before `i` and the
    /// original intervals of the dimensions after `i`. Parts narrower than `delta` are dropped.
    /// Parts keep a gap of `epsilon` to `other`.
    pub fn disjoint_parts_from(
        &self,
        epsilon: f64,
        delta: f64,
        other: &RectangularBox,
    ) -> Vec<RectangularBox> {
        assert_eq!(self.len(), other.len(), "boxes of different dimension");
        let mut parts = vec![];
        let mut intersections = Vec::with_capacity(self.len());
        for (idx, (&(lo, hi), &(other_lo, other_hi))) in
            self.intervals.iter().zip(&other.intervals).enumerate()
        {
            let suffix = &self.intervals[idx + 1..];
            if lo < other_lo - epsilon {
                let part =
                    RectangularBox::from_parts(&intersections, (lo, other_lo - epsilon), suffix);
                if part.is_feasible(delta) {
                    parts.push(part);
                }
            }
            if other_hi + epsilon < hi {
                let part =
                    RectangularBox::from_parts(&intersections, (other_hi + epsilon, hi), suffix);
                if part.is_feasible(delta) {
                    parts.push(part);
                }
            }
            intersections.push(self.interval_intersection(idx, other));
        }
        parts
    }

    /// The intersection of two boxes, if not disjoint
    pub fn intersection(&self, other: &RectangularBox) -> Option<RectangularBox> {
        if self.is_disjoint_from(other) {
            return None;
        }
        Some(RectangularBox::new(
            (0..self.len())
                .map(|idx| self.interval_intersection(idx, other))
                .collect(),
        ))
    }

    /// Checks whether a point lies in the box
    pub fn contains(&self, point: &[f64]) -> bool {
        debug_assert_eq!(self.len(), point.len());
        self.intervals
            .iter()
            .zip(point)
            .all(|((lo, hi), val)| lo <= val && val <= hi)
    }
}

impl fmt::Display for RectangularBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.intervals
                .iter()
                .format_with(" ", |(lo, hi), f| f(&format_args!("[ {lo}, {hi} ]")))
        )
    }
}

/// Builds the candidate boxes for three objectives from the non-dominated outcomes of the
/// projections onto the objective pairs `(0, 1)`, `(0, 2)` and `(1, 2)`
///
/// Every triple of outcomes spans a box. Only boxes that are feasible with respect to `delta`
/// are kept.
pub fn compute_feasible_boxes(
    nd_01: &[Outcome],
    nd_02: &[Outcome],
    nd_12: &[Outcome],
    delta: f64,
) -> Vec<RectangularBox> {
    assert!(!nd_01.is_empty() && !nd_02.is_empty() && !nd_12.is_empty());
    let mut boxes = vec![];
    for o01 in nd_01 {
        for o02 in nd_02 {
            for o12 in nd_12 {
                let cand = RectangularBox::new(vec![
                    (o01[0].max(o02[0]), o12[0]),
                    (o01[1].max(o12[1]), o02[1]),
                    (o02[2].max(o12[2]), o01[2]),
                ]);
                if cand.is_feasible(delta) {
                    boxes.push(cand);
                }
            }
        }
    }
    boxes
}

/// Turns a collection of boxes into pairwise disjoint boxes covering the same region
///
/// Boxes that are subsets of other boxes are removed first. The remaining boxes are then added
/// one by one, replacing every previously added box that overlaps the new one by its parts
/// outside of the new box.
pub fn compute_disjoint_boxes(
    boxes: Vec<RectangularBox>,
    epsilon: f64,
    delta: f64,
) -> Vec<RectangularBox> {
    // drop redundant boxes, keeping the first of equal boxes
    let mut kept: Vec<RectangularBox> = Vec::with_capacity(boxes.len());
    for (idx, cand) in boxes.iter().enumerate() {
        let redundant = boxes.iter().enumerate().any(|(other_idx, other)| {
            other_idx != idx
                && cand.is_subset_of(other)
                && (!other.is_subset_of(cand) || other_idx < idx)
        });
        if !redundant {
            kept.push(cand.clone());
        }
    }

    let mut disjoint: Vec<RectangularBox> = vec![];
    while let Some(to_add) = kept.pop() {
        let mut next = Vec::with_capacity(disjoint.len() + 1);
        for elem in disjoint {
            if to_add.is_disjoint_from(&elem) {
                next.push(elem);
            } else if to_add.is_superset_of(&elem) {
                continue;
            } else {
                next.extend(elem.disjoint_parts_from(epsilon, delta, &to_add));
            }
        }
        next.push(to_add);
        disjoint = next;
    }
    disjoint
}

/// Checks whether no two boxes intersect
pub fn boxes_are_pairwise_disjoint(boxes: &[RectangularBox]) -> bool {
    boxes
        .iter()
        .tuple_combinations()
        .all(|(a, b)| a.is_disjoint_from(b))
}
