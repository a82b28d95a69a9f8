//! # Double Description Method
//!
//! Conversion of the initial weight-space H-representation into its V-representation.
//!
//! The weight space is lifted by the weighted objective value (wov) and described by the
//! homogeneous inequalities
//! - `e_i · w >= 0` for every objective `i`,
//! - `y · w - wov >= 0` for every bounded outcome `y`,
//! - `r · w >= 0` for every ray `r`.
//!
//! The inequalities are added one at a time, starting from a simple cone spanned by the unit
//! vectors and the artificial generator `(0, ..., 0 | -1)`. The artificial generator is dropped
//! once all inequalities are processed.

use std::fmt;

use itertools::Itertools;

use crate::types::{Outcome, Solution, Weight};

/// Coefficient magnitude above which a V-representation element is rescaled
const NORMALIZING_THRESHOLD: f64 = 1e5;

const WORD_BITS: usize = usize::BITS as usize;

/// Set of H-representation rows with zero slack
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZeroSet {
    words: Vec<usize>,
}

impl ZeroSet {
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.words
            .get(idx / WORD_BITS)
            .is_some_and(|w| (*w & (1usize << (idx % WORD_BITS))) != 0)
    }

    pub fn insert(&mut self, idx: usize) {
        let word = idx / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1usize << (idx % WORD_BITS);
    }

    pub fn intersection(&self, other: &Self) -> Self {
        ZeroSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & b)
                .collect(),
        }
    }

    /// Checks whether every row in `other` is also in `self`
    pub fn is_superset_of(&self, other: &Self) -> bool {
        other.words.iter().enumerate().all(|(idx, word)| {
            let own = self.words.get(idx).copied().unwrap_or(0);
            own & word == *word
        })
    }

    /// Restricts the set to the rows before `n_rows`
    pub fn truncated(&self, n_rows: usize) -> Self {
        let mut words: Vec<usize> = self
            .words
            .iter()
            .take(n_rows.div_ceil(WORD_BITS))
            .copied()
            .collect();
        if n_rows % WORD_BITS != 0 {
            if let Some(last) = words.get_mut(n_rows / WORD_BITS) {
                *last &= (1usize << (n_rows % WORD_BITS)) - 1;
            }
        }
        ZeroSet { words }
    }

    pub fn cardinality(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the contained rows in increasing order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(widx, word)| {
            (0..WORD_BITS)
                .filter(move |bit| word & (1usize << bit) != 0)
                .map(move |bit| widx * WORD_BITS + bit)
        })
    }
}

/// A single inequality `coeffs · w - rhs * wov >= 0` of the H-representation
#[derive(Clone, Debug, PartialEq)]
pub struct HalfSpace {
    coeffs: Outcome,
    rhs: f64,
}

impl HalfSpace {
    pub fn new(coeffs: Outcome, rhs: f64) -> Self {
        HalfSpace { coeffs, rhs }
    }

    pub fn coeffs(&self) -> &Outcome {
        &self.coeffs
    }

    /// The coefficient of the weighted objective value (1 for outcomes, 0 otherwise)
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Evaluates the inequality for a lifted weight
    pub fn slack(&self, weight: &[f64], wov: f64) -> f64 {
        debug_assert_eq!(weight.len(), self.coeffs.len());
        self.coeffs
            .iter()
            .zip(weight)
            .fold(-(self.rhs * wov), |acc, (c, w)| acc + c * w)
    }

    pub fn into_parts(self) -> (Outcome, f64) {
        (self.coeffs, self.rhs)
    }
}

impl fmt::Display for HalfSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.coeffs.iter().format(", "), self.rhs)
    }
}

/// A generator of the lifted weight-space cone
#[derive(Clone, Debug, PartialEq)]
pub struct VRep {
    weight: Weight,
    wov: f64,
    slacks: Vec<f64>,
    zeros: ZeroSet,
    /// First row with negative slack, `None` if the generator satisfies every row
    min_infeas_ind: Option<usize>,
}

impl VRep {
    /// Creates a generator from a lifted weight
    pub fn new(weight: Weight, wov: f64, h_rep: &[HalfSpace], numerics: f64) -> Self {
        let mut vrep = VRep {
            weight,
            wov,
            slacks: vec![],
            zeros: ZeroSet::default(),
            min_infeas_ind: None,
        };
        vrep.normalize_if_needed();
        vrep.set_slacks(h_rep, numerics);
        vrep
    }

    /// Creates the generator on row `row` that combines a generator with positive slack and
    /// one with negative slack
    pub fn combine(
        plus: &VRep,
        minus: &VRep,
        row: usize,
        h_rep: &[HalfSpace],
        numerics: f64,
    ) -> Self {
        let m_coeff = plus.slacks[row];
        let p_coeff = minus.slacks[row];
        debug_assert!(m_coeff > numerics);
        debug_assert!(p_coeff < -numerics);
        let weight = minus
            .weight
            .iter()
            .zip(&plus.weight)
            .map(|(m, p)| m_coeff * m - p_coeff * p)
            .collect();
        let wov = m_coeff * minus.wov - p_coeff * plus.wov;
        VRep::new(weight, wov, h_rep, numerics)
    }

    fn normalize_if_needed(&mut self) {
        if self.wov.abs() > NORMALIZING_THRESHOLD
            || self.weight.iter().any(|w| *w > NORMALIZING_THRESHOLD)
        {
            self.weight
                .iter_mut()
                .for_each(|w| *w /= NORMALIZING_THRESHOLD);
            self.wov /= NORMALIZING_THRESHOLD;
        }
    }

    fn set_slacks(&mut self, h_rep: &[HalfSpace], numerics: f64) {
        self.slacks = Vec::with_capacity(h_rep.len());
        for (idx, half) in h_rep.iter().enumerate() {
            let slack = half.slack(&self.weight, self.wov);
            if slack.abs() <= numerics {
                self.slacks.push(0.);
                self.zeros.insert(idx);
                continue;
            }
            if slack < 0. && self.min_infeas_ind.is_none() {
                self.min_infeas_ind = Some(idx);
            }
            self.slacks.push(slack);
        }
    }

    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    pub fn wov(&self) -> f64 {
        self.wov
    }

    pub fn slack(&self, row: usize) -> f64 {
        self.slacks[row]
    }

    pub fn zero_slacks(&self) -> &ZeroSet {
        &self.zeros
    }

    pub fn is_zero_slack(&self, row: usize) -> bool {
        self.zeros.contains(row)
    }

    pub fn min_infeas_ind(&self) -> Option<usize> {
        self.min_infeas_ind
    }

    /// Checks whether the weight components sum to (numerically) zero
    pub fn has_zero_weight(&self, numerics: f64) -> bool {
        self.weight.iter().sum::<f64>().abs() <= numerics
    }

    pub fn into_parts(self) -> (Weight, f64, ZeroSet) {
        (self.weight, self.wov, self.zeros)
    }
}

impl fmt::Display for VRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Weight = [{}] Coeff = {} Zeros = {{{}}}",
            self.weight.iter().format(", "),
            self.wov,
            self.zeros.iter().format(", ")
        )
    }
}

fn approx_eq(a: f64, b: f64, numerics: f64) -> bool {
    (a - b).abs() <= numerics
}

/// Checks whether `k * v == w` for some scalar `k`, with the lifted coordinate included
pub fn is_multiple(v: &VRep, w: &VRep, numerics: f64) -> bool {
    assert_eq!(v.weight.len(), w.weight.len(), "weights of different dimension");
    if approx_eq(v.wov, w.wov, numerics) {
        let Some((v_val, w_val)) = v
            .weight
            .iter()
            .zip(&w.weight)
            .find(|(a, b)| !approx_eq(**a, **b, numerics))
        else {
            // multiple is one
            return true;
        };
        if v.wov.abs() > numerics {
            // equal non-zero wov only allows the multiple one
            return false;
        }
        if v_val.abs() <= numerics || w_val.abs() <= numerics {
            return false;
        }
        return weight_is_multiple(w_val / v_val, v, w, numerics);
    }
    if v.wov.abs() <= numerics || w.wov.abs() <= numerics {
        // only the zero generator could be a multiple
        return false;
    }
    weight_is_multiple(w.wov / v.wov, v, w, numerics)
}

fn weight_is_multiple(multiple: f64, v: &VRep, w: &VRep, numerics: f64) -> bool {
    v.weight
        .iter()
        .zip(&w.weight)
        .all(|(a, b)| approx_eq(multiple * a, *b, numerics))
}

/// Incremental H- to V-representation conversion of the lifted weight space
#[derive(Debug, Clone)]
pub struct DoubleDescription {
    n_objs: usize,
    numerics: f64,
    h_rep: Vec<HalfSpace>,
    v_rep: Vec<VRep>,
    current_row: usize,
}

impl DoubleDescription {
    /// Builds the H-representation from the known bounded outcomes and rays
    pub fn new<'b, 'u, B, U>(n_objs: usize, bounded: B, unbounded: U, numerics: f64) -> Self
    where
        B: IntoIterator<Item = &'b Solution>,
        U: IntoIterator<Item = &'u Solution>,
    {
        assert!(n_objs >= 2, "weight space needs at least two objectives");
        let mut h_rep: Vec<HalfSpace> = (0..n_objs)
            .map(|idx| HalfSpace::new(crate::types::unit_weight(n_objs, idx), 0.))
            .collect();
        h_rep.extend(
            bounded
                .into_iter()
                .map(|sol| HalfSpace::new(sol.outcome().clone(), 1.)),
        );
        assert!(h_rep.len() > n_objs, "no bounded outcomes");
        h_rep.extend(
            unbounded
                .into_iter()
                .map(|sol| HalfSpace::new(sol.outcome().clone(), 0.)),
        );
        assert!(
            h_rep.iter().all(|h| h.coeffs.len() == n_objs),
            "outcomes of different dimension"
        );
        DoubleDescription {
            n_objs,
            numerics,
            h_rep,
            v_rep: vec![],
            current_row: n_objs,
        }
    }

    fn initial_v_rep(&self) -> Vec<VRep> {
        let first = &self.h_rep[self.current_row];
        let mut v_rep = Vec::with_capacity(self.n_objs + 1);
        v_rep.push(VRep::new(
            vec![0.; self.n_objs],
            -1.,
            &self.h_rep,
            self.numerics,
        ));
        for idx in 0..self.n_objs {
            v_rep.push(VRep::new(
                crate::types::unit_weight(self.n_objs, idx),
                first.coeffs[idx],
                &self.h_rep,
                self.numerics,
            ));
        }
        v_rep
    }

    /// Computes the V-representation
    pub fn compute_v_rep(&mut self) {
        assert!(self.v_rep.is_empty(), "V-representation already computed");
        let mut current = self.initial_v_rep();
        self.current_row += 1;
        while self.current_row < self.h_rep.len() {
            current = self.extend(current);
            self.current_row += 1;
        }
        let n_before = current.len();
        current.retain(|v| !v.has_zero_weight(self.numerics));
        assert_eq!(
            current.len() + 1,
            n_before,
            "expected to remove exactly the artificial generator"
        );
        self.v_rep = current;
    }

    /// Adds the inequality at the current row to the V-representation
    fn extend(&self, current: Vec<VRep>) -> Vec<VRep> {
        let row = self.current_row;
        let mut extended = vec![];
        let mut plus = vec![];
        let mut minus = vec![];
        for (idx, vrep) in current.iter().enumerate() {
            let slack = vrep.slack(row);
            if slack < -self.numerics {
                minus.push(idx);
            } else if slack <= self.numerics {
                extended.push(vrep.clone());
            } else {
                plus.push(idx);
            }
        }
        for (&p, &m) in plus.iter().cartesian_product(&minus) {
            if self.is_adjacent(p, m, &current) {
                extended.push(VRep::combine(
                    &current[p],
                    &current[m],
                    row,
                    &self.h_rep,
                    self.numerics,
                ));
            }
        }
        extended.extend(plus.into_iter().map(|idx| current[idx].clone()));
        extended
    }

    /// Combinatorial adjacency test of two generators
    fn is_adjacent(&self, first: usize, second: usize, current: &[VRep]) -> bool {
        debug_assert_ne!(first, second);
        // only rows already added to the cone decide adjacency
        let common = current[first]
            .zeros
            .intersection(&current[second].zeros)
            .truncated(self.current_row);
        current.iter().enumerate().all(|(idx, other)| {
            idx == first
                || idx == second
                || !other.zeros.is_superset_of(&common)
                || is_multiple(other, &current[first], self.numerics)
                || is_multiple(other, &current[second], self.numerics)
        })
    }

    pub fn n_objs(&self) -> usize {
        self.n_objs
    }

    pub fn h_rep(&self) -> &[HalfSpace] {
        &self.h_rep
    }

    pub fn v_rep(&self) -> &[VRep] {
        &self.v_rep
    }

    pub fn into_parts(self) -> (Vec<VRep>, Vec<HalfSpace>) {
        (self.v_rep, self.h_rep)
    }
}
