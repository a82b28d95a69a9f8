//! # Non-Dominated Projections
//!
//! Tracker of the non-dominated projections of outcomes onto two objectives, used to sweep the
//! bi-objective projection from left to right.

use std::{cmp::Ordering, fmt};

use crate::types::{Outcome, Solution, TwoDProj};

/// Sorted, epsilon-deduplicated map from projections to the solutions sharing them
///
/// Two projections are considered equal in sort order if their first coordinates are within
/// epsilon of each other and their second coordinates are equal. Entries are pairwise not
/// epsilon-dominated after construction. A cursor tracks the progress of the sweep and always
/// points to an existing entry.
#[derive(Debug, Clone)]
pub struct NondomProjections {
    epsilon: f64,
    entries: Vec<(TwoDProj, Vec<Solution>)>,
    current: usize,
}

impl NondomProjections {
    /// Projects all solutions onto the objectives `first` and `second` and removes projections
    /// that are epsilon-dominated by their predecessor
    pub fn new<'a, I>(epsilon: f64, solutions: I, first: usize, second: usize) -> Self
    where
        I: IntoIterator<Item = &'a Solution>,
    {
        assert!(first < second);
        let mut proj = NondomProjections {
            epsilon,
            entries: vec![],
            current: 0,
        };
        for sol in solutions {
            proj.add(TwoDProj::new(sol.outcome(), first, second), sol.clone());
        }
        assert!(!proj.entries.is_empty(), "no solutions to project");

        let mut idx = 0;
        while idx + 1 < proj.entries.len() {
            if proj.epsilon_dominates(&proj.entries[idx].0, &proj.entries[idx + 1].0) {
                proj.entries.remove(idx + 1);
            } else {
                idx += 1;
            }
        }
        proj.current = 0;
        proj
    }

    fn compare(&self, lhs: &TwoDProj, rhs: &TwoDProj) -> Ordering {
        if lhs.first() + self.epsilon < rhs.first() {
            Ordering::Less
        } else if rhs.first() + self.epsilon < lhs.first() {
            Ordering::Greater
        } else {
            lhs.second().total_cmp(&rhs.second())
        }
    }

    /// Inserts a projection, appending the solution if the projection is already present.
    /// Returns the index of the entry.
    fn add(&mut self, proj: TwoDProj, sol: Solution) -> usize {
        match self
            .entries
            .binary_search_by(|(probe, _)| self.compare(probe, &proj))
        {
            Ok(idx) => {
                self.entries[idx].1.push(sol);
                idx
            }
            Err(idx) => {
                self.entries.insert(idx, (proj, vec![sol]));
                if idx <= self.current && self.entries.len() > 1 {
                    self.current += 1;
                }
                idx
            }
        }
    }

    /// Removes the entry at `idx`, which must not be the cursor
    fn remove(&mut self, idx: usize) {
        debug_assert_ne!(idx, self.current);
        self.entries.remove(idx);
        if idx < self.current {
            self.current -= 1;
        }
    }

    /// Checks whether `lhs` epsilon-dominates `rhs`
    pub fn epsilon_dominates(&self, lhs: &TwoDProj, rhs: &TwoDProj) -> bool {
        lhs.first() - self.epsilon < rhs.first() && lhs.second() - self.epsilon < rhs.second()
    }

    /// The projection at the cursor
    pub fn left_proj(&self) -> TwoDProj {
        self.entries[self.current].0
    }

    /// The projection following the cursor
    pub fn right_proj(&self) -> TwoDProj {
        assert!(self.current + 1 < self.entries.len(), "cursor at last element");
        self.entries[self.current + 1].0
    }

    /// The last projection, which bounds the sweep
    pub fn last_proj(&self) -> TwoDProj {
        self.entries[self.entries.len() - 1].0
    }

    /// Advances the cursor without adding a projection
    pub fn update(&mut self) {
        assert!(
            self.current + 1 < self.entries.len(),
            "cannot advance cursor past last element"
        );
        self.current += 1;
    }

    /// Inserts a newly found projection and removes the entries it epsilon-dominates, starting
    /// at the cursor
    pub fn update_with(&mut self, proj: TwoDProj, sol: Solution) {
        assert!(
            self.current + 1 < self.entries.len(),
            "cannot update with cursor at last element"
        );
        let mut idx = self.add(proj, sol);
        if idx != self.current && self.epsilon_dominates(&proj, &self.entries[self.current].0) {
            let old = self.current;
            self.current = idx;
            self.remove(old);
            if old < idx {
                idx -= 1;
            }
        }
        while idx + 1 < self.entries.len()
            && idx + 1 != self.current
            && self.epsilon_dominates(&proj, &self.entries[idx + 1].0)
        {
            self.remove(idx + 1);
        }
    }

    /// Checks whether the sweep reached the last projection
    pub fn finished(&self) -> bool {
        debug_assert!(self.current < self.entries.len());
        self.current + 1 == self.entries.len()
    }

    /// The outcomes of all solutions in the tracker in sorted order
    pub fn nondom_proj_outcomes(&self) -> Vec<Outcome> {
        self.entries
            .iter()
            .flat_map(|(_, sols)| sols.iter().map(|sol| sol.outcome().clone()))
            .collect()
    }

    /// The index of the cursor
    pub fn cursor(&self) -> usize {
        self.current
    }

    /// The number of distinct projections
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TwoDProj, &[Solution])> {
        self.entries.iter().map(|(proj, sols)| (proj, sols.as_slice()))
    }
}

impl fmt::Display for NondomProjections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (proj, sols)) in self.entries.iter().enumerate() {
            let marker = if idx == self.current { "*" } else { " " };
            writeln!(f, "{marker}{proj} ({} solutions)", sols.len())?;
        }
        Ok(())
    }
}
