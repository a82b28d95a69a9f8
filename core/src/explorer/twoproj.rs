//! # Two-Projection Phase
//!
//! For two or three objectives, the non-dominated projections onto every objective pair are
//! computed by sweeping the projection from left to right with weighted Chebyshev
//! scalarizations. For three objectives, the projections leave boxes of outcome space that may
//! contain further non-dominated outcomes. Each of these boxes is explored as a sub-problem.

use itertools::Itertools;

use crate::{
    boxes::{self, RectangularBox},
    oracle::{Chebyshev, ObjectiveBound, Oracle, OracleResult},
    projections::NondomProjections,
    termination::Flow,
    types::{outcomes_coincide, Outcome, Solution, TwoDProj},
};

use super::{ExplorationStatus, Explorer, Frontier, Scope};

impl<O: Oracle> Explorer<O> {
    pub(super) fn two_proj_phase(&mut self) -> Flow {
        debug_assert!(matches!(self.n_objs, 2 | 3));
        let mut fronts = Vec::with_capacity(3);
        for (first, second) in (0..self.n_objs).tuple_combinations() {
            if self.status != ExplorationStatus::TwoProjPhase {
                return Ok(());
            }
            fronts.push(self.chebyshev_sweep(first, second)?);
        }
        if self.n_objs == 3 && self.status == ExplorationStatus::TwoProjPhase {
            self.explore_boxes(&fronts[0], &fronts[1], &fronts[2])?;
        }
        if self.status == ExplorationStatus::TwoProjPhase {
            self.status = ExplorationStatus::Finished;
        }
        Ok(())
    }

    /// Computes the non-dominated projections onto the objectives `first` and `second` and
    /// returns the outcomes of the solutions attaining them
    fn chebyshev_sweep(&mut self, first: usize, second: usize) -> Flow<Vec<Outcome>> {
        self.log_routine_start("chebyshev sweep")?;
        let mut projs = NondomProjections::new(
            self.config.epsilon,
            self.bounded.iter().chain(&self.unsupported),
            first,
            second,
        );
        let last = projs.last_proj();
        while !projs.finished() && self.status == ExplorationStatus::TwoProjPhase {
            let left = projs.left_proj();
            let right = projs.right_proj();
            debug_assert!(left.first() < right.first());
            debug_assert!(left.second() > last.second());

            let bounds = [
                ObjectiveBound::range(first, left.first(), right.first()),
                ObjectiveBound::range(second, last.second(), left.second()),
            ];
            // both neighbors lie on the boundary of the norm rectangle
            let reference = (left.first() - 1., last.second() - 1.);
            let scal = Chebyshev {
                objs: (first, second),
                reference,
                beta: (
                    1.,
                    (right.first() - reference.0) / (left.second() - reference.1),
                ),
            };
            match self.solve_chebyshev(&scal, &bounds)? {
                OracleResult::Optimal { solution, .. } => {
                    let proj = TwoDProj::new(solution.outcome(), first, second);
                    if projs.epsilon_dominates(&left, &proj)
                        || projs.epsilon_dominates(&right, &proj)
                    {
                        projs.update();
                    } else if let Some(nondom) =
                        self.nondom_proj_result(first, second, &left, &last, &proj)?
                    {
                        let nd_proj = TwoDProj::new(nondom.outcome(), first, second);
                        self.add_unsupported(nondom.clone())?;
                        projs.update_with(nd_proj, nondom);
                    }
                }
                res => {
                    self.status = self.non_opt_status(
                        &res,
                        &Scope::default(),
                        "weighted Chebyshev scalarization",
                    )?
                }
            }
        }
        self.log_routine_end()?;
        Ok(projs.nondom_proj_outcomes())
    }

    /// Recovers a non-dominated result whose projection weakly dominates `proj`
    ///
    /// First, the sum of the two objectives is minimised within the bounds given by `proj`.
    /// Then the two objectives are fixed and the sum of all objectives is minimised.
    fn nondom_proj_result(
        &mut self,
        first: usize,
        second: usize,
        left: &TwoDProj,
        last: &TwoDProj,
        proj: &TwoDProj,
    ) -> Flow<Option<Solution>> {
        let mut weight = vec![0.; self.n_objs];
        weight[first] = 1.;
        weight[second] = 1.;
        let bounds = vec![
            ObjectiveBound::range(first, left.first(), proj.first()),
            ObjectiveBound::range(second, last.second(), proj.second()),
        ];
        let intermediate = match self.solve_weighted(weight, bounds)? {
            OracleResult::Optimal { solution, .. } => solution,
            res => {
                self.status = self.non_opt_status(&res, &Scope::default(), "projection result")?;
                return Ok(None);
            }
        };
        let fixed = vec![
            ObjectiveBound::fixed(first, intermediate.outcome()[first]),
            ObjectiveBound::fixed(second, intermediate.outcome()[second]),
        ];
        match self.solve_weighted(vec![1.; self.n_objs], fixed)? {
            OracleResult::Optimal { solution, .. } => Ok(Some(solution)),
            res => {
                self.status = self.non_opt_status(&res, &Scope::default(), "projection result")?;
                Ok(None)
            }
        }
    }

    /// Explores the boxes left by the three pairwise projection fronts
    fn explore_boxes(&mut self, nd_01: &[Outcome], nd_02: &[Outcome], nd_12: &[Outcome]) -> Flow {
        let feasible = boxes::compute_feasible_boxes(nd_01, nd_02, nd_12, self.config.delta);
        let disjoint =
            boxes::compute_disjoint_boxes(feasible, self.config.epsilon, self.config.delta);
        debug_assert!(boxes::boxes_are_pairwise_disjoint(&disjoint));
        self.log_message(&format!("exploring {} disjoint boxes", disjoint.len()))?;

        for bx in &disjoint {
            let (status, results) = self.compute_nondom_points_in_box(bx)?;
            if matches!(
                status,
                ExplorationStatus::TimeLimitReached | ExplorationStatus::Error
            ) {
                self.status = status;
                return Ok(());
            }
            for sol in results {
                if self.knows_result(sol.outcome()) {
                    continue;
                }
                let dominated = self.box_result_is_dominated(sol.outcome())?;
                if self.status != ExplorationStatus::TwoProjPhase {
                    return Ok(());
                }
                if !dominated {
                    self.add_unsupported(sol)?;
                }
            }
        }
        Ok(())
    }

    /// Explores a sub-problem restricted to a box with the lexicographic and weight-space
    /// phases
    fn compute_nondom_points_in_box(
        &mut self,
        bx: &RectangularBox,
    ) -> Flow<(ExplorationStatus, Vec<Solution>)> {
        debug_assert_eq!(bx.len(), self.n_objs);
        self.log_routine_start("box")?;
        let scope = Scope::within(bx, self.config.delta);
        let mut frontier = Frontier::default();
        let mut status = self.lex_opt_phase(&mut frontier, &scope)?;
        if status == ExplorationStatus::LexOptPhase {
            status = if frontier.bounded.len() > 1 {
                self.weight_space_phase(&mut frontier, &scope)?
            } else {
                ExplorationStatus::Finished
            };
        }
        self.log_routine_end()?;
        Ok((status, frontier.bounded))
    }

    /// Checks whether a result of a box is dominated by any feasible outcome
    fn box_result_is_dominated(&mut self, outcome: &[f64]) -> Flow<bool> {
        let bounds = outcome
            .iter()
            .enumerate()
            .map(|(obj, &val)| ObjectiveBound::upper(obj, val))
            .collect();
        match self.solve_weighted(vec![1.; self.n_objs], bounds)? {
            OracleResult::Optimal { value, .. } => {
                Ok(value + self.config.epsilon < outcome.iter().sum::<f64>())
            }
            res => {
                self.status = self.non_opt_status(&res, &Scope::default(), "dominance check")?;
                Ok(false)
            }
        }
    }

    fn knows_result(&self, outcome: &[f64]) -> bool {
        self.bounded
            .iter()
            .chain(&self.unsupported)
            .any(|sol| outcomes_coincide(sol.outcome(), outcome, self.config.epsilon))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        oracle::Explicit,
        options::{ExplorationConfig, ExplorationMode, Limits},
        types::outcomes_coincide,
    };

    use super::super::{ExplorationStatus, Explorer};

    /// Three extreme outcomes and their centroid, all on the plane `y · 1 = 3`
    fn triangle() -> Explicit {
        Explicit::from_outcomes(
            3,
            [
                vec![0., 1., 2.],
                vec![1., 2., 0.],
                vec![2., 0., 1.],
                vec![1., 1., 1.],
            ],
        )
    }

    #[test]
    fn three_objectives_box() {
        let mut explorer = Explorer::new(triangle(), ExplorationConfig::default()).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.status(), ExplorationStatus::Finished);
        assert_eq!(explorer.bounded().len(), 3);
        // the centroid is only found inside the box [1, 2]^3
        assert_eq!(explorer.unsupported().len(), 1);
        assert!(outcomes_coincide(
            explorer.unsupported()[0].outcome(),
            &[1., 1., 1.],
            1e-5
        ));
        assert!(!explorer.dominated_points_found());
    }

    #[test]
    fn three_objectives_weight_space_only() {
        let config = ExplorationConfig::default().with_mode(ExplorationMode::WeightSpaceOnly);
        let mut explorer = Explorer::new(triangle(), config).unwrap();
        explorer.explore(Limits::none()).unwrap();
        assert_eq!(explorer.status(), ExplorationStatus::Finished);
        assert_eq!(explorer.bounded().len(), 3);
        assert!(explorer.unsupported().is_empty());
        let stats = explorer.stats();
        assert!(stats.n_vertices_created >= stats.n_vertices_obsolete);
    }
}
