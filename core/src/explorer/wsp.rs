//! # Weight-Space Phase
//!
//! Computes the extreme supported outcomes by handing the weights of the unmarked vertices of
//! the weight-space polyhedron to the oracle until every vertex is confirmed.

use crate::{
    ddm::DoubleDescription,
    oracle::{Oracle, OracleResult},
    termination::{ensure, Flow},
    weight_space::WeightSpacePolyhedron,
};

use super::{ExplorationStatus, Explorer, Frontier, Scope};

impl<O: Oracle> Explorer<O> {
    /// Runs the weight-space phase. Returns [`ExplorationStatus::Finished`] if all extreme
    /// supported outcomes were found.
    pub(super) fn weight_space_phase(
        &mut self,
        frontier: &mut Frontier,
        scope: &Scope,
    ) -> Flow<ExplorationStatus> {
        debug_assert!(self.n_objs >= 2);
        debug_assert!(!frontier.bounded.is_empty());

        self.log_routine_start("double description")?;
        let mut ddm = DoubleDescription::new(
            self.n_objs,
            &frontier.bounded,
            &frontier.unbounded,
            self.config.numerics,
        );
        ddm.compute_v_rep();
        let (v_rep, h_rep) = ddm.into_parts();
        self.log_routine_end()?;

        let mut poly = WeightSpacePolyhedron::new(
            self.n_objs,
            v_rep,
            h_rep,
            self.config.numerics,
            self.config.ray_offset,
        );
        ensure!(
            poly.has_valid_skeleton(self.n_objs),
            "initial weight space polyhedron has an invalid skeleton"
        );

        self.log_routine_start("weight space")?;
        let res = self.explore_weight_space(&mut poly, frontier, scope);
        self.stats.n_vertices_created += poly.vertices().count();
        self.stats.n_vertices_obsolete += poly.obsolete().count();
        if !scope.is_sub {
            self.polyhedron = Some(poly);
        }
        let status = res?;
        self.log_routine_end()?;
        Ok(status)
    }

    fn explore_weight_space(
        &mut self,
        poly: &mut WeightSpacePolyhedron,
        frontier: &mut Frontier,
        scope: &Scope,
    ) -> Flow<ExplorationStatus> {
        let epsilon = self.config.epsilon;
        while poly.has_untested_weight() {
            let weight = poly.get_untested_weight();
            let res = self.solve_weighted(weight.clone(), scope.bounds.clone())?;
            match res {
                OracleResult::Optimal { solution, value } => {
                    // outcomes only tying the vertex would cut it off with zero slack
                    if value + epsilon < poly.untested_vertex_wov(&weight) {
                        poly.incorporate_new_outcome(
                            epsilon,
                            &weight,
                            solution.outcome(),
                            false,
                        )?;
                        self.add_bounded(frontier, solution, scope)?;
                    } else {
                        poly.incorporate_known_outcome(&weight);
                    }
                }
                OracleResult::Unbounded { ray: Some(ray) } => {
                    poly.incorporate_new_outcome(epsilon, &weight, ray.outcome(), true)?;
                    self.add_unbounded(frontier, ray, scope)?;
                }
                res => return self.non_opt_status(&res, scope, "weight space phase"),
            }
        }
        Ok(ExplorationStatus::Finished)
    }
}
