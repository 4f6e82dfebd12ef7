//! Computation of the maximal simulation preorder.
//!
//! A state `q` simulates `p` if `q` is final whenever `p` is, and every transition `p -a-> p'`
//! can be matched by some `q -a-> q'` such that `q'` again simulates `p'`. The preorder is
//! obtained by first collecting all pairs that can certainly not be in the simulation and then
//! propagating this information backwards along the transitions, counting for every pair of a
//! state and a letter how many successors have already been ruled out.
use tracing::{debug, trace};

use crate::{
    alphabet::Letter,
    automaton::{Automaton, StateId},
    math::Map,
    relation::Relation,
};

impl Automaton {
    /// Computes the maximal forward simulation preorder. The returned relation contains `(p, q)`
    /// if and only if `p` is simulated by `q`, which implies that every word accepted from `p` is
    /// also accepted from `q`. The relation is reflexive and transitive.
    ///
    /// # Example
    /// ```
    /// use automata_engine::prelude::*;
    ///
    /// let aut = Automaton::builder()
    ///     .with_edges([(0, 'a', 1), (2, 'a', 1), (2, 'b', 1)])
    ///     .with_initial([0, 2])
    ///     .with_final([1])
    ///     .into_automaton("sim");
    /// let preorder = aut.simulation();
    /// assert!(preorder.contains(0, 2));
    /// assert!(!preorder.contains(2, 0));
    /// ```
    pub fn simulation(&self) -> Relation {
        let n = self.size();
        let letters = self.alphabet().len();
        let mut non_simulation = Relation::empty(n);
        let mut worklist: Vec<(StateId, StateId)> = Vec::new();

        for p in self.final_states() {
            for q in self.state_indices().filter(|&q| !self.is_final(q)) {
                non_simulation.insert(p, q);
                worklist.push((p, q));
            }
        }
        for p in self.state_indices() {
            for q in self.state_indices() {
                let unmatched = (0..letters).any(|a| {
                    !self.successors(p, a).is_empty() && self.successors(q, a).is_empty()
                });
                if unmatched && non_simulation.insert(p, q) {
                    worklist.push((p, q));
                }
            }
        }
        trace!("seeded non-simulation with {} pairs", worklist.len());

        // number of a-successors of k that are known not to simulate p, keyed by (a, p, k)
        let mut counters: Map<(Letter, StateId, StateId), usize> = Map::default();
        while let Some((p, q)) = worklist.pop() {
            for a in 0..letters {
                for &k in self.predecessors(q, a) {
                    let counter = counters.entry((a, p, k)).or_insert(0);
                    *counter += 1;
                    if *counter == self.state(k).cardinality(a) {
                        for &l in self.predecessors(p, a) {
                            if non_simulation.insert(l, k) {
                                worklist.push((l, k));
                            }
                        }
                    }
                }
            }
        }

        let simulation = non_simulation.complement();
        debug!(
            "simulation preorder of {} has {} pairs",
            self.name(),
            simulation.len()
        );
        simulation
    }
}
