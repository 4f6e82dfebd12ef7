//! Reduction of nondeterministic automata by merging and deleting states, following the approach
//! of Ilie, Navarro and Yu.
//!
//! The forward simulation preorder relates states whose right languages are included in each
//! other, the backward simulation preorder (the forward preorder of the reversed automaton) does
//! the same for left languages. Merging two states does not change the accepted language if they
//! are forward equivalent or if they are backward equivalent. A state that is below another one
//! in both preorders is deleted outright: every accepting run through it has a counterpart
//! through the larger state, while merging would hand its transitions to that state.
use tracing::{debug, trace};

use crate::{
    automaton::{Automaton, StateId},
    math::BitSet,
    relation::Relation,
};

/// Which pairs a pass acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// `p` and `q` simulate each other in the forward preorder, `p` is merged into `q`.
    ForwardEquivalent,
    /// `p` and `q` simulate each other in the backward preorder, `p` is merged into `q`.
    BackwardEquivalent,
    /// `p` is simulated by `q` in both preorders, `p` is deleted.
    Dominated,
}

/// State of an ongoing reduction.
struct Reducer<'a> {
    aut: &'a mut Automaton,
    forward: Relation,
    backward: Relation,
    removed: BitSet,
}

impl<'a> Reducer<'a> {
    fn new(aut: &'a mut Automaton) -> Self {
        let (forward, backward) = Self::preorders(aut);
        Self {
            aut,
            forward,
            backward,
            removed: BitSet::new(),
        }
    }

    /// Computes the forward and the backward simulation preorder of `aut`.
    fn preorders(aut: &mut Automaton) -> (Relation, Relation) {
        let forward = aut.simulation();
        aut.reverse();
        let backward = aut.simulation();
        aut.reverse();
        trace!(
            "forward preorder {}, backward preorder {}",
            forward.show(aut),
            backward.show(aut)
        );
        (forward, backward)
    }

    /// Recomputes both preorders for the current shape of the automaton.
    fn refresh(&mut self) {
        (self.forward, self.backward) = Self::preorders(self.aut);
    }

    fn applies(&self, pass: Pass, p: StateId, q: StateId) -> bool {
        match pass {
            Pass::ForwardEquivalent => self.forward.contains(p, q) && self.forward.contains(q, p),
            Pass::BackwardEquivalent => {
                self.backward.contains(p, q) && self.backward.contains(q, p)
            }
            Pass::Dominated => self.forward.contains(p, q) && self.backward.contains(p, q),
        }
    }

    fn is_candidate(&self, p: StateId, q: StateId) -> bool {
        p != q && !self.removed.contains(p) && !self.removed.contains(q)
    }

    fn dominated_pair(&self) -> Option<(StateId, StateId)> {
        self.forward
            .iter()
            .find(|&(p, q)| self.is_candidate(p, q) && self.applies(Pass::Dominated, p, q))
    }

    fn run(&mut self, pass: Pass) {
        if pass == Pass::Dominated {
            // deleting a state can shrink the languages of its neighbours
            while let Some((p, q)) = self.dominated_pair() {
                trace!("{pass:?}: deleting {} below {}", p, q);
                self.aut.isolate(p);
                self.removed.insert(p);
                self.refresh();
            }
            return;
        }
        let candidates: Vec<(StateId, StateId)> = match pass {
            Pass::BackwardEquivalent => self.backward.iter().collect(),
            _ => self.forward.iter().collect(),
        };
        for (p, q) in candidates {
            if self.is_candidate(p, q) && self.applies(pass, p, q) {
                trace!("{pass:?}: merging {} into {}", p, q);
                self.merge(p, q);
            }
        }
    }

    /// Merges `p` into `q` and updates both preorders: `q` keeps only those upper bounds that
    /// are also upper bounds of `p`, and every pair mentioning `p` is dropped.
    fn merge(&mut self, p: StateId, q: StateId) {
        self.aut.merge_into(p, q);
        self.removed.insert(p);
        let n = self.aut.size();
        for relation in [&mut self.forward, &mut self.backward] {
            for s in 0..n {
                if relation.contains(q, s) && !relation.contains(p, s) {
                    relation.remove(q, s);
                }
            }
            for s in 0..n {
                relation.remove(p, s);
                relation.remove(s, p);
            }
        }
    }
}

impl Automaton {
    /// Reduces the number of states using the forward and backward simulation preorders. Three
    /// passes are made: the first merges states that are forward equivalent, the second states
    /// that are backward equivalent and the third deletes `p` whenever some `q` simulates `p` in
    /// both directions. Both preorders are recomputed before the second and third pass and after
    /// every deletion. The language does not change and the number of states never grows.
    /// Removed states are dropped at the end, which renumbers the remaining states. Returns the
    /// number of removed states.
    ///
    /// # Example
    /// ```
    /// use automata_engine::prelude::*;
    ///
    /// let mut aut = Automaton::builder()
    ///     .with_edges([(0, 'a', 1), (0, 'a', 2), (1, 'b', 3), (2, 'b', 3)])
    ///     .with_initial([0])
    ///     .with_final([3])
    ///     .into_automaton("diamond");
    /// assert_eq!(aut.reduce(), 1);
    /// assert_eq!(aut.size(), 3);
    /// assert!(aut.accepts(&[0, 1]));
    /// ```
    pub fn reduce(&mut self) -> usize {
        let before = self.size();
        let mut reducer = Reducer::new(self);
        reducer.run(Pass::ForwardEquivalent);
        reducer.refresh();
        reducer.run(Pass::BackwardEquivalent);
        reducer.refresh();
        reducer.run(Pass::Dominated);
        let removed = reducer.removed;
        let keep: BitSet = (0..before).filter(|q| !removed.contains(*q)).collect();
        self.retain_states(&keep);
        debug!("reduced {} from {} to {} states", self.name(), before, self.size());
        before - self.size()
    }

    /// Consumes `self` and returns the reduced automaton, see [`Self::reduce`].
    pub fn reduced(mut self) -> Self {
        self.reduce();
        self
    }
}
