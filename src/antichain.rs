//! Antichain-based decision procedures for universality and language inclusion.
//!
//! Both procedures explore the subset construction on the fly, but only keep those macro-states
//! that are minimal with respect to a subsumption preorder: a macro-state `P` is subsumed by `S`
//! if every member of `S` is simulated by some member of `P`, in which case everything that can
//! go wrong from `P` can also go wrong from `S`. The simulation preorder gives much more
//! subsumption than the identity relation, but any preorder that implies language inclusion
//! leads to the same answer.
use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    alphabet::Letter,
    automaton::{Automaton, StateId},
    relation::Relation,
    Error,
};

/// Selects the preorder that is used for subsumption between macro-states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Subsumption {
    /// The maximal simulation preorder, see [`Automaton::simulation`].
    #[default]
    Simulation,
    /// Only the identity relation, which turns subsumption into plain set inclusion.
    Identity,
}

impl Subsumption {
    /// Computes the selected preorder over the states of `aut`.
    pub fn preorder(&self, aut: &Automaton) -> Relation {
        match self {
            Subsumption::Simulation => aut.simulation(),
            Subsumption::Identity => Relation::identity(aut.size()),
        }
    }
}

/// A set of states of the subset construction. It is rejecting if none of its members is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroState {
    states: Vec<StateId>,
    rejecting: bool,
}

impl MacroState {
    /// Creates the macro-state consisting of the given states, duplicates are removed.
    pub fn new<I: IntoIterator<Item = StateId>>(aut: &Automaton, states: I) -> Self {
        let states = states.into_iter().unique().collect_vec();
        let rejecting = !states.iter().any(|&q| aut.is_final(q));
        Self { states, rejecting }
    }

    /// The members of the macro-state.
    pub fn states(&self) -> &[StateId] {
        &self.states
    }

    /// Returns true if no member is final.
    pub fn is_rejecting(&self) -> bool {
        self.rejecting
    }

    /// Returns the macro-state of all `letter`-successors of members.
    pub fn post(&self, aut: &Automaton, letter: Letter) -> Self {
        Self::new(
            aut,
            self.states
                .iter()
                .flat_map(|&q| aut.successors(q, letter).iter().copied()),
        )
    }

    /// Removes every member that is simulated by another member which is kept. Of two members
    /// that simulate each other, the one appearing later survives.
    pub fn minimize(&mut self, preorder: &Relation) {
        let mut removed = vec![false; self.states.len()];
        for i in 0..self.states.len() {
            removed[i] = (0..self.states.len())
                .any(|j| i != j && !removed[j] && preorder.contains(self.states[i], self.states[j]));
        }
        let mut flags = removed.into_iter();
        self.states.retain(|_| !flags.next().unwrap_or(false));
    }

    /// Consumes `self` and returns the minimized macro-state, see [`Self::minimize`].
    pub fn minimized(mut self, preorder: &Relation) -> Self {
        self.minimize(preorder);
        self
    }

    /// Returns true if every member of `self` is simulated by some member of `other`.
    pub fn is_subset(&self, other: &MacroState, preorder: &Relation) -> bool {
        self.states
            .iter()
            .all(|&p| other.states.iter().any(|&q| preorder.contains(p, q)))
    }
}

/// A state of the automaton on the left of an inclusion check, paired with a macro-state of the
/// automaton on the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductState {
    state: StateId,
    macro_state: MacroState,
}

impl ProductState {
    /// Pairs `state` with `macro_state`.
    pub fn new(state: StateId, macro_state: MacroState) -> Self {
        Self { state, macro_state }
    }

    /// The state of the left automaton.
    pub fn state(&self) -> StateId {
        self.state
    }

    /// The macro-state of the right automaton.
    pub fn macro_state(&self) -> &MacroState {
        &self.macro_state
    }

    /// Returns true if a word leading here is accepted on the left but not on the right.
    pub fn is_counterexample(&self, aut: &Automaton) -> bool {
        aut.is_final(self.state) && self.macro_state.is_rejecting()
    }

    /// Returns true if `self` is subsumed by `other`, i.e. the state of `self` is simulated by
    /// that of `other`, while the macro-state of `other` is a subset of that of `self`.
    pub fn is_subsumed_by(&self, other: &ProductState, preorder: &Relation) -> bool {
        preorder.contains(self.state, other.state)
            && other.macro_state.is_subset(&self.macro_state, preorder)
    }

    /// Returns true if the state is simulated by some member of the macro-state, in which case
    /// nothing that is accepted from here can be missing on the right.
    fn is_trivially_covered(&self, preorder: &Relation) -> bool {
        self.macro_state
            .states()
            .iter()
            .any(|&q| preorder.contains(self.state, q))
    }
}

/// Decides whether an automaton accepts every word over its alphabet.
#[derive(Debug, Clone, Copy)]
pub struct Universality<'a> {
    automaton: &'a Automaton,
}

impl<'a> Universality<'a> {
    /// Prepares the universality check for `automaton`.
    pub fn new(automaton: &'a Automaton) -> Self {
        Self { automaton }
    }

    /// Runs the check with the given preorder over the states of the automaton, which must imply
    /// language inclusion (like the simulation preorder or the identity).
    pub fn check(&self, preorder: &Relation) -> bool {
        let aut = self.automaton;
        let initial = MacroState::new(aut, aut.initial_states());
        if initial.is_rejecting() {
            trace!("the empty word is rejected");
            return false;
        }
        let mut next = vec![initial.minimized(preorder)];
        let mut processed: Vec<MacroState> = Vec::new();

        while let Some(current) = next.pop() {
            for a in aut.alphabet().letters() {
                let post = current.post(aut, a).minimized(preorder);
                if post.is_rejecting() {
                    trace!("found rejecting macro-state after letter {a}");
                    return false;
                }
                if processed
                    .iter()
                    .chain(&next)
                    .chain([&current])
                    .any(|s| s.is_subset(&post, preorder))
                {
                    continue;
                }
                processed.retain(|s| !post.is_subset(s, preorder));
                next.retain(|s| !post.is_subset(s, preorder));
                next.push(post);
            }
            processed.push(current);
        }
        debug!("{} is universal, {} macro-states kept", aut.name(), processed.len());
        true
    }
}

/// Decides language inclusion between two automata over the same alphabet. The check runs on
/// the disjoint union of both, where the states below `offset` belong to the left automaton and
/// the others to the right automaton, so that a single preorder relates states of both.
#[derive(Debug, Clone, Copy)]
pub struct Inclusion<'a> {
    union: &'a Automaton,
    offset: usize,
}

impl<'a> Inclusion<'a> {
    /// Prepares the inclusion check on the disjoint union `union`, whose states `0..offset`
    /// belong to the left automaton.
    pub fn new(union: &'a Automaton, offset: usize) -> Self {
        Self { union, offset }
    }

    /// Runs the check with the given preorder over the states of the union, which must imply
    /// language inclusion. Returns true if every word accepted by the left automaton is also
    /// accepted by the right one.
    pub fn check(&self, preorder: &Relation) -> bool {
        let aut = self.union;
        let initial = MacroState::new(aut, aut.initial_states().filter(|&q| q >= self.offset))
            .minimized(preorder);
        let seeds = aut
            .initial_states()
            .filter(|&p| p < self.offset)
            .map(|p| ProductState::new(p, initial.clone()))
            .collect_vec();
        if seeds.iter().any(|s| s.is_counterexample(aut)) {
            trace!("the empty word is a counterexample");
            return false;
        }

        // seeds are dropped one after another, each one only in favour of a seed that is kept
        let mut dropped = vec![false; seeds.len()];
        for i in 0..seeds.len() {
            dropped[i] = seeds[i].is_trivially_covered(preorder)
                || (0..seeds.len()).any(|j| {
                    i != j && !dropped[j] && seeds[i].is_subsumed_by(&seeds[j], preorder)
                });
        }
        let mut next = seeds
            .into_iter()
            .zip(dropped)
            .filter_map(|(seed, dropped)| (!dropped).then_some(seed))
            .collect_vec();
        let mut processed: Vec<ProductState> = Vec::new();

        while let Some(current) = next.pop() {
            for a in aut.alphabet().letters() {
                let post = current.macro_state.post(aut, a).minimized(preorder);
                for &p in aut.successors(current.state, a) {
                    let candidate = ProductState::new(p, post.clone());
                    if candidate.is_counterexample(aut) {
                        trace!("found counterexample after letter {a}");
                        return false;
                    }
                    if candidate.is_trivially_covered(preorder)
                        || processed
                            .iter()
                            .chain(&next)
                            .chain([&current])
                            .any(|s| candidate.is_subsumed_by(s, preorder))
                    {
                        continue;
                    }
                    processed.retain(|s| !s.is_subsumed_by(&candidate, preorder));
                    next.retain(|s| !s.is_subsumed_by(&candidate, preorder));
                    next.push(candidate);
                }
            }
            processed.push(current);
        }
        debug!("inclusion holds, {} product states kept", processed.len());
        true
    }
}

impl Automaton {
    /// Decides whether every word over the alphabet is accepted, using the antichain algorithm
    /// with the given subsumption.
    ///
    /// # Example
    /// ```
    /// use automata_engine::prelude::*;
    ///
    /// let aut = Automaton::builder()
    ///     .with_edges([(0, 'a', 0), (0, 'b', 0), (0, 'a', 1), (0, 'b', 1)])
    ///     .with_initial([0])
    ///     .with_final([1])
    ///     .into_automaton("nonempty_words");
    /// assert!(!aut.is_universal(Subsumption::Simulation));
    /// ```
    pub fn is_universal(&self, subsumption: Subsumption) -> bool {
        Universality::new(self).check(&subsumption.preorder(self))
    }

    /// Decides whether the language of `self` is included in that of `other`. Both automata
    /// must share the same alphabet, otherwise [`Error::IncompatibleAlphabets`] is returned.
    pub fn is_included_in(&self, other: &Automaton, subsumption: Subsumption) -> Result<bool, Error> {
        if self.alphabet() != other.alphabet() {
            return Err(Error::IncompatibleAlphabets {
                left: self.alphabet().clone(),
                right: other.alphabet().clone(),
            });
        }
        let (union, offset) = self.disjoint_union(other);
        let preorder = subsumption.preorder(&union);
        Ok(Inclusion::new(&union, offset).check(&preorder))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        prelude::*,
        tests::{contains_ab, sigma_star, single_step},
    };

    const BOTH: [Subsumption; 2] = [Subsumption::Simulation, Subsumption::Identity];

    fn ends_with_letter() -> Automaton {
        Automaton::builder()
            .with_edges([(0, 'a', 0), (0, 'b', 0), (0, 'a', 1), (0, 'b', 1)])
            .with_initial([0])
            .with_final([1])
            .into_automaton("nonempty")
    }

    #[test]
    fn macro_state_minimization() {
        let aut = contains_ab();
        let preorder = aut.simulation();
        let mut macro_state = MacroState::new(&aut, [0, 1, 2, 1]);
        assert_eq!(macro_state.states(), &[0, 1, 2]);
        assert!(!macro_state.is_rejecting());
        macro_state.minimize(&preorder);
        assert_eq!(macro_state.states(), &[2]);

        let small = MacroState::new(&aut, [1]);
        assert!(small.is_subset(&macro_state, &preorder));
        assert!(!small.is_subset(&macro_state, &Relation::identity(3)));
        assert!(small.is_rejecting());

        let mut mutual = MacroState::new(&sigma_star(), [0, 0]);
        mutual.minimize(&Relation::identity(1));
        assert_eq!(mutual.states(), &[0]);
    }

    #[test_log::test]
    fn universality() {
        for subsumption in BOTH {
            assert!(sigma_star().is_universal(subsumption));
            assert!(!contains_ab().is_universal(subsumption));
            assert!(!ends_with_letter().is_universal(subsumption));
            assert!(!single_step().is_universal(subsumption));

            let mut with_epsilon = ends_with_letter();
            with_epsilon.set_final(0, true);
            assert!(with_epsilon.is_universal(subsumption));
        }
    }

    #[test_log::test]
    fn inclusion() {
        for subsumption in BOTH {
            let (a, universal) = (contains_ab(), sigma_star());
            assert_eq!(a.is_included_in(&universal, subsumption), Ok(true));
            assert_eq!(universal.is_included_in(&a, subsumption), Ok(false));
            assert_eq!(a.is_included_in(&a, subsumption), Ok(true));
            assert_eq!(a.is_included_in(&ends_with_letter(), subsumption), Ok(true));
            assert_eq!(ends_with_letter().is_included_in(&a, subsumption), Ok(false));
        }
    }

    #[test]
    fn universality_agrees_with_inclusion_of_sigma_star() {
        let mut with_epsilon = ends_with_letter();
        with_epsilon.set_final(0, true);
        for aut in [contains_ab(), ends_with_letter(), with_epsilon, sigma_star()] {
            for subsumption in BOTH {
                assert_eq!(
                    Ok(aut.is_universal(subsumption)),
                    sigma_star().is_included_in(&aut, subsumption)
                );
            }
        }
    }

    #[test]
    fn inclusion_needs_equal_alphabets() {
        assert!(matches!(
            single_step().is_included_in(&sigma_star(), Subsumption::Simulation),
            Err(Error::IncompatibleAlphabets { .. })
        ));
    }

    #[test]
    fn mutually_simulating_initial_states() {
        let left = Automaton::builder()
            .with_edges([(0, 'a', 2), (1, 'a', 2)])
            .with_alphabet(['b'])
            .with_initial([0, 1])
            .with_final([2])
            .into_automaton("twins");
        let right = Automaton::builder()
            .with_edges([(0, 'b', 0)])
            .with_alphabet(['a'])
            .with_initial([0])
            .with_final([0])
            .into_automaton("b_star");
        assert_eq!(left.is_included_in(&right, Subsumption::Simulation), Ok(false));
        assert_eq!(left.is_included_in(&right, Subsumption::Identity), Ok(false));
    }
}
