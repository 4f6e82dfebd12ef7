use itertools::Itertools;
use tracing::trace;

use crate::{
    alphabet::{Alphabet, Letter},
    math::BitSet,
};

mod builder;
pub use builder::AutomatonBuilder;

/// States are identified by their position in the arena of an [`Automaton`]. An id stays
/// valid until the automaton is compacted (see [`Automaton::retain_states`]), which
/// renumbers the surviving states.
pub type StateId = usize;

/// A single state of an [`Automaton`]. It stores its name together with the outgoing and
/// the incoming transitions, both indexed by [`Letter`]. For every letter, the targets
/// are kept in the order in which the transitions were inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    name: String,
    successors: Vec<Vec<StateId>>,
    predecessors: Vec<Vec<StateId>>,
}

impl State {
    fn new(name: String, letters: usize) -> Self {
        Self {
            name,
            successors: vec![Vec::new(); letters],
            predecessors: vec![Vec::new(); letters],
        }
    }

    /// The name of the state.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The states that are reached from this state on `letter`.
    pub fn successors(&self, letter: Letter) -> &[StateId] {
        &self.successors[letter]
    }

    /// The states from which this state is reached on `letter`.
    pub fn predecessors(&self, letter: Letter) -> &[StateId] {
        &self.predecessors[letter]
    }

    /// Returns the number of outgoing transitions on `letter`.
    pub fn cardinality(&self, letter: Letter) -> usize {
        self.successors[letter].len()
    }
}

/// A nondeterministic finite automaton. The states live in an arena and transitions refer to
/// them by [`StateId`]. Each forward transition `(p, a, q)` is mirrored by precisely one
/// backward transition `(q, a, p)` stored with `q`, which is what makes [`Automaton::reverse`]
/// a constant-time operation per state.
///
/// Cloning an automaton gives an isomorphic deep copy, which is how a destructive algorithm
/// can be run repeatedly from an unmodified snapshot.
///
/// # Example
/// ```
/// use automata_engine::prelude::*;
///
/// let mut aut = Automaton::new("example", Alphabet::from_symbols(["a"]));
/// let q0 = aut.add_state("q0");
/// let q1 = aut.add_state("q1");
/// aut.add_edge(q0, 0, q1);
/// aut.set_initial(q0, true);
/// aut.set_final(q1, true);
///
/// assert!(aut.accepts(&[0]));
/// assert!(!aut.accepts(&[]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    name: String,
    alphabet: Alphabet,
    states: Vec<State>,
    initial: BitSet,
    accepting: BitSet,
}

impl Automaton {
    /// Creates an automaton without any states over the given alphabet.
    pub fn new(name: impl Into<String>, alphabet: Alphabet) -> Self {
        Self {
            name: name.into(),
            alphabet,
            states: Vec::new(),
            initial: BitSet::new(),
            accepting: BitSet::new(),
        }
    }

    /// Returns a builder for conveniently assembling an automaton from a list of edges.
    pub fn builder() -> AutomatonBuilder {
        AutomatonBuilder::default()
    }

    /// The name of the automaton.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The alphabet over which the automaton operates.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns the total number of transitions.
    pub fn transition_count(&self) -> usize {
        self.states
            .iter()
            .map(|s| s.successors.iter().map(Vec::len).sum::<usize>())
            .sum()
    }

    /// Iterates over the ids of all states.
    pub fn state_indices(&self) -> std::ops::Range<StateId> {
        0..self.states.len()
    }

    /// Gives access to the state with id `q`. Panics if there is no such state.
    pub fn state(&self, q: StateId) -> &State {
        &self.states[q]
    }

    /// Returns the name of the state `q`.
    pub fn state_name(&self, q: StateId) -> &str {
        &self.states[q].name
    }

    /// Searches a state by its name.
    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.states.iter().position(|s| s.name == name)
    }

    /// Adds a new state without any transitions and returns its id.
    pub fn add_state(&mut self, name: impl Into<String>) -> StateId {
        let id = self.states.len();
        self.states.push(State::new(name.into(), self.alphabet.len()));
        id
    }

    /// Inserts the transition `(source, letter, target)` together with its mirrored
    /// backward transition. Duplicate transitions are allowed, see [`Self::insert_edge`]
    /// for a deduplicating variant.
    pub fn add_edge(&mut self, source: StateId, letter: Letter, target: StateId) {
        self.states[source].successors[letter].push(target);
        self.states[target].predecessors[letter].push(source);
    }

    /// Inserts the transition `(source, letter, target)` unless it already exists. Returns
    /// true if the transition was inserted.
    pub fn insert_edge(&mut self, source: StateId, letter: Letter, target: StateId) -> bool {
        if self.has_edge(source, letter, target) {
            return false;
        }
        self.add_edge(source, letter, target);
        true
    }

    /// Returns true if the transition `(source, letter, target)` exists.
    pub fn has_edge(&self, source: StateId, letter: Letter, target: StateId) -> bool {
        self.states[source].successors[letter].contains(&target)
    }

    /// Removes one occurrence of the transition `(source, letter, target)` and its mirror.
    /// Returns false if there was no such transition.
    pub fn remove_edge(&mut self, source: StateId, letter: Letter, target: StateId) -> bool {
        if !remove_one(&mut self.states[source].successors[letter], target) {
            return false;
        }
        let mirrored = remove_one(&mut self.states[target].predecessors[letter], source);
        debug_assert!(mirrored, "forward edge without backward mirror");
        true
    }

    /// The successors of `q` on `letter`.
    pub fn successors(&self, q: StateId, letter: Letter) -> &[StateId] {
        &self.states[q].successors[letter]
    }

    /// The predecessors of `q` on `letter`.
    pub fn predecessors(&self, q: StateId, letter: Letter) -> &[StateId] {
        &self.states[q].predecessors[letter]
    }

    /// Iterates over the outgoing transitions of `q` as pairs of letter and target.
    pub fn edges_from(&self, q: StateId) -> impl Iterator<Item = (Letter, StateId)> + '_ {
        self.states[q]
            .successors
            .iter()
            .enumerate()
            .flat_map(|(a, targets)| targets.iter().map(move |&p| (a, p)))
    }

    /// Iterates over the incoming transitions of `q` as pairs of letter and source.
    pub fn edges_to(&self, q: StateId) -> impl Iterator<Item = (Letter, StateId)> + '_ {
        self.states[q]
            .predecessors
            .iter()
            .enumerate()
            .flat_map(|(a, sources)| sources.iter().map(move |&p| (a, p)))
    }

    /// Iterates over all transitions as triples `(source, letter, target)`.
    pub fn edges(&self) -> impl Iterator<Item = (StateId, Letter, StateId)> + '_ {
        self.state_indices()
            .flat_map(move |q| self.edges_from(q).map(move |(a, p)| (q, a, p)))
    }

    /// Marks `q` as initial or removes it from the initial states.
    pub fn set_initial(&mut self, q: StateId, initial: bool) {
        if initial {
            self.initial.insert(q);
        } else {
            self.initial.remove(q);
        }
    }

    /// Marks `q` as final or removes it from the final states.
    pub fn set_final(&mut self, q: StateId, accepting: bool) {
        if accepting {
            self.accepting.insert(q);
        } else {
            self.accepting.remove(q);
        }
    }

    /// Returns true if `q` is an initial state.
    pub fn is_initial(&self, q: StateId) -> bool {
        self.initial.contains(q)
    }

    /// Returns true if `q` is a final state.
    pub fn is_final(&self, q: StateId) -> bool {
        self.accepting.contains(q)
    }

    /// Iterates over the initial states in increasing order.
    pub fn initial_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.initial.iter()
    }

    /// Iterates over the final states in increasing order.
    pub fn final_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.accepting.iter()
    }

    /// Returns the set of initial states.
    pub fn initial_set(&self) -> &BitSet {
        &self.initial
    }

    /// Returns the set of final states.
    pub fn final_set(&self) -> &BitSet {
        &self.accepting
    }

    /// Reverses the automaton in place: every transition changes its direction and the sets of
    /// initial and final states are swapped. Reversing twice gives back the original automaton.
    pub fn reverse(&mut self) {
        for state in &mut self.states {
            std::mem::swap(&mut state.successors, &mut state.predecessors);
        }
        std::mem::swap(&mut self.initial, &mut self.accepting);
    }

    /// Consumes `self` and returns the reversed automaton, see [`Self::reverse`].
    pub fn reversed(mut self) -> Self {
        self.reverse();
        self
    }

    /// Returns true if no state has two different successors for the same letter. Duplicate
    /// transitions to the same target count as two successors.
    pub fn is_deterministic(&self) -> bool {
        self.states
            .iter()
            .all(|s| s.successors.iter().all(|targets| targets.len() <= 1))
    }

    /// Returns true if there is precisely one initial state and every state has precisely one
    /// successor for every letter.
    pub fn is_complete(&self) -> bool {
        self.initial.len() == 1
            && self
                .states
                .iter()
                .all(|s| s.successors.iter().all(|targets| targets.len() == 1))
    }

    /// Verifies that every forward transition is mirrored by precisely one backward transition
    /// and vice versa, and that no transition refers to a state outside the arena.
    pub fn is_mirrored(&self) -> bool {
        let n = self.states.len();
        let mut forward: Vec<(StateId, Letter, StateId)> = Vec::new();
        let mut backward: Vec<(StateId, Letter, StateId)> = Vec::new();
        for (q, state) in self.states.iter().enumerate() {
            for (a, targets) in state.successors.iter().enumerate() {
                forward.extend(targets.iter().map(|&p| (q, a, p)));
            }
            for (a, sources) in state.predecessors.iter().enumerate() {
                backward.extend(sources.iter().map(|&p| (p, a, q)));
            }
        }
        if forward.iter().chain(&backward).any(|&(p, _, q)| p >= n || q >= n) {
            return false;
        }
        forward.sort_unstable();
        backward.sort_unstable();
        forward == backward
    }

    /// Keeps only the states contained in `keep`. Every transition that refers to a removed
    /// state is stripped from both transition maps, the sets of initial and final states are
    /// filtered, and the surviving states are renumbered in their original order. Returns the
    /// mapping from old to new ids.
    pub fn retain_states(&mut self, keep: &BitSet) -> Vec<Option<StateId>> {
        let mut renaming = vec![None; self.states.len()];
        for (new, old) in keep.iter().filter(|&q| q < self.states.len()).enumerate() {
            renaming[old] = Some(new);
        }
        let removed = self.states.len() - renaming.iter().flatten().count();
        if removed == 0 {
            return renaming;
        }
        trace!("removing {removed} states from {}", self.name);

        let relink = |targets: &mut Vec<StateId>| {
            *targets = targets.iter().filter_map(|&p| renaming[p]).collect();
        };
        let states = std::mem::take(&mut self.states);
        self.states = states
            .into_iter()
            .enumerate()
            .filter(|(q, _)| renaming[*q].is_some())
            .map(|(_, mut state)| {
                state.successors.iter_mut().for_each(relink);
                state.predecessors.iter_mut().for_each(relink);
                state
            })
            .collect();

        let rename_set = |set: &BitSet| -> BitSet {
            set.iter()
                .filter_map(|q| renaming.get(q).copied().flatten())
                .collect()
        };
        self.initial = rename_set(&self.initial);
        self.accepting = rename_set(&self.accepting);
        debug_assert!(self.is_mirrored());
        renaming
    }

    /// Removes every transition of `p` from the arena and returns its former successor and
    /// predecessor lists. Self-loops of `p` appear in both lists.
    fn detach(&mut self, p: StateId) -> (Vec<Vec<StateId>>, Vec<Vec<StateId>>) {
        let letters = self.alphabet.len();
        let successors = std::mem::replace(&mut self.states[p].successors, vec![Vec::new(); letters]);
        let predecessors =
            std::mem::replace(&mut self.states[p].predecessors, vec![Vec::new(); letters]);

        // self-loops of p have been taken along with both lists
        for (a, targets) in successors.iter().enumerate() {
            for &t in targets.iter().filter(|&&t| t != p) {
                remove_one(&mut self.states[t].predecessors[a], p);
            }
        }
        for (a, sources) in predecessors.iter().enumerate() {
            for &s in sources.iter().filter(|&&s| s != p) {
                remove_one(&mut self.states[s].successors[a], p);
            }
        }
        (successors, predecessors)
    }

    /// Drops every transition entering or leaving `p` and clears its initial and final flags.
    /// The state itself stays in the arena, so all ids stay valid.
    pub fn isolate(&mut self, p: StateId) {
        self.detach(p);
        self.initial.remove(p);
        self.accepting.remove(p);
        trace!("isolated {}", self.states[p].name);
        debug_assert!(self.is_mirrored(), "isolating broke the mirrored transitions");
    }

    /// Merges the state `p` into `q`. Every transition into `p` is redirected to `q` and every
    /// transition leaving `p` is copied to `q`, transitions that `q` already has are not
    /// duplicated. `q` becomes initial (final) if `p` was, and `p` is left behind isolated,
    /// neither initial nor final. The arena is not compacted, so all ids stay valid.
    pub fn merge_into(&mut self, p: StateId, q: StateId) {
        if p == q {
            return;
        }
        let (successors, predecessors) = self.detach(p);

        let relink = |r: StateId| if r == p { q } else { r };
        for (a, targets) in successors.into_iter().enumerate() {
            for t in targets {
                self.insert_edge(q, a, relink(t));
            }
        }
        for (a, sources) in predecessors.into_iter().enumerate() {
            for s in sources {
                self.insert_edge(relink(s), a, q);
            }
        }

        if self.initial.remove(p) {
            self.initial.insert(q);
        }
        if self.accepting.remove(p) {
            self.accepting.insert(q);
        }
        trace!("merged {} into {}", self.states[p].name, self.states[q].name);
        debug_assert!(self.is_mirrored(), "merging broke the mirrored transitions");
    }

    /// Formats a set of states as `{q0, q1}` using their names.
    pub fn show_states<I: IntoIterator<Item = StateId>>(&self, states: I) -> String {
        format!(
            "{{{}}}",
            states.into_iter().map(|q| self.state_name(q)).join(", ")
        )
    }
}

/// Removes the first occurrence of `value` by swapping in the last element.
fn remove_one(list: &mut Vec<StateId>, value: StateId) -> bool {
    match list.iter().position(|&x| x == value) {
        Some(pos) => {
            list.swap_remove(pos);
            true
        }
        None => false,
    }
}
