//! Constructions that explore a new automaton whose states are configurations of existing ones,
//! namely the product automaton accepting the intersection of two languages and the subset
//! construction.
use std::{collections::VecDeque, hash::Hash};

use itertools::Itertools;
use tracing::debug;

use crate::{
    alphabet::Letter,
    automaton::{Automaton, StateId},
    math::{BitSet, Map},
};

/// Configures the subset construction performed by [`Automaton::determinize_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DeterminizeConfig {
    /// If set, every empty set of successors leads to a single non-accepting `fail` state that
    /// loops on every letter, which makes the resulting automaton complete. Otherwise, letters
    /// without successors simply yield no transition.
    pub fail_state: bool,
}

impl DeterminizeConfig {
    /// Returns a configuration that produces complete automata.
    pub fn with_fail_state() -> Self {
        Self { fail_state: true }
    }
}

/// Worklist of an on-the-fly construction. Each state of the automaton that is being built
/// corresponds to a configuration of type `K`, the map `known` ensures that every configuration
/// is turned into a state only once.
struct Construction<K> {
    result: Automaton,
    known: Map<K, StateId>,
    queue: VecDeque<(K, StateId)>,
}

impl<K: Hash + Eq + Clone> Construction<K> {
    fn new(result: Automaton) -> Self {
        Self {
            result,
            known: Map::default(),
            queue: VecDeque::new(),
        }
    }

    /// Returns the state of the given configuration. If it does not exist yet, it is created
    /// with the name and acceptance given by `describe` and scheduled for exploration.
    fn state<F>(&mut self, key: K, describe: F) -> StateId
    where
        F: FnOnce(&K) -> (String, bool),
    {
        if let Some(&id) = self.known.get(&key) {
            return id;
        }
        let (name, accepting) = describe(&key);
        let id = self.result.add_state(name);
        self.result.set_final(id, accepting);
        self.known.insert(key.clone(), id);
        self.queue.push_back((key, id));
        id
    }

    fn next(&mut self) -> Option<(K, StateId)> {
        self.queue.pop_front()
    }

    fn finish(self) -> Automaton {
        debug!(
            "constructed {} with {} states and {} transitions",
            self.result.name(),
            self.result.size(),
            self.result.transition_count()
        );
        self.result
    }
}

impl Automaton {
    /// Builds the product automaton, which accepts precisely the words accepted by both `self`
    /// and `other`. It operates over the symbols that both alphabets have in common, transitions
    /// on any other symbol can never be taken by both automata. Only pairs of states that are
    /// reachable from a pair of initial states are constructed.
    ///
    /// # Example
    /// ```
    /// use automata_engine::prelude::*;
    ///
    /// let even_a = Automaton::builder()
    ///     .with_edges([(0, 'a', 1), (1, 'a', 0), (0, 'b', 0), (1, 'b', 1)])
    ///     .with_initial([0])
    ///     .with_final([0])
    ///     .into_automaton("even_a");
    /// let ends_b = Automaton::builder()
    ///     .with_edges([(0, 'a', 0), (0, 'b', 0), (0, 'b', 1)])
    ///     .with_initial([0])
    ///     .with_final([1])
    ///     .into_automaton("ends_b");
    /// let product = even_a.intersection(&ends_b);
    /// assert!(product.accepts(&[0, 0, 1]));
    /// assert!(!product.accepts(&[0, 1]));
    /// assert!(!product.accepts(&[0, 0]));
    /// ```
    pub fn intersection(&self, other: &Automaton) -> Automaton {
        let alphabet = self.alphabet().intersection(other.alphabet());
        let letters: Vec<(Letter, Letter, Letter)> = alphabet
            .letters()
            .filter_map(|c| {
                let symbol = alphabet.symbol(c);
                Some((c, self.alphabet().letter(symbol)?, other.alphabet().letter(symbol)?))
            })
            .collect();
        let name = format!("{}&{}", self.name(), other.name());
        let mut construction = Construction::new(Automaton::new(name, alphabet));

        let describe = |&(p, q): &(StateId, StateId)| {
            (
                format!("<{},{}>", self.state_name(p), other.state_name(q)),
                self.is_final(p) && other.is_final(q),
            )
        };
        for (p, q) in self.initial_states().cartesian_product(other.initial_states().collect_vec()) {
            let id = construction.state((p, q), describe);
            construction.result.set_initial(id, true);
        }

        while let Some(((p, q), source)) = construction.next() {
            for &(c, left, right) in &letters {
                for (&p1, &q1) in self
                    .successors(p, left)
                    .iter()
                    .cartesian_product(other.successors(q, right))
                {
                    let target = construction.state((p1, q1), describe);
                    construction.result.insert_edge(source, c, target);
                }
            }
        }
        construction.finish()
    }

    /// Performs the subset construction without a fail state, see [`Self::determinize_with`].
    pub fn determinize(&self) -> Automaton {
        self.determinize_with(DeterminizeConfig::default())
    }

    /// Performs the subset construction and returns a deterministic automaton accepting the same
    /// language. Each state of the result corresponds to a set of states of `self`, which also
    /// gives its name, e.g. `{q0,q2}`. The initial state is the set of all initial states and a
    /// set is final if it contains a final state. Only sets that are reachable from the initial
    /// set are constructed.
    pub fn determinize_with(&self, config: DeterminizeConfig) -> Automaton {
        let name = format!("det{}", self.name());
        let mut construction = Construction::new(Automaton::new(name, self.alphabet().clone()));
        let mut fail: Option<StateId> = None;

        let describe = |set: &BitSet| {
            (
                format!("{{{}}}", set.iter().map(|q| self.state_name(q)).join(",")),
                !set.is_disjoint(self.final_set()),
            )
        };
        let initial = construction.state(self.initial_set().clone(), describe);
        construction.result.set_initial(initial, true);

        while let Some((set, source)) = construction.next() {
            for a in self.alphabet().letters() {
                let successors: BitSet = set
                    .iter()
                    .flat_map(|q| self.successors(q, a).iter().copied())
                    .collect();
                if successors.is_empty() {
                    if config.fail_state {
                        let sink = *fail.get_or_insert_with(|| {
                            let sink = construction.result.add_state("fail");
                            for b in self.alphabet().letters() {
                                construction.result.add_edge(sink, b, sink);
                            }
                            sink
                        });
                        construction.result.add_edge(source, a, sink);
                    }
                    continue;
                }
                let target = construction.state(successors, describe);
                construction.result.add_edge(source, a, target);
            }
        }
        construction.finish()
    }
}
