use itertools::Itertools;

use crate::{
    alphabet::Alphabet,
    automaton::{Automaton, StateId},
    math::Set,
};

/// Helper struct for the construction of automata from a list of edges. States are given by
/// their index and are named `q0`, `q1`, ... in the resulting automaton, symbols are given as
/// characters.
///
/// # Example
///
/// We want to create an automaton with two states over the alphabet `['a', 'b']` that accepts
/// all words ending with `a`. State 0 is initial and state 1 is final.
/// ```
/// use automata_engine::prelude::*;
///
/// let aut = Automaton::builder()
///     .with_edges([(0, 'a', 1), (0, 'b', 0), (1, 'a', 1), (1, 'b', 0)])
///     .with_initial([0])
///     .with_final([1])
///     .into_automaton("ends_with_a");
/// assert_eq!(aut.size(), 2);
/// assert!(aut.accepts(&[1, 0]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AutomatonBuilder {
    symbols: Set<char>,
    edges: Vec<(StateId, char, StateId)>,
    initial: Vec<StateId>,
    accepting: Vec<StateId>,
    states: usize,
}

impl AutomatonBuilder {
    /// By default, the only symbols in the alphabet of the built automaton are the ones that
    /// appear on at least one edge. This method can be used to force additional symbols to appear.
    pub fn with_alphabet<I: IntoIterator<Item = char>>(mut self, symbols: I) -> Self {
        self.symbols.extend(symbols);
        self
    }

    /// Ensures that the built automaton has at least `count` states, even if some of them are
    /// not mentioned by any edge.
    pub fn with_state_count(mut self, count: usize) -> Self {
        self.states = self.states.max(count);
        self
    }

    /// Adds the given edges, each of which is a triple of source, symbol and target.
    pub fn with_edges<I: IntoIterator<Item = (StateId, char, StateId)>>(mut self, edges: I) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Marks the given states as initial.
    pub fn with_initial<I: IntoIterator<Item = StateId>>(mut self, states: I) -> Self {
        self.initial.extend(states);
        self
    }

    /// Marks the given states as final.
    pub fn with_final<I: IntoIterator<Item = StateId>>(mut self, states: I) -> Self {
        self.accepting.extend(states);
        self
    }

    /// Consumes the builder and creates the automaton with the given name. Edges are inserted in
    /// the order in which they were given.
    pub fn into_automaton(self, name: impl Into<String>) -> Automaton {
        let alphabet = Alphabet::from_symbols(
            self.edges
                .iter()
                .map(|(_, c, _)| *c)
                .chain(self.symbols)
                .unique()
                .map(String::from),
        );
        let count = self
            .edges
            .iter()
            .flat_map(|&(p, _, q)| [p, q])
            .chain(self.initial.iter().copied())
            .chain(self.accepting.iter().copied())
            .map(|q| q + 1)
            .max()
            .unwrap_or(0)
            .max(self.states);

        let mut aut = Automaton::new(name, alphabet);
        for i in 0..count {
            aut.add_state(format!("q{i}"));
        }
        for (p, c, q) in self.edges {
            let letter = aut
                .alphabet()
                .letter(c.encode_utf8(&mut [0; 4]))
                .expect("every edge symbol is part of the alphabet");
            aut.add_edge(p, letter, q);
        }
        for q in self.initial {
            aut.set_initial(q, true);
        }
        for q in self.accepting {
            aut.set_final(q, true);
        }
        aut
    }
}
