//! Traversals of the transition graph and the emptiness check built on top of them.
use std::collections::VecDeque;

use tracing::trace;

use crate::{
    automaton::{Automaton, StateId},
    math::BitSet,
};

/// The transitions along which a [`Search`] moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Follow transitions from their source to their target.
    Forward,
    /// Follow transitions from their target to their source.
    Backward,
}

/// Determines which state is taken from the frontier of a [`Search`] next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// The most recently discovered state comes first, which gives a depth-first search.
    Lifo,
    /// The least recently discovered state comes first, which gives a breadth-first search.
    Fifo,
}

/// Iterator over all states that can be reached from a set of seed states, see
/// [`Automaton::search`]. Every state is yielded precisely once. States are marked as visited
/// as soon as they are put onto the frontier, so the frontier never holds a state twice.
#[derive(Debug, Clone)]
pub struct Search<'a> {
    automaton: &'a Automaton,
    direction: Direction,
    order: Order,
    seen: BitSet,
    frontier: VecDeque<StateId>,
}

impl<'a> Search<'a> {
    /// Creates a new search through `automaton` that starts in the given seed states.
    pub fn new<I: IntoIterator<Item = StateId>>(
        automaton: &'a Automaton,
        direction: Direction,
        order: Order,
        seeds: I,
    ) -> Self {
        let mut seen = BitSet::with_capacity(automaton.size());
        let frontier = seeds.into_iter().filter(|&q| seen.insert(q)).collect();
        Self {
            automaton,
            direction,
            order,
            seen,
            frontier,
        }
    }

    /// Runs the search to completion and returns the set of all discovered states.
    pub fn into_seen(mut self) -> BitSet {
        while self.next().is_some() {}
        self.seen
    }
}

impl Iterator for Search<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        let q = match self.order {
            Order::Lifo => self.frontier.pop_back(),
            Order::Fifo => self.frontier.pop_front(),
        }?;
        for a in self.automaton.alphabet().letters() {
            let neighbours = match self.direction {
                Direction::Forward => self.automaton.successors(q, a),
                Direction::Backward => self.automaton.predecessors(q, a),
            };
            for &p in neighbours {
                if self.seen.insert(p) {
                    self.frontier.push_back(p);
                }
            }
        }
        Some(q)
    }
}

impl Automaton {
    /// Returns a [`Search`] starting in `seeds`.
    pub fn search<I: IntoIterator<Item = StateId>>(
        &self,
        direction: Direction,
        order: Order,
        seeds: I,
    ) -> Search<'_> {
        Search::new(self, direction, order, seeds)
    }

    /// Returns the set of states that are reachable from some initial state.
    pub fn reachable_states(&self) -> BitSet {
        self.search(Direction::Forward, Order::Fifo, self.initial_states())
            .into_seen()
    }

    /// Returns the set of states from which some final state is reachable.
    pub fn coreachable_states(&self) -> BitSet {
        self.search(Direction::Backward, Order::Fifo, self.final_states())
            .into_seen()
    }

    /// Returns true if the automaton accepts no word at all. The states are explored depth-first
    /// from the initial states and the search stops as soon as a final state is found.
    ///
    /// # Example
    /// ```
    /// use automata_engine::prelude::*;
    ///
    /// let aut = Automaton::builder()
    ///     .with_edges([(0, 'a', 1), (1, 'a', 0)])
    ///     .with_initial([0])
    ///     .into_automaton("no_finals");
    /// assert!(aut.is_empty_language());
    /// ```
    pub fn is_empty_language(&self) -> bool {
        let mut search = self.search(Direction::Forward, Order::Lifo, self.initial_states());
        match search.find(|&q| self.is_final(q)) {
            Some(q) => {
                trace!("found reachable final state {}", self.state_name(q));
                false
            }
            None => true,
        }
    }
}
