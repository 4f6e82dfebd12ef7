use crate::{alphabet::Letter, automaton::Automaton, math::BitSet};

impl Automaton {
    /// Returns the set of states that can be reached from a state in `from` by reading `word`.
    pub fn successor_set(&self, from: &BitSet, word: &[Letter]) -> BitSet {
        word.iter().fold(from.clone(), |current, &letter| {
            current
                .iter()
                .flat_map(|q| self.successors(q, letter).iter().copied())
                .collect()
        })
    }

    /// Decides whether `word` is accepted, by tracking the set of states the automaton can be in
    /// after each prefix of `word`. Letters outside of the alphabet lead to rejection.
    pub fn accepts(&self, word: &[Letter]) -> bool {
        if word.iter().any(|&a| a >= self.alphabet().len()) {
            return false;
        }
        let reached = self.successor_set(self.initial_set(), word);
        !reached.is_disjoint(self.final_set())
    }
}
