//! Removal of states that do not contribute to the accepted language.
use tracing::debug;

use crate::{automaton::Automaton, math::BitSet};

impl Automaton {
    /// Returns the set of useful states, i.e. those which are reachable from an initial state and
    /// from which a final state can be reached.
    pub fn useful_states(&self) -> BitSet {
        let mut useful = self.reachable_states();
        useful.intersect_with(&self.coreachable_states());
        useful
    }

    /// Removes all states that are not useful (see [`Self::useful_states`]) together with every
    /// transition that leads to or leaves such a state. The remaining states keep their relative
    /// order. Returns the number of removed states. Applying this twice has the same effect as
    /// applying it once.
    pub fn remove_useless_states(&mut self) -> usize {
        let before = self.size();
        let useful = self.useful_states();
        self.retain_states(&useful);
        let removed = before - self.size();
        debug!("removed {removed} useless states from {}", self.name());
        removed
    }

    /// Consumes `self` and returns the automaton without useless states.
    pub fn trim(mut self) -> Self {
        self.remove_useless_states();
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::{prelude::*, tests::contains_ab};

    #[test_log::test]
    fn removes_unreachable_and_dead_states() {
        let mut aut = Automaton::builder()
            .with_edges([
                (0, 'a', 1),
                (1, 'b', 2),
                (0, 'b', 3),
                (3, 'a', 3),
                (4, 'a', 2),
                (2, 'a', 2),
            ])
            .with_initial([0])
            .with_final([2])
            .into_automaton("wasteful");
        assert_eq!(aut.remove_useless_states(), 2);
        assert_eq!(aut.size(), 3);
        assert_eq!(
            aut.state_indices().map(|q| aut.state_name(q)).collect::<Vec<_>>(),
            vec!["q0", "q1", "q2"]
        );
        assert_eq!(aut.transition_count(), 3);
        assert!(aut.is_mirrored());
        assert!(aut.accepts(&[0, 1, 0]));

        let again = aut.clone().trim();
        assert_eq!(again, aut);
    }

    #[test]
    fn empty_language_leaves_no_states() {
        let mut aut = contains_ab();
        aut.set_final(2, false);
        aut.remove_useless_states();
        assert_eq!(aut.size(), 0);
        assert_eq!(aut.initial_states().count(), 0);
        assert!(aut.is_empty_language());
    }
}
