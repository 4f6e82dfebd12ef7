//! Structural operations that combine or transform automata without exploring their
//! configurations, namely the union and the complement.
use tracing::debug;

use crate::{
    automaton::Automaton,
    math::Set,
    product::DeterminizeConfig,
    Error,
};

impl Automaton {
    /// Builds the disjoint union of `self` and `other` over the union of both alphabets. The
    /// states of `self` keep their ids, those of `other` are shifted by the returned offset.
    pub(crate) fn disjoint_union(&self, other: &Automaton) -> (Automaton, usize) {
        let alphabet = self.alphabet().union(other.alphabet());
        let mut result = Automaton::new(format!("{}+{}", self.name(), other.name()), alphabet);
        let mut names: Set<String> = Set::default();
        let offset = self.size();

        for (part, shift) in [(self, 0), (other, offset)] {
            let translation = part.alphabet().translation(result.alphabet());
            for q in part.state_indices() {
                let mut name = part.state_name(q).to_string();
                while !names.insert(name.clone()) {
                    name.push_str("_copy");
                }
                let id = result.add_state(name);
                result.set_initial(id, part.is_initial(q));
                result.set_final(id, part.is_final(q));
            }
            for (p, a, q) in part.edges() {
                if let Some(b) = translation[a] {
                    result.add_edge(p + shift, b, q + shift);
                }
            }
        }
        (result, offset)
    }

    /// Returns an automaton accepting every word that is accepted by `self` or by `other`. Its
    /// states are those of `self` followed by those of `other`, where a state of `other` whose
    /// name is already taken gets the suffix `_copy`. The alphabet consists of the symbols of
    /// both automata.
    ///
    /// # Example
    /// ```
    /// use automata_engine::prelude::*;
    ///
    /// let a = Automaton::builder()
    ///     .with_edges([(0, 'a', 1)])
    ///     .with_initial([0])
    ///     .with_final([1])
    ///     .into_automaton("A");
    /// let b = Automaton::builder()
    ///     .with_edges([(0, 'b', 1)])
    ///     .with_initial([0])
    ///     .with_final([1])
    ///     .into_automaton("B");
    /// let union = a.union(&b);
    /// assert_eq!(union.name(), "A+B");
    /// assert_eq!(union.state_name(2), "q0_copy");
    /// assert!(union.accepts(&[0]) && union.accepts(&[1]));
    /// ```
    pub fn union(&self, other: &Automaton) -> Automaton {
        let (result, _) = self.disjoint_union(other);
        debug!("union {} has {} states", result.name(), result.size());
        result
    }

    /// Complements the language in place by swapping final and non-final states. This is only
    /// correct for complete deterministic automata, for any other automaton
    /// [`Error::NotComplete`] is returned and `self` is left untouched.
    pub fn complement(&mut self) -> Result<(), Error> {
        if !self.is_complete() {
            return Err(Error::NotComplete(self.name().to_string()));
        }
        for q in self.state_indices() {
            let accepting = self.is_final(q);
            self.set_final(q, !accepting);
        }
        Ok(())
    }

    /// Consumes `self` and returns the complement, see [`Self::complement`].
    pub fn complemented(mut self) -> Result<Self, Error> {
        self.complement()?;
        Ok(self)
    }
}

/// Chains the constructions of this crate: the product of `a` and `b` is united with `c`,
/// determinized into a complete automaton and finally complemented. The result accepts a word
/// if and only if it is neither accepted by `c` nor by both `a` and `b`.
pub fn pipeline(a: &Automaton, b: &Automaton, c: &Automaton) -> Result<Automaton, Error> {
    a.intersection(b)
        .union(c)
        .determinize_with(DeterminizeConfig::with_fail_state())
        .complemented()
}

#[cfg(test)]
mod tests {
    use super::pipeline;
    use crate::{
        prelude::*,
        tests::{contains_ab, sigma_star, single_step, words_up_to},
    };

    fn lonely() -> Automaton {
        let mut aut = Automaton::new("lonely", Alphabet::from_symbols(["a"]));
        let q = aut.add_state("q0");
        aut.set_initial(q, true);
        aut
    }

    #[test]
    fn combining_empty_automata() {
        let (a, b) = (lonely(), lonely());
        assert!(a.is_empty_language() && b.is_empty_language());
        let union = a.union(&b);
        assert_eq!(union.size(), 2);
        assert_eq!(union.state_name(1), "q0_copy");
        assert!(union.is_empty_language());
        assert!(a.intersection(&b).is_empty_language());
    }

    #[test]
    fn union_over_different_alphabets() {
        let over_c = Automaton::builder()
            .with_edges([(0, 'c', 0)])
            .with_initial([0])
            .with_final([0])
            .into_automaton("c_star");
        let union = contains_ab().union(&over_c);
        assert_eq!(union.alphabet().to_string(), "[a, b, c]");
        assert_eq!(union.size(), 4);
        assert_eq!(union.initial_states().collect::<Vec<_>>(), vec![0, 3]);
        assert!(union.accepts(&[2, 2]));
        assert!(union.accepts(&[1, 0, 1]));
        assert!(!union.accepts(&[0, 2]));
        assert!(union.is_mirrored());
    }

    #[test]
    fn complement_requires_completeness() {
        let mut partial = single_step();
        assert_eq!(
            partial.complement(),
            Err(Error::NotComplete("single".to_string()))
        );
        assert!(partial.is_final(1));

        let complete = contains_ab().determinize();
        let complement = complete.clone().complemented().unwrap();
        for word in words_up_to(2, 5) {
            assert_ne!(complete.accepts(&word), complement.accepts(&word), "{word:?}");
        }
    }

    #[test_log::test]
    fn pipeline_of_constructions() {
        let (a, b, c) = (contains_ab(), sigma_star(), single_step());
        let result = pipeline(&a, &b, &c).unwrap();
        assert!(result.is_complete());
        for word in words_up_to(2, 5) {
            let expected = !(c.accepts(&word) || (a.accepts(&word) && b.accepts(&word)));
            assert_eq!(result.accepts(&word), expected, "{word:?}");
        }
    }
}
