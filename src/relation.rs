use itertools::Itertools;

use crate::{
    automaton::{Automaton, StateId},
    math::BitSet,
};

/// A binary relation over the states `0..n` of an automaton, stored as an `n x n` bit matrix.
/// A pair `(p, q)` is read as "`p` is simulated by `q`". Relations are never implicitly
/// reflexive, use [`Relation::identity`] to obtain the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    n: usize,
    pairs: BitSet,
}

impl Relation {
    /// Creates the empty relation over `n` states.
    pub fn empty(n: usize) -> Self {
        Self {
            n,
            pairs: BitSet::with_capacity(n * n),
        }
    }

    /// Creates the relation containing every pair of states.
    pub fn full(n: usize) -> Self {
        Self {
            n,
            pairs: (0..n * n).collect(),
        }
    }

    /// Creates the identity relation `{(q, q) | q < n}`.
    pub fn identity(n: usize) -> Self {
        Self {
            n,
            pairs: (0..n).map(|q| q * n + q).collect(),
        }
    }

    /// The number of states the relation ranges over.
    pub fn states(&self) -> usize {
        self.n
    }

    fn index(&self, p: StateId, q: StateId) -> usize {
        debug_assert!(p < self.n && q < self.n, "({p}, {q}) out of range {}", self.n);
        p * self.n + q
    }

    /// Adds `(p, q)`, returns true if it was not contained before.
    pub fn insert(&mut self, p: StateId, q: StateId) -> bool {
        let i = self.index(p, q);
        self.pairs.insert(i)
    }

    /// Removes `(p, q)`, returns true if it was contained before.
    pub fn remove(&mut self, p: StateId, q: StateId) -> bool {
        let i = self.index(p, q);
        self.pairs.remove(i)
    }

    /// Returns true if `(p, q)` is part of the relation.
    pub fn contains(&self, p: StateId, q: StateId) -> bool {
        p < self.n && q < self.n && self.pairs.contains(p * self.n + q)
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there is no pair at all.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over all pairs in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, StateId)> + '_ {
        self.pairs.iter().map(|i| (i / self.n, i % self.n))
    }

    /// Returns the complement with respect to all pairs of states.
    pub fn complement(&self) -> Self {
        let mut full = Self::full(self.n);
        full.pairs.difference_with(&self.pairs);
        full
    }

    /// Returns true if `(q, q)` is contained for every state `q`.
    pub fn is_reflexive(&self) -> bool {
        (0..self.n).all(|q| self.contains(q, q))
    }

    /// Returns true if `(p, q)` and `(q, r)` imply `(p, r)`.
    pub fn is_transitive(&self) -> bool {
        self.iter().all(|(p, q)| {
            (0..self.n).all(|r| !self.contains(q, r) || self.contains(p, r))
        })
    }

    /// Renders the relation as `{(p, q), ...}` using the state names of `aut`.
    pub fn show(&self, aut: &Automaton) -> String {
        format!(
            "{{{}}}",
            self.iter()
                .map(|(p, q)| format!("({}, {})", aut.state_name(p), aut.state_name(q)))
                .join(", ")
        )
    }

    /// Renders the relation as a matrix, where the row of `p` has a mark in the column of `q` if
    /// `(p, q)` is contained.
    pub fn table(&self, aut: &Automaton) -> String {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once(String::new())
                .chain((0..self.n).map(|q| aut.state_name(q).to_string())),
        );
        for p in 0..self.n {
            builder.push_record(std::iter::once(aut.state_name(p).to_string()).chain(
                (0..self.n).map(|q| if self.contains(p, q) { "x" } else { "" }.to_string()),
            ));
        }
        builder
            .build()
            .with(tabled::settings::Style::rounded())
            .to_string()
    }
}

impl FromIterator<(StateId, StateId)> for Relation {
    /// Collects pairs into a relation over just enough states to contain all of them.
    fn from_iter<T: IntoIterator<Item = (StateId, StateId)>>(iter: T) -> Self {
        let pairs = iter.into_iter().collect_vec();
        let n = pairs.iter().map(|&(p, q)| p.max(q) + 1).max().unwrap_or(0);
        let mut relation = Self::empty(n);
        for (p, q) in pairs {
            relation.insert(p, q);
        }
        relation
    }
}

#[cfg(test)]
mod tests {
    use super::Relation;
    use crate::tests::single_step;

    #[test]
    fn identity_and_complement() {
        let id = Relation::identity(3);
        assert_eq!(id.len(), 3);
        assert!(id.contains(1, 1));
        assert!(!id.contains(1, 2));
        assert!(id.is_reflexive() && id.is_transitive());

        let complement = id.complement();
        assert_eq!(complement.len(), 6);
        assert_eq!(complement.complement(), id);
        assert!(!complement.is_reflexive());
    }

    #[test]
    fn pairs_and_rendering() {
        let mut relation = Relation::empty(2);
        assert!(relation.is_empty());
        assert!(relation.insert(1, 0));
        assert!(!relation.insert(1, 0));
        assert!(relation.insert(0, 0));
        assert_eq!(relation.iter().collect::<Vec<_>>(), vec![(0, 0), (1, 0)]);
        assert_eq!(relation.show(&single_step()), "{(q0, q0), (q1, q0)}");
        assert!(relation.table(&single_step()).contains("q1"));
        assert!(relation.remove(0, 0));
        assert!(!relation.contains(0, 0));

        let collected: Relation = [(0, 2), (1, 1)].into_iter().collect();
        assert_eq!(collected.states(), 3);
        assert!(collected.contains(0, 2));
        assert!(!collected.contains(5, 5));
    }
}
