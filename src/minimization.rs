use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    alphabet::Letter,
    automaton::{Automaton, StateId},
    math::{BitSet, Partition, Set},
    Error,
};

/// Result of Hopcroft's partition refinement. Partial automata are refined as if they were
/// completed by a sink state with index `sink`, which receives every missing transition. All
/// states from which no word is accepted end up in the block of the sink.
#[derive(Debug, Clone)]
struct Refinement {
    blocks: Vec<Vec<StateId>>,
    block_of: Vec<usize>,
    sink: Option<StateId>,
}

impl Refinement {
    /// Computes the coarsest partition of the states of the deterministic automaton `aut` that
    /// is compatible with the final states and the transitions.
    fn compute(aut: &Automaton) -> Self {
        let n = aut.size();
        let sink = aut
            .state_indices()
            .any(|q| aut.alphabet().letters().any(|a| aut.successors(q, a).is_empty()))
            .then_some(n);
        let universe = n + usize::from(sink.is_some());
        let step = |q: StateId, a: Letter| -> StateId {
            if q >= n {
                return q;
            }
            aut.successors(q, a).first().copied().unwrap_or(n)
        };

        let (accepting, rejecting): (Vec<StateId>, Vec<StateId>) =
            (0..universe).partition(|&q| aut.is_final(q));
        if accepting.is_empty() || rejecting.is_empty() {
            return Self {
                blocks: vec![(0..universe).collect()],
                block_of: vec![0; universe],
                sink,
            };
        }
        let mut block_of: Vec<usize> = (0..universe)
            .map(|q| usize::from(!aut.is_final(q)))
            .collect();
        let smaller = usize::from(accepting.len() >= rejecting.len());
        let mut blocks = vec![accepting, rejecting];

        let mut pending: Set<(Letter, usize)> = Set::default();
        let mut worklist: Vec<(Letter, usize)> = Vec::new();
        for a in aut.alphabet().letters() {
            pending.insert((a, smaller));
            worklist.push((a, smaller));
        }

        while let Some((a, splitter)) = worklist.pop() {
            pending.remove(&(a, splitter));
            let target: BitSet = blocks[splitter].iter().copied().collect();
            trace!("splitting with letter {a} and block {splitter} of size {}", target.len());

            for x in 0..blocks.len() {
                let (ins, outs): (Vec<StateId>, Vec<StateId>) = blocks[x]
                    .iter()
                    .copied()
                    .partition(|&q| target.contains(step(q, a)));
                if ins.is_empty() || outs.is_empty() {
                    continue;
                }
                let y = blocks.len();
                for &q in &outs {
                    block_of[q] = y;
                }
                let outs_smaller = outs.len() < ins.len();
                blocks[x] = ins;
                blocks.push(outs);

                for c in aut.alphabet().letters() {
                    let added = if pending.contains(&(c, x)) || outs_smaller {
                        y
                    } else {
                        x
                    };
                    if pending.insert((c, added)) {
                        worklist.push((c, added));
                    }
                }
            }
        }
        debug!("refined {} into {} blocks", aut.name(), blocks.len());
        Self {
            blocks,
            block_of,
            sink,
        }
    }

    /// The blocks that contain real states, ordered by their smallest member.
    fn real_blocks(&self) -> Vec<&Vec<StateId>> {
        self.blocks
            .iter()
            .filter(|block| block.iter().any(|&q| Some(q) != self.sink))
            .sorted_by_key(|block| block.iter().min().copied())
            .collect()
    }
}

impl Automaton {
    /// Computes the language partition of a deterministic automaton using Hopcroft's algorithm.
    /// Two states end up in the same class precisely when the same words are accepted from
    /// them. Missing transitions are treated as leading to a rejecting sink.
    ///
    /// Returns [`Error::NotDeterministic`] if a state has more than one successor for some letter.
    pub fn language_partition(&self) -> Result<Partition<StateId>, Error> {
        if !self.is_deterministic() {
            return Err(Error::NotDeterministic(self.name().to_string()));
        }
        let refinement = Refinement::compute(self);
        Ok(Partition::new(refinement.real_blocks().into_iter().map(|block| {
            block
                .iter()
                .copied()
                .filter(|&q| Some(q) != refinement.sink)
                .collect_vec()
        })))
    }

    /// Builds the minimal deterministic automaton for the language of `self`, which has one state
    /// per class of the [language partition](Self::language_partition). The transitions of a
    /// class are those of an arbitrary member. The class of states from which nothing is
    /// accepted is kept like every other class, so minimizing a complete automaton yields a
    /// complete one. The sink that completes a partial automaton during refinement is never
    /// added, transitions that would lead into it stay missing. Use [`Self::trim`] to get rid of
    /// the dead class.
    ///
    /// # Example
    /// ```
    /// use automata_engine::prelude::*;
    ///
    /// let aut = Automaton::builder()
    ///     .with_edges([(0, 'a', 1), (0, 'b', 2)])
    ///     .with_initial([0])
    ///     .with_final([1, 2])
    ///     .into_automaton("redundant");
    /// let min = aut.minimize().unwrap();
    /// assert_eq!(min.size(), 2);
    /// assert_eq!(min.state_name(1), "{q1,q2}");
    /// ```
    pub fn minimize(&self) -> Result<Automaton, Error> {
        if !self.is_deterministic() {
            return Err(Error::NotDeterministic(self.name().to_string()));
        }
        let refinement = Refinement::compute(self);
        let blocks = refinement.real_blocks();
        let real_members = |block: &Vec<StateId>| {
            block
                .iter()
                .copied()
                .filter(|&q| Some(q) != refinement.sink)
                .collect_vec()
        };

        let mut index = vec![None; refinement.blocks.len()];
        let mut result = Automaton::new(format!("min-{}", self.name()), self.alphabet().clone());
        for &block in &blocks {
            let members = real_members(block);
            let name = match members.as_slice() {
                [single] => self.state_name(*single).to_string(),
                _ => format!("{{{}}}", members.iter().map(|&q| self.state_name(q)).join(",")),
            };
            let id = result.add_state(name);
            index[refinement.block_of[members[0]]] = Some(id);
            result.set_initial(id, members.iter().any(|&q| self.is_initial(q)));
            result.set_final(id, members.iter().any(|&q| self.is_final(q)));
        }

        for &block in &blocks {
            let representative = real_members(block)[0];
            let Some(source) = index[refinement.block_of[representative]] else {
                continue;
            };
            for a in self.alphabet().letters() {
                // a block holding only the sink has no state in the result
                if let Some(&target) = self.successors(representative, a).first() {
                    if let Some(target) = index[refinement.block_of[target]] {
                        result.add_edge(source, a, target);
                    }
                }
            }
        }
        debug!("minimized {} from {} to {} states", self.name(), self.size(), result.size());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        math::{BitSet, Partition},
        prelude::*,
        tests::{contains_ab, single_step, words_up_to},
    };

    fn accepts_from(aut: &Automaton, q: StateId, word: &[Letter]) -> bool {
        let from: BitSet = [q].into_iter().collect();
        !aut.successor_set(&from, word).is_disjoint(aut.final_set())
    }

    #[test_log::test]
    fn minimizes_subset_construction() {
        let det = contains_ab().determinize();
        assert_eq!(det.size(), 4);
        let min = det.minimize().unwrap();
        assert_eq!(min.size(), 3);
        assert!(min.is_deterministic());
        assert!(min.is_complete());

        let words = words_up_to(2, 6);
        for word in &words {
            assert_eq!(det.accepts(word), min.accepts(word), "{word:?}");
        }
        for p in min.state_indices() {
            for q in min.state_indices().filter(|&q| q != p) {
                assert!(
                    words
                        .iter()
                        .any(|w| accepts_from(&min, p, w) != accepts_from(&min, q, w)),
                    "states {p} and {q} have the same language"
                );
            }
        }
    }

    #[test]
    fn partial_automata_use_a_virtual_sink() {
        let aut = Automaton::builder()
            .with_edges([(0, 'a', 1), (0, 'b', 2)])
            .with_initial([0])
            .with_final([1, 2])
            .into_automaton("partial");
        assert_eq!(
            aut.language_partition().unwrap(),
            Partition::new([vec![0], vec![1, 2]])
        );
        let min = aut.minimize().unwrap();
        assert_eq!(min.size(), 2);
        assert_eq!(min.transition_count(), 2);
        assert!(min.accepts(&[1]));
        assert!(!min.accepts(&[1, 1]));

        let min = single_step().minimize().unwrap();
        assert_eq!(min.size(), 2);
        assert_eq!(min.name(), "min-single");
    }

    #[test]
    fn dead_class_is_kept() {
        let aut = Automaton::builder()
            .with_edges([
                (0, 'a', 1),
                (0, 'b', 2),
                (1, 'a', 3),
                (1, 'b', 3),
                (2, 'a', 3),
                (2, 'b', 3),
                (3, 'a', 3),
                (3, 'b', 3),
            ])
            .with_initial([0])
            .with_final([1])
            .into_automaton("complete");
        assert_eq!(
            aut.language_partition().unwrap(),
            Partition::new([vec![0], vec![1], vec![2, 3]])
        );
        let min = aut.minimize().unwrap();
        assert_eq!(min.size(), 3);
        assert_eq!(min.transition_count(), 6);
        assert!(min.is_complete());
        assert!(min.find_state("{q2,q3}").is_some());
        assert!(min.accepts(&[0]));
        assert!(!min.accepts(&[1]));
        assert_eq!(min.clone().trim().size(), 2);
    }

    #[test]
    fn fail_state_survives_minimization() {
        let det = single_step().determinize_with(DeterminizeConfig::with_fail_state());
        assert_eq!(det.size(), 3);
        let min = det.minimize().unwrap();
        assert_eq!(min.size(), 3);
        assert!(min.find_state("fail").is_some());
        assert!(min.is_complete());
        let complement = min.complemented().unwrap();
        assert!(complement.accepts(&[]));
        assert!(!complement.accepts(&[0]));
        assert!(complement.accepts(&[0, 0]));

        assert_eq!(single_step().determinize().minimize().unwrap().size(), 2);
    }

    #[test]
    fn trivial_partitions() {
        let none_final = Automaton::builder()
            .with_edges([(0, 'a', 1), (1, 'a', 0)])
            .with_initial([0])
            .into_automaton("none_final");
        assert_eq!(
            none_final.language_partition().unwrap(),
            Partition::new([vec![0, 1]])
        );
        let min = none_final.minimize().unwrap();
        assert_eq!(min.size(), 1);
        assert!(min.is_complete());
        assert!(min.is_empty_language());

        let all_final = Automaton::builder()
            .with_edges([(0, 'a', 1), (1, 'a', 0)])
            .with_initial([0])
            .with_final([0, 1])
            .into_automaton("all_final");
        let min = all_final.minimize().unwrap();
        assert_eq!(min.size(), 1);
        assert!(min.accepts(&[0, 0, 0]));
    }

    #[test]
    fn rejects_nondeterministic_input() {
        assert_eq!(
            contains_ab().minimize(),
            Err(Error::NotDeterministic("contains_ab".to_string()))
        );
        assert!(contains_ab().language_partition().is_err());
    }
}
