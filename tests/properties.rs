//! Differential tests that compare the algorithms against each other and against bounded
//! enumeration of words on seeded random automata.
#![cfg(feature = "random")]

use automata_engine::{
    prelude::*,
    random::{generate_random_dfa, generate_random_nfa},
};
use itertools::Itertools;

const SEEDS: u64 = 40;
const MAX_SIZE: usize = 6;

fn words_up_to(letters: usize, length: usize) -> Vec<Vec<Letter>> {
    (0..=length)
        .flat_map(|n| {
            (0..n)
                .map(|_| 0..letters)
                .multi_cartesian_product()
                .collect_vec()
        })
        .collect()
}

/// Random automata over two symbols with up to [`MAX_SIZE`] states.
fn random_nfas() -> impl Iterator<Item = Automaton> {
    (0..SEEDS).flat_map(|seed| {
        let mut rng = fastrand::Rng::with_seed(seed);
        (1..=MAX_SIZE)
            .map(|size| {
                let density = 0.5 + rng.f64() * 1.5;
                generate_random_nfa(&mut rng, 2, size, density, 0.3)
            })
            .collect_vec()
    })
}

fn assert_same_language(left: &Automaton, right: &Automaton) {
    for word in words_up_to(2, MAX_SIZE) {
        assert_eq!(
            left.accepts(&word),
            right.accepts(&word),
            "{} and {} disagree on {word:?}",
            left.name(),
            right.name()
        );
    }
}

fn sigma_star() -> Automaton {
    Automaton::builder()
        .with_edges([(0, 'a', 0), (0, 'b', 0)])
        .with_initial([0])
        .with_final([0])
        .into_automaton("sigma_star")
}

/// Decides inclusion with the classic construction `A ∩ complement(B) = ∅`.
fn included_by_complement(left: &Automaton, right: &Automaton) -> bool {
    let complement = right
        .determinize_with(DeterminizeConfig::with_fail_state())
        .complemented()
        .unwrap();
    left.intersection(&complement).is_empty_language()
}

#[test_log::test]
fn emptiness_matches_enumeration() {
    for aut in random_nfas() {
        // a shortest accepted word visits every state at most once
        let accepted = words_up_to(2, aut.size()).iter().any(|w| aut.accepts(w));
        assert_eq!(aut.is_empty_language(), !accepted, "{aut}");
    }
}

#[test]
fn trimming_is_idempotent() {
    for aut in random_nfas() {
        let trimmed = aut.clone().trim();
        assert!(trimmed.size() <= aut.size());
        assert!(trimmed.is_mirrored());
        assert_same_language(&aut, &trimmed);
        let mut again = trimmed.clone();
        assert_eq!(again.remove_useless_states(), 0);
        assert_eq!(again, trimmed);
    }
}

#[test]
fn reversal_is_an_involution() {
    for aut in random_nfas() {
        assert_eq!(aut.clone().reversed().reversed(), aut);
    }
}

#[test]
fn determinization_preserves_the_language() {
    for aut in random_nfas() {
        let det = aut.determinize();
        assert!(det.is_deterministic());
        assert_same_language(&aut, &det);

        let complete = aut.determinize_with(DeterminizeConfig::with_fail_state());
        assert!(complete.is_complete());
        assert_same_language(&aut, &complete);
    }
}

#[test]
fn intersection_matches_both_operands() {
    let automata = random_nfas().take(30).collect_vec();
    for (left, right) in automata.iter().tuple_windows() {
        let product = left.intersection(right);
        for word in words_up_to(2, MAX_SIZE) {
            assert_eq!(
                product.accepts(&word),
                left.accepts(&word) && right.accepts(&word)
            );
        }
    }
}

#[test_log::test]
fn minimization_is_canonical() {
    for seed in 0..SEEDS {
        let mut rng = fastrand::Rng::with_seed(seed);
        let dfa = generate_random_dfa(&mut rng, 2, 1 + seed as usize % 8);
        let min = dfa.minimize().unwrap();
        assert!(min.is_deterministic());
        assert!(min.size() <= dfa.size());
        assert_same_language(&dfa, &min);
        assert_eq!(min.minimize().unwrap().size(), min.size());

        // distinct states of a minimal automaton have distinct right languages
        for (p, q) in min.state_indices().tuple_combinations() {
            let from = |s: StateId| [s].into_iter().collect::<math::BitSet>();
            let distinguished = words_up_to(2, min.size() + 1).into_iter().any(|w| {
                min.successor_set(&from(p), &w).is_disjoint(min.final_set())
                    != min.successor_set(&from(q), &w).is_disjoint(min.final_set())
            });
            assert!(distinguished, "{} and {} in {min}", p, q);
        }
    }
}

#[test]
fn minimization_of_determinized_automata() {
    for aut in random_nfas().step_by(3) {
        let det = aut.determinize_with(DeterminizeConfig::with_fail_state());
        let min = det.minimize().unwrap();
        assert!(min.size() <= det.size());
        assert!(min.is_complete());
        assert_same_language(&aut, &min);
    }
}

#[test]
fn simulation_is_a_preorder() {
    for aut in random_nfas() {
        let preorder = aut.simulation();
        assert!(preorder.is_reflexive());
        assert!(preorder.is_transitive());
        for (p, q) in preorder.iter() {
            assert!(!aut.is_final(p) || aut.is_final(q));
        }
    }
}

#[test_log::test]
fn reduction_preserves_the_language() {
    for seed in 0..300 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let letters = rng.usize(1..=3);
        let size = rng.usize(1..=10);
        let density = 0.5 + rng.f64() * 1.5;
        let aut = generate_random_nfa(&mut rng, letters, size, density, 0.3);
        let reduced = aut.clone().reduced();
        assert!(reduced.size() <= aut.size());
        assert!(reduced.is_mirrored());

        let length = if letters == 3 { 6 } else { 9 };
        for word in words_up_to(letters, length) {
            assert_eq!(
                aut.accepts(&word),
                reduced.accepts(&word),
                "reducing {aut} gave {reduced} which disagrees on {word:?}"
            );
        }
    }
}

#[test]
fn universality_agrees_with_other_procedures() {
    let universal = sigma_star();
    for aut in random_nfas() {
        let expected = included_by_complement(&universal, &aut);
        for subsumption in [Subsumption::Simulation, Subsumption::Identity] {
            assert_eq!(aut.is_universal(subsumption), expected, "{aut}");
            assert_eq!(universal.is_included_in(&aut, subsumption), Ok(expected));
        }
    }
}

#[test]
fn inclusion_agrees_with_complementation() {
    let automata = random_nfas().collect_vec();
    for (left, right) in automata.iter().tuple_windows().step_by(2) {
        let expected = included_by_complement(left, right);
        for subsumption in [Subsumption::Simulation, Subsumption::Identity] {
            assert_eq!(
                left.is_included_in(right, subsumption),
                Ok(expected),
                "{left}{right}"
            );
        }
    }
}

#[test]
fn union_accepts_either_language() {
    let automata = random_nfas().take(30).collect_vec();
    for (left, right) in automata.iter().tuple_windows() {
        let union = left.union(right);
        assert_eq!(union.size(), left.size() + right.size());
        for word in words_up_to(2, MAX_SIZE) {
            assert_eq!(
                union.accepts(&word),
                left.accepts(&word) || right.accepts(&word)
            );
        }
    }
}
