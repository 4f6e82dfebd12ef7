use tracing::debug;

use crate::{alphabet::Alphabet, automaton::Automaton};

/// Returns the alphabet with `symbols` symbols, the first 26 of which are the letters `a` to `z`.
pub fn alphabet_of_size(symbols: usize) -> Alphabet {
    Alphabet::from_symbols((0..symbols).map(|i| match u8::try_from(i) {
        Ok(i) if i < 26 => char::from(b'a' + i).to_string(),
        _ => format!("s{i}"),
    }))
}

fn with_states(name: String, symbols: usize, size: usize) -> Automaton {
    let mut aut = Automaton::new(name, alphabet_of_size(symbols));
    for i in 0..size {
        aut.add_state(format!("q{i}"));
    }
    aut
}

/// Generates a random nondeterministic automaton with `size` states over `symbols` symbols.
/// Every possible transition is inserted independently such that each state has `density`
/// successors per letter on average. State 0 is the only initial state and every state is
/// final with probability `final_probability`. All choices are drawn from `rng`, so a seeded
/// generator always produces the same automaton.
pub fn generate_random_nfa(
    rng: &mut fastrand::Rng,
    symbols: usize,
    size: usize,
    density: f64,
    final_probability: f64,
) -> Automaton {
    let mut aut = with_states(format!("nfa{size}"), symbols, size);
    let probability = if size == 0 { 0.0 } else { density / size as f64 };
    for p in 0..size {
        for a in 0..symbols {
            for q in 0..size {
                if rng.f64() < probability {
                    aut.add_edge(p, a, q);
                }
            }
        }
        aut.set_final(p, rng.f64() < final_probability);
    }
    if size > 0 {
        aut.set_initial(0, true);
    }
    debug!(
        "generated {} with {} transitions",
        aut.name(),
        aut.transition_count()
    );
    aut
}

/// Generate a random complete deterministic automaton of size `size` by drawing a target for
/// every state and letter. Note that depending on the drawn transitions, there may be states
/// that are not reachable from the initial state 0. Every state is final with probability one
/// half.
pub fn generate_random_dfa(rng: &mut fastrand::Rng, symbols: usize, size: usize) -> Automaton {
    let mut aut = with_states(format!("dfa{size}"), symbols, size);
    if size == 0 {
        return aut;
    }
    for p in 0..size {
        for a in 0..symbols {
            let target = rng.usize(..size);
            aut.add_edge(p, a, target);
        }
        aut.set_final(p, rng.bool());
    }
    aut.set_initial(0, true);
    aut
}

#[cfg(test)]
mod tests {
    use super::{alphabet_of_size, generate_random_dfa, generate_random_nfa};

    #[test]
    fn alphabets_of_any_size() {
        assert_eq!(alphabet_of_size(3).to_string(), "[a, b, c]");
        let large = alphabet_of_size(30);
        assert_eq!(large.len(), 30);
        assert_eq!(large.symbol(0), "a");
    }

    #[test]
    fn random_dfas_are_complete() {
        let mut rng = fastrand::Rng::with_seed(7);
        for size in 1..10 {
            let dfa = generate_random_dfa(&mut rng, 2, size);
            assert_eq!(dfa.size(), size);
            assert!(dfa.is_complete());
            assert_eq!(dfa.transition_count(), 2 * size);
        }
        assert_eq!(generate_random_dfa(&mut rng, 2, 0).size(), 0);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let first = generate_random_nfa(&mut fastrand::Rng::with_seed(42), 2, 12, 1.5, 0.3);
        let second = generate_random_nfa(&mut fastrand::Rng::with_seed(42), 2, 12, 1.5, 0.3);
        assert_eq!(first, second);
        assert!(first.is_mirrored());
        assert!(first.is_initial(0));
    }
}
