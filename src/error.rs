use thiserror::Error;

use crate::{alphabet::Alphabet, parse::ParseError};

/// Abstracts the errors that can occur when automata are read, selected or handed to an
/// algorithm whose precondition they do not satisfy.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Error {
    /// The textual input could not be turned into automata.
    #[error("could not parse automata: {0}")]
    Parse(#[from] ParseError),
    /// A mode was invoked with fewer automata than it needs.
    #[error("{mode} requires {expected} automata, but only {found} were given")]
    Usage {
        /// Name of the invoked mode.
        mode: String,
        /// Number of automata the mode needs.
        expected: usize,
        /// Number of automata that were available.
        found: usize,
    },
    /// Language inclusion is only decided between automata over the same alphabet.
    #[error("alphabets {left} and {right} are incompatible")]
    IncompatibleAlphabets {
        /// Alphabet of the left automaton.
        left: Alphabet,
        /// Alphabet of the right automaton.
        right: Alphabet,
    },
    /// The named automaton has a state with two successors for the same letter.
    #[error("automaton `{0}` is not deterministic")]
    NotDeterministic(String),
    /// The named automaton is not complete, i.e. it does not have precisely one initial
    /// state and one successor for every state and letter.
    #[error("automaton `{0}` is not complete and deterministic")]
    NotComplete(String),
}
