use itertools::Itertools;

/// A letter is the position of a symbol in an [`Alphabet`]. Transitions of an
/// automaton are indexed by letters, the symbols themselves are only needed when
/// automata over different alphabets are combined or when an automaton is printed.
pub type Letter = usize;

/// An alphabet is a finite, sorted and deduplicated sequence of unary symbols.
///
/// # Example
/// ```
/// use automata_engine::prelude::*;
///
/// let alphabet = Alphabet::from_symbols(["b", "a", "b"]);
/// assert_eq!(alphabet.len(), 2);
/// assert_eq!(alphabet.letter("b"), Some(1));
/// assert_eq!(alphabet.symbol(0), "a");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Alphabet {
    symbols: Vec<String>,
}

impl Alphabet {
    /// Creates an alphabet from the given symbols, which are sorted and deduplicated.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symbols = symbols
            .into_iter()
            .map(Into::into)
            .sorted()
            .dedup()
            .collect();
        Self { symbols }
    }

    /// Returns the number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if there are no symbols at all.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates over all letters, i.e. `0..self.len()`.
    pub fn letters(&self) -> std::ops::Range<Letter> {
        0..self.symbols.len()
    }

    /// Returns the symbol of `letter`. Panics if the letter does not belong to the alphabet.
    pub fn symbol(&self, letter: Letter) -> &str {
        &self.symbols[letter]
    }

    /// Iterates over the symbols in order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.symbols.iter().map(String::as_str)
    }

    /// Looks up the letter belonging to `symbol`.
    pub fn letter(&self, symbol: &str) -> Option<Letter> {
        self.symbols
            .binary_search_by(|s| s.as_str().cmp(symbol))
            .ok()
    }

    /// Returns the alphabet consisting of the symbols that appear in `self` or in `other`.
    pub fn union(&self, other: &Alphabet) -> Alphabet {
        Self::from_symbols(self.symbols().chain(other.symbols()))
    }

    /// Returns the alphabet consisting of the symbols that appear in both `self` and `other`.
    pub fn intersection(&self, other: &Alphabet) -> Alphabet {
        Self::from_symbols(self.symbols().filter(|s| other.letter(s).is_some()))
    }

    /// Computes, for every letter of `self`, the corresponding letter of `target` (if the
    /// symbol occurs there).
    pub fn translation(&self, target: &Alphabet) -> Vec<Option<Letter>> {
        self.symbols().map(|s| target.letter(s)).collect()
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.symbols.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::Alphabet;

    #[test]
    fn sorted_and_deduplicated() {
        let alphabet = Alphabet::from_symbols(["c", "a", "c", "b"]);
        assert_eq!(alphabet.symbols().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(alphabet.to_string(), "[a, b, c]");
        assert_eq!(alphabet.letter("d"), None);
    }

    #[test]
    fn set_operations() {
        let ab = Alphabet::from_symbols(["a", "b"]);
        let bc = Alphabet::from_symbols(["b", "c"]);
        assert_eq!(ab.union(&bc), Alphabet::from_symbols(["a", "b", "c"]));
        assert_eq!(ab.intersection(&bc), Alphabet::from_symbols(["b"]));
        assert_eq!(ab.translation(&bc), vec![None, Some(0)]);
    }
}
