//! Reads automata from their textual description.
//!
//! The input is a stream of whitespace separated tokens of the following shape, where the
//! `Ops` part can be left out for every automaton after the first one, which then reuses the
//! alphabet of its predecessor:
//! ```text
//! Ops a:1 b:1 x:0
//! Automaton A
//! States q0 q1
//! Final States q1
//! Transitions
//! x -> q0
//! a(q0) -> q1
//! b(q1)->q1
//! ```
//! Only symbols of arity one make it into the alphabet. A transition whose left-hand side has no
//! parentheses (a nullary symbol like `x`, or nothing at all) marks its target as initial.
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    alphabet::{Alphabet, Letter},
    automaton::{Automaton, StateId},
    math::Bijection,
};

/// Errors that occur when the textual description of automata is malformed.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    /// The input ended before the `Transitions` section of the last automaton was reached, or in
    /// the middle of a transition.
    #[error("input ended unexpectedly, expected {0}")]
    UnexpectedEnd(&'static str),
    /// A token appeared at a position where it is not allowed.
    #[error("unexpected token `{token}`, expected {expected}")]
    UnexpectedToken {
        /// The offending token.
        token: String,
        /// Description of what was expected instead.
        expected: &'static str,
    },
    /// A state was referenced that has not been declared in the `States` section.
    #[error("automaton `{automaton}` has no state `{state}`")]
    UnknownState {
        /// Name of the automaton that is currently read.
        automaton: String,
        /// The undeclared state.
        state: String,
    },
    /// A transition uses a symbol that is not part of the alphabet.
    #[error("automaton `{automaton}` has no symbol `{symbol}` in its alphabet")]
    UnknownSymbol {
        /// Name of the automaton that is currently read.
        automaton: String,
        /// The unknown symbol.
        symbol: String,
    },
    /// A state was declared twice.
    #[error("automaton `{automaton}` declares state `{state}` twice")]
    DuplicateState {
        /// Name of the automaton that is currently read.
        automaton: String,
        /// The duplicated state name.
        state: String,
    },
    /// The left-hand side of a transition could not be read.
    #[error("malformed transition `{0}`")]
    MalformedTransition(String),
}

/// The section of the input that is currently read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Start,
    Ops,
    Name,
    StatesKeyword,
    States,
    Final,
    FinalStates,
    Transitions,
}

/// Left-hand side of a transition that awaits its arrow and target.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    None,
    Initial { arrow: bool },
    Edge { letter: Letter, source: StateId, arrow: bool },
}

/// An automaton together with the table that maps the names of its states to their ids.
struct Draft {
    automaton: Automaton,
    names: Bijection<String, StateId>,
}

impl Draft {
    fn new(name: &str, alphabet: Alphabet) -> Self {
        Self {
            automaton: Automaton::new(name, alphabet),
            names: Bijection::new(),
        }
    }

    fn declare(&mut self, name: &str) -> Result<(), ParseError> {
        if self.names.contains_left(name) {
            return Err(ParseError::DuplicateState {
                automaton: self.automaton.name().to_string(),
                state: name.to_string(),
            });
        }
        let id = self.automaton.add_state(name);
        self.names.insert(name.to_string(), id);
        Ok(())
    }

    fn state(&self, name: &str) -> Result<StateId, ParseError> {
        self.names
            .get_by_left(name)
            .copied()
            .ok_or_else(|| ParseError::UnknownState {
                automaton: self.automaton.name().to_string(),
                state: name.to_string(),
            })
    }

    fn letter(&self, symbol: &str) -> Result<Letter, ParseError> {
        self.automaton
            .alphabet()
            .letter(symbol)
            .ok_or_else(|| ParseError::UnknownSymbol {
                automaton: self.automaton.name().to_string(),
                symbol: symbol.to_string(),
            })
    }

    /// Reads the left-hand side of a transition.
    fn left_side(&self, token: &str) -> Result<Pending, ParseError> {
        let Some(open) = token.find('(') else {
            return Ok(Pending::Initial { arrow: false });
        };
        let inner = token[open + 1..]
            .strip_suffix(')')
            .filter(|inner| !inner.is_empty() && !inner.contains(['(', ')']))
            .ok_or_else(|| ParseError::MalformedTransition(token.to_string()))?;
        Ok(Pending::Edge {
            letter: self.letter(&token[..open])?,
            source: self.state(inner)?,
            arrow: false,
        })
    }

    /// Reads the target of a transition and inserts it.
    fn complete(&mut self, pending: Pending, target: &str) -> Result<(), ParseError> {
        let target = self.state(target)?;
        match pending {
            Pending::Initial { .. } => self.automaton.set_initial(target, true),
            Pending::Edge { letter, source, .. } => {
                if !self.automaton.insert_edge(source, letter, target) {
                    trace!("ignoring duplicate transition into {target}");
                }
            }
            Pending::None => unreachable!("a target is only read after a left-hand side"),
        }
        Ok(())
    }
}

/// Splits the input into whitespace separated tokens and additionally separates arrows that are
/// glued to their operands, so `a(q0)->q1` yields `a(q0)`, `->` and `q1`.
fn tokens(input: &str) -> impl Iterator<Item = &str> + '_ {
    input.split_whitespace().flat_map(|word| {
        let mut parts = Vec::new();
        let mut rest = word;
        while let Some(pos) = rest.find("->") {
            if pos > 0 {
                parts.push(&rest[..pos]);
            }
            parts.push("->");
            rest = &rest[pos + 2..];
        }
        if !rest.is_empty() {
            parts.push(rest);
        }
        parts
    })
}

/// Parses all automata contained in `input`. Either every automaton is read successfully or an
/// error is returned, partially read automata are never handed out.
///
/// # Example
/// ```
/// use automata_engine::prelude::*;
///
/// let automata = parse_automata(
///     "Ops a:1 x:0 Automaton A States q0 q1 Final States q1 Transitions x -> q0 a(q0) -> q1",
/// )
/// .unwrap();
/// assert_eq!(automata.len(), 1);
/// assert_eq!(automata[0].size(), 2);
/// assert!(automata[0].accepts(&[0]));
/// ```
pub fn parse_automata(input: &str) -> Result<Vec<Automaton>, ParseError> {
    let mut section = Section::Start;
    let mut symbols: Vec<String> = Vec::new();
    let mut drafts: Vec<Draft> = Vec::new();
    let mut pending = Pending::None;

    let mut tokens = tokens(input).peekable();
    while let Some(token) = tokens.next() {
        if section == Section::Name {
            debug!("reading automaton {token}");
            drafts.push(Draft::new(token, Alphabet::from_symbols(symbols.iter().cloned())));
            section = Section::StatesKeyword;
            continue;
        }
        match (section, token, drafts.last_mut()) {
            (Section::Start | Section::Transitions, "Ops", _) if pending == Pending::None => {
                section = Section::Ops;
                symbols.clear();
            }
            (Section::Ops | Section::Transitions, "Automaton", _) if pending == Pending::None => {
                section = Section::Name;
            }
            (Section::Ops, symbol, _) => match symbol.split_once(':') {
                Some((name, "1")) if !name.is_empty() => symbols.push(name.to_string()),
                Some((_, arity)) if arity.parse::<usize>().is_ok() => {
                    trace!("skipping symbol {symbol} which is not unary")
                }
                _ => {
                    return Err(ParseError::UnexpectedToken {
                        token: symbol.to_string(),
                        expected: "a symbol with arity, e.g. `a:1`",
                    })
                }
            },
            (Section::StatesKeyword, "States", _) => section = Section::States,
            // `Final` only ends the list of states when it starts `Final States`
            (Section::States, "Final", _) if tokens.peek() == Some(&"States") => {
                section = Section::Final
            }
            (Section::States, state, Some(draft)) => {
                // tolerate the `q0:0` notation for states
                let name = state.split_once(':').map_or(state, |(name, _)| name);
                draft.declare(name)?;
            }
            (Section::Final, "States", _) => section = Section::FinalStates,
            (Section::FinalStates, "Transitions", _) => section = Section::Transitions,
            (Section::FinalStates, state, Some(draft)) => {
                let q = draft.state(state)?;
                draft.automaton.set_final(q, true);
            }
            (Section::Transitions, token, Some(draft)) => {
                pending = match (pending, token) {
                    (Pending::None, "->") => Pending::Initial { arrow: true },
                    (Pending::None, lhs) => draft.left_side(lhs)?,
                    (Pending::Initial { arrow: false }, "->") => Pending::Initial { arrow: true },
                    (Pending::Edge { letter, source, arrow: false }, "->") => Pending::Edge {
                        letter,
                        source,
                        arrow: true,
                    },
                    (Pending::Initial { arrow: true } | Pending::Edge { arrow: true, .. }, "->") => {
                        return Err(ParseError::MalformedTransition("-> ->".to_string()))
                    }
                    (p @ (Pending::Initial { arrow: true } | Pending::Edge { arrow: true, .. }), target) => {
                        draft.complete(p, target)?;
                        Pending::None
                    }
                    (_, token) => {
                        return Err(ParseError::UnexpectedToken {
                            token: token.to_string(),
                            expected: "`->`",
                        })
                    }
                };
            }
            (section, token, _) => {
                return Err(ParseError::UnexpectedToken {
                    token: token.to_string(),
                    expected: match section {
                        Section::Start => "`Ops`",
                        Section::StatesKeyword => "`States` after the automaton name",
                        Section::Final => "`States` after `Final`",
                        _ => "a section keyword",
                    },
                })
            }
        }
    }

    if section != Section::Transitions {
        return Err(ParseError::UnexpectedEnd("a `Transitions` section"));
    }
    if pending != Pending::None {
        return Err(ParseError::UnexpectedEnd("the target of a transition"));
    }
    debug!("read {} automata", drafts.len());
    Ok(drafts.into_iter().map(|draft| draft.automaton).collect())
}
