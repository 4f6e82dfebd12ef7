//! Library implementing the classic decision and transformation procedures for finite automata
//! over finite words.
//!
//! The central type is [`Automaton`], a nondeterministic finite automaton (NFA) which stores its
//! states in an arena. Every state keeps a forward and a mirrored backward transition map, where
//! transitions reference other states by their [`StateId`], i.e. their position in the arena. For
//! every forward edge `(p, a, q)` there is precisely one backward edge `(q, a, p)`, which makes
//! reversal, co-reachability and the merging of states cheap index manipulations.
//!
//! On top of this model the crate implements
//! - emptiness checking and the removal of useless states (see [`reachability`] and [`useless`]),
//! - the product construction and the subset construction (see [`product`]),
//! - Hopcroft's partition refinement for minimizing deterministic automata (see [`minimization`]),
//! - the computation of the maximal simulation preorder (see [`simulation`]) and the Ilie-style
//!   reduction of nondeterministic automata that builds upon it (see [`reduction`]),
//! - antichain-based universality and language inclusion checks (see [`antichain`]),
//! - structural combinators like union and complement (see [`combinators`]).
//!
//! Automata are usually read from a simple textual description with [`parse::parse_automata`] and
//! can be printed through their [`std::fmt::Display`] implementation.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_engine::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{Alphabet, Letter},
        antichain::{Inclusion, MacroState, ProductState, Subsumption, Universality},
        automaton::{Automaton, AutomatonBuilder, State, StateId},
        error::Error,
        math,
        parse::{parse_automata, ParseError},
        product::DeterminizeConfig,
        reachability::{Direction, Order, Search},
        relation::Relation,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Alphabets of unary symbols and the letters indexing them.
pub mod alphabet;
pub use alphabet::Alphabet;

/// Defines the automaton data structure.
pub mod automaton;
pub use automaton::{Automaton, StateId};

mod error;
pub use error::Error;

pub mod parse;

mod run;
mod show;

pub mod reachability;

pub mod useless;

pub mod product;

/// Contains the implementation of Hopcroft's minimization algorithm.
pub mod minimization;

/// Binary relations over the states of an automaton.
pub mod relation;
pub use relation::Relation;

pub mod simulation;

pub mod reduction;

pub mod antichain;

pub mod combinators;

/// Implements the generation of random automata.
#[cfg(feature = "random")]
pub mod random;
