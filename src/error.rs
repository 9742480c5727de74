// Copyright (c) 2018 Fabian Schuiki

//! Errors reported by the analyses and recognizers.

use thiserror::Error;

/// An error that makes an analysis or recognizer refuse its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The grammar has no rules or no nonterminals.
    #[error("grammar has no rules")]
    EmptyGrammar,
    /// A nonterminal is referenced but never appears on a left-hand side.
    #[error("nonterminal `{0}` is used but has no rules")]
    UndefinedNonterminal(String),
    /// A word contains a symbol that is not a terminal of the grammar.
    #[error("`{symbol}` at position {position} is not a terminal of the grammar")]
    UnknownTerminal {
        /// The offending symbol.
        symbol: String,
        /// The position of the symbol within the word.
        position: usize,
    },
    /// A context-free analysis was given an unrestricted rule.
    #[error("rule `{0}` does not have a single nonterminal on its left-hand side")]
    NotContextFree(String),
    /// CYK was given a rule not of the form `A -> a` or `A -> B C`.
    #[error("rule `{0}` is not of the form `A -> a` or `A -> B C`")]
    NotBinaryNormalForm(String),
    /// A grammar description could not be parsed.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax {
        /// The byte offset into the description.
        offset: usize,
        /// What went wrong.
        message: String,
    },
    /// A name is used both as a terminal and as a nonterminal.
    #[error("`{0}` is used both as a terminal and as a nonterminal")]
    NameConflict(String),
}

/// A result with the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;
