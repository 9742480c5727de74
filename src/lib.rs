// Copyright (c) 2018 Fabian Schuiki

//! A grammar analyzer and membership tester for formal languages.
//!
//! The crate bundles four strategies, picked by the caller based on the class
//! of the grammar at hand:
//!
//! - FIRST/FOLLOW sets and the LL(1) check (`first`, `follow`, `ll1`),
//! - canonical LR(0) item sets and an SLR(1) table (`item_set`, `machine`),
//! - the CYK recognizer for grammars in binary normal form (`cyk`),
//! - an exhaustive background search for arbitrary grammars (`search`).

#![deny(missing_docs)]

extern crate bit_set;
extern crate indexmap;
#[macro_use]
extern crate log;

pub mod analysis;
pub mod cyk;
pub mod error;
mod filter;
pub mod first;
pub mod follow;
pub mod grammar;
pub mod item_set;
pub mod lexer;
pub mod ll1;
pub mod machine;
pub mod parser;
pub mod search;
mod search_tree;

pub use crate::error::{Error, Result};

/// A pretty printer.
pub struct Pretty<C, T> {
    ctx: C,
    item: T,
}

impl<C, T> Pretty<C, T> {
    pub(crate) fn new(ctx: C, item: T) -> Pretty<C, T> {
        Pretty { ctx, item }
    }
}
