// Copyright (c) 2018 Fabian Schuiki

//! Admissibility filters for sentential forms.
//!
//! A filter discards forms that provably cannot derive the target word. The
//! length filter works for every grammar. The bookend filter relies on
//! terminals never being rewritten and is only sound for context-free
//! grammars.

use std::collections::HashSet;

use crate::grammar::{Grammar, Symbol, TerminalId};

/// Compute the symbols that may disappear from a form.
///
/// A rule whose left-hand side has more non-shrinkable symbols than its
/// right-hand side marks every symbol on its left-hand side as shrinkable.
/// For a context-free grammar these are exactly the nullable nonterminals.
pub fn shrinkable_symbols(grammar: &Grammar) -> HashSet<Symbol> {
    let mut shrinkable = HashSet::new();
    loop {
        let mut changed = false;
        for rule in grammar.rules() {
            if min_len(&shrinkable, rule.lhs()) > min_len(&shrinkable, rule.symbols()) {
                for &symbol in rule.lhs() {
                    changed |= shrinkable.insert(symbol);
                }
            }
        }
        if !changed {
            break;
        }
    }
    trace!("{} shrinkable symbols", shrinkable.len());
    shrinkable
}

fn min_len(shrinkable: &HashSet<Symbol>, form: &[Symbol]) -> usize {
    form.iter().filter(|s| !shrinkable.contains(s)).count()
}

/// Decides whether a sentential form may still derive a target word.
#[derive(Debug, Clone)]
pub struct Filter {
    shrinkable: HashSet<Symbol>,
    target: Vec<TerminalId>,
    bookend: bool,
}

impl Filter {
    /// Create a filter for a target word.
    ///
    /// The bookend check is applied only if `bookend` is set. The caller must
    /// ensure the grammar is context-free in that case.
    pub fn new(grammar: &Grammar, target: &[TerminalId], bookend: bool) -> Filter {
        Filter {
            shrinkable: shrinkable_symbols(grammar),
            target: target.to_vec(),
            bookend,
        }
    }

    /// A lower bound on the length of any word derived from a form.
    pub fn min_len(&self, form: &[Symbol]) -> usize {
        min_len(&self.shrinkable, form)
    }

    /// Check whether a form passes the filter.
    pub fn admits(&self, form: &[Symbol]) -> bool {
        if self.min_len(form) > self.target.len() {
            return false;
        }
        !self.bookend || self.bookends_match(form)
    }

    fn bookends_match(&self, form: &[Symbol]) -> bool {
        let target = &self.target[..];
        let first_nt = match form.iter().position(|s| s.is_nonterminal()) {
            Some(p) => p,
            None => return terminals_eq(form, target),
        };
        let last_nt = form.iter().rposition(|s| s.is_nonterminal()).unwrap_or(first_nt);

        let prefix = &form[..first_nt];
        let suffix = &form[last_nt + 1..];
        if prefix.len() + suffix.len() > target.len() {
            return false;
        }
        if !terminals_eq(prefix, &target[..prefix.len()]) {
            return false;
        }
        if !terminals_eq(suffix, &target[target.len() - suffix.len()..]) {
            return false;
        }

        // Interior terminal runs must occur in order, without overlapping.
        let mut rest = &target[prefix.len()..target.len() - suffix.len()];
        for run in form[first_nt..last_nt + 1].split(|s| s.is_nonterminal()) {
            if run.is_empty() {
                continue;
            }
            match find_run(run, rest) {
                Some(at) => rest = &rest[at + run.len()..],
                None => return false,
            }
        }
        true
    }
}

fn terminals_eq(form: &[Symbol], word: &[TerminalId]) -> bool {
    form.len() == word.len()
        && form
            .iter()
            .zip(word.iter())
            .all(|(&s, &t)| s == Symbol::Terminal(t))
}

fn find_run(run: &[Symbol], word: &[TerminalId]) -> Option<usize> {
    if run.len() > word.len() {
        return None;
    }
    (0..word.len() - run.len() + 1).find(|&at| terminals_eq(run, &word[at..at + run.len()]))
}
