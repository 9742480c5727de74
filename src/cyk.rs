// Copyright (c) 2018 Fabian Schuiki

//! The CYK recognizer for grammars in binary normal form.
//!
//! Every rule must be of the form `A -> a` or `A -> B C`. The recognizer fills
//! a table with one cell per span of the input, each holding the nonterminals
//! that derive exactly that span together with the first witness found for
//! them. A successful run can be traced back into a leftmost derivation.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::grammar::{Grammar, NonterminalId, RuleId, Symbol, TerminalId};

/// A CYK recognizer for a grammar.
pub struct CykParser<'a> {
    grammar: &'a Grammar,
    terminal_rules: HashMap<TerminalId, Vec<(NonterminalId, RuleId)>>,
    binary_rules: Vec<BinaryRule>,
    /// Indexed by `[len - 1][start]`.
    table: Vec<Vec<IndexMap<NonterminalId, Witness>>>,
    solved: bool,
}

/// The reason a nonterminal was entered into a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Witness {
    /// The span is a single terminal matched by the rule.
    Terminal(RuleId),
    /// The span is split into two parts matched by the rule's two symbols.
    Binary {
        /// The rule `A -> B C`.
        rule: RuleId,
        /// The length of the part matched by `B`.
        split: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct BinaryRule {
    lhs: NonterminalId,
    left: NonterminalId,
    right: NonterminalId,
    id: RuleId,
}

impl<'a> CykParser<'a> {
    /// Create a recognizer for a grammar.
    ///
    /// Fails if a rule is not of the form `A -> a` or `A -> B C`, or if the
    /// grammar is not well-formed.
    pub fn new(grammar: &'a Grammar) -> Result<CykParser<'a>> {
        grammar.check_defined()?;
        if let Some(id) = grammar.find_non_binary_rule() {
            return Err(Error::NotBinaryNormalForm(
                grammar.rule(id).pretty(grammar).to_string(),
            ));
        }

        let mut terminal_rules: HashMap<TerminalId, Vec<(NonterminalId, RuleId)>> =
            HashMap::new();
        let mut binary_rules = Vec::new();
        for id in grammar.rule_ids() {
            let rule = grammar.rule(id);
            match *rule.symbols() {
                [Symbol::Terminal(t)] => terminal_rules
                    .entry(t)
                    .or_insert_with(Vec::new)
                    .push((rule.name(), id)),
                [Symbol::Nonterminal(left), Symbol::Nonterminal(right)] => {
                    binary_rules.push(BinaryRule {
                        lhs: rule.name(),
                        left,
                        right,
                        id,
                    })
                }
                _ => unreachable!("binary normal form checked above"),
            }
        }

        Ok(CykParser {
            grammar,
            terminal_rules,
            binary_rules,
            table: Vec::new(),
            solved: false,
        })
    }

    /// Check whether the grammar derives a word.
    ///
    /// Fails if the word contains a symbol that is not a terminal of the
    /// grammar. The empty word is always rejected.
    pub fn solve(&mut self, word: &[TerminalId]) -> Result<bool> {
        self.table.clear();
        self.solved = false;
        self.grammar.check_word(word)?;
        let n = word.len();
        if n == 0 {
            debug!("cyk: rejecting the empty word");
            return Ok(false);
        }

        // Spans of length 1.
        let mut row = Vec::with_capacity(n);
        for (i, t) in word.iter().enumerate() {
            let mut cell = IndexMap::new();
            if let Some(rules) = self.terminal_rules.get(t) {
                for &(nt, id) in rules {
                    cell.entry(nt).or_insert(Witness::Terminal(id));
                }
            }
            if cell.is_empty() {
                debug!("cyk: no rule produces the terminal at position {}", i);
                return Ok(false);
            }
            row.push(cell);
        }
        self.table.push(row);

        // Longer spans, combined from two shorter ones.
        for len in 2..n + 1 {
            let mut row = Vec::with_capacity(n + 1 - len);
            for start in 0..n + 1 - len {
                let mut cell = IndexMap::new();
                for split in 1..len {
                    let left = &self.table[split - 1][start];
                    let right = &self.table[len - split - 1][start + split];
                    for rule in &self.binary_rules {
                        if left.contains_key(&rule.left) && right.contains_key(&rule.right) {
                            cell.entry(rule.lhs).or_insert(Witness::Binary {
                                rule: rule.id,
                                split,
                            });
                        }
                    }
                }
                row.push(cell);
            }
            trace!(
                "cyk: spans of length {} filled, {} entries",
                len,
                row.iter().map(|c| c.len()).sum::<usize>()
            );
            self.table.push(row);
        }

        self.solved = self.table[n - 1][0].contains_key(&self.grammar.start());
        debug!(
            "cyk: word of length {} {}",
            n,
            if self.solved { "accepted" } else { "rejected" }
        );
        Ok(self.solved)
    }

    /// Check whether the grammar derives a word given as text.
    ///
    /// Every character names one terminal.
    pub fn solve_str(&mut self, input: &str) -> Result<bool> {
        let word = self.grammar.parse_word(input)?;
        self.solve(&word)
    }

    /// Whether the last call to `solve` accepted its word.
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// The nonterminals deriving the span of length `len` at `start`, in the
    /// order they were discovered.
    ///
    /// Empty if the span lies outside the last word solved.
    pub fn cell(&self, start: usize, len: usize) -> Vec<(NonterminalId, Witness)> {
        if len == 0 {
            return Vec::new();
        }
        self.table
            .get(len - 1)
            .and_then(|row| row.get(start))
            .map(|cell| cell.iter().map(|(&nt, &w)| (nt, w)).collect())
            .unwrap_or_default()
    }

    /// The leftmost derivation of the last word solved.
    ///
    /// Panics unless the last call to `solve` accepted its word.
    pub fn trace(&self) -> Vec<RuleId> {
        assert!(self.solved, "trace() called without a successful solve()");
        let mut rules = Vec::new();
        let mut stack = vec![(self.grammar.start(), 0, self.table.len())];
        while let Some((nt, start, len)) = stack.pop() {
            match self.table[len - 1][start][&nt] {
                Witness::Terminal(rule) => rules.push(rule),
                Witness::Binary { rule, split } => {
                    rules.push(rule);
                    let (left, right) = match *self.grammar.rule(rule).symbols() {
                        [Symbol::Nonterminal(l), Symbol::Nonterminal(r)] => (l, r),
                        _ => unreachable!("binary witness for a non-binary rule"),
                    };
                    stack.push((right, start + split, len - split));
                    stack.push((left, start, split));
                }
            }
        }
        rules
    }
}
