// Copyright (c) 2018 Fabian Schuiki

//! LL(1) analysis.
//!
//! A grammar is LL(1) if for every nonterminal the alternatives can be told
//! apart by a single lookahead terminal. This module checks that property and
//! builds the prediction table used by a table-driven top-down parser.

use std::collections::BTreeMap;
use std::fmt;

use crate::first::FirstSets;
use crate::follow::FollowSets;
use crate::grammar::{Grammar, NonterminalId, RuleId, TerminalId};
use crate::Pretty;

/// The reason two alternatives of a nonterminal cannot be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// The first sets of both alternatives intersect.
    FirstFirst,
    /// One alternative may be empty and the other starts with a terminal that
    /// may follow the nonterminal.
    FirstFollow,
}

/// Two alternatives of a nonterminal that violate the LL(1) condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Conflict {
    /// The nonterminal whose alternatives conflict.
    pub nonterminal: NonterminalId,
    /// The earlier of the two rules.
    pub first: RuleId,
    /// The later of the two rules.
    pub second: RuleId,
    /// Which condition is violated.
    pub kind: ConflictKind,
}

impl Conflict {
    /// Get a pretty printer for this conflict.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Conflict> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.item.kind {
            ConflictKind::FirstFirst => "FIRST/FIRST",
            ConflictKind::FirstFollow => "FIRST/FOLLOW",
        };
        write!(
            f,
            "{} conflict on {} between `{}` and `{}`",
            kind,
            self.item.nonterminal.pretty(self.ctx),
            self.ctx.rule(self.item.first).pretty(self.ctx),
            self.ctx.rule(self.item.second).pretty(self.ctx),
        )
    }
}

/// Find the first pair of alternatives that violates the LL(1) condition.
///
/// Nonterminals are visited in id order and their alternatives in rule order.
/// Returns `None` if the grammar is LL(1).
pub fn find_conflict(
    grammar: &Grammar,
    first: &FirstSets,
    follow: &FollowSets,
) -> Option<Conflict> {
    for nonterminal in grammar.nonterminals() {
        let rules: Vec<RuleId> = grammar.rules_for_nonterminal(nonterminal).cloned().collect();
        let firsts: Vec<_> = rules
            .iter()
            .map(|&id| first.of_sequence(grammar.rule(id).symbols()))
            .collect();
        let follow_set = follow.get(nonterminal);
        for a in 0..rules.len() {
            for b in a + 1..rules.len() {
                let (fa, fb) = (&firsts[a], &firsts[b]);
                let kind = if fa.intersects(fb) {
                    ConflictKind::FirstFirst
                } else if (fa.has_epsilon() && follow_set.intersects(fb))
                    || (fb.has_epsilon() && follow_set.intersects(fa))
                {
                    ConflictKind::FirstFollow
                } else {
                    continue;
                };
                let conflict = Conflict {
                    nonterminal,
                    first: rules[a],
                    second: rules[b],
                    kind,
                };
                debug!("{}", conflict.pretty(grammar));
                return Some(conflict);
            }
        }
    }
    None
}

/// Check whether a grammar is LL(1).
pub fn is_ll1(grammar: &Grammar, first: &FirstSets, follow: &FollowSets) -> bool {
    find_conflict(grammar, first, follow).is_none()
}

/// An LL(1) prediction table.
///
/// Maps a nonterminal and a lookahead terminal to the rules that may be
/// expanded. A cell with more than one rule is a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictTable {
    cells: BTreeMap<(NonterminalId, TerminalId), Vec<RuleId>>,
}

impl PredictTable {
    /// Build the prediction table for a grammar.
    pub fn compute(grammar: &Grammar, first: &FirstSets, follow: &FollowSets) -> PredictTable {
        let mut cells: BTreeMap<(NonterminalId, TerminalId), Vec<RuleId>> = BTreeMap::new();
        for id in grammar.rule_ids() {
            let rule = grammar.rule(id);
            let name = rule.name();
            let fs = first.of_sequence(rule.symbols());
            let mut lookaheads: Vec<TerminalId> = fs.terminals().collect();
            if fs.has_epsilon() {
                lookaheads.extend(follow.get(name).terminals());
            }
            for t in lookaheads {
                let cell = cells.entry((name, t)).or_insert_with(Vec::new);
                if !cell.contains(&id) {
                    cell.push(id);
                }
            }
        }
        PredictTable { cells }
    }

    /// The rules predicted for a nonterminal on a lookahead terminal.
    pub fn get(&self, nonterminal: NonterminalId, lookahead: TerminalId) -> &[RuleId] {
        self.cells
            .get(&(nonterminal, lookahead))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over all non-empty cells in nonterminal, terminal order.
    pub fn cells<'a>(
        &'a self,
    ) -> impl Iterator<Item = (NonterminalId, TerminalId, &'a [RuleId])> + 'a {
        self.cells.iter().map(|(&(n, t), r)| (n, t, r.as_slice()))
    }

    /// Iterate over the cells that predict more than one rule.
    pub fn conflicts<'a>(
        &'a self,
    ) -> impl Iterator<Item = (NonterminalId, TerminalId, &'a [RuleId])> + 'a {
        self.cells().filter(|&(_, _, rules)| rules.len() > 1)
    }

    /// Whether every cell predicts at most one rule.
    pub fn is_deterministic(&self) -> bool {
        self.conflicts().next().is_none()
    }

    /// Get a pretty printer for this table.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a PredictTable> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, (n, t, rules)) in self.item.cells().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(f, "[{}, {}]", n.pretty(self.ctx), t.pretty(self.ctx))?;
            for &rule in rules {
                write!(f, " {};", self.ctx.rule(rule).pretty(self.ctx))?;
            }
        }
        Ok(())
    }
}
