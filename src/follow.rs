// Copyright (c) 2018 Fabian Schuiki

//! Follow set computation.
//!
//! The follow set of a nonterminal contains all terminals that may appear
//! immediately after it in some sentential form derived from the start symbol.
//! The follow set of the start symbol always contains `$end`.

use bit_set::BitSet;
use std::fmt;
use std::iter::repeat;
use std::ops::Index;

use crate::error::Result;
use crate::first::{FirstSet, FirstSets};
use crate::grammar::{self, Grammar, NonterminalId, Symbol, TerminalId};
use crate::Pretty;

/// All follow sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FollowSets(Vec<FollowSet>);

/// The follow set of a nonterminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FollowSet {
    symbols: BitSet,
}

impl FollowSets {
    /// Compute the follow sets of a grammar.
    ///
    /// The first sets must have been computed for the same grammar.
    pub fn compute(grammar: &Grammar, first: &FirstSets) -> Result<FollowSets> {
        grammar.require_context_free()?;
        grammar.check_defined()?;
        Ok(compute(grammar, first))
    }

    /// The follow set of a nonterminal.
    pub fn get(&self, id: NonterminalId) -> &FollowSet {
        &self.0[id.as_usize()]
    }

    /// Get a pretty printer for these follow sets.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl Index<NonterminalId> for FollowSets {
    type Output = FollowSet;

    fn index(&self, index: NonterminalId) -> &FollowSet {
        self.get(index)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FollowSets> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, set) in self.item.0.iter().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            let id = NonterminalId::from_usize(index);
            write!(f, "{}: {}", id.pretty(self.ctx), set.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl FollowSet {
    /// The follow terminals as a bit set over terminal ids.
    pub fn symbols(&self) -> &BitSet {
        &self.symbols
    }

    /// Iterate over the follow terminals, `$end` first if present.
    pub fn terminals<'a>(&'a self) -> impl Iterator<Item = TerminalId> + 'a {
        self.symbols.iter().map(TerminalId::from_usize)
    }

    /// Check whether a terminal is in the set.
    pub fn contains(&self, id: TerminalId) -> bool {
        self.symbols.contains(id.as_usize())
    }

    /// Check whether a first set shares a terminal with this follow set.
    pub fn intersects(&self, first: &FirstSet) -> bool {
        !self.symbols.is_disjoint(first.symbols())
    }

    /// Get a pretty printer for this follow set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FollowSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (index, id) in self.item.terminals().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", id.pretty(self.ctx))?;
        }
        write!(f, "}}")
    }
}

fn compute(grammar: &Grammar, first: &FirstSets) -> FollowSets {
    let num_term = grammar.terminal_id_bound();
    let mut sets: Vec<BitSet> = repeat(BitSet::with_capacity(num_term))
        .take(grammar.nonterminal_id_bound())
        .collect();
    sets[grammar.start().as_usize()].insert(grammar::END.as_usize());

    // Iterate over all rules A -> α B β until nothing changes anymore.
    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut changed = false;
        for rule in grammar.rules() {
            let lhs = rule.name().as_usize();
            let symbols = rule.symbols();
            for (index, symbol) in symbols.iter().enumerate() {
                let target = match *symbol {
                    Symbol::Nonterminal(id) => id.as_usize(),
                    Symbol::Terminal(_) => continue,
                };
                let rest = first.of_sequence(&symbols[index + 1..]);
                let mut add = rest.symbols().clone();
                if rest.has_epsilon() {
                    add.union_with(&sets[lhs]);
                }
                let before = sets[target].len();
                sets[target].union_with(&add);
                changed |= sets[target].len() != before;
            }
        }
        if !changed {
            break;
        }
    }
    debug!("follow sets converged after {} rounds", rounds);

    FollowSets(
        sets.into_iter()
            .map(|symbols| FollowSet { symbols })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Rule;
    use expect_test::expect;

    #[test]
    fn expression_grammar() {
        // E -> E + T | T; T -> T * F | F; F -> ( E ) | id
        let mut g = Grammar::new();
        let (nt_e, nt_t, nt_f) = (
            g.add_nonterminal("E"),
            g.add_nonterminal("T"),
            g.add_nonterminal("F"),
        );
        let t_plus = g.add_terminal("+");
        let t_star = g.add_terminal("*");
        let t_lp = g.add_terminal("(");
        let t_rp = g.add_terminal(")");
        let t_id = g.add_terminal("id");
        g.add_rule(Rule::new(nt_e, vec![nt_e.into(), t_plus.into(), nt_t.into()]));
        g.add_rule(Rule::new(nt_e, vec![nt_t.into()]));
        g.add_rule(Rule::new(nt_t, vec![nt_t.into(), t_star.into(), nt_f.into()]));
        g.add_rule(Rule::new(nt_t, vec![nt_f.into()]));
        g.add_rule(Rule::new(nt_f, vec![t_lp.into(), nt_e.into(), t_rp.into()]));
        g.add_rule(Rule::new(nt_f, vec![t_id.into()]));

        let first = FirstSets::compute(&g).unwrap();
        let follow = FollowSets::compute(&g, &first).unwrap();
        expect![[r#"
            E: {$end, +, )}
            T: {$end, +, *, )}
            F: {$end, +, *, )}"#]]
        .assert_eq(&follow.pretty(&g).to_string());
        assert_eq!(FollowSets::compute(&g, &first), Ok(follow));
    }

    #[test]
    fn nullable_tail_propagates_lhs() {
        // S -> a A; A -> B C; B -> b; C -> ε | c
        let mut g = Grammar::new();
        let (nt_s, nt_a, nt_b, nt_c) = (
            g.add_nonterminal("S"),
            g.add_nonterminal("A"),
            g.add_nonterminal("B"),
            g.add_nonterminal("C"),
        );
        let (ta, tb, tc) = (g.add_terminal("a"), g.add_terminal("b"), g.add_terminal("c"));
        g.add_rule(Rule::new(nt_s, vec![ta.into(), nt_a.into()]));
        g.add_rule(Rule::new(nt_a, vec![nt_b.into(), nt_c.into()]));
        g.add_rule(Rule::new(nt_b, vec![tb.into()]));
        g.add_rule(Rule::new(nt_c, vec![]));
        g.add_rule(Rule::new(nt_c, vec![tc.into()]));

        let first = FirstSets::compute(&g).unwrap();
        let follow = FollowSets::compute(&g, &first).unwrap();
        assert_eq!(follow[nt_s].pretty(&g).to_string(), "{$end}");
        assert_eq!(follow[nt_a].pretty(&g).to_string(), "{$end}");
        assert_eq!(follow[nt_b].pretty(&g).to_string(), "{$end, c}");
        assert_eq!(follow[nt_c].pretty(&g).to_string(), "{$end}");
        assert!(follow[nt_b].contains(tc));
        assert!(!follow[nt_b].contains(ta));
    }
}
