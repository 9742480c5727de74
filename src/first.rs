// Copyright (c) 2018 Fabian Schuiki

//! First set computation.
//!
//! This module implements computation of the first sets for a grammar. The
//! first set of a rule states all terminals that can appear as its first
//! symbol. Since rules may contain other rules and epsilon items, computation
//! is somewhat tricky.

use bit_set::BitSet;
use std::fmt;
use std::iter::repeat;
use std::mem::swap;
use std::ops::Index;

use crate::error::Result;
use crate::grammar::{Grammar, NonterminalId, Symbol, TerminalId};
use crate::Pretty;

/// All first sets of a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FirstSets(Vec<FirstSet>);

/// The first set of a nonterminal or a sequence of symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FirstSet {
    /// The first symbols.
    symbols: BitSet,
    /// Whether one of the productions is empty.
    has_epsilon: bool,
}

impl FirstSets {
    /// Compute the first sets of a grammar.
    ///
    /// Fails if the grammar is not context-free, or if some nonterminal is
    /// used without having any rules.
    pub fn compute(grammar: &Grammar) -> Result<FirstSets> {
        grammar.require_context_free()?;
        grammar.check_defined()?;
        Ok(compute(grammar))
    }

    /// The first set of a single nonterminal.
    pub fn get(&self, id: NonterminalId) -> &FirstSet {
        &self.0[id.as_usize()]
    }

    /// The first set of a single symbol.
    ///
    /// The first set of a terminal is the terminal itself.
    pub fn of_symbol(&self, symbol: Symbol) -> FirstSet {
        match symbol {
            Symbol::Terminal(id) => FirstSet::terminal(id),
            Symbol::Nonterminal(id) => self.get(id).clone(),
        }
    }

    /// The first set of a sequence of symbols.
    ///
    /// The empty sequence has the first set `{ε}`.
    pub fn of_sequence(&self, symbols: &[Symbol]) -> FirstSet {
        let mut set = FirstSet::new();
        let tight = collect_symbols(symbols, &mut |symbol: &Symbol| match *symbol {
            Symbol::Terminal(id) => {
                set.symbols.insert(id.as_usize());
                true
            }
            Symbol::Nonterminal(id) => {
                let other = &self.0[id.as_usize()];
                set.symbols.union_with(&other.symbols);
                !other.has_epsilon
            }
        });
        set.has_epsilon = !tight;
        set
    }

    /// Get a pretty printer for these first sets.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl Index<NonterminalId> for FirstSets {
    type Output = FirstSet;

    fn index(&self, index: NonterminalId) -> &FirstSet {
        self.get(index)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FirstSets> {
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

impl FirstSet {
    /// Create an empty first set.
    pub fn new() -> FirstSet {
        FirstSet {
            symbols: BitSet::new(),
            has_epsilon: false,
        }
    }

    /// Create the first set `{t}` of a terminal.
    pub fn terminal(id: TerminalId) -> FirstSet {
        let mut set = FirstSet::new();
        set.symbols.insert(id.as_usize());
        set
    }

    /// The first terminals as a bit set over terminal ids.
    pub fn symbols(&self) -> &BitSet {
        &self.symbols
    }

    /// Iterate over the first terminals.
    pub fn terminals<'a>(&'a self) -> impl Iterator<Item = TerminalId> + 'a {
        self.symbols.iter().map(TerminalId::from_usize)
    }

    /// Check whether a terminal is in the set.
    pub fn contains(&self, id: TerminalId) -> bool {
        self.symbols.contains(id.as_usize())
    }

    /// Whether epsilon is in the set.
    pub fn has_epsilon(&self) -> bool {
        self.has_epsilon
    }

    /// Check whether two first sets share a terminal, or both contain epsilon.
    pub fn intersects(&self, other: &FirstSet) -> bool {
        (self.has_epsilon && other.has_epsilon) || !self.symbols.is_disjoint(&other.symbols)
    }

    /// Get a pretty printer for this first set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl Default for FirstSet {
    fn default() -> FirstSet {
        FirstSet::new()
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a FirstSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for id in self.item.terminals() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}", id.pretty(self.ctx))?;
        }
        if self.item.has_epsilon {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "ε")?;
        }
        write!(f, "}}")
    }
}

/// The meat of this module. Computes the first set for each rule in a grammar.
fn compute(grammar: &Grammar) -> FirstSets {
    let num_term = grammar.terminal_id_bound();
    let num_nonterm = grammar.nonterminal_id_bound();

    // Determine the sets of nonterminals to be updated.
    let mut update = BitSet::with_capacity(num_nonterm);
    let mut next_update = BitSet::with_capacity(num_nonterm);
    for rule in grammar.rules() {
        update.insert(rule.name().as_usize());
    }

    // Create the initial empty first sets. These will be populated in the main
    // loop.
    let mut fs = FirstSets(
        repeat(FirstSet {
            symbols: BitSet::with_capacity(num_term),
            has_epsilon: false,
        })
        .take(num_nonterm)
        .collect(),
    );

    // Create a list to keep track of dependencies between the rules.
    let mut deps: Vec<BitSet> = repeat(BitSet::with_capacity(num_nonterm))
        .take(num_nonterm)
        .collect();

    // This is the main update loop which processes nonterminals in sets.
    let mut rounds = 0;
    while !update.is_empty() {
        rounds += 1;
        for current in update.iter() {
            let mut new_fs = fs.0[current].clone();

            // Udpate the first set and dependencies.
            let nonterm = NonterminalId::from_usize(current);
            for &rule_id in grammar.rules_for_nonterminal(nonterm) {
                let rule = grammar.rule(rule_id);
                let tight = collect_symbols(rule.symbols(), &mut |symbol: &Symbol| match *symbol {
                    Symbol::Terminal(id) => {
                        new_fs.symbols.insert(id.as_usize());
                        true
                    }
                    Symbol::Nonterminal(id) => {
                        let other = &fs.0[id.as_usize()];
                        deps[id.as_usize()].insert(current);
                        new_fs.symbols.union_with(&other.symbols);
                        !other.has_epsilon
                    }
                });
                new_fs.has_epsilon |= !tight;
            }

            // If the first set has changed, trigger an update of everything
            // that depends on us.
            if new_fs != fs.0[current] {
                trace!(
                    "first({}) = {}",
                    nonterm.pretty(grammar),
                    new_fs.pretty(grammar)
                );
                fs.0[current] = new_fs;
                next_update.union_with(&deps[current]);
            }
        }

        // If we've cleared the update set, swap in the next update set.
        swap(&mut update, &mut next_update);
        next_update.clear();
    }
    debug!("first sets converged after {} rounds", rounds);

    fs
}

/// Call a closure on each possible first symbol.
///
/// Given a sequence of symbols, determine which ones should belong into the
/// first set. Returns `true` if the sequence is *tight*, that is, it does not
/// contain epsilon. A sequence with a terminal is tight. Nonterminals may or
/// may not be tight, depending on their first set. The callback function `f`
/// must return `true` if the symbol cannot derive epsilon, i.e. if it causes
/// the sequence to be tight.
fn collect_symbols<'a, I, F>(symbols: I, f: &mut F) -> bool
where
    I: IntoIterator<Item = &'a Symbol>,
    F: FnMut(&Symbol) -> bool,
{
    for symbol in symbols {
        if f(symbol) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::grammar::Rule;
    use expect_test::expect;

    /// E -> T E'; E' -> + T E' | ε; T -> F T'; T' -> * F T' | ε; F -> ( E ) | id
    fn expr() -> Grammar {
        let mut g = Grammar::new();
        let nt_e = g.add_nonterminal("E");
        let nt_e2 = g.add_nonterminal("E'");
        let nt_t = g.add_nonterminal("T");
        let nt_t2 = g.add_nonterminal("T'");
        let nt_f = g.add_nonterminal("F");
        let t_plus = g.add_terminal("+");
        let t_star = g.add_terminal("*");
        let t_lp = g.add_terminal("(");
        let t_rp = g.add_terminal(")");
        let t_id = g.add_terminal("id");
        g.add_rule(Rule::new(nt_e, vec![nt_t.into(), nt_e2.into()]));
        g.add_rule(Rule::new(
            nt_e2,
            vec![t_plus.into(), nt_t.into(), nt_e2.into()],
        ));
        g.add_rule(Rule::new(nt_e2, vec![]));
        g.add_rule(Rule::new(nt_t, vec![nt_f.into(), nt_t2.into()]));
        g.add_rule(Rule::new(
            nt_t2,
            vec![t_star.into(), nt_f.into(), nt_t2.into()],
        ));
        g.add_rule(Rule::new(nt_t2, vec![]));
        g.add_rule(Rule::new(nt_f, vec![t_lp.into(), nt_e.into(), t_rp.into()]));
        g.add_rule(Rule::new(nt_f, vec![t_id.into()]));
        g
    }

    #[test]
    fn expression_grammar() {
        let g = expr();
        let fs = FirstSets::compute(&g).unwrap();
        expect![[r#"
            E: {(, id}
            E': {+, ε}
            T: {(, id}
            T': {*, ε}
            F: {(, id}"#]]
        .assert_eq(&fs.pretty(&g).to_string());
    }

    #[test]
    fn rules_contained_in_lhs() {
        let g = expr();
        let fs = FirstSets::compute(&g).unwrap();
        for rule in g.rules() {
            let seq = fs.of_sequence(rule.symbols());
            let lhs = fs.get(rule.name());
            assert!(seq.symbols().is_subset(lhs.symbols()));
            if seq.has_epsilon() {
                assert!(lhs.has_epsilon());
            }
        }
    }

    #[test]
    fn idempotent() {
        let g = expr();
        assert_eq!(FirstSets::compute(&g), FirstSets::compute(&g));
    }

    #[test]
    fn nullable_chain() {
        // S -> A B c; A -> ε; B -> A | b
        let mut g = Grammar::new();
        let (nt_s, nt_a, nt_b) = (
            g.add_nonterminal("S"),
            g.add_nonterminal("A"),
            g.add_nonterminal("B"),
        );
        let (tb, tc) = (g.add_terminal("b"), g.add_terminal("c"));
        g.add_rule(Rule::new(nt_s, vec![nt_a.into(), nt_b.into(), tc.into()]));
        g.add_rule(Rule::new(nt_a, vec![]));
        g.add_rule(Rule::new(nt_b, vec![nt_a.into()]));
        g.add_rule(Rule::new(nt_b, vec![tb.into()]));
        let fs = FirstSets::compute(&g).unwrap();
        assert_eq!(fs.get(nt_s).pretty(&g).to_string(), "{b, c}");
        assert_eq!(fs.get(nt_b).pretty(&g).to_string(), "{b, ε}");
        assert_eq!(fs.of_sequence(&[]).pretty(&g).to_string(), "{ε}");
        assert_eq!(
            fs.of_sequence(&[nt_a.into(), nt_b.into()])
                .pretty(&g)
                .to_string(),
            "{b, ε}"
        );
    }

    #[test]
    fn left_recursion() {
        // S -> S a | b
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let (ta, tb) = (g.add_terminal("a"), g.add_terminal("b"));
        g.add_rule(Rule::new(nt_s, vec![nt_s.into(), ta.into()]));
        g.add_rule(Rule::new(nt_s, vec![tb.into()]));
        let fs = FirstSets::compute(&g).unwrap();
        assert_eq!(fs[nt_s].pretty(&g).to_string(), "{b}");
    }

    #[test]
    fn dangling_nonterminal_is_reported() {
        let mut g = Grammar::new();
        let (nt_s, nt_x) = (g.add_nonterminal("S"), g.add_nonterminal("X"));
        g.add_rule(Rule::new(nt_s, vec![nt_x.into()]));
        assert_eq!(
            FirstSets::compute(&g),
            Err(Error::UndefinedNonterminal("X".into()))
        );
    }
}
