// Copyright (c) 2018 Fabian Schuiki

//! Data structures representing a grammar.
//!
//! A grammar is an ordered list of rules over a terminal and nonterminal
//! alphabet. Rules whose left-hand side is a single nonterminal are
//! context-free; every other rule makes the grammar unrestricted. The first
//! nonterminal added to a grammar is its start symbol.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::Pretty;

/// A grammar.
///
/// Two grammars are equal if they have the same names and rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
    nonterms: HashMap<String, NonterminalId>,
    terms: HashMap<String, TerminalId>,
    nonterm_names: Vec<String>,
    nonterm_rules: Vec<Vec<RuleId>>,
    term_names: Vec<String>,
}

/// A single rule within a grammar.
///
/// The empty right-hand side represents epsilon. Rules compare and hash by
/// their left- and right-hand sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    lhs: Vec<Symbol>,
    symbols: Vec<Symbol>,
}

/// A symbol of a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A terminal.
    Terminal(TerminalId),
    /// A nonterminal.
    Nonterminal(NonterminalId),
}

/// A unique nonterminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonterminalId(usize);

/// A unique terminal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalId(usize);

/// A unique rule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(usize);

/// The start rule `$accept -> S`.
pub const ACCEPT: RuleId = RuleId(std::usize::MAX);

/// The special end of input terminal `$end`.
pub const END: TerminalId = TerminalId(0);

/// The broad Chomsky class of a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarClass {
    /// Every rule is right-linear, or every rule is left-linear.
    Regular,
    /// Every left-hand side is a single nonterminal.
    ContextFree,
    /// Arbitrary left-hand sides.
    Unrestricted,
}

/// An iterator over the rules of a grammar.
pub type RulesIter<'a> = std::slice::Iter<'a, Rule>;

/// An iterator over the rule IDs of a grammar.
pub type RuleIdsIter<'a> = std::slice::Iter<'a, RuleId>;

impl Grammar {
    /// Create a new empty grammar.
    pub fn new() -> Grammar {
        Grammar {
            rules: Vec::new(),
            nonterms: HashMap::new(),
            terms: HashMap::new(),
            nonterm_names: Vec::new(),
            nonterm_rules: Vec::new(),
            term_names: Vec::new(),
        }
    }

    /// Add a nonterminal.
    ///
    /// The first nonterminal added becomes the start symbol.
    pub fn add_nonterminal<S: Into<String>>(&mut self, name: S) -> NonterminalId {
        let name = name.into();
        let next_id = NonterminalId(self.nonterm_names.len());
        if let Some(&id) = self.nonterms.get(&name) {
            id
        } else {
            self.nonterms.insert(name.clone(), next_id);
            self.nonterm_names.push(name);
            self.nonterm_rules.push(Vec::new());
            next_id
        }
    }

    /// Add a terminal.
    pub fn add_terminal<S: Into<String>>(&mut self, name: S) -> TerminalId {
        let name = name.into();
        let next_id = TerminalId(self.term_names.len() + 1);
        if let Some(&id) = self.terms.get(&name) {
            id
        } else {
            self.terms.insert(name.clone(), next_id);
            self.term_names.push(name);
            next_id
        }
    }

    /// Look up a terminal by name.
    pub fn terminal(&self, name: &str) -> Option<TerminalId> {
        self.terms.get(name).cloned()
    }

    /// Look up a nonterminal by name.
    pub fn nonterminal(&self, name: &str) -> Option<NonterminalId> {
        self.nonterms.get(name).cloned()
    }

    /// Get the name of a nonterminal.
    pub fn nonterminal_name(&self, id: NonterminalId) -> &str {
        &self.nonterm_names[id.as_usize()]
    }

    /// Get the name of a terminal.
    pub fn terminal_name(&self, id: TerminalId) -> &str {
        if id == END {
            "$end"
        } else {
            &self.term_names[id.as_usize() - 1]
        }
    }

    /// The start symbol of the grammar.
    ///
    /// This is the first nonterminal that was added.
    pub fn start(&self) -> NonterminalId {
        NonterminalId(0)
    }

    /// The upper bound on nonterminal IDs.
    ///
    /// Basically returns the largest nonterminal ID + 1. Can be used as
    /// capacity for containers that will hold terminals.
    pub fn nonterminal_id_bound(&self) -> usize {
        self.nonterm_names.len()
    }

    /// The upper bound on terminal IDs.
    ///
    /// Basically returns the largest terminal ID + 1. Can be used as capacity
    /// for containers that will hold terminals.
    pub fn terminal_id_bound(&self) -> usize {
        self.term_names.len() + 1
    }

    /// All nonterminals of the grammar, in the order they were added.
    pub fn nonterminals(&self) -> impl Iterator<Item = NonterminalId> {
        (0..self.nonterm_names.len()).map(NonterminalId)
    }

    /// All terminals of the grammar, excluding `$end`.
    pub fn terminals(&self) -> impl Iterator<Item = TerminalId> {
        (1..self.term_names.len() + 1).map(TerminalId)
    }

    /// Add a rule to the grammar.
    pub fn add_rule(&mut self, rule: Rule) -> RuleId {
        let id = RuleId::from_usize(self.rules.len());
        if let Some(name) = rule.as_context_free() {
            self.nonterm_rules[name.as_usize()].push(id);
        }
        self.rules.push(rule);
        id
    }

    /// The rules in this grammar.
    pub fn rules(&self) -> RulesIter {
        self.rules.iter()
    }

    /// The IDs of all rules in this grammar.
    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> {
        (0..self.rules.len()).map(RuleId)
    }

    /// The context-free rules for a specific nonterminal in the grammar.
    pub fn rules_for_nonterminal(&self, id: NonterminalId) -> RuleIdsIter {
        self.nonterm_rules[id.as_usize()].iter()
    }

    /// Access a single rule of this grammar.
    ///
    /// Panics if the id is the builtin `ACCEPT` nonterminal, which represents
    /// the virtual root rule.
    pub fn rule(&self, id: RuleId) -> &Rule {
        if id == ACCEPT {
            panic!("rule() called for builtin ACCEPT rule");
        }
        &self.rules[id.as_usize()]
    }

    /// Check whether every rule has a single nonterminal on its left.
    pub fn is_context_free(&self) -> bool {
        self.rules.iter().all(|r| r.as_context_free().is_some())
    }

    /// Fail with `Error::NotContextFree` on the first rule whose left-hand
    /// side is not a single nonterminal.
    pub fn require_context_free(&self) -> Result<()> {
        match self.rules.iter().find(|r| r.as_context_free().is_none()) {
            Some(rule) => Err(Error::NotContextFree(rule.pretty(self).to_string())),
            None => Ok(()),
        }
    }

    /// Determine the Chomsky class of the grammar.
    pub fn classify(&self) -> GrammarClass {
        if !self.is_context_free() {
            return GrammarClass::Unrestricted;
        }
        let right_linear = self.rules.iter().all(|r| {
            let vars = r.symbols.iter().filter(|s| s.is_nonterminal()).count();
            vars == 0 || (vars == 1 && r.symbols.last().map_or(false, |s| s.is_nonterminal()))
        });
        let left_linear = self.rules.iter().all(|r| {
            let vars = r.symbols.iter().filter(|s| s.is_nonterminal()).count();
            vars == 0 || (vars == 1 && r.symbols.first().map_or(false, |s| s.is_nonterminal()))
        });
        if right_linear || left_linear {
            GrammarClass::Regular
        } else {
            GrammarClass::ContextFree
        }
    }

    /// Find the first rule not of the form `A -> a` or `A -> B C`.
    ///
    /// Returns `None` if the grammar is in binary normal form.
    pub fn find_non_binary_rule(&self) -> Option<RuleId> {
        self.rule_ids().find(|&id| {
            let rule = &self.rules[id.as_usize()];
            let shaped = match rule.symbols() {
                [Symbol::Terminal(_)] => true,
                [Symbol::Nonterminal(_), Symbol::Nonterminal(_)] => true,
                _ => false,
            };
            rule.as_context_free().is_none() || !shaped
        })
    }

    /// Check that the grammar is well-formed.
    ///
    /// The grammar must have at least one rule, the start symbol must appear
    /// on some left-hand side, and every nonterminal used on a right-hand side
    /// must appear on some left-hand side.
    pub fn check_defined(&self) -> Result<()> {
        if self.rules.is_empty() || self.nonterm_names.is_empty() {
            return Err(Error::EmptyGrammar);
        }
        let defined: HashSet<NonterminalId> = self
            .rules
            .iter()
            .flat_map(|r| r.lhs.iter())
            .filter_map(|s| s.as_nonterminal())
            .collect();
        if !defined.contains(&self.start()) {
            return Err(Error::UndefinedNonterminal(
                self.nonterminal_name(self.start()).to_string(),
            ));
        }
        for rule in &self.rules {
            for id in rule.symbols.iter().filter_map(|s| s.as_nonterminal()) {
                if !defined.contains(&id) {
                    return Err(Error::UndefinedNonterminal(
                        self.nonterminal_name(id).to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Convert a string into a word over the terminals of this grammar.
    ///
    /// Every character of the input names one terminal. Fails on the first
    /// character that is not a terminal of the grammar.
    pub fn parse_word(&self, input: &str) -> Result<Vec<TerminalId>> {
        let mut buf = [0; 4];
        input
            .chars()
            .enumerate()
            .map(|(position, c)| {
                let name: &str = c.encode_utf8(&mut buf);
                self.terminal(name).ok_or_else(|| Error::UnknownTerminal {
                    symbol: name.to_string(),
                    position,
                })
            })
            .collect()
    }

    /// Check that a word only consists of terminals of this grammar.
    pub fn check_word(&self, word: &[TerminalId]) -> Result<()> {
        for (position, &id) in word.iter().enumerate() {
            if id == END || id.as_usize() >= self.terminal_id_bound() {
                return Err(Error::UnknownTerminal {
                    symbol: format!("#{}", id.as_usize()),
                    position,
                });
            }
        }
        Ok(())
    }

    /// A hash over the names and rules of the grammar.
    ///
    /// Two grammars built from the same description have the same
    /// fingerprint, regardless of whether they are the same object.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.nonterm_names.hash(&mut hasher);
        self.term_names.hash(&mut hasher);
        self.rules.hash(&mut hasher);
        hasher.finish()
    }

    /// Get a pretty printer for a sequence of symbols.
    ///
    /// The empty sequence prints as `ε`.
    pub fn pretty_seq<'a>(&'a self, symbols: &'a [Symbol]) -> Pretty<&'a Grammar, &'a [Symbol]> {
        Pretty::new(self, symbols)
    }

    /// Get a pretty printer for the grammar.
    pub fn pretty(&self) -> Pretty<&Grammar, &Self> {
        Pretty::new(self, self)
    }
}

impl Default for Grammar {
    fn default() -> Grammar {
        Grammar::new()
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Grammar> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, rule) in self.ctx.rules.iter().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(f, "{}", rule.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a [Symbol]> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.item.is_empty() {
            return write!(f, "ε");
        }
        for (index, symbol) in self.item.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", symbol.pretty(self.ctx))?;
        }
        Ok(())
    }
}

impl Rule {
    /// Create a new context-free rule.
    pub fn new(name: NonterminalId, symbols: Vec<Symbol>) -> Rule {
        Rule {
            lhs: vec![name.into()],
            symbols: symbols,
        }
    }

    /// Create a new rule with an arbitrary left-hand side.
    ///
    /// Panics if `lhs` is empty.
    pub fn with_lhs(lhs: Vec<Symbol>, symbols: Vec<Symbol>) -> Rule {
        assert!(!lhs.is_empty(), "rule with empty left-hand side");
        Rule {
            lhs: lhs,
            symbols: symbols,
        }
    }

    /// The name of this rule.
    ///
    /// Panics if the rule is not context-free.
    pub fn name(&self) -> NonterminalId {
        match self.as_context_free() {
            Some(id) => id,
            None => panic!("name() called on a rule that is not context-free"),
        }
    }

    /// The left-hand nonterminal if this rule is context-free.
    pub fn as_context_free(&self) -> Option<NonterminalId> {
        match self.lhs.as_slice() {
            [Symbol::Nonterminal(id)] => Some(*id),
            _ => None,
        }
    }

    /// The left-hand side of this production.
    pub fn lhs(&self) -> &[Symbol] {
        &self.lhs
    }

    /// The symbols in this production.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Get a pretty printer for this rule.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Rule> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.ctx.pretty_seq(&self.item.lhs),
            self.ctx.pretty_seq(&self.item.symbols)
        )
    }
}

impl Symbol {
    /// Check whether this is a terminal.
    pub fn is_terminal(&self) -> bool {
        match *self {
            Symbol::Terminal(_) => true,
            Symbol::Nonterminal(_) => false,
        }
    }

    /// Check whether this is a nonterminal.
    pub fn is_nonterminal(&self) -> bool {
        !self.is_terminal()
    }

    /// The nonterminal id, if this is a nonterminal.
    pub fn as_nonterminal(&self) -> Option<NonterminalId> {
        match *self {
            Symbol::Nonterminal(id) => Some(id),
            Symbol::Terminal(_) => None,
        }
    }

    /// Get a pretty printer for this symbol.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl From<TerminalId> for Symbol {
    fn from(id: TerminalId) -> Symbol {
        Symbol::Terminal(id)
    }
}

impl From<NonterminalId> for Symbol {
    fn from(id: NonterminalId) -> Symbol {
        Symbol::Nonterminal(id)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Symbol> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.item {
            Symbol::Terminal(id) => write!(f, "{}", id.pretty(self.ctx)),
            Symbol::Nonterminal(id) => write!(f, "{}", id.pretty(self.ctx)),
        }
    }
}

impl NonterminalId {
    /// Create a nonterminal id from a usize.
    pub fn from_usize(id: usize) -> NonterminalId {
        NonterminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this nonterminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, NonterminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.nonterminal_name(self.item))
    }
}

impl TerminalId {
    /// Create a terminal id from a usize.
    pub fn from_usize(id: usize) -> TerminalId {
        TerminalId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }

    /// Get a pretty printer for this terminal.
    pub fn pretty(self, grammar: &Grammar) -> Pretty<&Grammar, Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, TerminalId> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.ctx.terminal_name(self.item))
    }
}

impl RuleId {
    /// Create a rule id from a usize.
    pub fn from_usize(id: usize) -> RuleId {
        RuleId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anbn() -> Grammar {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let (ta, tb) = (g.add_terminal("a"), g.add_terminal("b"));
        g.add_rule(Rule::new(nt_s, vec![ta.into(), nt_s.into(), tb.into()]));
        g.add_rule(Rule::new(nt_s, vec![]));
        g
    }

    #[test]
    fn pretty_rules() {
        let g = anbn();
        assert_eq!(g.pretty().to_string(), "S -> a S b\nS -> ε");
    }

    #[test]
    fn classify() {
        assert_eq!(anbn().classify(), GrammarClass::ContextFree);

        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let ta = g.add_terminal("a");
        g.add_rule(Rule::new(nt_s, vec![ta.into(), nt_s.into()]));
        g.add_rule(Rule::new(nt_s, vec![ta.into()]));
        assert_eq!(g.classify(), GrammarClass::Regular);

        let nt_b = g.add_nonterminal("B");
        g.add_rule(Rule::with_lhs(vec![nt_s.into(), nt_b.into()], vec![ta.into()]));
        assert_eq!(g.classify(), GrammarClass::Unrestricted);
        assert!(g.require_context_free().is_err());
    }

    #[test]
    fn dangling_nonterminal() {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let nt_x = g.add_nonterminal("X");
        let ta = g.add_terminal("a");
        g.add_rule(Rule::new(nt_s, vec![ta.into(), nt_x.into()]));
        assert_eq!(
            g.check_defined(),
            Err(Error::UndefinedNonterminal("X".into()))
        );
        g.add_rule(Rule::new(nt_x, vec![]));
        assert_eq!(g.check_defined(), Ok(()));
    }

    #[test]
    fn empty_grammar() {
        assert_eq!(Grammar::new().check_defined(), Err(Error::EmptyGrammar));
    }

    #[test]
    fn parse_word() {
        let g = anbn();
        let (ta, tb) = (g.terminal("a").unwrap(), g.terminal("b").unwrap());
        assert_eq!(g.parse_word("aabb"), Ok(vec![ta, ta, tb, tb]));
        assert_eq!(g.parse_word(""), Ok(vec![]));
        assert_eq!(
            g.parse_word("abc"),
            Err(Error::UnknownTerminal {
                symbol: "c".into(),
                position: 2,
            })
        );
    }

    #[test]
    fn binary_form() {
        let mut g = Grammar::new();
        let (nt_s, nt_a) = (g.add_nonterminal("S"), g.add_nonterminal("A"));
        let ta = g.add_terminal("a");
        g.add_rule(Rule::new(nt_s, vec![nt_a.into(), nt_a.into()]));
        g.add_rule(Rule::new(nt_a, vec![ta.into()]));
        assert_eq!(g.find_non_binary_rule(), None);
        let bad = g.add_rule(Rule::new(nt_a, vec![ta.into(), nt_a.into()]));
        assert_eq!(g.find_non_binary_rule(), Some(bad));
    }

    #[test]
    fn fingerprint_is_structural() {
        assert_eq!(anbn().fingerprint(), anbn().fingerprint());
        assert_eq!(anbn(), anbn());
        let mut g = anbn();
        let nt_s = g.start();
        g.add_rule(Rule::new(nt_s, vec![nt_s.into(), nt_s.into()]));
        assert_ne!(g.fingerprint(), anbn().fingerprint());
        assert_ne!(g, anbn());
    }
}
