// Copyright (c) 2018 Fabian Schuiki

//! Item sets derived from a grammar.
//!
//! An item is a rule with a marker somewhere in its right-hand side, stating
//! how much of the rule has been recognized. The canonical collection of LR(0)
//! item sets is built by repeatedly applying `goto` to the closure of the
//! augmented start item `$accept -> . S`.

use indexmap::IndexSet;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Index;

use crate::error::Result;
use crate::grammar::{self, Grammar, Symbol};
use crate::Pretty;

/// An item set.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemSet {
    /// The items in the set.
    pub(crate) items: BTreeSet<Item>,
}

impl ItemSet {
    /// Create an empty item set.
    pub fn new() -> ItemSet {
        ItemSet {
            items: BTreeSet::new(),
        }
    }

    /// Get the items in the set, ordered by rule and marker.
    pub fn items<'a>(&'a self) -> impl Iterator<Item = Item> + 'a {
        self.items.iter().cloned()
    }

    /// Check whether an item is in the set.
    pub fn contains(&self, item: Item) -> bool {
        self.items.contains(&item)
    }

    /// The number of items in the set.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a pretty printer for this item set.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl std::iter::FromIterator<Item> for ItemSet {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> ItemSet {
        ItemSet {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ItemSet> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, item) in self.item.items.iter().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(f, "{} {}", index, item.pretty(self.ctx))?;
        }
        if self.item.items.is_empty() {
            write!(f, "<empty>")?;
        }
        Ok(())
    }
}

/// A single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    /// The rule of the item.
    pub(crate) rule: grammar::RuleId,
    /// The position of the marker within the rule.
    pub(crate) marker: usize,
}

impl Item {
    /// Create a new item.
    ///
    /// Use `grammar::ACCEPT` as the rule to refer to the augmented start rule
    /// `$accept -> S`.
    pub fn new(rule: grammar::RuleId, marker: usize) -> Item {
        Item { rule, marker }
    }

    /// Get the rule this item represents.
    pub fn rule(&self) -> grammar::RuleId {
        self.rule
    }

    /// Get the position of the marker within the rule.
    pub fn marker(&self) -> usize {
        self.marker
    }

    /// The symbol immediately after the marker, if any.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<Symbol> {
        if self.rule == grammar::ACCEPT {
            if self.marker == 0 {
                Some(Symbol::Nonterminal(grammar.start()))
            } else {
                None
            }
        } else {
            grammar.rule(self.rule).symbols().get(self.marker).cloned()
        }
    }

    /// Whether the marker is at the end of the rule.
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.next_symbol(grammar).is_none()
    }

    /// The item with the marker moved one symbol to the right.
    pub fn advance(self) -> Item {
        Item {
            rule: self.rule,
            marker: self.marker + 1,
        }
    }

    /// Get a pretty printer for this item.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Item> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.item.rule == grammar::ACCEPT {
            write!(f, "[$accept ->")?;
            if self.item.marker == 0 {
                write!(f, " .")?;
            }
            write!(f, " {}", self.ctx.start().pretty(self.ctx))?;
            if self.item.marker == 1 {
                write!(f, " .")?;
            }
        } else {
            let rule = self.ctx.rule(self.item.rule);
            write!(f, "[{} ->", rule.name().pretty(self.ctx))?;
            let symbols = rule.symbols();
            for symbol in &symbols[0..self.item.marker] {
                write!(f, " {}", symbol.pretty(self.ctx))?;
            }
            write!(f, " .")?;
            for symbol in &symbols[self.item.marker..] {
                write!(f, " {}", symbol.pretty(self.ctx))?;
            }
        }
        write!(f, "]")?;
        Ok(())
    }
}

/// Compute the closure of a set of items.
///
/// For every item with a nonterminal `B` after the marker, the items
/// `B -> . γ` are added for all rules of `B`, until no more items can be
/// added. The grammar must be context-free.
pub fn closure<I: IntoIterator<Item = Item>>(grammar: &Grammar, items: I) -> ItemSet {
    let mut set: BTreeSet<Item> = BTreeSet::new();
    let mut todo: Vec<Item> = Vec::new();
    for item in items {
        if set.insert(item) {
            todo.push(item);
        }
    }
    while let Some(item) = todo.pop() {
        let nonterm = match item.next_symbol(grammar) {
            Some(Symbol::Nonterminal(id)) => id,
            _ => continue,
        };
        for &rule in grammar.rules_for_nonterminal(nonterm) {
            let predicted = Item::new(rule, 0);
            if set.insert(predicted) {
                todo.push(predicted);
            }
        }
    }
    ItemSet { items: set }
}

/// Compute the item set reached by moving the marker across `symbol`.
///
/// Only depends on the content of `items`, not on how it was built. Returns
/// an empty set if no item has `symbol` after its marker.
pub fn goto(grammar: &Grammar, items: &ItemSet, symbol: Symbol) -> ItemSet {
    let kernel = items
        .items
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(|item| item.advance());
    closure(grammar, kernel)
}

/// The canonical collection of LR(0) item sets of a grammar.
#[derive(Debug, Clone)]
pub struct ItemSets {
    sets: Vec<ItemSet>,
    transitions: Vec<BTreeMap<Symbol, ItemSetId>>,
}

/// A unique item set identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemSetId(usize);

impl ItemSets {
    /// Compute the item sets for a grammar.
    ///
    /// Item sets are numbered in the order they are discovered. Two
    /// transitions that lead to the same set of items lead to the same item
    /// set, regardless of the path taken to reach it.
    pub fn compute(grammar: &Grammar) -> Result<ItemSets> {
        grammar.require_context_free()?;
        grammar.check_defined()?;

        let mut sets: IndexSet<ItemSet> = IndexSet::new();
        let mut transitions = Vec::new();
        sets.insert(closure(grammar, Some(Item::new(grammar::ACCEPT, 0))));

        let mut index = 0;
        while let Some(current) = sets.get_index(index).cloned() {
            let symbols: BTreeSet<Symbol> =
                current.items().filter_map(|i| i.next_symbol(grammar)).collect();
            let mut edges = BTreeMap::new();
            for symbol in symbols {
                let target = goto(grammar, &current, symbol);
                let (id, added) = sets.insert_full(target);
                if added {
                    trace!("item set {} via {}", id, symbol.pretty(grammar));
                }
                edges.insert(symbol, ItemSetId(id));
            }
            transitions.push(edges);
            index += 1;
        }
        debug!("constructed {} item sets", sets.len());

        Ok(ItemSets {
            sets: sets.into_iter().collect(),
            transitions,
        })
    }

    /// Get all item sets.
    pub fn all(&self) -> &[ItemSet] {
        &self.sets
    }

    /// The number of item sets.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether there are no item sets. Never true for a computed collection.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The id of the initial item set.
    pub fn initial(&self) -> ItemSetId {
        ItemSetId(0)
    }

    /// The outgoing transitions of an item set, ordered by symbol.
    pub fn transitions<'a>(
        &'a self,
        id: ItemSetId,
    ) -> impl Iterator<Item = (Symbol, ItemSetId)> + 'a {
        self.transitions[id.0].iter().map(|(&s, &t)| (s, t))
    }

    /// The item set reached from `id` across `symbol`, if any.
    pub fn goto(&self, id: ItemSetId, symbol: Symbol) -> Option<ItemSetId> {
        self.transitions[id.0].get(&symbol).cloned()
    }

    /// Find the id of an item set with exactly the given items.
    pub fn find(&self, items: &ItemSet) -> Option<ItemSetId> {
        self.sets.iter().position(|s| s == items).map(ItemSetId)
    }

    /// Iterate over the ids of all item sets.
    pub fn ids(&self) -> impl Iterator<Item = ItemSetId> {
        (0..self.sets.len()).map(ItemSetId)
    }

    /// Get a pretty printer for this item set collection.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl Index<ItemSetId> for ItemSets {
    type Output = ItemSet;

    fn index(&self, index: ItemSetId) -> &ItemSet {
        &self.sets[index.0]
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a ItemSets> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for id in self.item.ids() {
            if id.0 > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "I{}:", id)?;
            for item in self.item[id].items() {
                write!(f, "\n  {}", item.pretty(self.ctx))?;
            }
            for (symbol, target) in self.item.transitions(id) {
                write!(f, "\n  {} => I{}", symbol.pretty(self.ctx), target)?;
            }
        }
        Ok(())
    }
}

impl ItemSetId {
    /// Create an item set id from a usize.
    pub fn from_usize(id: usize) -> ItemSetId {
        ItemSetId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for ItemSetId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
