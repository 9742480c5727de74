// Copyright (c) 2018 Fabian Schuiki

//! Representation of an SLR(1) parsing state machine.
//!
//! Every LR(0) item set becomes one state. Terminal transitions become shift
//! actions, nonterminal transitions become gotos, and every complete item
//! `A -> α .` reduces on the terminals in the follow set of `A`.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::once;
use std::ops::Index;

use crate::follow::FollowSets;
use crate::grammar::{self, Grammar, NonterminalId, RuleId, Symbol, TerminalId};
use crate::item_set::{ItemSetId, ItemSets};
use crate::Pretty;

/// A state machine.
#[derive(Debug, Clone)]
pub struct StateMachine {
    states: Vec<State>,
}

/// A parser state.
///
/// This is basically a set of mappings from symbols to actions.
#[derive(Debug, Clone)]
pub struct State {
    id: StateId,
    item_set: ItemSetId,
    actions: BTreeMap<TerminalId, Action>,
    gotos: BTreeMap<NonterminalId, StateId>,
}

/// An action to be taken upon encountering a symbol.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// Shift the symbol and go to the given state.
    Shift(StateId),
    /// Reduce with the given rule.
    Reduce(RuleId),
    /// Accept the input.
    Accept,
}

/// Multiple actions competing for the same state and lookahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The state in which the conflict occurs.
    pub state: StateId,
    /// The lookahead terminal.
    pub terminal: TerminalId,
    /// The competing actions.
    pub actions: Vec<Action>,
}

impl StateMachine {
    /// Create the SLR(1) state machine from a list of item sets.
    ///
    /// Returns all conflicts if the grammar is not SLR(1).
    pub fn compute(
        grammar: &Grammar,
        item_sets: &ItemSets,
        follow: &FollowSets,
    ) -> Result<StateMachine, Vec<Conflict>> {
        let mut sm = StateMachine { states: Vec::new() };
        let mut issues = Vec::new();

        for is in item_sets.ids() {
            let id = StateId::from_usize(is.as_usize());
            let mut candidates: BTreeMap<TerminalId, Vec<Action>> = BTreeMap::new();
            let mut gotos = BTreeMap::new();

            for (symbol, target) in item_sets.transitions(is) {
                let target = StateId::from_usize(target.as_usize());
                match symbol {
                    Symbol::Terminal(t) => candidates
                        .entry(t)
                        .or_insert_with(Vec::new)
                        .push(Action::Shift(target)),
                    Symbol::Nonterminal(nt) => {
                        gotos.insert(nt, target);
                    }
                }
            }

            for item in item_sets[is].items().filter(|i| i.is_complete(grammar)) {
                if item.rule() == grammar::ACCEPT {
                    candidates
                        .entry(grammar::END)
                        .or_insert_with(Vec::new)
                        .push(Action::Accept);
                    continue;
                }
                let name = grammar.rule(item.rule()).name();
                for t in follow.get(name).terminals() {
                    candidates
                        .entry(t)
                        .or_insert_with(Vec::new)
                        .push(Action::Reduce(item.rule()));
                }
            }

            let mut actions = BTreeMap::new();
            for (terminal, mut competing) in candidates {
                competing.sort();
                competing.dedup();
                if competing.len() > 1 {
                    debug!(
                        "conflict in state {} on {}: {:?}",
                        id,
                        terminal.pretty(grammar),
                        competing
                    );
                    issues.push(Conflict {
                        state: id,
                        terminal,
                        actions: competing,
                    });
                } else {
                    actions.insert(terminal, competing[0]);
                }
            }

            sm.states.push(State {
                id,
                item_set: is,
                actions,
                gotos,
            });
        }

        if issues.is_empty() {
            Ok(sm)
        } else {
            Err(issues)
        }
    }

    /// All states in the state machine.
    pub fn states(&self) -> States {
        States(self.states.iter())
    }

    /// Run the state machine on a word.
    ///
    /// Returns the rules reduced, in order, if the word is accepted. Reversed,
    /// these form the rightmost derivation of the word.
    pub fn parse(&self, grammar: &Grammar, word: &[TerminalId]) -> Option<Vec<RuleId>> {
        let mut stack = vec![StateId::from_usize(0)];
        let mut input = word.iter().cloned().chain(once(grammar::END)).peekable();
        let mut reductions = Vec::new();
        loop {
            let state = &self[*stack.last()?];
            let lookahead = *input.peek()?;
            match state.action(lookahead)? {
                Action::Shift(next) => {
                    stack.push(next);
                    input.next();
                }
                Action::Reduce(rule_id) => {
                    let rule = grammar.rule(rule_id);
                    let keep = stack.len().checked_sub(rule.symbols().len())?;
                    stack.truncate(keep);
                    let next = self[*stack.last()?].goto(rule.name())?;
                    stack.push(next);
                    reductions.push(rule_id);
                }
                Action::Accept => return Some(reductions),
            }
        }
    }

    /// Get a pretty printer for this state machine.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl Index<StateId> for StateMachine {
    type Output = State;

    fn index(&self, index: StateId) -> &State {
        &self.states[index.as_usize()]
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a StateMachine> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, state) in self.item.states().enumerate() {
            if index > 0 {
                write!(f, "\n")?;
            }
            write!(f, "state {}:", state.id)?;
            for (terminal, action) in state.actions() {
                write!(f, " {}=", terminal.pretty(self.ctx))?;
                match action {
                    Action::Shift(s) => write!(f, "s{}", s)?,
                    Action::Reduce(r) => write!(f, "r{}", r.as_usize())?,
                    Action::Accept => write!(f, "acc")?,
                }
            }
            for (nonterminal, target) in state.gotos() {
                write!(f, " {}={}", nonterminal.pretty(self.ctx), target)?;
            }
        }
        Ok(())
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Conflict> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "state {} on {}: ",
            self.item.state,
            self.item.terminal.pretty(self.ctx)
        )?;
        for (index, action) in self.item.actions.iter().enumerate() {
            if index > 0 {
                write!(f, " / ")?;
            }
            match *action {
                Action::Shift(s) => write!(f, "shift {}", s)?,
                Action::Reduce(r) => write!(f, "reduce `{}`", self.ctx.rule(r).pretty(self.ctx))?,
                Action::Accept => write!(f, "accept")?,
            }
        }
        Ok(())
    }
}

impl Conflict {
    /// Get a pretty printer for this conflict.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl State {
    /// Get the unique identifier of this state.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// The item set this state was built from.
    pub fn item_set(&self) -> ItemSetId {
        self.item_set
    }

    /// The action to take on a lookahead terminal, if any.
    pub fn action(&self, terminal: TerminalId) -> Option<Action> {
        self.actions.get(&terminal).cloned()
    }

    /// The state to go to after reducing to a nonterminal, if any.
    pub fn goto(&self, nonterminal: NonterminalId) -> Option<StateId> {
        self.gotos.get(&nonterminal).cloned()
    }

    /// An iterator over the terminals and associated actions.
    pub fn actions(&self) -> Actions {
        Actions(self.actions.iter())
    }

    /// An iterator over the nonterminals and associated goto states.
    pub fn gotos(&self) -> Gotos {
        Gotos(self.gotos.iter())
    }
}

/// An iterator over the states of a state machine.
pub struct States<'a>(std::slice::Iter<'a, State>);

impl<'a> Iterator for States<'a> {
    type Item = &'a State;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

/// An iterator over the actions of a state.
pub struct Actions<'a>(std::collections::btree_map::Iter<'a, TerminalId, Action>);

impl<'a> Iterator for Actions<'a> {
    type Item = (TerminalId, Action);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(&s, &a)| (s, a))
    }
}

/// An iterator over the gotos of a state.
pub struct Gotos<'a>(std::collections::btree_map::Iter<'a, NonterminalId, StateId>);

impl<'a> Iterator for Gotos<'a> {
    type Item = (NonterminalId, StateId);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(&n, &s)| (n, s))
    }
}

/// A unique state identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

impl StateId {
    /// Create a state id from a usize.
    pub fn from_usize(id: usize) -> StateId {
        StateId(id)
    }

    /// Obtain the id as a usize.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::FirstSets;
    use crate::grammar::Rule;
    use expect_test::expect;

    fn build(g: &Grammar) -> Result<StateMachine, Vec<Conflict>> {
        let first = FirstSets::compute(g).unwrap();
        let follow = FollowSets::compute(g, &first).unwrap();
        let is = ItemSets::compute(g).unwrap();
        StateMachine::compute(g, &is, &follow)
    }

    /// E -> E + T | T; T -> id
    fn sums() -> Grammar {
        let mut g = Grammar::new();
        let (nt_e, nt_t) = (g.add_nonterminal("E"), g.add_nonterminal("T"));
        let (t_plus, t_id) = (g.add_terminal("+"), g.add_terminal("id"));
        g.add_rule(Rule::new(nt_e, vec![nt_e.into(), t_plus.into(), nt_t.into()]));
        g.add_rule(Rule::new(nt_e, vec![nt_t.into()]));
        g.add_rule(Rule::new(nt_t, vec![t_id.into()]));
        g
    }

    #[test]
    fn slr_table() {
        let g = sums();
        let sm = build(&g).unwrap();
        expect![[r#"
            state 0: id=s1 E=2 T=3
            state 1: $end=r2 +=r2
            state 2: $end=acc +=s4
            state 3: $end=r1 +=r1
            state 4: id=s1 T=5
            state 5: $end=r0 +=r0"#]]
        .assert_eq(&sm.pretty(&g).to_string());
    }

    #[test]
    fn parse_rightmost() {
        let g = sums();
        let sm = build(&g).unwrap();
        let (t_plus, t_id) = (g.terminal("+").unwrap(), g.terminal("id").unwrap());
        let r = RuleId::from_usize;
        assert_eq!(
            sm.parse(&g, &[t_id, t_plus, t_id]),
            Some(vec![r(2), r(1), r(2), r(0)])
        );
        assert_eq!(sm.parse(&g, &[t_id, t_plus]), None);
        assert_eq!(sm.parse(&g, &[]), None);
    }

    #[test]
    fn ambiguous_grammar_conflicts() {
        // E -> E + E | id
        let mut g = Grammar::new();
        let nt_e = g.add_nonterminal("E");
        let (t_plus, t_id) = (g.add_terminal("+"), g.add_terminal("id"));
        g.add_rule(Rule::new(nt_e, vec![nt_e.into(), t_plus.into(), nt_e.into()]));
        g.add_rule(Rule::new(nt_e, vec![t_id.into()]));
        let conflicts = build(&g).unwrap_err();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].terminal, t_plus);
        assert_eq!(
            conflicts[0].pretty(&g).to_string(),
            format!("state {} on +: shift 3 / reduce `E -> E + E`", conflicts[0].state)
        );
    }
}
