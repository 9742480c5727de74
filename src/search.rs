// Copyright (c) 2018 Fabian Schuiki

//! Exhaustive derivation search for arbitrary grammars.
//!
//! Starting at the start symbol, every rule is applied at every position where
//! its left-hand side matches, breadth first, until the target word appears or
//! no candidate form is left. Forms already produced once are not explored
//! again, and forms that cannot reach the target are discarded by a filter.
//! For unrestricted grammars the search need not terminate.
//!
//! The search runs on a worker thread. The caller starts and pauses it, and
//! observes it through its state, a progress snapshot, and event listeners.
//! Listeners are called on the worker thread in the order they were added.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::error::Result;
use crate::filter::Filter;
use crate::grammar::{Grammar, NonterminalId, RuleId, Symbol, TerminalId};
use crate::search_tree::{NodeId, SearchTree};
use crate::Pretty;

/// The number of expansions between two progress snapshots.
const PROGRESS_INTERVAL: usize = 64;

/// A rule applied at a position of a sentential form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    /// The rule applied.
    pub rule: RuleId,
    /// The position of the rule's left-hand side within the form.
    pub offset: usize,
}

/// A derivation of a word from the start symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    start: NonterminalId,
    steps: Vec<Step>,
}

impl Derivation {
    /// Create a derivation from a start symbol and a list of steps.
    pub fn new(start: NonterminalId, steps: Vec<Step>) -> Derivation {
        Derivation { start, steps }
    }

    /// The steps of the derivation, in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The rules applied, in order.
    pub fn rules<'a>(&'a self) -> impl Iterator<Item = RuleId> + 'a {
        self.steps.iter().map(|s| s.rule)
    }

    /// Apply every step to the start symbol and return the final form.
    ///
    /// Returns `None` if a step does not match the form it is applied to.
    pub fn replay(&self, grammar: &Grammar) -> Option<Vec<Symbol>> {
        self.forms(grammar).and_then(|mut forms| forms.pop())
    }

    /// Every sentential form of the derivation, starting with the start
    /// symbol.
    ///
    /// Returns `None` if a step does not match the form it is applied to.
    pub fn forms(&self, grammar: &Grammar) -> Option<Vec<Vec<Symbol>>> {
        let mut forms = vec![vec![Symbol::Nonterminal(self.start)]];
        for step in &self.steps {
            let next = {
                let form = forms.last()?;
                apply(grammar, form, *step)?
            };
            forms.push(next);
        }
        Some(forms)
    }

    /// Get a pretty printer for this derivation.
    pub fn pretty<'a>(&'a self, grammar: &'a Grammar) -> Pretty<&'a Grammar, &'a Self> {
        Pretty::new(grammar, self)
    }
}

impl<'a> fmt::Display for Pretty<&'a Grammar, &'a Derivation> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let forms = match self.item.forms(self.ctx) {
            Some(forms) => forms,
            None => return write!(f, "<invalid derivation>"),
        };
        for (index, form) in forms.iter().enumerate() {
            if index > 0 {
                write!(f, " => ")?;
            }
            write!(f, "{}", self.ctx.pretty_seq(form))?;
        }
        Ok(())
    }
}

/// Apply a step to a form.
fn apply(grammar: &Grammar, form: &[Symbol], step: Step) -> Option<Vec<Symbol>> {
    let rule = grammar.rule(step.rule);
    let end = step.offset + rule.lhs().len();
    if end > form.len() || &form[step.offset..end] != rule.lhs() {
        return None;
    }
    let mut next = Vec::with_capacity(form.len() - rule.lhs().len() + rule.symbols().len());
    next.extend_from_slice(&form[..step.offset]);
    next.extend_from_slice(rule.symbols());
    next.extend_from_slice(&form[end..]);
    Some(next)
}

/// The life cycle of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchState {
    /// Created but never started.
    Idle,
    /// The worker is exploring forms.
    Running,
    /// The worker has stopped on request and may be started again.
    Paused,
    /// The target word was derived.
    Accepted,
    /// Every candidate form was explored without deriving the target word.
    Rejected,
    /// The worker panicked. The search cannot be started again.
    Failed,
}

/// A change in the state of a search, as reported to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEvent {
    /// The worker has started or resumed.
    Started,
    /// The worker has honored a pause request.
    Paused,
    /// The target word was derived.
    Accepted,
    /// The target word cannot be derived.
    Rejected,
}

/// A snapshot of the search's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Progress {
    /// Nodes in the search tree that have not been pruned.
    pub live_nodes: usize,
    /// Nodes ever added to the search tree.
    pub total_nodes: usize,
    /// Nodes waiting to be expanded.
    pub frontier: usize,
    /// Nodes expanded so far.
    pub expanded: usize,
}

/// Which admissibility filter to apply to candidate forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterChoice {
    /// Bookend and length filter for context-free grammars, length filter
    /// otherwise.
    Auto,
    /// The length filter only.
    Length,
    /// Bookend and length filter. Fails for grammars that are not
    /// context-free.
    Bookend,
}

/// Options controlling a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchOptions {
    /// The admissibility filter.
    pub filter: FilterChoice,
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions {
            filter: FilterChoice::Auto,
        }
    }
}

/// A listener receiving search events.
pub type Listener = Box<dyn FnMut(&SearchEvent) + Send>;

enum Control {
    Pause,
}

/// Outcome of a single expansion.
enum Outcome {
    Expanded,
    Accepted(NodeId),
    Exhausted,
}

/// The mutable state of a search, owned by whoever is currently running it.
struct Engine {
    grammar: Arc<Grammar>,
    target: Vec<Symbol>,
    filter: Filter,
    tree: SearchTree,
    frontier: VecDeque<NodeId>,
    seen: HashSet<Vec<Symbol>>,
    rules_by_head: HashMap<Symbol, Vec<RuleId>>,
    expanded: usize,
}

impl Engine {
    fn new(grammar: Arc<Grammar>, word: &[TerminalId], bookend: bool) -> Engine {
        let filter = Filter::new(&grammar, word, bookend);
        let root = vec![Symbol::Nonterminal(grammar.start())];
        let mut rules_by_head: HashMap<Symbol, Vec<RuleId>> = HashMap::new();
        for id in grammar.rule_ids() {
            rules_by_head
                .entry(grammar.rule(id).lhs()[0])
                .or_insert_with(Vec::new)
                .push(id);
        }
        let tree = SearchTree::with_root(root.clone());
        let mut frontier = VecDeque::new();
        if filter.admits(&root) {
            frontier.push_back(tree.root());
        } else {
            debug!("search: start symbol cannot derive the target");
        }
        let mut seen = HashSet::new();
        seen.insert(root);
        Engine {
            grammar,
            target: word.iter().map(|&t| t.into()).collect(),
            filter,
            tree,
            frontier,
            seen,
            rules_by_head,
            expanded: 0,
        }
    }

    /// Expand the next node of the frontier.
    fn step(&mut self) -> Outcome {
        let node = match self.frontier.pop_front() {
            Some(node) => node,
            None => return Outcome::Exhausted,
        };
        debug_assert!(self.tree.is_alive(node));
        let form = self.tree.form(node).to_vec();
        let mut children = 0;
        for offset in 0..form.len() {
            let rules = match self.rules_by_head.get(&form[offset]) {
                Some(rules) => rules,
                None => continue,
            };
            for &rule in rules {
                let step = Step { rule, offset };
                let child = match apply(&self.grammar, &form, step) {
                    Some(child) => child,
                    None => continue,
                };
                if !self.seen.insert(child.clone()) {
                    continue;
                }
                if child == self.target {
                    let id = self.tree.add_child(node, child, step);
                    self.expanded += 1;
                    return Outcome::Accepted(id);
                }
                if !self.filter.admits(&child) {
                    continue;
                }
                let id = self.tree.add_child(node, child, step);
                self.frontier.push_back(id);
                children += 1;
            }
        }
        if children == 0 {
            self.tree.prune(node);
        }
        self.expanded += 1;
        Outcome::Expanded
    }

    fn progress(&self) -> Progress {
        Progress {
            live_nodes: self.tree.live(),
            total_nodes: self.tree.total(),
            frontier: self.frontier.len(),
            expanded: self.expanded,
        }
    }
}

/// State shared between a search and its worker.
struct Shared {
    state: Mutex<SearchState>,
    progress: Mutex<Arc<Progress>>,
    answer: Mutex<Option<Derivation>>,
    listeners: Mutex<Vec<Listener>>,
}

/// Lock a mutex, ignoring poisoning by a panicking listener.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Shared {
    fn state(&self) -> SearchState {
        *lock(&self.state)
    }

    fn set_state(&self, state: SearchState) {
        *lock(&self.state) = state;
    }

    fn publish(&self, engine: &Engine) {
        *lock(&self.progress) = Arc::new(engine.progress());
    }

    fn emit(&self, event: SearchEvent) {
        for listener in lock(&self.listeners).iter_mut() {
            listener(&event);
        }
    }

    /// Enter a final or paused state and notify listeners.
    fn finish(&self, engine: &Engine, state: SearchState, event: SearchEvent) {
        self.publish(engine);
        self.set_state(state);
        self.emit(event);
    }
}

/// Explore forms until the search is decided or paused.
fn run(mut engine: Engine, shared: Arc<Shared>, control: Receiver<Control>) -> Engine {
    shared.emit(SearchEvent::Started);
    loop {
        match control.try_recv() {
            Ok(Control::Pause) => {
                debug!("search: paused after {} expansions", engine.expanded);
                shared.finish(&engine, SearchState::Paused, SearchEvent::Paused);
                return engine;
            }
            Err(TryRecvError::Disconnected) => {
                debug!("search: abandoned after {} expansions", engine.expanded);
                return engine;
            }
            Err(TryRecvError::Empty) => (),
        }
        match engine.step() {
            Outcome::Expanded => {
                if engine.expanded % PROGRESS_INTERVAL == 0 {
                    trace!("search: {:?}", engine.progress());
                    shared.publish(&engine);
                }
            }
            Outcome::Accepted(node) => {
                debug!("search: accepted after {} expansions", engine.expanded);
                let derivation = Derivation::new(engine.grammar.start(), engine.tree.path(node));
                *lock(&shared.answer) = Some(derivation);
                shared.finish(&engine, SearchState::Accepted, SearchEvent::Accepted);
                return engine;
            }
            Outcome::Exhausted => {
                debug!("search: rejected after {} expansions", engine.expanded);
                shared.finish(&engine, SearchState::Rejected, SearchEvent::Rejected);
                return engine;
            }
        }
    }
}

/// A derivation search running in the background.
pub struct Search {
    shared: Arc<Shared>,
    bookend: bool,
    control: Option<Sender<Control>>,
    worker: Option<JoinHandle<Engine>>,
    engine: Option<Engine>,
}

impl Search {
    /// Prepare a search for a word.
    ///
    /// Fails if the grammar is malformed, if the word contains a symbol that
    /// is not a terminal of the grammar, or if the bookend filter is requested
    /// for a grammar that is not context-free. No work is done until the
    /// search is started.
    pub fn new(grammar: Arc<Grammar>, word: &[TerminalId], options: SearchOptions) -> Result<Search> {
        grammar.check_defined()?;
        grammar.check_word(word)?;
        let bookend = match options.filter {
            FilterChoice::Auto => grammar.is_context_free(),
            FilterChoice::Length => false,
            FilterChoice::Bookend => {
                grammar.require_context_free()?;
                true
            }
        };
        debug!(
            "search: {} filter for a word of length {}",
            if bookend { "bookend" } else { "length" },
            word.len()
        );
        let engine = Engine::new(grammar, word, bookend);
        let shared = Shared {
            state: Mutex::new(SearchState::Idle),
            progress: Mutex::new(Arc::new(engine.progress())),
            answer: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
        };
        Ok(Search {
            shared: Arc::new(shared),
            bookend,
            control: None,
            worker: None,
            engine: Some(engine),
        })
    }

    /// Prepare a search for a word given as text.
    ///
    /// Every character names one terminal.
    pub fn for_str(grammar: Arc<Grammar>, input: &str, options: SearchOptions) -> Result<Search> {
        let word = grammar.parse_word(input)?;
        Search::new(grammar, &word, options)
    }

    /// Start or resume the search on a worker thread.
    ///
    /// Returns false if the search is already running, has finished, or has
    /// failed.
    pub fn start(&mut self) -> bool {
        match self.shared.state() {
            SearchState::Idle | SearchState::Paused => (),
            _ => return false,
        }
        self.reap();
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => return false,
        };
        let (tx, rx) = channel();
        let shared = self.shared.clone();
        self.shared.set_state(SearchState::Running);
        self.control = Some(tx);
        self.worker = Some(thread::spawn(move || run(engine, shared, rx)));
        true
    }

    /// Ask the worker to stop at the next expansion.
    ///
    /// Returns false if the search is not running. The state changes to
    /// `Paused` once the worker has honored the request.
    pub fn pause(&mut self) -> bool {
        if self.shared.state() != SearchState::Running {
            return false;
        }
        match self.control {
            Some(ref control) => control.send(Control::Pause).is_ok(),
            None => false,
        }
    }

    /// Block until the worker has stopped, and return the resulting state.
    ///
    /// Without a prior call to `pause` this may never return for a grammar
    /// whose search does not terminate.
    pub fn wait(&mut self) -> SearchState {
        self.reap();
        self.shared.state()
    }

    /// Whether the worker is running.
    pub fn is_active(&self) -> bool {
        self.shared.state() == SearchState::Running
    }

    /// Whether the search has been decided.
    pub fn is_finished(&self) -> bool {
        match self.shared.state() {
            SearchState::Accepted | SearchState::Rejected => true,
            _ => false,
        }
    }

    /// The current state.
    pub fn state(&self) -> SearchState {
        self.shared.state()
    }

    /// The derivation found, once the search has accepted.
    pub fn answer(&self) -> Option<Derivation> {
        lock(&self.shared.answer).clone()
    }

    /// The latest progress snapshot.
    pub fn progress(&self) -> Arc<Progress> {
        lock(&self.shared.progress).clone()
    }

    /// Whether candidate forms are checked against the ends of the word.
    pub fn uses_bookend_filter(&self) -> bool {
        self.bookend
    }

    /// Register a listener for search events.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&SearchEvent) + Send + 'static,
    {
        lock(&self.shared.listeners).push(Box::new(listener));
    }

    /// Join a stopped or stopping worker and take back its engine.
    fn reap(&mut self) {
        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(engine) => self.engine = Some(engine),
                Err(_) => {
                    error!("search worker panicked");
                    self.shared.set_state(SearchState::Failed);
                }
            }
        }
        self.control = None;
    }
}

impl Drop for Search {
    fn drop(&mut self) {
        self.control = None;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Rule;

    /// S -> a S b | ε
    fn balanced() -> Arc<Grammar> {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let (ta, tb) = (g.add_terminal("a"), g.add_terminal("b"));
        g.add_rule(Rule::new(nt_s, vec![ta.into(), nt_s.into(), tb.into()]));
        g.add_rule(Rule::new(nt_s, vec![]));
        Arc::new(g)
    }

    /// S -> S S | a
    fn doubling() -> Arc<Grammar> {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let ta = g.add_terminal("a");
        g.add_rule(Rule::new(nt_s, vec![nt_s.into(), nt_s.into()]));
        g.add_rule(Rule::new(nt_s, vec![ta.into()]));
        Arc::new(g)
    }

    fn run_to_end(grammar: &Arc<Grammar>, word: &str) -> Search {
        let mut search = Search::for_str(grammar.clone(), word, SearchOptions::default()).unwrap();
        assert!(search.start());
        search.wait();
        search
    }

    #[test]
    fn balanced_accepts() {
        let g = balanced();
        let search = run_to_end(&g, "aabb");
        assert_eq!(search.state(), SearchState::Accepted);
        let answer = search.answer().unwrap();
        let rules: Vec<usize> = answer.rules().map(|r| r.as_usize()).collect();
        assert_eq!(rules, vec![0, 0, 1]);
        assert_eq!(
            answer.pretty(&g).to_string(),
            "S => a S b => a a S b b => a a b b"
        );
        let word: Vec<Symbol> = g.parse_word("aabb").unwrap().into_iter().map(Symbol::from).collect();
        assert_eq!(answer.replay(&g), Some(word));
    }

    #[test]
    fn empty_word_rejected() {
        // S -> a S | a
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let ta = g.add_terminal("a");
        g.add_rule(Rule::new(nt_s, vec![ta.into(), nt_s.into()]));
        g.add_rule(Rule::new(nt_s, vec![ta.into()]));
        let g = Arc::new(g);
        let search = run_to_end(&g, "");
        assert_eq!(search.state(), SearchState::Rejected);
        assert!(search.is_finished());
        assert_eq!(search.answer(), None);
    }

    #[test]
    fn doubling_accepts() {
        let g = doubling();
        let search = run_to_end(&g, "aaa");
        assert_eq!(search.state(), SearchState::Accepted);
        let answer = search.answer().unwrap();
        let ss = answer.rules().filter(|r| r.as_usize() == 0).count();
        let a = answer.rules().filter(|r| r.as_usize() == 1).count();
        assert_eq!((ss, a), (2, 3));
        let word: Vec<Symbol> = g.parse_word("aaa").unwrap().into_iter().map(Symbol::from).collect();
        assert_eq!(answer.replay(&g), Some(word));
    }

    #[test]
    fn unrestricted_accepts() {
        // S -> a B c; a B -> a b; b c -> b b c
        let mut g = Grammar::new();
        let (nt_s, nt_b) = (g.add_nonterminal("S"), g.add_nonterminal("B"));
        let (ta, tb, tc) = (g.add_terminal("a"), g.add_terminal("b"), g.add_terminal("c"));
        g.add_rule(Rule::new(nt_s, vec![ta.into(), nt_b.into(), tc.into()]));
        g.add_rule(Rule::with_lhs(vec![ta.into(), nt_b.into()], vec![ta.into(), tb.into()]));
        g.add_rule(Rule::with_lhs(
            vec![tb.into(), tc.into()],
            vec![tb.into(), tb.into(), tc.into()],
        ));
        let g = Arc::new(g);
        let mut search = Search::for_str(g.clone(), "abbc", SearchOptions::default()).unwrap();
        assert!(!search.uses_bookend_filter());
        assert!(search.start());
        assert_eq!(search.wait(), SearchState::Accepted);
        let answer = search.answer().unwrap();
        assert_eq!(answer.steps()[1], Step { rule: RuleId::from_usize(1), offset: 0 });
        assert_eq!(answer.pretty(&g).to_string(), "S => a B c => a b c => a b b c");
    }

    #[test]
    fn finite_language_rejects() {
        let g = balanced();
        let search = run_to_end(&g, "aab");
        assert_eq!(search.state(), SearchState::Rejected);
        assert_eq!(search.progress().frontier, 0);
    }

    #[test]
    fn invalid_input() {
        let g = balanced();
        assert!(Search::for_str(g.clone(), "abc", SearchOptions::default()).is_err());
        let mut undefined = Grammar::new();
        let (nt_s, nt_x) = (undefined.add_nonterminal("S"), undefined.add_nonterminal("X"));
        undefined.add_rule(Rule::new(nt_s, vec![nt_x.into()]));
        assert!(Search::for_str(Arc::new(undefined), "", SearchOptions::default()).is_err());
    }

    #[test]
    fn bookend_requires_context_free() {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let ta = g.add_terminal("a");
        g.add_rule(Rule::new(nt_s, vec![ta.into()]));
        g.add_rule(Rule::with_lhs(vec![ta.into()], vec![ta.into(), ta.into()]));
        let g = Arc::new(g);
        let options = SearchOptions {
            filter: FilterChoice::Bookend,
        };
        assert!(Search::for_str(g.clone(), "a", options).is_err());
        let search = Search::for_str(g, "a", SearchOptions::default()).unwrap();
        assert!(!search.uses_bookend_filter());
    }

    #[test]
    fn events_in_order() {
        let g = balanced();
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut search = Search::for_str(g, "ab", SearchOptions::default()).unwrap();
        let sink = events.clone();
        search.add_listener(move |e| sink.lock().unwrap().push(*e));
        assert_eq!(search.state(), SearchState::Idle);
        assert!(search.start());
        assert_eq!(search.wait(), SearchState::Accepted);
        assert!(!search.start());
        assert_eq!(
            *events.lock().unwrap(),
            vec![SearchEvent::Started, SearchEvent::Accepted]
        );
    }

    #[test]
    fn pause_and_resume() {
        let g = doubling();
        let word = "a".repeat(12);
        let mut search = Search::for_str(g.clone(), &word, SearchOptions::default()).unwrap();
        assert!(search.start());
        assert!(!search.start());
        search.pause();
        let state = search.wait();
        assert!(state == SearchState::Paused || state == SearchState::Accepted);
        if state == SearchState::Paused {
            assert!(!search.is_active());
            assert!(!search.is_finished());
            let expanded = search.progress().expanded;
            assert!(search.start());
            assert_eq!(search.wait(), SearchState::Accepted);
            assert!(search.progress().expanded >= expanded);
        }
        let answer = search.answer().unwrap();
        assert_eq!(answer.rules().count(), 23);
    }

    /// A search for `b` that never decides: S -> S S | a; S S -> S.
    fn undecided() -> Search {
        let mut g = Grammar::new();
        let nt_s = g.add_nonterminal("S");
        let (ta, tb) = (g.add_terminal("a"), g.add_terminal("b"));
        g.add_rule(Rule::new(nt_s, vec![nt_s.into(), nt_s.into()]));
        g.add_rule(Rule::new(nt_s, vec![ta.into()]));
        g.add_rule(Rule::with_lhs(vec![nt_s.into(), nt_s.into()], vec![nt_s.into()]));
        Search::new(Arc::new(g), &[tb], SearchOptions::default()).unwrap()
    }

    #[test]
    fn listeners_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut search = undecided();
        for index in 0..2 {
            let sink = log.clone();
            search.add_listener(move |e| sink.lock().unwrap().push((index, *e)));
        }
        assert!(search.start());
        assert!(search.pause());
        assert_eq!(search.wait(), SearchState::Paused);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                (0, SearchEvent::Started),
                (1, SearchEvent::Started),
                (0, SearchEvent::Paused),
                (1, SearchEvent::Paused),
            ]
        );

        assert!(search.start());
        assert!(search.pause());
        assert_eq!(search.wait(), SearchState::Paused);
        assert_eq!(
            log.lock().unwrap()[4..],
            [
                (0, SearchEvent::Started),
                (1, SearchEvent::Started),
                (0, SearchEvent::Paused),
                (1, SearchEvent::Paused),
            ]
        );
    }

    #[test]
    fn panicking_listener_fails_search() {
        let mut search = undecided();
        search.add_listener(|e| {
            if *e == SearchEvent::Started {
                panic!("listener failed");
            }
        });
        assert!(search.start());
        assert_eq!(search.wait(), SearchState::Failed);
        assert!(!search.is_active());
        assert!(!search.is_finished());
        assert!(!search.start());
        assert!(!search.pause());
    }

    #[test]
    fn drop_while_running() {
        let mut search = undecided();
        assert!(search.start());
        assert!(search.is_active());
        drop(search);
    }
}
