// Copyright (c) 2018 Fabian Schuiki

//! End-to-end tests from grammar descriptions to recognition results.

extern crate gramlab;

use std::sync::Arc;

use gramlab::analysis::{Analysis, AnalysisCache};
use gramlab::cyk::CykParser;
use gramlab::grammar::{Grammar, GrammarClass, Symbol};
use gramlab::item_set::ItemSets;
use gramlab::machine::StateMachine;
use gramlab::parser::parse_str;
use gramlab::search::{Search, SearchOptions, SearchState};
use gramlab::Error;

fn derive(grammar: &Arc<Grammar>, word: &str) -> Search {
    let mut search = Search::for_str(grammar.clone(), word, SearchOptions::default()).unwrap();
    assert!(search.start());
    search.wait();
    search
}

fn word(grammar: &Grammar, text: &str) -> Vec<Symbol> {
    grammar
        .parse_word(text)
        .unwrap()
        .into_iter()
        .map(Symbol::from)
        .collect()
}

fn rule_names(grammar: &Grammar, rules: &[gramlab::grammar::RuleId]) -> Vec<String> {
    rules
        .iter()
        .map(|&r| grammar.rule(r).pretty(grammar).to_string())
        .collect()
}

#[test]
fn balanced_derivation() {
    let g = Arc::new(parse_str("S : 'a' S 'b' | epsilon ;").unwrap());
    let search = derive(&g, "aabb");
    assert_eq!(search.state(), SearchState::Accepted);
    let answer = search.answer().unwrap();
    let rules: Vec<_> = answer.rules().collect();
    assert_eq!(
        rule_names(&g, &rules),
        vec!["S -> a S b", "S -> a S b", "S -> ε"]
    );
    assert_eq!(answer.replay(&g), Some(word(&g, "aabb")));
}

#[test]
fn empty_word_not_derived() {
    let g = Arc::new(parse_str("S : 'a' S | 'a' ;").unwrap());
    let search = derive(&g, "");
    assert_eq!(search.state(), SearchState::Rejected);
    assert!(search.answer().is_none());
}

#[test]
fn cyk_trace() {
    let g = parse_str("S : A B ; A : 'a' ; B : 'b' ;").unwrap();
    let mut cyk = CykParser::new(&g).unwrap();
    assert_eq!(cyk.solve_str("ab"), Ok(true));
    assert_eq!(
        rule_names(&g, &cyk.trace()),
        vec!["S -> A B", "A -> a", "B -> b"]
    );
}

#[test]
fn ll1_grammar() {
    let g = parse_str("S : 'a' A | 'b' B ; A : 'c' ; B : 'c' ;").unwrap();
    let analysis = Analysis::compute(&g).unwrap();
    assert!(analysis.is_ll1(&g));
}

#[test]
fn doubling_derivation() {
    let g = Arc::new(parse_str("S : S S | 'a' ;").unwrap());
    let search = derive(&g, "aaa");
    assert_eq!(search.state(), SearchState::Accepted);
    let answer = search.answer().unwrap();
    let names = rule_names(&g, &answer.rules().collect::<Vec<_>>());
    assert_eq!(names.iter().filter(|n| *n == "S -> S S").count(), 2);
    assert_eq!(names.iter().filter(|n| *n == "S -> a").count(), 3);
    assert_eq!(answer.replay(&g), Some(word(&g, "aaa")));

    // CYK agrees on the same grammar.
    let mut cyk = CykParser::new(&g).unwrap();
    assert_eq!(cyk.solve_str("aaa"), Ok(true));
}

/// David Tribble's example 11, which is LR(1) but neither SLR(1) nor LL(1).
const TRIBBLE: &str = "
    S : 'a' A 'd' | 'a' B 'e' | 'b' A 'e' | 'b' B 'd' ;
    A : 'c' ;
    B : 'c' ;
";

#[test]
fn tribble_tables() {
    let g = parse_str(TRIBBLE).unwrap();
    assert_eq!(g.classify(), GrammarClass::ContextFree);
    let analysis = Analysis::compute(&g).unwrap();
    assert!(!analysis.is_ll1(&g));

    let item_sets = ItemSets::compute(&g).unwrap();
    let conflicts = StateMachine::compute(&g, &item_sets, analysis.follow()).unwrap_err();
    assert_eq!(conflicts.len(), 2);

    let g = Arc::new(g);
    for (text, accepted) in &[("acd", true), ("bce", true), ("ace", true), ("acc", false)] {
        let search = derive(&g, text);
        let expected = if *accepted {
            SearchState::Accepted
        } else {
            SearchState::Rejected
        };
        assert_eq!(search.state(), expected, "word {}", text);
    }
}

#[test]
fn slr_agrees_with_search() {
    let g = parse_str("E : E '+' T | T ; T : T '*' F | F ; F : '(' E ')' | 'x' ;").unwrap();
    let analysis = Analysis::compute(&g).unwrap();
    let item_sets = ItemSets::compute(&g).unwrap();
    let sm = StateMachine::compute(&g, &item_sets, analysis.follow()).unwrap();
    let g = Arc::new(g);
    for text in &["x", "x+x", "x*(x+x)", "(x", "x+", "+x"] {
        let table = sm.parse(&g, &g.parse_word(text).unwrap()).is_some();
        let search = derive(&g, text);
        assert_eq!(
            search.state() == SearchState::Accepted,
            table,
            "word {}",
            text
        );
    }
}

#[test]
fn unrestricted_derivation() {
    // a^n b^n c^n for n >= 1
    let g = Arc::new(
        parse_str(
            "S : 'a' B C | 'a' S B C ;
             C B : C Z ; C Z : W Z ; W Z : W C ; W C : B C ;
             'a' B : 'a' 'b' ; 'b' B : 'b' 'b' ;
             'b' C : 'b' 'c' ; 'c' C : 'c' 'c' ;",
        )
        .unwrap(),
    );
    assert_eq!(g.classify(), GrammarClass::Unrestricted);
    let search = derive(&g, "aabbcc");
    assert_eq!(search.state(), SearchState::Accepted);
    let answer = search.answer().unwrap();
    assert_eq!(answer.replay(&g), Some(word(&g, "aabbcc")));
}

#[test]
fn malformed_input() {
    let g = parse_str("S : 'a' X ;").unwrap();
    assert_eq!(
        Analysis::compute(&g).err(),
        Some(Error::UndefinedNonterminal("X".into()))
    );
    let g = Arc::new(parse_str("S : 'a' ;").unwrap());
    assert!(match Search::for_str(g, "ab", SearchOptions::default()) {
        Err(Error::UnknownTerminal { position: 1, .. }) => true,
        _ => false,
    });
    assert!(parse_str("S : 'a' S 'b'").is_err());
}

#[test]
fn cache_shares_analyses() {
    let mut cache = AnalysisCache::new();
    let a = cache.get(&parse_str("S : 'a' S | 'b' ;").unwrap()).unwrap();
    let b = cache.get(&parse_str("S : 'a' S | 'b' ;").unwrap()).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}
