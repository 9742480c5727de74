// Copyright (c) 2018 Fabian Schuiki

//! A parser for grammar descriptions.
//!
//! ```text
//! token a;
//! S : 'a' S 'b' | epsilon ;
//! A B : 'c' ;
//! ```
//!
//! Quoted names and names declared with `token` are terminals. Every other
//! name is a nonterminal. The first nonterminal on the left-hand side of the
//! first rule is the start symbol.

use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::iter::Peekable;

use crate::error::{Error, Result};
use crate::grammar::{Grammar, Rule, Symbol};
use crate::lexer::{Keyword, Lexer, Token};

/// The abstract syntax tree of a grammar description.
pub mod ast {
    /// The root node of a grammar description.
    #[derive(Debug, PartialEq, Eq, Hash)]
    pub struct Desc {
        /// The token declarations.
        pub tokens: Vec<TokenDecl>,
        /// The rule declarations.
        pub rules: Vec<RuleDecl>,
    }

    /// A token declaration.
    #[derive(Debug, PartialEq, Eq, Hash)]
    pub struct TokenDecl {
        /// The name of the token.
        pub name: String,
    }

    /// A rule declaration.
    #[derive(Debug, PartialEq, Eq, Hash)]
    pub struct RuleDecl {
        /// The byte offset of the rule in the description.
        pub offset: usize,
        /// The left-hand side of the rule.
        pub lhs: Vec<Symbol>,
        /// The different variants of the rule. An empty variant is epsilon.
        pub variants: Vec<Vec<Symbol>>,
    }

    /// A name used in a rule.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub enum Symbol {
        /// A bare name.
        Ident(String),
        /// A quoted name, which is always a terminal.
        Literal(String),
    }

    impl Symbol {
        /// The name without quotes.
        pub fn name(&self) -> &str {
            match *self {
                Symbol::Ident(ref n) | Symbol::Literal(ref n) => n,
            }
        }
    }
}

struct Parser<I: Iterator<Item = (usize, usize, Token)>> {
    input: Peekable<I>,
    end: usize,
}

impl<I: Iterator<Item = (usize, usize, Token)>> Parser<I> {
    fn error<T, S: Into<String>>(&mut self, message: S) -> Result<T> {
        let offset = self.input.peek().map(|&(s, _, _)| s).unwrap_or(self.end);
        Err(Error::Syntax {
            offset,
            message: message.into(),
        })
    }

    fn peek(&mut self) -> Option<&Token> {
        self.input.peek().map(|&(_, _, ref t)| t)
    }

    fn accept(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.input.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<()> {
        if self.accept(&token) {
            Ok(())
        } else {
            self.error(format!("expected {}", what))
        }
    }

    fn symbol(&mut self) -> Option<ast::Symbol> {
        let symbol = match self.peek() {
            Some(Token::Ident(name)) => ast::Symbol::Ident(name.clone()),
            Some(Token::Literal(name)) => ast::Symbol::Literal(name.clone()),
            _ => return None,
        };
        self.input.next();
        Some(symbol)
    }

    fn desc(&mut self) -> Result<ast::Desc> {
        let mut desc = ast::Desc {
            tokens: vec![],
            rules: vec![],
        };
        while self.peek().is_some() {
            if self.accept(&Token::Semicolon) {
                continue;
            }
            if self.accept(&Token::Keyword(Keyword::Token)) {
                self.token_decl(&mut desc.tokens)?;
            } else {
                let rule = self.rule_decl()?;
                desc.rules.push(rule);
            }
        }
        Ok(desc)
    }

    fn token_decl(&mut self, into: &mut Vec<ast::TokenDecl>) -> Result<()> {
        let mut any = false;
        while let Some(symbol) = self.symbol() {
            into.push(ast::TokenDecl {
                name: symbol.name().to_string(),
            });
            any = true;
        }
        if !any {
            return self.error("expected token name");
        }
        self.expect(Token::Semicolon, "`;` after token declaration")
    }

    fn rule_decl(&mut self) -> Result<ast::RuleDecl> {
        let offset = self.input.peek().map(|&(s, _, _)| s).unwrap_or(self.end);
        let mut lhs = Vec::new();
        while let Some(symbol) = self.symbol() {
            lhs.push(symbol);
        }
        if lhs.is_empty() {
            return self.error("expected rule");
        }
        self.expect(Token::Colon, "`:` after left-hand side")?;
        let mut variants = vec![self.variant()?];
        while self.accept(&Token::Pipe) {
            variants.push(self.variant()?);
        }
        self.expect(Token::Semicolon, "`;` or `|` after rule variant")?;
        Ok(ast::RuleDecl {
            offset,
            lhs,
            variants,
        })
    }

    fn variant(&mut self) -> Result<Vec<ast::Symbol>> {
        if self.accept(&Token::Keyword(Keyword::Epsilon)) {
            return Ok(vec![]);
        }
        let mut seq = Vec::new();
        while let Some(symbol) = self.symbol() {
            seq.push(symbol);
        }
        if seq.is_empty() {
            return self.error("expected symbols or `epsilon`");
        }
        Ok(seq)
    }
}

/// Parse a sequence of tokens given by an iterator.
///
/// `end` is the offset reported for errors at the end of the input.
pub fn parse_iter<I>(input: I, end: usize) -> Result<ast::Desc>
where
    I: IntoIterator<Item = (usize, usize, Token)>,
{
    Parser {
        input: input.into_iter().peekable(),
        end,
    }
    .desc()
}

/// Parse a grammar description into its syntax tree.
pub fn parse_desc(input: &str) -> Result<ast::Desc> {
    let tokens = Lexer::new(input.char_indices()).collect::<Result<Vec<_>>>()?;
    parse_iter(tokens, input.len())
}

/// Parse a grammar description into a grammar.
pub fn parse_str(input: &str) -> Result<Grammar> {
    make_grammar(&parse_desc(input)?)
}

/// Convert the grammar description into an actual grammar.
pub fn make_grammar(desc: &ast::Desc) -> Result<Grammar> {
    let first = match desc.rules.first() {
        Some(rule) => rule,
        None => return Err(Error::EmptyGrammar),
    };

    // Classify every name.
    let declared: HashSet<&str> = desc.tokens.iter().map(|d| d.name.as_str()).collect();
    let mut terminals: IndexSet<&str> = desc.tokens.iter().map(|d| d.name.as_str()).collect();
    let mut nonterminals: IndexSet<&str> = IndexSet::new();
    let symbols = desc
        .rules
        .iter()
        .flat_map(|r| r.lhs.iter().chain(r.variants.iter().flat_map(|v| v.iter())));
    for symbol in symbols {
        match *symbol {
            ast::Symbol::Literal(ref name) => {
                terminals.insert(name);
            }
            ast::Symbol::Ident(ref name) if declared.contains(name.as_str()) => (),
            ast::Symbol::Ident(ref name) => {
                nonterminals.insert(name);
            }
        }
    }
    if let Some(name) = nonterminals.iter().find(|n| terminals.contains(*n)) {
        return Err(Error::NameConflict(name.to_string()));
    }

    // The start symbol must be the first nonterminal created.
    let start = first
        .lhs
        .iter()
        .filter_map(|s| match *s {
            ast::Symbol::Ident(ref name) if nonterminals.contains(name.as_str()) => {
                Some(name.as_str())
            }
            _ => None,
        })
        .next();
    let start = match start {
        Some(start) => start,
        None => {
            return Err(Error::Syntax {
                offset: first.offset,
                message: "the first rule has no nonterminal on its left-hand side".into(),
            })
        }
    };

    let mut grammar = Grammar::new();
    let mut symbol_map: IndexMap<&str, Symbol> = IndexMap::new();
    symbol_map.insert(start, grammar.add_nonterminal(start).into());
    for &name in &nonterminals {
        if !symbol_map.contains_key(name) {
            symbol_map.insert(name, grammar.add_nonterminal(name).into());
        }
    }
    for &name in &terminals {
        symbol_map.insert(name, grammar.add_terminal(name).into());
    }

    let lookup = |seq: &[ast::Symbol]| -> Vec<Symbol> {
        seq.iter().map(|s| symbol_map[s.name()]).collect()
    };
    for d in &desc.rules {
        let lhs = lookup(&d.lhs);
        for v in &d.variants {
            grammar.add_rule(Rule::with_lhs(lhs.clone(), lookup(v)));
        }
    }
    debug!(
        "parsed grammar with {} rules, {} nonterminals, {} terminals",
        grammar.rules().len(),
        nonterminals.len(),
        terminals.len()
    );

    Ok(grammar)
}
