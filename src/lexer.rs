// Copyright (c) 2018 Fabian Schuiki

//! A lexer for grammar descriptions.

use std::iter::Peekable;

use crate::error::{Error, Result};

/// The tokens that may appear in a grammar description.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Keyword(Keyword),
    Ident(String),
    /// A quoted terminal, without the quotes and with escapes resolved.
    Literal(String),
    Colon,
    Semicolon,
    Pipe,
}

/// The keywords that may appear in a grammar description.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Keyword {
    Token,
    Epsilon,
}

/// A lexer for grammar descriptions.
///
/// Yields tokens together with their start and end byte offsets.
pub struct Lexer<T: Iterator<Item = (usize, char)>> {
    input: Peekable<T>,
}

impl<T: Iterator<Item = (usize, char)>> Lexer<T> {
    /// Create a new lexer.
    pub fn new(input: T) -> Lexer<T> {
        Lexer {
            input: input.peekable(),
        }
    }
}

/// Return the next non-whitespace input character, skipping comments.
fn next_relevant<I: Iterator<Item = (usize, char)>>(
    input: &mut Peekable<I>,
) -> Option<(usize, char)> {
    'outer: while let Some((p, c)) = input.next() {
        if c == '/' {
            match input.peek() {
                Some(&(_, '/')) => {
                    input.next();
                    while let Some((_, c)) = input.next() {
                        if c == '\n' {
                            continue 'outer;
                        }
                    }
                    return None; // end of input reached
                }
                Some(&(_, '*')) => {
                    input.next();
                    while let Some((_, c)) = input.next() {
                        if c != '*' {
                            continue;
                        }
                        if let Some(&(_, c)) = input.peek() {
                            if c == '/' {
                                input.next();
                                continue 'outer;
                            }
                        }
                    }
                    return None; // end of input reached
                }
                _ => (),
            }
        }
        if !c.is_whitespace() {
            return Some((p, c));
        }
    }
    None
}

/// Checks whether a character is a valid symbol in the grammar description.
fn is_symbol(c: char) -> bool {
    match c {
        ':' | ';' | '|' | '\'' => true,
        _ => false,
    }
}

impl<T: Iterator<Item = (usize, char)>> Iterator for Lexer<T> {
    type Item = Result<(usize, usize, Token)>;

    fn next(&mut self) -> Option<Self::Item> {
        // Fetch the first character and see what we can do with it.
        let (sp, sc) = next_relevant(&mut self.input)?;
        let mut sl = sp + sc.len_utf8();
        let tkn = match sc {
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '|' => Token::Pipe,
            '\'' => {
                let mut buffer = String::new();
                let mut escaped = false;
                let mut closed = false;
                while let Some((ep, ec)) = self.input.next() {
                    sl = ep + ec.len_utf8();
                    if escaped {
                        buffer.push(ec);
                        escaped = false;
                    } else if ec == '\\' {
                        escaped = true;
                    } else if ec == '\'' {
                        closed = true;
                        break;
                    } else {
                        buffer.push(ec);
                    }
                }
                if !closed {
                    return Some(Err(Error::Syntax {
                        offset: sp,
                        message: "unterminated quoted terminal".into(),
                    }));
                }
                if buffer.is_empty() {
                    return Some(Err(Error::Syntax {
                        offset: sp,
                        message: "empty quoted terminal".into(),
                    }));
                }
                Token::Literal(buffer)
            }
            _ => {
                let mut buffer = String::new();
                buffer.push(sc);
                while let Some(&(ep, ec)) = self.input.peek() {
                    if ec.is_whitespace() || is_symbol(ec) {
                        break;
                    }
                    buffer.push(ec);
                    sl = ep + ec.len_utf8();
                    self.input.next();
                }
                match buffer.as_str() {
                    "token" => Token::Keyword(Keyword::Token),
                    "epsilon" => Token::Keyword(Keyword::Epsilon),
                    _ => Token::Ident(buffer),
                }
            }
        };
        Some(Ok((sp, sl, tkn)))
    }
}
