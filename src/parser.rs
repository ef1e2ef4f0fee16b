//! Parser for the textual placement-policy language.
//!
//! Grammar, with keywords uppercase and case-sensitive:
//!
//! ```text
//! policy := rep+ cbf? select* filter*
//! rep    := "REP" NUMBER ("IN" ident)?
//! cbf    := "CBF" NUMBER
//! select := "SELECT" NUMBER "FROM" ("*" | term) ("AS" ident)?
//! filter := "FILTER" cond ("AND" cond)* "AS" ident
//! cond   := term ("EQ" | "NE") term
//! ```
//!
//! A term is an identifier, a number, or a single-quoted string; quoting is
//! only required for values that are not identifier-shaped (e.g. `'RU LED'`).
//! Parsing is a pure function and fails fast on the first offending token.

use std::fmt;

use crate::policy::{
    is_ident_shaped, FilterExpr, NamedFilter, Op, Policy, ReplicaGroup, Selector, Source,
};

/// Errors produced while parsing a policy string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The policy text contains no tokens at all.
    #[error("empty policy")]
    Empty,
    /// A quoted literal was opened but never closed.
    #[error("unterminated string literal at byte {0}")]
    UnterminatedString(usize),
    /// A character outside the policy alphabet.
    #[error("unexpected character {ch:?} at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    /// A numeric token that does not fit the count type.
    #[error("number out of range at byte {0}")]
    NumberOutOfRange(usize),
    /// A count that must be positive was zero.
    #[error("{clause} requires a positive count at byte {pos}")]
    ZeroCount { clause: &'static str, pos: usize },
    /// The token stream diverged from the grammar.
    #[error("unexpected token {found} at byte {pos}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        pos: usize,
    },
    /// The policy ended where more input was required.
    #[error("unexpected end of policy, expected {0}")]
    UnexpectedEnd(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(u32),
    Word(String),
    Str(String),
    Star,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Word(w) => f.write_str(w),
            Token::Str(s) => write!(f, "'{s}'"),
            Token::Star => f.write_str("*"),
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.'
}

fn lex(text: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if b == b'*' {
            tokens.push((Token::Star, i));
            i += 1;
            continue;
        }
        if b == b'\'' {
            let start = i;
            i += 1;
            let mut value = String::new();
            loop {
                if i >= bytes.len() {
                    return Err(ParseError::UnterminatedString(start));
                }
                if bytes[i] == b'\'' {
                    // doubled quote escapes a literal quote
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\'' {
                        value.push('\'');
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                // policy text is ASCII-oriented but literals may carry UTF-8
                let ch = text[i..].chars().next().unwrap_or('\u{fffd}');
                value.push(ch);
                i += ch.len_utf8();
            }
            tokens.push((Token::Str(value), start));
            continue;
        }
        if is_ident_byte(b) {
            let start = i;
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            let word = &text[start..i];
            if word.bytes().all(|b| b.is_ascii_digit()) {
                let n: u32 = word
                    .parse()
                    .map_err(|_| ParseError::NumberOutOfRange(start))?;
                tokens.push((Token::Number(n), start));
            } else {
                tokens.push((Token::Word(word.to_string()), start));
            }
            continue;
        }
        let ch = text[i..].chars().next().unwrap_or('\u{fffd}');
        return Err(ParseError::UnexpectedChar { ch, pos: i });
    }
    Ok(tokens)
}

struct Cursor {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.pos)
    }

    fn peek_word(&self, kw: &str) -> bool {
        matches!(self.peek(), Some((Token::Word(w), _)) if w == kw)
    }

    fn bump(&mut self) -> Option<(Token, usize)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&mut self, expected: &'static str) -> ParseError {
        match self.bump() {
            Some((tok, pos)) => ParseError::UnexpectedToken {
                found: tok.to_string(),
                expected,
                pos,
            },
            None => ParseError::UnexpectedEnd(expected),
        }
    }

    fn keyword(&mut self, kw: &'static str) -> Result<(), ParseError> {
        if self.peek_word(kw) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(kw))
        }
    }

    fn number(&mut self, clause: &'static str) -> Result<u32, ParseError> {
        match self.peek() {
            Some((Token::Number(n), pos)) => {
                let (n, pos) = (*n, *pos);
                self.pos += 1;
                if n == 0 {
                    return Err(ParseError::ZeroCount { clause, pos });
                }
                Ok(n)
            }
            _ => Err(self.unexpected("a count")),
        }
    }

    /// An alias: a bare identifier or a quoted string, but never a keyword.
    fn ident(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.peek() {
            Some((Token::Word(w), _)) if is_ident_shaped(w) => {
                let w = w.clone();
                self.pos += 1;
                Ok(w)
            }
            Some((Token::Str(s), _)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(s)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// A filter term: identifier, quoted string, or number rendered verbatim.
    fn term(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.peek() {
            Some((Token::Number(n), _)) => {
                let n = *n;
                self.pos += 1;
                Ok(n.to_string())
            }
            _ => self.ident(expected),
        }
    }
}

fn condition(cur: &mut Cursor) -> Result<FilterExpr, ParseError> {
    let attr = cur.term("an attribute name")?;
    let op = match cur.peek() {
        Some((Token::Word(w), _)) if w == "EQ" => Op::Eq,
        Some((Token::Word(w), _)) if w == "NE" => Op::Ne,
        _ => return Err(cur.unexpected("EQ or NE")),
    };
    cur.pos += 1;
    let value = cur.term("a literal")?;
    Ok(FilterExpr::Cond { attr, op, value })
}

/// Parse a policy string into a [`Policy`].
pub fn parse(text: &str) -> Result<Policy, ParseError> {
    let tokens = lex(text)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut cur = Cursor { tokens, pos: 0 };
    let mut policy = Policy {
        replicas: Vec::new(),
        cbf: 1,
        selectors: Vec::new(),
        filters: Vec::new(),
    };

    if !cur.peek_word("REP") {
        return Err(cur.unexpected("REP"));
    }
    while cur.peek_word("REP") {
        cur.pos += 1;
        let count = cur.number("REP")?;
        let selector = if cur.peek_word("IN") {
            cur.pos += 1;
            Some(cur.ident("a selector alias")?)
        } else {
            None
        };
        policy.replicas.push(ReplicaGroup { count, selector });
    }

    if cur.peek_word("CBF") {
        cur.pos += 1;
        policy.cbf = cur.number("CBF")?;
    }

    while cur.peek_word("SELECT") {
        cur.pos += 1;
        let count = cur.number("SELECT")?;
        cur.keyword("FROM")?;
        let source = match cur.peek() {
            Some((Token::Star, _)) => {
                cur.pos += 1;
                Source::All
            }
            _ => Source::Named(cur.ident("* or a subset alias")?),
        };
        let name = if cur.peek_word("AS") {
            cur.pos += 1;
            Some(cur.ident("a selector alias")?)
        } else {
            None
        };
        policy.selectors.push(Selector {
            count,
            source,
            name,
        });
    }

    while cur.peek_word("FILTER") {
        cur.pos += 1;
        let mut expr = condition(&mut cur)?;
        while cur.peek_word("AND") {
            cur.pos += 1;
            let rhs = condition(&mut cur)?;
            expr = FilterExpr::And(Box::new(expr), Box::new(rhs));
        }
        cur.keyword("AS")?;
        let name = cur.ident("a filter alias")?;
        policy.filters.push(NamedFilter { name, expr });
    }

    if cur.peek().is_some() {
        return Err(cur.unexpected("end of policy"));
    }
    Ok(policy)
}
