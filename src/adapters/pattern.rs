//! String generation from a practical regex subset
//!
//! Supported:
//! - literals and escaped metacharacters (`\.`, `\(`)
//! - `\d` digit, `\D` non-digit, `\w` word character, `\W` non-word, `\s` space
//! - `.` any printable ASCII character
//! - `[abc]`, `[a-z0-9]`, `[^...]` (negation picks from printable ASCII)
//! - `(a|b)` and `(?:a|b)` groups with alternation
//! - `?`, `*`, `+`, `{n}`, `{n,}`, `{n,m}`; unbounded repetition is capped
//! - `^` and `$` are accepted and ignored

use rand::Rng;
use thiserror::Error;

/// Extra repetitions allowed for `*`, `+` and `{n,}`.
pub const REPEAT_CAP: usize = 8;

/// Largest repetition count a `{n,m}` quantifier may ask for.
pub const MAX_REPEAT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// `[` without a closing `]`
    #[error("Unterminated character class starting at offset {0}")]
    UnterminatedClass(usize),

    /// A class that can never match anything
    #[error("Empty character class at offset {0}")]
    EmptyClass(usize),

    /// `z-a` style range
    #[error("Invalid character range '{start}-{end}'")]
    InvalidRange { start: char, end: char },

    /// Unmatched `(` or `)`
    #[error("Unbalanced group at offset {0}")]
    UnbalancedGroup(usize),

    /// Quantifier with nothing to repeat, or a malformed `{n,m}`
    #[error("Invalid quantifier at offset {0}")]
    InvalidQuantifier(usize),

    /// Trailing backslash
    #[error("Pattern ends with an incomplete escape")]
    DanglingEscape,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Empty,
    Literal(char),
    Set(Vec<char>),
    Group(Vec<Vec<Node>>),
    Repeat(Box<Node>, usize, usize),
}

/// A parsed pattern, reusable across draws.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    alternatives: Vec<Vec<Node>>,
}

impl Pattern {
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let mut parser = Parser {
            chars: source.chars().collect(),
            pos: 0,
        };
        let alternatives = parser.parse_alternation()?;
        if parser.pos < parser.chars.len() {
            // Only a stray ')' stops the top-level alternation early
            return Err(PatternError::UnbalancedGroup(parser.pos));
        }
        Ok(Self { alternatives })
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut out = String::new();
        render_alternatives(&self.alternatives, rng, &mut out);
        out
    }
}

/// Parse `pattern` and draw one matching string.
pub fn expand<R: Rng + ?Sized>(pattern: &str, rng: &mut R) -> Result<String, PatternError> {
    Ok(Pattern::parse(pattern)?.generate(rng))
}

// ============================================================================
// Character sets
// ============================================================================

fn printable() -> impl Iterator<Item = char> {
    (0x20u8..=0x7e).map(char::from)
}

fn digits() -> Vec<char> {
    ('0'..='9').collect()
}

fn word_chars() -> Vec<char> {
    ('a'..='z')
        .chain('A'..='Z')
        .chain('0'..='9')
        .chain(std::iter::once('_'))
        .collect()
}

fn non_digits() -> Vec<char> {
    ('a'..='z').chain('A'..='Z').collect()
}

fn non_word_chars() -> Vec<char> {
    vec![' ', '!', '@', '#', '$', '%', '&', '*', '-', '+', '=', '.', ',']
}

/// Set for a class escape (`\d`), or `None` for a plain escaped character.
fn escape_set(c: char) -> Option<Vec<char>> {
    match c {
        'd' => Some(digits()),
        'D' => Some(non_digits()),
        'w' => Some(word_chars()),
        'W' => Some(non_word_chars()),
        's' => Some(vec![' ']),
        _ => None,
    }
}

fn escape_literal(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn parse_alternation(&mut self) -> Result<Vec<Vec<Node>>, PatternError> {
        let mut alternatives = vec![self.parse_sequence()?];
        while self.peek() == Some('|') {
            self.pos += 1;
            alternatives.push(self.parse_sequence()?);
        }
        Ok(alternatives)
    }

    fn parse_sequence(&mut self) -> Result<Vec<Node>, PatternError> {
        let mut sequence = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let atom = self.parse_atom()?;
            let node = self.parse_quantifier(atom)?;
            sequence.push(node);
        }
        Ok(sequence)
    }

    fn parse_atom(&mut self) -> Result<Node, PatternError> {
        let start = self.pos;
        let Some(c) = self.next() else {
            return Ok(Node::Empty);
        };

        match c {
            '^' | '$' => Ok(Node::Empty),
            '.' => Ok(Node::Set(printable().collect())),
            '(' => {
                if self.peek() == Some('?') && self.chars.get(self.pos + 1) == Some(&':') {
                    self.pos += 2;
                }
                let alternatives = self.parse_alternation()?;
                if self.next() != Some(')') {
                    return Err(PatternError::UnbalancedGroup(start));
                }
                Ok(Node::Group(alternatives))
            }
            '[' => self.parse_class(start),
            '\\' => {
                let escaped = self.next().ok_or(PatternError::DanglingEscape)?;
                match escaped {
                    'b' | 'B' | 'A' | 'z' | 'Z' => Ok(Node::Empty),
                    other => Ok(escape_set(other)
                        .map(Node::Set)
                        .unwrap_or_else(|| Node::Literal(escape_literal(other)))),
                }
            }
            '*' | '+' | '?' => Err(PatternError::InvalidQuantifier(start)),
            other => Ok(Node::Literal(other)),
        }
    }

    fn parse_class(&mut self, start: usize) -> Result<Node, PatternError> {
        let negated = if self.peek() == Some('^') {
            self.pos += 1;
            true
        } else {
            false
        };

        let mut members: Vec<char> = Vec::new();
        let mut first = true;
        loop {
            let c = self
                .next()
                .ok_or(PatternError::UnterminatedClass(start))?;
            if c == ']' && !first {
                break;
            }
            first = false;

            let low = if c == '\\' {
                let escaped = self
                    .next()
                    .ok_or(PatternError::UnterminatedClass(start))?;
                if let Some(set) = escape_set(escaped) {
                    members.extend(set);
                    continue;
                }
                escape_literal(escaped)
            } else {
                c
            };

            let is_range = self.peek() == Some('-')
                && self.chars.get(self.pos + 1).map_or(false, |next| *next != ']');
            if is_range {
                self.pos += 1;
                let mut high = self
                    .next()
                    .ok_or(PatternError::UnterminatedClass(start))?;
                if high == '\\' {
                    let escaped = self
                        .next()
                        .ok_or(PatternError::UnterminatedClass(start))?;
                    high = escape_literal(escaped);
                }
                if high < low {
                    return Err(PatternError::InvalidRange {
                        start: low,
                        end: high,
                    });
                }
                members.extend(low..=high);
            } else {
                members.push(low);
            }
        }

        let set: Vec<char> = if negated {
            printable().filter(|c| !members.contains(c)).collect()
        } else {
            let mut unique = Vec::with_capacity(members.len());
            for c in members {
                if !unique.contains(&c) {
                    unique.push(c);
                }
            }
            unique
        };

        if set.is_empty() {
            return Err(PatternError::EmptyClass(start));
        }
        Ok(Node::Set(set))
    }

    fn parse_quantifier(&mut self, atom: Node) -> Result<Node, PatternError> {
        let start = self.pos;
        let (min, max) = match self.peek() {
            Some('?') => {
                self.pos += 1;
                (0, 1)
            }
            Some('*') => {
                self.pos += 1;
                (0, REPEAT_CAP)
            }
            Some('+') => {
                self.pos += 1;
                (1, 1 + REPEAT_CAP)
            }
            Some('{') if self.chars.get(self.pos + 1).map_or(false, char::is_ascii_digit) => {
                self.pos += 1;
                self.parse_braces(start)?
            }
            _ => return Ok(atom),
        };

        // Lazy and possessive suffixes do not change what can be generated
        if matches!(self.peek(), Some('?') | Some('+')) {
            self.pos += 1;
        }

        if matches!(atom, Node::Empty) {
            return Err(PatternError::InvalidQuantifier(start));
        }
        Ok(Node::Repeat(Box::new(atom), min, max))
    }

    fn parse_braces(&mut self, start: usize) -> Result<(usize, usize), PatternError> {
        let mut body = String::new();
        loop {
            match self.next() {
                Some('}') => break,
                Some(c) => body.push(c),
                None => return Err(PatternError::InvalidQuantifier(start)),
            }
        }

        let parse = |s: &str| {
            s.trim()
                .parse::<usize>()
                .map_err(|_| PatternError::InvalidQuantifier(start))
        };

        let (min, max) = match body.split_once(',') {
            None => {
                let n = parse(&body)?;
                (n, n)
            }
            Some((low, "")) => {
                let n = parse(low)?;
                (n, n.saturating_add(REPEAT_CAP))
            }
            Some((low, high)) => (parse(low)?, parse(high)?),
        };

        if max < min || min > MAX_REPEAT || max > MAX_REPEAT + REPEAT_CAP {
            return Err(PatternError::InvalidQuantifier(start));
        }
        Ok((min, max))
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render_alternatives<R: Rng + ?Sized>(alternatives: &[Vec<Node>], rng: &mut R, out: &mut String) {
    if alternatives.is_empty() {
        return;
    }
    let chosen = &alternatives[rng.gen_range(0..alternatives.len())];
    for node in chosen {
        render(node, rng, out);
    }
}

fn render<R: Rng + ?Sized>(node: &Node, rng: &mut R, out: &mut String) {
    match node {
        Node::Empty => {}
        Node::Literal(c) => out.push(*c),
        Node::Set(set) => out.push(set[rng.gen_range(0..set.len())]),
        Node::Group(alternatives) => render_alternatives(alternatives, rng, out),
        Node::Repeat(inner, min, max) => {
            let count = if min == max { *min } else { rng.gen_range(*min..=*max) };
            for _ in 0..count {
                render(inner, rng, out);
            }
        }
    }
}
