//! Line-oriented tokenizer for host source files
//!
//! Splits the input into the handful of fixed tokens the extractor cares
//! about (the two macro names, parentheses and commas) and opaque runs of
//! everything else. Recognition is purely textual: the lexer knows nothing
//! about C comments, string literals or nesting.

use std::collections::VecDeque;
use std::fmt;

/// The two recognized macro spellings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroKind {
    /// `qoShaderCreateInfoGLSL(stage, src...)`
    ShaderCreateInfo,
    /// `qoCreateShaderGLSL(dev, stage, src...)`
    CreateShader,
}

impl MacroKind {
    pub fn name(self) -> &'static str {
        match self {
            MacroKind::ShaderCreateInfo => "qoShaderCreateInfoGLSL",
            MacroKind::CreateShader => "qoCreateShaderGLSL",
        }
    }

    /// Whether the invocation starts with a device argument before the stage
    pub fn takes_device(self) -> bool {
        matches!(self, MacroKind::CreateShader)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Macro(MacroKind),
    OpenParen,
    CloseParen,
    Comma,
    /// Run of unrecognized characters; never empty, may span lines
    Text(String),
}

impl Token {
    /// Source spelling of the token
    pub fn as_str(&self) -> &str {
        match self {
            Token::Macro(kind) => kind.name(),
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::Comma => ",",
            Token::Text(text) => text,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed tokens in match priority order
const FIXED: [(&str, Token); 5] = [
    ("qoShaderCreateInfoGLSL", Token::Macro(MacroKind::ShaderCreateInfo)),
    ("qoCreateShaderGLSL", Token::Macro(MacroKind::CreateShader)),
    ("(", Token::OpenParen),
    (")", Token::CloseParen),
    (",", Token::Comma),
];

/// Match a fixed token anchored at the start of `rest`
fn match_fixed(rest: &str) -> Option<(usize, Token)> {
    FIXED
        .iter()
        .find(|(spelling, _)| rest.starts_with(spelling))
        .map(|(spelling, token)| (spelling.len(), token.clone()))
}

/// Characters that can begin a fixed token
fn may_start_fixed(c: char) -> bool {
    matches!(c, '(' | ')' | ',' | 'q')
}

/// Lazy token stream over the input's lines.
///
/// The line counter starts at 1 and only advances once a line has been
/// fully scanned. The lexer stops right after producing a token, so while
/// a caller handles a token, [`Lexer::line`] still names the line it came from.
pub struct Lexer<'a> {
    lines: std::str::SplitInclusive<'a, char>,
    current: &'a str,
    pos: usize,
    pending: String,
    queued: VecDeque<Token>,
    line: usize,
    started: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            lines: input.split_inclusive('\n'),
            current: "",
            pos: 0,
            pending: String::new(),
            queued: VecDeque::new(),
            line: 1,
            started: false,
        }
    }

    /// Current line number (1-based)
    pub fn line(&self) -> usize {
        self.line
    }

    /// Scan the rest of the current line for the next fixed token.
    ///
    /// Text before the match is folded into `pending`; returns false once
    /// the line is exhausted.
    fn scan_line(&mut self) -> bool {
        while self.pos < self.current.len() {
            let rest = &self.current[self.pos..];
            let Some(offset) = rest.find(may_start_fixed) else {
                break;
            };

            let candidate = &rest[offset..];
            match match_fixed(candidate) {
                Some((len, token)) => {
                    self.pending.push_str(&rest[..offset]);
                    self.pos += offset + len;
                    if !self.pending.is_empty() {
                        self.queued
                            .push_back(Token::Text(std::mem::take(&mut self.pending)));
                    }
                    self.queued.push_back(token);
                    return true;
                }
                None => {
                    // Not a token after all; keep the character as text
                    let skip = offset + candidate.chars().next().map_or(1, char::len_utf8);
                    self.pending.push_str(&rest[..skip]);
                    self.pos += skip;
                }
            }
        }

        self.pending.push_str(&self.current[self.pos..]);
        self.pos = self.current.len();
        false
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.queued.pop_front() {
                return Some(token);
            }

            if self.scan_line() {
                continue;
            }

            match self.lines.next() {
                Some(line) => {
                    // Previous line is done; the very first call has none
                    if self.started {
                        self.line += 1;
                    }
                    self.current = line;
                    self.pos = 0;
                    self.started = true;
                }
                None => {
                    self.current = "";
                    self.pos = 0;
                    if self.pending.is_empty() {
                        return None;
                    }
                    return Some(Token::Text(std::mem::take(&mut self.pending)));
                }
            }
        }
    }
}
