//! Character-level lexer for MScript source text.
//!
//! The lexer is hand-written and stateful: a single forward scan with up
//! to two characters of lookahead, followed by one normalization pass
//! that absorbs unary signs, classifies bare words, and validates
//! operator adjacency. The punctuation recognition order below is
//! longest-match-first and load-bearing; reordering the guards changes
//! what source text means.

use crate::ast::{Target, Token, TokenKind};
use crate::error::CompileError;
use regex::Regex;
use std::sync::{Arc, LazyLock};

static VARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$[a-zA-Z0-9_]+$").unwrap());
static IVARIABLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[a-zA-Z0-9_]+$").unwrap());

/// Lex one compilation unit into an ordered token list.
///
/// The caller guarantees CRLF line endings are already normalized to LF
/// and that the text ends with a newline; the whole-file entry points in
/// [`crate::compiler`] do this. `source` is only used for error
/// attribution.
pub fn lex(text: &str, source: Option<Arc<str>>) -> Result<Vec<Token>, CompileError> {
    let raw = Lexer::new(text, source).run()?;
    normalize(raw)
}

struct Lexer {
    chars: Vec<char>,
    positions: Vec<(usize, usize)>,
    source: Option<Arc<str>>,
    tokens: Vec<Token>,
    buf: String,
    // Position of the first character in `buf`; None whenever `buf` is
    // empty, so flushed tokens point at their own start.
    buf_target: Option<Target>,
}

impl Lexer {
    fn new(text: &str, source: Option<Arc<str>>) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut positions = Vec::with_capacity(chars.len());
        let (mut line, mut column) = (1usize, 1usize);
        for &c in &chars {
            positions.push((line, column));
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Lexer {
            chars,
            positions,
            source,
            tokens: Vec::new(),
            buf: String::new(),
            buf_target: None,
        }
    }

    fn push_buf(&mut self, c: char, target: &Target) {
        if self.buf_target.is_none() {
            self.buf_target = Some(target.clone());
        }
        self.buf.push(c);
    }

    fn target(&self, i: usize) -> Target {
        let (line, column) = self
            .positions
            .get(i)
            .copied()
            .unwrap_or_else(|| match self.positions.last() {
                Some(&(l, c)) => (l, c + 1),
                None => (1, 1),
            });
        Target::new(line, column, self.source.clone())
    }

    /// End the pending bare word, if any, as an `Unknown` token.
    fn flush(&mut self, target: &Target) {
        if !self.buf.is_empty() {
            let value = std::mem::take(&mut self.buf);
            let at = self.buf_target.take().unwrap_or_else(|| target.clone());
            self.tokens.push(Token::new(TokenKind::Unknown, value, at));
        }
    }

    /// Flush the buffer and emit one punctuation/operator token.
    fn emit(&mut self, kind: TokenKind, value: &str, target: &Target) {
        self.flush(target);
        self.tokens.push(Token::new(kind, value, target.clone()));
    }

    fn run(mut self) -> Result<Vec<Token>, CompileError> {
        let mut in_quote = false;
        let mut in_smart_quote = false;
        let mut in_comment = false;
        let mut comment_is_block = false;
        let mut in_opt_var = false;
        let mut i = 0usize;
        let mut t = self.target(0);

        while i < self.chars.len() {
            let c = self.chars[i];
            let c2 = self.chars.get(i + 1).copied();
            let c3 = self.chars.get(i + 2).copied();
            t = self.target(i);

            // Comments run before everything else so that `/*` and `*/`
            // never reach the operator guards.
            if !in_comment && !in_quote && (c == '#' || (c == '/' && c2 == Some('*'))) {
                in_comment = true;
                if c == '/' {
                    comment_is_block = true;
                    i += 1;
                }
                i += 1;
                continue;
            }
            if in_comment {
                if comment_is_block {
                    if c == '*' && c2 == Some('/') {
                        in_comment = false;
                        comment_is_block = false;
                        i += 2;
                        continue;
                    }
                    i += 1;
                    continue;
                }
                if c != '\n' {
                    i += 1;
                    continue;
                }
                // A newline ends a line comment; it falls through to the
                // newline handling below.
            }

            if !in_quote {
                // Longest-match-first punctuation, in fixed order.
                if c == '-' && c2 == Some('>') {
                    self.emit(TokenKind::Deref, "->", &t);
                    i += 2;
                    continue;
                }
                if c == '+' && c2 == Some('+') {
                    self.emit(TokenKind::Increment, "++", &t);
                    i += 2;
                    continue;
                }
                if c == '-' && c2 == Some('-') {
                    self.emit(TokenKind::Decrement, "--", &t);
                    i += 2;
                    continue;
                }
                if c == '%' {
                    self.emit(TokenKind::Modulo, "%", &t);
                    i += 1;
                    continue;
                }
                if c == '*' {
                    // Block-comment close was consumed by the comment
                    // state machine above.
                    self.emit(TokenKind::Mult, "*", &t);
                    i += 1;
                    continue;
                }
                if c == '+' {
                    self.emit(TokenKind::Plus, "+", &t);
                    i += 1;
                    continue;
                }
                if c == '-' {
                    self.emit(TokenKind::Minus, "-", &t);
                    i += 1;
                    continue;
                }
                // A letter after `/` starts a command word instead.
                if c == '/' && !c2.is_some_and(|ch| ch.is_alphabetic()) {
                    self.emit(TokenKind::Div, "/", &t);
                    i += 1;
                    continue;
                }
                if c == '>' && c2 == Some('=') {
                    self.emit(TokenKind::Gte, ">=", &t);
                    i += 2;
                    continue;
                }
                if c == '<' && c2 == Some('=') {
                    self.emit(TokenKind::Lte, "<=", &t);
                    i += 2;
                    continue;
                }
                // Multiline markers must come before single < and >.
                if c == '<' && c2 == Some('<') && c3 == Some('<') {
                    self.emit(TokenKind::MultilineEnd, "<<<", &t);
                    i += 3;
                    continue;
                }
                if c == '>' && c2 == Some('>') && c3 == Some('>') {
                    self.emit(TokenKind::MultilineStart, ">>>", &t);
                    i += 3;
                    continue;
                }
                if c == '<' {
                    self.emit(TokenKind::Lt, "<", &t);
                    i += 1;
                    continue;
                }
                if c == '>' {
                    self.emit(TokenKind::Gt, ">", &t);
                    i += 1;
                    continue;
                }
                if c == '=' && c2 == Some('=') && c3 == Some('=') {
                    self.emit(TokenKind::StrictEquals, "===", &t);
                    i += 3;
                    continue;
                }
                if c == '!' && c2 == Some('=') && c3 == Some('=') {
                    self.emit(TokenKind::StrictNotEquals, "!==", &t);
                    i += 3;
                    continue;
                }
                if c == '=' && c2 == Some('=') {
                    self.emit(TokenKind::Equals, "==", &t);
                    i += 2;
                    continue;
                }
                if c == '!' && c2 == Some('=') {
                    self.emit(TokenKind::NotEquals, "!=", &t);
                    i += 2;
                    continue;
                }
                if c == '&' && c2 == Some('&') {
                    self.emit(TokenKind::LogicalAnd, "&&", &t);
                    i += 2;
                    continue;
                }
                if c == '|' && c2 == Some('|') {
                    self.emit(TokenKind::LogicalOr, "||", &t);
                    i += 2;
                    continue;
                }
                if c == '!' {
                    self.emit(TokenKind::LogicalNot, "!", &t);
                    i += 1;
                    continue;
                }
                if c == '&' {
                    self.emit(TokenKind::BitAnd, "&", &t);
                    i += 1;
                    continue;
                }
                if c == '|' {
                    self.emit(TokenKind::BitOr, "|", &t);
                    i += 1;
                    continue;
                }
                if c == '^' {
                    self.emit(TokenKind::BitXor, "^", &t);
                    i += 1;
                    continue;
                }
                if c == '.' && c2 == Some('.') {
                    self.emit(TokenKind::Slice, "..", &t);
                    i += 2;
                    continue;
                }
                // A digit after `.` keeps the dot inside a numeric
                // literal.
                if c == '.' && !c2.is_some_and(|ch| ch.is_ascii_digit()) {
                    self.emit(TokenKind::Deref, ".", &t);
                    i += 1;
                    continue;
                }
                if c == ':' && c2 == Some(':') {
                    self.emit(TokenKind::Deref, "::", &t);
                    i += 2;
                    continue;
                }
                if c == '[' {
                    self.emit(TokenKind::LSquareBracket, "[", &t);
                    in_opt_var = true;
                    i += 1;
                    continue;
                }
                // Plain `=` comes after == and ===.
                if c == '=' {
                    if in_opt_var {
                        self.emit(TokenKind::OptVarAssign, "=", &t);
                    } else {
                        self.emit(TokenKind::AliasEnd, "=", &t);
                    }
                    i += 1;
                    continue;
                }
                if c == ']' {
                    self.emit(TokenKind::RSquareBracket, "]", &t);
                    in_opt_var = false;
                    i += 1;
                    continue;
                }
                if c == ':' {
                    self.emit(TokenKind::LabelSep, ":", &t);
                    i += 1;
                    continue;
                }
                if c == ',' {
                    self.emit(TokenKind::Comma, ",", &t);
                    i += 1;
                    continue;
                }
                if c == '(' {
                    if !self.buf.is_empty() {
                        let value = std::mem::take(&mut self.buf);
                        let at = self.buf_target.take().unwrap_or_else(|| t.clone());
                        self.tokens.push(Token::new(TokenKind::FuncName, value, at));
                    } else {
                        // Promote a preceding bare word to a function
                        // name; a standalone parenthesis gets the
                        // identity function `p` tacked on.
                        match self.tokens.last_mut() {
                            Some(prev) if prev.kind == TokenKind::Unknown => {
                                prev.kind = TokenKind::FuncName;
                            }
                            _ => {
                                self.tokens
                                    .push(Token::new(TokenKind::FuncName, "p", t.clone()));
                            }
                        }
                    }
                    self.tokens
                        .push(Token::new(TokenKind::FuncStart, "(", t.clone()));
                    i += 1;
                    continue;
                }
                if c == ')' {
                    self.emit(TokenKind::FuncEnd, ")", &t);
                    i += 1;
                    continue;
                }
            }

            if c.is_whitespace() && !in_quote && c != '\n' {
                self.flush(&t);
                i += 1;
            } else if c == '\'' {
                if in_quote && !in_smart_quote {
                    let value = std::mem::take(&mut self.buf);
                    let at = self.buf_target.take().unwrap_or_else(|| t.clone());
                    self.tokens.push(Token::new(TokenKind::String, value, at));
                    in_quote = false;
                    i += 1;
                } else if !in_quote {
                    in_quote = true;
                    in_smart_quote = false;
                    self.flush(&t);
                    self.buf_target = Some(t.clone());
                    i += 1;
                } else {
                    self.push_buf('\'', &t);
                    i += 1;
                }
            } else if c == '"' {
                if in_quote && in_smart_quote {
                    // Smart strings are reserved syntax; reject them the
                    // moment one would close.
                    return Err(CompileError::new(
                        "Doubly quoted strings are not yet supported.",
                        t,
                    ));
                } else if !in_quote {
                    in_quote = true;
                    in_smart_quote = true;
                    self.flush(&t);
                    self.buf_target = Some(t.clone());
                    i += 1;
                } else {
                    self.push_buf('"', &t);
                    i += 1;
                }
            } else if c == '\\' {
                if in_quote {
                    match c2 {
                        Some('\\') => {
                            self.push_buf('\\', &t);
                            i += 2;
                        }
                        Some('\'') if !in_smart_quote => {
                            self.push_buf('\'', &t);
                            i += 2;
                        }
                        Some('"') if in_smart_quote => {
                            self.push_buf('"', &t);
                            i += 2;
                        }
                        Some('n') => {
                            self.push_buf('\n', &t);
                            i += 2;
                        }
                        Some('u') => {
                            let code = self.unicode_escape(i + 2, &t)?;
                            self.push_buf(code, &t);
                            i += 6;
                        }
                        other => {
                            // The escape set is intentionally closed so
                            // it can grow without breaking scripts.
                            let shown = other.map(String::from).unwrap_or_default();
                            return Err(CompileError::new(
                                format!(
                                    "The escape sequence \\{} is not a recognized escape sequence",
                                    shown
                                ),
                                t,
                            ));
                        }
                    }
                } else {
                    // Control character backslash; the bare word buffer
                    // is deliberately left alone.
                    self.tokens
                        .push(Token::new(TokenKind::Separator, "\\", t.clone()));
                    i += 1;
                }
            } else if in_quote {
                self.push_buf(c, &t);
                i += 1;
            } else if c == '\n' {
                self.flush(&t);
                self.tokens.push(Token::new(TokenKind::Newline, "\n", t.clone()));
                in_comment = false;
                comment_is_block = false;
                i += 1;
            } else {
                // Part of a literal.
                self.push_buf(c, &t);
                i += 1;
            }
        }

        if in_quote {
            return Err(CompileError::new("Unended string literal", t));
        }
        if in_comment || comment_is_block {
            return Err(CompileError::new("Unended comment", t));
        }
        Ok(self.tokens)
    }

    /// Resolve a `\uXXXX` escape starting at `start` (the first hex
    /// digit). Exactly four hex digits are required.
    fn unicode_escape(&self, start: usize, target: &Target) -> Result<char, CompileError> {
        let mut value: u32 = 0;
        for m in 0..4 {
            let digit = self
                .chars
                .get(start + m)
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| {
                    CompileError::new("Unrecognized unicode escape sequence", target.clone())
                })?;
            value = value * 16 + digit;
        }
        char::from_u32(value).ok_or_else(|| {
            CompileError::new("Unrecognized unicode escape sequence", target.clone())
        })
    }
}

/// One forward scan over the raw token list: absorb unary signs into
/// adjacent bare words, classify the remaining bare words, and reject
/// misplaced binary operators. Reclassified tokens are rebuilt rather
/// than mutated, so the raw list stays a pure function of the input.
fn normalize(mut tokens: Vec<Token>) -> Result<Vec<Token>, CompileError> {
    let mut i = 0usize;
    while i < tokens.len() {
        // Unary sign absorption. The out-of-range default two tokens
        // back counts as identifier-like, so `-1` at stream start keeps
        // its minus token while `x = -1` absorbs it.
        if tokens[i].kind == TokenKind::Unknown
            && i >= 2
            && tokens[i - 1].kind.is_plus_minus()
            && !tokens[i - 2].kind.is_identifier()
        {
            let sign = tokens.remove(i - 1);
            i -= 1;
            let merged = format!("{}{}", sign.value, tokens[i].value);
            tokens[i] = Token::new(TokenKind::Unknown, merged, tokens[i].target.clone());
        }

        if tokens[i].kind == TokenKind::Unknown {
            let kind = classify(tokens[i].val());
            tokens[i] = Token::new(kind, tokens[i].value.clone(), tokens[i].target.clone());
        }

        let kind = tokens[i].kind;
        let prev = if i >= 1 {
            tokens[i - 1].kind
        } else {
            TokenKind::Unknown
        };
        let next = tokens
            .get(i + 1)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Unknown);
        if kind.is_symbol() && !kind.is_unary() && !next.is_unary() {
            let misplaced = prev == TokenKind::FuncStart
                || prev == TokenKind::Comma
                || next == TokenKind::FuncEnd
                || next == TokenKind::Comma
                || prev.is_symbol()
                || next.is_symbol();
            if misplaced {
                return Err(CompileError::new(
                    format!("Unexpected symbol ({})", tokens[i].val()),
                    tokens[i].target.clone(),
                ));
            }
        }
        i += 1;
    }
    Ok(tokens)
}

fn classify(value: &str) -> TokenKind {
    if value.starts_with('/') {
        TokenKind::Command
    } else if value == "\\" {
        TokenKind::Separator
    } else if VARIABLE_PATTERN.is_match(value) {
        TokenKind::Variable
    } else if IVARIABLE_PATTERN.is_match(value) {
        TokenKind::IVariable
    } else if value == "$" {
        TokenKind::FinalVar
    } else {
        TokenKind::Lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source, None).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn escaped_quote_in_string() {
        let tokens = lex("'hello \\'world\\''\n", None).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].val(), "hello 'world'");
    }

    #[test]
    fn unary_minus_absorbed_after_alias_end() {
        let tokens = lex("x = -1\n", None).unwrap();
        let values: Vec<&str> = tokens.iter().map(|t| t.val()).collect();
        assert_eq!(values, vec!["x", "=", "-1", "\n"]);
    }

    #[test]
    fn subtraction_not_absorbed() {
        assert_eq!(
            kinds("a - 1\n"),
            vec![
                TokenKind::Lit,
                TokenKind::Minus,
                TokenKind::Lit,
                TokenKind::Newline
            ]
        );
    }
}
