//! Token-stream preprocessing between the lexer and the tree builder.
//!
//! Four passes, in order: collapse newline runs, resolve `>>> ... <<<`
//! multiline regions, remove separator/newline continuations, and split
//! the stream into alias definitions. Each pass consumes the previous
//! pass's output, so later passes never see the syntax earlier passes
//! erase.

use crate::ast::{Target, Token, TokenKind};
use crate::error::CompileError;

/// One alias definition: the command pattern to the left of the first
/// `=` and the code to the right of it.
#[derive(Debug, Clone)]
pub struct Script {
    pub trigger: Vec<Token>,
    pub body: Vec<Token>,
}

/// Split a lexed compilation unit into per-alias token lists.
pub fn preprocess(tokens: Vec<Token>) -> Result<Vec<Script>, CompileError> {
    let collapsed = collapse_newlines(tokens);
    let resolved = resolve_multilines(collapsed)?;
    let joined = remove_continuations(resolved);
    Ok(split_aliases(joined))
}

/// Runs of newline tokens carry no meaning; keep only the first of each
/// run and drop a leading newline entirely.
fn collapse_newlines(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.kind == TokenKind::Newline
            && out.last().map(|t| t.kind) == Some(TokenKind::Newline)
        {
            continue;
        }
        out.push(token);
    }
    if out.first().map(|t| t.kind) == Some(TokenKind::Newline) {
        out.remove(0);
    }
    out
}

/// Erase `>>>`/`<<<` markers and every newline between them. A region
/// may only open immediately after an alias `=`; everywhere else both
/// markers are errors.
fn resolve_multilines(tokens: Vec<Token>) -> Result<Vec<Token>, CompileError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut inside = false;
    let mut last_target = Target::unknown();
    let mut it = tokens.into_iter().peekable();
    while let Some(token) = it.next() {
        last_target = token.target.clone();
        if token.kind == TokenKind::AliasEnd
            && it.peek().map(|t| t.kind) == Some(TokenKind::MultilineStart)
        {
            it.next();
            inside = true;
            out.push(token);
            continue;
        }
        match token.kind {
            TokenKind::MultilineEnd => {
                if !inside {
                    return Err(CompileError::new(
                        "Found multiline end symbol, and no multiline start found",
                        token.target,
                    ));
                }
                inside = false;
            }
            TokenKind::MultilineStart => {
                if inside {
                    return Err(CompileError::new(
                        "Did not expect a multiline start symbol here, are you missing a multiline end symbol above this line?",
                        token.target,
                    ));
                }
                return Err(CompileError::new(
                    "Multiline symbol must follow the alias_end token",
                    token.target,
                ));
            }
            TokenKind::Newline if inside => {}
            _ => out.push(token),
        }
    }
    if inside {
        return Err(CompileError::new(
            "Expecting a multiline end symbol, but your last multiline alias appears to be missing one.",
            last_target,
        ));
    }
    Ok(out)
}

/// A separator followed directly by a newline continues the alias on
/// the next line; both tokens disappear.
fn remove_continuations(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut it = tokens.into_iter().peekable();
    while let Some(token) = it.next() {
        if token.kind == TokenKind::Separator
            && it.peek().map(|t| t.kind) == Some(TokenKind::Newline)
        {
            it.next();
            continue;
        }
        out.push(token);
    }
    out
}

/// Cut the stream into (trigger, body) records. The first `=` of a
/// record switches sides, a newline closes it, and the delimiters
/// themselves are dropped. Trailing tokens with no closing newline are
/// discarded, which the lexer's guaranteed trailing newline prevents
/// from happening for whole-file input.
fn split_aliases(tokens: Vec<Token>) -> Vec<Script> {
    let mut scripts = Vec::new();
    let mut trigger: Vec<Token> = Vec::new();
    let mut body: Vec<Token> = Vec::new();
    let mut in_trigger = true;
    for token in tokens {
        if in_trigger {
            if token.kind == TokenKind::AliasEnd {
                in_trigger = false;
            } else {
                trigger.push(token);
            }
        } else if token.kind == TokenKind::Newline {
            in_trigger = true;
            scripts.push(Script {
                trigger: std::mem::take(&mut trigger),
                body: std::mem::take(&mut body),
            });
        } else {
            body.push(token);
        }
    }
    scripts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn scripts(source: &str) -> Vec<Script> {
        preprocess(lex(source, None).unwrap()).unwrap()
    }

    #[test]
    fn single_alias_splits_at_first_alias_end() {
        let s = scripts("/cmd = msg('hi')\n");
        assert_eq!(s.len(), 1);
        assert_eq!(s[0].trigger[0].val(), "/cmd");
        assert_eq!(s[0].body[0].val(), "msg");
    }

    #[test]
    fn multiline_region_joins_lines() {
        let s = scripts("/cmd = >>>\nmsg('a')\nmsg('b')\n<<<\n");
        assert_eq!(s.len(), 1);
        let newlines = s[0]
            .body
            .iter()
            .filter(|t| t.kind == TokenKind::Newline)
            .count();
        assert_eq!(newlines, 0);
    }

    #[test]
    fn multiline_start_must_follow_alias_end() {
        let err = preprocess(lex("/cmd = msg(1) >>>\n<<<\n", None).unwrap()).unwrap_err();
        assert_eq!(err.message, "Multiline symbol must follow the alias_end token");
    }

    #[test]
    fn unterminated_multiline_region() {
        let err = preprocess(lex("/cmd = >>>\nmsg(1)\n", None).unwrap()).unwrap_err();
        assert!(err.message.starts_with("Expecting a multiline end symbol"));
    }
}
