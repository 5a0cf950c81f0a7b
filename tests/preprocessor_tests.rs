// tests/preprocessor_tests.rs
use mscript_lang::{lex, preprocess, Script, TokenKind};

fn scripts(source: &str) -> Vec<Script> {
    preprocess(lex(source, None).unwrap()).unwrap()
}

fn error_message(source: &str) -> String {
    preprocess(lex(source, None).unwrap()).unwrap_err().message
}

// ============================================================================
// Alias Splitting
// ============================================================================

#[test]
fn test_single_alias() {
    let s = scripts("/greet $who = msg(concat('hello ', $who))\n");
    assert_eq!(s.len(), 1);
    let trigger: Vec<&str> = s[0].trigger.iter().map(|t| t.val()).collect();
    assert_eq!(trigger, vec!["/greet", "$who"]);
    assert_eq!(s[0].body[0].kind, TokenKind::FuncName);
}

#[test]
fn test_multiple_aliases() {
    let s = scripts("/a = msg('a')\n/b = msg('b')\n/c = msg('c')\n");
    assert_eq!(s.len(), 3);
    assert_eq!(s[1].trigger[0].val(), "/b");
}

#[test]
fn test_first_alias_end_splits() {
    // Later `=` tokens belong to the body.
    let s = scripts("/set = assign(@x = 1)\n");
    assert_eq!(s.len(), 1);
    assert!(s[0].body.iter().any(|t| t.kind == TokenKind::AliasEnd));
}

#[test]
fn test_blank_lines_between_aliases() {
    let s = scripts("\n\n/a = msg('a')\n\n\n/b = msg('b')\n\n");
    assert_eq!(s.len(), 2);
}

#[test]
fn test_trigger_with_optional_variable() {
    let s = scripts("/warp [$dest='home'] = msg($dest)\n");
    assert_eq!(s.len(), 1);
    let kinds: Vec<TokenKind> = s[0].trigger.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Command,
            TokenKind::LSquareBracket,
            TokenKind::Variable,
            TokenKind::OptVarAssign,
            TokenKind::String,
            TokenKind::RSquareBracket,
        ]
    );
}

// ============================================================================
// Multiline Regions
// ============================================================================

#[test]
fn test_multiline_body_joined() {
    let s = scripts("/cmd = >>>\nmsg('a')\nmsg('b')\n<<<\n");
    assert_eq!(s.len(), 1);
    assert!(s[0].body.iter().all(|t| t.kind != TokenKind::Newline));
    assert_eq!(s[0].body.first().map(|t| t.val()), Some("msg"));
}

#[test]
fn test_multiline_keeps_single_script() {
    let s = scripts("/a = >>>\ncode\n<<<\n/b = msg('b')\n");
    assert_eq!(s.len(), 2);
    assert_eq!(s[0].body.len(), 1);
    assert_eq!(s[0].body[0].val(), "code");
}

#[test]
fn test_multiline_start_requires_alias_end() {
    assert_eq!(
        error_message("/cmd = msg(1) >>>\n<<<\n"),
        "Multiline symbol must follow the alias_end token"
    );
}

#[test]
fn test_nested_multiline_start() {
    assert_eq!(
        error_message("/cmd = >>>\n>>>\n<<<\n"),
        "Did not expect a multiline start symbol here, are you missing a multiline end symbol above this line?"
    );
}

#[test]
fn test_multiline_end_without_start() {
    assert_eq!(
        error_message("/cmd = msg(1)\n<<<\n"),
        "Found multiline end symbol, and no multiline start found"
    );
}

#[test]
fn test_unterminated_multiline() {
    assert_eq!(
        error_message("/cmd = >>>\nmsg(1)\n"),
        "Expecting a multiline end symbol, but your last multiline alias appears to be missing one."
    );
}

// ============================================================================
// Line Continuations
// ============================================================================

#[test]
fn test_separator_continues_line() {
    let s = scripts("/cmd = msg('a') \\\nmsg('b')\n");
    assert_eq!(s.len(), 1);
    assert!(s[0].body.iter().all(|t| t.kind != TokenKind::Separator));
    assert!(s[0].body.iter().all(|t| t.kind != TokenKind::Newline));
    let names: Vec<&str> = s[0]
        .body
        .iter()
        .filter(|t| t.kind == TokenKind::FuncName)
        .map(|t| t.val())
        .collect();
    assert_eq!(names, vec!["msg", "msg"]);
}

#[test]
fn test_separator_without_newline_survives() {
    // Only the separator-then-newline pair is a continuation.
    let s = scripts("/cmd = concat('a' \\ 'b')\n");
    assert_eq!(s.len(), 1);
    assert!(s[0].body.iter().any(|t| t.kind == TokenKind::Separator));
}
