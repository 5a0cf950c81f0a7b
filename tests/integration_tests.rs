// tests/integration_tests.rs
use mscript_lang::{
    compile_fragment, compile_source, to_json, to_text, CompiledScript, Construct, FunctionMap,
    TokenKind,
};

fn compile(source: &str) -> Vec<CompiledScript> {
    compile_source(source, None, &FunctionMap::standard()).unwrap()
}

// ============================================================================
// Whole-File Compilation
// ============================================================================

#[test]
fn test_single_alias_end_to_end() {
    let scripts = compile("/greet $who = msg(concat('hello ', $who))\n");
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0].trigger[0].val(), "/greet");
    assert_eq!(
        to_text(&scripts[0].tree),
        "p(msg(concat('hello ', $who)))"
    );
}

#[test]
fn test_multiple_aliases_compile_independently() {
    let scripts = compile(
        "/a = msg('first')\n\
         /b = msg('second')\n\
         /c $x = msg($x)\n",
    );
    assert_eq!(scripts.len(), 3);
    assert_eq!(to_text(&scripts[1].tree), "p(msg('second'))");
    assert_eq!(to_text(&scripts[2].tree), "p(msg($x))");
}

#[test]
fn test_multiline_alias_compiles() {
    let scripts = compile("/seq = >>>\nmsg('a')\nmsg('b')\n<<<\n");
    assert_eq!(scripts.len(), 1);
    // Adjacent top-level calls are loose siblings, so the wrapper close
    // concatenates them.
    assert_eq!(
        to_text(&scripts[0].tree),
        "p(__autoconcat__(msg('a'), msg('b')))"
    );
}

#[test]
fn test_crlf_input() {
    let scripts = compile("/a = msg('x')\r\n/b = msg('y')\r\n");
    assert_eq!(scripts.len(), 2);
}

#[test]
fn test_missing_trailing_newline() {
    // compile_source appends the newline itself.
    let scripts = compile("/a = msg('x')");
    assert_eq!(scripts.len(), 1);
}

#[test]
fn test_comments_between_aliases() {
    let scripts = compile(
        "# header comment\n\
         /a = msg('a')\n\
         /* block\n comment */\n\
         /b = msg('b')\n",
    );
    assert_eq!(scripts.len(), 2);
}

#[test]
fn test_trigger_tokens_survive_verbatim() {
    let scripts = compile("/warp [$dest='home'] $ = msg($dest)\n");
    let kinds: Vec<TokenKind> = scripts[0].trigger.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Command,
            TokenKind::LSquareBracket,
            TokenKind::Variable,
            TokenKind::OptVarAssign,
            TokenKind::String,
            TokenKind::RSquareBracket,
            TokenKind::FinalVar,
        ]
    );
}

#[test]
fn test_error_carries_source_name() {
    let err =
        compile_source("/a = mgs('x')\n", Some("alias.ms".into()), &FunctionMap::standard())
            .unwrap_err();
    assert_eq!(err.message, "The function \"mgs\" does not exist");
    assert_eq!(err.target.source.as_deref(), Some("alias.ms"));
    assert_eq!(err.to_string(), "The function \"mgs\" does not exist (alias.ms:1.6)");
}

#[test]
fn test_error_position_on_later_line() {
    let err = compile_source(
        "/a = msg('ok')\n/b = msg('unended\n",
        None,
        &FunctionMap::standard(),
    )
    .unwrap_err();
    assert_eq!(err.message, "Unended string literal");
}

// ============================================================================
// Fragment Compilation
// ============================================================================

#[test]
fn test_fragment_skips_alias_structure() {
    let tree = compile_fragment("msg(@arr[0])", None, &FunctionMap::standard()).unwrap();
    assert_eq!(to_text(&tree), "p(msg(array_get(@arr, __autoconcat__(0))))");
}

#[test]
fn test_fragment_with_newlines() {
    let tree = compile_fragment("msg('a')\nmsg('b')", None, &FunctionMap::standard()).unwrap();
    assert_eq!(to_text(&tree), "p(__autoconcat__(msg('a'), msg('b')))");
}

#[test]
fn test_fragment_agrees_with_whole_file() {
    let body = "msg(concat('a', @x))";
    let fragment = compile_fragment(body, None, &FunctionMap::standard()).unwrap();
    let scripts = compile(&format!("/cmd = {}\n", body));
    assert_eq!(to_text(&fragment), to_text(&scripts[0].tree));
}

// ============================================================================
// JSON Output
// ============================================================================

#[test]
fn test_json_shape() {
    let tree = compile_fragment("msg(-2)", None, &FunctionMap::standard()).unwrap();
    let value = to_json(&tree);
    assert_eq!(value["type"], "null");
    let p = &value["children"][0];
    assert_eq!(p["type"], "function");
    assert_eq!(p["name"], "p");
    assert_eq!(p["internal"], false);
    let msg = &p["children"][0];
    assert_eq!(msg["name"], "msg");
    assert_eq!(msg["children"][0]["type"], "int");
    assert_eq!(msg["children"][0]["value"], -2);
}

#[test]
fn test_json_slice_and_variable() {
    let tree = compile_fragment("msg(@arr[1..3], $who)", None, &FunctionMap::standard()).unwrap();
    let value = to_json(&tree);
    let msg = &value["children"][0]["children"][0];
    let get = &msg["children"][0];
    assert_eq!(get["name"], "array_get");
    assert_eq!(get["children"][1]["type"], "slice");
    assert_eq!(get["children"][1]["start"], 1);
    assert_eq!(get["children"][1]["finish"], 3);
    let who = &msg["children"][1];
    assert_eq!(who["type"], "variable");
    assert_eq!(who["name"], "$who");
    assert_eq!(who["final"], false);
}

// ============================================================================
// Custom Registries
// ============================================================================

#[test]
fn test_embedding_defines_its_own_functions() {
    let mut map = FunctionMap::standard();
    map.define("teleport", vec![mscript_lang::Arity::Exact(1)]);
    let scripts = compile_source("/tp $dest = teleport($dest)\n", None, &map).unwrap();
    assert_eq!(scripts.len(), 1);
    let err = compile_source("/tp = teleport()\n", None, &map).unwrap_err();
    assert_eq!(err.message, "Incorrect number of arguments passed to teleport");
}

#[test]
fn test_literal_classifier() {
    use mscript_lang::resolve_construct;
    assert_eq!(resolve_construct("null"), Construct::Null);
    assert_eq!(resolve_construct("true"), Construct::Boolean(true));
    assert_eq!(resolve_construct("-17"), Construct::Int(-17));
    assert_eq!(resolve_construct("2.5"), Construct::Double(2.5));
    assert_eq!(resolve_construct("NaN"), Construct::String("NaN".to_string()));
    assert_eq!(
        resolve_construct("12abc"),
        Construct::String("12abc".to_string())
    );
}
