//! Single-pass tree builder, plus the whole-pipeline entry points.
//!
//! The builder walks the token stream left to right exactly once,
//! maintaining an ancestor stack, a per-frame count of loose children
//! (leaves not yet claimed by a comma or call close), and a stack of
//! bracket subjects. There is no grammar and no backtracking; every
//! structural decision is made from the current token and one token of
//! context.

use crate::ast::{CallTag, Construct, NodeId, ParseTree, Target, Token, TokenKind, resolve_construct};
use crate::error::CompileError;
use crate::functions::FunctionRegistry;
use crate::lexer::lex;
use crate::preprocessor::preprocess;
use std::sync::Arc;

/// A fully compiled alias: its raw trigger tokens and its body tree.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    pub trigger: Vec<Token>,
    pub tree: ParseTree,
}

/// Compile a whole compilation unit: normalize line endings, lex,
/// preprocess into aliases, and build one tree per alias body.
pub fn compile_source(
    text: &str,
    source: Option<Arc<str>>,
    registry: &dyn FunctionRegistry,
) -> Result<Vec<CompiledScript>, CompileError> {
    let tokens = lex(&normalize_line_endings(text), source)?;
    let scripts = preprocess(tokens)?;
    scripts
        .into_iter()
        .map(|s| {
            let tree = compile(s.body, registry)?;
            Ok(CompiledScript {
                trigger: s.trigger,
                tree,
            })
        })
        .collect()
}

/// Compile a bare code fragment with no alias structure, e.g. for a
/// REPL. The preprocessor is skipped; newlines in the fragment are
/// ignored by the builder.
pub fn compile_fragment(
    text: &str,
    source: Option<Arc<str>>,
    registry: &dyn FunctionRegistry,
) -> Result<ParseTree, CompileError> {
    let tokens = lex(&normalize_line_endings(text), source)?;
    compile(tokens, registry)
}

fn normalize_line_endings(text: &str) -> String {
    let mut s = text.replace("\r\n", "\n");
    s.push('\n');
    s
}

/// Build a parse tree from one alias body (or fragment).
///
/// The stream is wrapped in a synthetic `p(...)` call so that top-level
/// adjacency gets the same autoconcat treatment as call arguments; the
/// returned tree's root is a null node whose single child is that call.
pub fn compile(
    tokens: Vec<Token>,
    registry: &dyn FunctionRegistry,
) -> Result<ParseTree, CompileError> {
    let mut stream = Vec::with_capacity(tokens.len() + 3);
    stream.push(Token::new(TokenKind::FuncName, "p", Target::unknown()));
    stream.push(Token::new(TokenKind::FuncStart, "(", Target::unknown()));
    stream.extend(tokens);
    stream.push(Token::new(TokenKind::FuncEnd, ")", Target::unknown()));

    let mut tree = ParseTree::new(Construct::Null, Target::unknown());
    let mut current = tree.root();
    let mut parents: Vec<NodeId> = vec![tree.root()];
    // Loose children per open frame, i.e. nodes added since the last
    // comma or frame open that no wrapper has claimed yet.
    let mut counts: Vec<usize> = vec![0];
    // Child index of each pending bracket subject; -1 marks "no subject"
    // at the bottom of the stack.
    let mut subjects: Vec<isize> = vec![-1];
    let mut parens: i32 = 0;
    let mut last_target = Target::unknown();

    let mut i = 0usize;
    while i < stream.len() {
        let kind = stream[i].kind;
        let target = stream[i].target.clone();
        last_target = target.clone();
        let prev1 = if i >= 1 {
            stream[i - 1].kind
        } else {
            TokenKind::Unknown
        };
        let next1 = stream
            .get(i + 1)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Unknown);

        // Label halves of `key: value` pairs. The separator is dropped
        // and the value lands as the label's next sibling.
        if next1 == TokenKind::LabelSep {
            let label = Construct::Label(Box::new(resolve_construct(stream[i].val())));
            tree.add_child(current, label, target);
            bump(&mut counts);
            i += 2;
            continue;
        }

        // Slice notation. Runs before bracket handling so that `[..`
        // opens a bracket with an empty lower bound instead of a
        // dangling subject.
        if next1 == TokenKind::Slice {
            let next2_val = stream.get(i + 2).map(|t| t.val().to_string());
            let slice;
            if kind == TokenKind::LSquareBracket {
                let finish = next2_val.as_deref().unwrap_or("");
                let slice_target = stream
                    .get(i + 2)
                    .map(|t| t.target.clone())
                    .unwrap_or_else(|| target.clone());
                slice = parse_slice("", finish, &slice_target)?;
                subjects.push(tree.child_count(current) as isize - 1);
                i += 1;
            } else if next2_val.as_deref() == Some("]") {
                slice = parse_slice(stream[i].val(), "", &target)?;
            } else {
                let finish = next2_val.unwrap_or_default();
                slice = parse_slice(stream[i].val(), &finish, &target)?;
                i += 1;
            }
            // Slices never bump the loose count.
            tree.add_child(current, slice, target);
            i += 2;
            continue;
        }

        match kind {
            TokenKind::LSquareBracket => {
                subjects.push(tree.child_count(current) as isize - 1);
            }
            TokenKind::RSquareBracket => {
                let empty_index = prev1 == TokenKind::LSquareBracket;
                if subjects.len() == 1 {
                    return Err(CompileError::new("Mismatched square bracket", target));
                }
                let subject = match subjects.pop() {
                    Some(s) => s,
                    None => return Err(CompileError::new("Mismatched square bracket", target)),
                };
                if subject < 0 {
                    return Err(CompileError::new(
                        "Missing value before square bracket",
                        target,
                    ));
                }
                let subject = subject as usize;
                if subject >= tree.child_count(current) {
                    return Err(CompileError::new("Mismatched square bracket", target));
                }
                // Everything after the subject becomes the index.
                let index_children = tree.split_children(current, subject + 1);
                let swallowed = index_children.len();
                let index_node = if empty_index {
                    tree.alloc(Construct::Slice { start: 0, finish: -1 }, target.clone())
                } else if index_children.len() == 1
                    && matches!(tree.construct(index_children[0]), Construct::Slice { .. })
                {
                    // Slice notation is already a complete index value;
                    // it skips the concatenation wrapper.
                    index_children[0]
                } else {
                    let concat = tree.alloc(autoconcat(), Target::unknown());
                    tree.set_children(concat, index_children);
                    concat
                };
                let removed = tree.split_children(current, subject);
                let subject_node = removed[0];
                let array_get = tree.alloc(
                    Construct::Function {
                        name: "array_get".to_string(),
                        tag: CallTag::for_name("array_get"),
                    },
                    target,
                );
                tree.attach(array_get, subject_node);
                tree.attach(array_get, index_node);
                tree.attach(current, array_get);
                // The swallowed index nodes no longer count as loose;
                // array_get itself replaces the subject, which was
                // already counted.
                if let Some(c) = counts.last_mut() {
                    *c = c.saturating_sub(swallowed);
                }
            }
            TokenKind::Deref => {
                return Err(CompileError::new(
                    format!(
                        "The '{}' symbol is not currently allowed in raw strings. You must quote all symbols.",
                        stream[i].val()
                    ),
                    target,
                ));
            }
            TokenKind::Lit | TokenKind::Unknown => {
                tree.add_child(current, resolve_construct(stream[i].val()), target);
                bump(&mut counts);
            }
            TokenKind::String | TokenKind::Command => {
                tree.add_child(
                    current,
                    Construct::String(stream[i].val().to_string()),
                    target,
                );
                bump(&mut counts);
            }
            TokenKind::IVariable => {
                tree.add_child(
                    current,
                    Construct::IVariable(stream[i].val().to_string()),
                    target,
                );
                bump(&mut counts);
            }
            TokenKind::Variable | TokenKind::FinalVar => {
                tree.add_child(
                    current,
                    Construct::Variable {
                        name: stream[i].val().to_string(),
                        is_final: kind == TokenKind::FinalVar,
                    },
                    target,
                );
                bump(&mut counts);
            }
            k if k.is_symbol() => {
                tree.add_child(
                    current,
                    Construct::Symbol {
                        text: stream[i].val().to_string(),
                        kind: k,
                    },
                    target,
                );
                bump(&mut counts);
            }
            TokenKind::FuncName => {
                let name = stream[i].val().to_string();
                let tag = CallTag::for_name(&name);
                if tag == CallTag::Checked && !registry.exists(&name) {
                    return Err(CompileError::new(
                        format!("The function \"{}\" does not exist", name),
                        target,
                    ));
                }
                let f = tree.add_child(current, Construct::Function { name, tag }, target);
                counts.push(0);
                parents.push(f);
                current = f;
            }
            TokenKind::FuncStart => {
                if prev1 != TokenKind::FuncName {
                    return Err(CompileError::new("Unexpected parenthesis", target));
                }
                parens += 1;
            }
            TokenKind::FuncEnd => {
                if parens < 0 {
                    return Err(CompileError::new("Unexpected parenthesis", target));
                }
                parens -= 1;
                parents.pop();
                let count = counts.last().copied().unwrap_or(0);
                if count > 1 {
                    splice_autoconcat(&mut tree, current, count);
                }
                if let Construct::Function { name, tag } = tree.construct(current) {
                    if *tag == CallTag::Checked {
                        let argc = tree.child_count(current);
                        let arities = registry.accepted_arities(name);
                        if !arities.iter().any(|a| a.accepts(argc)) {
                            return Err(CompileError::new(
                                format!("Incorrect number of arguments passed to {}", name),
                                tree.target(current).clone(),
                            ));
                        }
                    }
                }
                counts.pop();
                match counts.last_mut() {
                    Some(c) => *c += 1,
                    None => {
                        return Err(CompileError::new("Unexpected end parenthesis", target));
                    }
                }
                match parents.last() {
                    Some(&p) => current = p,
                    None => {
                        return Err(CompileError::new("Unexpected end parenthesis", target));
                    }
                }
            }
            TokenKind::Comma => {
                let count = counts.last().copied().unwrap_or(0);
                if count > 1 {
                    splice_autoconcat(&mut tree, current, count);
                }
                if let Some(c) = counts.last_mut() {
                    *c = 0;
                }
            }
            // Newlines, alias syntax, and multiline markers that survive
            // to this point carry no tree structure.
            _ => {}
        }
        i += 1;
    }

    if subjects.len() != 1 {
        return Err(CompileError::new(
            "Mismatched square brackets",
            last_target,
        ));
    }
    if parens != 0 {
        return Err(CompileError::new("Mismatched parenthesis", last_target));
    }
    Ok(tree)
}

fn bump(counts: &mut [usize]) {
    if let Some(c) = counts.last_mut() {
        *c += 1;
    }
}

fn autoconcat() -> Construct {
    Construct::Function {
        name: "__autoconcat__".to_string(),
        tag: CallTag::for_name("__autoconcat__"),
    }
}

/// Wrap the last `count` children of `node` in an `__autoconcat__`
/// call, in place.
fn splice_autoconcat(tree: &mut ParseTree, node: NodeId, count: usize) {
    let replace_at = tree.child_count(node).saturating_sub(count);
    let tail = tree.split_children(node, replace_at);
    let concat = tree.alloc(autoconcat(), Target::unknown());
    tree.set_children(concat, tail);
    tree.attach(node, concat);
}

/// Parse one side pair of slice notation; empty text defaults to the
/// open-ended bound for that side.
fn parse_slice(start: &str, finish: &str, target: &Target) -> Result<Construct, CompileError> {
    let parse = |text: &str, default: i64| -> Result<i64, CompileError> {
        if text.is_empty() {
            return Ok(default);
        }
        text.parse::<i64>().map_err(|_| {
            CompileError::new("Expecting an integer in slice notation", target.clone())
        })
    };
    Ok(Construct::Slice {
        start: parse(start, 0)?,
        finish: parse(finish, -1)?,
    })
}
