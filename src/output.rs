//! Read-only renderings of a compiled [`ParseTree`].

use crate::ast::{CallTag, Construct, NodeId, ParseTree};
use serde_json::{Value, json};

/// Render a tree in call notation, one line, e.g.
/// `msg(concat('hello ', $who))`.
pub fn to_text(tree: &ParseTree) -> String {
    let root = tree.root();
    // The root null node exists only to hold the synthetic wrapper.
    if tree.construct(root) == &Construct::Null && tree.child_count(root) == 1 {
        render(tree, tree.child_at(root, 0))
    } else {
        render(tree, root)
    }
}

fn render(tree: &ParseTree, id: NodeId) -> String {
    let head = tree.construct(id).to_string();
    if tree.child_count(id) == 0 && !tree.construct(id).is_function() {
        return head;
    }
    let args: Vec<String> = tree
        .children(id)
        .iter()
        .map(|&child| render(tree, child))
        .collect();
    format!("{}({})", head, args.join(", "))
}

/// Render a tree as JSON, one object per node with a `children` array.
pub fn to_json(tree: &ParseTree) -> Value {
    node_json(tree, tree.root())
}

fn node_json(tree: &ParseTree, id: NodeId) -> Value {
    let children: Vec<Value> = tree
        .children(id)
        .iter()
        .map(|&child| node_json(tree, child))
        .collect();
    let mut value = construct_json(tree.construct(id));
    if let Value::Object(map) = &mut value {
        map.insert("children".to_string(), Value::Array(children));
    }
    value
}

fn construct_json(construct: &Construct) -> Value {
    match construct {
        Construct::Null => json!({ "type": "null" }),
        Construct::Boolean(b) => json!({ "type": "boolean", "value": b }),
        Construct::Int(n) => json!({ "type": "int", "value": n }),
        Construct::Double(n) => json!({ "type": "double", "value": n }),
        Construct::String(s) => json!({ "type": "string", "value": s }),
        Construct::Array => json!({ "type": "array" }),
        Construct::Function { name, tag } => json!({
            "type": "function",
            "name": name,
            "internal": *tag == CallTag::Internal,
        }),
        Construct::Symbol { text, .. } => json!({ "type": "symbol", "value": text }),
        Construct::Slice { start, finish } => json!({
            "type": "slice",
            "start": start,
            "finish": finish,
        }),
        Construct::Label(inner) => json!({
            "type": "label",
            "value": construct_json(inner),
        }),
        Construct::Variable { name, is_final } => json!({
            "type": "variable",
            "name": name,
            "final": is_final,
        }),
        Construct::IVariable(name) => json!({ "type": "ivariable", "name": name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_fragment;
    use crate::functions::FunctionMap;

    fn tree_of(fragment: &str) -> ParseTree {
        compile_fragment(fragment, None, &FunctionMap::standard()).unwrap()
    }

    #[test]
    fn text_rendering_uses_call_notation() {
        let tree = tree_of("msg(concat('hello ', $who))");
        assert_eq!(to_text(&tree), "p(msg(concat('hello ', $who)))");
    }

    #[test]
    fn json_rendering_nests_children() {
        let tree = tree_of("msg(1)");
        let value = to_json(&tree);
        assert_eq!(value["type"], "null");
        let p = &value["children"][0];
        assert_eq!(p["name"], "p");
        let msg = &p["children"][0];
        assert_eq!(msg["name"], "msg");
        assert_eq!(msg["children"][0]["value"], 1);
    }
}
