//! Generated module source emission
//!
//! Renders a built tree into a self-contained source unit: one binding line
//! per placeholder (a static import in eager mode, a zero-argument dynamic
//! import thunk in lazy mode), then `export default <literal>;` where
//! directories become object literals and leaves become bare identifier
//! references to the bindings. The literal is rendered directly from the
//! tagged tree, so no serialize-then-unquote pass is needed.

use std::fmt::Write;

use crate::tree::{BuiltTree, DirNode, TreeNode};

/// Indent used for the tree literal (JSON-style, two spaces)
const INDENT: &str = "  ";

/// Render the generated module body
pub fn emit_module(tree: &BuiltTree, lazy: bool) -> String {
    let mut out = String::new();

    for binding in &tree.bindings {
        let path = escape_js_string(&binding.import_path);
        if lazy {
            let _ = writeln!(out, "const {} = () => import(\"{}\");", binding.ident, path);
        } else {
            let _ = writeln!(out, "import {} from \"{}\";", binding.ident, path);
        }
    }

    out.push_str("export default ");
    render_dir(&tree.root, 0, &mut out);
    out.push_str(";\n");
    out
}

fn render_dir(dir: &DirNode, depth: usize, out: &mut String) {
    if dir.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    let last = dir.len() - 1;
    for (i, (key, node)) in dir.entries().enumerate() {
        for _ in 0..=depth {
            out.push_str(INDENT);
        }
        let _ = write!(out, "\"{}\": ", escape_js_string(key));
        match node {
            TreeNode::Leaf(leaf) => out.push_str(&leaf.ident),
            TreeNode::Directory(sub) => render_dir(sub, depth + 1, out),
        }
        if i != last {
            out.push(',');
        }
        out.push('\n');
    }
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push('}');
}

/// Escape a string for use inside a double-quoted JS/JSON literal
pub fn escape_js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
