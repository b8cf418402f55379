//! Ambient type-declaration synthesis
//!
//! Each distinct (directory, query) module gets a type literal mirroring its
//! tree shape, keyed by the module tag (the last path segment of the virtual
//! id). The whole artifact is re-rendered from scratch on every change, with
//! entries sorted descending by tag, so repeated regenerations are
//! byte-stable when no module's shape changed.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::emit::escape_js_string;
use crate::tree::{DirNode, TreeNode};

/// Fixed artifact header; the artifact is created with just this at session
/// startup when missing
pub const DTS_HEADER: &str = "// Generated by dir2json - manual edits will be overwritten.\n";

const INDENT: &str = "  ";

/// Render the type literal for one built tree
///
/// Lazy leaves become zero-argument callables returning a promise of the
/// referenced file's module type, annotated with the artifact-relative path;
/// eager leaves have no meaningful static type and become `string`.
pub fn render_type(root: &DirNode, lazy: bool) -> String {
    let mut out = String::new();
    render_dir_type(root, 0, lazy, &mut out);
    out
}

fn render_dir_type(dir: &DirNode, depth: usize, lazy: bool, out: &mut String) {
    if dir.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    for (key, node) in dir.entries() {
        for _ in 0..=depth {
            out.push_str(INDENT);
        }
        let _ = write!(out, "\"{}\": ", escape_js_string(key));
        match node {
            TreeNode::Leaf(leaf) => match (lazy, &leaf.dts_path) {
                (true, Some(path)) => {
                    let _ = write!(
                        out,
                        "() => Promise<typeof import(\"{}\")>",
                        escape_js_string(path)
                    );
                }
                _ => out.push_str("string"),
            },
            TreeNode::Directory(sub) => render_dir_type(sub, depth + 1, lazy, out),
        }
        out.push_str(";\n");
    }
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push('}');
}

/// Registry of synthesized type literals, one per module tag
///
/// Owned by a build session; lives for the life of the process in a dev
/// server. Updates are idempotent overwrites, so a stale-then-fresh pair of
/// writes converges to the fresher result.
#[derive(Debug, Default)]
pub struct DtsRegistry {
    entries: BTreeMap<String, String>,
}

impl DtsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the literal for a module tag
    pub fn update(&mut self, tag: impl Into<String>, literal: String) {
        self.entries.insert(tag.into(), literal);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-render the whole artifact: header plus one ambient module
    /// declaration per entry, descending by tag
    pub fn render_artifact(&self) -> String {
        let mut out = String::from(DTS_HEADER);
        for (tag, literal) in self.entries.iter().rev() {
            let _ = write!(
                out,
                "\ndeclare module \"*{}\" {{\n{}const json: ",
                escape_js_string(tag),
                INDENT
            );
            out.push_str(&indent_literal(literal));
            out.push_str(";\n");
            out.push_str(INDENT);
            out.push_str("export default json;\n}\n");
        }
        out
    }
}

/// Shift a rendered literal one level right so it sits inside the module
/// declaration block
fn indent_literal(literal: &str) -> String {
    let mut lines = literal.lines();
    let mut out = String::new();
    if let Some(first) = lines.next() {
        out.push_str(first);
    }
    for line in lines {
        out.push('\n');
        out.push_str(INDENT);
        out.push_str(line);
    }
    out
}
