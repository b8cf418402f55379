//! Key-path tree construction
//!
//! Folds visited file entries into a nested tree of import placeholders. A
//! node is an explicit tagged variant: `Leaf` (a minted placeholder token) or
//! `Directory` (unique keys, encounter order preserved). Placeholder tokens
//! are minted as `__{counter}__{ext}__`, which is always a valid bare JS
//! identifier and globally unique within one build.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Dir2jsonError, Dir2jsonResult};
use crate::walk::{file_ext, file_key};

/// Key-collision policy for tree construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Extension-qualify colliding file keys; a file whose key is held by a
    /// directory is dropped and reported (default)
    #[default]
    Lenient,
    /// Any name collision at a file key fails the build
    Strict,
}

/// A file leaf: the minted placeholder identifier plus the data needed to
/// type it later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Minted placeholder token, emitted as a bare identifier
    pub ident: String,
    /// Extension tag recorded at mint time (no dot), used for key
    /// qualification
    pub ext: String,
    /// Path from the declaration artifact to the file (lazy mode only)
    pub dts_path: Option<String>,
}

/// One node of the key-path tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Leaf(Leaf),
    Directory(DirNode),
}

/// A directory node: unique keys, encounter-ordered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirNode {
    entries: Vec<(String, TreeNode)>,
    /// Base keys that have been extension-qualified; later files with the
    /// same base insert directly under their qualified key
    qualified: HashSet<String>,
}

impl DirNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        self.entries
            .iter()
            .find_map(|(k, node)| (k == key).then_some(node))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.entries.iter().map(|(k, node)| (k.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Replace-or-push, JS-assignment style
    fn set(&mut self, key: String, node: TreeNode) {
        match self.position(&key) {
            Some(pos) => self.entries[pos].1 = node,
            None => self.entries.push((key, node)),
        }
    }
}

/// One generated import binding, in mint order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Placeholder identifier the binding is bound to
    pub ident: String,
    /// Path emitted in the import statement
    pub import_path: String,
}

/// Completed tree plus the emission inputs gathered during construction
#[derive(Debug, Clone)]
pub struct BuiltTree {
    pub root: DirNode,
    pub bindings: Vec<ImportBinding>,
    /// Root-relative paths of files dropped under the lenient policy
    pub dropped: Vec<String>,
}

/// Folds file entries into a [`BuiltTree`]
///
/// Holds the explicit mint counter for one build invocation; traversal drives
/// a single `&mut TreeBuilder`, so insertion is single-writer by construction.
#[derive(Debug)]
pub struct TreeBuilder {
    root: DirNode,
    bindings: Vec<ImportBinding>,
    dropped: Vec<String>,
    counter: usize,
    policy: CollisionPolicy,
}

enum InsertOutcome {
    Inserted,
    Dropped,
}

impl TreeBuilder {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            root: DirNode::new(),
            bindings: Vec::new(),
            dropped: Vec::new(),
            counter: 0,
            policy,
        }
    }

    /// Insert one visited file
    ///
    /// `relative_path` is the file path minus the walked root prefix;
    /// `import_path` is the path the generated binding will import;
    /// `dts_path` is the artifact-relative path for lazy declaration leaves.
    pub fn insert(
        &mut self,
        relative_path: &str,
        import_path: String,
        dts_path: Option<String>,
    ) -> Dir2jsonResult<()> {
        let segments: Vec<&str> = relative_path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .collect();
        let Some((file_name, dir_segments)) = segments.split_last() else {
            return Ok(());
        };

        let ident = format!("__{}__{}__", self.counter, file_ext(file_name));
        let leaf = Leaf {
            ident: ident.clone(),
            ext: file_ext(file_name).to_string(),
            dts_path,
        };

        let outcome = insert_into(
            &mut self.root,
            dir_segments,
            file_name,
            leaf,
            self.policy,
            relative_path,
            &mut self.dropped,
        )?;

        if matches!(outcome, InsertOutcome::Inserted) {
            self.counter += 1;
            self.bindings.push(ImportBinding { ident, import_path });
        }
        Ok(())
    }

    pub fn finish(self) -> BuiltTree {
        BuiltTree {
            root: self.root,
            bindings: self.bindings,
            dropped: self.dropped,
        }
    }
}

fn insert_into(
    root: &mut DirNode,
    dir_segments: &[&str],
    file_name: &str,
    leaf: Leaf,
    policy: CollisionPolicy,
    relative_path: &str,
    dropped: &mut Vec<String>,
) -> Dir2jsonResult<InsertOutcome> {
    let mut current = root;

    for segment in dir_segments {
        let pos = match current.position(segment) {
            Some(pos) => {
                if matches!(current.entries[pos].1, TreeNode::Leaf(_)) {
                    // A file already claimed this key.
                    if policy == CollisionPolicy::Strict {
                        return Err(Dir2jsonError::KeyCollision {
                            path: relative_path.to_string(),
                        });
                    }
                    dropped.push(format!("{} (leaf replaced by directory)", segment));
                    current.entries[pos].1 = TreeNode::Directory(DirNode::new());
                }
                pos
            }
            None => {
                current
                    .entries
                    .push((segment.to_string(), TreeNode::Directory(DirNode::new())));
                current.entries.len() - 1
            }
        };
        current = match &mut current.entries[pos].1 {
            TreeNode::Directory(dir) => dir,
            TreeNode::Leaf(_) => unreachable!("leaf replaced above"),
        };
    }

    let base = file_key(file_name);

    // The base was qualified by an earlier collision: insert straight under
    // the qualified key so every colliding sibling ends up qualified.
    if current.qualified.contains(base) {
        let key = format!("{}{}", base, leaf.ext.to_uppercase());
        current.set(key, TreeNode::Leaf(leaf));
        return Ok(InsertOutcome::Inserted);
    }

    match current.position(base) {
        None => {
            current.entries.push((base.to_string(), TreeNode::Leaf(leaf)));
            Ok(InsertOutcome::Inserted)
        }
        Some(pos) => {
            if policy == CollisionPolicy::Strict {
                return Err(Dir2jsonError::KeyCollision {
                    path: relative_path.to_string(),
                });
            }
            match &current.entries[pos].1 {
                // A file cannot overwrite a directory: drop and report.
                TreeNode::Directory(_) => {
                    dropped.push(relative_path.to_string());
                    Ok(InsertOutcome::Dropped)
                }
                // Same base, different extension: qualify both keys.
                TreeNode::Leaf(existing) => {
                    let existing_key = format!("{}{}", base, existing.ext.to_uppercase());
                    current.entries[pos].0 = existing_key;
                    current.qualified.insert(base.to_string());

                    let key = format!("{}{}", base, leaf.ext.to_uppercase());
                    current.set(key, TreeNode::Leaf(leaf));
                    Ok(InsertOutcome::Inserted)
                }
            }
        }
    }
}
