//! Directory traversal
//!
//! Depth-first preorder walk over a root directory: an entry whose name
//! contains a `.` is a file and is visited when it passes the extension
//! filter; anything else is a directory and is recursed into immediately.
//! Entries are sorted by name so encounter order (and therefore collision
//! qualification and generated output) is deterministic across platforms.
//!
//! Symlink cycles are not defended against; a cycle eventually surfaces as an
//! IO error and fails that build only.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::Dir2jsonResult;

/// Whether a directory-entry name denotes a file (contains a `.`)
pub fn is_file_name(name: &str) -> bool {
    name.contains('.')
}

/// Default tree key for a file name: everything before the first `.`
pub fn file_key(name: &str) -> &str {
    name.split('.').next().unwrap_or("")
}

/// Extension tag for a file name: everything after the last `.`
pub fn file_ext(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or("")
}

/// Whether any filter entry is a substring of the file name
pub fn is_supported_ext(name: &str, ext_filter: &[String]) -> bool {
    ext_filter.iter().any(|ext| name.contains(ext.as_str()))
}

/// Walk `root` depth-first, invoking `visit(file_path, root)` per matched file
///
/// `root` is threaded unchanged through recursion so the callback can compute
/// paths relative to the original root at any depth. The traversal is
/// side-effect-driven; no entry list is materialized. IO failures mid-walk
/// propagate to the caller, who is responsible for verifying that `root`
/// exists beforehand.
pub fn walk_dir(
    root: &Path,
    ext_filter: &[String],
    visit: &mut dyn FnMut(&Path, &Path) -> Dir2jsonResult<()>,
) -> Dir2jsonResult<()> {
    walk_dir_recursive(root, root, ext_filter, visit)
}

fn walk_dir_recursive(
    current: &Path,
    root: &Path,
    ext_filter: &[String],
    visit: &mut dyn FnMut(&Path, &Path) -> Dir2jsonResult<()>,
) -> Dir2jsonResult<()> {
    let mut entries = fs::read_dir(current)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.file_name())
        .collect::<Vec<_>>();
    entries.sort();

    for file_name in entries {
        let name = file_name.to_string_lossy();
        let path = current.join(&file_name);
        if is_file_name(&name) {
            if is_supported_ext(&name, ext_filter) {
                visit(&path, root)?;
            }
        } else {
            walk_dir_recursive(&path, root, ext_filter, visit)?;
        }
    }
    Ok(())
}

/// Relative path from the directory containing `from_file` to `to_file`
///
/// Used to annotate lazy declaration leaves with a path editors can follow
/// back to the source file. Output always uses `/` separators and carries a
/// `./` prefix unless it already ascends with `..`.
pub fn relative_path(from_file: &Path, to_file: &Path) -> String {
    let from_dir = from_file.parent().unwrap_or(Path::new(""));
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = to_file.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = vec!["..".to_string(); from.len() - common];
    segments.extend(
        to[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    let joined = segments.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{}", joined)
    }
}

/// Root-relative form of an absolute path, with a leading `/`
///
/// Falls back to the absolute path when `path` is not under `root`.
pub fn root_relative(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => format!("/{}", normalize_separators(rel)),
        Err(_) => path.display().to_string(),
    }
}

fn normalize_separators(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(&component.as_os_str().to_string_lossy());
    }
    out
}
