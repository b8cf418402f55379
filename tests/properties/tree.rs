//! Properties of key-path tree construction

use std::collections::HashSet;

use proptest::prelude::*;

use dir2json::tree::{CollisionPolicy, DirNode, TreeBuilder, TreeNode};

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,3}"
}

fn extension() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("png".to_string()),
        Just("jpg".to_string()),
        Just("svg".to_string()),
        Just("mp4".to_string()),
    ]
}

/// Directory prefixes plus per-file extensions; bases are minted from the
/// index so no two files share a key
fn distinct_files() -> impl Strategy<Value = Vec<(Vec<String>, String)>> {
    prop::collection::vec((prop::collection::vec(segment(), 0..3), extension()), 0..16)
}

fn collect_leaf_paths(dir: &DirNode, prefix: &str, out: &mut Vec<String>) {
    for (key, node) in dir.entries() {
        match node {
            TreeNode::Leaf(leaf) => out.push(format!("{prefix}/{key}.{}", leaf.ext)),
            TreeNode::Directory(sub) => {
                collect_leaf_paths(sub, &format!("{prefix}/{key}"), out)
            }
        }
    }
}

fn check_unique_keys(dir: &DirNode) {
    let mut seen = HashSet::new();
    for (key, node) in dir.entries() {
        assert!(seen.insert(key.to_string()), "duplicate key {key}");
        if let TreeNode::Directory(sub) = node {
            check_unique_keys(sub);
        }
    }
}

proptest! {
    /// Collision-free inputs survive the fold unchanged: the set of leaf
    /// paths read back from the tree equals the set inserted.
    #[test]
    fn prop_distinct_paths_round_trip(files in distinct_files()) {
        let mut builder = TreeBuilder::new(CollisionPolicy::Lenient);
        let mut inserted = HashSet::new();

        for (i, (dirs, ext)) in files.iter().enumerate() {
            let mut path = String::new();
            for dir in dirs {
                path.push('/');
                path.push_str(dir);
            }
            path.push_str(&format!("/f{i}.{ext}"));
            builder.insert(&path, path.clone(), None).unwrap();
            inserted.insert(path);
        }

        let built = builder.finish();
        prop_assert!(built.dropped.is_empty());
        prop_assert_eq!(built.bindings.len(), inserted.len());

        let mut recovered = Vec::new();
        collect_leaf_paths(&built.root, "", &mut recovered);
        let recovered: HashSet<String> = recovered.into_iter().collect();
        prop_assert_eq!(recovered, inserted);
    }

    /// Directory keys stay unique and binding idents stay globally unique,
    /// whatever collisions the input provokes.
    #[test]
    fn prop_lenient_fold_keeps_keys_unique(
        paths in prop::collection::vec("[a-z./]{1,12}", 0..24)
    ) {
        let mut builder = TreeBuilder::new(CollisionPolicy::Lenient);
        for path in &paths {
            // Lenient folds never fail, they drop.
            builder.insert(path, path.clone(), None).unwrap();
        }

        let built = builder.finish();
        check_unique_keys(&built.root);

        let idents: HashSet<&str> =
            built.bindings.iter().map(|b| b.ident.as_str()).collect();
        prop_assert_eq!(idents.len(), built.bindings.len());
    }

    /// Every file is accounted for: at most one binding per input, and any
    /// input without a binding left a drop report behind.
    #[test]
    fn prop_files_are_bound_or_reported(
        paths in prop::collection::vec("[a-z]{1,2}(/[a-z]{1,2}){0,2}\\.(png|jpg)", 0..16)
    ) {
        let mut builder = TreeBuilder::new(CollisionPolicy::Lenient);
        for path in &paths {
            builder.insert(path, path.clone(), None).unwrap();
        }

        let built = builder.finish();
        prop_assert!(built.bindings.len() <= paths.len());
        prop_assert!(built.bindings.len() + built.dropped.len() >= paths.len());
    }

    /// Two same-base files in one directory always end up under
    /// extension-qualified keys, never under the bare base.
    #[test]
    fn prop_same_base_siblings_are_qualified(base in "[a-z]{1,4}") {
        let mut builder = TreeBuilder::new(CollisionPolicy::Lenient);
        builder
            .insert(&format!("/{base}.png"), format!("/{base}.png"), None)
            .unwrap();
        builder
            .insert(&format!("/{base}.jpg"), format!("/{base}.jpg"), None)
            .unwrap();

        let built = builder.finish();
        prop_assert!(built.root.get(&base).is_none());
        let png_key = format!("{base}PNG");
        let jpg_key = format!("{base}JPG");
        prop_assert!(built.root.get(&png_key).is_some());
        prop_assert!(built.root.get(&jpg_key).is_some());
    }
}
