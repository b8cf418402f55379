//! End-to-end tests for virtual module builds
//!
//! Each test lays out a real directory tree with `tempfile` and drives the
//! full pipeline through `BuildSession::load`.

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use dir2json::{
    BuildSession, CollisionPolicy, Dir2jsonConfig, Dir2jsonError, DtsMode, ModuleState,
};

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, []).unwrap();
}

fn no_dts_config() -> Dir2jsonConfig {
    Dir2jsonConfig {
        dts: DtsMode::Disabled,
        ..Default::default()
    }
}

#[test]
fn test_eager_build_binds_imports_and_qualifies_collisions() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    touch(&assets.join("home/logo.png"));
    touch(&assets.join("home/logo.jpg"));

    let session = BuildSession::new(&assets, no_dts_config()).unwrap();
    let outcome = session
        .load(&format!("{}?dir2json", assets.display()))
        .unwrap();

    assert_eq!(outcome.bindings, 2);
    assert!(outcome.dropped.is_empty());

    // Sorted walk: logo.jpg is encountered first and minted first.
    assert!(outcome
        .code
        .contains("import __0__jpg__ from \"/home/logo.jpg\";"));
    assert!(outcome
        .code
        .contains("import __1__png__ from \"/home/logo.png\";"));

    // Both leaves end up extension-qualified inside the home directory.
    assert!(outcome.code.contains("\"home\": {"));
    assert!(outcome.code.contains("\"logoJPG\": __0__jpg__"));
    assert!(outcome.code.contains("\"logoPNG\": __1__png__"));
    assert!(outcome.code.contains("export default {"));
}

#[test]
fn test_lazy_build_emits_thunks() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    touch(&assets.join("intro.mp4"));

    let session = BuildSession::new(&assets, no_dts_config()).unwrap();
    let outcome = session
        .load(&format!("{}?dir2json&lazy", assets.display()))
        .unwrap();

    assert!(outcome
        .code
        .contains("const __0__mp4__ = () => import(\"/intro.mp4\");"));
    assert!(outcome.code.contains("\"intro\": __0__mp4__"));
    assert!(!outcome.code.contains("import __0__mp4__ from"));
}

#[test]
fn test_default_filter_skips_unmatched_files() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    touch(&assets.join("logo.png"));
    touch(&assets.join("readme.txt"));

    let session = BuildSession::new(&assets, no_dts_config()).unwrap();
    let outcome = session
        .load(&format!("{}?dir2json", assets.display()))
        .unwrap();

    assert_eq!(outcome.bindings, 1);
    assert!(!outcome.code.contains("readme"));
}

#[test]
fn test_ext_query_overrides_default_filter() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    touch(&assets.join("anim.lottie"));
    touch(&assets.join("logo.png"));

    let session = BuildSession::new(&assets, no_dts_config()).unwrap();
    let outcome = session
        .load(&format!("{}?dir2json&ext=.lottie", assets.display()))
        .unwrap();

    assert_eq!(outcome.bindings, 1);
    assert!(outcome.code.contains("anim"));
    assert!(!outcome.code.contains("logo"));
}

#[test]
fn test_extg_query_resolves_host_groups() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    touch(&assets.join("anim.lottie"));
    touch(&assets.join("graph.dot"));
    touch(&assets.join("logo.png"));

    let mut config = no_dts_config();
    config
        .ext_group
        .insert("a".to_string(), vec![".lottie".to_string(), ".dot".to_string()]);

    let session = BuildSession::new(&assets, config).unwrap();
    let outcome = session
        .load(&format!("{}?dir2json&extg=a", assets.display()))
        .unwrap();

    assert_eq!(outcome.bindings, 2);
    assert!(!outcome.code.contains("logo"));
}

#[test]
fn test_rebuild_of_unchanged_directory_is_byte_identical() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    touch(&assets.join("h5/home/banner.png"));
    touch(&assets.join("h5/home/banner.jpg"));
    touch(&assets.join("h5/about.svg"));

    let session = BuildSession::new(&assets, Dir2jsonConfig::default()).unwrap();
    let id = format!("{}?dir2json", assets.display());

    let first = session.load(&id).unwrap();
    let first_dts = fs::read_to_string(session.dts_file().unwrap()).unwrap();

    let second = session.load(&id).unwrap();
    let second_dts = fs::read_to_string(session.dts_file().unwrap()).unwrap();

    assert_eq!(first.code, second.code);
    assert_eq!(first_dts, second_dts);
}

#[test]
fn test_dts_artifact_tracks_each_module_identity() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("icons/ok.svg"));
    touch(&root.join("media/intro.mp4"));

    let session = BuildSession::new(root, Dir2jsonConfig::default()).unwrap();
    session
        .load(&format!("{}/icons?dir2json", root.display()))
        .unwrap();
    session
        .load(&format!("{}/media?dir2json&lazy", root.display()))
        .unwrap();

    let artifact = fs::read_to_string(session.dts_file().unwrap()).unwrap();

    assert!(artifact.contains("declare module \"*icons?dir2json\""));
    assert!(artifact.contains("declare module \"*media?dir2json&lazy\""));
    assert!(artifact.contains("\"ok\": string;"));
    // Lazy leaves point back at the source file, relative to the artifact.
    assert!(artifact.contains("\"intro\": () => Promise<typeof import(\"./media/intro.mp4\")>;"));

    // Descending tag order: media before icons.
    let media = artifact.find("*media?dir2json&lazy").unwrap();
    let icons = artifact.find("*icons?dir2json").unwrap();
    assert!(media < icons);
}

#[test]
fn test_lenient_policy_reports_dropped_paths() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    touch(&assets.join("home/logo.png"));
    touch(&assets.join("home.png"));

    let session = BuildSession::new(&assets, no_dts_config()).unwrap();
    let outcome = session
        .load(&format!("{}?dir2json", assets.display()))
        .unwrap();

    // home.png loses to the home/ directory and is reported, not imported.
    assert_eq!(outcome.bindings, 1);
    assert_eq!(outcome.dropped.len(), 1);
    assert!(outcome.dropped[0].contains("home.png"));
}

#[test]
fn test_strict_policy_fails_the_build() {
    let dir = tempdir().unwrap();
    let assets = dir.path().join("assets");
    touch(&assets.join("a.png"));
    touch(&assets.join("a.jpg"));

    let config = Dir2jsonConfig {
        dts: DtsMode::Disabled,
        collisions: CollisionPolicy::Strict,
        ..Default::default()
    };
    let session = BuildSession::new(&assets, config).unwrap();
    let id = format!("{}?dir2json", assets.display());

    let err = session.load(&id).unwrap_err();
    assert!(matches!(err, Dir2jsonError::KeyCollision { .. }));
    assert_eq!(session.state(&id), ModuleState::Failed);
}

#[test]
fn test_failed_build_leaves_other_modules_untouched() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    touch(&root.join("icons/ok.svg"));

    let session = BuildSession::new(root, Dir2jsonConfig::default()).unwrap();
    let good = format!("{}/icons?dir2json", root.display());
    session.load(&good).unwrap();
    let artifact_before = fs::read_to_string(session.dts_file().unwrap()).unwrap();

    let bad = format!("{}/missing?dir2json", root.display());
    assert!(session.load(&bad).is_err());

    assert_eq!(session.state(&good), ModuleState::Ready);
    let artifact_after = fs::read_to_string(session.dts_file().unwrap()).unwrap();
    assert_eq!(artifact_before, artifact_after);
}
