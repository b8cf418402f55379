//! dir2json - directory-to-module codegen engine
//!
//! Turns a directory tree into a virtual module whose default export mirrors
//! the tree, with every file leaf bound to a generated import (eager, or a
//! lazy dynamic-import thunk). A matching ambient `.d.ts` artifact is kept in
//! sync, and a debounced watcher rebuilds and notifies clients as the
//! directory changes during a development session.
//!
//! The host bundler owns module resolution and the live-update transport;
//! this crate owns everything between a virtual module identifier and the
//! generated text.

pub mod config;
pub mod dts;
pub mod emit;
pub mod error;
pub mod query;
pub mod session;
pub mod tree;
pub mod walk;
pub mod watcher;

// Re-exports for convenience
pub use config::{Dir2jsonConfig, DtsMode, DEFAULT_DTS_FILE};
pub use dts::{render_type, DtsRegistry, DTS_HEADER};
pub use emit::emit_module;
pub use error::{Dir2jsonError, Dir2jsonResult};
pub use query::{default_ext_filter, Query, QueryValue};
pub use session::{BuildSession, LoadOutcome, ModuleIdentity, ModuleState};
pub use tree::{BuiltTree, CollisionPolicy, DirNode, ImportBinding, Leaf, TreeBuilder, TreeNode};
pub use walk::{is_file_name, is_supported_ext, walk_dir};
pub use watcher::{watch, WatchEvent, WatchOptions, WatcherState, DEBOUNCE_MS};
