//! Build session
//!
//! A `BuildSession` owns the process-lived state the pipeline needs: the
//! declaration registry, the watch-registration set and per-module states.
//! Hosts create one session per dev-server process and call `load` whenever
//! the bundler requests a virtual module's content.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::config::Dir2jsonConfig;
use crate::dts::{render_type, DtsRegistry};
use crate::emit::emit_module;
use crate::error::{Dir2jsonError, Dir2jsonResult};
use crate::query::Query;
use crate::tree::TreeBuilder;
use crate::walk::{relative_path, root_relative, walk_dir};
use crate::watcher::{self, WatchEvent, WatchOptions};

/// Identity of one virtual module: directory plus normalized query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    pub directory: PathBuf,
    pub query: String,
}

impl ModuleIdentity {
    /// Parse a virtual module identifier (`<directoryPath>?<queryString>`)
    pub fn parse(id: &str) -> Self {
        let (directory, query) = id.split_once('?').unwrap_or((id, ""));
        Self {
            directory: PathBuf::from(directory),
            query: Query::decode(query).normalized(),
        }
    }

    /// Canonical identifier string
    pub fn id(&self) -> String {
        format!("{}?{}", self.directory.display(), self.query)
    }

    /// Module tag: the last path segment of the identifier, used as the
    /// declaration-registry key and ambient module name suffix
    pub fn tag(&self) -> String {
        let name = self
            .directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}?{}", name, self.query)
    }
}

/// Lifecycle state of one virtual module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleState {
    #[default]
    Unloaded,
    Building,
    Ready,
    Failed,
}

/// Result of one successful build
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Generated module source
    pub code: String,
    /// Number of import bindings emitted
    pub bindings: usize,
    /// Root-relative paths dropped under the lenient collision policy
    pub dropped: Vec<String>,
}

/// One long-lived build session
pub struct BuildSession {
    root: PathBuf,
    config: Dir2jsonConfig,
    dts_file: Option<PathBuf>,
    registry: Mutex<DtsRegistry>,
    watched: Mutex<HashSet<(PathBuf, Vec<String>)>>,
    states: Mutex<HashMap<String, ModuleState>>,
}

impl BuildSession {
    /// Create a session rooted at the host project root
    ///
    /// When declaration generation is enabled and the artifact does not exist
    /// yet, it is created empty (header only) so editors pick it up at once.
    pub fn new(root: impl Into<PathBuf>, config: Dir2jsonConfig) -> Dir2jsonResult<Self> {
        let root = root.into();
        let dts_file = config.dts_file_path(&root);
        if let Some(path) = &dts_file {
            if !path.exists() {
                fs::write(path, DtsRegistry::new().render_artifact())?;
            }
        }
        Ok(Self {
            root,
            config,
            dts_file,
            registry: Mutex::new(DtsRegistry::new()),
            watched: Mutex::new(HashSet::new()),
            states: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Path of the declaration artifact, when generation is enabled
    pub fn dts_file(&self) -> Option<&PathBuf> {
        self.dts_file.as_ref()
    }

    /// Build one virtual module: walk, fold, emit, refresh declarations
    ///
    /// A failure aborts only this module's build; registry entries and watch
    /// registrations of other modules are untouched.
    pub fn load(&self, id: &str) -> Dir2jsonResult<LoadOutcome> {
        let identity = ModuleIdentity::parse(id);
        self.set_state(&identity, ModuleState::Building);

        let result = self.build(&identity);
        match &result {
            Ok(_) => self.set_state(&identity, ModuleState::Ready),
            Err(_) => self.set_state(&identity, ModuleState::Failed),
        }
        result
    }

    fn build(&self, identity: &ModuleIdentity) -> Dir2jsonResult<LoadOutcome> {
        let directory = &identity.directory;
        if !directory.is_dir() {
            return Err(Dir2jsonError::DirectoryNotFound {
                path: directory.clone(),
            });
        }

        let query = Query::decode(&identity.query);
        let ext_filter = query.effective_ext_filter(&self.config);
        let lazy = query.lazy();

        let mut builder = TreeBuilder::new(self.config.collisions);
        walk_dir(directory, &ext_filter, &mut |path, walk_root| {
            let key_path = root_relative(path, walk_root);
            let import_path = root_relative(path, &self.root);
            let dts_path = match (&self.dts_file, lazy) {
                (Some(dts_file), true) => Some(relative_path(dts_file, path)),
                _ => None,
            };
            builder.insert(&key_path, import_path, dts_path)
        })?;
        let built = builder.finish();

        let code = emit_module(&built, lazy);

        if let Some(dts_file) = &self.dts_file {
            let literal = render_type(&built.root, lazy);
            let mut registry = self.registry.lock().unwrap();
            registry.update(identity.tag(), literal);
            // Fire-and-forget: the artifact is advisory and fully re-rendered
            // on the next change.
            let _ = fs::write(dts_file, registry.render_artifact());
        }

        Ok(LoadOutcome {
            code,
            bindings: built.bindings.len(),
            dropped: built.dropped,
        })
    }

    /// Current lifecycle state of a module
    pub fn state(&self, id: &str) -> ModuleState {
        let identity = ModuleIdentity::parse(id);
        self.states
            .lock()
            .unwrap()
            .get(&identity.id())
            .copied()
            .unwrap_or_default()
    }

    /// Explicit reload request: restart the lifecycle at `Unloaded`
    pub fn reload(&self, id: &str) {
        let identity = ModuleIdentity::parse(id);
        self.set_state(&identity, ModuleState::Unloaded);
    }

    fn set_state(&self, identity: &ModuleIdentity, state: ModuleState) {
        self.states
            .lock()
            .unwrap()
            .insert(identity.id(), state);
    }

    /// Watch a module's directory and rebuild on debounced changes
    ///
    /// Registrations are deduplicated by (directory, sorted extension
    /// filter); a second registration for the same pair is a no-op returning
    /// `false`. After each rebuild the `notify` callback receives the module
    /// identifier; the host broadcasts it over its live-update channel as a
    /// payload-free reload signal.
    pub fn watch<N>(
        self: &Arc<Self>,
        id: &str,
        running: Arc<AtomicBool>,
        notify: N,
    ) -> Dir2jsonResult<bool>
    where
        N: Fn(&str) + Send + Sync + 'static,
    {
        let identity = ModuleIdentity::parse(id);
        let query = Query::decode(&identity.query);
        let ext_filter = query.effective_ext_filter(&self.config);

        let mut sorted_filter = ext_filter.clone();
        sorted_filter.sort();
        {
            let mut watched = self.watched.lock().unwrap();
            if !watched.insert((identity.directory.clone(), sorted_filter)) {
                return Ok(false);
            }
        }

        let session = Arc::clone(self);
        let options = WatchOptions::new(identity.directory.clone(), ext_filter);
        std::thread::spawn(move || {
            let module_id = identity.id();
            let _ = watcher::watch(options, running, move |event| {
                if let WatchEvent::Changed { .. } = event {
                    // Rebuild regardless of the current state: a directory
                    // that reappears recovers to Ready without a restart.
                    let _ = session.load(&module_id);
                    notify(&module_id);
                }
            });
        });
        Ok(true)
    }
}
