//! Version registry: tagged dispatch from version tag to engine binding

use luastate_core::{Error, LibraryFlagRegistry, LuaVersion, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::binding::EngineBinding;
use crate::lua::MluaBinding;

static GLOBAL: Lazy<VersionRegistry> = Lazy::new(VersionRegistry::with_builtin);

/// Maps version tags to engine bindings
#[derive(Default)]
pub struct VersionRegistry {
    /// Registered bindings by version
    bindings: RwLock<FxHashMap<LuaVersion, Arc<dyn EngineBinding>>>,
}

impl VersionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the binding compiled into this build
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(MluaBinding::new()));
        registry
    }

    /// Process-wide registry with the builtin binding
    pub fn global() -> &'static VersionRegistry {
        &GLOBAL
    }

    /// Register a binding, replacing any previous one for the same version
    pub fn register(&self, binding: Arc<dyn EngineBinding>) -> Option<Arc<dyn EngineBinding>> {
        let version = binding.version();
        debug!(%version, "registering engine binding");
        self.bindings.write().insert(version, binding)
    }

    /// Resolve a version tag
    pub fn resolve(&self, tag: &str) -> Result<Arc<dyn EngineBinding>> {
        self.resolve_version(LuaVersion::from_tag(tag)?)
    }

    /// Resolve a parsed version
    pub fn resolve_version(&self, version: LuaVersion) -> Result<Arc<dyn EngineBinding>> {
        if let Some(binding) = self.bindings.read().get(&version) {
            return Ok(Arc::clone(binding));
        }

        let available = self.available();
        let available = if available.is_empty() {
            "none".to_string()
        } else {
            available
                .iter()
                .map(|v| v.tag())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Err(Error::invalid_version(format!(
            "{} is not available in this build (available: {})",
            version, available
        )))
    }

    /// Library constants for a version tag
    pub fn libraries(&self, tag: &str) -> Result<LibraryFlagRegistry> {
        let binding = self.resolve(tag)?;
        Ok(LibraryFlagRegistry::for_version(binding.version()))
    }

    /// Versions with a registered binding, in tag order
    pub fn available(&self) -> Vec<LuaVersion> {
        let mut versions: Vec<LuaVersion> = self.bindings.read().keys().copied().collect();
        versions.sort();
        versions
    }

    /// Whether `version` can be constructed
    pub fn is_available(&self, version: LuaVersion) -> bool {
        self.bindings.read().contains_key(&version)
    }
}

impl fmt::Debug for VersionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionRegistry")
            .field("available", &self.available())
            .finish()
    }
}
