//! LuaState - the handle that owns one live Lua instance

use luastate_core::{
    Error, HostValue, LibraryFlagRegistry, LibraryFlags, LuaVersion, Result,
};
use luastate_engine::{EngineBinding, EngineInstance, VersionRegistry};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::bridge::{self, CallbackBridge};
use crate::config::StateOptions;
use crate::convert::{FromHostValue, IntoHostValue};
use crate::marshal;

/// Chunk name used when the caller gives none
pub const DEFAULT_CHUNK_NAME: &str = "?";

/// Lifecycle of a [`LuaState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateStatus {
    /// An instance is live
    Active,
    /// A reset could not create the replacement instance
    Failed,
    /// Closed for good
    Closed,
}

/// The live instance plus everything registered against it
struct ActiveInstance {
    engine: Box<dyn EngineInstance>,
    bridge: CallbackBridge,
}

enum Lifecycle {
    Active(ActiveInstance),
    Failed,
    Closed,
}

/// Handle to an embedded Lua runtime.
///
/// Every call runs synchronously on the calling thread. `reset` swaps in a
/// fresh instance with the same version and libraries, and `close` tears
/// the instance down for good; any later call fails with
/// [`Error::UseAfterClose`]. A reset whose replacement cannot be created
/// leaves the state [`StateStatus::Failed`]; calls then fail with
/// [`Error::Engine`] until a later `reset` succeeds.
pub struct LuaState {
    binding: Arc<dyn EngineBinding>,
    options: StateOptions,
    libraries: LibraryFlags,
    lifecycle: Lifecycle,
}

impl LuaState {
    /// Create a state from the process-wide version registry
    pub fn new(options: StateOptions) -> Result<Self> {
        Self::with_registry(options, VersionRegistry::global())
    }

    /// Create a state for `version` with the default libraries
    pub fn with_version(version: LuaVersion) -> Result<Self> {
        Self::new(StateOptions::new(version))
    }

    /// Create a state using bindings from `registry`
    pub fn with_registry(options: StateOptions, registry: &VersionRegistry) -> Result<Self> {
        let binding = registry.resolve_version(options.version)?;
        let libraries = LibraryFlagRegistry::for_version(binding.version())
            .resolve(options.libraries.as_ref())?;

        let mut state = Self {
            binding,
            options,
            libraries,
            lifecycle: Lifecycle::Closed,
        };
        state.lifecycle = Lifecycle::Active(state.instantiate()?);
        Ok(state)
    }

    fn instantiate(&self) -> Result<ActiveInstance> {
        let engine = self.binding.create(self.libraries)?;
        Ok(ActiveInstance {
            engine,
            bridge: CallbackBridge::new(),
        })
    }

    fn active(&self) -> Result<&ActiveInstance> {
        match &self.lifecycle {
            Lifecycle::Active(instance) => Ok(instance),
            Lifecycle::Failed => Err(failed_reset()),
            Lifecycle::Closed => Err(Error::UseAfterClose),
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveInstance> {
        match &mut self.lifecycle {
            Lifecycle::Active(instance) => Ok(instance),
            Lifecycle::Failed => Err(failed_reset()),
            Lifecycle::Closed => Err(Error::UseAfterClose),
        }
    }

    /// Run a chunk and return every value it returns, in order
    pub fn do_string_sync(
        &self,
        code: impl AsRef<[u8]>,
        chunk_name: Option<&str>,
    ) -> Result<Vec<HostValue>> {
        let instance = self.active()?;
        let values = instance
            .engine
            .execute_string(code.as_ref(), chunk_name.unwrap_or(DEFAULT_CHUNK_NAME))?;
        marshal::from_runtime_multi(values)
    }

    /// Run the chunk stored at `path`. The chunk name defaults to the path.
    pub fn do_file_sync(
        &self,
        path: impl AsRef<Path>,
        chunk_name: Option<&str>,
    ) -> Result<Vec<HostValue>> {
        let instance = self.active()?;
        let path = path.as_ref();
        let default_name;
        let chunk_name = match chunk_name {
            Some(name) => name,
            None => {
                default_name = format!("@{}", path.display());
                &default_name
            }
        };
        let values = instance.engine.execute_file(path, chunk_name)?;
        marshal::from_runtime_multi(values)
    }

    /// Evaluate `code` to a function and call it with `args`
    pub fn call_chunk(
        &self,
        code: impl AsRef<[u8]>,
        chunk_name: Option<&str>,
        args: Vec<HostValue>,
    ) -> Result<Vec<HostValue>> {
        let instance = self.active()?;
        let args = marshal::to_runtime_multi(args)?;
        let values = instance.engine.call_chunk(
            code.as_ref(),
            chunk_name.unwrap_or(DEFAULT_CHUNK_NAME),
            args,
        )?;
        marshal::from_runtime_multi(values)
    }

    /// Write a global into the current instance
    pub fn set_global(&self, name: &str, value: impl IntoHostValue) -> Result<()> {
        let instance = self.active()?;
        let value = marshal::to_runtime(value.into_host_value())?;
        instance.engine.set_global(name, value)
    }

    /// Read a global; unset globals are [`HostValue::Undefined`]
    pub fn get_global(&self, name: &str) -> Result<HostValue> {
        let instance = self.active()?;
        marshal::from_runtime(instance.engine.get_global(name)?)
    }

    /// Read a global and convert it to a Rust type
    pub fn get_global_as<T: FromHostValue>(&self, name: &str) -> Result<T> {
        T::from_host_value(&self.get_global(name)?)
    }

    /// Expose `callback` to scripts as the global function `name`.
    ///
    /// The callback runs synchronously inside the script call. Returning an
    /// error aborts the running chunk with [`Error::ScriptRuntime`].
    /// Registrations do not survive [`reset`](Self::reset).
    pub fn register_event_listener<F>(&mut self, name: &str, callback: F) -> Result<()>
    where
        F: Fn(&[HostValue]) -> anyhow::Result<()> + 'static,
    {
        let instance = self.active_mut()?;
        instance
            .bridge
            .register(instance.engine.as_ref(), name, bridge::listener(callback))
    }

    /// Whether a listener is registered under `name` on the current instance
    pub fn has_event_listener(&self, name: &str) -> bool {
        self.active()
            .map(|instance| instance.bridge.contains(name))
            .unwrap_or(false)
    }

    /// Names of the listeners on the current instance
    pub fn event_listeners(&self) -> Result<Vec<String>> {
        let instance = self.active()?;
        Ok(instance.bridge.names().into_iter().map(String::from).collect())
    }

    /// Replace the instance with a fresh one. All globals and listeners are gone.
    ///
    /// The old instance is destroyed first. If the replacement cannot be
    /// created the creation error is returned and the state is left
    /// [`StateStatus::Failed`]: every other call fails with [`Error::Engine`]
    /// until `reset` succeeds or the state is closed.
    pub fn reset(&mut self) -> Result<()> {
        if let Lifecycle::Closed = self.lifecycle {
            return Err(Error::UseAfterClose);
        }
        debug!(version = %self.version(), "resetting Lua state");

        self.lifecycle = Lifecycle::Failed;
        self.lifecycle = Lifecycle::Active(self.instantiate()?);
        Ok(())
    }

    /// Tear the instance down for good. A failed state can still be closed.
    pub fn close(&mut self) -> Result<()> {
        if let Lifecycle::Closed = self.lifecycle {
            return Err(Error::UseAfterClose);
        }
        debug!(version = %self.version(), "closing Lua state");
        self.lifecycle = Lifecycle::Closed;
        Ok(())
    }

    /// Current lifecycle state
    pub fn status(&self) -> StateStatus {
        match self.lifecycle {
            Lifecycle::Active(_) => StateStatus::Active,
            Lifecycle::Failed => StateStatus::Failed,
            Lifecycle::Closed => StateStatus::Closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status() == StateStatus::Closed
    }

    /// Version the state was created with
    pub fn version(&self) -> LuaVersion {
        self.binding.version()
    }

    /// Libraries loaded into every instance of this state
    pub fn libraries(&self) -> LibraryFlags {
        self.libraries
    }

    /// Options the state was created with
    pub fn options(&self) -> &StateOptions {
        &self.options
    }
}

fn failed_reset() -> Error {
    Error::engine("the last reset could not create a new instance; reset again or close")
}

impl fmt::Debug for LuaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("LuaState");
        debug
            .field("version", &self.version())
            .field("libraries", &self.libraries)
            .field("status", &self.status());
        if let Lifecycle::Active(instance) = &self.lifecycle {
            debug.field("listeners", &instance.bridge);
        }
        debug.finish()
    }
}
