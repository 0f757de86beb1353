//! Host callbacks exposed to scripts as global functions
//!
//! A listener runs synchronously on the script's call stack. Its arguments
//! go through [`marshal::from_runtime`](crate::marshal::from_runtime) in
//! call order, its result is never handed back to the script, and an error
//! aborts the chunk that made the call.

use luastate_core::{Error, HostValue, Result};
use luastate_engine::{EngineInstance, Trampoline};
use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

use crate::marshal;

/// Event listener signature
pub type Listener = Rc<dyn Fn(&[HostValue]) -> anyhow::Result<()>>;

/// Wrap a closure as a [`Listener`]
pub fn listener<F>(callback: F) -> Listener
where
    F: Fn(&[HostValue]) -> anyhow::Result<()> + 'static,
{
    Rc::new(callback)
}

/// Listener registrations belonging to one engine instance.
///
/// Dropped together with the instance, so nothing registered here outlives
/// a reset or close.
#[derive(Default)]
pub struct CallbackBridge {
    /// Registered listeners by global name
    listeners: FxHashMap<String, Listener>,
}

impl CallbackBridge {
    /// Create an empty bridge
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `listener` as the global function `name`, replacing any
    /// listener already registered under that name
    pub fn register(
        &mut self,
        engine: &dyn EngineInstance,
        name: &str,
        listener: Listener,
    ) -> Result<()> {
        engine.install_global_function(name, trampoline(name, Rc::clone(&listener)))?;

        if self.listeners.insert(name.to_string(), listener).is_some() {
            debug!(listener = name, "replaced event listener");
        } else {
            debug!(listener = name, "registered event listener");
        }
        Ok(())
    }

    /// Whether a listener is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.listeners.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.listeners.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for CallbackBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackBridge")
            .field("listeners", &self.names())
            .finish()
    }
}

fn trampoline(name: &str, listener: Listener) -> Trampoline {
    let name = name.to_string();
    Box::new(move |args| {
        let args = marshal::from_runtime_multi(args)?;
        trace!(listener = %name, args = args.len(), "dispatching event listener");
        listener(&args)
            .map_err(|err| Error::runtime(format!("event listener '{}' failed: {:#}", name, err)))
    })
}
