//! Capability interface every engine variant implements

use luastate_core::{LibraryFlags, LuaVersion, Result, RuntimeValue};
use std::fs;
use std::path::Path;

/// Native handler behind a script-visible global function.
///
/// Receives the call arguments in order. Returning an error aborts the
/// running chunk.
pub type Trampoline = Box<dyn Fn(Vec<RuntimeValue>) -> Result<()>>;

/// Factory for engine instances of one Lua variant
pub trait EngineBinding: Send + Sync {
    /// The variant this binding runs
    fn version(&self) -> LuaVersion;

    /// Create a fresh instance with exactly `libraries` loaded.
    ///
    /// Dropping the returned instance destroys it.
    fn create(&self, libraries: LibraryFlags) -> Result<Box<dyn EngineInstance>>;
}

/// One live interpreter state
pub trait EngineInstance {
    /// The variant of this instance
    fn version(&self) -> LuaVersion;

    /// Libraries loaded at creation
    fn libraries(&self) -> LibraryFlags;

    /// Run a chunk and collect everything it returns
    fn execute_string(&self, code: &[u8], chunk_name: &str) -> Result<Vec<RuntimeValue>>;

    /// Run the chunk stored at `path`
    fn execute_file(&self, path: &Path, chunk_name: &str) -> Result<Vec<RuntimeValue>> {
        let code = fs::read(path)?;
        self.execute_string(&code, chunk_name)
    }

    /// Evaluate a chunk to a function and call it with `args`
    fn call_chunk(
        &self,
        code: &[u8],
        chunk_name: &str,
        args: Vec<RuntimeValue>,
    ) -> Result<Vec<RuntimeValue>>;

    /// Read a global; unset globals are nil
    fn get_global(&self, name: &str) -> Result<RuntimeValue>;

    /// Write a global
    fn set_global(&self, name: &str, value: RuntimeValue) -> Result<()>;

    /// Expose `trampoline` to scripts as the global function `name`
    fn install_global_function(&self, name: &str, trampoline: Trampoline) -> Result<()>;
}
