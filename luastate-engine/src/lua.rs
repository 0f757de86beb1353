//! `mlua` binding for the variant selected by Cargo features

use luastate_core::{
    Error, Library, LibraryFlags, LuaVersion, Result, RuntimeValue, MAX_NESTING_DEPTH,
};
use mlua::{Function, Lua, LuaOptions, MultiValue, StdLib, Value};
use rustc_hash::FxHashSet;
use std::ffi::c_void;
use tracing::{debug, trace};

use crate::binding::{EngineBinding, EngineInstance, Trampoline};

/// The variant `mlua` was compiled for
pub const COMPILED_VERSION: LuaVersion = if cfg!(feature = "lua54") {
    LuaVersion::Lua54
} else if cfg!(feature = "lua53") {
    LuaVersion::Lua53
} else if cfg!(feature = "lua52") {
    LuaVersion::Lua52
} else if cfg!(feature = "lua51") {
    LuaVersion::Lua51
} else {
    LuaVersion::LuaJit
};

/// Creates instances of the compiled variant
#[derive(Debug, Default, Clone, Copy)]
pub struct MluaBinding;

impl MluaBinding {
    pub fn new() -> Self {
        MluaBinding
    }
}

impl EngineBinding for MluaBinding {
    fn version(&self) -> LuaVersion {
        COMPILED_VERSION
    }

    fn create(&self, libraries: LibraryFlags) -> Result<Box<dyn EngineInstance>> {
        let stdlib = to_stdlib(libraries)?;
        let lua = if libraries.requires_unsafe() {
            // SAFETY: scripts get `debug`/`ffi` only when the selection names them explicitly.
            unsafe { Lua::unsafe_new_with(stdlib, LuaOptions::default()) }
        } else {
            Lua::new_with(stdlib, LuaOptions::default()).map_err(engine_error)?
        };

        debug!(version = %COMPILED_VERSION, %libraries, "created Lua instance");
        Ok(Box::new(LuaInstance { lua, libraries }))
    }
}

/// A live `mlua` state
pub struct LuaInstance {
    lua: Lua,
    libraries: LibraryFlags,
}

impl EngineInstance for LuaInstance {
    fn version(&self) -> LuaVersion {
        COMPILED_VERSION
    }

    fn libraries(&self) -> LibraryFlags {
        self.libraries
    }

    fn execute_string(&self, code: &[u8], chunk_name: &str) -> Result<Vec<RuntimeValue>> {
        trace!(chunk = chunk_name, bytes = code.len(), "executing chunk");
        let values: MultiValue = self
            .lua
            .load(code)
            .set_name(chunk_name)
            .call(())
            .map_err(engine_error)?;
        snapshot_all(values)
    }

    fn call_chunk(
        &self,
        code: &[u8],
        chunk_name: &str,
        args: Vec<RuntimeValue>,
    ) -> Result<Vec<RuntimeValue>> {
        trace!(chunk = chunk_name, args = args.len(), "calling chunk");
        let function: Function = self
            .lua
            .load(code)
            .set_name(chunk_name)
            .eval()
            .map_err(engine_error)?;
        let args = args
            .into_iter()
            .map(|arg| to_lua(&self.lua, arg))
            .collect::<Result<Vec<_>>>()?;
        let values: MultiValue = function
            .call(MultiValue::from_vec(args))
            .map_err(engine_error)?;
        snapshot_all(values)
    }

    fn get_global(&self, name: &str) -> Result<RuntimeValue> {
        let value: Value = self.lua.globals().get(name).map_err(engine_error)?;
        snapshot(value)
    }

    fn set_global(&self, name: &str, value: RuntimeValue) -> Result<()> {
        let value = to_lua(&self.lua, value)?;
        self.lua.globals().set(name, value).map_err(engine_error)
    }

    fn install_global_function(&self, name: &str, trampoline: Trampoline) -> Result<()> {
        let function = self
            .lua
            .create_function(move |_, args: MultiValue| {
                let args = snapshot_all(args).map_err(mlua::Error::external)?;
                trampoline(args).map_err(mlua::Error::external)
            })
            .map_err(engine_error)?;
        self.lua.globals().set(name, function).map_err(engine_error)
    }
}

impl Drop for LuaInstance {
    fn drop(&mut self) {
        debug!(version = %COMPILED_VERSION, libraries = %self.libraries, "destroying Lua instance");
    }
}

fn library_bit(library: Library) -> Option<StdLib> {
    match library {
        #[cfg(any(feature = "lua54", feature = "lua53", feature = "lua52"))]
        Library::Coroutine => Some(StdLib::COROUTINE),
        Library::Table => Some(StdLib::TABLE),
        Library::Io => Some(StdLib::IO),
        Library::Os => Some(StdLib::OS),
        Library::String => Some(StdLib::STRING),
        #[cfg(any(feature = "lua54", feature = "lua53"))]
        Library::Utf8 => Some(StdLib::UTF8),
        #[cfg(any(feature = "lua52", feature = "luajit"))]
        Library::Bit => Some(StdLib::BIT),
        Library::Math => Some(StdLib::MATH),
        Library::Package => Some(StdLib::PACKAGE),
        #[cfg(feature = "luajit")]
        Library::Jit => Some(StdLib::JIT),
        #[cfg(feature = "luajit")]
        Library::Ffi => Some(StdLib::FFI),
        Library::Debug => Some(StdLib::DEBUG),
        _ => None,
    }
}

fn to_stdlib(libraries: LibraryFlags) -> Result<StdLib> {
    let mut stdlib = StdLib::NONE;
    for library in libraries.iter() {
        stdlib |= library_bit(library).ok_or_else(|| Error::UnsupportedLibrary {
            library: library.name().to_string(),
            version: COMPILED_VERSION.tag(),
        })?;
    }
    Ok(stdlib)
}

/// Map an `mlua` failure onto the error taxonomy
pub(crate) fn engine_error(err: mlua::Error) -> Error {
    match err {
        mlua::Error::SyntaxError { message, .. } => Error::ScriptSyntax(message),
        mlua::Error::RuntimeError(message) | mlua::Error::MemoryError(message) => {
            Error::ScriptRuntime(message)
        }
        mlua::Error::SafetyError(message) => Error::Engine(message),
        err @ (mlua::Error::FromLuaConversionError { .. }
        | mlua::Error::ToLuaConversionError { .. }) => Error::Conversion(err.to_string()),
        err => Error::ScriptRuntime(err.to_string()),
    }
}

fn snapshot_all(values: MultiValue) -> Result<Vec<RuntimeValue>> {
    values.into_iter().map(snapshot).collect()
}

fn snapshot(value: Value) -> Result<RuntimeValue> {
    snapshot_nested(value, &mut FxHashSet::default())
}

/// `ancestors` holds the tables currently being walked, so its size is the
/// nesting depth.
#[allow(clippy::unnecessary_cast)]
fn snapshot_nested(
    value: Value,
    ancestors: &mut FxHashSet<*const c_void>,
) -> Result<RuntimeValue> {
    Ok(match value {
        Value::Nil => RuntimeValue::Nil,
        Value::Boolean(b) => RuntimeValue::Boolean(b),
        Value::Integer(i) => RuntimeValue::Integer(i as i64),
        Value::Number(n) => RuntimeValue::Number(n),
        Value::String(s) => RuntimeValue::String(s.as_bytes().to_vec()),
        Value::Table(table) => {
            let pointer = table.to_pointer();
            if ancestors.contains(&pointer) {
                return Err(Error::conversion("table contains a reference to itself"));
            }
            if ancestors.len() >= MAX_NESTING_DEPTH {
                return Err(Error::nesting_too_deep());
            }
            ancestors.insert(pointer);
            let mut entries = Vec::new();
            for pair in table.pairs::<Value, Value>() {
                let (key, value) = pair.map_err(engine_error)?;
                entries.push((
                    snapshot_nested(key, ancestors)?,
                    snapshot_nested(value, ancestors)?,
                ));
            }
            ancestors.remove(&pointer);
            RuntimeValue::Table(entries)
        }
        Value::Function(_) => RuntimeValue::Function,
        _ => RuntimeValue::UserData,
    })
}

fn to_lua(lua: &Lua, value: RuntimeValue) -> Result<Value> {
    to_lua_nested(lua, value, 0)
}

#[allow(clippy::unnecessary_cast)]
fn to_lua_nested(lua: &Lua, value: RuntimeValue, depth: usize) -> Result<Value> {
    Ok(match value {
        RuntimeValue::Nil => Value::Nil,
        RuntimeValue::Boolean(b) => Value::Boolean(b),
        RuntimeValue::Integer(i) => Value::Integer(i as mlua::Integer),
        RuntimeValue::Number(n) => Value::Number(n),
        RuntimeValue::String(bytes) => {
            Value::String(lua.create_string(&bytes).map_err(engine_error)?)
        }
        RuntimeValue::Table(entries) => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(Error::nesting_too_deep());
            }
            let table = lua.create_table().map_err(engine_error)?;
            for (key, value) in entries {
                match key {
                    RuntimeValue::Nil => return Err(Error::conversion("table key is nil")),
                    RuntimeValue::Number(n) if n.is_nan() => {
                        return Err(Error::conversion("table key is NaN"))
                    }
                    _ => {}
                }
                table
                    .raw_set(
                        to_lua_nested(lua, key, depth + 1)?,
                        to_lua_nested(lua, value, depth + 1)?,
                    )
                    .map_err(engine_error)?;
            }
            Value::Table(table)
        }
        other => {
            return Err(Error::conversion(format!(
                "a Lua {} cannot be recreated from a snapshot",
                other.type_name()
            )))
        }
    })
}

#[cfg(test)]
#[path = "lua_tests.rs"]
mod tests;
