//! LuaState engine layer
//!
//! The runtime talks to Lua only through [`EngineBinding`] and
//! [`EngineInstance`]. [`VersionRegistry`] picks the binding for a version
//! tag. The bundled binding wraps `mlua` for whichever variant the crate
//! features select.

pub mod binding;
pub mod lua;
pub mod registry;

pub use binding::{EngineBinding, EngineInstance, Trampoline};
pub use lua::{LuaInstance, MluaBinding, COMPILED_VERSION};
pub use registry::VersionRegistry;
