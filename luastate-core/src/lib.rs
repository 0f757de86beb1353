//! LuaState core
//!
//! Types shared by the engine binding and the public runtime:
//! - Value models for the Lua side and the host side
//! - The error taxonomy
//! - Library flags and the per-version library registry

pub mod error;
pub mod library;
pub mod registry;
pub mod value;
pub mod version;

pub use error::{Error, Result};
pub use library::{Library, LibraryFlags, LibrarySelection, LibrarySet};
pub use registry::LibraryFlagRegistry;
pub use value::{
    HostArray, HostObject, HostValue, PropertyKey, RuntimeValue, TableEntries, MAX_NESTING_DEPTH,
};
pub use version::LuaVersion;
