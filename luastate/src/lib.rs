//! LuaState
//!
//! Embeds a Lua interpreter in a Rust host. It provides:
//! - A synchronous [`LuaState`] handle with reset and close
//! - Value marshalling between host values and Lua values, including
//!   sparse arrays and the zero-index slot
//! - Host callbacks exposed to scripts as global functions
//! - Per-version library selection through named sets or explicit lists
//!
//! ```no_run
//! use luastate::prelude::*;
//!
//! let mut state = LuaState::new(StateOptions::default())?;
//! state.register_event_listener("log", |args| {
//!     println!("{:?}", args);
//!     Ok(())
//! })?;
//! let values = state.do_string_sync("log('hi') return 5 + 5", None)?;
//! assert_eq!(values, vec![HostValue::Number(10.0)]);
//! # Ok::<(), luastate::Error>(())
//! ```

pub mod bridge;
pub mod config;
pub mod convert;
pub mod marshal;
pub mod state;

pub use bridge::{CallbackBridge, Listener};
pub use config::StateOptions;
pub use convert::{FromHostValue, IntoHostValue};
pub use state::{LuaState, StateStatus, DEFAULT_CHUNK_NAME};

/// Re-export core types
pub use luastate_core::{
    Error, HostArray, HostObject, HostValue, Library, LibraryFlagRegistry, LibraryFlags,
    LibrarySelection, LibrarySet, LuaVersion, PropertyKey, Result, RuntimeValue,
    MAX_NESTING_DEPTH,
};
pub use luastate_engine::{
    EngineBinding, EngineInstance, MluaBinding, VersionRegistry, COMPILED_VERSION,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        LuaState, StateOptions, StateStatus,
        Error, Result,
        HostValue, HostArray, HostObject, PropertyKey,
        Library, LibrarySet, LuaVersion,
        FromHostValue, IntoHostValue,
    };
}
