//! Version tags for the supported Lua variants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::library::Library;

/// A Lua variant an engine binding can implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LuaVersion {
    /// PUC Lua 5.1
    #[serde(rename = "lua51")]
    Lua51,
    /// PUC Lua 5.2
    #[serde(rename = "lua52")]
    Lua52,
    /// PUC Lua 5.3
    #[serde(rename = "lua53")]
    Lua53,
    /// PUC Lua 5.4
    #[serde(rename = "lua54")]
    Lua54,
    /// LuaJIT 2.1
    #[serde(rename = "luajit")]
    LuaJit,
}

const LUA51_LIBRARIES: &[Library] = &[
    Library::Table,
    Library::Io,
    Library::Os,
    Library::String,
    Library::Math,
    Library::Package,
    Library::Debug,
];

const LUA52_LIBRARIES: &[Library] = &[
    Library::Coroutine,
    Library::Table,
    Library::Io,
    Library::Os,
    Library::String,
    Library::Bit,
    Library::Math,
    Library::Package,
    Library::Debug,
];

const LUA53_LIBRARIES: &[Library] = &[
    Library::Coroutine,
    Library::Table,
    Library::Io,
    Library::Os,
    Library::String,
    Library::Utf8,
    Library::Math,
    Library::Package,
    Library::Debug,
];

const LUA54_LIBRARIES: &[Library] = LUA53_LIBRARIES;

const LUAJIT_LIBRARIES: &[Library] = &[
    Library::Table,
    Library::Io,
    Library::Os,
    Library::String,
    Library::Bit,
    Library::Math,
    Library::Package,
    Library::Jit,
    Library::Ffi,
    Library::Debug,
];

impl LuaVersion {
    /// Every known variant, in tag order
    pub const ALL: [LuaVersion; 5] = [
        LuaVersion::Lua51,
        LuaVersion::Lua52,
        LuaVersion::Lua53,
        LuaVersion::Lua54,
        LuaVersion::LuaJit,
    ];

    /// The tag used in options and configuration files
    pub const fn tag(self) -> &'static str {
        match self {
            LuaVersion::Lua51 => "lua51",
            LuaVersion::Lua52 => "lua52",
            LuaVersion::Lua53 => "lua53",
            LuaVersion::Lua54 => "lua54",
            LuaVersion::LuaJit => "luajit",
        }
    }

    /// Human readable name. For PUC Lua this is the value of `_VERSION`.
    pub const fn display_name(self) -> &'static str {
        match self {
            LuaVersion::Lua51 => "Lua 5.1",
            LuaVersion::Lua52 => "Lua 5.2",
            LuaVersion::Lua53 => "Lua 5.3",
            LuaVersion::Lua54 => "Lua 5.4",
            LuaVersion::LuaJit => "LuaJIT",
        }
    }

    /// Parse a version tag
    pub fn from_tag(tag: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|version| version.tag() == tag)
            .ok_or_else(|| {
                Error::invalid_version(format!(
                    "unknown version tag '{}', expected one of {}",
                    tag,
                    Self::ALL.map(LuaVersion::tag).join(", ")
                ))
            })
    }

    /// Standard libraries this variant is able to load
    pub const fn libraries(self) -> &'static [Library] {
        match self {
            LuaVersion::Lua51 => LUA51_LIBRARIES,
            LuaVersion::Lua52 => LUA52_LIBRARIES,
            LuaVersion::Lua53 => LUA53_LIBRARIES,
            LuaVersion::Lua54 => LUA54_LIBRARIES,
            LuaVersion::LuaJit => LUAJIT_LIBRARIES,
        }
    }

    /// Whether the variant distinguishes integers from floats
    pub const fn has_integers(self) -> bool {
        matches!(self, LuaVersion::Lua53 | LuaVersion::Lua54)
    }
}

impl fmt::Display for LuaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for LuaVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s)
    }
}
