//! Construction options

use luastate_core::{Error, Library, LibrarySelection, LibrarySet, LuaVersion, Result};
use luastate_engine::COMPILED_VERSION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options for creating a [`LuaState`](crate::LuaState)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateOptions {
    /// Lua variant to run
    pub version: LuaVersion,
    /// Libraries to load; `None` loads the safe set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libraries: Option<LibrarySelection>,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            version: COMPILED_VERSION,
            libraries: None,
        }
    }
}

impl StateOptions {
    /// Options for `version` with the default library set
    pub fn new(version: LuaVersion) -> Self {
        Self {
            version,
            libraries: None,
        }
    }

    /// Options from a version tag such as `"lua54"`
    pub fn from_tag(tag: &str) -> Result<Self> {
        Ok(Self::new(LuaVersion::from_tag(tag)?))
    }

    /// Load exactly these libraries
    pub fn libraries(mut self, libraries: impl Into<LibrarySelection>) -> Self {
        self.libraries = Some(libraries.into());
        self
    }

    /// Load a named library set
    pub fn library_set(mut self, set: LibrarySet) -> Self {
        self.libraries = Some(LibrarySelection::Set(set));
        self
    }

    /// Add one library to an explicit list. A named set becomes the
    /// explicit list `[library]`.
    pub fn with_library(mut self, library: Library) -> Self {
        match &mut self.libraries {
            Some(LibrarySelection::Libraries(libraries)) => {
                if !libraries.contains(&library) {
                    libraries.push(library);
                }
            }
            _ => self.libraries = Some(LibrarySelection::Libraries(vec![library])),
        }
        self
    }

    /// Sandboxed preset: no file system, no debug
    pub fn sandboxed(version: LuaVersion) -> Self {
        Self::new(version).library_set(LibrarySet::NoFilesystem)
    }

    /// Parse options from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))
    }

    /// Serialize options to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Load options from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save options to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
