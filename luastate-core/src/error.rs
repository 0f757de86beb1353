//! Error types shared by every layer of the runtime

use thiserror::Error;

use crate::value::MAX_NESTING_DEPTH;

/// Errors raised while constructing, driving or marshalling a Lua runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown version tag, or a version not compiled into this build
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// A library flag that the selected version cannot load
    #[error("unrecognized library flag \"{library}\" for {version}")]
    UnsupportedLibrary {
        library: String,
        version: &'static str,
    },

    /// The chunk failed to parse
    #[error("Syntax error: {0}")]
    ScriptSyntax(String),

    /// The chunk raised an error while running
    #[error("Runtime error: {0}")]
    ScriptRuntime(String),

    /// A value or table key has no representation on the other side
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Any operation on a closed state
    #[error("Lua state has been closed")]
    UseAfterClose,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine refused an operation outside script execution
    #[error("Engine error: {0}")]
    Engine(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid version error
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        Self::InvalidVersion(msg.into())
    }

    /// Create a syntax error
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::ScriptSyntax(msg.into())
    }

    /// Create a script runtime error
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::ScriptRuntime(msg.into())
    }

    /// Create a conversion error
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    /// Conversion error for tables nested past [`MAX_NESTING_DEPTH`]
    pub fn nesting_too_deep() -> Self {
        Self::Conversion(format!("table nesting exceeds {} levels", MAX_NESTING_DEPTH))
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Whether this error came out of running a chunk
    pub fn is_script_error(&self) -> bool {
        matches!(self, Self::ScriptSyntax(_) | Self::ScriptRuntime(_))
    }
}
