//! Standard library selection
//!
//! Bits match the engine's own library mask so a selection can be handed to
//! the engine one library at a time. Which bits are legal depends on the
//! variant; see [`LuaVersion::libraries`](crate::LuaVersion::libraries).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A loadable standard library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Library {
    /// `coroutine` (5.2+, part of the base library on 5.1)
    Coroutine,
    /// `table`
    Table,
    /// `io`
    Io,
    /// `os`
    Os,
    /// `string`
    String,
    /// `utf8` (5.3+)
    Utf8,
    /// `bit32` on 5.2, `bit` on LuaJIT
    Bit,
    /// `math`
    Math,
    /// `package`
    Package,
    /// `jit` (LuaJIT)
    Jit,
    /// `ffi` (LuaJIT)
    Ffi,
    /// `debug`
    Debug,
}

impl Library {
    /// Every library, in bit order
    pub const ALL: [Library; 12] = [
        Library::Coroutine,
        Library::Table,
        Library::Io,
        Library::Os,
        Library::String,
        Library::Utf8,
        Library::Bit,
        Library::Math,
        Library::Package,
        Library::Jit,
        Library::Ffi,
        Library::Debug,
    ];

    /// The library's bit in a [`LibraryFlags`] mask
    pub const fn bit(self) -> u32 {
        match self {
            Library::Coroutine => 0x1,
            Library::Table => 0x2,
            Library::Io => 0x4,
            Library::Os => 0x8,
            Library::String => 0x10,
            Library::Utf8 => 0x20,
            Library::Bit => 0x40,
            Library::Math => 0x80,
            Library::Package => 0x100,
            Library::Jit => 0x200,
            Library::Ffi => 0x4000_0000,
            Library::Debug => 0x8000_0000,
        }
    }

    /// Name of the library as used in options
    pub const fn name(self) -> &'static str {
        match self {
            Library::Coroutine => "coroutine",
            Library::Table => "table",
            Library::Io => "io",
            Library::Os => "os",
            Library::String => "string",
            Library::Utf8 => "utf8",
            Library::Bit => "bit",
            Library::Math => "math",
            Library::Package => "package",
            Library::Jit => "jit",
            Library::Ffi => "ffi",
            Library::Debug => "debug",
        }
    }

    /// Look a library up by its single bit
    pub fn from_bit(bit: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|library| library.bit() == bit)
    }

    /// Libraries the engine only loads through its unsafe constructor
    pub const fn is_unsafe(self) -> bool {
        matches!(self, Library::Debug | Library::Ffi)
    }

    /// Libraries that reach the host file system or process
    pub const fn touches_filesystem(self) -> bool {
        matches!(self, Library::Io | Library::Os)
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of libraries, stored as the engine's bitmask
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LibraryFlags(u32);

impl LibraryFlags {
    /// No libraries at all
    pub const NONE: LibraryFlags = LibraryFlags(0);

    /// Raw mask value meaning "every library of the version"
    pub const ALL_SENTINEL: u32 = u32::MAX;

    /// Raw mask value meaning "every safe library of the version"
    pub const ALL_SAFE_SENTINEL: u32 = u32::MAX - 1;

    /// The raw mask
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether `library` is in the set
    pub const fn contains(self, library: Library) -> bool {
        self.0 & library.bit() != 0
    }

    /// Add a library
    pub fn insert(&mut self, library: Library) {
        self.0 |= library.bit();
    }

    /// Remove a library
    pub fn remove(&mut self, library: Library) {
        self.0 &= !library.bit();
    }

    /// Copy of the set without `library`
    pub fn without(mut self, library: Library) -> Self {
        self.remove(library);
        self
    }

    /// Whether the set is empty
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of libraries in the set
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Libraries in bit order
    pub fn iter(self) -> impl Iterator<Item = Library> {
        Library::ALL.into_iter().filter(move |library| self.contains(*library))
    }

    /// Whether creating an engine with this set needs the unsafe constructor
    pub fn requires_unsafe(self) -> bool {
        self.iter().any(Library::is_unsafe)
    }
}

impl From<Library> for LibraryFlags {
    fn from(library: Library) -> Self {
        LibraryFlags(library.bit())
    }
}

impl FromIterator<Library> for LibraryFlags {
    fn from_iter<I: IntoIterator<Item = Library>>(iter: I) -> Self {
        let mut flags = LibraryFlags::NONE;
        for library in iter {
            flags.insert(library);
        }
        flags
    }
}

impl BitOr for LibraryFlags {
    type Output = LibraryFlags;

    fn bitor(self, rhs: LibraryFlags) -> LibraryFlags {
        LibraryFlags(self.0 | rhs.0)
    }
}

impl BitOr<Library> for LibraryFlags {
    type Output = LibraryFlags;

    fn bitor(self, rhs: Library) -> LibraryFlags {
        LibraryFlags(self.0 | rhs.bit())
    }
}

impl BitOr for Library {
    type Output = LibraryFlags;

    fn bitor(self, rhs: Library) -> LibraryFlags {
        LibraryFlags(self.bit() | rhs.bit())
    }
}

impl BitOrAssign<Library> for LibraryFlags {
    fn bitor_assign(&mut self, rhs: Library) {
        self.insert(rhs);
    }
}

impl fmt::Debug for LibraryFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LibraryFlags({})", self)
    }
}

impl fmt::Display for LibraryFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(Library::name).collect();
        f.write_str(&names.join(" | "))
    }
}

/// Named library combinations available for every version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibrarySet {
    /// Every library the version has, including `debug` and `ffi`
    All,
    /// Everything except `debug` and `ffi`
    #[default]
    #[serde(alias = "all_no_debug")]
    AllSafe,
    /// Everything except `io`, `os` and `debug`
    NoFilesystem,
}

impl LibrarySet {
    /// Alias of [`LibrarySet::AllSafe`]
    pub const ALL_NO_DEBUG: LibrarySet = LibrarySet::AllSafe;
}

/// Library selection as given in construction options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LibrarySelection {
    /// One of the named combinations
    Set(LibrarySet),
    /// An explicit list; empty means no libraries
    Libraries(Vec<Library>),
}

impl From<LibrarySet> for LibrarySelection {
    fn from(set: LibrarySet) -> Self {
        LibrarySelection::Set(set)
    }
}

impl From<Vec<Library>> for LibrarySelection {
    fn from(libraries: Vec<Library>) -> Self {
        LibrarySelection::Libraries(libraries)
    }
}

impl From<&[Library]> for LibrarySelection {
    fn from(libraries: &[Library]) -> Self {
        LibrarySelection::Libraries(libraries.to_vec())
    }
}

impl<const N: usize> From<[Library; N]> for LibrarySelection {
    fn from(libraries: [Library; N]) -> Self {
        LibrarySelection::Libraries(libraries.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_distinct() {
        let mut seen = 0u32;
        for library in Library::ALL {
            assert_eq!(library.bit().count_ones(), 1);
            assert_eq!(seen & library.bit(), 0);
            seen |= library.bit();
            assert_eq!(Library::from_bit(library.bit()), Some(library));
        }
        assert_eq!(Library::from_bit(0x400), None);
    }

    #[test]
    fn test_flag_operations() {
        let mut flags = Library::Math | Library::String;
        assert!(flags.contains(Library::Math));
        assert!(!flags.contains(Library::Io));
        assert_eq!(flags.len(), 2);

        flags |= Library::Debug;
        assert!(flags.requires_unsafe());
        flags.remove(Library::Debug);
        assert!(!flags.requires_unsafe());

        let collected: Vec<Library> = flags.iter().collect();
        assert_eq!(collected, vec![Library::String, Library::Math]);
        assert_eq!(flags.to_string(), "string | math");
        assert_eq!(LibraryFlags::NONE.to_string(), "none");
    }

    #[test]
    fn test_selection_serde() {
        let set: LibrarySelection = serde_json::from_str("\"all_safe\"").unwrap();
        assert_eq!(set, LibrarySelection::Set(LibrarySet::AllSafe));

        let alias: LibrarySelection = serde_json::from_str("\"all_no_debug\"").unwrap();
        assert_eq!(alias, LibrarySelection::Set(LibrarySet::ALL_NO_DEBUG));

        let list: LibrarySelection = serde_json::from_str("[\"math\", \"string\"]").unwrap();
        assert_eq!(list, LibrarySelection::from([Library::Math, Library::String]));

        let empty: LibrarySelection = serde_json::from_str("[]").unwrap();
        assert_eq!(empty, LibrarySelection::Libraries(vec![]));
    }
}
