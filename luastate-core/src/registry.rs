//! Per-version library flag registry

use crate::error::{Error, Result};
use crate::library::{Library, LibraryFlags, LibrarySelection, LibrarySet};
use crate::version::LuaVersion;

/// Library constants and named sets for one Lua variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryFlagRegistry {
    version: LuaVersion,
}

impl LibraryFlagRegistry {
    /// Registry for `version`
    pub const fn for_version(version: LuaVersion) -> Self {
        Self { version }
    }

    /// The variant this registry describes
    pub const fn version(&self) -> LuaVersion {
        self.version
    }

    /// Every library the variant can load
    pub const fn libraries(&self) -> &'static [Library] {
        self.version.libraries()
    }

    /// Whether the variant can load `library`
    pub fn supports(&self, library: Library) -> bool {
        self.libraries().contains(&library)
    }

    /// Every legal bit, `debug` and `ffi` included
    pub fn all(&self) -> LibraryFlags {
        self.libraries().iter().copied().collect()
    }

    /// Every legal bit except `debug` and `ffi`
    pub fn all_safe(&self) -> LibraryFlags {
        self.libraries()
            .iter()
            .copied()
            .filter(|library| !library.is_unsafe())
            .collect()
    }

    /// Same as [`all_safe`](Self::all_safe)
    pub fn all_no_debug(&self) -> LibraryFlags {
        self.all_safe()
    }

    /// Every safe bit except `io` and `os`
    pub fn no_filesystem(&self) -> LibraryFlags {
        self.libraries()
            .iter()
            .copied()
            .filter(|library| !library.is_unsafe() && !library.touches_filesystem())
            .collect()
    }

    /// Expand a named set
    pub fn named(&self, set: LibrarySet) -> LibraryFlags {
        match set {
            LibrarySet::All => self.all(),
            LibrarySet::AllSafe => self.all_safe(),
            LibrarySet::NoFilesystem => self.no_filesystem(),
        }
    }

    /// Fail unless the variant can load `library`
    pub fn validate(&self, library: Library) -> Result<()> {
        if self.supports(library) {
            Ok(())
        } else {
            Err(Error::UnsupportedLibrary {
                library: library.name().to_string(),
                version: self.version.tag(),
            })
        }
    }

    /// Turn construction options into flags. `None` selects [`LibrarySet::AllSafe`].
    pub fn resolve(&self, selection: Option<&LibrarySelection>) -> Result<LibraryFlags> {
        match selection {
            None => Ok(self.all_safe()),
            Some(LibrarySelection::Set(set)) => Ok(self.named(*set)),
            Some(LibrarySelection::Libraries(libraries)) => {
                let mut flags = LibraryFlags::NONE;
                for library in libraries {
                    self.validate(*library)?;
                    flags.insert(*library);
                }
                Ok(flags)
            }
        }
    }

    /// Accept a raw engine mask, including the legacy all / all-safe sentinels
    pub fn from_bits(&self, bits: u32) -> Result<LibraryFlags> {
        match bits {
            LibraryFlags::ALL_SENTINEL => return Ok(self.all()),
            LibraryFlags::ALL_SAFE_SENTINEL => return Ok(self.all_safe()),
            _ => {}
        }

        let mut flags = LibraryFlags::NONE;
        for shift in 0..u32::BITS {
            let bit = 1u32 << shift;
            if bits & bit == 0 {
                continue;
            }
            match Library::from_bit(bit) {
                Some(library) => {
                    self.validate(library)?;
                    flags.insert(library);
                }
                None => {
                    return Err(Error::UnsupportedLibrary {
                        library: format!("{:#x}", bit),
                        version: self.version.tag(),
                    })
                }
            }
        }
        Ok(flags)
    }
}
