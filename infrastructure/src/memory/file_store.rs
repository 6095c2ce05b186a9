//! Local file system context store
//!
//! [`FileContextStore`] keeps each Memory Bank document as a Markdown file
//! in one directory (by default `.orchestrator/` under the working dir):
//!
//! - `productContext.md` - goal and project description
//! - `activeContext.md` - current state and iteration history
//! - `systemPatterns.md` - conventions collected during the run

use moa_application::{ContextStore, ContextStoreError};
use moa_domain::MemorySection;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Context store that reads and writes Markdown files in a directory.
///
/// The directory is created on first write. No locking is done; one
/// orchestrator process owns a directory at a time.
#[derive(Debug, Clone)]
pub struct FileContextStore {
    dir: PathBuf,
}

impl FileContextStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve `memory_dir` against `working_dir` when it is relative.
    pub fn in_working_dir(working_dir: Option<&Path>, memory_dir: &Path) -> Self {
        match working_dir {
            Some(base) if memory_dir.is_relative() => Self::new(base.join(memory_dir)),
            _ => Self::new(memory_dir),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a section's file
    pub fn path_for(&self, section: MemorySection) -> PathBuf {
        self.dir.join(section.file_name())
    }
}

impl ContextStore for FileContextStore {
    fn read(&self, section: MemorySection) -> Result<Option<String>, ContextStoreError> {
        let path = self.path_for(section);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Err(ContextStoreError::Read {
                    section,
                    message: e.to_string(),
                })
            }
        }
    }

    fn write(&self, section: MemorySection, content: &str) -> Result<(), ContextStoreError> {
        let write_err = |e: std::io::Error| ContextStoreError::Write {
            section,
            message: e.to_string(),
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;
        let path = self.path_for(section);
        fs::write(&path, content).map_err(write_err)?;
        debug!("Wrote {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    fn remove(&self, section: MemorySection) -> Result<(), ContextStoreError> {
        match fs::remove_file(self.path_for(section)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ContextStoreError::Remove {
                section,
                message: e.to_string(),
            }),
        }
    }

    fn exists(&self, section: MemorySection) -> bool {
        self.path_for(section).is_file()
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.dir)
    }

    /// Removes the three documents, then the directory if nothing else is in it.
    fn clear(&self) -> Result<(), ContextStoreError> {
        for section in MemorySection::ALL {
            self.remove(section)?;
        }
        if let Ok(mut entries) = fs::read_dir(&self.dir)
            && entries.next().is_none()
        {
            let _ = fs::remove_dir(&self.dir);
        }
        Ok(())
    }
}
