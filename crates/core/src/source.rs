//! Storage abstraction for reading templates and writing compiled variants.
//!
//! The [`SourceProvider`] trait keeps the compiler free of direct `std::fs`
//! calls so it can be driven from tests (or other hosts) without a disk.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Reads template lines and writes compiled output.
pub trait SourceProvider {
    /// Read the whole file as lines, each keeping its line terminator.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, std::io::Error>;

    /// Write `content` to `path`, replacing whatever was there.
    fn write_text(&self, path: &Path, content: &str) -> Result<(), std::io::Error>;
}

/// Default filesystem-backed provider. Creates missing parent directories
/// on write.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, std::io::Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(split_lines(&text))
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
    }
}

/// In-memory provider for tests.
///
/// Paths are normalized (`.` and `..` resolved lexically) on every access.
#[derive(Default)]
pub struct InMemoryProvider {
    files: RefCell<HashMap<PathBuf, String>>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        let files = files
            .into_iter()
            .map(|(p, text)| (Self::normalize_path(&p), text))
            .collect();
        Self {
            files: RefCell::new(files),
        }
    }

    /// Contents last written to (or seeded at) `path`.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(&Self::normalize_path(path)).cloned()
    }

    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    components.pop();
                }
                other => components.push(other),
            }
        }
        components.iter().collect()
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>, std::io::Error> {
        let normalized = Self::normalize_path(path);
        self.files
            .borrow()
            .get(&normalized)
            .map(|text| split_lines(text))
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("file not found in memory: {}", normalized.display()),
                )
            })
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<(), std::io::Error> {
        self.files
            .borrow_mut()
            .insert(Self::normalize_path(path), content.to_owned());
        Ok(())
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_owned).collect()
}
