//! File system access for builds.
//!
//! Every read, timestamp lookup and write a [`Build`](crate::Build) performs
//! goes through the [`FileSystem`] trait. [`LocalFs`] is the real disk;
//! [`MemoryFs`] keeps files in memory with a logical clock and counts reads
//! and writes, which makes memoization and freshness observable.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

pub trait FileSystem {
  fn read_to_string(&self, path: &Path) -> io::Result<String>;

  fn is_file(&self, path: &Path) -> bool;

  /// Last modification time of `path`.
  fn modified(&self, path: &Path) -> io::Result<SystemTime>;

  /// Write `contents` to `path`, creating parent directories as needed.
  fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// The local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
  }

  fn is_file(&self, path: &Path) -> bool {
    path.is_file()
  }

  fn modified(&self, path: &Path) -> io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
  }
}

#[derive(Debug, Clone)]
struct MemoryFile {
  contents: String,
  modified: SystemTime,
}

/// In-memory file system with a logical clock.
///
/// Each insert, touch or write advances the clock by one second, so a file
/// written later is always strictly newer than one written before it.
#[derive(Debug, Default)]
pub struct MemoryFs {
  files: RefCell<BTreeMap<PathBuf, MemoryFile>>,
  clock: Cell<u64>,
  reads: Cell<usize>,
  writes: Cell<usize>,
}

impl MemoryFs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add or replace a file without counting it as a write.
  pub fn insert(&self, path: impl Into<PathBuf>, contents: &str) {
    let modified = self.tick();
    self.files.borrow_mut().insert(
      path.into(),
      MemoryFile {
        contents: contents.to_string(),
        modified,
      },
    );
  }

  /// Bump the modification time of an existing file. Returns false if absent.
  pub fn touch(&self, path: &Path) -> bool {
    let modified = self.tick();
    match self.files.borrow_mut().get_mut(path) {
      Some(file) => {
        file.modified = modified;
        true
      }
      None => false,
    }
  }

  pub fn set_modified(&self, path: &Path, modified: SystemTime) -> bool {
    match self.files.borrow_mut().get_mut(path) {
      Some(file) => {
        file.modified = modified;
        true
      }
      None => false,
    }
  }

  pub fn contents(&self, path: &Path) -> Option<String> {
    self.files.borrow().get(path).map(|f| f.contents.clone())
  }

  pub fn exists(&self, path: &Path) -> bool {
    self.files.borrow().contains_key(path)
  }

  /// Number of successful `read_to_string` calls.
  pub fn reads(&self) -> usize {
    self.reads.get()
  }

  /// Number of successful `write` calls.
  pub fn writes(&self) -> usize {
    self.writes.get()
  }

  pub fn reset_counters(&self) {
    self.reads.set(0);
    self.writes.set(0);
  }

  fn tick(&self) -> SystemTime {
    let now = self.clock.get() + 1;
    self.clock.set(now);
    SystemTime::UNIX_EPOCH + Duration::from_secs(now)
  }
}

impl FileSystem for MemoryFs {
  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    let files = self.files.borrow();
    let file = files
      .get(path)
      .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))?;
    self.reads.set(self.reads.get() + 1);
    Ok(file.contents.clone())
  }

  fn is_file(&self, path: &Path) -> bool {
    self.exists(path)
  }

  fn modified(&self, path: &Path) -> io::Result<SystemTime> {
    self
      .files
      .borrow()
      .get(path)
      .map(|f| f.modified)
      .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
  }

  fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
    let modified = self.tick();
    self.files.borrow_mut().insert(
      path.to_path_buf(),
      MemoryFile {
        contents: contents.to_string(),
        modified,
      },
    );
    self.writes.set(self.writes.get() + 1);
    Ok(())
  }
}

/// Find a source file: `path` itself, then `path.<extension>`.
pub fn locate(fs: &dyn FileSystem, path: &Path, extension: &str) -> Option<PathBuf> {
  if fs.is_file(path) {
    return Some(path.to_path_buf());
  }
  let with_extension = append_extension(path, extension);
  fs.is_file(&with_extension).then_some(with_extension)
}

/// Read a source file located with [`locate`], trimmed.
///
/// Returns `Ok(None)` if neither candidate exists.
pub fn read_source(fs: &dyn FileSystem, path: &Path, extension: &str) -> io::Result<Option<String>> {
  match locate(fs, path, extension) {
    Some(found) => fs.read_to_string(&found).map(|s| Some(s.trim().to_string())),
    None => Ok(None),
  }
}

fn append_extension(path: &Path, extension: &str) -> PathBuf {
  let mut raw: OsString = path.as_os_str().to_owned();
  raw.push(".");
  raw.push(extension);
  PathBuf::from(raw)
}

/// Resolve `.` and `..` lexically, without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::ParentDir => {
        normalized.pop();
      }
      Component::CurDir => {}
      _ => normalized.push(component),
    }
  }
  normalized
}
