use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use tempfile::NamedTempFile;

use crate::mods::{ModsFile, MODS_FILE_NAME};

/// Backing store for the supported-mods document.
///
/// The registry reads the document once when it starts and hands back the
/// whole document after every change. Implementations decide where it lives.
pub trait ModsStore {
    /// Human-readable location used in log messages.
    fn location(&self) -> String;

    /// Read the document. `Ok(None)` means it does not exist yet.
    fn load(&self) -> Result<Option<ModsFile>>;

    /// Replace the stored document.
    fn save(&self, file: &ModsFile) -> Result<()>;
}

/// Stores the document as a YAML file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlFileStore {
    path: PathBuf,
}

impl YamlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `mods.yml` inside a data directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(MODS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModsStore for YamlFileStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<ModsFile>> {
        match fs::metadata(&self.path) {
            Ok(_) => ModsFile::from_path(&self.path).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("failed to stat mods file at {}", self.path.display())),
        }
    }

    /// Write the document next to the target, then rename it into place so
    /// an interrupted save never leaves a truncated `mods.yml` behind.
    fn save(&self, file: &ModsFile) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data directory {}", parent.display()))?;

        let raw = file.to_yaml_string()?;
        let mut staged = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to stage mods file in {}", parent.display()))?;
        staged
            .write_all(raw.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .with_context(|| format!("failed to write mods file at {}", self.path.display()))?;
        staged
            .persist(&self.path)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to write mods file at {}", self.path.display()))?;
        Ok(())
    }
}

/// Keeps the document as YAML text in memory.
///
/// Clones share the same document, so a test can hold one handle while the
/// registry owns another, and a second registry built from a clone sees
/// whatever the first one saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    /// An empty store with no document.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with raw YAML.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            document: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// Current raw YAML, if anything has been stored.
    pub fn contents(&self) -> Option<String> {
        self.document.lock().ok().and_then(|doc| doc.clone())
    }
}

impl ModsStore for MemoryStore {
    fn location(&self) -> String {
        "<memory>".to_string()
    }

    fn load(&self) -> Result<Option<ModsFile>> {
        let doc = self
            .document
            .lock()
            .map_err(|_| anyhow!("mods store lock poisoned"))?;

        doc.as_deref().map(ModsFile::from_yaml_str).transpose()
    }

    fn save(&self, file: &ModsFile) -> Result<()> {
        let raw = file.to_yaml_string()?;
        let mut doc = self
            .document
            .lock()
            .map_err(|_| anyhow!("mods store lock poisoned"))?;
        *doc = Some(raw);
        Ok(())
    }
}
