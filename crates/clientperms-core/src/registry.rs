use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use clientperms_config::{ModsFile, ModsStore, YamlFileStore};

use crate::provider::{PermissionChecker, PermissionsContainer, PermissionsMappingProvider};

/// Mod name the host's admin commands use to mean "every mod".
pub const RESERVED_MOD_NAME: &str = "all";

/// Reasons a registry mutation was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    EmptyName,
    ReservedName(String),
    DuplicateMod(String),
    UnknownMod(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "mod name must not be empty"),
            Self::ReservedName(name) => write!(f, "mod name is reserved: {name}"),
            Self::DuplicateMod(name) => write!(f, "mod is already supported: {name}"),
            Self::UnknownMod(name) => write!(f, "mod is not supported: {name}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Supported client mods and their minimum versions.
///
/// Loaded once from a [`ModsStore`] and written back in full after every
/// successful mutation. A failed write is logged and the in-memory change is
/// kept, so memory and disk can disagree until the next successful write.
pub struct ModVersionRegistry {
    store: Box<dyn ModsStore>,
    document: ModsFile,
    mods: Vec<String>,
    versions: HashMap<String, f32>,
}

impl fmt::Debug for ModVersionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModVersionRegistry")
            .field("store", &self.store.location())
            .field("mods", &self.mods)
            .field("versions", &self.versions)
            .finish()
    }
}

impl ModVersionRegistry {
    /// Load `mods.yml` from a data directory.
    pub fn initialize(config_dir: &Path) -> Self {
        Self::with_store(YamlFileStore::in_dir(config_dir))
    }

    /// Load from an arbitrary store, then write the normalized document back.
    ///
    /// A missing document starts empty and is created. A document that
    /// cannot be read or parsed also starts empty, but is left alone until
    /// the first mutation.
    pub fn with_store(store: impl ModsStore + 'static) -> Self {
        let mut registry = Self {
            store: Box::new(store),
            document: ModsFile::default(),
            mods: Vec::new(),
            versions: HashMap::new(),
        };

        match registry.store.load() {
            Ok(Some(file)) => {
                registry.apply(file);
                registry.save();
            }
            Ok(None) => {
                tracing::warn!(
                    location = %registry.store.location(),
                    "no mods.yml was found in the data directory"
                );
                registry.save();
            }
            Err(err) => {
                let detail = format!("{err:#}");
                tracing::warn!(
                    location = %registry.store.location(),
                    error = %detail,
                    "could not load mods file, starting with no supported mods"
                );
            }
        }

        registry
    }

    fn apply(&mut self, mut file: ModsFile) {
        for name in file.mods.drain(..) {
            if !self.contains(&name) {
                self.mods.push(name);
            }
        }

        for (name, version) in std::mem::take(&mut file.versions) {
            if self.contains(&name) {
                self.versions.insert(name, version.max(0.0));
            }
        }

        self.document = file;
        tracing::debug!(
            mods = self.mods.len(),
            constrained = self.versions.len(),
            "loaded supported mods"
        );
    }

    fn contains(&self, mod_name: &str) -> bool {
        self.mods.iter().any(|m| m == mod_name)
    }

    /// True when `mod_name` is in the supported list (exact match).
    pub fn provides_mappings_for(&self, mod_name: &str) -> bool {
        self.contains(mod_name)
    }

    /// False only for a supported mod whose minimum exceeds `reported`.
    pub fn check_version(&self, mod_name: &str, reported: f32) -> bool {
        if !self.contains(mod_name) {
            return true;
        }

        let min = self.min_version(mod_name);
        min <= 0.0 || reported >= min
    }

    /// Sign each explicitly set candidate with `+` (granted) or `-` (denied).
    ///
    /// Candidates without an explicit value are left out. Output keeps input
    /// order. Unsupported mods get an empty list.
    pub fn permissions<I, S>(
        &self,
        mod_name: &str,
        candidates: I,
        checker: &dyn PermissionChecker,
    ) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.contains(mod_name) {
            return Vec::new();
        }

        candidates
            .into_iter()
            .filter_map(|candidate| {
                let node = candidate.as_ref();
                checker.is_explicitly_set(node).then(|| {
                    let sign = if checker.is_granted(node) { '+' } else { '-' };
                    format!("{sign}{node}")
                })
            })
            .collect()
    }

    pub fn add_mod(&mut self, name: &str) -> Result<(), RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if name.eq_ignore_ascii_case(RESERVED_MOD_NAME) {
            return Err(RegistryError::ReservedName(name.to_string()));
        }
        if self.contains(name) {
            return Err(RegistryError::DuplicateMod(name.to_string()));
        }

        self.mods.push(name.to_string());
        self.save();
        tracing::info!(mod_name = name, "added supported mod");
        Ok(())
    }

    /// Drop a mod from the list.
    ///
    /// Its version entry stays in memory; the save drops it from disk.
    pub fn remove_mod(&mut self, name: &str) -> Result<(), RegistryError> {
        let Some(idx) = self.mods.iter().position(|m| m == name) else {
            return Err(RegistryError::UnknownMod(name.to_string()));
        };

        self.mods.remove(idx);
        self.save();
        tracing::info!(mod_name = name, "removed supported mod");
        Ok(())
    }

    pub fn mods(&self) -> &[String] {
        &self.mods
    }

    /// Minimum version for a supported mod, `0.0` when unconstrained or unknown.
    pub fn min_version(&self, name: &str) -> f32 {
        if !self.contains(name) {
            return 0.0;
        }
        self.versions.get(name).copied().unwrap_or(0.0)
    }

    /// Set a supported mod's minimum version. Negative values become `0.0`.
    pub fn set_min_version(&mut self, name: &str, version: f32) -> Result<(), RegistryError> {
        if !self.contains(name) {
            return Err(RegistryError::UnknownMod(name.to_string()));
        }

        // f32::max also maps NaN to 0.0
        let version = version.max(0.0);
        self.versions.insert(name.to_string(), version);
        self.save();
        tracing::info!(mod_name = name, version, "set minimum mod version");
        Ok(())
    }

    fn save(&mut self) {
        self.document.mods = self.mods.clone();
        self.document.versions = self
            .mods
            .iter()
            .filter_map(|name| {
                let version = self.min_version(name);
                (version > 0.0).then(|| (name.clone(), version))
            })
            .collect();

        if let Err(err) = self.store.save(&self.document) {
            let detail = format!("{err:#}");
            tracing::warn!(
                location = %self.store.location(),
                error = %detail,
                "error saving mods.yml"
            );
        }
    }
}

impl PermissionsMappingProvider for ModVersionRegistry {
    fn provides_mappings_for(&self, data: &PermissionsContainer) -> bool {
        ModVersionRegistry::provides_mappings_for(self, &data.mod_name)
    }

    fn check_version(&self, data: &PermissionsContainer) -> bool {
        ModVersionRegistry::check_version(self, &data.mod_name, data.mod_version)
    }

    fn permissions(
        &self,
        checker: &dyn PermissionChecker,
        data: &PermissionsContainer,
    ) -> Vec<String> {
        ModVersionRegistry::permissions(self, &data.mod_name, &data.permissions, checker)
    }
}
