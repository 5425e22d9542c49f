use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A client's permission query for one mod.
///
/// The client reports which mod it runs, at what version, and which
/// permission nodes it wants answers for. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PermissionsContainer {
    pub mod_name: String,
    pub mod_version: f32,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl PermissionsContainer {
    pub fn new(mod_name: impl Into<String>, mod_version: f32) -> Self {
        Self {
            mod_name: mod_name.into(),
            mod_version,
            permissions: Vec::new(),
        }
    }

    /// Attach the permission nodes the client is asking about.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}

/// Per-permission view of one player, supplied by the host server.
pub trait PermissionChecker {
    /// True when the node has an explicit value rather than its default.
    fn is_explicitly_set(&self, permission: &str) -> bool;

    /// True when the node is granted.
    fn is_granted(&self, permission: &str) -> bool;
}

/// Explicit permission values keyed by node.
///
/// Nodes missing from the table are unset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionTable {
    values: HashMap<String, bool>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style explicit grant.
    pub fn granting(mut self, permission: impl Into<String>) -> Self {
        self.set(permission, true);
        self
    }

    /// Builder-style explicit denial.
    pub fn denying(mut self, permission: impl Into<String>) -> Self {
        self.set(permission, false);
        self
    }

    pub fn set(&mut self, permission: impl Into<String>, granted: bool) {
        self.values.insert(permission.into(), granted);
    }

    /// Drop any explicit value so the node falls back to unset.
    pub fn unset(&mut self, permission: &str) {
        self.values.remove(permission);
    }
}

impl PermissionChecker for PermissionTable {
    fn is_explicitly_set(&self, permission: &str) -> bool {
        self.values.contains_key(permission)
    }

    fn is_granted(&self, permission: &str) -> bool {
        self.values.get(permission).copied().unwrap_or(false)
    }
}

/// Translates client permission queries into signed permission lists.
///
/// A provider answers only for the mods it knows about. The host asks
/// [`provides_mappings_for`](Self::provides_mappings_for) first, then
/// [`check_version`](Self::check_version), then collects
/// [`permissions`](Self::permissions) to replicate back to the client.
pub trait PermissionsMappingProvider {
    /// True when this provider handles the queried mod.
    fn provides_mappings_for(&self, data: &PermissionsContainer) -> bool;

    /// False when the client's mod version is below the required minimum.
    fn check_version(&self, data: &PermissionsContainer) -> bool;

    /// `+node` / `-node` entries for every explicitly set node in the query.
    fn permissions(
        &self,
        checker: &dyn PermissionChecker,
        data: &PermissionsContainer,
    ) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_tracks_explicit_values() {
        let table = PermissionTable::new()
            .granting("minimap.radar")
            .denying("minimap.cave");

        assert!(table.is_explicitly_set("minimap.radar"));
        assert!(table.is_granted("minimap.radar"));
        assert!(table.is_explicitly_set("minimap.cave"));
        assert!(!table.is_granted("minimap.cave"));
        assert!(!table.is_explicitly_set("minimap.waypoints"));
        assert!(!table.is_granted("minimap.waypoints"));
    }

    #[test]
    fn unset_removes_explicit_value() {
        let mut table = PermissionTable::new().granting("minimap.radar");
        table.unset("minimap.radar");
        assert!(!table.is_explicitly_set("minimap.radar"));
    }

    #[test]
    fn set_overrides_previous_value() {
        let mut table = PermissionTable::new().granting("minimap.radar");
        table.set("minimap.radar", false);
        assert!(table.is_explicitly_set("minimap.radar"));
        assert!(!table.is_granted("minimap.radar"));
    }

    #[test]
    fn container_decodes_from_json() {
        let data: PermissionsContainer = serde_json::from_str(
            r#"{"mod_name":"minimap","mod_version":1.5,"permissions":["minimap.radar"]}"#,
        )
        .unwrap();

        assert_eq!(
            data,
            PermissionsContainer::new("minimap", 1.5).with_permissions(["minimap.radar"])
        );
    }

    #[test]
    fn container_permissions_default_to_empty() {
        let data: PermissionsContainer =
            serde_json::from_str(r#"{"mod_name":"minimap","mod_version":2.0}"#).unwrap();
        assert!(data.permissions.is_empty());
    }
}
