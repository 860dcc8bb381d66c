use std::collections::BTreeMap;

use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{PermissionFlags, PermissionKind, ScreenCatalog, ScreenId};

/// Editable permission flags for every child screen of a loaded catalog.
///
/// The mapping is the only source for what gets persisted on save. It never
/// talks to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridEditState {
    entries: BTreeMap<ScreenId, PermissionFlags>,
}

impl GridEditState {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every entry with the flags of the merged catalog's child screens.
    pub fn seed(&mut self, merged: &ScreenCatalog) {
        self.entries = merged
            .children()
            .map(|child| (child.screen_id().clone(), child.flags()))
            .collect();
    }

    /// Flips one flag of one entry and returns the entry's new flags.
    ///
    /// Unknown screen ids are rejected and leave the grid unchanged.
    pub fn toggle(&mut self, screen_id: &ScreenId, kind: PermissionKind) -> AppResult<PermissionFlags> {
        let flags = self.entries.get_mut(screen_id).ok_or_else(|| {
            AppError::Validation(format!(
                "screen '{screen_id}' is not part of the loaded catalog"
            ))
        })?;

        *flags = flags.toggled(kind);
        Ok(*flags)
    }

    /// Returns the flags of one entry.
    #[must_use]
    pub fn flags(&self, screen_id: &ScreenId) -> Option<PermissionFlags> {
        self.entries.get(screen_id).copied()
    }

    /// Returns the full mapping ordered by screen id.
    #[must_use]
    pub fn read_all(&self) -> &BTreeMap<ScreenId, PermissionFlags> {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the grid has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
