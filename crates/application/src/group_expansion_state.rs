use std::collections::HashMap;

use rolegrid_domain::{ScreenCatalog, ScreenId};

/// Expanded/collapsed flags for parent screen groups.
///
/// Parents are expanded the first time they are seen. Known parents keep their
/// state across catalog reloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupExpansionState {
    expanded: HashMap<ScreenId, bool>,
}

impl GroupExpansionState {
    /// Creates an empty expansion map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers unseen parents of the catalog as expanded.
    pub fn observe(&mut self, catalog: &ScreenCatalog) {
        for parent in catalog.parents() {
            self.expanded
                .entry(parent.screen_id().clone())
                .or_insert(true);
        }
    }

    /// Flips one parent and returns its new state.
    pub fn toggle_group(&mut self, screen_id: &ScreenId) -> bool {
        let expanded = self.expanded.entry(screen_id.clone()).or_insert(true);
        *expanded = !*expanded;
        *expanded
    }

    /// Returns whether a parent is expanded.
    #[must_use]
    pub fn is_expanded(&self, screen_id: &ScreenId) -> bool {
        self.expanded.get(screen_id).copied().unwrap_or(true)
    }
}
