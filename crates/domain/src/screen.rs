use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use rolegrid_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{AuditStamp, PermissionFlags};

/// Catalog-wide unique identifier of a parent or child screen.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScreenId(NonEmptyString);

impl ScreenId {
    /// Creates a validated screen identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::for_field("screen_id", value)?))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ScreenId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Leaf permission unit carrying Read/Write/Delete flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildScreen {
    screen_id: ScreenId,
    screen_name: String,
    parent_screen_id: ScreenId,
    flags: PermissionFlags,
    audit: AuditStamp,
}

impl ChildScreen {
    /// Creates a child screen.
    #[must_use]
    pub fn new(
        screen_id: ScreenId,
        screen_name: impl Into<String>,
        parent_screen_id: ScreenId,
        flags: PermissionFlags,
        audit: AuditStamp,
    ) -> Self {
        Self {
            screen_id,
            screen_name: screen_name.into(),
            parent_screen_id,
            flags,
            audit,
        }
    }

    /// Returns the screen identifier.
    #[must_use]
    pub fn screen_id(&self) -> &ScreenId {
        &self.screen_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn screen_name(&self) -> &str {
        self.screen_name.as_str()
    }

    /// Returns the owning parent screen identifier.
    #[must_use]
    pub fn parent_screen_id(&self) -> &ScreenId {
        &self.parent_screen_id
    }

    /// Returns the current flags.
    #[must_use]
    pub fn flags(&self) -> PermissionFlags {
        self.flags
    }

    /// Returns the audit columns carried with the screen.
    #[must_use]
    pub fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    /// Returns a copy with replaced flags and audit columns.
    #[must_use]
    pub fn with_permissions(&self, flags: PermissionFlags, audit: AuditStamp) -> Self {
        Self {
            flags,
            audit,
            ..self.clone()
        }
    }
}

/// Top-level permission group owning an ordered list of child screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenNode {
    screen_id: ScreenId,
    screen_name: String,
    parent_name: String,
    children: Vec<ChildScreen>,
}

impl ScreenNode {
    /// Creates a parent screen, rejecting children owned by another parent.
    pub fn new(
        screen_id: ScreenId,
        screen_name: impl Into<String>,
        parent_name: impl Into<String>,
        children: Vec<ChildScreen>,
    ) -> AppResult<Self> {
        if let Some(stray) = children
            .iter()
            .find(|child| child.parent_screen_id() != &screen_id)
        {
            return Err(AppError::Validation(format!(
                "child screen '{}' belongs to '{}', not to '{}'",
                stray.screen_id(),
                stray.parent_screen_id(),
                screen_id
            )));
        }

        Ok(Self {
            screen_id,
            screen_name: screen_name.into(),
            parent_name: parent_name.into(),
            children,
        })
    }

    /// Returns the parent screen identifier.
    #[must_use]
    pub fn screen_id(&self) -> &ScreenId {
        &self.screen_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn screen_name(&self) -> &str {
        self.screen_name.as_str()
    }

    /// Returns the parent-group name.
    #[must_use]
    pub fn parent_name(&self) -> &str {
        self.parent_name.as_str()
    }

    /// Returns child screens in catalog order.
    #[must_use]
    pub fn children(&self) -> &[ChildScreen] {
        &self.children
    }

    pub(crate) fn with_children(&self, children: Vec<ChildScreen>) -> Self {
        Self {
            children,
            ..self.clone()
        }
    }
}

/// Validated two-level screen hierarchy for one user group and company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenCatalog {
    parents: Vec<ScreenNode>,
}

impl ScreenCatalog {
    /// Creates a catalog; parent and child identifiers share one namespace.
    pub fn new(parents: Vec<ScreenNode>) -> AppResult<Self> {
        let mut screen_ids = HashSet::new();

        for parent in &parents {
            if !screen_ids.insert(parent.screen_id()) {
                return Err(AppError::Validation(format!(
                    "duplicate screen '{}' in catalog",
                    parent.screen_id()
                )));
            }

            for child in parent.children() {
                if !screen_ids.insert(child.screen_id()) {
                    return Err(AppError::Validation(format!(
                        "duplicate screen '{}' in catalog",
                        child.screen_id()
                    )));
                }
            }
        }

        Ok(Self { parents })
    }

    /// Returns parent screens in catalog order.
    #[must_use]
    pub fn parents(&self) -> &[ScreenNode] {
        &self.parents
    }

    /// Iterates over every child screen, parent by parent.
    pub fn children(&self) -> impl Iterator<Item = &ChildScreen> {
        self.parents.iter().flat_map(|parent| parent.children().iter())
    }

    /// Returns the total number of child screens.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.parents.iter().map(|parent| parent.children().len()).sum()
    }

    /// Returns whether a child screen with this identifier exists.
    #[must_use]
    pub fn contains_child(&self, screen_id: &ScreenId) -> bool {
        self.children().any(|child| child.screen_id() == screen_id)
    }

    /// Returns whether the catalog has no parent screens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub(crate) fn from_validated(parents: Vec<ScreenNode>) -> Self {
        Self { parents }
    }
}
