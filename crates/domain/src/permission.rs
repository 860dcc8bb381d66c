use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rolegrid_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{AuditStamp, ScreenId, UserGroupKey};

/// One of the three independent permission flags carried by a child screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    /// Allows viewing the screen.
    Read,
    /// Allows creating and editing on the screen.
    Write,
    /// Allows deleting on the screen.
    Delete,
}

impl PermissionKind {
    /// Returns a stable transport value for this permission kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }

    /// Returns all permission kinds in grid column order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[PermissionKind] = &[
            PermissionKind::Read,
            PermissionKind::Write,
            PermissionKind::Delete,
        ];

        ALL
    }

    /// Parses a transport value into a permission kind.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for PermissionKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown permission kind '{value}'"
            ))),
        }
    }
}

impl Display for PermissionKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Read/Write/Delete flags for one child screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionFlags {
    /// Read access.
    pub read: bool,
    /// Write access.
    pub write: bool,
    /// Delete access.
    pub delete: bool,
}

impl PermissionFlags {
    /// Creates a flag set from explicit values.
    #[must_use]
    pub fn new(read: bool, write: bool, delete: bool) -> Self {
        Self {
            read,
            write,
            delete,
        }
    }

    /// Returns whether one permission kind is granted.
    #[must_use]
    pub fn allows(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::Read => self.read,
            PermissionKind::Write => self.write,
            PermissionKind::Delete => self.delete,
        }
    }

    /// Returns a copy with exactly one flag inverted.
    #[must_use]
    pub fn toggled(self, kind: PermissionKind) -> Self {
        let mut flags = self;
        match kind {
            PermissionKind::Read => flags.read = !flags.read,
            PermissionKind::Write => flags.write = !flags.write,
            PermissionKind::Delete => flags.delete = !flags.delete,
        }
        flags
    }
}

/// Persisted permission flags for one screen under a user group and company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    key: UserGroupKey,
    screen_id: ScreenId,
    flags: PermissionFlags,
    audit: AuditStamp,
}

impl PermissionRecord {
    /// Creates a permission record.
    #[must_use]
    pub fn new(
        key: UserGroupKey,
        screen_id: ScreenId,
        flags: PermissionFlags,
        audit: AuditStamp,
    ) -> Self {
        Self {
            key,
            screen_id,
            flags,
            audit,
        }
    }

    /// Returns the owning user group and company.
    #[must_use]
    pub fn key(&self) -> &UserGroupKey {
        &self.key
    }

    /// Returns the screen this record grants access to.
    #[must_use]
    pub fn screen_id(&self) -> &ScreenId {
        &self.screen_id
    }

    /// Returns the saved flags.
    #[must_use]
    pub fn flags(&self) -> PermissionFlags {
        self.flags
    }

    /// Returns the saved audit columns.
    #[must_use]
    pub fn audit(&self) -> &AuditStamp {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{PermissionFlags, PermissionKind};

    #[test]
    fn permission_kind_roundtrip_transport_value() {
        for kind in PermissionKind::all() {
            let restored = PermissionKind::from_str(kind.as_str());
            assert_eq!(restored.ok(), Some(*kind));
        }
    }

    #[test]
    fn unknown_permission_kind_is_rejected() {
        assert!(PermissionKind::from_transport("approve").is_err());
    }

    #[test]
    fn toggled_flips_only_the_requested_flag() {
        let flags = PermissionFlags::new(true, false, false);

        assert_eq!(
            flags.toggled(PermissionKind::Delete),
            PermissionFlags::new(true, false, true)
        );
        assert_eq!(
            flags.toggled(PermissionKind::Read),
            PermissionFlags::new(false, false, false)
        );
    }
}
