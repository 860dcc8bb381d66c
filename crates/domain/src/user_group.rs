use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rolegrid_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Identifier of a user group (role) on the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserGroupId(NonEmptyString);

impl UserGroupId {
    /// Creates a validated user group identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::for_field("user_group_id", value)?))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for UserGroupId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Identifier of the company a user group belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompanyId(NonEmptyString);

impl CompanyId {
    /// Creates a validated company identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::for_field("company_id", value)?))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for CompanyId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// The (user group, company) pair every permission lookup is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserGroupKey {
    user_group_id: UserGroupId,
    company_id: CompanyId,
}

impl UserGroupKey {
    /// Creates a key from validated identifiers.
    #[must_use]
    pub fn new(user_group_id: UserGroupId, company_id: CompanyId) -> Self {
        Self {
            user_group_id,
            company_id,
        }
    }

    /// Creates a key from raw transport values.
    pub fn parse(user_group_id: impl Into<String>, company_id: impl Into<String>) -> AppResult<Self> {
        Ok(Self::new(
            UserGroupId::new(user_group_id)?,
            CompanyId::new(company_id)?,
        ))
    }

    /// Returns the user group identifier.
    #[must_use]
    pub fn user_group_id(&self) -> &UserGroupId {
        &self.user_group_id
    }

    /// Returns the company identifier.
    #[must_use]
    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }
}

impl Display for UserGroupKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}/{}", self.company_id, self.user_group_id)
    }
}

/// Kind of user group offered by the administration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserGroupType {
    /// Back-office administrators.
    Admin,
    /// Business-to-consumer end users.
    B2C,
}

impl UserGroupType {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::B2C => "B2C",
        }
    }
}

impl FromStr for UserGroupType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Admin" => Ok(Self::Admin),
            "B2C" => Ok(Self::B2C),
            _ => Err(AppError::Validation(format!(
                "user_group_type must be either 'Admin' or 'B2C', got '{value}'"
            ))),
        }
    }
}

/// Creation and modification audit columns, passed through verbatim when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    /// Subject that created the row.
    pub create_by: Option<String>,
    /// Creation timestamp as sent by the backend.
    pub create_date: Option<String>,
    /// Subject that last modified the row.
    pub modify_by: Option<String>,
    /// Last modification timestamp as sent by the backend.
    pub modify_date: Option<String>,
}

impl AuditStamp {
    /// Returns a stamp where every column present in `other` wins.
    #[must_use]
    pub fn overlaid_with(&self, other: &AuditStamp) -> AuditStamp {
        AuditStamp {
            create_by: other.create_by.clone().or_else(|| self.create_by.clone()),
            create_date: other
                .create_date
                .clone()
                .or_else(|| self.create_date.clone()),
            modify_by: other.modify_by.clone().or_else(|| self.modify_by.clone()),
            modify_date: other
                .modify_date
                .clone()
                .or_else(|| self.modify_date.clone()),
        }
    }
}

/// Role-level metadata sent as the `Header` row of user group payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroupHeader {
    key: UserGroupKey,
    description: String,
    user_group_type: Option<String>,
    audit: AuditStamp,
}

impl UserGroupHeader {
    /// Creates a header row.
    ///
    /// The group type stays a raw string because fetched headers may carry values
    /// the form does not offer.
    #[must_use]
    pub fn new(
        key: UserGroupKey,
        description: impl Into<String>,
        user_group_type: Option<String>,
        audit: AuditStamp,
    ) -> Self {
        Self {
            key,
            description: description.into(),
            user_group_type,
            audit,
        }
    }

    /// Returns the user group and company.
    #[must_use]
    pub fn key(&self) -> &UserGroupKey {
        &self.key
    }

    /// Returns the role description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the raw group type, if the backend supplied one.
    #[must_use]
    pub fn user_group_type(&self) -> Option<&str> {
        self.user_group_type.as_deref()
    }

    /// Returns the audit columns.
    #[must_use]
    pub fn audit(&self) -> &AuditStamp {
        &self.audit
    }
}

/// One row of the user group directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroupSummary {
    key: UserGroupKey,
    description: String,
    status: Option<String>,
}

impl UserGroupSummary {
    /// Creates a directory row.
    #[must_use]
    pub fn new(key: UserGroupKey, description: impl Into<String>, status: Option<String>) -> Self {
        Self {
            key,
            description: description.into(),
            status,
        }
    }

    /// Returns the user group and company.
    #[must_use]
    pub fn key(&self) -> &UserGroupKey {
        &self.key
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the optional status label.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Returns whether the id or description contains the term, ignoring case.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.key
            .user_group_id()
            .as_str()
            .to_lowercase()
            .contains(needle.as_str())
            || self.description.to_lowercase().contains(needle.as_str())
    }
}
