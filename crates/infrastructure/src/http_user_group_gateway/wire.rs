//! Backend payload shapes.
//!
//! Requests are wrapped as `{"JSON": "<string-encoded body>"}`. Responses may
//! arrive bare or wrapped in a `data` member.

use rolegrid_application::{SaveUserGroupRequest, UserGroupSnapshot};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{
    AuditStamp, ChildScreen, PermissionFlags, PermissionRecord, ScreenCatalog, ScreenId,
    ScreenNode, UserGroupHeader, UserGroupKey, UserGroupSummary,
};
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

const RESERVED_COLUMN_COUNT: usize = 15;

/// `{"JSON": "..."}` request wrapper.
#[derive(Debug, Serialize)]
pub(super) struct Envelope {
    #[serde(rename = "JSON")]
    json: String,
}

impl Envelope {
    pub(super) fn wrap<T: Serialize>(operation: &str, inner: &T) -> AppResult<Self> {
        let json = serde_json::to_string(inner).map_err(|error| {
            AppError::Internal(format!("failed to encode {operation} request: {error}"))
        })?;
        Ok(Self { json })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct ResponseStatus {
    #[serde(default, deserialize_with = "lenient_text")]
    pub(super) response_text: String,
    #[serde(default, deserialize_with = "lenient_error_code")]
    pub(super) error_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct KeyRow<'a> {
    user_group_id: &'a str,
    company_id: &'a str,
}

/// Inner body of `GetScreenGroup`, `GetUserGroup` and `DeleteUserGroup`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct KeyRequest<'a> {
    header: [KeyRow<'a>; 1],
    response: [ResponseStatus; 1],
}

impl<'a> KeyRequest<'a> {
    pub(super) fn new(key: &'a UserGroupKey) -> Self {
        Self {
            header: [KeyRow {
                user_group_id: key.user_group_id().as_str(),
                company_id: key.company_id().as_str(),
            }],
            response: [ResponseStatus::default()],
        }
    }
}

/// Backend extension columns `Intallia1`..`Intallia15`, always sent as `null`.
#[derive(Debug, Clone, Copy, Default)]
struct ReservedColumns;

impl Serialize for ReservedColumns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(RESERVED_COLUMN_COUNT))?;
        for index in 1..=RESERVED_COLUMN_COUNT {
            map.serialize_entry(&format!("Intallia{index}"), &Option::<String>::None)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct HeaderRow<'a> {
    user_group_id: &'a str,
    company_id: &'a str,
    description: &'a str,
    #[serde(rename = "UsewrGroupType")]
    user_group_type: Option<&'a str>,
    create_by: Option<&'a str>,
    create_date: Option<&'a str>,
    modify_by: Option<&'a str>,
    modify_date: Option<&'a str>,
    #[serde(flatten)]
    reserved: ReservedColumns,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetailRow<'a> {
    user_group_id: &'a str,
    company_id: &'a str,
    screen_id: &'a str,
    read_permission: bool,
    write_permission: bool,
    delete_permission: bool,
    create_by: Option<&'a str>,
    create_date: Option<&'a str>,
    modify_by: Option<&'a str>,
    modify_date: Option<&'a str>,
    #[serde(flatten)]
    reserved: ReservedColumns,
}

/// Inner body of `AddUserGroup` and `UpdateUserGroup`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct SaveRequest<'a> {
    header: [HeaderRow<'a>; 1],
    details: Vec<DetailRow<'a>>,
    response: [ResponseStatus; 1],
}

impl<'a> SaveRequest<'a> {
    pub(super) fn new(request: &'a SaveUserGroupRequest) -> Self {
        let header = &request.header;
        let audit = header.audit();
        Self {
            header: [HeaderRow {
                user_group_id: header.key().user_group_id().as_str(),
                company_id: header.key().company_id().as_str(),
                description: header.description(),
                user_group_type: header.user_group_type(),
                create_by: audit.create_by.as_deref(),
                create_date: audit.create_date.as_deref(),
                modify_by: audit.modify_by.as_deref(),
                modify_date: audit.modify_date.as_deref(),
                reserved: ReservedColumns,
            }],
            details: request
                .details
                .iter()
                .map(|detail| {
                    let flags = detail.flags();
                    let audit = detail.audit();
                    DetailRow {
                        user_group_id: detail.key().user_group_id().as_str(),
                        company_id: detail.key().company_id().as_str(),
                        screen_id: detail.screen_id().as_str(),
                        read_permission: flags.read,
                        write_permission: flags.write,
                        delete_permission: flags.delete,
                        create_by: audit.create_by.as_deref(),
                        create_date: audit.create_date.as_deref(),
                        modify_by: audit.modify_by.as_deref(),
                        modify_date: audit.modify_date.as_deref(),
                        reserved: ReservedColumns,
                    }
                })
                .collect(),
            response: [ResponseStatus::default()],
        }
    }
}

/// Plain (non-enveloped) body of `GETLookupData`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct LookupRequest {
    screen_name: &'static str,
    #[serde(rename = "LookUpKey")]
    lookup_key: &'static str,
    filter1: &'static str,
    filter2: &'static str,
    filter3: &'static str,
    filter4: &'static str,
    filter5: &'static str,
}

impl LookupRequest {
    pub(super) fn user_group_list() -> Self {
        Self {
            screen_name: "UserGroup",
            lookup_key: "GetList",
            filter1: "",
            filter2: "",
            filter3: "",
            filter4: "",
            filter5: "",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireAudit {
    #[serde(default)]
    create_by: Option<String>,
    #[serde(default)]
    create_date: Option<String>,
    #[serde(default)]
    modify_by: Option<String>,
    #[serde(default)]
    modify_date: Option<String>,
}

impl From<WireAudit> for AuditStamp {
    fn from(value: WireAudit) -> Self {
        Self {
            create_by: value.create_by,
            create_date: value.create_date,
            modify_by: value.modify_by,
            modify_date: value.modify_date,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireChildScreen {
    screen_id: String,
    #[serde(default)]
    screen_name: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    read_permission: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    write_permission: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    delete_permission: bool,
    #[serde(flatten)]
    audit: WireAudit,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireParentScreen {
    screen_id: String,
    #[serde(default)]
    screen_name: String,
    #[serde(default)]
    parent_name: String,
    #[serde(default)]
    screen_name_data: Vec<WireChildScreen>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireHeader {
    #[serde(default)]
    user_group_id: Option<String>,
    #[serde(default)]
    company_id: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "UsewrGroupType", alias = "UserGroupType")]
    user_group_type: Option<String>,
    #[serde(flatten)]
    audit: WireAudit,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDetail {
    #[serde(default)]
    user_group_id: Option<String>,
    #[serde(default)]
    company_id: Option<String>,
    screen_id: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    read_permission: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    write_permission: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    delete_permission: bool,
    #[serde(flatten)]
    audit: WireAudit,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireUserGroup {
    #[serde(default)]
    header: Vec<WireHeader>,
    #[serde(default)]
    details: Vec<WireDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireLookupRow {
    user_group_id: String,
    company_id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireLookup {
    #[serde(rename = "LookupData", default)]
    lookup_data: Vec<WireLookupRow>,
}

#[derive(Debug, Default, Deserialize)]
struct WireStatus {
    #[serde(rename = "Response", default)]
    response: Vec<ResponseStatus>,
}

/// Parses a response body into the backend payload.
///
/// Empty bodies become `null`; a `data` wrapper and string-encoded JSON are unwrapped.
pub(super) fn unwrap_body(operation: &str, body: &str) -> AppResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let mut value: Value = serde_json::from_str(body).map_err(|error| {
        AppError::Internal(format!("{operation} returned invalid JSON: {error}"))
    })?;
    if let Value::Object(object) = &mut value
        && let Some(data) = object.remove("data")
    {
        value = data;
    }
    if let Value::String(encoded) = &value {
        value = serde_json::from_str(encoded).map_err(|error| {
            AppError::Internal(format!("{operation} returned invalid JSON string: {error}"))
        })?;
    }

    Ok(value)
}

/// Fails when the payload carries a `Response` row with a non-empty `ErrorCode`.
pub(super) fn ensure_accepted(operation: &str, payload: &Value) -> AppResult<()> {
    if !payload.is_object() {
        return Ok(());
    }

    let status: WireStatus = decode(operation, payload.clone())?;
    match status
        .response
        .into_iter()
        .find(|row| !row.error_code.trim().is_empty())
    {
        Some(row) => Err(AppError::Internal(format!(
            "{operation} rejected with error code {}: {}",
            row.error_code.trim(),
            row.response_text.trim()
        ))),
        None => Ok(()),
    }
}

pub(super) fn decode_screen_catalog(payload: Value) -> AppResult<ScreenCatalog> {
    if payload.is_null() {
        return Ok(ScreenCatalog::default());
    }

    let parents: Vec<WireParentScreen> = decode("GetScreenGroup", payload)?;
    let parents = parents
        .into_iter()
        .map(|parent| {
            let parent_id = ScreenId::new(parent.screen_id)?;
            let children = parent
                .screen_name_data
                .into_iter()
                .map(|child| {
                    Ok(ChildScreen::new(
                        ScreenId::new(child.screen_id)?,
                        child.screen_name,
                        parent_id.clone(),
                        PermissionFlags::new(
                            child.read_permission,
                            child.write_permission,
                            child.delete_permission,
                        ),
                        child.audit.into(),
                    ))
                })
                .collect::<AppResult<Vec<_>>>()?;
            ScreenNode::new(parent_id, parent.screen_name, parent.parent_name, children)
        })
        .collect::<AppResult<Vec<_>>>()?;

    ScreenCatalog::new(parents)
}

pub(super) fn decode_user_group(key: &UserGroupKey, payload: Value) -> AppResult<UserGroupSnapshot> {
    if payload.is_null() {
        return Ok(UserGroupSnapshot::default());
    }

    let user_group: WireUserGroup = decode("GetUserGroup", payload)?;
    let header = user_group
        .header
        .into_iter()
        .next()
        .map(|header| {
            Ok::<_, AppError>(UserGroupHeader::new(
                row_key(key, header.user_group_id, header.company_id)?,
                header.description.unwrap_or_default(),
                header.user_group_type,
                header.audit.into(),
            ))
        })
        .transpose()?;
    let details = user_group
        .details
        .into_iter()
        .map(|detail| {
            Ok(PermissionRecord::new(
                row_key(key, detail.user_group_id, detail.company_id)?,
                ScreenId::new(detail.screen_id)?,
                PermissionFlags::new(
                    detail.read_permission,
                    detail.write_permission,
                    detail.delete_permission,
                ),
                detail.audit.into(),
            ))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(UserGroupSnapshot { header, details })
}

pub(super) fn decode_lookup(payload: Value) -> AppResult<Vec<UserGroupSummary>> {
    if payload.is_null() {
        return Ok(Vec::new());
    }

    let lookup: WireLookup = decode("GETLookupData", payload)?;
    lookup
        .lookup_data
        .into_iter()
        .map(|row| {
            Ok(UserGroupSummary::new(
                UserGroupKey::parse(row.user_group_id, row.company_id)?,
                row.description.unwrap_or_default(),
                row.status,
            ))
        })
        .collect()
}

fn row_key(
    requested: &UserGroupKey,
    user_group_id: Option<String>,
    company_id: Option<String>,
) -> AppResult<UserGroupKey> {
    UserGroupKey::parse(
        non_blank(user_group_id).unwrap_or_else(|| requested.user_group_id().as_str().to_owned()),
        non_blank(company_id).unwrap_or_else(|| requested.company_id().as_str().to_owned()),
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn decode<T: DeserializeOwned>(operation: &str, payload: Value) -> AppResult<T> {
    serde_json::from_value(payload).map_err(|error| {
        AppError::Internal(format!("{operation} returned an unexpected payload: {error}"))
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(value) => Ok(value),
        Value::Number(value) => match (value.as_i64(), value.as_u64()) {
            (Some(integer), _) => Ok(integer != 0),
            (None, Some(_)) => Ok(true),
            (None, None) => Err(D::Error::custom(format!(
                "unsupported permission flag value {value}"
            ))),
        },
        Value::String(value) => match value.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "n" | "no" => Ok(false),
            "1" | "true" | "y" | "yes" => Ok(true),
            other => Err(D::Error::custom(format!(
                "unsupported permission flag value '{other}'"
            ))),
        },
        other => Err(D::Error::custom(format!(
            "unsupported permission flag value {other}"
        ))),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(value) => Ok(value),
        Value::Bool(value) => Ok(value.to_string()),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(D::Error::custom(format!(
            "unsupported response status value {other}"
        ))),
    }
}

/// `null`, `""` and `0` all mean "no error".
fn lenient_error_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let code = lenient_text(deserializer)?;
    match code.trim() {
        "0" => Ok(String::new()),
        _ => Ok(code),
    }
}
