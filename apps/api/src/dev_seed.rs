use rolegrid_core::AppResult;
use rolegrid_domain::{
    AuditStamp, ChildScreen, PermissionFlags, PermissionRecord, ScreenCatalog, ScreenId,
    ScreenNode, UserGroupHeader, UserGroupKey,
};
use rolegrid_infrastructure::InMemoryUserGroupGateway;
use tracing::info;

const DEV_SEED_COMPANY_ID: &str = "Intallia24";
const DEV_SEED_USER_GROUP_ID: &str = "ADMIN";
const DEV_SEED_CREATED_BY: &str = "seed";
const DEV_SEED_CREATED_AT: &str = "2024-01-01T00:00:00.000Z";

const DEV_SEED_SCREENS: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "USRMGMT",
        "User Management",
        &[
            ("USERS", "Users"),
            ("ROLES", "Roles & Access"),
            ("COMPANIES", "Companies"),
        ],
    ),
    (
        "SUBSCR",
        "Subscriptions",
        &[("PLANS", "Plans"), ("BILLING", "Billing")],
    ),
    (
        "SIMULATION",
        "Simulation",
        &[("SCENARIOS", "Scenarios"), ("REPORTS", "Reports")],
    ),
];

const DEV_SEED_GRANTS: &[(&str, bool, bool, bool)] = &[
    ("USERS", true, true, true),
    ("ROLES", true, true, false),
    ("COMPANIES", true, false, false),
    ("REPORTS", true, false, false),
];

/// Builds an in-memory backend with a demo screen catalog and one administrator role.
pub async fn seeded_gateway() -> AppResult<InMemoryUserGroupGateway> {
    let gateway = InMemoryUserGroupGateway::new(seed_catalog()?);

    let key = UserGroupKey::parse(DEV_SEED_USER_GROUP_ID, DEV_SEED_COMPANY_ID)?;
    let audit = AuditStamp {
        create_by: Some(DEV_SEED_CREATED_BY.to_owned()),
        create_date: Some(DEV_SEED_CREATED_AT.to_owned()),
        modify_by: Some(DEV_SEED_CREATED_BY.to_owned()),
        modify_date: Some(DEV_SEED_CREATED_AT.to_owned()),
    };
    let details = DEV_SEED_GRANTS
        .iter()
        .map(|(screen_id, read, write, delete)| {
            Ok(PermissionRecord::new(
                key.clone(),
                ScreenId::new(*screen_id)?,
                PermissionFlags::new(*read, *write, *delete),
                audit.clone(),
            ))
        })
        .collect::<AppResult<Vec<_>>>()?;
    let header = UserGroupHeader::new(key, "Administrators", Some("Admin".to_owned()), audit);

    gateway.seed_user_group(header, details).await;
    info!(
        user_group_id = DEV_SEED_USER_GROUP_ID,
        company_id = DEV_SEED_COMPANY_ID,
        "seeded in-memory user group backend"
    );
    Ok(gateway)
}

fn seed_catalog() -> AppResult<ScreenCatalog> {
    let parents = DEV_SEED_SCREENS
        .iter()
        .map(|(parent_id, parent_name, children)| {
            let parent_id = ScreenId::new(*parent_id)?;
            let children = children
                .iter()
                .map(|(child_id, child_name)| {
                    Ok(ChildScreen::new(
                        ScreenId::new(*child_id)?,
                        *child_name,
                        parent_id.clone(),
                        PermissionFlags::default(),
                        AuditStamp::default(),
                    ))
                })
                .collect::<AppResult<Vec<_>>>()?;
            ScreenNode::new(parent_id, *parent_name, "Administration", children)
        })
        .collect::<AppResult<Vec<_>>>()?;

    ScreenCatalog::new(parents)
}
