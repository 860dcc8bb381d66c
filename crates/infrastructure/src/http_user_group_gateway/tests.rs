use rolegrid_application::SaveUserGroupRequest;
use rolegrid_core::AppError;
use rolegrid_domain::{
    AuditStamp, PermissionFlags, PermissionRecord, ScreenId, UserGroupHeader, UserGroupKey,
};
use serde_json::{Value, json};
use url::Url;

use super::HttpUserGroupGateway;
use super::wire::{
    Envelope, KeyRequest, LookupRequest, SaveRequest, decode_lookup, decode_screen_catalog,
    decode_user_group, ensure_accepted, unwrap_body,
};

fn key() -> UserGroupKey {
    match UserGroupKey::parse("ADMIN", "Intallia24") {
        Ok(key) => key,
        Err(error) => panic!("invalid key: {error}"),
    }
}

fn stamp(by: &str, date: &str) -> AuditStamp {
    AuditStamp {
        create_by: Some(by.to_owned()),
        create_date: Some(date.to_owned()),
        modify_by: Some("alice".to_owned()),
        modify_date: Some("2025-06-01T12:30:00.000Z".to_owned()),
    }
}

fn inner_json(envelope: &Envelope) -> Value {
    let outer = match serde_json::to_value(envelope) {
        Ok(outer) => outer,
        Err(error) => panic!("envelope did not serialize: {error}"),
    };
    let Some(encoded) = outer.get("JSON").and_then(Value::as_str) else {
        panic!("envelope has no string JSON member: {outer}");
    };
    match serde_json::from_str(encoded) {
        Ok(inner) => inner,
        Err(error) => panic!("inner body is not JSON: {error}"),
    }
}

#[test]
fn key_request_is_string_encoded_inside_the_envelope() {
    let key = key();
    let envelope = match Envelope::wrap("GetScreenGroup", &KeyRequest::new(&key)) {
        Ok(envelope) => envelope,
        Err(error) => panic!("wrap failed: {error}"),
    };

    assert_eq!(
        inner_json(&envelope),
        json!({
            "Header": [{"UserGroupId": "ADMIN", "CompanyId": "Intallia24"}],
            "Response": [{"ResponseText": "", "ErrorCode": ""}]
        })
    );
}

#[test]
fn save_request_carries_reserved_columns_and_backend_type_spelling() {
    let request = SaveUserGroupRequest {
        header: UserGroupHeader::new(
            key(),
            "Administrators",
            Some("Admin".to_owned()),
            stamp("founder", "2023-01-01T00:00:00.000Z"),
        ),
        details: vec![PermissionRecord::new(
            key(),
            match ScreenId::new("C1") {
                Ok(screen_id) => screen_id,
                Err(error) => panic!("invalid screen id: {error}"),
            },
            PermissionFlags::new(true, false, true),
            stamp("founder", "2023-01-01T00:00:00.000Z"),
        )],
    };

    let envelope = match Envelope::wrap("UpdateUserGroup", &SaveRequest::new(&request)) {
        Ok(envelope) => envelope,
        Err(error) => panic!("wrap failed: {error}"),
    };
    let inner = inner_json(&envelope);

    let header = &inner["Header"][0];
    assert_eq!(header["UsewrGroupType"], json!("Admin"));
    assert_eq!(header["Description"], json!("Administrators"));
    assert_eq!(header["CreateBy"], json!("founder"));
    assert_eq!(header["ModifyBy"], json!("alice"));
    assert!(header.get("UserGroupType").is_none());

    let detail = &inner["Details"][0];
    assert_eq!(detail["ScreenId"], json!("C1"));
    assert_eq!(detail["ReadPermission"], json!(true));
    assert_eq!(detail["WritePermission"], json!(false));
    assert_eq!(detail["DeletePermission"], json!(true));
    assert_eq!(detail["CompanyId"], json!("Intallia24"));

    for row in [header, detail] {
        for index in 1..=15 {
            let column = format!("Intallia{index}");
            assert_eq!(row.get(column.as_str()), Some(&Value::Null), "{column}");
        }
    }
    assert_eq!(inner["Response"][0]["ErrorCode"], json!(""));
}

#[test]
fn lookup_request_is_sent_plain() {
    let body = match serde_json::to_value(LookupRequest::user_group_list()) {
        Ok(body) => body,
        Err(error) => panic!("lookup request did not serialize: {error}"),
    };

    assert_eq!(
        body,
        json!({
            "ScreenName": "UserGroup",
            "LookUpKey": "GetList",
            "Filter1": "",
            "Filter2": "",
            "Filter3": "",
            "Filter4": "",
            "Filter5": ""
        })
    );
}

#[test]
fn screen_group_payload_decodes_into_a_catalog() {
    let body = r#"{"data": [
        {
            "ScreenId": "P1",
            "ScreenName": "User Management",
            "ParentName": "Administration",
            "ScreenNameData": [
                {"ScreenId": "C1", "ScreenName": "Users", "ParentName": "User Management",
                 "UserGroupId": "ADMIN", "ReadPermission": true, "WritePermission": false,
                 "DeletePermission": false, "CreateBy": "founder", "CreateDate": null},
                {"ScreenId": "C2", "ScreenName": "Roles", "ParentName": "User Management",
                 "UserGroupId": "ADMIN", "ReadPermission": "1", "WritePermission": 0,
                 "DeletePermission": null}
            ]
        },
        {"ScreenId": "P2", "ScreenName": "Simulation", "ParentName": "Tools", "ScreenNameData": []}
    ]}"#;

    let payload = match unwrap_body("GetScreenGroup", body) {
        Ok(payload) => payload,
        Err(error) => panic!("body rejected: {error}"),
    };
    let catalog = match decode_screen_catalog(payload) {
        Ok(catalog) => catalog,
        Err(error) => panic!("catalog rejected: {error}"),
    };

    assert_eq!(catalog.parents().len(), 2);
    assert_eq!(catalog.child_count(), 2);
    let children: Vec<(&str, &str, PermissionFlags)> = catalog
        .children()
        .map(|child| {
            (
                child.screen_id().as_str(),
                child.parent_screen_id().as_str(),
                child.flags(),
            )
        })
        .collect();
    assert_eq!(
        children,
        vec![
            ("C1", "P1", PermissionFlags::new(true, false, false)),
            ("C2", "P1", PermissionFlags::new(true, false, false)),
        ]
    );
    assert_eq!(
        catalog.parents()[0].children()[0].audit().create_by.as_deref(),
        Some("founder")
    );
}

#[test]
fn null_or_empty_bodies_are_empty_catalogs() {
    for body in ["", "null", r#"{"data": null}"#] {
        let payload = match unwrap_body("GetScreenGroup", body) {
            Ok(payload) => payload,
            Err(error) => panic!("body '{body}' rejected: {error}"),
        };
        assert!(matches!(decode_screen_catalog(payload), Ok(catalog) if catalog.is_empty()));
    }
}

#[test]
fn string_encoded_payloads_are_unwrapped() {
    let body = r#"{"data": "{\"LookupData\":[{\"UserGroupId\":\"ADMIN\",\"CompanyId\":\"Intallia24\",\"Description\":\"Administrators\",\"Status\":\"Active\"}]}"}"#;

    let payload = match unwrap_body("GETLookupData", body) {
        Ok(payload) => payload,
        Err(error) => panic!("body rejected: {error}"),
    };
    let summaries = match decode_lookup(payload) {
        Ok(summaries) => summaries,
        Err(error) => panic!("lookup rejected: {error}"),
    };

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].key(), &key());
    assert_eq!(summaries[0].description(), "Administrators");
    assert_eq!(summaries[0].status(), Some("Active"));
}

#[test]
fn user_group_payload_decodes_header_and_details() {
    let payload = json!({
        "Header": [{
            "UserGroupId": "ADMIN",
            "CompanyId": "Intallia24",
            "Description": "Administrators",
            "UsewrGroupType": "Admin",
            "CreateBy": "founder",
            "CreateDate": "2023-01-01T00:00:00.000Z",
            "Intallia1": null
        }],
        "Details": [
            {"ScreenId": "C2", "ReadPermission": true, "WritePermission": "true",
             "DeletePermission": false, "CreateBy": "bob"},
            {"UserGroupId": "ADMIN", "CompanyId": "Intallia24", "ScreenId": "C9",
             "ReadPermission": 1, "WritePermission": 0, "DeletePermission": 0}
        ],
        "Response": [{"ResponseText": "", "ErrorCode": ""}]
    });

    assert!(ensure_accepted("GetUserGroup", &payload).is_ok());
    let snapshot = match decode_user_group(&key(), payload) {
        Ok(snapshot) => snapshot,
        Err(error) => panic!("user group rejected: {error}"),
    };

    let Some(header) = snapshot.header else {
        panic!("header missing");
    };
    assert_eq!(header.user_group_type(), Some("Admin"));
    assert_eq!(header.audit().create_by.as_deref(), Some("founder"));
    assert_eq!(snapshot.details.len(), 2);
    assert_eq!(snapshot.details[0].key(), &key());
    assert_eq!(snapshot.details[0].flags(), PermissionFlags::new(true, true, false));
    assert_eq!(snapshot.details[0].audit().create_by.as_deref(), Some("bob"));
    assert_eq!(snapshot.details[1].flags(), PermissionFlags::new(true, false, false));
}

#[test]
fn user_group_without_rows_is_an_empty_snapshot() {
    let snapshot = decode_user_group(&key(), json!({"Header": [], "Details": []}));

    assert!(matches!(snapshot, Ok(snapshot) if snapshot.header.is_none() && snapshot.details.is_empty()));
}

#[test]
fn error_code_fails_even_on_success_status() {
    let payload = json!({
        "Response": [{"ResponseText": "User group already exists", "ErrorCode": "E102"}]
    });

    let result = ensure_accepted("AddUserGroup", &payload);

    assert_eq!(
        result,
        Err(AppError::Internal(
            "AddUserGroup rejected with error code E102: User group already exists".to_owned()
        ))
    );
}

#[test]
fn null_or_zero_error_codes_are_success() {
    for payload in [
        json!({"Response": [{"ResponseText": null, "ErrorCode": null}]}),
        json!({"Response": [{"ResponseText": "Saved", "ErrorCode": 0}]}),
        json!({"Response": [{"ResponseText": "", "ErrorCode": "0"}]}),
        json!({"Response": [{}]}),
    ] {
        assert_eq!(ensure_accepted("UpdateUserGroup", &payload), Ok(()), "{payload}");
    }
}

#[test]
fn numeric_error_code_is_reported_as_text() {
    let payload = json!({
        "Response": [{"ResponseText": null, "ErrorCode": 102}]
    });

    let result = ensure_accepted("AddUserGroup", &payload);

    assert_eq!(
        result,
        Err(AppError::Internal(
            "AddUserGroup rejected with error code 102: ".to_owned()
        ))
    );
}

#[test]
fn unsupported_flag_values_are_rejected() {
    let payload = json!([{
        "ScreenId": "P1",
        "ScreenNameData": [{"ScreenId": "C1", "ReadPermission": "maybe"}]
    }]);

    assert!(matches!(decode_screen_catalog(payload), Err(AppError::Internal(_))));
}

#[test]
fn fractional_flag_values_are_rejected() {
    let payload = json!([{
        "ScreenId": "P1",
        "ScreenNameData": [{"ScreenId": "C1", "ReadPermission": 1.0}]
    }]);

    assert!(matches!(decode_screen_catalog(payload), Err(AppError::Internal(_))));
}

#[test]
fn large_unsigned_flag_values_are_true() {
    let payload = json!([{
        "ScreenId": "P1",
        "ScreenNameData": [{"ScreenId": "C1", "ReadPermission": u64::MAX}]
    }]);

    let catalog = match decode_screen_catalog(payload) {
        Ok(catalog) => catalog,
        Err(error) => panic!("catalog rejected: {error}"),
    };

    let flags: Vec<PermissionFlags> = catalog.children().map(|child| child.flags()).collect();
    assert_eq!(flags, vec![PermissionFlags::new(true, false, false)]);
}

#[test]
fn endpoints_are_joined_below_the_base_path() {
    let base_url = match Url::parse("https://backend.example/api") {
        Ok(url) => url,
        Err(error) => panic!("invalid url: {error}"),
    };
    let gateway = HttpUserGroupGateway::new(reqwest::Client::new(), base_url, Some(" ".to_owned()));

    let endpoint = gateway.endpoint("GetUserGroup");

    assert_eq!(
        endpoint.map(String::from),
        Ok("https://backend.example/api/GetUserGroup".to_owned())
    );
    assert!(gateway.api_token.is_none());
}
