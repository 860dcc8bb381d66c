use std::collections::{HashMap, HashSet};

use crate::{PermissionFlags, PermissionRecord, ScreenCatalog, ScreenId};

/// Overlays saved permission records onto a screen catalog.
///
/// Each child takes the flags of the record with the same screen id, or all-false
/// when no record exists. Record audit columns replace the child's where present.
/// Records whose screen id is not in the catalog are dropped; use
/// [`orphaned_records`] to report them. When several records share a screen id
/// the last one wins.
#[must_use]
pub fn merge_permissions(catalog: &ScreenCatalog, records: &[PermissionRecord]) -> ScreenCatalog {
    let saved: HashMap<&ScreenId, &PermissionRecord> = records
        .iter()
        .map(|record| (record.screen_id(), record))
        .collect();

    let parents = catalog
        .parents()
        .iter()
        .map(|parent| {
            let children = parent
                .children()
                .iter()
                .map(|child| match saved.get(child.screen_id()) {
                    Some(record) => child.with_permissions(
                        record.flags(),
                        child.audit().overlaid_with(record.audit()),
                    ),
                    None => child.with_permissions(PermissionFlags::default(), child.audit().clone()),
                })
                .collect();
            parent.with_children(children)
        })
        .collect();

    ScreenCatalog::from_validated(parents)
}

/// Returns screen ids of records that match no child screen, in first-seen order.
#[must_use]
pub fn orphaned_records(catalog: &ScreenCatalog, records: &[PermissionRecord]) -> Vec<ScreenId> {
    let known: HashSet<&ScreenId> = catalog.children().map(|child| child.screen_id()).collect();
    let mut reported = HashSet::new();

    records
        .iter()
        .map(PermissionRecord::screen_id)
        .filter(|screen_id| !known.contains(screen_id) && reported.insert(*screen_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use crate::{
        AuditStamp, ChildScreen, PermissionFlags, PermissionRecord, ScreenCatalog, ScreenId,
        ScreenNode, UserGroupKey,
    };

    use super::{merge_permissions, orphaned_records};

    fn screen_id(value: &str) -> ScreenId {
        match ScreenId::new(value) {
            Ok(screen_id) => screen_id,
            Err(error) => panic!("invalid test screen id '{value}': {error}"),
        }
    }

    fn key() -> UserGroupKey {
        match UserGroupKey::parse("ADMIN", "ACME") {
            Ok(key) => key,
            Err(error) => panic!("invalid test key: {error}"),
        }
    }

    fn record(id: &str, flags: PermissionFlags) -> PermissionRecord {
        PermissionRecord::new(key(), screen_id(id), flags, AuditStamp::default())
    }

    fn catalog_from_counts(child_counts: &[usize]) -> ScreenCatalog {
        let parents = child_counts
            .iter()
            .enumerate()
            .map(|(parent_index, count)| {
                let parent_id = screen_id(&format!("P{parent_index}"));
                let children = (0..*count)
                    .map(|child_index| {
                        ChildScreen::new(
                            screen_id(&format!("C{parent_index}-{child_index}")),
                            format!("Screen {parent_index}.{child_index}"),
                            parent_id.clone(),
                            PermissionFlags::default(),
                            AuditStamp::default(),
                        )
                    })
                    .collect();
                match ScreenNode::new(parent_id, format!("Group {parent_index}"), "Admin", children)
                {
                    Ok(parent) => parent,
                    Err(error) => panic!("generated parent rejected: {error}"),
                }
            })
            .collect();

        match ScreenCatalog::new(parents) {
            Ok(catalog) => catalog,
            Err(error) => panic!("generated catalog rejected: {error}"),
        }
    }

    fn single_parent_catalog() -> ScreenCatalog {
        catalog_from_counts(&[2])
    }

    fn flags_of(catalog: &ScreenCatalog) -> Vec<(String, PermissionFlags)> {
        catalog
            .children()
            .map(|child| (child.screen_id().as_str().to_owned(), child.flags()))
            .collect()
    }

    #[test]
    fn matching_record_sets_flags_and_others_default_to_false() {
        let catalog = single_parent_catalog();
        let records = vec![record("C0-0", PermissionFlags::new(true, false, false))];

        let merged = merge_permissions(&catalog, &records);

        assert_eq!(
            flags_of(&merged),
            vec![
                ("C0-0".to_owned(), PermissionFlags::new(true, false, false)),
                ("C0-1".to_owned(), PermissionFlags::default()),
            ]
        );
    }

    #[test]
    fn catalog_flags_without_a_record_are_reset() {
        let parent_id = screen_id("P0");
        let preset = ChildScreen::new(
            screen_id("C0-0"),
            "Users",
            parent_id.clone(),
            PermissionFlags::new(true, true, true),
            AuditStamp::default(),
        );
        let parent = match ScreenNode::new(parent_id, "Admin", "Admin", vec![preset]) {
            Ok(parent) => parent,
            Err(error) => panic!("parent rejected: {error}"),
        };
        let catalog = match ScreenCatalog::new(vec![parent]) {
            Ok(catalog) => catalog,
            Err(error) => panic!("catalog rejected: {error}"),
        };

        let merged = merge_permissions(&catalog, &[]);

        assert_eq!(
            flags_of(&merged),
            vec![("C0-0".to_owned(), PermissionFlags::default())]
        );
    }

    #[test]
    fn orphan_records_are_dropped_and_reported_once() {
        let catalog = single_parent_catalog();
        let records = vec![
            record("GONE", PermissionFlags::new(true, true, true)),
            record("C0-1", PermissionFlags::new(false, true, false)),
            record("GONE", PermissionFlags::new(true, false, false)),
        ];

        let merged = merge_permissions(&catalog, &records);

        assert_eq!(merged.child_count(), 2);
        assert!(!merged.contains_child(&screen_id("GONE")));
        assert_eq!(orphaned_records(&catalog, &records), vec![screen_id("GONE")]);
    }

    #[test]
    fn record_audit_columns_are_carried_onto_the_child() {
        let catalog = single_parent_catalog();
        let saved = PermissionRecord::new(
            key(),
            screen_id("C0-0"),
            PermissionFlags::new(true, true, false),
            AuditStamp {
                create_by: Some("seed".to_owned()),
                create_date: Some("2024-03-01T08:00:00.000Z".to_owned()),
                modify_by: None,
                modify_date: None,
            },
        );

        let merged = merge_permissions(&catalog, &[saved]);
        let Some(first) = merged.children().next() else {
            panic!("merged catalog lost its children");
        };

        assert_eq!(first.audit().create_by.as_deref(), Some("seed"));
        assert_eq!(first.audit().modify_by, None);
    }

    #[test]
    fn merge_leaves_inputs_untouched() {
        let catalog = single_parent_catalog();
        let records = vec![record("C0-0", PermissionFlags::new(true, true, true))];
        let catalog_before = catalog.clone();
        let records_before = records.clone();

        let _ = merge_permissions(&catalog, &records);

        assert_eq!(catalog, catalog_before);
        assert_eq!(records, records_before);
    }

    fn records_strategy() -> impl Strategy<Value = BTreeMap<String, (bool, bool, bool)>> {
        let screen_pool = prop_oneof![
            (0_usize..5, 0_usize..4).prop_map(|(parent, child)| format!("C{parent}-{child}")),
            (0_usize..3).prop_map(|orphan| format!("X{orphan}")),
        ];
        prop::collection::btree_map(screen_pool, any::<(bool, bool, bool)>(), 0..12)
    }

    fn to_records(generated: &BTreeMap<String, (bool, bool, bool)>) -> Vec<PermissionRecord> {
        generated
            .iter()
            .map(|(id, (read, write, delete))| {
                record(id, PermissionFlags::new(*read, *write, *delete))
            })
            .collect()
    }

    proptest! {
        #[test]
        fn merge_preserves_child_count(
            child_counts in prop::collection::vec(0_usize..4, 0..5),
            generated in records_strategy(),
        ) {
            let catalog = catalog_from_counts(&child_counts);
            let merged = merge_permissions(&catalog, &to_records(&generated));

            prop_assert_eq!(merged.child_count(), catalog.child_count());
            prop_assert_eq!(merged.parents().len(), catalog.parents().len());
        }

        #[test]
        fn merge_only_grants_flags_backed_by_a_record(
            child_counts in prop::collection::vec(0_usize..4, 0..5),
            generated in records_strategy(),
        ) {
            let catalog = catalog_from_counts(&child_counts);
            let merged = merge_permissions(&catalog, &to_records(&generated));

            for child in merged.children() {
                let expected = generated
                    .get(child.screen_id().as_str())
                    .map(|(read, write, delete)| PermissionFlags::new(*read, *write, *delete))
                    .unwrap_or_default();
                prop_assert_eq!(child.flags(), expected);
            }
        }

        #[test]
        fn merge_is_deterministic_and_idempotent(
            child_counts in prop::collection::vec(0_usize..4, 0..5),
            generated in records_strategy(),
        ) {
            let catalog = catalog_from_counts(&child_counts);
            let records = to_records(&generated);

            let first = merge_permissions(&catalog, &records);
            let second = merge_permissions(&catalog, &records);
            let remerged = merge_permissions(&first, &records);

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&first, &remerged);
        }
    }
}
