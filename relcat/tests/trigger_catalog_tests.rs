//! Trigger catalog behavior: insert, lookup, drop and cache refresh

#[path = "testutils/mod.rs"]
mod testutils;

use chrono::{TimeZone, Utc};
use relcat::catalog::{CatalogError, ErrorKind};
use relcat::txn::AccessMode;
use relcat::{Oid, ResultType, TriggerType};
use testutils::test_fixture::TestFixture;

fn insert(
    fixture: &TestFixture,
    table_oid: Oid,
    name: &str,
    trigger_type: TriggerType,
    fire_condition: Option<Vec<u8>>,
) -> Oid {
    fixture.with_txn(|txn| {
        fixture
            .catalogs()
            .triggers()
            .insert_trigger(
                table_oid,
                name,
                trigger_type,
                "audit_fn",
                "a,b",
                fire_condition,
                Utc::now(),
                txn,
            )
            .expect("insert trigger")
    })
}

#[test]
fn test_trigger_oid_lookup_is_scoped_to_table() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    let oid = insert(&fixture, Oid::new(5), "t1", TriggerType::from(1), None);
    assert!(oid.is_valid());

    fixture.with_txn(|txn| {
        let triggers = fixture.catalogs().triggers();
        assert_eq!(triggers.get_trigger_oid("t1", Oid::new(5), txn).unwrap(), oid);
        assert_eq!(
            triggers.get_trigger_oid("t1", Oid::new(6), txn).unwrap(),
            Oid::INVALID
        );
        assert_eq!(
            triggers.get_trigger_oid("t2", Oid::new(5), txn).unwrap(),
            Oid::INVALID
        );
    });
}

#[test]
fn test_triggers_by_type_matches_exact_type_and_table() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    insert(&fixture, Oid::new(5), "t2", TriggerType::from(2), None);
    insert(&fixture, Oid::new(5), "t1", TriggerType::from(1), None);
    insert(&fixture, Oid::new(6), "t3", TriggerType::from(1), None);

    fixture.with_txn(|txn| {
        let list = fixture
            .catalogs()
            .triggers()
            .get_triggers_by_type(Oid::new(5), TriggerType::from(1), txn)
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.names(), vec!["t1"]);
        assert_eq!(list.get(0).unwrap().trigger_type, TriggerType::from(1));
        assert_eq!(list.get(0).unwrap().args(), vec!["a", "b"]);

        let all = fixture
            .catalogs()
            .triggers()
            .get_triggers(Oid::new(5), txn)
            .unwrap();
        assert_eq!(all.len(), 2);
    });
}

#[test]
fn test_drop_trigger_then_second_drop_fails() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    let table_oid = fixture.create_table("app", "orders");
    insert(&fixture, table_oid, "t1", TriggerType::ROW | TriggerType::INSERT, None);
    insert(&fixture, table_oid, "t2", TriggerType::ROW | TriggerType::DELETE, None);

    let txn = fixture.begin();
    let triggers = fixture.catalogs().triggers();
    let first = triggers.drop_trigger("app", "orders", "t1", &txn);
    assert_eq!(ResultType::from(&first), ResultType::Success);

    assert_eq!(
        triggers.get_trigger_oid("t1", table_oid, &txn).unwrap(),
        Oid::INVALID
    );
    assert_eq!(
        triggers.get_triggers(table_oid, &txn).unwrap().names(),
        vec!["t2"]
    );

    let second = triggers.drop_trigger("app", "orders", "t1", &txn);
    assert_eq!(ResultType::from(&second), ResultType::Failure);
    assert_eq!(second.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(triggers.get_triggers(table_oid, &txn).unwrap().len(), 1);
    fixture.commit(&txn);
}

#[test]
fn test_drop_trigger_on_unknown_table_fails() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    fixture.create_table("app", "orders");
    fixture.with_txn(|txn| {
        let triggers = fixture.catalogs().triggers();
        assert!(matches!(
            triggers.drop_trigger("app", "missing", "t1", txn),
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            triggers.drop_trigger("nowhere", "orders", "t1", txn),
            Err(CatalogError::NotFound(_))
        ));
    });
}

#[test]
fn test_drop_trigger_without_active_transaction_deletes_nothing() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    let table_oid = fixture.create_table("app", "orders");
    insert(&fixture, table_oid, "t1", TriggerType::from(1), None);

    let finished = fixture.begin();
    fixture.commit(&finished);
    let result = fixture
        .catalogs()
        .triggers()
        .drop_trigger("app", "orders", "t1", &finished);
    assert_eq!(ResultType::from(&result), ResultType::Failure);
    assert!(matches!(result, Err(CatalogError::InvalidTransaction(_))));

    fixture.with_txn(|txn| {
        assert!(fixture
            .catalogs()
            .triggers()
            .get_trigger_oid("t1", table_oid, txn)
            .unwrap()
            .is_valid());
    });
}

#[test]
fn test_fire_condition_is_byte_identical() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    let blob: Vec<u8> = vec![0x00, 0xff, 0x10, 0x00, 0x7f, 0x80, 0x00];
    insert(&fixture, Oid::new(5), "t1", TriggerType::from(1), Some(blob.clone()));
    insert(&fixture, Oid::new(5), "t2", TriggerType::from(2), None);

    fixture.with_txn(|txn| {
        let triggers = fixture.catalogs().triggers();
        let by_type = triggers
            .get_triggers_by_type(Oid::new(5), TriggerType::from(1), txn)
            .unwrap();
        assert_eq!(by_type.get(0).unwrap().fire_condition.as_deref(), Some(&blob[..]));

        let all = triggers.get_triggers(Oid::new(5), txn).unwrap();
        let t2 = all.iter().find(|t| t.name == "t2").unwrap();
        assert_eq!(t2.fire_condition, None);
    });
}

#[test]
fn test_timestamp_round_trips() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    let created = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap();
    fixture.with_txn(|txn| {
        fixture
            .catalogs()
            .triggers()
            .insert_trigger(
                Oid::new(5),
                "t1",
                TriggerType::from(1),
                "f",
                "",
                None,
                created,
                txn,
            )
            .unwrap();
        let list = fixture
            .catalogs()
            .triggers()
            .get_triggers(Oid::new(5), txn)
            .unwrap();
        assert_eq!(list.get(0).unwrap().timestamp, Some(created));
        assert!(list.get(0).unwrap().args().is_empty());
    });
}

#[test]
fn test_table_trigger_cache_follows_catalog() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    let table_oid = fixture.create_table("app", "orders");
    let table = fixture
        .catalogs()
        .registry()
        .get_table(table_oid)
        .expect("table registered");
    assert!(table.trigger_list().is_none());

    insert(&fixture, table_oid, "t1", TriggerType::from(1), None);
    insert(&fixture, table_oid, "t2", TriggerType::from(2), None);
    assert_eq!(table.trigger_list().unwrap().names(), vec!["t1", "t2"]);

    fixture.with_txn(|txn| {
        fixture
            .catalogs()
            .triggers()
            .drop_trigger("app", "orders", "t1", txn)
            .unwrap();
    });
    assert_eq!(table.trigger_list().unwrap().names(), vec!["t2"]);
}

#[test]
fn test_aborted_trigger_changes_leave_table_cache_alone() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    let table_oid = fixture.create_table("app", "orders");
    let catalogs = fixture.catalogs();
    let table = catalogs.registry().get_table(table_oid).expect("table registered");
    insert(&fixture, table_oid, "t1", TriggerType::from(1), None);

    let writer = fixture.begin();
    catalogs
        .triggers()
        .insert_trigger(
            table_oid,
            "ghost",
            TriggerType::from(1),
            "audit_fn",
            "",
            None,
            Utc::now(),
            &writer,
        )
        .unwrap();
    assert_eq!(table.trigger_list_for(&writer).unwrap().names(), vec!["t1", "ghost"]);
    assert_eq!(table.trigger_list().unwrap().names(), vec!["t1"]);
    catalogs.abort(&writer).unwrap();

    let writer = fixture.begin();
    catalogs
        .triggers()
        .drop_trigger("app", "orders", "t1", &writer)
        .unwrap();
    assert!(table.trigger_list_for(&writer).unwrap().is_empty());
    catalogs.abort(&writer).unwrap();

    fixture.with_txn(|txn| {
        let stored = catalogs.triggers().get_triggers(table_oid, txn).unwrap();
        assert_eq!(stored.names(), vec!["t1"]);
        assert_eq!(table.trigger_list().unwrap(), stored);
        assert_eq!(table.trigger_list_for(txn).unwrap(), stored);
    });
}

#[test]
fn test_uncommitted_trigger_invisible_to_other_transactions() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    let writer = fixture.begin();
    let triggers = fixture.catalogs().triggers();
    triggers
        .insert_trigger(
            Oid::new(5),
            "t1",
            TriggerType::from(1),
            "f",
            "",
            None,
            Utc::now(),
            &writer,
        )
        .unwrap();

    let reader = fixture.catalogs().begin(AccessMode::ReadOnly);
    assert!(triggers.get_triggers(Oid::new(5), &reader).unwrap().is_empty());

    fixture.catalogs().abort(&writer).unwrap();
    fixture.with_txn(|txn| {
        assert_eq!(
            triggers.get_trigger_oid("t1", Oid::new(5), txn).unwrap(),
            Oid::INVALID
        );
    });
}

#[test]
fn test_duplicate_trigger_name_is_invariant_violation() {
    let fixture = TestFixture::new().expect("Failed to create fixture");
    insert(&fixture, Oid::new(5), "t1", TriggerType::from(1), None);
    insert(&fixture, Oid::new(5), "t1", TriggerType::from(2), None);

    fixture.with_txn(|txn| {
        let err = fixture
            .catalogs()
            .triggers()
            .get_trigger_oid("t1", Oid::new(5), txn)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    });
}
