use lap::core::storage::{Column, FieldValue, MemoryStore, Record, SqliteStore, TempStorage};
use lap::core::types::ErrorCategory;
use std::sync::Arc;

const COLUMNS: [Column<'static>; 3] = [
    Column::text("COURSE_ID"),
    Column::text("SUBJECT"),
    Column::integer("ENROLLMENT"),
];

fn course(id: &str, subject: Option<&str>, enrollment: i64) -> Record {
    let mut record = Record::new();
    record.insert("COURSE_ID".into(), FieldValue::Text(id.into()));
    if let Some(subject) = subject {
        record.insert("SUBJECT".into(), FieldValue::Text(subject.into()));
    }
    record.insert("ENROLLMENT".into(), FieldValue::Integer(enrollment));
    record
}

fn stores() -> Vec<(&'static str, Arc<dyn TempStorage>)> {
    let memory: Arc<dyn TempStorage> = Arc::new(MemoryStore::new());
    let sqlite: Arc<dyn TempStorage> = Arc::new(SqliteStore::open_in_memory().unwrap());
    vec![("memory", memory), ("sqlite", sqlite)]
}

#[test]
fn inserts_and_fetches_in_order() {
    for (label, store) in stores() {
        let inserted = store
            .insert_records(
                "COURSE",
                &COLUMNS,
                &[course("C1", Some("MATH"), 30), course("C2", None, 12)],
            )
            .unwrap();
        assert_eq!(inserted, 2, "{label}");

        let rows = store.fetch("COURSE").unwrap();
        assert_eq!(rows.len(), 2, "{label}");
        assert_eq!(rows[0]["COURSE_ID"], FieldValue::Text("C1".into()), "{label}");
        assert_eq!(rows[1]["SUBJECT"], FieldValue::Null, "{label}");
        assert_eq!(rows[1]["ENROLLMENT"], FieldValue::Integer(12), "{label}");
        assert_eq!(
            rows[0].keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["COURSE_ID", "SUBJECT", "ENROLLMENT"],
            "{label}"
        );
    }
}

#[test]
fn undeclared_column_rejects_whole_batch() {
    for (label, store) in stores() {
        let mut stray = course("C3", None, 1);
        stray.insert("TEACHER".into(), FieldValue::Text("Smith".into()));

        let err = store
            .insert_records("COURSE", &COLUMNS, &[course("C1", None, 1), stray])
            .unwrap_err();
        assert_eq!(err.category, ErrorCategory::StorageError, "{label}");
        assert_eq!(err.code, "STORAGE-002", "{label}");
        assert_eq!(store.count("COURSE").unwrap(), 0, "{label}");
    }
}

#[test]
fn clear_empties_table() {
    for (label, store) in stores() {
        store
            .insert_records("COURSE", &COLUMNS, &[course("C1", None, 1)])
            .unwrap();
        store.clear("COURSE").unwrap();
        assert_eq!(store.count("COURSE").unwrap(), 0, "{label}");
        assert!(store.fetch("COURSE").unwrap().is_empty(), "{label}");
    }
}

#[test]
fn unknown_table_is_empty() {
    for (label, store) in stores() {
        assert_eq!(store.count("GRADE").unwrap(), 0, "{label}");
        assert!(store.fetch("GRADE").unwrap().is_empty(), "{label}");
    }
}

#[test]
fn unsafe_identifiers_are_rejected() {
    for (label, store) in stores() {
        let err = store
            .insert_records("COURSE", &[Column::text("COURSE_ID; DROP TABLE COURSE")], &[])
            .unwrap_err();
        assert_eq!(err.code, "STORAGE-001", "{label}");
    }
}

#[test]
fn changed_layout_is_rejected() {
    for (label, store) in stores() {
        store
            .insert_records("COURSE", &COLUMNS, &[course("C1", None, 1)])
            .unwrap();

        let narrower = store
            .insert_records("COURSE", &[Column::text("COURSE_ID")], &[])
            .unwrap_err();
        assert_eq!(narrower.code, "STORAGE-003", "{label}");

        let retyped = [
            Column::text("COURSE_ID"),
            Column::text("SUBJECT"),
            Column::text("ENROLLMENT"),
        ];
        let err = store.insert_records("COURSE", &retyped, &[]).unwrap_err();
        assert_eq!(err.code, "STORAGE-003", "{label}");
        assert_eq!(store.count("COURSE").unwrap(), 1, "{label}");
    }
}

#[test]
fn mistyped_value_rejects_whole_batch() {
    for (label, store) in stores() {
        let mut bad = course("C2", None, 1);
        bad.insert("ENROLLMENT".into(), FieldValue::Decimal(1.5));
        let err = store
            .insert_records("COURSE", &COLUMNS, &[course("C1", None, 1), bad])
            .unwrap_err();
        assert_eq!(err.code, "STORAGE-006", "{label}");
        assert_eq!(store.count("COURSE").unwrap(), 0, "{label}");
    }
}

#[test]
fn replace_leaves_only_the_new_batch() {
    for (label, store) in stores() {
        store
            .insert_records(
                "COURSE",
                &COLUMNS,
                &[course("C1", None, 1), course("C2", None, 2)],
            )
            .unwrap();
        let written = store
            .replace_records("COURSE", &COLUMNS, &[course("C9", Some("ART"), 9)])
            .unwrap();
        assert_eq!(written, 1, "{label}");
        let rows = store.fetch("COURSE").unwrap();
        assert_eq!(rows, vec![course("C9", Some("ART"), 9)], "{label}");
    }
}

#[test]
fn backends_return_identical_rows() {
    let flagged = [Column::text("COURSE_ID"), Column::flag("ONLINE_FLAG")];
    let mut online = Record::new();
    online.insert("COURSE_ID".into(), FieldValue::Text("C1".into()));
    online.insert("ONLINE_FLAG".into(), FieldValue::Flag(true));
    let mut offline = online.clone();
    offline.insert("ONLINE_FLAG".into(), FieldValue::Flag(false));

    let fetched: Vec<Vec<Record>> = stores()
        .into_iter()
        .map(|(_, store)| {
            store
                .insert_records("COURSE", &flagged, &[online.clone(), offline.clone()])
                .unwrap();
            store.fetch("COURSE").unwrap()
        })
        .collect();
    assert_eq!(fetched[0], vec![online, offline]);
    assert_eq!(fetched[0], fetched[1]);
}
