use aluno_core::db::open_db_in_memory;
use aluno_core::{DisabledMirror, MirrorError, SqliteStudentMirror, Student, StudentMirror};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn student(id: &str, tax_id: &str) -> Student {
    Student::new_as_of(
        id,
        format!("Student {id}"),
        date(2004, 5, 20),
        "(86)3232-2525",
        tax_id,
        date(2026, 10, 17),
    )
}

fn mirror() -> SqliteStudentMirror {
    SqliteStudentMirror::new(open_db_in_memory().unwrap())
}

#[test]
fn create_and_find_roundtrip() {
    let mut mirror = mirror();
    let original = student("10", "111.111.111-11");

    mirror.create(&original).unwrap();

    let loaded = mirror.find("10").unwrap().unwrap();
    assert_eq!(loaded, original);
    assert!(mirror.exists("10").unwrap());
    assert!(!mirror.exists("11").unwrap());
}

#[test]
fn duplicate_id_create_fails_and_keeps_first_row() {
    let mut mirror = mirror();
    mirror.create(&student("10", "111.111.111-11")).unwrap();

    let err = mirror.create(&student("10", "222.222.222-22")).unwrap_err();
    assert!(matches!(err, MirrorError::Db(_)));

    let loaded = mirror.find("10").unwrap().unwrap();
    assert_eq!(loaded.tax_id, "111.111.111-11");
}

#[test]
fn duplicate_tax_id_is_rejected_by_schema() {
    let mut mirror = mirror();
    mirror.create(&student("10", "111.111.111-11")).unwrap();

    assert!(mirror.create(&student("11", "111.111.111-11")).is_err());
    assert_eq!(mirror.list_all().unwrap().len(), 1);
}

#[test]
fn update_replaces_row_and_reports_missing_ids() {
    let mut mirror = mirror();
    let mut record = student("10", "111.111.111-11");
    mirror.create(&record).unwrap();

    record.name = "Renamed".to_string();
    record.phone = "(86)99999-0000".to_string();
    mirror.update(&record).unwrap();
    assert_eq!(mirror.find("10").unwrap().unwrap(), record);

    let err = mirror.update(&student("99", "999.999.999-99")).unwrap_err();
    assert!(matches!(err, MirrorError::NotFound(id) if id == "99"));
}

#[test]
fn delete_removes_row_and_reports_missing_ids() {
    let mut mirror = mirror();
    mirror.create(&student("10", "111.111.111-11")).unwrap();

    mirror.delete("10").unwrap();
    assert!(mirror.find("10").unwrap().is_none());

    let err = mirror.delete("10").unwrap_err();
    assert!(matches!(err, MirrorError::NotFound(id) if id == "10"));
}

#[test]
fn list_all_orders_by_id() {
    let mut mirror = mirror();
    mirror.create(&student("b", "222.222.222-22")).unwrap();
    mirror.create(&student("a", "111.111.111-11")).unwrap();

    let ids: Vec<String> = mirror
        .list_all()
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn corrupted_birth_date_is_reported_as_invalid_data() {
    let mut mirror = mirror();
    mirror.create(&student("10", "111.111.111-11")).unwrap();
    let conn = mirror.into_inner();
    conn.execute("UPDATE students SET birth_date = 'yesterday' WHERE id = '10';", [])
        .unwrap();
    let mirror = SqliteStudentMirror::new(conn);

    let err = mirror.find("10").unwrap_err();
    assert!(matches!(err, MirrorError::InvalidData(_)));
}

#[test]
fn disabled_mirror_accepts_writes_and_stays_empty() {
    let mut mirror = DisabledMirror;
    let record = student("10", "111.111.111-11");

    mirror.create(&record).unwrap();
    mirror.update(&record).unwrap();
    mirror.delete("10").unwrap();
    assert!(mirror.find("10").unwrap().is_none());
    assert!(mirror.list_all().unwrap().is_empty());
}
