use aluno_core::{FlatFileStore, Student};
use chrono::NaiveDate;
use std::fs;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn student(id: &str, name: &str, birth: NaiveDate) -> Student {
    Student::new_as_of(id, name, birth, "(86)3232-2525", "554.759.013-00", date(2026, 10, 17))
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FlatFileStore::new(dir.path().join("absent.txt"));

    assert!(store.load().unwrap().is_empty());
}

#[test]
fn save_writes_one_line_per_student_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ListagemAlunos.txt");
    let store = FlatFileStore::new(&path);

    store
        .save(&[
            student("123", "Jane Doe", date(2015, 1, 10)),
            student("7", "Bruno Lima", date(2001, 12, 31)),
        ])
        .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "123,Jane Doe,10/01/2015,(86)3232-2525,554.759.013-00\n\
         7,Bruno Lima,31/12/2001,(86)3232-2525,554.759.013-00\n"
    );
}

#[test]
fn save_then_load_preserves_persisted_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = FlatFileStore::new(dir.path().join("nested").join("alunos.txt"));
    let original = vec![
        student("1", "Ana", date(2000, 2, 29)),
        student("2", "Caio", date(1999, 7, 4)),
    ];

    store.save(&original).unwrap();
    let loaded = store.load_as_of(date(2026, 10, 17)).unwrap();

    assert_eq!(loaded.len(), original.len());
    for (before, after) in original.iter().zip(&loaded) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.name, after.name);
        assert_eq!(before.birth_date, after.birth_date);
        assert_eq!(before.phone, after.phone);
        assert_eq!(before.tax_id, after.tax_id);
    }
}

#[test]
fn load_recomputes_age_instead_of_reading_it() {
    let dir = tempfile::tempdir().unwrap();
    let store = FlatFileStore::new(dir.path().join("alunos.txt"));
    store
        .save(&[student("1", "Ana", date(2010, 1, 1)).with_age(99)])
        .unwrap();

    let loaded = store.load_as_of(date(2020, 6, 1)).unwrap();
    assert_eq!(loaded[0].age, 10);
}

#[test]
fn malformed_lines_are_skipped_without_affecting_neighbours() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alunos.txt");
    fs::write(
        &path,
        "1,Ana,01/01/2000,(86)3232-2525,111.111.111-11\n\
         2,Bruno,01/01/2001,(86)3232-2525\n\
         3,Caio,01/01/2002,(86)3232-2525,333.333.333-33,extra\n\
         4,Davi,2003-01-01,(86)3232-2525,444.444.444-44\n\
         \n\
         5,Eva,01/01/2004,(86)3232-2525,555.555.555-55\n",
    )
    .unwrap();

    let loaded = FlatFileStore::new(&path).load().unwrap();
    let ids: Vec<&str> = loaded.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "5"]);
}

#[test]
fn saving_empty_slice_truncates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alunos.txt");
    let store = FlatFileStore::new(&path);
    store.save(&[student("1", "Ana", date(2000, 1, 1))]).unwrap();

    store.save(&[]).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn unbalanced_quote_stays_within_its_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alunos.txt");
    fs::write(
        &path,
        "1,\"Ana,01/01/2000,(86)3232-2525,111.111.111-11\n\
         2,Bruno,01/01/2001,(86)3232-2525,222.222.222-22\n\
         3,Caio,01/01/2002,(86)3232-2525,333.333.333-33\n",
    )
    .unwrap();

    let loaded = FlatFileStore::new(&path).load().unwrap();
    let ids: Vec<&str> = loaded.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(loaded[0].name, "\"Ana");
}

#[test]
fn name_containing_the_delimiter_is_written_verbatim_and_skipped_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alunos.txt");
    let store = FlatFileStore::new(&path);
    store
        .save(&[
            student("1", "Silva, Ana", date(2000, 1, 1)),
            student("2", "Bruno", date(2001, 1, 1)),
        ])
        .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("1,Silva, Ana,01/01/2000,"));

    let loaded = store.load().unwrap();
    let ids: Vec<&str> = loaded.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["2"]);
}
