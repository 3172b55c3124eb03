use aluno_core::{init_logging, init_stderr_logging, logging_status};

#[test]
fn stderr_logging_starts_without_a_log_dir_and_rejects_file_switch() {
    init_stderr_logging("warn").unwrap();
    init_stderr_logging("WARNING").unwrap();

    let (level, log_dir) = logging_status().unwrap();
    assert_eq!(level, "warn");
    assert_eq!(log_dir, None);

    log::warn!("event=test_warning module=tests status=ok");

    let level_error = init_stderr_logging("debug").unwrap_err();
    assert!(level_error.contains("refusing to switch"));

    let dir = tempfile::tempdir().unwrap();
    let dir_error = init_logging("warn", dir.path().to_str().unwrap()).unwrap_err();
    assert!(dir_error.contains("refusing to switch"));
}
