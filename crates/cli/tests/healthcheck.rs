use assert_cmd::Command;

#[test]
fn healthcheck_opens_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("activities.redb");

    let output = Command::cargo_bin("gridwatch")
        .unwrap()
        .current_dir(dir.path())
        .env("GRIDWATCH_DATABASE__PATH", &db_path)
        .arg("healthcheck")
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "OK");
    assert!(db_path.exists());
}

#[test]
fn healthcheck_supports_in_memory_store() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("gridwatch")
        .unwrap()
        .current_dir(dir.path())
        .env("GRIDWATCH_DATABASE__IN_MEMORY", "true")
        .arg("healthcheck")
        .assert()
        .success()
        .stdout("OK\n");
}

#[test]
fn unknown_environment_fails() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("gridwatch")
        .unwrap()
        .current_dir(dir.path())
        .env("GRIDWATCH_ENV", "moon")
        .arg("healthcheck")
        .assert()
        .failure();
}
