use assert_cmd::Command;

fn bookapi() -> Command {
    let mut cmd = Command::cargo_bin("bookapi").unwrap();
    cmd.env_remove("BOOKAPI_ENV")
        .env_remove("BOOKAPI_CONFIG_DIR")
        .env_remove("BOOKAPI_DATABASE__URL");
    cmd
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let output = bookapi().arg("--help").output().unwrap();

    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["serve", "migrate", "openapi", "check-config"] {
        assert!(text.contains(command), "help is missing {command}");
    }
}

#[test]
fn openapi_prints_merged_document() {
    let output = bookapi().arg("openapi").output().unwrap();

    assert!(output.status.success());
    let spec: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(spec["openapi"], "3.1.0");
    assert!(spec["paths"].get("/api/books/{id}/rating").is_some());
    assert!(spec["paths"].get("/api/countries/authors/{author_id}").is_some());
}

#[test]
fn migrate_applies_each_migration_once() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("catalog.db").display());

    let first = bookapi()
        .args(["--config-dir", dir.path().to_str().unwrap(), "migrate"])
        .env("BOOKAPI_DATABASE__URL", &url)
        .output()
        .unwrap();
    assert!(first.status.success());
    assert!(stdout(&first).contains("applied 6 migration(s)"));

    let second = bookapi()
        .args(["--config-dir", dir.path().to_str().unwrap(), "migrate"])
        .env("BOOKAPI_DATABASE__URL", &url)
        .output()
        .unwrap();
    assert!(second.status.success());
    assert!(stdout(&second).contains("applied 0 migration(s)"));
}

#[test]
fn check_config_reads_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("base.toml"),
        "[server]\nhost = \"127.0.0.1\"\nport = 9191\n",
    )
    .unwrap();

    let output = bookapi()
        .args(["--config-dir", dir.path().to_str().unwrap(), "check-config"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).contains("127.0.0.1:9191"));
}

#[test]
fn unknown_environment_fails() {
    let output = bookapi()
        .args(["--env", "mars", "check-config"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}
