use assert_cmd::Command;
use tempfile::TempDir;

const SECRET: &str = "cli-test-secret-cli-test-secret-0123";

/// Runs in a fresh working directory so no developer `.env` is picked up.
/// Keep the returned directory alive for the duration of the command.
fn bookshelf() -> (Command, TempDir) {
    let workdir = TempDir::new().expect("temp dir");
    let mut cmd = Command::cargo_bin("bookshelf").expect("binary should build");
    cmd.current_dir(workdir.path())
        .env("BOOKSHELF_CONFIG_DIR", "/nonexistent/bookshelf-config")
        .env_remove("BOOKSHELF_AUTH__JWT_SECRET")
        .env_remove("BOOKSHELF_ENV")
        .env_remove("RUST_LOG");
    (cmd, workdir)
}

#[test]
fn help_lists_subcommands() {
    let (mut cmd, _workdir) = bookshelf();
    let output = cmd.arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["serve", "migrate", "openapi"] {
        assert!(stdout.contains(command), "missing {command} in help");
    }
}

#[test]
fn refuses_to_start_without_signing_key() {
    let (mut cmd, _workdir) = bookshelf();
    let output = cmd.arg("serve").output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("jwt_secret"));
}

#[test]
fn rejects_unknown_environment() {
    let (mut cmd, _workdir) = bookshelf();
    let output = cmd
        .env("BOOKSHELF_ENV", "qa")
        .env("BOOKSHELF_AUTH__JWT_SECRET", SECRET)
        .arg("migrate")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported environment"));
}

#[test]
fn openapi_prints_every_route() {
    let (mut cmd, _workdir) = bookshelf();
    let output = cmd
        .env("BOOKSHELF_AUTH__JWT_SECRET", SECRET)
        .arg("openapi")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let spec: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    for path in ["/auth/register", "/auth/login", "/books", "/books/{id}"] {
        assert!(spec["paths"][path].is_object(), "missing {path}");
    }
}

#[test]
fn dotenv_is_read_from_the_working_directory() {
    let (mut cmd, workdir) = bookshelf();
    std::fs::write(
        workdir.path().join(".env"),
        format!("BOOKSHELF_AUTH__JWT_SECRET={SECRET}\n"),
    )
    .unwrap();

    let output = cmd.arg("openapi").output().unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}
