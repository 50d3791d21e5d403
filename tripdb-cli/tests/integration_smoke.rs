//! Smoke tests to verify command wiring without a database

use assert_cmd::Command;
use predicates::prelude::*;
use sqlx::PgPool;

/// Binary with connection variables cleared so a developer's .env or
/// shell environment cannot point the tests at a real server.
fn tripdb() -> Command {
    let mut cmd = Command::cargo_bin("tripdb").unwrap();
    for var in ["DB_HOST", "DB_PORT", "DB_USER", "DB_PASSWORD", "DB_NAME", "DATABASE_URL"] {
        cmd.env_remove(var);
    }
    cmd.env("TRIPDB_QUIET", "1");
    cmd
}

// === Help Tests ===

#[test]
fn test_init_help() {
    tripdb()
        .arg("init")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--skip-wait"))
        .stdout(predicate::str::contains("--schema"));
}

#[test]
fn test_wait_help() {
    tripdb()
        .arg("wait")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Milliseconds between readiness probes"));
}

#[test]
fn test_check_help() {
    tripdb()
        .arg("check")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--db-host"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_attractions_help() {
    tripdb()
        .arg("attractions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("case-insensitive"));
}

#[test]
fn test_flights_help() {
    tripdb()
        .arg("flights")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Departure airport code"));
}

// === Offline Commands ===

#[test]
fn test_schema_print_outputs_ddl() {
    tripdb()
        .arg("schema")
        .arg("print")
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE geo_locations"))
        .stdout(predicate::str::contains("get_flights_by_route"));
}

#[test]
fn test_config_show_prints_defaults() {
    let dir = tempfile::tempdir().unwrap();
    tripdb()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("[database]"))
        .stdout(predicate::str::contains("port = 5432"));
}

#[test]
fn test_config_path_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    tripdb()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("tripdb.toml (not found)"));
}

#[test]
fn test_completions_bash() {
    tripdb()
        .arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("tripdb"));
}

#[test]
fn test_config_show_layers_local_over_global() {
    let dir = tempfile::tempdir().unwrap();
    let global_dir = dir.path().join(".tripdb");
    std::fs::create_dir_all(&global_dir).unwrap();
    std::fs::write(
        global_dir.join("config.toml"),
        "[database]\nuser = \"app\"\n\n[readiness]\nmax_wait_secs = 60\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("tripdb.toml"), "[database]\nhost = \"db\"\n").unwrap();

    tripdb()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("host = \"db\""))
        .stdout(predicate::str::contains("user = \"app\""))
        .stdout(predicate::str::contains("max_wait_secs = 60"));
}

// === Unreachable Server ===

#[test]
fn test_check_unreachable_server_fails_with_hints() {
    let dir = tempfile::tempdir().unwrap();
    tripdb()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .args([
            "check",
            "--db-host",
            "127.0.0.1",
            "--db-port",
            "1",
            "--connect-timeout-secs",
            "1",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Database check failed"))
        .stderr(predicate::str::contains("Troubleshooting"));
}

#[test]
fn test_wait_gives_up_after_timeout() {
    let dir = tempfile::tempdir().unwrap();
    tripdb()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .args([
            "wait",
            "--db-host",
            "127.0.0.1",
            "--db-port",
            "1",
            "--timeout-secs",
            "1",
            "--interval-ms",
            "200",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not become ready"));
}

// === Live Database ===

/// `base` with its database path swapped for `database`, keeping credentials
/// and query parameters
fn url_for_database(base: &str, database: &str) -> String {
    let (without_query, query) = match base.split_once('?') {
        Some((head, query)) => (head, format!("?{}", query)),
        None => (base, String::new()),
    };
    let authority_end = without_query.find("://").map(|i| i + 3).unwrap_or(0);
    let server = match without_query[authority_end..].find('/') {
        Some(slash) => &without_query[..authority_end + slash],
        None => without_query,
    };
    format!("{}/{}{}", server, database, query)
}

#[test]
fn test_url_for_database() {
    assert_eq!(
        url_for_database("postgres://u:p@db:5432/postgres?sslmode=disable", "t1"),
        "postgres://u:p@db:5432/t1?sslmode=disable"
    );
    assert_eq!(url_for_database("postgres://db", "t1"), "postgres://db/t1");
}

#[sqlx::test(migrations = false)]
#[ignore = "requires database"]
async fn test_check_on_fresh_schema_exits_zero(pool: PgPool) {
    let database = pool
        .connect_options()
        .get_database()
        .expect("test database name")
        .to_string();
    let url = url_for_database(&std::env::var("DATABASE_URL").unwrap(), &database);
    let dir = tempfile::tempdir().unwrap();

    tripdb()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .args(["init", "--skip-wait", "--database-url", &url])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 tables, 3 views, 2 functions, 16 indexes"));

    tripdb()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .args(["check", "--database-url", &url])
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("Tables (5):"))
        .stdout(predicate::str::contains("geo_locations   0"))
        .stdout(predicate::str::contains("flights         0"))
        .stdout(predicate::str::contains("attractions     0"));
}
