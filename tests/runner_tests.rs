//! Integration tests for the script runner.
//!
//! Tests cover:
//! - The scalar query flow against a real database
//! - Error propagation and rollback
//! - Group selection and test mode

use runsheet::core::runner::{RunConfig, Runner};
use runsheet::jobs::JobRegistry;
use runsheet::models::report::RunReport;
use runsheet::models::script::{load_script, Script};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a database with a Locations table holding `rows` rows.
fn make_locations_db(dir: &Path, rows: usize) -> PathBuf {
    let path = dir.join("jobs.db");
    let connection = Connection::open(&path).unwrap();
    connection
        .execute_batch("CREATE TABLE Locations(name TEXT)")
        .unwrap();
    for i in 0..rows {
        connection
            .execute("INSERT INTO Locations VALUES (?1)", [format!("loc-{}", i)])
            .unwrap();
    }
    path
}

fn count_script(db_path: &Path) -> Script {
    let toml = format!(
        r#"
        [databases.main]
        path = "{}"

        [[group]]
        name = "counts"

        [[group.job]]
        type = "scalar-query"
        name = "count locations"
        database = "main"
        query = "SELECT COUNT(*) FROM Locations"
        message = "There are {{}} rows"
    "#,
        db_path.display()
    );
    toml::from_str(&toml).unwrap()
}

fn run_live(script: &Script, dir: &Path) -> RunReport {
    Runner::new().live(true).run(script, dir).unwrap()
}

#[test]
fn test_counts_three_rows() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 3);

    let report = run_live(&count_script(&db_path), temp_dir.path());

    assert!(report.succeeded);
    let lines = report.find_log("There are");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].message, "There are 3 rows");
}

#[test]
fn test_counts_empty_table() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 0);

    let report = run_live(&count_script(&db_path), temp_dir.path());

    assert!(report.succeeded);
    assert_eq!(report.find_log("There are")[0].message, "There are 0 rows");
}

#[test]
fn test_missing_table_fails_without_logging() {
    let temp_dir = TempDir::new().unwrap();
    // Database exists but has no Locations table.
    let db_path = temp_dir.path().join("jobs.db");
    Connection::open(&db_path).unwrap();

    let report = run_live(&count_script(&db_path), temp_dir.path());

    assert!(!report.succeeded);
    assert!(report.find_log("There are").is_empty());

    let score = &report.groups[0].jobs[0];
    assert!(!score.succeeded);
    assert!(score.errors[0].contains("Query failed"));
}

#[test]
fn test_unreachable_database_fails() {
    let temp_dir = TempDir::new().unwrap();
    let report = run_live(
        &count_script(Path::new("/nonexistent/dir/jobs.db")),
        temp_dir.path(),
    );

    assert!(!report.succeeded);
    assert!(report.groups[0].jobs[0].errors[0].contains("Query failed"));
}

#[test]
fn test_test_mode_touches_no_database() {
    let temp_dir = TempDir::new().unwrap();
    // Point at a database that cannot be opened; test mode never tries.
    let script = count_script(Path::new("/nonexistent/dir/jobs.db"));

    let report = Runner::new().run(&script, temp_dir.path()).unwrap();

    assert!(report.succeeded);
    assert_eq!(report.find_log("skipped (test mode)").len(), 1);
}

#[test]
fn test_failed_group_rolls_back_writes() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 1);

    let toml = format!(
        r#"
        [databases.main]
        path = "{}"

        [[group]]
        name = "writes"

        [[group.job]]
        type = "sql"
        database = "main"
        statements = ["INSERT INTO Locations VALUES ('extra')"]

        [[group.job]]
        type = "scalar-query"
        database = "main"
        query = "SELECT COUNT(*) FROM NoSuchTable"
    "#,
        db_path.display()
    );
    let script: Script = toml::from_str(&toml).unwrap();

    let report = run_live(&script, temp_dir.path());
    assert!(!report.succeeded);

    // The insert must have been rolled back with the group.
    let connection = Connection::open(&db_path).unwrap();
    let count: i64 = connection
        .query_row("SELECT COUNT(*) FROM Locations", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_successful_group_commits_writes() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 1);

    let toml = format!(
        r#"
        [databases.main]
        path = "{}"

        [[group]]
        name = "writes"

        [[group.job]]
        type = "sql"
        database = "main"
        statements = ["INSERT INTO Locations VALUES ('extra')"]
    "#,
        db_path.display()
    );
    let script: Script = toml::from_str(&toml).unwrap();

    let report = run_live(&script, temp_dir.path());
    assert!(report.succeeded);

    let connection = Connection::open(&db_path).unwrap();
    let count: i64 = connection
        .query_row("SELECT COUNT(*) FROM Locations", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_allow_fail_group_does_not_stop_the_run() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 2);

    let toml = format!(
        r#"
        [databases.main]
        path = "{}"

        [[group]]
        name = "fragile"
        allow_fail = true

        [[group.job]]
        type = "scalar-query"
        database = "main"
        query = "SELECT COUNT(*) FROM NoSuchTable"

        [[group]]
        name = "counts"

        [[group.job]]
        type = "scalar-query"
        database = "main"
        query = "SELECT COUNT(*) FROM Locations"
        message = "There are {{}} rows"
    "#,
        db_path.display()
    );
    let script: Script = toml::from_str(&toml).unwrap();

    let report = run_live(&script, temp_dir.path());

    assert!(report.succeeded);
    assert!(!report.groups[0].succeeded);
    assert!(report.groups[1].succeeded);
    assert_eq!(report.find_log("There are 2 rows").len(), 1);
}

#[test]
fn test_run_only_selects_a_single_group() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 3);

    let mut script = count_script(&db_path);
    let mut second = script.groups[0].clone();
    second.name = "again".to_string();
    script.groups.push(second);

    let report = Runner::new()
        .live(true)
        .run_config(RunConfig::Single("again".to_string()))
        .run(&script, temp_dir.path())
        .unwrap();

    assert!(report.succeeded);
    assert!(report.groups[0].skipped);
    assert!(!report.groups[1].skipped);
    assert_eq!(report.find_log("There are 3 rows").len(), 1);
}

#[test]
fn test_disabled_group_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 3);

    let mut script = count_script(&db_path);
    script.groups[0].enabled = false;

    let report = run_live(&script, temp_dir.path());

    assert!(report.succeeded);
    assert!(report.groups[0].skipped);
    assert!(report.log.is_empty());
}

#[test]
fn test_unknown_job_type_fails_the_group() {
    let temp_dir = TempDir::new().unwrap();
    let script: Script = toml::from_str(
        r#"
        [[group]]
        name = "bad"

        [[group.job]]
        type = "no-such-job"
    "#,
    )
    .unwrap();

    let report = run_live(&script, temp_dir.path());

    assert!(!report.succeeded);
    assert!(report.groups[0].jobs[0].errors[0].contains("no-such-job"));
}

#[test]
fn test_closure_job_through_custom_registry() {
    let temp_dir = TempDir::new().unwrap();

    let mut registry = JobRegistry::new();
    registry.register("greet", |_| {
        Ok(Box::new(|ctx: &runsheet::core::context::JobContext<'_>| {
            let greeting = ctx.settings().require_str("greeting")?;
            ctx.log().info(greeting);
            Ok(())
        }))
    });

    let script: Script = toml::from_str(
        r#"
        [[group]]
        name = "g"

        [[group.job]]
        type = "greet"
        greeting = "hello from a closure"
    "#,
    )
    .unwrap();

    let report = Runner::with_registry(registry)
        .live(true)
        .run(&script, temp_dir.path())
        .unwrap();

    assert!(report.succeeded);
    assert_eq!(report.find_log("hello from a closure").len(), 1);
}

#[test]
fn test_sql_job_reads_statements_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 0);

    fs::write(
        temp_dir.path().join("seed.sql"),
        "INSERT INTO Locations VALUES ('a');\nINSERT INTO Locations VALUES ('b');",
    )
    .unwrap();

    let toml = format!(
        r#"
        [databases.main]
        path = "{}"

        [[group]]
        name = "seed"

        [[group.job]]
        type = "sql"
        database = "main"
        file = "seed.sql"

        [[group.job]]
        type = "scalar-query"
        database = "main"
        query = "SELECT COUNT(*) FROM Locations"
        message = "There are {{}} rows"
    "#,
        db_path.display()
    );
    let script: Script = toml::from_str(&toml).unwrap();

    let report = run_live(&script, temp_dir.path());

    assert!(report.succeeded);
    assert_eq!(report.find_log("There are 2 rows").len(), 1);
}

#[test]
fn test_repeated_runs_do_not_leak_connections() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 3);
    let script = count_script(&db_path);

    for _ in 0..5 {
        let report = run_live(&script, temp_dir.path());
        assert!(report.succeeded);
    }

    // Every scope released its connection, so an exclusive lock is available.
    let connection = Connection::open(&db_path).unwrap();
    connection
        .execute_batch("BEGIN EXCLUSIVE; COMMIT;")
        .unwrap();
}

#[test]
fn test_load_and_run_script_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = make_locations_db(temp_dir.path(), 3);

    let script_path = temp_dir.path().join("sheet.toml");
    fs::write(
        &script_path,
        format!(
            r#"
            [databases.main]
            path = "{}"

            [[group]]
            name = "counts"

            [[group.job]]
            type = "scalar-query"
            database = "main"
            query = "SELECT COUNT(*) FROM Locations"
            message = "There are {{}} rows"
        "#,
            db_path.display()
        ),
    )
    .unwrap();

    let script = load_script(&script_path).unwrap();
    let report = run_live(&script, temp_dir.path());

    assert_eq!(report.find_log("There are 3 rows").len(), 1);
}
