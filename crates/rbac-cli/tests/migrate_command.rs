//! The migrate command over in-memory collaborators

#![allow(clippy::unwrap_used, missing_docs)]

use rbac_cli::commands::migrate::execute;
use rbac_cli::config::{finalize, load_config, parse_config};
use rbac_core::{MigrationError, ResourcePath};
use rbac_testkit::{organization, workspace, MockDirectory, MockResourceApi};
use std::path::Path;

const CONFIG: &str = r#"
[platform]
url = "https://api.example.test/v2"

[directory]
enabled = true

[options]
fallback_admin = "admin@corp.test"

[mapping]
"oid-d" = "dana@corp.test"
"#;

fn config_in(dir: &Path, organization: Option<&str>) -> rbac_core::MigrationConfig {
    let mut config = parse_config(CONFIG).unwrap();
    config.report.path = dir.join("report.csv");
    finalize(config, organization.map(str::to_string)).unwrap()
}

fn platform() -> MockResourceApi {
    MockResourceApi::new()
        .with_organization(
            organization("o-1", "oid-d").workspace(workspace("w-1", "oid-d").scenario("s-1", "oid-a")),
        )
        .with_organization(organization("o-2", "oid-d"))
}

#[tokio::test]
async fn writes_report_for_every_resource() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), None);
    let api = platform();
    let directory = MockDirectory::new().with_user("oid-a", "alice@corp.test");

    let summary = execute(&api, Some(&directory), &config).await.unwrap();

    assert_eq!(summary.total(), 4);
    assert_eq!(summary.updated, 4);
    assert_eq!(directory.lookups("oid-a"), 1);
    assert_eq!(directory.lookups("oid-d"), 0);

    let report = std::fs::read_to_string(dir.path().join("report.csv")).unwrap();
    let rows: Vec<&str> = report.lines().collect();
    assert_eq!(rows.len(), 5);
    assert_eq!(
        rows[1],
        "scenario,s-1,oid-a,alice@corp.test,UPDATED,"
    );
    assert_eq!(
        rows[2],
        "workspace,w-1,oid-d,dana@corp.test,UPDATED,\"alice@corp.test,dana@corp.test\""
    );
}

#[tokio::test]
async fn organization_override_limits_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), Some("o-2"));
    let api = platform();

    let summary = execute(&api, None::<MockDirectory>, &config).await.unwrap();

    assert_eq!(summary.organizations, 1);
    assert_eq!(api.updated_paths(), vec![ResourcePath::organization("o-2")]);
}

#[tokio::test]
async fn root_failure_aborts_with_migration_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), None);
    let api = platform().fail_root_listing();

    let err = execute(&api, None::<MockDirectory>, &config)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MigrationError>(),
        Some(MigrationError::RootListing(_))
    ));
}

#[test]
fn config_file_is_loaded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rbac-migrate.toml");
    std::fs::write(&path, CONFIG).unwrap();

    let config = load_config(&path).unwrap();

    assert!(config.directory.enabled);
    assert_eq!(config.seed_mapping().get("oid-d"), Some("dana@corp.test"));
}

#[test]
fn missing_config_file_names_the_path() {
    let err = load_config(Path::new("/nonexistent/rbac-migrate.toml")).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/rbac-migrate.toml"));
}
