//! End-to-end pipeline tests over a local config tree
//!
//! Each test builds its own tree: a definitions document plus layered
//! property files, then runs the full flow: location -> registry ->
//! source -> decode -> merge -> published snapshot.

use std::fs;
use std::path::Path;

use cfgrd_client::{ClientSettings, ConfigClient, Error};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Lay out a config tree with a definitions document, a base layer, an
/// override layer and a hosts mapping.
fn setup_tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "repos.yaml",
        "repos:\n  - name: default\n    uri: classpath:env\n",
    );
    write(
        root,
        "env/base/default.properties",
        "app.name=orders\ndb.host=localhost\ndb.port=5432\ndb.url=postgres://${db.host}:${db.port}/${app.name}\n",
    );
    write(
        root,
        "env/prod/default.properties",
        "db.host=db.prod.internal\nlog.level=warn\n",
    );
    write(
        root,
        "env/hosts.properties",
        "orders-prod-01=cfgrd://default/prod\nPROD=cfgrd://default#base,prod\n*=cfgrd://default/base\n",
    );

    temp
}

fn settings_for(tree: &TempDir, settings: ClientSettings) -> ClientSettings {
    settings
        .with_classpath_root(tree.path())
        .with_definitions("classpath:repos.yaml")
        .with_host_name("integration-host")
        .with_environment("integration")
}

#[test]
fn repo_uri_with_named_layers_substitutes_across_layers() {
    let tree = setup_tree();

    let client = ConfigClient::init(settings_for(
        &tree,
        ClientSettings::repo_uri("cfgrd://default#base,prod"),
    ))
    .unwrap();

    // prod overrides the host, substitution sees the post-merge value.
    assert_eq!(client.get("db.host").as_deref(), Some("db.prod.internal"));
    assert_eq!(
        client.get("db.url").as_deref(),
        Some("postgres://db.prod.internal:5432/orders")
    );
    assert_eq!(client.get("log.level").as_deref(), Some("warn"));
}

#[test]
fn hosts_bootstrap_selects_the_layered_location_for_the_environment() {
    let tree = setup_tree();

    let client = ConfigClient::init(
        settings_for(&tree, ClientSettings::host_file("classpath:env/hosts.properties"))
            .with_environment("PROD"),
    )
    .unwrap();

    assert_eq!(client.get("db.host").as_deref(), Some("db.prod.internal"));
    assert_eq!(client.get("app.name").as_deref(), Some("orders"));
}

#[test]
fn hosts_bootstrap_prefers_the_exact_host_entry() {
    let tree = setup_tree();

    let client = ConfigClient::init(
        settings_for(&tree, ClientSettings::host_file("classpath:env/hosts.properties"))
            .with_host_name("orders-prod-01")
            .with_environment("PROD"),
    )
    .unwrap();

    // Only the prod layer loads; nothing from base.
    assert_eq!(client.get("log.level").as_deref(), Some("warn"));
    assert!(client.get("app.name").is_none());
}

#[test]
fn wildcard_bootstrap_loads_the_base_layer() {
    let tree = setup_tree();

    let client = ConfigClient::init(settings_for(
        &tree,
        ClientSettings::host_file("classpath:env/hosts.properties"),
    ))
    .unwrap();

    assert_eq!(client.get("app.name").as_deref(), Some("orders"));
    assert!(client.get("log.level").is_none());
}

#[test]
fn a_sole_repo_serves_default_named_locations() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "repos.yaml",
        "repos:\n  - name: main\n    uri: classpath:env\n",
    );
    write(temp.path(), "env/base/default.properties", "app.name=orders\n");

    let client = ConfigClient::init(settings_for(
        &temp,
        ClientSettings::repo_uri("cfgrd://default/base"),
    ))
    .unwrap();

    assert_eq!(client.get("app.name").as_deref(), Some("orders"));
}

#[test]
fn environment_layer_wins_over_every_file_layer() {
    let tree = setup_tree();

    let client = ConfigClient::init(
        settings_for(&tree, ClientSettings::repo_uri("cfgrd://default#base,prod"))
            .with_extra("log.level", "debug"),
    )
    .unwrap();

    assert_eq!(client.get("log.level").as_deref(), Some("debug"));
}

#[test]
fn missing_paths_produce_an_empty_snapshot_not_an_error() {
    let tree = setup_tree();

    let client = ConfigClient::init(settings_for(
        &tree,
        ClientSettings::repo_uri("cfgrd://default/nowhere"),
    ))
    .unwrap();

    assert!(client.get("app.name").is_none());
    // The environment layer still publishes identity keys.
    assert_eq!(client.get("hostname").as_deref(), Some("integration-host"));
}

#[test]
fn malformed_definitions_fail_initialization() {
    let tree = setup_tree();
    write(tree.path(), "repos.yaml", "repos: [broken");

    let result = ConfigClient::init(settings_for(
        &tree,
        ClientSettings::repo_uri("cfgrd://default/base"),
    ));

    assert!(matches!(
        result,
        Err(Error::Core(cfgrd_core::Error::Definitions { .. }))
    ));
}

#[test]
fn properties_copy_matches_individual_reads() {
    let tree = setup_tree();

    let client = ConfigClient::init(settings_for(
        &tree,
        ClientSettings::repo_uri("cfgrd://default/base"),
    ))
    .unwrap();

    let all = client.properties();
    assert_eq!(
        all.get("app.name").map(String::as_str),
        client.get("app.name").as_deref()
    );
    assert!(all.len() >= 4);
}
