//! Remote fetch tests against a mock config server
//!
//! Covers registry loading over http, server-mode resolution with the
//! `r`/`p` query parameters, ETag capture and refresh resilience when
//! the remote store degrades after a good first load.

use std::time::Duration;

use cfgrd_client::{ClientSettings, ConfigClient};
use mockito::Matcher;
use pretty_assertions::assert_eq;

fn remote_settings(settings: ClientSettings) -> ClientSettings {
    settings
        .with_host_name("remote-host")
        .with_environment("remote")
        .with_connect_timeout(Duration::from_secs(2))
        .with_read_timeout(Duration::from_secs(2))
}

#[test]
fn loads_repo_definitions_and_documents_over_http() {
    let mut server = mockito::Server::new();
    let definitions = format!(
        "repos:\n  - name: remote\n    source-name: http\n    uri: {}/configs\n",
        server.url()
    );
    server
        .mock("GET", "/repos.yaml")
        .with_status(200)
        .with_body(definitions)
        .create();
    server
        .mock("GET", "/configs/env/default.properties")
        .with_status(200)
        .with_body("app.name=remote-app\n")
        .create();

    let client = ConfigClient::init(remote_settings(
        ClientSettings::repo_uri("cfgrd://remote/env")
            .with_definitions(format!("{}/repos.yaml", server.url())),
    ))
    .unwrap();

    assert_eq!(client.get("app.name").as_deref(), Some("remote-app"));
}

#[test]
fn server_mode_sends_repo_and_named_paths_and_keeps_the_etag() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1/env/prod")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("p".into(), "base,prod".into()),
            Matcher::UrlEncoded("r".into(), "orders".into()),
        ]))
        .match_header("accept", "application/json")
        .with_status(200)
        .with_header("etag", "\"rev-42\"")
        .with_body(r#"{"app": {"name": "orders"}, "db": {"host": "db.prod.internal"}}"#)
        .create();

    let client = ConfigClient::init(remote_settings(
        ClientSettings::server(format!("{}/v1", server.url()))
            .with_repo("orders")
            .with_path("env/prod")
            .with_named(["base", "prod"]),
    ))
    .unwrap();

    mock.assert();
    assert_eq!(client.get("db.host").as_deref(), Some("db.prod.internal"));
    assert_eq!(client.snapshot().etag(), Some("\"rev-42\""));
}

#[test]
fn secured_hosts_and_documents_fetch_with_client_credentials() {
    let mut server = mockito::Server::new();
    let auth = "Basic cmVhZGVyOnMzY3JldA==";
    let hosts = server
        .mock("GET", "/env/hosts.properties")
        .match_header("authorization", auth)
        .with_status(200)
        .with_body(format!("remote-host={}/env/remote\n", server.url()))
        .create();
    let document = server
        .mock("GET", "/env/remote/default.properties")
        .match_header("authorization", auth)
        .with_status(200)
        .with_body("app.name=secured\n")
        .create();

    let client = ConfigClient::init(remote_settings(
        ClientSettings::host_file(format!("{}/env/hosts.properties", server.url()))
            .with_basic_auth("reader", "s3cret"),
    ))
    .unwrap();

    hosts.assert();
    document.assert();
    assert_eq!(client.get("app.name").as_deref(), Some("secured"));
}

#[test]
fn degraded_remote_store_never_takes_the_snapshot_away() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/env/default.properties")
        .with_status(200)
        .with_body("release=1\n")
        .create();

    let client = ConfigClient::init(remote_settings(ClientSettings::absolute(format!(
        "{}/env",
        server.url()
    ))))
    .unwrap();
    assert_eq!(client.get("release").as_deref(), Some("1"));

    server.reset();
    server.mock("GET", "/env/default.properties").with_status(500).create();
    assert!(client.reload().is_err());
    assert_eq!(client.get("release").as_deref(), Some("1"));

    server.reset();
    server
        .mock("GET", "/env/default.properties")
        .with_status(200)
        .with_body("release=2\n")
        .create();
    client.reload().unwrap();
    assert_eq!(client.get("release").as_deref(), Some("2"));
}

#[test]
fn redirecting_stores_load_as_empty() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/env/default.properties")
        .with_status(302)
        .with_header("location", "http://elsewhere.example.com/env")
        .create();

    let client = ConfigClient::init(remote_settings(ClientSettings::absolute(format!(
        "{}/env",
        server.url()
    ))))
    .unwrap();

    assert!(client.get("release").is_none());
}

#[test]
fn not_found_documents_load_as_empty() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/env/default.properties").with_status(404).create();

    let client = ConfigClient::init(remote_settings(ClientSettings::absolute(format!(
        "{}/env",
        server.url()
    ))))
    .unwrap();

    assert!(client.snapshot().get("release").is_none());
}
