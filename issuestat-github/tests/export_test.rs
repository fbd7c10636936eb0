use std::time::Duration;

use issuestat_core::{Error, Exporter, GitHubConfig, RowWriter, StopReason};
use issuestat_github::{GitHubClient, RepositoryPages};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn node(number: u64, title: &str, labels: &[&str]) -> Value {
    let label_edges: Vec<Value> = labels
        .iter()
        .map(|name| json!({"node": {"name": name}}))
        .collect();
    json!({
        "node": {
            "number": number,
            "title": title,
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-02T10:00:00Z",
            "closedAt": null,
            "state": "OPEN",
            "stateReason": null,
            "labels": {"edges": label_edges}
        }
    })
}

fn page(edges: Vec<Value>, end_cursor: Option<&str>) -> Value {
    json!({
        "data": {
            "repository": {
                "issues": {
                    "edges": edges,
                    "pageInfo": {"hasNextPage": end_cursor.is_some(), "endCursor": end_cursor}
                }
            },
            "rateLimit": {"limit": 5000, "cost": 1, "remaining": 4990, "resetAt": "2024-03-01T11:00:00Z"}
        }
    })
}

async fn mount_page(server: &MockServer, cursor: Option<&str>, body: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({"variables": {"cursor": cursor}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> GitHubClient {
    let config = GitHubConfig {
        endpoint: format!("{}/graphql", server.uri()),
        timeout: Duration::from_secs(5),
        ..Default::default()
    };
    GitHubClient::new(&config, "test-token", "octo", "hello").unwrap()
}

#[tokio::test]
async fn test_two_page_export_writes_rows_in_page_order() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        None,
        page(
            vec![
                node(20, "Second newest", &["bug", "needs review"]),
                node(19, "Comma, in title", &["a,b"]),
            ],
            Some("cursor-1"),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        Some("cursor-1"),
        page(vec![node(5, "Old one", &[])], None),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("issues.csv");
    let client = client_for(&mock_server);

    let writer = RowWriter::create(&output).unwrap();
    let mut exporter = Exporter::new(RepositoryPages::new(&client), writer);
    let summary = exporter.run().await.unwrap();
    drop(exporter);

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.stop, StopReason::Exhausted);

    let content = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "number,title,createdAt,updatedAt,closedAt,state,stateReason,labels",
            "20,Second newest,2024-03-01T10:00:00Z,2024-03-02T10:00:00Z,,OPEN,,\"bug,needs review\"",
            "19,\"Comma, in title\",2024-03-01T10:00:00Z,2024-03-02T10:00:00Z,,OPEN,,a b",
            "5,Old one,2024-03-01T10:00:00Z,2024-03-02T10:00:00Z,,OPEN,,",
        ]
    );
}

#[tokio::test]
async fn test_http_failure_truncates_without_error() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        None,
        page(vec![node(2, "Kept", &[])], Some("cursor-1")),
    )
    .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"variables": {"cursor": "cursor-1"}})))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("issues.csv");
    let client = client_for(&mock_server);

    let mut exporter = Exporter::new(
        RepositoryPages::new(&client),
        RowWriter::create(&output).unwrap(),
    );
    let summary = exporter.run().await.unwrap();
    drop(exporter);

    assert_eq!(summary.stop, StopReason::FetchFailed);
    assert_eq!(summary.rows, 1);
    assert_eq!(std::fs::read_to_string(&output).unwrap().lines().count(), 2);
}

#[tokio::test]
async fn test_missing_labels_aborts_and_keeps_earlier_rows() {
    let mut broken = node(8, "No labels block", &[]);
    broken["node"].as_object_mut().unwrap().remove("labels");

    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        None,
        page(vec![node(9, "Fine", &["ok"]), broken], Some("cursor-1")),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("issues.csv");
    let client = client_for(&mock_server);

    let mut exporter = Exporter::new(
        RepositoryPages::new(&client),
        RowWriter::create(&output).unwrap(),
    );
    let err = exporter.run().await.unwrap_err();
    drop(exporter);

    assert!(matches!(err, Error::DataShape { .. }));
    let content = std::fs::read_to_string(&output).unwrap();
    assert!(content.contains("Fine"));
    assert!(!content.contains("No labels block"));
}
