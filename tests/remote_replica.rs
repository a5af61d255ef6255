//! Writes forwarded to replica endpoints over HTTP

use minits::coordinator::replica::{create_router, ReplicaState};
use minits::coordinator::{LocalWriter, PointsWriter, RemoteWriter};
use minits::{Config, ConsistencyLevel, DataNode, Error, Point, WriteRequest};
use std::sync::Arc;
use std::time::Duration;

async fn spawn_replica(node_id: &str) -> (String, Arc<LocalWriter>) {
    let store = Arc::new(LocalWriter::new());
    let router = create_router(ReplicaState::new(node_id, store.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), store)
}

/// Address nothing listens on.
fn dead_replica() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn request(level: ConsistencyLevel) -> Arc<WriteRequest> {
    Arc::new(WriteRequest::new(
        "metrics",
        "autogen",
        level,
        vec![
            Point::new("cpu").with_tag("host", "a").with_field("usage", 0.5),
            Point::new("cpu").with_tag("host", "b").with_field("usage", 0.7),
        ],
    ))
}

fn node_config(replicas: Vec<String>, owner_index: usize) -> Config {
    let mut config = Config::default();
    config.coordinator.replicas = replicas;
    config.coordinator.owner_index = owner_index;
    config.coordinator.write_timeout_ms = 2_000;
    config
}

#[tokio::test]
async fn test_remote_writer_stores_on_replica() {
    let (url, store) = spawn_replica("replica-1").await;
    let writer = RemoteWriter::new(url.clone(), Duration::from_secs(2)).unwrap();

    writer.write(request(ConsistencyLevel::One)).await.unwrap();

    let points = store.points("metrics", "autogen").unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].tags.get("host").map(String::as_str), Some("b"));

    let health: serde_json::Value = reqwest::get(format!("{}/health", url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["node_id"], "replica-1");
    assert_eq!(health["points"], 2);
}

#[tokio::test]
async fn test_replica_rejection_is_writer_error() {
    let (url, store) = spawn_replica("replica-1").await;
    let writer = RemoteWriter::new(url, Duration::from_secs(2)).unwrap();

    let nameless = Arc::new(WriteRequest::new(
        "",
        "",
        ConsistencyLevel::One,
        vec![Point::new("cpu").with_field("usage", 1.0)],
    ));
    let err = writer.write(nameless).await.unwrap_err();
    assert!(matches!(err, Error::Rejected(_)), "{}", err);
    assert_eq!(store.point_count().unwrap(), 0);
}

#[tokio::test]
async fn test_unreachable_replica_is_connection_failure() {
    let writer = RemoteWriter::new(dead_replica(), Duration::from_secs(2)).unwrap();
    let err = writer.write(request(ConsistencyLevel::One)).await.unwrap_err();
    assert!(matches!(err, Error::ConnectionFailed(_)), "{}", err);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_quorum_tolerates_one_dead_replica() {
    let (live, store) = spawn_replica("replica-1").await;
    let node = DataNode::from_config(&node_config(vec![live, dead_replica()], 0)).unwrap();
    assert_eq!(node.coordinator().writer_count(), 3);

    node.write(request(ConsistencyLevel::Quorum)).await.unwrap();

    assert_eq!(node.local().unwrap().point_count().unwrap(), 2);
    assert_eq!(store.point_count().unwrap(), 2);
}

#[tokio::test]
async fn test_all_reports_dead_replica() {
    let (live, _store) = spawn_replica("replica-1").await;
    let node = DataNode::from_config(&node_config(vec![live, dead_replica()], 0)).unwrap();

    let err = node.write(request(ConsistencyLevel::All)).await.unwrap_err();
    assert!(!err.is_timeout());
    match err {
        Error::WriterFailed { writer_id, source } => {
            assert_eq!(writer_id, 2);
            assert!(matches!(*source, Error::ConnectionFailed(_)));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_owner_follows_designated_replica() {
    let (live, _store) = spawn_replica("replica-1").await;

    // owner is the dead replica: local and live successes do not count
    let node =
        DataNode::from_config(&node_config(vec![live.clone(), dead_replica()], 2)).unwrap();
    let err = node.write(request(ConsistencyLevel::Owner)).await.unwrap_err();
    assert!(matches!(err, Error::WriterFailed { writer_id: 2, .. }));

    // owner is the live replica
    let node = DataNode::from_config(&node_config(vec![live, dead_replica()], 1)).unwrap();
    node.write(request(ConsistencyLevel::Owner)).await.unwrap();
}

#[tokio::test]
async fn test_replica_metrics_count_outcomes() {
    let (url, _store) = spawn_replica("replica-1").await;
    let writer = RemoteWriter::new(url.clone(), Duration::from_secs(2)).unwrap();

    writer.write(request(ConsistencyLevel::Quorum)).await.unwrap();
    let nameless = Arc::new(WriteRequest::new(
        "",
        "",
        ConsistencyLevel::Quorum,
        vec![Point::new("cpu").with_field("usage", 1.0)],
    ));
    writer.write(nameless).await.unwrap_err();

    let text = reqwest::get(format!("{}/metrics", url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(text.contains("minits_writes_total{level=\"quorum\",outcome=\"succeeded\"} 1\n"));
    assert!(text.contains("minits_writes_total{level=\"quorum\",outcome=\"failed\"} 1\n"));
    assert!(text.contains("minits_stored_points 2\n"));
}
