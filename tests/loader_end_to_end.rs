//! End-to-end tests for the fetch/cache cycle against a local HTTP server

use std::fs::{self, File};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use chrono::Local;
use clap::Parser;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use pitwatch::cache::CacheManager;
use pitwatch::cli::Cli;
use pitwatch::config::Config;
use pitwatch::data::{CookClient, CookLoader, LoadSource, LoaderError};
use pitwatch::error::ErrorKind;
use pitwatch::pipeline::Pipeline;

const COOK_ID: u64 = 3045172;
const INTERVAL: Duration = Duration::from_secs(300);

const BODY: &str = "time,set_temp,pit_temp,meat_temp1,meat_temp2,duty_cycle\n\
                    1721390000,1071,1065,378,-32768,3500\n\
                    1721393600,1071,1068,517,-32768,3400\n\
                    1721397200,1071,1070,656,-32768,3300\n";

/// One-route HTTP server that answers every request the same way
struct TestServer {
    endpoint_template: String,
    hits: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    async fn start(status_line: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let paths = Arc::new(Mutex::new(Vec::new()));

        let counter = hits.clone();
        let seen = paths.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&chunk[..n]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let head = String::from_utf8_lossy(&request);
                if let Some(path) = head.split_whitespace().nth(1) {
                    seen.lock().unwrap().push(path.to_string());
                }

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            endpoint_template: format!("http://{}/en/cooks/{{cook_id}}/raw", addr),
            hits,
            paths,
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn loader(&self, temp_dir: &TempDir) -> CookLoader {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        CookLoader::new(
            CookClient::with_client(client, self.endpoint_template.clone()),
            CacheManager::with_dir(temp_dir.path().to_path_buf()),
            INTERVAL,
        )
    }
}

fn backdate(path: &std::path::Path, by: Duration) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - by).unwrap();
}

#[tokio::test]
async fn test_first_load_fetches_and_caches_body() {
    let server = TestServer::start("200 OK", BODY).await;
    let temp_dir = TempDir::new().unwrap();
    let loader = server.loader(&temp_dir);

    let before = Local::now();
    let loaded = loader.load(COOK_ID).await.unwrap();
    let after = Local::now();

    assert_eq!(loaded.source, LoadSource::Remote);
    assert_eq!(loaded.records.len(), 3);
    assert_eq!(loaded.records[2].meat_temp1, 656);
    assert!(loaded.last_updated >= before && loaded.last_updated <= after);
    assert_eq!(server.hits(), 1);
    assert_eq!(
        server.paths.lock().unwrap().as_slice(),
        ["/en/cooks/3045172/raw".to_string()]
    );

    let cached = fs::read_to_string(temp_dir.path().join("3045172.csv")).unwrap();
    assert_eq!(cached, BODY);
}

#[tokio::test]
async fn test_second_load_within_interval_uses_cache() {
    let server = TestServer::start("200 OK", BODY).await;
    let temp_dir = TempDir::new().unwrap();
    let loader = server.loader(&temp_dir);

    let first = loader.load(COOK_ID).await.unwrap();
    let second = loader.load(COOK_ID).await.unwrap();

    assert_eq!(server.hits(), 1, "Fresh cache must not hit the network");
    assert!(matches!(second.source, LoadSource::Cache { .. }));
    assert_eq!(first.records, second.records);
}

#[tokio::test]
async fn test_stale_cache_is_refetched() {
    let server = TestServer::start("200 OK", BODY).await;
    let temp_dir = TempDir::new().unwrap();
    let loader = server.loader(&temp_dir);

    loader.load(COOK_ID).await.unwrap();
    backdate(
        &temp_dir.path().join("3045172.csv"),
        INTERVAL + Duration::from_secs(60),
    );

    let loaded = loader.load(COOK_ID).await.unwrap();

    assert_eq!(loaded.source, LoadSource::Remote);
    assert_eq!(server.hits(), 2);
    let age = loader
        .cache()
        .age(COOK_ID, SystemTime::now())
        .unwrap()
        .unwrap();
    assert!(age < INTERVAL, "Refetch should refresh the cache mtime");
}

#[tokio::test]
async fn test_not_found_is_network_error_and_leaves_no_cache() {
    let server = TestServer::start("404 Not Found", "no such cook").await;
    let temp_dir = TempDir::new().unwrap();
    let loader = server.loader(&temp_dir);

    let err = loader.load(COOK_ID).await.unwrap_err();

    match &err {
        LoaderError::Status { status, url } => {
            assert_eq!(*status, 404);
            assert!(url.ends_with("/en/cooks/3045172/raw"));
        }
        other => panic!("Expected a status error, got {:?}", other),
    }
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(!temp_dir.path().join("3045172.csv").exists());
}

#[tokio::test]
async fn test_malformed_body_is_data_error() {
    let server = TestServer::start("200 OK", "time,set_temp\nsoon,hot\n").await;
    let temp_dir = TempDir::new().unwrap();
    let loader = server.loader(&temp_dir);

    let err = loader.load(COOK_ID).await.unwrap_err();

    assert!(matches!(err, LoaderError::Csv(_)));
    assert_eq!(err.kind(), ErrorKind::MalformedData);
}

#[tokio::test]
async fn test_pipeline_projects_from_served_data() {
    let server = TestServer::start("200 OK", BODY).await;
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().to_string_lossy().to_string();
    let cli = Cli::parse_from([
        "pitwatch",
        "3045172",
        "--cache-dir",
        &cache_dir,
        "--endpoint",
        &server.endpoint_template,
        "--start-fraction",
        "0",
        "--utc-offset",
        "0",
    ]);
    let config = Config::merge(&cli, Default::default(), "test").unwrap();
    let pipeline = Pipeline::with_loader(&config, server.loader(&temp_dir));

    let snapshot = pipeline.run().await.unwrap();

    assert_eq!(snapshot.cook_id, COOK_ID);
    assert_eq!(snapshot.readings.len(), 3);
    assert_eq!(snapshot.source, LoadSource::Remote);
    let projection = snapshot.projection.unwrap();
    assert!(projection.is_converging());
    assert_eq!(
        projection.describe(&config.utc_offset),
        "203.00°F at 2024-07-19 16:00"
    );
}
