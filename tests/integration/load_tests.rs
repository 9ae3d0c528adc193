//! Integration tests for load mode
//!
//! Workers run on their own threads and runtimes, so these tests use a
//! multi-threaded runtime to keep the mock server responsive meanwhile.

use std::collections::HashSet;
use std::time::Duration;
use swarmfetch::config::Config;
use swarmfetch::loadgen::{run_load, StopSignal, UrlRing, WorkerPool};
use swarmfetch::output::{LineSink, SharedLineSink, StatsRegion, VisitSink};
use swarmfetch::{ConfigError, SwarmError};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &str = "hello";

async fn start_server() -> MockServer {
    let mock_server = MockServer::start().await;

    for p in ["/a", "/b"] {
        Mock::given(method("GET"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(200).set_body_string(BODY))
            .mount(&mock_server)
            .await;
    }

    mock_server
}

fn create_test_config(workers: usize, stats_dir: Option<&TempDir>) -> Config {
    let mut config = Config::default();
    config.engine.max_concurrent = 2;
    config.load.workers = workers;
    config.load.rate_interval_ms = 100;
    config.load.stats_dir = stats_dir.map(|d| d.path().to_path_buf());
    config
}

fn ring_for(server: &MockServer) -> UrlRing {
    UrlRing::new(vec![
        format!("{}/a", server.uri()),
        format!("{}/b", server.uri()),
    ])
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pool_cycles_ring_until_stopped() {
    let mock_server = start_server().await;
    let stats_dir = TempDir::new().unwrap();
    let config = create_test_config(2, Some(&stats_dir));

    let stop = StopSignal::new();
    let pool = WorkerPool::start(&config, ring_for(&mock_server), stop.clone(), None).unwrap();
    assert_eq!(pool.len(), 2);

    tokio::time::sleep(Duration::from_millis(500)).await;
    stop.trigger();

    let summary = tokio::task::spawn_blocking(move || pool.join())
        .await
        .unwrap()
        .expect("Pool failed");

    assert_eq!(summary.workers.len(), 2);
    assert_eq!(summary.workers[0].worker_id, 0);
    assert_eq!(summary.workers[1].worker_id, 1);
    assert!(summary.total_hits() > 0);
    assert_eq!(summary.total_bytes(), summary.total_hits() * BODY.len() as u64);

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len() as u64, summary.total_hits());

    // Each stats file holds the worker's final record
    for record in &summary.workers {
        let file = StatsRegion::path_for(stats_dir.path(), record.worker_id);
        assert_eq!(std::fs::metadata(&file).unwrap().len(), 40);
        let published = StatsRegion::read(&file).unwrap();
        assert_eq!(published, Some(*record));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_visits_recorded_to_shared_sink() {
    let mock_server = start_server().await;
    let out_dir = TempDir::new().unwrap();
    let visited_path = out_dir.path().join("visited.txt");
    let config = create_test_config(3, None);

    let sink = SharedLineSink::new(LineSink::create(&visited_path).unwrap());
    let stop = StopSignal::new();
    let pool = WorkerPool::start(
        &config,
        ring_for(&mock_server),
        stop.clone(),
        Some(sink.clone()),
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    stop.trigger();

    let summary = tokio::task::spawn_blocking(move || pool.join())
        .await
        .unwrap()
        .unwrap();

    let mut sink = sink;
    sink.flush().unwrap();

    let content = std::fs::read_to_string(&visited_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len() as u64, summary.total_hits());

    let allowed: HashSet<String> = ["/a", "/b"]
        .iter()
        .map(|p| format!("{}{}", mock_server.uri(), p))
        .collect();
    assert!(lines.iter().all(|line| allowed.contains(*line)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_transfers_still_count_as_hits() {
    let mock_server = MockServer::start().await;
    // No mocks: every request gets a 404 with an empty body

    let config = create_test_config(1, None);
    let ring = UrlRing::new(vec![format!("{}/missing", mock_server.uri())]).unwrap();
    let stop = StopSignal::new();
    let pool = WorkerPool::start(&config, ring, stop.clone(), None).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    stop.trigger();

    let summary = tokio::task::spawn_blocking(move || pool.join())
        .await
        .unwrap()
        .unwrap();

    assert!(summary.total_hits() > 0);
    assert_eq!(summary.total_bytes(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stats_setup_failure_stops_pool() {
    let mock_server = start_server().await;
    let dir = TempDir::new().unwrap();

    // A regular file where the stats directory should be
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();

    let mut config = create_test_config(2, None);
    config.load.stats_dir = Some(blocker);

    let stop = StopSignal::new();
    let pool = WorkerPool::start(&config, ring_for(&mock_server), stop.clone(), None).unwrap();

    let result = tokio::task::spawn_blocking(move || pool.join())
        .await
        .unwrap();

    assert!(matches!(result, Err(SwarmError::Setup(_))));
    assert!(stop.is_triggered());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_load_stops_after_duration() {
    let mock_server = start_server().await;
    let dir = TempDir::new().unwrap();
    let url_file = dir.path().join("urls.txt");
    std::fs::write(
        &url_file,
        format!(
            "# targets\n{uri}/a\n\n{uri}/b\n",
            uri = mock_server.uri()
        ),
    )
    .unwrap();

    let mut config = create_test_config(2, None);
    config.load.url_file = Some(url_file);
    config.load.duration_secs = Some(1);

    let started = std::time::Instant::now();
    let summary = run_load(&config, StopSignal::new(), None)
        .await
        .expect("Load run failed");

    assert!(started.elapsed() >= Duration::from_secs(1));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(summary.workers.len(), 2);
    assert!(summary.total_hits() > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_load_honours_external_stop() {
    let mock_server = start_server().await;
    let dir = TempDir::new().unwrap();
    let url_file = dir.path().join("urls.txt");
    std::fs::write(&url_file, format!("{}/a\n", mock_server.uri())).unwrap();

    let mut config = create_test_config(1, None);
    config.load.url_file = Some(url_file);

    let stop = StopSignal::new();
    let trigger = stop.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.trigger();
    });

    let summary = run_load(&config, stop, None).await.unwrap();
    assert_eq!(summary.workers.len(), 1);
}

#[tokio::test]
async fn test_run_load_with_empty_url_file() {
    let dir = TempDir::new().unwrap();
    let url_file = dir.path().join("urls.txt");
    std::fs::write(&url_file, "# nothing here\n\n").unwrap();

    let mut config = create_test_config(1, None);
    config.load.url_file = Some(url_file);

    let result = run_load(&config, StopSignal::new(), None).await;
    assert!(matches!(
        result,
        Err(SwarmError::Config(ConfigError::MissingSeed(_)))
    ));
}

#[tokio::test]
async fn test_run_load_without_url_file() {
    let config = create_test_config(1, None);
    let result = run_load(&config, StopSignal::new(), None).await;
    assert!(matches!(
        result,
        Err(SwarmError::Config(ConfigError::MissingSeed(_)))
    ));
}
