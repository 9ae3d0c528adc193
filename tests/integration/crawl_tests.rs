//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the transfer engine and the full crawl cycle end-to-end.

use std::collections::HashSet;
use std::time::Duration;
use swarmfetch::config::{Config, EngineConfig};
use swarmfetch::crawler::{run_crawl, Frontier, Multiplexer};
use swarmfetch::{SwarmError, TransferError, TransferStatus};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a crawl configuration seeded at `seed`
fn create_test_config(seed: &str, exclude: Vec<String>) -> Config {
    let mut config = Config::default();
    config.engine.max_concurrent = 4;
    config.engine.user_agent = "swarmfetch-test/1.0".to_string();
    config.crawl.seed = Some(seed.to_string());
    config.crawl.exclude = exclude;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url)
        .expect("Failed to parse base URL")
        .port()
        .expect("Mock server has a port");

    // Index links to every kind of target the crawler has to handle
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"
            <a href="/page1">absolute path</a>
            <a href='page2'>relative</a>
            <a href="/page1#section">same page, fragment</a>
            <a href="http://localhost:{}/offsite">other host</a>
            <a href="/private/secret">excluded</a>
            <a href="/missing">broken</a>
            <a href="mailto:someone@example.com">mail</a>
            "#,
            port
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<a href="/">home</a><a href="/page2">next</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(r#"<a href="/page1">back</a><img src="/page1">"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("should never be fetched"))
        .expect(0)
        .mount(&mock_server)
        .await;

    // /missing has no mock and gets wiremock's default 404

    let seed = format!("{}/", base_url);
    let config = create_test_config(&seed, vec!["/private/".to_string()]);

    let mut visited: Vec<String> = Vec::new();
    let report = run_crawl(&config, &mut visited)
        .await
        .expect("Crawl failed");

    let visited_set: HashSet<String> = visited.iter().cloned().collect();
    assert_eq!(visited.len(), visited_set.len(), "a page was visited twice");

    let expected: HashSet<String> = ["/", "/page1", "/page2"]
        .iter()
        .map(|p| format!("{}{}", base_url, p))
        .collect();
    assert_eq!(visited_set, expected);

    // Seed, page1, page2 and the broken link were admitted
    assert_eq!(report.discovered, 4);
    assert_eq!(report.dead, 1);
    assert_eq!(report.visited(), 3);
    assert_eq!(report.count(TransferStatus::HttpFailure), 1);
    assert!(report.duplicates >= 4);
}

#[tokio::test]
async fn test_crawl_resolves_links_against_effective_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/new/index.html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/index.html"))
        .respond_with(html(r#"<a href="child">child</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/child"))
        .respond_with(html("leaf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/old", base_url), vec![]);

    let mut visited: Vec<String> = Vec::new();
    let report = run_crawl(&config, &mut visited).await.unwrap();

    assert_eq!(
        visited,
        vec![
            format!("{}/old", base_url),
            format!("{}/new/child", base_url)
        ]
    );
    assert_eq!(report.dead, 0);
}

#[tokio::test]
async fn test_crawl_of_server_error_seed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/", mock_server.uri()), vec![]);

    let mut visited: Vec<String> = Vec::new();
    let report = run_crawl(&config, &mut visited).await.unwrap();

    assert!(visited.is_empty());
    assert_eq!(report.dead, 1);
    assert_eq!(report.count(TransferStatus::HttpFailure), 1);
}

#[tokio::test]
async fn test_multiplexer_delivers_by_readiness() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fast"))
        .mount(&mock_server)
        .await;

    let mut mux = Multiplexer::new(&EngineConfig::default()).unwrap();
    let slow = mux.submit(&format!("{}/slow", mock_server.uri())).unwrap();
    let fast = mux.submit(&format!("{}/fast", mock_server.uri())).unwrap();
    assert_eq!(mux.in_flight(), 2);

    let first = mux.next_completion().await.unwrap();
    assert_eq!(first.id, fast.id());
    assert_eq!(first.outcome, Ok(200));
    assert_eq!(first.body, b"fast");

    let second = mux.next_completion().await.unwrap();
    assert_eq!(second.id, slow.id());
    assert!(second.is_success());

    assert!(mux.next_completion().await.is_none());
}

#[tokio::test]
async fn test_delayed_response_is_stalled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hang"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = EngineConfig {
        stall_seconds: 1,
        stall_bytes_per_sec: 10,
        ..EngineConfig::default()
    };
    let mut mux = Multiplexer::new(&config).unwrap();
    mux.submit(&format!("{}/hang", mock_server.uri())).unwrap();

    let started = std::time::Instant::now();
    let completion = mux.next_completion().await.unwrap();

    assert!(matches!(
        completion.outcome,
        Err(TransferError::Stalled { bytes: 0, .. })
    ));
    assert_eq!(completion.status(), TransferStatus::Stalled);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_trickling_body_is_stalled() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // Headers and a few body bytes arrive at once, then the peer goes quiet
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 1000\r\n\r\nabc")
            .await
            .unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let config = EngineConfig {
        stall_seconds: 1,
        stall_bytes_per_sec: 10,
        ..EngineConfig::default()
    };
    let mut mux = Multiplexer::new(&config).unwrap();
    mux.submit(&format!("http://{}/slow-body", addr)).unwrap();

    let started = std::time::Instant::now();
    let completion = mux.next_completion().await.unwrap();

    assert!(matches!(
        completion.outcome,
        Err(TransferError::Stalled { bytes: 3, .. })
    ));
    assert_eq!(completion.status(), TransferStatus::Stalled);
    assert!(started.elapsed() < Duration::from_secs(4));

    server.abort();
}

#[tokio::test]
async fn test_redirect_loop_hits_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/b"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/a"))
        .mount(&mock_server)
        .await;

    let config = EngineConfig {
        max_redirects: 3,
        ..EngineConfig::default()
    };
    let mut mux = Multiplexer::new(&config).unwrap();
    mux.submit(&format!("{}/a", mock_server.uri())).unwrap();

    let completion = mux.next_completion().await.unwrap();
    assert_eq!(completion.status(), TransferStatus::RedirectLimit);
}

#[tokio::test]
async fn test_in_flight_never_exceeds_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("ok")
                .set_delay(Duration::from_millis(20)),
        )
        .expect(10)
        .mount(&mock_server)
        .await;

    let config = EngineConfig {
        max_concurrent: 3,
        ..EngineConfig::default()
    };
    let mut mux = Multiplexer::new(&config).unwrap();
    let mut frontier = Frontier::new();
    for i in 0..10 {
        frontier.enqueue(format!("{}/item/{}", mock_server.uri(), i));
    }

    let mut completed = 0;
    loop {
        frontier.drain_admissible(&mut mux);
        assert!(mux.in_flight() <= 3);

        match mux.next_completion().await {
            Some(completion) => {
                assert!(completion.is_success());
                completed += 1;
            }
            None => break,
        }
    }

    assert_eq!(completed, 10);
    assert_eq!(frontier.visited().len(), 10);
}

#[tokio::test]
async fn test_submit_rejects_invalid_urls() {
    let mut mux = Multiplexer::new(&EngineConfig::default()).unwrap();
    assert!(matches!(mux.submit(""), Err(SwarmError::InvalidUrl(_))));
    assert!(matches!(
        mux.submit("/relative"),
        Err(SwarmError::InvalidUrl(_))
    ));
    assert_eq!(mux.in_flight(), 0);
}
