//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::path::Path;
use std::time::Duration;
use sumi_harvest::config::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, UserAgentConfig,
};
use sumi_harvest::crawler::{harvest, Engine, Fetcher, HarvestMode};
use sumi_harvest::output::{build_sink, APIS_FILE_NAME, EMAILS_FILE_NAME};
use sumi_harvest::FetchError;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `out`
fn create_test_config(max_depth: u32, out: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            max_concurrent_fetches: 4,
            request_timeout_ms: 2_000,
        },
        user_agent: UserAgentConfig {
            value: "TestBot/1.0".to_string(),
        },
        extraction: ExtractionConfig {
            file_extensions: vec![".xml".to_string(), ".json".to_string()],
        },
        output: OutputConfig {
            data_files_path: out.join("extracted_urls.txt").display().to_string(),
            emails_dir: out.join("Mails").display().to_string(),
            apis_dir: out.join("APIs").display().to_string(),
        },
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

/// Mounts a GET mock for `route` that must be hit exactly `times` times
async fn page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(times)
        .mount(server)
        .await;
}

fn seed(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("mock server URI is valid")
}

fn site(server: &MockServer) -> String {
    seed(server).host_str().expect("mock server has a host").to_string()
}

#[tokio::test]
async fn test_depth_limit_stops_at_max_depth() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(&server, "/", r#"<a href="/a">A</a>"#.to_string(), 1).await;
    page(&server, "/a", r#"<a href="/b">B</a>"#.to_string(), 1).await;
    page(&server, "/b", r#"<a href="/c">C</a>"#.to_string(), 1).await;
    page(&server, "/c", String::new(), 0).await;

    let config = create_test_config(2, dir.path());
    let report = harvest(&config, HarvestMode::DataFiles, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.skipped_depth, 1);
    let base = server.uri();
    assert_eq!(
        report.visited,
        vec![
            format!("{}/", base),
            format!("{}/a", base),
            format!("{}/b", base),
        ]
    );
}

#[tokio::test]
async fn test_max_depth_zero_fetches_only_seed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(&server, "/", r#"<a href="/a">A</a>"#.to_string(), 1).await;
    page(&server, "/a", String::new(), 0).await;

    let config = create_test_config(0, dir.path());
    let report = harvest(&config, HarvestMode::Emails, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 1);
}

#[tokio::test]
async fn test_external_links_are_never_fetched() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(
        &server,
        "/",
        format!(r#"<a href="{}/elsewhere">Out</a><a href="/local">In</a>"#, external.uri()),
        1,
    )
    .await;
    page(&server, "/local", String::new(), 1).await;
    page(&external, "/elsewhere", String::new(), 0).await;

    let config = create_test_config(3, dir.path());
    let report = harvest(&config, HarvestMode::DataFiles, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.skipped_external, 1);
    assert!(report.visited.iter().all(|u| u.starts_with(&server.uri())));
}

#[tokio::test]
async fn test_redirect_off_origin_is_not_followed() {
    let server = MockServer::start().await;
    let external = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(&server, "/", r#"<a href="/moved">Moved</a>"#.to_string(), 1).await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/landing", external.uri()).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    page(&external, "/landing", String::new(), 0).await;

    let config = create_test_config(3, dir.path());
    let report = harvest(&config, HarvestMode::DataFiles, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.pages_failed, 1);
}

/// Mounts a permanent redirect from `route` to `target` on the same server
async fn redirect(server: &MockServer, route: &str, target: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}{}", server.uri(), target).as_str()),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(&server, "/", r#"<a href="/docs">Docs</a>"#.to_string(), 1).await;
    redirect(&server, "/docs", "/docs/").await;
    page(&server, "/docs/", r#"<a href="intro">Intro</a>"#.to_string(), 1).await;
    page(&server, "/docs/intro", String::new(), 1).await;
    page(&server, "/intro", String::new(), 0).await;

    let config = create_test_config(3, dir.path());
    let report = harvest(&config, HarvestMode::DataFiles, &seed(&server))
        .await
        .expect("Crawl failed");

    let base = server.uri();
    assert!(report.visited.contains(&format!("{}/docs/", base)));
    assert!(report.visited.contains(&format!("{}/docs/intro", base)));
    assert_eq!(report.pages_failed, 0);
}

#[tokio::test]
async fn test_redirect_onto_visited_page_is_not_extracted_twice() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(
        &server,
        "/",
        r#"<a href="/new">New</a><a href="/old">Old</a>"#.to_string(),
        1,
    )
    .await;
    redirect(&server, "/old", "/new").await;
    // Served twice at the HTTP level: once directly, once behind the redirect
    page(&server, "/new", "owner@example.com".to_string(), 2).await;

    let config = create_test_config(3, dir.path());
    let report = harvest(&config, HarvestMode::Emails, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.records_emitted, 1);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.visited.len(), 3);
}

#[tokio::test]
async fn test_each_page_fetched_once_despite_cycles() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Every page links to every other page, including itself
    let links = r##"
        <a href="/">Home</a>
        <a href="/a">A</a>
        <a href="/a#top">A again</a>
        <a href="/b">B</a>
    "##;
    page(&server, "/", links.to_string(), 1).await;
    page(&server, "/a", links.to_string(), 1).await;
    page(&server, "/b", links.to_string(), 1).await;

    let config = create_test_config(5, dir.path());
    let report = harvest(&config, HarvestMode::Emails, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.visited.len(), 3);

    let mut deduped = report.visited.clone();
    deduped.dedup();
    assert_eq!(deduped, report.visited);
}

#[tokio::test]
async fn test_failed_page_is_reported_and_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(
        &server,
        "/",
        r#"<a href="/missing">Gone</a><a href="/ok">OK</a> seed@example.com"#.to_string(),
        1,
    )
    .await;
    page(&server, "/ok", "ok@example.com".to_string(), 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone@example.com"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(3, dir.path());
    let report = harvest(&config, HarvestMode::Emails, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_failed, 1);
    assert_eq!(report.records_emitted, 2);

    let stored = std::fs::read_to_string(
        dir.path().join("Mails").join(site(&server)).join(EMAILS_FILE_NAME),
    )
    .unwrap();
    assert!(!stored.contains("gone@example.com"));
}

#[tokio::test]
async fn test_fetcher_classifies_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&Config::default()).unwrap();
    let url = Url::parse(&format!("{}/missing", server.uri())).unwrap();

    match fetcher.fetch(&url).await {
        Err(FetchError::HttpStatus { status, url: failed }) => {
            assert_eq!(status, 404);
            assert_eq!(failed, url.as_str());
        }
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetcher_classifies_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&Config::default()).unwrap();
    let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();

    match fetcher
        .fetch_with_timeout(&url, Duration::from_millis(200))
        .await
    {
        Err(FetchError::Timeout { url: failed }) => assert_eq!(failed, url.as_str()),
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_configured_user_agent_is_sent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0"))
        .respond_with(html("hello@example.com".to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(0, dir.path());
    let report = harvest(&config, HarvestMode::Emails, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.pages_failed, 0);
}

#[tokio::test]
async fn test_data_file_mode_writes_session_list() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(
        &server,
        "/",
        r#"<a href="/sitemap.xml">Sitemap</a><a href="/about">About</a>
           <script>fetch("/api/feed.json")</script>"#
            .to_string(),
        1,
    )
    .await;
    page(&server, "/about", r#"<a href="/sitemap.xml">Sitemap</a>"#.to_string(), 1).await;
    // Data files are recorded, and fetched as ordinary same-origin links
    page(&server, "/sitemap.xml", String::new(), 1).await;

    let config = create_test_config(1, dir.path());
    let list = Path::new(&config.output.data_files_path);
    std::fs::write(list, "stale line from an earlier session\n").unwrap();

    let report = harvest(&config, HarvestMode::DataFiles, &seed(&server))
        .await
        .expect("Crawl failed");

    let contents = std::fs::read_to_string(list).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    let base = server.uri();

    assert!(!contents.contains("stale line"));
    assert_eq!(lines.len(), 2);
    assert!(lines.contains(&format!("{}/sitemap.xml", base).as_str()));
    assert!(lines.contains(&format!("{}/api/feed.json", base).as_str()));
    assert_eq!(report.records_persisted, 2);
}

#[tokio::test]
async fn test_email_mode_is_idempotent_across_runs() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(
        &server,
        "/",
        r#"<a href="mailto:info@example.com">info@example.com</a>
           <a href="/team">Team</a>"#
            .to_string(),
        2,
    )
    .await;
    page(
        &server,
        "/team",
        "alice@example.com, bob@example.org and info@example.com".to_string(),
        2,
    )
    .await;

    let config = create_test_config(2, dir.path());
    let first = harvest(&config, HarvestMode::Emails, &seed(&server))
        .await
        .expect("First crawl failed");
    let second = harvest(&config, HarvestMode::Emails, &seed(&server))
        .await
        .expect("Second crawl failed");

    let file = dir.path().join("Mails").join(site(&server)).join(EMAILS_FILE_NAME);
    let contents = std::fs::read_to_string(file).unwrap();
    let mut lines: Vec<&str> = contents.lines().collect();
    lines.sort();

    assert_eq!(
        lines,
        vec!["alice@example.com", "bob@example.org", "info@example.com"]
    );
    assert_eq!(first.records_persisted, 3);
    assert_eq!(second.records_persisted, 0);
}

#[tokio::test]
async fn test_api_mode_categorizes_script_endpoints() {
    let server = MockServer::start().await;
    let cdn = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let scripts = format!(
        r#"<script src="/static/app.js"></script>
           <script src="{}/lib.js"></script>
           <a href="/other">Other</a>"#,
        cdn.uri()
    );
    page(&server, "/", scripts.clone(), 1).await;
    page(&server, "/other", scripts, 1).await;

    // Shared scripts are fetched once per run, cross-origin ones included
    Mock::given(method("GET"))
        .and(path("/static/app.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"const a = "https://api.example.com/v1/login";
               const b = "https://api.example.com/admin/panel";
               const c = "https://api.example.com/static/data";"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lib.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"fetch("https://pay.example.com/checkout/pay")"#,
        ))
        .expect(1)
        .mount(&cdn)
        .await;

    let config = create_test_config(2, dir.path());
    let report = harvest(&config, HarvestMode::Apis, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.scripts_fetched, 2);
    assert_eq!(report.pages_fetched, 2);

    let file = dir.path().join("APIs").join(site(&server)).join(APIS_FILE_NAME);
    let contents = std::fs::read_to_string(file).unwrap();

    assert_eq!(
        contents,
        "Login APIs (1):\n\
         https://api.example.com/v1/login\n\
         \n\
         Admin APIs (1):\n\
         https://api.example.com/admin/panel\n\
         \n\
         User APIs (0):\n\
         \n\
         Payment APIs (1):\n\
         https://pay.example.com/checkout/pay\n\
         \n\
         Other APIs (1):\n\
         https://api.example.com/static/data\n\
         \n"
    );
}

#[tokio::test]
async fn test_api_mode_counts_only_endpoints() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(&server, "/", r#"<script src="/plain.js"></script>"#.to_string(), 1).await;
    Mock::given(method("GET"))
        .and(path("/plain.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("console.log('no urls');"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(1, dir.path());
    let report = harvest(&config, HarvestMode::Apis, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.scripts_fetched, 1);
    assert_eq!(report.records_emitted, 0);
}

#[tokio::test]
async fn test_api_mode_failed_seed_still_writes_buckets() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(1, dir.path());
    let report = harvest(&config, HarvestMode::Apis, &seed(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.pages_failed, 1);
    let file = dir.path().join("APIs").join(site(&server)).join(APIS_FILE_NAME);
    let contents = std::fs::read_to_string(file).unwrap();
    assert_eq!(contents.matches("APIs (0):").count(), 5);
}

#[tokio::test]
async fn test_api_mode_without_scripts_writes_empty_buckets() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(&server, "/", "<p>No scripts here</p>".to_string(), 1).await;

    let config = create_test_config(1, dir.path());
    harvest(&config, HarvestMode::Apis, &seed(&server))
        .await
        .expect("Crawl failed");

    let file = dir.path().join("APIs").join(site(&server)).join(APIS_FILE_NAME);
    let contents = std::fs::read_to_string(file).unwrap();
    assert!(contents.starts_with("Login APIs (0):\n\n"));
    assert!(contents.contains("Other APIs (0):\n"));
}

#[tokio::test]
async fn test_cancelled_engine_fetches_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    page(&server, "/", r#"<a href="/a">A</a>"#.to_string(), 0).await;

    let config = create_test_config(3, dir.path());
    let sink = build_sink(HarvestMode::DataFiles, &config.output).unwrap();
    let mut engine = Engine::new(&config, HarvestMode::DataFiles, sink).unwrap();
    engine.cancellation_token().cancel();

    let report = engine.run(&seed(&server)).await.expect("Crawl failed");

    assert!(report.cancelled);
    assert_eq!(report.pages_fetched, 0);
    assert!(report.visited.is_empty());
}
