use research_assistant::config::{Config, RetryPolicy};
use research_assistant::research::{summarise_page, Progress, Research, ResearchError};
use research_assistant::scraper::{Scraper, ScraperError};
use research_assistant::search::GoogleSearch;
use research_assistant::SummarizeError;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.cohere_key = Some("cohere".to_string());
    config.api.google_key = Some("google".to_string());
    config.api.google_cse_id = Some("engine".to_string());
    config.summarizer.endpoint = format!("{}/v1/summarize", server.uri());
    config.summarizer.retry = RetryPolicy {
        attempts: 2,
        backoff_base_ms: 5,
        timeout_delay_ms: 5,
        request_timeout_ms: 2_000,
    };
    config.search.endpoint = format!("{}/customsearch/v1", server.uri());
    config.scraper.retry_delay_ms = 5;
    config.pipeline.pace_ms = 0;
    config
}

fn page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(format!("<html><body>{body}</body></html>"), "text/html")
}

#[tokio::test]
async fn test_search_returns_links_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("key", "google"))
        .and(query_param("cx", "engine"))
        .and(query_param("q", "solar power"))
        .and(query_param("num", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "link": "https://a.example" },
                { "title": "no link" },
                { "link": "https://b.example" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let search = GoogleSearch::new(&config_for(&server)).unwrap();
    let urls = search.search("solar power", 25).await.unwrap();
    assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
}

#[tokio::test]
async fn test_search_without_items_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "kind": "customsearch#search" })),
        )
        .mount(&server)
        .await;

    let search = GoogleSearch::new(&config_for(&server)).unwrap();
    assert!(search.search("nothing", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scraper_extracts_and_truncates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/long"))
        .respond_with(page(&format!("<p>{}</p>", "word ".repeat(2000))))
        .mount(&server)
        .await;

    let scraper = Scraper::new(&config_for(&server).scraper).unwrap();
    let content = scraper
        .fetch_content(&format!("{}/long", server.uri()))
        .await
        .unwrap();
    assert_eq!(content.text.chars().count(), 4000);
}

#[tokio::test]
async fn test_scraper_forbidden_and_empty_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(page("<script>only code</script>"))
        .mount(&server)
        .await;

    let scraper = Scraper::new(&config_for(&server).scraper).unwrap();
    let uri = server.uri();
    assert!(matches!(
        scraper.fetch_content(&format!("{uri}/blocked")).await,
        Err(ScraperError::Forbidden)
    ));
    assert!(matches!(
        scraper.fetch_content(&format!("{uri}/missing")).await,
        Err(ScraperError::Status(status)) if status.as_u16() == 404
    ));
    assert!(matches!(
        scraper.fetch_content(&format!("{uri}/empty")).await,
        Err(ScraperError::NoContent)
    ));
}

#[tokio::test]
async fn test_scraper_retries_timeouts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page("<p>slow</p>").set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.scraper.timeout_ms = 100;
    config.scraper.attempts = 2;

    let scraper = Scraper::new(&config.scraper).unwrap();
    let result = scraper.fetch_content(&format!("{}/slow", server.uri())).await;
    assert!(matches!(result, Err(ScraperError::TimedOut(2))));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_full_research_run() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("q", "solar power"))
        .and(query_param("num", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "link": format!("{uri}/one") },
                { "link": format!("{uri}/blocked") },
                { "link": format!("{uri}/two") }
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(page("<p>Rooftop panels cut household bills.</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(page("<p>Battery storage can overheat.</p>"))
        .mount(&server)
        .await;

    let reply = |text: &str| ResponseTemplate::new(200).set_body_json(json!({ "summary": text }));
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "text": "Rooftop panels cut household bills." })))
        .respond_with(reply("Solar improves affordability."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "text": "Battery storage can overheat." })))
        .respond_with(reply("Storage carries a fire risk."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "text": "Solar improves affordability.\nStorage carries a fire risk."
        })))
        .respond_with(reply("Solar is cheaper but storage is risky."))
        .expect(1)
        .mount(&server)
        .await;

    let research = Research::new(&config_for(&server)).unwrap();
    let mut skipped = Vec::new();
    let outcome = research
        .run("  solar power ", 3, |progress| {
            if let Progress::Skipped { url, .. } = progress {
                skipped.push(url.to_string());
            }
        })
        .await
        .unwrap();

    assert_eq!(skipped, vec![format!("{uri}/blocked")]);
    assert_eq!(outcome.sources.len(), 2);
    assert_eq!(outcome.sources[0].url, format!("{uri}/one"));
    assert_eq!(
        outcome.sources[1].summary,
        Ok("Storage carries a fire risk.".to_string())
    );

    let report = outcome.report.expect("report should be produced");
    assert_eq!(
        report.summary,
        Ok("Solar is cheaper but storage is risky.".to_string())
    );
    assert_eq!(report.pros, vec!["Solar improves affordability."]);
    assert_eq!(report.cons, vec!["Storage carries a fire risk."]);
    assert_eq!(report.contradictions.len(), 1);
}

#[tokio::test]
async fn test_research_without_usable_sources_has_no_report() {
    let server = MockServer::start().await;
    let uri = server.uri();
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "link": format!("{uri}/blocked") }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let research = Research::new(&config_for(&server)).unwrap();
    let outcome = research.run("anything", 5, |_| {}).await.unwrap();
    assert!(outcome.sources.is_empty());
    assert!(outcome.report.is_none());
}

#[tokio::test]
async fn test_research_rejects_empty_topic_and_missing_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let research = Research::new(&config_for(&server)).unwrap();
    assert!(matches!(
        research.run("   ", 5, |_| {}).await,
        Err(ResearchError::EmptyTopic)
    ));
    assert!(matches!(
        research.run("obscure", 5, |_| {}).await,
        Err(ResearchError::NoResults(_))
    ));
}

#[test]
fn test_research_requires_summarizer_credential() {
    let mut config = Config::default();
    config.api.google_key = Some("google".to_string());
    config.api.google_cse_id = Some("engine".to_string());
    assert!(matches!(
        Research::new(&config),
        Err(ResearchError::Summarize(_))
    ));
}

#[tokio::test]
async fn test_scraper_retries_stalled_body() {
    // First connection sends headers and part of the body, then stalls.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let body = "<html><body><p>Body arrived in full.</p></body></html>";
                if n == 0 {
                    let head = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n",
                        body.len()
                    );
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(&body.as_bytes()[..10]).await;
                    tokio::time::sleep(Duration::from_secs(5)).await;
                } else {
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                }
            });
        }
    });

    let mut config = Config::default();
    config.scraper.timeout_ms = 300;
    config.scraper.retry_delay_ms = 5;
    let scraper = Scraper::new(&config.scraper).unwrap();

    let content = scraper
        .fetch_content(&format!("http://{addr}/stalled"))
        .await
        .unwrap();
    assert_eq!(content.text, "Body arrived in full.");
    assert_eq!(connections.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_summarise_page_checks_credential_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(page("<p>Never requested.</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.api.cohere_key = None;

    let result = summarise_page(&config, &format!("{}/article", server.uri())).await;
    assert!(matches!(
        result,
        Err(ResearchError::Summarize(SummarizeError::MissingApiKey))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_summarise_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(page("<h1>Tides</h1><p>The moon drives ocean tides.</p>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "text": "Tides The moon drives ocean tides." })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "Moon makes tides." })))
        .expect(1)
        .mount(&server)
        .await;

    let page = summarise_page(&config_for(&server), &format!("{}/article", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.content.title.as_deref(), Some("Tides"));
    assert_eq!(page.summary, Ok("Moon makes tides.".to_string()));
}
