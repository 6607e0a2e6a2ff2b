//! Integration tests for the HTML pass
//!
//! These tests use wiremock to stand in for the wiki (content API, images,
//! formulas and stylesheet) and run the full crawl cycle end-to-end into
//! temporary directories.

use offline_manual::config::{
    Config, CrawlerConfig, ExportConfig, OutputConfig, UserAgentConfig, WikiConfig,
};
use offline_manual::crawler::run_crawl;
use offline_manual::MirrorError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORMULA_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4" viewBox="0 0 8 4"><rect width="8" height="4"/></svg>"#;

/// Creates a test configuration pointing at the mock wiki
fn create_test_config(base_url: &str, out: &Path) -> Config {
    Config {
        wiki: WikiConfig {
            base_url: base_url.to_string(),
            article_path: "/wiki/".to_string(),
            api_url: format!(
                "{}/w/api.php?action=parse&format=xml&prop=text&page=",
                base_url
            ),
            root_page: format!("{}/wiki/Manual", base_url),
            manual_prefix: None,
            printable_page: "Print_version".to_string(),
            stylesheet_url: format!("{}/w/load.php", base_url),
            site_name: "WikiBooks".to_string(),
        },
        user_agent: UserAgentConfig {
            value: "TestBot/1.0 (+https://example.com/contact)".to_string(),
        },
        crawler: CrawlerConfig {
            request_timeout_secs: 5,
            max_retries: 1,
            retry_delay_ms: 10, // Very short for testing
            excluded_pages: vec![format!("{}/wiki/Manual/Old", base_url)],
        },
        output: OutputConfig {
            html_dir: out.join("docs").to_string_lossy().into_owned(),
            pdf_staging_dir: out.join("docs_pdf").to_string_lossy().into_owned(),
            pdf_dir: out.join("pdf").to_string_lossy().into_owned(),
        },
        export: ExportConfig::default(),
    }
}

/// Wraps page HTML the way the XML content API does
fn api_body(html: &str) -> String {
    let escaped = html
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    format!(
        r#"<?xml version="1.0"?><api><parse title="Page" pageid="1"><text xml:space="preserve">{}</text></parse></api>"#,
        escaped
    )
}

async fn mount_page(server: &MockServer, page: &str, html: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("page", page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(api_body(html))
                .insert_header("content-type", "text/xml; charset=utf-8"),
        )
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_stylesheet(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/w/load.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("body{color:black}")
                .insert_header("content-type", "text/css"),
        )
        .mount(server)
        .await;
}

const MANUAL: &str = r#"<div class="mw-parser-output">
<p>Intro <a href="/wiki/Manual/FAQ">FAQ</a> and <a href="/wiki/Manual/FAQ#Section">a section</a>.</p>
<p><a href="/wiki/Manual/Shapes">Shapes</a> <a href="/wiki/Manual/Old">Old</a> <a href="/wiki/Main_Page">Main</a></p>
<a href="/wiki/File:A_b.png" class="image"><img src="/images/a%20b.png" srcset="/images/a%20b_2x.png 2x"></a>
<div class="printfooter">Retrieved from the wiki</div>
</div>"#;

const FAQ: &str = r#"<div class="mw-parser-output">
<h2><span class="mw-headline" id="Section">Section</span><span class="mw-editsection">[edit]</span></h2>
<p><a href="/wiki/Manual">Back</a> <img src="/images/a%20b.png">
<span class="mwe-math-element"><img class="mwe-math-fallback-image-inline" src="/media/math/render/svg/abc123"></span></p>
</div>"#;

const SHAPES: &str = r#"<div class="mw-parser-output">
<div class="noprint">NAVBOX</div>
<p><a href="/wiki/Manual/FAQ">FAQ</a></p>
</div>"#;

#[tokio::test]
async fn test_full_mirror() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp = TempDir::new().unwrap();

    mount_page(&mock_server, "Manual", MANUAL, 1).await;
    mount_page(&mock_server, "Manual/FAQ", FAQ, 1).await;
    mount_page(&mock_server, "Manual/Shapes", SHAPES, 1).await;
    mount_page(&mock_server, "Manual/Old", SHAPES, 0).await;
    mount_stylesheet(&mock_server).await;

    // Shared image: referenced by two pages, downloaded once
    Mock::given(method("GET"))
        .and(path("/images/a%20b.png"))
        .and(header("user-agent", "TestBot/1.0 (+https://example.com/contact)"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/media/math/render/svg/abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(FORMULA_SVG)
                .insert_header("content-type", "image/svg+xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, temp.path());
    let stats = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(stats.pages_written(), 3);
    assert_eq!(stats.pages_failed(), 0);
    assert_eq!(stats.images, 1);
    assert_eq!(stats.maths, 1);
    assert_eq!(stats.asset_failures, 0);
    assert_eq!(stats.excluded, 1);

    let docs = temp.path().join("docs");
    assert!(docs.join("Manual.html").is_file());
    assert!(docs.join("FAQ.html").is_file());
    assert!(docs.join("Shapes.html").is_file());
    assert!(!docs.join("Old.html").exists());
    assert!(docs.join("imgs").join("a_b.png").is_file());
    assert!(docs.join("imgs").join("maths").join("abc123.svg").is_file());
    assert_eq!(
        std::fs::read_to_string(docs.join("styles").join("style.css")).unwrap(),
        "body{color:black}"
    );

    let manual = std::fs::read_to_string(docs.join("Manual.html")).unwrap();
    assert!(manual.starts_with("<!DOCTYPE html>"));
    assert!(manual.contains(r#"href="FAQ.html""#));
    assert!(manual.contains(r##"href="FAQ.html#Section""##));
    assert!(manual.contains(r#"href="Shapes.html""#));
    assert!(manual.contains(&format!(r#"href="{}/wiki/Manual/Old""#, base_url)));
    assert!(manual.contains(&format!(r#"href="{}/wiki/Main_Page""#, base_url)));
    assert!(manual.contains(r#"src="./imgs/a_b.png""#));
    assert!(manual.contains(r#"<a href="./imgs/a_b.png" class="image">"#)
        || manual.contains(r#"<a class="image" href="./imgs/a_b.png">"#));
    assert!(!manual.contains("srcset"));
    assert!(!manual.contains("Retrieved from the wiki"));
    assert!(manual.contains("From the WikiBooks article"));
    assert!(manual.contains(r#"<h1 class="firstHeading" id="firstHeading">Manual</h1>"#));

    let faq = std::fs::read_to_string(docs.join("FAQ.html")).unwrap();
    assert!(faq.contains(r#"href="Manual.html""#));
    assert!(faq.contains(r#"src="./imgs/maths/abc123.svg""#));
    assert!(!faq.contains("[edit]"));

    let shapes = std::fs::read_to_string(docs.join("Shapes.html")).unwrap();
    assert!(!shapes.contains("NAVBOX"));
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "Manual",
        r#"<div><a href="/wiki/Manual/Missing">Missing</a> <a href="/wiki/Manual/Shapes">Shapes</a></div>"#,
        1,
    )
    .await;
    mount_page(&mock_server, "Manual/Shapes", SHAPES, 1).await;
    mount_stylesheet(&mock_server).await;

    // A 404 is not retried
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("page", "Manual/Missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Shapes links back to FAQ, which also does not exist
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("page", "Manual/FAQ"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, temp.path());
    let stats = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(stats.pages_written(), 2);
    assert_eq!(stats.pages_failed(), 2);
    assert!(stats
        .failed_urls
        .contains(&format!("{}/wiki/Manual/Missing", base_url)));

    let docs = temp.path().join("docs");
    assert!(docs.join("Manual.html").is_file());
    assert!(docs.join("Shapes.html").is_file());
    assert!(!docs.join("Missing.html").exists());
}

#[tokio::test]
async fn test_root_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp = TempDir::new().unwrap();
    mount_stylesheet(&mock_server).await;

    // One attempt plus one retry
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("page", "Manual"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, temp.path());
    let result = run_crawl(&config).await;

    assert!(matches!(
        result,
        Err(MirrorError::HttpStatus { status: 503, .. })
    ));
    assert!(!temp.path().join("docs").join("Manual.html").exists());
}

#[tokio::test]
async fn test_empty_api_response_is_page_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp = TempDir::new().unwrap();
    mount_stylesheet(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("page", "Manual"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0"?><api><parse><text xml:space="preserve"></text></parse></api>"#,
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, temp.path());
    let result = run_crawl(&config).await;

    assert!(matches!(result, Err(MirrorError::EmptyPage { .. })));
}

#[tokio::test]
async fn test_asset_failure_keeps_remote_reference() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp = TempDir::new().unwrap();
    mount_stylesheet(&mock_server).await;

    mount_page(
        &mock_server,
        "Manual",
        r#"<div><img src="/images/gone.png"><img src="/images/here.png"></div>"#,
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/images/here.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, temp.path());
    let stats = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(stats.pages_written(), 1);
    assert_eq!(stats.images, 1);
    assert_eq!(stats.asset_failures, 1);

    let manual =
        std::fs::read_to_string(temp.path().join("docs").join("Manual.html")).unwrap();
    assert!(manual.contains(r#"src="/images/gone.png""#));
    assert!(manual.contains(r#"src="./imgs/here.png""#));
}
