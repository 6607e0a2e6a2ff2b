//! Integration tests for the PDF export
//!
//! The staging pass runs against a wiremock wiki; the renderer is either a
//! program that does not exist or `cp`, so no real PDF tool is needed.

use offline_manual::config::{
    Config, CrawlerConfig, ExportConfig, OutputConfig, UserAgentConfig, WikiConfig,
};
use offline_manual::crawler::run_crawl;
use offline_manual::export::{run_export, zip_dir};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORMULA_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4" viewBox="0 0 8 4"><rect width="8" height="4"/></svg>"#;

const PRINT_VERSION: &str = r##"<div class="mw-parser-output">
<ul><li class="toclevel-1"><a href="#Intro"><span class="tocnumber">1</span> <span class="toctext">Intro</span></a></li></ul>
<p>See the <a href="/wiki/Manual/FAQ">FAQ</a>.</p>
<table class="wikitable"><tr><td>cell one</td><td>cell two</td></tr></table>
<pre>if (x) {
	cube(1);
}</pre>
<p><img src="/images/shared.png">
<span class="mwe-math-element"><img class="mwe-math-fallback-image-inline" src="/media/math/render/svg/abc123"></span></p>
</div>"##;

fn create_test_config(base_url: &str, out: &Path, renderer: &str) -> Config {
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
            value: "TestBot/1.0".to_string(),
        },
        crawler: CrawlerConfig {
            retry_delay_ms: 10,
            ..CrawlerConfig::default()
        },
        output: OutputConfig {
            html_dir: out.join("docs").to_string_lossy().into_owned(),
            pdf_staging_dir: out.join("docs_pdf").to_string_lossy().into_owned(),
            pdf_dir: out.join("pdf").to_string_lossy().into_owned(),
        },
        export: ExportConfig {
            seeds: vec![format!("{}/wiki/Manual/Print_version", base_url)],
            renderer: renderer.to_string(),
            rasterize_math: true,
            options: BTreeMap::new(),
        },
    }
}

fn api_body(html: &str) -> String {
    let escaped = html
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    format!(
        r#"<?xml version="1.0"?><api><parse><text xml:space="preserve">{}</text></parse></api>"#,
        escaped
    )
}

/// Mounts the printable page, its assets and the stylesheet
async fn mount_wiki(server: &MockServer, image_downloads: u64) {
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("page", "Manual/Print_version"))
        .respond_with(ResponseTemplate::new(200).set_body_string(api_body(PRINT_VERSION)))
        .expect(1)
        .mount(server)
        .await;

    // Links are absolutized in print pages and never followed
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("page", "Manual/FAQ"))
        .respond_with(ResponseTemplate::new(200).set_body_string(api_body("<p>faq</p>")))
        .expect(0)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/shared.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .expect(image_downloads)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/media/math/render/svg/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORMULA_SVG))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/w/load.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("body{color:black}"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_staging_pass_and_renderer_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp = TempDir::new().unwrap();
    mount_wiki(&mock_server, 1).await;

    // Stylesheet already present in the HTML tree, plus a stale staging copy
    let html_styles = temp.path().join("docs").join("styles");
    std::fs::create_dir_all(&html_styles).unwrap();
    std::fs::write(html_styles.join("style.css"), "p{margin:0}").unwrap();
    let staging_styles = temp.path().join("docs_pdf").join("styles");
    std::fs::create_dir_all(&staging_styles).unwrap();
    std::fs::write(staging_styles.join("old.css"), "stale").unwrap();

    let config = create_test_config(&base_url, temp.path(), "offline-manual-missing-renderer");
    let report = run_export(&config).await.expect("Export failed");

    assert_eq!(report.stats.pages_written(), 1);
    assert_eq!(report.stats.images, 1);
    assert_eq!(report.stats.maths, 1);

    let staging = temp.path().join("docs_pdf");
    assert!(staging.join("Manual.html").is_file());
    assert!(!staging.join("Print_version.html").exists());

    // Rasterized formula replaces the SVG
    let maths = staging.join("imgs").join("maths");
    let png = std::fs::read(maths.join("abc123.png")).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
    assert!(!maths.join("abc123.svg").exists());

    // Styles come from the HTML tree and replace the old copy
    assert_eq!(
        std::fs::read_to_string(staging_styles.join("style.css")).unwrap(),
        "p{margin:0}"
    );
    assert!(!staging_styles.join("old.css").exists());

    let page = std::fs::read_to_string(staging.join("Manual.html")).unwrap();
    assert!(page.contains(&format!(r#"href="{}/wiki/Manual/FAQ""#, base_url)));
    assert!(page.contains(r#"src="./imgs/maths/abc123.png""#));
    assert!(page.contains(r#"src="./imgs/shared.png""#));
    assert!(!page.contains("<table"));
    assert!(!page.contains("<td"));
    assert!(page.contains("cell one"));
    assert!(page.contains("    cube(1);"));
    assert!(page.contains("font-family:'Liberation Mono'"));
    assert!(!page.contains("tocnumber"));
    assert!(page.contains(r#"<h1 class="firstHeading" id="firstHeading">Manual</h1>"#));

    // The renderer could not be started: the file is reported, nothing rendered
    assert!(report.render.rendered.is_empty());
    assert_eq!(report.render.failed, vec![staging.join("Manual.html")]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_renderer_output_lands_in_pdf_dir() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp = TempDir::new().unwrap();
    mount_wiki(&mock_server, 1).await;

    // `cp <input> <output>` behaves like a renderer without options
    let config = create_test_config(&base_url, temp.path(), "cp");
    let report = run_export(&config).await.expect("Export failed");

    let pdf = temp.path().join("pdf").join("Manual.pdf");
    assert_eq!(report.render.rendered, vec![pdf.clone()]);
    assert!(report.render.failed.is_empty());
    assert!(std::fs::read_to_string(&pdf)
        .unwrap()
        .contains("From the WikiBooks article"));

    // No HTML tree: the stylesheet was downloaded for the staging tree
    assert_eq!(
        std::fs::read_to_string(
            temp.path()
                .join("docs_pdf")
                .join("styles")
                .join("style.css")
        )
        .unwrap(),
        "body{color:black}"
    );

    let archive = temp.path().join("PDF-Offline-Manual.zip");
    assert_eq!(zip_dir(&temp.path().join("pdf"), &archive).unwrap(), 1);
    let zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
    assert_eq!(zip.file_names().collect::<Vec<_>>(), vec!["Manual.pdf"]);
}

#[tokio::test]
async fn test_seed_excluded_from_html_tree_is_still_exported() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp = TempDir::new().unwrap();
    mount_wiki(&mock_server, 1).await;

    let mut config = create_test_config(&base_url, temp.path(), "offline-manual-missing-renderer");
    config.crawler.excluded_pages = config.export.seeds.clone();

    let report = run_export(&config).await.expect("Export failed");

    assert_eq!(report.stats.pages_written(), 1);
    assert_eq!(report.stats.excluded, 0);
    assert!(temp.path().join("docs_pdf").join("Manual.html").is_file());
}

#[tokio::test]
async fn test_html_and_pdf_sessions_do_not_share_assets() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let temp = TempDir::new().unwrap();

    // The shared image is fetched once per pass
    mount_wiki(&mock_server, 2).await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("page", "Manual"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(api_body(r#"<div><img src="/images/shared.png"></div>"#)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, temp.path(), "offline-manual-missing-renderer");

    let html = run_crawl(&config).await.expect("Crawl failed");
    assert_eq!(html.images, 1);

    let report = run_export(&config).await.expect("Export failed");
    assert_eq!(report.stats.images, 1);

    assert!(temp.path().join("docs").join("imgs").join("shared.png").is_file());
    assert!(temp
        .path()
        .join("docs_pdf")
        .join("imgs")
        .join("shared.png")
        .is_file());
}
