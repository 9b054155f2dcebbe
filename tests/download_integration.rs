//! Integration tests for the download pipeline.
//!
//! These tests drive both schedule schemas through the real HTTP fetcher
//! against a mock server and inspect the resulting directory tree.

use std::path::Path;
use std::time::Duration;

use fahrplan_core::download::{
    DownloadOrchestrator, DownloadResult, DownloadStatus, FailureKind, OrchestratorOptions,
    RunSummary, append_failures, failure_log_path,
};
use fahrplan_core::event::{EventConfig, SchemaKind};
use fahrplan_core::fetch::{FetchTimeouts, HttpFetcher};
use fahrplan_core::selector::QualityPreference;
use fahrplan_core::talk_ids;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_body(server: &MockServer, route: &str, body: impl Into<Vec<u8>>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
        .mount(server)
        .await;
}

fn options(root: &Path, format: &str) -> OrchestratorOptions {
    OrchestratorOptions {
        output_root: root.to_path_buf(),
        preference: QualityPreference::new(
            format,
            vec!["hd".to_string(), "sd".to_string()],
        ),
        min_delay: Duration::ZERO,
    }
}

fn legacy_page(server_uri: &str) -> String {
    format!(
        r#"<html><body>
<h2 class="title">Hacking the schedule</h2>
<h3 class="subtitle">A case study</h3>
<p class="abstract">Short &amp; sweet.</p>
<div class="description"><p>Long description.</p></div>
<span class="language">en</span>
<ul class="links"><li><a href="https://wiki.example/hack">Wiki</a></li></ul>
<table class="attachments">
  <tr><td><a href="/system/attachments/9/original/slides.pdf?17">slides</a></td></tr>
</table>
<a href="{server_uri}/media/36c3-6258-en-hack_sd.webm">webm sd</a>
<a href="{server_uri}/media/36c3-6258-en-hack_hd.webm">webm hd</a>
</body></html>"#
    )
}

#[tokio::test]
async fn test_legacy_event_end_to_end() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_body(&server, "/Fahrplan/events/6258.html", legacy_page(&uri)).await;
    mount_body(&server, "/media/36c3-6258-en-hack_hd.webm", "HD").await;
    mount_body(&server, "/system/attachments/9/original/slides.pdf", "PDF").await;

    let root = TempDir::new().expect("failed to create temp dir");
    let event = EventConfig::new("36c3", SchemaKind::Legacy, format!("{uri}/Fahrplan"));
    let fetcher = HttpFetcher::new(FetchTimeouts::default()).expect("client builds");
    let orchestrator = DownloadOrchestrator::new(&event, &fetcher, options(root.path(), "webm"));

    let results = orchestrator.run(&["6258".to_string()]).await;
    assert_eq!(results, [DownloadResult::downloaded("6258", Vec::new())]);

    let talk_dir = root.path().join("36c3").join("6258");
    assert_eq!(std::fs::read(talk_dir.join("video.webm")).expect("video"), b"HD");
    assert_eq!(
        std::fs::read(talk_dir.join("attachments").join("slides.pdf")).expect("slides"),
        b"PDF"
    );
    let metadata = std::fs::read_to_string(talk_dir.join("metadata.txt")).expect("metadata");
    assert!(metadata.starts_with("Hacking the schedule\nA case study\nLanguage: English\n"));
    assert!(metadata.contains("Short & sweet."));
    assert!(metadata.contains("https://wiki.example/hack"));
}

#[tokio::test]
async fn test_api_event_end_to_end_with_second_run_skipping() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let talk = serde_json::json!({
        "code": "XYZ9AB",
        "title": "Reproducible builds",
        "subtitle": "",
        "abstract": "Bits for bits.",
        "description": "Everything else.",
        "language": "de",
        "links": [{"title": "Project", "url": "https://reproducible.example/"}],
        "attachments": [{"url": "media/notes.txt", "filename": "notes.txt"}],
        "media": [
            {"format": "webm", "quality": "sd", "url": format!("{uri}/cdn/sd.webm")},
            {"format": "mp4", "quality": "hd", "url": format!("{uri}/cdn/hd.mp4")}
        ]
    });
    Mock::given(method("GET"))
        .and(path("/conf/talks/XYZ9AB.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(talk))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cdn/hd.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MP4".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    mount_body(&server, "/conf/media/notes.txt", "NOTES").await;

    let root = TempDir::new().expect("failed to create temp dir");
    let event = EventConfig::new("camp", SchemaKind::Api, format!("{uri}/conf"));
    let fetcher = HttpFetcher::new(FetchTimeouts::default()).expect("client builds");
    let orchestrator = DownloadOrchestrator::new(&event, &fetcher, options(root.path(), "mp4"));

    let ids = vec!["XYZ9AB".to_string()];
    let first = orchestrator.run(&ids).await;
    assert_eq!(first[0].status, DownloadStatus::Downloaded);
    let second = orchestrator.run(&ids).await;
    assert_eq!(second[0].status, DownloadStatus::Skipped);

    let talk_dir = root.path().join("camp").join("XYZ9AB");
    assert_eq!(std::fs::read(talk_dir.join("video.mp4")).expect("video"), b"MP4");
    assert_eq!(
        std::fs::read(talk_dir.join("attachments").join("notes.txt")).expect("notes"),
        b"NOTES"
    );
    let metadata = std::fs::read_to_string(talk_dir.join("metadata.txt")).expect("metadata");
    assert!(metadata.contains("Language: German"));
}

#[tokio::test]
async fn test_mixed_run_logs_failures_for_rerun() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount_body(&server, "/Fahrplan/events/6258.html", legacy_page(&uri)).await;
    mount_body(&server, "/media/36c3-6258-en-hack_hd.webm", "HD").await;
    mount_body(&server, "/Fahrplan/events/7000.html", "<html>no talk here</html>").await;
    Mock::given(method("GET"))
        .and(path("/Fahrplan/events/404.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let root = TempDir::new().expect("failed to create temp dir");
    let event = EventConfig::new("36c3", SchemaKind::Legacy, format!("{uri}/Fahrplan"));
    let fetcher = HttpFetcher::new(FetchTimeouts::default()).expect("client builds");
    let orchestrator = DownloadOrchestrator::new(&event, &fetcher, options(root.path(), "webm"));

    let ids: Vec<String> = ["404", "6258", "7000", "abc"].map(String::from).to_vec();
    let results = orchestrator.run(&ids).await;

    let kinds: Vec<_> = results.iter().map(DownloadResult::failure_kind).collect();
    assert_eq!(
        kinds,
        [
            Some(FailureKind::NotFound),
            None,
            Some(FailureKind::ParseError),
            Some(FailureKind::ParseError),
        ]
    );
    // the attachment is not mounted, so the talk is downloaded with one attachment failure
    assert_eq!(results[1].attachment_failures.len(), 1);

    let summary = RunSummary::from_results(&results);
    assert_eq!((summary.downloaded, summary.skipped, summary.failed), (1, 0, 3));

    let input = root.path().join("ids.txt");
    let log = failure_log_path(Some(&input));
    assert_eq!(append_failures(&log, &results).expect("log written"), 3);
    assert_eq!(
        talk_ids::from_file(&log).expect("log parses"),
        ["404", "7000", "abc"]
    );
}

#[tokio::test]
async fn test_min_delay_spaces_network_bound_talks() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let root = TempDir::new().expect("failed to create temp dir");
    let event = EventConfig::new("36c3", SchemaKind::Legacy, format!("{}/Fahrplan", server.uri()));
    let fetcher = HttpFetcher::new(FetchTimeouts::default()).expect("client builds");
    let mut opts = options(root.path(), "webm");
    opts.min_delay = Duration::from_millis(200);
    let orchestrator = DownloadOrchestrator::new(&event, &fetcher, opts);

    let start = std::time::Instant::now();
    let results = orchestrator
        .run(&["1".to_string(), "2".to_string(), "3".to_string()])
        .await;
    assert!(results.iter().all(DownloadResult::is_failed));
    assert!(start.elapsed() >= Duration::from_millis(400));
}
