//! Integration tests for the mapping phase
//!
//! These tests use wiremock to stand in for the gallery site and run the
//! mapper end-to-end against temporary output directories.

use gallery_harvest::config::{
    Config, FetcherConfig, OutputConfig, PipelineConfig, SiteConfig, UserAgentConfig,
};
use gallery_harvest::crawler::{Fetcher, Timeouts};
use gallery_harvest::model::{Container, ContainerSummary, Patch};
use gallery_harvest::output::{read_json, MapSummary};
use gallery_harvest::pipeline::{run_map, RunOptions};
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock site
fn create_test_config(base_url: &str, dir: &Path, checkpoint_every: usize) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            gallery_path: "/gallery/".to_string(),
            index_query: "year=all".to_string(),
            listing_page: "tinyindex.html".to_string(),
            category: "gallery".to_string(),
            patches_path: "/patches/".to_string(),
        },
        fetcher: FetcherConfig {
            mapper_delay_ms: 100,
            worker_delay_ms: 100,
            page_timeout_secs: 5,
            probe_timeout_secs: 5,
            asset_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        pipeline: PipelineConfig {
            workers: 4,
            checkpoint_every,
        },
        output: OutputConfig {
            scraper_dir: dir.join("scraper"),
            data_dir: dir.join("data"),
        },
    }
}

/// Fetcher without politeness delay
fn test_fetcher(config: &Config) -> Fetcher {
    Fetcher::new(
        &config.user_agent,
        Duration::ZERO,
        Timeouts {
            page: Duration::from_secs(5),
            probe: Duration::from_secs(5),
            asset: Duration::from_secs(5),
        },
    )
    .expect("fetcher builds")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

/// Mounts the gallery index only
async fn mount_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/gallery/"))
        .and(query_param("year", "all"))
        .respond_with(html(
            r#"<a href="/">Home</a>
               <a href="galleryrequest.html">Request a gallery</a>
               <a href="2003/05/camp/">Camp 2003</a>
               <a href="rally2001/">Rally 2001</a>
               <a href="dead2002/">Dead 2002</a>
               <a href="rally2001">Rally 2001 (dup)</a>"#,
        ))
        .mount(server)
        .await;
}

/// Mounts the pages of rally2001, each expected `hits` times
async fn mount_rally2001(server: &MockServer, hits: u64) {
    Mock::given(method("GET"))
        .and(path("/gallery/rally2001/"))
        .respond_with(html(
            r#"<a href="bob/">bob</a><a href="alice/">alice</a>
               <a href="/gallery/">Back</a><a href="slideshow.html">Slides</a>"#,
        ))
        .expect(hits)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gallery/rally2001/bob/tinyindex.html"))
        .respond_with(html(
            r#"<map><area href="/gallery/pic.html?pic=101"><area href="/gallery/pic.html?pic=102">
               <area href="/gallery/pic.html?pic=101"></map>"#,
        ))
        .expect(hits)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gallery/rally2001/alice/tinyindex.html"))
        .respond_with(html(r#"<map><area href="/gallery/pic.html?pic=201"></map>"#))
        .expect(hits)
        .mount(server)
        .await;
}

/// Mounts the remaining containers: one dead, one with a single photo
async fn mount_others(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/gallery/dead2002/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gallery/2003/05/camp/"))
        .respond_with(html(r#"<a href="carol/">carol</a>"#))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gallery/2003/05/camp/carol/tinyindex.html"))
        .respond_with(html(r#"<map><area href="/gallery/pic.html?pic=301"></map>"#))
        .mount(server)
        .await;
}

/// Mounts the patch gallery with two patches listed out of order
async fn mount_patches(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/patches/"))
        .respond_with(html(
            r#"<p><a href="patch.html?p=20"><img src="img/20.jpg">Amerivespa</a></p>
               <p><a href="patch.html?p=7"><img src="img/7.jpg">Rally 2001</a></p>
               <p><a href="/gallery/">Gallery</a></p>"#,
        ))
        .mount(server)
        .await;
}

async fn mock_site() -> MockServer {
    let server = MockServer::start().await;
    mount_index(&server).await;
    mount_rally2001(&server, 1).await;
    mount_others(&server).await;
    mount_patches(&server).await;
    server
}

fn counts(containers: &[Container]) -> Vec<(String, usize)> {
    containers
        .iter()
        .map(|c| (c.slug.clone(), c.resource_count))
        .collect()
}

#[tokio::test]
async fn test_full_map_single_pass() {
    let server = mock_site().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 25);

    let report = run_map(&config, test_fetcher(&config), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(report.discovered, 3);
    assert_eq!(report.mapped, 3);
    assert_eq!(report.resources, 4);
    assert_eq!(report.failed_pages, 1);
    assert!(report.finalized);
    assert_eq!(report.patches, 2);

    // Sorted by (year, slug)
    let index: Vec<ContainerSummary> = read_json(&config.output.gallery_index_path()).unwrap();
    let slugs: Vec<_> = index.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(slugs, vec!["rally2001", "dead2002", "2003/05/camp"]);

    let full: Vec<Container> = read_json(&config.output.gallery_full_path()).unwrap();
    assert_eq!(
        counts(&full),
        vec![
            ("rally2001".to_string(), 3),
            ("dead2002".to_string(), 0),
            ("2003/05/camp".to_string(), 1),
        ]
    );
    assert!(!config.output.progress_path().exists());

    let patches: Vec<Patch> = read_json(&config.output.patches_index_path()).unwrap();
    let patch_ids: Vec<_> = patches.iter().map(|p| p.id.as_deref()).collect();
    assert_eq!(patch_ids, vec![Some("7"), Some("20")]);
    assert_eq!(
        patches[0].img_url,
        Some(format!("{}/patches/img/7.jpg", server.uri()))
    );

    let summary: MapSummary = read_json(&config.output.summary_path()).unwrap();
    assert_eq!(
        summary,
        MapSummary {
            container_count: 3,
            total_resources: 4,
            patches: 2,
        }
    );

    let camp = &full[2];
    assert_eq!(camp.year, Some(2003));
    assert_eq!(camp.month, Some(5));
    assert_eq!(camp.resources[0].owner, "carol");
    assert_eq!(
        camp.resources[0].dates.date_from_container(),
        Some("2003-05")
    );
}

#[tokio::test]
async fn test_interrupted_then_resumed_matches_single_pass() {
    // Single pass for reference
    let reference_server = mock_site().await;
    let reference_dir = tempdir().unwrap();
    let reference_config = create_test_config(&reference_server.uri(), reference_dir.path(), 25);
    run_map(
        &reference_config,
        test_fetcher(&reference_config),
        RunOptions::default(),
    )
    .await
    .unwrap();
    let reference: Vec<Container> =
        read_json(&reference_config.output.gallery_full_path()).unwrap();

    // rally2001 must be fetched exactly once across both runs
    let server = mock_site().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 25);

    let first = run_map(
        &config,
        test_fetcher(&config),
        RunOptions {
            limit: Some(1),
            ..RunOptions::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(first.mapped, 1);
    assert!(!first.finalized);
    assert!(!config.output.gallery_full_path().exists());
    assert!(!config.output.summary_path().exists());

    // The checkpoint holds one complete container, never a partial one
    let progress: Vec<Container> = read_json(&config.output.progress_path()).unwrap();
    assert_eq!(counts(&progress), vec![("rally2001".to_string(), 3)]);

    let second = run_map(&config, test_fetcher(&config), RunOptions::default())
        .await
        .unwrap();
    assert_eq!(second.already_mapped, 1);
    assert_eq!(second.mapped, 2);
    assert!(second.finalized);
    assert!(!config.output.progress_path().exists());

    let resumed: Vec<Container> = read_json(&config.output.gallery_full_path()).unwrap();
    assert_eq!(counts(&resumed), counts(&reference));

    let ids = |containers: &[Container]| -> Vec<String> {
        containers
            .iter()
            .flat_map(|c| c.resources.iter().map(|r| r.resource_id.clone()))
            .collect()
    };
    assert_eq!(ids(&resumed), ids(&reference));
}

#[tokio::test]
async fn test_missing_patch_gallery_is_not_fatal() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    mount_rally2001(&server, 1).await;
    mount_others(&server).await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 25);

    let report = run_map(&config, test_fetcher(&config), RunOptions::default())
        .await
        .unwrap();
    assert!(report.finalized);
    assert_eq!(report.patches, 0);

    let patches: Vec<Patch> = read_json(&config.output.patches_index_path()).unwrap();
    assert!(patches.is_empty());
    let summary: MapSummary = read_json(&config.output.summary_path()).unwrap();
    assert_eq!(summary.patches, 0);
}

#[tokio::test]
async fn test_fresh_discards_progress() {
    let server = MockServer::start().await;
    mount_index(&server).await;
    mount_rally2001(&server, 2).await;
    mount_others(&server).await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 25);
    let limited = RunOptions {
        limit: Some(1),
        ..RunOptions::default()
    };

    run_map(&config, test_fetcher(&config), limited).await.unwrap();

    // A fresh run maps rally2001 again instead of resuming past it
    let report = run_map(
        &config,
        test_fetcher(&config),
        RunOptions {
            fresh: true,
            ..limited
        },
    )
    .await
    .unwrap();
    assert_eq!(report.already_mapped, 0);
    assert_eq!(report.mapped, 1);

    let progress: Vec<Container> = read_json(&config.output.progress_path()).unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].slug, "rally2001");
}

#[tokio::test]
async fn test_checkpoint_every_override() {
    let server = mock_site().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 25);

    let report = run_map(
        &config,
        test_fetcher(&config),
        RunOptions {
            limit: Some(2),
            checkpoint_every: Some(1),
            ..RunOptions::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(report.mapped, 2);

    let progress: Vec<Container> = read_json(&config.output.progress_path()).unwrap();
    assert_eq!(
        counts(&progress),
        vec![("rally2001".to_string(), 3), ("dead2002".to_string(), 0)]
    );
}

#[tokio::test]
async fn test_unreachable_index_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), 25);

    let result = run_map(&config, test_fetcher(&config), RunOptions::default()).await;
    assert!(result.is_err());
    assert!(!config.output.gallery_index_path().exists());
    assert!(!config.output.progress_path().exists());
}
