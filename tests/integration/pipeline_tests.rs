//! Integration tests for resolution, archiving and indexing
//!
//! A mapped gallery is written straight to disk, then the later phases run
//! against a wiremock site and the in-memory blob store.

use gallery_harvest::blob::MemoryBlobStore;
use gallery_harvest::config::{
    Config, FetcherConfig, OutputConfig, PipelineConfig, SiteConfig, StorageConfig,
    UserAgentConfig,
};
use gallery_harvest::crawler::{Fetcher, Timeouts};
use gallery_harvest::model::{ArchiveStatus, Container, ContainerSummary, LeafResource, Patch};
use gallery_harvest::output::{load_container_dataset, read_json, write_json_pretty, IndexSummary};
use gallery_harvest::pipeline::{run_archive, run_index, run_resolve, RunOptions};
use gallery_harvest::{HarvestError, ResolvedUrl};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUCKET: &str = "harvest";

fn create_test_config(base_url: &str, dir: &Path) -> Config {
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
            checkpoint_every: 25,
        },
        output: OutputConfig {
            scraper_dir: dir.join("scraper"),
            data_dir: dir.join("data"),
        },
    }
}

fn storage_config() -> StorageConfig {
    StorageConfig {
        endpoint: "http://127.0.0.1:9000".to_string(),
        region: "auto".to_string(),
        access_key_id: "test".to_string(),
        secret_access_key: "test".to_string(),
        bucket: BUCKET.to_string(),
        public_url: "https://cdn.example.org".to_string(),
    }
}

/// Fetcher without politeness delay and a short probe timeout
fn test_fetcher(config: &Config) -> Fetcher {
    Fetcher::new(
        &config.user_agent,
        Duration::ZERO,
        Timeouts {
            page: Duration::from_secs(5),
            probe: Duration::from_millis(300),
            asset: Duration::from_secs(5),
        },
    )
    .expect("fetcher builds")
}

async fn mount_detail(server: &MockServer, id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/gallery/pic.html"))
        .and(query_param("pic", id))
        .respond_with(response)
        .mount(server)
        .await;
}

fn detail_page(img_path: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        r#"<html><body><IMG SRC="{}" WIDTH=400></body></html>"#,
        img_path
    ))
}

async fn mount_asset(server: &MockServer, http_method: &str, asset_path: &str, response: ResponseTemplate) {
    Mock::given(method(http_method))
        .and(path(asset_path))
        .respond_with(response)
        .mount(server)
        .await;
}

fn jpeg(tag: u8) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(vec![0xFF, 0xD8, tag, 0xFF, 0xD9])
        .insert_header("content-type", "image/jpeg")
}

/// Seven photos covering every resolution outcome:
/// 1 upgraded, 2 detail 404, 3 probe 403, 4 no size prefix,
/// 5 no image on the page, 6 probe timeout with a dead baseline,
/// 7 full-size HEAD redirected to a page that answers 200
async fn mock_site() -> MockServer {
    let server = MockServer::start().await;

    mount_detail(&server, "1", detail_page("/gallery/r/bob/small_0001.jpg")).await;
    mount_asset(&server, "HEAD", "/gallery/r/bob/0001.jpg", ResponseTemplate::new(200)).await;
    mount_asset(&server, "GET", "/gallery/r/bob/small_0001.jpg", jpeg(1)).await;
    mount_asset(&server, "GET", "/gallery/r/bob/0001.jpg", jpeg(101)).await;

    mount_detail(&server, "2", ResponseTemplate::new(404)).await;

    mount_detail(&server, "3", detail_page("/gallery/r/bob/small_0003.jpg")).await;
    mount_asset(&server, "HEAD", "/gallery/r/bob/0003.jpg", ResponseTemplate::new(403)).await;
    mount_asset(&server, "GET", "/gallery/r/bob/small_0003.jpg", jpeg(3)).await;

    mount_detail(&server, "4", detail_page("/gallery/r/bob/0004.jpg")).await;
    Mock::given(method("HEAD"))
        .and(path("/gallery/r/bob/0004.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_asset(&server, "GET", "/gallery/r/bob/0004.jpg", jpeg(4)).await;

    mount_detail(
        &server,
        "5",
        ResponseTemplate::new(200).set_body_string("<html><body>Removed</body></html>"),
    )
    .await;

    mount_detail(&server, "6", detail_page("/gallery/r/bob/small_0006.jpg")).await;
    mount_asset(
        &server,
        "HEAD",
        "/gallery/r/bob/0006.jpg",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(2)),
    )
    .await;
    mount_asset(&server, "GET", "/gallery/r/bob/small_0006.jpg", ResponseTemplate::new(500)).await;

    mount_detail(&server, "7", detail_page("/gallery/r/bob/small_0007.jpg")).await;
    mount_asset(
        &server,
        "HEAD",
        "/gallery/r/bob/0007.jpg",
        ResponseTemplate::new(302)
            .insert_header("location", format!("{}/notfound.html", server.uri()).as_str()),
    )
    .await;
    Mock::given(method("HEAD"))
        .and(path("/notfound.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_asset(&server, "GET", "/gallery/r/bob/small_0007.jpg", jpeg(7)).await;

    server
}

fn write_gallery(config: &Config, base_url: &str) -> Container {
    let mut container: Container = ContainerSummary {
        slug: "r2002".to_string(),
        url: format!("{}/gallery/r2002/", base_url),
        title: "Rally 2002".to_string(),
        year: Some(2002),
        month: None,
        date_label: Some("2002-??".to_string()),
    }
    .into();
    container.set_resources(
        (1..=7)
            .map(|i| {
                LeafResource::new(
                    i.to_string(),
                    format!("{}/gallery/pic.html?pic={}", base_url, i),
                    "bob",
                    Some("2002-??".to_string()),
                )
            })
            .collect(),
    );

    write_json_pretty(&config.output.gallery_full_path(), &vec![container.clone()]).unwrap();
    container
}

#[tokio::test]
async fn test_resolution_outcomes() {
    let server = mock_site().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_gallery(&config, &server.uri());

    let report = run_resolve(&config, test_fetcher(&config)).await.unwrap();
    assert_eq!(report.attempted, 7);
    assert_eq!(report.baseline_found, 5);
    assert_eq!(report.upgraded, 1);

    let resolved: BTreeMap<String, ResolvedUrl> =
        read_json(&config.output.resolved_urls_path()).unwrap();
    let base = server.uri();

    assert_eq!(
        resolved["1"],
        ResolvedUrl::baseline(format!("{}/gallery/r/bob/small_0001.jpg", base))
            .with_upgrade(Some(format!("{}/gallery/r/bob/0001.jpg", base)))
    );
    // Detail page 404
    assert_eq!(resolved["2"], ResolvedUrl::unresolved());
    // Probe answered 403
    assert_eq!(
        resolved["3"],
        ResolvedUrl::baseline(format!("{}/gallery/r/bob/small_0003.jpg", base))
    );
    // No size prefix, so no probe
    assert_eq!(
        resolved["4"],
        ResolvedUrl::baseline(format!("{}/gallery/r/bob/0004.jpg", base))
    );
    assert_eq!(resolved["5"], ResolvedUrl::unresolved());
    // Probe timed out
    assert_eq!(resolved["6"].upgrade_url, None);
    // A redirect is not a 200, whatever it points at
    assert_eq!(
        resolved["7"],
        ResolvedUrl::baseline(format!("{}/gallery/r/bob/small_0007.jpg", base))
    );
}

#[tokio::test]
async fn test_archive_writes_container_dataset() {
    let server = mock_site().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let container = write_gallery(&config, &server.uri());
    run_resolve(&config, test_fetcher(&config)).await.unwrap();

    let store = MemoryBlobStore::new().failing_on("/3/");
    let report = run_archive(
        &config,
        test_fetcher(&config),
        &store,
        &storage_config(),
        RunOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.containers, 1);
    assert_eq!(report.assets, 7);
    assert_eq!(report.archived, 3);
    assert_eq!(report.partial, 1);
    assert_eq!(report.unresolved, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.upgrades_stored, 1);

    assert_eq!(
        store.keys(BUCKET).await,
        vec![
            "gallery/200200-bob/1/full.jpg",
            "gallery/200200-bob/1/thumb.jpg",
            "gallery/200200-bob/4/thumb.jpg",
            "gallery/200200-bob/7/thumb.jpg",
        ]
    );
    let thumb = store
        .get(BUCKET, "gallery/200200-bob/1/thumb.jpg")
        .await
        .unwrap();
    assert_eq!(thumb.content_type, "image/jpeg");
    assert_eq!(thumb.bytes, vec![0xFF, 0xD8, 1, 0xFF, 0xD9]);

    let (meta, photos) = load_container_dataset(&config.output.containers_dir(), &container.slug)
        .unwrap()
        .unwrap();
    assert_eq!(meta.photo_count, 7);
    assert_eq!(photos.len(), 7);

    // Order follows the container, not completion order
    let ids: Vec<_> = photos.iter().map(|p| p.resource.resource_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "7"]);

    let first = &photos[0];
    assert_eq!(first.archive_status, ArchiveStatus::Archived);
    assert_eq!(
        first.baseline_public_url.as_deref(),
        Some("https://cdn.example.org/gallery/200200-bob/1/thumb.jpg")
    );
    assert_eq!(
        first.upgrade_public_url.as_deref(),
        Some("https://cdn.example.org/gallery/200200-bob/1/full.jpg")
    );
    // Plain bytes carry no EXIF block
    assert_eq!(first.extracted_metadata, None);

    assert_eq!(photos[1].archive_status, ArchiveStatus::Unresolved);
    assert_eq!(photos[1].stored_baseline_key, None);
    assert!(matches!(photos[2].archive_status, ArchiveStatus::Partial { .. }));
    assert_eq!(photos[2].stored_baseline_key, None);
    assert_eq!(photos[3].stored_upgrade_key, None);
    assert!(matches!(photos[5].archive_status, ArchiveStatus::Failed { .. }));
}

#[tokio::test]
async fn test_rearchive_is_idempotent_and_keeps_curation() {
    let server = mock_site().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let container = write_gallery(&config, &server.uri());
    run_resolve(&config, test_fetcher(&config)).await.unwrap();

    let store = MemoryBlobStore::new();
    let storage = storage_config();
    run_archive(&config, test_fetcher(&config), &store, &storage, RunOptions::default())
        .await
        .unwrap();
    let first_keys = store.keys(BUCKET).await;
    let first_puts = store.put_count();

    // A curator sets a canonical date between runs
    let containers_dir = config.output.containers_dir();
    let (_, mut photos) = load_container_dataset(&containers_dir, &container.slug)
        .unwrap()
        .unwrap();
    photos[0].resource.dates.set_canonical("2002-06-15");
    write_json_pretty(
        &containers_dir.join("r2002").join("photos.json"),
        &photos,
    )
    .unwrap();

    run_archive(&config, test_fetcher(&config), &store, &storage, RunOptions::default())
        .await
        .unwrap();

    assert_eq!(store.keys(BUCKET).await, first_keys);
    assert_eq!(store.put_count(), first_puts * 2);

    let (_, photos) = load_container_dataset(&containers_dir, &container.slug)
        .unwrap()
        .unwrap();
    assert_eq!(photos[0].resource.dates.date_canonical(), Some("2002-06-15"));
    assert_eq!(photos[0].resource.dates.effective(), Some("2002-06-15"));
    assert_eq!(photos[1].resource.dates.date_canonical(), None);
}

#[tokio::test]
async fn test_missing_inputs_are_fatal() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());

    let result = run_resolve(&config, test_fetcher(&config)).await;
    assert!(matches!(result, Err(HarvestError::MissingInput(_))));

    // Gallery present but never resolved
    write_gallery(&config, &server.uri());
    let store = MemoryBlobStore::new();
    let result = run_archive(
        &config,
        test_fetcher(&config),
        &store,
        &storage_config(),
        RunOptions::default(),
    )
    .await;
    assert!(matches!(result, Err(HarvestError::MissingInput(_))));
    assert_eq!(store.put_count(), 0);
    assert!(!config.output.containers_dir().exists());
}

#[tokio::test]
async fn test_index_from_gallery() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    write_gallery(&config, &server.uri());

    // Without a patch index the count is zero
    assert_eq!(run_index(&config).unwrap().patches, 0);

    let patches: Vec<Patch> = ["3", "12"]
        .iter()
        .map(|id| Patch {
            id: Some(id.to_string()),
            url: format!("{}/patches/patch.html?p={}", server.uri(), id),
            title: format!("Patch {}", id),
            img_url: None,
        })
        .collect();
    write_json_pretty(&config.output.patches_index_path(), &patches).unwrap();

    let index = run_index(&config).unwrap();
    assert_eq!(index.container_count, 1);
    assert_eq!(index.total_resources, 7);
    assert_eq!(index.patches, 2);
    assert!(index.mapping_complete);

    let written: IndexSummary = read_json(&config.output.index_path()).unwrap();
    assert_eq!(written.containers[0].slug, "r2002");
    assert_eq!(written.containers[0].date_label.as_deref(), Some("2002-??"));
}
