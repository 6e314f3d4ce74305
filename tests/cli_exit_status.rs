//! Process exit status of the `storefront-scraper` binary
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use axum::Router;
use axum::response::Html;
use axum::routing::get;
use tempfile::TempDir;

const LISTING: &str = r#"<html><body><div class="wrapper"><ul class="products">
    <li><a href="shirt.php?id=101"><img src="img/shirts/shirt-101.jpg"><p>View Details</p></a></li>
</ul></div></body></html>"#;

const EMPTY_LISTING: &str = r#"<html><body><div class="wrapper"><ul class="products"></ul></div></body></html>"#;

const DETAIL: &str = r#"<html><body><div class="section page"><div class="wrapper">
    <div class="shirt-picture"><span><img src="img/shirts/shirt-101.jpg" alt="Logo Shirt, Red"></span></div>
    <div class="shirt-details"><h1><span class="price">$18</span> Logo Shirt, Red</h1></div>
</div></div></body></html>"#;

/// Serve a storefront on an ephemeral loopback port and return its origin
async fn serve(listing: &'static str) -> String {
    let app = Router::new()
        .route("/shirts.php", get(move || async move { Html(listing) }))
        .route("/shirt.php", get(|| async { Html(DETAIL) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

/// Working directory whose config points the binary at `base_url`
fn workspace(base_url: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let config = serde_json::json!({
        "site": { "base_url": base_url },
        "http": { "timeout_seconds": 5 },
        "logging": { "level": "warn" }
    });
    std::fs::write(dir.path().join("storefront-scraper.json"), config.to_string()).unwrap();
    dir
}

async fn run_binary(dir: &Path) -> ExitStatus {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_storefront-scraper"))
            .current_dir(dir)
            .env_remove("RUST_LOG")
            .env_remove("HTTP_PROXY")
            .env_remove("http_proxy")
            .env_remove("ALL_PROXY")
            .env_remove("all_proxy")
            .status()
            .unwrap()
    })
    .await
    .unwrap()
}

fn csv_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir.join("data"))
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
                .collect()
        })
        .unwrap_or_default()
}

fn error_log_lines(dir: &Path) -> usize {
    std::fs::read_to_string(dir.join("log").join("scraper-error.log"))
        .map(|content| content.lines().count())
        .unwrap_or(0)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_listing_exits_with_failure() {
    // Port 1 on loopback is not expected to accept connections.
    let dir = workspace("http://127.0.0.1:1/");

    let status = run_binary(dir.path()).await;

    assert_eq!(status.code(), Some(1));
    assert!(csv_files(dir.path()).is_empty());
    assert_eq!(error_log_lines(dir.path()), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn completed_run_exits_with_success() {
    let origin = serve(LISTING).await;
    let dir = workspace(&origin);

    let status = run_binary(dir.path()).await;

    assert_eq!(status.code(), Some(0));
    let artifacts = csv_files(dir.path());
    assert_eq!(artifacts.len(), 1);
    assert_eq!(std::fs::read_to_string(&artifacts[0]).unwrap().lines().count(), 2);
    assert_eq!(error_log_lines(dir.path()), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn zero_record_run_still_exits_with_success() {
    let origin = serve(EMPTY_LISTING).await;
    let dir = workspace(&origin);

    let status = run_binary(dir.path()).await;

    assert_eq!(status.code(), Some(0));
    let artifacts = csv_files(dir.path());
    assert_eq!(artifacts.len(), 1);
    assert_eq!(
        std::fs::read_to_string(&artifacts[0]).unwrap(),
        "Title,Price,ImageURL,URL,Time\n"
    );
}
