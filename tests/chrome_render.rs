//! Rendering through headless Chrome
#![cfg(feature = "cdp")]

use kidsheet::{ServiceConfig, WorksheetService};
use serde_json::json;
use std::sync::Once;
use tiny_http::{Response, Server};

static INIT: Once = Once::new();

/// Serves a tiny SVG for every asset path
fn start_asset_server() -> String {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18091").unwrap();
            for request in server.incoming_requests() {
                let response = Response::from_string(
                    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><circle cx="5" cy="5" r="4"/></svg>"#,
                )
                .with_header("Content-Type: image/svg+xml".parse::<tiny_http::Header>().unwrap());
                let _ = request.respond(response);
            }
        });
        std::thread::sleep(std::time::Duration::from_millis(100));
    });

    "http://127.0.0.1:18091/".to_string()
}

/// Width and height from the PNG IHDR chunk
fn png_size(bytes: &[u8]) -> (u32, u32) {
    assert_eq!(&bytes[1..4], b"PNG");
    let w = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let h = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    (w, h)
}

fn config(dir: &std::path::Path) -> ServiceConfig {
    let mut config = ServiceConfig {
        public_dir: dir.join("public"),
        asset_base_url: Some(start_asset_server()),
        ..Default::default()
    };
    config.render.output_dir = dir.join("generated");
    config.render.sandbox = false;
    config.render.restart_threshold = 3;
    config
}

#[tokio::test(flavor = "multi_thread")]
#[ignore] // Requires Chrome to be installed
async fn every_category_renders_at_the_same_size() {
    let dir = tempfile::tempdir().unwrap();
    let service = WorksheetService::with_chrome(config(dir.path())).expect("service");

    for kind in ["letter-hunt", "count-shapes", "maze", "shape-path", "number-bonds"] {
        let url = service.generate_worksheet(kind, json!({})).await.expect("render");
        let file = dir.path().join("generated").join(url.trim_start_matches("/generated/"));
        let bytes = std::fs::read(&file).expect("output file");
        assert_eq!(png_size(&bytes), (1020, 1320), "{}", kind);
    }
    service.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
#[ignore] // Requires Chrome to be installed
async fn batch_pages_render_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let service = WorksheetService::with_chrome(config(dir.path())).expect("service");

    let urls = service
        .generate_pages("counting-objects", json!({ "difficulty": "easy" }), 4)
        .await
        .expect("batch");
    assert_eq!(urls.len(), 4);
    service.shutdown().await;
}
