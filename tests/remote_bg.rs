//! Background removal against a fake HTTP endpoint
#![cfg(feature = "remote-bg")]

use base64::Engine as _;
use kidsheet::transform::{BackgroundRemover, HttpBackgroundRemover};
use std::io::Read;
use std::sync::Once;
use tiny_http::{Response, Server};
use url::Url;

static INIT: Once = Once::new();

const CLEANED: &[u8] = b"\x89PNG cleaned";

/// `/clean` echoes a fixed PNG body, everything else fails
fn start_test_server() -> String {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18090").unwrap();
            for mut request in server.incoming_requests() {
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);
                let response = if request.url() == "/clean" && !body.is_empty() {
                    Response::from_data(CLEANED.to_vec())
                        .with_header("Content-Type: image/png".parse::<tiny_http::Header>().unwrap())
                } else {
                    Response::from_data(b"boom".to_vec()).with_status_code(500)
                };
                let _ = request.respond(response);
            }
        });
        std::thread::sleep(std::time::Duration::from_millis(100));
    });

    "http://127.0.0.1:18090".to_string()
}

fn public_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("uploads/bigpng")).unwrap();
    std::fs::write(dir.path().join("uploads/bigpng/bear.png"), b"\x89PNG original").unwrap();
    dir
}

#[tokio::test]
async fn cleaned_picture_comes_back_as_data_uri() {
    let base = start_test_server();
    let dir = public_dir();
    let remover = HttpBackgroundRemover::new(Url::parse(&format!("{}/clean", base)).unwrap(), dir.path()).unwrap();

    let uri = remover.remove("/uploads/bigpng/bear.png").await.unwrap();
    let expected = base64::engine::general_purpose::STANDARD.encode(CLEANED);
    assert_eq!(uri, format!("data:image/png;base64,{}", expected));
}

#[tokio::test]
async fn server_errors_and_missing_files_fail() {
    let base = start_test_server();
    let dir = public_dir();

    let broken = HttpBackgroundRemover::new(Url::parse(&format!("{}/down", base)).unwrap(), dir.path()).unwrap();
    assert!(broken.remove("/uploads/bigpng/bear.png").await.is_err());

    let ok = HttpBackgroundRemover::new(Url::parse(&format!("{}/clean", base)).unwrap(), dir.path()).unwrap();
    assert!(ok.remove("/uploads/bigpng/missing.png").await.is_err());
    assert!(ok.remove("https://cdn.example.com/bear.png").await.is_err());
}
