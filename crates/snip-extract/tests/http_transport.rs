//! reqwest transport against a loopback server

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use snip_config::extraction::ExtractionConfig;
use snip_extract::{ExtractionClient, HttpTransport};
use snip_types::{CroppedImage, ExtractionResult, FailureKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const KEY: &str = "AIzaSyExampleKey123";

fn image() -> CroppedImage {
    CroppedImage {
        png: vec![0x89, b'P', b'N', b'G', 1, 2, 3],
        width: 12,
        height: 12,
    }
}

fn config_for(base: &str, timeout_ms: u64, max_attempts: u32) -> ExtractionConfig {
    ExtractionConfig {
        endpoint: format!("{base}/v1beta/models/test:generateContent"),
        timeout_ms,
        max_attempts,
        ..ExtractionConfig::default()
    }
    .with_credential(KEY)
}

fn client() -> ExtractionClient<HttpTransport> {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    ExtractionClient::new(HttpTransport::with_client(http))
}

/// Read one request (headers plus `Content-Length` body)
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn test_posts_generate_content_body() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Invoice #42"}]}}]}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        request
    });

    let result = client()
        .extract_text(&image(), &config_for(&base, 5_000, 1))
        .await
        .unwrap();
    assert_eq!(result, ExtractionResult::Success("Invoice #42".into()));

    let request = server.await.unwrap();
    assert!(
        request.starts_with(&format!("POST /v1beta/models/test:generateContent?key={KEY} ")),
        "unexpected request line: {request}"
    );
    assert!(request.contains(r#""mime_type":"image/png""#));
    assert!(request.contains(&image().to_base64()));
}

#[tokio::test]
async fn test_deadline_aborts_request() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let accepted = Arc::new(AtomicUsize::new(0));

    let counter = accepted.clone();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            held.push(stream);
        }
    });

    let result = client()
        .extract_text(&image(), &config_for(&base, 200, 3))
        .await
        .unwrap();

    assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_service_exhausts() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = client()
        .extract_text(&image(), &config_for(&base, 2_000, 1))
        .await
        .unwrap();

    match result {
        ExtractionResult::Failure { kind, message } => {
            assert_eq!(kind, FailureKind::Unknown);
            assert!(message.starts_with("exhausted retries"), "{message}");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
