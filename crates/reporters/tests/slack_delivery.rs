use mbc_engine::{ChainParams, Direction, Report, ReportEntry};
use mbc_reporters::{ChainInfo, ReportError, Reporter, SlackConfig, SlackReporter};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Reads one HTTP request, headers and `Content-Length` bytes of body.
async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let read = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => read,
        };
        request.extend_from_slice(chunk.get(..read).unwrap_or_default());

        let text = String::from_utf8_lossy(&request).to_string();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let content_length = text
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        if request.len() >= header_end + 4 + content_length {
            break;
        }
    }

    String::from_utf8_lossy(&request).to_string()
}

/// Answers every request with `body` and records the raw requests it saw.
async fn spawn_slack(body: &'static str) -> Option<(String, Arc<Mutex<Vec<String>>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
    let address = listener.local_addr().ok()?;
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let request = read_request(&mut stream).await;
            if let Ok(mut seen) = seen.lock() {
                seen.push(request);
            }

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    Some((format!("http://{address}/api/chat.postMessage"), requests))
}

fn reporter(api_url: &str) -> SlackReporter {
    SlackReporter::new(
        SlackConfig {
            token: "xoxb-test".to_owned(),
            chat: "C0123".to_owned(),
        },
        ChainInfo {
            mintscan_prefix: "cosmos".to_owned(),
            validator_page_pattern: String::new(),
        },
        ChainParams::new(10_000, 0.05, 6.0),
    )
    .with_api_url(api_url)
}

fn jailed_report() -> Report {
    Report::new(vec![ReportEntry {
        validator_address: "cosmosvaloper1a".to_owned(),
        validator_moniker: "Alpha".to_owned(),
        consensus_address: "cosmosvalcons1a".to_owned(),
        emoji: "❌".to_owned(),
        description: "was jailed".to_owned(),
        missing_blocks: 9500,
        direction: Direction::Jailed,
    }])
}

#[tokio::test]
async fn posts_message_with_bearer_token() {
    let Some((url, requests)) = spawn_slack(r#"{"ok":true,"channel":"C0123","ts":"1.2"}"#).await else {
        return;
    };

    let result = reporter(&url).send_report(&jailed_report()).await;
    assert!(result.is_ok());

    let requests = match requests.lock() {
        Ok(requests) => requests.clone(),
        Err(_) => return,
    };
    assert_eq!(requests.len(), 1);
    let request = requests.first().cloned().unwrap_or_default();
    assert!(request.starts_with("POST /api/chat.postMessage"));
    assert!(request.to_lowercase().contains("authorization: bearer xoxb-test"));
    assert!(request.contains(r#""channel":"C0123""#));
    assert!(request.contains(r#""unfurl_links":false"#));
}

#[tokio::test]
async fn api_error_is_reported() {
    let Some((url, _)) = spawn_slack(r#"{"ok":false,"error":"channel_not_found"}"#).await else {
        return;
    };

    let result = reporter(&url).send_report(&jailed_report()).await;
    assert!(matches!(result, Err(ReportError::SlackApi(error)) if error == "channel_not_found"));
}

#[tokio::test]
async fn empty_report_makes_no_request() {
    let Some((url, requests)) = spawn_slack(r#"{"ok":true}"#).await else {
        return;
    };

    let result = reporter(&url).send_report(&Report::default()).await;
    assert!(result.is_ok());
    assert!(requests.lock().is_ok_and(|requests| requests.is_empty()));
}
