#![cfg(feature = "http")]

use std::time::Duration;
use strategy_report_builder::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Read one request and return its body.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
        let len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + len {
            return String::from_utf8_lossy(&buf[end + 4..end + 4 + len]).into_owned();
        }
    }
}

/// Serve a single connection, writing `parts` with a pause between each.
/// Resolves to the request body.
async fn serve_once(parts: Vec<Vec<u8>>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let body = read_request(&mut socket).await;
        for part in parts {
            socket.write_all(&part).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        let _ = socket.shutdown().await;
        body
    });
    (url, handle)
}

fn chunk(data: &[u8]) -> Vec<u8> {
    let mut out = format!("{:x}\r\n", data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
    out
}

#[tokio::test]
async fn test_step_endpoint_error_body_is_transport() {
    let body = r#"{"error":"Internal server error"}"#;
    let response = format!(
        "HTTP/1.1 500 Internal Server Error\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let (url, server) = serve_once(vec![response.into_bytes()]).await;
    let client = HttpStepClient::new(&url, &url);

    let err = match client
        .send(vec![Message::user("Execute prompt")], Some(StepId::Segments))
        .await
    {
        Ok(_) => panic!("expected the 500 response to fail"),
        Err(e) => e,
    };
    assert!(
        matches!(&err, ReportError::Transport(m) if m.contains("500") && m.ends_with("Internal server error")),
        "{}",
        err
    );

    let request: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(request["promptType"], "03-segments");
    assert_eq!(request["messages"][0]["role"], "user");
    assert_eq!(request["messages"][0]["content"], "Execute prompt");
}

#[tokio::test]
async fn test_step_endpoint_decodes_split_characters() {
    let (url, server) = serve_once(vec![
        b"HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nTransfer-Encoding: chunked\r\n\r\n"
            .to_vec(),
        chunk(b"A\n\xE2\x82"),
        chunk(b"\xAC\nB"),
        b"0\r\n\r\n".to_vec(),
    ])
    .await;
    let client = HttpStepClient::new(&url, &url);

    let stream = client
        .send(vec![Message::user("hi")], Some(StepId::Offerings))
        .await
        .unwrap();
    let (text, fragments) = collect_text(stream).await.unwrap();
    assert_eq!(text, "A\n€\nB");
    assert!(fragments >= 1);
    server.await.unwrap();
}

#[tokio::test]
async fn test_chat_request_goes_to_chat_endpoint_without_prompt_type() {
    let (url, server) = serve_once(vec![
        b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 6\r\nConnection: close\r\n\r\nAnswer"
            .to_vec(),
    ])
    .await;
    let client = HttpStepClient::new("http://127.0.0.1:9/unused", &url);

    let stream = client
        .send(
            vec![Message::system("context"), Message::user("question")],
            None,
        )
        .await
        .unwrap();
    assert_eq!(collect_text(stream).await.unwrap().0, "Answer");

    let request: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert!(request.get("promptType").is_none());
    assert_eq!(request["messages"][1]["content"], "question");
}

#[tokio::test]
async fn test_openai_client_streams_deltas() {
    let event = |content: &str| {
        format!(
            "data: {{\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4o\",\"choices\":[{{\"index\":0,\"delta\":{{\"content\":{}}},\"finish_reason\":null}}]}}\n\n",
            serde_json::to_string(content).unwrap()
        )
    };
    let (url, server) = serve_once(vec![
        b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n".to_vec(),
        event("Wendy's ").into_bytes(),
        event("serves burgers.").into_bytes(),
        b"data: [DONE]\n\n".to_vec(),
    ])
    .await;
    let client = OpenAiClient::new("sk-test".to_string(), "Team Wendy")
        .with_base_url(format!("{}/v1", url))
        .with_temperature(0.2);

    let stream = client
        .send(vec![Message::user("Execute prompt")], Some(StepId::Introduction))
        .await
        .unwrap();
    let (text, _) = collect_text(stream).await.unwrap();
    assert_eq!(text, "Wendy's serves burgers.");

    let request: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(request["model"], "gpt-4o");
    assert_eq!(request["stream"], true);
    assert_eq!(request["messages"][0]["role"], "system");
    assert!(request["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("Team Wendy"));
    assert_eq!(request["messages"][1]["content"], "Execute prompt");
}
