use std::time::Duration;

use jenkins::{JenkinsClient, JenkinsConfig, JenkinsSettings, Secret};
use pipeline::{
    process_batch, BucketName, BuildTrigger, EventBatch, EventRecord, InvocationId, ObjectKey,
    TriggerError, TriggerErrorKind, TriggerOutcome,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves one canned response per status line, one connection each, and
/// returns the request heads it received.
async fn stub_server(status_lines: Vec<&'static str>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut heads = Vec::new();
        for status_line in status_lines {
            let (mut socket, _) = listener.accept().await.unwrap();
            heads.push(read_head(&mut socket).await);
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        }
        heads
    });

    (format!("http://{addr}"), handle)
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (n, v) = line.split_once(':')?;
        n.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

fn client(base_url: &str, timeout: Duration) -> JenkinsClient {
    let config = JenkinsConfig::from_settings(JenkinsSettings {
        base_url: base_url.into(),
        trigger_token: Secret::new("t0k"),
        username: "user".into(),
        api_token: Secret::new("secret"),
        job_name: Some("deploy".into()),
        timeout: Some(timeout),
    })
    .unwrap();
    JenkinsClient::new(config).unwrap()
}

fn record(key: &str) -> EventRecord {
    EventRecord::new(BucketName::new("b1").unwrap(), ObjectKey::new(key))
}

#[tokio::test]
async fn success_status_is_triggered_and_request_is_well_formed() {
    let (base, server) = stub_server(vec!["201 Created"]).await;
    let client = client(&base, Duration::from_secs(5));

    let result = client.trigger(&record("dir/u_output_42.json")).await;
    assert_eq!(result, Ok(201));

    let heads = server.await.unwrap();
    let request_line = heads[0].lines().next().unwrap();
    assert_eq!(
        request_line,
        "POST /job/deploy/buildWithParameters?token=t0k&BUCKET=b1&KEY=dir%2Fu_output_42.json HTTP/1.1"
    );
    assert_eq!(
        header(&heads[0], "authorization"),
        Some("Basic dXNlcjpzZWNyZXQ=")
    );
}

#[tokio::test]
async fn ok_status_is_triggered() {
    let (base, server) = stub_server(vec!["200 OK"]).await;
    let client = client(&base, Duration::from_secs(5));

    let result = client.trigger(&record("u_output_42.json")).await;
    assert_eq!(result, Ok(200));
    server.await.unwrap();
}

#[tokio::test]
async fn forbidden_is_an_http_error() {
    let (base, server) = stub_server(vec!["403 Forbidden"]).await;
    let client = client(&base, Duration::from_secs(5));

    let result = client.trigger(&record("u_output_42.json")).await;
    assert_eq!(
        result,
        Err(TriggerError::Http {
            status: 403,
            reason: "Forbidden".into()
        })
    );
    server.await.unwrap();
}

#[tokio::test]
async fn redirects_are_not_followed() {
    let (base, server) = stub_server(vec!["302 Found"]).await;
    let client = client(&base, Duration::from_secs(5));

    let err = client.trigger(&record("u_output_42.json")).await.unwrap_err();
    assert_eq!(err.kind(), TriggerErrorKind::HttpError);
    assert_eq!(server.await.unwrap().len(), 1);
}

#[tokio::test]
async fn connection_refused_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}"), Duration::from_secs(5));
    let err = client.trigger(&record("u_output_42.json")).await.unwrap_err();

    assert_eq!(err.kind(), TriggerErrorKind::NetworkError);
    assert!(!err.to_string().contains("t0k"), "token leaked: {err}");
}

#[tokio::test]
async fn slow_server_times_out_as_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(socket);
    });

    let client = client(&format!("http://{addr}"), Duration::from_millis(200));
    let err = client.trigger(&record("u_output_42.json")).await.unwrap_err();

    assert_eq!(err.kind(), TriggerErrorKind::NetworkError);
    server.abort();
}

#[tokio::test]
async fn batch_continues_past_a_failed_record() {
    let (base, server) =
        stub_server(vec!["201 Created", "500 Internal Server Error", "201 Created"]).await;
    let client = client(&base, Duration::from_secs(5));
    let batch = EventBatch::new(vec![
        record("a_output_1.json"),
        record("b_output_2.json"),
        record("c_output_3.json"),
    ]);

    let report = process_batch(InvocationId::new_random(), &batch, &client).await;

    assert_eq!(report.records[0].outcome, TriggerOutcome::Triggered { status: 201 });
    assert_eq!(
        report.records[1].outcome.error_kind(),
        Some(TriggerErrorKind::HttpError)
    );
    assert_eq!(report.records[2].outcome, TriggerOutcome::Triggered { status: 201 });
    assert_eq!(report.status(), pipeline::BatchStatus::done());

    let heads = server.await.unwrap();
    assert!(heads[2].contains("KEY=c_output_3.json"));
}
