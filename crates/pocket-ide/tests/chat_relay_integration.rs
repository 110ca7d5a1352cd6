use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use pocket_ide::{start_web_server, ConsoleSessions, ServerConfig, SessionLimits, WebState};
use pocket_relay::{ChatRelay, Provider, RelaySettings};
use serde_json::{json, Value};
use smol_str::SmolStr;
use tiny_http::{Header, Response, Server, StatusCode};

const SSE_REPLY: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n\
data: [DONE]\n\n";

#[derive(Debug, Clone)]
struct Captured {
    url: String,
    authorization: Option<String>,
    body: Value,
}

fn reserve_loopback_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

/// Fake chat-completion provider answering every POST with `status`/`reply`.
fn start_mock_upstream(status: u16, reply: &'static str) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let port = reserve_loopback_port();
    let server = Server::http(format!("127.0.0.1:{port}")).expect("bind mock upstream");
    let captured = Arc::new(Mutex::new(Vec::new()));
    let log = captured.clone();
    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            let authorization = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.as_str().to_string());
            log.lock().expect("capture lock").push(Captured {
                url: request.url().to_string(),
                authorization,
                body: serde_json::from_str(&body).unwrap_or(Value::Null),
            });
            let response = Response::from_string(reply)
                .with_status_code(StatusCode(status))
                .with_header(
                    Header::from_bytes("Content-Type", "text/event-stream")
                        .expect("content type header"),
                );
            let _ = request.respond(response);
        }
    });
    (format!("http://127.0.0.1:{port}"), captured)
}

/// Consume one request head plus its `Content-Length` body.
fn read_request(socket: &mut TcpStream) {
    let mut reader = BufReader::new(socket);
    let mut content_length = 0;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; content_length];
    let _ = reader.read_exact(&mut body);
}

/// Provider that sends one event, then holds each stream open until a
/// release arrives (or five seconds pass) before finishing it.
fn start_paused_upstream() -> (String, mpsc::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind paused upstream");
    let addr = listener.local_addr().expect("local addr");
    let (release_tx, release_rx) = mpsc::channel::<()>();
    thread::spawn(move || {
        for socket in listener.incoming() {
            let Ok(mut socket) = socket else {
                continue;
            };
            read_request(&mut socket);
            let _ = socket.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\n\
                  Connection: close\r\n\r\ndata: first\n\n",
            );
            let _ = socket.flush();
            let _ = release_rx.recv_timeout(Duration::from_secs(5));
            let _ = socket.write_all(b"data: [DONE]\n\n");
        }
    });
    (format!("http://{addr}"), release_tx)
}

fn read_first_event(reader: &mut impl Read) {
    let mut received = Vec::new();
    let mut buf = [0u8; 256];
    while !received.ends_with(b"data: first\n\n") {
        let read = reader.read(&mut buf).expect("read first event");
        assert!(read > 0, "stream ended before the first event");
        received.extend_from_slice(&buf[..read]);
    }
}

fn relay_settings(upstream: &str) -> RelaySettings {
    let mut settings = RelaySettings::default();
    for provider in Provider::ALL {
        let entry = settings.get_mut(provider);
        entry.endpoint = format!("{upstream}/{}/chat/completions", provider.as_str()).into();
        entry.api_key = Some(format!("key-{}", provider.as_str()));
    }
    settings
}

fn start_relay_server(settings: RelaySettings) -> String {
    start_capped_relay_server(settings, 8)
}

fn start_capped_relay_server(settings: RelaySettings, max_chat_streams: usize) -> String {
    let port = reserve_loopback_port();
    let listen = format!("127.0.0.1:{port}");
    let config = ServerConfig {
        listen: SmolStr::new(&listen),
        cors_origin: SmolStr::new("https://ide.example"),
        max_chat_streams,
    };
    let state = WebState {
        relay: Arc::new(ChatRelay::http(settings)),
        sessions: Arc::new(ConsoleSessions::new(SessionLimits {
            session_ttl_secs: 900,
            max_sessions: 16,
        })),
    };
    let _server = start_web_server(&config, state).expect("start server");
    let base = format!("http://{listen}");
    for _ in 0..100 {
        if ureq::get(&format!("{base}/api/health")).call().is_ok() {
            return base;
        }
        thread::sleep(Duration::from_millis(25));
    }
    panic!("web server did not become reachable at {base}");
}

fn post_chat(base: &str, payload: &Value) -> Result<ureq::Response, ureq::Error> {
    ureq::post(&format!("{base}/api/ai-chat"))
        .set("Content-Type", "application/json")
        .send_string(&payload.to_string())
}

#[test]
fn streams_upstream_body_back_unmodified() {
    let (upstream, captured) = start_mock_upstream(200, SSE_REPLY);
    let base = start_relay_server(relay_settings(&upstream));

    let response = post_chat(
        &base,
        &json!({ "messages": [{ "role": "user", "content": "Say hello" }] }),
    )
    .expect("chat relay");
    assert_eq!(response.status(), 200);
    assert_eq!(response.header("Content-Type"), Some("text/event-stream"));
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some("https://ide.example")
    );
    let mut streamed = String::new();
    response
        .into_reader()
        .read_to_string(&mut streamed)
        .expect("read stream");
    assert_eq!(streamed, SSE_REPLY);

    let calls = captured.lock().expect("capture lock").clone();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.url, "/openai/chat/completions");
    assert_eq!(call.authorization.as_deref(), Some("Bearer key-openai"));
    assert_eq!(call.body["model"], "gpt-4o-mini");
    assert_eq!(call.body["stream"], true);
    assert_eq!(call.body["messages"][0]["role"], "system");
    assert_eq!(
        call.body["messages"][1],
        json!({ "role": "user", "content": "Say hello" })
    );
}

#[test]
fn perplexity_selector_routes_to_its_endpoint() {
    let (upstream, captured) = start_mock_upstream(200, "data: [DONE]\n\n");
    let base = start_relay_server(relay_settings(&upstream));

    post_chat(
        &base,
        &json!({
            "messages": [{ "role": "user", "content": "news?" }],
            "provider": "perplexity",
        }),
    )
    .expect("chat relay")
    .into_string()
    .expect("read body");

    let call = captured.lock().expect("capture lock")[0].clone();
    assert_eq!(call.url, "/perplexity/chat/completions");
    assert_eq!(call.authorization.as_deref(), Some("Bearer key-perplexity"));
    assert_eq!(call.body["model"], "llama-3.1-sonar-small-128k-online");
}

#[test]
fn upstream_failure_status_is_relayed() {
    let (upstream, captured) = start_mock_upstream(429, "{\"error\":{\"message\":\"slow down\"}}");
    let base = start_relay_server(relay_settings(&upstream));

    let err = post_chat(
        &base,
        &json!({ "messages": [{ "role": "user", "content": "hi" }] }),
    )
    .expect_err("upstream failure");
    let ureq::Error::Status(status, response) = err else {
        panic!("expected status error");
    };
    assert_eq!(status, 429);
    let body: Value =
        serde_json::from_str(&response.into_string().expect("error body")).expect("json");
    assert_eq!(body, json!({ "error": "API request failed" }));
    assert_eq!(captured.lock().expect("capture lock").len(), 1);
}

#[test]
fn config_errors_never_reach_upstream() {
    let (upstream, captured) = start_mock_upstream(200, SSE_REPLY);
    let mut settings = relay_settings(&upstream);
    settings.perplexity.api_key = None;
    let base = start_relay_server(settings);

    let err = post_chat(
        &base,
        &json!({ "messages": [], "provider": "gemini" }),
    )
    .expect_err("unsupported provider");
    let ureq::Error::Status(status, response) = err else {
        panic!("expected status error");
    };
    assert_eq!(status, 500);
    assert_eq!(
        response.into_string().expect("error body"),
        json!({ "error": "Unsupported provider 'gemini'" }).to_string()
    );

    let err = post_chat(
        &base,
        &json!({ "messages": [], "provider": "perplexity" }),
    )
    .expect_err("missing credential");
    assert!(matches!(err, ureq::Error::Status(500, _)));

    let err = ureq::post(&format!("{base}/api/ai-chat"))
        .send_string("not json")
        .expect_err("invalid json");
    assert!(matches!(err, ureq::Error::Status(400, _)));

    assert!(captured.lock().expect("capture lock").is_empty());
}

#[test]
fn unreachable_upstream_is_a_server_error() {
    let dead = format!("http://127.0.0.1:{}", reserve_loopback_port());
    let base = start_relay_server(relay_settings(&dead));
    let err = post_chat(
        &base,
        &json!({ "messages": [{ "role": "user", "content": "hi" }] }),
    )
    .expect_err("transport failure");
    assert!(matches!(err, ureq::Error::Status(500, _)));
}

#[test]
fn long_stream_does_not_block_other_routes() {
    let port = reserve_loopback_port();
    let server = Server::http(format!("127.0.0.1:{port}")).expect("bind slow upstream");
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let _ = release_rx.recv_timeout(Duration::from_secs(5));
            let _ = request.respond(Response::from_string("data: [DONE]\n\n"));
        }
    });
    let base = start_relay_server(relay_settings(&format!("http://127.0.0.1:{port}")));

    let chat = thread::spawn({
        let base = base.clone();
        move || {
            post_chat(
                &base,
                &json!({ "messages": [{ "role": "user", "content": "hi" }] }),
            )
            .map(|response| response.status())
        }
    });
    thread::sleep(Duration::from_millis(100));
    let health = ureq::get(&format!("{base}/api/health"))
        .call()
        .expect("health while chat is pending");
    assert_eq!(health.status(), 200);

    release_tx.send(()).expect("release upstream");
    let status = chat.join().expect("chat thread").expect("chat response");
    assert_eq!(status, 200);
}

#[test]
fn events_reach_the_client_before_the_upstream_finishes() {
    let (upstream, release) = start_paused_upstream();
    let base = start_relay_server(relay_settings(&upstream));

    let started = Instant::now();
    let response = post_chat(
        &base,
        &json!({ "messages": [{ "role": "user", "content": "hi" }] }),
    )
    .expect("chat relay");
    assert_eq!(response.status(), 200);
    assert_eq!(response.header("Content-Type"), Some("text/event-stream"));
    assert_eq!(
        response.header("Access-Control-Allow-Origin"),
        Some("https://ide.example")
    );
    let mut reader = response.into_reader();
    read_first_event(&mut reader);
    let elapsed = started.elapsed();
    release.send(()).expect("release upstream");
    assert!(
        elapsed < Duration::from_millis(1500),
        "first event arrived after {elapsed:?}"
    );

    let mut rest = String::new();
    reader.read_to_string(&mut rest).expect("read rest of stream");
    assert_eq!(rest, "data: [DONE]\n\n");
}

#[test]
fn chat_streams_beyond_the_cap_are_refused() {
    let (upstream, release) = start_paused_upstream();
    let base = start_capped_relay_server(relay_settings(&upstream), 1);
    let payload = json!({ "messages": [{ "role": "user", "content": "hi" }] });

    let mut held = post_chat(&base, &payload)
        .expect("first chat")
        .into_reader();
    read_first_event(&mut held);

    let err = post_chat(&base, &payload).expect_err("second chat over the cap");
    let ureq::Error::Status(status, response) = err else {
        panic!("expected status error");
    };
    assert_eq!(status, 429);
    assert_eq!(
        response.into_string().expect("error body"),
        json!({ "error": "too many active chat streams" }).to_string()
    );
    let health = ureq::get(&format!("{base}/api/health"))
        .call()
        .expect("health while capped");
    assert_eq!(health.status(), 200);

    release.send(()).expect("release first stream");
    let mut rest = String::new();
    held.read_to_string(&mut rest).expect("finish first stream");

    // Queued for the next upstream connection so it finishes immediately.
    release.send(()).expect("pre-release next stream");
    let status = (0..50).find_map(|_| match post_chat(&base, &payload) {
        Ok(response) => Some(response.status()),
        Err(ureq::Error::Status(429, _)) => {
            thread::sleep(Duration::from_millis(20));
            None
        }
        Err(err) => panic!("unexpected chat failure: {err}"),
    });
    assert_eq!(status, Some(200));
}
