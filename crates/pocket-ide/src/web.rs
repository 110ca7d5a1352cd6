//! Embedded HTTP API for the IDE shell.

#![allow(missing_docs)]

pub mod console;
pub mod playground;

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use pocket_playground::{
    templates, Playground, ScratchEditor, EXPORT_FILE_NAME, PREVIEW_SANDBOX,
};
use pocket_relay::ChatRelay;
use serde::Deserialize;
use serde_json::{json, Value};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::IdeError;
use crate::web::console::{ConsoleSessions, SessionError};
use crate::web::playground::PlaygroundRequest;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 512 * 1024;

/// Header carrying the console session token.
pub const CONSOLE_SESSION_HEADER: &str = "X-Console-Session";

const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type, x-console-session";
const ALLOW_METHODS: &str = "GET, POST, DELETE, OPTIONS";
const STREAM_BUFFER_BYTES: usize = 8 * 1024;

pub struct WebServer {
    handle: thread::JoinHandle<()>,
    pub listen: String,
}

impl WebServer {
    /// Block until the accept loop ends.
    pub fn wait(self) {
        let _ = self.handle.join();
    }
}

/// Shared state handed to the request loop.
#[derive(Debug, Clone)]
pub struct WebState {
    pub relay: Arc<ChatRelay>,
    pub sessions: Arc<ConsoleSessions>,
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    line: String,
}

/// Counts chat relays in flight against a fixed ceiling.
#[derive(Debug, Clone)]
struct ChatSlots {
    active: Arc<AtomicUsize>,
    limit: usize,
}

/// Held by one chat relay; frees its slot on drop.
#[derive(Debug)]
struct ChatSlot {
    active: Arc<AtomicUsize>,
}

impl ChatSlots {
    fn new(limit: usize) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            limit,
        }
    }

    fn try_acquire(&self) -> Option<ChatSlot> {
        self.active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |active| {
                (active < self.limit).then_some(active + 1)
            })
            .ok()?;
        Some(ChatSlot {
            active: self.active.clone(),
        })
    }

    fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for ChatSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn start_web_server(config: &ServerConfig, state: WebState) -> Result<WebServer, IdeError> {
    let listen = config.listen.to_string();
    let server =
        Server::http(&listen).map_err(|err| IdeError::Web(format!("web bind: {err}").into()))?;
    let origin = config.cors_origin.clone();
    let chat_slots = ChatSlots::new(config.max_chat_streams);
    info!(listen = %listen, max_chat_streams = config.max_chat_streams, "web api listening");

    let handle = thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let method = request.method().clone();
            let url = request.url().to_string();
            let path = url.split_once('?').map_or(url.as_str(), |(path, _)| path);
            debug!(method = %method, path, "request");

            if method == Method::Options {
                let response = Response::empty(StatusCode(200));
                respond(request, response, &origin);
                continue;
            }
            if method == Method::Get && path == "/api/health" {
                let body = json!({ "ok": true, "version": env!("CARGO_PKG_VERSION") });
                respond_json(request, 200, &body, &origin);
                continue;
            }
            if method == Method::Get && path == "/api/templates" {
                let list = templates::catalog()
                    .iter()
                    .map(templates::TemplateDescriptor::summary)
                    .collect::<Vec<_>>();
                respond_json(request, 200, &json!({ "ok": true, "templates": list }), &origin);
                continue;
            }
            if method == Method::Get {
                if let Some(rest) = path.strip_prefix("/api/templates/") {
                    let (id, snippet) = match rest.strip_suffix("/snippet") {
                        Some(id) => (id, true),
                        None => (rest, false),
                    };
                    match templates::find(id) {
                        Some(template) if snippet => {
                            let response =
                                text_response(200, "text/plain; charset=utf-8", template.snippet());
                            respond(request, response, &origin);
                        }
                        Some(template) => {
                            let body = json!({ "ok": true, "template": template });
                            respond_json(request, 200, &body, &origin);
                        }
                        None => {
                            let message = format!("unknown template '{id}'");
                            respond_error(request, 404, &message, &origin);
                        }
                    }
                    continue;
                }
            }
            if method == Method::Get && path == "/api/playground/defaults" {
                let playground = Playground::new();
                respond_json(
                    request,
                    200,
                    &json!({ "ok": true, "buffers": playground.buffers() }),
                    &origin,
                );
                continue;
            }
            if method == Method::Get && path == "/api/editor/defaults" {
                let editor = ScratchEditor::new();
                let (file_name, text) = editor.export();
                let body = json!({ "ok": true, "file_name": file_name, "text": text });
                respond_json(request, 200, &body, &origin);
                continue;
            }
            if method == Method::Post
                && (path == "/api/playground/render" || path == "/api/playground/export")
            {
                let export = path.ends_with("/export");
                let body = match read_body(&mut request) {
                    Ok(body) => body,
                    Err((status, message)) => {
                        respond_error(request, status, message, &origin);
                        continue;
                    }
                };
                let buffers = match PlaygroundRequest::parse(&body)
                    .and_then(PlaygroundRequest::into_buffers)
                {
                    Ok(buffers) => buffers,
                    Err(err) => {
                        respond_error(request, err.status_code(), &err.to_string(), &origin);
                        continue;
                    }
                };
                let playground = Playground::with_buffers(buffers);
                let response = if export {
                    let mut response = text_response(
                        200,
                        "text/html; charset=utf-8",
                        playground.export_standalone(),
                    );
                    add_header(
                        &mut response,
                        "Content-Disposition",
                        &format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                    );
                    response
                } else {
                    let mut response = text_response(
                        200,
                        "text/html; charset=utf-8",
                        playground.render().into_string(),
                    );
                    // Previews are only ever shown inside an opaque-origin sandbox.
                    add_header(
                        &mut response,
                        "Content-Security-Policy",
                        &format!("sandbox {PREVIEW_SANDBOX}"),
                    );
                    response
                };
                respond(request, response, &origin);
                continue;
            }
            if method == Method::Post && path == "/api/console/session" {
                match state.sessions.create() {
                    Ok(session) => {
                        let body = json!({
                            "ok": true,
                            "token": session.token,
                            "expires_at": session.expires_at,
                            "transcript": session.transcript,
                        });
                        respond_json(request, 200, &body, &origin);
                    }
                    Err(err) => respond_session_error(request, &err, &origin),
                }
                continue;
            }
            if path.starts_with("/api/console/") {
                let Some(token) = header_value(&request, CONSOLE_SESSION_HEADER) else {
                    respond_error(request, 401, "missing console session", &origin);
                    continue;
                };
                if method == Method::Delete && path == "/api/console/session" {
                    match state.sessions.close(&token) {
                        Ok(()) => respond_json(request, 200, &json!({ "ok": true }), &origin),
                        Err(err) => respond_session_error(request, &err, &origin),
                    }
                    continue;
                }
                if method == Method::Get && path == "/api/console/transcript" {
                    match state.sessions.transcript(&token) {
                        Ok(session) => {
                            let body = json!({
                                "ok": true,
                                "expires_at": session.expires_at,
                                "transcript": session.transcript,
                            });
                            respond_json(request, 200, &body, &origin);
                        }
                        Err(err) => respond_session_error(request, &err, &origin),
                    }
                    continue;
                }
                if method == Method::Post && path == "/api/console/reset" {
                    match state.sessions.reset(&token) {
                        Ok(session) => {
                            let body = json!({
                                "ok": true,
                                "expires_at": session.expires_at,
                                "transcript": session.transcript,
                            });
                            respond_json(request, 200, &body, &origin);
                        }
                        Err(err) => respond_session_error(request, &err, &origin),
                    }
                    continue;
                }
                if method == Method::Post && path == "/api/console/submit" {
                    let body = match read_body(&mut request) {
                        Ok(body) => body,
                        Err((status, message)) => {
                            respond_error(request, status, message, &origin);
                            continue;
                        }
                    };
                    let payload: SubmitRequest = match serde_json::from_str(&body) {
                        Ok(payload) => payload,
                        Err(_) => {
                            respond_error(request, 400, "invalid json", &origin);
                            continue;
                        }
                    };
                    match state.sessions.submit(&token, &payload.line) {
                        Ok(outcome) => {
                            let body = json!({
                                "ok": true,
                                "reset": outcome.reset,
                                "appended": outcome.appended,
                                "transcript_len": outcome.transcript_len,
                                "expires_at": outcome.expires_at,
                            });
                            respond_json(request, 200, &body, &origin);
                        }
                        Err(err) => respond_session_error(request, &err, &origin),
                    }
                    continue;
                }
            }
            if method == Method::Post && path == "/api/ai-chat" {
                let Some(slot) = chat_slots.try_acquire() else {
                    warn!(active = chat_slots.active(), "chat stream limit reached");
                    let _ = io::copy(
                        &mut request.as_reader().take(MAX_BODY_BYTES as u64),
                        &mut io::sink(),
                    );
                    let body = json!({ "error": "too many active chat streams" });
                    respond_json(request, 429, &body, &origin);
                    continue;
                };
                let relay = state.relay.clone();
                let origin = origin.clone();
                thread::spawn(move || {
                    handle_chat(request, &relay, &origin);
                    drop(slot);
                });
                continue;
            }
            respond_error(request, 404, "not found", &origin);
        }
    });

    Ok(WebServer { handle, listen })
}

fn handle_chat(mut request: Request, relay: &ChatRelay, origin: &str) {
    let body = match read_body(&mut request) {
        Ok(body) => body,
        Err((status, message)) => {
            respond_error(request, status, message, origin);
            return;
        }
    };
    match relay.forward_json(&body) {
        Ok(stream) => {
            let provider = stream.provider();
            let content_type = stream.content_type();
            let mut upstream = stream.into_reader();
            let mut writer = request.into_writer();
            match write_event_stream(&mut writer, &mut upstream, content_type, origin) {
                Ok(bytes) => debug!(provider = provider.as_str(), bytes, "chat stream finished"),
                Err(err) => {
                    warn!(provider = provider.as_str(), error = %err, "chat stream ended early");
                }
            }
        }
        Err(err) => {
            if err.is_config() {
                error!(error = %err, "chat relay misconfigured");
            } else {
                warn!(error = %err, "chat relay failed");
            }
            respond_json(request, err.status_code(), &err.body(), origin);
        }
    }
}

/// Write the response head, then each upstream read as one chunk, flushed
/// before the next read. Returns the body bytes relayed.
///
/// A failure after the head is out leaves the chunked body unterminated, so
/// the client sees a truncated stream rather than a clean end.
fn write_event_stream(
    out: &mut dyn Write,
    body: &mut dyn Read,
    content_type: &str,
    origin: &str,
) -> io::Result<u64> {
    out.write_all(stream_head(content_type, origin).as_bytes())?;
    out.flush()?;
    let mut buf = [0u8; STREAM_BUFFER_BYTES];
    let mut relayed = 0u64;
    loop {
        let read = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        write!(out, "{read:X}\r\n")?;
        out.write_all(&buf[..read])?;
        out.write_all(b"\r\n")?;
        out.flush()?;
        relayed += read as u64;
    }
    out.write_all(b"0\r\n\r\n")?;
    out.flush()?;
    Ok(relayed)
}

fn stream_head(content_type: &str, origin: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: {content_type}\r\n\
         Cache-Control: no-cache\r\n\
         Transfer-Encoding: chunked\r\n\
         Connection: close\r\n\
         Access-Control-Allow-Origin: {origin}\r\n\
         Access-Control-Allow-Headers: {ALLOW_HEADERS}\r\n\
         Access-Control-Allow-Methods: {ALLOW_METHODS}\r\n\
         \r\n"
    )
}

/// Read at most [`MAX_BODY_BYTES`]. Oversized bodies are drained so the
/// client sees the 413 instead of a reset connection.
fn read_body(request: &mut Request) -> Result<String, (u16, &'static str)> {
    let limit = MAX_BODY_BYTES as u64 + 1;
    let mut bytes = Vec::new();
    request
        .as_reader()
        .take(limit)
        .read_to_end(&mut bytes)
        .map_err(|_| (400, "invalid body"))?;
    if bytes.len() > MAX_BODY_BYTES {
        let _ = io::copy(request.as_reader(), &mut io::sink());
        return Err((413, "request body too large"));
    }
    String::from_utf8(bytes).map_err(|_| (400, "invalid body"))
}

fn header_value(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

fn header(field: &str, value: &str) -> Option<Header> {
    Header::from_bytes(field.as_bytes(), value.as_bytes()).ok()
}

fn add_header<R: Read>(response: &mut Response<R>, field: &str, value: &str) {
    if let Some(header) = header(field, value) {
        response.add_header(header);
    }
}

fn with_cors<R: Read>(mut response: Response<R>, origin: &str) -> Response<R> {
    add_header(&mut response, "Access-Control-Allow-Origin", origin);
    add_header(&mut response, "Access-Control-Allow-Headers", ALLOW_HEADERS);
    add_header(&mut response, "Access-Control-Allow-Methods", ALLOW_METHODS);
    response
}

fn text_response(status: u16, content_type: &str, body: String) -> Response<io::Cursor<Vec<u8>>> {
    let mut response = Response::from_string(body).with_status_code(StatusCode(status));
    add_header(&mut response, "Content-Type", content_type);
    response
}

fn respond<R: Read>(request: Request, response: Response<R>, origin: &str) {
    if let Err(err) = request.respond(with_cors(response, origin)) {
        debug!(error = %err, "response not delivered");
    }
}

fn respond_json(request: Request, status: u16, body: &Value, origin: &str) {
    let response = text_response(status, "application/json", body.to_string());
    respond(request, response, origin);
}

fn respond_error(request: Request, status: u16, message: &str, origin: &str) {
    respond_json(request, status, &json!({ "ok": false, "error": message }), origin);
}

fn respond_session_error(request: Request, err: &SessionError, origin: &str) {
    respond_error(request, err.status_code(), &err.to_string(), origin);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out `pieces` one per read, recording how much was written
    /// before each read happened.
    struct Paced<'a> {
        pieces: Vec<&'static [u8]>,
        sink: &'a std::cell::RefCell<Vec<u8>>,
        seen_at_read: Vec<usize>,
    }

    impl Read for Paced<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.seen_at_read.push(self.sink.borrow().len());
            if self.pieces.is_empty() {
                return Ok(0);
            }
            let piece = self.pieces.remove(0);
            buf[..piece.len()].copy_from_slice(piece);
            Ok(piece.len())
        }
    }

    struct Shared<'a>(&'a std::cell::RefCell<Vec<u8>>);

    impl Write for Shared<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn event_stream_writes_one_chunk_per_read() {
        let sink = std::cell::RefCell::new(Vec::new());
        let mut body = Paced {
            pieces: vec![b"data: a\n\n", b"data: [DONE]\n\n"],
            sink: &sink,
            seen_at_read: Vec::new(),
        };
        let relayed = write_event_stream(
            &mut Shared(&sink),
            &mut body,
            "text/event-stream",
            "https://ide.example",
        )
        .expect("write stream");
        assert_eq!(relayed, 23);

        let text = String::from_utf8(sink.borrow().clone()).expect("utf8");
        let (head, chunks) = text.split_once("\r\n\r\n").expect("head");
        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.contains("Content-Type: text/event-stream"));
        assert!(head.contains("Transfer-Encoding: chunked"));
        assert!(head.contains("Access-Control-Allow-Origin: https://ide.example"));
        assert_eq!(chunks, "9\r\ndata: a\n\n\r\nE\r\ndata: [DONE]\n\n\r\n0\r\n\r\n");

        // The first event was fully written before the second read began.
        let first_event_end = head.len() + 4 + "9\r\ndata: a\n\n\r\n".len();
        assert_eq!(body.seen_at_read[1], first_event_end);
    }

    #[test]
    fn failed_read_leaves_stream_unterminated() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "upstream gone"))
            }
        }
        let sink = std::cell::RefCell::new(Vec::new());
        let err = write_event_stream(&mut Shared(&sink), &mut Broken, "text/event-stream", "*")
            .expect_err("broken upstream");
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(!sink.borrow().ends_with(b"0\r\n\r\n"));
    }

    #[test]
    fn chat_slots_cap_and_release() {
        let slots = ChatSlots::new(2);
        let first = slots.try_acquire().expect("first slot");
        let second = slots.try_acquire().expect("second slot");
        assert!(slots.try_acquire().is_none());
        assert_eq!(slots.active(), 2);

        drop(first);
        assert_eq!(slots.active(), 1);
        let third = slots.try_acquire().expect("freed slot");
        drop((second, third));
        assert_eq!(slots.active(), 0);
    }
}
