//! Minimal HTTP/1.1 server standing in for both the news site and Ollama.
//!
//! `GET` on any path serves the configured page. `POST /api/chat` pops the
//! next scripted reply and records the request body so tests can inspect
//! the prompts that were sent.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// What the page route returns.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }
}

/// One scripted answer for `POST /api/chat`.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with `{"message":{"role":"assistant","content":...}}`.
    Content(String),
    /// Bare status, empty body.
    Status(u16),
    /// 200 with this exact body.
    Raw(String),
}

#[derive(Default)]
struct State {
    replies: VecDeque<Reply>,
    chat_requests: Vec<serde_json::Value>,
    page_hits: usize,
}

pub struct MockServer {
    pub base_url: String,
    state: Arc<Mutex<State>>,
}

impl MockServer {
    /// URL of the page route.
    pub fn page_url(&self) -> String {
        format!("{}/article", self.base_url)
    }

    /// Parsed JSON bodies of every chat request received, in order.
    pub fn chat_requests(&self) -> Vec<serde_json::Value> {
        self.state.lock().unwrap().chat_requests.clone()
    }

    pub fn page_hits(&self) -> usize {
        self.state.lock().unwrap().page_hits
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start(page: Page, replies: Vec<Reply>) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State {
        replies: replies.into(),
        ..State::default()
    }));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            let page = page.clone();
            thread::spawn(move || handle(stream, &page, &state));
        }
    });
    MockServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    }
}

/// A URL on which nothing listens (connection refused).
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream, page: &Page, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let (method, path, body) = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };

    if method.eq_ignore_ascii_case("POST") && path == "/api/chat" {
        let reply = {
            let mut st = state.lock().unwrap();
            if let Ok(json) = serde_json::from_slice(&body) {
                st.chat_requests.push(json);
            }
            st.replies.pop_front()
        };
        match reply {
            Some(Reply::Content(content)) => {
                let json = serde_json::json!({
                    "model": "mock",
                    "message": {"role": "assistant", "content": content},
                    "done": true
                });
                respond(&mut stream, 200, "application/json", json.to_string().as_bytes());
            }
            Some(Reply::Raw(raw)) => respond(&mut stream, 200, "application/json", raw.as_bytes()),
            Some(Reply::Status(code)) => respond(&mut stream, code, "text/plain", b""),
            None => respond(&mut stream, 500, "text/plain", b"no scripted reply"),
        }
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        state.lock().unwrap().page_hits += 1;
        respond(&mut stream, page.status, "text/html", page.body.as_bytes());
        return;
    }

    respond(&mut stream, 405, "text/plain", b"");
}

fn respond(stream: &mut TcpStream, code: u16, content_type: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        code,
        reason(code),
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

fn reason(code: u16) -> &'static str {
    match code {
        200 => "OK",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Status",
    }
}

/// Returns (method, path, body). Reads until the full Content-Length body arrived.
fn read_request(stream: &mut TcpStream) -> Option<(String, String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = std::str::from_utf8(&buf[..header_end]).ok()?.to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    Some((method, path, body))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
