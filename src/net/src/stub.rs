//! Test doubles: a canned-response HTTP listener standing in for the
//! Mojang services, and frame helpers for scripted protocol servers.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use lodestone_proto::codec::{ReadableCodec, WritableCodec};
use lodestone_proto::io::{Readable, Writable};

pub(crate) struct StubService {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl StubService {
    /// Serves `(path, status, body)` routes, one request per connection,
    /// recording the request paths in arrival order.
    pub(crate) async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };

                respond(stream, &routes, &log).await;
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub(crate) fn base(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(
    mut stream: TcpStream,
    routes: &[(&'static str, u16, &'static str)],
    log: &Arc<Mutex<Vec<String>>>,
) {
    let mut buf = Vec::new();
    let mut tmp = [0; 1024];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }

        let Ok(n) = stream.read(&mut tmp).await else {
            return;
        };
        if n == 0 {
            return;
        }

        buf.extend_from_slice(&tmp[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head.split_whitespace().nth(1).unwrap_or("").to_owned();

    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if !name.eq_ignore_ascii_case("content-length") {
                return None;
            }

            value.trim().parse::<usize>().ok()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let Ok(n) = stream.read(&mut tmp).await else {
            return;
        };
        if n == 0 {
            break;
        }

        buf.extend_from_slice(&tmp[..n]);
    }

    log.lock().unwrap().push(path.clone());

    let (status, body) = routes
        .iter()
        .find(|(route, ..)| *route == path)
        .map(|(_, status, body)| (*status, *body))
        .unwrap_or((404, ""));

    let reason = match status {
        200 => "OK",
        204 => "No Content",
        403 => "Forbidden",
        500 => "Internal Server Error",
        _ => "Not Found",
    };

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body,
    );

    stream.write_all(response.as_bytes()).await.ok();
    stream.shutdown().await.ok();
}

/// Reads whole frames off `stream` until one decodes as `R`.
pub(crate) async fn read_frame<R: Readable>(stream: &mut TcpStream, codec: &mut ReadableCodec) -> R {
    let mut tmp = [0; 1024];

    loop {
        if let Some(packet) = codec.next::<R>().unwrap() {
            return packet;
        }

        let n = stream.read(&mut tmp).await.unwrap();
        assert!(n > 0, "stream ended inside a frame");

        codec.append(&tmp[..n]);
    }
}

pub(crate) async fn write_frame(
    stream: &mut TcpStream,
    codec: &mut WritableCodec,
    packet: &impl Writable,
) {
    let mut frame = Vec::new();
    codec.write(packet, &mut frame).unwrap();

    stream.write_all(&frame).await.unwrap();
}
