//! One-shot HTTP server that writes its body as separate chunked-encoding
//! frames, each after its own delay.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub struct Frame {
    pub bytes: Vec<u8>,
    pub delay: Duration,
}

impl Frame {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into(), delay: Duration::from_millis(50) }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Splits `body` into two frames right after the first byte of `marker`.
pub fn split_inside(body: &str, marker: char) -> Vec<Frame> {
    let at = body.find(marker).expect("marker present") + 1;
    vec![Frame::new(&body.as_bytes()[..at]), Frame::new(&body.as_bytes()[at..])]
}

/// Serves a single request and returns the server's base URL.
pub async fn serve_frames(content_type: &'static str, frames: Vec<Frame>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else { return };
        read_request(&mut socket).await;
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: {content_type}\r\n\
             transfer-encoding: chunked\r\nconnection: close\r\n\r\n"
        );
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        for frame in frames {
            tokio::time::sleep(frame.delay).await;
            let mut out = format!("{:x}\r\n", frame.bytes.len()).into_bytes();
            out.extend_from_slice(&frame.bytes);
            out.extend_from_slice(b"\r\n");
            if socket.write_all(&out).await.is_err() || socket.flush().await.is_err() {
                return;
            }
        }
        let _ = socket.write_all(b"0\r\n\r\n").await;
    });
    format!("http://{addr}")
}

async fn read_request(socket: &mut TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);
        let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else { continue };
        let head = String::from_utf8_lossy(&data[..end]).to_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if data.len() >= end + 4 + length {
            return;
        }
    }
}
