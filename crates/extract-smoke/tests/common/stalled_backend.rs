//! A backend that accepts connections and never answers.
//!
//! Each connection's request line is recorded, then the socket is held open
//! without a reply until the handle is dropped.

use std::io::{ErrorKind, Read};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub struct StalledBackend {
    base_url: String,
    shutdown: Arc<AtomicBool>,
    join: Option<thread::JoinHandle<()>>,
    request_lines: Arc<Mutex<Vec<String>>>,
}

impl StalledBackend {
    pub fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("stalled bind failed");
        listener
            .set_nonblocking(true)
            .expect("stalled listener nonblocking failed");
        let addr = listener.local_addr().expect("stalled local addr failed");

        let shutdown = Arc::new(AtomicBool::new(false));
        let request_lines = Arc::new(Mutex::new(Vec::new()));
        let join = {
            let shutdown = Arc::clone(&shutdown);
            let request_lines = Arc::clone(&request_lines);
            thread::spawn(move || accept_loop(listener, shutdown, request_lines))
        };

        Self {
            base_url: format!("http://{}", addr),
            shutdown,
            join: Some(join),
            request_lines,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.request_lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn upload_count(&self) -> usize {
        self.request_lines()
            .iter()
            .filter(|line| line.starts_with("POST /upload"))
            .count()
    }

    pub fn process_count(&self) -> usize {
        self.request_lines()
            .iter()
            .filter(|line| line.starts_with("POST /process"))
            .count()
    }
}

fn accept_loop(
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    request_lines: Arc<Mutex<Vec<String>>>,
) {
    // Held open, unanswered, until shutdown.
    let mut held: Vec<TcpStream> = Vec::new();

    while !shutdown.load(Ordering::Acquire) {
        match listener.accept() {
            Ok((mut stream, _)) => {
                let _ = stream.set_nonblocking(false);
                let _ = stream.set_read_timeout(Some(Duration::from_millis(500)));
                let mut buf = [0u8; 1024];
                if let Ok(n) = stream.read(&mut buf) {
                    let text = String::from_utf8_lossy(&buf[..n]);
                    if let Some(line) = text.lines().next() {
                        if let Ok(mut lines) = request_lines.lock() {
                            lines.push(line.to_string());
                        }
                    }
                }
                held.push(stream);
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(_) => break,
        }
    }
}

impl Drop for StalledBackend {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
