use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics;
use crate::error::CoreError;

const POLL_SLICE: Duration = Duration::from_millis(20);

/// Tagged outcome of one decode: `{success: true, payload}` or
/// `{success: false, error}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeResponse {
    pub success: bool,
    pub payload: Option<Value>,
    pub error: Option<String>,
}

impl DecodeResponse {
    pub fn ok(payload: Value) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            error: Some(error.into()),
        }
    }

    pub fn into_result(self) -> Result<Value, CoreError> {
        match (self.success, self.payload) {
            (true, Some(payload)) => Ok(payload),
            (true, None) => Err(CoreError::Decode("decoder returned no payload".to_string())),
            (false, _) => Err(CoreError::Decode(
                self.error.unwrap_or_else(|| "unknown decode failure".to_string()),
            )),
        }
    }
}

pub fn decode_bytes(bytes: &[u8]) -> DecodeResponse {
    let decoded = String::from_utf8_lossy(bytes);
    let text: &str = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded);
    match serde_json::from_str::<Value>(text) {
        Ok(value) => DecodeResponse::ok(value),
        Err(err) => DecodeResponse::failed(err.to_string()),
    }
}

/// Runs decodes off the caller's thread. Only the most recent submission is
/// current; results of superseded jobs are dropped unread.
pub struct DecodeWorker {
    latest: Arc<AtomicU64>,
    log_dir: Option<PathBuf>,
}

pub struct DecodeJob {
    generation: u64,
    latest: Arc<AtomicU64>,
    rx: mpsc::Receiver<DecodeResponse>,
}

impl DecodeWorker {
    pub fn new(log_dir: Option<PathBuf>) -> Self {
        Self {
            latest: Arc::new(AtomicU64::new(0)),
            log_dir,
        }
    }

    pub fn submit(&self, bytes: Vec<u8>) -> DecodeJob {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = mpsc::channel();
        let log_dir = self.log_dir.clone();
        let spawned = thread::Builder::new()
            .name(format!("decode-{}", generation))
            .spawn(move || {
                let start = Instant::now();
                let response = decode_bytes(&bytes);
                log_timing(log_dir.as_ref(), generation, response.success, start.elapsed(), bytes.len());
                // receiver may already be gone if the job was superseded and dropped
                let _ = tx.send(response);
            });
        if let Err(err) = spawned {
            let (fallback_tx, fallback_rx) = mpsc::channel();
            let _ = fallback_tx.send(DecodeResponse::failed(format!("decode worker spawn failed: {}", err)));
            return DecodeJob {
                generation,
                latest: Arc::clone(&self.latest),
                rx: fallback_rx,
            };
        }
        DecodeJob {
            generation,
            latest: Arc::clone(&self.latest),
            rx,
        }
    }
}

impl Default for DecodeWorker {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DecodeJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    /// Blocks until the worker answers. `None` means a newer submission
    /// superseded this one, possibly while waiting.
    pub fn wait(self) -> Option<DecodeResponse> {
        self.poll(None)
    }

    pub fn wait_timeout(self, timeout: Duration) -> Option<DecodeResponse> {
        self.poll(Some(Instant::now() + timeout))
    }

    fn poll(self, deadline: Option<Instant>) -> Option<DecodeResponse> {
        loop {
            if !self.is_current() {
                return None;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Some(DecodeResponse::failed("decode timed out"));
                    }
                    left.min(POLL_SLICE)
                }
                None => POLL_SLICE,
            };
            match self.rx.recv_timeout(slice) {
                Ok(response) => return self.is_current().then_some(response),
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return self
                        .is_current()
                        .then(|| DecodeResponse::failed("decode worker exited without a result"));
                }
            }
        }
    }
}

fn log_timing(log_dir: Option<&PathBuf>, generation: u64, ok: bool, elapsed: Duration, bytes: usize) {
    let Some(log_dir) = log_dir else { return };
    let msg = format!(
        "job={} ok={} ms={} bytes={}",
        generation,
        ok as u8,
        elapsed.as_millis(),
        bytes
    );
    let _ = diagnostics::log_event(log_dir, "decode_timing", &msg);
}
