use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

const MAX_LOG_BYTES: u64 = 1_500_000;
const LOG_FILE: &str = "diagnostics.log";
const MIN_REDACTED_DIGITS: usize = 10;
const ID_KEYS: [&str; 2] = ["load", "source"];

#[derive(Debug, Serialize)]
pub struct LogEvent {
    pub ts: String,
    pub kind: String,
    pub message: String,
}

fn sanitize(input: &str) -> String {
    let mut out = input.to_string();
    // paths can carry account names
    for prefix in ["/Users/", "/home/", "/var/", "/private/", "C:\\", "D:\\"] {
        if let Some(idx) = out.find(prefix) {
            out.replace_range(idx.., "[redacted]");
            break;
        }
    }
    // phone numbers and numeric participant ids; load ids and hashes pass
    out.split_whitespace()
        .map(|token| {
            if is_id_field(token) || longest_digit_run(token) < MIN_REDACTED_DIGITS {
                token.to_string()
            } else {
                "[redacted]".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn longest_digit_run(token: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for c in token.chars() {
        if c.is_ascii_digit() {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

fn is_id_field(token: &str) -> bool {
    match token.split_once('=') {
        Some((key, value)) => {
            ID_KEYS.contains(&key)
                && !value.is_empty()
                && value.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
        }
        None => false,
    }
}

pub fn log_event(log_dir: &Path, kind: &str, message: &str) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    trim_log(&path)?;
    let event = LogEvent {
        ts: Utc::now().to_rfc3339(),
        kind: kind.to_string(),
        message: sanitize(message),
    };
    let line = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}

/// No-op unless the host configured a log directory.
pub fn maybe_log(log_dir: Option<&Path>, kind: &str, message: &str) {
    if let Some(dir) = log_dir {
        let _ = log_event(dir, kind, message);
    }
}

fn trim_log(path: &Path) -> io::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if fs::metadata(path)?.len() <= MAX_LOG_BYTES {
        return Ok(());
    }
    let data = fs::read(path)?;
    let mut keep_from = data.len().saturating_sub((MAX_LOG_BYTES / 2) as usize);
    // restart on a line boundary
    if let Some(offset) = data[keep_from..].iter().position(|b| *b == b'\n') {
        keep_from += offset + 1;
    }
    fs::write(path, &data[keep_from..])?;
    Ok(())
}
