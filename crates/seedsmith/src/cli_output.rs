//! Centralised helpers for CLI output.
//!
//! Machine-readable results go to stdout as one JSON document; anything meant for a human
//! operator goes to stderr.

use serde::Serialize;
use std::io::{IsTerminal as _, Write as _};

fn stderr_writeln(s: &str) {
    let mut stderr = std::io::stderr().lock();
    if stderr.write_all(s.as_bytes()).is_err() {
        return;
    }
    if stderr.write_all(b"\n").is_err() {
        return;
    }
    let _flush = stderr.flush();
}

/// Write `v` as a single JSON line on stdout.
pub fn print_json<T: Serialize>(v: &T) -> eyre::Result<()> {
    let s = serde_json::to_string(v)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(s.as_bytes())?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}

fn banner_enabled() -> bool {
    // Only when a human is watching stderr, unless forced via env.
    match std::env::var("SEEDSMITH_BANNER") {
        Ok(v) => {
            let v = v.trim().to_ascii_lowercase();
            !(v.is_empty() || v == "0" || v == "false" || v == "no" || v == "off")
        }
        Err(_) => std::io::stderr().is_terminal(),
    }
}

/// Print the `new` session banner to stderr. Never includes secrets.
pub fn print_session_banner(version: &str, network_title: &str, protocol: &str) {
    if !banner_enabled() {
        return;
    }
    stderr_writeln(&format!(
        "Seedsmith\n=========\nVersion : v{version}\nNetwork : {network_title} ({protocol})\n\nOne JSON event per line on stdin, e.g. {{\"event\":\"generate\"}}. Send {{\"event\":\"next\"}} to finish."
    ));
}

/// Tell the operator the draft left the session without being handed off.
pub fn print_draft_abandoned() {
    if banner_enabled() {
        stderr_writeln("Seedsmith: draft abandoned; nothing was kept.");
    }
}
