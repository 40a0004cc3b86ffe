//! Injects commit/timestamp metadata for the `--version` surface.
//!
//! Kept dependency-free; when git or date tooling is unavailable the values
//! fall back to stable "unknown" markers so builds stay reproducible.

use std::env;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=PARLEY_BUILD_GIT_HASH");
    println!("cargo:rerun-if-env-changed=PARLEY_BUILD_TIMESTAMP");

    let git_hash = env::var("PARLEY_BUILD_GIT_HASH")
        .ok()
        .or_else(|| capture("git", &["rev-parse", "--short=12", "HEAD"]))
        .unwrap_or_else(|| "unknown".to_string());
    let timestamp = env::var("PARLEY_BUILD_TIMESTAMP")
        .ok()
        .or_else(|| capture("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]))
        .unwrap_or_else(unix_fallback);

    println!("cargo:rustc-env=PARLEY_BUILD_GIT_HASH={git_hash}");
    println!("cargo:rustc-env=PARLEY_BUILD_TIMESTAMP={timestamp}");
}

fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn unix_fallback() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|delta| delta.as_secs())
        .unwrap_or(0);
    format!("unix:{secs}")
}
