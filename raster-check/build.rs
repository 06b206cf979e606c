//! Build identification for raster-check
//!
//! Exposed to the crate as `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE`;
//! shown in the startup banner and on `/health` so an operator can tell which
//! build produced a findings page.

use std::env;
use std::process::Command;

use chrono::{SecondsFormat, Utc};

const UNKNOWN: &str = "unknown";

fn main() {
    let build_info = [
        ("GIT_HASH", git_hash().unwrap_or_else(|| UNKNOWN.to_string())),
        ("BUILD_TIMESTAMP", Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        ("BUILD_PROFILE", env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string())),
    ];

    for (key, value) in build_info {
        println!("cargo:rustc-env={}={}", key, value);
    }
}

/// Short commit hash, marked `-dirty` when the work tree has local changes
fn git_hash() -> Option<String> {
    let hash = git(&["rev-parse", "--short=8", "HEAD"])?;
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .map(|status| !status.is_empty())
        .unwrap_or(false);

    Some(if dirty { format!("{}-dirty", hash) } else { hash })
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
}
