//! Stamps the binary with where and when it was built
//!
//! `GIT_HASH` falls back to "unknown" outside a checkout (e.g. a crates.io
//! tarball). `BUILD_ID` joins hash, UTC time and profile for `/health`.

use std::path::Path;
use std::process::Command;

/// Run git in the crate directory, trimmed stdout on success
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    let git_hash = git(&["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| "unknown".into());
    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".into());

    for (key, value) in [
        ("GIT_HASH", git_hash.clone()),
        ("BUILD_TIMESTAMP", built_at.clone()),
        ("BUILD_PROFILE", profile.clone()),
        ("BUILD_ID", format!("{git_hash} {built_at} {profile}")),
    ] {
        println!("cargo:rustc-env={key}={value}");
    }

    // Re-stamp when the checked-out commit moves
    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
        for watched in ["HEAD", "refs/heads"] {
            let path = Path::new(&git_dir).join(watched);
            if path.exists() {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }
    }
    println!("cargo:rerun-if-changed=build.rs");
}
