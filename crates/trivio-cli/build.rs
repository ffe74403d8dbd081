//! Stamps `TRIVIO_VERSION` into the binary for `trivio --version`.
//!
//! Precedence: an explicit `TRIVIO_VERSION` in the build environment (for
//! packagers building from a tarball), then `git describe`, then the crate
//! version.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=TRIVIO_VERSION");
    // HEAD moves on checkout, refs/ on commit and tag
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let version = env::var("TRIVIO_VERSION")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(describe_checkout)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=TRIVIO_VERSION={}", version);
}

/// `git describe` output such as `0.3.1-4-gdeadbee-dirty`, without a leading `v`.
fn describe_checkout() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    if described.is_empty() {
        return None;
    }

    Some(described.trim_start_matches('v').to_string())
}
