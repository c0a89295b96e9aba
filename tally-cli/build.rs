//! Stamps the binary with a build identifier for `tally --version`.
//!
//! `TALLY_BUILD_SHA` set in the environment wins (release tarballs have no
//! `.git`); otherwise `git describe` of the checkout, else "unknown".

use std::env;
use std::path::Path;
use std::process::Command;

const VAR: &str = "TALLY_BUILD_SHA";

fn describe(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let id = String::from_utf8(out.stdout).ok()?;
    let id = id.trim();
    (!id.is_empty()).then(|| id.to_string())
}

fn main() {
    println!("cargo:rerun-if-env-changed={VAR}");

    let manifest = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into());
    let workspace = Path::new(&manifest).join("..");
    let head = workspace.join(".git").join("HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }

    let build_id = env::var(VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| describe(&workspace))
        .unwrap_or_else(|| "unknown".into());

    println!("cargo:rustc-env={VAR}={build_id}");
}
