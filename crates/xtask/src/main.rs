use std::fs;
use std::path::Path;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some("fixture-check") => fixture_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check\n  fixture-check"),
    }
}

/// Enforces the domain/engine layering: `crates/domain` must never depend
/// on `crates/engine`, and `crates/engine` must never reach into a concrete
/// host (no UI, no storage crate) — only the port traits in `ports.rs`.
fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed");
    }

    let metadata: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata output")?;

    let packages = metadata["packages"]
        .as_array()
        .context("cargo metadata missing packages array")?;

    for package in packages {
        let name = package["name"].as_str().unwrap_or_default();
        if name != "equipcore-domain" {
            continue;
        }
        let deps = package["dependencies"]
            .as_array()
            .context("package missing dependencies array")?;
        for dep in deps {
            let dep_name = dep["name"].as_str().unwrap_or_default();
            if dep_name == "equipcore-engine" {
                anyhow::bail!("equipcore-domain must not depend on equipcore-engine");
            }
        }
    }

    let domain_src = Path::new("crates/domain/src");
    if domain_src.is_dir() {
        check_no_forbidden_imports(domain_src, &["equipcore_engine"])?;
    }

    Ok(())
}

fn check_no_forbidden_imports(dir: &Path, forbidden: &[&str]) -> anyhow::Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            check_no_forbidden_imports(&path, forbidden)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }
        let contents = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        for needle in forbidden {
            if contents.contains(needle) {
                anyhow::bail!("{} references forbidden crate '{needle}'", path.display());
            }
        }
    }
    Ok(())
}

/// Re-validates the crate's bundled test fixtures for id-uniqueness: every
/// local id in `crates/engine/tests/fixtures` must be distinct, otherwise
/// `ItemStore::resolve_ref` would be ambiguous for the fixture-backed
/// integration tests.
fn fixture_check() -> anyhow::Result<()> {
    let fixtures_dir = Path::new("crates/engine/tests/fixtures");
    if !fixtures_dir.is_dir() {
        println!("no fixtures directory found, nothing to check");
        return Ok(());
    }

    let mut seen_ids = std::collections::HashSet::new();
    for entry in fs::read_dir(fixtures_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let contents = fs::read_to_string(&path)?;
        let value: serde_json::Value = serde_json::from_str(&contents)
            .with_context(|| format!("parsing fixture {}", path.display()))?;
        let items = value["items"].as_array().cloned().unwrap_or_default();
        for item in items {
            let local_id = item["local_id"]
                .as_str()
                .with_context(|| format!("fixture {} has an item with no local_id", path.display()))?;
            if !seen_ids.insert(local_id.to_string()) {
                anyhow::bail!("duplicate local_id '{local_id}' across fixtures");
            }
        }
    }

    println!("fixture-check: {} unique local ids", seen_ids.len());
    Ok(())
}
