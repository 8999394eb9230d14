//! Native-messaging host manifest lookup
//!
//! The VM-opener helper is registered the same way browsers register native
//! hosts: a `<name>.json` manifest whose `path` field points at the
//! executable. Resolution checks the per-user location first, then the
//! system-wide ones.

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subset of the native-messaging host manifest this process needs
#[derive(Debug, Deserialize)]
struct HostManifest {
    #[serde(default)]
    name: Option<String>,
    path: PathBuf,
}

/// Directories searched for host manifests, in priority order
fn manifest_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(base) = BaseDirs::new() {
        dirs.push(base.home_dir().join(".mozilla/native-messaging-hosts"));
    }
    dirs.push(PathBuf::from("/usr/lib/mozilla/native-messaging-hosts"));
    dirs.push(PathBuf::from("/etc/opt/mozilla/native-messaging-hosts"));
    dirs
}

/// Resolve the helper executable registered under `name`.
pub fn resolve_host_path(name: &str) -> Result<PathBuf> {
    for dir in manifest_search_dirs() {
        let manifest_path = dir.join(format!("{}.json", name));
        if manifest_path.exists() {
            debug!("Using host manifest {}", manifest_path.display());
            return parse_manifest(&manifest_path, name);
        }
    }
    bail!("no native-messaging host manifest found for {:?}", name)
}

fn parse_manifest(manifest_path: &Path, expected_name: &str) -> Result<PathBuf> {
    let content = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("Failed to read host manifest: {:?}", manifest_path))?;
    let manifest: HostManifest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse host manifest: {:?}", manifest_path))?;

    if let Some(name) = &manifest.name {
        if name != expected_name {
            bail!(
                "host manifest {:?} is registered as {:?}, expected {:?}",
                manifest_path,
                name,
                expected_name
            );
        }
    }

    Ok(manifest.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(format!("{}.json", name));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_parse_manifest_path() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(
            dir.path(),
            "qubes_dvm_opener",
            r#"{"name": "qubes_dvm_opener", "path": "/usr/local/bin/helper", "type": "stdio"}"#,
        );

        let path = parse_manifest(&manifest, "qubes_dvm_opener").unwrap();
        assert_eq!(path, PathBuf::from("/usr/local/bin/helper"));
    }

    #[test]
    fn test_parse_manifest_name_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(
            dir.path(),
            "qubes_dvm_opener",
            r#"{"name": "something_else", "path": "/bin/helper"}"#,
        );

        assert!(parse_manifest(&manifest, "qubes_dvm_opener").is_err());
    }

    #[test]
    fn test_parse_manifest_without_name_field() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), "host", r#"{"path": "/bin/helper"}"#);

        let path = parse_manifest(&manifest, "host").unwrap();
        assert_eq!(path, PathBuf::from("/bin/helper"));
    }
}
