//! Unit tests for plugin manifests.

use std::path::PathBuf;

use rstest::rstest;
use tempfile::TempDir;

use super::*;

fn make_manifest() -> PluginManifest {
    PluginManifest::new("rename", "Rename", PathBuf::from("/usr/bin/go-rename"))
}

#[test]
fn new_manifest_has_defaults() {
    let manifest = make_manifest();
    assert_eq!(manifest.short_name(), "rename");
    assert_eq!(manifest.executable(), PathBuf::from("/usr/bin/go-rename"));
    assert!(manifest.args().is_empty());
    assert!(manifest.timeout_secs().is_none());
    assert!(manifest.description().params.is_empty());
}

#[test]
fn builders_override_fields() {
    let manifest = make_manifest()
        .with_args(vec!["--json".into()])
        .with_timeout_secs(5)
        .with_params(vec![Parameter {
            label: "New Name:".into(),
            prompt: "What to rename this identifier to.".into(),
            default: serde_json::Value::String(String::new()),
        }]);
    assert_eq!(manifest.args(), &["--json"]);
    assert_eq!(manifest.timeout_secs(), Some(5));
    assert_eq!(manifest.description().params.len(), 1);
}

#[rstest]
#[case::blank_short_name(PluginManifest::new(" ", "Rename", PathBuf::from("/bin/x")), "short name")]
#[case::blank_name(PluginManifest::new("rename", "", PathBuf::from("/bin/x")), "display name")]
#[case::relative_executable(PluginManifest::new("rename", "Rename", PathBuf::from("bin/x")), "absolute")]
fn validate_rejects_malformed_manifests(#[case] manifest: PluginManifest, #[case] fragment: &str) {
    let error = manifest.validate().expect_err("invalid manifest");
    assert!(matches!(error, EngineError::Manifest { .. }));
    assert!(error.to_string().contains(fragment), "got: {error}");
}

#[test]
fn load_manifests_reads_json_array() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("plugins.json");
    std::fs::write(
        &path,
        r#"[
            {
                "short_name": "rename",
                "name": "Rename",
                "executable": "/usr/bin/go-rename",
                "params": [{"label": "New Name:", "prompt": "New identifier", "default": ""}]
            },
            {"short_name": "extract", "name": "Extract Function", "executable": "/usr/bin/go-extract", "timeout_secs": 10}
        ]"#,
    )
    .expect("write manifest");

    let manifests = load_manifests(&path).expect("load");
    assert_eq!(manifests.len(), 2);
    assert_eq!(manifests.first().map(PluginManifest::short_name), Some("rename"));
    assert_eq!(manifests.get(1).and_then(PluginManifest::timeout_secs), Some(10));
}

#[test]
fn load_manifests_reports_missing_file() {
    let error = load_manifests(Path::new("/nonexistent/plugins.json")).expect_err("missing");
    assert!(matches!(error, EngineError::ManifestRead { .. }));
}

#[test]
fn load_manifests_reports_malformed_json() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("plugins.json");
    std::fs::write(&path, "{not json").expect("write");
    let error = load_manifests(&path).expect_err("malformed");
    assert!(matches!(error, EngineError::ManifestParse { .. }));
}

#[test]
fn load_manifests_validates_entries() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("plugins.json");
    std::fs::write(
        &path,
        r#"[{"short_name": "rename", "name": "Rename", "executable": "relative/bin"}]"#,
    )
    .expect("write");
    let error = load_manifests(&path).expect_err("invalid");
    assert!(matches!(error, EngineError::Manifest { .. }));
}
