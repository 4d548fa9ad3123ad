#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;

use extension_client::{ClientConfig, Extension, ExtensionClient, Origin};
use sunbeam::page::{Followup, HandOff, HostOps, Job, PageId};
use sunbeam::Registry;
use sunbeam_protocol::{Manifest, SchemaValidator};
use tempfile::TempDir;

/// Records what the paginator asked the host to do.
#[derive(Default)]
pub struct HostSpy {
    pub jobs: Vec<(PageId, Job)>,
    pub hand_offs: Vec<(PageId, HandOff, Followup)>,
}

impl HostSpy {
    pub fn job_names(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|(_, job)| job.name()).collect()
    }

    /// Removes and returns the oldest recorded job.
    pub fn take_job(&mut self) -> (PageId, Job) {
        assert!(!self.jobs.is_empty(), "expected a spawned job");
        self.jobs.remove(0)
    }
}

impl HostOps for HostSpy {
    fn spawn(&mut self, target: PageId, job: Job) {
        self.jobs.push((target, job));
    }

    fn hand_off(&mut self, target: PageId, request: HandOff, followup: Followup) {
        self.hand_offs.push((target, request, followup));
    }
}

pub fn client() -> Arc<ExtensionClient> {
    let validator = Arc::new(SchemaValidator::new().expect("schemas compile"));
    Arc::new(ExtensionClient::new(ClientConfig::new(), validator).expect("client builds"))
}

pub fn manifest(json: serde_json::Value) -> Manifest {
    serde_json::from_value(json).expect("manifest should deserialize")
}

/// Extension whose entrypoint is never executed.
pub fn extension(alias: &str, manifest: Manifest) -> Extension {
    Extension::new(
        client(),
        alias,
        Origin::File(PathBuf::from("/nonexistent/extension")),
        manifest,
        BTreeMap::new(),
    )
}

pub fn registry(extensions: Vec<Extension>) -> Registry {
    let mut registry = Registry::new();
    for extension in extensions {
        registry.insert(extension);
    }
    registry
}

/// Manifest with one command per mode, plus commands that need a param.
pub fn demo_manifest() -> Manifest {
    manifest(serde_json::json!({
        "title": "Demo",
        "root": [
            {"command": "show"},
            {"command": "notify"}
        ],
        "commands": [
            {"name": "show", "title": "Show", "mode": "detail"},
            {"name": "notify", "title": "Notify", "mode": "silent"},
            {"name": "items", "title": "Items", "mode": "list"},
            {
                "name": "greet",
                "title": "Greet",
                "mode": "detail",
                "params": [{"name": "name", "title": "Name", "type": "text", "required": true}]
            },
            {
                "name": "save",
                "title": "Save",
                "mode": "silent",
                "params": [{"name": "p", "title": "P", "type": "text", "required": true}]
            },
            {
                "name": "term",
                "title": "Term",
                "mode": "tty",
                "params": [{"name": "p", "title": "P", "type": "text", "required": true}]
            }
        ]
    }))
}

/// Writes an executable shell script and returns its path.
pub fn script(body: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("extension.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}")).expect("script should be written");
    let mut permissions = fs::metadata(&path).expect("metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).expect("script should be executable");
    (dir, path)
}

pub const PING_EXTENSION: &str = r#"
if [ $# -eq 0 ]; then
  cat <<'JSON'
{"title": "Ping", "root": [{"command": "ping"}], "commands": [
  {"name": "ping", "title": "Ping", "mode": "detail"}
]}
JSON
  exit 0
fi
cat >/dev/null
echo '{"type": "detail", "text": "pong"}'
"#;

pub fn plain(lines: &[String]) -> String {
    sunbeam_tui::strip_ansi(&lines.join("\n"))
}
