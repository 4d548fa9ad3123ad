#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;

use extension_client::{ClientConfig, ExtensionClient};
use sunbeam_protocol::SchemaValidator;
use tempfile::TempDir;

pub fn client() -> Arc<ExtensionClient> {
    let validator = Arc::new(SchemaValidator::new().expect("schemas compile"));
    Arc::new(ExtensionClient::new(ClientConfig::new(), validator).expect("client builds"))
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
{"title": "Ping", "preferences": [{"name": "greeting", "title": "Greeting", "type": "text", "default": "hi"}], "root": [{"command": "ping"}], "commands": [
  {"name": "ping", "title": "Ping", "mode": "detail", "params": [{"name": "count", "title": "Count", "type": "number", "default": 1}]},
  {"name": "echo", "title": "Echo", "mode": "detail", "params": [{"name": "word", "title": "Word", "type": "text", "required": true}]},
  {"name": "fail", "title": "Fail", "mode": "silent"},
  {"name": "env", "title": "Env", "mode": "detail"}
]}
JSON
  exit 0
fi
case "$1" in
  ping)
    cat >/dev/null
    echo '{"type": "detail", "text": "pong"}'
    ;;
  echo)
    cat
    ;;
  fail)
    printf '\033[31mboom\033[0m\n' >&2
    exit 3
    ;;
  env)
    printf '{"type": "detail", "text": "%s %s %s"}' "$SUNBEAM" "$NO_COLOR" "$(basename "$PWD")"
    ;;
esac
"#;
