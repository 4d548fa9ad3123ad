//! `${...}` placeholder expansion for action fields.

use std::collections::BTreeMap;

use sunbeam_protocol::ParamValue;

/// Values visible to placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    /// Form values, referenced as `${input:name}`.
    pub inputs: BTreeMap<String, ParamValue>,
    /// Current list query, referenced as `${query}`.
    pub query: Option<String>,
}

impl Scope {
    pub fn with_inputs(inputs: BTreeMap<String, ParamValue>) -> Self {
        Self {
            inputs,
            query: None,
        }
    }
}

/// Replaces `${env:NAME}`, `${input:name}` and `${query}` in `template`.
///
/// Missing environment variables expand to an empty string. Placeholders that
/// name nothing known are left as written. With `shell_escape`, every
/// substituted value is quoted for `sh`.
pub fn expand(template: &str, scope: &Scope, shell_escape: bool) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match lookup(key, scope) {
            Some(value) if shell_escape => out.push_str(&shell_words::quote(&value)),
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn lookup(key: &str, scope: &Scope) -> Option<String> {
    if key == "query" {
        return Some(scope.query.clone().unwrap_or_default());
    }
    if let Some(name) = key.strip_prefix("env:") {
        return Some(std::env::var(name).unwrap_or_default());
    }
    if let Some(name) = key.strip_prefix("input:") {
        return scope.inputs.get(name).map(ParamValue::to_string);
    }
    None
}
