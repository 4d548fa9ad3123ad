//! Validate-then-decode entry points.
//!
//! Tagged documents are decoded in two steps: the `type` discriminant is read
//! first, then the remaining fields are decoded into the matching variant.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ProtocolError, SchemaKind};
use crate::schema::SchemaValidator;
use crate::types::{Action, ActionType, Detail, Form, List, Manifest, Page};

pub fn decode_manifest(validator: &SchemaValidator, bytes: &[u8]) -> Result<Manifest, ProtocolError> {
    let value = validator.validate(SchemaKind::Manifest, bytes)?;
    serde_json::from_value(value).map_err(|source| ProtocolError::decode(SchemaKind::Manifest, source))
}

pub fn decode_page(validator: &SchemaValidator, bytes: &[u8]) -> Result<Page, ProtocolError> {
    let value = validator.validate(SchemaKind::Page, bytes)?;
    page_from_value(value)
}

/// Decodes the action a silent command printed.
pub fn decode_command(validator: &SchemaValidator, bytes: &[u8]) -> Result<Action, ProtocolError> {
    let value = validator.validate(SchemaKind::Command, bytes)?;
    command_from_value(value)
}

pub fn page_from_value(value: Value) -> Result<Page, ProtocolError> {
    let (tag, value) = split_tag(SchemaKind::Page, value)?;
    match tag.as_str() {
        "list" => variant::<List>(value).map(Page::List),
        "detail" => variant::<Detail>(value).map(Page::Detail),
        "form" => variant::<Form>(value).map(Page::Form),
        _ => Err(ProtocolError::UnknownType {
            kind: SchemaKind::Page,
            found: tag,
        }),
    }
}

pub fn command_from_value(value: Value) -> Result<Action, ProtocolError> {
    let tag = peek_tag(SchemaKind::Command, &value)?;
    if ActionType::parse(&tag).is_none() {
        return Err(ProtocolError::UnknownType {
            kind: SchemaKind::Command,
            found: tag,
        });
    }
    serde_json::from_value(value).map_err(|source| ProtocolError::decode(SchemaKind::Command, source))
}

fn peek_tag(kind: SchemaKind, value: &Value) -> Result<String, ProtocolError> {
    match value.get("type") {
        Some(Value::String(tag)) => Ok(tag.clone()),
        Some(other) => Err(ProtocolError::UnknownType {
            kind,
            found: other.to_string(),
        }),
        None => Err(ProtocolError::UnknownType {
            kind,
            found: String::new(),
        }),
    }
}

fn split_tag(kind: SchemaKind, mut value: Value) -> Result<(String, Value), ProtocolError> {
    let tag = peek_tag(kind, &value)?;
    if let Value::Object(map) = &mut value {
        map.remove("type");
        map.remove("$schema");
    }
    Ok((tag, value))
}

fn variant<T: DeserializeOwned>(value: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(value).map_err(|source| ProtocolError::decode(SchemaKind::Page, source))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{command_from_value, page_from_value};
    use crate::error::{ProtocolError, SchemaKind};
    use crate::types::{ActionType, Page};

    #[test]
    fn unknown_page_type_is_reported() {
        let error = page_from_value(json!({"type": "grid"})).expect_err("grid is not a page");
        match error {
            ProtocolError::UnknownType { kind, found } => {
                assert_eq!(kind, SchemaKind::Page);
                assert_eq!(found, "grid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn detail_variant_is_decoded() {
        let page = page_from_value(json!({"type": "detail", "text": "pong"})).expect("detail");
        match page {
            Page::Detail(detail) => assert_eq!(detail.text.as_deref(), Some("pong")),
            other => panic!("unexpected page: {other:?}"),
        }
    }

    #[test]
    fn missing_tag_is_unknown() {
        assert!(matches!(
            command_from_value(json!({"text": "x"})),
            Err(ProtocolError::UnknownType { .. })
        ));
    }

    #[test]
    fn command_keeps_its_type() {
        let action = command_from_value(json!({"type": "reload"})).expect("reload");
        assert_eq!(action.kind, ActionType::Reload);
    }
}
