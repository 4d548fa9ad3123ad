//! Wire contract between the launcher and its extensions.
//!
//! Extensions describe themselves with a [`Manifest`], print a [`Page`] when a
//! page command runs, and may print a single [`Action`] from a silent command.
//! Every document is checked against an embedded JSON Schema before typed
//! decoding, so a malformed extension surfaces as a [`ProtocolError`] with the
//! location of the offending value.

mod decode;
mod error;
mod schema;
mod types;

pub use decode::{command_from_value, decode_command, decode_manifest, decode_page, page_from_value};
pub use error::{ProtocolError, SchemaError, SchemaKind};
pub use schema::SchemaValidator;
pub use types::{
    Action, ActionParam, ActionType, App, CommandSpec, Detail, EmptyView, Form, InputSpec,
    InputType, List, ListItem, Manifest, Mode, Page, ParamValue, Payload, RootItem, SelectOption,
};
