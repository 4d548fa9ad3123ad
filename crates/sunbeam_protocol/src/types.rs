use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// Static description of an extension, produced once at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferences: Vec<InputSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub root: Vec<RootItem>,
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

impl Manifest {
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// Root items with titles resolved. Items naming an unknown command are
    /// skipped.
    #[must_use]
    pub fn root_items(&self) -> Vec<RootItem> {
        self.root
            .iter()
            .filter_map(|item| {
                let command = self.command(&item.command)?;
                Some(RootItem {
                    title: Some(
                        item.title
                            .clone()
                            .unwrap_or_else(|| command.title.clone()),
                    ),
                    command: item.command.clone(),
                    params: item.params.clone(),
                })
            })
            .collect()
    }
}

/// Entry point an extension offers on the root list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub command: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ActionParam>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<InputSpec>,
}

impl CommandSpec {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&InputSpec> {
        self.params.iter().find(|param| param.name == name)
    }
}

/// How the output of a command is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    List,
    Detail,
    Form,
    /// The command takes over the terminal.
    Tty,
    /// Runs in the background; may print a follow-up action.
    Silent,
}

impl Mode {
    /// Whether the command prints a page.
    #[must_use]
    pub fn is_page(self) -> bool {
        matches!(self, Self::List | Self::Detail | Self::Form)
    }
}

/// A field of a form: command param, extension preference or form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: InputType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl InputSpec {
    pub fn new(name: impl Into<String>, title: impl Into<String>, kind: InputType) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            kind,
            required: false,
            default: None,
            placeholder: None,
            label: None,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: ParamValue) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[serde(alias = "string")]
    Text,
    TextArea,
    Password,
    #[serde(alias = "boolean")]
    Checkbox,
    Number,
    Select,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub title: String,
    pub value: ParamValue,
}

/// Scalar value bound to a param or preference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Bool(bool),
    Number(Number),
}

impl ParamValue {
    /// Converts a JSON scalar. Arrays, objects and null are rejected.
    pub fn from_json(value: Value) -> Result<Self, String> {
        match value {
            Value::String(text) => Ok(Self::String(text)),
            Value::Bool(flag) => Ok(Self::Bool(flag)),
            Value::Number(number) => Ok(Self::Number(number)),
            other => Err(format!("expected a string, boolean or number, got {other}")),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(text) => Value::String(text.clone()),
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => Value::Number(number.clone()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Parses user-entered text as a JSON number.
    #[must_use]
    pub fn parse_number(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if let Ok(integer) = trimmed.parse::<i64>() {
            return Some(Self::Number(Number::from(integer)));
        }
        let float = trimmed.parse::<f64>().ok()?;
        Number::from_f64(float).map(Self::Number)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(text) => f.write_str(text),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(D::Error::custom)
    }
}

/// A param attached to an action or root item: either a bound value or an
/// input the user still has to provide.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionParam {
    Value(ParamValue),
    Input {
        default: Option<ParamValue>,
        required: bool,
    },
}

impl ActionParam {
    #[must_use]
    pub fn value(&self) -> Option<&ParamValue> {
        match self {
            Self::Value(value) => Some(value),
            Self::Input { .. } => None,
        }
    }
}

impl From<ParamValue> for ActionParam {
    fn from(value: ParamValue) -> Self {
        Self::Value(value)
    }
}

impl Serialize for ActionParam {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Input { default, required } => {
                let mut map = serde_json::Map::new();
                if let Some(default) = default {
                    map.insert("default".to_string(), default.to_json());
                }
                if *required {
                    map.insert("required".to_string(), Value::Bool(true));
                }
                Value::Object(map).serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ActionParam {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(mut map) => {
                let default = map
                    .remove("default")
                    .filter(|value| !value.is_null())
                    .map(ParamValue::from_json)
                    .transpose()
                    .map_err(D::Error::custom)?;
                let required = match map.remove("required") {
                    None | Some(Value::Null) => false,
                    Some(Value::Bool(flag)) => flag,
                    Some(other) => {
                        return Err(D::Error::custom(format!(
                            "param `required` must be a boolean, got {other}"
                        )))
                    }
                };
                Ok(Self::Input { default, required })
            }
            scalar => ParamValue::from_json(scalar)
                .map(Self::Value)
                .map_err(D::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Run,
    Open,
    Copy,
    Reload,
    Edit,
    Exec,
    Exit,
    Config,
    Push,
}

impl ActionType {
    pub const ALL: [ActionType; 9] = [
        ActionType::Run,
        ActionType::Open,
        ActionType::Copy,
        ActionType::Reload,
        ActionType::Edit,
        ActionType::Exec,
        ActionType::Exit,
        ActionType::Config,
        ActionType::Push,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Open => "open",
            Self::Copy => "copy",
            Self::Reload => "reload",
            Self::Edit => "edit",
            Self::Exec => "exec",
            Self::Exit => "exit",
            Self::Config => "config",
            Self::Push => "push",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    fn default_title(self) -> &'static str {
        match self {
            Self::Run => "Run",
            Self::Open => "Open",
            Self::Copy => "Copy",
            Self::Reload => "Reload",
            Self::Edit => "Edit",
            Self::Exec => "Execute",
            Self::Exit => "Exit",
            Self::Config => "Configure",
            Self::Push => "Open Page",
        }
    }
}

/// Application override for `open` actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Single character bound to `alt+<key>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ActionParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<App>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exit: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reload: bool,
}

impl Action {
    pub fn new(kind: ActionType) -> Self {
        Self {
            kind,
            title: None,
            key: None,
            text: None,
            url: None,
            path: None,
            command: None,
            extension: None,
            params: BTreeMap::new(),
            app: None,
            dir: None,
            exit: false,
            reload: false,
        }
    }

    pub fn copy(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(ActionType::Copy)
        }
    }

    pub fn run(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::new(ActionType::Run)
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| self.kind.default_title().to_string())
    }

    /// Names of params still waiting for user input.
    #[must_use]
    pub fn unresolved_inputs(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(_, param)| param.value().is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Page an extension command prints, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Page {
    List(List),
    Detail(Detail),
    Form(Form),
}

impl Page {
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::List(list) => list.title.as_deref(),
            Self::Detail(detail) => detail.title.as_deref(),
            Self::Form(form) => form.title.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub items: Vec<ListItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_view: Option<EmptyView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    /// The extension filters items itself; query changes re-run the command.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dynamic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl ListItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            subtitle: None,
            accessories: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Stable identity; defaults to the title.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.title)
    }

    /// Text the fuzzy filter scores against.
    #[must_use]
    pub fn filter_value(&self) -> String {
        match self.subtitle.as_deref() {
            Some(subtitle) if !subtitle.is_empty() => format!("{} {subtitle}", self.title),
            _ => self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmptyView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    /// Highlights `text` as source code in this language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_action: Option<Action>,
}

/// Body sent to an extension when one of its commands runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub command: String,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub preferences: BTreeMap<String, ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub cwd: String,
}

impl Payload {
    pub fn new(command: impl Into<String>, cwd: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: BTreeMap::new(),
            preferences: BTreeMap::new(),
            query: None,
            cwd: cwd.into(),
        }
    }
}
