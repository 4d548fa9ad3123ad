//! Form engine shared by form pages, param prompts and preferences.

use std::collections::BTreeMap;

use sunbeam_protocol::{InputSpec, InputType, ParamValue};
use sunbeam_tui::core::style;
use sunbeam_tui::{
    lock_keybindings, pad_to_width, Checkbox, Component, Dropdown, Input, InputEvent,
    KeyAction, KeybindingsHandle, TextArea,
};

const TEXTAREA_HEIGHT: usize = 5;
const FIELD_INDENT: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    None,
    Submit(BTreeMap<String, ParamValue>),
    Cancel,
}

enum Widget {
    Text(Input),
    TextArea(TextArea),
    Checkbox(Checkbox),
    Select(Dropdown),
}

struct Field {
    spec: InputSpec,
    widget: Widget,
    invalid: bool,
}

impl Field {
    fn new(spec: InputSpec, keybindings: &KeybindingsHandle) -> Self {
        let default = spec.default.clone();
        let widget = match spec.kind {
            InputType::Text | InputType::Password | InputType::Number => {
                let mut input = Input::new(keybindings.clone());
                input.set_secure(spec.kind == InputType::Password);
                input.set_numeric(spec.kind == InputType::Number);
                if let Some(placeholder) = &spec.placeholder {
                    input.set_placeholder(placeholder.clone());
                }
                if let Some(default) = &default {
                    input.set_value(default.to_string());
                }
                Widget::Text(input)
            }
            InputType::TextArea => {
                let mut area = TextArea::new(keybindings.clone());
                if let Some(placeholder) = &spec.placeholder {
                    area.set_placeholder(placeholder.clone());
                }
                if let Some(default) = &default {
                    area.set_value(&default.to_string());
                }
                Widget::TextArea(area)
            }
            InputType::Checkbox => {
                let checked = default.as_ref().and_then(ParamValue::as_bool).unwrap_or(false);
                Widget::Checkbox(Checkbox::new(spec.label.clone().unwrap_or_default(), checked))
            }
            InputType::Select => {
                let titles = spec.options.iter().map(|option| option.title.clone()).collect();
                let mut dropdown = Dropdown::new(titles, keybindings.clone());
                if let Some(index) = default
                    .as_ref()
                    .and_then(|value| spec.options.iter().position(|option| &option.value == value))
                {
                    dropdown.select(index);
                }
                Widget::Select(dropdown)
            }
        };
        Self {
            spec,
            widget,
            invalid: false,
        }
    }

    fn value(&self) -> Option<ParamValue> {
        match &self.widget {
            Widget::Text(input) if input.value().is_empty() => None,
            Widget::Text(input) if self.spec.kind == InputType::Number => {
                ParamValue::parse_number(input.value())
            }
            Widget::Text(input) => Some(ParamValue::from(input.value())),
            Widget::TextArea(area) if area.is_empty() => None,
            Widget::TextArea(area) => Some(ParamValue::from(area.value())),
            Widget::Checkbox(checkbox) => Some(ParamValue::from(checkbox.checked())),
            Widget::Select(dropdown) => dropdown
                .value()
                .and_then(|index| self.spec.options.get(index))
                .map(|option| option.value.clone()),
        }
    }

    /// Required text left empty, or a number that does not parse.
    /// Checkboxes and selects never block submission.
    fn is_invalid(&self) -> bool {
        match &self.widget {
            Widget::Text(input) => {
                if input.value().is_empty() {
                    self.spec.required
                } else {
                    self.spec.kind == InputType::Number && self.value().is_none()
                }
            }
            Widget::TextArea(area) => self.spec.required && area.is_empty(),
            Widget::Checkbox(_) | Widget::Select(_) => false,
        }
    }

    fn component(&mut self) -> &mut dyn Component {
        match &mut self.widget {
            Widget::Text(input) => input,
            Widget::TextArea(area) => area,
            Widget::Checkbox(checkbox) => checkbox,
            Widget::Select(dropdown) => dropdown,
        }
    }

    fn set_focused(&mut self, focused: bool) {
        if let Some(focusable) = self.component().as_focusable() {
            focusable.set_focused(focused);
        }
    }

    fn render(&mut self, width: usize, focused: bool) -> Vec<String> {
        let marker = if focused { style::cyan(">") } else { " ".to_string() };
        let title = if focused {
            style::bold(&self.spec.title)
        } else {
            self.spec.title.clone()
        };
        let mut header = format!("{marker} {title}");
        if self.spec.required {
            header.push_str(&style::red(" *"));
        }
        if self.invalid {
            header.push_str(&style::red(" (required)"));
        }

        let inner = width.saturating_sub(FIELD_INDENT).max(1);
        if let Widget::TextArea(area) = &mut self.widget {
            area.set_viewport_size(inner, TEXTAREA_HEIGHT);
        }
        let indent = " ".repeat(FIELD_INDENT);
        let mut lines = vec![header];
        lines.extend(
            self.component()
                .render(inner)
                .into_iter()
                .map(|line| format!("{indent}{line}")),
        );
        lines
    }
}

/// Ordered fields with one focused at a time.
pub struct Form {
    fields: Vec<Field>,
    focus: usize,
    scroll: usize,
    keybindings: KeybindingsHandle,
}

impl Form {
    pub fn new(inputs: Vec<InputSpec>, keybindings: KeybindingsHandle) -> Self {
        let fields = inputs
            .into_iter()
            .map(|spec| Field::new(spec, &keybindings))
            .collect();
        let mut form = Self {
            fields,
            focus: 0,
            scroll: 0,
            keybindings,
        };
        form.focus_field(0);
        form
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.spec.name.as_str()).collect()
    }

    pub fn focused(&self) -> Option<&str> {
        self.fields.get(self.focus).map(|field| field.spec.name.as_str())
    }

    /// Current values. Empty text fields and unparsable numbers are left out.
    pub fn values(&self) -> BTreeMap<String, ParamValue> {
        self.fields
            .iter()
            .filter_map(|field| Some((field.spec.name.clone(), field.value()?)))
            .collect()
    }

    pub fn missing_required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.is_invalid())
            .map(|field| field.spec.name.as_str())
            .collect()
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> FormEvent {
        if self.fields.is_empty() {
            return match event.key_id() {
                Some(key_id) if self.matches(key_id, KeyAction::Cancel) => FormEvent::Cancel,
                Some(key_id)
                    if self.matches(key_id, KeyAction::Confirm)
                        || self.matches(key_id, KeyAction::SubmitForm) =>
                {
                    FormEvent::Submit(BTreeMap::new())
                }
                _ => FormEvent::None,
            };
        }

        if let Some(key_id) = event.key_id() {
            if self.matches(key_id, KeyAction::Cancel) {
                return FormEvent::Cancel;
            }
            if self.matches(key_id, KeyAction::SubmitForm) {
                return self.submit();
            }
            if self.matches(key_id, KeyAction::FocusNext) {
                self.focus_field((self.focus + 1) % self.fields.len());
                return FormEvent::None;
            }
            if self.matches(key_id, KeyAction::FocusPrevious) {
                let previous = (self.focus + self.fields.len() - 1) % self.fields.len();
                self.focus_field(previous);
                return FormEvent::None;
            }
            if self.matches(key_id, KeyAction::Confirm) {
                let field = &mut self.fields[self.focus];
                let advance = match &mut field.widget {
                    Widget::TextArea(area) => {
                        area.handle_event(event);
                        false
                    }
                    Widget::Checkbox(checkbox) => {
                        checkbox.toggle();
                        false
                    }
                    Widget::Select(dropdown) => !dropdown.update(event),
                    Widget::Text(_) => true,
                };
                if advance {
                    return self.advance();
                }
                self.revalidate_focused();
                return FormEvent::None;
            }
        }

        self.fields[self.focus].component().handle_event(event);
        self.revalidate_focused();
        FormEvent::None
    }

    /// Renders exactly `height` lines, scrolled so the focused field shows.
    pub fn render(&mut self, width: usize, height: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut focused_range = (0, 0);
        for (index, field) in self.fields.iter_mut().enumerate() {
            let start = lines.len();
            lines.extend(field.render(width, index == self.focus));
            if index == self.focus {
                focused_range = (start, lines.len());
            }
            lines.push(String::new());
        }

        let (start, end) = focused_range;
        if end > self.scroll + height {
            self.scroll = end.saturating_sub(height);
        }
        if start < self.scroll {
            self.scroll = start;
        }
        let mut visible: Vec<String> = lines
            .into_iter()
            .skip(self.scroll)
            .take(height)
            .map(|line| pad_to_width(&line, width))
            .collect();
        visible.resize(height, " ".repeat(width));
        visible
    }

    fn submit(&mut self) -> FormEvent {
        let mut first_invalid = None;
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.invalid = field.is_invalid();
            if field.invalid && first_invalid.is_none() {
                first_invalid = Some(index);
            }
        }
        if let Some(index) = first_invalid {
            self.focus_field(index);
            return FormEvent::None;
        }
        FormEvent::Submit(self.values())
    }

    fn advance(&mut self) -> FormEvent {
        if self.focus + 1 >= self.fields.len() {
            return self.submit();
        }
        self.focus_field(self.focus + 1);
        FormEvent::None
    }

    fn focus_field(&mut self, index: usize) {
        for (position, field) in self.fields.iter_mut().enumerate() {
            field.set_focused(position == index);
        }
        self.focus = index;
    }

    fn revalidate_focused(&mut self) {
        let field = &mut self.fields[self.focus];
        if field.invalid {
            field.invalid = field.is_invalid();
        }
    }

    fn matches(&self, key_id: &str, action: KeyAction) -> bool {
        lock_keybindings(&self.keybindings).matches(key_id, action)
    }
}
