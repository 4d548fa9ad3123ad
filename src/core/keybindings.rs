//! Launcher keybindings.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use crate::core::keys::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorWordLeft,
    CursorWordRight,
    CursorLineStart,
    CursorLineEnd,
    DeleteCharBackward,
    DeleteCharForward,
    DeleteWordBackward,
    DeleteToLineStart,
    DeleteToLineEnd,
    NewLine,
    SelectUp,
    SelectDown,
    SelectPageUp,
    SelectPageDown,
    Confirm,
    SecondaryConfirm,
    Cancel,
    FocusNext,
    FocusPrevious,
    Toggle,
    SubmitForm,
    ShowActions,
    Reload,
    Quit,
}

pub type KeyId = String;

#[derive(Debug, Clone)]
pub enum KeyBinding {
    Single(KeyId),
    Multiple(Vec<KeyId>),
}

impl From<&str> for KeyBinding {
    fn from(value: &str) -> Self {
        KeyBinding::Single(value.to_string())
    }
}

impl From<Vec<&str>> for KeyBinding {
    fn from(value: Vec<&str>) -> Self {
        KeyBinding::Multiple(value.into_iter().map(str::to_string).collect())
    }
}

/// User overrides applied on top of [`DEFAULT_KEYBINDINGS`].
#[derive(Debug, Clone, Default)]
pub struct KeybindingsConfig {
    entries: HashMap<KeyAction, KeyBinding>,
}

impl KeybindingsConfig {
    pub fn set<K: Into<KeyBinding>>(&mut self, action: KeyAction, keys: K) {
        self.entries.insert(action, keys.into());
    }
}

pub static DEFAULT_KEYBINDINGS: LazyLock<HashMap<KeyAction, Vec<&'static str>>> =
    LazyLock::new(|| {
        use KeyAction::*;

        HashMap::from([
            (CursorLeft, vec!["left", "ctrl+b"]),
            (CursorRight, vec!["right", "ctrl+f"]),
            (CursorUp, vec!["up"]),
            (CursorDown, vec!["down"]),
            (CursorWordLeft, vec!["alt+left", "ctrl+left"]),
            (CursorWordRight, vec!["alt+right", "ctrl+right"]),
            (CursorLineStart, vec!["home", "ctrl+a"]),
            (CursorLineEnd, vec!["end", "ctrl+e"]),
            (DeleteCharBackward, vec!["backspace"]),
            (DeleteCharForward, vec!["delete"]),
            (DeleteWordBackward, vec!["ctrl+w", "alt+backspace"]),
            (DeleteToLineStart, vec!["ctrl+u"]),
            (DeleteToLineEnd, vec!["ctrl+k"]),
            (NewLine, vec!["enter", "shift+enter"]),
            (SelectUp, vec!["up", "ctrl+p", "ctrl+k"]),
            (SelectDown, vec!["down", "ctrl+n", "ctrl+j"]),
            (SelectPageUp, vec!["pageUp", "ctrl+u"]),
            (SelectPageDown, vec!["pageDown", "ctrl+d"]),
            (Confirm, vec!["enter"]),
            (SecondaryConfirm, vec!["alt+enter"]),
            (Cancel, vec!["escape"]),
            (FocusNext, vec!["tab"]),
            (FocusPrevious, vec!["shift+tab"]),
            (Toggle, vec!["enter", "space"]),
            (SubmitForm, vec!["ctrl+s"]),
            (ShowActions, vec!["tab"]),
            (Reload, vec!["ctrl+r"]),
            (Quit, vec!["ctrl+c"]),
        ])
    });

/// Resolves key identifiers to launcher actions.
pub struct KeybindingsManager {
    action_to_keys: HashMap<KeyAction, Vec<KeyId>>,
}

impl KeybindingsManager {
    pub fn new(config: KeybindingsConfig) -> Self {
        let mut action_to_keys: HashMap<KeyAction, Vec<KeyId>> = DEFAULT_KEYBINDINGS
            .iter()
            .map(|(action, keys)| (*action, keys.iter().map(|key| normalize(key)).collect()))
            .collect();

        for (action, binding) in config.entries {
            let keys = match binding {
                KeyBinding::Single(key) => vec![normalize(&key)],
                KeyBinding::Multiple(keys) => keys.iter().map(|key| normalize(key)).collect(),
            };
            action_to_keys.insert(action, keys);
        }

        Self { action_to_keys }
    }

    /// Returns whether `key_id` (already normalized by the input parser) triggers `action`.
    pub fn matches(&self, key_id: &str, action: KeyAction) -> bool {
        self.action_to_keys
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|key| key == key_id))
    }

    pub fn keys(&self, action: KeyAction) -> &[KeyId] {
        self.action_to_keys
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Default for KeybindingsManager {
    fn default() -> Self {
        Self::new(KeybindingsConfig::default())
    }
}

fn normalize(key: &str) -> KeyId {
    Key::parse(key)
        .map(|key| key.id())
        .unwrap_or_else(|| key.to_string())
}

pub type KeybindingsHandle = Arc<Mutex<KeybindingsManager>>;

pub fn default_keybindings_handle() -> KeybindingsHandle {
    Arc::new(Mutex::new(KeybindingsManager::default()))
}

/// Locks a keybindings handle, recovering from poisoning.
pub fn lock_keybindings(handle: &KeybindingsHandle) -> MutexGuard<'_, KeybindingsManager> {
    match handle.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
