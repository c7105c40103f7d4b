//! Keyboard shortcuts.

use crate::form::Element;

/// A key-down event as delivered by the page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Key name, e.g. `"l"`, `"L"`, `"Enter"`.
    pub key: String,
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    /// Element that had focus when the key went down.
    pub target: Option<Element>,
}

impl KeyEvent {
    /// A plain key press.
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// An Alt+key press.
    pub fn alt(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            alt: true,
            ..Self::default()
        }
    }

    /// Sets the focused element.
    pub fn on(mut self, target: Element) -> Self {
        self.target = Some(target);
        self
    }
}

/// Actions bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Alt+L.
    FocusUsername,
    /// Alt+P.
    FocusPassword,
    /// Alt+T.
    TogglePassword,
    /// Enter inside the username or password input.
    Submit,
}

impl Shortcut {
    /// Maps a key event to a shortcut.
    pub fn resolve(event: &KeyEvent) -> Option<Self> {
        if event.alt {
            let mut chars = event.key.chars();
            let letter = match (chars.next(), chars.next()) {
                (Some(c), None) => c.to_ascii_lowercase(),
                _ => return None,
            };
            return match letter {
                'l' => Some(Self::FocusUsername),
                'p' => Some(Self::FocusPassword),
                't' => Some(Self::TogglePassword),
                _ => None,
            };
        }

        if event.key == "Enter"
            && matches!(event.target, Some(Element::Username | Element::Password))
        {
            return Some(Self::Submit);
        }

        None
    }
}
