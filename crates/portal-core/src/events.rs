//! Page events delivered to the controller.

use crate::alert::AlertId;
use crate::form::{Element, Field};
use crate::keyboard::KeyEvent;

/// Something happened on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The form's submit action fired.
    Submit,
    /// The user typed into a field.
    Input(Field),
    /// An element gained focus.
    Focus(Element),
    /// An element lost focus.
    Blur(Element),
    /// The remember-me checkbox changed.
    RememberMeChanged,
    /// The password visibility toggle was clicked.
    ToggleClick,
    /// A key went down anywhere on the page.
    KeyDown(KeyEvent),
    /// The dismiss affordance of an alert was clicked.
    DismissAlert(AlertId),
    /// Network connectivity changed.
    Connectivity { online: bool },
    /// The page was hidden or shown.
    Visibility { hidden: bool },
}

/// What the page should do with the native event after the controller ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    /// Suppress the platform's default action.
    pub prevent_default: bool,
}

impl EventOutcome {
    /// Let the default action happen.
    pub const PASS: Self = Self {
        prevent_default: false,
    };

    /// Suppress the default action.
    pub const HANDLED: Self = Self {
        prevent_default: true,
    };
}
