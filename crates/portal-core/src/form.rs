//! Form data model.

use serde::{Deserialize, Serialize};

/// A validated text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Username,
    Password,
}

impl Field {
    /// The page element backing this field.
    pub fn element(&self) -> Element {
        match self {
            Self::Username => Element::Username,
            Self::Password => Element::Password,
        }
    }

    /// Returns display text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
        }
    }
}

/// Elements of the login page the controller addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Form,
    Username,
    Password,
    PasswordToggle,
    SubmitButton,
    RememberMe,
    NotRobot,
}

impl Element {
    /// All elements, in document order.
    pub const ALL: [Element; 7] = [
        Element::Form,
        Element::Username,
        Element::Password,
        Element::PasswordToggle,
        Element::SubmitButton,
        Element::RememberMe,
        Element::NotRobot,
    ];

    /// The validated field behind this element, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::Username => Some(Field::Username),
            Self::Password => Some(Field::Password),
            _ => None,
        }
    }

    /// Elements that get a `focused` marker on their group.
    pub fn tracks_focus(&self) -> bool {
        matches!(self, Self::Username | Self::Password | Self::SubmitButton)
    }
}

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidationResult {
    pub field: Field,
    pub valid: bool,
    pub message: Option<String>,
}

impl FieldValidationResult {
    /// A passing result.
    pub fn valid(field: Field) -> Self {
        Self {
            field,
            valid: true,
            message: None,
        }
    }

    /// A failing result carrying the message to show next to the field.
    pub fn invalid(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Snapshot of the form's user-visible state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub username_value: String,
    pub password_value: String,
    pub password_visible: bool,
    pub remember_me: bool,
    pub not_robot_checked: bool,
    pub submitting: bool,
}

/// Phase of the submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    /// Waiting for the user.
    #[default]
    Idle,
    /// Field validation in progress.
    Validating,
    /// Validated; the native submission is scheduled.
    Submitting,
    /// The native submission fired; the page is waiting on the server.
    Submitted,
}

impl SubmitPhase {
    /// Whether a submission attempt is in flight.
    pub fn in_flight(&self) -> bool {
        matches!(self, Self::Submitting | Self::Submitted)
    }

    /// Returns display text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
        }
    }
}

/// Fields posted by the native form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

impl Submission {
    /// Form-encoded field pairs, in the order the page posts them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("username", self.username.clone()),
            ("password", self.password.clone()),
        ];
        if self.remember_me {
            fields.push(("remember_me", "true".to_string()));
        }
        fields
    }
}
