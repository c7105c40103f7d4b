//! Page view seam.
//!
//! [`PageView`] is everything the controller needs from the document. Every
//! method tolerates missing elements: reads return `None`, writes are no-ops.
//! [`MemoryPage`] is a complete in-memory page used by tests and by the
//! terminal host.

use std::collections::HashSet;

use serde::{Serialize, Serializer};

use crate::alert::{AlertId, AlertMessage, AlertStage};
use crate::form::{Element, Field, Submission};

/// How the password input renders its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum InputKind {
    #[default]
    Masked,
    Plain,
}

impl InputKind {
    pub fn flipped(&self) -> Self {
        match self {
            Self::Masked => Self::Plain,
            Self::Plain => Self::Masked,
        }
    }
}

/// Icon on the password visibility toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ToggleIcon {
    /// Value is masked; the icon offers to show it.
    #[default]
    Eye,
    /// Value is visible; the icon offers to hide it.
    EyeSlash,
}

impl ToggleIcon {
    /// Icon matching an input kind.
    pub fn for_kind(kind: InputKind) -> Self {
        match kind {
            InputKind::Masked => Self::Eye,
            InputKind::Plain => Self::EyeSlash,
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Eye => "fas fa-eye",
            Self::EyeSlash => "fas fa-eye-slash",
        }
    }
}

/// Validation styling of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FieldVisual {
    #[default]
    Neutral,
    Valid,
    Invalid,
}

/// Transient animations the controller triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Animation {
    /// Horizontal shake on an invalid field.
    Shake,
    /// Scale-down press on the password toggle.
    Press,
}

/// Platform features the page relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub storage: bool,
    pub events: bool,
    pub query: bool,
    pub class_list: bool,
    pub webauthn: bool,
    pub secure_context: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            storage: true,
            events: true,
            query: true,
            class_list: true,
            webauthn: false,
            secure_context: true,
        }
    }
}

impl Capabilities {
    /// Names of required features that are missing.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.storage {
            missing.push("localStorage");
        }
        if !self.events {
            missing.push("addEventListener");
        }
        if !self.query {
            missing.push("querySelector");
        }
        if !self.class_list {
            missing.push("classList");
        }
        missing
    }
}

/// Document operations used by the controller.
pub trait PageView {
    /// Whether the element exists on the page.
    fn has(&self, element: Element) -> bool;

    /// Text value of an input.
    fn value(&self, element: Element) -> Option<String>;
    fn set_value(&mut self, element: Element, value: &str);

    /// Checked state of a checkbox.
    fn is_checked(&self, element: Element) -> Option<bool>;
    fn set_checked(&mut self, element: Element, checked: bool);

    /// Render mode of the password input.
    fn input_kind(&self) -> Option<InputKind>;
    fn set_input_kind(&mut self, kind: InputKind);
    fn set_toggle_icon(&mut self, icon: ToggleIcon);

    fn set_field_visual(&mut self, field: Field, visual: FieldVisual);
    /// Inserts the inline error note under a field, replacing any existing one.
    fn show_field_note(&mut self, field: Field, message: &str);
    /// Removes the inline note. Returns whether one was present.
    fn remove_field_note(&mut self, field: Field) -> bool;

    fn set_animation(&mut self, element: Element, animation: Option<Animation>);

    fn focus(&mut self, element: Element);
    fn focused(&self) -> Option<Element>;
    /// Selects the text of an input.
    fn select_text(&mut self, element: Element);
    /// Toggles the `focused` marker on the element's group.
    fn set_group_focused(&mut self, element: Element, focused: bool);

    /// Disables the submit control and swaps its label, or restores it.
    fn set_submit_busy(&mut self, busy: bool, label: &str);
    /// Toggles the `offline` marker on the form.
    fn set_form_offline(&mut self, offline: bool);

    /// Renders an alert above the form.
    fn insert_alert(&mut self, id: AlertId, alert: &AlertMessage);
    /// Alerts currently rendered, in document order.
    fn alert_ids(&self) -> Vec<AlertId>;
    fn has_alert(&self, id: AlertId) -> bool;
    /// Adds a dismiss affordance to an alert.
    fn make_alert_dismissible(&mut self, id: AlertId);
    /// Starts the fade-out of an alert.
    fn fade_alert(&mut self, id: AlertId);
    /// Removes an alert. Returns whether it was present.
    fn remove_alert(&mut self, id: AlertId) -> bool;

    /// Restores the form's inputs to their initial values.
    fn reset_form(&mut self);
    /// Performs the native form submission.
    fn submit_form(&mut self);

    fn capabilities(&self) -> Capabilities;
}

/// An alert as rendered on a [`MemoryPage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedAlert {
    pub id: AlertId,
    pub message: AlertMessage,
    pub dismissible: bool,
    #[serde(skip)]
    pub stage: AlertStage,
}

/// State of a text input on a [`MemoryPage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputState {
    pub value: String,
    pub visual: FieldVisual,
    pub note: Option<String>,
    pub animation: Option<Animation>,
    pub group_focused: bool,
}

/// State of the submit button on a [`MemoryPage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitButton {
    pub disabled: bool,
    pub loading: bool,
    pub label: String,
    pub group_focused: bool,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            disabled: false,
            loading: false,
            label: "Ingresar".to_string(),
            group_focused: false,
        }
    }
}

/// In-memory login page.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryPage {
    #[serde(skip)]
    absent: HashSet<Element>,
    pub username: InputState,
    /// Serialized with the value masked whatever the input kind.
    #[serde(serialize_with = "serialize_masked")]
    pub password: InputState,
    pub password_kind: InputKind,
    pub toggle_icon: ToggleIcon,
    pub toggle_animation: Option<Animation>,
    pub remember_me: bool,
    pub not_robot: bool,
    pub submit: SubmitButton,
    pub offline: bool,
    pub focused: Option<Element>,
    pub selected: Option<Element>,
    pub alerts: Vec<RenderedAlert>,
    #[serde(skip)]
    pub submissions: Vec<Submission>,
    #[serde(skip)]
    pub capabilities: Capabilities,
    #[serde(skip)]
    next_server_alert: u64,
}

fn serialize_masked<S: Serializer>(input: &InputState, serializer: S) -> Result<S::Ok, S::Error> {
    let masked = InputState {
        value: "*".repeat(input.value.chars().count()),
        ..input.clone()
    };
    masked.serialize(serializer)
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// A page with every element present and empty inputs.
    pub fn new() -> Self {
        Self {
            absent: HashSet::new(),
            username: InputState::default(),
            password: InputState::default(),
            password_kind: InputKind::Masked,
            toggle_icon: ToggleIcon::Eye,
            toggle_animation: None,
            remember_me: false,
            not_robot: false,
            submit: SubmitButton::default(),
            offline: false,
            focused: None,
            selected: None,
            alerts: Vec::new(),
            submissions: Vec::new(),
            capabilities: Capabilities::default(),
            next_server_alert: 0,
        }
    }

    /// Removes an element from the page.
    pub fn without(mut self, element: Element) -> Self {
        self.absent.insert(element);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Adds an alert rendered before any script runs.
    pub fn with_server_alert(mut self, alert: AlertMessage) -> Self {
        let id = AlertId(self.next_server_alert);
        self.next_server_alert += 1;
        self.alerts.push(RenderedAlert {
            id,
            message: alert,
            dismissible: false,
            stage: AlertStage::Shown,
        });
        self
    }

    /// Fills the inputs the way a user would.
    pub fn fill(&mut self, username: &str, password: &str, remember_me: bool, not_robot: bool) {
        self.set_value(Element::Username, username);
        self.set_value(Element::Password, password);
        self.set_checked(Element::RememberMe, remember_me);
        self.set_checked(Element::NotRobot, not_robot);
    }

    pub fn input(&self, field: Field) -> &InputState {
        match field {
            Field::Username => &self.username,
            Field::Password => &self.password,
        }
    }

    fn input_mut(&mut self, field: Field) -> Option<&mut InputState> {
        if !self.has(field.element()) {
            return None;
        }
        Some(match field {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        })
    }

    /// The visible alert, if any.
    pub fn visible_alert(&self) -> Option<&RenderedAlert> {
        self.alerts.first()
    }

    /// Drains recorded native submissions.
    pub fn take_submissions(&mut self) -> Vec<Submission> {
        std::mem::take(&mut self.submissions)
    }
}

impl PageView for MemoryPage {
    fn has(&self, element: Element) -> bool {
        !self.absent.contains(&element)
    }

    fn value(&self, element: Element) -> Option<String> {
        let field = element.field()?;
        self.has(element).then(|| self.input(field).value.clone())
    }

    fn set_value(&mut self, element: Element, value: &str) {
        if let Some(input) = element.field().and_then(|f| self.input_mut(f)) {
            input.value = value.to_string();
        }
    }

    fn is_checked(&self, element: Element) -> Option<bool> {
        if !self.has(element) {
            return None;
        }
        match element {
            Element::RememberMe => Some(self.remember_me),
            Element::NotRobot => Some(self.not_robot),
            _ => None,
        }
    }

    fn set_checked(&mut self, element: Element, checked: bool) {
        if !self.has(element) {
            return;
        }
        match element {
            Element::RememberMe => self.remember_me = checked,
            Element::NotRobot => self.not_robot = checked,
            _ => {}
        }
    }

    fn input_kind(&self) -> Option<InputKind> {
        self.has(Element::Password).then_some(self.password_kind)
    }

    fn set_input_kind(&mut self, kind: InputKind) {
        if self.has(Element::Password) {
            self.password_kind = kind;
        }
    }

    fn set_toggle_icon(&mut self, icon: ToggleIcon) {
        if self.has(Element::PasswordToggle) {
            self.toggle_icon = icon;
        }
    }

    fn set_field_visual(&mut self, field: Field, visual: FieldVisual) {
        if let Some(input) = self.input_mut(field) {
            input.visual = visual;
        }
    }

    fn show_field_note(&mut self, field: Field, message: &str) {
        if let Some(input) = self.input_mut(field) {
            input.note = Some(message.to_string());
        }
    }

    fn remove_field_note(&mut self, field: Field) -> bool {
        self.input_mut(field)
            .and_then(|input| input.note.take())
            .is_some()
    }

    fn set_animation(&mut self, element: Element, animation: Option<Animation>) {
        if !self.has(element) {
            return;
        }
        if element == Element::PasswordToggle {
            self.toggle_animation = animation;
        } else if let Some(input) = element.field().and_then(|f| self.input_mut(f)) {
            input.animation = animation;
        }
    }

    fn focus(&mut self, element: Element) {
        if self.has(element) {
            self.focused = Some(element);
        }
    }

    fn focused(&self) -> Option<Element> {
        self.focused
    }

    fn select_text(&mut self, element: Element) {
        if self.has(element) && element.field().is_some() {
            self.selected = Some(element);
        }
    }

    fn set_group_focused(&mut self, element: Element, focused: bool) {
        if !self.has(element) {
            return;
        }
        if element == Element::SubmitButton {
            self.submit.group_focused = focused;
        } else if let Some(input) = element.field().and_then(|f| self.input_mut(f)) {
            input.group_focused = focused;
        }
    }

    fn set_submit_busy(&mut self, busy: bool, label: &str) {
        if self.has(Element::SubmitButton) {
            self.submit.disabled = busy;
            self.submit.loading = busy;
            self.submit.label = label.to_string();
        }
    }

    fn set_form_offline(&mut self, offline: bool) {
        if self.has(Element::Form) {
            self.offline = offline;
        }
    }

    fn insert_alert(&mut self, id: AlertId, alert: &AlertMessage) {
        // alerts render before the form; without one there is nowhere to go
        if !self.has(Element::Form) {
            return;
        }
        self.alerts.push(RenderedAlert {
            id,
            message: alert.clone(),
            dismissible: false,
            stage: AlertStage::Shown,
        });
    }

    fn alert_ids(&self) -> Vec<AlertId> {
        self.alerts.iter().map(|a| a.id).collect()
    }

    fn has_alert(&self, id: AlertId) -> bool {
        self.alerts.iter().any(|a| a.id == id)
    }

    fn make_alert_dismissible(&mut self, id: AlertId) {
        if let Some(alert) = self.alerts.iter_mut().find(|a| a.id == id) {
            alert.dismissible = true;
        }
    }

    fn fade_alert(&mut self, id: AlertId) {
        if let Some(alert) = self.alerts.iter_mut().find(|a| a.id == id) {
            alert.stage = AlertStage::Fading;
        }
    }

    fn remove_alert(&mut self, id: AlertId) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    fn reset_form(&mut self) {
        if !self.has(Element::Form) {
            return;
        }
        self.username.value.clear();
        self.password.value.clear();
        self.remember_me = false;
        self.not_robot = false;
    }

    fn submit_form(&mut self) {
        if !self.has(Element::Form) {
            return;
        }
        self.submissions.push(Submission {
            username: self.username.value.clone(),
            password: self.password.value.clone(),
            remember_me: self.remember_me,
        });
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}
