//! The login form controller.
//!
//! [`FormController`] owns the form's lifecycle. It reacts to
//! [`PageEvent`]s, validates fields, gates and schedules the native
//! submission, persists the remembered identifier and manages alerts. All
//! side effects go through the injected [`PageView`], [`KeyValueStore`]s and
//! [`Scheduler`].
//!
//! Submit control state machine:
//!
//! ```text
//! Idle -> Validating -> Idle                    (validation or robot gate failed)
//!                    -> Submitting -> Submitted (native submission fired)
//! Submitting | Submitted -> Idle                (login error, success, network error, reset)
//! ```
//!
//! Returning to `Idle` cancels a native submission that has not fired yet.
//!
//! ```text
//! Idle + submit while Submitting | Submitted     (ignored)
//! ```
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use portal_core::{FormController, ManualScheduler, MemoryPage, PageEvent, SubmitPhase};
//!
//! let mut page = MemoryPage::new();
//! page.fill("a@b.com", "123456", false, true);
//!
//! let mut controller = FormController::new(page, ManualScheduler::new());
//! controller.init();
//! controller.dispatch(PageEvent::Submit);
//! assert_eq!(controller.phase(), SubmitPhase::Submitting);
//!
//! controller.scheduler_mut().advance(Duration::from_millis(500));
//! controller.run_due_timers();
//! assert_eq!(controller.view().submissions.len(), 1);
//! ```

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::alert::{AlertId, AlertMessage, Severity};
use crate::config::LoginConfig;
use crate::events::{EventOutcome, PageEvent};
use crate::form::{Element, Field, FieldValidationResult, FormState, SubmitPhase};
use crate::keyboard::{KeyEvent, Shortcut};
use crate::scheduler::{Scheduler, TimerId, TimerTask};
use crate::storage::{
    CredentialHints, FailedAttempts, KeyValueStore, MemoryStore, PersistedCredentialHint,
};
use crate::validation;
use crate::view::{Animation, FieldVisual, InputKind, PageView, ToggleIcon};

/// Controller for one login form instance.
pub struct FormController<V, T> {
    view: V,
    scheduler: T,
    durable: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
    config: LoginConfig,
    phase: SubmitPhase,
    next_alert: u64,
    alert_timers: HashMap<AlertId, TimerId>,
    native_submit: Option<TimerId>,
    submit_started: Option<std::time::Duration>,
}

impl<V: PageView, T: Scheduler> FormController<V, T> {
    /// Creates a controller with default configuration and in-memory stores.
    pub fn new(view: V, scheduler: T) -> Self {
        Self {
            view,
            scheduler,
            durable: Box::new(MemoryStore::new()),
            session: Box::new(MemoryStore::new()),
            config: LoginConfig::default(),
            phase: SubmitPhase::Idle,
            next_alert: 0,
            alert_timers: HashMap::new(),
            native_submit: None,
            submit_started: None,
        }
    }

    /// Sets the store holding the remembered identifier.
    pub fn with_durable_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.durable = Box::new(store);
        self
    }

    /// Sets the store holding per-session counters.
    pub fn with_session_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.session = Box::new(store);
        self
    }

    pub fn with_config(mut self, config: LoginConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the page-load sequence.
    ///
    /// Adopts server-rendered alerts, schedules the initial focus, restores
    /// the remembered identifier and reports missing platform features.
    pub fn init(&mut self) {
        self.next_alert = self
            .view
            .alert_ids()
            .iter()
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(0)
            .max(self.next_alert);

        self.adopt_existing_alerts();
        self.scheduler.schedule(
            self.config.timings.initial_focus_delay(),
            TimerTask::InitialFocus,
        );
        self.load_saved_credentials();
        self.check_environment();

        debug!("Login form initialized");
    }

    // ==================== Accessors ====================

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    pub fn config(&self) -> &LoginConfig {
        &self.config
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    /// Snapshot of the form as the user sees it.
    pub fn form_state(&self) -> FormState {
        FormState {
            username_value: self.view.value(Element::Username).unwrap_or_default(),
            password_value: self.view.value(Element::Password).unwrap_or_default(),
            password_visible: self.view.input_kind() == Some(InputKind::Plain),
            remember_me: self.is_checked(Element::RememberMe),
            not_robot_checked: self.is_checked(Element::NotRobot),
            submitting: self.phase.in_flight(),
        }
    }

    fn is_checked(&self, element: Element) -> bool {
        self.view.is_checked(element).unwrap_or(false)
    }

    fn hints(&self) -> CredentialHints<'_> {
        CredentialHints::new(self.durable.as_ref(), &self.config.storage_keys)
    }

    fn failed_attempts(&self) -> FailedAttempts<'_> {
        FailedAttempts::new(
            self.session.as_ref(),
            &self.config.storage_keys.failed_attempts,
            self.config.max_failed_attempts,
        )
    }

    // ==================== Events ====================

    /// Routes a page event to its handler.
    pub fn dispatch(&mut self, event: PageEvent) -> EventOutcome {
        match event {
            PageEvent::Submit => self.handle_submit(),
            PageEvent::Input(field) => {
                self.clear_field_error(field);
                EventOutcome::PASS
            }
            PageEvent::Focus(element) => {
                if element.tracks_focus() {
                    self.view.set_group_focused(element, true);
                }
                EventOutcome::PASS
            }
            PageEvent::Blur(element) => {
                if element.tracks_focus() {
                    self.view.set_group_focused(element, false);
                }
                match element {
                    Element::Username => {
                        self.validate_username();
                    }
                    Element::Password => {
                        self.validate_password();
                    }
                    _ => {}
                }
                EventOutcome::PASS
            }
            PageEvent::RememberMeChanged => {
                self.handle_remember_me_changed();
                EventOutcome::PASS
            }
            PageEvent::ToggleClick => {
                self.toggle_password_visibility();
                EventOutcome::PASS
            }
            PageEvent::KeyDown(key) => self.handle_key_down(&key),
            PageEvent::DismissAlert(id) => {
                self.dismiss_alert(id);
                EventOutcome::PASS
            }
            PageEvent::Connectivity { online } => {
                if online {
                    info!("Connection restored");
                } else {
                    info!("Connection lost");
                }
                self.view.set_form_offline(!online);
                EventOutcome::PASS
            }
            PageEvent::Visibility { hidden } => {
                debug!(hidden, "Page visibility changed");
                EventOutcome::PASS
            }
        }
    }

    /// Applies the keyboard shortcut bound to `key`, if any.
    pub fn handle_key_down(&mut self, key: &KeyEvent) -> EventOutcome {
        let Some(shortcut) = Shortcut::resolve(key) else {
            return EventOutcome::PASS;
        };

        debug!(?shortcut, "Keyboard shortcut");
        match shortcut {
            Shortcut::FocusUsername => self.view.focus(Element::Username),
            Shortcut::FocusPassword => self.view.focus(Element::Password),
            Shortcut::TogglePassword => self.toggle_password_visibility(),
            Shortcut::Submit => {
                self.handle_submit();
            }
        }
        EventOutcome::HANDLED
    }

    /// Runs every scheduled task whose deadline has passed.
    pub fn run_due_timers(&mut self) {
        loop {
            let due = self.scheduler.take_due();
            if due.is_empty() {
                break;
            }
            for task in due {
                self.on_timer(task);
            }
        }
    }

    fn on_timer(&mut self, task: TimerTask) {
        match task {
            TimerTask::NativeSubmit => self.perform_native_submit(),
            TimerTask::FadeAlert(id) => {
                self.alert_timers.remove(&id);
                if self.view.has_alert(id) {
                    self.view.fade_alert(id);
                    let timer = self
                        .scheduler
                        .schedule(self.config.timings.alert_fade(), TimerTask::RemoveAlert(id));
                    self.alert_timers.insert(id, timer);
                }
            }
            TimerTask::RemoveAlert(id) => {
                self.alert_timers.remove(&id);
                self.view.remove_alert(id);
            }
            TimerTask::ClearShake(field) => self.view.set_animation(field.element(), None),
            TimerTask::ReleaseToggle => self.view.set_animation(Element::PasswordToggle, None),
            TimerTask::InitialFocus => self.focus_first_empty(),
        }
    }

    // ==================== Validation ====================

    /// Validates the username and renders the result on the field.
    pub fn validate_username(&mut self) -> FieldValidationResult {
        let raw = self.view.value(Element::Username).unwrap_or_default();
        let result = validation::validate_username(&raw, &self.config.messages);
        self.apply_validation(&result);
        result
    }

    /// Validates the password and renders the result on the field.
    pub fn validate_password(&mut self) -> FieldValidationResult {
        let raw = self.view.value(Element::Password).unwrap_or_default();
        let result = validation::validate_password(
            &raw,
            self.config.min_password_length,
            &self.config.messages,
        );
        self.apply_validation(&result);
        result
    }

    /// Checks both fields and the robot box without alerting or submitting.
    pub fn validate_form(&mut self) -> bool {
        let username = self.validate_username();
        let password = self.validate_password();
        username.valid && password.valid && self.is_checked(Element::NotRobot)
    }

    fn apply_validation(&mut self, result: &FieldValidationResult) {
        let field = result.field;
        self.clear_field_error(field);

        match &result.message {
            Some(message) if !result.valid => {
                self.view.set_field_visual(field, FieldVisual::Invalid);
                self.view.show_field_note(field, message);
                self.view.set_animation(field.element(), Some(Animation::Shake));
                self.scheduler
                    .schedule(self.config.timings.shake(), TimerTask::ClearShake(field));
            }
            _ => self.view.set_field_visual(field, FieldVisual::Valid),
        }
    }

    /// Drops the valid/invalid styling and the inline note.
    pub fn clear_field_error(&mut self, field: Field) {
        self.view.set_field_visual(field, FieldVisual::Neutral);
        self.view.remove_field_note(field);
    }

    // ==================== Submission ====================

    /// Handles the form's submit action.
    ///
    /// The native submission is always suppressed here; when every gate
    /// passes it is re-issued by the scheduler after the submit delay.
    pub fn handle_submit(&mut self) -> EventOutcome {
        if self.phase.in_flight() {
            debug!(phase = self.phase.as_str(), "Ignoring submit while a submission is in flight");
            return EventOutcome::HANDLED;
        }

        self.phase = SubmitPhase::Validating;

        let username = self.validate_username();
        let password = self.validate_password();

        if !username.valid || !password.valid {
            debug!(
                username_valid = username.valid,
                password_valid = password.valid,
                "Submit blocked by validation"
            );
            let message = self.config.messages.form_has_errors.clone();
            self.show_alert(message, Severity::Error);
            self.phase = SubmitPhase::Idle;
            return EventOutcome::HANDLED;
        }

        if !self.is_checked(Element::NotRobot) {
            debug!("Submit blocked by robot check");
            let message = self.config.messages.robot_unchecked.clone();
            self.show_alert(message, Severity::Warning);
            self.phase = SubmitPhase::Idle;
            return EventOutcome::HANDLED;
        }

        self.set_loading_state(true);

        if self.remember_me_requested() {
            self.save_credentials();
        } else {
            self.clear_saved_credentials();
        }

        self.submit_started = Some(self.scheduler.now());
        self.native_submit = Some(
            self.scheduler
                .schedule(self.config.timings.submit_delay(), TimerTask::NativeSubmit),
        );
        self.phase = SubmitPhase::Submitting;

        info!("Login form validated, submission scheduled");
        EventOutcome::HANDLED
    }

    fn remember_me_requested(&self) -> bool {
        self.config.features.remember_me && self.is_checked(Element::RememberMe)
    }

    fn perform_native_submit(&mut self) {
        self.native_submit = None;
        if self.phase != SubmitPhase::Submitting {
            debug!(phase = self.phase.as_str(), "Dropping stale native submission");
            return;
        }

        self.view.submit_form();
        self.phase = SubmitPhase::Submitted;

        if let Some(started) = self.submit_started.take() {
            let elapsed = self.scheduler.now().saturating_sub(started);
            debug!(elapsed_ms = elapsed.as_millis() as u64, "Form submitted");
        }
    }

    /// Returns to `Idle`, dropping a native submission that has not fired yet.
    fn return_to_idle(&mut self) {
        if let Some(timer) = self.native_submit.take() {
            if self.scheduler.cancel(timer) {
                debug!("Cancelled pending native submission");
            }
        }
        self.submit_started = None;
        self.phase = SubmitPhase::Idle;
    }

    /// Shows or clears the busy state of the submit control.
    pub fn set_loading_state(&mut self, loading: bool) {
        let messages = &self.config.messages;
        let label = if loading {
            &messages.submit_loading_label
        } else {
            &messages.submit_label
        };
        self.view.set_submit_busy(loading, label);
    }

    /// Reports a successful login before the page navigates away.
    pub fn handle_login_success(&mut self) {
        let message = self.config.messages.login_success.clone();
        self.show_alert(message, Severity::Success);
        self.set_loading_state(false);
        self.return_to_idle();

        if let Err(e) = self.failed_attempts().clear() {
            warn!("Failed to reset failed attempt counter: {}", e);
        }
        info!("Login succeeded");
    }

    /// Reports a failed login and lets the user retry.
    pub fn handle_login_error(&mut self, message: Option<&str>) {
        let text = match message {
            Some(m) if !m.trim().is_empty() => m.to_string(),
            _ => self.config.messages.login_error.clone(),
        };
        self.show_alert(text, Severity::Error);
        self.set_loading_state(false);
        self.return_to_idle();

        self.view.focus(Element::Password);
        self.view.select_text(Element::Password);

        match self.failed_attempts().record() {
            Ok(count) => {
                info!(attempts = count, "Login failed");
                if self.is_suspicious() {
                    warn!(attempts = count, "Repeated failed logins in this session");
                }
            }
            Err(e) => warn!("Failed to record failed attempt: {}", e),
        }
    }

    /// Reports that the submission never reached the server.
    pub fn handle_network_error(&mut self) {
        self.set_loading_state(false);
        let message = self.config.messages.network_error.clone();
        self.show_alert(message, Severity::Error);
        self.return_to_idle();
        warn!("Login submission failed: network unavailable");
    }

    /// Whether this session has too many failed logins.
    pub fn is_suspicious(&self) -> bool {
        self.failed_attempts().is_suspicious()
    }

    /// Resets inputs, field styling and the submit control.
    pub fn reset_form(&mut self) {
        self.view.reset_form();
        self.clear_field_error(Field::Username);
        self.clear_field_error(Field::Password);
        self.set_loading_state(false);
        self.return_to_idle();
    }

    // ==================== Password visibility ====================

    /// Flips the password between masked and plain text.
    pub fn toggle_password_visibility(&mut self) {
        let Some(kind) = self.view.input_kind() else {
            return;
        };

        let next = kind.flipped();
        self.view.set_input_kind(next);
        self.view.set_toggle_icon(ToggleIcon::for_kind(next));
        self.view.focus(Element::Password);

        if self.view.has(Element::PasswordToggle) {
            self.view
                .set_animation(Element::PasswordToggle, Some(Animation::Press));
            self.scheduler
                .schedule(self.config.timings.toggle_press(), TimerTask::ReleaseToggle);
        }
    }

    // ==================== Remembered identifier ====================

    /// Persists the current username when remember-me is checked.
    pub fn save_credentials(&mut self) {
        if !self.remember_me_requested() {
            return;
        }

        let username = self
            .view
            .value(Element::Username)
            .unwrap_or_default()
            .trim()
            .to_string();

        match self.hints().save(&username) {
            Ok(()) => info!("Remembered username saved"),
            Err(e) => warn!("Failed to save remembered username: {}", e),
        }
    }

    /// Prefills the username from a stored hint.
    pub fn load_saved_credentials(&mut self) {
        if !self.config.features.remember_me {
            return;
        }

        let hint = match self.hints().load() {
            Ok(hint) => hint,
            Err(e) => {
                warn!("Failed to load remembered username: {}", e);
                return;
            }
        };

        if let Some(username) = hint.prefill() {
            self.view.set_value(Element::Username, username);
            self.view.set_checked(Element::RememberMe, true);
            debug!("Prefilled remembered username");
        }
    }

    /// Erases the stored hint.
    pub fn clear_saved_credentials(&mut self) {
        if let Err(e) = self.hints().clear() {
            warn!("Failed to clear remembered username: {}", e);
        }
    }

    /// The currently stored hint, if the store is readable.
    pub fn saved_hint(&self) -> Option<PersistedCredentialHint> {
        self.hints().load().ok()
    }

    /// Unchecking remember-me forgets the identifier right away.
    pub fn handle_remember_me_changed(&mut self) {
        if !self.is_checked(Element::RememberMe) {
            self.clear_saved_credentials();
        }
    }

    // ==================== Alerts ====================

    /// Replaces any visible alert with a new one.
    pub fn show_alert(&mut self, message: impl Into<String>, severity: Severity) -> AlertId {
        for existing in self.view.alert_ids() {
            self.cancel_alert_timer(existing);
            self.view.remove_alert(existing);
        }

        let id = AlertId(self.next_alert);
        self.next_alert += 1;

        let alert = AlertMessage::new(message, severity);
        debug!(%id, severity = severity.as_str(), "Showing alert");
        self.view.insert_alert(id, &alert);
        self.view.make_alert_dismissible(id);

        if self.view.has_alert(id) {
            let timer = self
                .scheduler
                .schedule(self.config.timings.alert_timeout(), TimerTask::FadeAlert(id));
            self.alert_timers.insert(id, timer);
        }

        id
    }

    /// Fades out and then removes one alert.
    pub fn dismiss_alert(&mut self, id: AlertId) {
        if !self.view.has_alert(id) {
            return;
        }

        self.cancel_alert_timer(id);
        self.view.fade_alert(id);
        let timer = self
            .scheduler
            .schedule(self.config.timings.alert_fade(), TimerTask::RemoveAlert(id));
        self.alert_timers.insert(id, timer);
    }

    /// Gives alerts rendered before load a dismiss affordance and a timeout.
    pub fn adopt_existing_alerts(&mut self) {
        for id in self.view.alert_ids() {
            if self.alert_timers.contains_key(&id) {
                continue;
            }
            self.view.make_alert_dismissible(id);
            let timer = self
                .scheduler
                .schedule(self.config.timings.alert_timeout(), TimerTask::FadeAlert(id));
            self.alert_timers.insert(id, timer);
        }
    }

    fn cancel_alert_timer(&mut self, id: AlertId) {
        if let Some(timer) = self.alert_timers.remove(&id) {
            self.scheduler.cancel(timer);
        }
    }

    // ==================== Environment ====================

    fn focus_first_empty(&mut self) {
        let empty = |value: Option<String>| value.map(|v| v.is_empty()).unwrap_or(false);

        if empty(self.view.value(Element::Username)) {
            self.view.focus(Element::Username);
        } else if empty(self.view.value(Element::Password)) {
            self.view.focus(Element::Password);
        }
    }

    /// Reports missing platform features. Never blocks the form.
    pub fn check_environment(&mut self) {
        let capabilities = self.view.capabilities();

        let missing = capabilities.missing();
        if !missing.is_empty() {
            warn!(?missing, "Some features may be unavailable in this environment");
            let message = self.config.messages.unsupported_browser.clone();
            self.show_alert(message, Severity::Warning);
        }

        if capabilities.webauthn {
            info!("WebAuthn available");
        }

        if !capabilities.secure_context {
            warn!("Page is not served from a secure context");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::alert::AlertStage;
    use crate::scheduler::ManualScheduler;
    use crate::storage::UnavailableStore;
    use crate::view::{Capabilities, MemoryPage};

    type Controller = FormController<MemoryPage, ManualScheduler>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller_with(page: MemoryPage, durable: MemoryStore) -> Controller {
        let mut controller =
            FormController::new(page, ManualScheduler::new()).with_durable_store(durable);
        controller.init();
        controller
    }

    fn filled(username: &str, password: &str, remember: bool, robot: bool) -> (Controller, MemoryStore) {
        let store = MemoryStore::new();
        let mut controller = controller_with(MemoryPage::new(), store.clone());
        controller
            .view_mut()
            .fill(username, password, remember, robot);
        (controller, store)
    }

    fn advance(controller: &mut Controller, by: Duration) {
        controller.scheduler_mut().advance(by);
        controller.run_due_timers();
    }

    // ==================== Validation ====================

    #[test]
    fn test_invalid_username_marks_field() {
        let (mut controller, _) = filled("bad", "", false, false);
        let result = controller.validate_username();

        assert!(!result.valid);
        let input = &controller.view().username;
        assert_eq!(input.visual, FieldVisual::Invalid);
        assert_eq!(input.note.as_deref(), result.message.as_deref());
        assert_eq!(input.animation, Some(Animation::Shake));

        advance(&mut controller, ms(500));
        assert_eq!(controller.view().username.animation, None);
        assert_eq!(controller.view().username.visual, FieldVisual::Invalid);
    }

    #[test]
    fn test_valid_field_replaces_error_note() {
        let (mut controller, _) = filled("", "12", false, false);
        assert!(!controller.validate_password().valid);
        assert!(controller.view().password.note.is_some());

        controller.view_mut().password.value = "123456".into();
        assert!(controller.validate_password().valid);
        let input = &controller.view().password;
        assert_eq!(input.visual, FieldVisual::Valid);
        assert!(input.note.is_none());
    }

    #[test]
    fn test_blur_validates_and_input_clears() {
        let (mut controller, _) = filled("bad", "", false, false);
        controller.dispatch(PageEvent::Focus(Element::Username));
        assert!(controller.view().username.group_focused);

        controller.dispatch(PageEvent::Blur(Element::Username));
        assert!(!controller.view().username.group_focused);
        assert_eq!(controller.view().username.visual, FieldVisual::Invalid);

        controller.dispatch(PageEvent::Input(Field::Username));
        assert_eq!(controller.view().username.visual, FieldVisual::Neutral);
        assert!(controller.view().username.note.is_none());
    }

    #[test]
    fn test_validate_form_does_not_alert_or_submit() {
        let (mut controller, _) = filled("a@b.com", "123456", false, false);
        assert!(!controller.validate_form());

        controller.view_mut().not_robot = true;
        assert!(controller.validate_form());
        assert!(controller.view().alerts.is_empty());
        assert!(controller.scheduler().pending().iter().all(|(_, t)| *t != TimerTask::NativeSubmit));
    }

    // ==================== Submission ====================

    #[test]
    fn test_invalid_username_blocks_submit() {
        let (mut controller, store) = filled("bad", "123456", true, true);
        let outcome = controller.dispatch(PageEvent::Submit);

        assert!(outcome.prevent_default);
        assert_eq!(controller.phase(), SubmitPhase::Idle);
        let alert = controller.view().visible_alert().unwrap();
        assert_eq!(alert.message.severity, Severity::Error);
        assert!(alert.message.text.contains("corrige los errores"));
        assert!(store.is_empty());
        assert!(!controller.view().submit.disabled);

        advance(&mut controller, ms(10_000));
        assert!(controller.view().submissions.is_empty());
    }

    #[test]
    fn test_unchecked_robot_blocks_submit() {
        let (mut controller, store) = filled("a@b.com", "123456", true, false);
        controller.dispatch(PageEvent::Submit);

        assert_eq!(controller.phase(), SubmitPhase::Idle);
        let alert = controller.view().visible_alert().unwrap();
        assert_eq!(alert.message.severity, Severity::Warning);
        assert_eq!(alert.message.text, controller.config().messages.robot_unchecked);
        assert!(store.is_empty());

        advance(&mut controller, ms(10_000));
        assert!(controller.view().submissions.is_empty());
    }

    #[test]
    fn test_short_password_blocks_submit() {
        let (mut controller, _) = filled("a@b.com", "12345", false, true);
        controller.handle_submit();

        advance(&mut controller, ms(10_000));
        assert!(controller.view().submissions.is_empty());
        assert_eq!(controller.view().password.visual, FieldVisual::Invalid);
    }

    #[test]
    fn test_valid_submit_with_remember_me() {
        let (mut controller, store) = filled("a@b.com", "123456", true, true);
        controller.dispatch(PageEvent::Submit);

        assert_eq!(controller.phase(), SubmitPhase::Submitting);
        let submit = &controller.view().submit;
        assert!(submit.disabled);
        assert!(submit.loading);
        assert_eq!(submit.label, "Ingresando...");

        assert_eq!(store.get("rememberedUsername").unwrap().as_deref(), Some("a@b.com"));
        assert_eq!(store.get("rememberMe").unwrap().as_deref(), Some("true"));

        // loading state renders before the native submission
        advance(&mut controller, ms(499));
        assert!(controller.view().submissions.is_empty());
        assert!(controller.scheduler().is_pending(TimerTask::NativeSubmit));

        advance(&mut controller, ms(1));
        assert_eq!(controller.view().submissions.len(), 1);
        assert!(controller.view().submissions[0].remember_me);
        assert_eq!(controller.phase(), SubmitPhase::Submitted);
    }

    #[test]
    fn test_submit_without_remember_me_clears_hint() {
        let store = MemoryStore::new();
        store.set("rememberedUsername", "old@b.com").unwrap();
        store.set("rememberMe", "true").unwrap();

        let mut controller = controller_with(MemoryPage::new(), store.clone());
        controller.view_mut().fill("a@b.com", "123456", false, true);
        controller.handle_submit();

        assert!(store.is_empty());
    }

    #[test]
    fn test_remembered_username_survives_reload() {
        let store = MemoryStore::new();

        let mut first = controller_with(MemoryPage::new(), store.clone());
        first.view_mut().fill("  a@b.com ", "123456", true, true);
        first.handle_submit();

        let second = controller_with(MemoryPage::new(), store.clone());
        assert_eq!(second.view().username.value, "a@b.com");
        assert!(second.view().remember_me);
        assert_eq!(
            second.saved_hint(),
            Some(PersistedCredentialHint::remembering("a@b.com"))
        );
    }

    #[test]
    fn test_second_submit_ignored_while_in_flight() {
        let (mut controller, _) = filled("a@b.com", "123456", false, true);
        controller.handle_submit();
        controller.handle_submit();
        controller.dispatch(PageEvent::KeyDown(KeyEvent::key("Enter").on(Element::Password)));

        let native = controller
            .scheduler()
            .pending()
            .into_iter()
            .filter(|(_, t)| *t == TimerTask::NativeSubmit)
            .count();
        assert_eq!(native, 1);

        advance(&mut controller, ms(500));
        controller.handle_submit();
        advance(&mut controller, ms(500));
        assert_eq!(controller.view().submissions.len(), 1);
    }

    #[test]
    fn test_enter_in_field_submits() {
        let (mut controller, _) = filled("a@b.com", "123456", false, true);
        let outcome =
            controller.dispatch(PageEvent::KeyDown(KeyEvent::key("Enter").on(Element::Username)));

        assert!(outcome.prevent_default);
        assert_eq!(controller.phase(), SubmitPhase::Submitting);
    }

    #[test]
    fn test_remember_me_disabled_by_config() {
        let store = MemoryStore::new();
        store.set("rememberedUsername", "old@b.com").unwrap();
        store.set("rememberMe", "true").unwrap();

        let mut controller = FormController::new(MemoryPage::new(), ManualScheduler::new())
            .with_durable_store(store.clone())
            .with_config(LoginConfig::default().with_remember_me(false));
        controller.init();
        assert_eq!(controller.view().username.value, "");

        controller.view_mut().fill("a@b.com", "123456", true, true);
        controller.handle_submit();
        assert!(store.is_empty());
        assert_eq!(controller.phase(), SubmitPhase::Submitting);
    }

    #[test]
    fn test_storage_failure_does_not_block_submit() {
        let mut controller = FormController::new(MemoryPage::new(), ManualScheduler::new())
            .with_durable_store(UnavailableStore)
            .with_session_store(UnavailableStore);
        controller.init();
        controller.view_mut().fill("a@b.com", "123456", true, true);
        controller.handle_submit();

        advance(&mut controller, ms(500));
        assert_eq!(controller.view().submissions.len(), 1);

        controller.handle_login_error(None);
        assert_eq!(controller.phase(), SubmitPhase::Idle);
        assert!(!controller.is_suspicious());
    }

    // ==================== Server outcome ====================

    #[test]
    fn test_login_error_restores_form() {
        let (mut controller, _) = filled("a@b.com", "wrongpass", false, true);
        controller.handle_submit();
        advance(&mut controller, ms(500));

        controller.handle_login_error(Some("Credenciales inválidas"));
        assert_eq!(controller.phase(), SubmitPhase::Idle);
        assert!(!controller.view().submit.disabled);
        assert_eq!(controller.view().submit.label, "Ingresar");
        assert_eq!(controller.view().focused, Some(Element::Password));
        assert_eq!(controller.view().selected, Some(Element::Password));
        let alert = controller.view().visible_alert().unwrap();
        assert_eq!(alert.message.text, "Credenciales inválidas");
        assert_eq!(alert.message.severity, Severity::Error);

        // retry is allowed
        controller.handle_submit();
        assert_eq!(controller.phase(), SubmitPhase::Submitting);
    }

    #[test]
    fn test_login_error_default_message() {
        let (mut controller, _) = filled("", "", false, false);
        controller.handle_login_error(Some("   "));
        assert_eq!(
            controller.view().visible_alert().unwrap().message.text,
            controller.config().messages.login_error
        );
    }

    #[test]
    fn test_repeated_failures_become_suspicious() {
        let session = MemoryStore::new();
        let mut controller = FormController::new(MemoryPage::new(), ManualScheduler::new())
            .with_session_store(session.clone());
        controller.init();

        for _ in 0..3 {
            controller.handle_login_error(None);
        }
        assert!(!controller.is_suspicious());
        controller.handle_login_error(None);
        assert!(controller.is_suspicious());
        assert_eq!(session.get("failedLoginAttempts").unwrap().as_deref(), Some("4"));

        controller.handle_login_success();
        assert!(!controller.is_suspicious());
    }

    #[test]
    fn test_login_success() {
        let (mut controller, _) = filled("a@b.com", "123456", false, true);
        controller.handle_submit();
        controller.handle_login_success();

        let alert = controller.view().visible_alert().unwrap();
        assert_eq!(alert.message.severity, Severity::Success);
        assert!(!controller.view().submit.loading);
        assert_eq!(controller.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn test_network_error() {
        let (mut controller, _) = filled("a@b.com", "123456", false, true);
        controller.handle_submit();
        advance(&mut controller, ms(500));
        controller.handle_network_error();

        assert!(!controller.view().submit.disabled);
        assert_eq!(
            controller.view().visible_alert().unwrap().message.text,
            controller.config().messages.network_error
        );
        assert_eq!(controller.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn test_reset_form() {
        let (mut controller, _) = filled("bad", "1", true, true);
        controller.handle_submit();
        controller.reset_form();

        let state = controller.form_state();
        assert_eq!(state, FormState::default());
        assert_eq!(controller.view().username.visual, FieldVisual::Neutral);
        assert!(controller.view().password.note.is_none());
    }

    #[test]
    fn test_reset_during_delay_cancels_native_submit() {
        let (mut controller, _) = filled("a@b.com", "123456", false, true);
        controller.handle_submit();
        controller.reset_form();
        assert!(!controller.scheduler().is_pending(TimerTask::NativeSubmit));

        advance(&mut controller, ms(600));
        assert!(controller.view().submissions.is_empty());
        assert_eq!(controller.phase(), SubmitPhase::Idle);
    }

    #[test]
    fn test_resubmit_after_reset_posts_once() {
        let (mut controller, _) = filled("a@b.com", "123456", false, true);
        controller.handle_submit();
        controller.reset_form();

        controller.view_mut().fill("x@y.com", "654321", false, true);
        controller.handle_submit();
        assert_eq!(controller.phase(), SubmitPhase::Submitting);

        advance(&mut controller, ms(600));
        let submissions = controller.view_mut().take_submissions();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].username, "x@y.com");
        assert_eq!(controller.phase(), SubmitPhase::Submitted);
    }

    #[test]
    fn test_outcome_during_delay_cancels_native_submit() {
        let (mut controller, _) = filled("a@b.com", "123456", false, true);

        controller.handle_submit();
        controller.handle_network_error();
        advance(&mut controller, ms(600));
        assert!(controller.view().submissions.is_empty());

        controller.handle_submit();
        controller.handle_login_error(None);
        advance(&mut controller, ms(600));
        assert!(controller.view().submissions.is_empty());

        // the form is still usable afterwards
        controller.handle_submit();
        advance(&mut controller, ms(500));
        assert_eq!(controller.view().submissions.len(), 1);
        assert!(controller.view().submit.disabled);
    }

    // ==================== Password visibility ====================

    #[test]
    fn test_toggle_twice_restores_mask() {
        let (mut controller, _) = filled("", "secret", false, false);
        assert!(!controller.form_state().password_visible);

        controller.dispatch(PageEvent::ToggleClick);
        assert!(controller.form_state().password_visible);
        assert_eq!(controller.view().toggle_icon, ToggleIcon::EyeSlash);
        assert_eq!(controller.view().focused, Some(Element::Password));
        assert_eq!(controller.view().toggle_animation, Some(Animation::Press));

        controller.dispatch(PageEvent::ToggleClick);
        assert_eq!(controller.view().password_kind, InputKind::Masked);
        assert_eq!(controller.view().toggle_icon, ToggleIcon::Eye);
        assert_eq!(controller.view().password.value, "secret");

        advance(&mut controller, ms(100));
        assert_eq!(controller.view().toggle_animation, None);
    }

    #[test]
    fn test_toggle_without_password_field() {
        let mut controller = controller_with(
            MemoryPage::new().without(Element::Password),
            MemoryStore::new(),
        );
        controller.toggle_password_visibility();
        assert_eq!(controller.view().toggle_icon, ToggleIcon::Eye);
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let (mut controller, _) = filled("", "", false, false);

        let outcome = controller.dispatch(PageEvent::KeyDown(KeyEvent::alt("p")));
        assert!(outcome.prevent_default);
        assert_eq!(controller.view().focused, Some(Element::Password));

        controller.dispatch(PageEvent::KeyDown(KeyEvent::alt("L")));
        assert_eq!(controller.view().focused, Some(Element::Username));

        controller.dispatch(PageEvent::KeyDown(KeyEvent::alt("t")));
        assert_eq!(controller.view().password_kind, InputKind::Plain);

        let outcome = controller.dispatch(PageEvent::KeyDown(KeyEvent::key("a")));
        assert!(!outcome.prevent_default);
    }

    // ==================== Alerts ====================

    #[test]
    fn test_only_one_alert_visible() {
        let (mut controller, _) = filled("", "", false, false);
        let first = controller.show_alert("one", Severity::Info);
        let second = controller.show_alert("two", Severity::Warning);

        assert_ne!(first, second);
        assert_eq!(controller.view().alert_ids(), vec![second]);
        assert!(controller.view().visible_alert().unwrap().dismissible);
    }

    #[test]
    fn test_alert_auto_hides() {
        let (mut controller, _) = filled("a@b.com", "123456", true, false);
        let id = controller.show_alert("hola", Severity::Info);

        advance(&mut controller, ms(4_999));
        assert_eq!(controller.view().visible_alert().unwrap().stage, AlertStage::Shown);

        advance(&mut controller, ms(1));
        assert_eq!(controller.view().visible_alert().unwrap().stage, AlertStage::Fading);

        advance(&mut controller, ms(300));
        assert!(!controller.view().has_alert(id));

        let state = controller.form_state();
        assert_eq!(state.username_value, "a@b.com");
        assert_eq!(state.password_value, "123456");
        assert!(state.remember_me);
        assert!(!state.not_robot_checked);
    }

    #[test]
    fn test_replaced_alert_timers_do_not_touch_new_alert() {
        let (mut controller, _) = filled("", "", false, false);
        controller.show_alert("one", Severity::Info);
        advance(&mut controller, ms(3_000));
        let second = controller.show_alert("two", Severity::Info);

        advance(&mut controller, ms(2_500));
        assert_eq!(controller.view().visible_alert().unwrap().stage, AlertStage::Shown);
        assert!(controller.view().has_alert(second));
    }

    #[test]
    fn test_dismiss_keeps_field_values() {
        let (mut controller, _) = filled("a@b.com", "123456", true, false);
        controller.handle_submit();
        let id = controller.view().visible_alert().unwrap().id;

        controller.dispatch(PageEvent::DismissAlert(id));
        assert_eq!(controller.view().visible_alert().unwrap().stage, AlertStage::Fading);
        advance(&mut controller, ms(300));

        assert!(controller.view().alerts.is_empty());
        let state = controller.form_state();
        assert_eq!(state.username_value, "a@b.com");
        assert_eq!(state.password_value, "123456");
        assert!(state.remember_me);

        // the auto-hide timer was cancelled by the dismissal
        advance(&mut controller, ms(10_000));
        assert!(controller.view().alerts.is_empty());
    }

    #[test]
    fn test_server_rendered_alerts_are_adopted() {
        let page = MemoryPage::new().with_server_alert(AlertMessage::error("Credenciales inválidas"));
        let mut controller = controller_with(page, MemoryStore::new());

        assert!(controller.view().visible_alert().unwrap().dismissible);
        let new_id = controller.show_alert("next", Severity::Info);
        assert_eq!(new_id, AlertId(1));

        advance(&mut controller, ms(5_000));
        assert_eq!(controller.view().visible_alert().unwrap().stage, AlertStage::Fading);
        advance(&mut controller, ms(300));
        assert!(controller.view().alerts.is_empty());
    }

    // ==================== Environment ====================

    #[test]
    fn test_initial_focus_goes_to_first_empty_field() {
        let mut controller = controller_with(MemoryPage::new(), MemoryStore::new());
        advance(&mut controller, ms(500));
        assert_eq!(controller.view().focused, Some(Element::Username));

        let store = MemoryStore::new();
        store.set("rememberedUsername", "a@b.com").unwrap();
        store.set("rememberMe", "true").unwrap();
        let mut controller = controller_with(MemoryPage::new(), store);
        advance(&mut controller, ms(500));
        assert_eq!(controller.view().focused, Some(Element::Password));
    }

    #[test]
    fn test_missing_capabilities_warn() {
        let page = MemoryPage::new().with_capabilities(Capabilities {
            storage: false,
            ..Capabilities::default()
        });
        let controller = controller_with(page, MemoryStore::new());

        let alert = controller.view().visible_alert().unwrap();
        assert_eq!(alert.message.severity, Severity::Warning);
        assert_eq!(alert.message.text, controller.config().messages.unsupported_browser);
    }

    #[test]
    fn test_connectivity_marks_form() {
        let (mut controller, _) = filled("", "", false, false);
        controller.dispatch(PageEvent::Connectivity { online: false });
        assert!(controller.view().offline);
        controller.dispatch(PageEvent::Connectivity { online: true });
        assert!(!controller.view().offline);
    }

    #[test]
    fn test_missing_elements_never_panic() {
        let page = MemoryPage::new()
            .without(Element::Form)
            .without(Element::NotRobot)
            .without(Element::RememberMe)
            .without(Element::PasswordToggle)
            .without(Element::SubmitButton);
        let mut controller = controller_with(page, MemoryStore::new());
        controller.view_mut().fill("a@b.com", "123456", true, true);

        controller.dispatch(PageEvent::Submit);
        controller.dispatch(PageEvent::ToggleClick);
        controller.dispatch(PageEvent::RememberMeChanged);
        controller.handle_login_error(None);
        advance(&mut controller, ms(10_000));

        // robot box is missing, so the gate never opens
        assert!(controller.view().submissions.is_empty());
    }

    #[test]
    fn test_unchecking_remember_me_clears_hint() {
        let store = MemoryStore::new();
        store.set("rememberedUsername", "a@b.com").unwrap();
        store.set("rememberMe", "true").unwrap();
        let mut controller = controller_with(MemoryPage::new(), store.clone());
        assert!(controller.view().remember_me);

        controller.view_mut().remember_me = false;
        controller.dispatch(PageEvent::RememberMeChanged);
        assert!(store.is_empty());
    }
}
