//! Portal Core - login form behavior.
//!
//! This crate drives the client side of a login page. It handles:
//!
//! - Field validation (email-shaped username, minimum password length)
//! - Submission gating and the delayed native submit
//! - Remembered username persistence and a per-session failed attempt counter
//! - Alerts with auto-hide and dismissal
//! - Password visibility toggle and keyboard shortcuts
//!
//! The page itself, the storage backends and the clock are injected through
//! the [`PageView`], [`KeyValueStore`] and [`Scheduler`] traits.
//!
//! # Example
//!
//! ```
//! use portal_core::{FormController, ManualScheduler, MemoryPage, MemoryStore, PageEvent};
//!
//! let store = MemoryStore::new();
//! let mut page = MemoryPage::new();
//! page.fill("user@example.com", "hunter22", true, true);
//!
//! let mut controller = FormController::new(page, ManualScheduler::new())
//!     .with_durable_store(store.clone());
//! controller.init();
//! controller.dispatch(PageEvent::Submit);
//!
//! assert_eq!(controller.saved_hint().unwrap().prefill(), Some("user@example.com"));
//! ```

pub mod alert;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod form;
pub mod keyboard;
pub mod scheduler;
pub mod storage;
pub mod validation;
pub mod view;

pub use alert::{AlertId, AlertMessage, AlertStage, Severity};
pub use config::{Features, LoginConfig, Messages, StorageKeys, Timings};
pub use controller::FormController;
pub use error::{ConfigError, Result, StoreError};
pub use events::{EventOutcome, PageEvent};
pub use form::{Element, Field, FieldValidationResult, FormState, Submission, SubmitPhase};
pub use keyboard::{KeyEvent, Shortcut};
pub use scheduler::{
    Clock, ManualClock, ManualScheduler, Scheduler, SystemClock, SystemScheduler, TimerId,
    TimerQueue, TimerTask,
};
pub use storage::{
    CredentialHints, FailedAttempts, KeyValueStore, MemoryStore, PersistedCredentialHint,
    UnavailableStore,
};
pub use view::{
    Animation, Capabilities, FieldVisual, InputKind, InputState, MemoryPage, PageView,
    RenderedAlert, SubmitButton, ToggleIcon,
};
