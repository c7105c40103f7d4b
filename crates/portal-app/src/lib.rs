//! Portal - terminal host for the login form.
//!
//! Renders an in-memory login page, drives the form controller from typed
//! commands and posts the native submission to a login endpoint.

pub mod command;
pub mod render;
pub mod session;
pub mod submit;

pub use command::{parse_command, Command, CommandError};
pub use render::render_page;
pub use session::Session;
pub use submit::{classify_response, LoginClient, LoginOutcome, SubmitError};
