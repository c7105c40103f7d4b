//! Interactive terminal session around a [`FormController`].

use std::io::Write;
use std::time::Duration;

use portal_core::{
    Element, Field, FormController, MemoryPage, PageEvent, PageView, Scheduler, Submission,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::command::{parse_command, Command, HELP};
use crate::render::render_page;
use crate::submit::{LoginClient, LoginOutcome};

/// Idle wake-up when no timer is pending.
const IDLE_POLL: Duration = Duration::from_secs(3600);

/// A login page driven from the terminal.
pub struct Session<T> {
    controller: FormController<MemoryPage, T>,
    client: Option<LoginClient>,
}

impl<T: Scheduler> Session<T> {
    /// Wraps an initialized controller. Without a client, submissions are
    /// only reported.
    pub fn new(controller: FormController<MemoryPage, T>, client: Option<LoginClient>) -> Self {
        Self { controller, client }
    }

    pub fn controller(&self) -> &FormController<MemoryPage, T> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FormController<MemoryPage, T> {
        &mut self.controller
    }

    /// Applies a page command. Host commands (`wait`, `show`, `quit`, ...)
    /// are ignored here.
    pub fn apply(&mut self, command: Command) {
        let controller = &mut self.controller;
        match command {
            Command::Username(text) => type_into(controller, Field::Username, &text),
            Command::Password(text) => type_into(controller, Field::Password, &text),
            Command::RememberMe(on) => {
                controller.view_mut().set_checked(Element::RememberMe, on);
                controller.dispatch(PageEvent::RememberMeChanged);
            }
            Command::NotRobot(on) => controller.view_mut().set_checked(Element::NotRobot, on),
            Command::Toggle => {
                controller.dispatch(PageEvent::ToggleClick);
            }
            Command::Submit => {
                controller.dispatch(PageEvent::Submit);
            }
            Command::Key(key) => {
                controller.dispatch(PageEvent::KeyDown(key));
            }
            Command::Focus(element) => {
                controller.view_mut().focus(element);
                controller.dispatch(PageEvent::Focus(element));
            }
            Command::Blur(element) => {
                if controller.view().focused == Some(element) {
                    controller.view_mut().focused = None;
                }
                controller.dispatch(PageEvent::Blur(element));
            }
            Command::Dismiss(id) => {
                controller.dispatch(PageEvent::DismissAlert(id));
            }
            Command::Online(online) => {
                controller.dispatch(PageEvent::Connectivity { online });
            }
            Command::Reset => controller.reset_form(),
            Command::Wait(_) | Command::Show | Command::Json | Command::Help | Command::Quit => {}
        }
    }

    /// Routes the server's answer back into the controller.
    pub fn report(&mut self, outcome: LoginOutcome) {
        match outcome {
            LoginOutcome::Accepted => self.controller.handle_login_success(),
            LoginOutcome::Rejected(message) => {
                self.controller.handle_login_error(message.as_deref())
            }
            LoginOutcome::Unreachable => self.controller.handle_network_error(),
        }
    }

    /// Runs due timers and delivers any native submission they produced.
    pub async fn tick(&mut self, out: &mut impl Write) -> std::io::Result<()> {
        self.controller.run_due_timers();

        for submission in self.controller.view_mut().take_submissions() {
            self.deliver(submission, out).await?;
        }
        Ok(())
    }

    async fn deliver(&mut self, submission: Submission, out: &mut impl Write) -> std::io::Result<()> {
        let Some(client) = self.client.clone() else {
            info!(username = %submission.username, "Form submitted with no endpoint configured");
            writeln!(
                out,
                "-> submitted as {} (no endpoint; use `reset` to start over)",
                submission.username
            )?;
            return Ok(());
        };

        writeln!(out, "-> POST {}", client.endpoint())?;
        let outcome = client.post(&submission).await;
        debug!(?outcome, "Submission delivered");
        self.report(outcome);
        Ok(())
    }

    /// Reads commands until `quit` or end of input, running timers as they
    /// come due.
    pub async fn run<R>(&mut self, input: R, out: &mut impl Write) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        writeln!(out, "{}", render_page(self.controller.view()))?;

        loop {
            let idle = self.controller.scheduler().next_due_in().unwrap_or(IDLE_POLL);

            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };

                    let command = match parse_command(&line, self.controller.view().focused) {
                        Ok(command) => command,
                        Err(e) => {
                            writeln!(out, "{} (try `help`)", e)?;
                            continue;
                        }
                    };

                    match command {
                        Command::Quit => break,
                        Command::Help => {
                            writeln!(out, "{}", HELP)?;
                            continue;
                        }
                        Command::Json => {
                            writeln!(out, "{}", serde_json::to_string_pretty(self.controller.view())?)?;
                            continue;
                        }
                        Command::Wait(delay) => tokio::time::sleep(delay).await,
                        other => self.apply(other),
                    }

                    self.tick(out).await?;
                    writeln!(out, "{}", render_page(self.controller.view()))?;
                }
                _ = tokio::time::sleep(idle) => {
                    self.tick(out).await?;
                }
            }
        }

        info!("Session ended");
        Ok(())
    }
}

fn type_into<T: Scheduler>(controller: &mut FormController<MemoryPage, T>, field: Field, text: &str) {
    controller.view_mut().set_value(field.element(), text);
    controller.dispatch(PageEvent::Input(field));
}
