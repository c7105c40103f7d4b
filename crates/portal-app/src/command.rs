//! Terminal commands understood by the host page.

use std::time::Duration;

use portal_core::{AlertId, Element, Field, KeyEvent};
use thiserror::Error;

/// Errors parsing a command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{command} expects {expected}")]
    BadArgument {
        command: &'static str,
        expected: &'static str,
    },
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the username text.
    Username(String),
    /// Replace the password text.
    Password(String),
    RememberMe(bool),
    NotRobot(bool),
    /// Click the password visibility toggle.
    Toggle,
    /// Click the submit button.
    Submit,
    /// A key press with the given element focused.
    Key(KeyEvent),
    Focus(Element),
    Blur(Element),
    Dismiss(AlertId),
    Online(bool),
    Reset,
    /// Let the page idle for a while.
    Wait(Duration),
    /// Print the page.
    Show,
    /// Print the page as JSON.
    Json,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  user <text>        type into the username field
  pass <text>        type into the password field
  remember on|off    remember-me checkbox
  robot on|off       not-a-robot checkbox
  toggle             show or hide the password
  submit             click the submit button
  enter              press Enter in the focused field
  key alt+<letter>   keyboard shortcut (alt+l, alt+p, alt+t)
  focus <field>      focus user, pass or submit
  blur <field>       leave user, pass or submit
  dismiss <n>        close alert n
  online | offline   connectivity change
  reset              reset the form
  wait <ms>          let timers run
  show | json        print the page
  help | quit";

/// Parses one input line.
///
/// `focused` is the element that currently has focus, used as the target of
/// `enter` and `key` presses.
pub fn parse_command(line: &str, focused: Option<Element>) -> Result<Command, CommandError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "user" | "u" => Command::Username(rest.to_string()),
        "pass" | "p" => Command::Password(rest.to_string()),
        "remember" => Command::RememberMe(parse_switch("remember", rest)?),
        "robot" => Command::NotRobot(parse_switch("robot", rest)?),
        "toggle" => Command::Toggle,
        "submit" => Command::Submit,
        "enter" => {
            let mut key = KeyEvent::key("Enter");
            key.target = focused;
            Command::Key(key)
        }
        "key" => Command::Key(parse_key(rest, focused)?),
        "focus" => Command::Focus(parse_element("focus", rest)?),
        "blur" => Command::Blur(parse_element("blur", rest)?),
        "dismiss" => {
            let id = rest.parse().map_err(|_| CommandError::BadArgument {
                command: "dismiss",
                expected: "an alert number",
            })?;
            Command::Dismiss(AlertId(id))
        }
        "online" => Command::Online(true),
        "offline" => Command::Online(false),
        "reset" => Command::Reset,
        "wait" => {
            let ms: u64 = rest.parse().map_err(|_| CommandError::BadArgument {
                command: "wait",
                expected: "milliseconds",
            })?;
            Command::Wait(Duration::from_millis(ms))
        }
        "show" | "" => Command::Show,
        "json" => Command::Json,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(command)
}

fn parse_switch(command: &'static str, arg: &str) -> Result<bool, CommandError> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        _ => Err(CommandError::BadArgument {
            command,
            expected: "on or off",
        }),
    }
}

fn parse_element(command: &'static str, arg: &str) -> Result<Element, CommandError> {
    match arg.to_ascii_lowercase().as_str() {
        "user" | "username" => Ok(Field::Username.element()),
        "pass" | "password" => Ok(Field::Password.element()),
        "submit" => Ok(Element::SubmitButton),
        _ => Err(CommandError::BadArgument {
            command,
            expected: "user, pass or submit",
        }),
    }
}

fn parse_key(arg: &str, focused: Option<Element>) -> Result<KeyEvent, CommandError> {
    let bad = || CommandError::BadArgument {
        command: "key",
        expected: "a key such as alt+l or enter",
    };

    if arg.is_empty() {
        return Err(bad());
    }

    let mut event = KeyEvent::default();
    let mut parts: Vec<&str> = arg.split('+').collect();
    let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(bad)?;

    for modifier in parts {
        match modifier.to_ascii_lowercase().as_str() {
            "alt" => event.alt = true,
            "ctrl" => event.ctrl = true,
            "shift" => event.shift = true,
            _ => return Err(bad()),
        }
    }

    event.key = if key.eq_ignore_ascii_case("enter") {
        "Enter".to_string()
    } else {
        key.to_string()
    };
    event.target = focused;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_commands_keep_inner_spaces() {
        assert_eq!(
            parse_command("user  a@b.com ", None),
            Ok(Command::Username("a@b.com".into()))
        );
        assert_eq!(
            parse_command("pass my secret", None),
            Ok(Command::Password("my secret".into()))
        );
        assert_eq!(parse_command("pass", None), Ok(Command::Password(String::new())));
    }

    #[test]
    fn test_switches() {
        assert_eq!(parse_command("robot on", None), Ok(Command::NotRobot(true)));
        assert_eq!(parse_command("remember OFF", None), Ok(Command::RememberMe(false)));
        assert!(matches!(
            parse_command("robot maybe", None),
            Err(CommandError::BadArgument { command: "robot", .. })
        ));
    }

    #[test]
    fn test_enter_targets_focused_element() {
        let Ok(Command::Key(key)) = parse_command("enter", Some(Element::Password)) else {
            panic!("expected key command");
        };
        assert_eq!(key.key, "Enter");
        assert_eq!(key.target, Some(Element::Password));
    }

    #[test]
    fn test_key_with_modifiers() {
        let Ok(Command::Key(key)) = parse_command("key Alt+T", None) else {
            panic!("expected key command");
        };
        assert!(key.alt);
        assert_eq!(key.key, "T");

        assert!(parse_command("key super+t", None).is_err());
        assert!(parse_command("key alt+", None).is_err());
        assert!(parse_command("key", None).is_err());
    }

    #[test]
    fn test_focus_and_dismiss() {
        assert_eq!(
            parse_command("focus pass", None),
            Ok(Command::Focus(Element::Password))
        );
        assert_eq!(parse_command("dismiss 2", None), Ok(Command::Dismiss(AlertId(2))));
        assert!(parse_command("dismiss two", None).is_err());
    }

    #[test]
    fn test_wait_and_misc() {
        assert_eq!(
            parse_command("wait 600", None),
            Ok(Command::Wait(Duration::from_millis(600)))
        );
        assert_eq!(parse_command("", None), Ok(Command::Show));
        assert_eq!(parse_command("offline", None), Ok(Command::Online(false)));
        assert_eq!(parse_command("quit", None), Ok(Command::Quit));
        assert_eq!(
            parse_command("dance", None),
            Err(CommandError::Unknown("dance".into()))
        );
    }
}
