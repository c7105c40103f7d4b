//! Plain-text rendering of the in-memory page.

use std::fmt::Write;

use portal_core::{
    AlertStage, Animation, Element, FieldVisual, InputKind, InputState, MemoryPage, PageView,
    RenderedAlert,
};

/// Renders the page as a block of text.
pub fn render_page(page: &MemoryPage) -> String {
    let mut out = String::new();

    for alert in &page.alerts {
        let _ = writeln!(out, "{}", render_alert(alert));
    }

    if page.has(Element::Username) {
        let line = render_input(
            "Usuario",
            &page.username.value,
            &page.username,
            page.focused == Some(Element::Username),
        );
        let _ = writeln!(out, "{}", line);
    }

    if page.has(Element::Password) {
        let shown = match page.password_kind {
            InputKind::Masked => "*".repeat(page.password.value.chars().count()),
            InputKind::Plain => page.password.value.clone(),
        };
        let mut line = render_input(
            "Clave",
            &shown,
            &page.password,
            page.focused == Some(Element::Password),
        );
        if page.has(Element::PasswordToggle) {
            let _ = write!(line, "  <{}>", page.toggle_icon.class_name());
            if page.toggle_animation == Some(Animation::Press) {
                line.push('*');
            }
        }
        let _ = writeln!(out, "{}", line);
    }

    let mut boxes = Vec::new();
    if page.has(Element::RememberMe) {
        boxes.push(format!("[{}] Recordarme", check(page.remember_me)));
    }
    if page.has(Element::NotRobot) {
        boxes.push(format!("[{}] No soy un robot", check(page.not_robot)));
    }
    if !boxes.is_empty() {
        let _ = writeln!(out, "{}", boxes.join("   "));
    }

    if page.has(Element::SubmitButton) {
        let submit = &page.submit;
        let state = if submit.disabled { " (deshabilitado)" } else { "" };
        let spinner = if submit.loading { "~ " } else { "" };
        let _ = writeln!(out, "( {}{} ){}", spinner, submit.label, state);
    }

    if page.offline {
        let _ = writeln!(out, "** sin conexión **");
    }

    out
}

fn render_alert(alert: &RenderedAlert) -> String {
    let mut line = format!(
        "[{} {}] {}",
        alert.id.0,
        alert.message.severity.as_str(),
        alert.message.text
    );
    if alert.dismissible {
        line.push_str("  (x)");
    }
    if alert.stage == AlertStage::Fading {
        line.push_str("  ...");
    }
    line
}

fn render_input(label: &str, shown: &str, input: &InputState, focused: bool) -> String {
    let marker = match input.visual {
        FieldVisual::Neutral => ' ',
        FieldVisual::Valid => '+',
        FieldVisual::Invalid => '!',
    };
    let cursor = if focused { ">" } else { " " };

    let mut line = format!("{}{} {:<8} [{}]", cursor, marker, label, shown);
    if input.animation == Some(Animation::Shake) {
        line.push_str(" ~");
    }
    if let Some(note) = &input.note {
        let _ = write!(line, "  {}", note);
    }
    line
}

fn check(on: bool) -> char {
    if on {
        'x'
    } else {
        ' '
    }
}
