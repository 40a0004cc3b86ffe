//! Terminal output renderer for conversation lines.
//!
//! Prints one `role: content` line per transcript append, plus status and
//! error lines. Color is optional so output stays pipeable.

use crate::types::Role;
use crossterm::style::{Color, Stylize};

/// Console renderer driven by the loop's observer events.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn role_color(role: Role) -> Color {
        match role {
            Role::System => Color::DarkGrey,
            Role::User => Color::Green,
            Role::Assistant => Color::Cyan,
            Role::Function => Color::Magenta,
        }
    }

    /// Render one conversation line.
    pub fn message(&self, role: Role, content: &str) {
        if self.color {
            println!("{}: {content}", role.to_string().with(Self::role_color(role)));
        } else {
            println!("{role}: {content}");
        }
    }

    /// Render a pending function call requested by the model.
    pub fn function_call(&self, name: &str, arguments: &str) {
        let line = format!("{name}({arguments})");
        if self.color {
            println!(
                "{}: {}",
                "assistant".with(Self::role_color(Role::Assistant)),
                line.with(Color::DarkYellow)
            );
        } else {
            println!("assistant: {line}");
        }
    }

    /// Render a warning line to stderr.
    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", "warning:".with(Color::Yellow));
        } else {
            eprintln!("warning: {msg}");
        }
    }

    /// Render an error line to stderr.
    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", "error:".with(Color::Red));
        } else {
            eprintln!("error: {msg}");
        }
    }

    /// Render the startup banner.
    pub fn banner(&self, text: &str) {
        if self.color {
            println!("{}", text.with(Color::DarkGrey));
        } else {
            println!("{text}");
        }
    }
}
