//! CLI color functions.
//!
//! All functions respect `NO_COLOR`, `FORCE_COLOR`, and TTY detection via
//! `owo-colors`' `if_supports_color()`.

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    // Set the env var so supports-color picks it up for all subsequent calls.
    // SAFETY: Called once at startup before any threads are spawned.
    unsafe { std::env::set_var("NO_COLOR", "1") };
}

// Accent (cloud and resource names): #7CB4C8
const ACCENT: (u8, u8, u8) = (124, 180, 200);

// Success: #6B8F5E
const SUCCESS: (u8, u8, u8) = (107, 143, 94);

// Warning / pending: #C49A5C
const CAUTION: (u8, u8, u8) = (196, 154, 92);

// Error / destructive: #B87060
const DANGER: (u8, u8, u8) = (184, 112, 96);

// Secondary info, borders: #5C6370
const MUTED: (u8, u8, u8) = (92, 99, 112);

pub fn accent(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(ACCENT.0, ACCENT.1, ACCENT.2))
        .to_string()
}

pub fn success(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(SUCCESS.0, SUCCESS.1, SUCCESS.2))
        .to_string()
}

pub fn caution(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(CAUTION.0, CAUTION.1, CAUTION.2))
        .to_string()
}

pub fn danger(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(DANGER.0, DANGER.1, DANGER.2))
        .to_string()
}

pub fn bold(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

pub fn muted(text: &str) -> String {
    text.if_supports_color(Stdout, |t| t.truecolor(MUTED.0, MUTED.1, MUTED.2))
        .to_string()
}

/// Color-code what happened (or would happen) to a resource.
pub fn action(action_str: &str) -> String {
    match action_str {
        "deleted" => success(action_str),
        "flagged" | "new" => caution(action_str),
        "failed" => danger(action_str),
        "would delete" | "would flag" => muted(action_str),
        _ => action_str.to_string(),
    }
}

/// Error styling for stderr messages.
pub fn error(text: &str) -> String {
    text.if_supports_color(Stderr, |t| t.truecolor(DANGER.0, DANGER.1, DANGER.2))
        .to_string()
}

/// Warning styling for stderr messages.
pub fn warning(text: &str) -> String {
    text.if_supports_color(Stderr, |t| t.truecolor(CAUTION.0, CAUTION.1, CAUTION.2))
        .to_string()
}

pub fn hint(text: &str) -> String {
    text.if_supports_color(Stderr, |t| t.truecolor(MUTED.0, MUTED.1, MUTED.2))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_functions_keep_input_text() {
        assert!(accent("research").contains("research"));
        assert!(success("ok").contains("ok"));
        assert!(caution("pending").contains("pending"));
        assert!(danger("boom").contains("boom"));
        assert!(bold("Header").contains("Header"));
        assert!(muted("│").contains("│"));
        assert!(error("error msg").contains("error msg"));
        assert!(warning("careful").contains("careful"));
        assert!(hint("try --force").contains("try --force"));
    }

    #[test]
    fn test_action_maps_correctly() {
        assert!(action("deleted").contains("deleted"));
        assert!(action("flagged").contains("flagged"));
        assert!(action("failed").contains("failed"));
        assert!(action("would delete").contains("would delete"));
        assert_eq!(action("other"), "other");
    }
}
