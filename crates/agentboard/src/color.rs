//! CLI color functions.
//!
//! Every function respects `NO_COLOR`, `FORCE_COLOR` and TTY detection through
//! `owo-colors`' `if_supports_color()`. The `--no-color` flag sets an in-process
//! flag that bypasses owo-colors entirely.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use owo_colors::Stream::{Stderr, Stdout};

use agentboard_core::{AgentStatus, PrStatus};

static NO_COLOR_FLAG: AtomicBool = AtomicBool::new(false);

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    NO_COLOR_FLAG.store(true, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

const ICE: Rgb = Rgb::from_hex(0x7CB4C8); // Primary accent
const AURORA: Rgb = Rgb::from_hex(0x6B8F5E); // Success
const COPPER: Rgb = Rgb::from_hex(0xC49A5C); // Warning/in progress
const EMBER: Rgb = Rgb::from_hex(0xB87060); // Error
const KIRI: Rgb = Rgb::from_hex(0xA088B0); // Agents
const MUTED: Rgb = Rgb::from_hex(0x5C6370); // Secondary info

fn no_color() -> bool {
    NO_COLOR_FLAG.load(Ordering::Relaxed)
}

fn paint(text: &str, rgb: Rgb) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.truecolor(rgb.r, rgb.g, rgb.b))
        .to_string()
}

fn paint_stderr(text: &str, rgb: Rgb) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stderr, |t| t.truecolor(rgb.r, rgb.g, rgb.b))
        .to_string()
}

/// Repository names and links.
pub fn ice(text: &str) -> String {
    paint(text, ICE)
}

pub fn aurora(text: &str) -> String {
    paint(text, AURORA)
}

pub fn copper(text: &str) -> String {
    paint(text, COPPER)
}

pub fn ember(text: &str) -> String {
    paint(text, EMBER)
}

/// Agent names.
pub fn kiri(text: &str) -> String {
    paint(text, KIRI)
}

pub fn bold(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

/// Borders, hints and other secondary text.
pub fn muted(text: &str) -> String {
    paint(text, MUTED)
}

/// Color an already padded cell by agent status.
pub fn agent_status(status: AgentStatus, text: &str) -> String {
    match status {
        AgentStatus::Creating | AgentStatus::Running => copper(text),
        AgentStatus::Finished => aurora(text),
        AgentStatus::Error => ember(text),
        AgentStatus::Stopped | AgentStatus::Expired => muted(text),
    }
}

/// Color an already padded cell by pull request status.
pub fn pr_status(status: Option<PrStatus>, text: &str) -> String {
    match status {
        Some(PrStatus::Open) => aurora(text),
        Some(PrStatus::Merged) => kiri(text),
        Some(PrStatus::Closed) => ember(text),
        None => muted(text),
    }
}

/// Error styling for stderr.
pub fn error(text: &str) -> String {
    paint_stderr(text, EMBER)
}

/// Warning styling for stderr.
pub fn warning(text: &str) -> String {
    paint_stderr(text, COPPER)
}

/// Secondary info on stderr.
pub fn hint(text: &str) -> String {
    paint_stderr(text, MUTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        let c = Rgb::from_hex(0x7CB4C8);
        assert_eq!(c.r, 124);
        assert_eq!(c.g, 180);
        assert_eq!(c.b, 200);
    }

    #[test]
    fn test_no_color_flag_disables_all_formatting() {
        NO_COLOR_FLAG.store(true, Ordering::Relaxed);

        assert_eq!(ice("test"), "test");
        assert_eq!(kiri("test"), "test");
        assert_eq!(bold("test"), "test");
        assert_eq!(agent_status(AgentStatus::Error, "ERROR"), "ERROR");
        assert_eq!(pr_status(Some(PrStatus::Merged), "merged"), "merged");
        assert_eq!(pr_status(None, "-"), "-");
        assert_eq!(error("test"), "test");
        assert_eq!(warning("test"), "test");
        assert_eq!(hint("test"), "test");

        NO_COLOR_FLAG.store(false, Ordering::Relaxed);
    }
}
