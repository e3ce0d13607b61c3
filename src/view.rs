//! Terminal rendering of a [`MemorySnapshot`].
//!
//! Nothing here touches the manager; colors are derived from frame owners
//! every time a snapshot is drawn.

use std::fmt::Write;

use crate::manager::MemorySnapshot;
use crate::memory::{Frame, Tier};
use crate::process::ProcessId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
}

const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];

impl Color {
    fn ansi_background(self) -> &'static str {
        match self {
            Color::White => "\x1b[30;47m",
            Color::Red => "\x1b[97;41m",
            Color::Green => "\x1b[30;42m",
            Color::Blue => "\x1b[97;44m",
            Color::Yellow => "\x1b[30;43m",
            Color::Magenta => "\x1b[97;45m",
            Color::Cyan => "\x1b[30;46m",
        }
    }
}

/// Free frames are white; process 1 is red, 2 green, 3 blue, and higher ids
/// keep cycling through the palette.
pub fn color_for(owner: Option<ProcessId>) -> Color {
    match owner {
        None => Color::White,
        Some(pid) => PALETTE[pid.saturating_sub(1) as usize % PALETTE.len()],
    }
}

fn cell(frame: &Frame, color: bool) -> String {
    let label = match frame.owner() {
        Some(pid) => format!("{:^4}", pid),
        None => format!("{:^4}", "."),
    };
    if color {
        format!("{}{}\x1b[0m", color_for(frame.owner()).ansi_background(), label)
    } else {
        label
    }
}

fn tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Physical => "Memory",
        Tier::Virtual => "Virtual Memory",
    }
}

/// Draw both pools and the remaining time of every running process
pub fn render(snapshot: &MemorySnapshot, color: bool) -> String {
    let mut out = String::new();

    for tier in [Tier::Physical, Tier::Virtual] {
        let _ = write!(out, "{:<15}|", tier_label(tier));
        for frame in snapshot.frames(tier) {
            let _ = write!(out, "{}|", cell(frame, color));
        }
        out.push('\n');
    }

    for (pid, remaining) in snapshot.remaining_lifetimes() {
        let _ = writeln!(out, "Process {} - Time Left: {}", pid, remaining);
    }
    out
}
