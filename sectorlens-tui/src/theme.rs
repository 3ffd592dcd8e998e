//! Style tokens shared by every panel.
//!
//! Dark background, cyan accent, green for gains, pink for losses. Missing
//! values keep the muted style so they read as absent rather than zero.

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT: Color = Color::White;

/// Line colors for multi-series charts, cycled by series index.
pub const SERIES: [Color; 8] = [
    Color::Rgb(0, 255, 255),
    Color::Rgb(255, 140, 0),
    Color::Rgb(0, 255, 128),
    Color::Rgb(255, 20, 147),
    Color::Rgb(147, 112, 219),
    Color::Rgb(255, 255, 0),
    Color::Rgb(100, 149, 237),
    Color::Rgb(255, 105, 97),
];

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

pub fn selected_row() -> Style {
    accent().add_modifier(Modifier::REVERSED)
}

pub fn series_color(i: usize) -> Color {
    SERIES[i % SERIES.len()]
}

/// Gains green, losses pink, undefined muted.
pub fn metric_color(value: f64) -> Style {
    if !value.is_finite() {
        muted()
    } else if value >= 0.0 {
        positive()
    } else {
        negative()
    }
}

/// Heat table cell: background intensity follows |r|, hue follows sign.
pub fn heat_style(r: f64) -> Style {
    if !r.is_finite() {
        return muted();
    }
    let level = (r.abs().min(1.0) * 200.0) as u8;
    let bg = if r >= 0.0 {
        Color::Rgb(0, level / 2, level)
    } else {
        Color::Rgb(level, 0, level / 2)
    };
    let fg = if level > 120 { Color::White } else { Color::Gray };
    Style::default().bg(bg).fg(fg)
}
