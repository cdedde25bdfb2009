use anstyle::{AnsiColor, Color, Style};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    Auto,
    Always,
    Never,
}

impl OutputMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto" => Some(OutputMode::Auto),
            "always" => Some(OutputMode::Always),
            "never" => Some(OutputMode::Never),
            _ => None,
        }
    }

    /// Color override from `GTEST_PRETTY_COLOR`, if set to a known value.
    pub fn from_env() -> Option<Self> {
        std::env::var("GTEST_PRETTY_COLOR")
            .ok()
            .as_deref()
            .and_then(Self::parse)
    }
}

/// Which of the three progress states a line is painted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Pending,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub glyph: String,
    pub style: Style,
}

impl Mark {
    pub fn new(glyph: impl Into<String>, style: Style) -> Self {
        Self {
            glyph: glyph.into(),
            style,
        }
    }
}

/// Glyph and color for each progress state.
///
/// Glyphs within one theme should share a display width so the case name
/// column does not shift between repaints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub pending: Mark,
    pub success: Mark,
    pub failure: Mark,
}

impl Theme {
    pub fn rich() -> Self {
        Self {
            pending: Mark::new(" ", Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue)))),
            success: Mark::new(
                "✓",
                Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))),
            ),
            failure: Mark::new("✗", Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)))),
        }
    }

    pub fn plain() -> Self {
        Self {
            pending: Mark::new("  ", Style::new()),
            success: Mark::new("OK", Style::new()),
            failure: Mark::new(" X", Style::new()),
        }
    }

    pub fn mark(&self, kind: MarkKind) -> &Mark {
        match kind {
            MarkKind::Pending => &self.pending,
            MarkKind::Success => &self.success,
            MarkKind::Failure => &self.failure,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::rich()
    }
}

pub fn resolve_color_enabled(mode: OutputMode, is_tty: bool) -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    match mode {
        OutputMode::Always => true,
        OutputMode::Never => false,
        OutputMode::Auto => is_tty,
    }
}

pub(crate) fn style_text(style: Style, text: &str, color_enabled: bool) -> String {
    if !color_enabled || style == Style::new() {
        return text.to_owned();
    }
    format!("{}{}{}", style.render(), text, style.render_reset())
}
