use std::io::{IsTerminal, Write};

use anstream::{AutoStream, ColorChoice};
use anstyle::{AnsiColor, Color, Style};

use crate::ui::renderer::UiResult;
use crate::ui::theme::{resolve_color_enabled, style_text, OutputMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub title: String,
    pub body: String,
    pub hint: Option<String>,
}

impl MessageBlock {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

pub fn write_error_block<W: Write>(
    writer: &mut W,
    color_enabled: bool,
    block: &MessageBlock,
) -> UiResult<()> {
    let error = Style::new()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)))
        .bold();
    let muted = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));
    let marker = style_text(error, "[error]", color_enabled);
    writeln!(writer, "{marker} {}", block.title)?;
    writeln!(writer, "  {}", block.body)?;
    if let Some(hint) = &block.hint {
        let hint_label = style_text(muted, "hint", color_enabled);
        writeln!(writer, "  {hint_label}: {hint}")?;
    }
    Ok(())
}

/// Prints `block` to stderr, colored according to `mode`.
pub fn report_error(mode: OutputMode, block: &MessageBlock) -> UiResult<()> {
    let choice = match mode {
        OutputMode::Auto => ColorChoice::Auto,
        OutputMode::Always => ColorChoice::AlwaysAnsi,
        OutputMode::Never => ColorChoice::Never,
    };
    let color_enabled = resolve_color_enabled(mode, std::io::stderr().is_terminal());
    let mut stream = AutoStream::new(std::io::stderr(), choice);
    write_error_block(&mut stream, color_enabled, block)
}
