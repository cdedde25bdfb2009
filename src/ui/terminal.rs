use std::io::{IsTerminal, Write};

use anstream::{AutoStream, ColorChoice};

use crate::events::{
    RawLine, SessionStart, TestCaseEnd, TestCaseStart, TestStart, TestStatus, TestStop,
};
use crate::ui::renderer::{OutputSink, UiResult};
use crate::ui::theme::{resolve_color_enabled, style_text, MarkKind, OutputMode, Theme};

pub const DEFAULT_PRINT_TIME_MS: u64 = 100;

/// What goes in the counter column at the start of a painted line.
#[derive(Debug, Clone, Copy)]
enum Counter {
    /// `current / total`, or blanks of the same width when the line is fresh
    /// and `force` is off.
    Progress { current: u64, total: u64, force: bool },
    /// Blanks as wide as the last counter painted.
    Blank,
}

/// Live progress view: one repainted line per test case.
pub struct TerminalRenderer<W: Write> {
    writer: W,
    theme: Theme,
    color_enabled: bool,
    print_time_ms: u64,
    // An unfinished line is on screen and the next paint overwrites it.
    needs_newline: bool,
    max_line_len: usize,
    progress_len: usize,
    progress_total: Option<u64>,
    progress_width: usize,
    open_case: Option<(u64, u64)>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(writer: W, color_enabled: bool) -> Self {
        Self {
            writer,
            theme: Theme::default(),
            color_enabled,
            print_time_ms: DEFAULT_PRINT_TIME_MS,
            needs_newline: false,
            max_line_len: 0,
            progress_len: 0,
            progress_total: None,
            progress_width: 0,
            open_case: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Elapsed times below `ms` are not shown on finished case lines.
    pub fn with_print_time(mut self, ms: u64) -> Self {
        self.print_time_ms = ms;
        self
    }

    pub fn needs_newline(&self) -> bool {
        self.needs_newline
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn set_progress_total(&mut self, total: u64) {
        if self.progress_total != Some(total) {
            self.progress_total = Some(total);
            self.progress_width = total.to_string().len();
        }
    }

    fn progress_text(&mut self, current: u64, total: u64) -> String {
        self.set_progress_total(total);
        format!("{current:>width$} / {total}", width = self.progress_width)
    }

    fn paint_line(
        &mut self,
        test_case: &str,
        counter: Counter,
        kind: MarkKind,
        detail: Option<&str>,
    ) -> UiResult<()> {
        if self.needs_newline {
            write!(self.writer, "\r")?;
        } else {
            self.max_line_len = 0;
        }

        let prefix = match counter {
            Counter::Blank => " ".repeat(self.progress_len),
            Counter::Progress {
                current,
                total,
                force,
            } => {
                let text = self.progress_text(current, total);
                let text = if self.needs_newline || force {
                    text
                } else {
                    " ".repeat(text.chars().count())
                };
                self.progress_len = text.chars().count();
                text
            }
        };

        let mark = self.theme.mark(kind);
        let body = format!(" {} {}{}", mark.glyph, test_case, detail.unwrap_or(""));
        let line_len = prefix.chars().count() + body.chars().count();
        let styled = style_text(mark.style, &body, self.color_enabled);

        self.max_line_len = self.max_line_len.max(line_len);
        let padding = " ".repeat(self.max_line_len - line_len);
        write!(self.writer, "{prefix}{styled}{padding}")?;
        Ok(())
    }

    fn finish_event(&mut self) -> UiResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Stdout wrapped for `mode`, plus whether styles should be emitted at all.
pub fn stdout_stream(mode: OutputMode) -> (AutoStream<std::io::Stdout>, bool) {
    let choice = match mode {
        OutputMode::Auto => ColorChoice::Auto,
        OutputMode::Always => ColorChoice::AlwaysAnsi,
        OutputMode::Never => ColorChoice::Never,
    };
    let color_enabled = resolve_color_enabled(mode, std::io::stdout().is_terminal());
    (AutoStream::new(std::io::stdout(), choice), color_enabled)
}

impl<W: Write> OutputSink for TerminalRenderer<W> {
    fn session_start(&mut self, event: &SessionStart) -> UiResult<()> {
        self.set_progress_total(event.total_test_cases);
        Ok(())
    }

    fn test_case_start(&mut self, event: &TestCaseStart) -> UiResult<()> {
        self.paint_line(
            &event.name,
            Counter::Progress {
                current: event.index,
                total: event.total_cases,
                force: true,
            },
            MarkKind::Pending,
            None,
        )?;
        self.needs_newline = true;
        self.open_case = Some((event.index, event.total_cases));
        self.finish_event()
    }

    fn test_case_end(&mut self, event: &TestCaseEnd) -> UiResult<()> {
        let counter = Counter::Progress {
            current: event.index,
            total: event.total_cases,
            force: false,
        };
        if event.fail_count == 0 {
            self.paint_line(&event.name, counter, MarkKind::Success, None)?;
        } else {
            let detail = format!(" - {}/{} failed", event.fail_count, event.test_count);
            self.paint_line(&event.name, counter, MarkKind::Failure, Some(&detail))?;
        }

        match event.elapsed_ms {
            Some(ms) if ms >= self.print_time_ms => writeln!(self.writer, " ({ms} ms)")?,
            _ => writeln!(self.writer)?,
        }
        self.needs_newline = false;
        self.open_case = None;
        self.finish_event()
    }

    fn test_start(&mut self, event: &TestStart) -> UiResult<()> {
        let counter = match self.open_case {
            Some((current, total)) => Counter::Progress {
                current,
                total,
                force: false,
            },
            None => Counter::Blank,
        };
        let detail = format!(".{}", event.test);
        self.paint_line(&event.test_case, counter, MarkKind::Pending, Some(&detail))?;
        self.needs_newline = true;
        self.finish_event()
    }

    fn test_stop(&mut self, event: &TestStop) -> UiResult<()> {
        if event.status == TestStatus::Failed {
            let detail = format!(".{}", event.test);
            self.paint_line(&event.test_case, Counter::Blank, MarkKind::Failure, Some(&detail))?;
            writeln!(self.writer)?;
            self.needs_newline = false;
        }
        self.finish_event()
    }

    fn raw_line(&mut self, event: &RawLine) -> UiResult<()> {
        if self.needs_newline {
            writeln!(self.writer)?;
            self.needs_newline = false;
        }
        self.writer.write_all(event.text.as_bytes())?;
        self.finish_event()
    }
}

#[cfg(test)]
#[path = "../tests/terminal_tests.rs"]
mod tests;
