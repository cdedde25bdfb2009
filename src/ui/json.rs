use std::io::Write;

use crate::events::{
    Event, RawLine, SessionStart, TestCaseEnd, TestCaseStart, TestStart, TestStop,
};
use crate::ui::renderer::{OutputSink, UiResult};

/// Writes every lifecycle event as one JSON object per line.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_event(&mut self, event: Event) -> UiResult<()> {
        let encoded = serde_json::to_string(&event)?;
        writeln!(self.writer, "{encoded}")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> OutputSink for JsonSink<W> {
    fn session_start(&mut self, event: &SessionStart) -> UiResult<()> {
        self.write_event(Event::SessionStart(event.clone()))
    }

    fn test_case_start(&mut self, event: &TestCaseStart) -> UiResult<()> {
        self.write_event(Event::TestCaseStart(event.clone()))
    }

    fn test_case_end(&mut self, event: &TestCaseEnd) -> UiResult<()> {
        self.write_event(Event::TestCaseEnd(event.clone()))
    }

    fn test_start(&mut self, event: &TestStart) -> UiResult<()> {
        self.write_event(Event::TestStart(event.clone()))
    }

    fn test_stop(&mut self, event: &TestStop) -> UiResult<()> {
        self.write_event(Event::TestStop(event.clone()))
    }

    fn raw_line(&mut self, event: &RawLine) -> UiResult<()> {
        self.write_event(Event::RawLine(event.clone()))
    }
}
