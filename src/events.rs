//! Lifecycle events produced by the session parser.
//!
//! Events are plain values: the parser builds one, hands it to an
//! [`OutputSink`](crate::ui::OutputSink) by reference and never touches it again.

use serde::Serialize;

use crate::ui::renderer::{OutputSink, UiResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStart {
    pub total_tests: u64,
    pub total_test_cases: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseStart {
    pub name: String,
    pub index: u64,
    pub total_cases: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseEnd {
    pub name: String,
    pub index: u64,
    pub total_cases: u64,
    pub test_count: u64,
    pub fail_count: u64,
    /// `None` when the marker carried no timing, which is not the same as 0 ms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestStart {
    pub test_case: String,
    pub test: String,
    pub test_index: u64,
    pub test_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl TestStatus {
    pub fn from_marker(token: &str) -> Option<Self> {
        match token {
            "OK" => Some(TestStatus::Passed),
            "FAILED" => Some(TestStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestStop {
    pub status: TestStatus,
    pub test_case: String,
    pub test: String,
    pub test_index: u64,
    pub test_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributed_test: Option<String>,
    /// The line exactly as received, terminator included.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    SessionStart(SessionStart),
    TestCaseStart(TestCaseStart),
    TestCaseEnd(TestCaseEnd),
    TestStart(TestStart),
    TestStop(TestStop),
    RawLine(RawLine),
}

/// Sink that keeps every event it receives, in order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<Event>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl OutputSink for EventRecorder {
    fn session_start(&mut self, event: &SessionStart) -> UiResult<()> {
        self.events.push(Event::SessionStart(event.clone()));
        Ok(())
    }

    fn test_case_start(&mut self, event: &TestCaseStart) -> UiResult<()> {
        self.events.push(Event::TestCaseStart(event.clone()));
        Ok(())
    }

    fn test_case_end(&mut self, event: &TestCaseEnd) -> UiResult<()> {
        self.events.push(Event::TestCaseEnd(event.clone()));
        Ok(())
    }

    fn test_start(&mut self, event: &TestStart) -> UiResult<()> {
        self.events.push(Event::TestStart(event.clone()));
        Ok(())
    }

    fn test_stop(&mut self, event: &TestStop) -> UiResult<()> {
        self.events.push(Event::TestStop(event.clone()));
        Ok(())
    }

    fn raw_line(&mut self, event: &RawLine) -> UiResult<()> {
        self.events.push(Event::RawLine(event.clone()));
        Ok(())
    }
}
