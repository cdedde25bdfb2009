use std::fmt::{Display, Formatter};

use crate::events::{RawLine, SessionStart, TestCaseEnd, TestCaseStart, TestStart, TestStop};

pub type UiResult<T> = Result<T, UiError>;

#[derive(Debug)]
pub enum UiError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl UiError {
    /// True when the reader on the other end of the output went away.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, UiError::Io(error) if error.kind() == std::io::ErrorKind::BrokenPipe)
    }
}

impl Display for UiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UiError::Io(error) => write!(f, "{error}"),
            UiError::Json(error) => write!(f, "failed to encode event: {error}"),
        }
    }
}

impl std::error::Error for UiError {}

impl From<std::io::Error> for UiError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for UiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Consumer of session lifecycle events.
pub trait OutputSink {
    fn session_start(&mut self, event: &SessionStart) -> UiResult<()>;
    fn test_case_start(&mut self, event: &TestCaseStart) -> UiResult<()>;
    fn test_case_end(&mut self, event: &TestCaseEnd) -> UiResult<()>;
    fn test_start(&mut self, event: &TestStart) -> UiResult<()>;
    fn test_stop(&mut self, event: &TestStop) -> UiResult<()>;
    fn raw_line(&mut self, event: &RawLine) -> UiResult<()>;
}
