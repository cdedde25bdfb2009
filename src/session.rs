//! Turns verbose googletest output into lifecycle events.
//!
//! [`SessionParser`] feeds each line through the marker grammar below. A line
//! that matches no marker, or a blank line inside an open test case, reaches
//! the sink as a [`RawLine`] tagged with the test currently running.
//!
//! The parser does not check that markers pair up. Out-of-order input yields
//! whatever counters result, never an error.

use regex::Captures;

use crate::dispatch::{GrammarError, PatternDispatcher, RuleSpec};
use crate::events::{
    RawLine, SessionStart, TestCaseEnd, TestCaseStart, TestStart, TestStatus, TestStop,
};
use crate::ui::renderer::{OutputSink, UiError, UiResult};

const RUN_HEADER: &str = r"Running (\d+) tests? from (\d+) test (?:case|suite)s?";
const CASE_BOUNDARY: &str =
    r"\[ *-+ *\] (\d+) tests? from (.*?)(?:, where (.*?))?(?: \((\d+) ms(?: total)?\))?$";
const TEST_START: &str = r"\[ *RUN *\] (.*)\.(.*)";
const TEST_STOP: &str = r"\[ *(OK|FAILED) *\] (.*)\.(.*?)(?: \((\d+) ms(?: total)?\))?$";
const BLANK: &str = r"^$";

/// Coarse position in the run, derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    CaseOpen,
    TestRunning,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub total_test_count: u64,
    pub total_test_case_count: u64,
    pub test_case_index: u64,
    pub current_test_case: Option<String>,
    pub current_test_count: u64,
    pub current_fail_count: u64,
    pub test_index: u64,
    pub current_test: Option<String>,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match (&self.current_test_case, &self.current_test) {
            (None, _) => Phase::Idle,
            (Some(_), None) => Phase::CaseOpen,
            (Some(_), Some(_)) => Phase::TestRunning,
        }
    }
}

/// Parser state plus the sink it reports to. Rule handlers operate on this.
struct Session<S> {
    state: SessionState,
    sink: S,
}

type Rules<S> = [RuleSpec<Session<S>, UiError>; 5];

impl<S: OutputSink> Session<S> {
    fn rules() -> Rules<S> {
        [
            RuleSpec {
                name: "run-header",
                pattern: RUN_HEADER,
                handler: Self::on_run_header,
            },
            RuleSpec {
                name: "case-boundary",
                pattern: CASE_BOUNDARY,
                handler: Self::on_case_boundary,
            },
            RuleSpec {
                name: "test-start",
                pattern: TEST_START,
                handler: Self::on_test_start,
            },
            RuleSpec {
                name: "test-stop",
                pattern: TEST_STOP,
                handler: Self::on_test_stop,
            },
            RuleSpec {
                name: "blank",
                pattern: BLANK,
                handler: Self::on_blank,
            },
        ]
    }

    fn on_run_header(&mut self, caps: &Captures<'_>) -> UiResult<bool> {
        let (Some(total_tests), Some(total_test_cases)) =
            (parse_count(caps, 1), parse_count(caps, 2))
        else {
            return Ok(false);
        };
        self.state.total_test_count = total_tests;
        self.state.total_test_case_count = total_test_cases;
        self.sink.session_start(&SessionStart {
            total_tests,
            total_test_cases,
        })?;
        Ok(true)
    }

    fn on_case_boundary(&mut self, caps: &Captures<'_>) -> UiResult<bool> {
        let Some(test_count) = parse_count(caps, 1) else {
            return Ok(false);
        };
        let Some(elapsed_ms) = parse_optional_count(caps, 4) else {
            return Ok(false);
        };
        let name = caps[2].to_owned();
        let where_clause = caps.get(3).map(|m| m.as_str().to_owned());

        self.state.current_test = None;
        match self.state.current_test_case.take() {
            None => {
                self.state.current_test_case = Some(name.clone());
                self.state.current_test_count = test_count;
                self.state.current_fail_count = 0;
                self.state.test_index = 0;
                self.state.test_case_index += 1;
                log::debug!(
                    "test case {} opened ({}/{})",
                    name,
                    self.state.test_case_index,
                    self.state.total_test_case_count
                );
                self.sink.test_case_start(&TestCaseStart {
                    name,
                    index: self.state.test_case_index,
                    total_cases: self.state.total_test_case_count,
                    where_clause,
                })?;
            }
            Some(open) => {
                if open != name {
                    log::debug!("closing marker for {name} while {open} is open");
                }
                // A where clause on the closing marker has no bearing on the close.
                log::debug!(
                    "test case {} closed ({}/{} failed)",
                    name,
                    self.state.current_fail_count,
                    self.state.current_test_count
                );
                self.sink.test_case_end(&TestCaseEnd {
                    name,
                    index: self.state.test_case_index,
                    total_cases: self.state.total_test_case_count,
                    test_count: self.state.current_test_count,
                    fail_count: self.state.current_fail_count,
                    elapsed_ms,
                })?;
            }
        }
        Ok(true)
    }

    fn on_test_start(&mut self, caps: &Captures<'_>) -> UiResult<bool> {
        let test_case = caps[1].to_owned();
        let test = caps[2].to_owned();

        self.state.test_index += 1;
        if self.state.current_test_case.is_none() {
            log::debug!("test {test_case}.{test} started with no open test case");
        }
        // Replaces whatever an unterminated previous test left behind.
        self.state.current_test = Some(test.clone());
        self.sink.test_start(&TestStart {
            test_case,
            test,
            test_index: self.state.test_index,
            test_count: self.state.current_test_count,
        })?;
        Ok(true)
    }

    fn on_test_stop(&mut self, caps: &Captures<'_>) -> UiResult<bool> {
        let Some(status) = TestStatus::from_marker(&caps[1]) else {
            return Ok(false);
        };
        let Some(elapsed_ms) = parse_optional_count(caps, 4) else {
            return Ok(false);
        };

        self.state.current_test = None;
        if status == TestStatus::Failed {
            self.state.current_fail_count += 1;
        }
        if self.state.current_test_case.is_none() {
            log::debug!("test {}.{} stopped with no open test case", &caps[2], &caps[3]);
        }
        self.sink.test_stop(&TestStop {
            status,
            test_case: caps[2].to_owned(),
            test: caps[3].to_owned(),
            test_index: self.state.test_index,
            test_count: self.state.current_test_count,
            elapsed_ms,
        })?;
        Ok(true)
    }

    /// Blank lines separate sections between cases and are dropped there.
    /// Inside a case they belong to test output and pass through.
    fn on_blank(&mut self, _caps: &Captures<'_>) -> UiResult<bool> {
        Ok(self.state.current_test_case.is_none())
    }
}

fn parse_count(caps: &Captures<'_>, group: usize) -> Option<u64> {
    caps.get(group)?.as_str().parse().ok()
}

/// `Some(None)` when the group did not participate, `None` when it did but
/// does not fit in a `u64`.
fn parse_optional_count(caps: &Captures<'_>, group: usize) -> Option<Option<u64>> {
    match caps.get(group) {
        None => Some(None),
        Some(m) => m.as_str().parse().ok().map(Some),
    }
}

/// Strips one line terminator (`\n`, then `\r`) for matching.
fn line_content(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

pub struct SessionParser<S> {
    dispatcher: PatternDispatcher<Session<S>, UiError>,
    session: Session<S>,
}

impl<S: OutputSink> SessionParser<S> {
    pub fn new(sink: S) -> Result<Self, GrammarError> {
        let dispatcher = PatternDispatcher::new(&Session::<S>::rules())?;
        log::debug!(
            "marker rules: {}",
            dispatcher.rule_names().collect::<Vec<_>>().join(", ")
        );
        Ok(Self {
            dispatcher,
            session: Session {
                state: SessionState::default(),
                sink,
            },
        })
    }

    /// Processes one line, terminator included if the input had one.
    pub fn process(&mut self, line: &str) -> UiResult<()> {
        let content = line_content(line);
        if self.dispatcher.process(&mut self.session, content)? {
            return Ok(());
        }
        let raw = RawLine {
            attributed_test: self.session.state.current_test.clone(),
            text: line.to_owned(),
        };
        self.session.sink.raw_line(&raw)
    }

    pub fn state(&self) -> &SessionState {
        &self.session.state
    }

    pub fn sink(&self) -> &S {
        &self.session.sink
    }

    pub fn into_sink(self) -> S {
        self.session.sink
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
