use super::{Phase, SessionParser};
use crate::events::{
    Event, EventRecorder, RawLine, SessionStart, TestCaseEnd, TestCaseStart, TestStart,
    TestStatus, TestStop,
};

fn parser() -> SessionParser<EventRecorder> {
    SessionParser::new(EventRecorder::new()).expect("grammar compiles")
}

fn feed(input: &str) -> SessionParser<EventRecorder> {
    let mut parser = parser();
    for line in input.split_inclusive('\n') {
        parser.process(line).expect("process line");
    }
    parser
}

fn events(input: &str) -> Vec<Event> {
    feed(input).into_sink().into_events()
}

fn raw(test: Option<&str>, text: &str) -> Event {
    Event::RawLine(RawLine {
        attributed_test: test.map(str::to_owned),
        text: text.to_owned(),
    })
}

const SINGLE_CASE_RUN: &str = "Running 2 tests from 1 test case\n\
[--- ] 2 tests from Suite\n\
[ RUN ] Suite.A\n\
[ OK ] Suite.A (5 ms)\n\
[ RUN ] Suite.B\n\
[ FAILED ] Suite.B\n\
[--- ] 2 tests from Suite (12 ms total)\n";

#[test]
fn single_case_run_produces_full_lifecycle() {
    assert_eq!(
        events(SINGLE_CASE_RUN),
        vec![
            Event::SessionStart(SessionStart {
                total_tests: 2,
                total_test_cases: 1,
            }),
            Event::TestCaseStart(TestCaseStart {
                name: "Suite".to_owned(),
                index: 1,
                total_cases: 1,
                where_clause: None,
            }),
            Event::TestStart(TestStart {
                test_case: "Suite".to_owned(),
                test: "A".to_owned(),
                test_index: 1,
                test_count: 2,
            }),
            Event::TestStop(TestStop {
                status: TestStatus::Passed,
                test_case: "Suite".to_owned(),
                test: "A".to_owned(),
                test_index: 1,
                test_count: 2,
                elapsed_ms: Some(5),
            }),
            Event::TestStart(TestStart {
                test_case: "Suite".to_owned(),
                test: "B".to_owned(),
                test_index: 2,
                test_count: 2,
            }),
            Event::TestStop(TestStop {
                status: TestStatus::Failed,
                test_case: "Suite".to_owned(),
                test: "B".to_owned(),
                test_index: 2,
                test_count: 2,
                elapsed_ms: None,
            }),
            Event::TestCaseEnd(TestCaseEnd {
                name: "Suite".to_owned(),
                index: 1,
                total_cases: 1,
                test_count: 2,
                fail_count: 1,
                elapsed_ms: Some(12),
            }),
        ]
    );
}

#[test]
fn boundary_token_accepts_short_padded_and_long_forms() {
    for marker in ["[--- ]", "[----------]", "[ - ]", "[-]"] {
        let input = format!(
            "{marker} 1 test from Suite\n[ RUN ] Suite.A\n[ OK ] Suite.A\n{marker} 1 test from Suite (2 ms total)\n"
        );
        let events = events(&input);
        assert_eq!(events.len(), 4, "marker={marker}");
        assert!(
            matches!(&events[0], Event::TestCaseStart(start) if start.name == "Suite"),
            "marker={marker}"
        );
        assert!(
            matches!(&events[3], Event::TestCaseEnd(end) if end.elapsed_ms == Some(2)),
            "marker={marker}"
        );
    }
}

#[test]
fn boundary_token_without_dashes_is_raw() {
    assert_eq!(
        events("[ ] 1 test from Suite\n"),
        vec![raw(None, "[ ] 1 test from Suite\n")]
    );
}

#[test]
fn accepts_real_framework_banners() {
    let input = "[==========] Running 3 tests from 2 test suites.\n\
[----------] Global test environment set-up.\n\
[----------] 1 test from Alpha\n\
[ RUN      ] Alpha.Works\n\
[       OK ] Alpha.Works (0 ms)\n\
[----------] 1 test from Alpha (0 ms total)\n\
\n\
[----------] 2 tests from Beta\n\
[ RUN      ] Beta.One\n\
[       OK ] Beta.One (1 ms)\n\
[ RUN      ] Beta.Two\n\
[  FAILED  ] Beta.Two (3 ms)\n\
[----------] 2 tests from Beta (4 ms total)\n";

    let parser = feed(input);
    let state = parser.state();
    assert_eq!(state.total_test_count, 3);
    assert_eq!(state.total_test_case_count, 2);
    assert_eq!(state.test_case_index, 2);

    let events = parser.into_sink().into_events();
    assert_eq!(
        events[1],
        raw(None, "[----------] Global test environment set-up.\n")
    );
    let ends = events
        .iter()
        .filter_map(|event| match event {
            Event::TestCaseEnd(end) => Some((end.name.as_str(), end.fail_count, end.elapsed_ms)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(ends, vec![("Alpha", 0, Some(0)), ("Beta", 1, Some(4))]);
}

#[test]
fn singular_header_forms_are_recognized() {
    let parser = feed("Running 1 test from 1 test case.\n");
    assert_eq!(parser.state().total_test_count, 1);
    assert_eq!(parser.state().total_test_case_count, 1);
}

#[test]
fn case_indexes_increase_by_one() {
    let mut input = String::from("Running 6 tests from 3 test cases\n");
    for name in ["A", "B", "C"] {
        input.push_str(&format!("[----] 2 tests from {name}\n"));
        input.push_str(&format!("[----] 2 tests from {name} (1 ms total)\n"));
    }

    let starts = events(&input)
        .into_iter()
        .filter_map(|event| match event {
            Event::TestCaseStart(start) => Some(start.index),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(starts, vec![1, 2, 3]);
}

#[test]
fn where_clause_is_reported_on_open_only() {
    let with_clause = events(
        "[----------] 1 test from Typed/0, where TypeParam = int\n\
[ RUN      ] Typed/0.Sizes\n\
[       OK ] Typed/0.Sizes (0 ms)\n\
[----------] 1 test from Typed/0, where TypeParam = int (2 ms total)\n",
    );
    let without_clause = events(
        "[----------] 1 test from Typed/0, where TypeParam = int\n\
[ RUN      ] Typed/0.Sizes\n\
[       OK ] Typed/0.Sizes (0 ms)\n\
[----------] 1 test from Typed/0 (2 ms total)\n",
    );

    assert_eq!(
        with_clause[0],
        Event::TestCaseStart(TestCaseStart {
            name: "Typed/0".to_owned(),
            index: 1,
            total_cases: 0,
            where_clause: Some("TypeParam = int".to_owned()),
        })
    );
    assert_eq!(with_clause.last(), without_clause.last());
    assert!(matches!(
        with_clause.last(),
        Some(Event::TestCaseEnd(TestCaseEnd {
            elapsed_ms: Some(2),
            ..
        }))
    ));
}

#[test]
fn blank_line_between_cases_is_swallowed() {
    let parser = feed(
        "[----] 1 test from A\n\
[----] 1 test from A (1 ms total)\n\
\n",
    );
    assert_eq!(parser.state().phase(), Phase::Idle);
    assert_eq!(parser.sink().events().len(), 2);
}

#[test]
fn blank_line_inside_a_test_passes_through() {
    let events = events(
        "[----] 1 test from A\n\
[ RUN ] A.Works\n\
\n\
[ OK ] A.Works\n",
    );
    assert_eq!(events[2], raw(Some("Works"), "\n"));
}

#[test]
fn unrecognized_lines_keep_exact_bytes_and_running_test() {
    let events = events(concat!(
        "[----] 1 test from Math\n",
        "[ RUN ] Math.Adds\n",
        "path/to/math_test.cc:12: Failure\n",
        "Expected equality of these values:\n",
        "  \tsum\t  \n",
        "[ FAILED ] Math.Adds (1 ms)\n",
        "after the test\n",
    ));

    assert_eq!(events[2], raw(Some("Adds"), "path/to/math_test.cc:12: Failure\n"));
    assert_eq!(events[3], raw(Some("Adds"), "Expected equality of these values:\n"));
    assert_eq!(events[4], raw(Some("Adds"), "  \tsum\t  \n"));
    assert_eq!(events[6], raw(None, "after the test\n"));
}

#[test]
fn raw_text_before_any_marker_has_no_attribution() {
    assert_eq!(
        events("Note: Google Test filter = *\n"),
        vec![raw(None, "Note: Google Test filter = *\n")]
    );
}

#[test]
fn final_line_without_terminator_is_processed() {
    let events = events("[----] 1 test from A\n[ RUN ] A.Last");
    assert_eq!(
        events[1],
        Event::TestStart(TestStart {
            test_case: "A".to_owned(),
            test: "Last".to_owned(),
            test_index: 1,
            test_count: 1,
        })
    );
}

#[test]
fn crlf_terminated_markers_are_recognized() {
    let events = events("[----] 1 test from A\r\n[ OK ] A.Works (7 ms)\r\n\r\n");
    assert!(matches!(
        &events[1],
        Event::TestStop(TestStop {
            test,
            elapsed_ms: Some(7),
            ..
        }) if test == "Works"
    ));
    assert_eq!(events[2], raw(None, "\r\n"));
}

#[test]
fn names_split_on_the_right_dot() {
    struct Case {
        line: &'static str,
        case: &'static str,
        test: &'static str,
        elapsed_ms: Option<u64>,
    }

    let cases = [
        Case {
            line: "[       OK ] Inst/Param.Works/0 (3 ms)\n",
            case: "Inst/Param",
            test: "Works/0",
            elapsed_ms: Some(3),
        },
        Case {
            line: "[  FAILED  ] ns.Suite.Test\n",
            case: "ns.Suite",
            test: "Test",
            elapsed_ms: None,
        },
        Case {
            line: "[  FAILED  ] Param.Odd/1, where GetParam() = 3 (0 ms)\n",
            case: "Param",
            test: "Odd/1, where GetParam() = 3",
            elapsed_ms: Some(0),
        },
    ];

    for case in cases {
        let events = events(case.line);
        let Some(Event::TestStop(stop)) = events.first() else {
            panic!("expected a test stop for {:?}", case.line);
        };
        assert_eq!(stop.test_case, case.case, "line={:?}", case.line);
        assert_eq!(stop.test, case.test, "line={:?}", case.line);
        assert_eq!(stop.elapsed_ms, case.elapsed_ms, "line={:?}", case.line);
    }
}

#[test]
fn tracks_phase_through_a_case() {
    let mut parser = parser();
    assert_eq!(parser.state().phase(), Phase::Idle);

    parser.process("[----] 2 tests from A\n").expect("open");
    assert_eq!(parser.state().phase(), Phase::CaseOpen);

    parser.process("[ RUN ] A.One\n").expect("start");
    assert_eq!(parser.state().phase(), Phase::TestRunning);
    assert_eq!(parser.state().current_test.as_deref(), Some("One"));

    parser.process("[ OK ] A.One\n").expect("stop");
    assert_eq!(parser.state().phase(), Phase::CaseOpen);
    assert_eq!(parser.state().current_test, None);

    parser.process("[----] 2 tests from A\n").expect("close");
    assert_eq!(parser.state().phase(), Phase::Idle);
}

#[test]
fn opening_a_case_resets_per_case_counters() {
    let parser = feed(
        "[----] 1 test from A\n\
[ RUN ] A.One\n\
[ FAILED ] A.One\n\
[----] 1 test from A\n\
[----] 3 tests from B\n",
    );
    let state = parser.state();
    assert_eq!(state.current_test_case.as_deref(), Some("B"));
    assert_eq!(state.current_test_count, 3);
    assert_eq!(state.current_fail_count, 0);
    assert_eq!(state.test_index, 0);
    assert_eq!(state.test_case_index, 2);
}

#[test]
fn elapsed_time_absent_is_not_zero() {
    let events = events("[----] 1 test from A\n[----] 1 test from A\n");
    assert!(matches!(
        events.last(),
        Some(Event::TestCaseEnd(TestCaseEnd {
            elapsed_ms: None,
            ..
        }))
    ));
}

#[test]
fn oversized_numbers_fall_back_to_raw_output() {
    let line = "[----] 99999999999999999999999 tests from Huge\n";
    let parser = feed(line);
    assert_eq!(parser.state().phase(), Phase::Idle);
    assert_eq!(parser.sink().events(), &[raw(None, line)]);
}

#[test]
fn stop_markers_without_open_case_do_not_crash() {
    let parser = feed(
        "[ FAILED ] Ghost.One\n\
[ FAILED ] Ghost.Two\n\
[ OK ] Ghost.Three\n",
    );
    let state = parser.state();
    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.current_fail_count, 2);
    assert_eq!(state.current_test_count, 0);
    assert_eq!(parser.sink().events().len(), 3);
}

#[test]
fn mismatched_close_reports_marker_name() {
    let events = events(
        "[----] 1 test from A\n\
[ RUN ] A.One\n\
[ FAILED ] A.One\n\
[ FAILED ] A.Two\n\
[----] 1 test from B (9 ms total)\n",
    );
    assert_eq!(
        events.last(),
        Some(&Event::TestCaseEnd(TestCaseEnd {
            name: "B".to_owned(),
            index: 1,
            total_cases: 0,
            test_count: 1,
            fail_count: 2,
            elapsed_ms: Some(9),
        }))
    );
}

#[test]
fn fail_count_never_exceeds_test_count_for_consistent_runs() {
    let input = "Running 3 tests from 2 test cases\n\
[----] 2 tests from A\n\
[ RUN ] A.One\n\
[ FAILED ] A.One\n\
[ RUN ] A.Two\n\
[ FAILED ] A.Two\n\
[----] 2 tests from A\n\
[----] 1 test from B\n\
[ RUN ] B.One\n\
[ OK ] B.One\n\
[----] 1 test from B\n";

    for event in events(input) {
        if let Event::TestCaseEnd(end) = event {
            assert!(end.fail_count <= end.test_count, "{end:?}");
        }
    }
}
