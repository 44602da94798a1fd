use follower_console::{ConsoleExit, MENU, TuningCommand, TuningError, apply, parse, run_console};
use follower_core::{ControlParams, ParamSnapshot};
use proptest::prelude::*;
use rstest::rstest;

fn params() -> ControlParams {
    ControlParams::from_snapshot(ParamSnapshot::default())
}

fn drive(input: &str, p: &ControlParams) -> (ConsoleExit, String) {
    let mut out = Vec::new();
    let exit = run_console(&mut input.as_bytes(), &mut out, p).unwrap();
    (exit, String::from_utf8(out).unwrap())
}

#[rstest]
#[case("0", TuningCommand::ToggleEngage)]
#[case("k=0.25", TuningCommand::SetGain(0.25))]
#[case("k=-3", TuningCommand::SetGain(-3.0))]
#[case("s=50", TuningCommand::SetBaseSpeed(50))]
#[case("min= 10 ", TuningCommand::SetMinSpeed(10))]
#[case("max=300", TuningCommand::SetMaxSpeed(300))]
#[case("Q", TuningCommand::Quit)]
#[case("quit", TuningCommand::Quit)]
#[case("status", TuningCommand::Status)]
fn parses_commands(#[case] line: &str, #[case] want: TuningCommand) {
    assert_eq!(parse(line), Ok(want));
}

#[rstest]
#[case("k=abc")]
#[case("s=4.5")]
#[case("min=")]
#[case("max=ten")]
fn malformed_values_are_invalid(#[case] line: &str) {
    assert!(matches!(parse(line), Err(TuningError::InvalidValue { .. })));
}

#[rstest]
#[case("")]
#[case("go")]
#[case("x=1")]
#[case("kp=1")]
fn unknown_commands(#[case] line: &str) {
    assert!(matches!(parse(line), Err(TuningError::Unknown(_))));
}

#[rstest]
#[case(TuningCommand::SetBaseSpeed(255))]
#[case(TuningCommand::SetMinSpeed(-1))]
#[case(TuningCommand::SetMaxSpeed(1000))]
fn out_of_range_speed_changes_nothing(#[case] cmd: TuningCommand) {
    let p = params();
    let before = p.snapshot();
    let err = apply(cmd, &p).unwrap_err();
    assert_eq!(err.to_string(), "invalid value!");
    assert_eq!(p.snapshot(), before);
}

#[test]
fn session_edits_parameters() {
    let p = params();
    let (exit, out) = drive("0\nk=0.5\ns=60\nmin=20\nmax=90\nq\n", &p);
    assert_eq!(exit, ConsoleExit::Quit);
    let s = p.snapshot();
    assert!(s.engaged);
    assert!((s.gain - 0.5).abs() < f64::EPSILON);
    assert_eq!((s.base_speed, s.min_speed, s.max_speed), (60, 20, 90));
    assert!(p.is_shutdown());
    assert_eq!(out.matches(MENU).count(), 6);
}

#[test]
fn invalid_value_is_reported_and_ignored() {
    let p = params();
    let (_, out) = drive("s=255\nk=fast\n", &p);
    assert_eq!(out.matches("invalid value!").count(), 2);
    assert_eq!(p.base_speed(), 45);
    assert!((p.gain() - 0.1).abs() < f64::EPSILON);
}

#[test]
fn end_of_input_requests_shutdown() {
    let p = params();
    let (exit, _) = drive("", &p);
    assert_eq!(exit, ConsoleExit::EndOfInput);
    assert!(p.is_shutdown());
}

#[test]
fn external_shutdown_stops_console() {
    let p = params();
    p.request_shutdown();
    let (exit, out) = drive("0\n", &p);
    assert_eq!(exit, ConsoleExit::Shutdown);
    assert!(out.is_empty());
    assert!(!p.is_engaged());
}

#[test]
fn status_prints_snapshot() {
    let p = params();
    let (_, out) = drive("status\n", &p);
    assert!(out.contains("engaged=false gain=0.1 base=45 min=25 max=70"), "{out}");
}

#[test]
fn unknown_command_only_reprints_menu() {
    let p = params();
    let (_, out) = drive("hello\n", &p);
    assert_eq!(out.matches(MENU).count(), 2);
    assert!(!out.contains("invalid value!"));
}

proptest! {
    // Parsing arbitrary text never panics, and whatever it rejects leaves params untouched.
    #[test]
    fn arbitrary_lines_never_panic(line in ".{0,40}") {
        let p = params();
        let before = p.snapshot();
        if let Ok(cmd) = parse(&line) {
            let _ = apply(cmd, &p);
        } else {
            prop_assert_eq!(p.snapshot(), before);
        }
    }
}
