use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use follower_core::mocks::ScriptedLink;
use follower_core::{FollowerError, HardwareProxy, MotorState, ReadPolicy, Side};
use rstest::rstest;

fn proxy() -> (HardwareProxy<ScriptedLink>, ScriptedLink) {
    let link = ScriptedLink::new();
    let p = HardwareProxy::new(link.clone()).with_policy(ReadPolicy {
        poll: Duration::from_millis(2),
        deadline: None,
    });
    (p, link)
}

#[rstest]
#[case(Side::Left, 0)]
#[case(Side::Left, 128)]
#[case(Side::Right, 254)]
fn set_speed_in_range_updates_cache(#[case] side: Side, #[case] speed: i32) {
    let (mut p, link) = proxy();
    p.set_speed(side, speed).expect("speed in range");
    assert_eq!(i32::from(p.speed(side)), speed);
    assert_eq!(link.sent(), vec![format!("setSpeed {side} {speed}")]);
}

#[rstest]
#[case(255)]
#[case(256)]
#[case(-1)]
#[case(i32::MIN)]
fn out_of_range_speed_is_rejected_before_any_write(#[case] speed: i32) {
    let (mut p, link) = proxy();
    p.set_speed(Side::Left, 40).unwrap();
    link.clear_sent();

    let err = p.set_speed(Side::Left, speed).unwrap_err();
    assert!(matches!(err, FollowerError::InvalidArgument(_)), "got {err:?}");
    assert_eq!(p.speed(Side::Left), 40);
    assert!(link.sent().is_empty());
}

#[test]
fn paired_speeds_apply_all_or_nothing() {
    let (mut p, link) = proxy();
    assert!(p.set_speeds(40, 255).is_err());
    assert!(link.sent().is_empty());
    assert_eq!((p.speed(Side::Left), p.speed(Side::Right)), (0, 0));
}

#[rstest]
#[case("left", "forward", Side::Left, MotorState::Forward)]
#[case(" RIGHT ", "Backward", Side::Right, MotorState::Backward)]
#[case("Left", "RELEASE", Side::Left, MotorState::Release)]
fn named_state_commands(
    #[case] side_name: &str,
    #[case] state_name: &str,
    #[case] side: Side,
    #[case] state: MotorState,
) {
    let (mut p, link) = proxy();
    p.set_state_str(side_name, state_name).expect("valid names");
    assert_eq!(p.state(side), state);
    assert_eq!(link.sent(), vec![format!("setState {side} {state}")]);
}

#[rstest]
#[case("centre", "forward")]
#[case("left", "brake")]
#[case("", "")]
fn bad_names_change_nothing(#[case] side_name: &str, #[case] state_name: &str) {
    let (mut p, link) = proxy();
    let err = p.set_state_str(side_name, state_name).unwrap_err();
    assert!(matches!(err, FollowerError::InvalidArgument(_)));
    assert_eq!(p.state(Side::Left), MotorState::Release);
    assert_eq!(p.state(Side::Right), MotorState::Release);
    assert!(link.sent().is_empty());
}

#[test]
fn bad_side_name_rejected_for_speed_and_read() {
    let (mut p, link) = proxy();
    assert!(matches!(
        p.set_speed_str("up", 10),
        Err(FollowerError::InvalidArgument(_))
    ));
    assert!(matches!(
        p.read_sensor_str("down"),
        Err(FollowerError::InvalidArgument(_))
    ));
    assert!(link.sent().is_empty());
}

#[test]
fn read_sensor_discards_unrelated_lines() {
    let (mut p, link) = proxy();
    link.push_line("ok");
    link.push_line("RIGHTSENSOR=999");
    link.push_payload(Side::Left, "321");

    assert_eq!(p.read_sensor(Side::Left).unwrap(), 321);
    assert_eq!(link.sent(), vec!["readSensor LEFT".to_string()]);
}

#[test]
fn garbled_payload_reads_as_minus_one() {
    let (mut p, link) = proxy();
    link.push_payload(Side::Right, "n/a");
    assert_eq!(p.read_sensor_str("right").unwrap(), -1);
}

#[test]
fn silent_link_read_is_cancelled_by_shutdown() {
    let flag = Arc::new(AtomicBool::new(false));
    let (p, _link) = proxy();
    let mut p = p.with_cancel(flag.clone());

    let setter = {
        let flag = flag.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            flag.store(true, Ordering::Relaxed);
        })
    };
    let started = Instant::now();
    let err = p.read_sensor(Side::Right).unwrap_err();
    setter.join().unwrap();

    assert_eq!(err, FollowerError::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn deadline_bounds_a_silent_read() {
    let (p, _link) = proxy();
    let mut p = p.with_policy(ReadPolicy {
        poll: Duration::from_millis(2),
        deadline: Some(Duration::from_millis(15)),
    });
    assert_eq!(
        p.read_sensor(Side::Left).unwrap_err(),
        FollowerError::Timeout(Side::Left)
    );
}

#[test]
fn failed_write_leaves_cache_untouched() {
    let (mut p, link) = proxy();
    link.fail_writes();
    let err = p.set_state(Side::Left, MotorState::Forward).unwrap_err();
    assert!(matches!(err, FollowerError::Io(_)), "got {err:?}");
    assert_eq!(p.state(Side::Left), MotorState::Release);
}
