#![no_main]
use follower_core::ControlParams;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let params = ControlParams::default();
    if let Ok(cmd) = follower_console::parse(data) {
        let _ = follower_console::apply(cmd, &params);
    }
    // Whatever was accepted, stored speeds stay in range.
    let s = params.snapshot();
    assert!(s.base_speed < 255 && s.min_speed < 255 && s.max_speed < 255);
});
