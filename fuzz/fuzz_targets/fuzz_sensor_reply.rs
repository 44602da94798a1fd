#![no_main]
use follower_core::Side;
use follower_core::protocol::parse_sensor_response;
use follower_core::types::SENSOR_GARBLED;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|line: &str| {
    for side in Side::ALL {
        if let Some(v) = parse_sensor_response(line, side) {
            assert!(v == SENSOR_GARBLED || v >= 0);
        }
    }
});
